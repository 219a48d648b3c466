//! deptctl - Admin client for the organizational department directory.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use deptctl as app;

use app::auth::AuthService;
use app::client::ApiClient;
use app::config::{AppConfig, ConfigLoadResult};
use app::credentials::{CredentialStore, FileTokenStore};
use app::form::DepartmentForm;
use app::models::{Department, UpdateDepartmentInput, UpdateSubDepartmentInput};
use app::session::{Admission, SessionGuard, decode_claims};
use app::sync::ListSynchronizer;

/// Admin client for the department directory.
#[derive(Parser)]
#[command(name = "deptctl")]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// Explicit config file path
    #[arg(long, conflicts_with = "dev")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Register a new account, then log in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the stored session token
    Logout,
    /// Show the current session state
    Status,
    /// List one page of departments
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Create a department
    Create {
        #[arg(long)]
        name: String,
        /// Sub-department name; repeatable
        #[arg(long = "sub")]
        subs: Vec<String>,
    },
    /// Replace a department's name and sub-department list
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: String,
        /// Sub-department as "name" (new) or "id:name" (existing); repeatable
        #[arg(long = "sub")]
        subs: Vec<String>,
    },
    /// Delete a department by id
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Write a default config file
    ConfigInit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .init();

    let config_path = if cli.dev {
        tracing::info!("Dev mode: loading config from current directory");
        PathBuf::from("config.toml")
    } else {
        cli.config.clone().unwrap_or_else(AppConfig::default_path)
    };

    if let Command::ConfigInit = cli.command {
        let config = AppConfig::default();
        config.save(&config_path).context("Failed to write config")?;
        println!("Wrote default config to {}", config_path.display());
        return Ok(());
    }

    let config = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => config,
        ConfigLoadResult::Missing => {
            tracing::warn!(
                "No config at {}, using defaults (run `deptctl config-init`)",
                config_path.display()
            );
            AppConfig::default()
        }
        ConfigLoadResult::Invalid(e) => bail!("Invalid config at {}: {e}", config_path.display()),
    };

    let store: Arc<dyn CredentialStore> = match &config.session.token_file {
        Some(path) => Arc::new(FileTokenStore::open(path.clone())),
        None => Arc::new(FileTokenStore::in_memory()),
    };
    let client = ApiClient::new(
        &config.api.endpoint,
        Duration::from_secs(config.api.timeout_secs),
        store.clone(),
    );
    let guard = SessionGuard::new(
        config.session.login_path.clone(),
        config.session.protected_prefix.clone(),
    );

    match cli.command {
        Command::ConfigInit => unreachable!("handled before config load"),

        Command::Login { username, password } => {
            let auth = AuthService::new(client, store);
            let user = auth.login(&username, &password).await?;
            println!("Logged in as {} (id {})", user.username, user.id);
        }

        Command::Register { username, password } => {
            let auth = AuthService::new(client, store);
            let user = auth.register(&username, &password).await?;
            println!("Registered and logged in as {} (id {})", user.username, user.id);
        }

        Command::Logout => {
            let auth = AuthService::new(client, store);
            auth.logout()?;
            println!("Logged out");
        }

        Command::Status => match store.get() {
            None => println!("Not logged in"),
            Some(token) => match decode_claims(&token) {
                Ok(claims) => {
                    let user = claims.username.clone().unwrap_or_else(|| "<unknown>".to_string());
                    if claims.is_expired(Utc::now()) {
                        println!("Session for {user} expired");
                    } else if let Some(at) = claims.expires_at() {
                        println!("Session for {user} valid until {at}");
                    } else {
                        println!("Session for {user} valid");
                    }
                }
                Err(e) => println!("Stored token is unreadable: {e}"),
            },
        },

        Command::List { page } => {
            let mut sync = admitted_synchronizer(&guard, &*store, client, &config)?;
            let fetched = sync.go_to_page(page).await?;
            print_page(fetched);
        }

        Command::Create { name, subs } => {
            let mut sync = admitted_synchronizer(&guard, &*store, client, &config)?;
            let mut form = DepartmentForm::new();
            form.set_name(name);
            for sub in subs {
                form.add_sub_row().name = sub;
            }
            let created = sync.submit(&mut form).await?;
            println!("Created department {} (id {})", created.name, created.id);
            print_department(&created);
        }

        Command::Update { id, name, subs } => {
            let mut sync = admitted_synchronizer(&guard, &*store, client, &config)?;
            let input = UpdateDepartmentInput {
                id,
                name,
                sub_departments: subs.iter().map(|s| parse_sub_arg(s)).collect(),
            };
            let updated = sync.update(input).await?;
            println!("Updated department {} (id {})", updated.name, updated.id);
            print_department(&updated);
        }

        Command::Delete { id } => {
            let mut sync = admitted_synchronizer(&guard, &*store, client, &config)?;
            if sync.delete(id).await? {
                println!("Deleted department {id}");
            } else {
                println!("Department {id} was not found");
            }
        }
    }

    Ok(())
}

/// Run the admission check and build the list synchronizer, or fail
/// with a pointer at the login command.
fn admitted_synchronizer(
    guard: &SessionGuard,
    store: &dyn CredentialStore,
    client: ApiClient,
    config: &AppConfig,
) -> anyhow::Result<ListSynchronizer<ApiClient>> {
    let token = store.get();
    let path = &config.session.protected_prefix;
    match guard.admit(path, token.as_deref(), Utc::now()) {
        Admission::Allow => Ok(ListSynchronizer::new(client, config.list.page_size)),
        Admission::Redirect(login) => {
            let cause = if token.is_none() {
                app::AppError::MissingCredential
            } else {
                app::AppError::Unauthorized("stored credential expired or unreadable".to_string())
            };
            Err(anyhow::Error::new(cause)
                .context(format!("{path} -> {login}; run `deptctl login`")))
        }
    }
}

/// Parse a `--sub` argument: "id:name" keeps an existing row, a bare
/// name adds a new one.
fn parse_sub_arg(arg: &str) -> UpdateSubDepartmentInput {
    if let Some((id, name)) = arg.split_once(':')
        && let Ok(id) = id.parse::<i64>()
    {
        return UpdateSubDepartmentInput {
            id: Some(id),
            name: name.to_string(),
        };
    }
    UpdateSubDepartmentInput {
        id: None,
        name: arg.to_string(),
    }
}

fn print_page(page: &app::models::DepartmentPage) {
    for dept in &page.departments {
        print_department(dept);
    }
    println!(
        "Page {}/{} ({} departments total)",
        page.page,
        page.total_pages.max(1),
        page.total
    );
}

fn print_department(dept: &Department) {
    println!("{:>5}  {}", dept.id, dept.name);
    for sub in &dept.sub_departments {
        println!("{:>5}    - {}", sub.id, sub.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sub_arg_with_id() {
        let sub = parse_sub_arg("4:Backend");
        assert_eq!(sub.id, Some(4));
        assert_eq!(sub.name, "Backend");
    }

    #[test]
    fn test_parse_sub_arg_without_id() {
        let sub = parse_sub_arg("Platform");
        assert_eq!(sub.id, None);
        assert_eq!(sub.name, "Platform");
    }

    #[test]
    fn test_parse_sub_arg_colon_without_numeric_prefix() {
        let sub = parse_sub_arg("Ops: Night Shift");
        assert_eq!(sub.id, None);
        assert_eq!(sub.name, "Ops: Night Shift");
    }
}
