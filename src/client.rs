//! GraphQL gateway client.

use crate::credentials::CredentialStore;
use crate::error::{AppError, Result};
use crate::models::{
    AuthPayload, CreateDepartmentInput, Department, DepartmentPage, RegisterInput,
    UpdateDepartmentInput, User,
};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const LOGIN_MUTATION: &str = r#"
mutation Login($username: String!, $password: String!) {
  Login(username: $username, password: $password) {
    access_token
    user { id username }
  }
}"#;

const REGISTER_USER_MUTATION: &str = r#"
mutation RegisterUser($input: CreateUserInput!) {
  RegisterUser(input: $input) { id username }
}"#;

const GET_DEPARTMENTS_QUERY: &str = r#"
query GetDepartments($page: Int!, $limit: Int!) {
  GetDepartments(page: $page, limit: $limit) {
    departments { id name subDepartments { id name } }
    total
    page
    limit
    totalPages
  }
}"#;

const CREATE_DEPARTMENT_MUTATION: &str = r#"
mutation CreateDepartment($input: CreateDepartmentInput!) {
  CreateDepartment(input: $input) {
    id name subDepartments { id name }
  }
}"#;

const UPDATE_DEPARTMENT_MUTATION: &str = r#"
mutation UpdateDepartment($input: UpdateDepartmentInput!) {
  UpdateDepartment(input: $input) {
    id name subDepartments { id name }
  }
}"#;

const DELETE_DEPARTMENT_MUTATION: &str = r#"
mutation DeleteDepartment($id: Int!) {
  DeleteDepartment(id: $id)
}"#;

/// Server-reported GraphQL error.
#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(default)]
    extensions: Option<GraphQlExtensions>,
}

#[derive(Debug, Deserialize)]
struct GraphQlExtensions {
    #[serde(default)]
    code: Option<String>,
}

/// GraphQL-over-HTTP response envelope.
#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

/// Department directory operations, as a seam for tests and
/// transport-free callers.
#[allow(async_fn_in_trait)]
pub trait DepartmentApi {
    async fn get_departments(&self, page: u32, limit: u32) -> Result<DepartmentPage>;
    async fn create_department(&self, input: CreateDepartmentInput) -> Result<Department>;
    async fn update_department(&self, input: UpdateDepartmentInput) -> Result<Department>;
    async fn delete_department(&self, id: i64) -> Result<bool>;
}

/// Account operations, split out so the auth flow is testable without
/// a live endpoint.
#[allow(async_fn_in_trait)]
pub trait AuthApi {
    async fn login(&self, username: &str, password: &str) -> Result<AuthPayload>;
    async fn register(&self, input: RegisterInput) -> Result<User>;
}

/// Client for the remote department directory.
///
/// One long-lived HTTP client configured against a single GraphQL
/// endpoint. The current credential is read from the injected store on
/// every request and attached as a bearer authorization header; writes
/// always go to the network and nothing is retried automatically.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: String,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `endpoint` - The GraphQL endpoint URL
    /// * `timeout` - Per-request timeout
    /// * `credentials` - Shared credential store, read per request
    pub fn new(endpoint: &str, timeout: Duration, credentials: Arc<dyn CredentialStore>) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Execute one GraphQL operation and return its `data` object.
    async fn execute(&self, query: &str, variables: Value) -> Result<Value> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }));

        if let Some(token) = self.credentials.get() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AppError::Unauthorized(
                "server rejected the credential".to_string(),
            ));
        }

        let envelope: GraphQlResponse = response.json().await?;
        extract_data(envelope)
    }

}

impl AuthApi for ApiClient {
    /// Authenticate and return the bearer token plus user.
    ///
    /// Does not store the token; see `AuthService` for the full flow.
    async fn login(&self, username: &str, password: &str) -> Result<AuthPayload> {
        debug!("Login as {username}");
        let data = self
            .execute(
                LOGIN_MUTATION,
                json!({ "username": username, "password": password }),
            )
            .await?;
        field(&data, "Login")
    }

    /// Register a new user account.
    async fn register(&self, input: RegisterInput) -> Result<User> {
        debug!("RegisterUser {}", input.username);
        let data = self
            .execute(REGISTER_USER_MUTATION, json!({ "input": input }))
            .await?;
        field(&data, "RegisterUser")
    }
}

impl DepartmentApi for ApiClient {
    async fn get_departments(&self, page: u32, limit: u32) -> Result<DepartmentPage> {
        debug!("GetDepartments page={page} limit={limit}");
        let data = self
            .execute(GET_DEPARTMENTS_QUERY, json!({ "page": page, "limit": limit }))
            .await?;
        field(&data, "GetDepartments")
    }

    async fn create_department(&self, input: CreateDepartmentInput) -> Result<Department> {
        debug!("CreateDepartment {}", input.name);
        let data = self
            .execute(CREATE_DEPARTMENT_MUTATION, json!({ "input": input }))
            .await?;
        field(&data, "CreateDepartment")
    }

    async fn update_department(&self, input: UpdateDepartmentInput) -> Result<Department> {
        debug!("UpdateDepartment id={}", input.id);
        let data = self
            .execute(UPDATE_DEPARTMENT_MUTATION, json!({ "input": input }))
            .await?;
        field(&data, "UpdateDepartment")
    }

    async fn delete_department(&self, id: i64) -> Result<bool> {
        debug!("DeleteDepartment id={id}");
        let data = self
            .execute(DELETE_DEPARTMENT_MUTATION, json!({ "id": id }))
            .await?;
        field(&data, "DeleteDepartment")
    }
}

/// Map a response envelope to its `data` object or a typed failure.
fn extract_data(envelope: GraphQlResponse) -> Result<Value> {
    if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
        let unauthorized = errors.iter().any(|e| {
            e.extensions
                .as_ref()
                .and_then(|ext| ext.code.as_deref())
                .is_some_and(|code| code == "UNAUTHENTICATED")
                || e.message.to_lowercase().contains("unauthorized")
        });

        let message = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");

        return if unauthorized {
            Err(AppError::Unauthorized(message))
        } else {
            Err(AppError::Api(message))
        };
    }

    envelope
        .data
        .ok_or_else(|| AppError::parse("response carried neither data nor errors"))
}

/// Deserialize one named operation result out of a `data` object.
fn field<T: DeserializeOwned>(data: &Value, name: &str) -> Result<T> {
    let value = data
        .get(name)
        .ok_or_else(|| AppError::parse(format!("missing field '{name}' in response data")))?;
    serde_json::from_value(value.clone())
        .map_err(|e| AppError::parse(format!("malformed '{name}' payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(body: &str) -> GraphQlResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_extract_data_ok() {
        let resp = envelope(r#"{"data": {"DeleteDepartment": true}}"#);
        let data = extract_data(resp).unwrap();
        assert_eq!(data["DeleteDepartment"], true);
    }

    #[test]
    fn test_extract_data_maps_unauthenticated_code() {
        let resp = envelope(
            r#"{"data": null, "errors": [{"message": "bad token", "extensions": {"code": "UNAUTHENTICATED"}}]}"#,
        );
        assert!(matches!(extract_data(resp), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_extract_data_maps_unauthorized_message() {
        let resp = envelope(r#"{"errors": [{"message": "Unauthorized"}]}"#);
        assert!(matches!(extract_data(resp), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_extract_data_joins_error_messages() {
        let resp = envelope(r#"{"errors": [{"message": "first"}, {"message": "second"}]}"#);
        match extract_data(resp) {
            Err(AppError::Api(msg)) => assert_eq!(msg, "first; second"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_data_empty_response_is_parse_error() {
        let resp = envelope(r#"{}"#);
        assert!(matches!(extract_data(resp), Err(AppError::Parse(_))));
    }

    #[test]
    fn test_field_deserializes_named_operation() {
        let data: Value = serde_json::from_str(
            r#"{"GetDepartments": {
                "departments": [{"id": 1, "name": "Engineering"}],
                "total": 1, "page": 1, "limit": 10, "totalPages": 1
            }}"#,
        )
        .unwrap();
        let page: DepartmentPage = field(&data, "GetDepartments").unwrap();
        assert_eq!(page.departments[0].name, "Engineering");
    }

    #[test]
    fn test_field_missing_is_parse_error() {
        let data: Value = serde_json::from_str(r#"{}"#).unwrap();
        let result: Result<bool> = field(&data, "DeleteDepartment");
        assert!(matches!(result, Err(AppError::Parse(_))));
    }

    mod transport {
        use super::super::*;
        use crate::credentials::MemoryTokenStore;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::{TcpListener, TcpStream};
        use tokio::sync::oneshot;

        /// Read one HTTP request, headers plus declared body.
        async fn read_request(socket: &mut TcpStream) -> String {
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);

                let text = String::from_utf8_lossy(&buf).into_owned();
                if let Some(pos) = text.find("\r\n\r\n") {
                    let content_length = text[..pos]
                        .to_lowercase()
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= pos + 4 + content_length {
                        return text;
                    }
                }
                if n == 0 {
                    return text;
                }
            }
        }

        /// Serve exactly one request with a canned status and JSON body,
        /// handing the captured request back through the channel.
        async fn serve_once(status: &str, body: &str) -> (String, oneshot::Receiver<String>) {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let endpoint = format!("http://{}", listener.local_addr().unwrap());
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );

            let (tx, rx) = oneshot::channel();
            tokio::spawn(async move {
                let (mut socket, _) = listener.accept().await.unwrap();
                let request = read_request(&mut socket).await;
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
                let _ = tx.send(request);
            });
            (endpoint, rx)
        }

        fn client_at(endpoint: &str, store: MemoryTokenStore) -> ApiClient {
            ApiClient::new(endpoint, Duration::from_secs(5), Arc::new(store))
        }

        #[tokio::test]
        async fn test_execute_attaches_bearer_header() {
            let (endpoint, request) =
                serve_once("200 OK", r#"{"data":{"DeleteDepartment":true}}"#).await;
            let client = client_at(&endpoint, MemoryTokenStore::with_token("tok-123"));

            assert!(client.delete_department(1).await.unwrap());

            let captured = request.await.unwrap().to_lowercase();
            assert!(captured.contains("authorization: bearer tok-123"));
            assert!(captured.contains("deletedepartment"));
        }

        #[tokio::test]
        async fn test_execute_without_token_sends_no_auth_header() {
            let (endpoint, request) =
                serve_once("200 OK", r#"{"data":{"DeleteDepartment":true}}"#).await;
            let client = client_at(&endpoint, MemoryTokenStore::new());

            assert!(client.delete_department(1).await.unwrap());

            let captured = request.await.unwrap().to_lowercase();
            assert!(!captured.contains("authorization:"));
        }

        #[tokio::test]
        async fn test_http_401_maps_to_unauthorized() {
            let (endpoint, _request) = serve_once("401 Unauthorized", "").await;
            let client = client_at(&endpoint, MemoryTokenStore::with_token("stale-token"));

            assert!(matches!(
                client.get_departments(1, 10).await,
                Err(AppError::Unauthorized(_))
            ));
        }
    }
}
