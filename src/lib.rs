pub mod auth;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod form;
pub mod models;
pub mod pagination;
pub mod session;
pub mod sync;

pub use error::{AppError, Result};
