//! User and authentication payload wire types.

use serde::{Deserialize, Serialize};

/// A user account as returned by Login and RegisterUser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// Successful Login result. The wire field is `access_token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub access_token: String,
    pub user: User,
}

/// Input for the RegisterUser mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
}
