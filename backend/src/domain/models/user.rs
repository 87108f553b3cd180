//! Domain models for users and login sessions.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user. Passwords are stored and compared as plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
    pub is_premium: bool,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            is_premium: false,
        }
    }
}

/// An authenticated session, passed explicitly into every ledger and report operation.
///
/// `is_premium` is a cached copy taken at login; it is only refreshed by an upgrade
/// through this session or an explicit refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub is_premium: bool,
}

impl Session {
    pub fn new(username: impl Into<String>, is_premium: bool) -> Self {
        Self {
            token: Self::generate_token(),
            username: username.into(),
            is_premium,
        }
    }

    pub fn generate_token() -> String {
        Uuid::new_v4().to_string()
    }
}
