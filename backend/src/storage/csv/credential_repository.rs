use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use tracing::{info, warn};

use super::connection::CsvConnection;
use crate::domain::models::user::User;
use crate::storage::traits::CredentialStorage;

/// One entry of `users.json`, keyed by username
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    password: String,
    #[serde(default)]
    is_premium: bool,
}

type UserFile = BTreeMap<String, StoredUser>;

/// JSON credential store: a single `users.json` document mapping usernames to
/// `{password, is_premium}`.
///
/// A missing file is created as `{}`. A corrupt file is reset to `{}` and the
/// condition is logged; it is never surfaced to callers. Every access holds the
/// connection's credentials lock because any load may write.
#[derive(Clone)]
pub struct CredentialRepository {
    connection: CsvConnection,
}

impl CredentialRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn load_users(&self) -> Result<UserFile> {
        let path = self.connection.users_file_path();

        if !path.exists() {
            info!("Credential file {} not found, creating an empty one", path.display());
            self.save_users(&UserFile::new())?;
            return Ok(UserFile::new());
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Unable to read credential file {}: {}", path.display(), e);
                return Ok(UserFile::new());
            }
        };

        match serde_json::from_str::<UserFile>(&content) {
            Ok(users) => Ok(users),
            Err(e) => {
                warn!(
                    "Credential file {} is corrupt ({}), resetting it to an empty store",
                    path.display(),
                    e
                );
                self.save_users(&UserFile::new())?;
                Ok(UserFile::new())
            }
        }
    }

    fn save_users(&self, users: &UserFile) -> Result<()> {
        let path = self.connection.users_file_path();
        let json = serde_json::to_string_pretty(users).context("Failed to serialize users")?;
        self.connection.write_atomically(&path, json.as_bytes())
    }
}

#[async_trait]
impl CredentialStorage for CredentialRepository {
    async fn get_user(&self, username: &str) -> Result<Option<User>> {
        // Loading may create or reset the file, so readers take the writer lock too
        let _guard = self.connection.credentials_lock().lock().await;
        let users = self.load_users()?;
        Ok(users.get(username).map(|stored| User {
            username: username.to_string(),
            password: stored.password.clone(),
            is_premium: stored.is_premium,
        }))
    }

    async fn insert_user(&self, user: &User) -> Result<bool> {
        let _guard = self.connection.credentials_lock().lock().await;
        let mut users = self.load_users()?;

        if users.contains_key(&user.username) {
            return Ok(false);
        }

        users.insert(
            user.username.clone(),
            StoredUser {
                password: user.password.clone(),
                is_premium: user.is_premium,
            },
        );
        self.save_users(&users)?;
        Ok(true)
    }

    async fn set_premium(&self, username: &str, is_premium: bool) -> Result<bool> {
        let _guard = self.connection.credentials_lock().lock().await;
        let mut users = self.load_users()?;

        let Some(stored) = users.get_mut(username) else {
            return Ok(false);
        };
        stored.is_premium = is_premium;
        self.save_users(&users)?;
        Ok(true)
    }
}
