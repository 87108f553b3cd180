//! Registration, login and the in-process session registry.
//!
//! Sessions are explicit values keyed by an opaque token. Each one carries a
//! cached copy of the user's premium flag, refreshed by `upgrade` or `refresh`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::errors::{FinanceError, FinanceResult};
use crate::domain::models::user::{Session, User};
use crate::storage::{Connection, CredentialStorage};

#[derive(Clone)]
pub struct AuthService<C: Connection> {
    credential_repository: C::CredentialRepository,
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl<C: Connection> AuthService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        let credential_repository = connection.create_credential_repository();
        Self {
            credential_repository,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a new, non-premium user
    pub async fn register(&self, username: &str, password: &str) -> FinanceResult<()> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(FinanceError::InvalidInput(
                "username and password are required".to_string(),
            ));
        }

        let inserted = self
            .credential_repository
            .insert_user(&User::new(username, password))
            .await?;
        if !inserted {
            info!("Registration rejected, username {} already exists", username);
            return Err(FinanceError::UserExists);
        }

        info!("Registered user {}", username);
        Ok(())
    }

    /// Check credentials and open a session
    pub async fn login(&self, username: &str, password: &str) -> FinanceResult<Session> {
        let user = match self.credential_repository.get_user(username).await? {
            Some(user) if user.password == password => user,
            _ => {
                warn!("Failed login attempt for {}", username);
                return Err(FinanceError::LoginFailed);
            }
        };

        let session = Session::new(user.username, user.is_premium);
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.clone());

        info!("User {} logged in (premium: {})", session.username, session.is_premium);
        Ok(session)
    }

    /// Close a session. Unknown tokens are ignored; returns whether one was removed
    pub async fn logout(&self, token: &str) -> bool {
        match self.sessions.write().await.remove(token) {
            Some(session) => {
                info!("User {} logged out", session.username);
                true
            }
            None => false,
        }
    }

    /// Look up the session for a token
    pub async fn session(&self, token: &str) -> FinanceResult<Session> {
        self.sessions
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(FinanceError::NoSession)
    }

    /// Cached premium flag of a session; false when there is none
    pub async fn is_premium(&self, token: &str) -> bool {
        self.sessions
            .read()
            .await
            .get(token)
            .map(|session| session.is_premium)
            .unwrap_or(false)
    }

    /// Grant premium to the session's user and update the cached copy
    pub async fn upgrade(&self, token: &str) -> FinanceResult<Session> {
        let session = self.session(token).await?;

        if !self
            .credential_repository
            .set_premium(&session.username, true)
            .await?
        {
            warn!("Upgrade for {} failed, user no longer exists", session.username);
            return Err(FinanceError::UserNotFound);
        }

        info!("User {} upgraded to premium", session.username);
        self.update_cached_flag(token, true).await
    }

    /// Re-read the persisted premium flag into the cached session
    pub async fn refresh(&self, token: &str) -> FinanceResult<Session> {
        let session = self.session(token).await?;
        let user = self
            .credential_repository
            .get_user(&session.username)
            .await?
            .ok_or(FinanceError::UserNotFound)?;

        if user.is_premium != session.is_premium {
            info!(
                "Premium flag of {} changed to {}",
                session.username, user.is_premium
            );
        }
        self.update_cached_flag(token, user.is_premium).await
    }

    /// Set the persisted premium flag for a username. Returns false if the user is unknown
    pub async fn mark_premium(&self, username: &str) -> FinanceResult<bool> {
        let updated = self.credential_repository.set_premium(username, true).await?;
        if updated {
            info!("Persisted premium flag for {}", username);
        }
        Ok(updated)
    }

    pub async fn user_exists(&self, username: &str) -> FinanceResult<bool> {
        Ok(self.credential_repository.get_user(username).await?.is_some())
    }

    async fn update_cached_flag(&self, token: &str, is_premium: bool) -> FinanceResult<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(token).ok_or(FinanceError::NoSession)?;
        session.is_premium = is_premium;
        Ok(session.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;
    use crate::storage::csv::CsvConnection;
    use std::fs;

    async fn setup_test_service() -> (AuthService<CsvConnection>, TestEnvironment) {
        let env = TestEnvironment::new().await.unwrap();
        let service = AuthService::new(Arc::new(env.connection.clone()));
        (service, env)
    }

    #[tokio::test]
    async fn test_duplicate_register_fails_and_store_is_mutated_once() {
        let (service, env) = setup_test_service().await;
        service.register("alice", "pw").await.unwrap();
        let before = fs::read_to_string(env.connection.users_file_path()).unwrap();

        let result = service.register("alice", "other").await;
        assert!(matches!(result, Err(FinanceError::UserExists)));

        let after = fs::read_to_string(env.connection.users_file_path()).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_register_rejects_blank_credentials() {
        let (service, _env) = setup_test_service().await;
        assert!(matches!(
            service.register("  ", "pw").await,
            Err(FinanceError::InvalidInput(_))
        ));
        assert!(matches!(
            service.register("alice", "").await,
            Err(FinanceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_login_failures_create_no_session() {
        let (service, _env) = setup_test_service().await;
        service.register("alice", "pw").await.unwrap();

        assert!(matches!(
            service.login("alice", "wrong").await,
            Err(FinanceError::LoginFailed)
        ));
        assert!(matches!(
            service.login("nobody", "pw").await,
            Err(FinanceError::LoginFailed)
        ));
        assert!(service.sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let (service, _env) = setup_test_service().await;
        service.register("alice", "pw").await.unwrap();

        let session = service.login("alice", "pw").await.unwrap();
        assert_eq!(session.username, "alice");
        assert!(!session.is_premium);
        assert_eq!(service.session(&session.token).await.unwrap(), session);

        assert!(service.logout(&session.token).await);
        assert!(!service.logout(&session.token).await);
        assert!(matches!(
            service.session(&session.token).await,
            Err(FinanceError::NoSession)
        ));
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let (service, _env) = setup_test_service().await;
        service.register("alice", "pw").await.unwrap();
        service.register("bob", "pw").await.unwrap();

        let alice = service.login("alice", "pw").await.unwrap();
        let bob = service.login("bob", "pw").await.unwrap();
        assert_ne!(alice.token, bob.token);

        service.upgrade(&alice.token).await.unwrap();
        assert!(service.is_premium(&alice.token).await);
        assert!(!service.is_premium(&bob.token).await);
    }

    #[tokio::test]
    async fn test_upgrade_persists_and_updates_cached_flag() {
        let (service, _env) = setup_test_service().await;
        service.register("alice", "pw").await.unwrap();
        let session = service.login("alice", "pw").await.unwrap();

        let upgraded = service.upgrade(&session.token).await.unwrap();
        assert!(upgraded.is_premium);
        assert!(service.is_premium(&session.token).await);

        let relogin = service.login("alice", "pw").await.unwrap();
        assert!(relogin.is_premium);
    }

    #[tokio::test]
    async fn test_upgrade_without_session() {
        let (service, _env) = setup_test_service().await;
        assert!(matches!(
            service.upgrade("missing").await,
            Err(FinanceError::NoSession)
        ));
        assert!(!service.is_premium("missing").await);
    }

    #[tokio::test]
    async fn test_refresh_picks_up_out_of_band_upgrade() {
        let (service, _env) = setup_test_service().await;
        service.register("alice", "pw").await.unwrap();
        let session = service.login("alice", "pw").await.unwrap();

        assert!(service.mark_premium("alice").await.unwrap());
        assert!(!service.is_premium(&session.token).await);

        let refreshed = service.refresh(&session.token).await.unwrap();
        assert!(refreshed.is_premium);
        assert!(service.is_premium(&session.token).await);
    }

    #[tokio::test]
    async fn test_mark_premium_unknown_user() {
        let (service, _env) = setup_test_service().await;
        assert!(!service.mark_premium("ghost").await.unwrap());
        assert!(!service.user_exists("ghost").await.unwrap());
    }
}
