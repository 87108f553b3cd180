//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::transaction::Transaction;
use crate::domain::models::user::User;

/// Trait defining the interface for credential storage operations
///
/// Every mutation is a full read-modify-write of the backing store.
#[async_trait]
pub trait CredentialStorage: Send + Sync {
    /// Look up a user by username
    async fn get_user(&self, username: &str) -> Result<Option<User>>;

    /// Insert a new user
    /// Returns false (and leaves the store untouched) if the username is taken
    async fn insert_user(&self, user: &User) -> Result<bool>;

    /// Set the persisted premium flag of a user
    /// Returns false if the user does not exist
    async fn set_premium(&self, username: &str, is_premium: bool) -> Result<bool>;
}

/// Trait defining the interface for per-user ledger storage operations
///
/// Read failures degrade to an empty ledger; they are logged, never returned.
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Read a user's whole ledger in insertion order
    async fn read_transactions(&self, username: &str) -> Result<Vec<Transaction>>;

    /// Append transactions to the end of a user's ledger
    async fn append_transactions(&self, username: &str, transactions: &[Transaction]) -> Result<()>;

    /// Delete the entry at `position`
    /// Returns false for a missing file or an out-of-range position
    async fn delete_transaction_at(&self, username: &str, position: usize) -> Result<bool>;

    /// Delete the entry with the given id
    /// Returns true if the transaction was found and deleted, false otherwise
    async fn delete_transaction(&self, username: &str, transaction_id: &str) -> Result<bool>;
}

/// Trait defining the interface for storage connections
///
/// This trait abstracts away the specific connection type and provides factory
/// methods for creating repositories, so the domain layer works with any storage
/// backend without knowing the implementation details.
pub trait Connection: Send + Sync + Clone {
    /// The type of CredentialStorage this connection creates
    type CredentialRepository: CredentialStorage + Clone;

    /// The type of LedgerStorage this connection creates
    type LedgerRepository: LedgerStorage + Clone;

    fn create_credential_repository(&self) -> Self::CredentialRepository;

    fn create_ledger_repository(&self) -> Self::LedgerRepository;
}
