//! File-backed storage: a JSON credential store and one CSV ledger per user.

pub mod connection;
pub mod credential_repository;
pub mod ledger_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::CsvConnection;
pub use credential_repository::CredentialRepository;
pub use ledger_repository::LedgerRepository;
