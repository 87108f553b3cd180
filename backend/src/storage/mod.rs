//! # Storage Module
//!
//! Data persistence for the finance tracker. The domain layer only sees the
//! traits in [`traits`]; [`csv`] implements them over plain files in the data
//! directory.

pub mod csv;
pub mod traits;

pub use self::csv::CsvConnection;
pub use traits::{Connection, CredentialStorage, LedgerStorage};
