use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::storage::csv::credential_repository::CredentialRepository;
use crate::storage::csv::ledger_repository::LedgerRepository;
use crate::storage::traits::Connection;

const USERS_FILE: &str = "users.json";
const TRANSACTIONS_DIR: &str = "transactions";
const REPORTS_DIR: &str = "reports";

/// CsvConnection owns the data directory layout and the in-process write locks.
///
/// Layout:
/// ```text
/// <base>/users.json
/// <base>/transactions/user_<encoded username>.csv
/// <base>/reports/
/// ```
///
/// Clones share the same locks, so every repository created from one connection
/// serializes its read-modify-write cycles against the others. Separate processes
/// touching the same directory are not coordinated.
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
    credentials_lock: Arc<Mutex<()>>,
    ledger_lock: Arc<Mutex<()>>,
}

impl CsvConnection {
    /// Create a new connection rooted at `base_directory`, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).with_context(|| {
                format!("Unable to create data directory {}", base_path.display())
            })?;
            info!("Created data directory {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
            credentials_lock: Arc::new(Mutex::new(())),
            ledger_lock: Arc::new(Mutex::new(())),
        })
    }

    /// The default data directory: `~/Documents/Finance Tracker`
    pub fn default_directory() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        Ok(home.join("Documents").join("Finance Tracker"))
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn users_file_path(&self) -> PathBuf {
        self.base_directory.join(USERS_FILE)
    }

    pub fn transactions_directory(&self) -> PathBuf {
        self.base_directory.join(TRANSACTIONS_DIR)
    }

    pub fn reports_directory(&self) -> PathBuf {
        self.base_directory.join(REPORTS_DIR)
    }

    /// Path of a user's ledger file
    pub fn ledger_file_path(&self, username: &str) -> PathBuf {
        self.transactions_directory()
            .join(format!("user_{}.csv", Self::encode_file_stem(username)))
    }

    /// Encode a username into a file-name-safe stem.
    ///
    /// `[A-Za-z0-9_-]` pass through; every other byte becomes `~XX`. The mapping is
    /// injective, so two usernames never share a ledger, and no encoded name can
    /// contain a path separator.
    pub fn encode_file_stem(username: &str) -> String {
        let mut encoded = String::with_capacity(username.len());
        for byte in username.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
                encoded.push(byte as char);
            } else {
                encoded.push_str(&format!("~{:02X}", byte));
            }
        }
        encoded
    }

    pub(crate) fn credentials_lock(&self) -> &Arc<Mutex<()>> {
        &self.credentials_lock
    }

    pub(crate) fn ledger_lock(&self) -> &Arc<Mutex<()>> {
        &self.ledger_lock
    }

    /// Replace `path` with `contents` by writing a sibling temp file and renaming it
    /// over the target. A crash mid-write leaves the previous file intact.
    pub fn write_atomically(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Unable to create directory {}", parent.display()))?;
            }
        }

        let mut temp_name = path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        if let Err(e) = fs::write(&temp_path, contents) {
            warn!("Failed to write temp file {}: {}", temp_path.display(), e);
            return Err(e).with_context(|| format!("Unable to write {}", temp_path.display()));
        }

        fs::rename(&temp_path, path).with_context(|| {
            format!(
                "Unable to move {} into place at {}",
                temp_path.display(),
                path.display()
            )
        })
    }
}

impl Connection for CsvConnection {
    type CredentialRepository = CredentialRepository;
    type LedgerRepository = LedgerRepository;

    fn create_credential_repository(&self) -> Self::CredentialRepository {
        CredentialRepository::new(self.clone())
    }

    fn create_ledger_repository(&self) -> Self::LedgerRepository {
        LedgerRepository::new(self.clone())
    }
}
