use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use csv::{ReaderBuilder, StringRecord, Writer};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::connection::CsvConnection;
use crate::domain::models::transaction::Transaction;
use crate::storage::traits::LedgerStorage;

const HEADER: [&str; 5] = ["Id", "Amount", "Note", "Date", "Category"];

/// CSV-backed ledger, one file per user.
///
/// Each mutation loads the whole file, changes it in memory and rewrites it
/// through [`CsvConnection::write_atomically`].
#[derive(Clone)]
pub struct LedgerRepository {
    connection: CsvConnection,
}

/// Column positions discovered from a ledger header
struct LedgerColumns {
    id: Option<usize>,
    amount: usize,
    note: Option<usize>,
    date: Option<usize>,
    category: Option<usize>,
}

impl LedgerColumns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(name))
        };
        let amount = find("Amount").ok_or_else(|| anyhow!("Ledger has no Amount column"))?;
        Ok(Self {
            id: find("Id"),
            amount,
            note: find("Note"),
            date: find("Date"),
            category: find("Category"),
        })
    }
}

impl LedgerRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Parse ledger file contents. Cells that fail to parse are coerced rather than
    /// rejected: dates to `None`, amounts to 0. Structural problems are errors.
    pub fn parse_ledger(contents: &[u8]) -> Result<Vec<Transaction>> {
        if contents.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new().flexible(true).from_reader(contents);
        let headers = reader.headers().context("Unreadable ledger header")?.clone();
        let columns = LedgerColumns::from_headers(&headers)?;
        let cell = |record: &StringRecord, column: Option<usize>| -> String {
            column
                .and_then(|index| record.get(index))
                .unwrap_or("")
                .to_string()
        };

        let mut transactions = Vec::new();
        for (position, result) in reader.records().enumerate() {
            let record = result.with_context(|| format!("Malformed ledger row {}", position))?;

            let raw_amount = record.get(columns.amount).unwrap_or("").trim();
            let amount = match raw_amount.parse::<f64>() {
                Ok(value) if value.is_finite() => value,
                _ => {
                    warn!("Ledger row {} has invalid amount '{}', using 0", position, raw_amount);
                    0.0
                }
            };

            transactions.push(Transaction {
                id: cell(&record, columns.id),
                date: Transaction::parse_date(&cell(&record, columns.date)),
                category: cell(&record, columns.category),
                note: cell(&record, columns.note),
                amount,
            });
        }

        // Blank ids become `legacy-<n>`, skipping any id already present in the file
        let mut taken: HashSet<String> = transactions
            .iter()
            .filter(|t| !t.id.trim().is_empty())
            .map(|t| t.id.clone())
            .collect();
        for (position, transaction) in transactions.iter_mut().enumerate() {
            if !transaction.id.trim().is_empty() {
                continue;
            }
            let mut candidate = position;
            let mut id = Transaction::legacy_id(candidate);
            while taken.contains(&id) {
                candidate += 1;
                id = Transaction::legacy_id(candidate);
            }
            taken.insert(id.clone());
            transaction.id = id;
        }

        Ok(transactions)
    }

    /// Serialize a ledger to CSV bytes, header included
    pub fn serialize_ledger(transactions: &[Transaction]) -> Result<Vec<u8>> {
        let mut writer = Writer::from_writer(Vec::new());
        writer.write_record(HEADER)?;
        for transaction in transactions {
            let amount = transaction.amount.to_string();
            let date = Transaction::format_date(transaction.date);
            writer.write_record([
                transaction.id.as_str(),
                amount.as_str(),
                transaction.note.as_str(),
                date.as_str(),
                transaction.category.as_str(),
            ])?;
        }
        writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush ledger: {}", e))
    }

    /// Load a ledger file, distinguishing "absent" from "unreadable"
    fn load(path: &Path) -> Result<Option<Vec<Transaction>>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents =
            fs::read(path).with_context(|| format!("Unable to read {}", path.display()))?;
        Self::parse_ledger(&contents).map(Some)
    }

    /// Load a ledger, treating an unreadable file as empty
    fn load_or_empty(path: &Path) -> Vec<Transaction> {
        match Self::load(path) {
            Ok(Some(transactions)) => transactions,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Ledger {} is unreadable, treating it as empty: {:#}", path.display(), e);
                Vec::new()
            }
        }
    }

    fn write(&self, path: &Path, transactions: &[Transaction]) -> Result<()> {
        let bytes = Self::serialize_ledger(transactions)?;
        self.connection.write_atomically(path, &bytes)?;
        debug!("Wrote {} transactions to {}", transactions.len(), path.display());
        Ok(())
    }
}

#[async_trait]
impl LedgerStorage for LedgerRepository {
    async fn read_transactions(&self, username: &str) -> Result<Vec<Transaction>> {
        let path = self.connection.ledger_file_path(username);
        Ok(Self::load_or_empty(&path))
    }

    async fn append_transactions(
        &self,
        username: &str,
        transactions: &[Transaction],
    ) -> Result<()> {
        let _guard = self.connection.ledger_lock().lock().await;
        let path = self.connection.ledger_file_path(username);

        let mut ledger = Self::load_or_empty(&path);
        ledger.extend_from_slice(transactions);

        self.write(&path, &ledger).map_err(|e| {
            warn!("Failed to save ledger for {}: {:#}", username, e);
            e
        })?;
        info!("Appended {} transactions for {}", transactions.len(), username);
        Ok(())
    }

    async fn delete_transaction_at(&self, username: &str, position: usize) -> Result<bool> {
        let _guard = self.connection.ledger_lock().lock().await;
        let path = self.connection.ledger_file_path(username);

        let mut ledger = match Self::load(&path) {
            Ok(Some(ledger)) => ledger,
            Ok(None) => return Ok(false),
            Err(e) => {
                warn!("Cannot delete from unreadable ledger {}: {:#}", path.display(), e);
                return Ok(false);
            }
        };

        if position >= ledger.len() {
            debug!("Position {} out of range for ledger of {}", position, ledger.len());
            return Ok(false);
        }

        let removed = ledger.remove(position);
        self.write(&path, &ledger)?;
        info!("Deleted transaction {} at position {} for {}", removed.id, position, username);
        Ok(true)
    }

    async fn delete_transaction(&self, username: &str, transaction_id: &str) -> Result<bool> {
        let _guard = self.connection.ledger_lock().lock().await;
        let path = self.connection.ledger_file_path(username);

        let mut ledger = match Self::load(&path) {
            Ok(Some(ledger)) => ledger,
            Ok(None) => return Ok(false),
            Err(e) => {
                warn!("Cannot delete from unreadable ledger {}: {:#}", path.display(), e);
                return Ok(false);
            }
        };

        let Some(position) = ledger.iter().position(|t| t.id == transaction_id) else {
            return Ok(false);
        };
        ledger.remove(position);

        self.write(&path, &ledger)?;
        info!("Deleted transaction {} for {}", transaction_id, username);
        Ok(true)
    }
}
