//! Transaction ledger operations for a logged-in user.
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::info;

use crate::domain::balance_service::BalanceService;
use crate::domain::commands::transactions::{
    AppendTransactionsResult, DeleteTransactionCommand, NewTransactionCommand,
};
use crate::domain::errors::{FinanceError, FinanceResult};
use crate::domain::models::report::LedgerSummary;
use crate::domain::models::transaction::{Transaction, DEFAULT_CATEGORY};
use crate::domain::models::user::Session;
use crate::storage::{Connection, LedgerStorage};

#[derive(Clone)]
pub struct LedgerService<C: Connection> {
    ledger_repository: C::LedgerRepository,
    balance_service: BalanceService,
}

impl<C: Connection> LedgerService<C> {
    pub fn new(connection: Arc<C>, balance_service: BalanceService) -> Self {
        let ledger_repository = connection.create_ledger_repository();
        Self {
            ledger_repository,
            balance_service,
        }
    }

    /// Append records to the end of the session user's ledger; missing dates become today
    pub async fn append(
        &self,
        session: &Session,
        commands: Vec<NewTransactionCommand>,
    ) -> FinanceResult<AppendTransactionsResult> {
        self.append_on(session, commands, Local::now().date_naive()).await
    }

    pub(crate) async fn append_on(
        &self,
        session: &Session,
        commands: Vec<NewTransactionCommand>,
        today: NaiveDate,
    ) -> FinanceResult<AppendTransactionsResult> {
        let now_millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let transactions = commands
            .into_iter()
            .map(|command| Self::build_transaction(command, today, now_millis))
            .collect::<FinanceResult<Vec<_>>>()?;

        if transactions.is_empty() {
            return Ok(AppendTransactionsResult { transactions });
        }

        self.ledger_repository
            .append_transactions(&session.username, &transactions)
            .await?;

        info!(
            "Appended {} transaction(s) to the ledger of {}",
            transactions.len(),
            session.username
        );
        Ok(AppendTransactionsResult { transactions })
    }

    /// The whole ledger in insertion order; empty if the user has none
    pub async fn read_all(&self, session: &Session) -> FinanceResult<Vec<Transaction>> {
        Ok(self
            .ledger_repository
            .read_transactions(&session.username)
            .await?)
    }

    /// Delete one entry. Returns false when nothing matched
    pub async fn delete(
        &self,
        session: &Session,
        command: DeleteTransactionCommand,
    ) -> FinanceResult<bool> {
        let deleted = match &command {
            DeleteTransactionCommand::ById(id) => {
                self.ledger_repository
                    .delete_transaction(&session.username, id)
                    .await?
            }
            DeleteTransactionCommand::ByPosition(position) => {
                self.ledger_repository
                    .delete_transaction_at(&session.username, *position)
                    .await?
            }
        };

        if deleted {
            info!("Deleted {:?} from the ledger of {}", command, session.username);
        }
        Ok(deleted)
    }

    pub async fn delete_at(&self, session: &Session, position: usize) -> FinanceResult<bool> {
        self.delete(session, DeleteTransactionCommand::ByPosition(position))
            .await
    }

    pub async fn delete_by_id(&self, session: &Session, id: &str) -> FinanceResult<bool> {
        self.delete(session, DeleteTransactionCommand::ById(id.to_string()))
            .await
    }

    /// Income, expense and balance over the whole ledger
    pub async fn summary(&self, session: &Session) -> FinanceResult<LedgerSummary> {
        let transactions = self.read_all(session).await?;
        Ok(self.balance_service.summarize(&transactions))
    }

    fn build_transaction(
        command: NewTransactionCommand,
        today: NaiveDate,
        now_millis: u64,
    ) -> FinanceResult<Transaction> {
        if !command.amount.is_finite() {
            return Err(FinanceError::InvalidInput(format!(
                "amount must be a finite number, got {}",
                command.amount
            )));
        }

        let category = command.category.trim();
        Ok(Transaction {
            id: Transaction::generate_id(command.amount, now_millis),
            date: Some(command.date.unwrap_or(today)),
            category: if category.is_empty() {
                DEFAULT_CATEGORY.to_string()
            } else {
                category.to_string()
            },
            note: command.note.trim().to_string(),
            amount: command.amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;
    use crate::storage::csv::CsvConnection;
    use std::fs;

    async fn setup_test_service() -> (LedgerService<CsvConnection>, TestEnvironment) {
        let env = TestEnvironment::new().await.unwrap();
        let service = LedgerService::new(Arc::new(env.connection.clone()), BalanceService::new());
        (service, env)
    }

    fn command(category: &str, amount: f64, date: Option<NaiveDate>) -> NewTransactionCommand {
        NewTransactionCommand {
            date,
            category: category.to_string(),
            note: String::new(),
            amount,
        }
    }

    fn session(username: &str) -> Session {
        Session::new(username, false)
    }

    #[tokio::test]
    async fn test_append_then_read_preserves_order_and_amounts() {
        let (service, _env) = setup_test_service().await;
        let alice = session("alice");
        let march_first = NaiveDate::from_ymd_opt(2024, 3, 1);

        service
            .append(&alice, vec![command("Salary", 100000.0, march_first)])
            .await
            .unwrap();
        service
            .append(
                &alice,
                vec![
                    command("Food", -25000.0, march_first),
                    command("Transport", -5000.0, march_first),
                ],
            )
            .await
            .unwrap();

        let transactions = service.read_all(&alice).await.unwrap();
        let amounts: Vec<f64> = transactions.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![100000.0, -25000.0, -5000.0]);
        assert!(transactions.iter().all(|t| t.date == march_first));
    }

    #[tokio::test]
    async fn test_append_defaults() {
        let (service, _env) = setup_test_service().await;
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let result = service
            .append_on(&session("alice"), vec![command("  ", -1.5, None)], today)
            .await
            .unwrap();

        let transaction = &result.transactions[0];
        assert_eq!(transaction.date, Some(today));
        assert_eq!(transaction.category, DEFAULT_CATEGORY);
        assert!(transaction.id.starts_with("ex-"));
    }

    #[tokio::test]
    async fn test_append_rejects_non_finite_amount_without_writing() {
        let (service, env) = setup_test_service().await;
        let result = service
            .append(
                &session("alice"),
                vec![command("Food", -1.0, None), command("Food", f64::NAN, None)],
            )
            .await;

        assert!(matches!(result, Err(FinanceError::InvalidInput(_))));
        assert!(!env.connection.ledger_file_path("alice").exists());
    }

    #[tokio::test]
    async fn test_empty_append_is_a_no_op() {
        let (service, env) = setup_test_service().await;
        let result = service.append(&session("alice"), vec![]).await.unwrap();
        assert!(result.transactions.is_empty());
        assert!(!env.connection.ledger_file_path("alice").exists());
    }

    #[tokio::test]
    async fn test_delete_at_bounds() {
        let (service, env) = setup_test_service().await;
        let alice = session("alice");
        service
            .append(
                &alice,
                vec![command("A", 1.0, None), command("B", 2.0, None), command("C", 3.0, None)],
            )
            .await
            .unwrap();
        let before = fs::read(env.connection.ledger_file_path("alice")).unwrap();

        assert!(!service.delete_at(&alice, 3).await.unwrap());
        assert_eq!(fs::read(env.connection.ledger_file_path("alice")).unwrap(), before);

        assert!(service.delete_at(&alice, 1).await.unwrap());
        let categories: Vec<String> = service
            .read_all(&alice)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.category)
            .collect();
        assert_eq!(categories, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_delete_at_missing_ledger() {
        let (service, _env) = setup_test_service().await;
        assert!(!service.delete_at(&session("nobody"), 0).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let (service, _env) = setup_test_service().await;
        let alice = session("alice");
        let appended = service
            .append(&alice, vec![command("A", 1.0, None), command("B", 2.0, None)])
            .await
            .unwrap();

        let id = appended.transactions[0].id.clone();
        assert!(service.delete_by_id(&alice, &id).await.unwrap());
        assert!(!service.delete_by_id(&alice, &id).await.unwrap());

        let remaining = service.read_all(&alice).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].category, "B");
    }

    #[tokio::test]
    async fn test_ledgers_are_per_user() {
        let (service, _env) = setup_test_service().await;
        service
            .append(&session("alice"), vec![command("A", 1.0, None)])
            .await
            .unwrap();

        assert!(service.read_all(&session("bob")).await.unwrap().is_empty());
        assert_eq!(service.read_all(&session("alice")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_summary() {
        let (service, _env) = setup_test_service().await;
        let alice = session("alice");
        service
            .append(
                &alice,
                vec![command("Salary", 100000.0, None), command("Food", -30000.0, None)],
            )
            .await
            .unwrap();

        let summary = service.summary(&alice).await.unwrap();
        assert_eq!(summary.total_income, 100000.0);
        assert_eq!(summary.total_expense, 30000.0);
        assert_eq!(summary.balance, 70000.0);
    }
}
