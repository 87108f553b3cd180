use crate::domain::commands::transactions::NewTransactionCommand;
use crate::domain::models::transaction::{
    Transaction as DomainTransaction, TransactionType as DomainTransactionType,
};
use shared::{
    NewTransaction, Transaction as SharedTransaction, TransactionType as SharedTransactionType,
};

pub struct TransactionMapper;

impl TransactionMapper {
    pub fn to_dto(domain: DomainTransaction) -> SharedTransaction {
        let transaction_type = Self::to_dto_type(domain.transaction_type());
        SharedTransaction {
            id: domain.id,
            date: domain.date,
            category: domain.category,
            note: domain.note,
            amount: domain.amount,
            transaction_type,
        }
    }

    pub fn to_command(dto: NewTransaction) -> NewTransactionCommand {
        NewTransactionCommand {
            date: dto.date,
            category: dto.category,
            note: dto.note,
            amount: dto.amount,
        }
    }

    fn to_dto_type(domain_type: DomainTransactionType) -> SharedTransactionType {
        match domain_type {
            DomainTransactionType::Income => SharedTransactionType::Income,
            DomainTransactionType::Expense => SharedTransactionType::Expense,
        }
    }
}
