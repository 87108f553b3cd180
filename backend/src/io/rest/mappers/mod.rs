pub mod payment_mapper;
pub mod report_mapper;
pub mod transaction_mapper;
