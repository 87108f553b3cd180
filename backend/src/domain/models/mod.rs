pub mod payment;
pub mod report;
pub mod transaction;
pub mod user;
