pub mod auth;
pub mod contacts;
pub mod debts;
pub mod payments;
