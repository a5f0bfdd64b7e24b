pub mod auth;
pub mod contact;
pub mod debt;
pub mod payment;
pub mod schedule;
