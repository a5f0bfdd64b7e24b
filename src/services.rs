pub mod auth;
pub mod contact_service;
pub mod debt_service;
pub mod identity_bridge;
pub mod payment_service;
pub mod schedule;

#[cfg(test)]
pub mod test_support;
