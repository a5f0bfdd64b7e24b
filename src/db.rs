pub mod repository;
pub use repository::{
    AccountStore, ContactStore, DebtStore, DebtTransaction, LedgerStore, PaymentStore,
};

pub mod account_repo;
pub use account_repo::AccountRepository;
pub mod contact_repo;
pub use contact_repo::ContactRepository;
pub mod debt_repo;
pub use debt_repo::DebtRepository;
pub mod ledger_repo;
pub use ledger_repo::LedgerRepository;
pub mod payment_repo;
pub use payment_repo::PaymentRepository;

#[cfg(test)]
pub mod memory_repo;
#[cfg(test)]
pub use memory_repo::MemoryStore;
