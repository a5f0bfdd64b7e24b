// src/db/repository.rs

// Contratos de persistência consumidos pelos serviços.
// Implementados pelos repositórios Postgres e, nos testes, pelo MemoryStore.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::Account,
        contact::{AccountContact, Contact},
        debt::DebtRecord,
        payment::PaymentRecord,
    },
};

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create_account(&self, account: &Account) -> Result<Account, AppError>;
    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError>;
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, AppError>;
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    // --- Identidade ---
    async fn create_contact(&self, contact: &Contact) -> Result<Contact, AppError>;
    async fn get_contact(&self, id: Uuid) -> Result<Option<Contact>, AppError>;
    async fn find_contact_by_email(&self, email: &str) -> Result<Option<Contact>, AppError>;
    async fn update_contact(&self, contact: &Contact) -> Result<Contact, AppError>;

    // --- Relacionamentos ---
    async fn create_relationship(&self, rel: &AccountContact) -> Result<AccountContact, AppError>;
    async fn get_relationship(
        &self,
        account_id: Uuid,
        contact_id: Uuid,
    ) -> Result<Option<AccountContact>, AppError>;
    async fn list_relationships_for_account(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<AccountContact>, AppError>;
    async fn list_relationships_for_contact(
        &self,
        contact_id: Uuid,
    ) -> Result<Vec<AccountContact>, AppError>;
    async fn update_relationship(&self, rel: &AccountContact) -> Result<AccountContact, AppError>;
    async fn delete_relationship(&self, account_id: Uuid, contact_id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait DebtStore: Send + Sync {
    async fn create_debt(&self, debt: &DebtRecord) -> Result<DebtRecord, AppError>;
    async fn get_debt(&self, id: Uuid) -> Result<Option<DebtRecord>, AppError>;
    async fn list_debts_for_account(&self, account_id: Uuid) -> Result<Vec<DebtRecord>, AppError>;
    /// Dívidas cujo contato está vinculado à conta (visão invertida).
    async fn list_debts_where_counterparty(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<DebtRecord>, AppError>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn get_payment(&self, id: Uuid) -> Result<Option<PaymentRecord>, AppError>;
    /// Ordenados por data do pagamento (mais antigo primeiro).
    async fn list_payments_for_debt(&self, debt_id: Uuid) -> Result<Vec<PaymentRecord>, AppError>;

    async fn can_account_verify(&self, payment_id: Uuid, account_id: Uuid) -> Result<bool, AppError>;
    /// Pendentes nas dívidas de que a conta é dona (mais recentes primeiro).
    async fn list_pending_for_account(&self, account_id: Uuid)
        -> Result<Vec<PaymentRecord>, AppError>;
}

// --- Escrita transacional ---

/// Tudo o que altera uma dívida existente ou seus pagamentos passa por aqui:
/// a mutação e o roll-up entram juntos ou não entram.
/// Descartada sem `commit`, nada é gravado.
#[async_trait]
pub trait DebtTransaction: Send {
    /// Lê a dívida e trava a linha até o fim da transação.
    async fn lock_debt(&mut self, debt_id: Uuid) -> Result<Option<DebtRecord>, AppError>;
    async fn update_debt(&mut self, debt: &DebtRecord) -> Result<DebtRecord, AppError>;
    async fn delete_debt(&mut self, id: Uuid) -> Result<bool, AppError>;

    async fn get_payment(&mut self, id: Uuid) -> Result<Option<PaymentRecord>, AppError>;
    async fn list_payments_for_debt(&mut self, debt_id: Uuid) -> Result<Vec<PaymentRecord>, AppError>;
    async fn create_payment(&mut self, payment: &PaymentRecord) -> Result<PaymentRecord, AppError>;
    async fn update_payment(&mut self, payment: &PaymentRecord) -> Result<PaymentRecord, AppError>;
    async fn delete_payment(&mut self, id: Uuid) -> Result<bool, AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn DebtTransaction>, AppError>;
}
