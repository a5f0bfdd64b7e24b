// src/db/memory_repo.rs

// Store em memória usado pelos testes dos serviços.
// Reproduz as restrições do schema (UNIQUE de e-mail, RESTRICT em pagamentos)
// e a transação: escritas ficam pendentes até o commit.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::repository::{
        AccountStore, ContactStore, DebtStore, DebtTransaction, LedgerStore, PaymentStore,
    },
    models::{
        auth::Account,
        contact::{AccountContact, Contact},
        debt::DebtRecord,
        payment::{PaymentRecord, PaymentStatus},
    },
};

#[derive(Default)]
struct State {
    accounts: HashMap<Uuid, Account>,
    contacts: HashMap<Uuid, Contact>,
    relationships: Vec<AccountContact>,
    debts: HashMap<Uuid, DebtRecord>,
    payments: HashMap<Uuid, PaymentRecord>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    // Uma transação por vez, no lugar do FOR UPDATE
    writer: Arc<tokio::sync::Mutex<()>>,
    fail_debt_updates: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Faz o `update_debt` das próximas transações falhar.
    pub fn fail_debt_updates(&self, fail: bool) {
        self.fail_debt_updates.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::InternalServerError(anyhow::anyhow!("memory store poisoned")))
    }
}

// Devolve o controle ao runtime, como um I/O real faria
async fn io() {
    tokio::task::yield_now().await;
}

fn sort_by_payment_date(payments: &mut [PaymentRecord]) {
    payments.sort_by(|a, b| {
        a.payment_date
            .cmp(&b.payment_date)
            .then(a.created_at.cmp(&b.created_at))
    });
}

fn counterparty_account(state: &State, debt: &DebtRecord) -> Option<Uuid> {
    state
        .contacts
        .get(&debt.counterparty_contact_id)
        .filter(|c| c.is_account_holder)
        .and_then(|c| c.account_id)
        .filter(|account_id| *account_id != debt.owner_id)
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, account: &Account) -> Result<Account, AppError> {
        io().await;
        let mut state = self.lock()?;
        if state.accounts.values().any(|a| a.email == account.email) {
            return Err(AppError::EmailAlreadyExists);
        }
        state.accounts.insert(account.id, account.clone());
        Ok(account.clone())
    }

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        io().await;
        Ok(self.lock()?.accounts.get(&id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        io().await;
        Ok(self.lock()?.accounts.values().find(|a| a.email == email).cloned())
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn create_contact(&self, contact: &Contact) -> Result<Contact, AppError> {
        io().await;
        let mut state = self.lock()?;
        if contact.email.is_some()
            && state.contacts.values().any(|c| c.email == contact.email)
        {
            return Err(AppError::ContactAlreadyExists);
        }
        state.contacts.insert(contact.id, contact.clone());
        Ok(contact.clone())
    }

    async fn get_contact(&self, id: Uuid) -> Result<Option<Contact>, AppError> {
        io().await;
        Ok(self.lock()?.contacts.get(&id).cloned())
    }

    async fn find_contact_by_email(&self, email: &str) -> Result<Option<Contact>, AppError> {
        io().await;
        Ok(self
            .lock()?
            .contacts
            .values()
            .find(|c| c.email.as_deref() == Some(email))
            .cloned())
    }

    async fn update_contact(&self, contact: &Contact) -> Result<Contact, AppError> {
        io().await;
        let mut state = self.lock()?;
        let slot = state.contacts.get_mut(&contact.id).ok_or(AppError::ContactNotFound)?;
        *slot = contact.clone();
        Ok(contact.clone())
    }

    async fn create_relationship(&self, rel: &AccountContact) -> Result<AccountContact, AppError> {
        io().await;
        let mut state = self.lock()?;
        if state
            .relationships
            .iter()
            .any(|r| r.account_id == rel.account_id && r.contact_id == rel.contact_id)
        {
            return Err(AppError::ContactAlreadyExists);
        }
        state.relationships.push(rel.clone());
        Ok(rel.clone())
    }

    async fn get_relationship(
        &self,
        account_id: Uuid,
        contact_id: Uuid,
    ) -> Result<Option<AccountContact>, AppError> {
        io().await;
        Ok(self
            .lock()?
            .relationships
            .iter()
            .find(|r| r.account_id == account_id && r.contact_id == contact_id)
            .cloned())
    }

    async fn list_relationships_for_account(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<AccountContact>, AppError> {
        io().await;
        let mut rels: Vec<AccountContact> = self
            .lock()?
            .relationships
            .iter()
            .filter(|r| r.account_id == account_id)
            .cloned()
            .collect();
        rels.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(rels)
    }

    async fn list_relationships_for_contact(
        &self,
        contact_id: Uuid,
    ) -> Result<Vec<AccountContact>, AppError> {
        io().await;
        Ok(self
            .lock()?
            .relationships
            .iter()
            .filter(|r| r.contact_id == contact_id)
            .cloned()
            .collect())
    }

    async fn update_relationship(&self, rel: &AccountContact) -> Result<AccountContact, AppError> {
        io().await;
        let mut state = self.lock()?;
        let slot = state
            .relationships
            .iter_mut()
            .find(|r| r.account_id == rel.account_id && r.contact_id == rel.contact_id)
            .ok_or(AppError::ContactNotFound)?;
        *slot = rel.clone();
        Ok(rel.clone())
    }

    async fn delete_relationship(&self, account_id: Uuid, contact_id: Uuid) -> Result<bool, AppError> {
        io().await;
        let mut state = self.lock()?;
        let before = state.relationships.len();
        state
            .relationships
            .retain(|r| !(r.account_id == account_id && r.contact_id == contact_id));
        Ok(state.relationships.len() < before)
    }
}

#[async_trait]
impl DebtStore for MemoryStore {
    async fn create_debt(&self, debt: &DebtRecord) -> Result<DebtRecord, AppError> {
        io().await;
        self.lock()?.debts.insert(debt.id, debt.clone());
        Ok(debt.clone())
    }

    async fn get_debt(&self, id: Uuid) -> Result<Option<DebtRecord>, AppError> {
        io().await;
        Ok(self.lock()?.debts.get(&id).cloned())
    }

    async fn list_debts_for_account(&self, account_id: Uuid) -> Result<Vec<DebtRecord>, AppError> {
        io().await;
        let mut debts: Vec<DebtRecord> = self
            .lock()?
            .debts
            .values()
            .filter(|d| d.owner_id == account_id)
            .cloned()
            .collect();
        debts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(debts)
    }

    async fn list_debts_where_counterparty(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<DebtRecord>, AppError> {
        io().await;
        let state = self.lock()?;
        let mut debts: Vec<DebtRecord> = state
            .debts
            .values()
            .filter(|d| counterparty_account(&state, d) == Some(account_id))
            .cloned()
            .collect();
        debts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(debts)
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn get_payment(&self, id: Uuid) -> Result<Option<PaymentRecord>, AppError> {
        io().await;
        Ok(self.lock()?.payments.get(&id).cloned())
    }

    async fn list_payments_for_debt(&self, debt_id: Uuid) -> Result<Vec<PaymentRecord>, AppError> {
        io().await;
        let mut payments: Vec<PaymentRecord> = self
            .lock()?
            .payments
            .values()
            .filter(|p| p.debt_id == debt_id)
            .cloned()
            .collect();
        sort_by_payment_date(&mut payments);
        Ok(payments)
    }

    async fn can_account_verify(&self, payment_id: Uuid, account_id: Uuid) -> Result<bool, AppError> {
        io().await;
        let state = self.lock()?;
        Ok(state
            .payments
            .get(&payment_id)
            .and_then(|p| state.debts.get(&p.debt_id))
            .is_some_and(|d| d.owner_id == account_id))
    }

    async fn list_pending_for_account(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<PaymentRecord>, AppError> {
        io().await;
        let state = self.lock()?;
        let mut pending: Vec<PaymentRecord> = state
            .payments
            .values()
            .filter(|p| p.status == PaymentStatus::Pending)
            .filter(|p| {
                state
                    .debts
                    .get(&p.debt_id)
                    .is_some_and(|d| d.owner_id == account_id)
            })
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pending)
    }
}

// --- Transação ---

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn DebtTransaction>, AppError> {
        let writer = self.writer.clone().lock_owned().await;
        Ok(Box::new(MemoryTransaction {
            store: self.clone(),
            _writer: writer,
            debts: HashMap::new(),
            payments: HashMap::new(),
        }))
    }
}

// None = excluído nesta transação
pub struct MemoryTransaction {
    store: MemoryStore,
    _writer: OwnedMutexGuard<()>,
    debts: HashMap<Uuid, Option<DebtRecord>>,
    payments: HashMap<Uuid, Option<PaymentRecord>>,
}

impl MemoryTransaction {
    fn debt(&self, id: Uuid) -> Result<Option<DebtRecord>, AppError> {
        match self.debts.get(&id) {
            Some(staged) => Ok(staged.clone()),
            None => Ok(self.store.lock()?.debts.get(&id).cloned()),
        }
    }

    fn payment(&self, id: Uuid) -> Result<Option<PaymentRecord>, AppError> {
        match self.payments.get(&id) {
            Some(staged) => Ok(staged.clone()),
            None => Ok(self.store.lock()?.payments.get(&id).cloned()),
        }
    }

    fn payments_for(&self, debt_id: Uuid) -> Result<Vec<PaymentRecord>, AppError> {
        let mut payments: Vec<PaymentRecord> = self
            .store
            .lock()?
            .payments
            .values()
            .filter(|p| p.debt_id == debt_id && !self.payments.contains_key(&p.id))
            .cloned()
            .collect();
        payments.extend(
            self.payments
                .values()
                .flatten()
                .filter(|p| p.debt_id == debt_id)
                .cloned(),
        );
        sort_by_payment_date(&mut payments);
        Ok(payments)
    }
}

#[async_trait]
impl DebtTransaction for MemoryTransaction {
    async fn lock_debt(&mut self, debt_id: Uuid) -> Result<Option<DebtRecord>, AppError> {
        io().await;
        self.debt(debt_id)
    }

    async fn update_debt(&mut self, debt: &DebtRecord) -> Result<DebtRecord, AppError> {
        io().await;
        if self.store.fail_debt_updates.load(Ordering::SeqCst) {
            return Err(AppError::InternalServerError(anyhow::anyhow!(
                "falha ao gravar a dívida {}",
                debt.id
            )));
        }
        if self.debt(debt.id)?.is_none() {
            return Err(AppError::DebtRecordNotFound);
        }
        self.debts.insert(debt.id, Some(debt.clone()));
        Ok(debt.clone())
    }

    async fn delete_debt(&mut self, id: Uuid) -> Result<bool, AppError> {
        io().await;
        if !self.payments_for(id)?.is_empty() {
            return Err(AppError::DebtHasPayments);
        }
        if self.debt(id)?.is_none() {
            return Ok(false);
        }
        self.debts.insert(id, None);
        Ok(true)
    }

    async fn get_payment(&mut self, id: Uuid) -> Result<Option<PaymentRecord>, AppError> {
        io().await;
        self.payment(id)
    }

    async fn list_payments_for_debt(&mut self, debt_id: Uuid) -> Result<Vec<PaymentRecord>, AppError> {
        io().await;
        self.payments_for(debt_id)
    }

    async fn create_payment(&mut self, payment: &PaymentRecord) -> Result<PaymentRecord, AppError> {
        io().await;
        if self.debt(payment.debt_id)?.is_none() {
            return Err(AppError::DebtRecordNotFound);
        }
        self.payments.insert(payment.id, Some(payment.clone()));
        Ok(payment.clone())
    }

    async fn update_payment(&mut self, payment: &PaymentRecord) -> Result<PaymentRecord, AppError> {
        io().await;
        if self.payment(payment.id)?.is_none() {
            return Err(AppError::PaymentNotFound);
        }
        self.payments.insert(payment.id, Some(payment.clone()));
        Ok(payment.clone())
    }

    async fn delete_payment(&mut self, id: Uuid) -> Result<bool, AppError> {
        io().await;
        if self.payment(id)?.is_none() {
            return Ok(false);
        }
        self.payments.insert(id, None);
        Ok(true)
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        io().await;
        let mut state = self.store.lock()?;
        for (id, debt) in &self.debts {
            match debt {
                Some(debt) => state.debts.insert(*id, debt.clone()),
                None => state.debts.remove(id),
            };
        }
        for (id, payment) in &self.payments {
            match payment {
                Some(payment) => state.payments.insert(*id, payment.clone()),
                None => state.payments.remove(id),
            };
        }
        Ok(())
    }
}
