// src/db/ledger_repo.rs

// Transações de escrita sobre dívidas e pagamentos.
// Cada unidade de trabalho abre com SELECT ... FOR UPDATE na dívida.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        debt_repo::DebtRepository,
        payment_repo::PaymentRepository,
        repository::{DebtTransaction, LedgerStore},
    },
    models::{debt::DebtRecord, payment::PaymentRecord},
};

#[derive(Clone)]
pub struct LedgerRepository {
    pool: PgPool,
    debts: DebtRepository,
    payments: PaymentRepository,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            debts: DebtRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl LedgerStore for LedgerRepository {
    async fn begin(&self) -> Result<Box<dyn DebtTransaction>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgDebtTransaction {
            tx,
            debts: self.debts.clone(),
            payments: self.payments.clone(),
        }))
    }
}

// Descartada sem commit, o sqlx faz o rollback
struct PgDebtTransaction {
    tx: Transaction<'static, Postgres>,
    debts: DebtRepository,
    payments: PaymentRepository,
}

#[async_trait]
impl DebtTransaction for PgDebtTransaction {
    async fn lock_debt(&mut self, debt_id: Uuid) -> Result<Option<DebtRecord>, AppError> {
        self.debts.find_for_update(&mut *self.tx, debt_id).await
    }

    async fn update_debt(&mut self, debt: &DebtRecord) -> Result<DebtRecord, AppError> {
        self.debts.update(&mut *self.tx, debt).await
    }

    async fn delete_debt(&mut self, id: Uuid) -> Result<bool, AppError> {
        self.debts.delete(&mut *self.tx, id).await
    }

    async fn get_payment(&mut self, id: Uuid) -> Result<Option<PaymentRecord>, AppError> {
        self.payments.find_by_id(&mut *self.tx, id).await
    }

    async fn list_payments_for_debt(&mut self, debt_id: Uuid) -> Result<Vec<PaymentRecord>, AppError> {
        self.payments.find_by_debt(&mut *self.tx, debt_id).await
    }

    async fn create_payment(&mut self, payment: &PaymentRecord) -> Result<PaymentRecord, AppError> {
        self.payments.insert(&mut *self.tx, payment).await
    }

    async fn update_payment(&mut self, payment: &PaymentRecord) -> Result<PaymentRecord, AppError> {
        self.payments.update(&mut *self.tx, payment).await
    }

    async fn delete_payment(&mut self, id: Uuid) -> Result<bool, AppError> {
        self.payments.delete(&mut *self.tx, id).await
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}
