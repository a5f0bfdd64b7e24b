// src/db/debt_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::repository::DebtStore,
    models::debt::DebtRecord,
};

#[derive(Clone)]
pub struct DebtRepository {
    pool: PgPool,
}

impl DebtRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- Escrita (roda dentro da transação do LedgerRepository) ---

    /// Trava a linha até o commit: mutações da mesma dívida entram em fila.
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<DebtRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let debt = sqlx::query_as::<_, DebtRecord>("SELECT * FROM debt_records WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(debt)
    }

    // Grava o novo valor inteiro do registro (roll-up incluso) num único UPDATE
    pub async fn update<'e, E>(&self, executor: E, debt: &DebtRecord) -> Result<DebtRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, DebtRecord>(
            r#"
            UPDATE debt_records SET
                direction = $2,
                total_amount = $3,
                currency = $4,
                cadence = $5,
                installment_amount = $6,
                due_date = $7,
                installment_count = $8,
                amount_paid = $9,
                amount_remaining = $10,
                status = $11,
                next_due_date = $12,
                description = $13,
                notes = $14,
                updated_at = $15
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(debt.id)
            .bind(debt.direction)
            .bind(debt.total_amount)
            .bind(&debt.currency)
            .bind(debt.cadence)
            .bind(debt.installment_amount)
            .bind(debt.due_date)
            .bind(debt.installment_count)
            .bind(debt.amount_paid)
            .bind(debt.amount_remaining)
            .bind(debt.status)
            .bind(debt.next_due_date)
            .bind(&debt.description)
            .bind(&debt.notes)
            .bind(debt.updated_at)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::DebtRecordNotFound)?;

        Ok(updated)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // ON DELETE RESTRICT em payment_records
        let result = sqlx::query("DELETE FROM debt_records WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::DebtHasPayments;
                    }
                }
                AppError::from(e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl DebtStore for DebtRepository {
    async fn create_debt(&self, debt: &DebtRecord) -> Result<DebtRecord, AppError> {
        let created = sqlx::query_as::<_, DebtRecord>(
            r#"
            INSERT INTO debt_records (
                id, owner_id, counterparty_contact_id, direction,
                total_amount, currency,
                cadence, installment_amount, due_date, installment_count,
                amount_paid, amount_remaining, status, next_due_date,
                description, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
            .bind(debt.id)
            .bind(debt.owner_id)
            .bind(debt.counterparty_contact_id)
            .bind(debt.direction)
            .bind(debt.total_amount)
            .bind(&debt.currency)
            .bind(debt.cadence)
            .bind(debt.installment_amount)
            .bind(debt.due_date)
            .bind(debt.installment_count)
            .bind(debt.amount_paid)
            .bind(debt.amount_remaining)
            .bind(debt.status)
            .bind(debt.next_due_date)
            .bind(&debt.description)
            .bind(&debt.notes)
            .bind(debt.created_at)
            .bind(debt.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn get_debt(&self, id: Uuid) -> Result<Option<DebtRecord>, AppError> {
        let debt = sqlx::query_as::<_, DebtRecord>("SELECT * FROM debt_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(debt)
    }

    async fn list_debts_for_account(&self, account_id: Uuid) -> Result<Vec<DebtRecord>, AppError> {
        let debts = sqlx::query_as::<_, DebtRecord>(
            "SELECT * FROM debt_records WHERE owner_id = $1 ORDER BY created_at DESC",
        )
            .bind(account_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(debts)
    }

    async fn list_debts_where_counterparty(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<DebtRecord>, AppError> {
        // Mesma linha da dívida, nunca uma cópia
        let debts = sqlx::query_as::<_, DebtRecord>(
            r#"
            SELECT d.*
            FROM debt_records d
            JOIN contacts c ON c.id = d.counterparty_contact_id
            WHERE c.is_account_holder = TRUE
              AND c.account_id = $1
              AND d.owner_id <> $1
            ORDER BY d.created_at DESC
            "#,
        )
            .bind(account_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(debts)
    }
}
