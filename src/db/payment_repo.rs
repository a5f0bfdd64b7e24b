// src/db/payment_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::repository::PaymentStore,
    models::payment::PaymentRecord,
};

#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<PaymentRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, PaymentRecord>("SELECT * FROM payment_records WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(payment)
    }

    pub async fn find_by_debt<'e, E>(&self, executor: E, debt_id: Uuid) -> Result<Vec<PaymentRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, PaymentRecord>(
            "SELECT * FROM payment_records WHERE debt_id = $1 ORDER BY payment_date ASC, created_at ASC",
        )
            .bind(debt_id)
            .fetch_all(executor)
            .await?;
        Ok(payments)
    }

    // --- Escrita (roda dentro da transação do LedgerRepository) ---

    pub async fn insert<'e, E>(&self, executor: E, payment: &PaymentRecord) -> Result<PaymentRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, PaymentRecord>(
            r#"
            INSERT INTO payment_records (
                id, debt_id, amount, currency, payment_date, method,
                description, receipt_reference, status, recorded_by,
                verified_by, verified_at, verification_notes,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
            .bind(payment.id)
            .bind(payment.debt_id)
            .bind(payment.amount)
            .bind(&payment.currency)
            .bind(payment.payment_date)
            .bind(payment.method)
            .bind(&payment.description)
            .bind(&payment.receipt_reference)
            .bind(payment.status)
            .bind(payment.recorded_by)
            .bind(payment.verified_by)
            .bind(payment.verified_at)
            .bind(&payment.verification_notes)
            .bind(payment.created_at)
            .bind(payment.updated_at)
            .fetch_one(executor)
            .await?;

        Ok(created)
    }

    pub async fn update<'e, E>(&self, executor: E, payment: &PaymentRecord) -> Result<PaymentRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, PaymentRecord>(
            r#"
            UPDATE payment_records SET
                description = $2,
                receipt_reference = $3,
                status = $4,
                verified_by = $5,
                verified_at = $6,
                verification_notes = $7,
                updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(payment.id)
            .bind(&payment.description)
            .bind(&payment.receipt_reference)
            .bind(payment.status)
            .bind(payment.verified_by)
            .bind(payment.verified_at)
            .bind(&payment.verification_notes)
            .bind(payment.updated_at)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::PaymentNotFound)?;

        Ok(updated)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM payment_records WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PaymentStore for PaymentRepository {
    async fn get_payment(&self, id: Uuid) -> Result<Option<PaymentRecord>, AppError> {
        self.find_by_id(&self.pool, id).await
    }

    async fn list_payments_for_debt(&self, debt_id: Uuid) -> Result<Vec<PaymentRecord>, AppError> {
        self.find_by_debt(&self.pool, debt_id).await
    }

    // Quem confirma é o dono da dívida
    async fn can_account_verify(&self, payment_id: Uuid, account_id: Uuid) -> Result<bool, AppError> {
        let allowed: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM payment_records p
                JOIN debt_records d ON d.id = p.debt_id
                WHERE p.id = $1 AND d.owner_id = $2
            )
            "#,
        )
            .bind(payment_id)
            .bind(account_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(allowed)
    }

    async fn list_pending_for_account(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<PaymentRecord>, AppError> {
        let payments = sqlx::query_as::<_, PaymentRecord>(
            r#"
            SELECT p.*
            FROM payment_records p
            JOIN debt_records d ON d.id = p.debt_id
            WHERE d.owner_id = $1 AND p.status = 'pending'
            ORDER BY p.created_at DESC
            "#,
        )
            .bind(account_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(payments)
    }
}
