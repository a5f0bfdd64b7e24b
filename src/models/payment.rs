// src/models/payment.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;
use utoipa::ToSchema;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,   // Aguardando confirmação do dono
    Completed, // Conta no total pago
    Rejected,  // Guardado só para auditoria
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Nenhum estado além de `pending` aceita transição.
    pub fn is_terminal(self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Check,
    DigitalWallet,
    Other,
}

// Resultado da verificação feita pelo dono
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    Completed,
    Rejected,
}

impl From<VerificationOutcome> for PaymentStatus {
    fn from(outcome: VerificationOutcome) -> Self {
        match outcome {
            VerificationOutcome::Completed => PaymentStatus::Completed,
            VerificationOutcome::Rejected => PaymentStatus::Rejected,
        }
    }
}

// --- Struct principal ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: Uuid,
    pub debt_id: Uuid,

    #[schema(example = "400.00")]
    pub amount: Decimal,
    #[schema(example = "PHP")]
    pub currency: String,
    pub payment_date: DateTime<Utc>,
    pub method: PaymentMethod,

    pub description: Option<String>,
    // Referência opaca (URL do comprovante), nunca interpretada aqui
    pub receipt_reference: Option<String>,

    pub status: PaymentStatus,
    pub recorded_by: Uuid,

    // Metadados da verificação
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verification_notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn counts_towards_total(&self) -> bool {
        self.status == PaymentStatus::Completed
    }

    /// Novo valor com o carimbo da verificação aplicado.
    pub fn verified(
        &self,
        outcome: VerificationOutcome,
        verifier: Uuid,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            status: outcome.into(),
            verified_by: Some(verifier),
            verified_at: Some(now),
            verification_notes: notes,
            updated_at: now,
            ..self.clone()
        }
    }
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub debt_id: Uuid,

    #[schema(example = "400.00")]
    pub amount: String,

    // Se ausente, herda a moeda da dívida
    pub currency: Option<String>,

    pub payment_date: Option<DateTime<Utc>>,
    pub method: PaymentMethod,

    #[validate(length(max = 500, message = "too_long"))]
    pub description: Option<String>,

    #[validate(length(max = 2048, message = "too_long"))]
    pub receipt_reference: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    #[validate(length(max = 500, message = "too_long"))]
    pub description: Option<String>,

    #[validate(length(max = 2048, message = "too_long"))]
    pub receipt_reference: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub outcome: VerificationOutcome,

    #[validate(length(max = 1000, message = "too_long"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectPaymentRequest {
    #[validate(length(max = 1000, message = "too_long"))]
    pub notes: Option<String>,
}

// --- Resumo ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub debt_id: Uuid,
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
    pub amount_remaining: Decimal,
    #[schema(example = "33.33")]
    pub percentage_paid: Decimal,
    pub completed_payments: usize,
    pub remaining_installments: u32,
    pub currency: String,
    pub payments: Vec<PaymentRecord>,
}
