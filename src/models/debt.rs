// src/models/debt.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;
use utoipa::ToSchema;

// --- Enums (Mapeando o Postgres) ---

// Direção SEMPRE gravada do ponto de vista do dono (quem criou o registro)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "debt_direction", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    OwedByOwner, // O dono deve ao contato
    OwedToOwner, // O contato deve ao dono
}

impl Direction {
    pub fn inverted(self) -> Self {
        match self {
            Direction::OwedByOwner => Direction::OwedToOwner,
            Direction::OwedToOwner => Direction::OwedByOwner,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "installment_cadence", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    #[serde(alias = "onetime")]
    OneTime,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "debt_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    Active,
    Overdue,
    Settled,
    Archived,
}

impl DebtStatus {
    /// settled sse não resta nada; arquivado se mantém enquanto houver saldo;
    /// senão overdue quando o próximo vencimento já passou.
    pub fn derive(
        amount_remaining: Decimal,
        next_due_date: DateTime<Utc>,
        now: DateTime<Utc>,
        archived: bool,
    ) -> Self {
        if amount_remaining <= Decimal::ZERO {
            DebtStatus::Settled
        } else if archived {
            DebtStatus::Archived
        } else if now > next_due_date {
            DebtStatus::Overdue
        } else {
            DebtStatus::Active
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebtRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub counterparty_contact_id: Uuid,

    pub direction: Direction,

    // Valores
    #[schema(example = "1200.00")]
    pub total_amount: Decimal,
    #[schema(example = "PHP")]
    pub currency: String,

    // Parcelamento
    pub cadence: Cadence,
    #[schema(example = "400.00")]
    pub installment_amount: Decimal,
    pub due_date: DateTime<Utc>,
    #[schema(example = 3)]
    pub installment_count: Option<i32>,

    // Totais (roll-up)
    #[schema(example = "0.00")]
    pub amount_paid: Decimal,
    #[schema(example = "1200.00")]
    pub amount_remaining: Decimal,
    pub status: DebtStatus,
    pub next_due_date: DateTime<Utc>,

    pub description: Option<String>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DebtRecord {
    /// Novo valor do registro com totais, status e próximo vencimento recalculados.
    pub fn with_rollup(
        &self,
        amount_paid: Decimal,
        next_due_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        let amount_remaining = (self.total_amount - amount_paid).max(Decimal::ZERO);
        let archived = self.status == DebtStatus::Archived;

        Self {
            amount_paid,
            amount_remaining,
            next_due_date,
            status: DebtStatus::derive(amount_remaining, next_due_date, now, archived),
            updated_at: now,
            ..self.clone()
        }
    }
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDebtRequest {
    pub counterparty_contact_id: Uuid,
    pub direction: Direction,

    // String para não perder precisão no JSON
    #[schema(example = "1200.00")]
    pub total_amount: String,
    #[schema(example = "PHP")]
    pub currency: Option<String>,

    pub cadence: Option<Cadence>,
    pub due_date: Option<DateTime<Utc>>,
    #[schema(example = 3)]
    pub installment_count: Option<i32>,

    #[validate(length(max = 500, message = "too_long"))]
    pub description: Option<String>,
    #[validate(length(max = 2000, message = "too_long"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDebtRequest {
    pub total_amount: Option<String>,
    pub currency: Option<String>,
    pub cadence: Option<Cadence>,
    pub due_date: Option<DateTime<Utc>>,
    pub installment_count: Option<i32>,
    #[validate(length(max = 500, message = "too_long"))]
    pub description: Option<String>,
    #[validate(length(max = 2000, message = "too_long"))]
    pub notes: Option<String>,
    // true arquiva, false desarquiva
    pub archived: Option<bool>,
}

impl UpdateDebtRequest {
    /// Alguma mudança que obriga a recalcular a parcela?
    pub fn touches_terms(&self) -> bool {
        self.total_amount.is_some() || self.cadence.is_some() || self.installment_count.is_some()
    }
}

// --- Visão (projeção em tempo de leitura) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Perspective {
    Owner,
    Counterparty,
}

// A "outra parte" do ponto de vista de quem está lendo
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactRef {
    pub contact_id: Option<Uuid>,
    pub account_id: Option<Uuid>,
    pub display_name: String,
    pub email: Option<String>,
    pub is_account_holder: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebtView {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub perspective: Perspective,
    pub direction: Direction,
    pub contact: ContactRef,

    pub total_amount: Decimal,
    pub currency: String,
    pub cadence: Cadence,
    pub installment_amount: Decimal,
    pub due_date: DateTime<Utc>,
    pub installment_count: Option<i32>,
    pub amount_paid: Decimal,
    pub amount_remaining: Decimal,
    pub status: DebtStatus,
    pub next_due_date: DateTime<Utc>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DebtView {
    /// Para a contraparte a direção é invertida; o registro em si nunca é copiado.
    /// O status é recalculado na leitura: um vencimento que passou depois do
    /// último roll-up já aparece como atrasado.
    pub fn project(debt: &DebtRecord, perspective: Perspective, contact: ContactRef) -> Self {
        let direction = match perspective {
            Perspective::Owner => debt.direction,
            Perspective::Counterparty => debt.direction.inverted(),
        };
        let status = DebtStatus::derive(
            debt.amount_remaining,
            debt.next_due_date,
            Utc::now(),
            debt.status == DebtStatus::Archived,
        );

        Self {
            id: debt.id,
            owner_id: debt.owner_id,
            perspective,
            direction,
            contact,
            total_amount: debt.total_amount,
            currency: debt.currency.clone(),
            cadence: debt.cadence,
            installment_amount: debt.installment_amount,
            due_date: debt.due_date,
            installment_count: debt.installment_count,
            amount_paid: debt.amount_paid,
            amount_remaining: debt.amount_remaining,
            status,
            next_due_date: debt.next_due_date,
            description: debt.description.clone(),
            notes: debt.notes.clone(),
            created_at: debt.created_at,
            updated_at: debt.updated_at,
        }
    }
}

// --- Relatórios ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingPayment {
    pub debt_id: Uuid,
    pub contact_name: String,
    pub direction: Direction,
    pub next_due_date: DateTime<Utc>,
    pub amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
}
