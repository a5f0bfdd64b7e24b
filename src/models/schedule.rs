// src/models/schedule.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

// Calculada a cada leitura, nunca persistida
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Pending,
    Paid,
    Overdue,
    Missed,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleLine {
    #[schema(example = 1)]
    pub installment: u32,
    pub due_date: DateTime<Utc>,
    #[schema(example = "400.00")]
    pub scheduled_amount: Decimal,
    pub satisfied_amount: Decimal,
    pub owed_amount: Decimal,
    pub status: SlotStatus,
}
