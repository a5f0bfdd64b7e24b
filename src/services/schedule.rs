// src/services/schedule.rs

//! Calculadora de parcelas: funções puras, sem I/O.
//!
//! Convenção de períodos: `N` parcelas colocam a N-ésima data de vencimento
//! exatamente `N` períodos depois da criação (a primeira parcela vence um
//! período após a criação). A função inversa conta períodos inteiros
//! decorridos, então `installments_from_due_date(due_date_from_installments(n)) == n`.
//!
//! Alocação de pagamentos no cronograma: gulosa em ordem cronológica das
//! parcelas. O total pago preenche a parcela 1, o que sobra vai para a 2, e
//! assim por diante. Não se tenta casar pagamento com parcela por valor ou data.

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeDelta, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{
    debt::{Cadence, DebtRecord, DebtStatus},
    payment::PaymentRecord,
    schedule::{ScheduleLine, SlotStatus},
};

/// Casas decimais da parcela (centavos).
pub const MONEY_SCALE: u32 = 2;

/// Limite de parcelas aceito na criação/edição.
pub const MAX_INSTALLMENTS: u32 = 1000;

// --- Aritmética de períodos ---

/// Avança `periods` períodos da periodicidade. Meses são "grampeados" no
/// último dia do mês (31/jan + 1 mês = 28/fev). `OneTime` não tem período.
pub fn advance(from: DateTime<Utc>, cadence: Cadence, periods: u32) -> DateTime<Utc> {
    let days = |per_period: i64| {
        TimeDelta::try_days(per_period * i64::from(periods))
            .and_then(|delta| from.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    };
    let months = |per_period: u32| {
        per_period
            .checked_mul(periods)
            .and_then(|m| from.checked_add_months(Months::new(m)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    };

    match cadence {
        Cadence::OneTime => from,
        Cadence::Weekly => days(7),
        Cadence::Biweekly => days(14),
        Cadence::Monthly => months(1),
        Cadence::Quarterly => months(3),
        Cadence::Yearly => months(12),
    }
}

/// Maior `m` tal que `from + m meses <= to`, comparando por data.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to <= from {
        return 0;
    }

    let estimate = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    let mut months = u32::try_from(estimate.max(0)).unwrap_or(0);

    // A estimativa pelo calendário é um teto; desce até caber
    while months > 0 {
        match from.checked_add_months(Months::new(months)) {
            Some(date) if date <= to => break,
            _ => months -= 1,
        }
    }
    months
}

// --- Conversões ---

/// Quantos períodos cabem entre a criação e o vencimento (mínimo 1).
pub fn installments_from_due_date(
    created_at: DateTime<Utc>,
    due_date: DateTime<Utc>,
    cadence: Cadence,
) -> u32 {
    let from = created_at.date_naive();
    let to = due_date.date_naive();
    let elapsed_days = u32::try_from((to - from).num_days().max(0)).unwrap_or(u32::MAX);

    let count = match cadence {
        Cadence::OneTime => 1,
        Cadence::Weekly => elapsed_days / 7,
        Cadence::Biweekly => elapsed_days / 14,
        Cadence::Monthly => months_between(from, to),
        Cadence::Quarterly => months_between(from, to) / 3,
        Cadence::Yearly => months_between(from, to) / 12,
    };
    count.max(1)
}

pub fn due_date_from_installments(
    created_at: DateTime<Utc>,
    count: u32,
    cadence: Cadence,
) -> DateTime<Utc> {
    advance(created_at, cadence, count)
}

/// `total / count` em decimal, arredondado a centavos. Se o arredondamento
/// zerar a parcela, fica o quociente exato.
pub fn installment_amount(total_amount: Decimal, count: u32) -> Decimal {
    let quotient = total_amount / Decimal::from(count.max(1));
    let rounded = quotient.round_dp(MONEY_SCALE);

    if rounded.is_zero() { quotient } else { rounded }
}

/// Um período depois do último pagamento (ou da criação).
/// Dívida de parcela única vence sempre na data gravada.
pub fn next_due_date(debt: &DebtRecord, last_payment_date: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match debt.cadence {
        Cadence::OneTime => debt.due_date,
        cadence => advance(last_payment_date.unwrap_or(debt.created_at), cadence, 1),
    }
}

/// Parcelas previstas: a contagem explícita ou a derivada do vencimento.
pub fn planned_installments(debt: &DebtRecord) -> u32 {
    match debt.cadence {
        Cadence::OneTime => 1,
        cadence => debt
            .installment_count
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n >= 1)
            .unwrap_or_else(|| installments_from_due_date(debt.created_at, debt.due_date, cadence)),
    }
}

pub fn remaining_installments(debt: &DebtRecord) -> u32 {
    if debt.amount_remaining <= Decimal::ZERO {
        return 0;
    }
    if debt.installment_amount <= Decimal::ZERO {
        return 1;
    }
    (debt.amount_remaining / debt.installment_amount)
        .ceil()
        .to_u32()
        .unwrap_or(u32::MAX)
}

pub fn percentage_paid(debt: &DebtRecord) -> Decimal {
    if debt.total_amount <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let pct = debt.amount_paid / debt.total_amount * Decimal::ONE_HUNDRED;
    pct.min(Decimal::ONE_HUNDRED).round_dp(MONEY_SCALE)
}

// --- Cronograma ---

fn slot_status(owed: Decimal, due: DateTime<Utc>, now: DateTime<Utc>, archived: bool) -> SlotStatus {
    if owed <= Decimal::ZERO {
        SlotStatus::Paid
    } else if due < now {
        if archived { SlotStatus::Missed } else { SlotStatus::Overdue }
    } else {
        SlotStatus::Pending
    }
}

/// Monta o cronograma completo e aplica os pagamentos concluídos.
///
/// Toda parcela usa o `installment_amount` gravado, exceto a última, que
/// absorve o resto: a soma das parcelas é sempre igual a `total_amount`.
pub fn build_schedule(
    debt: &DebtRecord,
    payments: &[PaymentRecord],
    now: DateTime<Utc>,
) -> Vec<ScheduleLine> {
    let archived = debt.status == DebtStatus::Archived;
    let slots = planned_installments(debt).min(MAX_INSTALLMENTS);

    let mut available: Decimal = payments
        .iter()
        .filter(|p| p.counts_towards_total())
        .map(|p| p.amount)
        .sum();
    let mut unscheduled = debt.total_amount;
    let mut lines = Vec::with_capacity(slots as usize);
    let mut index: u32 = 1;

    loop {
        let is_last = debt.cadence == Cadence::OneTime
            || index >= slots
            || unscheduled <= debt.installment_amount
            || debt.installment_amount <= Decimal::ZERO;

        let scheduled = if is_last { unscheduled } else { debt.installment_amount };
        let due_date = match debt.cadence {
            Cadence::OneTime => debt.due_date,
            cadence => advance(debt.created_at, cadence, index),
        };

        let satisfied = available.min(scheduled).max(Decimal::ZERO);
        available -= satisfied;
        let owed = scheduled - satisfied;

        lines.push(ScheduleLine {
            installment: index,
            due_date,
            scheduled_amount: scheduled,
            satisfied_amount: satisfied,
            owed_amount: owed,
            status: slot_status(owed, due_date, now, archived),
        });

        unscheduled -= scheduled;
        if is_last {
            break;
        }
        index += 1;
    }

    lines
}
