// src/common/money.rs

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::common::error::AppError;

// Moedas aceitas (sem conversão entre elas)
pub const SUPPORTED_CURRENCIES: &[&str] = &[
    "PHP", "USD", "EUR", "GBP", "BRL", "JPY", "AUD", "CAD",
    "SGD", "INR", "CNY", "KRW", "MXN", "CHF", "HKD", "NZD",
];

/// Valor monetário vindo como string: precisa ser número e maior que zero.
pub fn parse_amount(raw: &str) -> Result<Decimal, AppError> {
    let amount = Decimal::from_str(raw.trim()).map_err(|_| AppError::InvalidAmount)?;

    if amount <= Decimal::ZERO {
        return Err(AppError::InvalidAmount);
    }
    Ok(amount.normalize())
}

pub fn normalize_currency(raw: &str) -> Result<String, AppError> {
    let code = raw.trim().to_ascii_uppercase();

    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::InvalidCurrency);
    }
    if !SUPPORTED_CURRENCIES.contains(&code.as_str()) {
        return Err(AppError::InvalidCurrency);
    }
    Ok(code)
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
