// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

use crate::middleware::i18n::Locale;

#[derive(Debug, Error)]
pub enum AppError {
    // --- Validação (sempre antes de qualquer escrita) ---
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Valor inválido")]
    InvalidAmount,

    #[error("Moeda inválida")]
    InvalidCurrency,

    #[error("Moeda do pagamento difere da moeda da dívida")]
    CurrencyMismatch,

    #[error("Número de parcelas inválido")]
    InvalidInstallmentCount,

    #[error("Data de vencimento deve estar no futuro")]
    InvalidDueDate,

    #[error("Periodicidade obrigatória para mais de uma parcela")]
    MissingCadence,

    #[error("Não é possível adicionar a si mesmo como contato")]
    SelfContact,

    // --- Não encontrado (inclui "sem permissão", de propósito) ---
    #[error("Dívida não encontrada")]
    DebtRecordNotFound,

    #[error("Pagamento não encontrado")]
    PaymentNotFound,

    #[error("Contato não encontrado")]
    ContactNotFound,

    #[error("Usuário não encontrado")]
    UserNotFound,

    // --- Estado ---
    #[error("Pagamento não está pendente")]
    PaymentNotPending,

    #[error("Dívida possui pagamentos registrados")]
    DebtHasPayments,

    #[error("Contato já existe")]
    ContactAlreadyExists,

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    // --- Autenticação ---
    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // --- Repassados ---
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// A resposta que o handler devolve, já traduzida
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<HashMap<String, Vec<String>>>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidAmount
            | AppError::InvalidCurrency
            | AppError::CurrencyMismatch
            | AppError::InvalidInstallmentCount
            | AppError::InvalidDueDate
            | AppError::MissingCadence
            | AppError::SelfContact => StatusCode::BAD_REQUEST,

            AppError::DebtRecordNotFound
            | AppError::PaymentNotFound
            | AppError::ContactNotFound
            | AppError::UserNotFound => StatusCode::NOT_FOUND,

            AppError::PaymentNotPending
            | AppError::DebtHasPayments
            | AppError::ContactAlreadyExists
            | AppError::EmailAlreadyExists => StatusCode::CONFLICT,

            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,

            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Mensagem para o cliente; erros internos nunca vazam detalhes
    fn message(&self, lang: &str) -> &'static str {
        let pt = lang == "pt";
        match self {
            AppError::ValidationError(_) => {
                if pt { "Um ou mais campos são inválidos." } else { "One or more fields are invalid." }
            }
            AppError::InvalidAmount => {
                if pt { "O valor deve ser um número maior que zero." } else { "Amount must be a number greater than zero." }
            }
            AppError::InvalidCurrency => {
                if pt { "Moeda não suportada." } else { "Unsupported currency." }
            }
            AppError::CurrencyMismatch => {
                if pt { "A moeda do pagamento deve ser a mesma da dívida." } else { "Payment currency must match the debt currency." }
            }
            AppError::InvalidInstallmentCount => {
                if pt { "O número de parcelas deve estar entre 1 e 1000." } else { "Installment count must be between 1 and 1000." }
            }
            AppError::InvalidDueDate => {
                if pt { "A data de vencimento deve estar no futuro." } else { "Due date must be in the future." }
            }
            AppError::MissingCadence => {
                if pt { "Informe a periodicidade para dívidas parceladas." } else { "A cadence is required for installment debts." }
            }
            AppError::SelfContact => {
                if pt { "Você não pode adicionar a si mesmo como contato." } else { "You cannot add yourself as a contact." }
            }
            AppError::DebtRecordNotFound => {
                if pt { "Dívida não encontrada." } else { "Debt not found." }
            }
            AppError::PaymentNotFound => {
                if pt { "Pagamento não encontrado." } else { "Payment not found." }
            }
            AppError::ContactNotFound => {
                if pt { "Contato não encontrado." } else { "Contact not found." }
            }
            AppError::UserNotFound => {
                if pt { "Usuário não encontrado." } else { "User not found." }
            }
            AppError::PaymentNotPending => {
                if pt { "Somente pagamentos pendentes podem ser verificados." } else { "Only pending payments can be verified." }
            }
            AppError::DebtHasPayments => {
                if pt { "A dívida possui pagamentos; arquive-a em vez de excluir." } else { "Debt has payments; archive it instead of deleting." }
            }
            AppError::ContactAlreadyExists => {
                if pt { "Este contato já foi adicionado." } else { "This contact already exists." }
            }
            AppError::EmailAlreadyExists => {
                if pt { "Este e-mail já está em uso." } else { "This email is already in use." }
            }
            AppError::InvalidCredentials => {
                if pt { "E-mail ou senha inválidos." } else { "Invalid email or password." }
            }
            AppError::InvalidToken => {
                if pt { "Token de autenticação inválido ou ausente." } else { "Missing or invalid authentication token." }
            }
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => {
                if pt { "Ocorreu um erro inesperado." } else { "An unexpected error occurred." }
            }
        }
    }

    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        // Detalhes por campo apenas para erros do validator
        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                Some(details)
            }
            _ => None,
        };

        ApiError {
            status,
            message: self.message(&locale.0).to_string(),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Sem Locale disponível (ex.: middleware), responde em inglês
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}
