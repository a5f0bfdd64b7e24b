// src/models/contact.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;
use utoipa::ToSchema;

// --- IDENTIDADE (compartilhada) ---

// Uma pessoa conhecida pelo sistema. Existe UMA linha por pessoa (chaveada pelo e-mail),
// não importa quantas contas a adicionaram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,

    #[schema(example = "joao@exemplo.com")]
    pub email: Option<String>,

    #[schema(example = "+55 11 99999-8888")]
    pub phone: Option<String>,

    // true quando o e-mail pertence a uma conta registrada
    pub is_account_holder: bool,

    // Referência de volta para a conta (apenas quando is_account_holder)
    pub account_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub fn new(email: Option<String>, phone: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            phone,
            is_account_holder: false,
            account_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Novo valor do contato, agora apontando para a conta registrada.
    pub fn bound_to(&self, account_id: Uuid) -> Self {
        Self {
            is_account_holder: true,
            account_id: Some(account_id),
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    pub fn is_bound_to(&self, account_id: Uuid) -> bool {
        self.is_account_holder && self.account_id == Some(account_id)
    }
}

// --- RELACIONAMENTO (visão da conta) ---

// Como UMA conta enxerga o contato: nome, e-mail, telefone e notas próprios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountContact {
    pub id: Uuid,
    pub account_id: Uuid,
    pub contact_id: Uuid,

    #[schema(example = "João (vizinho)")]
    pub display_name: String,

    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountContact {
    pub fn new(
        account_id: Uuid,
        contact_id: Uuid,
        display_name: &str,
        email: Option<String>,
        phone: Option<String>,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_id,
            contact_id,
            display_name: display_name.to_string(),
            email,
            phone,
            notes,
            created_at: now,
            updated_at: now,
        }
    }
}

// O que devolvemos para o frontend: relacionamento + flags da identidade
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactView {
    pub contact_id: Uuid,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub is_account_holder: bool,
    pub account_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContactView {
    pub fn new(relationship: &AccountContact, contact: &Contact) -> Self {
        Self {
            contact_id: contact.id,
            display_name: relationship.display_name.clone(),
            email: relationship.email.clone(),
            phone: relationship.phone.clone(),
            notes: relationship.notes.clone(),
            is_account_holder: contact.is_account_holder,
            account_id: contact.account_id,
            created_at: relationship.created_at,
            updated_at: relationship.updated_at,
        }
    }
}

// --- PAYLOADS ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    #[validate(length(min = 1, max = 120, message = "required"))]
    #[schema(example = "João")]
    pub name: String,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactRequest {
    #[validate(length(min = 1, max = 120, message = "required"))]
    pub name: Option<String>,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub notes: Option<String>,
}
