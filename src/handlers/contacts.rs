// src/handlers/contacts.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::contact::{ContactView, CreateContactRequest, UpdateContactRequest},
};

// POST /api/contacts
#[utoipa::path(
    post,
    path = "/api/contacts",
    tag = "Contacts",
    request_body = CreateContactRequest,
    responses(
        (status = 201, description = "Contato adicionado", body = ContactView),
        (status = 400, description = "Dados inválidos ou o próprio e-mail"),
        (status = 409, description = "Contato já está na agenda")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contact(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
    Json(payload): Json<CreateContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let contact = app_state
        .contact_service
        .create_contact(&account, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(contact)))
}

// GET /api/contacts
#[utoipa::path(
    get,
    path = "/api/contacts",
    tag = "Contacts",
    responses(
        (status = 200, description = "Agenda da conta", body = Vec<ContactView>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_contacts(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let contacts = app_state
        .contact_service
        .list_contacts(account.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(contacts)))
}

// GET /api/contacts/{contact_id}
#[utoipa::path(
    get,
    path = "/api/contacts/{contact_id}",
    tag = "Contacts",
    params(("contact_id" = Uuid, Path, description = "ID do contato")),
    responses(
        (status = 200, description = "Contato", body = ContactView),
        (status = 404, description = "Contato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_contact(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
    Path(contact_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let contact = app_state
        .contact_service
        .get_contact(account.id, contact_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(contact)))
}

// PUT /api/contacts/{contact_id}
#[utoipa::path(
    put,
    path = "/api/contacts/{contact_id}",
    tag = "Contacts",
    params(("contact_id" = Uuid, Path, description = "ID do contato")),
    request_body = UpdateContactRequest,
    responses(
        (status = 200, description = "Contato atualizado", body = ContactView),
        (status = 404, description = "Contato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_contact(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
    Path(contact_id): Path<Uuid>,
    Json(payload): Json<UpdateContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let contact = app_state
        .contact_service
        .update_contact(account.id, contact_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(contact)))
}

// DELETE /api/contacts/{contact_id}
#[utoipa::path(
    delete,
    path = "/api/contacts/{contact_id}",
    tag = "Contacts",
    params(("contact_id" = Uuid, Path, description = "ID do contato")),
    responses(
        (status = 204, description = "Contato removido da agenda"),
        (status = 404, description = "Contato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_contact(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
    Path(contact_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .contact_service
        .delete_contact(account.id, contact_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
