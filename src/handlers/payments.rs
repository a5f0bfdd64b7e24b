// src/handlers/payments.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::payment::{
        CreatePaymentRequest, PaymentRecord, RejectPaymentRequest, UpdatePaymentRequest,
        VerifyPaymentRequest,
    },
};

// POST /api/payments
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "Payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Pagamento registrado", body = PaymentRecord),
        (status = 400, description = "Valor ou moeda inválidos"),
        (status = 404, description = "Dívida não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = app_state
        .payment_service
        .record_payment(account.id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(payment)))
}

// GET /api/payments/pending
#[utoipa::path(
    get,
    path = "/api/payments/pending",
    tag = "Payments",
    responses(
        (status = 200, description = "Pagamentos aguardando confirmação da conta", body = Vec<PaymentRecord>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_pending(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let pending = app_state
        .payment_service
        .list_pending_for_account(account.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(pending)))
}

// GET /api/payments/{payment_id}
#[utoipa::path(
    get,
    path = "/api/payments/{payment_id}",
    tag = "Payments",
    params(("payment_id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento", body = PaymentRecord),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = app_state
        .payment_service
        .get_payment(payment_id, account.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(payment)))
}

// PATCH /api/payments/{payment_id}
#[utoipa::path(
    patch,
    path = "/api/payments/{payment_id}",
    tag = "Payments",
    params(("payment_id" = Uuid, Path, description = "ID do pagamento")),
    request_body = UpdatePaymentRequest,
    responses(
        (status = 200, description = "Pagamento atualizado", body = PaymentRecord),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = app_state
        .payment_service
        .update_payment(payment_id, account.id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(payment)))
}

// DELETE /api/payments/{payment_id}
#[utoipa::path(
    delete,
    path = "/api/payments/{payment_id}",
    tag = "Payments",
    params(("payment_id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 204, description = "Pagamento excluído"),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .payment_service
        .delete_payment(payment_id, account.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/payments/{payment_id}/verify
#[utoipa::path(
    post,
    path = "/api/payments/{payment_id}/verify",
    tag = "Payments",
    params(("payment_id" = Uuid, Path, description = "ID do pagamento")),
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Pagamento confirmado ou rejeitado", body = PaymentRecord),
        (status = 404, description = "Pagamento não encontrado"),
        (status = 409, description = "Pagamento não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn verify_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<VerifyPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let payment = app_state
        .payment_service
        .verify(payment_id, account.id, payload.outcome, payload.notes)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(payment)))
}

// POST /api/payments/{payment_id}/reject
#[utoipa::path(
    post,
    path = "/api/payments/{payment_id}/reject",
    tag = "Payments",
    params(("payment_id" = Uuid, Path, description = "ID do pagamento")),
    request_body = RejectPaymentRequest,
    responses(
        (status = 200, description = "Pagamento rejeitado", body = PaymentRecord),
        (status = 404, description = "Pagamento não encontrado"),
        (status = 409, description = "Pagamento não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<RejectPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let payment = app_state
        .payment_service
        .reject(payment_id, account.id, payload.notes)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(payment)))
}
