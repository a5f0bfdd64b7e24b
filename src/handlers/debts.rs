// src/handlers/debts.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        debt::{CreateDebtRequest, DebtView, UpcomingPayment, UpdateDebtRequest},
        payment::{PaymentRecord, PaymentSummary},
        schedule::ScheduleLine,
    },
};

const DEFAULT_UPCOMING_DAYS: i64 = 30;

#[derive(Debug, Deserialize, IntoParams)]
pub struct UpcomingQuery {
    /// Janela em dias (padrão 30)
    pub days: Option<i64>,
}

// POST /api/debts
#[utoipa::path(
    post,
    path = "/api/debts",
    tag = "Debts",
    request_body = CreateDebtRequest,
    responses(
        (status = 201, description = "Dívida criada", body = DebtView),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Contato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_debt(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
    Json(payload): Json<CreateDebtRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let debt = app_state
        .debt_service
        .create(account.id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(debt)))
}

// GET /api/debts
#[utoipa::path(
    get,
    path = "/api/debts",
    tag = "Debts",
    responses(
        (status = 200, description = "Dívidas próprias e em que a conta é contraparte", body = Vec<DebtView>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_debts(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let debts = app_state
        .debt_service
        .list_debts(account.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(debts)))
}

// GET /api/debts/upcoming?days=N
#[utoipa::path(
    get,
    path = "/api/debts/upcoming",
    tag = "Debts",
    params(UpcomingQuery),
    responses(
        (status = 200, description = "Próximos vencimentos", body = Vec<UpcomingPayment>)
    ),
    security(("api_jwt" = []))
)]
pub async fn upcoming_payments(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
    Query(query): Query<UpcomingQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let upcoming = app_state
        .debt_service
        .upcoming_payments(account.id, query.days.unwrap_or(DEFAULT_UPCOMING_DAYS))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(upcoming)))
}

// GET /api/debts/overdue
#[utoipa::path(
    get,
    path = "/api/debts/overdue",
    tag = "Debts",
    responses(
        (status = 200, description = "Dívidas em atraso", body = Vec<DebtView>)
    ),
    security(("api_jwt" = []))
)]
pub async fn overdue_debts(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let debts = app_state
        .debt_service
        .overdue_debts(account.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(debts)))
}

// GET /api/debts/{debt_id}
#[utoipa::path(
    get,
    path = "/api/debts/{debt_id}",
    tag = "Debts",
    params(("debt_id" = Uuid, Path, description = "ID da dívida")),
    responses(
        (status = 200, description = "Dívida na perspectiva de quem consulta", body = DebtView),
        (status = 404, description = "Dívida não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_debt(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
    Path(debt_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let debt = app_state
        .debt_service
        .get_debt(debt_id, account.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(debt)))
}

// PUT /api/debts/{debt_id}
#[utoipa::path(
    put,
    path = "/api/debts/{debt_id}",
    tag = "Debts",
    params(("debt_id" = Uuid, Path, description = "ID da dívida")),
    request_body = UpdateDebtRequest,
    responses(
        (status = 200, description = "Dívida atualizada", body = DebtView),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Dívida não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_debt(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
    Path(debt_id): Path<Uuid>,
    Json(payload): Json<UpdateDebtRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let debt = app_state
        .debt_service
        .update(debt_id, account.id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(debt)))
}

// DELETE /api/debts/{debt_id}
#[utoipa::path(
    delete,
    path = "/api/debts/{debt_id}",
    tag = "Debts",
    params(("debt_id" = Uuid, Path, description = "ID da dívida")),
    responses(
        (status = 204, description = "Dívida excluída"),
        (status = 404, description = "Dívida não encontrada"),
        (status = 409, description = "Dívida possui pagamentos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_debt(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
    Path(debt_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .debt_service
        .delete(debt_id, account.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/debts/{debt_id}/schedule
#[utoipa::path(
    get,
    path = "/api/debts/{debt_id}/schedule",
    tag = "Debts",
    params(("debt_id" = Uuid, Path, description = "ID da dívida")),
    responses(
        (status = 200, description = "Cronograma de parcelas", body = Vec<ScheduleLine>),
        (status = 404, description = "Dívida não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_schedule(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
    Path(debt_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let lines = app_state
        .debt_service
        .payment_schedule(debt_id, account.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(lines)))
}

// GET /api/debts/{debt_id}/summary
#[utoipa::path(
    get,
    path = "/api/debts/{debt_id}/summary",
    tag = "Debts",
    params(("debt_id" = Uuid, Path, description = "ID da dívida")),
    responses(
        (status = 200, description = "Resumo de pagamentos", body = PaymentSummary),
        (status = 404, description = "Dívida não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
    Path(debt_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .debt_service
        .payment_summary(debt_id, account.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/debts/{debt_id}/payments
#[utoipa::path(
    get,
    path = "/api/debts/{debt_id}/payments",
    tag = "Debts",
    params(("debt_id" = Uuid, Path, description = "ID da dívida")),
    responses(
        (status = 200, description = "Pagamentos da dívida", body = Vec<PaymentRecord>),
        (status = 404, description = "Dívida não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_debt_payments(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(account): AuthenticatedUser,
    Path(debt_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = app_state
        .payment_service
        .list_payments(debt_id, account.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(payments)))
}
