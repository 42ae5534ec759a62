// src/handlers/finance.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermFinanceiroEdit, PermFinanceiroView, RequirePermission},
    },
    models::finance::{
        CategoryList, CreateMovementPayload, FinanceStats, FinancialMovement, MovementFilter,
        MovementStatusPayload, UpdateMovementPayload,
    },
};

// GET /api/finance/movements
#[utoipa::path(
    get,
    path = "/api/finance/movements",
    tag = "Financeiro",
    params(
        ("search" = Option<String>, Query, description = "Busca por descrição ou categoria"),
        ("tipo" = Option<String>, Query, description = "receita | despesa"),
        ("status" = Option<String>, Query, description = "pendente | pago | cancelado"),
        ("dataInicio" = Option<String>, Query, description = "AAAA-MM-DD"),
        ("dataFim" = Option<String>, Query, description = "AAAA-MM-DD")
    ),
    responses((status = 200, description = "Movimentações, mais recentes primeiro", body = Vec<FinancialMovement>)),
    security(("api_jwt" = []))
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermFinanceiroView>,
    Query(filter): Query<MovementFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let movements = app_state.finance_service.list(&filter).await;
    Ok((StatusCode::OK, Json(movements)))
}

// GET /api/finance/stats
#[utoipa::path(
    get,
    path = "/api/finance/stats",
    tag = "Financeiro",
    responses((status = 200, description = "Totais financeiros", body = FinanceStats)),
    security(("api_jwt" = []))
)]
pub async fn get_finance_stats(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermFinanceiroView>,
) -> Result<impl IntoResponse, ApiError> {
    Ok((StatusCode::OK, Json(app_state.finance_service.stats().await)))
}

// GET /api/finance/categories
#[utoipa::path(
    get,
    path = "/api/finance/categories",
    tag = "Financeiro",
    responses((status = 200, description = "Categorias predefinidas", body = CategoryList)),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermFinanceiroView>,
) -> Json<CategoryList> {
    Json(app_state.finance_service.categories())
}

// GET /api/finance/movements/{id}
#[utoipa::path(
    get,
    path = "/api/finance/movements/{id}",
    tag = "Financeiro",
    params(("id" = Uuid, Path, description = "ID da movimentação")),
    responses(
        (status = 200, description = "Movimentação", body = FinancialMovement),
        (status = 404, description = "Movimentação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermFinanceiroView>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let movement = app_state
        .finance_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(movement)))
}

// POST /api/finance/movements
#[utoipa::path(
    post,
    path = "/api/finance/movements",
    tag = "Financeiro",
    request_body = CreateMovementPayload,
    responses(
        (status = 201, description = "Movimentação criada", body = FinancialMovement),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermFinanceiroEdit>,
    Json(payload): Json<CreateMovementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let movement = app_state
        .finance_service
        .create(payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(movement)))
}

// PUT /api/finance/movements/{id}
#[utoipa::path(
    put,
    path = "/api/finance/movements/{id}",
    tag = "Financeiro",
    params(("id" = Uuid, Path, description = "ID da movimentação")),
    request_body = UpdateMovementPayload,
    responses((status = 200, description = "Movimentação atualizada", body = FinancialMovement)),
    security(("api_jwt" = []))
)]
pub async fn update_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermFinanceiroEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMovementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let movement = app_state
        .finance_service
        .update(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(movement)))
}

// PATCH /api/finance/movements/{id}/status
#[utoipa::path(
    patch,
    path = "/api/finance/movements/{id}/status",
    tag = "Financeiro",
    params(("id" = Uuid, Path, description = "ID da movimentação")),
    request_body = MovementStatusPayload,
    responses((status = 200, description = "Status alterado", body = FinancialMovement)),
    security(("api_jwt" = []))
)]
pub async fn set_movement_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermFinanceiroEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MovementStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let movement = app_state
        .finance_service
        .set_status(id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(movement)))
}

// DELETE /api/finance/movements/{id}
#[utoipa::path(
    delete,
    path = "/api/finance/movements/{id}",
    tag = "Financeiro",
    params(("id" = Uuid, Path, description = "ID da movimentação")),
    responses((status = 204, description = "Movimentação excluída")),
    security(("api_jwt" = []))
)]
pub async fn delete_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermFinanceiroEdit>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .finance_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
