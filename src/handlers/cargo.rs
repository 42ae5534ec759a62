// src/handlers/cargo.rs

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
        rbac::{PermCargasEdit, PermCargasView, RequirePermission},
    },
    models::cargo::{
        Cargo, CargoFilter, CargoLinkOptions, CargoLinkPayload, CargoLinkQuery, CargoLinkSelection,
        CargoStats, CargoStatusPayload, CreateCargoPayload, UpdateCargoPayload,
    },
};

// GET /api/cargoes
#[utoipa::path(
    get,
    path = "/api/cargoes",
    tag = "Cargas",
    params(
        ("search" = Option<String>, Query, description = "Busca por CRT, origem ou destino"),
        ("status" = Option<String>, Query, description = "a_coletar | em_transito | armazenada | entregue | cancelada"),
        ("dataInicio" = Option<String>, Query, description = "AAAA-MM-DD"),
        ("dataFim" = Option<String>, Query, description = "AAAA-MM-DD")
    ),
    responses((status = 200, description = "Cargas por data de coleta", body = Vec<Cargo>)),
    security(("api_jwt" = []))
)]
pub async fn list_cargoes(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermCargasView>,
    Query(filter): Query<CargoFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let cargoes = app_state.cargo_service.list(&filter).await;
    Ok((StatusCode::OK, Json(cargoes)))
}

// GET /api/cargoes/stats
#[utoipa::path(
    get,
    path = "/api/cargoes/stats",
    tag = "Cargas",
    responses((status = 200, description = "Totais por status", body = CargoStats)),
    security(("api_jwt" = []))
)]
pub async fn get_cargo_stats(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermCargasView>,
) -> Result<impl IntoResponse, ApiError> {
    Ok((StatusCode::OK, Json(app_state.cargo_service.stats().await)))
}

// GET /api/cargoes/link-options
#[utoipa::path(
    get,
    path = "/api/cargoes/link-options",
    tag = "Cargas",
    params(
        ("cargaId" = Option<Uuid>, Query, description = "Carga sendo vinculada"),
        ("parceiroId" = Option<Uuid>, Query, description = "Parceiro escolhido"),
        ("motorista" = Option<String>, Query, description = "<uuid> ou <uuid>_as_driver")
    ),
    responses((status = 200, description = "Seleção e opções do diálogo", body = CargoLinkOptions)),
    security(("api_jwt" = []))
)]
pub async fn get_cargo_link_options(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCargasView>,
    Query(query): Query<CargoLinkQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let options = app_state
        .cargo_service
        .link_options(query)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(options)))
}

// GET /api/cargoes/{id}
#[utoipa::path(
    get,
    path = "/api/cargoes/{id}",
    tag = "Cargas",
    params(("id" = Uuid, Path, description = "ID da carga")),
    responses(
        (status = 200, description = "Carga", body = Cargo),
        (status = 404, description = "Carga não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_cargo(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCargasView>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let cargo = app_state
        .cargo_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(cargo)))
}

// POST /api/cargoes
#[utoipa::path(
    post,
    path = "/api/cargoes",
    tag = "Cargas",
    request_body = CreateCargoPayload,
    responses(
        (status = 201, description = "Carga criada", body = Cargo),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_cargo(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCargasEdit>,
    Json(payload): Json<CreateCargoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let cargo = app_state
        .cargo_service
        .create(payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(cargo)))
}

// PUT /api/cargoes/{id}
#[utoipa::path(
    put,
    path = "/api/cargoes/{id}",
    tag = "Cargas",
    params(("id" = Uuid, Path, description = "ID da carga")),
    request_body = UpdateCargoPayload,
    responses((status = 200, description = "Carga atualizada", body = Cargo)),
    security(("api_jwt" = []))
)]
pub async fn update_cargo(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCargasEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCargoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let cargo = app_state
        .cargo_service
        .update(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(cargo)))
}

// PATCH /api/cargoes/{id}/status
#[utoipa::path(
    patch,
    path = "/api/cargoes/{id}/status",
    tag = "Cargas",
    params(("id" = Uuid, Path, description = "ID da carga")),
    request_body = CargoStatusPayload,
    responses((status = 200, description = "Status alterado", body = Cargo)),
    security(("api_jwt" = []))
)]
pub async fn change_cargo_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCargasEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CargoStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let cargo = app_state
        .cargo_service
        .change_status(id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(cargo)))
}

// PUT /api/cargoes/{id}/link
// Campos ausentes desvinculam
#[utoipa::path(
    put,
    path = "/api/cargoes/{id}/link",
    tag = "Cargas",
    params(("id" = Uuid, Path, description = "ID da carga")),
    request_body = CargoLinkSelection,
    responses(
        (status = 200, description = "Vínculo salvo", body = Cargo),
        (status = 422, description = "Motorista ou veículo de outro parceiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn link_cargo(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCargasEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CargoLinkPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let cargo = app_state
        .cargo_service
        .link_cargo(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(cargo)))
}

// DELETE /api/cargoes/{id}
#[utoipa::path(
    delete,
    path = "/api/cargoes/{id}",
    tag = "Cargas",
    params(("id" = Uuid, Path, description = "ID da carga")),
    responses((status = 204, description = "Carga excluída")),
    security(("api_jwt" = []))
)]
pub async fn delete_cargo(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCargasEdit>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .cargo_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
