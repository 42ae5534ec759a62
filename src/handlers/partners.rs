// src/handlers/partners.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermParceirosEdit, PermParceirosView, RequirePermission},
    },
    models::partner::{
        CreateDriverPayload, CreatePartnerPayload, CreateVehiclePayload, Driver, DriverCandidate,
        LinkKind, LinkOptions, LinkPayload, Linkable, Partner, PartnerFilter, PartnerStats,
        SearchQuery, UnlinkPayload, UpdateDriverPayload, UpdatePartnerPayload,
        UpdateVehiclePayload, Vehicle,
    },
};

// =============================================================================
//  ÁREA 1: PARCEIROS
// =============================================================================

// GET /api/partners
#[utoipa::path(
    get,
    path = "/api/partners",
    tag = "Parceiros",
    params(
        ("search" = Option<String>, Query, description = "Busca por nome, documento ou e-mail"),
        ("tipo" = Option<String>, Query, description = "PF | PJ"),
        ("status" = Option<String>, Query, description = "active | inactive")
    ),
    responses((status = 200, description = "Parceiros ordenados por nome", body = Vec<Partner>)),
    security(("api_jwt" = []))
)]
pub async fn list_partners(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermParceirosView>,
    Query(filter): Query<PartnerFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let partners = app_state.partner_service.list(&filter).await;
    Ok((StatusCode::OK, Json(partners)))
}

// GET /api/partners/stats
#[utoipa::path(
    get,
    path = "/api/partners/stats",
    tag = "Parceiros",
    responses((status = 200, description = "Estatísticas de parceiros", body = PartnerStats)),
    security(("api_jwt" = []))
)]
pub async fn get_partner_stats(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermParceirosView>,
) -> Result<impl IntoResponse, ApiError> {
    Ok((StatusCode::OK, Json(app_state.partner_service.stats().await)))
}

// GET /api/partners/{id}
#[utoipa::path(
    get,
    path = "/api/partners/{id}",
    tag = "Parceiros",
    params(("id" = Uuid, Path, description = "ID do parceiro")),
    responses(
        (status = 200, description = "Parceiro", body = Partner),
        (status = 404, description = "Parceiro não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_partner(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosView>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let partner = app_state
        .partner_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(partner)))
}

// POST /api/partners
#[utoipa::path(
    post,
    path = "/api/partners",
    tag = "Parceiros",
    request_body = CreatePartnerPayload,
    responses(
        (status = 201, description = "Parceiro criado", body = Partner),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_partner(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosEdit>,
    Json(payload): Json<CreatePartnerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let partner = app_state
        .partner_service
        .create(payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(partner)))
}

// PUT /api/partners/{id}
#[utoipa::path(
    put,
    path = "/api/partners/{id}",
    tag = "Parceiros",
    params(("id" = Uuid, Path, description = "ID do parceiro")),
    request_body = UpdatePartnerPayload,
    responses(
        (status = 200, description = "Parceiro atualizado", body = Partner),
        (status = 404, description = "Parceiro não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_partner(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePartnerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let partner = app_state
        .partner_service
        .update(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(partner)))
}

// POST /api/partners/{id}/block
#[utoipa::path(
    post,
    path = "/api/partners/{id}/block",
    tag = "Parceiros",
    params(("id" = Uuid, Path, description = "ID do parceiro")),
    responses((status = 200, description = "Parceiro bloqueado", body = Partner)),
    security(("api_jwt" = []))
)]
pub async fn block_partner(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosEdit>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let partner = app_state
        .partner_service
        .block(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(partner)))
}

// POST /api/partners/{id}/unblock
#[utoipa::path(
    post,
    path = "/api/partners/{id}/unblock",
    tag = "Parceiros",
    params(("id" = Uuid, Path, description = "ID do parceiro")),
    responses((status = 200, description = "Parceiro desbloqueado", body = Partner)),
    security(("api_jwt" = []))
)]
pub async fn unblock_partner(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosEdit>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let partner = app_state
        .partner_service
        .unblock(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(partner)))
}

// DELETE /api/partners/{id}
// Remove também motoristas, veículos e as referências em cargas e movimentações
#[utoipa::path(
    delete,
    path = "/api/partners/{id}",
    tag = "Parceiros",
    params(("id" = Uuid, Path, description = "ID do parceiro")),
    responses((status = 204, description = "Parceiro excluído")),
    security(("api_jwt" = []))
)]
pub async fn delete_partner(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosEdit>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .partner_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: MOTORISTAS
// =============================================================================

// GET /api/partners/{id}/drivers
#[utoipa::path(
    get,
    path = "/api/partners/{id}/drivers",
    tag = "Motoristas",
    params(
        ("id" = Uuid, Path, description = "ID do parceiro"),
        ("search" = Option<String>, Query, description = "Busca por nome")
    ),
    responses((status = 200, description = "Motoristas do parceiro", body = Vec<Driver>)),
    security(("api_jwt" = []))
)]
pub async fn list_partner_drivers(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosView>,
    Path(id): Path<Uuid>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let drivers = app_state
        .partner_service
        .list_drivers(id, query.search.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(drivers)))
}

// POST /api/partners/{id}/drivers
#[utoipa::path(
    post,
    path = "/api/partners/{id}/drivers",
    tag = "Motoristas",
    params(("id" = Uuid, Path, description = "ID do parceiro")),
    request_body = CreateDriverPayload,
    responses(
        (status = 201, description = "Motorista criado", body = Driver),
        (status = 404, description = "Parceiro não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_driver(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateDriverPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let driver = app_state
        .partner_service
        .create_driver(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(driver)))
}

// GET /api/drivers/{id}
#[utoipa::path(
    get,
    path = "/api/drivers/{id}",
    tag = "Motoristas",
    params(("id" = Uuid, Path, description = "ID do motorista")),
    responses(
        (status = 200, description = "Motorista", body = Driver),
        (status = 404, description = "Motorista não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_driver(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosView>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let driver = app_state
        .partner_service
        .get_driver(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(driver)))
}

// PUT /api/drivers/{id}
#[utoipa::path(
    put,
    path = "/api/drivers/{id}",
    tag = "Motoristas",
    params(("id" = Uuid, Path, description = "ID do motorista")),
    request_body = UpdateDriverPayload,
    responses((status = 200, description = "Motorista atualizado", body = Driver)),
    security(("api_jwt" = []))
)]
pub async fn update_driver(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDriverPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let driver = app_state
        .partner_service
        .update_driver(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(driver)))
}

// DELETE /api/drivers/{id}
#[utoipa::path(
    delete,
    path = "/api/drivers/{id}",
    tag = "Motoristas",
    params(("id" = Uuid, Path, description = "ID do motorista")),
    responses((status = 204, description = "Motorista excluído")),
    security(("api_jwt" = []))
)]
pub async fn delete_driver(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosEdit>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .partner_service
        .delete_driver(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 3: VEÍCULOS
// =============================================================================

// GET /api/partners/{id}/vehicles
#[utoipa::path(
    get,
    path = "/api/partners/{id}/vehicles",
    tag = "Veículos",
    params(
        ("id" = Uuid, Path, description = "ID do parceiro"),
        ("search" = Option<String>, Query, description = "Busca por qualquer placa")
    ),
    responses((status = 200, description = "Veículos do parceiro", body = Vec<Vehicle>)),
    security(("api_jwt" = []))
)]
pub async fn list_partner_vehicles(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosView>,
    Path(id): Path<Uuid>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicles = app_state
        .partner_service
        .list_vehicles(id, query.search.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(vehicles)))
}

// POST /api/partners/{id}/vehicles
#[utoipa::path(
    post,
    path = "/api/partners/{id}/vehicles",
    tag = "Veículos",
    params(("id" = Uuid, Path, description = "ID do parceiro")),
    request_body = CreateVehiclePayload,
    responses(
        (status = 201, description = "Veículo criado", body = Vehicle),
        (status = 400, description = "Configuração inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_vehicle(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateVehiclePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let vehicle = app_state
        .partner_service
        .create_vehicle(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(vehicle)))
}

// GET /api/vehicles/{id}
#[utoipa::path(
    get,
    path = "/api/vehicles/{id}",
    tag = "Veículos",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    responses(
        (status = 200, description = "Veículo", body = Vehicle),
        (status = 404, description = "Veículo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_vehicle(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosView>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicle = app_state
        .partner_service
        .get_vehicle(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(vehicle)))
}

// PUT /api/vehicles/{id}
#[utoipa::path(
    put,
    path = "/api/vehicles/{id}",
    tag = "Veículos",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    request_body = UpdateVehiclePayload,
    responses((status = 200, description = "Veículo atualizado", body = Vehicle)),
    security(("api_jwt" = []))
)]
pub async fn update_vehicle(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVehiclePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let vehicle = app_state
        .partner_service
        .update_vehicle(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(vehicle)))
}

// DELETE /api/vehicles/{id}
#[utoipa::path(
    delete,
    path = "/api/vehicles/{id}",
    tag = "Veículos",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    responses((status = 204, description = "Veículo excluído")),
    security(("api_jwt" = []))
)]
pub async fn delete_vehicle(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosEdit>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .partner_service
        .delete_vehicle(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 4: VÍNCULOS MOTORISTA ↔ VEÍCULO
// =============================================================================

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidateQuery {
    pub parceiro_id: Option<Uuid>,
}

fn parse_linkable(kind: LinkKind, raw: &str, field: &'static str) -> Result<Linkable, AppError> {
    kind.parse(raw)
        .map_err(|_| AppError::invalid_field(field, "invalid_id", "Identificador inválido."))
}

// GET /api/partners/driver-candidates
#[utoipa::path(
    get,
    path = "/api/partners/driver-candidates",
    tag = "Vínculos",
    params(("parceiroId" = Option<Uuid>, Query, description = "Restringe a um parceiro")),
    responses((status = 200, description = "Motoristas cadastrados e parceiros PF motoristas", body = Vec<DriverCandidate>)),
    security(("api_jwt" = []))
)]
pub async fn list_driver_candidates(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermParceirosView>,
    Query(query): Query<CandidateQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let candidates = app_state
        .linkage_service
        .driver_candidates(query.parceiro_id)
        .await;

    Ok((StatusCode::OK, Json(candidates)))
}

// GET /api/partners/{id}/link-options
#[utoipa::path(
    get,
    path = "/api/partners/{id}/link-options",
    tag = "Vínculos",
    params(("id" = Uuid, Path, description = "ID do parceiro")),
    responses((status = 200, description = "Opções de vínculo do parceiro", body = LinkOptions)),
    security(("api_jwt" = []))
)]
pub async fn get_link_options(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosView>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let options = app_state
        .linkage_service
        .link_options(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(options)))
}

// POST /api/partners/links
#[utoipa::path(
    post,
    path = "/api/partners/links",
    tag = "Vínculos",
    request_body = LinkPayload,
    responses(
        (status = 204, description = "Vínculo atualizado"),
        (status = 400, description = "Identificador inválido"),
        (status = 422, description = "Vínculo inválido"),
        (status = 404, description = "Motorista ou veículo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn link(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosEdit>,
    Json(payload): Json<LinkPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let source = parse_linkable(payload.kind, &payload.source_id, "sourceId")
        .map_err(|e| e.to_api_error(&locale))?;

    // O destino é sempre do tipo oposto ao da origem
    let target = payload
        .target_id
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_linkable(payload.kind.opposite(), raw, "targetId"))
        .transpose()
        .map_err(|e| e.to_api_error(&locale))?;

    app_state
        .linkage_service
        .link(source, target)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/partners/links
#[utoipa::path(
    delete,
    path = "/api/partners/links",
    tag = "Vínculos",
    request_body = UnlinkPayload,
    responses((status = 204, description = "Vínculo removido")),
    security(("api_jwt" = []))
)]
pub async fn unlink(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermParceirosEdit>,
    Json(payload): Json<UnlinkPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let item = parse_linkable(payload.kind, &payload.id, "id").map_err(|e| e.to_api_error(&locale))?;

    app_state
        .linkage_service
        .unlink(item)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
