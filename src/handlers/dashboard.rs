// src/handlers/dashboard.rs

use axum::{extract::State, Json};

use crate::{
    config::AppState,
    middleware::rbac::{PermInicioView, RequirePermission},
    models::dashboard::DashboardSummary,
};

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses((status = 200, description = "Resumo da tela inicial", body = DashboardSummary)),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermInicioView>,
) -> Json<DashboardSummary> {
    Json(app_state.dashboard_service.get_summary().await)
}
