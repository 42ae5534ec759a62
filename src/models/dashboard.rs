// src/models/dashboard.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::cargo::{Cargo, CargoStats};

// Cards e lista da página inicial
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub cargas: CargoStats,         // Contagem por status e valor total
    pub cargas_recentes: Vec<Cargo>, // As 5 mais recentes por data de coleta
    pub total_parceiros: usize,
    pub parceiros_ativos: usize,
}
