// src/services/dashboard_service.rs

use crate::{
    db::Database,
    models::dashboard::DashboardSummary,
    services::cargo_service::{by_collection_date_desc, cargo_stats},
};

const RECENT_CARGOES: usize = 5;

#[derive(Clone)]
pub struct DashboardService {
    db: Database,
}

impl DashboardService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn get_summary(&self) -> DashboardSummary {
        let c = self.db.read().await;

        let mut recentes = c.cargoes.to_vec();
        recentes.sort_by(by_collection_date_desc);
        recentes.truncate(RECENT_CARGOES);

        DashboardSummary {
            cargas: cargo_stats(&c.cargoes.to_vec()),
            cargas_recentes: recentes,
            total_parceiros: c.partners.len(),
            parceiros_ativos: c.partners.iter().filter(|p| p.is_active).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::{database::SeedPolicy, MemoryStorage};

    #[tokio::test]
    async fn summary_over_demo_data() {
        let db = Database::load(Arc::new(MemoryStorage::new()), SeedPolicy::Demo { bcrypt_cost: 4 })
            .await
            .unwrap();
        let summary = DashboardService::new(db).get_summary().await;

        assert_eq!(summary.cargas.total, 2);
        assert_eq!(summary.cargas.entregues, 1);
        assert_eq!(summary.cargas.em_transito, 1);
        assert_eq!(summary.total_parceiros, 2);
        // A mais recente é a de 22/01
        assert_eq!(summary.cargas_recentes[0].descricao, "Materiais de construção");
    }
}
