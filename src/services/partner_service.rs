// src/services/partner_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PartnerRepository,
    models::{
        entity::EntityKind,
        partner::{
            CreateDriverPayload, CreatePartnerPayload, CreateVehiclePayload, Driver, Partner,
            PartnerFilter, PartnerStats, PartnerType, UpdateDriverPayload, UpdatePartnerPayload,
            UpdateVehiclePayload, Vehicle,
        },
    },
};

fn contains(field: Option<&str>, term: &str) -> bool {
    field.is_some_and(|value| value.to_lowercase().contains(term))
}

/// Filtra e ordena por nome.
pub fn filter_partners(partners: &[Partner], filter: &PartnerFilter) -> Vec<Partner> {
    let search = filter.search.as_deref().map(str::to_lowercase);
    let mut result: Vec<Partner> = partners
        .iter()
        .filter(|p| {
            search.as_deref().is_none_or(|term| {
                contains(p.nome.as_deref(), term)
                    || contains(p.documento.as_deref(), term)
                    || contains(p.email.as_deref(), term)
            })
        })
        .filter(|p| filter.tipo.is_none_or(|t| p.tipo == t))
        .filter(|p| filter.status.is_none_or(|s| s.matches(p.is_active)))
        .cloned()
        .collect();

    result.sort_by_key(|p| p.nome.as_deref().unwrap_or_default().to_lowercase());
    result
}

pub fn partner_stats(partners: &[Partner], total_motoristas: usize, total_veiculos: usize) -> PartnerStats {
    PartnerStats {
        total_parceiros: partners.len(),
        parceiros_ativos: partners.iter().filter(|p| p.is_active).count(),
        total_motoristas,
        total_veiculos,
        parceiros_pf: partners.iter().filter(|p| p.tipo == PartnerType::Pf).count(),
        parceiros_pj: partners.iter().filter(|p| p.tipo == PartnerType::Pj).count(),
    }
}

pub fn search_drivers(drivers: Vec<Driver>, search: Option<&str>) -> Vec<Driver> {
    match search.map(str::to_lowercase) {
        Some(term) => drivers
            .into_iter()
            .filter(|d| d.nome.to_lowercase().contains(&term))
            .collect(),
        None => drivers,
    }
}

pub fn search_vehicles(vehicles: Vec<Vehicle>, search: Option<&str>) -> Vec<Vehicle> {
    match search {
        Some(term) => vehicles.into_iter().filter(|v| v.matches_plate(term)).collect(),
        None => vehicles,
    }
}

#[derive(Clone)]
pub struct PartnerService {
    repo: PartnerRepository,
}

impl PartnerService {
    pub fn new(repo: PartnerRepository) -> Self {
        Self { repo }
    }

    // --- PARCEIROS ---

    pub async fn list(&self, filter: &PartnerFilter) -> Vec<Partner> {
        filter_partners(&self.repo.list_partners().await, filter)
    }

    pub async fn stats(&self) -> PartnerStats {
        let partners = self.repo.list_partners().await;
        let drivers = self.repo.list_drivers().await.len();
        let vehicles = self.repo.list_vehicles().await.len();
        partner_stats(&partners, drivers, vehicles)
    }

    pub async fn get(&self, id: Uuid) -> Result<Partner, AppError> {
        self.repo
            .find_partner(id)
            .await
            .ok_or_else(|| AppError::not_found(EntityKind::Partner, id))
    }

    pub async fn create(&self, payload: CreatePartnerPayload) -> Result<Partner, AppError> {
        self.repo.create_partner(payload).await
    }

    pub async fn update(&self, id: Uuid, payload: UpdatePartnerPayload) -> Result<Partner, AppError> {
        self.repo.update_partner(id, payload).await
    }

    pub async fn block(&self, id: Uuid) -> Result<Partner, AppError> {
        let partner = self.repo.set_partner_active(id, false).await?;
        tracing::info!("🔒 Parceiro {} bloqueado", id);
        Ok(partner)
    }

    pub async fn unblock(&self, id: Uuid) -> Result<Partner, AppError> {
        let partner = self.repo.set_partner_active(id, true).await?;
        tracing::info!("🔓 Parceiro {} desbloqueado", id);
        Ok(partner)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.repo.delete_partner(id).await
    }

    // --- MOTORISTAS ---

    pub async fn list_drivers(&self, parceiro_id: Uuid, search: Option<&str>) -> Result<Vec<Driver>, AppError> {
        self.get(parceiro_id).await?;
        Ok(search_drivers(self.repo.list_drivers_by_partner(parceiro_id).await, search))
    }

    pub async fn get_driver(&self, id: Uuid) -> Result<Driver, AppError> {
        self.repo
            .find_driver(id)
            .await
            .ok_or_else(|| AppError::not_found(EntityKind::Driver, id))
    }

    pub async fn create_driver(&self, parceiro_id: Uuid, payload: CreateDriverPayload) -> Result<Driver, AppError> {
        self.repo.create_driver(parceiro_id, payload).await
    }

    pub async fn update_driver(&self, id: Uuid, payload: UpdateDriverPayload) -> Result<Driver, AppError> {
        self.repo.update_driver(id, payload).await
    }

    pub async fn delete_driver(&self, id: Uuid) -> Result<bool, AppError> {
        self.repo.delete_driver(id).await
    }

    // --- VEÍCULOS ---

    pub async fn list_vehicles(&self, parceiro_id: Uuid, search: Option<&str>) -> Result<Vec<Vehicle>, AppError> {
        self.get(parceiro_id).await?;
        Ok(search_vehicles(self.repo.list_vehicles_by_partner(parceiro_id).await, search))
    }

    pub async fn get_vehicle(&self, id: Uuid) -> Result<Vehicle, AppError> {
        self.repo
            .find_vehicle(id)
            .await
            .ok_or_else(|| AppError::not_found(EntityKind::Vehicle, id))
    }

    pub async fn create_vehicle(&self, parceiro_id: Uuid, payload: CreateVehiclePayload) -> Result<Vehicle, AppError> {
        self.repo.create_vehicle(parceiro_id, payload).await
    }

    pub async fn update_vehicle(&self, id: Uuid, payload: UpdateVehiclePayload) -> Result<Vehicle, AppError> {
        self.repo.update_vehicle(id, payload).await
    }

    pub async fn delete_vehicle(&self, id: Uuid) -> Result<bool, AppError> {
        self.repo.delete_vehicle(id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::auth::ActiveFilter;

    fn partner(nome: &str, tipo: PartnerType, is_active: bool) -> Partner {
        let now = Utc::now();
        Partner {
            id: Uuid::new_v4(),
            tipo,
            nome: Some(nome.into()),
            documento: None,
            email: Some(format!("{}@email.com", nome.to_lowercase())),
            telefone: None,
            endereco: None,
            cidade: None,
            estado: None,
            cep: None,
            observacoes: None,
            is_active,
            is_motorista: false,
            cnh: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn filter_sorts_by_name_and_honors_status() {
        let partners = vec![
            partner("Zeta", PartnerType::Pj, true),
            partner("alfa", PartnerType::Pf, true),
            partner("Beta", PartnerType::Pf, false),
        ];

        let all = filter_partners(&partners, &PartnerFilter::default());
        let names: Vec<_> = all.iter().filter_map(|p| p.nome.as_deref()).collect();
        assert_eq!(names, ["alfa", "Beta", "Zeta"]);

        let inactive = filter_partners(
            &partners,
            &PartnerFilter {
                status: Some(ActiveFilter::Inactive),
                ..Default::default()
            },
        );
        assert_eq!(inactive.len(), 1);

        let by_email = filter_partners(
            &partners,
            &PartnerFilter {
                search: Some("ZETA@".into()),
                ..Default::default()
            },
        );
        assert_eq!(by_email.len(), 1);
    }

    #[test]
    fn stats_split_pf_and_pj() {
        let partners = vec![
            partner("A", PartnerType::Pj, true),
            partner("B", PartnerType::Pf, false),
        ];
        let stats = partner_stats(&partners, 3, 4);
        assert_eq!(stats.parceiros_ativos, 1);
        assert_eq!(stats.parceiros_pf, 1);
        assert_eq!(stats.parceiros_pj, 1);
        assert_eq!(stats.total_veiculos, 4);
    }
}
