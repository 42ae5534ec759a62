// src/db/partner_repo.rs

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{database::Collections, Database},
    models::{
        entity::EntityKind,
        partner::{
            CreateDriverPayload, CreatePartnerPayload, CreateVehiclePayload, Driver, DriverRef,
            Partner, PartnerType, UpdateDriverPayload, UpdatePartnerPayload, UpdateVehiclePayload,
            Vehicle,
        },
    },
};

/// Parceiros e os registros que pertencem a eles (motoristas e veículos).
#[derive(Clone)]
pub struct PartnerRepository {
    db: Database,
}

fn check_partner(partner: &Partner) -> Result<(), AppError> {
    if partner.is_motorista && partner.tipo != PartnerType::Pf {
        return Err(AppError::invalid_field(
            "isMotorista",
            "pf_only",
            "Apenas parceiros PF podem ser marcados como motorista.",
        ));
    }
    Ok(())
}

// Parceiro que deixou de ser motorista perde os vínculos com veículos e cargas
fn release_partner_driver(c: &mut Collections, now: DateTime<Utc>, partner: &Partner) -> usize {
    if partner.acts_as_driver() {
        return 0;
    }
    forget_driver(c, now, DriverRef::Partner(partner.id))
}

/// Remove as referências a um motorista apagado.
fn forget_driver(c: &mut Collections, now: DateTime<Utc>, driver: DriverRef) -> usize {
    let vehicles = c.vehicles.update_where(
        now,
        |v| v.motorista_vinculado == Some(driver),
        |v| v.motorista_vinculado = None,
    );
    let cargoes = c.cargoes.update_where(
        now,
        |cg| cg.motorista_id == Some(driver),
        |cg| cg.motorista_id = None,
    );
    vehicles + cargoes
}

/// Remove as referências a um veículo apagado.
fn forget_vehicle(c: &mut Collections, now: DateTime<Utc>, vehicle_id: Uuid) -> usize {
    let drivers = c.drivers.update_where(
        now,
        |d| d.veiculo_vinculado == Some(vehicle_id),
        |d| d.veiculo_vinculado = None,
    );
    let cargoes = c.cargoes.update_where(
        now,
        |cg| cg.veiculo_id == Some(vehicle_id),
        |cg| cg.veiculo_id = None,
    );
    drivers + cargoes
}

impl PartnerRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // --- PARCEIROS ---

    pub async fn list_partners(&self) -> Vec<Partner> {
        self.db.read().await.partners.to_vec()
    }

    pub async fn find_partner(&self, id: Uuid) -> Option<Partner> {
        self.db.read().await.partners.get(id).cloned()
    }

    pub async fn create_partner(&self, payload: CreatePartnerPayload) -> Result<Partner, AppError> {
        self.db
            .transaction(move |c, now| {
                let partner = Partner {
                    id: Uuid::nil(),
                    tipo: payload.tipo,
                    nome: payload.nome,
                    documento: payload.documento,
                    email: payload.email,
                    telefone: payload.telefone,
                    endereco: payload.endereco,
                    cidade: payload.cidade,
                    estado: payload.estado,
                    cep: payload.cep,
                    observacoes: payload.observacoes,
                    is_active: true,
                    is_motorista: payload.is_motorista,
                    cnh: payload.cnh,
                    created_at: now,
                    updated_at: now,
                };
                check_partner(&partner)?;

                Ok(c.partners.create(now, |id, _| Partner { id, ..partner }))
            })
            .await
    }

    pub async fn update_partner(
        &self,
        id: Uuid,
        payload: UpdatePartnerPayload,
    ) -> Result<Partner, AppError> {
        let marks_driver = payload.is_motorista == Some(true);
        self.db
            .transaction(move |c, now| {
                let updated = c
                    .partners
                    .update(id, now, |p| {
                        payload.apply(p);
                        // Virar PJ desmarca o motorista, a menos que o pedido o remarque
                        if p.tipo == PartnerType::Pj && !marks_driver {
                            p.is_motorista = false;
                        }
                    })
                    .ok_or_else(|| AppError::not_found(EntityKind::Partner, id))?;
                check_partner(&updated)?;
                let released = release_partner_driver(c, now, &updated);
                if released > 0 {
                    tracing::info!("🔗 Parceiro {} deixou de ser motorista; {} vínculos desfeitos", id, released);
                }
                Ok(updated)
            })
            .await
    }

    /// Bloqueia/desbloqueia (`isActive`).
    pub async fn set_partner_active(&self, id: Uuid, is_active: bool) -> Result<Partner, AppError> {
        self.db
            .transaction(move |c, now| {
                c.partners
                    .update(id, now, |p| p.is_active = is_active)
                    .ok_or_else(|| AppError::not_found(EntityKind::Partner, id))
            })
            .await
    }

    /// Exclui o parceiro com seus motoristas e veículos.
    pub async fn delete_partner(&self, id: Uuid) -> Result<bool, AppError> {
        self.db
            .transaction(move |c, now| {
                if !c.partners.remove(id) {
                    return Ok(false);
                }

                let drivers = c.drivers.retain(|d| d.parceiro_id != id);
                let vehicles = c.vehicles.retain(|v| v.parceiro_id != id);

                let mut references = forget_driver(c, now, DriverRef::Partner(id));
                for driver in &drivers {
                    references += forget_driver(c, now, DriverRef::Registered(driver.id));
                }
                for vehicle in &vehicles {
                    references += forget_vehicle(c, now, vehicle.id);
                }

                let movements = c.movements.update_where(
                    now,
                    |m| m.parceiro_id == Some(id),
                    |m| m.parceiro_id = None,
                );
                let cargoes = c.cargoes.update_where(
                    now,
                    |cg| cg.parceiro_id == Some(id),
                    |cg| cg.parceiro_id = None,
                );

                tracing::info!(
                    "🗑️ Parceiro {} excluído: {} motoristas, {} veículos removidos; {} movimentações e {} cargas desvinculadas; {} referências limpas",
                    id,
                    drivers.len(),
                    vehicles.len(),
                    movements,
                    cargoes,
                    references,
                );
                Ok(true)
            })
            .await
    }

    // --- MOTORISTAS ---

    pub async fn list_drivers(&self) -> Vec<Driver> {
        self.db.read().await.drivers.to_vec()
    }

    pub async fn find_driver(&self, id: Uuid) -> Option<Driver> {
        self.db.read().await.drivers.get(id).cloned()
    }

    pub async fn list_drivers_by_partner(&self, parceiro_id: Uuid) -> Vec<Driver> {
        self.db.read().await.drivers.filter_by_partner(parceiro_id)
    }

    pub async fn create_driver(
        &self,
        parceiro_id: Uuid,
        payload: CreateDriverPayload,
    ) -> Result<Driver, AppError> {
        self.db
            .transaction(move |c, now| {
                c.ensure_partner(parceiro_id)?;
                Ok(c.drivers.create(now, |id, now| Driver {
                    id,
                    parceiro_id,
                    nome: payload.nome,
                    cpf: payload.cpf,
                    cnh: payload.cnh,
                    categoria_cnh: payload.categoria_cnh,
                    validade_cnh: payload.validade_cnh,
                    telefone: payload.telefone,
                    is_active: true,
                    veiculo_vinculado: None,
                    created_at: now,
                    updated_at: now,
                }))
            })
            .await
    }

    pub async fn update_driver(&self, id: Uuid, payload: UpdateDriverPayload) -> Result<Driver, AppError> {
        self.db
            .transaction(move |c, now| {
                c.drivers
                    .update(id, now, |d| payload.apply(d))
                    .ok_or_else(|| AppError::not_found(EntityKind::Driver, id))
            })
            .await
    }

    pub async fn delete_driver(&self, id: Uuid) -> Result<bool, AppError> {
        self.db
            .transaction(move |c, now| {
                if !c.drivers.remove(id) {
                    return Ok(false);
                }
                let references = forget_driver(c, now, DriverRef::Registered(id));
                tracing::info!("🗑️ Motorista {} excluído; {} referências limpas", id, references);
                Ok(true)
            })
            .await
    }

    // --- VEÍCULOS ---

    pub async fn list_vehicles(&self) -> Vec<Vehicle> {
        self.db.read().await.vehicles.to_vec()
    }

    pub async fn find_vehicle(&self, id: Uuid) -> Option<Vehicle> {
        self.db.read().await.vehicles.get(id).cloned()
    }

    pub async fn list_vehicles_by_partner(&self, parceiro_id: Uuid) -> Vec<Vehicle> {
        self.db.read().await.vehicles.filter_by_partner(parceiro_id)
    }

    pub async fn create_vehicle(
        &self,
        parceiro_id: Uuid,
        payload: CreateVehiclePayload,
    ) -> Result<Vehicle, AppError> {
        payload.configuracao.check()?;
        self.db
            .transaction(move |c, now| {
                c.ensure_partner(parceiro_id)?;
                let vehicle = c.vehicles.create(now, |id, now| Vehicle {
                    id,
                    parceiro_id,
                    configuracao: payload.configuracao,
                    fabricante: payload.fabricante,
                    modelo: payload.modelo,
                    ano: payload.ano,
                    chassis: payload.chassis,
                    carroceria: payload.carroceria,
                    capacidade: payload.capacidade,
                    motorista_vinculado: None,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                });
                tracing::info!("🚚 Veículo {} cadastrado para o parceiro {}", vehicle.configuracao.main_plate(), parceiro_id);
                Ok(vehicle)
            })
            .await
    }

    pub async fn update_vehicle(
        &self,
        id: Uuid,
        payload: UpdateVehiclePayload,
    ) -> Result<Vehicle, AppError> {
        if let Some(config) = &payload.configuracao {
            config.check()?;
        }
        self.db
            .transaction(move |c, now| {
                c.vehicles
                    .update(id, now, |v| payload.apply(v))
                    .ok_or_else(|| AppError::not_found(EntityKind::Vehicle, id))
            })
            .await
    }

    pub async fn delete_vehicle(&self, id: Uuid) -> Result<bool, AppError> {
        self.db
            .transaction(move |c, now| {
                if !c.vehicles.remove(id) {
                    return Ok(false);
                }
                let references = forget_vehicle(c, now, id);
                tracing::info!("🗑️ Veículo {} excluído; {} referências limpas", id, references);
                Ok(true)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::{
        database::SeedPolicy,
        seed::{blank_cargo, blank_movement},
        storage::MemoryStorage,
    };
    use crate::models::partner::VehicleConfig;

    async fn repo() -> PartnerRepository {
        let db = Database::load(Arc::new(MemoryStorage::new()), SeedPolicy::Empty)
            .await
            .unwrap();
        PartnerRepository::new(db)
    }

    fn partner_payload(tipo: PartnerType, is_motorista: bool) -> CreatePartnerPayload {
        CreatePartnerPayload {
            tipo,
            nome: Some("Carlos Oliveira".into()),
            documento: None,
            email: None,
            telefone: None,
            endereco: None,
            cidade: None,
            estado: None,
            cep: None,
            observacoes: None,
            is_motorista,
            cnh: None,
        }
    }

    fn driver_payload(nome: &str) -> CreateDriverPayload {
        CreateDriverPayload {
            nome: nome.into(),
            cpf: None,
            cnh: None,
            categoria_cnh: None,
            validade_cnh: None,
            telefone: None,
        }
    }

    fn truck(placa: &str) -> CreateVehiclePayload {
        CreateVehiclePayload {
            configuracao: VehicleConfig::Truck { placa: placa.into() },
            fabricante: None,
            modelo: None,
            ano: None,
            chassis: None,
            carroceria: None,
            capacidade: None,
        }
    }

    #[tokio::test]
    async fn pj_partner_cannot_be_driver() {
        let repo = repo().await;
        let result = repo.create_partner(partner_payload(PartnerType::Pj, true)).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert!(repo.list_partners().await.is_empty());
    }

    #[tokio::test]
    async fn driver_requires_existing_partner() {
        let repo = repo().await;
        let result = repo.create_driver(Uuid::new_v4(), driver_payload("José")).await;
        assert!(matches!(result, Err(AppError::NotFound { entity: EntityKind::Partner, .. })));
    }

    #[tokio::test]
    async fn partner_delete_cascades_to_drivers_and_vehicles() {
        let repo = repo().await;
        let partner = repo.create_partner(partner_payload(PartnerType::Pf, false)).await.unwrap();
        repo.create_driver(partner.id, driver_payload("José")).await.unwrap();
        repo.create_vehicle(partner.id, truck("ABC1234")).await.unwrap();

        assert!(repo.delete_partner(partner.id).await.unwrap());

        assert!(repo.list_drivers_by_partner(partner.id).await.is_empty());
        assert!(repo.list_vehicles_by_partner(partner.id).await.is_empty());
        assert!(!repo.delete_partner(partner.id).await.unwrap());
    }

    #[tokio::test]
    async fn partner_update_is_idempotent_except_updated_at() {
        let repo = repo().await;
        let partner = repo.create_partner(partner_payload(PartnerType::Pf, false)).await.unwrap();

        let patch = || UpdatePartnerPayload {
            cidade: Some("Campinas".into()),
            ..Default::default()
        };
        let first = repo.update_partner(partner.id, patch()).await.unwrap();
        let second = repo.update_partner(partner.id, patch()).await.unwrap();

        assert_eq!(first.cidade, second.cidade);
        assert_eq!(first.nome, second.nome);
        assert_eq!(first.created_at, second.created_at);
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn vehicle_delete_clears_driver_link() {
        let repo = repo().await;
        let partner = repo.create_partner(partner_payload(PartnerType::Pj, false)).await.unwrap();
        let driver = repo.create_driver(partner.id, driver_payload("José")).await.unwrap();
        let vehicle = repo.create_vehicle(partner.id, truck("ABC1234")).await.unwrap();

        repo.db
            .transaction(|c, now| {
                c.drivers.update(driver.id, now, |d| d.veiculo_vinculado = Some(vehicle.id));
                Ok(())
            })
            .await
            .unwrap();

        assert!(repo.delete_vehicle(vehicle.id).await.unwrap());
        let driver = repo.find_driver(driver.id).await.unwrap();
        assert_eq!(driver.veiculo_vinculado, None);
    }

    #[tokio::test]
    async fn driver_delete_clears_vehicle_link() {
        let repo = repo().await;
        let partner = repo.create_partner(partner_payload(PartnerType::Pj, false)).await.unwrap();
        let driver = repo.create_driver(partner.id, driver_payload("José")).await.unwrap();
        let vehicle = repo.create_vehicle(partner.id, truck("ABC1234")).await.unwrap();

        repo.db
            .transaction(|c, now| {
                c.drivers.update(driver.id, now, |d| d.veiculo_vinculado = Some(vehicle.id));
                c.vehicles.update(vehicle.id, now, |v| {
                    v.motorista_vinculado = Some(DriverRef::Registered(driver.id))
                });
                Ok(())
            })
            .await
            .unwrap();

        assert!(repo.delete_driver(driver.id).await.unwrap());
        let vehicle = repo.find_vehicle(vehicle.id).await.unwrap();
        assert_eq!(vehicle.motorista_vinculado, None);
    }

    #[tokio::test]
    async fn partner_delete_detaches_movements() {
        let repo = repo().await;
        let partner = repo.create_partner(partner_payload(PartnerType::Pf, false)).await.unwrap();
        let movement_id = repo
            .db
            .transaction(|c, now| {
                let movement = c.movements.create(now, |id, now| {
                    let mut movement = blank_movement(id, now);
                    movement.parceiro_id = Some(partner.id);
                    movement
                });
                Ok(movement.id)
            })
            .await
            .unwrap();

        assert!(repo.delete_partner(partner.id).await.unwrap());

        let c = repo.db.read().await;
        let movement = c.movements.get(movement_id).unwrap();
        assert_eq!(movement.parceiro_id, None);
    }

    async fn partner_driving_vehicle_and_cargo(repo: &PartnerRepository) -> (Partner, Uuid, Uuid) {
        let partner = repo.create_partner(partner_payload(PartnerType::Pf, true)).await.unwrap();
        let vehicle = repo.create_vehicle(partner.id, truck("XYZ5678")).await.unwrap();
        let as_driver = DriverRef::Partner(partner.id);
        let cargo_id = repo
            .db
            .transaction(|c, now| {
                c.vehicles.update(vehicle.id, now, |v| v.motorista_vinculado = Some(as_driver));
                let cargo = c.cargoes.create(now, |id, now| {
                    let mut cargo = blank_cargo(id, now);
                    cargo.parceiro_id = Some(partner.id);
                    cargo.motorista_id = Some(as_driver);
                    cargo
                });
                Ok(cargo.id)
            })
            .await
            .unwrap();
        (partner, vehicle.id, cargo_id)
    }

    #[tokio::test]
    async fn partner_unmarked_as_driver_loses_links() {
        let repo = repo().await;
        let (partner, vehicle_id, cargo_id) = partner_driving_vehicle_and_cargo(&repo).await;

        let patch = UpdatePartnerPayload {
            is_motorista: Some(false),
            ..Default::default()
        };
        repo.update_partner(partner.id, patch).await.unwrap();

        let c = repo.db.read().await;
        assert_eq!(c.vehicles.get(vehicle_id).unwrap().motorista_vinculado, None);
        assert_eq!(c.cargoes.get(cargo_id).unwrap().motorista_id, None);
        assert_eq!(c.cargoes.get(cargo_id).unwrap().parceiro_id, Some(partner.id));
    }

    #[tokio::test]
    async fn switching_to_pj_stops_acting_as_driver() {
        let repo = repo().await;
        let (partner, vehicle_id, _) = partner_driving_vehicle_and_cargo(&repo).await;

        let patch = UpdatePartnerPayload {
            tipo: Some(PartnerType::Pj),
            ..Default::default()
        };
        let updated = repo.update_partner(partner.id, patch).await.unwrap();

        assert!(!updated.is_motorista);
        let vehicle = repo.find_vehicle(vehicle_id).await.unwrap();
        assert_eq!(vehicle.motorista_vinculado, None);
    }

    #[tokio::test]
    async fn switching_to_pj_while_marking_driver_is_rejected() {
        let repo = repo().await;
        let (partner, vehicle_id, _) = partner_driving_vehicle_and_cargo(&repo).await;

        let patch = UpdatePartnerPayload {
            tipo: Some(PartnerType::Pj),
            is_motorista: Some(true),
            ..Default::default()
        };
        let result = repo.update_partner(partner.id, patch).await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        let vehicle = repo.find_vehicle(vehicle_id).await.unwrap();
        assert_eq!(vehicle.motorista_vinculado, Some(DriverRef::Partner(partner.id)));
    }
}
