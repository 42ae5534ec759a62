// src/services/cargo_service.rs

use std::cmp::Ordering;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CargoRepository, Database},
    models::{
        cargo::{
            Cargo, CargoFilter, CargoLinkOptions, CargoLinkPayload, CargoLinkQuery,
            CargoLinkSelection, CargoStats, CargoStatus, CreateCargoPayload, UpdateCargoPayload,
        },
        entity::EntityKind,
        partner::DriverRef,
    },
    services::linkage_service::driver_candidates,
};

/// Mais recentes primeiro; sem data de coleta vai para o fim.
pub fn by_collection_date_desc(a: &Cargo, b: &Cargo) -> Ordering {
    match (a.data_coleta, b.data_coleta) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn filter_cargoes(cargoes: &[Cargo], filter: &CargoFilter) -> Vec<Cargo> {
    let search = filter.search.as_deref().map(str::to_lowercase);
    let matches = |field: &Option<String>, term: &str| {
        field.as_deref().is_some_and(|v| v.to_lowercase().contains(term))
    };
    let ranged = filter.data_inicio.is_some() || filter.data_fim.is_some();

    let mut result: Vec<Cargo> = cargoes
        .iter()
        .filter(|c| {
            search.as_deref().is_none_or(|term| {
                matches(&c.crt, term) || matches(&c.origem, term) || matches(&c.destino, term)
            })
        })
        .filter(|c| filter.status.is_none_or(|s| c.status == s))
        .filter(|c| {
            if !ranged {
                return true;
            }
            c.data_coleta.is_some_and(|data| {
                filter.data_inicio.is_none_or(|inicio| data >= inicio)
                    && filter.data_fim.is_none_or(|fim| data <= fim)
            })
        })
        .cloned()
        .collect();

    result.sort_by(by_collection_date_desc);
    result
}

pub fn cargo_stats(cargoes: &[Cargo]) -> CargoStats {
    let count = |status: CargoStatus| cargoes.iter().filter(|c| c.status == status).count();
    CargoStats {
        total: cargoes.len(),
        a_coletar: count(CargoStatus::AColetar),
        em_transito: count(CargoStatus::EmTransito),
        armazenadas: count(CargoStatus::Armazenada),
        entregues: count(CargoStatus::Entregue),
        canceladas: count(CargoStatus::Cancelada),
        valor_total: cargoes.iter().filter_map(|c| c.valor).sum(),
    }
}

#[derive(Clone)]
pub struct CargoService {
    repo: CargoRepository,
    db: Database,
}

impl CargoService {
    pub fn new(repo: CargoRepository, db: Database) -> Self {
        Self { repo, db }
    }

    pub async fn list(&self, filter: &CargoFilter) -> Vec<Cargo> {
        filter_cargoes(&self.repo.list().await, filter)
    }

    pub async fn stats(&self) -> CargoStats {
        cargo_stats(&self.repo.list().await)
    }

    pub async fn get(&self, id: Uuid) -> Result<Cargo, AppError> {
        self.repo
            .find_by_id(id)
            .await
            .ok_or_else(|| AppError::not_found(EntityKind::Cargo, id))
    }

    pub async fn create(&self, payload: CreateCargoPayload) -> Result<Cargo, AppError> {
        let cargo = self.repo.create(payload).await?;
        tracing::info!("📦 Carga {} criada ({})", cargo.id, cargo.descricao);
        Ok(cargo)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateCargoPayload) -> Result<Cargo, AppError> {
        self.repo.update(id, payload).await
    }

    pub async fn change_status(&self, id: Uuid, status: CargoStatus) -> Result<Cargo, AppError> {
        let cargo = self.repo.set_status(id, status).await?;
        tracing::info!("📦 Carga {} agora está {:?}", id, status);
        Ok(cargo)
    }

    pub async fn link_cargo(&self, id: Uuid, links: CargoLinkPayload) -> Result<Cargo, AppError> {
        let cargo = self.repo.set_links(id, links).await?;
        tracing::info!("🔗 Carga {} vinculada", id);
        Ok(cargo)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.repo.delete(id).await
    }

    /// Estado do diálogo de vinculação após as escolhas da query.
    pub async fn link_options(&self, query: CargoLinkQuery) -> Result<CargoLinkOptions, AppError> {
        let motorista = query
            .motorista
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .map(str::parse::<DriverRef>)
            .transpose()
            .map_err(|_| AppError::invalid_field("motorista", "driver_ref", "Motorista inválido."))?;

        let c = self.db.read().await;

        let mut selection = match query.carga_id {
            Some(carga_id) => c
                .cargoes
                .get(carga_id)
                .map(CargoLinkSelection::from_cargo)
                .ok_or_else(|| AppError::not_found(EntityKind::Cargo, carga_id))?,
            None => CargoLinkSelection::default(),
        };

        if let Some(parceiro_id) = query.parceiro_id {
            c.ensure_partner(parceiro_id)?;
            selection.select_partner(Some(parceiro_id));
        }

        if let Some(driver) = motorista {
            c.ensure_driver_ref(driver)?;
            let linked = c.vehicle_linked_to(driver).map(|v| v.id).or_else(|| match driver {
                DriverRef::Partner(p) => c.vehicles.iter().find(|v| v.parceiro_id == p).map(|v| v.id),
                DriverRef::Registered(_) => None,
            });
            selection.select_driver(Some(driver), linked);
        }

        let veiculos = match selection.parceiro_id {
            Some(p) => c.vehicles.filter_by_partner(p),
            None => c.vehicles.to_vec(),
        };

        Ok(CargoLinkOptions {
            motoristas: driver_candidates(&c, selection.parceiro_id),
            veiculos,
            selection,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::{database::SeedPolicy, seed::blank_cargo, MemoryStorage};

    async fn service(seed: SeedPolicy) -> CargoService {
        let db = Database::load(Arc::new(MemoryStorage::new()), seed).await.unwrap();
        CargoService::new(CargoRepository::new(db.clone()), db)
    }

    fn dated(day: Option<u32>, status: CargoStatus) -> Cargo {
        let mut cargo = blank_cargo(Uuid::new_v4(), chrono::Utc::now());
        cargo.data_coleta = day.and_then(|d| NaiveDate::from_ymd_opt(2024, 1, d));
        cargo.status = status;
        cargo.valor = Some(Decimal::from(100));
        cargo
    }

    #[test]
    fn undated_cargoes_sort_last() {
        let cargoes = vec![
            dated(None, CargoStatus::AColetar),
            dated(Some(10), CargoStatus::Entregue),
            dated(Some(20), CargoStatus::EmTransito),
        ];
        let sorted = filter_cargoes(&cargoes, &CargoFilter::default());
        let days: Vec<_> = sorted.iter().map(|c| c.data_coleta).collect();
        assert_eq!(
            days,
            [NaiveDate::from_ymd_opt(2024, 1, 20), NaiveDate::from_ymd_opt(2024, 1, 10), None]
        );

        let ranged = filter_cargoes(
            &cargoes,
            &CargoFilter {
                data_inicio: NaiveDate::from_ymd_opt(2024, 1, 10),
                data_fim: NaiveDate::from_ymd_opt(2024, 1, 10),
                ..Default::default()
            },
        );
        assert_eq!(ranged.len(), 1);
    }

    #[test]
    fn stats_count_each_status() {
        let cargoes = vec![
            dated(Some(1), CargoStatus::AColetar),
            dated(Some(2), CargoStatus::Cancelada),
            dated(Some(3), CargoStatus::Cancelada),
        ];
        let stats = cargo_stats(&cargoes);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.canceladas, 2);
        assert_eq!(stats.valor_total, Decimal::from(300));
    }

    #[tokio::test]
    async fn long_crt_is_rejected_by_validation_before_storage() {
        use validator::Validate;

        let service = service(SeedPolicy::Empty).await;
        let payload = CreateCargoPayload {
            crt: Some("ABCDEFGHIJK".into()),
            ..Default::default()
        };
        assert!(payload.validate().is_err());
        assert!(service.list(&CargoFilter::default()).await.is_empty());

        let ok = service
            .create(CreateCargoPayload {
                crt: Some("CRT0001".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ok.descricao, "CRT0001");
    }

    #[tokio::test]
    async fn link_options_preselect_vehicle_of_driver() {
        let service = service(SeedPolicy::Demo { bcrypt_cost: 4 }).await;
        let (partner, vehicle) = {
            let c = service.db.read().await;
            let vehicle = c.vehicles.iter().next().cloned().unwrap();
            (vehicle.parceiro_id, vehicle.id)
        };

        // Parceiro PF vira motorista; sem vínculo cai no primeiro veículo do parceiro
        service
            .db
            .transaction(move |c, now| {
                c.partners.update(partner, now, |p| {
                    p.tipo = crate::models::partner::PartnerType::Pf;
                    p.is_motorista = true;
                });
                Ok(())
            })
            .await
            .unwrap();

        let options = service
            .link_options(CargoLinkQuery {
                carga_id: None,
                parceiro_id: Some(partner),
                motorista: Some(format!("{}_as_driver", partner)),
            })
            .await
            .unwrap();

        assert_eq!(options.selection.motorista, Some(DriverRef::Partner(partner)));
        assert_eq!(options.selection.veiculo_id, Some(vehicle));
        assert!(options.motoristas.iter().any(|m| m.referencia == DriverRef::Partner(partner)));
        assert!(options.veiculos.iter().all(|v| v.parceiro_id == partner));
    }
}
