// src/services/linkage_service.rs

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{database::Collections, Database},
    models::{
        entity::EntityKind,
        partner::{DriverCandidate, DriverRef, LinkOptions, Linkable},
    },
};

/// Vinculação veículo ↔ motorista (registrado ou parceiro-motorista).
#[derive(Clone)]
pub struct LinkageService {
    db: Database,
}

/// Motoristas disponíveis: os registrados e os parceiros PF marcados como motorista.
pub fn driver_candidates(c: &Collections, parceiro_id: Option<Uuid>) -> Vec<DriverCandidate> {
    let registered = c
        .drivers
        .iter()
        .filter(|d| parceiro_id.is_none_or(|p| d.parceiro_id == p))
        .map(DriverCandidate::registered);

    let partners = c
        .partners
        .iter()
        .filter(|p| p.acts_as_driver() && parceiro_id.is_none_or(|id| p.id == id))
        .map(|p| {
            let linked = c.vehicle_linked_to(DriverRef::Partner(p.id)).map(|v| v.id);
            DriverCandidate::from_partner(p, linked)
        });

    registered.chain(partners).collect()
}

// Parceiro dono do item; valida que ele existe
fn owner_of(c: &Collections, item: Linkable) -> Result<Uuid, AppError> {
    match item {
        Linkable::Driver(DriverRef::Registered(id)) => c
            .drivers
            .get(id)
            .map(|d| d.parceiro_id)
            .ok_or_else(|| AppError::not_found(EntityKind::Driver, id)),
        Linkable::Driver(DriverRef::Partner(id)) => {
            let partner = c.ensure_partner(id)?;
            if !partner.acts_as_driver() {
                return Err(AppError::InvalidLink(
                    "o parceiro precisa ser PF e estar marcado como motorista".into(),
                ));
            }
            Ok(partner.id)
        }
        Linkable::Vehicle(id) => c.ensure_vehicle(id).map(|v| v.parceiro_id),
    }
}

/// Desfaz o vínculo atual do item, dos dois lados.
fn detach(c: &mut Collections, now: DateTime<Utc>, item: Linkable) -> usize {
    match item {
        Linkable::Driver(driver) => {
            let mut changed = c.vehicles.update_where(
                now,
                |v| v.motorista_vinculado == Some(driver),
                |v| v.motorista_vinculado = None,
            );
            if let DriverRef::Registered(id) = driver {
                changed += c.drivers.update_where(
                    now,
                    |d| d.id == id && d.veiculo_vinculado.is_some(),
                    |d| d.veiculo_vinculado = None,
                );
            }
            changed
        }
        Linkable::Vehicle(vehicle_id) => {
            let mut changed = c.vehicles.update_where(
                now,
                |v| v.id == vehicle_id && v.motorista_vinculado.is_some(),
                |v| v.motorista_vinculado = None,
            );
            changed += c.drivers.update_where(
                now,
                |d| d.veiculo_vinculado == Some(vehicle_id),
                |d| d.veiculo_vinculado = None,
            );
            changed
        }
    }
}

fn connect(c: &mut Collections, now: DateTime<Utc>, driver: DriverRef, vehicle_id: Uuid) {
    c.vehicles
        .update(vehicle_id, now, |v| v.motorista_vinculado = Some(driver));
    // Parceiro-motorista não tem registro próprio: o vínculo fica só no veículo
    if let DriverRef::Registered(id) = driver {
        c.drivers.update(id, now, |d| d.veiculo_vinculado = Some(vehicle_id));
    }
}

impl LinkageService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Vincula `source` a `target`; sem `target`, apenas desvincula `source`.
    pub async fn link(&self, source: Linkable, target: Option<Linkable>) -> Result<(), AppError> {
        self.db
            .transaction(move |c, now| {
                let source_owner = owner_of(c, source)?;

                let pair = match target {
                    None => None,
                    Some(target) => {
                        let target_owner = owner_of(c, target)?;
                        let pair = match (source, target) {
                            (Linkable::Driver(d), Linkable::Vehicle(v))
                            | (Linkable::Vehicle(v), Linkable::Driver(d)) => (d, v),
                            _ => {
                                return Err(AppError::InvalidLink(
                                    "origem e destino devem ser um motorista e um veículo".into(),
                                ));
                            }
                        };
                        if source_owner != target_owner {
                            return Err(AppError::InvalidLink(
                                "motorista e veículo pertencem a parceiros diferentes".into(),
                            ));
                        }
                        Some((target, pair))
                    }
                };

                detach(c, now, source);

                let Some((target, (driver, vehicle_id))) = pair else {
                    tracing::info!("🔗 {:?} desvinculado", source);
                    return Ok(());
                };

                detach(c, now, target);
                connect(c, now, driver, vehicle_id);
                tracing::info!("🔗 Motorista {} vinculado ao veículo {}", driver, vehicle_id);
                Ok(())
            })
            .await
    }

    pub async fn unlink(&self, item: Linkable) -> Result<(), AppError> {
        self.db
            .transaction(move |c, now| {
                owner_of(c, item)?;
                let changed = detach(c, now, item);
                tracing::info!("🔗 {:?} desvinculado ({} registros alterados)", item, changed);
                Ok(())
            })
            .await
    }

    pub async fn driver_candidates(&self, parceiro_id: Option<Uuid>) -> Vec<DriverCandidate> {
        driver_candidates(&*self.db.read().await, parceiro_id)
    }

    /// Motoristas e veículos do parceiro, cada um com o vínculo atual.
    pub async fn link_options(&self, parceiro_id: Uuid) -> Result<LinkOptions, AppError> {
        let c = self.db.read().await;
        c.ensure_partner(parceiro_id)?;

        Ok(LinkOptions {
            motoristas: driver_candidates(&c, Some(parceiro_id)),
            veiculos: c.vehicles.filter_by_partner(parceiro_id),
        })
    }
}
