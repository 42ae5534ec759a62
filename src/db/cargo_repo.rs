// src/db/cargo_repo.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{database::Collections, Database},
    models::{
        cargo::{
            description_for, Cargo, CargoLinkPayload, CargoLinkSelection, CargoStatus,
            CreateCargoPayload, UpdateCargoPayload,
        },
        entity::EntityKind,
        partner::DriverRef,
    },
};

#[derive(Clone)]
pub struct CargoRepository {
    db: Database,
}

fn check_links(c: &Collections, cargo: &Cargo) -> Result<(), AppError> {
    if let Some(parceiro_id) = cargo.parceiro_id {
        c.ensure_partner(parceiro_id)?;
    }
    if let Some(motorista) = cargo.motorista_id {
        c.ensure_driver_ref(motorista)?;
    }
    if let Some(veiculo_id) = cargo.veiculo_id {
        c.ensure_vehicle(veiculo_id)?;
    }
    Ok(())
}

// Com parceiro escolhido, motorista e veículo precisam ser dele
fn check_ownership(c: &Collections, links: &CargoLinkPayload) -> Result<(), AppError> {
    let Some(parceiro_id) = links.parceiro_id else {
        return Ok(());
    };
    let driver_owner = match links.motorista {
        Some(DriverRef::Registered(id)) => c.drivers.get(id).map(|d| d.parceiro_id),
        Some(DriverRef::Partner(id)) => c
            .partners
            .get(id)
            .filter(|p| p.acts_as_driver())
            .map(|p| p.id),
        None => Some(parceiro_id),
    };
    if driver_owner != Some(parceiro_id) {
        return Err(AppError::InvalidLink("o motorista não pertence ao parceiro".into()));
    }
    if let Some(veiculo_id) = links.veiculo_id {
        if c.ensure_vehicle(veiculo_id)?.parceiro_id != parceiro_id {
            return Err(AppError::InvalidLink("o veículo não pertence ao parceiro".into()));
        }
    }
    Ok(())
}

impl CargoRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Vec<Cargo> {
        self.db.read().await.cargoes.to_vec()
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<Cargo> {
        self.db.read().await.cargoes.get(id).cloned()
    }

    pub async fn create(&self, payload: CreateCargoPayload) -> Result<Cargo, AppError> {
        self.db
            .transaction(move |c, now| {
                let cargo = Cargo {
                    id: Uuid::nil(),
                    descricao: description_for(payload.crt.as_deref()),
                    origem: payload.origem,
                    destino: payload.destino,
                    peso: payload.peso,
                    valor: payload.valor,
                    data_coleta: payload.data_coleta,
                    data_entrega: payload.data_entrega,
                    status: payload.status,
                    parceiro_id: payload.parceiro_id,
                    motorista_id: payload.motorista_id,
                    veiculo_id: payload.veiculo_id,
                    crt: payload.crt,
                    observacoes: payload.observacoes,
                    created_at: now,
                    updated_at: now,
                };
                check_links(c, &cargo)?;
                check_ownership(c, &CargoLinkSelection::from_cargo(&cargo))?;

                Ok(c.cargoes.create(now, |id, _| Cargo { id, ..cargo }))
            })
            .await
    }

    pub async fn update(&self, id: Uuid, payload: UpdateCargoPayload) -> Result<Cargo, AppError> {
        self.db
            .transaction(move |c, now| {
                let updated = c
                    .cargoes
                    .update(id, now, |cg| payload.apply(cg))
                    .ok_or_else(|| AppError::not_found(EntityKind::Cargo, id))?;
                check_links(c, &updated)?;
                check_ownership(c, &CargoLinkSelection::from_cargo(&updated))?;
                Ok(updated)
            })
            .await
    }

    pub async fn set_status(&self, id: Uuid, status: CargoStatus) -> Result<Cargo, AppError> {
        self.db
            .transaction(move |c, now| {
                c.cargoes
                    .update(id, now, |cg| cg.status = status)
                    .ok_or_else(|| AppError::not_found(EntityKind::Cargo, id))
            })
            .await
    }

    /// Substitui parceiro, motorista e veículo de uma vez (campos ausentes limpam).
    pub async fn set_links(&self, id: Uuid, links: CargoLinkPayload) -> Result<Cargo, AppError> {
        self.db
            .transaction(move |c, now| {
                let updated = c
                    .cargoes
                    .update(id, now, |cg| {
                        cg.parceiro_id = links.parceiro_id;
                        cg.motorista_id = links.motorista;
                        cg.veiculo_id = links.veiculo_id;
                    })
                    .ok_or_else(|| AppError::not_found(EntityKind::Cargo, id))?;
                check_links(c, &updated)?;
                check_ownership(c, &links)?;
                Ok(updated)
            })
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.db
            .transaction(move |c, now| {
                if !c.cargoes.remove(id) {
                    return Ok(false);
                }
                let detached = c.movements.update_where(
                    now,
                    |m| m.carga_id == Some(id),
                    |m| m.carga_id = None,
                );
                tracing::info!("🗑️ Carga {} excluída; {} movimentações desvinculadas", id, detached);
                Ok(true)
            })
            .await
    }
}
