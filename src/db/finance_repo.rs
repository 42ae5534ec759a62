// src/db/finance_repo.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{database::Collections, Database},
    models::{
        entity::EntityKind,
        finance::{CreateMovementPayload, FinancialMovement, MovementStatus, UpdateMovementPayload},
    },
};

#[derive(Clone)]
pub struct FinanceRepository {
    db: Database,
}

// Valor positivo e vínculos existentes
fn check_movement(c: &Collections, movement: &FinancialMovement) -> Result<(), AppError> {
    if movement.valor <= Decimal::ZERO {
        return Err(AppError::invalid_field(
            "valor",
            "positive",
            "O valor deve ser maior que zero.",
        ));
    }
    if let Some(parceiro_id) = movement.parceiro_id {
        c.ensure_partner(parceiro_id)?;
    }
    if let Some(carga_id) = movement.carga_id {
        c.ensure_cargo(carga_id)?;
    }
    Ok(())
}

impl FinanceRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Vec<FinancialMovement> {
        self.db.read().await.movements.to_vec()
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<FinancialMovement> {
        self.db.read().await.movements.get(id).cloned()
    }

    pub async fn create(&self, payload: CreateMovementPayload) -> Result<FinancialMovement, AppError> {
        self.db
            .transaction(move |c, now| {
                let movement = FinancialMovement {
                    id: Uuid::nil(),
                    tipo: payload.tipo,
                    valor: payload.valor,
                    descricao: payload.descricao,
                    categoria: payload.categoria,
                    data: payload.data.unwrap_or_else(|| now.date_naive()),
                    status: payload.status,
                    parceiro_id: payload.parceiro_id,
                    carga_id: payload.carga_id,
                    observacoes: payload.observacoes,
                    created_at: now,
                    updated_at: now,
                };
                check_movement(c, &movement)?;

                Ok(c.movements.create(now, |id, _| FinancialMovement { id, ..movement }))
            })
            .await
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: UpdateMovementPayload,
    ) -> Result<FinancialMovement, AppError> {
        self.db
            .transaction(move |c, now| {
                let updated = c
                    .movements
                    .update(id, now, |m| payload.apply(m))
                    .ok_or_else(|| AppError::not_found(EntityKind::FinancialMovement, id))?;
                check_movement(c, &updated)?;
                Ok(updated)
            })
            .await
    }

    pub async fn set_status(
        &self,
        id: Uuid,
        status: MovementStatus,
    ) -> Result<FinancialMovement, AppError> {
        self.db
            .transaction(move |c, now| {
                c.movements
                    .update(id, now, |m| m.status = status)
                    .ok_or_else(|| AppError::not_found(EntityKind::FinancialMovement, id))
            })
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.db.transaction(move |c, _| Ok(c.movements.remove(id))).await
    }
}
