// src/services/finance_service.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::FinanceRepository,
    models::{
        entity::EntityKind,
        finance::{
            CategoryList, CreateMovementPayload, FinanceStats, FinancialMovement, MovementFilter,
            MovementStatus, MovementType, UpdateMovementPayload,
        },
    },
};

/// Totais do painel financeiro. "Pendentes" soma só `status == pendente`.
pub fn finance_stats(movements: &[FinancialMovement]) -> FinanceStats {
    let sum = |pred: &dyn Fn(&FinancialMovement) -> bool| -> Decimal {
        movements.iter().filter(|m| pred(m)).map(|m| m.valor).sum()
    };

    let total_receitas = sum(&|m| m.tipo == MovementType::Receita);
    let total_despesas = sum(&|m| m.tipo == MovementType::Despesa);

    FinanceStats {
        total_receitas,
        total_despesas,
        saldo: total_receitas - total_despesas,
        receitas_pendentes: sum(&|m| m.tipo == MovementType::Receita && m.status == MovementStatus::Pendente),
        despesas_pendentes: sum(&|m| m.tipo == MovementType::Despesa && m.status == MovementStatus::Pendente),
        total_transacoes: movements.len(),
    }
}

/// Filtro da listagem, mais recentes primeiro.
pub fn filter_movements(movements: &[FinancialMovement], filter: &MovementFilter) -> Vec<FinancialMovement> {
    let search = filter.search.as_deref().map(str::to_lowercase);
    let mut result: Vec<FinancialMovement> = movements
        .iter()
        .filter(|m| {
            search.as_deref().is_none_or(|term| {
                m.descricao.to_lowercase().contains(term)
                    || m.categoria.as_deref().is_some_and(|c| c.to_lowercase().contains(term))
            })
        })
        .filter(|m| filter.tipo.is_none_or(|t| m.tipo == t))
        .filter(|m| filter.status.is_none_or(|s| m.status == s))
        .filter(|m| filter.data_inicio.is_none_or(|inicio| m.data >= inicio))
        .filter(|m| filter.data_fim.is_none_or(|fim| m.data <= fim))
        .cloned()
        .collect();

    result.sort_by(|a, b| b.data.cmp(&a.data));
    result
}

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
}

impl FinanceService {
    pub fn new(repo: FinanceRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self, filter: &MovementFilter) -> Vec<FinancialMovement> {
        filter_movements(&self.repo.list().await, filter)
    }

    pub async fn stats(&self) -> FinanceStats {
        finance_stats(&self.repo.list().await)
    }

    pub fn categories(&self) -> CategoryList {
        CategoryList::predefined()
    }

    pub async fn get(&self, id: Uuid) -> Result<FinancialMovement, AppError> {
        self.repo
            .find_by_id(id)
            .await
            .ok_or_else(|| AppError::not_found(EntityKind::FinancialMovement, id))
    }

    pub async fn create(&self, payload: CreateMovementPayload) -> Result<FinancialMovement, AppError> {
        self.repo.create(payload).await
    }

    pub async fn update(&self, id: Uuid, payload: UpdateMovementPayload) -> Result<FinancialMovement, AppError> {
        self.repo.update(id, payload).await
    }

    pub async fn set_status(&self, id: Uuid, status: MovementStatus) -> Result<FinancialMovement, AppError> {
        let movement = self.repo.set_status(id, status).await?;
        tracing::info!("💰 Movimentação {} agora está {:?}", id, status);
        Ok(movement)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.repo.delete(id).await
    }
}
