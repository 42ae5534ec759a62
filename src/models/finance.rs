// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::entity::{impl_entity, EntityKind};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Receita, // Entrada
    Despesa, // Saída
}

impl MovementType {
    /// Categorias sugeridas no cadastro.
    pub fn categories(self) -> &'static [&'static str] {
        match self {
            MovementType::Receita => &["Frete", "Serviços", "Comissões", "Outros"],
            MovementType::Despesa => &[
                "Combustível",
                "Manutenção",
                "Pedágios",
                "Salários",
                "Impostos",
                "Seguros",
                "Outros",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MovementStatus {
    #[default]
    Pendente,
    Pago,
    Cancelado,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMovement {
    pub id: Uuid,

    pub tipo: MovementType,

    #[schema(example = "2500.00")]
    pub valor: Decimal,

    #[schema(example = "Frete São Paulo - Rio de Janeiro")]
    pub descricao: String,

    #[schema(example = "Frete")]
    pub categoria: Option<String>,

    #[schema(value_type = String, format = Date, example = "2024-01-15")]
    pub data: NaiveDate,

    pub status: MovementStatus,

    pub parceiro_id: Option<Uuid>,
    pub carga_id: Option<Uuid>,

    pub observacoes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(FinancialMovement, EntityKind::FinancialMovement);

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovementPayload {
    pub tipo: MovementType,

    // Positivo, conferido no serviço
    #[schema(example = "350.00")]
    pub valor: Decimal,

    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub descricao: String,

    pub categoria: Option<String>,

    // Ausente: data de hoje
    #[schema(value_type = Option<String>, format = Date)]
    pub data: Option<NaiveDate>,

    #[serde(default)]
    pub status: MovementStatus,

    pub parceiro_id: Option<Uuid>,
    pub carga_id: Option<Uuid>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMovementPayload {
    pub tipo: Option<MovementType>,
    pub valor: Option<Decimal>,
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub descricao: Option<String>,
    pub categoria: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub data: Option<NaiveDate>,
    pub status: Option<MovementStatus>,
    pub parceiro_id: Option<Uuid>,
    pub carga_id: Option<Uuid>,
    pub observacoes: Option<String>,
}

impl UpdateMovementPayload {
    pub fn apply(self, movement: &mut FinancialMovement) {
        if let Some(tipo) = self.tipo {
            movement.tipo = tipo;
        }
        if let Some(valor) = self.valor {
            movement.valor = valor;
        }
        if let Some(descricao) = self.descricao {
            movement.descricao = descricao;
        }
        if let Some(data) = self.data {
            movement.data = data;
        }
        if let Some(status) = self.status {
            movement.status = status;
        }
        if self.categoria.is_some() {
            movement.categoria = self.categoria;
        }
        if self.parceiro_id.is_some() {
            movement.parceiro_id = self.parceiro_id;
        }
        if self.carga_id.is_some() {
            movement.carga_id = self.carga_id;
        }
        if self.observacoes.is_some() {
            movement.observacoes = self.observacoes;
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MovementStatusPayload {
    pub status: MovementStatus,
}

// Filtros da listagem (query string)
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementFilter {
    pub search: Option<String>,
    pub tipo: Option<MovementType>,
    pub status: Option<MovementStatus>,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_inicio: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_fim: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinanceStats {
    pub total_receitas: Decimal,
    pub total_despesas: Decimal,
    pub saldo: Decimal,
    pub receitas_pendentes: Decimal,
    pub despesas_pendentes: Decimal,
    pub total_transacoes: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryList {
    pub receita: Vec<String>,
    pub despesa: Vec<String>,
}

impl CategoryList {
    pub fn predefined() -> Self {
        let owned = |t: MovementType| t.categories().iter().map(|c| c.to_string()).collect();
        Self {
            receita: owned(MovementType::Receita),
            despesa: owned(MovementType::Despesa),
        }
    }
}
