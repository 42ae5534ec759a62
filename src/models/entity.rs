// src/models/entity.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// As seis coleções do sistema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Partner,
    Driver,
    Vehicle,
    FinancialMovement,
    Cargo,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::User,
        EntityKind::Partner,
        EntityKind::Driver,
        EntityKind::Vehicle,
        EntityKind::FinancialMovement,
        EntityKind::Cargo,
    ];

    /// Chave fixa no armazenamento chave-valor (um array JSON por coleção).
    pub fn storage_key(self) -> &'static str {
        match self {
            EntityKind::User => "mobtax_users",
            EntityKind::Partner => "mobtax_parceiros",
            EntityKind::Driver => "mobtax_motoristas",
            EntityKind::Vehicle => "mobtax_veiculos",
            EntityKind::FinancialMovement => "mobtax_movimentacoes",
            EntityKind::Cargo => "mobtax_cargas",
        }
    }

    pub fn label_en(self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Partner => "Partner",
            EntityKind::Driver => "Driver",
            EntityKind::Vehicle => "Vehicle",
            EntityKind::FinancialMovement => "Financial movement",
            EntityKind::Cargo => "Cargo",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::User => "Usuário",
            EntityKind::Partner => "Parceiro",
            EntityKind::Driver => "Motorista",
            EntityKind::Vehicle => "Veículo",
            EntityKind::FinancialMovement => "Movimentação",
            EntityKind::Cargo => "Carga",
        };
        f.write_str(label)
    }
}

/// Contrato comum dos registros guardados nas coleções.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> Uuid;

    /// Carimba `updated_at`.
    fn touch(&mut self, now: DateTime<Utc>);
}

/// Registros que pertencem a um parceiro (motoristas e veículos).
pub trait PartnerOwned: Entity {
    fn parceiro_id(&self) -> Uuid;
}

macro_rules! impl_entity {
    ($ty:ty, $kind:expr) => {
        impl $crate::models::entity::Entity for $ty {
            const KIND: $crate::models::entity::EntityKind = $kind;

            fn id(&self) -> uuid::Uuid {
                self.id
            }

            fn touch(&mut self, now: chrono::DateTime<chrono::Utc>) {
                self.updated_at = now;
            }
        }
    };
}

pub(crate) use impl_entity;

pub(crate) fn default_true() -> bool {
    true
}
