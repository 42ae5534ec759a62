// src/models/cargo.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::entity::{impl_entity, EntityKind};
use crate::models::partner::{DriverCandidate, DriverRef, Vehicle};

/// Descrição usada quando a carga não tem CRT.
pub const DEFAULT_DESCRIPTION: &str = "Carga sem descrição";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CargoStatus {
    #[default]
    AColetar,
    EmTransito,
    Armazenada,
    Entregue,
    Cancelada,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cargo {
    pub id: Uuid,
    #[schema(example = "CRT0001")]
    pub descricao: String,
    #[schema(example = "São Paulo - SP")]
    pub origem: Option<String>,
    #[schema(example = "Rio de Janeiro - RJ")]
    pub destino: Option<String>,
    pub peso: Option<Decimal>,
    pub valor: Option<Decimal>,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_coleta: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_entrega: Option<NaiveDate>,
    pub status: CargoStatus,
    pub parceiro_id: Option<Uuid>,
    pub motorista_id: Option<DriverRef>,
    pub veiculo_id: Option<Uuid>,
    pub crt: Option<String>,
    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Cargo, EntityKind::Cargo);

/// A descrição sempre acompanha o CRT.
pub fn description_for(crt: Option<&str>) -> String {
    match crt.map(str::trim) {
        Some(crt) if !crt.is_empty() => crt.to_string(),
        _ => DEFAULT_DESCRIPTION.to_string(),
    }
}

// --- Payloads ---

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCargoPayload {
    #[validate(length(max = 10, message = "O CRT deve ter no máximo 10 caracteres."))]
    #[schema(example = "CRT0001")]
    pub crt: Option<String>,
    pub origem: Option<String>,
    pub destino: Option<String>,
    pub peso: Option<Decimal>,
    pub valor: Option<Decimal>,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_coleta: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_entrega: Option<NaiveDate>,
    #[serde(default)]
    pub status: CargoStatus,
    pub parceiro_id: Option<Uuid>,
    pub motorista_id: Option<DriverRef>,
    pub veiculo_id: Option<Uuid>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCargoPayload {
    #[validate(length(max = 10, message = "O CRT deve ter no máximo 10 caracteres."))]
    pub crt: Option<String>,
    pub origem: Option<String>,
    pub destino: Option<String>,
    pub peso: Option<Decimal>,
    pub valor: Option<Decimal>,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_coleta: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_entrega: Option<NaiveDate>,
    pub status: Option<CargoStatus>,
    pub parceiro_id: Option<Uuid>,
    pub motorista_id: Option<DriverRef>,
    pub veiculo_id: Option<Uuid>,
    pub observacoes: Option<String>,
}

impl UpdateCargoPayload {
    pub fn apply(self, cargo: &mut Cargo) {
        if let Some(crt) = self.crt {
            cargo.descricao = description_for(Some(&crt));
            cargo.crt = Some(crt);
        }
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if self.$field.is_some() { cargo.$field = self.$field; })*
            };
        }
        merge!(
            origem, destino, peso, valor, data_coleta, data_entrega, parceiro_id, motorista_id,
            veiculo_id, observacoes
        );
        if let Some(status) = self.status {
            cargo.status = status;
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CargoStatusPayload {
    pub status: CargoStatus,
}

/// Estado do diálogo "Vincular carga".
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CargoLinkSelection {
    pub parceiro_id: Option<Uuid>,
    pub motorista: Option<DriverRef>,
    pub veiculo_id: Option<Uuid>,
}

/// Vínculo de uma carga (ausente = desvincular).
pub type CargoLinkPayload = CargoLinkSelection;

impl CargoLinkSelection {
    pub fn from_cargo(cargo: &Cargo) -> Self {
        Self {
            parceiro_id: cargo.parceiro_id,
            motorista: cargo.motorista_id,
            veiculo_id: cargo.veiculo_id,
        }
    }

    /// Trocar de parceiro zera motorista e veículo.
    pub fn select_partner(&mut self, parceiro_id: Option<Uuid>) {
        if self.parceiro_id != parceiro_id {
            self.motorista = None;
            self.veiculo_id = None;
        }
        self.parceiro_id = parceiro_id;
    }

    // `linked_vehicle` já resolvido pelo serviço (vínculo ou primeiro veículo do parceiro)
    pub fn select_driver(&mut self, motorista: Option<DriverRef>, linked_vehicle: Option<Uuid>) {
        self.motorista = motorista;
        if motorista.is_some() && linked_vehicle.is_some() {
            self.veiculo_id = linked_vehicle;
        }
    }

    pub fn select_vehicle(&mut self, veiculo_id: Option<Uuid>) {
        self.veiculo_id = veiculo_id;
    }
}

// Query de /api/cargoes/link-options (motorista no formato textual)
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CargoLinkQuery {
    pub carga_id: Option<Uuid>,
    pub parceiro_id: Option<Uuid>,
    pub motorista: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CargoLinkOptions {
    pub selection: CargoLinkSelection,
    pub motoristas: Vec<DriverCandidate>,
    pub veiculos: Vec<Vehicle>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CargoFilter {
    pub search: Option<String>,
    pub status: Option<CargoStatus>,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_inicio: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_fim: Option<NaiveDate>,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CargoStats {
    pub total: usize,
    pub a_coletar: usize,
    pub em_transito: usize,
    pub armazenadas: usize,
    pub entregues: usize,
    pub canceladas: usize,
    pub valor_total: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_snake_case_names() {
        assert_eq!(serde_json::to_value(CargoStatus::AColetar).unwrap(), "a_coletar");
        assert_eq!(serde_json::to_value(CargoStatus::EmTransito).unwrap(), "em_transito");
    }

    #[test]
    fn description_falls_back_without_crt() {
        assert_eq!(description_for(Some("CRT0001")), "CRT0001");
        assert_eq!(description_for(Some("  ")), DEFAULT_DESCRIPTION);
        assert_eq!(description_for(None), DEFAULT_DESCRIPTION);
    }

    #[test]
    fn crt_longer_than_ten_characters_fails_validation() {
        let payload = CreateCargoPayload {
            crt: Some("ABCDEFGHIJK".into()),
            ..Default::default()
        };
        assert!(payload.validate().is_err());

        let payload = CreateCargoPayload {
            crt: Some("ABCDEFGHIJ".into()),
            ..Default::default()
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn changing_partner_resets_driver_and_vehicle() {
        let mut selection = CargoLinkSelection {
            parceiro_id: Some(Uuid::new_v4()),
            motorista: Some(DriverRef::Registered(Uuid::new_v4())),
            veiculo_id: Some(Uuid::new_v4()),
        };
        let same = selection.parceiro_id;
        selection.select_partner(same);
        assert!(selection.motorista.is_some());

        selection.select_partner(Some(Uuid::new_v4()));
        assert_eq!(selection.motorista, None);
        assert_eq!(selection.veiculo_id, None);
    }

    #[test]
    fn selecting_driver_preselects_linked_vehicle() {
        let vehicle = Uuid::new_v4();
        let mut selection = CargoLinkSelection::default();
        selection.select_driver(Some(DriverRef::Registered(Uuid::new_v4())), Some(vehicle));
        assert_eq!(selection.veiculo_id, Some(vehicle));
    }
}
