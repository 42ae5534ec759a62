// src/models/partner.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::auth::ActiveFilter;
use crate::models::entity::{default_true, impl_entity, EntityKind, PartnerOwned};

/// Sufixo do formato textual de um parceiro atuando como motorista.
const AS_DRIVER_SUFFIX: &str = "_as_driver";

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum PartnerType {
    #[serde(rename = "PF")]
    Pf, // Pessoa Física
    #[serde(rename = "PJ")]
    Pj, // Pessoa Jurídica
}

/// Referência a quem dirige um veículo.
///
/// `Registered` aponta para um `Driver` gravado; `Partner` é o próprio parceiro PF
/// marcado como motorista, que não possui registro em `mobtax_motoristas`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(tag = "tipo", content = "id", rename_all = "snake_case")]
pub enum DriverRef {
    #[serde(rename = "motorista")]
    Registered(Uuid),
    #[serde(rename = "parceiro")]
    Partner(Uuid),
}

impl fmt::Display for DriverRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverRef::Registered(id) => write!(f, "{}", id),
            DriverRef::Partner(id) => write!(f, "{}{}", id, AS_DRIVER_SUFFIX),
        }
    }
}

// Formato textual usado só na borda HTTP (path/query): "<uuid>" ou "<uuid>_as_driver".
impl FromStr for DriverRef {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_suffix(AS_DRIVER_SUFFIX) {
            Some(partner_id) => Ok(DriverRef::Partner(Uuid::parse_str(partner_id)?)),
            None => Ok(DriverRef::Registered(Uuid::parse_str(s)?)),
        }
    }
}

// --- PARCEIRO ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: Uuid,
    pub tipo: PartnerType,
    #[schema(example = "Transportadora ABC Ltda")]
    pub nome: Option<String>,
    #[schema(example = "12.345.678/0001-90")]
    pub documento: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub cep: Option<String>,
    pub observacoes: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    // Só faz sentido para PF
    #[serde(default)]
    pub is_motorista: bool,
    pub cnh: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Partner, EntityKind::Partner);

impl Partner {
    /// Parceiro PF marcado como motorista pode ser vinculado a veículos.
    pub fn acts_as_driver(&self) -> bool {
        self.tipo == PartnerType::Pf && self.is_motorista
    }
}

// --- MOTORISTA ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: Uuid,
    pub parceiro_id: Uuid,
    #[schema(example = "José da Silva")]
    pub nome: String,
    pub cpf: Option<String>,
    pub cnh: Option<String>,
    pub categoria_cnh: Option<String>,
    #[schema(value_type = Option<String>, format = Date, example = "2025-12-31")]
    pub validade_cnh: Option<NaiveDate>,
    pub telefone: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub veiculo_vinculado: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Driver, EntityKind::Driver);

impl PartnerOwned for Driver {
    fn parceiro_id(&self) -> Uuid {
        self.parceiro_id
    }
}

// --- VEÍCULO ---

/// Configuração de placas: caminhão simples ou conjunto cavalo + carretas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "tipo")]
pub enum VehicleConfig {
    Truck {
        placa: String,
    },
    #[serde(rename_all = "camelCase")]
    Conjunto {
        placa_cavalo: String,
        // Uma ou duas carretas
        placas_carreta: Vec<String>,
        placa_dolly: Option<String>,
    },
}

impl VehicleConfig {
    /// Placa principal (a do caminhão ou a do cavalo).
    pub fn main_plate(&self) -> &str {
        match self {
            VehicleConfig::Truck { placa } => placa,
            VehicleConfig::Conjunto { placa_cavalo, .. } => placa_cavalo,
        }
    }

    pub fn plates(&self) -> Vec<&str> {
        match self {
            VehicleConfig::Truck { placa } => vec![placa.as_str()],
            VehicleConfig::Conjunto {
                placa_cavalo,
                placas_carreta,
                placa_dolly,
            } => std::iter::once(placa_cavalo.as_str())
                .chain(placas_carreta.iter().map(String::as_str))
                .chain(placa_dolly.as_deref())
                .collect(),
        }
    }

    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut reject = |field: &'static str, message: &'static str| {
            let mut error = ValidationError::new("invalid_plate");
            error.message = Some(message.into());
            errors.add(field, error);
        };

        match self {
            VehicleConfig::Truck { placa } => {
                if placa.trim().is_empty() {
                    reject("placa", "A placa é obrigatória.");
                }
            }
            VehicleConfig::Conjunto {
                placa_cavalo,
                placas_carreta,
                placa_dolly,
            } => {
                if placa_cavalo.trim().is_empty() {
                    reject("placaCavalo", "A placa do cavalo é obrigatória.");
                }
                if placas_carreta.is_empty() || placas_carreta.len() > 2 {
                    reject("placasCarreta", "Informe uma ou duas placas de carreta.");
                } else if placas_carreta.iter().any(|p| p.trim().is_empty()) {
                    reject("placasCarreta", "As placas de carreta não podem ser vazias.");
                }
                if placa_dolly.as_deref().is_some_and(|p| p.trim().is_empty()) {
                    reject("placaDolly", "A placa do dolly não pode ser vazia.");
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub parceiro_id: Uuid,
    #[serde(flatten)]
    pub configuracao: VehicleConfig,
    pub fabricante: Option<String>,
    pub modelo: Option<String>,
    pub ano: Option<i32>,
    pub chassis: Option<String>,
    pub carroceria: Option<String>,
    pub capacidade: Option<Decimal>,
    pub motorista_vinculado: Option<DriverRef>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Vehicle, EntityKind::Vehicle);

impl PartnerOwned for Vehicle {
    fn parceiro_id(&self) -> Uuid {
        self.parceiro_id
    }
}

impl Vehicle {
    pub fn matches_plate(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.configuracao
            .plates()
            .iter()
            .any(|p| p.to_lowercase().contains(&term))
    }
}

/// Motorista selecionável: registrado ou sintetizado a partir do parceiro.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DriverCandidate {
    pub referencia: DriverRef,
    pub parceiro_id: Uuid,
    pub nome: String,
    pub cpf: Option<String>,
    pub cnh: Option<String>,
    pub telefone: Option<String>,
    pub is_active: bool,
    pub veiculo_vinculado: Option<Uuid>,
}

impl DriverCandidate {
    pub fn registered(driver: &Driver) -> Self {
        Self {
            referencia: DriverRef::Registered(driver.id),
            parceiro_id: driver.parceiro_id,
            nome: driver.nome.clone(),
            cpf: driver.cpf.clone(),
            cnh: driver.cnh.clone(),
            telefone: driver.telefone.clone(),
            is_active: driver.is_active,
            veiculo_vinculado: driver.veiculo_vinculado,
        }
    }

    /// O vínculo de um parceiro-motorista só existe do lado do veículo.
    pub fn from_partner(partner: &Partner, veiculo_vinculado: Option<Uuid>) -> Self {
        Self {
            referencia: DriverRef::Partner(partner.id),
            parceiro_id: partner.id,
            nome: partner.nome.clone().unwrap_or_default(),
            cpf: partner.documento.clone(),
            cnh: partner.cnh.clone(),
            telefone: partner.telefone.clone(),
            is_active: partner.is_active,
            veiculo_vinculado,
        }
    }
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartnerPayload {
    pub tipo: PartnerType,
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    #[schema(example = "Carlos Oliveira")]
    pub nome: Option<String>,
    pub documento: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    #[validate(length(equal = 2, message = "Use a sigla do estado (ex: SP)."))]
    pub estado: Option<String>,
    pub cep: Option<String>,
    pub observacoes: Option<String>,
    #[serde(default)]
    pub is_motorista: bool,
    pub cnh: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePartnerPayload {
    pub tipo: Option<PartnerType>,
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub nome: Option<String>,
    pub documento: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    #[validate(length(equal = 2, message = "Use a sigla do estado (ex: SP)."))]
    pub estado: Option<String>,
    pub cep: Option<String>,
    pub observacoes: Option<String>,
    pub is_motorista: Option<bool>,
    pub cnh: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdatePartnerPayload {
    // Mescla apenas os campos informados
    pub fn apply(self, partner: &mut Partner) {
        if let Some(tipo) = self.tipo {
            partner.tipo = tipo;
        }
        merge(&mut partner.nome, self.nome);
        merge(&mut partner.documento, self.documento);
        merge(&mut partner.email, self.email);
        merge(&mut partner.telefone, self.telefone);
        merge(&mut partner.endereco, self.endereco);
        merge(&mut partner.cidade, self.cidade);
        merge(&mut partner.estado, self.estado);
        merge(&mut partner.cep, self.cep);
        merge(&mut partner.observacoes, self.observacoes);
        merge(&mut partner.cnh, self.cnh);
        if let Some(is_motorista) = self.is_motorista {
            partner.is_motorista = is_motorista;
        }
        if let Some(is_active) = self.is_active {
            partner.is_active = is_active;
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDriverPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub nome: String,
    pub cpf: Option<String>,
    pub cnh: Option<String>,
    pub categoria_cnh: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub validade_cnh: Option<NaiveDate>,
    pub telefone: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDriverPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub nome: Option<String>,
    pub cpf: Option<String>,
    pub cnh: Option<String>,
    pub categoria_cnh: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub validade_cnh: Option<NaiveDate>,
    pub telefone: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateDriverPayload {
    // O vínculo com veículo não é editável aqui: passa pelo LinkageService
    pub fn apply(self, driver: &mut Driver) {
        if let Some(nome) = self.nome {
            driver.nome = nome;
        }
        merge(&mut driver.cpf, self.cpf);
        merge(&mut driver.cnh, self.cnh);
        merge(&mut driver.categoria_cnh, self.categoria_cnh);
        merge(&mut driver.validade_cnh, self.validade_cnh);
        merge(&mut driver.telefone, self.telefone);
        if let Some(is_active) = self.is_active {
            driver.is_active = is_active;
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehiclePayload {
    #[serde(flatten)]
    pub configuracao: VehicleConfig,
    pub fabricante: Option<String>,
    pub modelo: Option<String>,
    #[validate(range(min = 1950, max = 2100, message = "Ano inválido."))]
    pub ano: Option<i32>,
    pub chassis: Option<String>,
    pub carroceria: Option<String>,
    pub capacidade: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehiclePayload {
    // Substitui a configuração de placas inteira
    pub configuracao: Option<VehicleConfig>,
    pub fabricante: Option<String>,
    pub modelo: Option<String>,
    #[validate(range(min = 1950, max = 2100, message = "Ano inválido."))]
    pub ano: Option<i32>,
    pub chassis: Option<String>,
    pub carroceria: Option<String>,
    pub capacidade: Option<Decimal>,
    pub is_active: Option<bool>,
}

impl UpdateVehiclePayload {
    pub fn apply(self, vehicle: &mut Vehicle) {
        if let Some(configuracao) = self.configuracao {
            vehicle.configuracao = configuracao;
        }
        merge(&mut vehicle.fabricante, self.fabricante);
        merge(&mut vehicle.modelo, self.modelo);
        merge(&mut vehicle.ano, self.ano);
        merge(&mut vehicle.chassis, self.chassis);
        merge(&mut vehicle.carroceria, self.carroceria);
        merge(&mut vehicle.capacidade, self.capacidade);
        if let Some(is_active) = self.is_active {
            vehicle.is_active = is_active;
        }
    }
}

fn merge<T>(field: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *field = value;
    }
}

// --- VINCULAÇÃO ---

/// Lado de um vínculo veículo–motorista.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkable {
    Driver(DriverRef),
    Vehicle(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Motorista,
    Veiculo,
}

impl LinkKind {
    pub fn opposite(self) -> Self {
        match self {
            LinkKind::Motorista => LinkKind::Veiculo,
            LinkKind::Veiculo => LinkKind::Motorista,
        }
    }

    /// Interpreta um id textual conforme o tipo.
    pub fn parse(self, raw: &str) -> Result<Linkable, uuid::Error> {
        match self {
            LinkKind::Motorista => Ok(Linkable::Driver(raw.parse()?)),
            LinkKind::Veiculo => Ok(Linkable::Vehicle(Uuid::parse_str(raw)?)),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkPayload {
    pub kind: LinkKind,
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000_as_driver")]
    pub source_id: String,
    // Vazio/ausente: apenas desvincula a origem
    pub target_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnlinkPayload {
    pub kind: LinkKind,
    pub id: String,
}

/// Opções do diálogo de vinculação de um parceiro.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkOptions {
    pub motoristas: Vec<DriverCandidate>,
    pub veiculos: Vec<Vehicle>,
}

// --- FILTROS E ESTATÍSTICAS ---

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PartnerFilter {
    pub search: Option<String>,
    pub tipo: Option<PartnerType>,
    pub status: Option<ActiveFilter>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerStats {
    pub total_parceiros: usize,
    pub parceiros_ativos: usize,
    pub total_motoristas: usize,
    pub total_veiculos: usize,
    #[serde(rename = "parceirosPF")]
    pub parceiros_pf: usize,
    #[serde(rename = "parceirosPJ")]
    pub parceiros_pj: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn driver_ref_text_form_round_trips_partner_variant() {
        let id = Uuid::new_v4();
        let text = DriverRef::Partner(id).to_string();
        assert_eq!(text, format!("{}_as_driver", id));
        assert_eq!(text.parse::<DriverRef>().unwrap(), DriverRef::Partner(id));
        assert_eq!(id.to_string().parse::<DriverRef>().unwrap(), DriverRef::Registered(id));
        assert!("nao-e-uuid_as_driver".parse::<DriverRef>().is_err());
    }

    #[test]
    fn driver_ref_json_is_tagged() {
        let id = Uuid::nil();
        let value = serde_json::to_value(DriverRef::Partner(id)).unwrap();
        assert_eq!(value, json!({ "tipo": "parceiro", "id": id }));
    }

    #[test]
    fn conjunto_requires_one_or_two_trailers() {
        let config = VehicleConfig::Conjunto {
            placa_cavalo: "ABC1D23".into(),
            placas_carreta: vec![],
            placa_dolly: None,
        };
        assert!(config.check().is_err());

        let config = VehicleConfig::Conjunto {
            placa_cavalo: "ABC1D23".into(),
            placas_carreta: vec!["CAR0001".into(), "CAR0002".into(), "CAR0003".into()],
            placa_dolly: None,
        };
        assert!(config.check().is_err());

        let config = VehicleConfig::Conjunto {
            placa_cavalo: "ABC1D23".into(),
            placas_carreta: vec!["CAR0001".into(), "CAR0002".into()],
            placa_dolly: Some("DOL0001".into()),
        };
        assert!(config.check().is_ok());
        assert_eq!(config.plates().len(), 4);
    }

    #[test]
    fn vehicle_config_is_flattened_with_tipo_tag() {
        let payload: CreateVehiclePayload = serde_json::from_value(json!({
            "tipo": "Conjunto",
            "placaCavalo": "ABC1234",
            "placasCarreta": ["CAR0001"],
            "modelo": "FH 540"
        }))
        .unwrap();

        assert_eq!(payload.configuracao.main_plate(), "ABC1234");
        assert_eq!(payload.modelo.as_deref(), Some("FH 540"));
    }

    #[test]
    fn partner_update_merges_only_given_fields() {
        let now = Utc::now();
        let mut partner = Partner {
            id: Uuid::new_v4(),
            tipo: PartnerType::Pf,
            nome: Some("Carlos".into()),
            documento: Some("123".into()),
            email: None,
            telefone: None,
            endereco: None,
            cidade: None,
            estado: None,
            cep: None,
            observacoes: None,
            is_active: true,
            is_motorista: false,
            cnh: None,
            created_at: now,
            updated_at: now,
        };

        UpdatePartnerPayload {
            telefone: Some("(11) 9999-0000".into()),
            ..Default::default()
        }
        .apply(&mut partner);

        assert_eq!(partner.nome.as_deref(), Some("Carlos"));
        assert_eq!(partner.telefone.as_deref(), Some("(11) 9999-0000"));
    }
}
