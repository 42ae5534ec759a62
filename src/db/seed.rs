// src/db/seed.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{error::AppError, password::hash_password},
    db::{collection::Collection, database::Collections},
    models::{
        auth::{User, UserRole},
        cargo::{Cargo, CargoStatus},
        finance::{FinancialMovement, MovementStatus, MovementType},
        partner::{Driver, DriverRef, Partner, PartnerType, Vehicle, VehicleConfig},
    },
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn at(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::default()).and_utc()
}

async fn demo_user(
    username: &str,
    password: &str,
    email: &str,
    name: &str,
    role: UserRole,
    created: NaiveDate,
    bcrypt_cost: u32,
) -> Result<User, AppError> {
    Ok(User {
        id: Uuid::new_v4(),
        username: username.into(),
        password_hash: hash_password(password, bcrypt_cost).await?,
        email: Some(email.into()),
        name: Some(name.into()),
        role,
        is_active: true,
        created_by: None,
        permissions: None,
        last_login: None,
        created_at: at(created),
        updated_at: at(created),
    })
}

/// Dados de demonstração gravados no primeiro uso.
pub async fn demo_data(bcrypt_cost: u32) -> Result<Collections, AppError> {
    let users = vec![
        demo_user("admin", "admin123", "admin@mobtax.com", "Administrador Global", UserRole::Admin, date(2024, 1, 1), bcrypt_cost).await?,
        demo_user("master", "master123", "master@empresa.com", "João Silva", UserRole::Master, date(2024, 1, 15), bcrypt_cost).await?,
        demo_user("usuario", "user123", "usuario@empresa.com", "Maria Santos", UserRole::Comum, date(2024, 2, 1), bcrypt_cost).await?,
    ];

    let abc = Partner {
        id: Uuid::new_v4(),
        tipo: PartnerType::Pj,
        nome: Some("Transportadora ABC Ltda".into()),
        documento: Some("12.345.678/0001-90".into()),
        email: Some("contato@transportadoraabc.com".into()),
        telefone: Some("(11) 3456-7890".into()),
        endereco: Some("Rua das Flores, 123".into()),
        cidade: Some("São Paulo".into()),
        estado: Some("SP".into()),
        cep: Some("01234-567".into()),
        observacoes: None,
        is_active: true,
        is_motorista: false,
        cnh: None,
        created_at: at(date(2024, 1, 10)),
        updated_at: at(date(2024, 1, 10)),
    };
    let carlos = Partner {
        id: Uuid::new_v4(),
        tipo: PartnerType::Pf,
        nome: Some("Carlos Oliveira".into()),
        documento: Some("123.456.789-01".into()),
        email: Some("carlos@email.com".into()),
        telefone: Some("(11) 9876-5432".into()),
        endereco: Some("Av. Paulista, 456".into()),
        cidade: Some("São Paulo".into()),
        estado: Some("SP".into()),
        cep: Some("04567-890".into()),
        observacoes: None,
        is_active: true,
        is_motorista: false,
        cnh: None,
        created_at: at(date(2024, 1, 20)),
        updated_at: at(date(2024, 1, 20)),
    };

    let jose = Driver {
        id: Uuid::new_v4(),
        parceiro_id: abc.id,
        nome: "José da Silva".into(),
        cpf: Some("987.654.321-00".into()),
        cnh: Some("12345678901".into()),
        categoria_cnh: Some("D".into()),
        validade_cnh: Some(date(2025, 12, 31)),
        telefone: Some("(11) 9999-8888".into()),
        is_active: true,
        veiculo_vinculado: None,
        created_at: at(date(2024, 1, 12)),
        updated_at: at(date(2024, 1, 12)),
    };
    let carlos_motorista = Driver {
        id: Uuid::new_v4(),
        parceiro_id: carlos.id,
        nome: "Carlos Oliveira".into(),
        cpf: Some("123.456.789-01".into()),
        cnh: Some("98765432109".into()),
        categoria_cnh: Some("C".into()),
        validade_cnh: Some(date(2025, 6, 30)),
        telefone: Some("(11) 9876-5432".into()),
        is_active: true,
        veiculo_vinculado: None,
        created_at: at(date(2024, 1, 20)),
        updated_at: at(date(2024, 1, 20)),
    };

    let truck = |parceiro_id: Uuid,
                 placa: &str,
                 fabricante: &str,
                 modelo: &str,
                 ano: i32,
                 capacidade: i64,
                 created: NaiveDate| Vehicle {
        id: Uuid::new_v4(),
        parceiro_id,
        configuracao: VehicleConfig::Truck { placa: placa.into() },
        fabricante: Some(fabricante.into()),
        modelo: Some(modelo.into()),
        ano: Some(ano),
        chassis: None,
        carroceria: None,
        capacidade: Some(Decimal::from(capacidade)),
        motorista_vinculado: None,
        is_active: true,
        created_at: at(created),
        updated_at: at(created),
    };
    let atego = truck(abc.id, "ABC1234", "Mercedes-Benz", "Atego 1719", 2020, 8000, date(2024, 1, 12));
    let cargo_816 = truck(carlos.id, "XYZ5678", "Ford", "Cargo 816", 2019, 3500, date(2024, 1, 20));

    let eletronicos = Cargo {
        id: Uuid::new_v4(),
        descricao: "Produtos eletrônicos".into(),
        origem: Some("São Paulo - SP".into()),
        destino: Some("Rio de Janeiro - RJ".into()),
        peso: Some(Decimal::from(5000)),
        valor: Some(Decimal::new(2500000, 2)),
        data_coleta: Some(date(2024, 1, 15)),
        data_entrega: Some(date(2024, 1, 16)),
        status: CargoStatus::Entregue,
        parceiro_id: Some(abc.id),
        motorista_id: Some(DriverRef::Registered(jose.id)),
        veiculo_id: Some(atego.id),
        crt: None,
        observacoes: None,
        created_at: at(date(2024, 1, 14)),
        updated_at: at(date(2024, 1, 16)),
    };
    let construcao = Cargo {
        id: Uuid::new_v4(),
        descricao: "Materiais de construção".into(),
        origem: Some("São Paulo - SP".into()),
        destino: Some("Campinas - SP".into()),
        peso: Some(Decimal::from(3200)),
        valor: Some(Decimal::new(850000, 2)),
        data_coleta: Some(date(2024, 1, 22)),
        data_entrega: Some(date(2024, 1, 22)),
        status: CargoStatus::EmTransito,
        parceiro_id: Some(carlos.id),
        motorista_id: Some(DriverRef::Registered(carlos_motorista.id)),
        veiculo_id: Some(cargo_816.id),
        crt: None,
        observacoes: None,
        created_at: at(date(2024, 1, 21)),
        updated_at: at(date(2024, 1, 22)),
    };

    let movement = |tipo: MovementType,
                    centavos: i64,
                    descricao: &str,
                    categoria: &str,
                    dia: NaiveDate,
                    status: MovementStatus,
                    parceiro_id: Uuid,
                    carga_id: Option<Uuid>| FinancialMovement {
        id: Uuid::new_v4(),
        tipo,
        valor: Decimal::new(centavos, 2),
        descricao: descricao.into(),
        categoria: Some(categoria.into()),
        data: dia,
        status,
        parceiro_id: Some(parceiro_id),
        carga_id,
        observacoes: None,
        created_at: at(dia),
        updated_at: at(dia),
    };
    let movements = vec![
        movement(MovementType::Receita, 250000, "Frete São Paulo - Rio de Janeiro", "Frete", date(2024, 1, 15), MovementStatus::Pago, abc.id, Some(eletronicos.id)),
        movement(MovementType::Despesa, 35000, "Combustível", "Combustível", date(2024, 1, 16), MovementStatus::Pago, abc.id, None),
        movement(MovementType::Receita, 180000, "Frete local - entrega de materiais", "Frete", date(2024, 1, 22), MovementStatus::Pendente, carlos.id, Some(construcao.id)),
    ];

    Ok(Collections {
        users: Collection::new(users),
        partners: Collection::new(vec![abc, carlos]),
        drivers: Collection::new(vec![jose, carlos_motorista]),
        vehicles: Collection::new(vec![atego, cargo_816]),
        movements: Collection::new(movements),
        cargoes: Collection::new(vec![eletronicos, construcao]),
    })
}

#[cfg(test)]
pub(crate) fn blank_cargo(id: Uuid, now: DateTime<Utc>) -> Cargo {
    Cargo {
        id,
        descricao: crate::models::cargo::DEFAULT_DESCRIPTION.into(),
        origem: None,
        destino: None,
        peso: None,
        valor: None,
        data_coleta: None,
        data_entrega: None,
        status: CargoStatus::AColetar,
        parceiro_id: None,
        motorista_id: None,
        veiculo_id: None,
        crt: None,
        observacoes: None,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
pub(crate) fn blank_movement(id: Uuid, now: DateTime<Utc>) -> FinancialMovement {
    FinancialMovement {
        id,
        tipo: MovementType::Despesa,
        valor: Decimal::from(100),
        descricao: "Pedágio".into(),
        categoria: None,
        data: now.date_naive(),
        status: MovementStatus::Pendente,
        parceiro_id: None,
        carga_id: None,
        observacoes: None,
        created_at: now,
        updated_at: now,
    }
}
