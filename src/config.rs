// src/config.rs

use std::{env, sync::Arc};

use anyhow::Context;

use crate::{
    db::{
        database::SeedPolicy, CargoRepository, Database, FinanceRepository, KeyValueStorage,
        PartnerRepository, SqliteStorage, UserRepository,
    },
    services::{
        AuthService, CargoService, DashboardService, FinanceService, LinkageService,
        PartnerService, UserService,
    },
};

/// Login embutido que dispensa a coleção de usuários.
#[derive(Debug, Clone)]
pub struct SuperuserCredentials {
    pub username: String,
    pub password: String,
}

impl Default for SuperuserCredentials {
    fn default() -> Self {
        Self {
            username: "Admin".into(),
            password: "@Vant96".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub bcrypt_cost: u32,
    pub seed_demo_data: bool,
    pub superuser: SuperuserCredentials,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(raw) => raw.parse().context("BCRYPT_COST deve ser um número")?,
            Err(_) => bcrypt::DEFAULT_COST,
        };
        let seed_demo_data = match env::var("SEED_DEMO_DATA") {
            Ok(raw) => raw.parse().context("SEED_DEMO_DATA deve ser true ou false")?,
            Err(_) => true,
        };

        let defaults = SuperuserCredentials::default();
        Ok(Self {
            database_url: var_or("DATABASE_URL", "sqlite://mobtax.db?mode=rwc"),
            jwt_secret,
            server_addr: var_or("SERVER_ADDR", "0.0.0.0:3000"),
            bcrypt_cost,
            seed_demo_data,
            superuser: SuperuserCredentials {
                username: var_or("SUPERUSER_USERNAME", &defaults.username),
                password: var_or("SUPERUSER_PASSWORD", &defaults.password),
            },
        })
    }

    /// Configuração local (testes): banco em memória e bcrypt barato.
    pub fn local(jwt_secret: &str) -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            jwt_secret: jwt_secret.into(),
            server_addr: "127.0.0.1:0".into(),
            bcrypt_cost: 4,
            seed_demo_data: true,
            superuser: SuperuserCredentials::default(),
        }
    }

    pub fn seed_policy(&self) -> SeedPolicy {
        if self.seed_demo_data {
            SeedPolicy::Demo { bcrypt_cost: self.bcrypt_cost }
        } else {
            SeedPolicy::Empty
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub partner_service: PartnerService,
    pub linkage_service: LinkageService,
    pub finance_service: FinanceService,
    pub cargo_service: CargoService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::from_env()?;
        let storage = SqliteStorage::connect(&config.database_url)
            .await
            .context("Falha ao abrir o armazenamento SQLite")?;

        Self::build(config, Arc::new(storage)).await
    }

    // --- Monta o gráfico de dependências ---
    pub async fn build(config: Config, storage: Arc<dyn KeyValueStorage>) -> anyhow::Result<Self> {
        let db = Database::load(storage.clone(), config.seed_policy())
            .await
            .context("Falha ao carregar os dados")?;

        let user_repo = UserRepository::new(db.clone());
        let auth_service = AuthService::new(
            user_repo.clone(),
            storage,
            config.jwt_secret.clone(),
            config.superuser.clone(),
        );
        let user_service = UserService::new(user_repo, config.bcrypt_cost);
        let partner_service = PartnerService::new(PartnerRepository::new(db.clone()));
        let linkage_service = LinkageService::new(db.clone());
        let finance_service = FinanceService::new(FinanceRepository::new(db.clone()));
        let cargo_service = CargoService::new(CargoRepository::new(db.clone()), db.clone());
        let dashboard_service = DashboardService::new(db.clone());

        Ok(Self {
            config: Arc::new(config),
            db,
            auth_service,
            user_service,
            partner_service,
            linkage_service,
            finance_service,
            cargo_service,
            dashboard_service,
        })
    }
}
