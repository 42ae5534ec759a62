pub mod storage;
pub mod collection;
pub mod database;
pub mod seed;

pub use database::{Database, SeedPolicy};
pub use storage::{KeyValueStorage, MemoryStorage, SqliteStorage};

pub mod user_repo;
pub use user_repo::UserRepository;
pub mod partner_repo;
pub use partner_repo::PartnerRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
pub mod cargo_repo;
pub use cargo_repo::CargoRepository;
