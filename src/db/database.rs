// src/db/database.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, RwLockReadGuard};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{collection::Collection, seed, storage::KeyValueStorage},
    models::{
        auth::User,
        cargo::Cargo,
        entity::{Entity, EntityKind},
        finance::FinancialMovement,
        partner::{Driver, DriverRef, Partner, Vehicle},
    },
};

/// Todas as coleções em memória.
#[derive(Debug, Clone, Default)]
pub struct Collections {
    pub users: Collection<User>,
    pub partners: Collection<Partner>,
    pub drivers: Collection<Driver>,
    pub vehicles: Collection<Vehicle>,
    pub movements: Collection<FinancialMovement>,
    pub cargoes: Collection<Cargo>,
}

impl Collections {
    fn dirty_entries(&self) -> Result<Vec<(&'static str, String)>, AppError> {
        let mut entries = Vec::new();
        push_if_dirty(&mut entries, &self.users)?;
        push_if_dirty(&mut entries, &self.partners)?;
        push_if_dirty(&mut entries, &self.drivers)?;
        push_if_dirty(&mut entries, &self.vehicles)?;
        push_if_dirty(&mut entries, &self.movements)?;
        push_if_dirty(&mut entries, &self.cargoes)?;
        Ok(entries)
    }

    fn mark_all(&mut self, dirty: bool) {
        macro_rules! each {
            ($($c:ident),*) => {
                $(if dirty { self.$c.mark_dirty() } else { self.$c.mark_clean() })*
            };
        }
        each!(users, partners, drivers, vehicles, movements, cargoes);
    }

    // --- Integridade referencial ---

    pub fn ensure_partner(&self, id: Uuid) -> Result<&Partner, AppError> {
        self.partners
            .get(id)
            .ok_or_else(|| AppError::not_found(EntityKind::Partner, id))
    }

    // Parceiro só vale como motorista se for PF marcado como motorista
    pub fn ensure_driver_ref(&self, driver: DriverRef) -> Result<(), AppError> {
        match driver {
            DriverRef::Registered(id) if self.drivers.contains(id) => Ok(()),
            DriverRef::Partner(id) => match self.partners.get(id) {
                Some(p) if p.acts_as_driver() => Ok(()),
                Some(_) => Err(AppError::InvalidLink(
                    "o parceiro precisa ser PF e estar marcado como motorista".into(),
                )),
                None => Err(AppError::not_found(EntityKind::Driver, driver)),
            },
            other => Err(AppError::not_found(EntityKind::Driver, other)),
        }
    }

    pub fn ensure_vehicle(&self, id: Uuid) -> Result<&Vehicle, AppError> {
        self.vehicles
            .get(id)
            .ok_or_else(|| AppError::not_found(EntityKind::Vehicle, id))
    }

    pub fn ensure_cargo(&self, id: Uuid) -> Result<(), AppError> {
        if self.cargoes.contains(id) {
            Ok(())
        } else {
            Err(AppError::not_found(EntityKind::Cargo, id))
        }
    }

    /// Veículo atualmente vinculado ao motorista (ou parceiro-motorista).
    pub fn vehicle_linked_to(&self, driver: DriverRef) -> Option<&Vehicle> {
        match driver {
            DriverRef::Registered(id) => self
                .drivers
                .get(id)
                .and_then(|d| d.veiculo_vinculado)
                .and_then(|v| self.vehicles.get(v)),
            DriverRef::Partner(_) => self
                .vehicles
                .iter()
                .find(|v| v.motorista_vinculado == Some(driver)),
        }
    }
}

fn push_if_dirty<T: Entity>(
    entries: &mut Vec<(&'static str, String)>,
    collection: &Collection<T>,
) -> Result<(), AppError> {
    if collection.is_dirty() {
        entries.push((T::KIND.storage_key(), collection.to_json()?));
    }
    Ok(())
}

async fn load_collection<T: Entity>(
    storage: &dyn KeyValueStorage,
) -> Result<Option<Collection<T>>, AppError> {
    match storage.load(T::KIND.storage_key()).await? {
        Some(raw) => Ok(Some(Collection::from_json(&raw)?)),
        None => Ok(None),
    }
}

/// O que fazer quando o armazenamento não tem usuários ou parceiros.
#[derive(Debug, Clone, Copy)]
pub enum SeedPolicy {
    Demo { bcrypt_cost: u32 },
    Empty,
}

/// Estado compartilhado: coleções em memória espelhadas no armazenamento.
#[derive(Clone)]
pub struct Database {
    inner: Arc<RwLock<Collections>>,
    storage: Arc<dyn KeyValueStorage>,
}

impl Database {
    pub async fn load(storage: Arc<dyn KeyValueStorage>, seed: SeedPolicy) -> Result<Self, AppError> {
        let users = load_collection::<User>(storage.as_ref()).await?;
        let partners = load_collection::<Partner>(storage.as_ref()).await?;

        let collections = match (users, partners, seed) {
            (Some(users), Some(partners), _) => Collections {
                users,
                partners,
                drivers: load_collection(storage.as_ref()).await?.unwrap_or_default(),
                vehicles: load_collection(storage.as_ref()).await?.unwrap_or_default(),
                movements: load_collection(storage.as_ref()).await?.unwrap_or_default(),
                cargoes: load_collection(storage.as_ref()).await?.unwrap_or_default(),
            },
            (_, _, SeedPolicy::Demo { bcrypt_cost }) => {
                tracing::info!("🌱 Armazenamento vazio, carregando dados de demonstração");
                let mut demo = seed::demo_data(bcrypt_cost).await?;
                demo.mark_all(true);
                let entries = demo.dirty_entries()?;
                storage.save_many(&entries).await?;
                demo.mark_all(false);
                demo
            }
            (users, partners, SeedPolicy::Empty) => Collections {
                users: users.unwrap_or_default(),
                partners: partners.unwrap_or_default(),
                drivers: load_collection(storage.as_ref()).await?.unwrap_or_default(),
                vehicles: load_collection(storage.as_ref()).await?.unwrap_or_default(),
                movements: load_collection(storage.as_ref()).await?.unwrap_or_default(),
                cargoes: load_collection(storage.as_ref()).await?.unwrap_or_default(),
            },
        };

        tracing::info!(
            "✅ Dados carregados: {} usuários, {} parceiros, {} motoristas, {} veículos, {} movimentações, {} cargas",
            collections.users.len(),
            collections.partners.len(),
            collections.drivers.len(),
            collections.vehicles.len(),
            collections.movements.len(),
            collections.cargoes.len(),
        );

        Ok(Self {
            inner: Arc::new(RwLock::new(collections)),
            storage,
        })
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Collections> {
        self.inner.read().await
    }

    /// Executa `f` sobre uma cópia e só publica se a gravação der certo.
    pub async fn transaction<R, F>(&self, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut Collections, DateTime<Utc>) -> Result<R, AppError>,
    {
        let mut guard = self.inner.write().await;
        let mut draft = guard.clone();
        draft.mark_all(false);

        let result = f(&mut draft, Utc::now())?;

        let entries = draft.dirty_entries()?;
        if !entries.is_empty() {
            if let Err(e) = self.storage.save_many(&entries).await {
                tracing::error!("🔥 Falha ao persistir {} coleção(ões): {}", entries.len(), e);
                return Err(e);
            }
        }

        draft.mark_all(false);
        *guard = draft;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::storage::{MemoryStorage, SqliteStorage};
    use async_trait::async_trait;

    struct FailingStorage;

    #[async_trait]
    impl KeyValueStorage for FailingStorage {
        async fn load(&self, _key: &str) -> Result<Option<String>, AppError> {
            Ok(None)
        }

        async fn save_many(&self, _entries: &[(&'static str, String)]) -> Result<(), AppError> {
            Err(AppError::InternalServerError(anyhow::anyhow!("disco indisponível")))
        }

        async fn remove(&self, _key: &str) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn demo_seed_is_persisted_when_storage_is_empty() {
        let storage = Arc::new(MemoryStorage::new());
        let db = Database::load(storage.clone(), SeedPolicy::Demo { bcrypt_cost: 4 })
            .await
            .unwrap();

        assert_eq!(db.read().await.users.len(), 3);
        assert_eq!(db.read().await.partners.len(), 2);
        for kind in EntityKind::ALL {
            assert!(storage.load(kind.storage_key()).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn failed_persistence_leaves_memory_untouched() {
        let db = Database::load(Arc::new(FailingStorage), SeedPolicy::Empty)
            .await
            .unwrap();

        let result = db
            .transaction(|c, now| {
                c.cargoes.create(now, |id, now| seed::blank_cargo(id, now));
                Ok(())
            })
            .await;

        assert!(result.is_err());
        assert!(db.read().await.cargoes.is_empty());
    }

    #[tokio::test]
    async fn closure_error_discards_draft() {
        let db = Database::load(Arc::new(MemoryStorage::new()), SeedPolicy::Empty)
            .await
            .unwrap();

        let result: Result<(), AppError> = db
            .transaction(|c, now| {
                c.cargoes.create(now, |id, now| seed::blank_cargo(id, now));
                Err(AppError::InvalidLink("teste".into()))
            })
            .await;

        assert!(result.is_err());
        assert!(db.read().await.cargoes.is_empty());
    }

    #[tokio::test]
    async fn sqlite_contents_survive_reload() {
        let storage = Arc::new(SqliteStorage::connect("sqlite::memory:").await.unwrap());
        let db = Database::load(storage.clone(), SeedPolicy::Empty).await.unwrap();

        let created = db
            .transaction(|c, now| Ok(c.cargoes.create(now, |id, now| seed::blank_cargo(id, now))))
            .await
            .unwrap();

        let reloaded = Database::load(storage, SeedPolicy::Empty).await.unwrap();
        let collections = reloaded.read().await;
        assert_eq!(collections.cargoes.get(created.id).map(|c| c.id), Some(created.id));
    }
}
