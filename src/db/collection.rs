// src/db/collection.rs

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::entity::{Entity, PartnerOwned};

/// Lista ordenada de registros de um tipo, com marca de alteração.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
    dirty: bool,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            dirty: false,
        }
    }
}

impl<T: Entity> Collection<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, dirty: false }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }

    /// Cria um registro com id inédito; `build` recebe o id e o instante (createdAt == updatedAt).
    pub fn create<F>(&mut self, now: DateTime<Utc>, build: F) -> T
    where
        F: FnOnce(Uuid, DateTime<Utc>) -> T,
    {
        let mut id = Uuid::new_v4();
        while self.contains(id) {
            id = Uuid::new_v4();
        }

        let item = build(id, now);
        self.items.push(item.clone());
        self.dirty = true;
        item
    }

    /// Aplica `f` e carimba `updatedAt`. `None` se o id não existe.
    pub fn update<F>(&mut self, id: Uuid, now: DateTime<Utc>, f: F) -> Option<T>
    where
        F: FnOnce(&mut T),
    {
        let item = self.items.iter_mut().find(|item| item.id() == id)?;
        f(item);
        item.touch(now);
        self.dirty = true;
        Some(item.clone())
    }

    /// Atualiza todos os registros que satisfazem `pred`; devolve quantos mudaram.
    pub fn update_where<P, F>(&mut self, now: DateTime<Utc>, pred: P, mut f: F) -> usize
    where
        P: Fn(&T) -> bool,
        F: FnMut(&mut T),
    {
        let mut changed = 0;
        for item in self.items.iter_mut().filter(|item| pred(item)) {
            f(item);
            item.touch(now);
            changed += 1;
        }
        if changed > 0 {
            self.dirty = true;
        }
        changed
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        let removed = self.items.len() != before;
        if removed {
            self.dirty = true;
        }
        removed
    }

    /// Mantém só o que passa em `keep`; devolve os removidos.
    pub fn retain<F>(&mut self, keep: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        let (kept, removed): (Vec<T>, Vec<T>) = self.items.drain(..).partition(|item| keep(item));
        self.items = kept;
        if !removed.is_empty() {
            self.dirty = true;
        }
        removed
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

impl<T: PartnerOwned> Collection<T> {
    pub fn filter_by_partner(&self, parceiro_id: Uuid) -> Vec<T> {
        self.items
            .iter()
            .filter(|item| item.parceiro_id() == parceiro_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cargo::{Cargo, CargoStatus};

    fn cargo(id: Uuid, now: DateTime<Utc>) -> Cargo {
        Cargo {
            id,
            descricao: "Carga sem descrição".into(),
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

    #[test]
    fn create_assigns_unique_ids_and_equal_timestamps() {
        let mut cargas = Collection::<Cargo>::default();
        let now = Utc::now();
        let a = cargas.create(now, cargo);
        let b = cargas.create(now, cargo);

        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, a.updated_at);
        assert!(cargas.is_dirty());
    }

    #[test]
    fn update_stamps_updated_at_and_is_idempotent_otherwise() {
        let mut cargas = Collection::<Cargo>::default();
        let created = cargas.create(Utc::now(), cargo);
        let later = created.created_at + chrono::Duration::seconds(5);

        let first = cargas
            .update(created.id, later, |c| c.status = CargoStatus::EmTransito)
            .unwrap();
        let second = cargas
            .update(created.id, later + chrono::Duration::seconds(1), |c| {
                c.status = CargoStatus::EmTransito
            })
            .unwrap();

        assert_eq!(first.updated_at, later);
        assert_eq!(first.created_at, created.created_at);
        assert_eq!(first.status, second.status);
        assert_ne!(first.updated_at, second.updated_at);
    }

    #[test]
    fn update_and_remove_of_unknown_id() {
        let mut cargas = Collection::<Cargo>::default();
        assert!(cargas.update(Uuid::new_v4(), Utc::now(), |_| {}).is_none());
        assert!(!cargas.remove(Uuid::new_v4()));
        assert!(!cargas.is_dirty());
    }

    #[test]
    fn retain_returns_removed_items() {
        let mut cargas = Collection::<Cargo>::default();
        let now = Utc::now();
        let keep = cargas.create(now, cargo);
        let drop = cargas.create(now, cargo);

        let removed = cargas.retain(|c| c.id == keep.id);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, drop.id);
        assert_eq!(cargas.len(), 1);
    }
}
