// src/db/user_repo.rs

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Database,
    models::{
        auth::{ModulePermissions, User, UserRole},
        entity::EntityKind,
    },
};

/// Campos de um usuário novo (senha já em hash).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub permissions: Option<ModulePermissions>,
}

// O repositório de usuários, responsável pela coleção `mobtax_users`
#[derive(Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Vec<User> {
        self.db.read().await.users.to_vec()
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<User> {
        self.db.read().await.users.get(id).cloned()
    }

    // Busca linear por username (sensível a maiúsculas)
    pub async fn find_by_username(&self, username: &str) -> Option<User> {
        self.db
            .read()
            .await
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    pub async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        self.db
            .transaction(move |c, now| {
                if c.users.iter().any(|u| u.username == new_user.username) {
                    return Err(AppError::UsernameAlreadyExists);
                }

                Ok(c.users.create(now, |id, now| User {
                    id,
                    username: new_user.username,
                    password_hash: new_user.password_hash,
                    email: new_user.email,
                    name: new_user.name,
                    role: new_user.role,
                    is_active: new_user.is_active,
                    created_by: new_user.created_by,
                    permissions: new_user.permissions,
                    last_login: None,
                    created_at: now,
                    updated_at: now,
                }))
            })
            .await
    }

    /// Aplica `f` ao usuário. O username continua único.
    pub async fn update<F>(&self, id: Uuid, f: F) -> Result<User, AppError>
    where
        F: FnOnce(&mut User) + Send,
    {
        self.db
            .transaction(move |c, now| {
                let updated = c
                    .users
                    .update(id, now, f)
                    .ok_or_else(|| AppError::not_found(EntityKind::User, id))?;

                if c.users.iter().any(|u| u.id != id && u.username == updated.username) {
                    return Err(AppError::UsernameAlreadyExists);
                }
                Ok(updated)
            })
            .await
    }

    pub async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError> {
        self.db
            .transaction(move |c, now| {
                c.users.update(id, now, |u| u.last_login = Some(at));
                Ok(())
            })
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.db.transaction(move |c, _| Ok(c.users.remove(id))).await
    }
}
