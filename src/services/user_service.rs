// src/services/user_service.rs

use uuid::Uuid;

use crate::{
    common::{error::AppError, password::hash_password},
    db::{user_repo::NewUser, UserRepository},
    models::{
        auth::{CreateUserPayload, UpdateUserPayload, User, UserFilter, UserRole, UserStats, UserView},
        entity::EntityKind,
    },
};

pub fn filter_users(users: &[User], filter: &UserFilter) -> Vec<UserView> {
    let search = filter.search.as_deref().map(str::to_lowercase);
    users
        .iter()
        .filter(|u| {
            search.as_deref().is_none_or(|term| {
                u.username.to_lowercase().contains(term)
                    || u.email.as_deref().is_some_and(|e| e.to_lowercase().contains(term))
            })
        })
        .filter(|u| filter.role.is_none_or(|r| u.role == r))
        .filter(|u| filter.status.is_none_or(|s| s.matches(u.is_active)))
        .map(UserView::from)
        .collect()
}

pub fn user_stats(users: &[User]) -> UserStats {
    let count_role = |role: UserRole| users.iter().filter(|u| u.role == role).count();
    UserStats {
        total_users: users.len(),
        active_users: users.iter().filter(|u| u.is_active).count(),
        admin_users: count_role(UserRole::Admin),
        master_users: count_role(UserRole::Master),
        common_users: count_role(UserRole::Comum),
    }
}

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(repo: UserRepository, bcrypt_cost: u32) -> Self {
        Self { repo, bcrypt_cost }
    }

    pub async fn list(&self, filter: &UserFilter) -> Vec<UserView> {
        filter_users(&self.repo.list().await, filter)
    }

    pub async fn stats(&self) -> UserStats {
        user_stats(&self.repo.list().await)
    }

    pub async fn get(&self, id: Uuid) -> Result<UserView, AppError> {
        self.repo
            .find_by_id(id)
            .await
            .map(|u| UserView::from(&u))
            .ok_or_else(|| AppError::not_found(EntityKind::User, id))
    }

    pub async fn create(&self, actor: &User, payload: CreateUserPayload) -> Result<UserView, AppError> {
        if !actor.role.can_create(payload.role) {
            return Err(AppError::Forbidden(format!(
                "o cargo {:?} não pode criar usuários {:?}",
                actor.role, payload.role
            )));
        }
        if payload.password != payload.confirm_password {
            return Err(AppError::PasswordMismatch);
        }

        let password_hash = hash_password(&payload.password, self.bcrypt_cost).await?;
        let user = self
            .repo
            .create(NewUser {
                username: payload.username,
                password_hash,
                email: payload.email,
                name: payload.name,
                role: payload.role,
                is_active: payload.is_active,
                created_by: Some(actor.id),
                permissions: payload.permissions,
            })
            .await?;

        tracing::info!("👤 Usuário '{}' criado por '{}'", user.username, actor.username);
        Ok(UserView::from(&user))
    }

    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        payload: UpdateUserPayload,
    ) -> Result<UserView, AppError> {
        let target = self
            .repo
            .find_by_id(id)
            .await
            .ok_or_else(|| AppError::not_found(EntityKind::User, id))?;

        if !actor.can_edit_user(&target) {
            return Err(AppError::Forbidden("sem permissão para editar este usuário".into()));
        }
        if let Some(role) = payload.role {
            if role != target.role && !actor.role.can_create(role) {
                return Err(AppError::Forbidden(format!("não é possível atribuir o cargo {:?}", role)));
            }
        }
        // Usuário comum altera só os próprios dados básicos
        if actor.role == UserRole::Comum && (payload.permissions.is_some() || payload.is_active.is_some()) {
            return Err(AppError::Forbidden("apenas admin ou master alteram permissões".into()));
        }

        let password_hash = match payload.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => {
                if payload.confirm_password.as_deref() != Some(password) {
                    return Err(AppError::PasswordMismatch);
                }
                if password.chars().count() < 6 {
                    return Err(AppError::invalid_field(
                        "password",
                        "length",
                        "A senha deve ter no mínimo 6 caracteres.",
                    ));
                }
                Some(hash_password(password, self.bcrypt_cost).await?)
            }
            None => None,
        };

        let updated = self
            .repo
            .update(id, move |u| {
                if let Some(username) = payload.username {
                    u.username = username;
                }
                if payload.email.is_some() {
                    u.email = payload.email;
                }
                if payload.name.is_some() {
                    u.name = payload.name;
                }
                if let Some(hash) = password_hash {
                    u.password_hash = hash;
                }
                if let Some(role) = payload.role {
                    u.role = role;
                }
                if let Some(is_active) = payload.is_active {
                    u.is_active = is_active;
                }
                if payload.permissions.is_some() {
                    u.permissions = payload.permissions;
                }
            })
            .await?;

        Ok(UserView::from(&updated))
    }

    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<bool, AppError> {
        if !actor.can_delete_user(id) {
            return Err(AppError::Forbidden("apenas administradores excluem outros usuários".into()));
        }
        let removed = self.repo.delete(id).await?;
        if removed {
            tracing::info!("🗑️ Usuário {} excluído por '{}'", id, actor.username);
        }
        Ok(removed)
    }
}
