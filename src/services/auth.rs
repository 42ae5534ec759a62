// src/services/auth.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::{error::AppError, password::verify_password},
    config::SuperuserCredentials,
    db::{storage::SESSION_KEY, KeyValueStorage, UserRepository},
    models::auth::{
        AuthResponse, Claims, ModulePermissions, PermissionLevel, User, UserRole, UserView,
        SUPERUSER_ID,
    },
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    storage: Arc<dyn KeyValueStorage>,
    jwt_secret: String,
    superuser: SuperuserCredentials,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        storage: Arc<dyn KeyValueStorage>,
        jwt_secret: String,
        superuser: SuperuserCredentials,
    ) -> Self {
        Self {
            user_repo,
            storage,
            jwt_secret,
            superuser,
        }
    }

    /// Administrador embutido, fora da coleção de usuários.
    pub fn superuser(&self) -> User {
        User {
            id: SUPERUSER_ID,
            username: self.superuser.username.clone(),
            password_hash: String::new(),
            email: None,
            name: Some("Administrador".into()),
            role: UserRole::Admin,
            is_active: true,
            created_by: None,
            permissions: Some(ModulePermissions::all(PermissionLevel::Edit)),
            last_login: None,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = if username == self.superuser.username && password == self.superuser.password {
            self.superuser()
        } else {
            let user = self
                .user_repo
                .find_by_username(username)
                .await
                .ok_or(AppError::InvalidCredentials)?;

            if !verify_password(password, &user.password_hash).await? {
                return Err(AppError::InvalidCredentials);
            }
            if !user.is_active {
                tracing::warn!("⚠️ Login recusado para usuário inativo '{}'", username);
                return Err(AppError::InvalidCredentials);
            }

            self.user_repo.touch_last_login(user.id, Utc::now()).await?;
            self.user_repo.find_by_id(user.id).await.unwrap_or(user)
        };

        self.storage.save(SESSION_KEY, user.id.to_string()).await?;
        tracing::info!("✅ Login de '{}' ({:?})", user.username, user.role);

        self.session_for(&user)
    }

    /// Usuário da sessão persistida, se houver.
    pub async fn restore_session(&self) -> Result<Option<User>, AppError> {
        let Some(raw) = self.storage.load(SESSION_KEY).await? else {
            return Ok(None);
        };
        let Ok(id) = Uuid::parse_str(raw.trim()) else {
            return Ok(None);
        };
        Ok(self.resolve_user(id).await)
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        self.storage.remove(SESSION_KEY).await?;
        tracing::info!("👋 Sessão encerrada");
        Ok(())
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.resolve_user(token_data.claims.sub)
            .await
            .ok_or(AppError::InvalidToken)
    }

    pub fn session_for(&self, user: &User) -> Result<AuthResponse, AppError> {
        Ok(AuthResponse {
            token: self.create_token(user.id)?,
            user: UserView::from(user),
        })
    }

    // Usuários inativos não mantêm sessão
    async fn resolve_user(&self, id: Uuid) -> Option<User> {
        if id == SUPERUSER_ID {
            return Some(self.superuser());
        }
        self.user_repo.find_by_id(id).await.filter(|u| u.is_active)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{database::SeedPolicy, Database, MemoryStorage};
    use crate::models::auth::Module;
    use tracing_test::traced_test;

    async fn service() -> AuthService {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let db = Database::load(storage.clone(), SeedPolicy::Demo { bcrypt_cost: 4 })
            .await
            .unwrap();
        AuthService::new(
            UserRepository::new(db),
            storage,
            "segredo-de-teste".into(),
            SuperuserCredentials::default(),
        )
    }

    #[tokio::test]
    async fn superuser_login_is_independent_of_users_collection() {
        let auth = service().await;
        let response = auth.login("Admin", "@Vant96").await.unwrap();

        assert_eq!(response.user.id, SUPERUSER_ID);
        assert_eq!(response.user.role, UserRole::Admin);
        assert_eq!(response.user.permissions, ModulePermissions::all(PermissionLevel::Edit));
        assert!(auth.user_repo.find_by_id(SUPERUSER_ID).await.is_none());

        let from_token = auth.validate_token(&response.token).await.unwrap();
        assert!(from_token.can(Module::Usuarios, PermissionLevel::Edit));
    }

    #[tokio::test]
    async fn seeded_user_logs_in_and_session_is_restored() {
        let auth = service().await;
        let response = auth.login("master", "master123").await.unwrap();
        assert!(response.user.last_login.is_some());

        let restored = auth.restore_session().await.unwrap().unwrap();
        assert_eq!(restored.username, "master");

        auth.logout().await.unwrap();
        assert!(auth.restore_session().await.unwrap().is_none());
    }

    #[traced_test]
    #[tokio::test]
    async fn wrong_password_and_inactive_user_are_refused() {
        let auth = service().await;
        assert!(matches!(
            auth.login("master", "errada").await,
            Err(AppError::InvalidCredentials)
        ));

        let master = auth.user_repo.find_by_username("master").await.unwrap();
        auth.user_repo.update(master.id, |u| u.is_active = false).await.unwrap();

        assert!(matches!(
            auth.login("master", "master123").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(logs_contain("inativo"));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let auth = service().await;
        assert!(matches!(
            auth.validate_token("nao.e.jwt").await,
            Err(AppError::InvalidToken)
        ));
    }
}
