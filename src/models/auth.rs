// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::entity::{default_true, impl_entity, EntityKind};

/// Id fixo do superusuário embutido (nunca gravado na coleção de usuários).
pub const SUPERUSER_ID: Uuid = Uuid::from_u128(0x6d6f_6274_6178_4000_8000_0000_0000_0001);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,  // Administrador Global
    Master, // Acesso avançado com algumas restrições
    Comum,  // Acesso básico
}

impl UserRole {
    /// Cargos que este cargo pode atribuir a outros usuários.
    pub fn assignable_roles(self) -> &'static [UserRole] {
        match self {
            UserRole::Admin => &[UserRole::Admin, UserRole::Master, UserRole::Comum],
            UserRole::Master => &[UserRole::Master, UserRole::Comum],
            UserRole::Comum => &[],
        }
    }

    pub fn can_create(self, role: UserRole) -> bool {
        self.assignable_roles().contains(&role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    None,
    View,
    Edit,
}

/// Módulos (páginas) do sistema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Inicio,
    Financeiro,
    Cargas,
    Parceiros,
    Usuarios,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ModulePermissions {
    pub inicio: PermissionLevel,
    pub financeiro: PermissionLevel,
    pub cargas: PermissionLevel,
    pub parceiros: PermissionLevel,
    pub usuarios: PermissionLevel,
}

impl ModulePermissions {
    pub fn all(level: PermissionLevel) -> Self {
        Self {
            inicio: level,
            financeiro: level,
            cargas: level,
            parceiros: level,
            usuarios: level,
        }
    }

    pub fn level(&self, module: Module) -> PermissionLevel {
        match module {
            Module::Inicio => self.inicio,
            Module::Financeiro => self.financeiro,
            Module::Cargas => self.cargas,
            Module::Parceiros => self.parceiros,
            Module::Usuarios => self.usuarios,
        }
    }
}

// Representa um usuário guardado em `mobtax_users`.
// O hash é persistido, então a resposta HTTP usa `UserView`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: UserRole,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub permissions: Option<ModulePermissions>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(User, EntityKind::User);

impl User {
    /// Nível efetivo: admin edita tudo; sem nível definido vale `edit`.
    pub fn effective_level(&self, module: Module) -> PermissionLevel {
        if self.role == UserRole::Admin {
            return PermissionLevel::Edit;
        }
        self.permissions
            .map(|p| p.level(module))
            .unwrap_or(PermissionLevel::Edit)
    }

    pub fn can(&self, module: Module, required: PermissionLevel) -> bool {
        self.effective_level(module) >= required
    }

    pub fn can_edit_user(&self, target: &User) -> bool {
        match self.role {
            UserRole::Admin => true,
            UserRole::Master if target.role != UserRole::Admin => true,
            _ => self.id == target.id,
        }
    }

    pub fn can_delete_user(&self, target_id: Uuid) -> bool {
        // Ninguém exclui a si mesmo
        self.id != target_id && self.role == UserRole::Admin
    }
}

/// Usuário sem o hash da senha.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    #[schema(example = "master")]
    pub username: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub permissions: ModulePermissions,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        let permissions = ModulePermissions {
            inicio: user.effective_level(Module::Inicio),
            financeiro: user.effective_level(Module::Financeiro),
            cargas: user.effective_level(Module::Cargas),
            parceiros: user.effective_level(Module::Parceiros),
            usuarios: user.effective_level(Module::Usuarios),
        };
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            is_active: user.is_active,
            created_by: user.created_by,
            permissions,
            last_login: user.last_login,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "Informe o usuário."))]
    #[schema(example = "Admin")]
    pub username: String,
    #[validate(length(min = 1, message = "Informe a senha."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 3, max = 50, message = "O usuário deve ter entre 3 e 50 caracteres."))]
    #[schema(example = "operador")]
    pub username: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub name: Option<String>,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    pub confirm_password: String,

    pub role: UserRole,

    #[serde(default = "default_true")]
    pub is_active: bool,

    pub permissions: Option<ModulePermissions>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 3, max = 50, message = "O usuário deve ter entre 3 e 50 caracteres."))]
    pub username: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub name: Option<String>,

    // Senha vazia ou ausente mantém a atual
    pub password: Option<String>,
    pub confirm_password: Option<String>,

    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub permissions: Option<ModulePermissions>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActiveFilter {
    Active,
    Inactive,
}

impl ActiveFilter {
    pub fn matches(self, is_active: bool) -> bool {
        match self {
            ActiveFilter::Active => is_active,
            ActiveFilter::Inactive => !is_active,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<ActiveFilter>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_users: usize,
    pub active_users: usize,
    pub admin_users: usize,
    pub master_users: usize,
    pub common_users: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole, permissions: Option<ModulePermissions>) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "teste".into(),
            password_hash: String::new(),
            email: None,
            name: None,
            role,
            is_active: true,
            created_by: None,
            permissions,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn admin_always_edits_regardless_of_stored_levels() {
        let admin = user(UserRole::Admin, Some(ModulePermissions::all(PermissionLevel::None)));
        assert!(admin.can(Module::Financeiro, PermissionLevel::Edit));
    }

    #[test]
    fn missing_permissions_default_to_edit() {
        let comum = user(UserRole::Comum, None);
        assert_eq!(comum.effective_level(Module::Cargas), PermissionLevel::Edit);
    }

    #[test]
    fn view_level_blocks_edits() {
        let mut levels = ModulePermissions::all(PermissionLevel::Edit);
        levels.financeiro = PermissionLevel::View;
        let comum = user(UserRole::Comum, Some(levels));
        assert!(comum.can(Module::Financeiro, PermissionLevel::View));
        assert!(!comum.can(Module::Financeiro, PermissionLevel::Edit));
    }

    #[test]
    fn master_cannot_touch_admins() {
        let master = user(UserRole::Master, None);
        let admin = user(UserRole::Admin, None);
        assert!(!master.can_edit_user(&admin));
        assert!(!UserRole::Master.can_create(UserRole::Admin));
        assert!(UserRole::Master.can_create(UserRole::Comum));
    }

    #[test]
    fn roles_create_only_what_they_can_assign() {
        for role in [UserRole::Admin, UserRole::Master, UserRole::Comum] {
            assert!(UserRole::Admin.can_create(role));
            assert!(!UserRole::Comum.can_create(role));
        }
        assert_eq!(UserRole::Master.assignable_roles(), &[UserRole::Master, UserRole::Comum]);
    }

    #[test]
    fn only_admin_deletes_and_never_itself() {
        let admin = user(UserRole::Admin, None);
        let master = user(UserRole::Master, None);
        assert!(admin.can_delete_user(master.id));
        assert!(!admin.can_delete_user(admin.id));
        assert!(!master.can_delete_user(admin.id));
    }

    #[test]
    fn comum_edits_only_itself() {
        let comum = user(UserRole::Comum, None);
        let other = user(UserRole::Comum, None);
        assert!(comum.can_edit_user(&comum));
        assert!(!comum.can_edit_user(&other));
    }
}
