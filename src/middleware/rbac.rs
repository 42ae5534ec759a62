// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::{Module, PermissionLevel},
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    const MODULE: Module;
    const LEVEL: PermissionLevel;
}

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let locale = Locale::from_request_parts(parts, state).await.unwrap_or_default();

        // A. Extrai Usuário (colocado pelo auth_guard)
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        // B. Compara o nível efetivo do módulo
        if !user.can(T::MODULE, T::LEVEL) {
            let reason = format!("o módulo '{:?}' exige nível {:?}", T::MODULE, T::LEVEL).to_lowercase();
            return Err(AppError::Forbidden(reason).to_api_error(&locale));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

macro_rules! permission {
    ($name:ident, $module:ident, $level:ident) => {
        pub struct $name;
        impl PermissionDef for $name {
            const MODULE: Module = Module::$module;
            const LEVEL: PermissionLevel = PermissionLevel::$level;
        }
    };
}

permission!(PermInicioView, Inicio, View);
permission!(PermFinanceiroView, Financeiro, View);
permission!(PermFinanceiroEdit, Financeiro, Edit);
permission!(PermCargasView, Cargas, View);
permission!(PermCargasEdit, Cargas, Edit);
permission!(PermParceirosView, Parceiros, View);
permission!(PermParceirosEdit, Parceiros, Edit);
permission!(PermUsuariosView, Usuarios, View);
permission!(PermUsuariosEdit, Usuarios, Edit);
