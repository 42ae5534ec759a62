// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{middleware::i18n::Locale, models::entity::EntityKind};

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Nenhuma sessão ativa")]
    NoActiveSession,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("{entity} não encontrado: {id}")]
    NotFound { entity: EntityKind, id: String },

    #[error("Nome de usuário já existe")]
    UsernameAlreadyExists,

    #[error("As senhas não coincidem")]
    PasswordMismatch,

    #[error("Vinculação inválida: {0}")]
    InvalidLink(String),

    // Falhas do SQLite (chave-valor)
    #[error("Erro de armazenamento")]
    StorageError(#[from] sqlx::Error),

    #[error("Erro de migração: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Erro de serialização: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        AppError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Monta um erro de validação para um único campo (regras que o `validator` não expressa).
    pub fn invalid_field(field: &'static str, code: &'static str, message: &str) -> Self {
        let mut errors = validator::ValidationErrors::new();
        let mut error = validator::ValidationError::new(code);
        error.message = Some(message.to_string().into());
        errors.add(field, error);
        AppError::ValidationError(errors)
    }

    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let en = locale.is_english();

        let (status, message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let error = if en {
                    "One or more fields are invalid."
                } else {
                    "Um ou mais campos são inválidos."
                };
                return ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: error.into(),
                    details: Some(json!(details)),
                };
            }
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                if en { "Invalid username or password.".into() } else { "Usuário ou senha inválidos.".into() },
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                if en { "Missing or invalid authentication token.".into() } else { "Token de autenticação inválido ou ausente.".into() },
            ),
            AppError::NoActiveSession => (
                StatusCode::NOT_FOUND,
                if en { "No active session.".into() } else { "Nenhuma sessão ativa.".into() },
            ),
            AppError::Forbidden(reason) => (
                StatusCode::FORBIDDEN,
                if en { format!("Access denied: {}", reason) } else { format!("Acesso negado: {}", reason) },
            ),
            AppError::NotFound { entity, id } => (
                StatusCode::NOT_FOUND,
                if en {
                    format!("{} '{}' not found.", entity.label_en(), id)
                } else {
                    format!("{} '{}' não encontrado.", entity, id)
                },
            ),
            AppError::UsernameAlreadyExists => (
                StatusCode::CONFLICT,
                if en { "This username is already in use.".into() } else { "Este nome de usuário já está em uso.".into() },
            ),
            AppError::PasswordMismatch => (
                StatusCode::BAD_REQUEST,
                if en { "Passwords do not match.".into() } else { "As senhas não coincidem!".into() },
            ),
            AppError::InvalidLink(reason) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                if en { format!("Invalid link: {}", reason) } else { format!("Vinculação inválida: {}", reason) },
            ),

            // Todos os outros erros viram 500.
            // O `tracing` registra a mensagem detalhada que o `thiserror` nos deu.
            e => {
                tracing::error!("🔥 Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    if en { "An unexpected error occurred.".into() } else { "Ocorreu um erro inesperado.".into() },
                )
            }
        };

        ApiError {
            status,
            error: message,
            details: None,
        }
    }
}

/// Erro já traduzido, pronto para virar resposta HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}
