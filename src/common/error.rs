use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

/// Para onde o cliente é mandado quando tenta mexer em medicamento de outro usuário.
pub const SAFE_LISTING_PATH: &str = "/api/medicines";

// Erros de domínio e de infraestrutura. Convertidos em ApiError na borda (handlers).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Estoque insuficiente (solicitado {requested}, disponível {available})")]
    InsufficientStock { requested: i32, available: i32 },

    #[error("Acesso negado ao medicamento")]
    AccessDenied,

    #[error("Medicamento não encontrado")]
    MedicineNotFound,

    #[error("Ação de estoque inválida: {0}")]
    InvalidAction(String),

    #[error("Nome de usuário já existe")]
    UsernameAlreadyExists,

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// O erro já "renderizado" para o cliente, no idioma pedido.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<serde_json::Value>,
    pub location: Option<&'static str>,
}

impl AppError {
    /// Erro de validação de um único campo, no mesmo formato do `validator`.
    pub fn field(field: &'static str, code: &'static str, message: &'static str) -> Self {
        let mut err = validator::ValidationError::new(code);
        err.message = Some(message.into());
        let mut errors = validator::ValidationErrors::new();
        errors.add(field, err);
        AppError::ValidationError(errors)
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidAction(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientStock { .. } => StatusCode::CONFLICT,
            // Sem página de 403: manda de volta para a listagem
            AppError::AccessDenied => StatusCode::SEE_OTHER,
            AppError::MedicineNotFound | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::UsernameAlreadyExists | AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation",
            AppError::InsufficientStock { .. } => "insufficient_stock",
            AppError::AccessDenied => "access_denied",
            AppError::MedicineNotFound => "medicine_not_found",
            AppError::InvalidAction(_) => "invalid_action",
            AppError::UsernameAlreadyExists => "username_exists",
            AppError::EmailAlreadyExists => "email_exists",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::UserNotFound => "user_not_found",
            _ => "internal",
        }
    }

    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe fica no log, o cliente só recebe a mensagem genérica
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let params: Vec<(&str, String)> = match self {
            AppError::InsufficientStock { requested, available } => vec![
                ("requested", requested.to_string()),
                ("available", available.to_string()),
            ],
            AppError::InvalidAction(action) => vec![("action", action.clone())],
            _ => Vec::new(),
        };

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
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
                    details.insert(field.to_string(), json!(messages));
                }
                Some(serde_json::Value::Object(details))
            }
            _ => None,
        };

        let location = match self {
            AppError::AccessDenied => Some(SAFE_LISTING_PATH),
            _ => None,
        };

        ApiError {
            status,
            error: store.translate(&locale.0, self.message_key(), &params),
            details,
            location,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };

        match self.location {
            Some(location) => (self.status, [(header::LOCATION, location)], Json(body)).into_response(),
            None => (self.status, Json(body)).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn en() -> Locale {
        Locale("en".to_string())
    }

    #[test]
    fn access_denied_redirects_to_listing() {
        let api = AppError::AccessDenied.to_api_error(&en(), &I18nStore::new());
        assert_eq!(api.status, StatusCode::SEE_OTHER);
        assert_eq!(api.location, Some(SAFE_LISTING_PATH));

        let response = api.into_response();
        assert_eq!(response.headers()[header::LOCATION], SAFE_LISTING_PATH);
    }

    #[test]
    fn insufficient_stock_is_conflict_with_amounts() {
        let err = AppError::InsufficientStock { requested: 100, available: 40 };
        let api = err.to_api_error(&en(), &I18nStore::new());
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert!(api.error.contains("100") && api.error.contains("40"));
    }

    #[test]
    fn validation_lists_field_messages() {
        let mut errors = ValidationErrors::new();
        let mut e = ValidationError::new("range");
        e.message = Some("Quantity must be positive.".into());
        errors.add("quantity", e);

        let api = AppError::ValidationError(errors).to_api_error(&en(), &I18nStore::new());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["quantity"][0], "Quantity must be positive.");
    }

    #[test]
    fn not_found_and_invalid_action() {
        let store = I18nStore::new();
        assert_eq!(AppError::MedicineNotFound.to_api_error(&en(), &store).status, StatusCode::NOT_FOUND);

        let api = AppError::InvalidAction("burn".into()).to_api_error(&en(), &store);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert!(api.error.contains("'burn'"));
    }

    #[test]
    fn internal_errors_stay_generic() {
        let err = AppError::InternalServerError(anyhow::anyhow!("pool exploded"));
        let api = err.to_api_error(&Locale("pt".into()), &I18nStore::new());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "Ocorreu um erro inesperado.");
    }
}
