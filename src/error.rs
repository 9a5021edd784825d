// error.rs
// The two failure kinds surfaced to clients: remote operation failed vs input invalid.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Synchronous business-rule failure raised by the pure domain modules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} é obrigatório")]
    Required(&'static str),
    #[error("{0}")]
    Invalid(String),
    #[error("divergência de contagem exige justificativa (sistema: {system}, contado: {counted})")]
    MissingJustification { system: i64, counted: i64 },
    #[error("já existe um cliente com o telefone {0}")]
    DuplicatePhone(String),
    #[error("transição inválida de {from} para {to}")]
    Transition { from: String, to: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("falha na operação remota: {0:#}")]
    Remote(#[from] anyhow::Error),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("{0} não encontrado")]
    NotFound(String),
    #[error("não autenticado")]
    Unauthorized,
    #[error("acesso negado")]
    Forbidden,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        AppError::Invalid(ValidationError::Invalid(msg.into()))
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Remote(err) => {
                tracing::error!(error = ?err, "remote operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Não foi possível concluir a operação. Tente novamente.".to_string(),
                )
            }
            AppError::Invalid(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
