// server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use coupon_checkout::BrokerError;
use serde_json::json;
use thiserror::Error;

/// The two failure contracts the storefront relies on.
///
/// Session and payment endpoints answer HTTP 500 with `{error}`; coupon
/// endpoints answer HTTP 200 with `{success: false, message}`. The underlying
/// provider error is kept as the source and logged, never sent to the client.
#[derive(Debug, Error)]
pub enum AppError {
  #[error("{message}")]
  Session {
    message: String,
    #[source]
    source: BrokerError,
  },

  #[error("{message}")]
  Coupon {
    message: String,
    #[source]
    source: BrokerError,
  },

  #[error("Configuration Error: {0}")]
  Config(String),
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Coupon { .. } => StatusCode::OK,
      AppError::Session { .. } | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    match self {
      AppError::Session { message, source } => {
        tracing::error!(%message, provider_error = %source, "Responding with session error");
        HttpResponse::InternalServerError().json(json!({ "error": message }))
      }
      AppError::Coupon { message, source } => {
        tracing::warn!(%message, provider_error = %source, "Responding with coupon failure");
        HttpResponse::Ok().json(json!({ "success": false, "message": message }))
      }
      AppError::Config(m) => {
        tracing::error!(config_error = %m, "Responding with configuration error");
        HttpResponse::InternalServerError().json(json!({ "error": "Configuration issue" }))
      }
    }
  }
}

/// Maps a broker failure onto one of the two response contracts.
pub trait ResultExt<T> {
  /// HTTP 500 `{error: message}`.
  fn or_session_error(self, message: impl Into<String>) -> Result<T>;

  /// HTTP 500 `{error: <provider message>}`.
  fn or_provider_session_error(self) -> Result<T>;

  /// HTTP 200 `{success: false, message}`.
  fn or_coupon_error(self, message: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, BrokerError> {
  fn or_session_error(self, message: impl Into<String>) -> Result<T> {
    self.map_err(|source| AppError::Session {
      message: message.into(),
      source,
    })
  }

  fn or_provider_session_error(self) -> Result<T> {
    self.map_err(|source| AppError::Session {
      message: provider_message(&source),
      source,
    })
  }

  fn or_coupon_error(self, message: impl Into<String>) -> Result<T> {
    self.map_err(|source| AppError::Coupon {
      message: message.into(),
      source,
    })
  }
}

/// The provider's own message, without the broker's category prefix.
fn provider_message(err: &BrokerError) -> String {
  match err {
    BrokerError::ExternalService(m)
    | BrokerError::Validation(m)
    | BrokerError::Redemption(m)
    | BrokerError::Rollback(m)
    | BrokerError::NotFound(m)
    | BrokerError::InvalidAmount(m) => m.clone(),
    BrokerError::Engine { source } => source.to_string(),
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
