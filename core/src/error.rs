// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Failures raised by the pipeline engine itself, independent of any provider call.
#[derive(Debug, Error)]
pub enum EngineError {
  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("No pipeline registered for context type {type_name}")]
  NotRegistered { type_name: String },

  #[error("Error in step handler. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal engine error: {0}")]
  Internal(String),
}

impl From<AnyhowError> for EngineError {
  fn from(err: AnyhowError) -> Self {
    EngineError::HandlerError { source: err }
  }
}

pub type EngineResult<T, E = EngineError> = std::result::Result<T, E>;

/// Every way a checkout or coupon operation can fail.
///
/// The provider variants carry the provider's message so the HTTP layer can
/// log it before mapping the failure onto its response contract.
#[derive(Debug, Error)]
pub enum BrokerError {
  #[error("External service error: {0}")]
  ExternalService(String),

  #[error("Coupon validation failed: {0}")]
  Validation(String),

  #[error("Coupon redemption failed: {0}")]
  Redemption(String),

  #[error("Redemption rollback failed: {0}")]
  Rollback(String),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Invalid amount: {0}")]
  InvalidAmount(String),

  #[error("Pipeline error: {source}")]
  Engine {
    #[from]
    source: EngineError,
  },
}

impl BrokerError {
  /// Classifies a transport-level `reqwest` failure. Anything that never got a
  /// response from the provider is an external service failure.
  pub(crate) fn transport(provider: &str, err: reqwest::Error) -> Self {
    BrokerError::ExternalService(format!("{} request failed: {}", provider, err))
  }
}

pub type Result<T, E = BrokerError> = std::result::Result<T, E>;
