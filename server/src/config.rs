// server/src/config.rs

use crate::errors::{AppError, Result};
use coupon_checkout::RollbackPolicy;
use dotenvy::dotenv;
use std::env;

pub const DEFAULT_CART_URL: &str = "http://localhost:3000/cart";
pub const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com";
pub const DEFAULT_VOUCHERIFY_API_URL: &str = "https://as1.api.voucherify.io";

/// Provider credentials. Absent when the server runs on the in-memory providers.
#[derive(Clone)]
pub struct ProviderCredentials {
  pub stripe_secret_key: String,
  pub voucherify_application_id: String,
  pub voucherify_secret_key: String,
}

impl std::fmt::Debug for ProviderCredentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ProviderCredentials")
      .field("stripe_secret_key", &"[REDACTED]")
      .field("voucherify_application_id", &self.voucherify_application_id)
      .field("voucherify_secret_key", &"[REDACTED]")
      .finish()
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Base for the checkout success and cancel redirects.
  pub base_url: String,
  /// Where `/cancel` sends the shopper.
  pub cart_url: String,
  pub stripe_api_url: String,
  pub voucherify_api_url: String,
  pub rollback_policy: RollbackPolicy,
  pub use_mock_providers: bool,
  pub credentials: Option<ProviderCredentials>,
}

fn parse_flag(name: &str, raw: Option<String>) -> Result<bool> {
  match raw {
    None => Ok(false),
    Some(value) => value
      .trim()
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, value, e))),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from any variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |var_name: &str| {
      lookup(var_name)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", var_name)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8000".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let base_url = get_env("BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", server_host, server_port));
    let cart_url = get_env("CART_URL").unwrap_or_else(|_| DEFAULT_CART_URL.to_string());
    let stripe_api_url = get_env("STRIPE_API_URL").unwrap_or_else(|_| DEFAULT_STRIPE_API_URL.to_string());
    let voucherify_api_url = get_env("VOUCHERIFY_API_URL").unwrap_or_else(|_| DEFAULT_VOUCHERIFY_API_URL.to_string());

    let rollback_policy = RollbackPolicy::from_flag(parse_flag(
      "ROLLBACK_REQUIRES_REDEMPTION_ID",
      lookup("ROLLBACK_REQUIRES_REDEMPTION_ID"),
    )?);
    let use_mock_providers = parse_flag("USE_MOCK_PROVIDERS", lookup("USE_MOCK_PROVIDERS"))?;

    let credentials = if use_mock_providers {
      None
    } else {
      Some(ProviderCredentials {
        stripe_secret_key: get_env("STRIPE_SECRET_KEY")?,
        voucherify_application_id: get_env("APPLICATION_ID")?,
        voucherify_secret_key: get_env("SECRET_KEY")?,
      })
    };

    tracing::info!(
      %base_url,
      ?rollback_policy,
      use_mock_providers,
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      base_url,
      cart_url,
      stripe_api_url,
      voucherify_api_url,
      rollback_policy,
      use_mock_providers,
      credentials,
    })
  }
}
