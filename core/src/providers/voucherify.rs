// core/src/providers/voucherify.rs

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use super::{endpoint, PromotionEngine};
use crate::error::{BrokerError, Result};
use crate::model::voucher::RedemptionPayload;
use crate::model::{to_minor_units, Redemption, RollbackReceipt, Validation};

const PROVIDER: &str = "Voucherify";

#[derive(Debug, Deserialize)]
struct ValidationPayload {
  #[serde(default)]
  valid: bool,
  #[serde(default)]
  reason: Option<String>,
  #[serde(default)]
  error: Option<ValidationErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ValidationErrorDetail {
  #[serde(default)]
  message: Option<String>,
}

/// Promotions engine backed by the Voucherify REST API.
#[derive(Debug, Clone)]
pub struct VoucherifyEngine {
  client: Client,
  api_base: String,
  application_id: String,
  secret_key: String,
}

impl VoucherifyEngine {
  pub fn new(application_id: impl Into<String>, secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
    Self {
      client: Client::new(),
      api_base: api_base.into(),
      application_id: application_id.into(),
      secret_key: secret_key.into(),
    }
  }

  fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
    builder
      .header("X-App-Id", self.application_id.as_str())
      .header("X-App-Token", self.secret_key.as_str())
  }

  /// Sends the request and returns the JSON body, or the engine's error message.
  async fn send(&self, builder: RequestBuilder) -> std::result::Result<Value, String> {
    let response = self
      .authorized(builder)
      .send()
      .await
      .map_err(|e| format!("{} request failed: {}", PROVIDER, e))?;
    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| format!("{} response unreadable: {}", PROVIDER, e))?;

    if !status.is_success() {
      let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);
      warn!(%status, %message, "Voucherify API returned an error");
      return Err(format!("{} API error ({}): {}", PROVIDER, status, message));
    }

    serde_json::from_str(&body).map_err(|e| format!("Failed to parse {} response: {}", PROVIDER, e))
  }
}

fn order_body(order_amount: Decimal) -> Result<Value> {
  Ok(json!({ "order": { "amount": to_minor_units(order_amount)? } }))
}

#[async_trait]
impl PromotionEngine for VoucherifyEngine {
  #[instrument(skip(self))]
  async fn validate(&self, code: &str, order_amount: Decimal) -> Result<Validation> {
    let url = endpoint(&self.api_base, &["v1", "vouchers", code, "validate"]).map_err(|e| BrokerError::Validation(e.to_string()))?;
    let body = order_body(order_amount).map_err(|e| BrokerError::Validation(e.to_string()))?;
    let raw = self.send(self.client.post(url).json(&body)).await.map_err(BrokerError::Validation)?;

    let payload: ValidationPayload =
      serde_json::from_value(raw.clone()).map_err(|e| BrokerError::Validation(format!("Unexpected validation payload: {}", e)))?;
    if !payload.valid {
      let reason = payload
        .error
        .and_then(|e| e.message)
        .or(payload.reason)
        .unwrap_or_else(|| "voucher is not valid for this order".to_string());
      return Err(BrokerError::Validation(reason));
    }

    debug!("Voucher validated");
    Ok(Validation {
      code: code.to_string(),
      raw,
    })
  }

  #[instrument(skip(self))]
  async fn redeem(&self, code: &str, order_amount: Decimal) -> Result<Redemption> {
    let url = endpoint(&self.api_base, &["v1", "vouchers", code, "redemption"]).map_err(|e| BrokerError::Redemption(e.to_string()))?;
    let body = order_body(order_amount).map_err(|e| BrokerError::Redemption(e.to_string()))?;
    let raw = self.send(self.client.post(url).json(&body)).await.map_err(BrokerError::Redemption)?;

    let payload: RedemptionPayload =
      serde_json::from_value(raw).map_err(|e| BrokerError::Redemption(format!("Unexpected redemption payload: {}", e)))?;
    let redemption = Redemption::from(payload);
    debug!(redemption_id = %redemption.id, discount_minor = redemption.total_discount_amount, "Voucher redeemed");
    Ok(redemption)
  }

  /// A missing id is sent as an empty path segment (`/v1/redemptions//rollback`),
  /// which the engine rejects.
  #[instrument(skip(self))]
  async fn rollback(&self, redemption_id: Option<&str>, reason: &str) -> Result<RollbackReceipt> {
    if redemption_id.is_none() {
      warn!("Rolling back without a recorded redemption id");
    }
    let url = endpoint(&self.api_base, &["v1", "redemptions", redemption_id.unwrap_or_default(), "rollback"])
      .map_err(|e| BrokerError::Rollback(e.to_string()))?;
    let raw = self
      .send(self.client.post(url).query(&[("reason", reason)]))
      .await
      .map_err(BrokerError::Rollback)?;

    Ok(RollbackReceipt {
      id: raw.get("id").and_then(Value::as_str).map(str::to_string),
      raw,
    })
  }
}
