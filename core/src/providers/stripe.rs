// core/src/providers/stripe.rs

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::{endpoint, PaymentGateway};
use crate::error::{BrokerError, Result};
use crate::model::{to_minor_units, CreatedSession, DiscountRef, NewCheckoutSession, PaymentSession};

const PROVIDER: &str = "Stripe";

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
  error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
  message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateCouponResponse {
  id: String,
}

/// Payment gateway backed by the Stripe REST API (form-encoded, basic auth).
#[derive(Debug, Clone)]
pub struct StripeGateway {
  client: Client,
  api_base: String,
  secret_key: String,
}

impl StripeGateway {
  pub fn new(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
    Self {
      client: Client::new(),
      api_base: api_base.into(),
      secret_key: secret_key.into(),
    }
  }

  async fn post_form(&self, segments: &[&str], form: &[(String, String)]) -> Result<Value> {
    let url = endpoint(&self.api_base, segments)?;
    let response = self
      .client
      .post(url)
      .basic_auth(&self.secret_key, None::<&str>)
      .form(form)
      .send()
      .await
      .map_err(|e| BrokerError::transport(PROVIDER, e))?;
    read_json(response).await
  }
}

/// Turns a Stripe response into JSON, or into `NotFound` / `ExternalService`
/// carrying Stripe's own error message.
async fn read_json(response: Response) -> Result<Value> {
  let status = response.status();
  let body = response.text().await.map_err(|e| BrokerError::transport(PROVIDER, e))?;

  if status.is_success() {
    return serde_json::from_str(&body)
      .map_err(|e| BrokerError::ExternalService(format!("Failed to parse Stripe response: {}", e)));
  }

  let message = serde_json::from_str::<StripeErrorBody>(&body)
    .ok()
    .and_then(|b| b.error.message)
    .unwrap_or(body);
  warn!(%status, %message, "Stripe API returned an error");

  if status == StatusCode::NOT_FOUND {
    Err(BrokerError::NotFound(message))
  } else {
    Err(BrokerError::ExternalService(format!("Stripe API error ({}): {}", status, message)))
  }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
  #[instrument(skip_all, fields(line_items = session.line_items.len(), discounts = session.discounts.len()))]
  async fn create_checkout_session(&self, session: &NewCheckoutSession) -> Result<CreatedSession> {
    let value = self.post_form(&["v1", "checkout", "sessions"], &session.to_form()).await?;
    let created: CreatedSession = serde_json::from_value(value)
      .map_err(|e| BrokerError::ExternalService(format!("Failed to parse Stripe session: {}", e)))?;
    debug!(session_id = %created.id, "Checkout session created");
    Ok(created)
  }

  #[instrument(skip(self))]
  async fn retrieve_session(&self, session_id: &str, expand: &[&str]) -> Result<PaymentSession> {
    if session_id.is_empty() {
      return Err(BrokerError::NotFound("No session id supplied".to_string()));
    }

    let url = endpoint(&self.api_base, &["v1", "checkout", "sessions", session_id])?;
    let query: Vec<(&str, &str)> = expand.iter().map(|field| ("expand[]", *field)).collect();
    let response = self
      .client
      .get(url)
      .basic_auth(&self.secret_key, None::<&str>)
      .query(&query)
      .send()
      .await
      .map_err(|e| BrokerError::transport(PROVIDER, e))?;

    PaymentSession::from_value(read_json(response).await?)
  }

  #[instrument(skip(self))]
  async fn create_fixed_discount(&self, amount: Decimal, currency: &str, label: Option<&str>) -> Result<DiscountRef> {
    let mut form = vec![
      ("amount_off".to_string(), to_minor_units(amount)?.to_string()),
      ("currency".to_string(), currency.to_string()),
      ("duration".to_string(), "once".to_string()),
    ];
    if let Some(name) = label {
      form.push(("name".to_string(), name.to_string()));
    }

    let value = self.post_form(&["v1", "coupons"], &form).await?;
    let coupon: CreateCouponResponse = serde_json::from_value(value)
      .map_err(|e| BrokerError::ExternalService(format!("Failed to parse Stripe coupon: {}", e)))?;
    debug!(coupon_id = %coupon.id, "Fixed discount created");
    Ok(DiscountRef(coupon.id))
  }
}
