// core/src/flows/session.rs

//! Read-only lookups of checkout sessions at the gateway.

use crate::error::Result;
use crate::model::PaymentSession;
use crate::providers::{PaymentGateway, LINE_ITEM_EXPANSION};
use tracing::{debug, instrument};

/// `true` only when the gateway reports the session as paid.
#[instrument(skip(gateway))]
pub async fn verify_payment(gateway: &dyn PaymentGateway, session_id: &str) -> Result<bool> {
  let session = gateway.retrieve_session(session_id, &[]).await?;
  debug!(status = session.payment_status.as_str(), "Session payment status");
  Ok(session.is_paid())
}

/// The gateway's raw `payment_status` string.
#[instrument(skip(gateway))]
pub async fn payment_status(gateway: &dyn PaymentGateway, session_id: &str) -> Result<String> {
  let session = gateway.retrieve_session(session_id, &[]).await?;
  Ok(session.payment_status.as_str().to_string())
}

/// The full session with its line items and their products inlined.
#[instrument(skip(gateway))]
pub async fn payment_details(gateway: &dyn PaymentGateway, session_id: &str) -> Result<PaymentSession> {
  gateway.retrieve_session(session_id, LINE_ITEM_EXPANSION).await
}
