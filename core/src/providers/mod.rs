// core/src/providers/mod.rs

//! Adapters for the two external providers.
//!
//! Each provider is a trait so the flows can run against the real HTTP API or
//! the in-memory mocks used in tests and local development.

mod mock;
mod stripe;
mod voucherify;

pub use mock::{MockPaymentGateway, MockPromotionEngine, RecordedCall};
pub use stripe::StripeGateway;
pub use voucherify::VoucherifyEngine;

use crate::error::{BrokerError, Result};
use crate::model::{CreatedSession, DiscountRef, NewCheckoutSession, PaymentSession, Redemption, RollbackReceipt, Validation};
use async_trait::async_trait;
use reqwest::Url;
use rust_decimal::Decimal;

/// Expansion that makes the gateway inline line items and their products.
pub const LINE_ITEM_EXPANSION: &[&str] = &["line_items", "line_items.data.price.product"];

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  async fn create_checkout_session(&self, session: &NewCheckoutSession) -> Result<CreatedSession>;

  /// Fails with `BrokerError::NotFound` for an unknown or empty id.
  async fn retrieve_session(&self, session_id: &str, expand: &[&str]) -> Result<PaymentSession>;

  /// Creates a one-off fixed-amount discount. `amount` is in major units.
  async fn create_fixed_discount(&self, amount: Decimal, currency: &str, label: Option<&str>) -> Result<DiscountRef>;
}

#[async_trait]
pub trait PromotionEngine: Send + Sync {
  /// Fails with `BrokerError::Validation` when the voucher does not apply to `order_amount`.
  async fn validate(&self, code: &str, order_amount: Decimal) -> Result<Validation>;

  /// Fails with `BrokerError::Redemption`.
  async fn redeem(&self, code: &str, order_amount: Decimal) -> Result<Redemption>;

  /// Reverses a redemption. A `None` id is still sent to the engine; it is up
  /// to the engine to reject it. Fails with `BrokerError::Rollback`.
  async fn rollback(&self, redemption_id: Option<&str>, reason: &str) -> Result<RollbackReceipt>;
}

/// Joins `segments` onto `base`, percent-encoding each one.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
  let mut url = Url::parse(base).map_err(|e| BrokerError::ExternalService(format!("Invalid API base URL '{}': {}", base, e)))?;
  url
    .path_segments_mut()
    .map_err(|_| BrokerError::ExternalService(format!("API base URL '{}' cannot take a path", base)))?
    .pop_if_empty()
    .extend(segments);
  Ok(url)
}
