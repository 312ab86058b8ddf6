// core/src/providers/mock.rs

//! In-memory providers for tests and local development (`USE_MOCK_PROVIDERS`).
//! Both record every call so tests can assert on what was sent.

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::info;

use super::{PaymentGateway, PromotionEngine};
use crate::error::{BrokerError, Result};
use crate::model::{
  to_minor_units, CreatedSession, DiscountRef, NewCheckoutSession, PaymentSession, PaymentStatus, Redemption,
  RollbackReceipt, Validation,
};

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
  CreateSession(NewCheckoutSession),
  RetrieveSession { session_id: String, expand: Vec<String> },
  CreateDiscount { amount_minor: i64, currency: String, label: Option<String> },
  Validate { code: String, amount_minor: i64 },
  Redeem { code: String, amount_minor: i64 },
  Rollback { redemption_id: Option<String>, reason: String },
}

#[derive(Debug, Default)]
pub struct MockPaymentGateway {
  calls: Mutex<Vec<RecordedCall>>,
  sessions: Mutex<HashMap<String, PaymentSession>>,
  failing: AtomicBool,
  next_id: AtomicU64,
}

impl MockPaymentGateway {
  pub fn new() -> Self {
    Self::default()
  }

  /// Makes every subsequent call fail with `ExternalService`.
  pub fn set_failing(&self, failing: bool) {
    self.failing.store(failing, Ordering::SeqCst);
  }

  pub fn calls(&self) -> Vec<RecordedCall> {
    self.calls.lock().clone()
  }

  pub fn created_sessions(&self) -> Vec<NewCheckoutSession> {
    self
      .calls()
      .into_iter()
      .filter_map(|call| match call {
        RecordedCall::CreateSession(session) => Some(session),
        _ => None,
      })
      .collect()
  }

  /// `(amount_minor, label)` of every discount created.
  pub fn created_discounts(&self) -> Vec<(i64, Option<String>)> {
    self
      .calls()
      .into_iter()
      .filter_map(|call| match call {
        RecordedCall::CreateDiscount { amount_minor, label, .. } => Some((amount_minor, label)),
        _ => None,
      })
      .collect()
  }

  /// Stores a session that `retrieve_session` will return.
  pub fn insert_session(&self, session_id: &str, payment_status: &str) {
    let raw = json!({
      "id": session_id,
      "object": "checkout.session",
      "payment_status": payment_status,
      "url": null,
    });
    if let Ok(session) = PaymentSession::from_value(raw) {
      self.sessions.lock().insert(session_id.to_string(), session);
    }
  }

  fn record(&self, call: RecordedCall) -> Result<()> {
    self.calls.lock().push(call);
    if self.failing.load(Ordering::SeqCst) {
      return Err(BrokerError::ExternalService("mock gateway is failing".to_string()));
    }
    Ok(())
  }

  fn next_id(&self, prefix: &str) -> String {
    format!("{}_mock_{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
  }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
  async fn create_checkout_session(&self, session: &NewCheckoutSession) -> Result<CreatedSession> {
    self.record(RecordedCall::CreateSession(session.clone()))?;
    let id = self.next_id("cs");
    let url = format!("https://checkout.mock/pay/{}", id);

    let line_items: Vec<_> = session
      .line_items
      .iter()
      .map(|item| {
        json!({
          "description": item.name,
          "quantity": item.quantity,
          "price": { "unit_amount": item.unit_amount, "product": { "name": item.name, "images": item.images } },
        })
      })
      .collect();
    let raw = json!({
      "id": id,
      "object": "checkout.session",
      "url": url,
      "payment_status": PaymentStatus::Unpaid.as_str(),
      "metadata": session.metadata,
      "line_items": { "object": "list", "data": line_items },
    });
    let stored = PaymentSession::from_value(raw)?;
    self.sessions.lock().insert(id.clone(), stored);

    info!(session_id = %id, "Mock checkout session created");
    Ok(CreatedSession { id, url })
  }

  async fn retrieve_session(&self, session_id: &str, expand: &[&str]) -> Result<PaymentSession> {
    self.record(RecordedCall::RetrieveSession {
      session_id: session_id.to_string(),
      expand: expand.iter().map(|s| s.to_string()).collect(),
    })?;
    self
      .sessions
      .lock()
      .get(session_id)
      .cloned()
      .ok_or_else(|| BrokerError::NotFound(format!("No such checkout.session: '{}'", session_id)))
  }

  async fn create_fixed_discount(&self, amount: Decimal, currency: &str, label: Option<&str>) -> Result<DiscountRef> {
    self.record(RecordedCall::CreateDiscount {
      amount_minor: to_minor_units(amount)?,
      currency: currency.to_string(),
      label: label.map(str::to_string),
    })?;
    Ok(DiscountRef(self.next_id("co")))
  }
}

#[derive(Debug, Clone)]
struct MockVoucher {
  percent_off: Decimal,
  campaign: Option<String>,
}

/// Vouchers grant a percentage off the order amount.
#[derive(Debug, Default)]
pub struct MockPromotionEngine {
  vouchers: Mutex<HashMap<String, MockVoucher>>,
  active_redemptions: Mutex<HashMap<String, String>>,
  calls: Mutex<Vec<RecordedCall>>,
  reject_redemptions: AtomicBool,
  tolerate_missing_rollback_id: AtomicBool,
  next_id: AtomicU64,
}

impl MockPromotionEngine {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_voucher(self, code: &str, percent_off: Decimal, campaign: Option<&str>) -> Self {
    self.vouchers.lock().insert(
      code.to_string(),
      MockVoucher {
        percent_off,
        campaign: campaign.map(str::to_string),
      },
    );
    self
  }

  /// Makes `redeem` fail even for valid vouchers.
  pub fn set_reject_redemptions(&self, reject: bool) {
    self.reject_redemptions.store(reject, Ordering::SeqCst);
  }

  /// When set, a rollback with no id succeeds instead of failing.
  pub fn set_tolerate_missing_rollback_id(&self, tolerate: bool) {
    self.tolerate_missing_rollback_id.store(tolerate, Ordering::SeqCst);
  }

  pub fn calls(&self) -> Vec<RecordedCall> {
    self.calls.lock().clone()
  }

  pub fn rollback_calls(&self) -> Vec<Option<String>> {
    self
      .calls()
      .into_iter()
      .filter_map(|call| match call {
        RecordedCall::Rollback { redemption_id, .. } => Some(redemption_id),
        _ => None,
      })
      .collect()
  }

  pub fn active_redemptions(&self) -> usize {
    self.active_redemptions.lock().len()
  }

  fn voucher(&self, code: &str) -> Option<MockVoucher> {
    self.vouchers.lock().get(code).cloned()
  }
}

#[async_trait]
impl PromotionEngine for MockPromotionEngine {
  async fn validate(&self, code: &str, order_amount: Decimal) -> Result<Validation> {
    let amount_minor = to_minor_units(order_amount).map_err(|e| BrokerError::Validation(e.to_string()))?;
    self.calls.lock().push(RecordedCall::Validate {
      code: code.to_string(),
      amount_minor,
    });

    if amount_minor <= 0 {
      return Err(BrokerError::Validation("order amount must be positive".to_string()));
    }
    let voucher = self
      .voucher(code)
      .ok_or_else(|| BrokerError::Validation(format!("voucher '{}' not found", code)))?;

    Ok(Validation {
      code: code.to_string(),
      raw: json!({ "valid": true, "code": code, "campaign": voucher.campaign }),
    })
  }

  async fn redeem(&self, code: &str, order_amount: Decimal) -> Result<Redemption> {
    let amount_minor = to_minor_units(order_amount).map_err(|e| BrokerError::Redemption(e.to_string()))?;
    self.calls.lock().push(RecordedCall::Redeem {
      code: code.to_string(),
      amount_minor,
    });

    if self.reject_redemptions.load(Ordering::SeqCst) {
      return Err(BrokerError::Redemption(format!("voucher '{}' cannot be redeemed", code)));
    }
    let voucher = self
      .voucher(code)
      .ok_or_else(|| BrokerError::Redemption(format!("voucher '{}' not found", code)))?;

    let discount = (Decimal::from(amount_minor) * voucher.percent_off / Decimal::ONE_HUNDRED)
      .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
      .to_i64()
      .unwrap_or_default();
    let id = format!("r_mock_{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
    self.active_redemptions.lock().insert(id.clone(), code.to_string());

    Ok(Redemption {
      id,
      total_discount_amount: discount,
      campaign: voucher.campaign,
    })
  }

  async fn rollback(&self, redemption_id: Option<&str>, reason: &str) -> Result<RollbackReceipt> {
    self.calls.lock().push(RecordedCall::Rollback {
      redemption_id: redemption_id.map(str::to_string),
      reason: reason.to_string(),
    });

    match redemption_id {
      None if self.tolerate_missing_rollback_id.load(Ordering::SeqCst) => Ok(RollbackReceipt {
        id: None,
        raw: json!({ "result": "SUCCESS" }),
      }),
      None => Err(BrokerError::Rollback("redemption id is required".to_string())),
      Some(id) => match self.active_redemptions.lock().remove(id) {
        Some(_) => Ok(RollbackReceipt {
          id: Some(format!("rr_{}", id)),
          raw: json!({ "id": format!("rr_{}", id), "redemption": id, "result": "SUCCESS", "reason": reason }),
        }),
        None => Err(BrokerError::Rollback(format!("redemption '{}' not found", id))),
      },
    }
  }
}
