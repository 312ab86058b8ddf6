// core/src/model/voucher.rs

use serde::Deserialize;
use serde_json::Value;

/// A successful validation answer from the promotions engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
  pub code: String,
  pub raw: Value,
}

/// The engine's record of a voucher consumed against an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
  pub id: String,
  /// Discount granted, in minor units.
  pub total_discount_amount: i64,
  /// Campaign the voucher belongs to; standalone vouchers have none.
  pub campaign: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RollbackReceipt {
  pub id: Option<String>,
  pub raw: Value,
}

// Wire shape of a redemption response; only the fields this service reads.
#[derive(Debug, Deserialize)]
pub(crate) struct RedemptionPayload {
  pub id: String,
  #[serde(default)]
  pub order: Option<RedemptionOrder>,
  #[serde(default)]
  pub voucher: Option<RedemptionVoucher>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RedemptionOrder {
  #[serde(default)]
  pub total_discount_amount: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RedemptionVoucher {
  #[serde(default)]
  pub campaign: Option<String>,
}

impl From<RedemptionPayload> for Redemption {
  fn from(payload: RedemptionPayload) -> Self {
    Redemption {
      id: payload.id,
      total_discount_amount: payload
        .order
        .and_then(|o| o.total_discount_amount)
        .unwrap_or_default(),
      campaign: payload.voucher.and_then(|v| v.campaign),
    }
  }
}
