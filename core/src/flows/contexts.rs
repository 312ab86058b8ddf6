// core/src/flows/contexts.rs

//! Context data for each flow. Handlers receive these wrapped in `ContextData`.

use crate::model::{CheckoutRequest, CreatedSession, DiscountRef, Redemption, RollbackReceipt, Validation};
use crate::model::from_minor_units;
use crate::providers::{PaymentGateway, PromotionEngine};
use crate::tracker::{RedemptionStore, RollbackPolicy};
use rust_decimal::Decimal;
use std::sync::Arc;

// --- Voucher redemption ---

#[derive(Clone)]
pub struct VoucherCtxData {
  pub promotions: Arc<dyn PromotionEngine>,
  pub tracker: Arc<dyn RedemptionStore>,
  pub coupon: String,
  /// Order amount in major units.
  pub amount: Decimal,
  pub validation: Option<Validation>,
  pub redemption: Option<Redemption>,
  pub replaced_redemption_id: Option<String>,
}

impl VoucherCtxData {
  pub fn new(
    promotions: Arc<dyn PromotionEngine>,
    tracker: Arc<dyn RedemptionStore>,
    coupon: impl Into<String>,
    amount: Decimal,
  ) -> Self {
    Self {
      promotions,
      tracker,
      coupon: coupon.into(),
      amount,
      validation: None,
      redemption: None,
      replaced_redemption_id: None,
    }
  }

  /// The discount granted, once the redemption step has run.
  pub fn applied(&self) -> Option<AppliedVoucher> {
    self.redemption.as_ref().map(|r| AppliedVoucher {
      redemption_id: r.id.clone(),
      discount_amount: from_minor_units(r.total_discount_amount),
      coupon_name: r.campaign.clone(),
    })
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppliedVoucher {
  pub redemption_id: String,
  /// Major units.
  pub discount_amount: Decimal,
  pub coupon_name: Option<String>,
}

// --- Voucher rollback ---

#[derive(Clone)]
pub struct RollbackCtxData {
  pub promotions: Arc<dyn PromotionEngine>,
  pub tracker: Arc<dyn RedemptionStore>,
  pub policy: RollbackPolicy,
  pub coupon: String,
  pub redemption_id: Option<String>,
  pub receipt: Option<RollbackReceipt>,
  pub forgotten: bool,
}

impl RollbackCtxData {
  pub fn new(
    promotions: Arc<dyn PromotionEngine>,
    tracker: Arc<dyn RedemptionStore>,
    policy: RollbackPolicy,
    coupon: impl Into<String>,
  ) -> Self {
    Self {
      promotions,
      tracker,
      policy,
      coupon: coupon.into(),
      redemption_id: None,
      receipt: None,
      forgotten: false,
    }
  }
}

// --- Cart checkout ---

#[derive(Clone)]
pub struct CartCheckoutCtxData {
  pub gateway: Arc<dyn PaymentGateway>,
  /// Storefront base URL used to build the success and cancel redirects.
  pub base_url: String,
  pub request: CheckoutRequest,
  pub discounts: Vec<DiscountRef>,
  pub session: Option<CreatedSession>,
}

impl CartCheckoutCtxData {
  pub fn new(gateway: Arc<dyn PaymentGateway>, base_url: impl Into<String>, request: CheckoutRequest) -> Self {
    Self {
      gateway,
      base_url: base_url.into(),
      request,
      discounts: Vec::new(),
      session: None,
    }
  }
}
