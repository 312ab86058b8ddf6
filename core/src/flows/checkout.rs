// core/src/flows/checkout.rs

//! Checkout session creation: the cart flow (optional fixed discount, then
//! session) and the single-item leader login checkout.

use crate::core::{ContextData, PipelineControl, SkipCondition};
use crate::error::{BrokerError, Result};
use crate::flows::contexts::CartCheckoutCtxData;
use crate::model::{
  to_minor_units, CheckoutRequest, CreatedSession, DiscountRef, LineItem, NewCheckoutSession, CURRENCY,
};
use crate::pipeline::Pipeline;
use crate::providers::PaymentGateway;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Tax rate attached to every cart line item.
pub const TAX_RATE_ID: &str = "txr_1PSGshSINBqCF5XVmJr9lONc";

pub const ALLOWED_SHIPPING_COUNTRIES: &[&str] = &["US", "BR", "IN"];

/// Metadata value stamped on cart sessions without a coupon.
pub const NO_COUPON_APPLIED: &str = "No Coupon Applied";

pub const LEADER_LOGIN_NAME: &str = "Leader Login";

/// Leader login price in major units.
pub const LEADER_LOGIN_PRICE: i64 = 199;

fn trim_base(base_url: &str) -> &str {
  base_url.trim_end_matches('/')
}

fn shipping_countries() -> Vec<String> {
  ALLOWED_SHIPPING_COUNTRIES.iter().map(|c| c.to_string()).collect()
}

/// Builds the session for a cart, pricing each item from its unit price.
pub fn cart_session_request(
  request: &CheckoutRequest,
  discounts: Vec<DiscountRef>,
  base_url: &str,
) -> Result<NewCheckoutSession> {
  let line_items = request
    .items
    .iter()
    .map(|item| {
      Ok(LineItem {
        name: item.name.clone(),
        images: vec![item.image.clone()],
        unit_amount: to_minor_units(item.price)?,
        quantity: item.quantity,
        tax_rates: vec![TAX_RATE_ID.to_string()],
      })
    })
    .collect::<Result<Vec<_>>>()?;

  let coupon_name = request
    .coupon_name
    .clone()
    .filter(|name| !name.is_empty())
    .unwrap_or_else(|| NO_COUPON_APPLIED.to_string());
  let base = trim_base(base_url);

  Ok(NewCheckoutSession {
    line_items,
    currency: CURRENCY.to_string(),
    discounts,
    allowed_countries: shipping_countries(),
    success_url: format!("{}/complete?session_id={{CHECKOUT_SESSION_ID}}", base),
    cancel_url: format!("{}/cart", base),
    metadata: BTreeMap::from([("couponName".to_string(), coupon_name)]),
  })
}

/// The fixed-price leader login purchase. Carries no tax rate, metadata or discount.
pub fn leader_login_session_request(base_url: &str) -> NewCheckoutSession {
  let base = trim_base(base_url);
  NewCheckoutSession {
    line_items: vec![LineItem {
      name: LEADER_LOGIN_NAME.to_string(),
      images: Vec::new(),
      unit_amount: LEADER_LOGIN_PRICE * 100,
      quantity: 1,
      tax_rates: Vec::new(),
    }],
    currency: CURRENCY.to_string(),
    discounts: Vec::new(),
    allowed_countries: shipping_countries(),
    success_url: format!("{}/login?session_id={{CHECKOUT_SESSION_ID}}", base),
    cancel_url: format!("{}/login", base),
    metadata: BTreeMap::new(),
  }
}

#[instrument(skip(gateway))]
pub async fn create_leader_login_session(gateway: &dyn PaymentGateway, base_url: &str) -> Result<CreatedSession> {
  let session = gateway.create_checkout_session(&leader_login_session_request(base_url)).await?;
  info!(session_id = %session.id, "Leader login session created");
  Ok(session)
}

pub fn cart_checkout_pipeline() -> Pipeline<CartCheckoutCtxData, BrokerError> {
  let no_discount: SkipCondition<CartCheckoutCtxData> =
    Arc::new(|ctx_data: ContextData<CartCheckoutCtxData>| ctx_data.read().request.positive_discount().is_none());

  let mut p = Pipeline::<CartCheckoutCtxData, BrokerError>::new(&[
    ("create_discount", true, Some(no_discount)),
    ("create_session", false, None),
  ]);

  p.on_root("create_discount", |ctx_data: ContextData<CartCheckoutCtxData>| {
    Box::pin(async move {
      let (gateway, amount, label) = ctx_data.with(|d| {
        (
          d.gateway.clone(),
          d.request.positive_discount().unwrap_or(Decimal::ZERO),
          d.request.coupon_name.clone(),
        )
      });

      let discount = gateway.create_fixed_discount(amount, CURRENCY, label.as_deref()).await?;
      info!(discount_id = %discount.0, %amount, "Fixed discount created for cart");
      ctx_data.write().discounts.push(discount);
      Ok::<_, BrokerError>(PipelineControl::Continue)
    })
  });

  p.on_root("create_session", |ctx_data: ContextData<CartCheckoutCtxData>| {
    Box::pin(async move {
      let (gateway, new_session) = {
        let d = ctx_data.read();
        (d.gateway.clone(), cart_session_request(&d.request, d.discounts.clone(), &d.base_url))
      };
      let new_session = new_session?;

      let created = gateway.create_checkout_session(&new_session).await?;
      info!(session_id = %created.id, items = new_session.line_items.len(), "Cart checkout session created");
      ctx_data.write().session = Some(created);
      Ok::<_, BrokerError>(PipelineControl::Continue)
    })
  });

  p
}
