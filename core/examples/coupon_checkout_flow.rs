// core/examples/coupon_checkout_flow.rs

//! Redeems a coupon, opens a discounted cart checkout, then rolls the coupon
//! back as if the customer abandoned payment. Runs entirely on the mock providers.

use coupon_checkout::{
  register_all_pipelines, BrokerError, CartCheckoutCtxData, CartItem, CheckoutRequest, ContextData,
  InMemoryRedemptionStore, MockPaymentGateway, MockPromotionEngine, PipelineRegistry, RollbackCtxData,
  RollbackPolicy, VoucherCtxData,
};
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), BrokerError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  let gateway = Arc::new(MockPaymentGateway::new());
  let promotions = Arc::new(MockPromotionEngine::new().with_voucher("SAVE10", dec!(10), Some("Ten Percent Off")));
  let tracker = Arc::new(InMemoryRedemptionStore::new());

  let registry = PipelineRegistry::<BrokerError>::new();
  register_all_pipelines(&registry);

  // 1. Redeem the coupon against the cart total.
  let voucher_ctx = ContextData::new(VoucherCtxData::new(promotions.clone(), tracker.clone(), "SAVE10", dec!(40)));
  registry.run(voucher_ctx.clone()).await?;
  let applied = voucher_ctx
    .read()
    .applied()
    .ok_or_else(|| BrokerError::Redemption("no redemption recorded".to_string()))?;
  info!(discount = %applied.discount_amount, coupon_name = ?applied.coupon_name, "Coupon applied");

  // 2. Open a checkout session carrying the discount.
  let request = CheckoutRequest {
    items: vec![CartItem {
      name: "Shirt".to_string(),
      image: "https://shop.example/shirt.png".to_string(),
      price: dec!(20),
      quantity: 2,
    }],
    total: Some(dec!(40)),
    coupon_name: Some("SAVE10".to_string()),
    discount_amount: Some(applied.discount_amount),
  };
  let cart_ctx = ContextData::new(CartCheckoutCtxData::new(gateway.clone(), "https://shop.example", request));
  registry.run(cart_ctx.clone()).await?;
  if let Some(session) = &cart_ctx.read().session {
    info!(session_id = %session.id, url = %session.url, "Send the customer here");
  }

  // 3. The customer walked away: give the coupon back.
  let rollback_ctx = ContextData::new(RollbackCtxData::new(
    promotions.clone(),
    tracker.clone(),
    RollbackPolicy::default(),
    "SAVE10",
  ));
  registry.run(rollback_ctx.clone()).await?;
  info!(
    forgotten = rollback_ctx.read().forgotten,
    active_redemptions = promotions.active_redemptions(),
    "Coupon rolled back"
  );

  Ok(())
}
