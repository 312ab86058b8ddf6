// server/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::{AppError, ResultExt};
use crate::state::AppState;
use coupon_checkout::{BrokerError, CartCheckoutCtxData, CheckoutRequest, ContextData, EngineError, PipelineResult};

const CHECKOUT_FAILED: &str = "Failed to create checkout session";

#[instrument(
  name = "handler::cart_payment",
  skip(app_state, req_payload),
  fields(
    items = req_payload.items.len(),
    total = ?req_payload.total,
    coupon = ?req_payload.coupon_name,
  )
)]
pub async fn cart_payment_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
  let checkout_ctx = CartCheckoutCtxData::new(
    app_state.gateway.clone(),
    app_state.config.base_url.clone(),
    req_payload.into_inner(),
  );
  let context_data = ContextData::new(checkout_ctx);

  let outcome = app_state
    .registry
    .run(context_data.clone())
    .await
    .or_session_error(CHECKOUT_FAILED)?;
  if outcome == PipelineResult::Stopped {
    warn!("Cart checkout pipeline stopped before creating a session.");
  }

  let session = context_data.read().session.clone();
  let session = session
    .ok_or_else(|| BrokerError::from(EngineError::Internal("cart checkout finished without a session".to_string())))
    .or_session_error(CHECKOUT_FAILED)?;
  info!(session_id = %session.id, "Cart checkout session ready");

  Ok(HttpResponse::Ok().json(json!({ "url": session.url })))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::web::configure_app_routes;
  use crate::web::handlers::testing::test_app;
  use actix_web::{http::StatusCode, test, App};
  use coupon_checkout::flows::checkout::TAX_RATE_ID;
  use coupon_checkout::RollbackPolicy;
  use serde_json::Value;

  fn shirt_payload(discount: Option<f64>) -> Value {
    let mut payload = json!({
      "items": [{ "name": "Shirt", "image": "http://shop.test/shirt.png", "price": 20, "quantity": 2 }],
      "total": 40,
    });
    if let Some(amount) = discount {
      payload["couponName"] = json!("SAVE10");
      payload["discountAmount"] = json!(amount);
    }
    payload
  }

  #[actix_web::test]
  async fn cart_payment_with_discount() {
    let t = test_app(RollbackPolicy::default());
    let app = test::init_service(App::new().app_data(web::Data::new(t.state.clone())).configure(configure_app_routes)).await;

    let req = test::TestRequest::post().uri("/cart-payment").set_json(shirt_payload(Some(5.0))).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["url"].is_string());

    assert_eq!(t.gateway.created_discounts(), vec![(500, Some("SAVE10".to_string()))]);
    let session = &t.gateway.created_sessions()[0];
    assert_eq!(session.line_items[0].unit_amount, 2000);
    assert_eq!(session.line_items[0].quantity, 2);
    assert_eq!(session.line_items[0].tax_rates, vec![TAX_RATE_ID.to_string()]);
    assert_eq!(session.discounts.len(), 1);
    assert_eq!(session.metadata.get("couponName").map(String::as_str), Some("SAVE10"));
  }

  #[actix_web::test]
  async fn cart_payment_without_coupon() {
    let t = test_app(RollbackPolicy::default());
    let app = test::init_service(App::new().app_data(web::Data::new(t.state.clone())).configure(configure_app_routes)).await;

    let req = test::TestRequest::post().uri("/cart-payment").set_json(shirt_payload(None)).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(t.gateway.created_discounts().is_empty());
    let session = &t.gateway.created_sessions()[0];
    assert!(session.discounts.is_empty());
    assert_eq!(
      session.metadata.get("couponName").map(String::as_str),
      Some("No Coupon Applied")
    );
  }

  #[actix_web::test]
  async fn cart_payment_failure_uses_fixed_message() {
    let t = test_app(RollbackPolicy::default());
    t.gateway.set_failing(true);
    let app = test::init_service(App::new().app_data(web::Data::new(t.state.clone())).configure(configure_app_routes)).await;

    let req = test::TestRequest::post().uri("/cart-payment").set_json(shirt_payload(None)).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Failed to create checkout session" }));
  }

  #[actix_web::test]
  async fn malformed_cart_is_rejected_by_extractor() {
    let t = test_app(RollbackPolicy::default());
    let app = test::init_service(App::new().app_data(web::Data::new(t.state.clone())).configure(configure_app_routes)).await;

    let req = test::TestRequest::post()
      .uri("/cart-payment")
      .set_json(json!({ "items": "not-a-list" }))
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(t.gateway.calls().is_empty());
  }
}
