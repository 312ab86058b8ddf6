// tests/provider_http_tests.rs
mod common;

use common::*;
use coupon_checkout::flows::checkout::{cart_session_request, leader_login_session_request};
use coupon_checkout::providers::LINE_ITEM_EXPANSION;
use coupon_checkout::{BrokerError, PaymentGateway, PromotionEngine, StripeGateway, VoucherifyEngine};
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STRIPE_KEY: &str = "sk_test_123";
// base64("sk_test_123:")
const STRIPE_AUTH: &str = "Basic c2tfdGVzdF8xMjM6";

// --- Stripe ---

#[tokio::test]
async fn test_stripe_creates_session_with_form_body_and_basic_auth() {
  setup_tracing();
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1/checkout/sessions"))
    .and(header("authorization", STRIPE_AUTH))
    .and(body_string_contains("mode=payment"))
    .and(body_string_contains("line_items%5B0%5D%5Bprice_data%5D%5Bunit_amount%5D=19900"))
    .and(body_string_contains("shipping_address_collection%5Ballowed_countries%5D%5B2%5D=IN"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "id": "cs_test_1",
      "object": "checkout.session",
      "url": "https://checkout.stripe.com/c/pay/cs_test_1",
    })))
    .expect(1)
    .mount(&server)
    .await;

  let gateway = StripeGateway::new(STRIPE_KEY, server.uri());
  let created = gateway
    .create_checkout_session(&leader_login_session_request(BASE_URL))
    .await
    .unwrap();

  assert_eq!(created.id, "cs_test_1");
  assert_eq!(created.url, "https://checkout.stripe.com/c/pay/cs_test_1");
}

#[tokio::test]
async fn test_stripe_cart_session_carries_tax_discount_and_metadata() {
  setup_tracing();
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1/checkout/sessions"))
    .and(body_string_contains("line_items%5B0%5D%5Btax_rates%5D%5B0%5D=txr_1PSGshSINBqCF5XVmJr9lONc"))
    .and(body_string_contains("discounts%5B0%5D%5Bcoupon%5D=co_9"))
    .and(body_string_contains("metadata%5BcouponName%5D=SAVE10"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "cs_2", "url": "https://pay/cs_2"})))
    .expect(1)
    .mount(&server)
    .await;

  let request: coupon_checkout::CheckoutRequest = serde_json::from_value(json!({
    "items": [{"name": "Shirt", "image": "http://shop.test/shirt.png", "price": 20, "quantity": 2}],
    "total": 40,
    "couponName": "SAVE10",
    "discountAmount": 5,
  }))
  .unwrap();
  let session = cart_session_request(
    &request,
    vec![coupon_checkout::model::DiscountRef("co_9".to_string())],
    BASE_URL,
  )
  .unwrap();

  let gateway = StripeGateway::new(STRIPE_KEY, server.uri());
  assert_eq!(gateway.create_checkout_session(&session).await.unwrap().id, "cs_2");
}

#[tokio::test]
async fn test_stripe_retrieve_sends_expansion() {
  setup_tracing();
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/v1/checkout/sessions/cs_paid"))
    .and(query_param("expand[]", "line_items.data.price.product"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "id": "cs_paid",
      "url": null,
      "payment_status": "paid",
      "line_items": {"object": "list", "data": []},
    })))
    .expect(1)
    .mount(&server)
    .await;

  let gateway = StripeGateway::new(STRIPE_KEY, server.uri());
  let session = gateway.retrieve_session("cs_paid", LINE_ITEM_EXPANSION).await.unwrap();

  assert!(session.is_paid());
  assert_eq!(session.raw["line_items"]["object"], "list");
}

#[tokio::test]
async fn test_stripe_404_is_not_found_with_provider_message() {
  setup_tracing();
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/v1/checkout/sessions/cs_gone"))
    .respond_with(ResponseTemplate::new(404).set_body_json(json!({
      "error": {"type": "invalid_request_error", "message": "No such checkout.session: 'cs_gone'"}
    })))
    .mount(&server)
    .await;

  let gateway = StripeGateway::new(STRIPE_KEY, server.uri());
  match gateway.retrieve_session("cs_gone", &[]).await {
    Err(BrokerError::NotFound(message)) => assert_eq!(message, "No such checkout.session: 'cs_gone'"),
    other => panic!("Expected NotFound, got {:?}", other),
  }
}

#[tokio::test]
async fn test_stripe_empty_session_id_never_hits_the_api() {
  setup_tracing();
  let server = MockServer::start().await;
  Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

  let gateway = StripeGateway::new(STRIPE_KEY, server.uri());
  assert!(matches!(gateway.retrieve_session("", &[]).await, Err(BrokerError::NotFound(_))));
}

#[tokio::test]
async fn test_stripe_server_error_is_external_service() {
  setup_tracing();
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1/coupons"))
    .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
    .mount(&server)
    .await;

  let gateway = StripeGateway::new(STRIPE_KEY, server.uri());
  match gateway.create_fixed_discount(dec!(5), "inr", None).await {
    Err(BrokerError::ExternalService(message)) => assert!(message.contains("upstream exploded")),
    other => panic!("Expected ExternalService, got {:?}", other),
  }
}

#[tokio::test]
async fn test_stripe_fixed_discount_is_sent_in_minor_units() {
  setup_tracing();
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1/coupons"))
    .and(body_string_contains("amount_off=500"))
    .and(body_string_contains("currency=inr"))
    .and(body_string_contains("duration=once"))
    .and(body_string_contains("name=SAVE10"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "co_123", "object": "coupon"})))
    .expect(1)
    .mount(&server)
    .await;

  let gateway = StripeGateway::new(STRIPE_KEY, server.uri());
  let discount = gateway.create_fixed_discount(dec!(5), "inr", Some("SAVE10")).await.unwrap();
  assert_eq!(discount.0, "co_123");
}

// --- Voucherify ---

fn voucherify(server: &MockServer) -> VoucherifyEngine {
  VoucherifyEngine::new("app-id", "app-token", server.uri())
}

#[tokio::test]
async fn test_voucherify_validate_sends_amount_and_credentials() {
  setup_tracing();
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1/vouchers/SAVE10/validate"))
    .and(header("X-App-Id", "app-id"))
    .and(header("X-App-Token", "app-token"))
    .and(body_json(json!({"order": {"amount": 50000}})))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": true, "code": "SAVE10"})))
    .expect(1)
    .mount(&server)
    .await;

  let validation = voucherify(&server).validate(SAVE10, dec!(500)).await.unwrap();
  assert_eq!(validation.code, SAVE10);
}

#[tokio::test]
async fn test_voucherify_invalid_voucher_is_validation_error() {
  setup_tracing();
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1/vouchers/OLD/validate"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "valid": false,
      "code": "OLD",
      "error": {"message": "voucher expired"},
    })))
    .mount(&server)
    .await;

  match voucherify(&server).validate("OLD", dec!(500)).await {
    Err(BrokerError::Validation(reason)) => assert_eq!(reason, "voucher expired"),
    other => panic!("Expected Validation, got {:?}", other),
  }
}

#[tokio::test]
async fn test_voucherify_redeem_reads_discount_and_campaign() {
  setup_tracing();
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1/vouchers/SAVE10/redemption"))
    .and(body_json(json!({"order": {"amount": 50000}})))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "id": "r_0a1b",
      "result": "SUCCESS",
      "order": {"amount": 50000, "total_discount_amount": 5000},
      "voucher": {"code": "SAVE10", "campaign": "Ten Percent Off"},
    })))
    .expect(1)
    .mount(&server)
    .await;

  let redemption = voucherify(&server).redeem(SAVE10, dec!(500)).await.unwrap();
  assert_eq!(redemption.id, "r_0a1b");
  assert_eq!(redemption.total_discount_amount, 5000);
  assert_eq!(redemption.campaign.as_deref(), Some("Ten Percent Off"));
}

#[tokio::test]
async fn test_voucherify_redeem_failure_is_redemption_error() {
  setup_tracing();
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1/vouchers/SAVE10/redemption"))
    .respond_with(ResponseTemplate::new(400).set_body_json(json!({"code": 400, "message": "quantity exceeded"})))
    .mount(&server)
    .await;

  match voucherify(&server).redeem(SAVE10, dec!(500)).await {
    Err(BrokerError::Redemption(message)) => assert!(message.contains("quantity exceeded")),
    other => panic!("Expected Redemption, got {:?}", other),
  }
}

#[tokio::test]
async fn test_voucherify_rollback_sends_reason() {
  setup_tracing();
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1/redemptions/r_0a1b/rollback"))
    .and(query_param("reason", "Payment was not completed"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "rr_1", "result": "SUCCESS"})))
    .expect(1)
    .mount(&server)
    .await;

  let receipt = voucherify(&server)
    .rollback(Some("r_0a1b"), "Payment was not completed")
    .await
    .unwrap();
  assert_eq!(receipt.id.as_deref(), Some("rr_1"));
}

#[tokio::test]
async fn test_voucherify_rollback_without_id_uses_empty_segment() {
  setup_tracing();
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1/redemptions//rollback"))
    .respond_with(ResponseTemplate::new(404).set_body_json(json!({"code": 404, "message": "Resource not found"})))
    .expect(1)
    .mount(&server)
    .await;

  match voucherify(&server).rollback(None, "Payment was not completed").await {
    Err(BrokerError::Rollback(message)) => assert!(message.contains("Resource not found")),
    other => panic!("Expected Rollback, got {:?}", other),
  }
}
