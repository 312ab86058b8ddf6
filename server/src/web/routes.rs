// server/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{cart_handlers, session_handlers, voucher_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Mounts every endpoint at the root, where the storefront expects them.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/health", web::get().to(health_check_handler))
    // Checkout sessions
    .route("/leaderLogin", web::post().to(session_handlers::leader_login_handler))
    .route("/cart-payment", web::post().to(cart_handlers::cart_payment_handler))
    .route("/verify-session", web::get().to(session_handlers::verify_session_handler))
    .route("/stripe-session/{id}", web::get().to(session_handlers::stripe_session_handler))
    .route(
      "/payment-details/{session_id}",
      web::get().to(session_handlers::payment_details_handler),
    )
    .route("/cancel", web::get().to(session_handlers::cancel_handler))
    // Coupons
    .route("/voucher", web::post().to(voucher_handlers::apply_voucher_handler))
    .route("/revert-voucher", web::post().to(voucher_handlers::revert_voucher_handler));
}
