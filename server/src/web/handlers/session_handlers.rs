// server/src/web/handlers/session_handlers.rs

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::{AppError, ResultExt};
use crate::state::AppState;
use coupon_checkout::flows::checkout::create_leader_login_session;
use coupon_checkout::flows::session::{payment_details, payment_status, verify_payment};

#[derive(Deserialize, Debug)]
pub struct VerifySessionQuery {
  #[serde(default)]
  pub session_id: String,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOutcome {
  Success,
  Failed,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VerifySessionResponse {
  pub payment_status: PaymentOutcome,
}

#[instrument(name = "handler::leader_login", skip(app_state))]
pub async fn leader_login_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let session = create_leader_login_session(app_state.gateway.as_ref(), &app_state.config.base_url)
    .await
    .or_provider_session_error()?;

  Ok(HttpResponse::Ok().json(json!({ "url": session.url })))
}

#[instrument(name = "handler::verify_session", skip(app_state, query), fields(session_id = %query.session_id))]
pub async fn verify_session_handler(
  app_state: web::Data<AppState>,
  query: web::Query<VerifySessionQuery>,
) -> Result<HttpResponse, AppError> {
  let paid = verify_payment(app_state.gateway.as_ref(), &query.session_id)
    .await
    .or_provider_session_error()?;
  info!(paid, "Session verified");

  Ok(HttpResponse::Ok().json(VerifySessionResponse {
    payment_status: if paid { PaymentOutcome::Success } else { PaymentOutcome::Failed },
  }))
}

#[instrument(name = "handler::stripe_session", skip(app_state))]
pub async fn stripe_session_handler(
  app_state: web::Data<AppState>,
  session_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let status = payment_status(app_state.gateway.as_ref(), &session_id)
    .await
    .or_session_error("Failed to retrieve session")?;

  Ok(HttpResponse::Ok().json(json!({ "payment_status": status })))
}

#[instrument(name = "handler::payment_details", skip(app_state))]
pub async fn payment_details_handler(
  app_state: web::Data<AppState>,
  session_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let session = payment_details(app_state.gateway.as_ref(), &session_id)
    .await
    .or_session_error("Failed to retrieve session details")?;

  Ok(HttpResponse::Ok().json(session.raw))
}

/// Sends an abandoning shopper back to the cart.
pub async fn cancel_handler(app_state: web::Data<AppState>) -> HttpResponse {
  HttpResponse::Found()
    .insert_header((header::LOCATION, app_state.config.cart_url.as_str()))
    .finish()
}
