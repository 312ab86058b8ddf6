// server/src/web/handlers/voucher_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::errors::{AppError, ResultExt};
use crate::state::AppState;
use coupon_checkout::{BrokerError, ContextData, EngineError, RollbackCtxData, VoucherCtxData};

// --- Request / response DTOs ---

#[derive(Deserialize, Debug)]
pub struct VoucherRequestPayload {
  pub coupon: String,
  /// Order amount in major units.
  pub amount: Decimal,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VoucherAppliedResponse {
  pub success: bool,
  #[serde(with = "rust_decimal::serde::float")]
  pub discount_amount: Decimal,
  /// `null` when the voucher belongs to no campaign.
  pub coupon_name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct RevertVoucherPayload {
  pub coupon: String,
}

#[derive(Serialize, Debug)]
pub struct RevertVoucherResponse {
  pub success: bool,
  pub message: &'static str,
}

// --- Handlers ---

#[instrument(
  name = "handler::apply_voucher",
  skip(app_state, req_payload),
  fields(coupon = %req_payload.coupon, amount = %req_payload.amount)
)]
pub async fn apply_voucher_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<VoucherRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let VoucherRequestPayload { coupon, amount } = req_payload.into_inner();
  let context_data = ContextData::new(VoucherCtxData::new(
    app_state.promotions.clone(),
    app_state.tracker.clone(),
    coupon,
    amount,
  ));

  match app_state.registry.run(context_data.clone()).await {
    Ok(_) => {}
    Err(err @ BrokerError::Validation(_)) => return Err(err).or_coupon_error("Validation failed"),
    Err(err) => return Err(err).or_coupon_error("Redemption failed"),
  }

  let applied = context_data.read().applied();
  let applied = applied
    .ok_or_else(|| BrokerError::from(EngineError::Internal("voucher flow finished without a redemption".to_string())))
    .or_coupon_error("Redemption failed")?;
  info!(redemption_id = %applied.redemption_id, discount = %applied.discount_amount, "Voucher applied");

  Ok(HttpResponse::Ok().json(VoucherAppliedResponse {
    success: true,
    discount_amount: applied.discount_amount,
    coupon_name: applied.coupon_name,
  }))
}

#[instrument(name = "handler::revert_voucher", skip(app_state, req_payload), fields(coupon = %req_payload.coupon))]
pub async fn revert_voucher_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RevertVoucherPayload>,
) -> Result<HttpResponse, AppError> {
  let context_data = ContextData::new(RollbackCtxData::new(
    app_state.promotions.clone(),
    app_state.tracker.clone(),
    app_state.config.rollback_policy,
    req_payload.into_inner().coupon,
  ));

  app_state
    .registry
    .run(context_data.clone())
    .await
    .or_coupon_error("Rollback failed")?;
  info!(forgotten = context_data.read().forgotten, "Voucher rolled back");

  Ok(HttpResponse::Ok().json(RevertVoucherResponse {
    success: true,
    message: "Rollback successful",
  }))
}
