// core/src/flows/voucher.rs

//! Coupon redemption (validate → redeem → track) and its rollback
//! (lookup → rollback → forget).

use crate::core::{ContextData, PipelineControl};
use crate::error::{BrokerError, EngineError};
use crate::flows::contexts::{RollbackCtxData, VoucherCtxData};
use crate::pipeline::Pipeline;
use crate::tracker::RollbackPolicy;
use tracing::{info, warn};

/// Reason sent to the promotions engine with every rollback.
pub const ROLLBACK_REASON: &str = "Payment was not completed";

pub fn redeem_voucher_pipeline() -> Pipeline<VoucherCtxData, BrokerError> {
  let mut p = Pipeline::<VoucherCtxData, BrokerError>::new(&[
    ("validate_coupon", false, None),
    ("redeem_coupon", false, None),
    ("track_redemption", false, None),
  ]);

  // Step 1: the engine must accept the code for this amount before anything is consumed.
  p.on_root("validate_coupon", |ctx_data: ContextData<VoucherCtxData>| {
    Box::pin(async move {
      let (promotions, coupon, amount) = ctx_data.with(|d| (d.promotions.clone(), d.coupon.clone(), d.amount));
      info!(%coupon, %amount, "Validating coupon");

      let validation = promotions.validate(&coupon, amount).await?;
      ctx_data.write().validation = Some(validation);
      Ok::<_, BrokerError>(PipelineControl::Continue)
    })
  });

  // Step 2: consume the voucher.
  p.on_root("redeem_coupon", |ctx_data: ContextData<VoucherCtxData>| {
    Box::pin(async move {
      let (promotions, coupon, amount) = ctx_data.with(|d| (d.promotions.clone(), d.coupon.clone(), d.amount));

      let redemption = promotions.redeem(&coupon, amount).await?;
      info!(%coupon, redemption_id = %redemption.id, discount_minor = redemption.total_discount_amount, "Coupon redeemed");
      ctx_data.write().redemption = Some(redemption);
      Ok::<_, BrokerError>(PipelineControl::Continue)
    })
  });

  // Step 3: remember the redemption id so an abandoned checkout can be rolled back.
  p.on_root("track_redemption", |ctx_data: ContextData<VoucherCtxData>| {
    Box::pin(async move {
      let (tracker, coupon, redemption_id) = ctx_data.with(|d| {
        (
          d.tracker.clone(),
          d.coupon.clone(),
          d.redemption.as_ref().map(|r| r.id.clone()),
        )
      });
      let redemption_id = redemption_id
        .ok_or_else(|| EngineError::Internal("track_redemption ran without a redemption".to_string()))?;

      let replaced = tracker.record(&coupon, &redemption_id).await?;
      ctx_data.write().replaced_redemption_id = replaced;
      Ok::<_, BrokerError>(PipelineControl::Continue)
    })
  });

  p
}

pub fn rollback_voucher_pipeline() -> Pipeline<RollbackCtxData, BrokerError> {
  let mut p = Pipeline::<RollbackCtxData, BrokerError>::new(&[
    ("lookup_redemption", false, None),
    ("rollback_redemption", false, None),
    ("forget_redemption", false, None),
  ]);

  p.on_root("lookup_redemption", |ctx_data: ContextData<RollbackCtxData>| {
    Box::pin(async move {
      let (tracker, coupon, policy) = ctx_data.with(|d| (d.tracker.clone(), d.coupon.clone(), d.policy));

      let redemption_id = tracker.lookup(&coupon).await?;
      if redemption_id.is_none() {
        match policy {
          RollbackPolicy::RequireRecordedId => {
            return Err(BrokerError::NotFound(format!(
              "No redemption recorded for coupon '{}'",
              coupon
            )));
          }
          RollbackPolicy::AttemptWithoutId => {
            warn!(%coupon, "No redemption recorded for coupon, attempting rollback without an id");
          }
        }
      }
      ctx_data.write().redemption_id = redemption_id;
      Ok::<_, BrokerError>(PipelineControl::Continue)
    })
  });

  p.on_root("rollback_redemption", |ctx_data: ContextData<RollbackCtxData>| {
    Box::pin(async move {
      let (promotions, coupon, redemption_id) =
        ctx_data.with(|d| (d.promotions.clone(), d.coupon.clone(), d.redemption_id.clone()));

      let receipt = promotions.rollback(redemption_id.as_deref(), ROLLBACK_REASON).await?;
      info!(%coupon, redemption_id = ?redemption_id, "Redemption rolled back");
      ctx_data.write().receipt = Some(receipt);
      Ok::<_, BrokerError>(PipelineControl::Continue)
    })
  });

  p.on_root("forget_redemption", |ctx_data: ContextData<RollbackCtxData>| {
    Box::pin(async move {
      let (tracker, coupon, redemption_id) =
        ctx_data.with(|d| (d.tracker.clone(), d.coupon.clone(), d.redemption_id.clone()));

      let forgotten = tracker.forget(&coupon, redemption_id.as_deref()).await?;
      ctx_data.write().forgotten = forgotten;
      Ok::<_, BrokerError>(PipelineControl::Continue)
    })
  });

  p
}
