// core/src/flows/mod.rs

//! The broker's use cases, each expressed as a pipeline over its own context
//! type, plus the single-call session lookups.

use crate::error::BrokerError;
use crate::registry::PipelineRegistry;

pub mod checkout;
pub mod contexts;
pub mod session;
pub mod voucher;

pub use contexts::{AppliedVoucher, CartCheckoutCtxData, RollbackCtxData, VoucherCtxData};

/// Registers every flow pipeline. Called once at startup.
pub fn register_all_pipelines(registry: &PipelineRegistry<BrokerError>) {
  tracing::info!("Registering checkout broker pipelines...");
  registry.register_pipeline(voucher::redeem_voucher_pipeline());
  registry.register_pipeline(voucher::rollback_voucher_pipeline());
  registry.register_pipeline(checkout::cart_checkout_pipeline());
  tracing::info!("All checkout broker pipelines registered.");
}
