// src/lib.rs

//! Coupon-aware checkout broker.
//!
//! Sits between a storefront and two external providers:
//!  - a payment gateway that hosts checkout sessions (`PaymentGateway`),
//!  - a promotions engine that validates, redeems and rolls back vouchers (`PromotionEngine`).
//!
//! Multi-call use cases run as pipelines of named async steps over a shared
//! context, so a failed validation never reaches redemption and an absent
//! discount skips discount creation. Redemption ids are kept in an injected
//! `RedemptionStore` until a rollback consumes them.

pub mod core;
pub mod error;
pub mod flows;
pub mod model;
pub mod pipeline;
pub mod providers;
pub mod registry;
pub mod tracker;

// --- Re-exports for the Public API ---

pub use crate::core::{ContextData, Handler, PipelineControl, PipelineResult, SkipCondition, StepDef};
pub use crate::pipeline::Pipeline;
pub use crate::registry::PipelineRegistry;

pub use crate::error::{BrokerError, EngineError, EngineResult, Result};

pub use crate::model::{CartItem, CheckoutRequest, CreatedSession, PaymentSession, PaymentStatus};
pub use crate::providers::{
  MockPaymentGateway, MockPromotionEngine, PaymentGateway, PromotionEngine, StripeGateway, VoucherifyEngine,
};
pub use crate::tracker::{InMemoryRedemptionStore, RedemptionStore, RollbackPolicy};

pub use crate::flows::{register_all_pipelines, AppliedVoucher, CartCheckoutCtxData, RollbackCtxData, VoucherCtxData};
