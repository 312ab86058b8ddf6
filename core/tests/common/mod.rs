// tests/common/mod.rs
#![allow(dead_code)]

use coupon_checkout::{
  register_all_pipelines, BrokerError, ContextData, EngineError, InMemoryRedemptionStore, MockPaymentGateway,
  MockPromotionEngine, PipelineControl, PipelineRegistry,
};
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::Level;

// --- Engine test context ---

/// Records which steps ran, so ordering and short-circuiting can be asserted.
#[derive(Clone, Debug, Default)]
pub struct StepLog {
  pub visited: Vec<String>,
  pub notes: String,
  pub stop_at: Option<String>,
  pub skip_optional: bool,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("engine: {0}")]
  Engine(String),

  #[error("step failed: {0}")]
  Step(String),
}

impl From<EngineError> for TestError {
  fn from(err: EngineError) -> Self {
    TestError::Engine(format!("{:?}", err))
  }
}

pub fn logging_handler(step_name: &'static str, note: &'static str) -> coupon_checkout::Handler<StepLog, TestError> {
  Box::new(move |ctx: ContextData<StepLog>| {
    Box::pin(async move {
      let mut log = ctx.write();
      log.visited.push(step_name.to_string());
      log.notes.push_str(note);
      tracing::debug!(target: "test_handlers", step = step_name, notes = %log.notes, "step ran");
      if log.stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn failing_handler(step_name: &'static str, message: &'static str) -> coupon_checkout::Handler<StepLog, TestError> {
  Box::new(move |ctx: ContextData<StepLog>| {
    Box::pin(async move {
      ctx.write().visited.push(step_name.to_string());
      tracing::warn!(target: "test_handlers", step = step_name, "failing with '{}'", message);
      Err(TestError::Step(message.to_string()))
    })
  })
}

// --- Broker fixture ---

pub const SAVE10: &str = "SAVE10";
pub const SAVE10_CAMPAIGN: &str = "Ten Percent Off";
pub const BASE_URL: &str = "http://shop.test";

/// Mock providers, an empty tracker and a registry with every flow registered.
pub struct Broker {
  pub gateway: Arc<MockPaymentGateway>,
  pub promotions: Arc<MockPromotionEngine>,
  pub tracker: Arc<InMemoryRedemptionStore>,
  pub registry: PipelineRegistry<BrokerError>,
}

impl Broker {
  pub fn new() -> Self {
    let registry = PipelineRegistry::new();
    register_all_pipelines(&registry);
    Self {
      gateway: Arc::new(MockPaymentGateway::new()),
      promotions: Arc::new(MockPromotionEngine::new().with_voucher(SAVE10, dec!(10), Some(SAVE10_CAMPAIGN))),
      tracker: Arc::new(InMemoryRedemptionStore::new()),
      registry,
    }
  }
}

// --- Tracing ---

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
