// server/src/state.rs
use crate::config::AppConfig;
use coupon_checkout::{
  register_all_pipelines, BrokerError, InMemoryRedemptionStore, MockPaymentGateway, MockPromotionEngine,
  PaymentGateway, PipelineRegistry, PromotionEngine, RedemptionStore, StripeGateway, VoucherifyEngine,
};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Vouchers available when running on the in-memory providers.
const DEV_VOUCHERS: &[(&str, i64, &str)] = &[("SAVE10", 10, "Ten Percent Off"), ("SAVE25", 25, "Quarter Off")];

#[derive(Clone)]
pub struct AppState {
  pub registry: Arc<PipelineRegistry<BrokerError>>,
  pub gateway: Arc<dyn PaymentGateway>,
  pub promotions: Arc<dyn PromotionEngine>,
  pub tracker: Arc<dyn RedemptionStore>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires providers, tracker and pipelines for the given configuration.
  pub fn from_config(config: AppConfig) -> Self {
    let (gateway, promotions) = match &config.credentials {
      Some(credentials) if !config.use_mock_providers => {
        let gateway: Arc<dyn PaymentGateway> = Arc::new(StripeGateway::new(
          credentials.stripe_secret_key.clone(),
          config.stripe_api_url.clone(),
        ));
        let promotions: Arc<dyn PromotionEngine> = Arc::new(VoucherifyEngine::new(
          credentials.voucherify_application_id.clone(),
          credentials.voucherify_secret_key.clone(),
          config.voucherify_api_url.clone(),
        ));
        (gateway, promotions)
      }
      _ => {
        tracing::warn!("Using in-memory payment and promotion providers.");
        let gateway: Arc<dyn PaymentGateway> = Arc::new(MockPaymentGateway::new());
        let promotions: Arc<dyn PromotionEngine> = Arc::new(
          DEV_VOUCHERS.iter().fold(MockPromotionEngine::new(), |engine, (code, percent, campaign)| {
            engine.with_voucher(code, Decimal::from(*percent), Some(*campaign))
          }),
        );
        (gateway, promotions)
      }
    };

    Self::new(config, gateway, promotions, Arc::new(InMemoryRedemptionStore::new()))
  }

  pub fn new(
    config: AppConfig,
    gateway: Arc<dyn PaymentGateway>,
    promotions: Arc<dyn PromotionEngine>,
    tracker: Arc<dyn RedemptionStore>,
  ) -> Self {
    let registry = PipelineRegistry::new();
    register_all_pipelines(&registry);
    Self {
      registry: Arc::new(registry),
      gateway,
      promotions,
      tracker,
      config: Arc::new(config),
    }
  }
}
