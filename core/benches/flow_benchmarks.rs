use coupon_checkout::flows::checkout::cart_session_request;
use coupon_checkout::{
  register_all_pipelines, BrokerError, CartCheckoutCtxData, CartItem, CheckoutRequest, ContextData,
  InMemoryRedemptionStore, MockPaymentGateway, MockPromotionEngine, PipelineRegistry, RollbackCtxData,
  RollbackPolicy, VoucherCtxData,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn cart(items: usize, discount: Option<Decimal>) -> CheckoutRequest {
  CheckoutRequest {
    items: (0..items)
      .map(|i| CartItem {
        name: format!("item_{}", i),
        image: format!("https://shop.example/{}.png", i),
        price: dec!(19.99),
        quantity: 2,
      })
      .collect(),
    total: None,
    coupon_name: discount.map(|_| "SAVE10".to_string()),
    discount_amount: discount,
  }
}

fn registry() -> Arc<PipelineRegistry<BrokerError>> {
  let registry = PipelineRegistry::new();
  register_all_pipelines(&registry);
  Arc::new(registry)
}

fn bench_session_request_building(c: &mut Criterion) {
  let mut group = c.benchmark_group("CartSessionRequest");
  for items in [1usize, 10, 50].iter() {
    let request = cart(*items, Some(dec!(5)));
    group.throughput(Throughput::Elements(*items as u64));
    group.bench_with_input(BenchmarkId::new("build_and_encode", items), &request, |b, request| {
      b.iter(|| {
        let session = cart_session_request(request, Vec::new(), "https://shop.example").unwrap();
        criterion::black_box(session.to_form());
      })
    });
  }
  group.finish();
}

fn bench_cart_checkout_flow(c: &mut Criterion) {
  let mut group = c.benchmark_group("CartCheckoutFlow");
  let rt = Runtime::new().unwrap();
  let registry = registry();
  let gateway = Arc::new(MockPaymentGateway::new());

  for (label, discount) in [("no_discount", None), ("with_discount", Some(dec!(5)))] {
    group.bench_function(label, |b| {
      b.to_async(&rt).iter_batched(
        || ContextData::new(CartCheckoutCtxData::new(gateway.clone(), "https://shop.example", cart(3, discount))),
        |ctx| {
          let registry = registry.clone();
          async move { registry.run(ctx).await.unwrap() }
        },
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

fn bench_redeem_then_rollback(c: &mut Criterion) {
  let mut group = c.benchmark_group("VoucherLifecycle");
  let rt = Runtime::new().unwrap();
  let registry = registry();
  let promotions = Arc::new(MockPromotionEngine::new().with_voucher("SAVE10", dec!(10), None));
  let tracker = Arc::new(InMemoryRedemptionStore::new());

  group.bench_function("redeem_and_rollback", |b| {
    b.to_async(&rt).iter(|| {
      let registry = registry.clone();
      let promotions = promotions.clone();
      let tracker = tracker.clone();
      async move {
        let redeem = ContextData::new(VoucherCtxData::new(promotions.clone(), tracker.clone(), "SAVE10", dec!(500)));
        registry.run(redeem).await.unwrap();
        let rollback = ContextData::new(RollbackCtxData::new(promotions, tracker, RollbackPolicy::RequireRecordedId, "SAVE10"));
        registry.run(rollback).await.unwrap();
      }
    });
  });
  group.finish();
}

fn bench_context_data_access(c: &mut Criterion) {
  let mut group = c.benchmark_group("ContextDataAccess");
  let ctx = ContextData::new(cart(10, None));

  group.bench_function("with_clone_out", |b| {
    b.iter(|| criterion::black_box(ctx.with(|request| request.items.len())))
  });
  group.bench_function("write_lock_and_modify", |b| {
    b.iter(|| {
      let mut guard = ctx.write();
      guard.discount_amount = Some(dec!(1));
      criterion::black_box(guard.discount_amount);
    })
  });
  group.finish();
}

criterion_group!(
  benches,
  bench_session_request_building,
  bench_cart_checkout_flow,
  bench_redeem_then_rollback,
  bench_context_data_access
);
criterion_main!(benches);
