// core/src/model/session.rs

//! Checkout sessions as this service creates and observes them.

use crate::error::{BrokerError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One priced line of a new checkout session, already in minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
  pub name: String,
  pub images: Vec<String>,
  pub unit_amount: i64,
  pub quantity: u32,
  pub tax_rates: Vec<String>,
}

/// A discount previously created at the gateway, referenced by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountRef(pub String);

/// Everything the gateway needs to open a payment-mode checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCheckoutSession {
  pub line_items: Vec<LineItem>,
  pub currency: String,
  pub discounts: Vec<DiscountRef>,
  pub allowed_countries: Vec<String>,
  /// May contain the gateway's `{CHECKOUT_SESSION_ID}` placeholder.
  pub success_url: String,
  pub cancel_url: String,
  pub metadata: BTreeMap<String, String>,
}

impl NewCheckoutSession {
  /// Flattens the session into the bracketed form fields the payment API expects.
  pub fn to_form(&self) -> Vec<(String, String)> {
    let mut form = vec![
      ("mode".to_string(), "payment".to_string()),
      ("success_url".to_string(), self.success_url.clone()),
      ("cancel_url".to_string(), self.cancel_url.clone()),
    ];

    for (i, item) in self.line_items.iter().enumerate() {
      let prefix = format!("line_items[{}]", i);
      form.push((format!("{}[price_data][currency]", prefix), self.currency.clone()));
      form.push((format!("{}[price_data][product_data][name]", prefix), item.name.clone()));
      for (j, image) in item.images.iter().enumerate() {
        form.push((format!("{}[price_data][product_data][images][{}]", prefix, j), image.clone()));
      }
      form.push((format!("{}[price_data][unit_amount]", prefix), item.unit_amount.to_string()));
      form.push((format!("{}[quantity]", prefix), item.quantity.to_string()));
      for (j, rate) in item.tax_rates.iter().enumerate() {
        form.push((format!("{}[tax_rates][{}]", prefix, j), rate.clone()));
      }
    }

    for (i, country) in self.allowed_countries.iter().enumerate() {
      form.push((
        format!("shipping_address_collection[allowed_countries][{}]", i),
        country.clone(),
      ));
    }

    for (i, discount) in self.discounts.iter().enumerate() {
      form.push((format!("discounts[{}][coupon]", i), discount.0.clone()));
    }

    for (key, value) in &self.metadata {
      form.push((format!("metadata[{}]", key), value.clone()));
    }

    form
  }
}

/// What the gateway returns after creating a session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedSession {
  pub id: String,
  pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
  Paid,
  Unpaid,
  NoPaymentRequired,
  Other(String),
}

impl PaymentStatus {
  pub fn parse(raw: &str) -> Self {
    match raw {
      "paid" => PaymentStatus::Paid,
      "unpaid" => PaymentStatus::Unpaid,
      "no_payment_required" => PaymentStatus::NoPaymentRequired,
      other => PaymentStatus::Other(other.to_string()),
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      PaymentStatus::Paid => "paid",
      PaymentStatus::Unpaid => "unpaid",
      PaymentStatus::NoPaymentRequired => "no_payment_required",
      PaymentStatus::Other(s) => s,
    }
  }
}

/// A session retrieved from the gateway. The provider's JSON is kept verbatim
/// for endpoints that pass it through.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSession {
  pub id: String,
  pub url: Option<String>,
  pub payment_status: PaymentStatus,
  pub raw: Value,
}

#[derive(Deserialize)]
struct SessionFields {
  id: String,
  #[serde(default)]
  url: Option<String>,
  payment_status: String,
}

impl PaymentSession {
  pub fn from_value(raw: Value) -> Result<Self> {
    let fields: SessionFields = serde_json::from_value(raw.clone())
      .map_err(|e| BrokerError::ExternalService(format!("Unexpected session payload: {}", e)))?;
    Ok(Self {
      id: fields.id,
      url: fields.url,
      payment_status: PaymentStatus::parse(&fields.payment_status),
      raw,
    })
  }

  pub fn is_paid(&self) -> bool {
    self.payment_status == PaymentStatus::Paid
  }
}
