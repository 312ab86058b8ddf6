// core/src/model/cart.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of the storefront cart, priced in major units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
  pub name: String,
  /// Absolute image URL shown on the hosted checkout page.
  pub image: String,
  pub price: Decimal,
  pub quantity: u32,
}

/// Body of `POST /cart-payment`.
///
/// `discount_amount` is the already-redeemed coupon discount; it is trusted as
/// supplied and never re-validated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
  pub items: Vec<CartItem>,
  #[serde(default)]
  pub total: Option<Decimal>,
  #[serde(default)]
  pub coupon_name: Option<String>,
  #[serde(default)]
  pub discount_amount: Option<Decimal>,
}

impl CheckoutRequest {
  /// The discount to create at the gateway, if any. Zero and negative amounts mean none.
  pub fn positive_discount(&self) -> Option<Decimal> {
    self.discount_amount.filter(|amount| *amount > Decimal::ZERO)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn parses_storefront_payload() {
    let req: CheckoutRequest = serde_json::from_str(
      r#"{"items":[{"name":"Shirt","image":"http://x/img.png","price":20,"quantity":2}],
          "total":40,"couponName":"SAVE10","discountAmount":5}"#,
    )
    .unwrap();

    assert_eq!(req.items.len(), 1);
    assert_eq!(req.items[0].price, dec!(20));
    assert_eq!(req.coupon_name.as_deref(), Some("SAVE10"));
    assert_eq!(req.positive_discount(), Some(dec!(5)));
  }

  #[test]
  fn zero_or_missing_discount_is_none() {
    let mut req: CheckoutRequest = serde_json::from_str(r#"{"items":[]}"#).unwrap();
    assert_eq!(req.positive_discount(), None);
    req.discount_amount = Some(Decimal::ZERO);
    assert_eq!(req.positive_discount(), None);
    req.discount_amount = Some(dec!(-3));
    assert_eq!(req.positive_discount(), None);
  }
}
