// core/src/model/mod.rs

//! Request and provider data shapes shared by the flows and the HTTP layer.

pub mod cart;
pub mod money;
pub mod session;
pub mod voucher;

pub use cart::{CartItem, CheckoutRequest};
pub use money::{from_minor_units, to_minor_units, CURRENCY};
pub use session::{CreatedSession, DiscountRef, LineItem, NewCheckoutSession, PaymentSession, PaymentStatus};
pub use voucher::{Redemption, RollbackReceipt, Validation};
