// server/src/web/handlers/mod.rs

pub mod cart_handlers;
pub mod session_handlers;
pub mod voucher_handlers;
