//! Carta
//!
//! Carta is the promotion engine behind a restaurant storefront: it authors combo and
//! buy-N-pay-M promotions into one canonical shape, derives their lifecycle state, prices
//! their bundles and picks the best offer for each menu item.

pub mod board;
pub mod catalog;
pub mod discounts;
pub mod fixtures;
pub mod ids;
pub mod items;
pub mod offers;
pub mod prelude;
pub mod pricing;
pub mod promotions;
