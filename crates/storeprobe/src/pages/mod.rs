//! One page object per storefront screen.

mod cart;
mod game;
mod home;
mod login;
mod orders;
mod payment;

pub use cart::CartPage;
pub use game::GamePage;
pub use home::HomePage;
pub use login::LoginPage;
pub use orders::OrdersPage;
pub use payment::{
    format_card_number, format_cvv, format_expiry, PaymentDetails, PaymentPage, MAX_CARD_DIGITS,
    MAX_CVV_DIGITS,
};

/// Selector shared by every screen's heading
pub(crate) const PAGE_TITLE_CLASS: &str = "page-title";
