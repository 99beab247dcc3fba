//! Page objects driven directly against the simulated storefront.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use storeprobe::mock::{Fault, MockSession, Storefront, StorefrontTiming};
use storeprobe::prelude::*;

fn session() -> MockSession<Storefront> {
    MockSession::new(Storefront::new().with_timing(StorefrontTiming::fast()))
}

fn config() -> ProbeConfig {
    ProbeConfig::default()
        .with_base_url("http://shop.test")
        .with_timeouts(Timeouts::default().compressed(2_000))
}

fn id(raw: &str) -> SafeId {
    SafeId::parse(raw).unwrap()
}

async fn signed_in(session: &MockSession<Storefront>, config: &ProbeConfig, user: &str) {
    let seeder = StateSeeder::new(session, StorageKeys::new(config.storage_prefix.clone()));
    HomePage::new(session, config).open().await.unwrap();
    seeder.log_in(&id(user)).await.unwrap();
    seeder.clear_cart(&id(user)).await.unwrap();
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_add_then_adjust_quantities() {
    let (s, config) = (session(), config());
    signed_in(&s, &config, "flow-user").await;

    let game = GamePage::new(&s, &config);
    game.open_game(&id("neon-drift")).await.unwrap();
    game.add_to_cart().await.unwrap();

    let cart = CartPage::new(&s, &config);
    cart.open().await.unwrap();
    assert_eq!(cart.item_count().await.unwrap(), 1);
    cart.increase(&id("neon-drift")).await.unwrap();
    assert_eq!(cart.quantity_of(&id("neon-drift")).await.unwrap(), 2);
    cart.decrease(&id("neon-drift")).await.unwrap();
    cart.decrease(&id("neon-drift")).await.unwrap();
    assert_eq!(cart.quantity_of(&id("neon-drift")).await.unwrap(), 1);

    cart.remove(&id("neon-drift")).await.unwrap();
    assert!(cart.is_empty_cart_message_displayed().await.unwrap());
    assert!(!cart.is_footer_displayed().await.unwrap());
}

#[tokio::test]
async fn test_stale_click_is_retried() {
    let (s, config) = (session(), config());
    signed_in(&s, &config, "flow-user").await;

    let game = GamePage::new(&s, &config);
    game.open_game(&id("iron-legion")).await.unwrap();
    s.fail_next_clicks(Fault::Stale, 1).unwrap();
    game.add_to_cart().await.unwrap();

    let seeder = StateSeeder::new(&s, StorageKeys::new(config.storage_prefix.clone()));
    assert_eq!(seeder.stored_cart_quantity(&id("flow-user")).await.unwrap(), 1);
}

#[tokio::test]
async fn test_covered_button_exhausts_attempts() {
    let (s, config) = (session(), config().with_max_attempts(2));
    signed_in(&s, &config, "flow-user").await;

    let game = GamePage::new(&s, &config);
    game.open_game(&id("iron-legion")).await.unwrap();
    s.fail_next_clicks(Fault::NotInteractable, 5).unwrap();
    let err = game.add_to_cart().await.unwrap_err();
    match err {
        ProbeError::RetriesExhausted { attempts, .. } => assert_eq!(attempts, 2),
        other => panic!("expected exhausted retries, got {other}"),
    }

    let seeder = StateSeeder::new(&s, StorageKeys::new(config.storage_prefix.clone()));
    assert_eq!(seeder.stored_cart_quantity(&id("flow-user")).await.unwrap(), 0);
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_purchase_lands_on_orders_with_banner() {
    let (s, config) = (session(), config());
    signed_in(&s, &config, "buyer").await;

    let game = GamePage::new(&s, &config);
    game.open_game(&id("neon-drift")).await.unwrap();
    game.add_to_cart().await.unwrap();
    CartPage::new(&s, &config).open().await.unwrap();

    let payment = PaymentPage::new(&s, &config);
    payment.go_from_cart().await.unwrap();
    assert_eq!(payment.summary_item_count().await.unwrap(), 1);
    payment.fill_valid_details().await.unwrap();
    assert_eq!(payment.card_number_value().await.unwrap(), "4111 1111 1111 1111");
    payment.pay_now().await.unwrap();
    payment.wait_for_orders_redirect().await.unwrap();

    let orders = OrdersPage::new(&s, &config);
    orders.wait_until_loaded().await.unwrap();
    assert!(orders.is_success_box_displayed().await.unwrap());
    assert!(orders.first_order_id_text().await.unwrap().starts_with("GS-"));
    assert_eq!(orders.rendered_order_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_missing_country_is_reported() {
    let (s, config) = (session(), config());
    signed_in(&s, &config, "buyer").await;

    let game = GamePage::new(&s, &config);
    game.open_game(&id("neon-drift")).await.unwrap();
    game.add_to_cart().await.unwrap();
    CartPage::new(&s, &config).open().await.unwrap();

    let payment = PaymentPage::new(&s, &config);
    payment.go_from_cart().await.unwrap();
    payment
        .fill_without_country(&PaymentDetails::default())
        .await
        .unwrap();
    payment.pay_now().await.unwrap();
    let message = payment.wait_for_pay_message().await.unwrap();
    assert_eq!(message, "Please select your country.");
}

#[tokio::test]
async fn test_line_item_count_covers_newest_order_only() {
    let (s, config) = (session(), config());
    signed_in(&s, &config, "buyer").await;

    let line = |game_id: &str, title: &str| OrderLine {
        game_id: game_id.to_string(),
        title: title.to_string(),
        price: 19.99,
        qty: 1,
    };
    let order = |order_id: &str, items: Vec<OrderLine>| Order {
        order_id: order_id.to_string(),
        created_at: "2026-01-02T10:00:00.000Z".to_string(),
        total: 19.99 * items.len() as f64,
        items,
        payment: None,
    };
    let seeder = StateSeeder::new(&s, StorageKeys::new(config.storage_prefix.clone()));
    seeder
        .replace_orders(
            &id("buyer"),
            &[
                order("GS-20260102-NEWEST", vec![line("neon-drift", "Neon Drift")]),
                order(
                    "GS-20260101-OLDEST",
                    vec![
                        line("iron-legion", "Iron Legion"),
                        line("neon-drift", "Neon Drift"),
                    ],
                ),
            ],
        )
        .await
        .unwrap();

    let orders = OrdersPage::new(&s, &config);
    orders.open().await.unwrap();
    orders.wait_for_rendered_orders(2).await.unwrap();
    assert_eq!(orders.first_order_id_text().await.unwrap(), "GS-20260102-NEWEST");
    assert_eq!(orders.first_order_line_item_count().await.unwrap(), 1);
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_page_reports_bad_credentials() {
    let (s, config) = (session(), config());
    let login = LoginPage::new(&s, &config);
    login.open().await.unwrap();
    assert_eq!(login.password_field_type().await.unwrap().as_deref(), Some("password"));
    login.enter_email("abc").await.unwrap();
    login.enter_password("password123").await.unwrap();
    login.submit().await.unwrap();
    login.wait_for_error_message().await.unwrap();
    assert_eq!(
        login.error_message_text().await.unwrap().trim(),
        "Please enter a valid email and password."
    );
}
