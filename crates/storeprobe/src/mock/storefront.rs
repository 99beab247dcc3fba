//! Simulated game store.
//!
//! A [`MockApp`] reproducing the storefront the harness targets: the same
//! pages, element ids, storage keys, validation messages and asynchronous
//! behavior (debounced search, delayed payment processing, delayed redirects,
//! toasts that expire). Scenario and page-object tests run against it through
//! a [`MockSession`](super::MockSession).

use chrono::{Local, Utc};
use std::time::Duration;
use tracing::debug;

use super::catalog::{seed_catalog, Game};
use super::checkout::{
    card_number_valid, cvv_valid, expiry_valid, format_card_number, format_cvv,
    format_date_time, format_expiry, format_usd, is_email, iso_timestamp, order_id, sha256_hex,
    uid, MAX_QTY,
};
use super::{DomEvent, EventKind, MockApp, MockDom, NodeId, PageContext};
use crate::storage::{
    CartLine, Collection, LastSuccess, Order, OrderLine, PaymentSummary, SessionIdentity,
    StorageKeys,
};
use serde::{Deserialize, Serialize};

/// Countries offered by the payment form
pub const COUNTRIES: [&str; 6] = [
    "India",
    "United States",
    "United Kingdom",
    "Germany",
    "Canada",
    "Australia",
];

/// Storefront delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorefrontTiming {
    /// Search input debounce
    pub search_debounce: Duration,
    /// Simulated card processing
    pub payment_processing: Duration,
    /// From payment success to the orders page
    pub success_redirect: Duration,
    /// From login/signup success to the home page
    pub auth_redirect: Duration,
    /// From logout to the login page
    pub logout_redirect: Duration,
    /// Toast lifetime
    pub toast_lifetime: Duration,
}

impl Default for StorefrontTiming {
    fn default() -> Self {
        Self {
            search_debounce: Duration::from_millis(60),
            payment_processing: Duration::from_millis(850),
            success_redirect: Duration::from_millis(500),
            auth_redirect: Duration::from_millis(450),
            logout_redirect: Duration::from_millis(350),
            toast_lifetime: Duration::from_millis(2600),
        }
    }
}

impl StorefrontTiming {
    /// Short processing and redirect delays; the search debounce is kept
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            search_debounce: Duration::from_millis(60),
            payment_processing: Duration::from_millis(40),
            success_redirect: Duration::from_millis(20),
            auth_redirect: Duration::from_millis(20),
            logout_redirect: Duration::from_millis(20),
            toast_lifetime: Duration::from_millis(2600),
        }
    }
}

/// Deferred storefront work
#[derive(Debug, Clone, PartialEq)]
pub enum StoreTimer {
    /// Debounced catalog filter
    Search,
    /// Remove the toast with this sequence number
    ToastExpired(u64),
    /// Payment processing finished
    CompletePayment,
    /// `location.replace`
    Redirect(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserAccount {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    created_at: String,
}

#[derive(Debug, Clone)]
struct PricedLine {
    game_id: String,
    title: String,
    price: f64,
    qty: u32,
}

impl PricedLine {
    fn total(&self) -> f64 {
        self.price * f64::from(self.qty)
    }
}

#[derive(Debug, Clone)]
struct PendingPayment {
    user_id: String,
    lines: Vec<PricedLine>,
    total: f64,
    cardholder: String,
    card_digits: String,
    city: String,
    country: String,
}

#[derive(Debug, Clone, Default)]
enum Screen {
    #[default]
    Blank,
    Login,
    Home,
    Game {
        game: Game,
        user_id: Option<String>,
    },
    Cart {
        user_id: String,
    },
    Payment {
        user_id: String,
        lines: Vec<PricedLine>,
        total: f64,
        pending: Option<PendingPayment>,
    },
    Orders,
}

/// The simulated game store
#[derive(Debug, Clone)]
pub struct Storefront {
    timing: StorefrontTiming,
    keys: StorageKeys,
    screen: Screen,
    toasts: u64,
}

impl Default for Storefront {
    fn default() -> Self {
        Self::new()
    }
}

type Ctx<'a, 'b> = &'a mut PageContext<'b, StoreTimer>;

impl Storefront {
    /// Store with the real delays and the default key prefix
    #[must_use]
    pub fn new() -> Self {
        Self {
            timing: StorefrontTiming::default(),
            keys: StorageKeys::default(),
            screen: Screen::Blank,
            toasts: 0,
        }
    }

    /// Override delays
    #[must_use]
    pub const fn with_timing(mut self, timing: StorefrontTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Override the storage key prefix
    #[must_use]
    pub fn with_storage_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.keys = StorageKeys::new(prefix);
        self
    }

    /// Delays in effect
    #[must_use]
    pub const fn timing(&self) -> &StorefrontTiming {
        &self.timing
    }

    // ===== STORAGE =====

    fn session(&self, ctx: Ctx<'_, '_>) -> Option<SessionIdentity> {
        ctx.storage
            .get_json::<SessionIdentity>(&self.keys.session_key())
            .filter(|s| !s.user_id.is_empty())
    }

    fn games(&self, ctx: Ctx<'_, '_>) -> Vec<Game> {
        let key = self.keys.games_key();
        match ctx.storage.get_json::<Vec<Game>>(&key) {
            Some(games) if !games.is_empty() => games,
            _ => {
                let seeded = seed_catalog();
                ctx.storage.set_json(&key, &seeded);
                seeded
            }
        }
    }

    fn cart(&self, ctx: Ctx<'_, '_>, user_id: &str) -> Vec<CartLine> {
        ctx.storage
            .get_json(&self.keys.user_key_raw(Collection::Cart, user_id))
            .unwrap_or_default()
    }

    fn set_cart(&self, ctx: Ctx<'_, '_>, user_id: &str, cart: &[CartLine]) {
        ctx.storage
            .set_json(&self.keys.user_key_raw(Collection::Cart, user_id), &cart);
    }

    fn orders(&self, ctx: Ctx<'_, '_>, user_id: &str) -> Vec<Order> {
        ctx.storage
            .get_json(&self.keys.user_key_raw(Collection::Orders, user_id))
            .unwrap_or_default()
    }

    fn priced_lines(&self, ctx: Ctx<'_, '_>, user_id: &str) -> (Vec<PricedLine>, f64) {
        let games = self.games(ctx);
        let lines: Vec<PricedLine> = self
            .cart(ctx, user_id)
            .into_iter()
            .filter_map(|line| {
                let game = games.iter().find(|g| g.id == line.game_id)?;
                Some(PricedLine {
                    game_id: line.game_id,
                    title: game.title.clone(),
                    price: game.price,
                    qty: line.qty.clamp(1, MAX_QTY),
                })
            })
            .collect();
        let total = lines.iter().map(PricedLine::total).sum();
        (lines, total)
    }

    // ===== SHARED CHROME =====

    fn toast(&mut self, ctx: Ctx<'_, '_>, title: &str, body: &str) {
        let Some(host) = ctx.dom.by_id("toasts") else {
            return;
        };
        self.toasts += 1;
        let seq = self.toasts.to_string();
        let toast = ctx
            .dom
            .el(host, "div", &[("class", "toast good"), ("data-toast", seq.as_str())]);
        ctx.dom.el(toast, "div", &[("class", "dot")]);
        let inner = ctx.dom.el(toast, "div", &[]);
        ctx.dom.el_text(inner, "p", &[("class", "t-title")], title);
        ctx.dom.el_text(inner, "p", &[("class", "t-body")], body);
        ctx.schedule(self.timing.toast_lifetime, StoreTimer::ToastExpired(self.toasts));
    }

    fn navbar(&self, ctx: Ctx<'_, '_>) {
        let Some(host) = ctx.dom.by_id("nav") else {
            return;
        };
        let session = self.session(ctx);
        let count: u32 = session
            .as_ref()
            .map(|s| self.cart(ctx, &s.user_id).iter().map(|l| l.qty).sum())
            .unwrap_or(0);

        let dom = &mut *ctx.dom;
        dom.clear_children(host);
        let inner = dom.el(host, "div", &[("class", "nav-inner")]);
        let brand = dom.el(inner, "a", &[("class", "brand"), ("href", "./index.html")]);
        dom.el_text(brand, "span", &[], "Game Store");
        let links = dom.el(inner, "nav", &[("class", "nav-links")]);
        dom.el_text(
            links,
            "a",
            &[("class", "nav-link"), ("href", "./index.html"), ("data-nav", "home")],
            "Home",
        );
        let cart = dom.el_text(
            links,
            "a",
            &[("class", "nav-link"), ("href", "./cart.html"), ("data-nav", "cart")],
            "Cart ",
        );
        dom.el_text(
            cart,
            "span",
            &[("class", "badge"), ("id", "cart-badge")],
            &count.to_string(),
        );
        dom.el_text(
            links,
            "a",
            &[("class", "nav-link"), ("href", "./orders.html"), ("data-nav", "orders")],
            "Orders",
        );
        dom.el_text(
            links,
            "button",
            &[("class", "nav-link btn-ghost"), ("type", "button"), ("id", "logout")],
            "Logout",
        );
        let actions = dom.el(inner, "div", &[("class", "nav-actions")]);
        let user = dom.el(actions, "span", &[("class", "nav-user"), ("id", "nav-user")]);
        match session {
            Some(s) if !s.name.is_empty() => {
                dom.set_text(user, &format!("Signed in as {}", s.name));
                dom.set_display(user, "inline");
            }
            _ => dom.set_display(user, "none"),
        }
    }

    fn heading(dom: &mut MockDom, parent: NodeId, title: &str, subtitle: &str) {
        dom.el_text(parent, "h1", &[("class", "page-title")], title);
        dom.el_text(parent, "p", &[("class", "page-subtitle")], subtitle);
    }

    fn hidden(dom: &mut MockDom, parent: NodeId, tag: &str, id: &str, text: &str) -> NodeId {
        let node = dom.el_text(parent, tag, &[("id", id)], text);
        dom.set_display(node, "none");
        node
    }

    fn set_msg(dom: &mut MockDom, id: &str, text: &str) {
        if let Some(node) = dom.by_id(id) {
            dom.set_text(node, text);
            dom.set_display(node, if text.is_empty() { "none" } else { "block" });
        }
    }

    fn field(dom: &mut MockDom, form: NodeId, id: &str, label: &str, input_type: &str) {
        let wrap = dom.el(form, "label", &[("class", "field")]);
        dom.el_text(wrap, "span", &[], label);
        dom.el(wrap, "input", &[("id", id), ("type", input_type)]);
    }

    fn value_of(dom: &MockDom, id: &str) -> String {
        dom.by_id(id)
            .and_then(|n| dom.value(n))
            .unwrap_or_default()
            .to_string()
    }

    // ===== PAGES =====

    fn build_home(&self, ctx: Ctx<'_, '_>) {
        let root = ctx.dom.root();
        let main = ctx.dom.el(root, "main", &[("class", "container")]);
        Self::heading(
            ctx.dom,
            main,
            "Featured games",
            "Browse the catalog and find your next adventure.",
        );
        let row = ctx.dom.el(main, "div", &[("class", "search-row")]);
        ctx.dom.el(
            row,
            "input",
            &[("id", "search"), ("type", "search"), ("placeholder", "Search games")],
        );
        ctx.dom.el_text(
            row,
            "button",
            &[("id", "reset-search"), ("type", "button"), ("class", "btn")],
            "Reset",
        );
        ctx.dom.el(main, "div", &[("id", "games-grid"), ("class", "grid")]);
        Self::hidden(ctx.dom, main, "div", "empty", "No games match your search.");
        self.render_games(ctx, "");
    }

    fn render_games(&self, ctx: Ctx<'_, '_>, query: &str) {
        let games = self.games(ctx);
        let Some(grid) = ctx.dom.by_id("games-grid") else {
            return;
        };
        let q = query.trim().to_lowercase();
        let list: Vec<&Game> = games
            .iter()
            .filter(|g| q.is_empty() || g.title.to_lowercase().contains(&q))
            .collect();

        let dom = &mut *ctx.dom;
        dom.clear_children(grid);
        for game in &list {
            let card = dom.el(
                grid,
                "article",
                &[("class", "game-card"), ("aria-label", game.title.as_str())],
            );
            let body = dom.el(card, "div", &[("class", "body")]);
            let row = dom.el(body, "div", &[("class", "row")]);
            dom.el_text(row, "h2", &[("class", "title")], &game.title);
            dom.el_text(row, "div", &[("class", "price")], &format_usd(game.price));
            let meta = dom.el(body, "div", &[("class", "meta")]);
            dom.el_text(meta, "span", &[("class", "pill")], &game.genre);
            dom.el_text(
                meta,
                "span",
                &[("class", "pill")],
                &format!("Rating: {}", game.rating_label()),
            );
            let actions = dom.el(body, "div", &[("class", "card-actions")]);
            let href = format!("./game.html?id={}", game.id);
            dom.el_text(
                actions,
                "a",
                &[("class", "btn btn-primary"), ("href", href.as_str())],
                "View details",
            );
        }
        if let Some(empty) = dom.by_id("empty") {
            dom.set_display(empty, if list.is_empty() { "block" } else { "none" });
        }
    }

    fn build_game(&mut self, ctx: Ctx<'_, '_>) {
        let root = ctx.dom.root();
        let main = ctx.dom.el(root, "main", &[("class", "container")]);
        let wrap = ctx.dom.el(main, "div", &[("id", "game-wrap")]);
        let not_found = Self::hidden(ctx.dom, main, "div", "not-found", "Game not found.");

        let id = ctx.query_param("id").unwrap_or_default();
        let Some(game) = self.games(ctx).into_iter().find(|g| g.id == id) else {
            ctx.dom.set_display(not_found, "block");
            return;
        };
        ctx.set_title(format!("Game Store • {}", game.title));

        let price = format_usd(game.price);
        let dom = &mut *ctx.dom;
        let info = dom.el(wrap, "section", &[("class", "card card-pad")]);
        dom.el_text(info, "h1", &[], &game.title);
        let meta = dom.el(info, "div", &[("class", "meta")]);
        dom.el_text(meta, "span", &[("class", "pill")], &game.genre);
        dom.el_text(
            meta,
            "span",
            &[("class", "pill")],
            &format!("Rating: {}", game.rating_label()),
        );
        let pill = dom.el_text(meta, "span", &[("class", "pill")], "Price: ");
        dom.el_text(pill, "span", &[("class", "price")], &price);
        dom.el_text(info, "p", &[("class", "desc")], &game.description);
        let actions = dom.el(info, "div", &[]);
        dom.el_text(
            actions,
            "button",
            &[("class", "btn btn-primary"), ("id", "add-to-cart"), ("type", "button")],
            "Add to cart",
        );
        dom.el_text(
            actions,
            "a",
            &[("class", "btn btn-ghost"), ("href", "./index.html")],
            "Back to Home",
        );

        let user_id = self.session(ctx).map(|s| s.user_id);
        self.screen = Screen::Game { game, user_id };
    }

    fn add_to_cart(&mut self, ctx: Ctx<'_, '_>, game: &Game, user_id: &str) {
        let mut cart = self.cart(ctx, user_id);
        if let Some(line) = cart.iter_mut().find(|l| l.game_id == game.id) {
            line.qty = (line.qty.max(1) + 1).min(MAX_QTY);
        } else {
            cart.push(CartLine {
                game_id: game.id.clone(),
                qty: 1,
                added_at: Some(iso_timestamp(Utc::now())),
            });
        }
        self.set_cart(ctx, user_id, &cart);
        debug!(game = %game.id, user = user_id, "added to cart");
        self.navbar(ctx);
        self.toast(
            ctx,
            "Added to cart",
            &format!("{} is ready to checkout.", game.title),
        );
    }

    fn build_cart(&mut self, ctx: Ctx<'_, '_>) {
        let root = ctx.dom.root();
        let main = ctx.dom.el(root, "main", &[("class", "container")]);
        Self::heading(
            ctx.dom,
            main,
            "Your cart",
            "Review your items before checkout.",
        );
        ctx.dom.el(main, "div", &[("id", "cart-list")]);
        let empty = Self::hidden(ctx.dom, main, "div", "empty-cart", "Your cart is empty. ");
        ctx.dom
            .el_text(empty, "a", &[("href", "./index.html")], "Browse games");
        let footer = Self::hidden(ctx.dom, main, "div", "cart-footer", "");
        let total = ctx.dom.el_text(footer, "div", &[("class", "total")], "Total: ");
        ctx.dom.el(total, "span", &[("id", "grand-total")]);
        ctx.dom.el_text(
            footer,
            "button",
            &[("id", "checkout"), ("type", "button"), ("class", "btn btn-primary")],
            "Checkout",
        );
        Self::hidden(ctx.dom, main, "p", "cart-msg", "");

        if let Some(session) = self.session(ctx) {
            self.screen = Screen::Cart {
                user_id: session.user_id,
            };
            self.render_cart(ctx);
        }
    }

    fn render_cart(&self, ctx: Ctx<'_, '_>) {
        let Screen::Cart { user_id } = &self.screen else {
            return;
        };
        let (lines, total) = self.priced_lines(ctx, user_id);
        let dom = &mut *ctx.dom;
        let (Some(list), Some(footer), Some(empty)) = (
            dom.by_id("cart-list"),
            dom.by_id("cart-footer"),
            dom.by_id("empty-cart"),
        ) else {
            return;
        };
        dom.clear_children(list);

        if lines.is_empty() {
            dom.set_display(footer, "none");
            dom.set_display(empty, "block");
        } else {
            dom.set_display(empty, "none");
            dom.set_display(footer, "block");
            if let Some(total_el) = dom.by_id("grand-total") {
                dom.set_text(total_el, &format_usd(total));
            }
            for line in &lines {
                let row = dom.el(
                    list,
                    "div",
                    &[("class", "cart-item"), ("data-id", line.game_id.as_str())],
                );
                let text = dom.el(row, "div", &[]);
                dom.el_text(text, "h3", &[], &line.title);
                dom.el_text(
                    text,
                    "div",
                    &[("class", "muted")],
                    &format!(
                        "{} • Qty {} • Item total: {}",
                        format_usd(line.price),
                        line.qty,
                        format_usd(line.total())
                    ),
                );
                let qty = dom.el(row, "div", &[("class", "qty")]);
                dom.el_text(
                    qty,
                    "button",
                    &[("class", "btn icon-btn"), ("data-act", "dec"), ("type", "button")],
                    "−",
                );
                dom.el_text(qty, "div", &[("class", "count")], &line.qty.to_string());
                dom.el_text(
                    qty,
                    "button",
                    &[("class", "btn icon-btn"), ("data-act", "inc"), ("type", "button")],
                    "+",
                );
                dom.el_text(
                    qty,
                    "button",
                    &[("class", "btn btn-danger"), ("data-act", "rm"), ("type", "button")],
                    "Remove",
                );
            }
        }
        self.navbar(ctx);
    }

    fn cart_click(&self, ctx: Ctx<'_, '_>, target: NodeId) {
        let Screen::Cart { user_id } = &self.screen else {
            return;
        };
        if ctx.dom.attr(target, "id") == Some("checkout") {
            if self.cart(ctx, user_id).is_empty() {
                Self::set_msg(ctx.dom, "cart-msg", "Your cart is empty.");
            } else {
                ctx.navigate("./payment.html");
            }
            return;
        }

        let Ok(Some(button)) = ctx.dom.closest(target, "button[data-act]") else {
            return;
        };
        let Ok(Some(row)) = ctx.dom.closest(button, ".cart-item") else {
            return;
        };
        let (Some(game_id), Some(act)) = (
            ctx.dom.attr(row, "data-id").map(str::to_string),
            ctx.dom.attr(button, "data-act").map(str::to_string),
        ) else {
            return;
        };
        if ctx.dom.closest(row, "#cart-list").ok().flatten().is_none() {
            return;
        }

        let mut cart = self.cart(ctx, user_id);
        let Some(index) = cart.iter().position(|l| l.game_id == game_id) else {
            return;
        };
        match act.as_str() {
            "inc" => cart[index].qty = (cart[index].qty.max(1) + 1).min(MAX_QTY),
            "dec" => cart[index].qty = cart[index].qty.max(2) - 1,
            "rm" => {
                cart.remove(index);
            }
            _ => {}
        }
        self.set_cart(ctx, user_id, &cart);
        self.render_cart(ctx);
    }

    fn build_payment(&mut self, ctx: Ctx<'_, '_>) {
        let root = ctx.dom.root();
        let main = ctx.dom.el(root, "main", &[("class", "container")]);
        Self::heading(ctx.dom, main, "Payment", "Secure checkout for your games.");
        let no_cart = Self::hidden(ctx.dom, main, "div", "no-cart", "Your cart is empty. ");
        ctx.dom
            .el_text(no_cart, "a", &[("href", "./index.html")], "Browse games");

        let layout = ctx.dom.el(main, "div", &[("class", "checkout")]);
        let form = ctx.dom.el(layout, "form", &[("id", "payment-form")]);
        Self::field(ctx.dom, form, "card-name", "Cardholder name", "text");
        Self::field(ctx.dom, form, "card-number", "Card number", "text");
        Self::field(ctx.dom, form, "exp", "Expiry (MM/YY)", "text");
        Self::field(ctx.dom, form, "cvv", "CVV", "password");
        Self::field(ctx.dom, form, "billing", "Billing address", "text");
        Self::field(ctx.dom, form, "city", "City", "text");
        Self::field(ctx.dom, form, "zip", "ZIP / postal code", "text");
        let select = ctx.dom.el(form, "select", &[("id", "country")]);
        ctx.dom
            .el_text(select, "option", &[("value", "")], "Select country");
        for country in COUNTRIES {
            ctx.dom
                .el_text(select, "option", &[("value", country)], country);
        }
        ctx.dom.el_text(
            form,
            "button",
            &[("id", "pay-btn"), ("type", "submit"), ("class", "btn btn-primary")],
            "Pay now",
        );
        Self::hidden(ctx.dom, form, "p", "pay-msg", "");

        let summary = ctx.dom.el(layout, "aside", &[("class", "summary")]);
        ctx.dom.el(summary, "div", &[("id", "order-items")]);
        let total_row = ctx.dom.el_text(summary, "div", &[("class", "total")], "Total: ");
        ctx.dom.el(total_row, "span", &[("id", "order-total")]);

        let Some(session) = self.session(ctx) else {
            return;
        };
        let (lines, total) = self.priced_lines(ctx, &session.user_id);
        if self.cart(ctx, &session.user_id).is_empty() {
            ctx.dom.set_display(no_cart, "block");
            ctx.dom.set_display(form, "none");
            return;
        }

        if let Some(items) = ctx.dom.by_id("order-items") {
            for line in &lines {
                let row = ctx.dom.el(items, "div", &[("class", "order-item")]);
                ctx.dom.el_text(row, "b", &[], &line.title);
                ctx.dom.el_text(
                    row,
                    "span",
                    &[],
                    &format!("{} × {}", line.qty, format_usd(line.price)),
                );
            }
        }
        if let Some(total_el) = ctx.dom.by_id("order-total") {
            ctx.dom.set_text(total_el, &format_usd(total));
        }
        self.screen = Screen::Payment {
            user_id: session.user_id,
            lines,
            total,
            pending: None,
        };
    }

    fn payment_input(ctx: Ctx<'_, '_>, target: NodeId) {
        let format: fn(&str) -> String = match ctx.dom.attr(target, "id") {
            Some("card-number") => format_card_number,
            Some("exp") => format_expiry,
            Some("cvv") => format_cvv,
            _ => return,
        };
        let formatted = format(ctx.dom.value(target).unwrap_or_default());
        ctx.dom.set_value(target, &formatted);
    }

    fn payment_submit(&mut self, ctx: Ctx<'_, '_>) {
        let Screen::Payment {
            user_id,
            lines,
            total,
            pending,
        } = &mut self.screen
        else {
            return;
        };
        if pending.is_some() {
            return;
        }
        let dom = &mut *ctx.dom;
        Self::set_msg(dom, "pay-msg", "");

        let name = Self::value_of(dom, "card-name").trim().to_string();
        let card = Self::value_of(dom, "card-number");
        let exp = Self::value_of(dom, "exp").trim().to_string();
        let cvv = Self::value_of(dom, "cvv").trim().to_string();
        let billing = Self::value_of(dom, "billing").trim().to_string();
        let city = Self::value_of(dom, "city").trim().to_string();
        let zip = Self::value_of(dom, "zip").trim().to_string();
        let country = Self::value_of(dom, "country").trim().to_string();

        let error = if name.chars().count() < 2 {
            Some("Please enter the cardholder name.")
        } else if !card_number_valid(&card) {
            Some("Please enter a valid card number.")
        } else if !expiry_valid(&exp, Local::now().date_naive()) {
            Some("Please enter a valid expiry date (MM/YY).")
        } else if !cvv_valid(&cvv) {
            Some("Please enter a valid CVV (3–4 digits).")
        } else if billing.chars().count() < 5 {
            Some("Please enter your billing address.")
        } else if city.chars().count() < 2 {
            Some("Please enter your city.")
        } else if zip.chars().count() < 3 {
            Some("Please enter your ZIP / postal code.")
        } else if country.is_empty() {
            Some("Please select your country.")
        } else {
            None
        };
        if let Some(message) = error {
            debug!(reason = message, "payment rejected");
            Self::set_msg(dom, "pay-msg", message);
            return;
        }

        if let Some(button) = dom.by_id("pay-btn") {
            dom.set_disabled(button, true);
            dom.set_text(button, "Processing…");
        }
        let card_digits: String = card.chars().filter(char::is_ascii_digit).collect();
        *pending = Some(PendingPayment {
            user_id: user_id.clone(),
            lines: lines.clone(),
            total: *total,
            cardholder: name,
            card_digits,
            city,
            country,
        });
        ctx.schedule(self.timing.payment_processing, StoreTimer::CompletePayment);
    }

    fn complete_payment(&mut self, ctx: Ctx<'_, '_>) {
        let Screen::Payment { pending, .. } = &mut self.screen else {
            return;
        };
        let Some(payment) = pending.take() else {
            return;
        };
        let now = Utc::now();
        let id = order_id(now);
        let created_at = iso_timestamp(now);
        let total = (payment.total * 100.0).round() / 100.0;
        let last4_start = payment.card_digits.len().saturating_sub(4);
        let order = Order {
            order_id: id.clone(),
            created_at: created_at.clone(),
            total,
            items: payment
                .lines
                .iter()
                .map(|l| OrderLine {
                    game_id: l.game_id.clone(),
                    title: l.title.clone(),
                    price: l.price,
                    qty: l.qty,
                })
                .collect(),
            payment: Some(PaymentSummary {
                method: "card".to_string(),
                last4: payment.card_digits[last4_start..].to_string(),
                cardholder: payment.cardholder,
                billing_city: payment.city,
                billing_country: payment.country,
            }),
        };

        let user = payment.user_id.as_str();
        let mut orders = self.orders(ctx, user);
        orders.insert(0, order);
        ctx.storage
            .set_json(&self.keys.user_key_raw(Collection::Orders, user), &orders);
        self.set_cart(ctx, user, &[]);
        ctx.storage.set_json(
            &self.keys.user_key_raw(Collection::LastSuccess, user),
            &LastSuccess {
                order_id: id.clone(),
                created_at,
                total,
            },
        );
        debug!(order = %id, user, "order placed");
        self.toast(ctx, "Payment successful", &format!("Order {id} created."));
        ctx.schedule(
            self.timing.success_redirect,
            StoreTimer::Redirect("./orders.html?success=1".to_string()),
        );
    }

    fn build_orders(&self, ctx: Ctx<'_, '_>) {
        let root = ctx.dom.root();
        let main = ctx.dom.el(root, "main", &[("class", "container")]);
        Self::heading(
            ctx.dom,
            main,
            "Purchase history",
            "Every order you have placed on this device.",
        );
        let success = Self::hidden(ctx.dom, main, "div", "orders-success", "");
        ctx.dom
            .el_text(success, "b", &[("class", "success-title")], "Payment successful");
        ctx.dom.el(success, "p", &[("id", "orders-success-msg")]);
        let none = Self::hidden(ctx.dom, main, "div", "no-orders", "No orders yet.");
        let list = ctx.dom.el(main, "div", &[("id", "orders")]);

        let Some(session) = self.session(ctx) else {
            return;
        };
        let user = session.user_id.as_str();
        if ctx.query_param("success").as_deref() == Some("1") {
            let key = self.keys.user_key_raw(Collection::LastSuccess, user);
            if let Some(info) = ctx.storage.get_json::<LastSuccess>(&key) {
                if !info.order_id.is_empty() {
                    ctx.dom.set_display(success, "block");
                    if let Some(msg) = ctx.dom.by_id("orders-success-msg") {
                        ctx.dom.set_text(
                            msg,
                            &format!(
                                "Order {} • {} • Total {}",
                                info.order_id,
                                format_date_time(&info.created_at),
                                format_usd(info.total)
                            ),
                        );
                    }
                    ctx.storage.remove(&key);
                }
            }
        }

        let orders = self.orders(ctx, user);
        if orders.is_empty() {
            ctx.dom.set_display(none, "block");
            return;
        }
        let dom = &mut *ctx.dom;
        for order in &orders {
            let label = format!("Order {}", order.order_id);
            let card = dom.el(
                list,
                "article",
                &[("class", "order"), ("aria-label", label.as_str())],
            );
            let head = dom.el(card, "div", &[("class", "order-head")]);
            let left = dom.el(head, "div", &[]);
            dom.el_text(left, "div", &[("class", "order-id")], &order.order_id);
            dom.el_text(
                left,
                "div",
                &[("class", "order-meta")],
                &format!("Purchased: {}", format_date_time(&order.created_at)),
            );
            let right = dom.el(head, "div", &[("class", "order-meta")]);
            dom.el_text(right, "span", &[("class", "price")], &format_usd(order.total));
            let items = dom.el(card, "div", &[("class", "order-items")]);
            for item in &order.items {
                let row = dom.el(items, "div", &[("class", "order-item")]);
                dom.el_text(row, "b", &[], &item.title);
                dom.el_text(
                    row,
                    "span",
                    &[],
                    &format!("{} × {}", item.qty, format_usd(item.price)),
                );
            }
        }
    }

    fn build_login(&self, ctx: Ctx<'_, '_>) {
        let root = ctx.dom.root();
        let main = ctx.dom.el(root, "main", &[("class", "auth")]);
        Self::heading(ctx.dom, main, "Welcome", "Login or create an account to continue.");
        let tabs = ctx.dom.el(main, "div", &[("class", "tabs"), ("role", "tablist")]);
        ctx.dom.el_text(
            tabs,
            "button",
            &[("id", "tab-login"), ("type", "button"), ("aria-selected", "true")],
            "Login",
        );
        ctx.dom.el_text(
            tabs,
            "button",
            &[("id", "tab-signup"), ("type", "button"), ("aria-selected", "false")],
            "Signup",
        );

        let login = ctx.dom.el(main, "form", &[("id", "login-form")]);
        Self::field(ctx.dom, login, "login-email", "Email", "email");
        Self::field(ctx.dom, login, "login-password", "Password", "password");
        ctx.dom.el_text(
            login,
            "button",
            &[("type", "submit"), ("class", "btn btn-primary")],
            "Login",
        );
        Self::hidden(ctx.dom, login, "p", "login-msg", "");

        let signup = ctx.dom.el(main, "form", &[("id", "signup-form")]);
        ctx.dom.set_display(signup, "none");
        Self::field(ctx.dom, signup, "signup-name", "Display name", "text");
        Self::field(ctx.dom, signup, "signup-email", "Email", "email");
        Self::field(ctx.dom, signup, "signup-password", "Password", "password");
        ctx.dom.el_text(
            signup,
            "button",
            &[("type", "submit"), ("class", "btn btn-primary")],
            "Create account",
        );
        Self::hidden(ctx.dom, signup, "p", "signup-msg", "");

        self.games(ctx);
    }

    fn show_tab(dom: &mut MockDom, login: bool) {
        let ids = [
            ("tab-login", "aria-selected", login.to_string()),
            ("tab-signup", "aria-selected", (!login).to_string()),
        ];
        for (id, name, value) in ids {
            if let Some(node) = dom.by_id(id) {
                dom.set_attr(node, name, &value);
            }
        }
        let display = |on: bool| if on { "block" } else { "none" };
        if let Some(form) = dom.by_id("login-form") {
            dom.set_display(form, display(login));
        }
        if let Some(form) = dom.by_id("signup-form") {
            dom.set_display(form, display(!login));
        }
        let other_msg = if login { "signup-msg" } else { "login-msg" };
        if let Some(msg) = dom.by_id(other_msg) {
            dom.set_display(msg, "none");
        }
    }

    fn users(&self, ctx: Ctx<'_, '_>) -> Vec<UserAccount> {
        ctx.storage
            .get_json(&self.keys.users_key())
            .unwrap_or_default()
    }

    fn sign_in(&mut self, ctx: Ctx<'_, '_>, user: &UserAccount, title: &str, body: String) {
        let now = iso_timestamp(Utc::now());
        ctx.storage.set_json(
            &self.keys.session_key(),
            &SessionIdentity {
                user_id: user.id.clone(),
                name: user.name.clone(),
                email: user.email.clone(),
                token: Some(format!("demo_{}", uid(14))),
                created_at: Some(now),
            },
        );
        self.toast(ctx, title, &body);
        ctx.schedule(
            self.timing.auth_redirect,
            StoreTimer::Redirect("./index.html".to_string()),
        );
    }

    fn login_submit(&mut self, ctx: Ctx<'_, '_>) {
        Self::set_msg(ctx.dom, "login-msg", "");
        let email = Self::value_of(ctx.dom, "login-email").trim().to_lowercase();
        let password = Self::value_of(ctx.dom, "login-password");
        if !is_email(&email) || password.is_empty() {
            Self::set_msg(ctx.dom, "login-msg", "Please enter a valid email and password.");
            return;
        }
        let users = self.users(ctx);
        let Some(user) = users.iter().find(|u| u.email == email) else {
            Self::set_msg(ctx.dom, "login-msg", "Account not found. Please signup first.");
            return;
        };
        if sha256_hex(&password) != user.password_hash {
            Self::set_msg(ctx.dom, "login-msg", "Invalid password. Please try again.");
            return;
        }
        let body = format!("Signed in as {}.", user.name);
        self.sign_in(ctx, user, "Welcome back", body);
    }

    fn signup_submit(&mut self, ctx: Ctx<'_, '_>) {
        Self::set_msg(ctx.dom, "signup-msg", "");
        let name = Self::value_of(ctx.dom, "signup-name").trim().to_string();
        let email = Self::value_of(ctx.dom, "signup-email").trim().to_lowercase();
        let password = Self::value_of(ctx.dom, "signup-password");

        let error = if name.chars().count() < 2 {
            Some("Please enter a display name (at least 2 characters).")
        } else if !is_email(&email) {
            Some("Please enter a valid email address.")
        } else if password.chars().count() < 8 {
            Some("Password must be at least 8 characters.")
        } else {
            None
        };
        if let Some(message) = error {
            Self::set_msg(ctx.dom, "signup-msg", message);
            return;
        }
        let mut users = self.users(ctx);
        if users.iter().any(|u| u.email == email) {
            Self::set_msg(
                ctx.dom,
                "signup-msg",
                "That email is already registered. Please login.",
            );
            return;
        }
        let user = UserAccount {
            id: format!("u_{}", uid(12)),
            name,
            email,
            password_hash: sha256_hex(&password),
            created_at: iso_timestamp(Utc::now()),
        };
        users.push(user.clone());
        ctx.storage.set_json(&self.keys.users_key(), &users);
        let body = format!("Welcome, {}!", user.name);
        self.sign_in(ctx, &user, "Account created", body);
    }
}

fn page_of(path: &str) -> Option<(&'static str, &'static str)> {
    let page = match path.rsplit('/').next().unwrap_or_default() {
        "index.html" => ("home", "Home"),
        "game.html" => ("game", "Game"),
        "cart.html" => ("cart", "Cart"),
        "payment.html" => ("payment", "Payment"),
        "orders.html" => ("orders", "Orders"),
        "login.html" => ("login", "Login"),
        _ => return None,
    };
    Some(page)
}

impl MockApp for Storefront {
    type Timer = StoreTimer;

    fn load(&mut self, ctx: &mut PageContext<'_, StoreTimer>) {
        self.screen = Screen::Blank;
        let Some((page, title)) = page_of(ctx.path()) else {
            ctx.set_title("404 Not Found");
            let root = ctx.dom.root();
            ctx.dom.el_text(root, "h1", &[], "Not Found");
            return;
        };
        debug!(url = ctx.url(), page, "storefront page load");

        if page == "login" && self.session(ctx).is_some() {
            ctx.navigate("./index.html");
            return;
        }

        ctx.set_title(format!("Game Store • {title}"));
        let root = ctx.dom.root();
        ctx.dom.set_attr(root, "data-page", page);
        if page != "login" {
            ctx.dom.el(root, "header", &[("id", "nav"), ("class", "nav")]);
        }
        ctx.dom
            .el(root, "div", &[("id", "toasts"), ("class", "toasts")]);
        if page != "login" {
            self.navbar(ctx);
        }

        match page {
            "home" => {
                self.screen = Screen::Home;
                self.build_home(ctx);
            }
            "game" => self.build_game(ctx),
            "cart" => self.build_cart(ctx),
            "payment" => self.build_payment(ctx),
            "orders" => {
                self.screen = Screen::Orders;
                self.build_orders(ctx);
            }
            _ => {
                self.screen = Screen::Login;
                self.build_login(ctx);
            }
        }
    }

    fn on_event(&mut self, ctx: &mut PageContext<'_, StoreTimer>, event: DomEvent) {
        let id = ctx.dom.attr(event.target, "id").map(str::to_string);
        match (event.kind, id.as_deref()) {
            (EventKind::Click, Some("logout")) => {
                ctx.storage.remove(&self.keys.session_key());
                self.toast(ctx, "Logged out", "See you next time.");
                ctx.schedule(
                    self.timing.logout_redirect,
                    StoreTimer::Redirect("./login.html".to_string()),
                );
                return;
            }
            (EventKind::Click, Some("tab-login")) if matches!(self.screen, Screen::Login) => {
                Self::show_tab(ctx.dom, true);
                return;
            }
            (EventKind::Click, Some("tab-signup")) if matches!(self.screen, Screen::Login) => {
                Self::show_tab(ctx.dom, false);
                return;
            }
            _ => {}
        }

        let id = id.as_deref();
        match &self.screen {
            Screen::Home => match (event.kind, id) {
                (EventKind::Input, Some("search")) => {
                    ctx.cancel(&StoreTimer::Search);
                    ctx.schedule(self.timing.search_debounce, StoreTimer::Search);
                }
                (EventKind::Click, Some("reset-search")) => {
                    if let Some(input) = ctx.dom.by_id("search") {
                        ctx.dom.set_value(input, "");
                    }
                    self.render_games(ctx, "");
                }
                _ => {}
            },
            Screen::Game {
                game,
                user_id: Some(user),
            } if event.kind == EventKind::Click && id == Some("add-to-cart") => {
                let (game, user) = (game.clone(), user.clone());
                self.add_to_cart(ctx, &game, &user);
            }
            Screen::Cart { .. } if event.kind == EventKind::Click => {
                self.cart_click(ctx, event.target);
            }
            Screen::Payment { .. } => match (event.kind, id) {
                (EventKind::Input, _) => Self::payment_input(ctx, event.target),
                (EventKind::Submit, Some("payment-form")) => self.payment_submit(ctx),
                _ => {}
            },
            Screen::Login if event.kind == EventKind::Submit => match id {
                Some("login-form") => self.login_submit(ctx),
                Some("signup-form") => self.signup_submit(ctx),
                _ => {}
            },
            _ => {}
        }
    }

    fn on_timer(&mut self, ctx: &mut PageContext<'_, StoreTimer>, timer: StoreTimer) {
        match timer {
            StoreTimer::Search => {
                let query = Self::value_of(ctx.dom, "search");
                self.render_games(ctx, &query);
            }
            StoreTimer::ToastExpired(seq) => {
                let selector = format!("[data-toast='{seq}']");
                if let Ok(Some(toast)) = ctx.dom.query(&selector) {
                    ctx.dom.remove(toast);
                }
            }
            StoreTimer::CompletePayment => self.complete_payment(ctx),
            StoreTimer::Redirect(target) => ctx.navigate(&target),
        }
    }
}
