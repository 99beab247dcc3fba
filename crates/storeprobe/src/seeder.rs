//! State Seeder
//!
//! Writes fixtures straight into the application's local storage through the
//! session's script channel, so a scenario starts from a known state without
//! replaying UI flows. Every write replaces the whole key; nothing is merged.
//! Values are serialised here and stored as the resulting string.
//!
//! Reads are defensive: absent or malformed data counts as empty.

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::locator::SafeId;
use crate::result::ProbeResult;
use crate::scripts;
use crate::session::BrowserSession;
use crate::storage::{CartLine, Order, SessionIdentity, StorageKeys};

/// Seeds and inspects application storage for one session
#[derive(Debug)]
pub struct StateSeeder<'s, S> {
    session: &'s S,
    keys: StorageKeys,
}

impl<'s, S: BrowserSession> StateSeeder<'s, S> {
    /// Seeder writing keys derived from `keys`
    #[must_use]
    pub const fn new(session: &'s S, keys: StorageKeys) -> Self {
        Self { session, keys }
    }

    /// Key vocabulary in use
    #[must_use]
    pub const fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    async fn write_raw(&self, key: &str, raw: &str) -> ProbeResult<()> {
        self.session
            .execute_script(scripts::STORAGE_SET, &[Value::from(key), Value::from(raw)])
            .await?;
        Ok(())
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> ProbeResult<()> {
        let raw = serde_json::to_string(value)?;
        self.write_raw(key, &raw).await
    }

    async fn remove(&self, key: &str) -> ProbeResult<()> {
        self.session
            .execute_script(scripts::STORAGE_REMOVE, &[Value::from(key)])
            .await?;
        Ok(())
    }

    /// Raw stored string, `None` when the key is absent
    pub async fn read_raw(&self, key: &str) -> ProbeResult<Option<String>> {
        let value = self
            .session
            .execute_script(scripts::STORAGE_GET, &[Value::from(key)])
            .await?;
        Ok(match value {
            Value::String(raw) => Some(raw),
            _ => None,
        })
    }

    async fn read_array(&self, key: &str) -> ProbeResult<Vec<Value>> {
        let raw = self.read_raw(key).await?;
        Ok(
            match raw.and_then(|r| serde_json::from_str::<Value>(&r).ok()) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
        )
    }

    /// Store the test identity for `user` as the signed-in session
    pub async fn log_in(&self, user: &SafeId) -> ProbeResult<()> {
        self.log_in_as(&SessionIdentity::test_user(user)).await
    }

    /// Store an arbitrary identity as the signed-in session
    pub async fn log_in_as(&self, identity: &SessionIdentity) -> ProbeResult<()> {
        info!(user = %identity.user_id, "seeding session");
        self.write(&self.keys.session_key(), identity).await
    }

    /// Remove the signed-in session
    pub async fn log_out(&self) -> ProbeResult<()> {
        info!("clearing session");
        self.remove(&self.keys.session_key()).await
    }

    /// Replace the cart of `user`
    pub async fn replace_cart(&self, user: &SafeId, lines: &[CartLine]) -> ProbeResult<()> {
        info!(user = %user, lines = lines.len(), "seeding cart");
        self.write(&self.keys.cart_key(user), lines).await
    }

    /// Empty the cart of `user`
    pub async fn clear_cart(&self, user: &SafeId) -> ProbeResult<()> {
        self.replace_cart(user, &[]).await
    }

    /// Replace the order history of `user`
    pub async fn replace_orders(&self, user: &SafeId, orders: &[Order]) -> ProbeResult<()> {
        info!(user = %user, orders = orders.len(), "seeding orders");
        self.write(&self.keys.orders_key(user), orders).await
    }

    /// Empty the order history of `user`
    pub async fn clear_orders(&self, user: &SafeId) -> ProbeResult<()> {
        self.replace_orders(user, &[]).await
    }

    /// Drop the last-success marker of `user`
    pub async fn clear_last_success(&self, user: &SafeId) -> ProbeResult<()> {
        info!(user = %user, "clearing last-success marker");
        self.remove(&self.keys.last_success_key(user)).await
    }

    /// Fresh signed-in user with an empty cart, no orders and no marker
    pub async fn reset_user(&self, user: &SafeId) -> ProbeResult<()> {
        self.log_in(user).await?;
        self.clear_cart(user).await?;
        self.clear_orders(user).await?;
        self.clear_last_success(user).await
    }

    /// Stored orders of `user`; 0 when absent or malformed
    pub async fn stored_order_count(&self, user: &SafeId) -> ProbeResult<usize> {
        Ok(self.read_array(&self.keys.orders_key(user)).await?.len())
    }

    /// Total units across the stored cart of `user`; malformed lines count 0
    pub async fn stored_cart_quantity(&self, user: &SafeId) -> ProbeResult<u64> {
        Ok(self
            .read_array(&self.keys.cart_key(user))
            .await?
            .iter()
            .filter_map(|line| line.get("qty").and_then(Value::as_u64))
            .sum())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{MockSession, Storefront};
    use crate::storage::OrderLine;

    fn user() -> SafeId {
        SafeId::parse("seed-user").unwrap()
    }

    async fn session() -> MockSession<Storefront> {
        let s = MockSession::new(Storefront::new());
        s.navigate("http://shop.test/index.html").await.unwrap();
        s
    }

    fn order(id: &str) -> Order {
        Order {
            order_id: id.to_string(),
            created_at: "2026-01-01T10:00:00.000Z".to_string(),
            total: 19.99,
            items: vec![OrderLine {
                game_id: "neon-drift".to_string(),
                title: "Neon Drift".to_string(),
                price: 19.99,
                qty: 1,
            }],
            payment: None,
        }
    }

    mod write_tests {
        use super::*;

        #[tokio::test]
        async fn test_log_in_writes_identity() {
            let s = session().await;
            let seeder = StateSeeder::new(&s, StorageKeys::default());
            seeder.log_in(&user()).await.unwrap();
            let raw = s.storage().unwrap().get("gs_session_v1").map(str::to_string);
            assert_eq!(
                raw.as_deref(),
                Some(r#"{"userId":"seed-user","name":"Test User","email":"test@example.com"}"#)
            );
        }

        #[tokio::test]
        async fn test_clear_cart_stores_empty_array() {
            let s = session().await;
            let seeder = StateSeeder::new(&s, StorageKeys::default());
            seeder
                .replace_cart(&user(), &[CartLine::new("neon-drift", 2)])
                .await
                .unwrap();
            assert_eq!(seeder.stored_cart_quantity(&user()).await.unwrap(), 2);
            seeder.clear_cart(&user()).await.unwrap();
            assert_eq!(
                s.storage().unwrap().get("gs_cart_v1_user_seed-user"),
                Some("[]")
            );
        }

        #[tokio::test]
        async fn test_seeding_is_idempotent() {
            let s = session().await;
            let seeder = StateSeeder::new(&s, StorageKeys::default());
            seeder.reset_user(&user()).await.unwrap();
            seeder.replace_orders(&user(), &[order("GS-20260101-AAAAAA")]).await.unwrap();
            let once = s.storage().unwrap();
            seeder.reset_user(&user()).await.unwrap();
            seeder.replace_orders(&user(), &[order("GS-20260101-AAAAAA")]).await.unwrap();
            assert_eq!(s.storage().unwrap(), once);
        }

        #[tokio::test]
        async fn test_custom_prefix_keys() {
            let s = session().await;
            let seeder = StateSeeder::new(&s, StorageKeys::new("qa_"));
            seeder.clear_orders(&user()).await.unwrap();
            assert!(s.storage().unwrap().get("qa_orders_v1_user_seed-user").is_some());
        }

        #[tokio::test]
        async fn test_clear_last_success_removes_key() {
            let s = session().await;
            let seeder = StateSeeder::new(&s, StorageKeys::default());
            s.execute_script(
                scripts::STORAGE_SET,
                &[
                    Value::from("gs_last_success_v1_user_seed-user"),
                    Value::from("{}"),
                ],
            )
            .await
            .unwrap();
            seeder.clear_last_success(&user()).await.unwrap();
            assert!(seeder
                .read_raw("gs_last_success_v1_user_seed-user")
                .await
                .unwrap()
                .is_none());
        }
    }

    mod read_tests {
        use super::*;

        #[tokio::test]
        async fn test_absent_orders_count_zero() {
            let s = session().await;
            let seeder = StateSeeder::new(&s, StorageKeys::default());
            assert_eq!(seeder.stored_order_count(&user()).await.unwrap(), 0);
            assert_eq!(seeder.stored_cart_quantity(&user()).await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_malformed_orders_count_zero() {
            let s = session().await;
            let seeder = StateSeeder::new(&s, StorageKeys::default());
            for raw in ["not json", "{\"a\":1}", "42", "null"] {
                seeder
                    .write_raw("gs_orders_v1_user_seed-user", raw)
                    .await
                    .unwrap();
                assert_eq!(seeder.stored_order_count(&user()).await.unwrap(), 0, "{raw}");
            }
        }

        #[tokio::test]
        async fn test_order_count_reads_stored_array() {
            let s = session().await;
            let seeder = StateSeeder::new(&s, StorageKeys::default());
            seeder
                .replace_orders(&user(), &[order("GS-1"), order("GS-2")])
                .await
                .unwrap();
            assert_eq!(seeder.stored_order_count(&user()).await.unwrap(), 2);
        }

        #[tokio::test]
        async fn test_cart_quantity_skips_bad_lines() {
            let s = session().await;
            let seeder = StateSeeder::new(&s, StorageKeys::default());
            seeder
                .write_raw(
                    "gs_cart_v1_user_seed-user",
                    r#"[{"gameId":"a","qty":2},{"gameId":"b"},{"gameId":"c","qty":3}]"#,
                )
                .await
                .unwrap();
            assert_eq!(seeder.stored_cart_quantity(&user()).await.unwrap(), 5);
        }
    }
}
