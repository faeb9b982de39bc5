//! In-memory data store for the chirp service.
//!
//! All application state lives in a handful of in-memory tables behind a
//! single `tokio` read/write lock. The [`Store`] facade is constructed
//! explicitly at process start and handed to every handler through axum
//! state — there is no module-level singleton. Data is lost when the
//! process exits.
//!
//! Every multi-field mutation (a follow's dual counter update, an
//! engagement's record-plus-counter update, a tweet delete's mention
//! cascade) runs under one write-lock acquisition, so concurrent readers
//! never observe a half-applied change.

mod engagements;
mod follows;
mod mentions;
mod parsing;
mod tweets;
mod users;

pub use engagements::{EngagementKind, TweetEngagement, TweetStats};
pub use follows::Follow;
pub use mentions::Mention;
pub use tweets::{Tweet, TweetView};
pub use users::{NewUser, User, UserProfile};

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

/// The raw tables. Users and tweets are keyed by id for direct lookup;
/// the association tables are scanned.
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub(crate) users: HashMap<String, User>,
    pub(crate) tweets: HashMap<String, Tweet>,
    pub(crate) mentions: Vec<Mention>,
    pub(crate) follows: Vec<Follow>,
    pub(crate) engagements: Vec<TweetEngagement>,
    pub(crate) stats: HashMap<String, TweetStats>,
}

/// Handle to the in-memory store.
///
/// Cloning is cheap and every clone shares the same underlying tables.
#[derive(Debug, Clone)]
pub struct Store {
    inner: Arc<RwLock<Tables>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Tables::default())),
        }
    }

    /// Drop every record in every table.
    ///
    /// Intended for test isolation; handlers never call this.
    pub async fn reset(&self) {
        let mut tables = self.inner.write().await;
        *tables = Tables::default();
    }

    /// Number of live user records.
    pub async fn user_count(&self) -> usize {
        self.inner.read().await.users.len()
    }

    /// Number of live tweet records.
    pub async fn tweet_count(&self) -> usize {
        self.inner.read().await.tweets.len()
    }

    pub(crate) fn next_id() -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reset_clears_every_table() {
        let store = Store::new();
        let user = store
            .create_user(NewUser {
                username: "alice".into(),
                email: "alice@example.com".into(),
                password_hash: "x".into(),
                display_name: "Alice".into(),
            })
            .await;
        store.create_tweet(&user.id, "hello world").await;
        assert_eq!(store.user_count().await, 1);
        assert_eq!(store.tweet_count().await, 1);

        store.reset().await;
        assert_eq!(store.user_count().await, 0);
        assert_eq!(store.tweet_count().await, 0);
        assert!(store.user_by_username("alice").await.is_none());
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(Store::next_id(), Store::next_id());
    }
}
