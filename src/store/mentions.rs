//! Mention index: tweet→user association rows.
//!
//! Rows are created when a tweet is created or edited, one per `@token`
//! occurrence whose token resolves to a registered username. The table is
//! append-only: editing a tweet appends rows for the new content without
//! pruning the old ones, so repeated edits referencing the same user
//! accumulate duplicates. Rows are removed only when the owning tweet is
//! deleted.

use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;

use super::tweets::{joined_view, TweetView};
use super::users::{project_profile, UserProfile};
use super::{parsing, Store, Tables};

/// An association between a tweet and a mentioned user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mention {
    pub id: String,
    pub tweet_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Scan `content` and append a mention row for every `@token` occurrence
/// that resolves to a registered username. Unresolved tokens are skipped.
pub(crate) fn record_mentions(tables: &mut Tables, tweet_id: &str, content: &str) {
    let resolved: Vec<String> = parsing::extract_mention_tokens(content)
        .iter()
        .filter_map(|token| {
            tables
                .users
                .values()
                .find(|u| u.username == *token)
                .map(|u| u.id.clone())
        })
        .collect();

    for user_id in resolved {
        let mention = Mention {
            id: Store::next_id(),
            tweet_id: tweet_id.to_string(),
            user_id,
            created_at: Utc::now(),
        };
        debug!("recorded mention of {} in tweet {}", mention.user_id, tweet_id);
        tables.mentions.push(mention);
    }
}

impl Store {
    /// Append a single mention row. No uniqueness constraint applies.
    pub async fn add_mention(&self, tweet_id: &str, user_id: &str) -> Mention {
        let mention = Mention {
            id: Self::next_id(),
            tweet_id: tweet_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };
        let mut tables = self.inner.write().await;
        tables.mentions.push(mention.clone());
        mention
    }

    /// The resolved user records for every mention row referencing the
    /// tweet, in row-insertion order. Duplicate rows yield duplicate
    /// entries.
    pub async fn users_mentioned_in(&self, tweet_id: &str) -> Vec<UserProfile> {
        let tables = self.inner.read().await;
        tables
            .mentions
            .iter()
            .filter(|m| m.tweet_id == tweet_id)
            .filter_map(|m| tables.users.get(&m.user_id))
            .map(|user| project_profile(&tables, user, None))
            .collect()
    }

    /// The joined tweet views for every mention row referencing the user,
    /// newest first.
    pub async fn tweets_mentioning(&self, user_id: &str) -> Vec<TweetView> {
        let tables = self.inner.read().await;
        let mut views: Vec<TweetView> = tables
            .mentions
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| tables.tweets.get(&m.tweet_id))
            .filter_map(|tweet| joined_view(&tables, tweet))
            .collect();
        views.sort_by(|a, b| b.tweet.created_at.cmp(&a.tweet.created_at));
        views
    }
}

#[cfg(test)]
mod tests {
    use super::super::NewUser;
    use super::*;

    async fn register(store: &Store, username: &str) -> String {
        store
            .create_user(NewUser {
                username: username.into(),
                email: format!("{username}@example.com"),
                password_hash: "salt:key".into(),
                display_name: username.into(),
            })
            .await
            .id
    }

    #[tokio::test]
    async fn resolved_tokens_create_rows_unresolved_do_not() {
        let store = Store::new();
        let alice = register(&store, "alice").await;
        let bob = register(&store, "bob").await;

        let tweet = store.create_tweet(&alice, "Hello @bob").await;
        let mentioned = store.users_mentioned_in(&tweet.id).await;
        assert_eq!(mentioned.len(), 1);
        assert_eq!(mentioned[0].id, bob);

        let ghost = store.create_tweet(&alice, "Hello @nobody").await;
        assert!(store.users_mentioned_in(&ghost.id).await.is_empty());
        // The raw token still shows in the display list.
        let views = store.tweets_by_user(&alice).await;
        let ghost_view = views
            .iter()
            .find(|v| v.tweet.id == ghost.id)
            .unwrap();
        assert_eq!(ghost_view.mentions, vec!["nobody"]);
    }

    #[tokio::test]
    async fn repeated_edits_accumulate_duplicate_rows() {
        let store = Store::new();
        let alice = register(&store, "alice").await;
        let bob = register(&store, "bob").await;

        let tweet = store.create_tweet(&alice, "hi @bob").await;
        store.update_tweet(&tweet.id, "hi again @bob").await.unwrap();
        store.update_tweet(&tweet.id, "hi once more @bob").await.unwrap();

        // Append-only index: one row per create/edit that referenced bob.
        let mentioned = store.users_mentioned_in(&tweet.id).await;
        assert_eq!(mentioned.len(), 3);
        assert!(mentioned.iter().all(|u| u.id == bob));

        // The reverse lookup sees the same accumulation.
        assert_eq!(store.tweets_mentioning(&bob).await.len(), 3);
    }

    #[tokio::test]
    async fn tweets_mentioning_joins_author_and_sorts_newest_first() {
        let store = Store::new();
        let alice = register(&store, "alice").await;
        let bob = register(&store, "bob").await;
        register(&store, "carol").await;

        store.create_tweet(&alice, "first ping @bob").await;
        store.create_tweet(&alice, "second ping @bob").await;

        let views = store.tweets_mentioning(&bob).await;
        assert_eq!(views.len(), 2);
        assert!(views[0].tweet.created_at >= views[1].tweet.created_at);
        assert!(views.iter().all(|v| v.author.username == "alice"));
    }

    #[tokio::test]
    async fn add_mention_is_append_only() {
        let store = Store::new();
        let alice = register(&store, "alice").await;
        let tweet = store.create_tweet(&alice, "no mentions").await;

        store.add_mention(&tweet.id, &alice).await;
        store.add_mention(&tweet.id, &alice).await;
        assert_eq!(store.users_mentioned_in(&tweet.id).await.len(), 2);
    }
}
