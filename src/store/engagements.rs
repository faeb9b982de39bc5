//! Engagement store: per-user per-tweet engagement rows and the aggregate
//! per-tweet counters.
//!
//! At most one engagement of a given kind exists per (user, tweet) pair.
//! The stats row for a tweet is created lazily on its first engagement and
//! is adjusted inside the same write-lock acquisition as the row itself.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

use super::Store;

/// The closed set of engagement kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementKind {
    Like,
    Retweet,
    Bookmark,
}

impl EngagementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Retweet => "retweet",
            Self::Bookmark => "bookmark",
        }
    }
}

impl fmt::Display for EngagementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngagementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "retweet" => Ok(Self::Retweet),
            "bookmark" => Ok(Self::Bookmark),
            other => Err(format!("unknown engagement type: {other}")),
        }
    }
}

/// A single user's engagement of one kind with one tweet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetEngagement {
    pub id: String,
    pub tweet_id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: EngagementKind,
    pub created_at: DateTime<Utc>,
}

/// Aggregate counters for one tweet, created lazily on first engagement.
///
/// The reply and impression counters exist in the wire format but no
/// in-scope operation mutates them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetStats {
    pub tweet_id: String,
    pub reply_count: u32,
    pub retweet_count: u32,
    pub like_count: u32,
    pub bookmark_count: u32,
    pub impression_count: u32,
}

impl TweetStats {
    fn zeroed(tweet_id: &str) -> Self {
        Self {
            tweet_id: tweet_id.to_string(),
            reply_count: 0,
            retweet_count: 0,
            like_count: 0,
            bookmark_count: 0,
            impression_count: 0,
        }
    }

    fn bump(&mut self, kind: EngagementKind) {
        match kind {
            EngagementKind::Like => self.like_count += 1,
            EngagementKind::Retweet => self.retweet_count += 1,
            EngagementKind::Bookmark => self.bookmark_count += 1,
        }
    }

    fn drop_one(&mut self, kind: EngagementKind) {
        match kind {
            EngagementKind::Like => self.like_count = self.like_count.saturating_sub(1),
            EngagementKind::Retweet => self.retweet_count = self.retweet_count.saturating_sub(1),
            EngagementKind::Bookmark => self.bookmark_count = self.bookmark_count.saturating_sub(1),
        }
    }
}

impl Store {
    /// Record an engagement and increment the matching stats counter.
    ///
    /// Fails with [`StoreError::DuplicateEngagement`] when a row for this
    /// (user, tweet, kind) triple already exists; nothing is written then.
    pub async fn engage(
        &self,
        user_id: &str,
        tweet_id: &str,
        kind: EngagementKind,
    ) -> Result<TweetEngagement, StoreError> {
        let mut tables = self.inner.write().await;
        let duplicate = tables
            .engagements
            .iter()
            .any(|e| e.user_id == user_id && e.tweet_id == tweet_id && e.kind == kind);
        if duplicate {
            return Err(StoreError::DuplicateEngagement);
        }

        let engagement = TweetEngagement {
            id: Self::next_id(),
            tweet_id: tweet_id.to_string(),
            user_id: user_id.to_string(),
            kind,
            created_at: Utc::now(),
        };
        tables.engagements.push(engagement.clone());
        tables
            .stats
            .entry(tweet_id.to_string())
            .or_insert_with(|| TweetStats::zeroed(tweet_id))
            .bump(kind);

        Ok(engagement)
    }

    /// Delete an engagement row and decrement the matching counter,
    /// floored at zero.
    ///
    /// Fails with `NotFound` when no matching row exists.
    pub async fn remove_engagement(
        &self,
        user_id: &str,
        tweet_id: &str,
        kind: EngagementKind,
    ) -> Result<(), StoreError> {
        let mut tables = self.inner.write().await;
        let position = tables
            .engagements
            .iter()
            .position(|e| e.user_id == user_id && e.tweet_id == tweet_id && e.kind == kind)
            .ok_or(StoreError::NotFound("engagement"))?;
        tables.engagements.remove(position);

        if let Some(stats) = tables.stats.get_mut(tweet_id) {
            stats.drop_one(kind);
        }

        Ok(())
    }

    /// The current counters for a tweet, or `None` if no engagement has
    /// ever occurred on it.
    pub async fn tweet_stats(&self, tweet_id: &str) -> Option<TweetStats> {
        self.inner.read().await.stats.get(tweet_id).cloned()
    }

    /// Every engagement row for the (user, tweet) pair — between zero and
    /// three rows, one per kind.
    pub async fn user_engagement(&self, user_id: &str, tweet_id: &str) -> Vec<TweetEngagement> {
        let tables = self.inner.read().await;
        tables
            .engagements
            .iter()
            .filter(|e| e.user_id == user_id && e.tweet_id == tweet_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::NewUser;
    use super::*;

    async fn setup() -> (Store, String, String) {
        let store = Store::new();
        let user = store
            .create_user(NewUser {
                username: "alice".into(),
                email: "alice@example.com".into(),
                password_hash: "salt:key".into(),
                display_name: "Alice".into(),
            })
            .await;
        let tweet = store.create_tweet(&user.id, "hello").await;
        (store, user.id, tweet.id)
    }

    #[tokio::test]
    async fn first_engagement_creates_stats_lazily() {
        let (store, user, tweet) = setup().await;
        assert!(store.tweet_stats(&tweet).await.is_none());

        store.engage(&user, &tweet, EngagementKind::Like).await.unwrap();
        let stats = store.tweet_stats(&tweet).await.unwrap();
        assert_eq!(stats.like_count, 1);
        assert_eq!(stats.retweet_count, 0);
        assert_eq!(stats.bookmark_count, 0);
        assert_eq!(stats.reply_count, 0);
        assert_eq!(stats.impression_count, 0);
    }

    #[tokio::test]
    async fn duplicate_engagement_of_same_kind_fails() {
        let (store, user, tweet) = setup().await;
        store.engage(&user, &tweet, EngagementKind::Like).await.unwrap();
        assert_eq!(
            store.engage(&user, &tweet, EngagementKind::Like).await,
            Err(StoreError::DuplicateEngagement)
        );
        // The counter saw exactly one increment.
        assert_eq!(store.tweet_stats(&tweet).await.unwrap().like_count, 1);
    }

    #[tokio::test]
    async fn different_kinds_coexist_for_one_pair() {
        let (store, user, tweet) = setup().await;
        store.engage(&user, &tweet, EngagementKind::Like).await.unwrap();
        store.engage(&user, &tweet, EngagementKind::Retweet).await.unwrap();
        store.engage(&user, &tweet, EngagementKind::Bookmark).await.unwrap();

        let rows = store.user_engagement(&user, &tweet).await;
        assert_eq!(rows.len(), 3);

        let stats = store.tweet_stats(&tweet).await.unwrap();
        assert_eq!(stats.like_count, 1);
        assert_eq!(stats.retweet_count, 1);
        assert_eq!(stats.bookmark_count, 1);
    }

    #[tokio::test]
    async fn remove_then_engage_restores_prior_stats() {
        let (store, user, tweet) = setup().await;
        store.engage(&user, &tweet, EngagementKind::Like).await.unwrap();

        store
            .remove_engagement(&user, &tweet, EngagementKind::Like)
            .await
            .unwrap();
        assert_eq!(store.tweet_stats(&tweet).await.unwrap().like_count, 0);
        assert!(store.user_engagement(&user, &tweet).await.is_empty());

        store.engage(&user, &tweet, EngagementKind::Like).await.unwrap();
        assert_eq!(store.tweet_stats(&tweet).await.unwrap().like_count, 1);
    }

    #[tokio::test]
    async fn removing_a_missing_engagement_fails() {
        let (store, user, tweet) = setup().await;
        assert_eq!(
            store
                .remove_engagement(&user, &tweet, EngagementKind::Bookmark)
                .await,
            Err(StoreError::NotFound("engagement"))
        );
    }

    #[test]
    fn kind_round_trips_through_strings() {
        for kind in [
            EngagementKind::Like,
            EngagementKind::Retweet,
            EngagementKind::Bookmark,
        ] {
            assert_eq!(kind.as_str().parse::<EngagementKind>().unwrap(), kind);
        }
        assert!("share".parse::<EngagementKind>().is_err());
    }
}
