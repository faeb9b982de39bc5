//! Tweet store: CRUD, the author-joined listing and timeline assembly.

use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;

use crate::error::StoreError;

use super::users::{project_profile, UserProfile};
use super::{mentions, parsing, Store, Tables};

/// A stored tweet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub id: String,
    pub content: String,
    pub author_id: String,
    /// Reserved for replies; always `None` in the current scope.
    pub parent_tweet_id: Option<String>,
    /// Reserved for retweets; always `None` in the current scope.
    pub original_tweet_id: Option<String>,
    /// Reserved; always empty in the current scope.
    pub media_urls: Vec<String>,
    /// Reserved; always empty in the current scope.
    pub hashtags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tweet joined with its author and the display mention list.
///
/// The mention list is the raw `@token` scan of the content, in order of
/// appearance — not deduplicated and not checked against registered
/// usernames. Resolution only matters for the mention index and the
/// timeline, not for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetView {
    #[serde(flatten)]
    pub tweet: Tweet,
    pub author: UserProfile,
    pub mentions: Vec<String>,
}

/// Join one tweet with its author. Returns `None` when the author record
/// no longer exists, which silently drops the tweet from listings.
pub(crate) fn joined_view(tables: &Tables, tweet: &Tweet) -> Option<TweetView> {
    let author = tables.users.get(&tweet.author_id)?;
    Some(TweetView {
        tweet: tweet.clone(),
        author: project_profile(tables, author, None),
        mentions: parsing::extract_mention_tokens(&tweet.content),
    })
}

/// Collect, join and sort tweets newest-first.
fn collect_views<'a, I>(tables: &Tables, tweets: I) -> Vec<TweetView>
where
    I: Iterator<Item = &'a Tweet>,
{
    let mut views: Vec<TweetView> = tweets
        .filter_map(|tweet| joined_view(tables, tweet))
        .collect();
    views.sort_by(|a, b| b.tweet.created_at.cmp(&a.tweet.created_at));
    views
}

impl Store {
    /// Create a tweet and record mention rows for every `@token` in the
    /// content that resolves to a registered username.
    pub async fn create_tweet(&self, author_id: &str, content: &str) -> Tweet {
        let now = Utc::now();
        let tweet = Tweet {
            id: Self::next_id(),
            content: content.to_string(),
            author_id: author_id.to_string(),
            parent_tweet_id: None,
            original_tweet_id: None,
            media_urls: Vec::new(),
            hashtags: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let mut tables = self.inner.write().await;
        tables.tweets.insert(tweet.id.clone(), tweet.clone());
        mentions::record_mentions(&mut tables, &tweet.id, content);
        debug!("created tweet {} by {}", tweet.id, author_id);
        tweet
    }

    /// Look up a tweet by id.
    pub async fn tweet_by_id(&self, id: &str) -> Option<Tweet> {
        self.inner.read().await.tweets.get(id).cloned()
    }

    /// Replace a tweet's content, preserving id, author and the creation
    /// timestamp. Mention rows for newly resolved `@tokens` are appended;
    /// existing rows are never pruned, so repeated edits referencing the
    /// same user accumulate duplicate rows.
    pub async fn update_tweet(&self, id: &str, content: &str) -> Result<Tweet, StoreError> {
        let mut tables = self.inner.write().await;
        let tweet = tables
            .tweets
            .get_mut(id)
            .ok_or(StoreError::NotFound("tweet"))?;
        tweet.content = content.to_string();
        tweet.updated_at = Utc::now();
        let updated = tweet.clone();
        mentions::record_mentions(&mut tables, id, content);
        Ok(updated)
    }

    /// Remove a tweet and every mention row referencing it.
    pub async fn delete_tweet(&self, id: &str) -> Result<(), StoreError> {
        let mut tables = self.inner.write().await;
        tables
            .tweets
            .remove(id)
            .ok_or(StoreError::NotFound("tweet"))?;
        tables.mentions.retain(|m| m.tweet_id != id);
        debug!("deleted tweet {} and its mention rows", id);
        Ok(())
    }

    /// Every tweet joined with its author, newest first. Tweets whose
    /// author record is gone are excluded.
    pub async fn list_tweets(&self) -> Vec<TweetView> {
        let tables = self.inner.read().await;
        collect_views(&tables, tables.tweets.values())
    }

    /// A single user's tweets joined with the author, newest first.
    pub async fn tweets_by_user(&self, author_id: &str) -> Vec<TweetView> {
        let tables = self.inner.read().await;
        collect_views(
            &tables,
            tables
                .tweets
                .values()
                .filter(|t| t.author_id == author_id),
        )
    }

    /// The user's timeline: their own tweets plus any tweet whose
    /// extracted mention tokens resolve, by username lookup, to the user.
    /// Deduplicated by tweet id and sorted newest first.
    pub async fn timeline(&self, user_id: &str) -> Vec<TweetView> {
        let tables = self.inner.read().await;
        collect_views(
            &tables,
            tables.tweets.values().filter(|tweet| {
                if tweet.author_id == user_id {
                    return true;
                }
                parsing::extract_mention_tokens(&tweet.content)
                    .iter()
                    .any(|token| {
                        tables
                            .users
                            .values()
                            .any(|u| u.username == *token && u.id == user_id)
                    })
            }),
        )
    }
}
