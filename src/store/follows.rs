//! Social graph store: follow edges and the derived counters.
//!
//! Creating or removing an edge adjusts both endpoints' counters inside the
//! same write-lock acquisition, so the pair of counter updates is never
//! observed half-applied. Decrements floor at zero.

use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;

use crate::error::StoreError;

use super::users::{project_profile, UserProfile};
use super::{Store, Tables};

/// A directed follow edge from `follower_id` to `following_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub id: String,
    pub follower_id: String,
    pub following_id: String,
    pub created_at: DateTime<Utc>,
}

/// Whether an edge from `follower_id` to `following_id` exists.
pub(crate) fn edge_exists(tables: &Tables, follower_id: &str, following_id: &str) -> bool {
    tables
        .follows
        .iter()
        .any(|f| f.follower_id == follower_id && f.following_id == following_id)
}

impl Store {
    /// Create a follow edge and increment both counters.
    ///
    /// Fails with [`StoreError::SelfFollow`] when the two ids are equal and
    /// with [`StoreError::AlreadyFollowing`] when the edge already exists;
    /// in both cases nothing is written.
    pub async fn follow(&self, follower_id: &str, following_id: &str) -> Result<Follow, StoreError> {
        if follower_id == following_id {
            return Err(StoreError::SelfFollow);
        }

        let mut tables = self.inner.write().await;
        if edge_exists(&tables, follower_id, following_id) {
            return Err(StoreError::AlreadyFollowing);
        }

        let edge = Follow {
            id: Self::next_id(),
            follower_id: follower_id.to_string(),
            following_id: following_id.to_string(),
            created_at: Utc::now(),
        };
        tables.follows.push(edge.clone());

        if let Some(follower) = tables.users.get_mut(follower_id) {
            follower.following_count += 1;
        }
        if let Some(followed) = tables.users.get_mut(following_id) {
            followed.follower_count += 1;
        }

        debug!("{} now follows {}", follower_id, following_id);
        Ok(edge)
    }

    /// Remove a follow edge and decrement both counters, floored at zero.
    ///
    /// Fails with [`StoreError::NotFollowing`] when no edge exists; nothing
    /// is written in that case.
    pub async fn unfollow(&self, follower_id: &str, following_id: &str) -> Result<(), StoreError> {
        let mut tables = self.inner.write().await;
        let position = tables
            .follows
            .iter()
            .position(|f| f.follower_id == follower_id && f.following_id == following_id)
            .ok_or(StoreError::NotFollowing)?;
        tables.follows.remove(position);

        if let Some(follower) = tables.users.get_mut(follower_id) {
            follower.following_count = follower.following_count.saturating_sub(1);
        }
        if let Some(followed) = tables.users.get_mut(following_id) {
            followed.follower_count = followed.follower_count.saturating_sub(1);
        }

        debug!("{} unfollowed {}", follower_id, following_id);
        Ok(())
    }

    /// Whether `follower_id` currently follows `following_id`.
    pub async fn is_following(&self, follower_id: &str, following_id: &str) -> bool {
        edge_exists(&*self.inner.read().await, follower_id, following_id)
    }

    /// Profile projections for every user following `user_id`, from the
    /// subject's viewpoint.
    pub async fn followers(&self, user_id: &str) -> Vec<UserProfile> {
        let tables = self.inner.read().await;
        tables
            .follows
            .iter()
            .filter(|f| f.following_id == user_id)
            .filter_map(|f| tables.users.get(&f.follower_id))
            .map(|user| project_profile(&tables, user, Some(user_id)))
            .collect()
    }

    /// Profile projections for every user that `user_id` follows, from the
    /// subject's viewpoint.
    pub async fn following(&self, user_id: &str) -> Vec<UserProfile> {
        let tables = self.inner.read().await;
        tables
            .follows
            .iter()
            .filter(|f| f.follower_id == user_id)
            .filter_map(|f| tables.users.get(&f.following_id))
            .map(|user| project_profile(&tables, user, Some(user_id)))
            .collect()
    }
}
