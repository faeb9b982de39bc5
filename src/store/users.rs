//! Identity store: user records and keyed lookups.
//!
//! The store itself does not enforce username/email uniqueness — duplicate
//! detection is the caller's responsibility (the register handler checks
//! before creating). This mirrors the split between validation and storage
//! used throughout the service: invalid input never reaches the store.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{follows, Store, Tables};

/// A registered user record.
///
/// This is the internal representation and deliberately does not implement
/// `Serialize`: the credential hash must never appear in an outward-facing
/// projection, so handlers go through [`UserProfile`] instead.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub avatar_url: String,
    pub bio: Option<String>,
    pub verified: bool,
    pub private: bool,
    /// Mutated only by follow-graph operations.
    pub follower_count: u32,
    /// Mutated only by follow-graph operations.
    pub following_count: u32,
    /// Reserved; no in-scope operation maintains it.
    pub tweet_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Reserved for soft deletion; always `None` in the current scope.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Validated draft for creating a user. Built by the register handler
/// after uniqueness and format checks have passed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
}

/// Outward-facing projection of a user.
///
/// `is_following`/`is_followed_by` are present only when the profile was
/// projected for a viewer other than the subject.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: String,
    pub bio: Option<String>,
    pub verified: bool,
    pub private: bool,
    pub follower_count: u32,
    pub following_count: u32,
    pub tweet_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_following: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_followed_by: Option<bool>,
}

/// Build the projection for `subject` as seen by `viewer`.
///
/// The relationship booleans are computed against the follow table when the
/// viewer is a different user; a missing or identical viewer leaves them out.
pub(crate) fn project_profile(
    tables: &Tables,
    subject: &User,
    viewer: Option<&str>,
) -> UserProfile {
    let (is_following, is_followed_by) = match viewer {
        Some(viewer_id) if viewer_id != subject.id => (
            Some(follows::edge_exists(tables, viewer_id, &subject.id)),
            Some(follows::edge_exists(tables, &subject.id, viewer_id)),
        ),
        _ => (None, None),
    };

    UserProfile {
        id: subject.id.clone(),
        username: subject.username.clone(),
        email: subject.email.clone(),
        display_name: subject.display_name.clone(),
        avatar_url: subject.avatar_url.clone(),
        bio: subject.bio.clone(),
        verified: subject.verified,
        private: subject.private,
        follower_count: subject.follower_count,
        following_count: subject.following_count,
        tweet_count: subject.tweet_count,
        created_at: subject.created_at,
        updated_at: subject.updated_at,
        is_following,
        is_followed_by,
    }
}

impl Store {
    /// Insert a new user record with a generated id, default avatar, zero
    /// counters and fresh timestamps.
    ///
    /// Uniqueness of username/email is not checked here; callers are
    /// expected to have done so.
    pub async fn create_user(&self, draft: NewUser) -> User {
        let now = Utc::now();
        let avatar_url = format!(
            "https://ui-avatars.com/api/?name={}",
            draft.username
        );
        let user = User {
            id: Self::next_id(),
            username: draft.username,
            email: draft.email,
            password_hash: draft.password_hash,
            display_name: draft.display_name,
            avatar_url,
            bio: None,
            verified: false,
            private: false,
            follower_count: 0,
            following_count: 0,
            tweet_count: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let mut tables = self.inner.write().await;
        tables.users.insert(user.id.clone(), user.clone());
        user
    }

    /// Look up a user by id.
    pub async fn user_by_id(&self, id: &str) -> Option<User> {
        self.inner.read().await.users.get(id).cloned()
    }

    /// Look up a user by exact username.
    pub async fn user_by_username(&self, username: &str) -> Option<User> {
        let tables = self.inner.read().await;
        tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
    }

    /// Look up a user by exact email.
    pub async fn user_by_email(&self, email: &str) -> Option<User> {
        let tables = self.inner.read().await;
        tables.users.values().find(|u| u.email == email).cloned()
    }

    /// Look up a user by username or email, whichever matches first.
    /// Used by login, where the client supplies a single identifier field.
    pub async fn user_by_username_or_email(&self, identifier: &str) -> Option<User> {
        let tables = self.inner.read().await;
        tables
            .users
            .values()
            .find(|u| u.username == identifier || u.email == identifier)
            .cloned()
    }

    /// Project the profile of `subject_id` as seen by `viewer_id`.
    ///
    /// Returns `None` when the subject does not exist.
    pub async fn profile(&self, subject_id: &str, viewer_id: Option<&str>) -> Option<UserProfile> {
        let tables = self.inner.read().await;
        let subject = tables.users.get(subject_id)?;
        Some(project_profile(&tables, subject, viewer_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(username: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: format!("{username}@example.com"),
            password_hash: "salt:key".into(),
            display_name: username.to_uppercase(),
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_equal_record() {
        let store = Store::new();
        let created = store.create_user(draft("alice")).await;

        let fetched = store.user_by_id(&created.id).await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.username, "alice");
        assert_eq!(fetched.email, "alice@example.com");
        assert_eq!(fetched.password_hash, "salt:key");
        assert_eq!(fetched.display_name, "ALICE");
        assert_eq!(fetched.follower_count, 0);
        assert_eq!(fetched.following_count, 0);
        assert_eq!(fetched.tweet_count, 0);
        assert_eq!(fetched.created_at, created.created_at);
        assert!(fetched.deleted_at.is_none());
        assert!(!fetched.verified);
        assert!(!fetched.private);
    }

    #[tokio::test]
    async fn lookups_return_none_for_unregistered_strings() {
        let store = Store::new();
        store.create_user(draft("alice")).await;

        assert!(store.user_by_username("bob").await.is_none());
        assert!(store.user_by_email("bob@example.com").await.is_none());
        assert!(store.user_by_username_or_email("nobody").await.is_none());
        assert!(store.user_by_id("missing-id").await.is_none());
    }

    #[tokio::test]
    async fn username_or_email_matches_either_field() {
        let store = Store::new();
        let created = store.create_user(draft("alice")).await;

        let by_name = store.user_by_username_or_email("alice").await.unwrap();
        let by_mail = store
            .user_by_username_or_email("alice@example.com")
            .await
            .unwrap();
        assert_eq!(by_name.id, created.id);
        assert_eq!(by_mail.id, created.id);
    }

    #[tokio::test]
    async fn profile_omits_relationship_flags_for_self_and_anonymous() {
        let store = Store::new();
        let alice = store.create_user(draft("alice")).await;

        let anonymous = store.profile(&alice.id, None).await.unwrap();
        assert!(anonymous.is_following.is_none());
        assert!(anonymous.is_followed_by.is_none());

        let own = store.profile(&alice.id, Some(&alice.id)).await.unwrap();
        assert!(own.is_following.is_none());
        assert!(own.is_followed_by.is_none());
    }

    #[tokio::test]
    async fn profile_computes_relationship_flags_for_other_viewers() {
        let store = Store::new();
        let alice = store.create_user(draft("alice")).await;
        let bob = store.create_user(draft("bob")).await;
        store.follow(&alice.id, &bob.id).await.unwrap();

        let bob_seen_by_alice = store.profile(&bob.id, Some(&alice.id)).await.unwrap();
        assert_eq!(bob_seen_by_alice.is_following, Some(true));
        assert_eq!(bob_seen_by_alice.is_followed_by, Some(false));

        let alice_seen_by_bob = store.profile(&alice.id, Some(&bob.id)).await.unwrap();
        assert_eq!(alice_seen_by_bob.is_following, Some(false));
        assert_eq!(alice_seen_by_bob.is_followed_by, Some(true));
    }
}
