//! HTTP route handlers for the chirp service.
//!
//! Handlers own request validation and authentication: JSON bodies are
//! checked here and invalid input never reaches the store, matching the
//! store's contract. Each handler resolves its inputs, invokes one or
//! more store operations and shapes the JSON response.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{delete, get, post, put};
use axum::Router;
use log::{info, warn};
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{issue_token, optional_user, require_user};
use crate::config::AuthConfig;
use crate::error::ApiError;
use crate::password::{hash_password, verify_password};
use crate::store::{EngagementKind, NewUser, Store, Tweet, User, UserProfile};

/// Shared application state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub auth: AuthConfig,
}

/// Build the application router with every route, request tracing and a
/// permissive CORS layer.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/auth/register", post(handle_register))
        .route("/auth/login", post(handle_login))
        .route("/auth/me", get(handle_me))
        .route("/tweets", get(handle_list_tweets))
        .route("/tweets", post(handle_create_tweet))
        .route("/tweets/:id", get(handle_get_tweet))
        .route("/tweets/:id", put(handle_update_tweet))
        .route("/tweets/:id", delete(handle_delete_tweet))
        .route("/tweets/:id/mentions", get(handle_tweet_mentions))
        .route("/tweets/:id/stats", get(handle_tweet_stats))
        .route("/tweets/:id/engagements", get(handle_user_engagement))
        .route("/tweets/:id/engagements", post(handle_engage))
        .route(
            "/tweets/:id/engagements/:kind",
            delete(handle_remove_engagement),
        )
        .route("/users/:username", get(handle_get_profile))
        .route("/users/:username/tweets", get(handle_user_tweets))
        .route("/users/:username/mentions", get(handle_user_mentions))
        .route("/users/:username/followers", get(handle_followers))
        .route("/users/:username/following", get(handle_following))
        .route("/users/:username/follow", post(handle_follow))
        .route("/users/:username/follow", delete(handle_unfollow))
        .route("/timeline", get(handle_timeline))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email address.
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TweetRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct EngageRequest {
    #[serde(rename = "type")]
    pub kind: EngagementKind,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Usernames are 1-15 word characters, the same class the mention scanner
/// recognizes after an `@`.
fn validate_username(username: &str) -> Result<(), ApiError> {
    let valid = Regex::new(r"^\w{1,15}$")
        .map(|re| re.is_match(username))
        .unwrap_or(false);
    if valid {
        Ok(())
    } else {
        Err(ApiError::bad_request(
            "username must be 1-15 letters, digits or underscores",
        ))
    }
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ApiError::bad_request("email address is not valid")),
    }
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() >= 8 {
        Ok(())
    } else {
        Err(ApiError::bad_request(
            "password must be at least 8 characters",
        ))
    }
}

fn validate_content(content: &str) -> Result<(), ApiError> {
    let length = content.chars().count();
    if length == 0 {
        Err(ApiError::bad_request("tweet content must not be empty"))
    } else if length > 280 {
        Err(ApiError::bad_request(
            "tweet content must be at most 280 characters",
        ))
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Shared lookups
// ---------------------------------------------------------------------------

async fn user_by_username_or_404(store: &Store, username: &str) -> Result<User, ApiError> {
    store
        .user_by_username(username)
        .await
        .ok_or_else(|| ApiError::not_found("user not found"))
}

async fn tweet_or_404(store: &Store, id: &str) -> Result<Tweet, ApiError> {
    store
        .tweet_by_id(id)
        .await
        .ok_or_else(|| ApiError::not_found("tweet not found"))
}

/// Fetch a tweet and ensure the caller authored it.
async fn owned_tweet(store: &Store, id: &str, caller: &User) -> Result<Tweet, ApiError> {
    let tweet = tweet_or_404(store, id).await?;
    if tweet.author_id != caller.id {
        warn!(
            "user {} attempted to modify tweet {} owned by {}",
            caller.id, id, tweet.author_id
        );
        return Err(ApiError::forbidden("only the author can modify this tweet"));
    }
    Ok(tweet)
}

async fn profile_of(
    store: &Store,
    user: &User,
    viewer: Option<&str>,
) -> Result<UserProfile, ApiError> {
    // The subject was just looked up, so the projection should always exist.
    store
        .profile(&user.id, viewer)
        .await
        .ok_or_else(|| ApiError::internal("user record disappeared"))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Handles GET requests to the `/health` endpoint.
///
/// # Returns
///
/// A JSON response containing:
/// - `status`: Always "healthy" when the service is running
/// - `service`: The service name "chirp"
pub async fn handle_health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "chirp"}))
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Handles POST requests to `/auth/register`.
///
/// Validates the draft, rejects duplicate usernames/emails with 409, then
/// creates the user and issues a bearer token.
pub async fn handle_register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    validate_username(&body.username)?;
    validate_email(&body.email)?;
    validate_password(&body.password)?;

    // Uniqueness lives here, not in the store.
    if state.store.user_by_username(&body.username).await.is_some() {
        return Err(ApiError::conflict("username is already taken"));
    }
    if state.store.user_by_email(&body.email).await.is_some() {
        return Err(ApiError::conflict("email is already registered"));
    }

    let password_hash = hash_password(&body.password)?;
    let display_name = body
        .display_name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| body.username.clone());

    let user = state
        .store
        .create_user(NewUser {
            username: body.username,
            email: body.email,
            password_hash,
            display_name,
        })
        .await;
    let token = issue_token(&state.auth, &user.id)?;
    info!("registered user {} ({})", user.username, user.id);

    let profile = profile_of(&state.store, &user, None).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"status": "success", "user": profile, "token": token})),
    ))
}

/// Handles POST requests to `/auth/login`.
///
/// Accepts a username or email as the identifier. Unknown identifiers and
/// wrong passwords produce the same 401 response.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .store
        .user_by_username_or_email(&body.identifier)
        .await
        .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;

    if !verify_password(&user.password_hash, &body.password)? {
        warn!("failed login attempt for {}", user.username);
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    let token = issue_token(&state.auth, &user.id)?;
    info!("user {} logged in", user.username);

    let profile = profile_of(&state.store, &user, None).await?;
    Ok(Json(
        json!({"status": "success", "user": profile, "token": token}),
    ))
}

/// Handles GET requests to `/auth/me`: the caller's own profile.
pub async fn handle_me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, ApiError> {
    let caller = require_user(&state.store, &state.auth, &headers).await?;
    Ok(Json(profile_of(&state.store, &caller, None).await?))
}

// ---------------------------------------------------------------------------
// Tweets
// ---------------------------------------------------------------------------

/// Handles GET requests to `/tweets`: every tweet joined with its author,
/// newest first.
pub async fn handle_list_tweets(State(state): State<AppState>) -> Json<Value> {
    let tweets = state.store.list_tweets().await;
    Json(json!(tweets))
}

/// Handles POST requests to `/tweets`.
pub async fn handle_create_tweet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<TweetRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let caller = require_user(&state.store, &state.auth, &headers).await?;
    validate_content(&body.content)?;

    let tweet = state.store.create_tweet(&caller.id, &body.content).await;
    info!("user {} posted tweet {}", caller.username, tweet.id);
    Ok((
        StatusCode::CREATED,
        Json(json!({"status": "success", "tweet": tweet})),
    ))
}

/// Handles GET requests to `/tweets/:id`.
pub async fn handle_get_tweet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Tweet>, ApiError> {
    Ok(Json(tweet_or_404(&state.store, &id).await?))
}

/// Handles PUT requests to `/tweets/:id`: author-only content edit.
pub async fn handle_update_tweet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<TweetRequest>,
) -> Result<Json<Value>, ApiError> {
    let caller = require_user(&state.store, &state.auth, &headers).await?;
    validate_content(&body.content)?;
    owned_tweet(&state.store, &id, &caller).await?;

    let tweet = state.store.update_tweet(&id, &body.content).await?;
    Ok(Json(json!({"status": "success", "tweet": tweet})))
}

/// Handles DELETE requests to `/tweets/:id`: author-only, cascades the
/// tweet's mention rows.
pub async fn handle_delete_tweet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let caller = require_user(&state.store, &state.auth, &headers).await?;
    owned_tweet(&state.store, &id, &caller).await?;

    state.store.delete_tweet(&id).await?;
    info!("user {} deleted tweet {}", caller.username, id);
    Ok(Json(json!({"status": "success", "message": "tweet deleted"})))
}

/// Handles GET requests to `/tweets/:id/mentions`: the users mentioned by
/// the tweet, one entry per mention row.
pub async fn handle_tweet_mentions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    tweet_or_404(&state.store, &id).await?;
    let users = state.store.users_mentioned_in(&id).await;
    Ok(Json(json!(users)))
}

/// Handles GET requests to `/tweets/:id/stats`.
pub async fn handle_tweet_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.store.tweet_stats(&id).await {
        Some(stats) => Ok(Json(json!(stats))),
        None => Err(ApiError::not_found("no stats recorded for this tweet")),
    }
}

// ---------------------------------------------------------------------------
// Engagements
// ---------------------------------------------------------------------------

/// Handles POST requests to `/tweets/:id/engagements`.
pub async fn handle_engage(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<EngageRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let caller = require_user(&state.store, &state.auth, &headers).await?;
    tweet_or_404(&state.store, &id).await?;

    let engagement = state.store.engage(&caller.id, &id, body.kind).await?;
    info!(
        "user {} {}d tweet {}",
        caller.username,
        body.kind.as_str(),
        id
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({"status": "success", "engagement": engagement})),
    ))
}

/// Handles DELETE requests to `/tweets/:id/engagements/:kind`.
pub async fn handle_remove_engagement(
    State(state): State<AppState>,
    Path((id, kind)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let caller = require_user(&state.store, &state.auth, &headers).await?;
    let kind: EngagementKind = kind.parse().map_err(ApiError::bad_request)?;

    state.store.remove_engagement(&caller.id, &id, kind).await?;
    Ok(Json(
        json!({"status": "success", "message": "engagement removed"}),
    ))
}

/// Handles GET requests to `/tweets/:id/engagements`: the caller's own
/// engagement rows for the tweet.
pub async fn handle_user_engagement(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let caller = require_user(&state.store, &state.auth, &headers).await?;
    tweet_or_404(&state.store, &id).await?;
    let rows = state.store.user_engagement(&caller.id, &id).await;
    Ok(Json(json!(rows)))
}

// ---------------------------------------------------------------------------
// Users and the social graph
// ---------------------------------------------------------------------------

/// Handles GET requests to `/users/:username`.
///
/// When the request carries a usable bearer token for a different user,
/// the projection includes the isFollowing/isFollowedBy booleans.
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, ApiError> {
    let subject = user_by_username_or_404(&state.store, &username).await?;
    let viewer = optional_user(&state.store, &state.auth, &headers).await;
    Ok(Json(
        profile_of(&state.store, &subject, viewer.as_ref().map(|u| u.id.as_str())).await?,
    ))
}

/// Handles GET requests to `/users/:username/tweets`.
pub async fn handle_user_tweets(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let subject = user_by_username_or_404(&state.store, &username).await?;
    let tweets = state.store.tweets_by_user(&subject.id).await;
    Ok(Json(json!(tweets)))
}

/// Handles GET requests to `/users/:username/mentions`: tweets mentioning
/// the user, via the mention index.
pub async fn handle_user_mentions(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let subject = user_by_username_or_404(&state.store, &username).await?;
    let tweets = state.store.tweets_mentioning(&subject.id).await;
    Ok(Json(json!(tweets)))
}

/// Handles GET requests to `/users/:username/followers`.
pub async fn handle_followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let subject = user_by_username_or_404(&state.store, &username).await?;
    let followers = state.store.followers(&subject.id).await;
    Ok(Json(json!(followers)))
}

/// Handles GET requests to `/users/:username/following`.
pub async fn handle_following(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let subject = user_by_username_or_404(&state.store, &username).await?;
    let following = state.store.following(&subject.id).await;
    Ok(Json(json!(following)))
}

/// Handles POST requests to `/users/:username/follow`.
pub async fn handle_follow(
    State(state): State<AppState>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let caller = require_user(&state.store, &state.auth, &headers).await?;
    let target = user_by_username_or_404(&state.store, &username).await?;

    state.store.follow(&caller.id, &target.id).await?;
    info!("user {} followed {}", caller.username, target.username);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": format!("now following {}", target.username)
        })),
    ))
}

/// Handles DELETE requests to `/users/:username/follow`.
pub async fn handle_unfollow(
    State(state): State<AppState>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let caller = require_user(&state.store, &state.auth, &headers).await?;
    let target = user_by_username_or_404(&state.store, &username).await?;

    state.store.unfollow(&caller.id, &target.id).await?;
    info!("user {} unfollowed {}", caller.username, target.username);
    Ok(Json(json!({
        "status": "success",
        "message": format!("no longer following {}", target.username)
    })))
}

/// Handles GET requests to `/timeline`: the caller's own tweets plus
/// tweets mentioning them, newest first.
pub async fn handle_timeline(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let caller = require_user(&state.store, &state.auth, &headers).await?;
    let tweets = state.store.timeline(&caller.id).await;
    Ok(Json(json!(tweets)))
}
