//! Demo Data Seeding Script
//!
//! Seeds a running chirp server with a handful of demo users, tweets,
//! follows and engagements so the API has something to show. Point it at
//! a server with the `CHIRP_URL` environment variable (defaults to
//! `http://localhost:3000`).
//!
//! ```bash
//! cargo run --bin seed_demo
//! CHIRP_URL=http://localhost:8080 cargo run --bin seed_demo
//! ```

use serde_json::{json, Value};

/// Registers one user and returns their bearer token.
async fn register_user(
    client: &reqwest::Client,
    base_url: &str,
    username: &str,
    display_name: &str,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    println!("👤 Registering user @{}", username);

    let response = client
        .post(format!("{base_url}/auth/register"))
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "demo-password",
            "displayName": display_name,
        }))
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await?;
    if !status.is_success() {
        return Err(format!("registration of {username} failed ({status}): {body}").into());
    }

    let token = body["token"]
        .as_str()
        .ok_or("registration response did not include a token")?;
    Ok(token.to_string())
}

/// Posts one tweet as the given user.
async fn post_tweet(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    content: &str,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    println!("📝 Posting: {}", content);

    let response = client
        .post(format!("{base_url}/tweets"))
        .header("Authorization", format!("Bearer {token}"))
        .json(&json!({"content": content}))
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await?;
    if !status.is_success() {
        return Err(format!("tweet failed ({status}): {body}").into());
    }

    let id = body["tweet"]["id"]
        .as_str()
        .ok_or("tweet response did not include an id")?;
    Ok(id.to_string())
}

async fn follow(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    username: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    println!("➕ Following @{}", username);
    client
        .post(format!("{base_url}/users/{username}/follow"))
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

async fn like(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    tweet_id: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    println!("❤️  Liking tweet {}", tweet_id);
    client
        .post(format!("{base_url}/tweets/{tweet_id}/engagements"))
        .header("Authorization", format!("Bearer {token}"))
        .json(&json!({"type": "like"}))
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let base_url =
        std::env::var("CHIRP_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    println!("🌱 Seeding demo data into {}", base_url);

    let client = reqwest::Client::new();

    let alice = register_user(&client, &base_url, "alice", "Alice Adams").await?;
    let bob = register_user(&client, &base_url, "bob", "Bob Brown").await?;
    let carol = register_user(&client, &base_url, "carol", "Carol Chen").await?;

    follow(&client, &base_url, &bob, "alice").await?;
    follow(&client, &base_url, &carol, "alice").await?;
    follow(&client, &base_url, &alice, "bob").await?;

    let first = post_tweet(&client, &base_url, &alice, "Hello world, this is chirp!").await?;
    post_tweet(&client, &base_url, &bob, "Welcome aboard @alice 🎉").await?;
    let third = post_tweet(
        &client,
        &base_url,
        &carol,
        "Reading @alice and @bob while the coffee brews",
    )
    .await?;

    like(&client, &base_url, &bob, &first).await?;
    like(&client, &base_url, &carol, &first).await?;
    like(&client, &base_url, &alice, &third).await?;

    println!("✅ Demo data seeded successfully");
    println!("   Try: curl {base_url}/tweets");
    println!("   Try: curl {base_url}/users/alice/mentions");
    Ok(())
}
