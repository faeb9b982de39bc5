//! Text parsing utilities for tweet content.
//!
//! This module contains the `@mention` token scanner used both for the
//! display mention list on joined tweets and for resolving mention rows
//! at tweet create/update time.

use regex::Regex;

/// Extracts every `@token` from tweet text, in order of appearance.
///
/// Tokens are the word characters following an `@` sign. The returned list
/// is the raw scan result: it is not deduplicated and not checked against
/// registered usernames — resolution against the identity store happens at
/// the call sites that need it.
///
/// # Parameters
///
/// - `text`: The tweet content to scan
///
/// # Returns
///
/// The extracted tokens without their `@` prefix, possibly empty.
pub(crate) fn extract_mention_tokens(text: &str) -> Vec<String> {
    let re = match Regex::new(r"@(\w+)") {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };

    re.captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}
