//! Opaque API bearer tokens
//!
//! Tokens are 24 bytes from the OS RNG, URL-safe base64 without padding,
//! which always yields 32 characters.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};

/// Random bytes per token
pub const TOKEN_BYTES: usize = 24;

/// Encoded token length
pub const TOKEN_LEN: usize = 32;

/// Mint a new random token
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Whether a presented string could be a token we issued
///
/// Lets obviously bogus credentials be refused without a database lookup.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Whether an existing token may be handed out again instead of rotated
///
/// True only when it expires strictly more than `window_secs` after `now`.
pub fn can_reuse(expiration: Option<DateTime<Utc>>, now: DateTime<Utc>, window_secs: i64) -> bool {
    expiration.is_some_and(|exp| exp > now + Duration::seconds(window_secs))
}

/// Whether a token with this expiration still authenticates at `now`
pub fn is_live(expiration: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expiration.is_some_and(|exp| exp > now)
}

/// Expiration that revokes a token immediately
pub fn revoked_expiration(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::seconds(1)
}
