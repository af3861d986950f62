//! Login session cookies
//!
//! The cookie carries only an opaque random id; the session itself (owner,
//! expiry) lives in the `sessions` table.

use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};

use crate::config::AuthConfig;

const SESSION_ID_BYTES: usize = 32;

/// Mint a new random session id
pub fn new_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Server-side expiry for a session created at `now`
pub fn session_expiry(config: &AuthConfig, remember: bool, now: DateTime<Utc>) -> DateTime<Utc> {
    let ttl = if remember {
        config.remember_ttl_secs
    } else {
        config.session_ttl_secs
    };
    now + Duration::seconds(ttl)
}

/// Cookie carrying a session id
///
/// "Remember me" sessions get a persistent cookie; others end with the
/// browser session.
pub fn session_cookie(config: &AuthConfig, session_id: &str, remember: bool) -> Cookie<'static> {
    let mut builder = Cookie::build((config.session_cookie.clone(), session_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies);
    if remember {
        builder = builder.max_age(time::Duration::seconds(config.remember_ttl_secs));
    }
    builder.build()
}

/// Cookie that clears the session cookie in the browser
pub fn removal_cookie(config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((config.session_cookie.clone(), String::new()))
        .path("/")
        .build()
}

/// Redirect target after login
///
/// Only local paths are honoured so the login form cannot be used as an open
/// redirect. Control characters are refused since they cannot go into a
/// `Location` header.
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_session_ids_are_random() {
        let a = new_session_id();
        let b = new_session_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
    }

    #[test]
    fn test_remember_me_extends_expiry() {
        let config = AppConfig::default().auth;
        let now = Utc::now();
        let short = session_expiry(&config, false, now);
        let long = session_expiry(&config, true, now);
        assert_eq!(short, now + Duration::seconds(config.session_ttl_secs));
        assert_eq!(long, now + Duration::seconds(config.remember_ttl_secs));
        assert!(long > short);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let config = AppConfig::default().auth;

        let cookie = session_cookie(&config, "abc", false);
        assert_eq!(cookie.name(), "schedulit_session");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert!(cookie.max_age().is_none());

        let remembered = session_cookie(&config, "abc", true);
        assert_eq!(
            remembered.max_age(),
            Some(time::Duration::seconds(config.remember_ttl_secs))
        );
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(None), "/");
        assert_eq!(safe_next(Some("/explore")), "/explore");
        assert_eq!(safe_next(Some("https://evil.example/")), "/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(Some("")), "/");
        assert_eq!(safe_next(Some("/\n")), "/");
        assert_eq!(safe_next(Some("/\t/evil")), "/");
        assert_eq!(safe_next(Some("/a\r\nSet-Cookie: x=1")), "/");
    }

    #[test]
    fn test_safe_next_always_yields_a_valid_header_value() {
        for next in ["/\n", "/\u{7f}", "/ok?x=1", "/\u{0}"] {
            let target = safe_next(Some(next));
            assert!(axum::http::HeaderValue::from_str(&target).is_ok(), "{:?}", next);
        }
    }
}
