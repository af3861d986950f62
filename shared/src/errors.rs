//! Error types for the SchedulIt application

use thiserror::Error;

/// Authentication error types
///
/// Variants are coarse: an unknown username looks like a wrong password, and
/// an expired reset link looks like a forged one.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Reset token expired or tampered")]
    TokenExpiredOrTampered,
}
