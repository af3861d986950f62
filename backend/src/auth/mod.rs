//! Authentication module
//!
//! Argon2 password hashing, opaque API bearer tokens, cookie sessions and
//! signed password-reset tokens.

pub mod bearer;
mod middleware;
mod password;
pub mod reset;
pub mod session;

pub use middleware::{AuthUser, BasicAuth, SessionUser, LOGIN_PATH};
pub use password::PasswordService;
pub use reset::{ResetClaims, ResetTokenService};
