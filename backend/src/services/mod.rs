//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and external systems.

pub mod course;
pub mod feed;
pub mod mail;
pub mod password_reset;
pub mod session;
pub mod token;
pub mod user;

pub use course::CourseService;
pub use feed::FeedService;
pub use mail::{LogMailer, Mailer, MemoryMailer};
pub use password_reset::PasswordResetService;
pub use session::SessionService;
pub use token::TokenService;
pub use user::UserService;
