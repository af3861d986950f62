//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod course;
pub mod follow;
pub mod session;
pub mod user;

pub use course::{CourseRecord, CourseRepository, CreateCourse};
pub use follow::FollowRepository;
pub use session::{SessionRecord, SessionRepository};
pub use user::{CreateUser, TokenRow, UpdateUser, UserRecord, UserRepository, UserStats};
