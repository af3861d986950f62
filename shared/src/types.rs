//! API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

// ============================================================================
// Users
// ============================================================================

/// Hypermedia links attached to a user representation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub followers: String,
    pub followed: String,
    pub avatar: String,
}

/// User representation returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Only present when the caller is looking at their own record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub about_me: Option<String>,
    /// ISO-8601 UTC with a trailing `Z`
    pub last_seen: Option<String>,
    pub course_count: i64,
    pub follower_count: i64,
    pub followed_count: i64,
    #[serde(rename = "_links")]
    pub links: UserLinks,
}

/// Collection metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMeta {
    pub total: usize,
}

/// List of users (followers / followed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCollection {
    pub items: Vec<UserResponse>,
    #[serde(rename = "_meta")]
    pub meta: CollectionMeta,
}

/// `POST /api/users` body
///
/// Every field is optional at the wire level so that a missing field is
/// reported with a readable message instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub about_me: Option<String>,
}

/// `PUT /api/users/{id}` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub about_me: Option<String>,
}

/// `POST /api/tokens` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

// ============================================================================
// Courses
// ============================================================================

/// Course representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseResponse {
    pub id: i64,
    pub name: String,
    pub building: Option<String>,
    /// Time of day the course meets, `HH:MM:SS`
    pub meets_at: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub user_id: i64,
    pub author: String,
}

// ============================================================================
// Web forms
// ============================================================================

/// Query string accepted by the login page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Sign-in form
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    /// Checkbox value; absent when unchecked
    #[serde(default)]
    pub remember_me: Option<String>,
}

impl LoginForm {
    /// Whether the "remember me" box was ticked
    pub fn remember(&self) -> bool {
        matches!(
            self.remember_me.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("y" | "yes" | "on" | "true" | "1")
        )
    }
}

/// Registration form
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

/// "Forgot password" form
#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequestForm {
    pub email: String,
}

/// "Set new password" form
#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordForm {
    pub password: String,
    pub password2: String,
}

/// Add-course form
#[derive(Debug, Clone, Deserialize)]
pub struct AddCourseForm {
    pub course: String,
    pub building: String,
    #[serde(default)]
    pub time: Option<String>,
}

/// Profile edit form
#[derive(Debug, Clone, Deserialize)]
pub struct EditProfileForm {
    pub username: String,
    #[serde(default)]
    pub about_me: Option<String>,
}

/// Account deletion form; both fields must match the signed-in account
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteProfileForm {
    pub username: String,
    pub password: String,
}

// ============================================================================
// Pages
// ============================================================================

/// Home page: own schedule plus the followed feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomePage {
    pub user: UserResponse,
    pub courses: Vec<CourseResponse>,
    pub feed: Vec<CourseResponse>,
}

/// Profile page of any user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPage {
    pub user: UserResponse,
    pub courses: Vec<CourseResponse>,
    pub is_following: bool,
}

/// Explore page: every course, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorePage {
    pub courses: Vec<CourseResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(email: Option<String>) -> UserResponse {
        UserResponse {
            id: 7,
            username: "alice".to_string(),
            first_name: None,
            last_name: None,
            email,
            about_me: None,
            last_seen: Some("2024-01-15T12:29:19Z".to_string()),
            course_count: 0,
            follower_count: 2,
            followed_count: 1,
            links: UserLinks {
                self_link: "/api/users/7".to_string(),
                followers: "/api/users/7/followers".to_string(),
                followed: "/api/users/7/followed".to_string(),
                avatar: "https://www.gravatar.com/avatar/x?d=identicon&s=128".to_string(),
            },
        }
    }

    #[test]
    fn test_user_links_serialize_with_reserved_names() {
        let json = serde_json::to_value(sample_user(None)).unwrap();
        assert_eq!(json["_links"]["self"], "/api/users/7");
        assert_eq!(json["_links"]["followers"], "/api/users/7/followers");
        assert!(json.get("email").is_none());
    }

    #[test]
    fn test_email_included_when_present() {
        let json = serde_json::to_value(sample_user(Some("a@x.com".into()))).unwrap();
        assert_eq!(json["email"], "a@x.com");
    }

    #[test]
    fn test_remember_me_checkbox_values() {
        let mut form = LoginForm {
            username: "alice".into(),
            password: "pw".into(),
            remember_me: None,
        };
        assert!(!form.remember());
        form.remember_me = Some("y".into());
        assert!(form.remember());
        form.remember_me = Some("ON".into());
        assert!(form.remember());
        form.remember_me = Some("false".into());
        assert!(!form.remember());
    }
}
