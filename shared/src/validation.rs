//! Input validation functions
//!
//! Field limits mirror the column widths in the backend migrations.

use chrono::NaiveTime;
use validator::ValidateEmail;

pub const MAX_USERNAME_LEN: usize = 64;
pub const MAX_EMAIL_LEN: usize = 120;
pub const MAX_FIRST_NAME_LEN: usize = 64;
pub const MAX_LAST_NAME_LEN: usize = 100;
pub const MAX_ABOUT_ME_LEN: usize = 150;
pub const MAX_COURSE_NAME_LEN: usize = 100;
pub const MAX_BUILDING_LEN: usize = 50;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err("Email too long".to_string());
    }
    if !email.validate_email() {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate a username
///
/// Usernames appear in page URLs, so whitespace and slashes are refused.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err("Username too long".to_string());
    }
    let allowed = regex_lite::Regex::new(r"^[A-Za-z0-9_.\-]+$")
        .map(|re| re.is_match(username))
        .unwrap_or(false);
    if !allowed {
        return Err(
            "Username may only contain letters, digits, '.', '-' and '_'".to_string(),
        );
    }
    Ok(())
}

/// Validate a password
///
/// No complexity policy, only presence and an upper bound for the hasher.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password cannot be empty".to_string());
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate that the repeated password matches
pub fn validate_password_confirmation(password: &str, password2: &str) -> Result<(), String> {
    if password != password2 {
        return Err("Passwords must match".to_string());
    }
    Ok(())
}

/// Validate a first or last name
pub fn validate_name(field: &str, value: &str, max_len: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    if value.chars().count() > max_len {
        return Err(format!("{} too long", field));
    }
    Ok(())
}

/// Validate the free-text "about me"
pub fn validate_about_me(about_me: &str) -> Result<(), String> {
    if about_me.chars().count() > MAX_ABOUT_ME_LEN {
        return Err(format!(
            "About me must be at most {} characters",
            MAX_ABOUT_ME_LEN
        ));
    }
    Ok(())
}

/// Validate a course title
pub fn validate_course_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Course cannot be empty".to_string());
    }
    if name.chars().count() > MAX_COURSE_NAME_LEN {
        return Err("Course name too long".to_string());
    }
    Ok(())
}

/// Validate a building
pub fn validate_building(building: &str) -> Result<(), String> {
    if building.trim().is_empty() {
        return Err("Building cannot be empty".to_string());
    }
    if building.chars().count() > MAX_BUILDING_LEN {
        return Err("Building name too long".to_string());
    }
    Ok(())
}

/// Parse the optional course meeting time (`HH:MM` or `HH:MM:SS`)
///
/// A blank value means "no time given".
pub fn parse_meeting_time(value: Option<&str>) -> Result<Option<NaiveTime>, String> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map(Some)
        .map_err(|_| "Course time must look like HH:MM or HH:MM:SS".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("alice@x.com")]
    #[case("first.last@example.co.uk")]
    #[case("a+tag@sub.example.org")]
    fn test_valid_emails(#[case] email: &str) {
        assert!(validate_email(email).is_ok(), "{} should be valid", email);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("not-an-email")]
    #[case("missing@")]
    #[case("@missing.com")]
    fn test_invalid_emails(#[case] email: &str) {
        assert!(validate_email(email).is_err(), "{:?} should be invalid", email);
    }

    #[rstest]
    #[case("alice", true)]
    #[case("bob_99", true)]
    #[case("j.doe-2", true)]
    #[case("", false)]
    #[case("has space", false)]
    #[case("slash/name", false)]
    fn test_username_rules(#[case] username: &str, #[case] ok: bool) {
        assert_eq!(validate_username(username).is_ok(), ok, "{:?}", username);
    }

    #[test]
    fn test_username_too_long() {
        let name = "a".repeat(MAX_USERNAME_LEN + 1);
        assert!(validate_username(&name).is_err());
    }

    #[test]
    fn test_password_confirmation() {
        assert!(validate_password_confirmation("pw123", "pw123").is_ok());
        assert!(validate_password_confirmation("pw123", "pw124").is_err());
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(validate_password("").is_err());
        assert!(validate_password("pw123").is_ok());
    }

    #[rstest]
    #[case(Some("09:30"), Some((9, 30, 0)))]
    #[case(Some("14:05:59"), Some((14, 5, 59)))]
    #[case(Some("  "), None)]
    #[case(None, None)]
    fn test_parse_meeting_time(#[case] raw: Option<&str>, #[case] expected: Option<(u32, u32, u32)>) {
        let parsed = parse_meeting_time(raw).unwrap();
        let expected = expected.map(|(h, m, s)| NaiveTime::from_hms_opt(h, m, s).unwrap());
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_meeting_time_rejects_garbage() {
        assert!(parse_meeting_time(Some("noon")).is_err());
        assert!(parse_meeting_time(Some("25:00")).is_err());
    }

    proptest! {
        #[test]
        fn prop_about_me_length_boundary(len in 0usize..=300) {
            let text: String = "x".repeat(len);
            prop_assert_eq!(validate_about_me(&text).is_ok(), len <= MAX_ABOUT_ME_LEN);
        }

        #[test]
        fn prop_password_length_valid(len in 1usize..=MAX_PASSWORD_LEN) {
            let password: String = (0..len).map(|_| 'a').collect();
            prop_assert!(validate_password(&password).is_ok());
        }

        #[test]
        fn prop_course_name_length(len in 1usize..=200) {
            let name: String = "c".repeat(len);
            prop_assert_eq!(validate_course_name(&name).is_ok(), len <= MAX_COURSE_NAME_LEN);
        }

        #[test]
        fn prop_valid_meeting_times(h in 0u32..24, m in 0u32..60) {
            let raw = format!("{:02}:{:02}", h, m);
            let parsed = parse_meeting_time(Some(&raw)).unwrap();
            prop_assert_eq!(parsed, NaiveTime::from_hms_opt(h, m, 0));
        }
    }
}
