//! Pure validation rules for user-supplied text.

use crate::error::ValidationError;

/// Maximum topics a user may create per calendar day.
pub const DAILY_TOPIC_LIMIT: i32 = 5;

/// Length bounds for topic bodies after normalization.
pub const TOPIC_MIN: usize = 2;
/// Upper bound for topic bodies.
pub const TOPIC_MAX: usize = 2000;
/// Lower bound for reply bodies.
pub const REPLY_MIN: usize = 2;
/// Upper bound for reply bodies.
pub const REPLY_MAX: usize = 1000;
/// Lower bound for display names.
pub const USERNAME_MIN: usize = 3;
/// Upper bound for display names.
pub const USERNAME_MAX: usize = 12;

/// Collapse interior whitespace runs to single spaces and trim the ends.
///
/// Applied to every free-text body before length checks and storage so the
/// bounds operate on visible content rather than padding.
#[must_use]
pub fn normalise(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_gap = false;
    for c in text.trim().chars() {
        if c.is_whitespace() {
            in_gap = true;
        } else {
            if in_gap && !out.is_empty() {
                out.push(' ');
            }
            in_gap = false;
            out.push(c);
        }
    }
    out
}

/// Check a normalized body against inclusive character-count bounds.
///
/// # Errors
/// Returns [`ValidationError::TooShort`] or [`ValidationError::TooLong`].
pub fn check_length(text: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = text.chars().count();
    if len < min {
        return Err(ValidationError::TooShort { min });
    }
    if len > max {
        return Err(ValidationError::TooLong { max });
    }
    Ok(())
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || ('а'..='я').contains(&c)
        || ('А'..='Я').contains(&c)
        || c == 'ё'
        || c == 'Ё'
}

/// Validate a prospective display name.
///
/// Accepts 3–12 characters drawn from ASCII letters and digits, underscore,
/// and Cyrillic letters. Uniqueness is checked separately against the store.
///
/// # Errors
/// Returns [`ValidationError::UsernameLength`] or
/// [`ValidationError::UsernameCharset`].
pub fn validate_username(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if len < USERNAME_MIN || len > USERNAME_MAX {
        return Err(ValidationError::UsernameLength {
            min: USERNAME_MIN,
            max: USERNAME_MAX,
        });
    }
    if !name.chars().all(is_name_char) {
        return Err(ValidationError::UsernameCharset);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("  hello   world ", "hello world")]
    #[case("one\n\ttwo", "one two")]
    #[case("plain", "plain")]
    #[case("   ", "")]
    fn normalise_collapses_whitespace(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalise(input), expected);
    }

    #[test]
    fn length_bounds_are_inclusive() {
        assert!(check_length("ab", 2, 4).is_ok());
        assert!(check_length("abcd", 2, 4).is_ok());
        assert_eq!(
            check_length("a", 2, 4),
            Err(ValidationError::TooShort { min: 2 })
        );
        assert_eq!(
            check_length("abcde", 2, 4),
            Err(ValidationError::TooLong { max: 4 })
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // Five Cyrillic characters occupy ten bytes.
        assert!(check_length("мысль", 2, 5).is_ok());
    }

    #[rstest]
    #[case("valid_Name1")]
    #[case("абв")]
    #[case("Ёжик_99")]
    fn accepts_valid_usernames(#[case] name: &str) {
        assert!(validate_username(name).is_ok());
    }

    #[rstest]
    #[case("ab")]
    #[case("far_too_long_name")]
    fn rejects_bad_username_length(#[case] name: &str) {
        assert_eq!(
            validate_username(name),
            Err(ValidationError::UsernameLength { min: 3, max: 12 })
        );
    }

    #[rstest]
    #[case("with space")]
    #[case("dash-name")]
    #[case("émigré")]
    fn rejects_bad_username_charset(#[case] name: &str) {
        assert_eq!(validate_username(name), Err(ValidationError::UsernameCharset));
    }
}
