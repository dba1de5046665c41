//! Field validators
//!
//! Pure, total checks run against the form's field values at submit time.
//! Phone numbers are only checked for presence; formatting is left to the
//! input mask.

use regex::Regex;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[\p{L}\p{M}\p{N}!#$%&'*+/=?^_`{|}~-]+(\.[\p{L}\p{M}\p{N}!#$%&'*+/=?^_`{|}~-]+)*@([A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$",
    )
    .expect("email pattern is a valid regex")
});

/// Returns `true` if `email` has the shape `local@domain.tld`
///
/// The local part may contain any Unicode letter or digit; the domain is
/// ASCII.
pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Returns `true` if `name` is non-empty after trimming
pub fn validate_user_name(name: &str) -> bool {
    !name.trim().is_empty()
}

/// Returns `true` if `phone` is non-empty after trimming
pub fn validate_phone_number(phone: &str) -> bool {
    !phone.trim().is_empty()
}
