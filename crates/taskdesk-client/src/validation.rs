//! Form validation run before any request is issued.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{FormField, ValidationError};

/// Only Gmail addresses are accepted for accounts.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@gmail\.com$").expect("invalid email pattern")
});

pub const MIN_NAME_LEN: usize = 5;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    let email_missing = email.trim().is_empty();
    let password_missing = password.trim().is_empty();

    if email_missing && password_missing {
        return Err(ValidationError::form("Email and password are required"));
    }
    if email_missing {
        return Err(ValidationError::field(FormField::Email, "Email is required"));
    }
    if password_missing {
        return Err(ValidationError::field(FormField::Password, "Password is required"));
    }
    if !is_valid_email(email.trim()) {
        return Err(ValidationError::field(
            FormField::Email,
            "Please enter a valid @gmail.com address",
        ));
    }
    Ok(())
}

/// Checks shared by user create and update. `require_password` is set for
/// creation only; on update an empty password means "keep the current one".
pub fn validate_user_fields(
    name: &str,
    email: &str,
    password: Option<&str>,
    require_password: bool,
) -> Result<(), ValidationError> {
    let password_missing = password.is_none_or(|p| p.is_empty());
    if name.trim().is_empty() || email.trim().is_empty() || (require_password && password_missing) {
        return Err(ValidationError::form("Please fill all required fields"));
    }
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::field(
            FormField::Name,
            format!("Name must contain at least {MIN_NAME_LEN} letters"),
        ));
    }
    if !is_valid_email(email.trim()) {
        return Err(ValidationError::field(
            FormField::Email,
            "Only Gmail addresses ending with @gmail.com allowed",
        ));
    }
    Ok(())
}

pub fn validate_assignee(assigned_to: Option<i64>) -> Result<i64, ValidationError> {
    assigned_to
        .filter(|id| *id != 0)
        .ok_or_else(|| ValidationError::field(FormField::AssignedTo, "Assigned To is required"))
}
