//! Mapping backend error bodies onto login form fields.

use serde_json::Value;

use crate::error::FormField;

/// Which login field a server-side rejection is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldBlame {
    Email,
    Password,
    Both,
}

impl FieldBlame {
    pub fn fields(&self) -> &'static [FormField] {
        match self {
            FieldBlame::Email => &[FormField::Email],
            FieldBlame::Password => &[FormField::Password],
            FieldBlame::Both => &[FormField::Email, FormField::Password],
        }
    }
}

/// Human-readable message for an error body: the `detail` string when the
/// backend sent one, otherwise the raw body, otherwise a generic message.
pub fn extract_detail(body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let detail = parsed
        .as_ref()
        .and_then(|v| v.get("detail"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match detail {
        Some(d) => d.to_string(),
        None if !body.trim().is_empty() && parsed.is_none() => body.trim().to_string(),
        None => "Server error".to_string(),
    }
}

/// Decide which field to blame for a rejected login.
///
/// A structured `field` key in the body wins. Otherwise fall back to
/// matching on the message text.
pub fn blame_field(body: &str) -> FieldBlame {
    let structured = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("field").and_then(Value::as_str).map(str::to_lowercase));
    match structured.as_deref() {
        Some("email") => return FieldBlame::Email,
        Some("password") => return FieldBlame::Password,
        _ => {}
    }

    let message_lower = extract_detail(body).to_lowercase();
    if message_lower.contains("email") {
        FieldBlame::Email
    } else if message_lower.contains("password") {
        FieldBlame::Password
    } else {
        FieldBlame::Both
    }
}
