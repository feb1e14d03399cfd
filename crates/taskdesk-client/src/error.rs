//! Error types for the taskdesk client.

use std::fmt;

use thiserror::Error;

use crate::navigation::NavigationError;
use crate::utils::error_utils::FieldBlame;

/// Form field a validation failure is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Password,
    AssignedTo,
    Status,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Password => "password",
            FormField::AssignedTo => "assigned_to",
            FormField::Status => "status",
        })
    }
}

/// Client-side rejection raised before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// `None` for form-level errors.
    pub field: Option<FormField>,
    pub message: String,
}

impl ValidationError {
    pub fn field(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field: Some(field),
            message: message.into(),
        }
    }

    pub fn form(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("invalid response body: {0}")]
    InvalidResponse(String),

    #[error("a bearer token is required")]
    MissingToken,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{detail}")]
    Rejected { detail: String, blame: FieldBlame },

    #[error("login response did not include an access token")]
    MissingAccessToken,

    #[error("access token could not be decoded: {0}")]
    UndecodableToken(String),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl ClientError {
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            ClientError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
