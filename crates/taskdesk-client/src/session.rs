//! Client-side session: the bearer token and the identity decoded from it.
//!
//! The identity is never stored on its own. It is always re-derived from the
//! token payload, so a token that stops decoding takes the identity with it.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use tracing::{debug, info, warn};

use taskdesk_shared::roles::Role;
use taskdesk_shared::schemas::{LoginRequest, TokenClaims};

use crate::api::Backend;
use crate::error::{ApiError, AuthError, ClientError, ClientResult};
use crate::persistence::{KEY_EMAIL, KEY_ROLE, KEY_TOKEN, SESSION_KEYS, Storage};
use crate::utils::error_utils::{blame_field, extract_detail};
use crate::validation;

/// Who the current token says we are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub role: Role,
    /// The token's `sub` claim, the account email.
    pub subject: String,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            role: claims.role,
            subject: claims.sub,
        }
    }
}

/// Decode the payload segment of an access token.
///
/// The signature is not checked: the client has no key and the server
/// re-validates the token on every request.
pub fn decode_token(token: &str) -> Result<TokenClaims, AuthError> {
    let payload = token
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| AuthError::UndecodableToken("missing payload segment".into()))?;

    let bytes = decode_base64_flexible(payload)
        .map_err(|e| AuthError::UndecodableToken(format!("payload is not base64: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::UndecodableToken(format!("payload is not valid claims: {e}")))
}

/// Decode base64 that may be standard or URL-safe, with or without padding.
fn decode_base64_flexible(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD
        .decode(input)
        .or_else(|_| URL_SAFE.decode(input))
        .or_else(|_| STANDARD_NO_PAD.decode(input))
        .or_else(|_| STANDARD.decode(input))
}

/// Owns the session token. Token and identity are either both present or
/// both absent.
pub struct SessionStore {
    storage: Storage,
    token: Option<String>,
    identity: Option<Identity>,
}

impl SessionStore {
    /// A store with no session, regardless of what is persisted.
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            token: None,
            identity: None,
        }
    }

    /// Resume the session persisted by an earlier launch. A stored token that
    /// no longer decodes is discarded.
    pub fn restore(storage: Storage) -> anyhow::Result<Self> {
        let mut store = Self::new(storage);
        let Some(token) = store.storage.get(KEY_TOKEN)? else {
            return Ok(store);
        };

        match decode_token(&token) {
            Ok(claims) => {
                debug!(subject = %claims.sub, role = %claims.role, "restored session");
                store.identity = Some(claims.into());
                store.token = Some(token);
            }
            Err(e) => {
                warn!(error = %e, "discarding stored session");
                store.storage.remove_many(SESSION_KEYS)?;
            }
        }
        Ok(store)
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Exchange credentials for a session.
    ///
    /// Credentials are validated locally first; a validation failure sends
    /// nothing and leaves the store as it was. Past that point any existing
    /// session is dropped, and every failure leaves the store empty.
    pub async fn login<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        email: &str,
        password: &str,
    ) -> ClientResult<Identity> {
        validation::validate_login(email, password)?;

        self.clear().map_err(ClientError::Storage)?;

        match self.establish(backend, email, password).await {
            Ok(identity) => {
                info!(subject = %identity.subject, role = %identity.role, "signed in");
                Ok(identity)
            }
            Err(e) => {
                if let Err(clear_err) = self.clear() {
                    warn!(error = %clear_err, "failed to clear session after login failure");
                }
                Err(e)
            }
        }
    }

    async fn establish<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        email: &str,
        password: &str,
    ) -> ClientResult<Identity> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response = backend
            .authenticate(&request)
            .await
            .map_err(classify_login_error)?;

        let token = response
            .access_token
            .filter(|t| !t.trim().is_empty())
            .ok_or(AuthError::MissingAccessToken)?;

        let identity: Identity = decode_token(&token)?.into();

        self.storage.set_many(&[
            (KEY_TOKEN, token.as_str()),
            (KEY_ROLE, identity.role.as_str()),
            (KEY_EMAIL, identity.subject.as_str()),
        ])?;

        self.token = Some(token);
        self.identity = Some(identity.clone());
        Ok(identity)
    }

    /// Drop the session in memory and on disk. Safe to call repeatedly.
    pub fn logout(&mut self) -> anyhow::Result<()> {
        let was_signed_in = self.identity.is_some();
        self.clear()?;
        if was_signed_in {
            info!("signed out");
        }
        Ok(())
    }

    fn clear(&mut self) -> anyhow::Result<()> {
        self.token = None;
        self.identity = None;
        self.storage.remove_many(SESSION_KEYS)
    }
}

/// Client errors from the login endpoint are credential rejections; anything
/// else (server errors, transport failures) stays an API error.
fn classify_login_error(err: ApiError) -> ClientError {
    match err {
        ApiError::Http { status, body } if (400..500).contains(&status) => AuthError::Rejected {
            detail: extract_detail(&body),
            blame: blame_field(&body),
        }
        .into(),
        other => other.into(),
    }
}
