//! Application context: configuration, storage, API client, session and
//! navigator for one run of the client.

use tracing::debug;

use crate::api::ApiClient;
use crate::config::Configuration;
use crate::error::ClientResult;
use crate::navigation::{NavEvent, NavState, Navigator, Route};
use crate::persistence::Storage;
use crate::session::{Identity, SessionStore};

pub struct AppContext {
    pub config: Configuration,
    pub api: ApiClient,
    session: SessionStore,
    navigator: Navigator,
}

impl AppContext {
    /// Open storage, build the HTTP client and resume any persisted session.
    pub fn bootstrap(config: Configuration) -> anyhow::Result<Self> {
        let storage = Storage::open(config.storage_file.clone());
        let api = ApiClient::new(&config)?;
        let session = SessionStore::restore(storage)?;
        let navigator = Navigator::from_session(&session);
        debug!(state = %navigator.state(), api_url = %config.api_url, "context ready");

        Ok(Self {
            config,
            api,
            session,
            navigator,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn storage(&self) -> &Storage {
        self.session.storage()
    }

    pub fn state(&self) -> NavState {
        self.navigator.state()
    }

    /// Sign in, replacing whatever session was active before. Input that fails
    /// validation leaves the current session in place.
    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<Identity> {
        let result = self.session.login(&self.api, email, password).await;

        let previous_dropped = result.is_ok() || !self.session.is_authenticated();
        if previous_dropped && self.navigator.state() != NavState::Unauthenticated {
            self.navigator.apply(NavEvent::Logout)?;
        }

        let identity = result?;
        self.navigator.apply(NavEvent::LoginSucceeded(identity.role))?;
        Ok(identity)
    }

    pub fn logout(&mut self) -> ClientResult<()> {
        let was_signed_in = self.navigator.state() != NavState::Unauthenticated;
        self.session.logout()?;
        if was_signed_in {
            self.navigator.apply(NavEvent::Logout)?;
        }
        Ok(())
    }

    pub fn route(&self) -> Route<'_> {
        self.navigator.route(&self.session)
    }
}
