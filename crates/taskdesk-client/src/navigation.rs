//! Role-gated navigation.
//!
//! The navigator is a three-state machine driven by login and logout. The
//! screens a state can reach are exposed only through [`Route`]: admin
//! screens need an [`AdminRoute`], employee screens an [`EmployeeRoute`], and
//! both can only be built here from a live session whose decoded role
//! matches. Code holding an employee session has no way to name an admin
//! screen.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use taskdesk_shared::roles::Role;

use crate::persistence::Storage;
use crate::session::{Identity, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Unauthenticated,
    AuthenticatedAdmin,
    AuthenticatedEmployee,
}

impl NavState {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => NavState::AuthenticatedAdmin,
            Role::Employee => NavState::AuthenticatedEmployee,
        }
    }

    pub fn screens(&self) -> &'static [Screen] {
        match self {
            NavState::Unauthenticated => &[Screen::Login],
            NavState::AuthenticatedAdmin => ADMIN_SCREENS,
            NavState::AuthenticatedEmployee => EMPLOYEE_SCREENS,
        }
    }

    pub fn can_reach(&self, screen: Screen) -> bool {
        self.screens().contains(&screen)
    }
}

impl fmt::Display for NavState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NavState::Unauthenticated => "signed out",
            NavState::AuthenticatedAdmin => "signed in as admin",
            NavState::AuthenticatedEmployee => "signed in as employee",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    AdminDashboard,
    ManageEmployees,
    ManageTasks,
    EmployeeDashboard,
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Login => "Login",
            Screen::AdminDashboard => "AdminDashboard",
            Screen::ManageEmployees => "ManageEmployees",
            Screen::ManageTasks => "ManageTasks",
            Screen::EmployeeDashboard => "EmployeeDashboard",
        }
    }
}

const ADMIN_SCREENS: &[Screen] = &[
    Screen::AdminDashboard,
    Screen::ManageEmployees,
    Screen::ManageTasks,
];

const EMPLOYEE_SCREENS: &[Screen] = &[Screen::EmployeeDashboard];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    LoginSucceeded(Role),
    Logout,
}

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("cannot handle {event:?} while {state}")]
    InvalidTransition { state: NavState, event: NavEvent },
}

#[derive(Debug)]
pub struct Navigator {
    state: NavState,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            state: NavState::Unauthenticated,
        }
    }

    /// Start in the state matching a restored session.
    pub fn from_session(session: &SessionStore) -> Self {
        let state = session
            .identity()
            .map(|identity| NavState::for_role(identity.role))
            .unwrap_or(NavState::Unauthenticated);
        Self { state }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    /// Apply a transition. There is no edge between the two authenticated
    /// states: switching roles takes a logout first.
    pub fn apply(&mut self, event: NavEvent) -> Result<NavState, NavigationError> {
        let next = match (self.state, event) {
            (NavState::Unauthenticated, NavEvent::LoginSucceeded(role)) => NavState::for_role(role),
            (NavState::AuthenticatedAdmin | NavState::AuthenticatedEmployee, NavEvent::Logout) => {
                NavState::Unauthenticated
            }
            (state, event) => return Err(NavigationError::InvalidTransition { state, event }),
        };
        debug!(from = %self.state, to = %next, "navigation transition");
        self.state = next;
        Ok(next)
    }

    /// Resolve what the session may reach. Falls back to the login screen if
    /// the navigator and session ever disagree.
    pub fn route<'s>(&self, session: &'s SessionStore) -> Route<'s> {
        let (Some(identity), Some(token)) = (session.identity(), session.token()) else {
            return Route::Login;
        };
        let grant = Grant {
            identity,
            token,
            storage: session.storage(),
        };
        match (self.state, identity.role) {
            (NavState::AuthenticatedAdmin, Role::Admin) => Route::Admin(AdminRoute { grant }),
            (NavState::AuthenticatedEmployee, Role::Employee) => {
                Route::Employee(EmployeeRoute { grant })
            }
            _ => Route::Login,
        }
    }
}

/// Credentials a route hands to the screens behind it.
#[derive(Debug, Clone, Copy)]
struct Grant<'s> {
    identity: &'s Identity,
    token: &'s str,
    storage: &'s Storage,
}

pub enum Route<'s> {
    Login,
    Admin(AdminRoute<'s>),
    Employee(EmployeeRoute<'s>),
}

impl Route<'_> {
    pub fn state(&self) -> NavState {
        match self {
            Route::Login => NavState::Unauthenticated,
            Route::Admin(_) => NavState::AuthenticatedAdmin,
            Route::Employee(_) => NavState::AuthenticatedEmployee,
        }
    }

    pub fn screens(&self) -> &'static [Screen] {
        self.state().screens()
    }

    /// Screen shown right after navigation settles.
    pub fn landing(&self) -> Screen {
        self.screens()[0]
    }
}

/// Access to the admin screens.
#[derive(Debug, Clone, Copy)]
pub struct AdminRoute<'s> {
    grant: Grant<'s>,
}

/// Access to the employee dashboard.
#[derive(Debug, Clone, Copy)]
pub struct EmployeeRoute<'s> {
    grant: Grant<'s>,
}

macro_rules! grant_accessors {
    ($route:ident) => {
        impl<'s> $route<'s> {
            pub fn identity(&self) -> &'s Identity {
                self.grant.identity
            }

            pub fn token(&self) -> &'s str {
                self.grant.token
            }

            pub fn storage(&self) -> &'s Storage {
                self.grant.storage
            }
        }
    };
}

grant_accessors!(AdminRoute);
grant_accessors!(EmployeeRoute);
