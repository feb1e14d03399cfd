pub mod auth;
pub mod doctor;
pub mod my_tasks;
pub mod screens;
pub mod tasks;
pub mod users;

use std::io::{self, BufRead, Write};

use crate::config::Configuration;
use crate::context::AppContext;
use crate::error::{ApiError, AuthError, ClientError};
use crate::reconcile::{Refreshed, Source};
use crate::utils::error_utils::extract_detail;

pub(crate) fn open_context() -> anyhow::Result<AppContext> {
    let mut config = Configuration::create()?;
    config.load_with_settings()?;
    AppContext::bootstrap(config)
}

/// One-line message for a failed operation, as a form would show it.
pub(crate) fn describe(err: &ClientError) -> String {
    match err {
        ClientError::Validation(v) => match v.field {
            Some(field) => format!("{field}: {}", v.message),
            None => v.message.clone(),
        },
        ClientError::Auth(AuthError::Rejected { detail, blame }) => {
            let fields: Vec<String> = blame.fields().iter().map(ToString::to_string).collect();
            format!("{detail} (check {})", fields.join(", "))
        }
        ClientError::Api(ApiError::Http { body, .. }) => extract_detail(body),
        ClientError::Api(ApiError::Network(_)) => "Could not reach the server".into(),
        other => other.to_string(),
    }
}

pub(crate) fn fail(err: ClientError) -> anyhow::Error {
    anyhow::anyhow!(describe(&err))
}

/// Read one line from stdin, prompting only when stdin is a terminal.
pub(crate) fn read_line(prompt: &str) -> anyhow::Result<String> {
    if atty::is(atty::Stream::Stdin) {
        print!("{prompt}");
        io::stdout().flush()?;
    }
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub(crate) fn note_source<T>(refreshed: &Refreshed<T>) {
    if refreshed.source == Source::Cache {
        println!("(server unreachable, showing cached data)");
    }
}

pub(crate) fn not_available(screen: &str) {
    println!("{screen} is not available for the current session.");
    println!("Run: taskdesk auth login");
}
