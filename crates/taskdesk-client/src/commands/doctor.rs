use taskdesk_shared::schemas::{Task, User};

use super::open_context;
use crate::config::read_settings;
use crate::persistence::{KEY_USERS, tasks_key};
use crate::reconcile::load_cached;

pub fn run() -> anyhow::Result<()> {
    let ctx = open_context()?;
    let config = &ctx.config;
    let settings = read_settings(&config.settings_file)?;

    println!("taskdesk Doctor\n");
    println!("  Version: {}", env!("CARGO_PKG_VERSION"));
    println!("  Home Dir: {}", config.home_dir.display());
    println!("  Settings File: {}", config.settings_file.display());
    println!("  Storage File: {}", config.storage_file.display());
    println!("  API URL: {}", config.api_url);
    println!(
        "  API URL Source: {}",
        if std::env::var("TASKDESK_API_URL").is_ok() {
            "environment"
        } else if settings.api_url.is_some() {
            "settings file"
        } else {
            "default"
        }
    );
    match config.http_timeout {
        Some(timeout) => println!("  HTTP Timeout: {}s", timeout.as_secs()),
        None => println!("  HTTP Timeout: transport default"),
    }

    println!("\n  Session:");
    println!("    State: {}", ctx.state());
    if let Some(identity) = ctx.session().identity() {
        println!("    Subject: {}", identity.subject);
        println!("    Role: {}", identity.role);
        let tasks: Vec<Task> = load_cached(ctx.storage(), &tasks_key(&identity.subject));
        println!("    Cached tasks: {}", tasks.len());
    }
    let users: Vec<User> = load_cached(ctx.storage(), KEY_USERS);
    println!("    Cached users: {}", users.len());

    Ok(())
}
