use clap::Subcommand;

use super::{describe, open_context, read_line};
use crate::context::AppContext;
use crate::error::{AuthError, ClientError};

#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Sign in; the password is read from stdin
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign out and forget the stored token
    Logout,
    /// Show the current session
    Status,
}

pub async fn run(action: Option<AuthAction>) -> anyhow::Result<()> {
    let mut ctx = open_context()?;

    match action {
        Some(AuthAction::Login { email }) => login(&mut ctx, email).await,
        Some(AuthAction::Logout) => logout(&mut ctx),
        Some(AuthAction::Status) => {
            show_status(&ctx);
            Ok(())
        }
        None => {
            show_help();
            Ok(())
        }
    }
}

async fn login(ctx: &mut AppContext, email: Option<String>) -> anyhow::Result<()> {
    let email = match email {
        Some(email) => email,
        None => read_line("Email: ")?,
    };
    let password = read_line("Password: ")?;

    match ctx.login(&email, &password).await {
        Ok(identity) => {
            println!("Signed in as {} ({})", identity.subject, identity.role);
            println!("Landing on: {}", ctx.route().landing().name());
            Ok(())
        }
        Err(ClientError::Auth(AuthError::Rejected { detail, blame })) => {
            for field in blame.fields() {
                eprintln!("  {field}: {detail}");
            }
            anyhow::bail!("login rejected")
        }
        Err(e) => anyhow::bail!(describe(&e)),
    }
}

fn logout(ctx: &mut AppContext) -> anyhow::Result<()> {
    ctx.logout().map_err(super::fail)?;
    println!("Signed out.");
    Ok(())
}

fn show_status(ctx: &AppContext) {
    println!("\nSession Status\n");
    println!("  API URL: {}", ctx.config.api_url);
    match ctx.session().identity() {
        Some(identity) => {
            println!("  Signed in: {}", identity.subject);
            println!("  Role: {}", identity.role);
        }
        None => println!("  Signed in: no"),
    }
    println!("  State: {}", ctx.state());
}

fn show_help() {
    println!(
        r#"
taskdesk auth - Session management

Usage:
  taskdesk auth login [--email E]   Sign in (password read from stdin)
  taskdesk auth logout              Sign out
  taskdesk auth status              Show the current session
"#
    );
}
