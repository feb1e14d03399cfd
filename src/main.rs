use clap::{Parser, Subcommand};

use taskdesk_client::commands;
use taskdesk_client::commands::auth::AuthAction;
use taskdesk_client::commands::my_tasks::MyTasksAction;
use taskdesk_client::commands::tasks::TasksAction;
use taskdesk_client::commands::users::UsersAction;

#[derive(Parser)]
#[command(name = "taskdesk", about = "Employee and task management client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Session management
    Auth {
        #[command(subcommand)]
        action: Option<AuthAction>,
    },

    /// List the screens the current session can reach
    Screens,

    /// Manage employees (admin)
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Manage tasks (admin)
    Tasks {
        #[command(subcommand)]
        action: TasksAction,
    },

    /// Work on your assigned tasks (employee)
    MyTasks {
        #[command(subcommand)]
        action: MyTasksAction,
    },

    /// Show diagnostics information
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Auth { action } => commands::auth::run(action).await,
        Commands::Screens => commands::screens::run(),
        Commands::Users { action } => commands::users::run(action).await,
        Commands::Tasks { action } => commands::tasks::run(action).await,
        Commands::MyTasks { action } => commands::my_tasks::run(action).await,
        Commands::Doctor => commands::doctor::run(),
    }
}
