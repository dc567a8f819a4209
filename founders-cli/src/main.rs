//! Founders Cloud CLI - tasks, goals and hours for founders

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{dashboard, doctor, goal, logs, session, status, task, worklog};
use founders_core::services::LogEvent;

/// Founders Cloud - a workspace for founders in your terminal
#[derive(Parser)]
#[command(name = "fc", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in (creates the account on first use)
    Signin {
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Email address (identifies the account)
        #[arg(long)]
        email: Option<String>,
        /// Startup name shown next to your name
        #[arg(long)]
        startup: Option<String>,
        /// Avatar emoji
        #[arg(long)]
        avatar: Option<String>,
        /// Explicit account id instead of one derived from the email
        #[arg(long)]
        id: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign out of the current account
    Signout,

    /// Show the signed-in account
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List, switch or delete accounts
    Accounts {
        #[command(subcommand)]
        command: session::AccountsCommands,
    },

    /// Manage the to-do list
    Task {
        #[command(subcommand)]
        command: task::TaskCommands,
    },

    /// Manage the goal board
    Goal {
        #[command(subcommand)]
        command: goal::GoalCommands,
    },

    /// Record and review hours worked
    Log {
        #[command(subcommand)]
        command: worklog::LogCommands,
    },

    /// Show streak and workspace counters
    Dashboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show store summary
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run workspace health checks
    Doctor {
        /// Show verbose output
        #[arg(long, short)]
        verbose: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the activity log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    /// Command name as recorded in the activity log
    fn name(&self) -> &'static str {
        match self {
            Commands::Signin { .. } => "signin",
            Commands::Signout => "signout",
            Commands::Whoami { .. } => "whoami",
            Commands::Accounts { .. } => "accounts",
            Commands::Task { .. } => "task",
            Commands::Goal { .. } => "goal",
            Commands::Log { .. } => "log",
            Commands::Dashboard { .. } => "dashboard",
            Commands::Status { .. } => "status",
            Commands::Doctor { .. } => "doctor",
            Commands::Logs { .. } => "logs",
        }
    }
}

/// Diagnostics go to stderr, filtered by FOUNDERS_LOG (default: warn)
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("FOUNDERS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let command = cli.command.name();
    // The logs command manages the log itself; don't record it there
    let logger = match cli.command {
        Commands::Logs { .. } => None,
        _ => commands::get_logger(),
    };
    commands::log_event(&logger, LogEvent::new("command_executed").with_command(command));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::log_event(
                &logger,
                LogEvent::new("command_failed")
                    .with_command(command)
                    .with_error(e.to_string())
                    .with_error_details(format!("{:#}", e)),
            );
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Signin {
            name,
            email,
            startup,
            avatar,
            id,
            json,
        } => session::run_sign_in(session::SignInArgs {
            name,
            email,
            startup,
            avatar,
            id,
            json,
        }),
        Commands::Signout => session::run_sign_out(),
        Commands::Whoami { json } => session::run_whoami(json),
        Commands::Accounts { command } => session::run_accounts(command),
        Commands::Task { command } => task::run(command),
        Commands::Goal { command } => goal::run(command),
        Commands::Log { command } => worklog::run(command),
        Commands::Dashboard { json } => dashboard::run(json),
        Commands::Status { json } => status::run(json),
        Commands::Doctor { verbose, json } => doctor::run(verbose, json),
        Commands::Logs { command } => logs::run(command),
    }
}
