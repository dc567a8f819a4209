//! Session commands - sign in/out and account switching

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::{Confirm, Input};

use founders_core::adapters::local_identity::LocalIdentityProvider;
use founders_core::{OperationResult, User};

use super::{get_context, print_json};
use crate::output;

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// List every account on this machine
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Make another account the current one
    Switch {
        /// Account id (see `fc accounts list`)
        user_id: String,
    },
    /// Delete an account and its workspace
    Delete {
        /// Account id (see `fc accounts list`)
        user_id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

pub struct SignInArgs {
    pub name: Option<String>,
    pub email: Option<String>,
    pub startup: Option<String>,
    pub avatar: Option<String>,
    pub id: Option<String>,
    pub json: bool,
}

fn prompt(label: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Input::new().with_prompt(label).interact_text()?),
    }
}

pub fn run_sign_in(args: SignInArgs) -> Result<()> {
    let ctx = get_context()?;

    let name = prompt("Name", args.name)?;
    let email = prompt("Email", args.email)?;

    let mut provider = LocalIdentityProvider::new(name, email);
    if let Some(startup) = args.startup {
        provider = provider.with_startup(startup);
    }
    if let Some(avatar) = args.avatar {
        provider = provider.with_avatar(avatar);
    }
    if let Some(id) = args.id {
        provider = provider.with_id(id);
    }

    let user = ctx.session_service.sign_in(&provider)?;
    let stats = ctx.workspace_service.snapshot_stats(&user.id)?;

    if args.json {
        return print_json(&OperationResult::ok(user));
    }

    output::success(&format!("Welcome, {} {}", user.first_name(), user.avatar));
    println!("  {} day streak", stats.streak.to_string().bold());
    Ok(())
}

pub fn run_sign_out() -> Result<()> {
    let ctx = get_context()?;
    ctx.session_service.sign_out()?;
    output::success("Signed out");
    Ok(())
}

fn describe(user: &User) -> String {
    if user.startup.is_empty() {
        format!("{} {} <{}>", user.avatar, user.name, user.email)
    } else {
        format!("{} {} ({}) <{}>", user.avatar, user.name, user.startup, user.email)
    }
}

pub fn run_whoami(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let user = ctx.session_service.current_user()?;

    if json {
        return print_json(&user);
    }

    match user {
        Some(user) => {
            println!("{}", describe(&user));
            println!("{}", user.id.dimmed());
        }
        None => output::warning("Not signed in. Run `fc signin`."),
    }
    Ok(())
}

pub fn run_accounts(command: AccountsCommands) -> Result<()> {
    let ctx = get_context()?;

    match command {
        AccountsCommands::List { json } => {
            let accounts = ctx.session_service.list_accounts()?;
            let current = ctx.session_service.current_user()?.map(|u| u.id);

            if json {
                return print_json(&accounts);
            }
            if accounts.is_empty() {
                println!("No accounts yet. Run `fc signin`.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["", "Name", "Startup", "Email", "Id"]);
            for user in accounts {
                let marker = if current.as_deref() == Some(user.id.as_str()) { "*" } else { "" };
                table.add_row(vec![
                    marker.to_string(),
                    format!("{} {}", user.avatar, user.name),
                    user.startup,
                    user.email,
                    user.id,
                ]);
            }
            println!("{}", table);
        }
        AccountsCommands::Switch { user_id } => {
            let user = ctx.session_service.switch_account(&user_id)?;
            output::success(&format!("Switched to {}", describe(&user)));
        }
        AccountsCommands::Delete { user_id, force } => {
            if !force {
                println!(
                    "\n{}",
                    format!("This will delete account {} and all of its tasks, goals and hours.", user_id)
                        .yellow()
                );
                if !Confirm::new()
                    .with_prompt("Are you sure?")
                    .default(false)
                    .interact()?
                {
                    println!("{}\n", "Cancelled".dimmed());
                    return Ok(());
                }
            }
            ctx.session_service.delete_account(&user_id)?;
            output::success(&format!("Account {} deleted", user_id));
        }
    }

    Ok(())
}
