//! Auth command - session management.

use std::io::{BufRead, Write};

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use console::{Style, style};
use serde_json::json;

use super::{Context, print_dim, print_header, print_success};

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Log in with email and password
    Login {
        /// Account email (prompted if omitted)
        #[arg(short, long)]
        email: Option<String>,

        /// Read the password from stdin instead of prompting
        #[arg(long)]
        password_stdin: bool,
    },

    /// Clear the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Show local session state without contacting the server
    Status,

    /// Change the logged-in user's password
    ChangePassword,
}

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AuthCommand::Login {
            email,
            password_stdin,
        } => cmd_login(email, password_stdin, ctx).await,
        AuthCommand::Logout => cmd_logout(ctx),
        AuthCommand::Whoami => cmd_whoami(ctx).await,
        AuthCommand::Status => cmd_status(ctx),
        AuthCommand::ChangePassword => cmd_change_password(ctx).await,
    }
}

async fn cmd_login(email: Option<String>, password_stdin: bool, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    let email = match email {
        Some(email) => email,
        None => prompt_line("Email: ")?,
    };
    let password = if password_stdin {
        read_stdin_line()?
    } else {
        rpassword::prompt_password("Password: ").context("failed to read password")?
    };

    if email.is_empty() || password.is_empty() {
        anyhow::bail!("email and password are required");
    }

    let response = client.login(&email, &password).await?;

    if ctx.print_json(&response.user)? {
        return Ok(());
    }

    let dim = Style::new().dim();
    print_success(&format!(
        "Logged in as {} {}",
        response.user.full_name,
        dim.apply_to(format!("<{}>", response.user.email))
    ));
    Ok(())
}

fn cmd_logout(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let was_authenticated = client.tokens().is_authenticated();
    client.logout()?;

    if ctx.print_json(&json!({ "logged_out": was_authenticated }))? {
        return Ok(());
    }

    if was_authenticated {
        print_success("Logged out");
    } else {
        print_dim("No active session");
    }
    Ok(())
}

async fn cmd_whoami(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let user = client.auth().me().await?;

    if ctx.print_json(&user)? {
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("{}", style(&user.full_name).bold());
    println!("  {} {}", dim.apply_to("Email:"), user.email);
    println!("  {} {:?}", dim.apply_to("Role: "), user.role);
    if let Some(client_id) = &user.client_id {
        println!("  {} {}", dim.apply_to("Client:"), client_id);
    }
    Ok(())
}

fn cmd_status(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let authenticated = client.tokens().is_authenticated();
    let token_file = ctx.config.token_file_path();

    let status = json!({
        "api_url": client.base_url().as_str(),
        "authenticated": authenticated,
        "token_file": token_file.as_ref().map(|p| p.display().to_string()),
    });
    if ctx.print_json(&status)? {
        return Ok(());
    }

    let dim = Style::new().dim();
    print_header("Session");
    println!("  {} {}", dim.apply_to("API:       "), client.base_url());
    if let Some(path) = &token_file {
        println!("  {} {}", dim.apply_to("Token file:"), path.display());
    }
    if authenticated {
        println!("  {} {}", dim.apply_to("Session:   "), Style::new().green().apply_to("active"));
    } else {
        println!("  {} {}", dim.apply_to("Session:   "), Style::new().yellow().apply_to("none"));
        println!();
        print_dim("Run 'ledgerdesk auth login' to start a session");
    }
    Ok(())
}

async fn cmd_change_password(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    let current = rpassword::prompt_password("Current password: ")
        .context("failed to read password")?;
    let new = rpassword::prompt_password("New password: ").context("failed to read password")?;
    let confirm =
        rpassword::prompt_password("Repeat new password: ").context("failed to read password")?;

    if new != confirm {
        anyhow::bail!("new passwords do not match");
    }

    client.auth().change_password(&current, &new).await?;
    print_success("Password changed");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Input helpers
// ─────────────────────────────────────────────────────────────────────────────

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    read_stdin_line()
}

fn read_stdin_line() -> Result<String> {
    let mut input = String::new();
    std::io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}
