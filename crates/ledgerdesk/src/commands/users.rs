//! Users command - office user administration.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand, ValueEnum};
use console::Style;
use ledgerdesk_client::{CreateUserRequest, ListUsersQuery, UpdateUserRequest, User, UserRole};

use super::{Context, print_dim, print_header, print_page_footer, print_success};

/// Arguments for the users command.
#[derive(Args, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// List users
    List {
        #[arg(long, value_enum)]
        role: Option<RoleArg>,

        /// Include deactivated accounts
        #[arg(short, long)]
        all: bool,

        /// Page number
        #[arg(long)]
        page: Option<u32>,
    },

    /// Invite a user
    Create {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: String,

        #[arg(long, value_enum)]
        role: RoleArg,

        /// Client company, for portal users
        #[arg(long)]
        client: Option<String>,
    },

    /// Change a user's role
    SetRole {
        /// User ID
        id: String,

        #[arg(value_enum)]
        role: RoleArg,
    },

    /// Deactivate a user
    Deactivate {
        /// User ID
        id: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum RoleArg {
    Admin,
    Accountant,
    Assistant,
    Client,
}

impl From<RoleArg> for UserRole {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => UserRole::Admin,
            RoleArg::Accountant => UserRole::Accountant,
            RoleArg::Assistant => UserRole::Assistant,
            RoleArg::Client => UserRole::Client,
        }
    }
}

/// Run the users command.
pub async fn run(args: UsersArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let dim = Style::new().dim();

    match args.command {
        UsersCommand::List { role, all, page } => {
            let query = ListUsersQuery {
                role: role.map(Into::into),
                include_inactive: all,
                page,
                page_size: None,
            };
            let users = client.users().list(&query).await?;
            if ctx.print_json(&users)? {
                return Ok(());
            }

            print_header("Users");
            if users.items.is_empty() {
                print_dim("No users found");
            }
            for user in &users.items {
                print_user(user);
            }
            print_page_footer(&users);
        }
        UsersCommand::Create {
            email,
            name,
            role,
            client: client_id,
        } => {
            let password = rpassword::prompt_password("Initial password: ")
                .context("failed to read password")?;
            let user = client
                .users()
                .create(CreateUserRequest {
                    email,
                    full_name: name,
                    role: role.into(),
                    password,
                    client_id,
                })
                .await?;
            if !ctx.print_json(&user)? {
                print_success(&format!(
                    "User created: {} {}",
                    user.email,
                    dim.apply_to(&user.id)
                ));
            }
        }
        UsersCommand::SetRole { id, role } => {
            let request = UpdateUserRequest {
                role: Some(role.into()),
                ..Default::default()
            };
            let user = client.users().update(&id, request).await?;
            if !ctx.print_json(&user)? {
                print_success(&format!("{} is now {}", user.email, role_label(user.role)));
            }
        }
        UsersCommand::Deactivate { id } => {
            let user = client.users().deactivate(&id).await?;
            if !ctx.print_json(&user)? {
                print_success(&format!("Deactivated {}", user.email));
            }
        }
    }

    Ok(())
}

fn print_user(user: &User) {
    let dim = Style::new().dim();
    let name = if user.is_active {
        user.full_name.clone()
    } else {
        dim.apply_to(format!("{} (inactive)", user.full_name)).to_string()
    };
    println!(
        "{} {:<28} {:<32} {}",
        dim.apply_to(format!("[{}]", user.id)),
        name,
        user.email,
        role_label(user.role)
    );
}

fn role_label(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => "admin",
        UserRole::Accountant => "accountant",
        UserRole::Assistant => "assistant",
        UserRole::Client => "client",
        UserRole::Unknown => "unknown",
    }
}
