use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use artist_enrichment_server::user::{
    AuthToken, AuthTokenValue, SqliteUserStore, UserAuthTokenStore, UserRole, UserStore,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite user database file.
    #[clap(value_parser = parse_path)]
    pub path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Creates a user with the given handle.
    AddUser { user_handle: String },

    /// Shows roles, permissions and the number of tokens of a given user.
    Show { user_handle: String },

    /// Shows all user handles.
    UserHandles,

    /// Shows all available roles and their permissions.
    ListRoles,

    /// Adds a role to a user.
    AddRole { user_handle: String, role: String },

    /// Removes a role from a user.
    RemoveRole { user_handle: String, role: String },

    /// Issues a new API token for the given user and prints it.
    IssueToken { user_handle: String },

    /// Revokes an API token.
    RevokeToken { token: String },
}

fn require_user(store: &SqliteUserStore, user_handle: &str) -> Result<usize> {
    match store.get_user_id(user_handle)? {
        Some(id) => Ok(id),
        None => bail!("User '{}' not found", user_handle),
    }
}

fn parse_role(role: &str) -> Result<UserRole> {
    match UserRole::from_str(role) {
        Some(r) => Ok(r),
        None => bail!("Invalid role '{}'. Valid roles are: Admin, Regular", role),
    }
}

fn execute(store: &SqliteUserStore, command: Command) -> Result<()> {
    match command {
        Command::AddUser { user_handle } => {
            let id = store.create_user(&user_handle)?;
            println!("Created user '{}' with id {}", user_handle, id);
        }
        Command::Show { user_handle } => {
            let user_id = require_user(store, &user_handle)?;
            println!("User '{}' (id {})", user_handle, user_id);

            let roles = store.get_user_roles(user_id)?;
            println!("\nRoles:");
            if roles.is_empty() {
                println!("  (no roles assigned)");
            }
            for role in roles.iter() {
                println!("  - {}", role.as_str());
            }

            println!("\nResolved Permissions:");
            let permissions = artist_enrichment_server::user::resolve_permissions(&roles);
            if permissions.is_empty() {
                println!("  (no permissions)");
            }
            for permission in permissions.iter() {
                println!("  - {:?}", permission);
            }
        }
        Command::UserHandles => {
            println!("{:#?}", store.get_all_user_handles()?);
        }
        Command::ListRoles => {
            println!("Available Roles:\n");
            for role in &[UserRole::Admin, UserRole::Regular] {
                println!("Role: {}", role.as_str());
                println!("Permissions:");
                for permission in role.permissions() {
                    println!("  - {:?}", permission);
                }
                println!();
            }
        }
        Command::AddRole { user_handle, role } => {
            let role_enum = parse_role(&role)?;
            let user_id = require_user(store, &user_handle)?;
            store.add_user_role(user_id, role_enum)?;
            println!("Role '{}' added to user '{}'", role_enum.as_str(), user_handle);
        }
        Command::RemoveRole { user_handle, role } => {
            let role_enum = parse_role(&role)?;
            let user_id = require_user(store, &user_handle)?;
            store.remove_user_role(user_id, role_enum)?;
            println!(
                "Role '{}' removed from user '{}'",
                role_enum.as_str(),
                user_handle
            );
        }
        Command::IssueToken { user_handle } => {
            let user_id = require_user(store, &user_handle)?;
            let token = AuthToken::new_for_user(user_id);
            store.add_user_auth_token(&token)?;
            println!("{}", token.value.0);
        }
        Command::RevokeToken { token } => {
            if store.delete_user_auth_token(&AuthTokenValue(token))? {
                println!("Token revoked");
            } else {
                bail!("Token not found");
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let store = SqliteUserStore::new(&cli_args.path)
        .with_context(|| format!("Could not open user db at {:?}", cli_args.path))?;
    execute(&store, cli_args.command)
}
