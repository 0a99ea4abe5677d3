//! User record handlers

use crate::cli::{UserArgs, UsersArgs};
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use handoff_marshal::Marshaller;
use tracing::instrument;

/// Handle the user command
#[instrument(skip(marshaller, output), fields(random = args.random))]
pub fn handle_user(args: UserArgs, marshaller: &Marshaller, output: &mut OutputWriter) -> Result<()> {
    let user = if args.random {
        marshaller.create_random_user()?
    } else {
        match (args.name, args.age, args.email) {
            (Some(name), Some(age), Some(email)) => marshaller.create_user(&name, age, &email)?,
            _ => return Err(Error::config("--name, --age and --email are required without --random")),
        }
    };
    output.data(&user)
}

/// Handle the users command
#[instrument(skip(marshaller, output))]
pub fn handle_users(args: UsersArgs, marshaller: &Marshaller, output: &mut OutputWriter) -> Result<()> {
    let users = marshaller.create_random_users(args.count)?;
    if users.len() < args.count {
        output.warning(&format!("dropped {} incomplete records", args.count - users.len()))?;
    }
    output.list(&users)
}
