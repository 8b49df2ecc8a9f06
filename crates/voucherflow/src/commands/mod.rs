//! Command dispatch: bridges CLI args -> core service calls -> output formatting.

pub mod config_cmd;
pub mod notifications;
pub mod util;

use voucherflow_core::Session;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an API-bound command to its handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::List(args) => notifications::list(session, args, global).await,
        Command::Browse(args) => notifications::browse(session, args, global).await,
        Command::Get { id } => notifications::get(session, &id, global).await,
        Command::SetStatus(args) => notifications::set_status_cmd(session, args, global).await,
        // Config and Completions never reach dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
