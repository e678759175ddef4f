//! Command dispatch: bridges CLI args -> client / stores -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod data;
pub mod metrics;
pub mod system;
pub mod util;
pub mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::config::Session;
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Metrics => metrics::handle(session, global).await,
        Command::Watch(args) => watch::handle(session, args, global).await,
        Command::Data(args) => data::handle(session, args, global).await,
        Command::Login(args) => auth::login(session, args, global).await,
        Command::Health => system::health(session, global).await,
        Command::ServerVersion => system::version(session, global).await,
        // Handled before a session is built
        Command::Token(_) | Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
