//! Command dispatch: bridges CLI args to a `DataSource` and the renderers.

pub mod config_cmd;
pub mod health;
pub mod proxy;
pub mod query;

use tokio_util::sync::CancellationToken;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a data source command to its handler.
pub async fn dispatch(
    cmd: Command,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    match cmd {
        Command::Query(args) => query::handle(args, global, cancel).await,
        Command::Health => health::handle(global, cancel).await,
        Command::Proxy(args) => proxy::handle(args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
