//! Bot commands.

mod calc;
mod countdown;
mod echo;
mod fallback;
mod help;
mod matcher;
mod ping;
mod remind;
mod role;
mod shutdown;

pub use role::RoleBook;

use command_router::{CommandRegistry, ConfigError};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::info;

/// Register every console command.
pub fn register_all(registry: &mut CommandRegistry, shutdown: Arc<Notify>) -> Result<(), ConfigError> {
    registry.add(help::command())?;
    registry.add(ping::command())?;
    registry.add(calc::command())?;
    registry.add(echo::command())?;
    registry.add(countdown::command())?;
    registry.add(matcher::command())?;
    registry.add(remind::command())?;
    registry.add(role::command(RoleBook::default()))?;
    registry.add(shutdown::command(shutdown))?;
    registry.add(fallback::command())?;

    info!("Registered {} commands", registry.len());
    Ok(())
}
