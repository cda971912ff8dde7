//! Command routing for chat bots.
//!
//! Commands declare their arguments as an [`ArgumentSchema`]. The
//! [`Dispatcher`] finds the command a message addresses, walks its
//! sub-commands, runs the [`Gates`], resolves arguments into an
//! [`ArgumentBag`] and finally calls the handler.
//!
//! ```text
//! !role add <@42> --reason "helpful" -q
//!  │    │   │      │                  └ flag
//!  │    │   │      └ option
//!  │    │   └ positional
//!  │    └ sub-command
//!  └ prefix
//! ```

mod bag;
pub mod command;
pub mod cooldown;
pub mod dispatcher;
mod error;
pub mod gate;
pub mod middleware;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod tokens;
pub mod usage;

pub use bag::ArgumentBag;
pub use command::{ChannelType, Command, CommandContext, CommandHandler, Cooldown};
pub use cooldown::CooldownTrigger;
pub use dispatcher::{DispatchOutcome, Dispatcher, DispatcherConfig, Interaction};
pub use error::{ArgumentError, ConfigError};
pub use gate::{GateFailure, Gates};
pub use middleware::{FnMiddleware, Middleware, MiddlewareData, MiddlewareResult};
pub use registry::CommandRegistry;
pub use resolver::ArgumentResolver;
pub use schema::{ArgumentKind, ArgumentSchema, ArgumentSpec, Scrap, Validation, Validator};
pub use tokens::RawValue;

pub use arg_types::{ArgumentValue, TypeRegistry};
pub use cooldown_store::CooldownScope;
