//! In-memory cooldown cache.
//!
//! Windows are keyed by a deterministic slug built from the command path,
//! the scope and the scope subject. Nothing is persisted.

mod store;
mod types;

pub use store::CooldownStore;
pub use types::*;
