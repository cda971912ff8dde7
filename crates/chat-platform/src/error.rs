//! Platform collaborator errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Not in a guild")]
    NotInGuild,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
