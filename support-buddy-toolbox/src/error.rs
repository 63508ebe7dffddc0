//! Unified error type for toolbox operations.

use serde::Serialize;
use thiserror::Error;

/// Toolbox error type.
///
/// The pure core (`extract_sections`, `classify_ticket`, the text utilities)
/// never returns one of these; only validators and network collaborators do.
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum ToolboxError {
    /// Input rejected before any request was made.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Transport failure, timeout, or an upstream service reporting failure.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Upstream payload could not be decoded.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Generative-AI backend failed or answered with an unusable payload.
    #[error("AI error: {0}")]
    AiError(String),

    /// Call refused by the sliding-window limiter.
    #[error("Rate limited: retry in {retry_after_secs}s")]
    RateLimited {
        /// Seconds until the oldest call leaves the window.
        retry_after_secs: u64,
    },
}

/// Toolbox result alias.
pub type ToolboxResult<T> = std::result::Result<T, ToolboxError>;
