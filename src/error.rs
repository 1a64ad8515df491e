//! Crate-wide error taxonomy.
//!
//! Repository and gateway operations return [`Error`]; the HTTP layer in
//! [`crate::server`] maps each variant to a status code:
//!
//! | Variant | Status |
//! |---------|--------|
//! | `Validation` | 400 |
//! | `NotFound` | 404 |
//! | `Config` | 500 |
//! | `Upstream` | 500 |
//! | `Db` / `Http` | 500 |

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required input was missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// No note exists for the requested id (or its source text is empty).
    #[error("{0}")]
    NotFound(String),

    /// The LLM gateway is misconfigured (e.g. `LLM_API_KEY` unset).
    #[error("{0}")]
    Config(String),

    /// The upstream generative-text API returned a non-success response.
    #[error("LLM API call failed with status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error(transparent)]
    Db(#[from] sqlx::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
