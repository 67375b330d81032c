//! Errors produced by the ledger core.
//!
//! - [`Validation`] a draft failed a local rule, no request was sent.
//! - [`Format`] a date could not be parsed for display.
//! - [`Transport`] the request failed or the service answered non-2xx without
//!   a structured body.
//! - [`Remote`] the service answered non-2xx with an `errors` body.
//! - [`Unauthorized`] the service answered 401; the session must be torn down.
//!
//!  [`Validation`]: LedgerError::Validation
//!  [`Format`]: LedgerError::Format
//!  [`Transport`]: LedgerError::Transport
//!  [`Remote`]: LedgerError::Remote
//!  [`Unauthorized`]: LedgerError::Unauthorized
use thiserror::Error;

use crate::{dates::FormatError, validation::ValidationError};

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("transport error: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },
    #[error("{}", messages.join(", "))]
    Remote { status: u16, messages: Vec<String> },
    #[error("session is not authorized")]
    Unauthorized,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LedgerError {
    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            status: err.status().map(|status| status.as_u16()),
            message: err.to_string(),
        }
    }
}
