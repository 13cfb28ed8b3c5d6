//! Error types shared by the library and the command handlers.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::debug;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The broad category of an error that is surfaced to a user through a command.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The data directory or `config.json` is missing or invalid.
    Config,
    /// A SQLite operation failed or a record was not found.
    Database,
    /// The caller supplied an invalid argument.
    Request,
    /// Reading or writing a file outside of the database failed.
    Filesystem,
    /// The MCP service failed.
    Service,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// Tags an internal error with an `ErrorType` before it leaves a command handler. The full
/// context chain is flattened into the message so that callers see every layer.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error> + Display,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            let e: anyhow::Error = e.into();
            debug!("{error_type} error: {e:?}");
            anyhow::anyhow!("{error_type} error: {e:#}")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_pub_result_keeps_context_chain() {
        let inner: std::result::Result<(), anyhow::Error> = Err(anyhow::anyhow!("row missing"));
        let err = inner
            .context("Unable to pay bill")
            .pub_result(ErrorType::Database)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("database error"), "got: {msg}");
        assert!(msg.contains("Unable to pay bill"));
        assert!(msg.contains("row missing"));
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::Filesystem.to_string(), "filesystem");
        assert_eq!("request".parse::<ErrorType>().unwrap(), ErrorType::Request);
    }
}
