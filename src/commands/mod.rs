//! Command handlers for the persony CLI.
//!
//! This module contains implementations for all CLI subcommands. The MCP tools call the same
//! functions, so every handler returns an `Out<T>` that works for both interfaces.

mod bill;
mod budget;
mod dashboard;
mod init;
mod mcp;
mod profile;
mod report;
mod reset;
mod saving;
mod transaction;

use crate::model::Amount;
use crate::Result;
use anyhow::bail;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use bill::{delete_bill, list_bills, pay_bill, save_bill, BillView};
pub use budget::{budget_status, set_budget};
pub use dashboard::dashboard;
pub use init::init;
pub use mcp::mcp;
pub use profile::profile;
pub use report::{report, ReportSummary};
pub use reset::reset;
pub use saving::{
    add_saving, delete_saving, deposit_saving, list_savings, update_saving, withdraw_saving,
    SavingTransfer,
};
pub use transaction::{
    add_transaction, delete_transaction, list_transactions, TransactionAdded, TransactionDeleted,
};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to both the command line and MCP server interfaces.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Rejects zero and negative amounts given as command input.
fn require_positive(what: &str, amount: Amount) -> Result<()> {
    if !amount.is_positive() {
        bail!("The {what} must be greater than zero, got {amount}");
    }
    Ok(())
}

fn require_non_negative(what: &str, amount: Amount) -> Result<()> {
    if amount.is_negative() {
        bail!("The {what} cannot be negative, got {amount}");
    }
    Ok(())
}

/// Trims `value` and rejects it if nothing is left.
fn require_name(what: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("The {what} cannot be empty");
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_from_message() {
        let out: Out<()> = "done".into();
        assert_eq!(out.message(), "done");
        assert!(out.structure().is_none());
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("amount", Amount::new(1)).is_ok());
        let err = require_positive("amount", Amount::ZERO).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The amount must be greater than zero, got Rp 0"
        );
        assert!(require_positive("amount", Amount::new(-5)).is_err());
    }

    #[test]
    fn test_require_name() {
        assert_eq!(require_name("title", "  Kos  ").unwrap(), "Kos");
        assert!(require_name("title", "   ").is_err());
    }
}
