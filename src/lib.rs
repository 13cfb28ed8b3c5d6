//! persony: a personal finance tracker for transactions, bills, saving plans and a daily budget,
//! usable from the command line or as an MCP server.

pub mod args;
mod backup;
pub mod commands;
mod config;
mod db;
mod error;
mod mcp;
pub mod model;
mod utils;

#[cfg(test)]
mod test;

pub use backup::Backup;
pub use config::Config;
pub use error::{Error, ErrorType, Result};
pub use model::Amount;
