use crate::args::ResetArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::anyhow;
use std::path::PathBuf;
use tracing::warn;

/// Deletes all transactions, bills and saving plans and resets the profile to its defaults with a
/// zero balance. The database file is copied into the backups directory first.
///
/// # Errors
///
/// - Returns an error unless `args.yes()` confirms the reset.
pub async fn reset(config: Config, args: ResetArgs) -> Result<Out<PathBuf>> {
    if !args.yes() {
        return Err(anyhow!(
            "Resetting deletes all of your data, pass --yes to confirm"
        ))
        .pub_result(ErrorType::Request);
    }
    let backup = config
        .backup()
        .copy_sqlite()
        .await
        .pub_result(ErrorType::Filesystem)?;
    config.db().reset().await.pub_result(ErrorType::Database)?;
    warn!("All data was deleted, a backup is at {}", backup.display());
    let message = format!(
        "Deleted all data. The previous database was saved to {}",
        backup.display()
    );
    Ok(Out::new(message, backup))
}
