use crate::args::InitArgs;
use crate::commands::{require_name, require_non_negative, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::UserPrefs;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its subdirectories, an initial `config.json` file and an empty
/// database. The user name and opening balance are stored when given.
///
/// # Arguments
/// - `persony_home` - The directory that will be the root of data directory, e.g. `$HOME/persony`
/// - `args` - The optional user name and opening balance.
///
/// # Errors
/// - Returns an error if any file operations fail or the directory already holds a database.
pub async fn init(persony_home: &Path, args: InitArgs) -> Result<Out<UserPrefs>> {
    let name = args
        .name()
        .map(|name| require_name("user name", name))
        .transpose()
        .pub_result(ErrorType::Request)?;
    if let Some(balance) = args.balance() {
        require_non_negative("opening balance", balance).pub_result(ErrorType::Request)?;
    }

    let config = Config::create(persony_home)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;

    let mut prefs = config.db().prefs().await.pub_result(ErrorType::Database)?;
    if let Some(name) = name {
        prefs = config
            .db()
            .set_user_name(&name)
            .await
            .pub_result(ErrorType::Database)?;
    }
    if let Some(balance) = args.balance() {
        prefs = config
            .db()
            .set_balance(balance)
            .await
            .pub_result(ErrorType::Database)?;
    }

    let message = format!(
        "Created the persony directory at {} for {} with a balance of {}",
        config.root().display(),
        prefs.user_name(),
        prefs.total_balance()
    );
    Ok(Out::new(message, prefs))
}
