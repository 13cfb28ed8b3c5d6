use crate::args::ProfileArgs;
use crate::commands::{require_name, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::UserPrefs;
use crate::{Config, Result};

/// Shows the user profile, renaming the user first when a new name is given.
pub async fn profile(config: Config, args: ProfileArgs) -> Result<Out<UserPrefs>> {
    let prefs = match args.name() {
        Some(name) => {
            let name = require_name("user name", name).pub_result(ErrorType::Request)?;
            config
                .db()
                .set_user_name(&name)
                .await
                .pub_result(ErrorType::Database)?
        }
        None => config.db().prefs().await.pub_result(ErrorType::Database)?,
    };
    let message = format!(
        "{}: balance {}, daily budget {}",
        prefs.user_name(),
        prefs.total_balance(),
        prefs.daily_budget()
    );
    Ok(Out::new(message, prefs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_USER_NAME;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_profile_show_and_rename() {
        let env = TestEnv::new().await;
        let out = profile(env.config(), ProfileArgs::default()).await.unwrap();
        assert_eq!(out.structure().unwrap().user_name(), DEFAULT_USER_NAME);

        let out = profile(env.config(), ProfileArgs::new(Some("Rina".to_string())))
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().user_name(), "Rina");
        assert!(out.message().starts_with("Rina:"));

        assert!(profile(env.config(), ProfileArgs::new(Some(" ".to_string())))
            .await
            .is_err());
    }
}
