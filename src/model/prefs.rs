use crate::model::Amount;
use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_NAME: &str = "New User";

/// The single row of per-user settings and the running balance.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserPrefs {
    pub(crate) user_name: String,
    /// Zero means no budget has been set.
    pub(crate) daily_budget: Amount,
    pub(crate) total_balance: Amount,
}

impl Default for UserPrefs {
    fn default() -> Self {
        Self {
            user_name: DEFAULT_USER_NAME.to_string(),
            daily_budget: Amount::ZERO,
            total_balance: Amount::ZERO,
        }
    }
}

impl UserPrefs {
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn daily_budget(&self) -> Amount {
        self.daily_budget
    }

    pub fn total_balance(&self) -> Amount {
        self.total_balance
    }
}
