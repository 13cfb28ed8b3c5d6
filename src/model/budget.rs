//! The daily spending budget check.

use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// Progress above this fraction of the budget is reported as a warning.
const WARNING_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLevel {
    /// No budget has been set.
    Unset,
    Ok,
    Warning,
    Over,
}

serde_plain::derive_display_from_serialize!(BudgetLevel);

/// Today's spending compared against the daily budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub daily_budget: Amount,
    pub daily_spending: Amount,
    /// `daily_budget - daily_spending`, negative once the budget is exceeded.
    pub remaining: Amount,
    /// `daily_spending / daily_budget`, clamped to `[0, 1]`.
    pub progress: f64,
    pub over_budget: bool,
    pub level: BudgetLevel,
}

impl BudgetStatus {
    pub fn evaluate(daily_budget: Amount, daily_spending: Amount) -> Self {
        let is_set = daily_budget.is_positive();
        let over_budget = is_set && daily_spending >= daily_budget;
        let progress = if is_set {
            daily_spending.ratio_of(daily_budget).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let level = if !is_set {
            BudgetLevel::Unset
        } else if over_budget {
            BudgetLevel::Over
        } else if progress > WARNING_THRESHOLD {
            BudgetLevel::Warning
        } else {
            BudgetLevel::Ok
        };
        Self {
            daily_budget,
            daily_spending,
            remaining: Amount::new(
                daily_budget
                    .to_i64()
                    .saturating_sub(daily_spending.to_i64()),
            ),
            progress,
            over_budget,
            level,
        }
    }

    /// Returns an alert when today's spending has reached the budget.
    pub fn alert(&self) -> Option<BudgetAlert> {
        self.over_budget.then(|| BudgetAlert {
            daily_budget: self.daily_budget,
            daily_spending: self.daily_spending,
            message: format!(
                "Daily budget reached! Spending today is {} of {}",
                self.daily_spending, self.daily_budget
            ),
        })
    }
}

/// Raised when the same-day expense total reaches the daily budget.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BudgetAlert {
    pub daily_budget: Amount,
    pub daily_spending: Amount,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(budget: i64, spending: i64) -> BudgetStatus {
        BudgetStatus::evaluate(Amount::new(budget), Amount::new(spending))
    }

    #[test]
    fn test_unset_budget_never_alerts() {
        let s = status(0, 1_000_000);
        assert_eq!(s.level, BudgetLevel::Unset);
        assert!(!s.over_budget);
        assert_eq!(s.progress, 0.0);
        assert!(s.alert().is_none());
    }

    #[test]
    fn test_under_budget() {
        let s = status(100_000, 50_000);
        assert_eq!(s.level, BudgetLevel::Ok);
        assert_eq!(s.remaining.to_i64(), 50_000);
        assert_eq!(s.progress, 0.5);
        assert!(s.alert().is_none());
    }

    #[test]
    fn test_warning_above_eighty_percent() {
        assert_eq!(status(100_000, 80_000).level, BudgetLevel::Ok);
        assert_eq!(status(100_000, 85_000).level, BudgetLevel::Warning);
    }

    #[test]
    fn test_reaching_budget_exactly_is_over() {
        let s = status(100_000, 100_000);
        assert!(s.over_budget);
        assert_eq!(s.level, BudgetLevel::Over);
        assert_eq!(s.remaining.to_i64(), 0);
        let alert = s.alert().unwrap();
        assert!(alert.message.contains("Rp 100.000"));
    }

    #[test]
    fn test_over_budget_clamps_progress() {
        let s = status(100_000, 150_000);
        assert_eq!(s.progress, 1.0);
        assert_eq!(s.remaining.to_i64(), -50_000);
    }
}
