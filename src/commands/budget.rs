use crate::args::SetBudgetArgs;
use crate::commands::{require_non_negative, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{today, BudgetAlert, BudgetLevel, BudgetStatus};
use crate::{Config, Result};
use tracing::warn;

/// Sets the daily spending budget. Zero turns the budget off.
pub async fn set_budget(config: Config, args: SetBudgetArgs) -> Result<Out<BudgetStatus>> {
    require_non_negative("daily budget", args.amount).pub_result(ErrorType::Request)?;
    config
        .db()
        .set_daily_budget(args.amount)
        .await
        .pub_result(ErrorType::Database)?;
    let status = evaluate(&config).await?;
    let message = if args.amount.is_zero() {
        "Turned off the daily budget".to_string()
    } else {
        format!("Set the daily budget to {}", args.amount)
    };
    Ok(Out::new(message, status))
}

/// Compares today's spending with the daily budget.
pub async fn budget_status(config: Config) -> Result<Out<BudgetStatus>> {
    let status = evaluate(&config).await?;
    let message = match status.level {
        BudgetLevel::Unset => "No daily budget is set".to_string(),
        BudgetLevel::Ok | BudgetLevel::Warning => format!(
            "Spent {} of {} today, {} left",
            status.daily_spending, status.daily_budget, status.remaining
        ),
        BudgetLevel::Over => format!(
            "Over budget: spent {} of {} today",
            status.daily_spending, status.daily_budget
        ),
    };
    Ok(Out::new(message, status))
}

async fn evaluate(config: &Config) -> Result<BudgetStatus> {
    let prefs = config.db().prefs().await.pub_result(ErrorType::Database)?;
    let transactions = config
        .db()
        .transactions()
        .await
        .pub_result(ErrorType::Database)?;
    Ok(BudgetStatus::evaluate(
        prefs.daily_budget(),
        transactions.spending_on(today()),
    ))
}

/// Checks the budget after money has been spent and logs a warning when it has been reached. The
/// spending has already been committed, so a failed check is logged rather than returned.
pub(super) async fn check_budget(config: &Config) -> Option<BudgetAlert> {
    let alert = match evaluate(config).await {
        Ok(status) => status.alert(),
        Err(e) => {
            warn!("Unable to check the daily budget: {e:#}");
            return None;
        }
    };
    if let Some(alert) = &alert {
        warn!("{}", alert.message);
    }
    alert
}
