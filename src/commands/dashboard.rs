use crate::args::DashboardArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{today, Dashboard};
use crate::{Config, Result};

/// Computes the dashboard: balance, income and expense totals over `args.range`, the amount held
/// in saving plans, the donut chart, today's budget status, recent transactions and bills due.
pub async fn dashboard(config: Config, args: DashboardArgs) -> Result<Out<Dashboard>> {
    let db = config.db();
    let prefs = db.prefs().await.pub_result(ErrorType::Database)?;
    let transactions = db.transactions().await.pub_result(ErrorType::Database)?;
    let bills = db.bills().await.pub_result(ErrorType::Database)?;
    let savings = db.savings().await.pub_result(ErrorType::Database)?;

    let dash = Dashboard::new(
        &prefs,
        &transactions,
        &bills,
        &savings,
        args.range,
        today(),
    );
    let message = format!(
        "Hello {}! Balance {}, income {} and expense {} ({}), saved {}, {} bills due",
        dash.user_name,
        dash.balance,
        dash.totals.total_income,
        dash.totals.total_expense,
        dash.totals.range,
        dash.total_saved,
        dash.bills_due.len()
    );
    Ok(Out::new(message, dash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, BudgetLevel, Recurrence, TimeRange, TxKind};
    use crate::test::TestEnv;
    use chrono::Days;

    #[tokio::test]
    async fn test_empty_dashboard() {
        let env = TestEnv::new().await;
        let out = dashboard(env.config(), DashboardArgs::default()).await.unwrap();
        let dash = out.structure().unwrap();
        assert!(dash.balance.is_zero());
        assert!(dash.chart.total.is_zero());
        assert!(dash.recent.is_empty());
        assert_eq!(dash.budget.level, BudgetLevel::Unset);
    }

    #[tokio::test]
    async fn test_dashboard_with_data() {
        let env = TestEnv::new().await;
        let last_year = today().checked_sub_days(Days::new(366)).unwrap();
        env.insert_transaction("Bonus", last_year, 300_000, TxKind::Income)
            .await;
        env.insert_transaction("Gaji", today(), 700_000, TxKind::Income)
            .await;
        env.insert_transaction("Makan", today(), 200_000, TxKind::Expense)
            .await;
        env.insert_bill("Air", 50_000, today(), Recurrence::Monthly)
            .await;
        let id = env.insert_saving("Motor", 1_000_000).await;
        env.config()
            .db()
            .deposit_saving(&id, Amount::new(100_000), today())
            .await
            .unwrap();

        let out = dashboard(env.config(), DashboardArgs::new(TimeRange::Day))
            .await
            .unwrap();
        let dash = out.structure().unwrap();
        assert_eq!(dash.balance.to_i64(), 700_000);
        assert_eq!(dash.totals.total_income.to_i64(), 700_000);
        // The deposit is recorded as an expense
        assert_eq!(dash.totals.total_expense.to_i64(), 300_000);
        assert_eq!(dash.total_saved.to_i64(), 100_000);
        assert_eq!(dash.chart.total.to_i64(), 1_100_000);
        assert_eq!(dash.recent.len(), 4);
        assert_eq!(dash.recent[0].title(), "Deposit to Motor");
        assert_eq!(dash.bills_due.len(), 1);

        let out = dashboard(env.config(), DashboardArgs::default()).await.unwrap();
        assert_eq!(out.structure().unwrap().totals.total_income.to_i64(), 1_000_000);
    }
}
