use crate::model::{
    Amount, Bill, BudgetStatus, DonutChart, SavingPlan, TimeRange, Transaction, Transactions,
    UserPrefs,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How many transactions the dashboard shows.
pub const RECENT_TRANSACTIONS: usize = 5;

/// Income and expense totals over a time range.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub range: TimeRange,
    pub total_income: Amount,
    pub total_expense: Amount,
}

impl Totals {
    pub fn new(transactions: &Transactions, range: TimeRange, today: NaiveDate) -> Self {
        let in_range = transactions.within(range, today);
        Self {
            range,
            total_income: in_range.total_income(),
            total_expense: in_range.total_expense(),
        }
    }
}

/// Everything needed to render the home and activity screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub user_name: String,
    pub today: NaiveDate,
    pub balance: Amount,
    #[serde(flatten)]
    pub totals: Totals,
    pub total_saved: Amount,
    pub chart: DonutChart,
    pub budget: BudgetStatus,
    pub recent: Vec<Transaction>,
    /// Bills due today or earlier, soonest first.
    pub bills_due: Vec<Bill>,
}

impl Dashboard {
    pub fn new(
        prefs: &UserPrefs,
        transactions: &Transactions,
        bills: &[Bill],
        savings: &[SavingPlan],
        range: TimeRange,
        today: NaiveDate,
    ) -> Self {
        let totals = Totals::new(transactions, range, today);
        let total_saved: Amount = savings.iter().map(|s| s.current()).sum();
        let chart = DonutChart::new(totals.total_income, totals.total_expense, total_saved);
        let budget = BudgetStatus::evaluate(prefs.daily_budget(), transactions.spending_on(today));
        Self {
            user_name: prefs.user_name().to_string(),
            today,
            balance: prefs.total_balance(),
            totals,
            total_saved,
            chart,
            budget,
            recent: transactions.take(RECENT_TRANSACTIONS).into_inner(),
            bills_due: bills
                .iter()
                .filter(|b| b.due_date() <= today)
                .cloned()
                .collect(),
        }
    }
}
