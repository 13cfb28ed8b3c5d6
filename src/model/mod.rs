//! Types that represent the core data model, such as `Transaction`, `Bill` and `SavingPlan`, and
//! the arithmetic that the dashboards are built from.
mod amount;
mod bill;
mod budget;
mod chart;
mod date;
mod prefs;
mod saving;
mod summary;
pub(crate) mod transaction;

pub use amount::{Amount, AmountError};
pub use bill::{Bill, Payment, Recurrence};
pub use budget::{BudgetAlert, BudgetLevel, BudgetStatus};
pub use chart::{DonutChart, Segment};
pub(crate) use date::{deserialize_date, deserialize_optional_date, format_date};
pub use date::{parse_date, today, TimeRange};
pub use prefs::{UserPrefs, DEFAULT_USER_NAME};
pub use saving::{SavingIcon, SavingPlan, SavingView};
pub use summary::{Dashboard, Totals, RECENT_TRANSACTIONS};
pub use transaction::{Transaction, Transactions, TxKind};
