//! These structs provide the CLI interface for the persony CLI. The argument structs for commands
//! that are also exposed as MCP tools derive `Deserialize` and `JsonSchema` so that the same type
//! serves as the tool's parameters.

use crate::model::{
    deserialize_date, deserialize_optional_date, parse_date, Amount, Recurrence, SavingIcon,
    TimeRange, TxKind,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing::level_filters::LevelFilter;

/// persony: A command-line tool for tracking personal finances.
///
/// Record income and expenses, keep track of recurring bills, put money aside into saving plans
/// and keep an eye on a daily spending budget. Amounts are whole Rupiah and may be written as
/// `1500000`, `1.500.000` or `Rp 1.500.000`. Dates may be written as `2025-03-01` or `1/3/2025`.
///
/// There is also a mode in which an AI agent can use this program through the mcp subcommand.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file and an empty database.
    ///
    /// This is the first command you should run. By default the data lives in $HOME/persony; pass
    /// --persony-home or set PERSONY_HOME to put it somewhere else.
    Init(InitArgs),
    /// Show the profile, or rename the user with --name.
    Profile(ProfileArgs),
    /// Add, delete or list income and expense transactions.
    #[command(alias = "tx")]
    Transaction(TransactionArgs),
    /// Save, pay, delete or list bills.
    Bill(BillArgs),
    /// Manage saving plans and move money in and out of them.
    Saving(SavingArgs),
    /// Set the daily budget or check today's spending against it.
    Budget(BudgetArgs),
    /// Show the balance, totals, chart breakdown, budget, recent transactions and bills due.
    Dashboard(DashboardArgs),
    /// Write a CSV report of the balance, totals and the transaction history.
    Report(ReportArgs),
    /// Delete all transactions, bills and saving plans and reset the profile. A backup of the
    /// database is taken first.
    Reset(ResetArgs),
    /// Run as an MCP server over stdio for use by AI agents.
    Mcp(McpArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where persony data and configuration is held. Defaults to ~/persony
    #[arg(long, env = "PERSONY_HOME", default_value_t = default_persony_home())]
    persony_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, persony_home: PathBuf) -> Self {
        Self {
            log_level,
            persony_home: persony_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn persony_home(&self) -> &DisplayPath {
        &self.persony_home
    }
}

/// Parses a date given on the command line as `YYYY-MM-DD` or `d/M/yyyy`.
fn date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| format!("{e:#}"))
}

/// (Not shown): Args for the `persony init` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct InitArgs {
    /// The name to show on the dashboard.
    #[arg(long)]
    name: Option<String>,

    /// The balance to start with.
    #[arg(long)]
    balance: Option<Amount>,
}

impl InitArgs {
    pub fn new(name: Option<String>, balance: Option<Amount>) -> Self {
        Self { name, balance }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn balance(&self) -> Option<Amount> {
        self.balance
    }
}

/// (Not shown): Args for the `persony profile` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ProfileArgs {
    /// Change the user name.
    #[arg(long)]
    name: Option<String>,
}

impl ProfileArgs {
    pub fn new(name: Option<String>) -> Self {
        Self { name }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

// -------------------------------------------------------------------------------------------------
// Transactions
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Parser, Clone)]
pub struct TransactionArgs {
    #[command(subcommand)]
    command: TransactionSubcommand,
}

impl TransactionArgs {
    pub fn command(&self) -> &TransactionSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum TransactionSubcommand {
    /// Record an income or an expense and apply it to the balance.
    Add(AddTransactionArgs),
    /// Delete a transaction and reverse its effect on the balance.
    Delete(DeleteTransactionArgs),
    /// List transactions, newest first.
    List(ListTransactionsArgs),
}

/// Records an income or an expense.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct AddTransactionArgs {
    /// What the money was for, e.g. "Lunch" or "Salary".
    #[arg(long)]
    pub(crate) title: String,

    /// The amount in whole Rupiah. Must be positive, the direction comes from `kind`.
    #[arg(long)]
    #[schemars(with = "String")]
    pub(crate) amount: Amount,

    /// Either `income` or `expense`. Defaults to `expense`.
    #[arg(long, value_enum, default_value_t)]
    #[serde(default)]
    pub(crate) kind: TxKind,

    /// The date of the transaction as YYYY-MM-DD or D/M/YYYY. Defaults to today.
    #[arg(long, value_parser = date_arg)]
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    #[schemars(with = "Option<String>")]
    pub(crate) date: Option<NaiveDate>,
}

impl AddTransactionArgs {
    pub fn new(
        title: impl Into<String>,
        amount: Amount,
        kind: TxKind,
        date: Option<NaiveDate>,
    ) -> Self {
        Self {
            title: title.into(),
            amount,
            kind,
            date,
        }
    }
}

/// Deletes a transaction by ID.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct DeleteTransactionArgs {
    /// The ID of the transaction to delete.
    pub(crate) id: i64,
}

impl DeleteTransactionArgs {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}

/// Lists transactions.
#[derive(Debug, Default, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct ListTransactionsArgs {
    /// Only include transactions in this window: day, week, month, year or all.
    #[arg(long, value_enum, default_value_t)]
    #[serde(default)]
    pub(crate) range: TimeRange,

    /// The maximum number of transactions to return.
    #[arg(long)]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

impl ListTransactionsArgs {
    pub fn new(range: TimeRange, limit: Option<usize>) -> Self {
        Self { range, limit }
    }
}

// -------------------------------------------------------------------------------------------------
// Bills
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Parser, Clone)]
pub struct BillArgs {
    #[command(subcommand)]
    command: BillSubcommand,
}

impl BillArgs {
    pub fn command(&self) -> &BillSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum BillSubcommand {
    /// Add a bill, or replace an existing one when --id is given.
    Save(SaveBillArgs),
    /// Mark a bill as paid. One-off bills are removed, recurring bills move to their next due date.
    Pay(BillIdArgs),
    /// Delete a bill.
    Delete(BillIdArgs),
    /// List bills, soonest due date first.
    List,
}

/// Adds a bill, or replaces an existing bill when `id` is given.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct SaveBillArgs {
    /// The ID of an existing bill to replace. Leave empty to add a new bill.
    #[arg(long)]
    #[serde(default)]
    pub(crate) id: Option<String>,

    /// The name of the bill, e.g. "Internet".
    #[arg(long)]
    pub(crate) title: String,

    /// The price in whole Rupiah.
    #[arg(long)]
    #[schemars(with = "String")]
    pub(crate) price: Amount,

    /// When the bill is next due, as YYYY-MM-DD or D/M/YYYY.
    #[arg(long, value_parser = date_arg)]
    #[serde(deserialize_with = "deserialize_date")]
    #[schemars(with = "String")]
    pub(crate) due_date: NaiveDate,

    /// How often the bill repeats: once, weekly, monthly or yearly. Defaults to once.
    #[arg(long, value_enum, default_value_t)]
    #[serde(default)]
    pub(crate) recurrence: Recurrence,
}

impl SaveBillArgs {
    pub fn new(
        id: Option<String>,
        title: impl Into<String>,
        price: Amount,
        due_date: NaiveDate,
        recurrence: Recurrence,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            due_date,
            recurrence,
        }
    }
}

/// Identifies a bill.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct BillIdArgs {
    /// The ID of the bill.
    pub(crate) id: String,
}

impl BillIdArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

// -------------------------------------------------------------------------------------------------
// Savings
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Parser, Clone)]
pub struct SavingArgs {
    #[command(subcommand)]
    command: SavingSubcommand,
}

impl SavingArgs {
    pub fn command(&self) -> &SavingSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum SavingSubcommand {
    /// Create a saving plan.
    Add(AddSavingArgs),
    /// Change the name, target, location or icon of a saving plan.
    Update(UpdateSavingArgs),
    /// Delete a saving plan. Money held in the plan is not returned to the balance.
    Delete(SavingIdArgs),
    /// Move money from the balance into a saving plan.
    Deposit(SavingTransferArgs),
    /// Move money from a saving plan back to the balance.
    Withdraw(SavingTransferArgs),
    /// List saving plans with their progress.
    List,
}

/// Creates a saving plan.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct AddSavingArgs {
    /// The name of the plan, e.g. "New Laptop".
    #[arg(long)]
    pub(crate) name: String,

    /// The target amount in whole Rupiah.
    #[arg(long)]
    #[schemars(with = "String")]
    pub(crate) target: Amount,

    /// Where the money is kept, e.g. a bank name.
    #[arg(long, default_value = "")]
    #[serde(default)]
    pub(crate) location: String,

    /// The icon to show next to the plan.
    #[arg(long, value_enum, default_value_t)]
    #[serde(default)]
    pub(crate) icon: SavingIcon,
}

impl AddSavingArgs {
    pub fn new(
        name: impl Into<String>,
        target: Amount,
        location: impl Into<String>,
        icon: SavingIcon,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            location: location.into(),
            icon,
        }
    }
}

/// Changes a saving plan. Only the fields that are given are changed.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct UpdateSavingArgs {
    /// The ID of the saving plan.
    pub(crate) id: String,

    #[arg(long)]
    #[serde(default)]
    pub(crate) name: Option<String>,

    #[arg(long)]
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub(crate) target: Option<Amount>,

    #[arg(long)]
    #[serde(default)]
    pub(crate) location: Option<String>,

    #[arg(long, value_enum)]
    #[serde(default)]
    pub(crate) icon: Option<SavingIcon>,
}

impl UpdateSavingArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            target: None,
            location: None,
            icon: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn target(mut self, target: Amount) -> Self {
        self.target = Some(target);
        self
    }
}

/// Identifies a saving plan.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct SavingIdArgs {
    /// The ID of the saving plan.
    pub(crate) id: String,
}

impl SavingIdArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Moves money between the balance and a saving plan.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct SavingTransferArgs {
    /// The ID of the saving plan.
    pub(crate) id: String,

    /// The amount to move in whole Rupiah.
    #[arg(long)]
    #[schemars(with = "String")]
    pub(crate) amount: Amount,
}

impl SavingTransferArgs {
    pub fn new(id: impl Into<String>, amount: Amount) -> Self {
        Self {
            id: id.into(),
            amount,
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Budget, dashboard and maintenance
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Parser, Clone)]
pub struct BudgetArgs {
    #[command(subcommand)]
    command: BudgetSubcommand,
}

impl BudgetArgs {
    pub fn command(&self) -> &BudgetSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum BudgetSubcommand {
    /// Set the daily budget. Zero turns the budget off.
    Set(SetBudgetArgs),
    /// Compare today's spending with the daily budget.
    Status,
}

/// Sets the daily spending budget.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct SetBudgetArgs {
    /// The daily budget in whole Rupiah. Zero turns the budget off.
    #[schemars(with = "String")]
    pub(crate) amount: Amount,
}

impl SetBudgetArgs {
    pub fn new(amount: Amount) -> Self {
        Self { amount }
    }
}

/// Computes the dashboard.
#[derive(Debug, Default, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct DashboardArgs {
    /// The window for the income and expense totals: day, week, month, year or all.
    #[arg(long, value_enum, default_value_t)]
    #[serde(default)]
    pub(crate) range: TimeRange,
}

impl DashboardArgs {
    pub fn new(range: TimeRange) -> Self {
        Self { range }
    }
}

/// (Not shown): Args for the `persony report` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ReportArgs {
    /// Where to write the CSV file. Defaults to a dated file in the reports directory.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ReportArgs {
    pub fn new(output: Option<PathBuf>) -> Self {
        Self { output }
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

/// (Not shown): Args for the `persony reset` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ResetArgs {
    /// Confirm that all data should be deleted.
    #[arg(long)]
    yes: bool,
}

impl ResetArgs {
    pub fn new(yes: bool) -> Self {
        Self { yes }
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

/// (Not shown): Args for the `persony mcp` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct McpArgs {}

fn default_persony_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("persony"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --persony-home or PERSONY_HOME instead of relying on the \
                default persony home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("persony")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut full = vec!["persony", "--persony-home", "/tmp/p"];
        full.extend_from_slice(args);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_parse_add_transaction() {
        let args = parse(&[
            "tx", "add", "--title", "Makan", "--amount", "Rp 25.000", "--date", "5/3/2025",
        ]);
        let Command::Transaction(tx) = args.command() else {
            panic!("expected a transaction command");
        };
        let TransactionSubcommand::Add(add) = tx.command() else {
            panic!("expected add");
        };
        assert_eq!(add.title, "Makan");
        assert_eq!(add.amount.to_i64(), 25_000);
        assert_eq!(add.kind, TxKind::Expense);
        assert_eq!(add.date, NaiveDate::from_ymd_opt(2025, 3, 5));
        assert_eq!(args.common().persony_home().path(), Path::new("/tmp/p"));
        assert_eq!(args.common().log_level(), LevelFilter::INFO);
    }

    #[test]
    fn test_parse_save_bill_with_none_alias() {
        let args = parse(&[
            "bill",
            "save",
            "--title",
            "Servis",
            "--price",
            "300000",
            "--due-date",
            "2025-04-01",
            "--recurrence",
            "none",
        ]);
        let Command::Bill(bill) = args.command() else {
            panic!("expected a bill command");
        };
        let BillSubcommand::Save(save) = bill.command() else {
            panic!("expected save");
        };
        assert_eq!(save.recurrence, Recurrence::Once);
        assert!(save.id.is_none());
    }

    #[test]
    fn test_parse_rejects_bad_amount_and_date() {
        let base = ["persony", "tx", "add", "--title", "x"];
        let mut bad_amount = base.to_vec();
        bad_amount.extend(["--amount", "12,5"]);
        assert!(Args::try_parse_from(bad_amount).is_err());

        let mut bad_date = base.to_vec();
        bad_date.extend(["--amount", "1", "--date", "yesterday"]);
        assert!(Args::try_parse_from(bad_date).is_err());
    }

    #[test]
    fn test_deserialize_tool_params() {
        let args: AddTransactionArgs =
            serde_json::from_str(r#"{"title": "Gaji", "amount": 5000000, "kind": "income"}"#)
                .unwrap();
        assert_eq!(args.kind, TxKind::Income);
        assert_eq!(args.amount.to_i64(), 5_000_000);
        assert!(args.date.is_none());

        let args: SaveBillArgs = serde_json::from_str(
            r#"{"title": "Kos", "price": "Rp 1.500.000", "due_date": "2025-03-31",
                "recurrence": "monthly"}"#,
        )
        .unwrap();
        assert_eq!(args.recurrence, Recurrence::Monthly);
        assert_eq!(args.price.to_i64(), 1_500_000);
    }

    #[test]
    fn test_deserialize_tool_params_day_month_year_dates() {
        let args: SaveBillArgs = serde_json::from_str(
            r#"{"title": "Internet", "price": 350000, "due_date": "31/1/2025"}"#,
        )
        .unwrap();
        assert_eq!(args.due_date, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());

        let args: AddTransactionArgs =
            serde_json::from_str(r#"{"title": "Makan", "amount": 20000, "date": "5/3/2025"}"#)
                .unwrap();
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2025, 3, 5));

        let args: AddTransactionArgs =
            serde_json::from_str(r#"{"title": "Makan", "amount": 20000, "date": null}"#).unwrap();
        assert!(args.date.is_none());

        let err = serde_json::from_str::<SaveBillArgs>(
            r#"{"title": "Internet", "price": 350000, "due_date": "soon"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unable to parse 'soon'"));
    }
}
