use crate::model::{Amount, TimeRange};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Whether a transaction adds money to the balance or takes it away.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    Income,
    #[default]
    Expense,
}

serde_plain::derive_display_from_serialize!(TxKind);
serde_plain::derive_fromstr_from_deserialize!(TxKind);

impl TxKind {
    pub fn is_expense(&self) -> bool {
        matches!(self, TxKind::Expense)
    }

    pub(crate) fn from_is_expense(is_expense: bool) -> Self {
        if is_expense {
            TxKind::Expense
        } else {
            TxKind::Income
        }
    }
}

/// A single recorded income or expense.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    /// Assigned by the database, increasing in insertion order.
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) date: NaiveDate,
    /// Always positive; the direction comes from `kind`.
    pub(crate) amount: Amount,
    pub(crate) kind: TxKind,
}

impl Transaction {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn kind(&self) -> TxKind {
        self.kind
    }

    /// The effect this transaction has on the balance.
    pub fn signed_amount(&self) -> Amount {
        match self.kind {
            TxKind::Income => self.amount,
            TxKind::Expense => Amount::new(-self.amount.to_i64()),
        }
    }
}

/// An ordered list of transactions, newest first when read from the database.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transactions(Vec<Transaction>);

impl Transactions {
    pub fn new(data: Vec<Transaction>) -> Self {
        Self(data)
    }

    pub fn data(&self) -> &[Transaction] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Transaction> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_income(&self) -> Amount {
        self.total(TxKind::Income)
    }

    pub fn total_expense(&self) -> Amount {
        self.total(TxKind::Expense)
    }

    fn total(&self, kind: TxKind) -> Amount {
        self.0
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.amount)
            .sum()
    }

    /// The sum of expenses recorded on `date`.
    pub fn spending_on(&self, date: NaiveDate) -> Amount {
        self.0
            .iter()
            .filter(|t| t.kind.is_expense() && t.date == date)
            .map(|t| t.amount)
            .sum()
    }

    /// Returns the transactions whose date falls inside `range`, preserving order.
    pub fn within(&self, range: TimeRange, today: NaiveDate) -> Transactions {
        Transactions(
            self.0
                .iter()
                .filter(|t| range.contains(t.date, today))
                .cloned()
                .collect(),
        )
    }

    /// Returns at most `n` transactions from the front of the list.
    pub fn take(&self, n: usize) -> Transactions {
        Transactions(self.0.iter().take(n).cloned().collect())
    }
}

#[cfg(test)]
pub(crate) fn tx(id: i64, title: &str, date: NaiveDate, amount: i64, kind: TxKind) -> Transaction {
    Transaction {
        id,
        title: title.to_string(),
        date,
        amount: Amount::new(amount),
        kind,
    }
}
