use crate::model::Amount;
use chrono::{Days, Months, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How often a bill comes due again after it has been paid.
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
pub enum Recurrence {
    /// A one-off bill, removed once paid.
    #[default]
    #[serde(alias = "none")]
    #[value(alias = "none")]
    Once,
    Weekly,
    Monthly,
    Yearly,
}

serde_plain::derive_display_from_serialize!(Recurrence);
serde_plain::derive_fromstr_from_deserialize!(Recurrence);

impl Recurrence {
    /// The due date that follows `date`, or `None` for a one-off bill.
    ///
    /// Months and years are calendar units: when the following month is shorter the date is
    /// clamped to its last day, so 31 January becomes 28 (or 29) February and 29 February becomes
    /// 28 February of the next year.
    pub fn next_date(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Recurrence::Once => None,
            Recurrence::Weekly => date.checked_add_days(Days::new(7)),
            Recurrence::Monthly => date.checked_add_months(Months::new(1)),
            Recurrence::Yearly => date.checked_add_months(Months::new(12)),
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::Once)
    }
}

/// A payable obligation with a due date.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Bill {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) price: Amount,
    pub(crate) due_date: NaiveDate,
    pub(crate) recurrence: Recurrence,
}

/// What happened to a bill when it was paid.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Payment {
    /// A one-off bill was settled and removed.
    Removed { id: String },
    /// A recurring bill moved to its next due date.
    Advanced { id: String, next_due_date: NaiveDate },
}

impl Bill {
    pub fn new(
        title: impl Into<String>,
        price: Amount,
        due_date: NaiveDate,
        recurrence: Recurrence,
    ) -> Self {
        Self {
            id: crate::utils::generate_id(),
            title: title.into(),
            price,
            due_date,
            recurrence,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn price(&self) -> Amount {
        self.price
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn recurrence(&self) -> Recurrence {
        self.recurrence
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.due_date == today
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date < today
    }

    /// Computes the result of paying this bill without touching storage.
    pub fn pay(&self) -> Payment {
        match self.recurrence.next_date(self.due_date) {
            Some(next_due_date) => Payment::Advanced {
                id: self.id.clone(),
                next_due_date,
            },
            None => Payment::Removed {
                id: self.id.clone(),
            },
        }
    }
}
