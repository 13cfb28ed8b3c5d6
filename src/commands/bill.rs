//! Bill command handlers.

use crate::args::{BillIdArgs, SaveBillArgs};
use crate::commands::{require_name, require_positive, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{format_date, today, Bill, Payment};
use crate::{Config, Result};
use anyhow::anyhow;
use serde::Serialize;

/// A bill together with whether it needs attention today.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillView {
    #[serde(flatten)]
    pub bill: Bill,
    pub due_today: bool,
    /// The due date has passed without the bill being paid.
    pub overdue: bool,
}

impl BillView {
    fn new(bill: Bill) -> Self {
        let today = today();
        Self {
            due_today: bill.is_due(today),
            overdue: bill.is_overdue(today),
            bill,
        }
    }
}

/// Adds a new bill, or replaces the bill with the given `id`.
///
/// # Errors
///
/// - Returns an error if the title is empty or the price is not positive.
/// - Returns an error if `id` is given and no such bill exists.
pub async fn save_bill(config: Config, args: SaveBillArgs) -> Result<Out<Bill>> {
    let title = require_name("bill title", &args.title).pub_result(ErrorType::Request)?;
    require_positive("price", args.price).pub_result(ErrorType::Request)?;

    let mut bill = Bill::new(title, args.price, args.due_date, args.recurrence);
    let verb = match args.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => {
            find(&config, id).await?;
            bill.id = id.to_string();
            "Updated"
        }
        None => "Added",
    };
    config
        .db()
        .upsert_bill(&bill)
        .await
        .pub_result(ErrorType::Database)?;

    let message = format!(
        "{verb} bill '{}' of {} due {} ({}), ID {}",
        bill.title(),
        bill.price(),
        format_date(bill.due_date()),
        bill.recurrence(),
        bill.id()
    );
    Ok(Out::new(message, bill))
}

/// Marks a bill as paid. A one-off bill is removed and a recurring bill moves to its next due
/// date. The balance is not changed.
pub async fn pay_bill(config: Config, args: BillIdArgs) -> Result<Out<Payment>> {
    let bill = find(&config, &args.id).await?;
    let payment = config
        .db()
        .pay_bill(&args.id)
        .await
        .pub_result(ErrorType::Database)?;
    let message = match &payment {
        Payment::Removed { .. } => format!("Paid '{}', the bill has been removed", bill.title()),
        Payment::Advanced { next_due_date, .. } => format!(
            "Paid '{}', next due {}",
            bill.title(),
            format_date(*next_due_date)
        ),
    };
    Ok(Out::new(message, payment))
}

pub async fn delete_bill(config: Config, args: BillIdArgs) -> Result<Out<Bill>> {
    find(&config, &args.id).await?;
    let bill = config
        .db()
        .delete_bill(&args.id)
        .await
        .pub_result(ErrorType::Database)?;
    let message = format!("Deleted bill '{}'", bill.title());
    Ok(Out::new(message, bill))
}

/// Lists all bills, soonest due date first, flagging the ones that are due.
pub async fn list_bills(config: Config) -> Result<Out<Vec<BillView>>> {
    let bills: Vec<BillView> = config
        .db()
        .bills()
        .await
        .pub_result(ErrorType::Database)?
        .into_iter()
        .map(BillView::new)
        .collect();
    let due = bills.iter().filter(|b| b.due_today || b.overdue).count();
    let message = format!("Found {} bills, {due} due", bills.len());
    Ok(Out::new(message, bills))
}

async fn find(config: &Config, id: &str) -> Result<Bill> {
    config
        .db()
        .get_bill(id)
        .await
        .pub_result(ErrorType::Database)?
        .ok_or_else(|| anyhow!("Bill not found: {id}"))
        .pub_result(ErrorType::Request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Recurrence};
    use crate::test::TestEnv;
    use chrono::{Days, Months};

    fn save_args(title: &str, price: i64, recurrence: Recurrence) -> SaveBillArgs {
        SaveBillArgs::new(None, title, Amount::new(price), today(), recurrence)
    }

    #[tokio::test]
    async fn test_save_bill_add_and_update() {
        let env = TestEnv::new().await;
        let out = save_bill(env.config(), save_args("Internet", 350_000, Recurrence::Monthly))
            .await
            .unwrap();
        let bill = out.structure().unwrap().clone();
        assert!(out.message().starts_with("Added"));

        let mut update = save_args("Internet Fiber", 400_000, Recurrence::Monthly);
        update.id = Some(bill.id().to_string());
        let out = save_bill(env.config(), update).await.unwrap();
        assert!(out.message().starts_with("Updated"));
        assert_eq!(out.structure().unwrap().id(), bill.id());

        let bills = env.config().db().bills().await.unwrap();
        assert_eq!(bills.len(), 1);
        assert_eq!(bills[0].title(), "Internet Fiber");
    }

    #[tokio::test]
    async fn test_save_bill_validation() {
        let env = TestEnv::new().await;
        assert!(save_bill(env.config(), save_args("  ", 1, Recurrence::Once))
            .await
            .is_err());
        assert!(save_bill(env.config(), save_args("Air", 0, Recurrence::Once))
            .await
            .is_err());

        let mut unknown = save_args("Air", 1, Recurrence::Once);
        unknown.id = Some("does-not-exist".to_string());
        let err = save_bill(env.config(), unknown).await.unwrap_err();
        assert!(err.to_string().contains("Bill not found"));
        assert!(env.config().db().bills().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pay_recurring_and_one_off_bills() {
        let env = TestEnv::new().await;
        env.set_balance(1_000_000).await;
        let monthly = env
            .insert_bill("Listrik", 200_000, today(), Recurrence::Monthly)
            .await;
        let once = env
            .insert_bill("Servis", 300_000, today(), Recurrence::Once)
            .await;

        let out = pay_bill(env.config(), BillIdArgs::new(&monthly)).await.unwrap();
        let expected = today().checked_add_months(Months::new(1)).unwrap();
        assert_eq!(
            out.structure().unwrap(),
            &Payment::Advanced {
                id: monthly.clone(),
                next_due_date: expected
            }
        );

        let out = pay_bill(env.config(), BillIdArgs::new(&once)).await.unwrap();
        assert!(out.message().contains("removed"));
        assert_eq!(env.config().db().bills().await.unwrap().len(), 1);
        assert_eq!(env.balance().await, 1_000_000);

        assert!(pay_bill(env.config(), BillIdArgs::new(&once)).await.is_err());
    }

    #[tokio::test]
    async fn test_list_and_delete_bills() {
        let env = TestEnv::new().await;
        let yesterday = today().checked_sub_days(Days::new(1)).unwrap();
        let next_week = today().checked_add_days(Days::new(7)).unwrap();
        env.insert_bill("Later", 1_000, next_week, Recurrence::Weekly)
            .await;
        let overdue = env
            .insert_bill("Overdue", 1_000, yesterday, Recurrence::Yearly)
            .await;

        let out = list_bills(env.config()).await.unwrap();
        let bills = out.structure().unwrap();
        assert_eq!(out.message(), "Found 2 bills, 1 due");
        assert_eq!(bills[0].bill.title(), "Overdue");
        assert!(bills[0].overdue);
        assert!(!bills[0].due_today);
        assert!(!bills[1].due_today && !bills[1].overdue);

        delete_bill(env.config(), BillIdArgs::new(&overdue))
            .await
            .unwrap();
        let err = delete_bill(env.config(), BillIdArgs::new(&overdue))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("request error"), "got: {err}");
        assert!(err.to_string().contains("Bill not found"));
    }

    #[tokio::test]
    async fn test_missing_bill_is_a_request_error() {
        let env = TestEnv::new().await;
        for err in [
            pay_bill(env.config(), BillIdArgs::new("nope")).await.unwrap_err(),
            delete_bill(env.config(), BillIdArgs::new("nope"))
                .await
                .unwrap_err(),
        ] {
            assert_eq!(err.to_string(), "request error: Bill not found: nope");
        }
    }
}
