//! Transaction command handlers.

use crate::args::{AddTransactionArgs, DeleteTransactionArgs, ListTransactionsArgs};
use crate::commands::budget::check_budget;
use crate::commands::{require_positive, Out};
use crate::db::Posted;
use crate::error::{ErrorType, IntoResult};
use crate::model::{today, Amount, BudgetAlert, Transaction, Transactions};
use crate::{Config, Result};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// The result of recording a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionAdded {
    pub transaction: Transaction,
    /// The balance after the transaction was applied.
    pub balance: Amount,
    /// Present when this expense brought today's spending to the daily budget.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_alert: Option<BudgetAlert>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDeleted {
    pub transaction: Transaction,
    pub balance: Amount,
}

/// Records an income or an expense and applies it to the balance.
///
/// The date defaults to today. After an expense the daily budget is checked, and if it has been
/// reached the returned structure carries a `BudgetAlert`.
///
/// # Errors
///
/// - Returns an error if the amount is not positive.
/// - Returns an error if a database operation fails.
pub async fn add_transaction(
    config: Config,
    args: AddTransactionArgs,
) -> Result<Out<TransactionAdded>> {
    require_positive("amount", args.amount).pub_result(ErrorType::Request)?;
    let date = args.date.unwrap_or_else(today);
    let Posted {
        transaction,
        balance,
    } = config
        .db()
        .insert_transaction(args.title.trim(), date, args.amount, args.kind)
        .await
        .pub_result(ErrorType::Database)?;

    let budget_alert = if transaction.kind().is_expense() {
        check_budget(&config).await
    } else {
        None
    };

    let mut message = format!(
        "Recorded {} '{}' of {} (ID {}), balance is now {}",
        transaction.kind(),
        transaction.title(),
        transaction.amount(),
        transaction.id(),
        balance
    );
    if let Some(alert) = &budget_alert {
        message = format!("{message}. {}", alert.message);
    }
    Ok(Out::new(
        message,
        TransactionAdded {
            transaction,
            balance,
            budget_alert,
        },
    ))
}

/// Deletes a transaction and reverses its effect on the balance.
pub async fn delete_transaction(
    config: Config,
    args: DeleteTransactionArgs,
) -> Result<Out<TransactionDeleted>> {
    config
        .db()
        .get_transaction(args.id)
        .await
        .pub_result(ErrorType::Database)?
        .ok_or_else(|| anyhow!("Transaction not found: {}", args.id))
        .pub_result(ErrorType::Request)?;
    let Posted {
        transaction,
        balance,
    } = config
        .db()
        .delete_transaction(args.id)
        .await
        .pub_result(ErrorType::Database)?;
    let message = format!(
        "Deleted transaction {} '{}', balance is now {}",
        transaction.id(),
        transaction.title(),
        balance
    );
    Ok(Out::new(
        message,
        TransactionDeleted {
            transaction,
            balance,
        },
    ))
}

/// Lists transactions within a time range, newest first, optionally limited in number.
pub async fn list_transactions(
    config: Config,
    args: ListTransactionsArgs,
) -> Result<Out<Transactions>> {
    let all = config
        .db()
        .transactions()
        .await
        .pub_result(ErrorType::Database)?;
    let mut found = all.within(args.range, today());
    if let Some(limit) = args.limit {
        found = found.take(limit);
    }
    let message = format!("Found {} transactions ({})", found.len(), args.range);
    Ok(Out::new(message, found))
}
