//! Saving plan command handlers.

use crate::args::{AddSavingArgs, SavingIdArgs, SavingTransferArgs, UpdateSavingArgs};
use crate::commands::budget::check_budget;
use crate::commands::{require_name, require_positive, Out};
use crate::db::Posted;
use crate::error::{ErrorType, IntoResult};
use crate::model::{today, Amount, BudgetAlert, SavingPlan, SavingView, Transaction};
use crate::{Config, Result};
use anyhow::anyhow;
use serde::Serialize;

/// The result of moving money between the balance and a saving plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingTransfer {
    pub saving: SavingView,
    /// The transaction that records the transfer in the history.
    pub transaction: Transaction,
    pub balance: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_alert: Option<BudgetAlert>,
}

/// Creates an empty saving plan.
pub async fn add_saving(config: Config, args: AddSavingArgs) -> Result<Out<SavingView>> {
    let name = require_name("saving name", &args.name).pub_result(ErrorType::Request)?;
    require_positive("target", args.target).pub_result(ErrorType::Request)?;
    let plan = SavingPlan::new(name, args.target, args.location.trim(), args.icon);
    config
        .db()
        .insert_saving(&plan)
        .await
        .pub_result(ErrorType::Database)?;
    let message = format!(
        "Created saving plan '{}' with a target of {}, ID {}",
        plan.name(),
        plan.target(),
        plan.id()
    );
    Ok(Out::new(message, plan.into()))
}

/// Changes the fields of a saving plan that are given in `args`. The saved amount is kept.
pub async fn update_saving(config: Config, args: UpdateSavingArgs) -> Result<Out<SavingView>> {
    let mut plan = find(&config, &args.id).await?;
    if let Some(name) = &args.name {
        plan.name = require_name("saving name", name).pub_result(ErrorType::Request)?;
    }
    if let Some(target) = args.target {
        require_positive("target", target).pub_result(ErrorType::Request)?;
        plan.target = target;
    }
    if let Some(location) = &args.location {
        plan.location = location.trim().to_string();
    }
    if let Some(icon) = args.icon {
        plan.icon = icon;
    }
    config
        .db()
        .update_saving(&plan)
        .await
        .pub_result(ErrorType::Database)?;
    let message = format!("Updated saving plan '{}'", plan.name());
    Ok(Out::new(message, plan.into()))
}

/// Deletes a saving plan. Money held in the plan is not moved back to the balance.
pub async fn delete_saving(config: Config, args: SavingIdArgs) -> Result<Out<SavingPlan>> {
    find(&config, &args.id).await?;
    let plan = config
        .db()
        .delete_saving(&args.id)
        .await
        .pub_result(ErrorType::Database)?;
    let message = format!(
        "Deleted saving plan '{}' which held {}",
        plan.name(),
        plan.current()
    );
    Ok(Out::new(message, plan))
}

/// Moves money from the balance into a saving plan. The deposit is recorded as an expense named
/// `Deposit to {name}`, so the daily budget is checked afterwards.
///
/// # Errors
///
/// - Returns an error if the amount is not positive or the balance is smaller than the amount.
pub async fn deposit_saving(
    config: Config,
    args: SavingTransferArgs,
) -> Result<Out<SavingTransfer>> {
    require_positive("amount", args.amount).pub_result(ErrorType::Request)?;
    find(&config, &args.id).await?;
    let balance = config
        .db()
        .prefs()
        .await
        .pub_result(ErrorType::Database)?
        .total_balance();
    if balance < args.amount {
        return Err(anyhow!(
            "Insufficient balance: {balance} is available but {} was requested",
            args.amount
        ))
        .pub_result(ErrorType::Request);
    }
    let (plan, posted) = config
        .db()
        .deposit_saving(&args.id, args.amount, today())
        .await
        .pub_result(ErrorType::Database)?;
    let budget_alert = check_budget(&config).await;
    Ok(transfer_out(plan, posted, budget_alert, "Deposited", "into"))
}

/// Moves money from a saving plan back to the balance, recorded as income named
/// `Withdraw from {name}`.
///
/// # Errors
///
/// - Returns an error if the amount is not positive or the plan holds less than the amount.
pub async fn withdraw_saving(
    config: Config,
    args: SavingTransferArgs,
) -> Result<Out<SavingTransfer>> {
    require_positive("amount", args.amount).pub_result(ErrorType::Request)?;
    let plan = find(&config, &args.id).await?;
    if plan.current() < args.amount {
        return Err(anyhow!(
            "Insufficient savings: '{}' holds {} but {} was requested",
            plan.name(),
            plan.current(),
            args.amount
        ))
        .pub_result(ErrorType::Request);
    }
    let (plan, posted) = config
        .db()
        .withdraw_saving(&args.id, args.amount, today())
        .await
        .pub_result(ErrorType::Database)?;
    Ok(transfer_out(plan, posted, None, "Withdrew", "from"))
}

/// Lists saving plans with their progress towards the target.
pub async fn list_savings(config: Config) -> Result<Out<Vec<SavingView>>> {
    let plans: Vec<SavingView> = config
        .db()
        .savings()
        .await
        .pub_result(ErrorType::Database)?
        .into_iter()
        .map(SavingView::from)
        .collect();
    let total: Amount = plans.iter().map(|v| v.plan.current()).sum();
    let message = format!("Found {} saving plans holding {total}", plans.len());
    Ok(Out::new(message, plans))
}

async fn find(config: &Config, id: &str) -> Result<SavingPlan> {
    config
        .db()
        .get_saving(id)
        .await
        .pub_result(ErrorType::Database)?
        .ok_or_else(|| anyhow!("Saving plan not found: {id}"))
        .pub_result(ErrorType::Request)
}

fn transfer_out(
    plan: SavingPlan,
    posted: Posted,
    budget_alert: Option<BudgetAlert>,
    verb: &str,
    preposition: &str,
) -> Out<SavingTransfer> {
    let Posted {
        transaction,
        balance,
    } = posted;
    let saving = SavingView::from(plan);
    let mut message = format!(
        "{verb} {} {preposition} '{}', saved {} of {} ({:.0}%), balance is now {balance}",
        transaction.amount(),
        saving.plan.name(),
        saving.plan.current(),
        saving.plan.target(),
        saving.progress * 100.0
    );
    if let Some(alert) = &budget_alert {
        message = format!("{message}. {}", alert.message);
    }
    Out::new(
        message,
        SavingTransfer {
            saving,
            transaction,
            balance,
            budget_alert,
        },
    )
}
