use clap::Parser;
use persony::args::{
    Args, BillSubcommand, BudgetSubcommand, Command, SavingSubcommand, TransactionSubcommand,
};
use persony::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().persony_home().path();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.clone()).await?.print(),

        Command::Profile(profile_args) => {
            let config = Config::load(home).await?;
            commands::profile(config, profile_args.clone())
                .await?
                .print()
        }

        Command::Transaction(tx_args) => {
            let config = Config::load(home).await?;
            match tx_args.command() {
                TransactionSubcommand::Add(args) => commands::add_transaction(config, args.clone())
                    .await?
                    .print(),
                TransactionSubcommand::Delete(args) => {
                    commands::delete_transaction(config, args.clone())
                        .await?
                        .print()
                }
                TransactionSubcommand::List(args) => {
                    commands::list_transactions(config, args.clone())
                        .await?
                        .print()
                }
            }
        }

        Command::Bill(bill_args) => {
            let config = Config::load(home).await?;
            match bill_args.command() {
                BillSubcommand::Save(args) => {
                    commands::save_bill(config, args.clone()).await?.print()
                }
                BillSubcommand::Pay(args) => commands::pay_bill(config, args.clone()).await?.print(),
                BillSubcommand::Delete(args) => {
                    commands::delete_bill(config, args.clone()).await?.print()
                }
                BillSubcommand::List => commands::list_bills(config).await?.print(),
            }
        }

        Command::Saving(saving_args) => {
            let config = Config::load(home).await?;
            match saving_args.command() {
                SavingSubcommand::Add(args) => {
                    commands::add_saving(config, args.clone()).await?.print()
                }
                SavingSubcommand::Update(args) => {
                    commands::update_saving(config, args.clone()).await?.print()
                }
                SavingSubcommand::Delete(args) => {
                    commands::delete_saving(config, args.clone()).await?.print()
                }
                SavingSubcommand::Deposit(args) => {
                    commands::deposit_saving(config, args.clone())
                        .await?
                        .print()
                }
                SavingSubcommand::Withdraw(args) => {
                    commands::withdraw_saving(config, args.clone())
                        .await?
                        .print()
                }
                SavingSubcommand::List => commands::list_savings(config).await?.print(),
            }
        }

        Command::Budget(budget_args) => {
            let config = Config::load(home).await?;
            match budget_args.command() {
                BudgetSubcommand::Set(args) => {
                    commands::set_budget(config, args.clone()).await?.print()
                }
                BudgetSubcommand::Status => commands::budget_status(config).await?.print(),
            }
        }

        Command::Dashboard(dashboard_args) => {
            let config = Config::load(home).await?;
            commands::dashboard(config, dashboard_args.clone())
                .await?
                .print()
        }

        Command::Report(report_args) => {
            let config = Config::load(home).await?;
            commands::report(config, report_args.clone()).await?.print()
        }

        Command::Reset(reset_args) => {
            let config = Config::load(home).await?;
            commands::reset(config, reset_args.clone()).await?.print()
        }

        Command::Mcp(_mcp_args) => commands::mcp(Config::load(home).await?).await?.print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
