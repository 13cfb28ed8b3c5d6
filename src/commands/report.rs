//! Writes the financial report as CSV: a summary block followed by the transaction history.

use crate::args::ReportArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{format_date, today, Amount, Transactions, UserPrefs};
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub path: PathBuf,
    pub balance: Amount,
    pub total_income: Amount,
    pub total_expense: Amount,
    pub transactions: usize,
}

/// Writes a CSV report to `args.output`, or to `persony-report-YYYY-MM-DD.csv` in the reports
/// directory.
pub async fn report(config: Config, args: ReportArgs) -> Result<Out<ReportSummary>> {
    let prefs = config.db().prefs().await.pub_result(ErrorType::Database)?;
    let transactions = config
        .db()
        .transactions()
        .await
        .pub_result(ErrorType::Database)?;

    let today = today();
    let path = match args.output() {
        Some(path) => path.to_path_buf(),
        None => {
            let dir = config.reports();
            utils::make_dir(&dir).await.pub_result(ErrorType::Filesystem)?;
            dir.join(format!("persony-report-{}.csv", format_date(today)))
        }
    };

    let data = render(&prefs, &transactions, today).pub_result(ErrorType::Filesystem)?;
    utils::write(&path, data)
        .await
        .pub_result(ErrorType::Filesystem)?;

    let summary = ReportSummary {
        path,
        balance: prefs.total_balance(),
        total_income: transactions.total_income(),
        total_expense: transactions.total_expense(),
        transactions: transactions.len(),
    };
    let message = format!(
        "Wrote a report of {} transactions to {}",
        summary.transactions,
        summary.path.display()
    );
    Ok(Out::new(message, summary))
}

fn render(prefs: &UserPrefs, transactions: &Transactions, today: NaiveDate) -> Result<Vec<u8>> {
    // The summary rows have fewer columns than the history
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    let summary = [
        ("Report", "Persony financial report".to_string()),
        ("Name", prefs.user_name().to_string()),
        ("Date", format_date(today)),
        ("Balance", prefs.total_balance().to_string()),
        ("Total income", transactions.total_income().to_string()),
        ("Total expense", transactions.total_expense().to_string()),
    ];
    for (label, value) in summary {
        wtr.write_record([label, value.as_str()])
            .context("Unable to write the report summary")?;
    }

    wtr.write_record(["Date", "Title", "Amount"])
        .context("Unable to write the report header")?;
    for t in transactions.data() {
        wtr.write_record([
            format_date(t.date()),
            t.title().to_string(),
            t.signed_amount().to_string(),
        ])
        .with_context(|| format!("Unable to write transaction {}", t.id()))?;
    }

    wtr.into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to finish the report: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TxKind;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_report_default_location() {
        let env = TestEnv::new().await;
        env.insert_transaction("Gaji", today(), 1_500_000, TxKind::Income)
            .await;
        env.insert_transaction("Belanja, bulanan", today(), 5_000, TxKind::Expense)
            .await;

        let out = report(env.config(), ReportArgs::default()).await.unwrap();
        let summary = out.structure().unwrap();
        assert!(summary.path.starts_with(env.config().reports()));
        assert_eq!(summary.transactions, 2);
        assert_eq!(summary.balance.to_i64(), 1_495_000);

        let text = utils::read(&summary.path).await.unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[3], "Balance,Rp 1.495.000");
        assert_eq!(lines[4], "Total income,Rp 1.500.000");
        assert_eq!(lines[5], "Total expense,Rp 5.000");
        assert_eq!(lines[6], "Date,Title,Amount");
        // Newest first, commas in titles are quoted
        assert!(lines[7].ends_with(",\"Belanja, bulanan\",-Rp 5.000"));
        assert!(lines[8].ends_with(",Gaji,Rp 1.500.000"));
    }

    #[tokio::test]
    async fn test_report_explicit_path() {
        let env = TestEnv::new().await;
        let path = env.config().root().join("out.csv");
        let out = report(env.config(), ReportArgs::new(Some(path.clone())))
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().path, path);
        let text = utils::read(&path).await.unwrap();
        assert!(text.starts_with("Report,Persony financial report"));
    }
}
