//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::{Amount, Bill, Recurrence, SavingIcon, SavingPlan, TxKind};
use crate::Config;
use chrono::NaiveDate;
use tempfile::TempDir;

/// Test environment that sets up a persony home directory with Config and database.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with Config and initialized database.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("persony");
        let config = Config::create(&root).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    pub async fn set_balance(&self, balance: i64) {
        self.config
            .db()
            .set_balance(Amount::new(balance))
            .await
            .unwrap();
    }

    pub async fn balance(&self) -> i64 {
        self.config
            .db()
            .prefs()
            .await
            .unwrap()
            .total_balance()
            .to_i64()
    }

    /// Inserts a transaction and returns its ID.
    pub async fn insert_transaction(
        &self,
        title: &str,
        date: NaiveDate,
        amount: i64,
        kind: TxKind,
    ) -> i64 {
        self.config
            .db()
            .insert_transaction(title, date, Amount::new(amount), kind)
            .await
            .unwrap()
            .transaction
            .id()
    }

    /// Inserts a bill and returns its ID.
    pub async fn insert_bill(
        &self,
        title: &str,
        price: i64,
        due_date: NaiveDate,
        recurrence: Recurrence,
    ) -> String {
        let bill = Bill::new(title, Amount::new(price), due_date, recurrence);
        self.config.db().upsert_bill(&bill).await.unwrap();
        bill.id().to_string()
    }

    /// Inserts an empty saving plan and returns its ID.
    pub async fn insert_saving(&self, name: &str, target: i64) -> String {
        let plan = SavingPlan::new(name, Amount::new(target), "Bank", SavingIcon::Savings);
        self.config.db().insert_saving(&plan).await.unwrap();
        plan.id().to_string()
    }
}
