//! This module is responsible for reading, writing and managing the SQLite database.
//!
//! Every operation that touches more than one row, such as recording a transaction together with
//! its effect on the balance, runs inside a single SQL transaction.

mod migrations;

use crate::model::{
    format_date, parse_date, Amount, Bill, Payment, Recurrence, SavingIcon, SavingPlan,
    Transaction, Transactions, TxKind, UserPrefs,
};
use crate::Result;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// A committed change to the ledger together with the balance it left behind.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Posted {
    pub(crate) transaction: Transaction,
    pub(crate) balance: Amount,
}

#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema and the settings row
    pub(crate) async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database already exists at '{}'", path.display());
        }
        let pool = connect(path, true).await?;

        sqlx::query("CREATE TABLE schema_version (version INTEGER NOT NULL)")
            .execute(&pool)
            .await
            .context("Failed to create schema_version table")?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
            .execute(&pool)
            .await
            .context("Failed to insert initial schema version")?;

        migrations::run(&pool, 0, migrations::CURRENT_VERSION).await?;

        let db = Self { pool };
        let mut conn = db.pool.acquire().await.context("Failed to acquire connection")?;
        write_prefs(&mut conn, &UserPrefs::default()).await?;
        info!("Created database at {}", path.display());
        Ok(db)
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Updates the database schema with migrations if it is out-of-date
    pub(crate) async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The database file is missing '{}'", path.display());
        }
        let pool = connect(path, false).await?;

        let (version,): (i32,) = sqlx::query_as("SELECT version FROM schema_version")
            .fetch_one(&pool)
            .await
            .context("Failed to read the schema version")?;
        if version > migrations::CURRENT_VERSION {
            bail!(
                "The database schema is at version {version} but this program only understands \
                up to version {}. Is a newer version of persony available?",
                migrations::CURRENT_VERSION
            );
        }
        migrations::run(&pool, version, migrations::CURRENT_VERSION).await?;
        debug!("Loaded database at {}", path.display());
        Ok(Self { pool })
    }

    // ---------------------------------------------------------------------------------------------
    // Settings
    // ---------------------------------------------------------------------------------------------

    pub(crate) async fn prefs(&self) -> Result<UserPrefs> {
        let mut conn = self.conn().await?;
        read_prefs(&mut conn).await
    }

    pub(crate) async fn set_user_name(&self, user_name: &str) -> Result<UserPrefs> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let mut prefs = read_prefs(&mut tx).await?;
        prefs.user_name = user_name.to_string();
        write_prefs(&mut tx, &prefs).await?;
        tx.commit().await.context("Failed to commit")?;
        Ok(prefs)
    }

    pub(crate) async fn set_daily_budget(&self, daily_budget: Amount) -> Result<UserPrefs> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let mut prefs = read_prefs(&mut tx).await?;
        prefs.daily_budget = daily_budget;
        write_prefs(&mut tx, &prefs).await?;
        tx.commit().await.context("Failed to commit")?;
        Ok(prefs)
    }

    pub(crate) async fn set_balance(&self, total_balance: Amount) -> Result<UserPrefs> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let mut prefs = read_prefs(&mut tx).await?;
        prefs.total_balance = total_balance;
        write_prefs(&mut tx, &prefs).await?;
        tx.commit().await.context("Failed to commit")?;
        Ok(prefs)
    }

    // ---------------------------------------------------------------------------------------------
    // Transactions
    // ---------------------------------------------------------------------------------------------

    /// Records a transaction and applies it to the balance.
    pub(crate) async fn insert_transaction(
        &self,
        title: &str,
        date: NaiveDate,
        amount: Amount,
        kind: TxKind,
    ) -> Result<Posted> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let transaction = insert_transaction_row(&mut tx, title, date, amount, kind).await?;
        let balance = adjust_balance(&mut tx, transaction.signed_amount()).await?;
        tx.commit()
            .await
            .context("Failed to commit the new transaction")?;
        Ok(Posted {
            transaction,
            balance,
        })
    }

    /// Removes a transaction and reverses its effect on the balance.
    pub(crate) async fn delete_transaction(&self, id: i64) -> Result<Posted> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let transaction = fetch_transaction(&mut tx, id)
            .await?
            .with_context(|| format!("Transaction not found: {id}"))?;
        sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to delete transaction {id}"))?;
        let reversal = Amount::ZERO.checked_sub(transaction.signed_amount())?;
        let balance = adjust_balance(&mut tx, reversal).await?;
        tx.commit().await.context("Failed to commit the deletion")?;
        Ok(Posted {
            transaction,
            balance,
        })
    }

    /// All transactions, newest first.
    pub(crate) async fn transactions(&self) -> Result<Transactions> {
        let rows = sqlx::query(
            "SELECT id, title, date, amount, is_expense FROM transactions ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to query transactions")?;
        let data = rows
            .iter()
            .map(transaction_from_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(Transactions::new(data))
    }

    pub(crate) async fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let mut conn = self.conn().await?;
        fetch_transaction(&mut conn, id).await
    }

    // ---------------------------------------------------------------------------------------------
    // Bills
    // ---------------------------------------------------------------------------------------------

    /// Inserts `bill`, or replaces the bill that has the same ID.
    pub(crate) async fn upsert_bill(&self, bill: &Bill) -> Result<()> {
        sqlx::query(
            "INSERT INTO bills (id, title, price, due_date, recurrence) VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET title = excluded.title, price = excluded.price, \
             due_date = excluded.due_date, recurrence = excluded.recurrence",
        )
        .bind(&bill.id)
        .bind(&bill.title)
        .bind(bill.price.to_i64())
        .bind(format_date(bill.due_date))
        .bind(bill.recurrence.to_string())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to save bill {}", bill.id))?;
        Ok(())
    }

    /// All bills, soonest due date first.
    pub(crate) async fn bills(&self) -> Result<Vec<Bill>> {
        let rows = sqlx::query(
            "SELECT id, title, price, due_date, recurrence FROM bills \
             ORDER BY due_date ASC, title ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to query bills")?;
        rows.iter().map(bill_from_row).collect()
    }

    pub(crate) async fn get_bill(&self, id: &str) -> Result<Option<Bill>> {
        let mut conn = self.conn().await?;
        fetch_bill(&mut conn, id).await
    }

    pub(crate) async fn delete_bill(&self, id: &str) -> Result<Bill> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let bill = fetch_bill(&mut tx, id)
            .await?
            .with_context(|| format!("Bill not found: {id}"))?;
        sqlx::query("DELETE FROM bills WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to delete bill {id}"))?;
        tx.commit().await.context("Failed to commit the deletion")?;
        Ok(bill)
    }

    /// Marks a bill as paid: one-off bills are removed and recurring bills move to their next due
    /// date.
    pub(crate) async fn pay_bill(&self, id: &str) -> Result<Payment> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let bill = fetch_bill(&mut tx, id)
            .await?
            .with_context(|| format!("Bill not found: {id}"))?;
        let payment = bill.pay();
        match &payment {
            Payment::Removed { id } => {
                sqlx::query("DELETE FROM bills WHERE id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .with_context(|| format!("Failed to remove paid bill {id}"))?;
            }
            Payment::Advanced { id, next_due_date } => {
                sqlx::query("UPDATE bills SET due_date = ? WHERE id = ?")
                    .bind(format_date(*next_due_date))
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .with_context(|| format!("Failed to advance bill {id}"))?;
            }
        }
        tx.commit().await.context("Failed to commit the payment")?;
        Ok(payment)
    }

    // ---------------------------------------------------------------------------------------------
    // Savings
    // ---------------------------------------------------------------------------------------------

    pub(crate) async fn insert_saving(&self, plan: &SavingPlan) -> Result<()> {
        sqlx::query(
            "INSERT INTO savings (id, name, target, current_amount, location, icon_name) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&plan.id)
        .bind(&plan.name)
        .bind(plan.target.to_i64())
        .bind(plan.current.to_i64())
        .bind(&plan.location)
        .bind(plan.icon.to_string())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to insert saving plan '{}'", plan.name))?;
        Ok(())
    }

    /// Overwrites the stored plan that has the same ID as `plan`.
    pub(crate) async fn update_saving(&self, plan: &SavingPlan) -> Result<()> {
        let mut conn = self.conn().await?;
        write_saving(&mut conn, plan).await
    }

    /// All saving plans in the order they were created.
    pub(crate) async fn savings(&self) -> Result<Vec<SavingPlan>> {
        let rows = sqlx::query(
            "SELECT id, name, target, current_amount, location, icon_name FROM savings \
             ORDER BY rowid ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to query saving plans")?;
        rows.iter().map(saving_from_row).collect()
    }

    pub(crate) async fn get_saving(&self, id: &str) -> Result<Option<SavingPlan>> {
        let mut conn = self.conn().await?;
        fetch_saving(&mut conn, id).await
    }

    pub(crate) async fn delete_saving(&self, id: &str) -> Result<SavingPlan> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let plan = fetch_saving(&mut tx, id)
            .await?
            .with_context(|| format!("Saving plan not found: {id}"))?;
        sqlx::query("DELETE FROM savings WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to delete saving plan {id}"))?;
        tx.commit().await.context("Failed to commit the deletion")?;
        Ok(plan)
    }

    /// Moves `amount` from the balance into a saving plan. The transfer is recorded as an expense
    /// so that it shows up in the transaction history.
    pub(crate) async fn deposit_saving(
        &self,
        id: &str,
        amount: Amount,
        date: NaiveDate,
    ) -> Result<(SavingPlan, Posted)> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let mut plan = fetch_saving(&mut tx, id)
            .await?
            .with_context(|| format!("Saving plan not found: {id}"))?;
        let prefs = read_prefs(&mut tx).await?;
        if prefs.total_balance < amount {
            bail!(
                "Insufficient balance: {} is available but {} was requested",
                prefs.total_balance,
                amount
            );
        }
        plan.current = plan.current.checked_add(amount)?;
        write_saving(&mut tx, &plan).await?;
        let title = format!("Deposit to {}", plan.name);
        let transaction =
            insert_transaction_row(&mut tx, &title, date, amount, TxKind::Expense).await?;
        let balance = adjust_balance(&mut tx, transaction.signed_amount()).await?;
        tx.commit().await.context("Failed to commit the deposit")?;
        Ok((
            plan,
            Posted {
                transaction,
                balance,
            },
        ))
    }

    /// Moves `amount` out of a saving plan back into the balance, recorded as income.
    pub(crate) async fn withdraw_saving(
        &self,
        id: &str,
        amount: Amount,
        date: NaiveDate,
    ) -> Result<(SavingPlan, Posted)> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let mut plan = fetch_saving(&mut tx, id)
            .await?
            .with_context(|| format!("Saving plan not found: {id}"))?;
        if plan.current < amount {
            bail!(
                "Insufficient savings: '{}' holds {} but {} was requested",
                plan.name,
                plan.current,
                amount
            );
        }
        plan.current = plan.current.checked_sub(amount)?;
        write_saving(&mut tx, &plan).await?;
        let title = format!("Withdraw from {}", plan.name);
        let transaction =
            insert_transaction_row(&mut tx, &title, date, amount, TxKind::Income).await?;
        let balance = adjust_balance(&mut tx, transaction.signed_amount()).await?;
        tx.commit().await.context("Failed to commit the withdrawal")?;
        Ok((
            plan,
            Posted {
                transaction,
                balance,
            },
        ))
    }

    // ---------------------------------------------------------------------------------------------
    // Maintenance
    // ---------------------------------------------------------------------------------------------

    /// Deletes all transactions, bills and saving plans and restores the default settings with a
    /// zero balance.
    pub(crate) async fn reset(&self) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        for table in ["transactions", "bills", "savings"] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to clear {table}"))?;
        }
        write_prefs(&mut tx, &UserPrefs::default()).await?;
        tx.commit().await.context("Failed to commit the reset")?;
        Ok(())
    }

    async fn conn(&self) -> Result<sqlx::pool::PoolConnection<sqlx::Sqlite>> {
        self.pool
            .acquire()
            .await
            .context("Failed to acquire a database connection")
    }
}

async fn connect(path: &Path, create: bool) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create);
    SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open SQLite database at {}", path.display()))
}

async fn read_prefs(conn: &mut SqliteConnection) -> Result<UserPrefs> {
    let row = sqlx::query(
        "SELECT user_name, daily_budget, total_balance FROM user_prefs WHERE id = 1",
    )
    .fetch_optional(&mut *conn)
    .await
    .context("Failed to read user preferences")?;
    let Some(row) = row else {
        return Ok(UserPrefs::default());
    };
    Ok(UserPrefs {
        user_name: row.try_get("user_name")?,
        daily_budget: Amount::new(row.try_get("daily_budget")?),
        total_balance: Amount::new(row.try_get("total_balance")?),
    })
}

async fn write_prefs(conn: &mut SqliteConnection, prefs: &UserPrefs) -> Result<()> {
    sqlx::query(
        "INSERT INTO user_prefs (id, user_name, daily_budget, total_balance) VALUES (1, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET user_name = excluded.user_name, \
         daily_budget = excluded.daily_budget, total_balance = excluded.total_balance",
    )
    .bind(&prefs.user_name)
    .bind(prefs.daily_budget.to_i64())
    .bind(prefs.total_balance.to_i64())
    .execute(&mut *conn)
    .await
    .context("Failed to write user preferences")?;
    Ok(())
}

/// Adds `delta` to the stored balance and returns the new balance.
async fn adjust_balance(conn: &mut SqliteConnection, delta: Amount) -> Result<Amount> {
    let mut prefs = read_prefs(conn).await?;
    prefs.total_balance = prefs.total_balance.checked_add(delta)?;
    write_prefs(conn, &prefs).await?;
    Ok(prefs.total_balance)
}

async fn insert_transaction_row(
    conn: &mut SqliteConnection,
    title: &str,
    date: NaiveDate,
    amount: Amount,
    kind: TxKind,
) -> Result<Transaction> {
    let result =
        sqlx::query("INSERT INTO transactions (title, date, amount, is_expense) VALUES (?, ?, ?, ?)")
            .bind(title)
            .bind(format_date(date))
            .bind(amount.to_i64())
            .bind(kind.is_expense())
            .execute(&mut *conn)
            .await
            .with_context(|| format!("Failed to insert transaction '{title}'"))?;
    Ok(Transaction {
        id: result.last_insert_rowid(),
        title: title.to_string(),
        date,
        amount,
        kind,
    })
}

async fn fetch_transaction(conn: &mut SqliteConnection, id: i64) -> Result<Option<Transaction>> {
    let row =
        sqlx::query("SELECT id, title, date, amount, is_expense FROM transactions WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .with_context(|| format!("Failed to query transaction {id}"))?;
    row.as_ref().map(transaction_from_row).transpose()
}

async fn fetch_bill(conn: &mut SqliteConnection, id: &str) -> Result<Option<Bill>> {
    let row = sqlx::query("SELECT id, title, price, due_date, recurrence FROM bills WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .with_context(|| format!("Failed to query bill {id}"))?;
    row.as_ref().map(bill_from_row).transpose()
}

async fn fetch_saving(conn: &mut SqliteConnection, id: &str) -> Result<Option<SavingPlan>> {
    let row = sqlx::query(
        "SELECT id, name, target, current_amount, location, icon_name FROM savings WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .with_context(|| format!("Failed to query saving plan {id}"))?;
    row.as_ref().map(saving_from_row).transpose()
}

async fn write_saving(conn: &mut SqliteConnection, plan: &SavingPlan) -> Result<()> {
    let result = sqlx::query(
        "UPDATE savings SET name = ?, target = ?, current_amount = ?, location = ?, \
         icon_name = ? WHERE id = ?",
    )
    .bind(&plan.name)
    .bind(plan.target.to_i64())
    .bind(plan.current.to_i64())
    .bind(&plan.location)
    .bind(plan.icon.to_string())
    .bind(&plan.id)
    .execute(&mut *conn)
    .await
    .with_context(|| format!("Failed to update saving plan {}", plan.id))?;
    if result.rows_affected() == 0 {
        bail!("Saving plan not found: {}", plan.id);
    }
    Ok(())
}

fn transaction_from_row(row: &SqliteRow) -> Result<Transaction> {
    let date: String = row.try_get("date")?;
    Ok(Transaction {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        date: parse_date(&date)?,
        amount: Amount::new(row.try_get("amount")?),
        kind: TxKind::from_is_expense(row.try_get("is_expense")?),
    })
}

fn bill_from_row(row: &SqliteRow) -> Result<Bill> {
    let due_date: String = row.try_get("due_date")?;
    let recurrence: String = row.try_get("recurrence")?;
    Ok(Bill {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        price: Amount::new(row.try_get("price")?),
        due_date: parse_date(&due_date)?,
        recurrence: Recurrence::from_str(&recurrence)
            .with_context(|| format!("Unknown recurrence '{recurrence}'"))?,
    })
}

fn saving_from_row(row: &SqliteRow) -> Result<SavingPlan> {
    let icon_name: String = row.try_get("icon_name")?;
    Ok(SavingPlan {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        target: Amount::new(row.try_get("target")?),
        current: Amount::new(row.try_get("current_amount")?),
        location: row.try_get("location")?,
        icon: SavingIcon::from_name(&icon_name),
    })
}
