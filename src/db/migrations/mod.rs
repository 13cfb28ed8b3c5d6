//! Database schema migrations.
//!
//! Migration files are stored in this directory with the naming convention:
//! - `migration_NN_up.sql` - Upgrades schema from version `NN-1` to version `NN`
//! - `migration_NN_down.sql` - Downgrades schema from version `NN` to version `NN-1`

use anyhow::{bail, Context};
use sqlx::{Executor, SqlitePool};
use tracing::debug;

use crate::Result;

/// The schema version this build of persony expects.
pub(crate) const CURRENT_VERSION: i32 = 1;

/// A database migration with up and down SQL.
struct Migration {
    /// The version this migration brings the database to (when going up).
    version: i32,
    up_sql: &'static str,
    down_sql: &'static str,
}

/// All available migrations in order.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up_sql: include_str!("migration_01_up.sql"),
    down_sql: include_str!("migration_01_down.sql"),
}];

/// A single SQL script to run and the schema version it leaves the database at.
struct Step {
    sql: &'static str,
    resulting_version: i32,
    label: String,
}

/// Runs migrations to bring the database from `current_ver` to `target_ver`, one transaction per
/// step. All steps are resolved before any of them run so that a missing migration fails early.
pub(crate) async fn run(pool: &SqlitePool, current_ver: i32, target_ver: i32) -> Result<()> {
    if current_ver == target_ver {
        debug!("Database already at target version {target_ver}, no migrations needed");
        return Ok(());
    }

    for step in plan(current_ver, target_ver)? {
        debug!("Running migration {}", step.label);
        run_single_migration(pool, step.sql, step.resulting_version)
            .await
            .with_context(|| format!("Migration {} failed", step.label))?;
    }

    debug!("Migration complete, schema now at version {target_ver}");
    Ok(())
}

fn find(version: i32) -> Option<&'static Migration> {
    MIGRATIONS.iter().find(|m| m.version == version)
}

/// Resolves the ordered list of scripts needed to go from `current_ver` to `target_ver`.
fn plan(current_ver: i32, target_ver: i32) -> Result<Vec<Step>> {
    let missing = |version: i32| {
        anyhow::anyhow!(
            "Migration {version} is missing but required to migrate from version {current_ver} \
            to {target_ver}"
        )
    };

    if target_ver < 0 || current_ver < 0 {
        bail!("Schema versions cannot be negative ({current_ver} -> {target_ver})");
    }

    let mut steps = Vec::new();
    if current_ver < target_ver {
        for version in (current_ver + 1)..=target_ver {
            let m = find(version).ok_or_else(|| missing(version))?;
            steps.push(Step {
                sql: m.up_sql,
                resulting_version: version,
                label: format!("{version:02} (up)"),
            });
        }
    } else {
        for version in ((target_ver + 1)..=current_ver).rev() {
            let m = find(version).ok_or_else(|| missing(version))?;
            steps.push(Step {
                sql: m.down_sql,
                resulting_version: version - 1,
                label: format!("{version:02} (down)"),
            });
        }
    }
    Ok(steps)
}

/// Executes a single migration's SQL and updates schema_version, all within a transaction.
async fn run_single_migration(pool: &SqlitePool, sql: &str, new_version: i32) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin migration transaction")?;

    // Supports multiple statements
    tx.execute(sql)
        .await
        .context("Failed to execute migration SQL")?;

    sqlx::query("UPDATE schema_version SET version = ?")
        .bind(new_version)
        .execute(&mut *tx)
        .await
        .context("Failed to update schema_version")?;

    tx.commit()
        .await
        .context("Failed to commit migration transaction")?;

    Ok(())
}
