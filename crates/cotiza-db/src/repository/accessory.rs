//! # Accessory Repository
//!
//! The shared accessory cost table. Rows are returned in insertion order,
//! which is the order [`AccessoryCostTable::from_entries`] matches keywords in.

use std::str::FromStr;

use chrono::Utc;
use cotiza_core::{AccessoryCostEntry, AccessoryCostTable};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct AccessoryRow {
    name: String,
    category: String,
    unit_cost: String,
}

impl TryFrom<AccessoryRow> for AccessoryCostEntry {
    type Error = DbError;

    fn try_from(row: AccessoryRow) -> Result<Self, Self::Error> {
        let unit_cost = Decimal::from_str(&row.unit_cost)
            .map_err(|e| DbError::invalid_data("accessories", "unit_cost", e))?;
        Ok(AccessoryCostEntry::new(row.name, row.category, unit_cost)?)
    }
}

/// Repository for the accessory cost table.
#[derive(Debug, Clone)]
pub struct AccessoryRepository {
    pool: SqlitePool,
}

impl AccessoryRepository {
    /// Creates a new AccessoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AccessoryRepository { pool }
    }

    /// Appends a row to the table.
    pub async fn insert(&self, entry: &AccessoryCostEntry) -> DbResult<i64> {
        debug!(name = %entry.name, category = %entry.category, "Inserting accessory");

        let result = sqlx::query(
            r#"
            INSERT INTO accessories (name, category, unit_cost, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&entry.name)
        .bind(&entry.category)
        .bind(entry.unit_cost.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// All rows, in table order.
    pub async fn list(&self) -> DbResult<Vec<AccessoryCostEntry>> {
        let rows = sqlx::query_as::<_, AccessoryRow>(
            r#"
            SELECT name, category, unit_cost
            FROM accessories
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AccessoryCostEntry::try_from).collect()
    }

    /// Loads and classifies the whole table.
    pub async fn load_table(&self) -> DbResult<AccessoryCostTable> {
        let entries = self.list().await?;
        debug!(rows = entries.len(), "Loaded accessory cost table");
        Ok(AccessoryCostTable::from_entries(entries))
    }

    /// Counts accessory rows.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accessories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
