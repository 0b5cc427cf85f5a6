//! # Quotation Repository
//!
//! Persisted quotation lines. Each line keeps the inputs it was priced from
//! (BOM and material ids, as JSON) next to the price stored at commit time, so
//! an audit can recompute it later.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use cotiza_core::{FurnitureBom, FurnitureCode, MaterialSlot, Money};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// A priced furniture line of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationItem {
    pub id: Uuid,
    pub project_code: String,
    pub furniture_code: FurnitureCode,
    pub bom: FurnitureBom,
    /// Catalog material id picked for each slot.
    pub material_ids: BTreeMap<MaterialSlot, i64>,
    pub stored_price: Money,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct QuotationItemRow {
    id: String,
    project_code: String,
    furniture_code: String,
    bom: String,
    material_ids: String,
    stored_price_cents: i64,
    description: Option<String>,
    created_at: DateTime<Utc>,
    /// Full year of the owning project; the code string keeps one digit.
    project_year: i32,
}

impl TryFrom<QuotationItemRow> for QuotationItem {
    type Error = DbError;

    fn try_from(row: QuotationItemRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| DbError::invalid_data("quotation_items", "id", e))?;
        let furniture_code = FurnitureCode::parse_with_decade(&row.furniture_code, row.project_year)
            .map_err(|e| DbError::invalid_data("quotation_items", "furniture_code", e))?;
        if furniture_code.project.year != row.project_year {
            return Err(DbError::invalid_data(
                "quotation_items",
                "furniture_code",
                format!(
                    "code {} does not match project year {}",
                    row.furniture_code, row.project_year
                ),
            ));
        }

        Ok(QuotationItem {
            id,
            project_code: row.project_code,
            furniture_code,
            bom: serde_json::from_str(&row.bom)?,
            material_ids: serde_json::from_str(&row.material_ids)?,
            stored_price: Money::from_cents(row.stored_price_cents),
            description: row.description,
            created_at: row.created_at,
        })
    }
}

/// Repository for quotation lines.
#[derive(Debug, Clone)]
pub struct QuotationRepository {
    pool: SqlitePool,
}

impl QuotationRepository {
    /// Creates a new QuotationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        QuotationRepository { pool }
    }

    /// Inserts all lines in one transaction: either every line is stored or
    /// none is.
    pub async fn insert_all(&self, items: &[QuotationItem]) -> DbResult<()> {
        debug!(count = items.len(), "Inserting quotation items");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for item in items {
            let bom = serde_json::to_string(&item.bom)?;
            let material_ids = serde_json::to_string(&item.material_ids)?;

            sqlx::query(
                r#"
                INSERT INTO quotation_items (
                    id, project_code, furniture_code, bom, material_ids,
                    stored_price_cents, description, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(item.id.to_string())
            .bind(&item.project_code)
            .bind(item.furniture_code.to_string())
            .bind(bom)
            .bind(material_ids)
            .bind(item.stored_price.cents())
            .bind(item.description.as_deref())
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Lines of a project, in insertion order.
    pub async fn list_by_project(&self, project_code: &str) -> DbResult<Vec<QuotationItem>> {
        let rows = sqlx::query_as::<_, QuotationItemRow>(
            r#"
            SELECT q.id, q.project_code, q.furniture_code, q.bom, q.material_ids,
                   q.stored_price_cents, q.description, q.created_at,
                   p.year AS project_year
            FROM quotation_items q
            JOIN projects p ON p.code = q.project_code
            WHERE q.project_code = ?1
            ORDER BY q.rowid
            "#,
        )
        .bind(project_code)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(QuotationItem::try_from).collect()
    }

    /// Gets a line by id.
    pub async fn get_by_id(&self, id: Uuid) -> DbResult<Option<QuotationItem>> {
        let row = sqlx::query_as::<_, QuotationItemRow>(
            r#"
            SELECT q.id, q.project_code, q.furniture_code, q.bom, q.material_ids,
                   q.stored_price_cents, q.description, q.created_at,
                   p.year AS project_year
            FROM quotation_items q
            JOIN projects p ON p.code = q.project_code
            WHERE q.id = ?1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(QuotationItem::try_from).transpose()
    }

    /// Overwrites the stored price of a line (manual price override).
    pub async fn set_stored_price(&self, id: Uuid, price: Money) -> DbResult<()> {
        cotiza_core::validation::validate_price_cents(price.cents())?;
        debug!(id = %id, price = %price, "Overriding stored price");

        let result = sqlx::query("UPDATE quotation_items SET stored_price_cents = ?2 WHERE id = ?1")
            .bind(id.to_string())
            .bind(price.cents())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("QuotationItem", id.to_string()));
        }

        Ok(())
    }
}
