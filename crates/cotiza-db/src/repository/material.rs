//! # Material Repository
//!
//! Catalog materials: boards, edge banding and hardware that quotation slots
//! select from.
//!
//! Unit costs are stored as decimal TEXT and parsed back into
//! [`rust_decimal::Decimal`] so a round trip through SQLite never loses a cent.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use cotiza_core::validation::{validate_material_name, validate_unit_cost};
use cotiza_core::{MaterialKind, MaterialSelection};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// A catalog material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: i64,
    pub name: String,
    pub kind: MaterialKind,
    pub unit_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Material {
    /// The pricing view of this material.
    pub fn selection(&self) -> DbResult<MaterialSelection> {
        Ok(MaterialSelection::new(
            self.id,
            self.name.clone(),
            self.unit_cost,
            self.kind,
        )?)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MaterialRow {
    id: i64,
    name: String,
    kind: String,
    unit_cost: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MaterialRow> for Material {
    type Error = DbError;

    fn try_from(row: MaterialRow) -> Result<Self, Self::Error> {
        let kind = MaterialKind::from_str(&row.kind)
            .map_err(|e| DbError::invalid_data("materials", "kind", e))?;
        let unit_cost = Decimal::from_str(&row.unit_cost)
            .map_err(|e| DbError::invalid_data("materials", "unit_cost", e))?;
        validate_unit_cost(unit_cost)
            .map_err(|e| DbError::invalid_data("materials", "unit_cost", e))?;
        validate_material_name(&row.name)
            .map_err(|e| DbError::invalid_data("materials", "name", e))?;
        Ok(Material {
            id: row.id,
            name: row.name,
            kind,
            unit_cost,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for catalog materials.
#[derive(Debug, Clone)]
pub struct MaterialRepository {
    pool: SqlitePool,
}

impl MaterialRepository {
    /// Creates a new MaterialRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MaterialRepository { pool }
    }

    /// Inserts a material and returns it with its assigned id.
    ///
    /// ## Errors
    /// - blank name or negative unit cost → `DbError::Core(Validation)`
    pub async fn insert(
        &self,
        name: &str,
        kind: MaterialKind,
        unit_cost: Decimal,
    ) -> DbResult<Material> {
        validate_material_name(name)?;
        validate_unit_cost(unit_cost)?;

        let name = name.trim();
        let now = Utc::now();
        debug!(name = %name, kind = %kind.as_str(), unit_cost = %unit_cost, "Inserting material");

        let result = sqlx::query(
            r#"
            INSERT INTO materials (name, kind, unit_cost, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(name)
        .bind(kind.as_str())
        .bind(unit_cost.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Material {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            kind,
            unit_cost,
            created_at: now,
            updated_at: now,
        })
    }

    /// Gets a material by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Material>> {
        let row = sqlx::query_as::<_, MaterialRow>(
            r#"
            SELECT id, name, kind, unit_cost, created_at, updated_at
            FROM materials
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Material::try_from).transpose()
    }

    /// Lists materials of one kind, by name.
    pub async fn list_by_kind(&self, kind: MaterialKind) -> DbResult<Vec<Material>> {
        let rows = sqlx::query_as::<_, MaterialRow>(
            r#"
            SELECT id, name, kind, unit_cost, created_at, updated_at
            FROM materials
            WHERE kind = ?1
            ORDER BY name
            "#,
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Material::try_from).collect()
    }

    /// Changes a material's unit cost.
    ///
    /// Existing quotation lines keep their stored price; the next audit
    /// reports the drift.
    pub async fn update_unit_cost(&self, id: i64, unit_cost: Decimal) -> DbResult<()> {
        validate_unit_cost(unit_cost)?;
        debug!(id = id, unit_cost = %unit_cost, "Updating material unit cost");

        let result = sqlx::query(
            r#"
            UPDATE materials
            SET unit_cost = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(unit_cost.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Material", id.to_string()));
        }

        Ok(())
    }

    /// Counts catalog materials (for diagnostics and the seed binary).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM materials")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use rust_decimal_macros::dec;

    async fn repo() -> MaterialRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.materials()
    }

    #[tokio::test]
    async fn test_insert_and_get_keeps_exact_cost() {
        let repo = repo().await;
        let inserted = repo
            .insert("Melamina blanca 16mm", MaterialKind::Tablero, dec!(612.35))
            .await
            .unwrap();

        let loaded = repo.get_by_id(inserted.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Melamina blanca 16mm");
        assert_eq!(loaded.kind, MaterialKind::Tablero);
        assert_eq!(loaded.unit_cost, dec!(612.35));
        assert_eq!(loaded.selection().unwrap().id, inserted.id);
    }

    #[tokio::test]
    async fn test_stored_negative_cost_is_invalid_data() {
        let repo = repo().await;
        let id = sqlx::query(
            "INSERT INTO materials (name, kind, unit_cost, created_at, updated_at)
             VALUES ('MDF', 'tablero', '-100', ?1, ?1)",
        )
        .bind(Utc::now())
        .execute(&repo.pool)
        .await
        .unwrap()
        .last_insert_rowid();

        let err = repo.get_by_id(id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::InvalidData { ref column, .. } if column == "unit_cost"
        ));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = repo().await;
        assert!(repo.get_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_rows() {
        let repo = repo().await;
        assert!(repo
            .insert("MDF", MaterialKind::Tablero, dec!(-1))
            .await
            .is_err());
        assert!(repo.insert("  ", MaterialKind::Tablero, dec!(1)).await.is_err());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_by_kind_and_update_cost() {
        let repo = repo().await;
        let board = repo
            .insert("Triplay 18mm", MaterialKind::Tablero, dec!(500))
            .await
            .unwrap();
        repo.insert("Bisagra cierre suave", MaterialKind::Bisagra, dec!(45))
            .await
            .unwrap();

        let boards = repo.list_by_kind(MaterialKind::Tablero).await.unwrap();
        assert_eq!(boards.len(), 1);

        repo.update_unit_cost(board.id, dec!(520.5)).await.unwrap();
        let updated = repo.get_by_id(board.id).await.unwrap().unwrap();
        assert_eq!(updated.unit_cost, dec!(520.5));

        let err = repo.update_unit_cost(999, dec!(1)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
