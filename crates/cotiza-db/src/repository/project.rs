//! # Project Repository
//!
//! One row per allocated project code.
//!
//! ## Bucket Uniqueness
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  projects                                                               │
//! │  ├── code            PRIMARY KEY         "RE-505-001"                   │
//! │  ├── type_prefix ─┐                                                     │
//! │  ├── year_digit   ├── UNIQUE together    a second "RE-505-001-B1"       │
//! │  ├── month        │                      is rejected as well            │
//! │  └── sequence ────┘                                                     │
//! │                                                                         │
//! │  A losing writer gets DbError::UniqueViolation and retries.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::str::FromStr;

use chrono::{DateTime, Utc};
use cotiza_core::{ProjectCode, ProjectType, TypePrefix};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// A project with its allocated code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub code: ProjectCode,
    pub project_type: ProjectType,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    code: String,
    type_prefix: String,
    year: i64,
    month: i64,
    sequence: i64,
    prototype: Option<String>,
    project_type: String,
    name: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = DbError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let invalid = |column: &str, reason: String| DbError::invalid_data("projects", column, reason);

        let prefix = TypePrefix::new(&row.type_prefix)
            .map_err(|e| invalid("type_prefix", e.to_string()))?;
        let year = i32::try_from(row.year).map_err(|e| invalid("year", e.to_string()))?;
        let month = u32::try_from(row.month).map_err(|e| invalid("month", e.to_string()))?;
        let sequence =
            u16::try_from(row.sequence).map_err(|e| invalid("sequence", e.to_string()))?;
        let code = ProjectCode::new(prefix, year, month, sequence, row.prototype)
            .map_err(|e| invalid("code", e.to_string()))?;

        if code.to_string() != row.code {
            return Err(invalid(
                "code",
                format!("'{}' disagrees with its columns ({})", row.code, code),
            ));
        }

        let project_type = ProjectType::from_str(&row.project_type)
            .map_err(|e| invalid("project_type", e.to_string()))?;

        Ok(Project {
            code,
            project_type,
            name: row.name,
            created_at: row.created_at,
        })
    }
}

/// Repository for projects.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: SqlitePool,
}

impl ProjectRepository {
    /// Creates a new ProjectRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProjectRepository { pool }
    }

    /// Inserts a project, reserving its code.
    ///
    /// ## Returns
    /// * `Ok(())` - Code reserved
    /// * `Err(DbError::UniqueViolation)` - Code or bucket sequence already taken
    pub async fn insert(&self, project: &Project) -> DbResult<()> {
        let code = project.code.to_string();
        debug!(code = %code, project_type = %project.project_type.as_str(), "Inserting project");

        sqlx::query(
            r#"
            INSERT INTO projects (
                code, type_prefix, year, year_digit, month, sequence,
                prototype, project_type, name, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&code)
        .bind(project.code.type_prefix.as_str())
        .bind(project.code.year)
        .bind(i64::from(project.code.bucket().year_digit()))
        .bind(project.code.month)
        .bind(project.code.sequence)
        .bind(project.code.prototype.as_deref())
        .bind(project.project_type.as_str())
        .bind(project.name.as_deref())
        .bind(project.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: code.clone(),
            },
            other => other,
        })?;

        Ok(())
    }

    /// Codes starting with `prefix`, highest sequence first.
    ///
    /// ## Example
    /// ```rust,ignore
    /// // Latest code issued in May 2025 for residential projects
    /// let latest = repo.codes_by_prefix("RE-505-", 1).await?;
    /// ```
    pub async fn codes_by_prefix(&self, prefix: &str, limit: u32) -> DbResult<Vec<String>> {
        let codes: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT code
            FROM projects
            WHERE substr(code, 1, length(?1)) = ?1
            ORDER BY sequence DESC, code DESC
            LIMIT ?2
            "#,
        )
        .bind(prefix)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(codes)
    }

    /// Gets a project by its code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT code, type_prefix, year, month, sequence,
                   prototype, project_type, name, created_at
            FROM projects
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Project::try_from).transpose()
    }

    /// Counts projects.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn project(code: &str, project_type: ProjectType) -> Project {
        Project {
            code: code.parse().unwrap(),
            project_type,
            name: Some("Casa Lomas".to_string()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_by_code() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.projects();

        let original = project("WN-512-007-B1", ProjectType::Desarrollo);
        repo.insert(&original).await.unwrap();

        let loaded = repo.get_by_code("WN-512-007-B1").await.unwrap().unwrap();
        assert_eq!(loaded.code, original.code);
        assert_eq!(loaded.code.year, 2025);
        assert_eq!(loaded.project_type, ProjectType::Desarrollo);
        assert_eq!(loaded.name.as_deref(), Some("Casa Lomas"));

        assert!(repo.get_by_code("WN-512-008").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sequence_in_bucket_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.projects();

        repo.insert(&project("WN-512-007", ProjectType::Desarrollo))
            .await
            .unwrap();

        // Same bucket and sequence, different prototype.
        let err = repo
            .insert(&project("WN-512-007-B1", ProjectType::Desarrollo))
            .await
            .unwrap_err();
        match err {
            DbError::UniqueViolation { value, .. } => assert_eq!(value, "WN-512-007-B1"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_codes_by_prefix_orders_by_sequence() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.projects();

        for code in ["RE-505-002", "RE-505-010", "RE-505-001", "RE-506-050", "WN-505-099"] {
            repo.insert(&project(code, ProjectType::Residencial))
                .await
                .unwrap();
        }

        let codes = repo.codes_by_prefix("RE-505-", 10).await.unwrap();
        assert_eq!(codes, vec!["RE-505-010", "RE-505-002", "RE-505-001"]);

        let latest = repo.codes_by_prefix("RE-505-", 1).await.unwrap();
        assert_eq!(latest, vec!["RE-505-010"]);

        assert!(repo.codes_by_prefix("RE-507-", 1).await.unwrap().is_empty());
    }
}
