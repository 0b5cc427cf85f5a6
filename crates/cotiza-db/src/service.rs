//! # Quotation Service
//!
//! Ties pricing, code allocation and persistence together.
//!
//! ## Commit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  QuotationService::commit(request)                                      │
//! │       │                                                                 │
//! │       ├── 1. project type present?      else MissingProjectType         │
//! │       ├── 2. price every line           (materials + accessory table)   │
//! │       │      any error here → nothing allocated, nothing written        │
//! │       ├── 3. CodeAllocator::allocate    → RE-505-004                    │
//! │       ├── 4. compose furniture codes    → RE-505-004-CO-ALC             │
//! │       └── 5. insert all lines           (one transaction)               │
//! │                                                                         │
//! │  QuotationService::audit(code)                                          │
//! │       └── reload lines → recompute → DiscrepancyReport per line         │
//! │           drift is logged at WARN, never corrected                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use cotiza_core::{
    check_discrepancy, compute_price, AccessoryCostTable, AreaCode, CoreError, DiscrepancyReport,
    FurnitureBom, FurnitureCode, FurnitureType, MaterialSelections, MaterialSlot, Money,
    ProductionType, ProjectType, ValidationError,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::allocator::{CodeAllocator, NewProject};
use crate::config::CotizaConfig;
use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::project::{Project, ProjectRepository};
use crate::repository::quotation::QuotationItem;

// =============================================================================
// Requests and Results
// =============================================================================

/// One furniture piece to quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationLine {
    pub area: AreaCode,
    pub furniture_type: FurnitureType,
    pub production: Option<ProductionType>,
    pub bom: FurnitureBom,
    /// Catalog material id per slot; slots left out contribute nothing.
    pub material_ids: BTreeMap<MaterialSlot, i64>,
    pub description: Option<String>,
}

impl QuotationLine {
    pub fn new(area: AreaCode, furniture_type: FurnitureType, bom: FurnitureBom) -> Self {
        QuotationLine {
            area,
            furniture_type,
            production: None,
            bom,
            material_ids: BTreeMap::new(),
            description: None,
        }
    }

    pub fn material(mut self, slot: MaterialSlot, material_id: i64) -> Self {
        self.material_ids.insert(slot, material_id);
        self
    }

    pub fn production(mut self, production: ProductionType) -> Self {
        self.production = Some(production);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A new project with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationRequest {
    /// Required; kept optional so a missing choice is reported, not defaulted.
    pub project_type: Option<ProjectType>,
    pub project_name: Option<String>,
    pub prototype: Option<String>,
    pub date: NaiveDate,
    pub lines: Vec<QuotationLine>,
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedQuotation {
    pub project: Project,
    pub items: Vec<QuotationItem>,
    pub total: Money,
}

/// Audit result of one stored line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineAudit {
    pub item_id: Uuid,
    pub furniture_code: FurnitureCode,
    pub report: DiscrepancyReport,
}

/// Audit result of a whole project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAudit {
    pub project_code: String,
    pub lines: Vec<LineAudit>,
}

impl ProjectAudit {
    /// Lines whose stored price drifted beyond tolerance.
    pub fn discrepancies(&self) -> impl Iterator<Item = &LineAudit> {
        self.lines.iter().filter(|l| l.report.has_discrepancy)
    }
}

// =============================================================================
// Service
// =============================================================================

/// Quotation operations over one database.
#[derive(Debug, Clone)]
pub struct QuotationService {
    db: Database,
    allocator: Arc<CodeAllocator<ProjectRepository>>,
    vertical_prefix: Option<String>,
}

impl QuotationService {
    /// Service with default allocation settings.
    pub fn new(db: Database) -> Self {
        Self::from_config(db, &CotizaConfig::default())
    }

    /// Service using the retry bound and vertical prefix of `config`.
    pub fn from_config(db: Database, config: &CotizaConfig) -> Self {
        let allocator =
            CodeAllocator::new(db.projects()).with_max_attempts(config.allocation_retries);
        QuotationService {
            db,
            allocator: Arc::new(allocator),
            vertical_prefix: config.vertical_prefix.clone(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn allocator(&self) -> &CodeAllocator<ProjectRepository> {
        &self.allocator
    }

    /// Loads the selected materials of a line.
    ///
    /// ## Errors
    /// - unknown material id → `NotFound`
    /// - material of the wrong kind for its slot → `Core(MaterialKindMismatch)`
    pub async fn load_selections(
        &self,
        material_ids: &BTreeMap<MaterialSlot, i64>,
    ) -> DbResult<MaterialSelections> {
        let materials = self.db.materials();
        let mut selections = MaterialSelections::new();

        for (&slot, &id) in material_ids {
            let material = materials
                .get_by_id(id)
                .await?
                .ok_or_else(|| DbError::not_found("Material", id.to_string()))?;
            selections.select(slot, material.selection()?)?;
        }

        Ok(selections)
    }

    /// Prices a line against the current catalog without persisting it.
    pub async fn price_line(
        &self,
        line: &QuotationLine,
        project_type: Option<ProjectType>,
        accessories: &AccessoryCostTable,
    ) -> DbResult<Money> {
        let selections = self.load_selections(&line.material_ids).await?;
        Ok(compute_price(&line.bom, &selections, accessories, project_type)?)
    }

    /// Allocates a project code, prices and stores every line.
    ///
    /// ## Errors
    /// - `Core(MissingProjectType)` - no project type chosen
    /// - `Core(Validation)` - no lines, or a residential prototype
    /// - pricing errors (unknown material, negative quantity, overflow)
    /// - allocation errors (`SequenceExhausted`, `AllocationConflict`)
    ///
    /// Pricing runs before allocation, so a rejected request never consumes a
    /// sequence.
    pub async fn commit(&self, request: &QuotationRequest) -> DbResult<CommittedQuotation> {
        let project_type = request.project_type.ok_or(CoreError::MissingProjectType)?;
        if request.lines.is_empty() {
            return Err(CoreError::from(ValidationError::Required {
                field: "lines".to_string(),
            })
            .into());
        }

        let accessories = self.db.accessories().load_table().await?;
        let mut prices = Vec::with_capacity(request.lines.len());
        for line in &request.lines {
            line.bom.validate()?;
            let price = self
                .price_line(line, Some(project_type), &accessories)
                .await?;
            debug!(
                area = %line.area,
                furniture_type = %line.furniture_type,
                price = %price,
                "Line priced"
            );
            prices.push(price);
        }
        let total = prices
            .iter()
            .try_fold(Money::zero(), |acc, p| acc.checked_add(*p))
            .ok_or_else(|| CoreError::PriceOverflow {
                term: "quotation total".to_string(),
            })?;

        let mut new_project = NewProject::new(project_type, request.date);
        new_project.name = request.project_name.clone();
        new_project.prototype = request.prototype.clone();
        new_project.vertical_prefix = self.vertical_prefix.clone();

        let project = self.allocator.allocate(&new_project).await?;
        let project_code = project.code.to_string();

        let now = Utc::now();
        let items: Vec<QuotationItem> = request
            .lines
            .iter()
            .zip(prices)
            .map(|(line, price)| QuotationItem {
                id: Uuid::new_v4(),
                project_code: project_code.clone(),
                furniture_code: FurnitureCode::new(
                    project.code.clone(),
                    line.area,
                    line.furniture_type,
                    line.production,
                ),
                bom: line.bom.clone(),
                material_ids: line.material_ids.clone(),
                stored_price: price,
                description: line.description.clone(),
                created_at: now,
            })
            .collect();

        self.db.quotations().insert_all(&items).await?;

        info!(
            code = %project_code,
            lines = items.len(),
            total = %total,
            "Quotation committed"
        );

        Ok(CommittedQuotation {
            project,
            items,
            total,
        })
    }

    /// Recomputes every stored line of a project and reports drift.
    ///
    /// Stored prices are never modified.
    pub async fn audit(&self, project_code: &str) -> DbResult<ProjectAudit> {
        let project = self
            .db
            .projects()
            .get_by_code(project_code)
            .await?
            .ok_or_else(|| DbError::not_found("Project", project_code))?;

        let items = self.db.quotations().list_by_project(project_code).await?;
        let accessories = self.db.accessories().load_table().await?;

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let selections = self.load_selections(&item.material_ids).await?;
            let report = check_discrepancy(
                item.stored_price,
                &item.bom,
                &selections,
                &accessories,
                Some(project.project_type),
            )?;

            if report.has_discrepancy {
                warn!(
                    furniture_code = %item.furniture_code,
                    stored = %report.stored,
                    calculated = %report.calculated,
                    difference = %report.difference,
                    "Stored price differs from recomputed price"
                );
            }

            lines.push(LineAudit {
                item_id: item.id,
                furniture_code: item.furniture_code,
                report,
            });
        }

        let audit = ProjectAudit {
            project_code: project_code.to_string(),
            lines,
        };
        info!(
            code = %project_code,
            lines = audit.lines.len(),
            discrepancies = audit.discrepancies().count(),
            "Price audit finished"
        );
        Ok(audit)
    }
}
