//! # cotiza-db: Persistence and Services for Cotiza
//!
//! SQLite storage for the catalog, projects and quotation lines, plus the
//! concurrency-safe code allocator and the quotation service built on top.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cotiza Data Flow                                 │
//! │                                                                         │
//! │  Caller (UI, API, seed binary)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    cotiza-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐   ┌───────────────┐   ┌───────────────┐   │   │
//! │  │   │QuotationService│──►│ CodeAllocator │──►│ Repositories  │   │   │
//! │  │   │ commit / audit │   │ per-bucket    │   │ material      │   │   │
//! │  │   │                │   │ lock + retry  │   │ accessory     │   │   │
//! │  │   └───────┬────────┘   └───────────────┘   │ project       │   │   │
//! │  │           │                                │ quotation     │   │   │
//! │  │           ▼                                └───────┬───────┘   │   │
//! │  │   cotiza-core (pricing, codes)                     │           │   │
//! │  │                                        ┌───────────▼───────┐   │   │
//! │  │                                        │ Database (pool.rs)│   │   │
//! │  │                                        │ + migrations      │   │   │
//! │  │                                        └───────────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (./cotiza.db, WAL)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`allocator`] - Project code allocation
//! - [`service`] - Quotation commit and price audit
//! - [`config`] - Environment configuration
//! - [`logging`] - `tracing` subscriber setup
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cotiza_db::{CotizaConfig, Database, QuotationService};
//!
//! let config = CotizaConfig::load()?;
//! let db = Database::new(config.db_config()).await?;
//! let service = QuotationService::from_config(db, &config);
//!
//! let committed = service.commit(&request).await?;
//! let audit = service.audit(&committed.project.code.to_string()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocator;
pub mod config;
pub mod error;
pub mod logging;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use allocator::{next_sequence, CodeAllocator, CodeStore, NewProject};
pub use config::{ConfigError, CotizaConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use service::{
    CommittedQuotation, LineAudit, ProjectAudit, QuotationLine, QuotationRequest,
    QuotationService,
};

// Repository re-exports for convenience
pub use repository::accessory::AccessoryRepository;
pub use repository::material::{Material, MaterialRepository};
pub use repository::project::{Project, ProjectRepository};
pub use repository::quotation::{QuotationItem, QuotationRepository};
