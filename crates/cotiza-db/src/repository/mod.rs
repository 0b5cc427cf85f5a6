//! # Repository Module
//!
//! Database repository implementations for Cotiza.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  QuotationService / CodeAllocator                                       │
//! │       │                                                                 │
//! │       │  db.projects().codes_by_prefix("RE-505-", 1)                    │
//! │       ▼                                                                 │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐   │
//! │  │  Material    │ │  Accessory   │ │   Project    │ │  Quotation   │   │
//! │  │  catalog     │ │  cost table  │ │  codes       │ │  lines       │   │
//! │  └──────────────┘ └──────────────┘ └──────────────┘ └──────────────┘   │
//! │       │                                                                 │
//! │       │  SQL (runtime-checked, bound parameters)                        │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each repository owns a clone of the pool and maps rows into
//! `cotiza-core` types, rejecting rows that fail to decode with
//! [`crate::DbError::InvalidData`].

pub mod accessory;
pub mod material;
pub mod project;
pub mod quotation;
