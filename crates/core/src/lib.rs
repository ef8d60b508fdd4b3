//! # Registro Core
//!
//! Core business logic for the registro billing ledger.
//!
//! This crate owns the tabular ledger and the algorithms around it:
//! - the versioned required-columns schema and its normalizer
//! - the row-insertion engine that places a visit's line items
//! - the visit color-banding renderer
//! - the ledger store mirroring the in-memory table to its file
//! - the read-only reference catalogs (procedures, medications, diagnoses)
//!
//! **No API concerns**: HTTP routing, serialization of request bodies, and
//! process configuration belong in `api-rest` and the binaries.

pub mod banding;
pub mod catalog;
pub mod config;
pub mod error;
pub mod insert;
pub mod ledger;
pub mod schema;
pub mod table;
pub mod workbook;

pub use catalog::{Catalog, CatalogEntry, CatalogSet};
pub use config::CoreConfig;
pub use error::{LedgerError, LedgerResult};
pub use insert::{AddOutcome, LineItem, PatientPolicy, SkippedItem, VisitContext};
pub use ledger::LedgerStore;
pub use schema::{RawTable, SchemaMode};
pub use table::{Column, Row, Table};

pub use registro_types::{CellValue, ItemKind, NonEmptyText};
