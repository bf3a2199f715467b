//! `billgrid-recon`: Bill reconciliation and deviation engine.
//!
//! Pure engine crate: receives pre-loaded sheet tables, returns the current
//! bill, deviation statement, notes and render-ready sheet payloads.
//! No CLI or file IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod notes;
pub mod schedule;
pub mod sheets;
pub mod summary;
pub mod words;

pub use config::ReconConfig;
pub use engine::{load_csv_table, run};
pub use error::ReconError;
pub use model::{BillContext, BillInput, Cell, ReconResult, Table};
pub use sheets::{build_sheets, SheetKind, SheetSet};
