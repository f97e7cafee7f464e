//! Data ingestion and storage
//!
//! Scrapers for the play-by-play source, table extraction and CSV export.

pub mod export;
pub mod scrapers;
pub mod table;

pub use table::{extract_table, ExtractedTable, RawRow};
