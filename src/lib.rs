//! Batch input consolidation for multi-document generation.
//!
//! A batch asks for many documents from a handful of templates. Their
//! placeholders overlap ("client_name", "customer_name", "full_name"), so the
//! user is shown one consolidated form and each answer is distributed back to
//! every document with that document's own styling.

pub mod config;
pub mod consolidation;

pub use crate::config::ConsolidationConfig;
pub use crate::consolidation::{
    ApplyRequest, BatchConsolidator, BatchRequest, ConsolidationError, ConsolidationResult,
};
