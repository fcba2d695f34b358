//! Batch input consolidation.
//!
//! When several documents are generated at once, many of their placeholders
//! ask for the same thing under different names. This module folds them into
//! one form and later spreads the answers back out:
//! - `canonical` - map raw placeholder names to canonical keys
//! - `analyzer` - group a batch's occurrences by canonical key
//! - `form` - build the consolidated form and its reduction summary
//! - `styling` - per-document table restoring original names and styling
//! - `apply` - format answers and produce per-document placeholder payloads

pub mod analyzer;
pub mod apply;
pub mod canonical;
pub mod common;
pub mod form;
pub mod metadata;
pub mod styling;
pub mod types;
pub mod validation;

pub use analyzer::{analyze, GroupedPlaceholders};
pub use apply::{apply, apply_detailed, format_value, AppliedBatch, FormattedValue, FormattingWarning};
pub use canonical::{canonicalize, Canonicalizer, SynonymCategory, SynonymTable};
pub use form::{build_form, display_name, ConsolidatedForm};
pub use metadata::{
    PlaceholderMetadata, Template, TemplateCatalog, TemplateMetadata, TemplateMetadataProvider,
    TemplatePlaceholder,
};
pub use styling::build_styling_map;
pub use types::*;
pub use validation::{BatchLimits, ValidationError, ValidationErrors};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConsolidationConfig;

/// Errors at the edges of consolidation. The core transformations themselves never fail.
#[derive(Debug, Error)]
pub enum ConsolidationError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("failed to read synonym table {path}: {source}")]
    SynonymTableIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse synonym table {path}: {source}")]
    SynonymTableParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Trait for validating request objects.
pub trait Validator {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// A batch generation request as it arrives from the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub templates: Vec<Template>,
    pub documents: Vec<BatchDocument>,
}

impl BatchRequest {
    pub fn validate_with(&self, limits: &BatchLimits) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validation::validate_batch(&self.documents, limits, &mut errors);
        errors.into_result()
    }
}

impl Validator for BatchRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.validate_with(&BatchLimits::default())
    }
}

/// Answers submitted for a previously consolidated batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyRequest {
    pub styling_mappings: StylingMapping,
    #[serde(default)]
    pub answers: UserAnswers,
}

impl Validator for ApplyRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validation::validate_answers(&self.styling_mappings, &self.answers, &mut errors);
        errors.into_result()
    }
}

/// Entry point for both phases of batch consolidation.
#[derive(Debug, Clone, Default)]
pub struct BatchConsolidator {
    synonyms: SynonymTable,
    limits: BatchLimits,
}

impl BatchConsolidator {
    /// Consolidator with the built-in synonym table and default limits.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_synonyms(mut self, synonyms: SynonymTable) -> Self {
        self.synonyms = synonyms;
        self
    }

    pub fn with_limits(mut self, limits: BatchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Build a consolidator from configuration, loading a custom synonym table if one is set.
    pub fn from_config(config: &ConsolidationConfig) -> Result<Self, ConsolidationError> {
        Ok(Self::new()
            .with_synonyms(config.load_synonyms()?)
            .with_limits(config.limits()))
    }

    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    pub fn limits(&self) -> &BatchLimits {
        &self.limits
    }

    /// Consolidate a batch against the templates sent with it.
    pub fn consolidate_batch_inputs(
        &self,
        templates: &[Template],
        documents: &[BatchDocument],
    ) -> ConsolidationResult {
        self.consolidate_with_provider(&TemplateCatalog::new(templates), documents)
    }

    /// Consolidate a batch, reading template metadata from `provider`.
    pub fn consolidate_with_provider<P>(&self, provider: &P, documents: &[BatchDocument]) -> ConsolidationResult
    where
        P: TemplateMetadataProvider + ?Sized,
    {
        let groups = analyze(documents, provider, &self.synonyms);
        let form = build_form(&groups);
        let styling_mappings = build_styling_map(documents, provider, &self.synonyms);

        log::info!(
            "Consolidated {} document(s): {} input(s) -> {} ({}% fewer, {} shared group(s))",
            documents.len(),
            form.summary.original_input_count,
            form.summary.consolidated_input_count,
            form.summary.reduction_percentage,
            form.summary.duplicate_group_count
        );

        ConsolidationResult {
            consolidated_placeholders: form.fields,
            styling_mappings,
            summary: form.summary,
        }
    }

    /// Validate a request against this consolidator's limits, then consolidate it.
    pub fn consolidate_request(&self, request: &BatchRequest) -> Result<ConsolidationResult, ConsolidationError> {
        request.validate_with(&self.limits)?;
        Ok(self.consolidate_batch_inputs(&request.templates, &request.documents))
    }

    /// Spread consolidated answers back out to every document.
    pub fn apply_consolidated_inputs(
        &self,
        styling_mappings: &StylingMapping,
        answers: &UserAnswers,
    ) -> DocumentMap<DocumentPayload> {
        apply(styling_mappings, answers)
    }

    /// Like [`apply_consolidated_inputs`](Self::apply_consolidated_inputs), also
    /// reporting values whose formatting could not be applied.
    pub fn apply_with_report(&self, styling_mappings: &StylingMapping, answers: &UserAnswers) -> AppliedBatch {
        apply_detailed(styling_mappings, answers)
    }

    /// Validate answers against the mapping, then apply them.
    pub fn apply_request(&self, request: &ApplyRequest) -> Result<AppliedBatch, ConsolidationError> {
        request.validate()?;
        Ok(self.apply_with_report(&request.styling_mappings, &request.answers))
    }
}
