//! Request validation for batch consolidation.
//!
//! These checks belong to the caller: the HTTP layer runs them before handing a
//! batch to the core, which itself accepts any input. Errors are collected, not
//! short-circuited, so a client sees everything wrong with a request at once.

use std::collections::BTreeSet;
use std::fmt;

use super::types::{BatchDocument, StylingMapping, UserAnswers};

pub const DEFAULT_MAX_DOCUMENTS: usize = 100;
pub const DEFAULT_MAX_TEMPLATES: usize = 10;

/// Validation error with a readable message and an optional fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    pub message: String,
    /// Suggestion for how to fix the error
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn empty_batch() -> Self {
        Self::new("documents", "Batch must contain at least one document")
            .with_suggestion("Add the documents to generate to the request")
    }

    pub fn too_many_documents(count: usize, max: usize) -> Self {
        Self::new(
            "documents",
            format!("Batch contains {count} documents, the limit is {max}"),
        )
        .with_suggestion("Split the request into several smaller batches")
    }

    pub fn too_many_templates(count: usize, max: usize) -> Self {
        Self::new(
            "documents.template_id",
            format!("Batch uses {count} distinct templates, the limit is {max}"),
        )
        .with_suggestion("Group documents so each batch uses fewer templates")
    }

    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{label} must not be empty"))
            .with_suggestion(format!("Provide a valid {}", label.to_lowercase()))
    }

    pub fn unknown_answer(canonical_key: &str) -> Self {
        Self::new(
            format!("answers.{canonical_key}"),
            format!("'{canonical_key}' is not used by any document in this batch"),
        )
        .with_suggestion("Answer only the fields returned by the consolidation step")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors with formatted output.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// Numbered, multi-line message suitable for returning to a client.
    pub fn to_message(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }

        let mut parts = vec![format!(
            "Validation failed: {} error(s) found\n",
            self.errors.len()
        )];

        for (i, error) in self.errors.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, error));
        }

        parts.push(String::new());
        parts.push("Please correct the data above and try again.".to_string());

        parts.join("\n")
    }

    /// Ok if no errors were collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_message())
    }
}

impl std::error::Error for ValidationErrors {}

/// Size limits a batch request must respect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub max_documents: usize,
    pub max_templates: usize,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_documents: DEFAULT_MAX_DOCUMENTS,
            max_templates: DEFAULT_MAX_TEMPLATES,
        }
    }
}

// ============================================================================
// Validation functions
// ============================================================================

/// Validate that a string is not empty after trimming
pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

/// Check batch size, distinct template count, and that every document names a template.
pub fn validate_batch(documents: &[BatchDocument], limits: &BatchLimits, errors: &mut ValidationErrors) {
    if documents.is_empty() {
        errors.add(ValidationError::empty_batch());
        return;
    }

    if documents.len() > limits.max_documents {
        errors.add(ValidationError::too_many_documents(
            documents.len(),
            limits.max_documents,
        ));
    }

    let templates: BTreeSet<&str> = documents
        .iter()
        .map(|document| document.template_id.trim())
        .filter(|id| !id.is_empty())
        .collect();
    if templates.len() > limits.max_templates {
        errors.add(ValidationError::too_many_templates(
            templates.len(),
            limits.max_templates,
        ));
    }

    for (index, document) in documents.iter().enumerate() {
        validate_required(
            &document.template_id,
            &format!("documents[{index}].template_id"),
            "Template ID",
            errors,
        );
    }
}

/// Check that every answered key is needed by at least one document.
pub fn validate_answers(styling_map: &StylingMapping, answers: &UserAnswers, errors: &mut ValidationErrors) {
    let known: BTreeSet<&str> = styling_map
        .values()
        .flat_map(|document| document.placeholders.iter())
        .map(|entry| entry.canonical_key.as_str())
        .collect();

    for key in answers.keys() {
        if !known.contains(key.as_str()) {
            errors.add(ValidationError::unknown_answer(key));
        }
    }
}
