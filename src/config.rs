//! Environment-driven configuration for the consolidator.

use std::env;
use std::fs;
use std::path::PathBuf;

use crate::consolidation::validation::{BatchLimits, DEFAULT_MAX_DOCUMENTS, DEFAULT_MAX_TEMPLATES};
use crate::consolidation::{ConsolidationError, SynonymTable};

pub const MAX_DOCUMENTS_VAR: &str = "CONSOLIDATION_MAX_DOCUMENTS";
pub const MAX_TEMPLATES_VAR: &str = "CONSOLIDATION_MAX_TEMPLATES";
pub const SYNONYMS_FILE_VAR: &str = "CONSOLIDATION_SYNONYMS_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidationConfig {
    pub max_documents: usize,
    pub max_templates: usize,
    /// JSON synonym table replacing the built-in one.
    pub synonyms_file: Option<PathBuf>,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            max_documents: DEFAULT_MAX_DOCUMENTS,
            max_templates: DEFAULT_MAX_TEMPLATES,
            synonyms_file: None,
        }
    }
}

fn parse_limit(name: &str, raw: Option<String>, default: usize) -> usize {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => value,
        _ => {
            log::warn!("{name}='{raw}' is not a positive integer, using default {default}");
            default
        }
    }
}

impl ConsolidationConfig {
    /// Load `.env` if present, then read configuration from the environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let synonyms_file = lookup(SYNONYMS_FILE_VAR)
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Self {
            max_documents: parse_limit(MAX_DOCUMENTS_VAR, lookup(MAX_DOCUMENTS_VAR), DEFAULT_MAX_DOCUMENTS),
            max_templates: parse_limit(MAX_TEMPLATES_VAR, lookup(MAX_TEMPLATES_VAR), DEFAULT_MAX_TEMPLATES),
            synonyms_file,
        }
    }

    pub fn limits(&self) -> BatchLimits {
        BatchLimits {
            max_documents: self.max_documents,
            max_templates: self.max_templates,
        }
    }

    /// The configured synonym table, or the built-in one when no file is set.
    pub fn load_synonyms(&self) -> Result<SynonymTable, ConsolidationError> {
        let Some(path) = &self.synonyms_file else {
            return Ok(SynonymTable::default());
        };

        let json = fs::read_to_string(path).map_err(|source| ConsolidationError::SynonymTableIo {
            path: path.clone(),
            source,
        })?;
        let table = SynonymTable::from_json(&json).map_err(|source| {
            ConsolidationError::SynonymTableParse {
                path: path.clone(),
                source,
            }
        })?;

        log::info!(
            "Loaded {} synonym categories from {}",
            table.categories().len(),
            path.display()
        );
        Ok(table)
    }
}
