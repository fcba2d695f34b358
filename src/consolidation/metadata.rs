//! Template placeholder metadata and the provider seam the core reads it through.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::types::{PlaceholderType, Styling};

/// What a template declares about one of its placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderMetadata {
    #[serde(rename = "type", default)]
    pub placeholder_type: PlaceholderType,
    #[serde(default)]
    pub styling: Styling,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatting: Option<Value>,
}

impl PlaceholderMetadata {
    pub fn new(placeholder_type: PlaceholderType) -> Self {
        Self {
            placeholder_type,
            ..Self::default()
        }
    }

    pub fn with_styling(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.styling.insert(key.into(), value.into());
        self
    }
}

/// Placeholder metadata of one template, keyed by placeholder name.
pub type TemplateMetadata = HashMap<String, PlaceholderMetadata>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplatePlaceholder {
    pub name: String,
    #[serde(flatten)]
    pub metadata: PlaceholderMetadata,
}

/// A document template as the caller knows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub placeholders: Vec<TemplatePlaceholder>,
}

impl Template {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            placeholders: Vec::new(),
        }
    }

    pub fn with_placeholder(mut self, name: impl Into<String>, metadata: PlaceholderMetadata) -> Self {
        self.placeholders.push(TemplatePlaceholder {
            name: name.into(),
            metadata,
        });
        self
    }
}

/// Source of per-template placeholder metadata.
pub trait TemplateMetadataProvider {
    /// Metadata for every placeholder the template declares.
    /// Unknown templates yield an empty map, never an error.
    fn get_placeholder_metadata(&self, template_id: &str) -> TemplateMetadata;

    fn knows_template(&self, template_id: &str) -> bool;
}

/// In-memory provider built from the templates sent with a batch request.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: HashMap<String, TemplateMetadata>,
}

impl TemplateCatalog {
    pub fn new(templates: &[Template]) -> Self {
        let mut catalog = Self::default();
        for template in templates {
            catalog.insert(template);
        }
        catalog
    }

    /// Register a template. A later declaration of the same placeholder name wins.
    pub fn insert(&mut self, template: &Template) {
        let entry = self.templates.entry(template.id.clone()).or_default();
        for placeholder in &template.placeholders {
            entry.insert(placeholder.name.clone(), placeholder.metadata.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateMetadataProvider for TemplateCatalog {
    fn get_placeholder_metadata(&self, template_id: &str) -> TemplateMetadata {
        self.templates.get(template_id).cloned().unwrap_or_default()
    }

    fn knows_template(&self, template_id: &str) -> bool {
        self.templates.contains_key(template_id)
    }
}

impl TemplateMetadataProvider for HashMap<String, TemplateMetadata> {
    fn get_placeholder_metadata(&self, template_id: &str) -> TemplateMetadata {
        self.get(template_id).cloned().unwrap_or_default()
    }

    fn knows_template(&self, template_id: &str) -> bool {
        self.contains_key(template_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_template_yields_empty_map() {
        let catalog = TemplateCatalog::new(&[Template::new("nda")]);
        assert!(catalog.knows_template("nda"));
        assert!(!catalog.knows_template("lease"));
        assert!(catalog.get_placeholder_metadata("lease").is_empty());
    }

    #[test]
    fn test_template_deserialization_flattens_metadata() {
        let json = r#"{
            "id": "lease",
            "placeholders": [
                {"name": "tenant_address", "type": "address", "styling": {"break_on_comma": true}},
                {"name": "start", "type": "date", "styling": {"format": "%d %B %Y"}, "position": {"page": 1}}
            ]
        }"#;

        let template: Template = serde_json::from_str(json).unwrap();
        let catalog = TemplateCatalog::new(&[template]);
        let metadata = catalog.get_placeholder_metadata("lease");

        let address = &metadata["tenant_address"];
        assert_eq!(address.placeholder_type, PlaceholderType::Address);
        assert_eq!(address.styling.get("break_on_comma"), Some(&Value::Bool(true)));

        let start = &metadata["start"];
        assert_eq!(start.placeholder_type, PlaceholderType::Date);
        assert!(start.position.is_some());
        assert!(start.formatting.is_none());
    }

    #[test]
    fn test_missing_type_defaults_to_text() {
        let json = r#"{"id": "memo", "placeholders": [{"name": "subject"}]}"#;
        let template: Template = serde_json::from_str(json).unwrap();
        assert_eq!(
            template.placeholders[0].metadata.placeholder_type,
            PlaceholderType::Text
        );
    }
}
