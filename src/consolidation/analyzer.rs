//! Pattern analysis: group every placeholder occurrence of a batch by canonical key.

use serde::Serialize;
use std::collections::HashMap;

use super::canonical::Canonicalizer;
use super::metadata::TemplateMetadataProvider;
use super::types::{BatchDocument, CanonicalGroup, PlaceholderOccurrence};

/// Canonical groups of a batch in first-seen order, with lookup by key.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupedPlaceholders {
    groups: Vec<CanonicalGroup>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl GroupedPlaceholders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an occurrence to the group for `canonical_key`, creating it on first sight.
    pub fn push(&mut self, canonical_key: String, occurrence: PlaceholderOccurrence) {
        match self.index.get(&canonical_key) {
            Some(&position) => self.groups[position].occurrences.push(occurrence),
            None => {
                log::debug!(
                    "New canonical group '{}' from placeholder '{}' (document {})",
                    canonical_key,
                    occurrence.placeholder_name,
                    occurrence.document_index
                );
                self.index.insert(canonical_key.clone(), self.groups.len());
                self.groups.push(CanonicalGroup::new(occurrence, canonical_key));
            }
        }
    }

    pub fn get(&self, canonical_key: &str) -> Option<&CanonicalGroup> {
        self.index
            .get(canonical_key)
            .map(|&position| &self.groups[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of occurrences across all groups.
    pub fn total_occurrences(&self) -> usize {
        self.groups.iter().map(CanonicalGroup::len).sum()
    }

    /// Groups with more than one occurrence.
    pub fn consolidatable(&self) -> impl Iterator<Item = &CanonicalGroup> {
        self.groups.iter().filter(|group| group.is_consolidatable())
    }

    pub fn into_groups(self) -> Vec<CanonicalGroup> {
        self.groups
    }
}

/// Walk the batch in document order, then placeholder order, and group each
/// occurrence under its canonical key.
///
/// Placeholders a template does not declare (or whose template is unknown)
/// get the default metadata: type `text`, empty styling.
pub fn analyze<P, C>(batch: &[BatchDocument], provider: &P, canonicalizer: &C) -> GroupedPlaceholders
where
    P: TemplateMetadataProvider + ?Sized,
    C: Canonicalizer + ?Sized,
{
    let mut grouped = GroupedPlaceholders::new();

    for (document_index, document) in batch.iter().enumerate() {
        if !provider.knows_template(&document.template_id) {
            log::warn!(
                "No placeholder metadata for template '{}' (document {}), using defaults",
                document.template_id,
                document_index
            );
        }
        let metadata = provider.get_placeholder_metadata(&document.template_id);

        for (name, value) in document.placeholder_data.iter() {
            let declared = metadata.get(name).cloned().unwrap_or_default();
            let canonical_key = canonicalizer.canonicalize(name, &declared);

            grouped.push(
                canonical_key,
                PlaceholderOccurrence {
                    document_index,
                    template_id: document.template_id.clone(),
                    placeholder_name: name.to_string(),
                    value: value.to_string(),
                    placeholder_type: declared.placeholder_type,
                    styling: declared.styling,
                },
            );
        }
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidation::canonical::SynonymTable;
    use crate::consolidation::metadata::{PlaceholderMetadata, Template, TemplateCatalog};
    use crate::consolidation::types::{PlaceholderFields, PlaceholderType};

    fn document(template_id: &str, pairs: &[(&str, &str)]) -> BatchDocument {
        BatchDocument::new(template_id, pairs.iter().copied().collect::<PlaceholderFields>())
    }

    #[test]
    fn test_groups_synonyms_across_documents() {
        let batch = vec![
            document("t", &[("client_name", "Alice")]),
            document("t", &[("customer_name", "Alice")]),
            document("t", &[("name", "Bob")]),
        ];
        let grouped = analyze(&batch, &TemplateCatalog::default(), &SynonymTable::default());

        assert_eq!(grouped.len(), 1);
        let group = grouped.get("name").unwrap();
        assert_eq!(group.len(), 3);
        let names: Vec<&str> = group
            .occurrences
            .iter()
            .map(|o| o.placeholder_name.as_str())
            .collect();
        assert_eq!(names, vec!["client_name", "customer_name", "name"]);
    }

    #[test]
    fn test_declared_metadata_is_attached() {
        let template = Template::new("lease").with_placeholder(
            "tenant_address",
            PlaceholderMetadata::new(PlaceholderType::Address).with_styling("break_on_comma", true),
        );
        let batch = vec![document("lease", &[("tenant_address", "1 A St, Town")])];
        let grouped = analyze(&batch, &TemplateCatalog::new(&[template]), &SynonymTable::default());

        let group = grouped.get("address").unwrap();
        assert_eq!(group.placeholder_type, PlaceholderType::Address);
        assert_eq!(
            group.occurrences[0].styling.get("break_on_comma"),
            Some(&serde_json::Value::Bool(true))
        );
    }

    #[test]
    fn test_unknown_template_uses_text_defaults() {
        let batch = vec![document("missing", &[("reference", "R-1")])];
        let grouped = analyze(&batch, &TemplateCatalog::default(), &SynonymTable::default());

        let group = grouped.get("reference").unwrap();
        assert_eq!(group.placeholder_type, PlaceholderType::Text);
        assert!(group.occurrences[0].styling.is_empty());
    }

    #[test]
    fn test_group_order_is_first_seen() {
        let batch = vec![
            document("t", &[("reference", "R"), ("phone", "1")]),
            document("t", &[("email", "a@b.c"), ("reference", "R")]),
        ];
        let grouped = analyze(&batch, &TemplateCatalog::default(), &SynonymTable::default());
        let keys: Vec<&str> = grouped.iter().map(|g| g.canonical_key.as_str()).collect();
        assert_eq!(keys, vec!["reference", "phone", "email"]);
        assert_eq!(grouped.total_occurrences(), 4);
        assert_eq!(grouped.consolidatable().count(), 1);
    }

    #[test]
    fn test_empty_batch() {
        let grouped = analyze(&[], &TemplateCatalog::default(), &SynonymTable::default());
        assert!(grouped.is_empty());
        assert_eq!(grouped.total_occurrences(), 0);
    }
}
