//! Styling map: per document, how each canonical value flows back into the
//! placeholder the document originally declared.

use super::canonical::Canonicalizer;
use super::metadata::TemplateMetadataProvider;
use super::types::{BatchDocument, DocumentStyling, StyledPlaceholder, StylingMapping};

/// Build the reconstruction table for every document of the batch.
///
/// Uses the same canonicalizer and metadata as [`analyze`](super::analyzer::analyze),
/// so every occurrence there has exactly one entry here.
pub fn build_styling_map<P, C>(batch: &[BatchDocument], provider: &P, canonicalizer: &C) -> StylingMapping
where
    P: TemplateMetadataProvider + ?Sized,
    C: Canonicalizer + ?Sized,
{
    let mut mapping = StylingMapping::new();

    for (document_index, document) in batch.iter().enumerate() {
        let metadata = provider.get_placeholder_metadata(&document.template_id);

        let placeholders = document
            .placeholder_data
            .names()
            .map(|name| {
                let declared = metadata.get(name).cloned().unwrap_or_default();
                StyledPlaceholder {
                    canonical_key: canonicalizer.canonicalize(name, &declared),
                    original_placeholder_name: name.to_string(),
                    placeholder_type: declared.placeholder_type,
                    styling: declared.styling,
                    position: declared.position,
                    formatting: declared.formatting,
                }
            })
            .collect();

        mapping.insert(
            document_index,
            DocumentStyling {
                document_index,
                template_id: document.template_id.clone(),
                placeholders,
            },
        );
    }

    mapping
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidation::canonical::SynonymTable;
    use crate::consolidation::metadata::{PlaceholderMetadata, Template, TemplateCatalog};
    use crate::consolidation::types::{PlaceholderFields, PlaceholderType};
    use serde_json::json;

    #[test]
    fn test_entries_keep_original_names_and_metadata() {
        let mut declared = PlaceholderMetadata::new(PlaceholderType::Date).with_styling("format", "%d/%m/%Y");
        declared.position = Some(json!({"page": 2, "x": 40}));
        declared.formatting = Some(json!({"bold": true}));
        let catalog = TemplateCatalog::new(&[Template::new("invoice").with_placeholder("issued_on", declared)]);

        let batch = vec![BatchDocument::new(
            "invoice",
            [("customer_name", "Ada"), ("issued_on", "2024-01-31")]
                .into_iter()
                .collect::<PlaceholderFields>(),
        )];
        let mapping = build_styling_map(&batch, &catalog, &SynonymTable::default());

        let document = &mapping["document_0"];
        assert_eq!(document.template_id, "invoice");
        assert_eq!(document.canonical_keys(), vec!["name", "date"]);

        let date = document.entries_for("date").next().unwrap();
        assert_eq!(date.original_placeholder_name, "issued_on");
        assert_eq!(date.placeholder_type, PlaceholderType::Date);
        assert_eq!(date.position, Some(json!({"page": 2, "x": 40})));
        assert_eq!(date.formatting, Some(json!({"bold": true})));

        let name = document.entries_for("name").next().unwrap();
        assert_eq!(name.original_placeholder_name, "customer_name");
        assert_eq!(name.placeholder_type, PlaceholderType::Text);
        assert!(name.position.is_none());
    }

    #[test]
    fn test_one_entry_per_declared_placeholder() {
        let batch = vec![
            BatchDocument::new(
                "t",
                [("client_name", "A"), ("full_name", "A"), ("ref", "1")]
                    .into_iter()
                    .collect::<PlaceholderFields>(),
            ),
            BatchDocument::new("t", PlaceholderFields::new()),
        ];
        let mapping = build_styling_map(&batch, &TemplateCatalog::default(), &SynonymTable::default());

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping["document_0"].placeholders.len(), 3);
        assert_eq!(mapping["document_0"].entries_for("name").count(), 2);
        assert!(mapping["document_1"].placeholders.is_empty());
    }
}
