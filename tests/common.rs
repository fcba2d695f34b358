#![allow(dead_code)]

use batch_consolidator::consolidation::{
    BatchDocument, PlaceholderFields, PlaceholderMetadata, PlaceholderType, Template, UserAnswers,
};

/// Test helper to build a document from (name, value) pairs, keeping their order
pub fn document(template_id: &str, pairs: &[(&str, &str)]) -> BatchDocument {
    BatchDocument::new(
        template_id,
        pairs.iter().copied().collect::<PlaceholderFields>(),
    )
}

/// Test helper to build answers keyed by canonical key
pub fn answers(pairs: &[(&str, &str)]) -> UserAnswers {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// A lease and an invoice template with typed, styled placeholders
pub fn sample_templates() -> Vec<Template> {
    vec![
        Template::new("lease")
            .with_placeholder("tenant_name", PlaceholderMetadata::new(PlaceholderType::Text))
            .with_placeholder(
                "tenant_address",
                PlaceholderMetadata::new(PlaceholderType::Address).with_styling("break_on_comma", true),
            )
            .with_placeholder(
                "start_date",
                PlaceholderMetadata::new(PlaceholderType::Date).with_styling("format", "%d %B %Y"),
            ),
        Template::new("invoice")
            .with_placeholder(
                "customer_name",
                PlaceholderMetadata::new(PlaceholderType::Text).with_styling("case", "upper"),
            )
            .with_placeholder("billing_address", PlaceholderMetadata::new(PlaceholderType::Address))
            .with_placeholder(
                "issued",
                PlaceholderMetadata::new(PlaceholderType::Date).with_styling("format", "%d/%m/%Y"),
            )
            .with_placeholder("invoice_number", PlaceholderMetadata::new(PlaceholderType::Text)),
    ]
}

/// Three documents over the sample templates
pub fn sample_batch() -> Vec<BatchDocument> {
    vec![
        document(
            "lease",
            &[
                ("tenant_name", "Ada Obi"),
                ("tenant_address", "12 Main St, Lagos, Nigeria"),
                ("start_date", "2025-02-01"),
            ],
        ),
        document(
            "invoice",
            &[
                ("customer_name", "Ada Obi"),
                ("billing_address", "12 Main St, Lagos, Nigeria"),
                ("issued", "2025-02-01"),
                ("invoice_number", "INV-7"),
            ],
        ),
        document(
            "lease",
            &[
                ("tenant_name", "Ada O."),
                ("tenant_address", "12 Main St, Lagos, Nigeria"),
                ("start_date", "2025-03-01"),
            ],
        ),
    ]
}
