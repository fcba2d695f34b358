//! Form building: turn canonical groups into the fields the user actually fills.

use serde::{Deserialize, Serialize};

use super::analyzer::GroupedPlaceholders;
use super::common::humanize_key;
use super::types::{CanonicalGroup, ConsolidatedField, ConsolidationSummary};

/// Labels for well-known canonical keys.
const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("name", "Full Name"),
    ("address", "Address"),
    ("date", "Date"),
    ("signature", "Signature"),
    ("email", "Email Address"),
    ("phone", "Phone Number"),
    ("company", "Company Name"),
    ("position", "Job Title/Position"),
];

/// The user-facing form plus its reduction accounting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConsolidatedForm {
    pub fields: Vec<ConsolidatedField>,
    pub summary: ConsolidationSummary,
}

/// Human label for a canonical key.
pub fn display_name(canonical_key: &str) -> String {
    DISPLAY_NAMES
        .iter()
        .find(|(key, _)| *key == canonical_key)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| humanize_key(canonical_key))
}

/// Most frequent value of a group; the first-seen value wins a tie.
pub fn most_common(group: &CanonicalGroup) -> Option<&str> {
    let mut best: Option<(&str, usize)> = None;
    for (value, count) in group.distinct_values() {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}

/// Percentage of inputs saved, rounded to one decimal. Zero when there was nothing to enter.
///
/// Rounding goes through decimal formatting of the exact value, so ties round
/// to even (81.25 -> 81.2) rather than away from zero.
pub fn reduction_percentage(original: usize, consolidated: usize) -> f64 {
    if original == 0 {
        return 0.0;
    }
    let saved = original.saturating_sub(consolidated) as f64;
    let percentage = saved / original as f64 * 100.0;
    format!("{percentage:.1}").parse().unwrap_or(percentage)
}

fn shared_field(group: &CanonicalGroup) -> ConsolidatedField {
    let document_indices = group.document_indices();
    ConsolidatedField {
        canonical_key: group.canonical_key.clone(),
        display_name: display_name(&group.canonical_key),
        placeholder_type: group.placeholder_type,
        default_value: most_common(group).unwrap_or_default().to_string(),
        applies_to_document_count: document_indices.len(),
        document_indices,
        required: true,
    }
}

fn individual_field(group: &CanonicalGroup) -> Option<ConsolidatedField> {
    let occurrence = group.occurrences.first()?;
    Some(ConsolidatedField {
        canonical_key: group.canonical_key.clone(),
        display_name: format!(
            "{} (Document {})",
            display_name(&group.canonical_key),
            occurrence.document_index + 1
        ),
        placeholder_type: group.placeholder_type,
        default_value: occurrence.value.clone(),
        applies_to_document_count: 1,
        document_indices: vec![occurrence.document_index],
        required: false,
    })
}

/// Build the consolidated form for a batch.
///
/// One required field per group with several occurrences, one optional field
/// per single-use group. Fields are ordered by how many documents they fill,
/// most first; equal counts keep group order.
pub fn build_form(groups: &GroupedPlaceholders) -> ConsolidatedForm {
    let mut fields = Vec::with_capacity(groups.len());

    for group in groups.iter() {
        let field = if group.is_consolidatable() {
            Some(shared_field(group))
        } else {
            individual_field(group)
        };
        if let Some(field) = field {
            log::debug!(
                "Form field '{}' covers {} document(s)",
                field.display_name,
                field.applies_to_document_count
            );
            fields.push(field);
        }
    }

    fields.sort_by(|a, b| b.applies_to_document_count.cmp(&a.applies_to_document_count));

    let original_input_count = groups.total_occurrences();
    let consolidated_input_count = fields.len();
    let summary = ConsolidationSummary {
        original_input_count,
        consolidated_input_count,
        reduction_percentage: reduction_percentage(original_input_count, consolidated_input_count),
        duplicate_group_count: groups.consolidatable().count(),
    };

    ConsolidatedForm { fields, summary }
}
