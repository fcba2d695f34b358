//! Input application: distribute consolidated answers back to each document,
//! formatted for that document's own placeholder.

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write;

use super::common::title_case;
use super::types::{
    document_key, DocumentMap, DocumentPayload, PlaceholderFields, PlaceholderType, Styling,
    StylingMapping, UserAnswers,
};

/// Input format expected for date answers.
const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Outcome of formatting one value.
///
/// `Formatted` also covers values whose type has no formatting rule and pass
/// through untouched. `Unformatted` carries the raw value plus why the rule
/// could not be applied; callers still use the raw value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FormattedValue {
    Formatted { value: String },
    Unformatted { value: String, reason: String },
}

impl FormattedValue {
    fn formatted(value: impl Into<String>) -> Self {
        FormattedValue::Formatted {
            value: value.into(),
        }
    }

    fn unformatted(value: impl Into<String>, reason: impl Into<String>) -> Self {
        FormattedValue::Unformatted {
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            FormattedValue::Formatted { value } | FormattedValue::Unformatted { value, .. } => value,
        }
    }

    pub fn into_value(self) -> String {
        match self {
            FormattedValue::Formatted { value } | FormattedValue::Unformatted { value, .. } => value,
        }
    }

    pub fn is_formatted(&self) -> bool {
        matches!(self, FormattedValue::Formatted { .. })
    }
}

/// A value that went into a document without its formatting rule applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattingWarning {
    pub document_key: String,
    pub canonical_key: String,
    pub placeholder_name: String,
    pub value: String,
    pub reason: String,
}

/// Per-document payloads plus any formatting that had to be skipped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppliedBatch {
    pub documents: DocumentMap<DocumentPayload>,
    pub warnings: Vec<FormattingWarning>,
}

fn styling_flag(styling: &Styling, key: &str) -> bool {
    matches!(styling.get(key), Some(Value::Bool(true)))
}

fn styling_str<'a>(styling: &'a Styling, key: &str) -> Option<&'a str> {
    styling.get(key).and_then(Value::as_str)
}

fn format_address(value: &str, styling: &Styling) -> FormattedValue {
    if !styling_flag(styling, "break_on_comma") {
        return FormattedValue::formatted(value);
    }
    let lines: Vec<&str> = value.split(',').map(str::trim).collect();
    FormattedValue::formatted(lines.join("\n"))
}

fn format_date(value: &str, styling: &Styling) -> FormattedValue {
    let Some(format) = styling_str(styling, "format") else {
        return FormattedValue::formatted(value);
    };

    // chrono skips whitespace before numeric fields; padded input is not a date here
    if value.trim() != value {
        return FormattedValue::unformatted(value, "not a YYYY-MM-DD date: surrounding whitespace");
    }
    let date = match NaiveDate::parse_from_str(value, INPUT_DATE_FORMAT) {
        Ok(date) => date,
        Err(e) => {
            return FormattedValue::unformatted(value, format!("not a YYYY-MM-DD date: {e}"));
        }
    };

    let items: Vec<Item> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return FormattedValue::unformatted(value, format!("invalid date format '{format}'"));
    }

    let mut rendered = String::new();
    if write!(rendered, "{}", date.format_with_items(items.iter())).is_err() {
        return FormattedValue::unformatted(value, format!("cannot render date with '{format}'"));
    }
    FormattedValue::formatted(rendered)
}

fn format_text(value: &str, styling: &Styling) -> FormattedValue {
    match styling_str(styling, "case") {
        Some("upper") => FormattedValue::formatted(value.to_uppercase()),
        Some("lower") => FormattedValue::formatted(value.to_lowercase()),
        Some("title") => FormattedValue::formatted(title_case(value)),
        _ => FormattedValue::formatted(value),
    }
}

/// Format an answer for one placeholder according to its declared type and styling.
///
/// - address with `break_on_comma: true`: comma-separated parts on separate lines
/// - date with a `format` string: `YYYY-MM-DD` input re-rendered with that strftime format
/// - text/generic with `case` of `upper`, `lower` or `title`: re-cased
/// - everything else: unchanged
pub fn format_value(value: &str, placeholder_type: PlaceholderType, styling: &Styling) -> FormattedValue {
    match placeholder_type {
        PlaceholderType::Address => format_address(value, styling),
        PlaceholderType::Date => format_date(value, styling),
        PlaceholderType::Text | PlaceholderType::Generic => format_text(value, styling),
        _ => FormattedValue::formatted(value),
    }
}

/// Apply consolidated answers to every document, recording skipped formatting.
///
/// Canonical keys missing from `answers` are left out of the document's payload.
pub fn apply_detailed(styling_map: &StylingMapping, answers: &UserAnswers) -> AppliedBatch {
    let mut applied = AppliedBatch::default();

    for (document_index, document) in styling_map.iter() {
        let key = document_key(document_index);
        let mut placeholder_data = PlaceholderFields::new();

        for entry in &document.placeholders {
            let Some(answer) = answers.get(&entry.canonical_key) else {
                continue;
            };

            let formatted = format_value(answer, entry.placeholder_type, &entry.styling);
            if let FormattedValue::Unformatted { value, reason } = &formatted {
                log::warn!(
                    "Placeholder '{}' in {} left unformatted: {}",
                    entry.original_placeholder_name,
                    key,
                    reason
                );
                applied.warnings.push(FormattingWarning {
                    document_key: key.clone(),
                    canonical_key: entry.canonical_key.clone(),
                    placeholder_name: entry.original_placeholder_name.clone(),
                    value: value.clone(),
                    reason: reason.clone(),
                });
            }
            placeholder_data.insert(entry.original_placeholder_name.clone(), formatted.into_value());
        }

        applied.documents.insert(
            document_index,
            DocumentPayload {
                template_id: document.template_id.clone(),
                placeholder_data,
            },
        );
    }

    log::info!(
        "Applied {} answer(s) to {} document(s), {} formatting warning(s)",
        answers.len(),
        applied.documents.len(),
        applied.warnings.len()
    );

    applied
}

/// Apply consolidated answers to every document. Formatting failures fall back
/// to the raw answer silently; use [`apply_detailed`] to see them.
pub fn apply(styling_map: &StylingMapping, answers: &UserAnswers) -> DocumentMap<DocumentPayload> {
    apply_detailed(styling_map, answers).documents
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn styling(value: Value) -> Styling {
        match value {
            Value::Object(map) => map,
            _ => Styling::new(),
        }
    }

    #[test]
    fn test_address_breaks_on_comma() {
        let formatted = format_value(
            "12 Main St, Lagos, Nigeria",
            PlaceholderType::Address,
            &styling(json!({"break_on_comma": true})),
        );
        assert_eq!(formatted.value(), "12 Main St\nLagos\nNigeria");
        assert!(formatted.is_formatted());
    }

    #[test]
    fn test_address_without_flag_is_unchanged() {
        let formatted = format_value(
            "12 Main St, Lagos",
            PlaceholderType::Address,
            &styling(json!({"break_on_comma": "yes"})),
        );
        assert_eq!(formatted.value(), "12 Main St, Lagos");
    }

    #[test]
    fn test_date_reformatted() {
        let formatted = format_value(
            "2024-03-05",
            PlaceholderType::Date,
            &styling(json!({"format": "%d %B %Y"})),
        );
        assert_eq!(formatted, FormattedValue::formatted("05 March 2024"));
    }

    #[test]
    fn test_malformed_date_passes_through_tagged() {
        let formatted = format_value(
            "March 5th",
            PlaceholderType::Date,
            &styling(json!({"format": "%d/%m/%Y"})),
        );
        assert!(!formatted.is_formatted());
        assert_eq!(formatted.value(), "March 5th");
    }

    #[test]
    fn test_padded_date_passes_through_untouched() {
        let formatted = format_value(
            " 2024-01-05 ",
            PlaceholderType::Date,
            &styling(json!({"format": "%d/%m/%Y"})),
        );
        assert!(!formatted.is_formatted());
        assert_eq!(formatted.value(), " 2024-01-05 ");

        let leading = format_value(
            " 2024-01-05",
            PlaceholderType::Date,
            &styling(json!({"format": "%d/%m/%Y"})),
        );
        assert!(!leading.is_formatted());
        assert_eq!(leading.into_value(), " 2024-01-05");
    }

    #[test]
    fn test_invalid_format_string_passes_through() {
        let formatted = format_value(
            "2024-03-05",
            PlaceholderType::Date,
            &styling(json!({"format": "%Q"})),
        );
        assert!(!formatted.is_formatted());
        assert_eq!(formatted.into_value(), "2024-03-05");
    }

    #[test]
    fn test_date_without_format_is_unchanged() {
        let formatted = format_value("tomorrow", PlaceholderType::Date, &Styling::new());
        assert_eq!(formatted, FormattedValue::formatted("tomorrow"));
    }

    #[test]
    fn test_text_casing() {
        let upper = styling(json!({"case": "upper"}));
        let title = styling(json!({"case": "title"}));
        assert_eq!(format_value("ada lovelace", PlaceholderType::Text, &upper).value(), "ADA LOVELACE");
        assert_eq!(format_value("ada LOVELACE", PlaceholderType::Generic, &title).value(), "Ada Lovelace");
        // casing is a text rule only
        assert_eq!(format_value("a@b.io", PlaceholderType::Email, &upper).value(), "a@b.io");
    }
}
