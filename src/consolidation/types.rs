//! Core data types for batch input consolidation.
//!
//! Everything here is plain data: built once per batch, never mutated after
//! construction, and serialized as snake_case JSON for the HTTP layer.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Opaque per-placeholder styling declared by a template (font, break rules, date format, ...).
pub type Styling = Map<String, Value>;

/// Consolidated answers keyed by canonical key.
pub type UserAnswers = BTreeMap<String, String>;

/// Build the key a document is addressed by in styling maps and payloads.
pub fn document_key(document_index: usize) -> String {
    format!("document_{document_index}")
}

/// Semantic type of a placeholder, as declared by its template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaceholderType {
    #[default]
    Text,
    Date,
    Address,
    Signature,
    Email,
    Phone,
    Generic,
}

impl PlaceholderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderType::Text => "text",
            PlaceholderType::Date => "date",
            PlaceholderType::Address => "address",
            PlaceholderType::Signature => "signature",
            PlaceholderType::Email => "email",
            PlaceholderType::Phone => "phone",
            PlaceholderType::Generic => "generic",
        }
    }

    /// Parse a declared type; anything unrecognised is `Generic`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "text" => PlaceholderType::Text,
            "date" => PlaceholderType::Date,
            "address" => PlaceholderType::Address,
            "signature" => PlaceholderType::Signature,
            "email" => PlaceholderType::Email,
            "phone" => PlaceholderType::Phone,
            _ => PlaceholderType::Generic,
        }
    }
}

impl fmt::Display for PlaceholderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PlaceholderType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PlaceholderType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(PlaceholderType::parse(&raw))
    }
}

/// Placeholder name/value pairs in the order the caller supplied them.
///
/// Serializes as a JSON object. Deserialization keeps the object's key order,
/// which the analyzer relies on for first-seen tie breaks. Non-string JSON
/// values are stringified; `null` becomes an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderFields {
    entries: Vec<(String, String)>,
}

impl PlaceholderFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair. A name that is already present has its value replaced in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PlaceholderFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = PlaceholderFields::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

impl Serialize for PlaceholderFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct PlaceholderFieldsVisitor;

impl<'de> Visitor<'de> for PlaceholderFieldsVisitor {
    type Value = PlaceholderFields;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object mapping placeholder names to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut fields = PlaceholderFields::new();
        while let Some((name, value)) = access.next_entry::<String, Value>()? {
            let value = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            fields.insert(name, value);
        }
        Ok(fields)
    }
}

impl<'de> Deserialize<'de> for PlaceholderFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PlaceholderFieldsVisitor)
    }
}

/// One document of a batch request. Its index is its position in the batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchDocument {
    pub template_id: String,
    #[serde(default)]
    pub placeholder_data: PlaceholderFields,
}

impl BatchDocument {
    pub fn new(template_id: impl Into<String>, placeholder_data: PlaceholderFields) -> Self {
        Self {
            template_id: template_id.into(),
            placeholder_data,
        }
    }
}

/// One (document, placeholder) pair within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderOccurrence {
    pub document_index: usize,
    pub template_id: String,
    pub placeholder_name: String,
    pub value: String,
    pub placeholder_type: PlaceholderType,
    #[serde(default)]
    pub styling: Styling,
}

/// All occurrences in a batch that share one canonical key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalGroup {
    pub canonical_key: String,
    /// Type of the first occurrence.
    pub placeholder_type: PlaceholderType,
    /// Batch order: document index, then placeholder order within the document.
    pub occurrences: Vec<PlaceholderOccurrence>,
}

impl CanonicalGroup {
    pub fn new(first: PlaceholderOccurrence, canonical_key: impl Into<String>) -> Self {
        Self {
            canonical_key: canonical_key.into(),
            placeholder_type: first.placeholder_type,
            occurrences: vec![first],
        }
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// More than one occurrence: the group becomes a shared form field.
    pub fn is_consolidatable(&self) -> bool {
        self.occurrences.len() > 1
    }

    /// The value multiset as (value, count) pairs in first-seen order.
    pub fn distinct_values(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for occurrence in &self.occurrences {
            match counts
                .iter_mut()
                .find(|(value, _)| *value == occurrence.value)
            {
                Some(entry) => entry.1 += 1,
                None => counts.push((occurrence.value.as_str(), 1)),
            }
        }
        counts
    }

    /// Document indices in first-seen order, without duplicates.
    pub fn document_indices(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        for occurrence in &self.occurrences {
            if !indices.contains(&occurrence.document_index) {
                indices.push(occurrence.document_index);
            }
        }
        indices
    }
}

/// One entry in the form the end user fills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedField {
    pub canonical_key: String,
    pub display_name: String,
    pub placeholder_type: PlaceholderType,
    pub default_value: String,
    pub applies_to_document_count: usize,
    pub document_indices: Vec<usize>,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConsolidationSummary {
    pub original_input_count: usize,
    pub consolidated_input_count: usize,
    /// Percentage rounded to one decimal place.
    pub reduction_percentage: f64,
    pub duplicate_group_count: usize,
}

/// How one original placeholder of a document is restored from its canonical value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyledPlaceholder {
    pub canonical_key: String,
    pub original_placeholder_name: String,
    pub placeholder_type: PlaceholderType,
    #[serde(default)]
    pub styling: Styling,
    #[serde(default)]
    pub position: Option<Value>,
    #[serde(default)]
    pub formatting: Option<Value>,
}

/// Reconstruction table for a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStyling {
    pub document_index: usize,
    pub template_id: String,
    /// One entry per placeholder the document declared, in declaration order.
    pub placeholders: Vec<StyledPlaceholder>,
}

impl DocumentStyling {
    /// Entries restored from `canonical_key`. Usually one; several when a document
    /// declared more than one synonym of the same key.
    pub fn entries_for<'a>(
        &'a self,
        canonical_key: &'a str,
    ) -> impl Iterator<Item = &'a StyledPlaceholder> + 'a {
        self.placeholders
            .iter()
            .filter(move |entry| entry.canonical_key == canonical_key)
    }

    /// Canonical keys this document needs, first-seen order, no duplicates.
    pub fn canonical_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for entry in &self.placeholders {
            if !keys.contains(&entry.canonical_key.as_str()) {
                keys.push(entry.canonical_key.as_str());
            }
        }
        keys
    }
}

/// Per-document values held in batch order.
///
/// Serializes as a JSON object keyed by [`document_key`]; entries come out by
/// document index, so `document_2` precedes `document_10`. Indexing accepts
/// either form of key.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMap<T> {
    entries: BTreeMap<usize, T>,
}

/// Parse a `document_N` key back into its batch index.
pub fn parse_document_key(key: &str) -> Option<usize> {
    key.strip_prefix("document_")?.parse().ok()
}

impl<T> DocumentMap<T> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, document_index: usize, value: T) -> Option<T> {
        self.entries.insert(document_index, value)
    }

    pub fn get(&self, document_index: usize) -> Option<&T> {
        self.entries.get(&document_index)
    }

    pub fn get_by_key(&self, key: &str) -> Option<&T> {
        parse_document_key(key).and_then(|index| self.entries.get(&index))
    }

    /// Entries as (document index, value), in batch order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.entries.iter().map(|(index, value)| (*index, value))
    }

    /// Document keys in batch order.
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.keys().map(|index| document_key(*index))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for DocumentMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::ops::Index<usize> for DocumentMap<T> {
    type Output = T;

    fn index(&self, document_index: usize) -> &T {
        self.get(document_index)
            .unwrap_or_else(|| panic!("no entry for document {document_index}"))
    }
}

impl<T> std::ops::Index<&str> for DocumentMap<T> {
    type Output = T;

    fn index(&self, key: &str) -> &T {
        self.get_by_key(key)
            .unwrap_or_else(|| panic!("no entry for '{key}'"))
    }
}

impl<T> std::ops::Index<&String> for DocumentMap<T> {
    type Output = T;

    fn index(&self, key: &String) -> &T {
        &self[key.as_str()]
    }
}

impl<T: Serialize> Serialize for DocumentMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (index, value) in &self.entries {
            map.serialize_entry(&document_key(*index), value)?;
        }
        map.end()
    }
}

struct DocumentMapVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for DocumentMapVisitor<T> {
    type Value = DocumentMap<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object keyed by document_N")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut documents = DocumentMap::new();
        while let Some((key, value)) = access.next_entry::<String, T>()? {
            let index = parse_document_key(&key).ok_or_else(|| {
                de::Error::custom(format!("invalid document key '{key}', expected document_N"))
            })?;
            documents.insert(index, value);
        }
        Ok(documents)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for DocumentMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DocumentMapVisitor(PhantomData))
    }
}

/// Per-document reconstruction tables.
pub type StylingMapping = DocumentMap<DocumentStyling>;

/// What the caller gets back from the consolidation phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationResult {
    pub consolidated_placeholders: Vec<ConsolidatedField>,
    pub styling_mappings: StylingMapping,
    pub summary: ConsolidationSummary,
}

/// Concrete placeholder values for one document, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub template_id: String,
    pub placeholder_data: PlaceholderFields,
}
