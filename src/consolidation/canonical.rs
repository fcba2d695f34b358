//! Canonicalization of raw placeholder names.
//!
//! A raw name is lower-cased and tested against an ordered table of synonym
//! categories. The first category with a pattern contained in the name wins;
//! a name matching nothing is its own canonical key. Containment is
//! deliberately loose, so "addressee" lands in `address`.

use lazy_static::lazy_static;
use serde::{Deserialize, Deserializer, Serialize};

use super::common::normalize_name;
use super::metadata::PlaceholderMetadata;

/// Built-in categories in priority order.
const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "name",
        &["name", "client_name", "customer_name", "user_name", "full_name"],
    ),
    ("address", &["address", "location", "street", "addr"]),
    ("date", &["date", "time", "created", "issued"]),
    ("signature", &["signature", "sign", "signed_by"]),
    ("email", &["email", "mail", "e_mail"]),
    ("phone", &["phone", "mobile", "cell", "tel", "telephone"]),
];

lazy_static! {
    static ref DEFAULT_TABLE: SynonymTable = SynonymTable::builtin();
}

/// One canonical key and the substrings that map onto it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymCategory {
    pub key: String,
    pub patterns: Vec<String>,
}

impl SynonymCategory {
    pub fn new<I, S>(key: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    fn matches(&self, normalized_name: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| normalized_name.contains(pattern.as_str()))
    }
}

/// Ordered synonym table. Category order is the tie-break when a name
/// contains patterns from several categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SynonymTable {
    categories: Vec<SynonymCategory>,
}

impl SynonymTable {
    /// Build a table; patterns are lower-cased and empty patterns dropped.
    pub fn new(categories: Vec<SynonymCategory>) -> Self {
        let categories = categories
            .into_iter()
            .map(|category| SynonymCategory {
                key: category.key,
                patterns: category
                    .patterns
                    .iter()
                    .map(|pattern| normalize_name(pattern))
                    .filter(|pattern| !pattern.is_empty())
                    .collect(),
            })
            .collect();
        Self { categories }
    }

    fn builtin() -> Self {
        Self::new(
            DEFAULT_CATEGORIES
                .iter()
                .map(|(key, patterns)| SynonymCategory::new(*key, patterns.iter().copied()))
                .collect(),
        )
    }

    /// Parse a table from a JSON array of `{"key", "patterns"}` objects.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn categories(&self) -> &[SynonymCategory] {
        &self.categories
    }

    /// Map a raw name to its canonical key.
    pub fn canonical_key(&self, raw_name: &str) -> String {
        let normalized = normalize_name(raw_name);
        self.categories
            .iter()
            .find(|category| category.matches(&normalized))
            .map(|category| category.key.clone())
            .unwrap_or(normalized)
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}

impl<'de> Deserialize<'de> for SynonymTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let categories = Vec::<SynonymCategory>::deserialize(deserializer)?;
        Ok(SynonymTable::new(categories))
    }
}

/// Maps raw placeholder names to canonical keys.
pub trait Canonicalizer {
    fn canonicalize(&self, raw_name: &str, metadata: &PlaceholderMetadata) -> String;
}

/// Synonym tables classify on the name alone; declared metadata does not
/// influence the key.
impl Canonicalizer for SynonymTable {
    fn canonicalize(&self, raw_name: &str, _metadata: &PlaceholderMetadata) -> String {
        self.canonical_key(raw_name)
    }
}

/// Canonicalize with the built-in synonym table.
pub fn canonicalize(raw_name: &str, metadata: &PlaceholderMetadata) -> String {
    DEFAULT_TABLE.canonicalize(raw_name, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> String {
        canonicalize(raw, &PlaceholderMetadata::default())
    }

    #[test]
    fn test_name_synonyms_ignore_case() {
        assert_eq!(key("Client_Name"), "name");
        assert_eq!(key("customer_name"), "name");
        assert_eq!(key("NAME"), "name");
        assert_eq!(key("full_name"), "name");
    }

    #[test]
    fn test_each_builtin_category() {
        assert_eq!(key("street_line"), "address");
        assert_eq!(key("issued_on"), "date");
        assert_eq!(key("signed_by"), "signature");
        assert_eq!(key("E_Mail"), "email");
        assert_eq!(key("mobile"), "phone");
    }

    #[test]
    fn test_priority_order_breaks_ties() {
        // contains both "name" and "address"; name is tested first
        assert_eq!(key("address_name"), "name");
        // contains both "date" and "sign"; date is tested first
        assert_eq!(key("sign_date"), "date");
    }

    #[test]
    fn test_substring_matching_is_permissive() {
        assert_eq!(key("addressee"), "address");
        assert_eq!(key("timestamp"), "date");
    }

    #[test]
    fn test_unmatched_name_is_lowercased_passthrough() {
        assert_eq!(key("Contract_Number"), "contract_number");
        assert_eq!(key("company"), "company");
    }

    #[test]
    fn test_custom_table_from_json() {
        let table = SynonymTable::from_json(
            r#"[{"key": "company", "patterns": ["Company", "employer", "firm"]}]"#,
        )
        .unwrap();

        assert_eq!(table.canonical_key("employer_name"), "company");
        assert_eq!(table.canonical_key("LAW_FIRM"), "company");
        // the built-in categories are replaced, not extended
        assert_eq!(table.canonical_key("client_name"), "client_name");
    }
}
