//! Offense classification against the legal reference table.
//!
//! Each detected label is first resolved through an alias map (lowercased
//! label → canonical offense code), then looked up by exact, case-insensitive
//! equality. Classification accuracy is bounded by alias completeness; there
//! is no fuzzy or partial matching.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{ClassificationResult, LegalTable};

/// Built-in aliases from detector vocabulary to legal offense codes
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("robo", "Hurto"),
    ("atraco", "Hurto"),
    ("golpes", "Lesiones personales"),
    ("agresión", "Lesiones personales"),
];

/// Lowercased detected label → canonical offense code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasMap {
    aliases: HashMap<String, String>,
}

impl Default for AliasMap {
    fn default() -> Self {
        Self::new(DEFAULT_ALIASES.iter().copied())
    }
}

impl AliasMap {
    /// Build from (label, canonical) pairs; labels are lowercased
    pub fn new<L, C>(pairs: impl IntoIterator<Item = (L, C)>) -> Self
    where
        L: AsRef<str>,
        C: Into<String>,
    {
        Self {
            aliases: pairs
                .into_iter()
                .map(|(label, canonical)| (label.as_ref().to_lowercase(), canonical.into()))
                .collect(),
        }
    }

    /// Alias map with no entries (labels are looked up as-is)
    pub fn empty() -> Self {
        Self {
            aliases: HashMap::new(),
        }
    }

    /// Canonical code for `label`, or `label` itself when unaliased
    pub fn resolve<'a>(&'a self, label: &'a str) -> &'a str {
        self.aliases
            .get(&label.to_lowercase())
            .map(String::as_str)
            .unwrap_or(label)
    }
}

/// Classify `labels` against `table` using the built-in aliases
pub fn classify(labels: &[String], table: &LegalTable) -> Vec<ClassificationResult> {
    classify_with(labels, table, &AliasMap::default())
}

/// Classify `labels` with an explicit alias map
///
/// One result per label, in input order; duplicates are kept.
pub fn classify_with(
    labels: &[String],
    table: &LegalTable,
    aliases: &AliasMap,
) -> Vec<ClassificationResult> {
    labels
        .iter()
        .map(|label| {
            let canonical = aliases.resolve(label);
            match table.lookup(canonical) {
                Some(entry) => ClassificationResult::matched(label.as_str(), entry),
                None => {
                    tracing::warn!(label = %label, canonical, "No legal entry for offense label");
                    ClassificationResult::not_found(label.as_str())
                }
            }
        })
        .collect()
}

/// Classifier holding a shared read-only legal table
#[derive(Debug, Clone)]
pub struct Classifier {
    table: Arc<LegalTable>,
    aliases: AliasMap,
}

impl Classifier {
    pub fn new(table: Arc<LegalTable>) -> Self {
        Self::with_aliases(table, AliasMap::default())
    }

    pub fn with_aliases(table: Arc<LegalTable>, aliases: AliasMap) -> Self {
        Self { table, aliases }
    }

    pub fn classify(&self, labels: &[String]) -> Vec<ClassificationResult> {
        classify_with(labels, &self.table, &self.aliases)
    }

    pub fn table(&self) -> &LegalTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LegalEntry, NOT_FOUND};

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn table() -> LegalTable {
        LegalTable::new(vec![
            LegalEntry::new("Hurto", "1-3 años", "10 SMLV"),
            LegalEntry::new("Estafa", "2-8 años", "50 SMLV"),
        ])
    }

    #[test]
    fn test_alias_resolution_is_case_insensitive() {
        let aliases = AliasMap::default();
        assert_eq!(aliases.resolve("Robo"), "Hurto");
        assert_eq!(aliases.resolve("ROBO"), "Hurto");
        assert_eq!(aliases.resolve("Estafa"), "Estafa");
    }

    #[test]
    fn test_alias_wins_over_direct_label() {
        let results = classify(&labels(&["Robo"]), &table());
        assert_eq!(results[0].article, "Hurto");
        assert_eq!(results[0].detected_label, "Robo");
    }

    #[test]
    fn test_direct_match_ignores_case() {
        let results = classify(&labels(&["eStAfA"]), &table());
        assert_eq!(results[0].article, "Estafa");
        assert_eq!(results[0].prison_penalty, "2-8 años");
        assert_eq!(results[0].fine, "50 SMLV");
    }

    #[test]
    fn test_unknown_label_yields_sentinel() {
        let results = classify(&labels(&["Amenazas"]), &table());
        assert_eq!(results, vec![ClassificationResult::not_found("Amenazas")]);
        assert_eq!(results[0].article, NOT_FOUND);
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let input = labels(&["Amenazas", "Robo", "Estafa", "Robo"]);
        let results = classify(&input, &table());

        assert_eq!(results.len(), input.len());
        let detected: Vec<_> = results.iter().map(|r| r.detected_label.as_str()).collect();
        assert_eq!(detected, vec!["Amenazas", "Robo", "Estafa", "Robo"]);
        assert_eq!(results[1], results[3]);
    }

    #[test]
    fn test_empty_alias_map_disables_resolution() {
        let results = classify_with(&labels(&["Robo"]), &table(), &AliasMap::empty());
        assert!(!results[0].is_found());
    }

    #[test]
    fn test_classifier_shares_table() {
        let table = Arc::new(table());
        let classifier = Classifier::new(Arc::clone(&table));
        assert_eq!(classifier.table().len(), 2);
        assert_eq!(Arc::strong_count(&table), 2);
        assert_eq!(classifier.classify(&labels(&[])).len(), 0);
    }
}
