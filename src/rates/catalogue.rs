//! Referral fee catalogue - category keys mapped to validated rules

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::referral::ReferralRule;
use crate::rates::embedded::EmbeddedData;
use crate::rates::error::RateError;
use crate::yaml::parse_yaml;

/// Embedded catalogue file
const CATALOGUE_FILE: &str = "referral/categories.yaml";

/// Fallback category present in every catalogue
pub const DEFAULT_CATEGORY: &str = "everything_else";

/// A product category and its referral rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralCategory {
    /// Stable lookup key (snake_case)
    pub key: String,

    /// Display name
    pub name: String,

    pub rule: ReferralRule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogueFile {
    categories: Vec<ReferralCategory>,
}

/// Validated set of referral categories
#[derive(Debug, Clone, Default)]
pub struct ReferralCatalogue {
    categories: BTreeMap<String, ReferralCategory>,
}

impl ReferralCatalogue {
    /// Catalogue bundled with the binary
    pub fn builtin() -> Result<Self, RateError> {
        let content = EmbeddedData::read(CATALOGUE_FILE)?;
        Self::parse(&content, CATALOGUE_FILE)
    }

    /// Parse and validate catalogue YAML
    pub fn parse(content: &str, filename: &str) -> Result<Self, RateError> {
        let file: CatalogueFile = parse_yaml(content, filename)?;
        let mut catalogue = Self::default();
        for category in file.categories {
            catalogue.insert(category)?;
        }
        tracing::debug!(categories = catalogue.len(), source = filename, "loaded referral catalogue");
        Ok(catalogue)
    }

    fn insert(&mut self, category: ReferralCategory) -> Result<(), RateError> {
        category
            .rule
            .validate()
            .map_err(|source| RateError::InvalidReferralRule {
                category: category.key.clone(),
                source,
            })?;
        if self.categories.contains_key(&category.key) {
            return Err(RateError::DuplicateCategory {
                category: category.key,
            });
        }
        self.categories.insert(category.key.clone(), category);
        Ok(())
    }

    /// Look up a category by key (case-insensitive, `-` and spaces read as `_`)
    pub fn get(&self, key: &str) -> Option<&ReferralCategory> {
        let normalized = key.trim().to_lowercase().replace(['-', ' '], "_");
        self.categories.get(&normalized)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferralCategory> {
        self.categories.values()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::referral::resolve_referral;

    #[test]
    fn test_builtin_catalogue_loads() {
        let catalogue = ReferralCatalogue::builtin().unwrap();
        assert!(catalogue.get(DEFAULT_CATEGORY).is_some());
        assert!(catalogue.len() > 20);
    }

    #[test]
    fn test_builtin_covers_every_rule_shape() {
        let catalogue = ReferralCatalogue::builtin().unwrap();
        let kinds: std::collections::BTreeSet<_> = catalogue.iter().map(|c| c.rule.kind()).collect();
        assert_eq!(
            kinds.into_iter().collect::<Vec<_>>(),
            vec!["flat", "threshold", "threshold_multi", "tiered", "tiered_multi"]
        );
    }

    #[test]
    fn test_lookup_normalizes_key() {
        let catalogue = ReferralCatalogue::builtin().unwrap();
        let jewelry = catalogue.get("Jewelry").unwrap();
        assert!((resolve_referral(500.0, &jewelry.rule) - 62.5).abs() < 1e-9);
        assert!(catalogue.get("home-kitchen").is_some());
        assert!(catalogue.get("no such thing").is_none());
    }

    #[test]
    fn test_unsorted_ranges_fail_at_load() {
        let yaml = r#"
categories:
  - key: broken
    name: Broken
    rule:
      type: tiered_multi
      ranges:
        - { limit: 500.0, rate: 0.1 }
        - { limit: 100.0, rate: 0.2 }
        - { limit: null, rate: 0.05 }
"#;
        assert!(matches!(
            ReferralCatalogue::parse(yaml, "broken.yaml"),
            Err(RateError::InvalidReferralRule { .. })
        ));
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let yaml = r#"
categories:
  - { key: toys, name: Toys, rule: { type: flat, rate: 0.15 } }
  - { key: toys, name: Toys Again, rule: { type: flat, rate: 0.10 } }
"#;
        assert!(matches!(
            ReferralCatalogue::parse(yaml, "dup.yaml"),
            Err(RateError::DuplicateCategory { .. })
        ));
    }
}
