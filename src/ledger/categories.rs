//! Bucketing of free-text tax ledger descriptions
//!
//! Descriptions are matched against an ordered keyword list after folding
//! (upper case, no accents). The first rule whose keyword is a substring of
//! the description wins, so a line mentioning both "FGTS" and "DAS" lands in
//! whichever bucket is declared first.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::records::TaxCategory;
use crate::error::ReportError;
use crate::utils::fold_text;

/// One entry of the keyword priority list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub category: TaxCategory,
}

impl KeywordRule {
    pub fn new(keyword: impl Into<String>, category: TaxCategory) -> Self {
        Self {
            keyword: keyword.into(),
            category,
        }
    }
}

/// Default priority list. More specific labels come before "DAS", which is
/// short enough to appear inside other descriptions.
pub fn default_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new("DCTFWEB", TaxCategory::DctfWeb),
        KeywordRule::new("FGTS", TaxCategory::Fgts),
        KeywordRule::new("ISSQN", TaxCategory::Issqn),
        KeywordRule::new("ISS RETIDO", TaxCategory::Issqn),
        KeywordRule::new("SINDICAL", TaxCategory::UnionContribution),
        KeywordRule::new("DAS", TaxCategory::Das),
        KeywordRule::new("SIMPLES NACIONAL", TaxCategory::Das),
    ]
}

#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    rules: Vec<KeywordRule>,
    folded: Vec<String>,
    strict: bool,
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl CategoryClassifier {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        let folded = rules.iter().map(|r| fold_text(&r.keyword)).collect();
        Self {
            rules,
            folded,
            strict: false,
        }
    }

    /// In strict mode unmatched descriptions are an error instead of `Other`
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Rule that matches a description, if any
    pub fn matching_rule(&self, description: &str) -> Option<&KeywordRule> {
        let text = fold_text(description);
        self.folded
            .iter()
            .position(|keyword| !keyword.is_empty() && text.contains(keyword.as_str()))
            .map(|idx| &self.rules[idx])
    }

    pub fn classify(&self, description: &str) -> Result<TaxCategory, ReportError> {
        match self.matching_rule(description) {
            Some(rule) => {
                debug!(
                    "Classified '{}' as {} (keyword '{}')",
                    description, rule.category, rule.keyword
                );
                Ok(rule.category)
            }
            None if self.strict => Err(ReportError::UnclassifiedTaxCategory {
                description: description.trim().to_string(),
            }),
            None => {
                debug!("No keyword matched '{}', using OUTROS", description);
                Ok(TaxCategory::Other)
            }
        }
    }
}
