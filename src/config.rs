//! Optional TOML configuration
//!
//! Looked up at `<config_home>/faturamento/config.toml` unless a path is
//! given. Every key is optional; command-line flags override file values.
//!
//! ```toml
//! negative_style = "parens"
//! supplementary_policy = "prorate"
//! strict_categories = false
//! asset_purchases = "25000.00"
//! supplies = "15000.00"
//!
//! [[keywords]]
//! keyword = "FGTS"
//! category = "fgts"
//! ```

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ReportError;
use crate::ledger::{CategoryClassifier, KeywordRule, SupplementaryExpenses};
use crate::reports::SupplementaryPolicy;
use crate::utils::NegativeStyle;

const CONFIG_DIR: &str = "faturamento";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub negative_style: NegativeStyle,
    pub supplementary_policy: SupplementaryPolicy,
    pub strict_categories: bool,
    pub asset_purchases: Option<Decimal>,
    pub supplies: Option<Decimal>,
    /// Replaces the default keyword list when non-empty. Order is priority.
    pub keywords: Vec<KeywordRule>,
}

impl ReportConfig {
    pub fn default_path() -> Option<PathBuf> {
        dir_spec::config_home().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILENAME))
    }

    /// Load from an explicit path (must exist) or the default location (may not)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => {
                    debug!("No config directory available, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            if required {
                return Err(ReportError::Config(format!("config file not found: {}", path.display())).into());
            }
            debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        info!("Loading config from {:?}", path);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ReportError> {
        toml::from_str(content).map_err(|e| ReportError::Config(e.message().to_string()))
    }

    pub fn classifier(&self) -> CategoryClassifier {
        let classifier = if self.keywords.is_empty() {
            CategoryClassifier::default()
        } else {
            CategoryClassifier::new(self.keywords.clone())
        };
        classifier.strict(self.strict_categories)
    }

    /// Supplementary totals from config, if any were set
    pub fn supplementary(&self) -> Option<SupplementaryExpenses> {
        if self.asset_purchases.is_none() && self.supplies.is_none() {
            return None;
        }
        Some(SupplementaryExpenses {
            asset_purchases: self.asset_purchases.unwrap_or_default(),
            supplies: self.supplies.unwrap_or_default(),
        })
    }
}
