use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::categories::CategoryClassifier;
use crate::error::ReportError;
use crate::period::PeriodKey;

/// Tax buckets. Declaration order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxCategory {
    /// Simples Nacional monthly payment (DAS)
    Das,
    /// Employee severance fund (FGTS)
    Fgts,
    /// Municipal service tax withheld at source
    Issqn,
    /// Federal declaration settlement (DCTFWeb)
    #[serde(alias = "dctfweb")]
    DctfWeb,
    #[serde(alias = "sindical")]
    UnionContribution,
    Other,
}

impl TaxCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxCategory::Das => "DAS",
            TaxCategory::Fgts => "FGTS",
            TaxCategory::Issqn => "ISSQN",
            TaxCategory::DctfWeb => "DCTFWEB",
            TaxCategory::UnionContribution => "SINDICAL",
            TaxCategory::Other => "OUTROS",
        }
    }

    /// Column title used in reports
    pub fn display_name(&self) -> &'static str {
        match self {
            TaxCategory::Das => "DAS Simples",
            TaxCategory::Fgts => "FGTS",
            TaxCategory::Issqn => "ISSQN Retido",
            TaxCategory::DctfWeb => "DCTFWeb",
            TaxCategory::UnionContribution => "Contribuição Sindical",
            TaxCategory::Other => "Outros Impostos",
        }
    }
}

impl fmt::Display for TaxCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaxCategory {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = crate::utils::fold_text(s).replace(' ', "_");
        match folded.as_str() {
            "DAS" | "DAS_SIMPLES" => Ok(TaxCategory::Das),
            "FGTS" => Ok(TaxCategory::Fgts),
            "ISSQN" | "ISS" => Ok(TaxCategory::Issqn),
            "DCTFWEB" | "DCTF_WEB" => Ok(TaxCategory::DctfWeb),
            "SINDICAL" | "UNION_CONTRIBUTION" | "CONTRIBUICAO_SINDICAL" => {
                Ok(TaxCategory::UnionContribution)
            }
            "OUTROS" | "OTHER" | "OUTROS_IMPOSTOS" => Ok(TaxCategory::Other),
            _ => Err(ReportError::UnclassifiedTaxCategory {
                description: s.to_string(),
            }),
        }
    }
}

/// Monthly revenue and operating expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRecord {
    pub period: PeriodKey,
    pub sales: Decimal,
    pub purchases: Decimal,
    pub net_payroll: Decimal,
}

/// One tax amount for one period, already bucketed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRecord {
    pub period: PeriodKey,
    pub category: TaxCategory,
    pub amount: Decimal,
    /// Free-text description the category was derived from (ledger sources)
    pub description: Option<String>,
    /// Revenue code as printed on the payment slip
    pub code: Option<String>,
}

impl TaxRecord {
    pub fn new(period: PeriodKey, category: TaxCategory, amount: Decimal) -> Self {
        Self {
            period,
            category,
            amount,
            description: None,
            code: None,
        }
    }

    /// Build a record from a ledger line, bucketing its description
    pub fn from_ledger_line(
        period: PeriodKey,
        code: Option<String>,
        description: &str,
        amount: Decimal,
        classifier: &CategoryClassifier,
    ) -> Result<Self, ReportError> {
        let category = classifier.classify(description)?;
        Ok(Self {
            period,
            category,
            amount,
            description: Some(description.trim().to_string()),
            code,
        })
    }
}

/// Period-total expenses that are not broken down by month
/// (asset purchases and "uso e consumo" supplies).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplementaryExpenses {
    pub asset_purchases: Decimal,
    pub supplies: Decimal,
}

impl SupplementaryExpenses {
    pub fn total(&self) -> Decimal {
        self.asset_purchases + self.supplies
    }

    pub fn is_empty(&self) -> bool {
        self.total().is_zero()
    }
}

/// Everything the aggregator consumes, whatever the source format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceTables {
    pub revenue: Vec<RevenueRecord>,
    pub taxes: Vec<TaxRecord>,
    pub supplementary: SupplementaryExpenses,
}

impl SourceTables {
    /// Append tax records from another source (e.g. a separate ledger file)
    pub fn extend_taxes(&mut self, taxes: impl IntoIterator<Item = TaxRecord>) {
        self.taxes.extend(taxes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_category_from_str_accepts_labels_and_names() {
        assert_eq!("DAS".parse::<TaxCategory>().unwrap(), TaxCategory::Das);
        assert_eq!("dctf_web".parse::<TaxCategory>().unwrap(), TaxCategory::DctfWeb);
        assert_eq!(
            "Contribuição Sindical".parse::<TaxCategory>().unwrap(),
            TaxCategory::UnionContribution
        );
        assert_eq!("other".parse::<TaxCategory>().unwrap(), TaxCategory::Other);
        assert!("IPTU".parse::<TaxCategory>().is_err());
    }

    #[test]
    fn test_category_order_is_declaration_order() {
        let mut shuffled = vec![TaxCategory::Other, TaxCategory::Fgts, TaxCategory::Das];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![TaxCategory::Das, TaxCategory::Fgts, TaxCategory::Other]
        );
    }

    #[test]
    fn test_ledger_line_is_bucketed() {
        let classifier = CategoryClassifier::default();
        let period = PeriodKey::parse("2024-02").unwrap();
        let record = TaxRecord::from_ledger_line(
            period,
            Some("0561".to_string()),
            "  FGTS mensal ",
            dec!(1224.44),
            &classifier,
        )
        .unwrap();
        assert_eq!(record.category, TaxCategory::Fgts);
        assert_eq!(record.description.as_deref(), Some("FGTS mensal"));
        assert_eq!(record.code.as_deref(), Some("0561"));
    }

    #[test]
    fn test_supplementary_total() {
        let extra = SupplementaryExpenses {
            asset_purchases: dec!(25000),
            supplies: dec!(15000),
        };
        assert_eq!(extra.total(), dec!(40000));
        assert!(!extra.is_empty());
        assert!(SupplementaryExpenses::default().is_empty());
    }
}
