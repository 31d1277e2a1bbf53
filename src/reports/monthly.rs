//! Monthly summary report
//!
//! Derives expense totals, profit/loss and tax ratios for every joined
//! month, then a "Totais" row and the headline card figures.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::ledger::{
    join_revenue_and_taxes, JoinedPeriod, SourceTables, SupplementaryExpenses, TaxCategory,
};
use crate::period::PeriodKey;

/// Label of the synthetic grand-total row, in pt-BR like the other report labels
pub const TOTALS_LABEL: &str = "Totais";

const RATIO_SCALE: u32 = 4;

/// What to do with period-total asset purchases and supplies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplementaryPolicy {
    /// Report as a one-time footer figure; monthly expenses are untouched
    #[default]
    #[serde(alias = "footer")]
    FooterOnly,
    /// Spread evenly across the months and add to monthly expenses
    Prorate,
}

impl FromStr for SupplementaryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "footer" | "footer_only" | "footer-only" => Ok(SupplementaryPolicy::FooterOnly),
            "prorate" | "prorated" => Ok(SupplementaryPolicy::Prorate),
            other => Err(format!(
                "unknown supplementary policy '{}'. Use 'footer' or 'prorate'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfitStatus {
    Positive,
    Negative,
}

impl ProfitStatus {
    /// Zero counts as positive
    pub fn from_amount(profit_loss: Decimal) -> Self {
        if profit_loss >= Decimal::ZERO {
            ProfitStatus::Positive
        } else {
            ProfitStatus::Negative
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProfitStatus::Positive => "Positivo",
            ProfitStatus::Negative => "Negativo",
        }
    }
}

impl fmt::Display for ProfitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub period: PeriodKey,
    pub sales: Decimal,
    pub purchases: Decimal,
    pub net_payroll: Decimal,
    pub tax_by_category: BTreeMap<TaxCategory, Decimal>,
    pub tax_total: Decimal,
    /// Prorated share of supplementary expenses (zero under `FooterOnly`)
    pub supplementary_share: Decimal,
    pub expense_total: Decimal,
    pub profit_loss: Decimal,
    pub status: ProfitStatus,
    /// DAS as a percentage of sales; `None` when sales is zero
    pub das_to_sales_pct: Option<Decimal>,
    pub tax_to_sales_pct: Option<Decimal>,
}

impl MonthlySummary {
    pub fn tax_for(&self, category: TaxCategory) -> Decimal {
        self.tax_by_category
            .get(&category)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Column-wise sums of the monthly table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrandTotal {
    pub label: String,
    pub sales: Decimal,
    pub purchases: Decimal,
    pub net_payroll: Decimal,
    pub tax_by_category: BTreeMap<TaxCategory, Decimal>,
    pub tax_total: Decimal,
    pub supplementary_share: Decimal,
    pub expense_total: Decimal,
    pub profit_loss: Decimal,
    pub status: ProfitStatus,
    pub das_to_sales_pct: Option<Decimal>,
    pub tax_to_sales_pct: Option<Decimal>,
}

impl GrandTotal {
    pub fn tax_for(&self, category: TaxCategory) -> Decimal {
        self.tax_by_category
            .get(&category)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Scalar figures shown as dashboard cards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineFigures {
    pub total_sales: Decimal,
    pub total_purchases: Decimal,
    pub total_payroll: Decimal,
    pub total_tax: Decimal,
    pub total_das: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialReport {
    pub months: Vec<MonthlySummary>,
    pub totals: GrandTotal,
    pub headline: HeadlineFigures,
    pub supplementary: SupplementaryExpenses,
    pub supplementary_policy: SupplementaryPolicy,
    pub orphan_tax_periods: Vec<PeriodKey>,
}

impl FinancialReport {
    pub fn first_period(&self) -> Option<PeriodKey> {
        self.months.first().map(|m| m.period)
    }

    pub fn last_period(&self) -> Option<PeriodKey> {
        self.months.last().map(|m| m.period)
    }

    /// Tax categories with at least one amount, in display order
    pub fn tax_categories(&self) -> Vec<TaxCategory> {
        self.totals.tax_by_category.keys().copied().collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationOptions {
    pub supplementary_policy: SupplementaryPolicy,
}

/// `part / whole * 100`, or `None` when the whole is zero
pub fn percentage(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return None;
    }
    part.checked_div(whole)
        .map(|ratio| (ratio * Decimal::ONE_HUNDRED).round_dp(RATIO_SCALE))
}

/// Split a total into `count` cent-rounded shares that add back to the total
/// exactly. The rounding remainder goes to the last share.
pub fn prorate(total: Decimal, count: usize) -> Vec<Decimal> {
    if count == 0 {
        return Vec::new();
    }
    let divisor = Decimal::from(count as u64);
    let share = (total / divisor).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let mut shares = vec![share; count];
    let allocated = share * Decimal::from((count - 1) as u64);
    shares[count - 1] = total - allocated;
    shares
}

/// Compute derived columns for each joined month
pub fn derive(
    joined: &[JoinedPeriod],
    supplementary: &SupplementaryExpenses,
    policy: SupplementaryPolicy,
) -> Vec<MonthlySummary> {
    let shares = match policy {
        SupplementaryPolicy::FooterOnly => vec![Decimal::ZERO; joined.len()],
        SupplementaryPolicy::Prorate => prorate(supplementary.total(), joined.len()),
    };

    joined
        .iter()
        .zip(shares)
        .map(|(row, supplementary_share)| {
            let tax_total = row.tax_total();
            let expense_total = row.purchases + row.net_payroll + tax_total + supplementary_share;
            let profit_loss = row.sales - expense_total;
            MonthlySummary {
                period: row.period,
                sales: row.sales,
                purchases: row.purchases,
                net_payroll: row.net_payroll,
                tax_by_category: row.tax_by_category.clone(),
                tax_total,
                supplementary_share,
                expense_total,
                profit_loss,
                status: ProfitStatus::from_amount(profit_loss),
                das_to_sales_pct: percentage(row.tax_for(TaxCategory::Das), row.sales),
                tax_to_sales_pct: percentage(tax_total, row.sales),
            }
        })
        .collect()
}

/// Sum every column of the monthly table into the "Totais" row.
/// Ratios are recomputed from the sums.
pub fn grand_total(months: &[MonthlySummary]) -> GrandTotal {
    let mut tax_by_category: BTreeMap<TaxCategory, Decimal> = BTreeMap::new();
    for month in months {
        for (category, amount) in &month.tax_by_category {
            *tax_by_category.entry(*category).or_insert(Decimal::ZERO) += *amount;
        }
    }

    let sum = |f: fn(&MonthlySummary) -> Decimal| months.iter().map(f).sum::<Decimal>();
    let sales = sum(|m| m.sales);
    let tax_total = sum(|m| m.tax_total);
    let profit_loss = sum(|m| m.profit_loss);
    let das = tax_by_category
        .get(&TaxCategory::Das)
        .copied()
        .unwrap_or(Decimal::ZERO);

    GrandTotal {
        label: TOTALS_LABEL.to_string(),
        sales,
        purchases: sum(|m| m.purchases),
        net_payroll: sum(|m| m.net_payroll),
        tax_by_category,
        tax_total,
        supplementary_share: sum(|m| m.supplementary_share),
        expense_total: sum(|m| m.expense_total),
        profit_loss,
        status: ProfitStatus::from_amount(profit_loss),
        das_to_sales_pct: percentage(das, sales),
        tax_to_sales_pct: percentage(tax_total, sales),
    }
}

/// Join, derive and total: the whole aggregation for one run
pub fn aggregate(tables: &SourceTables, options: &AggregationOptions) -> FinancialReport {
    let joined = join_revenue_and_taxes(&tables.revenue, &tables.taxes);
    let months = derive(
        &joined.periods,
        &tables.supplementary,
        options.supplementary_policy,
    );
    let totals = grand_total(&months);

    info!(
        "Aggregated {} month(s), {} tax row(s), result {}",
        months.len(),
        tables.taxes.len(),
        totals.profit_loss
    );

    let headline = HeadlineFigures {
        total_sales: totals.sales,
        total_purchases: totals.purchases,
        total_payroll: totals.net_payroll,
        total_tax: totals.tax_total,
        total_das: totals.tax_for(TaxCategory::Das),
    };

    FinancialReport {
        months,
        totals,
        headline,
        supplementary: tables.supplementary,
        supplementary_policy: options.supplementary_policy,
        orphan_tax_periods: joined.orphan_tax_periods,
    }
}
