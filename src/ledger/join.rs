use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use super::records::{RevenueRecord, TaxCategory, TaxRecord};
use crate::period::PeriodKey;

/// Revenue figures for one month with that month's taxes attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedPeriod {
    pub period: PeriodKey,
    pub sales: Decimal,
    pub purchases: Decimal,
    pub net_payroll: Decimal,
    pub tax_by_category: BTreeMap<TaxCategory, Decimal>,
}

impl JoinedPeriod {
    fn empty(period: PeriodKey) -> Self {
        Self {
            period,
            sales: Decimal::ZERO,
            purchases: Decimal::ZERO,
            net_payroll: Decimal::ZERO,
            tax_by_category: BTreeMap::new(),
        }
    }

    pub fn tax_total(&self) -> Decimal {
        self.tax_by_category.values().copied().sum()
    }

    pub fn tax_for(&self, category: TaxCategory) -> Decimal {
        self.tax_by_category
            .get(&category)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JoinResult {
    /// One row per revenue period, chronological
    pub periods: Vec<JoinedPeriod>,
    /// Tax periods that had no revenue row and were left out
    pub orphan_tax_periods: Vec<PeriodKey>,
}

/// Left-join revenue to taxes on the month key.
///
/// Every revenue period is kept; months without tax rows get an empty tax
/// map (tax total zero). Repeated periods are summed on both sides.
pub fn join_revenue_and_taxes(revenue: &[RevenueRecord], taxes: &[TaxRecord]) -> JoinResult {
    let mut joined: BTreeMap<PeriodKey, JoinedPeriod> = BTreeMap::new();

    for record in revenue {
        let row = joined
            .entry(record.period)
            .or_insert_with(|| JoinedPeriod::empty(record.period));
        if row.sales != Decimal::ZERO
            || row.purchases != Decimal::ZERO
            || row.net_payroll != Decimal::ZERO
        {
            debug!("Duplicate revenue row for {}, summing", record.period);
        }
        row.sales += record.sales;
        row.purchases += record.purchases;
        row.net_payroll += record.net_payroll;
    }

    let mut orphans: BTreeSet<PeriodKey> = BTreeSet::new();
    for tax in taxes {
        match joined.get_mut(&tax.period) {
            Some(row) => {
                *row.tax_by_category
                    .entry(tax.category)
                    .or_insert(Decimal::ZERO) += tax.amount;
            }
            None => {
                orphans.insert(tax.period);
            }
        }
    }

    if !orphans.is_empty() {
        warn!(
            "Tax rows for {} period(s) have no revenue row and were not joined: {}",
            orphans.len(),
            orphans
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    JoinResult {
        periods: joined.into_values().collect(),
        orphan_tax_periods: orphans.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn period(s: &str) -> PeriodKey {
        PeriodKey::parse(s).unwrap()
    }

    fn revenue(p: &str, sales: Decimal, purchases: Decimal, payroll: Decimal) -> RevenueRecord {
        RevenueRecord {
            period: period(p),
            sales,
            purchases,
            net_payroll: payroll,
        }
    }

    #[test]
    fn test_join_across_period_formats() {
        let rev = vec![revenue("2024-01", dec!(100), dec!(10), dec!(5))];
        let taxes = vec![TaxRecord::new(period("01/2024"), TaxCategory::Das, dec!(7))];

        let result = join_revenue_and_taxes(&rev, &taxes);
        assert_eq!(result.periods.len(), 1);
        assert_eq!(result.periods[0].tax_total(), dec!(7));
        assert!(result.orphan_tax_periods.is_empty());
    }

    #[test]
    fn test_missing_taxes_default_to_zero() {
        let rev = vec![
            revenue("2024-01", dec!(100), dec!(10), dec!(5)),
            revenue("2024-02", dec!(200), dec!(20), dec!(5)),
        ];
        let taxes = vec![TaxRecord::new(period("2024-01"), TaxCategory::Fgts, dec!(3))];

        let result = join_revenue_and_taxes(&rev, &taxes);
        assert_eq!(result.periods.len(), 2);
        assert_eq!(result.periods[1].period, period("2024-02"));
        assert_eq!(result.periods[1].tax_total(), Decimal::ZERO);
        assert_eq!(result.periods[1].tax_for(TaxCategory::Das), Decimal::ZERO);
    }

    #[test]
    fn test_duplicates_are_summed_not_overwritten() {
        let rev = vec![
            revenue("2024-03", dec!(100), dec!(10), dec!(5)),
            revenue("03/2024", dec!(50), dec!(1), dec!(2)),
        ];
        let taxes = vec![
            TaxRecord::new(period("2024-03"), TaxCategory::Das, dec!(7)),
            TaxRecord::new(period("2024-03-15"), TaxCategory::Das, dec!(3)),
            TaxRecord::new(period("2024-03"), TaxCategory::Other, dec!(1.50)),
        ];

        let result = join_revenue_and_taxes(&rev, &taxes);
        assert_eq!(result.periods.len(), 1);
        let row = &result.periods[0];
        assert_eq!(row.sales, dec!(150));
        assert_eq!(row.purchases, dec!(11));
        assert_eq!(row.net_payroll, dec!(7));
        assert_eq!(row.tax_for(TaxCategory::Das), dec!(10));
        assert_eq!(row.tax_total(), dec!(11.50));
    }

    #[test]
    fn test_output_is_chronological_and_orphans_reported() {
        let rev = vec![
            revenue("2024-02", dec!(1), dec!(0), dec!(0)),
            revenue("2023-12", dec!(1), dec!(0), dec!(0)),
            revenue("2024-01", dec!(1), dec!(0), dec!(0)),
        ];
        let taxes = vec![
            TaxRecord::new(period("2024-05"), TaxCategory::Das, dec!(9)),
            TaxRecord::new(period("2024-04"), TaxCategory::Das, dec!(9)),
        ];

        let result = join_revenue_and_taxes(&rev, &taxes);
        let order: Vec<String> = result.periods.iter().map(|p| p.period.to_string()).collect();
        assert_eq!(order, vec!["2023-12", "2024-01", "2024-02"]);
        assert_eq!(
            result.orphan_tax_periods,
            vec![period("2024-04"), period("2024-05")]
        );
    }
}
