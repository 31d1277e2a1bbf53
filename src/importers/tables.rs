//! Literal in-memory tables
//!
//! Column-oriented shapes matching how the figures are usually typed in:
//! one vector per column, with period strings in any supported format.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::ledger::{RevenueRecord, TaxCategory, TaxRecord};
use crate::period::PeriodKey;

const REVENUE_TABLE: &str = "revenue table";
const TAX_TABLE: &str = "tax table";

/// Revenue figures as parallel columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueTable {
    pub periods: Vec<String>,
    pub sales: Vec<Decimal>,
    pub purchases: Vec<Decimal>,
    pub net_payroll: Vec<Decimal>,
}

impl RevenueTable {
    pub fn into_records(self) -> Result<Vec<RevenueRecord>, ReportError> {
        let mut records = Vec::with_capacity(self.periods.len());
        for (row, raw_period) in self.periods.iter().enumerate() {
            let period = PeriodKey::parse(raw_period)?;
            records.push(RevenueRecord {
                period,
                sales: column_value(&self.sales, row, REVENUE_TABLE, "sales")?,
                purchases: column_value(&self.purchases, row, REVENUE_TABLE, "purchases")?,
                net_payroll: column_value(&self.net_payroll, row, REVENUE_TABLE, "net_payroll")?,
            });
        }
        Ok(records)
    }
}

/// Tax figures with one column per category (the "wide" layout)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WideTaxTable {
    pub periods: Vec<String>,
    pub columns: Vec<(TaxCategory, Vec<Decimal>)>,
}

impl WideTaxTable {
    pub fn new(periods: Vec<String>) -> Self {
        Self {
            periods,
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, category: TaxCategory, values: Vec<Decimal>) -> Self {
        self.columns.push((category, values));
        self
    }

    /// Melt into one long record per (period, category) cell
    pub fn into_records(self) -> Result<Vec<TaxRecord>, ReportError> {
        let periods = self
            .periods
            .iter()
            .map(|p| PeriodKey::parse(p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(periods.len() * self.columns.len());
        for (category, values) in &self.columns {
            for (row, period) in periods.iter().enumerate() {
                let amount = column_value(values, row, TAX_TABLE, category.as_str())?;
                records.push(TaxRecord::new(*period, *category, amount));
            }
        }
        Ok(records)
    }
}

fn column_value(
    column: &[Decimal],
    row: usize,
    table: &str,
    name: &str,
) -> Result<Decimal, ReportError> {
    column
        .get(row)
        .copied()
        .ok_or_else(|| ReportError::missing_column(table, format!("{} (row {})", name, row + 1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn periods(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_revenue_table_into_records() {
        let table = RevenueTable {
            periods: periods(&["2024-01", "02/2024"]),
            sales: vec![dec!(79964.37), dec!(105745.62)],
            purchases: vec![dec!(105160.60), dec!(107065.02)],
            net_payroll: vec![dec!(11614.67), dec!(11459.96)],
        };
        let records = table.into_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].period, PeriodKey::new(2024, 2).unwrap());
        assert_eq!(records[1].sales, dec!(105745.62));
    }

    #[test]
    fn test_short_column_is_missing_column() {
        let table = RevenueTable {
            periods: periods(&["2024-01", "2024-02"]),
            sales: vec![dec!(1), dec!(2)],
            purchases: vec![dec!(1)],
            net_payroll: vec![dec!(1), dec!(2)],
        };
        match table.into_records() {
            Err(ReportError::MissingColumn { table, column }) => {
                assert_eq!(table, "revenue table");
                assert_eq!(column, "purchases (row 2)");
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_period_is_reported() {
        let table = RevenueTable {
            periods: periods(&["2024-01", "sometime"]),
            sales: vec![dec!(1), dec!(2)],
            purchases: vec![dec!(1), dec!(2)],
            net_payroll: vec![dec!(1), dec!(2)],
        };
        assert!(matches!(
            table.into_records(),
            Err(ReportError::MalformedPeriod { value }) if value == "sometime"
        ));
    }

    #[test]
    fn test_wide_tax_table_melts_to_long_records() {
        let table = WideTaxTable::new(periods(&["2024-01", "2024-02"]))
            .with_column(TaxCategory::Das, vec![dec!(6806.03), dec!(9021.59)])
            .with_column(TaxCategory::Other, vec![dec!(3774.49), dec!(3163.71)]);

        let records = table.into_records().unwrap();
        assert_eq!(records.len(), 4);
        let feb_other = records
            .iter()
            .find(|r| r.category == TaxCategory::Other && r.period.month() == 2)
            .unwrap();
        assert_eq!(feb_other.amount, dec!(3163.71));
    }
}
