//! Built-in 2024 dataset (January to September)
//!
//! Used by the CLI when no file is given and by the integration tests.

use rust_decimal::Decimal;

use super::tables::{RevenueTable, WideTaxTable};
use crate::error::ReportError;
use crate::ledger::{SourceTables, SupplementaryExpenses, TaxCategory};

const PERIODS: [&str; 9] = [
    "2024-01", "2024-02", "2024-03", "2024-04", "2024-05", "2024-06", "2024-07", "2024-08",
    "2024-09",
];

const PURCHASES: [i64; 9] = [
    10516060, 10706502, 6439280, 12008899, 12491739, 8943032, 11539963, 8113493, 7272511,
];
const SALES: [i64; 9] = [
    7996437, 10574562, 12769582, 4124516, 6991740, 10580446, 15130707, 11296877, 14254512,
];
const NET_PAYROLL: [i64; 9] = [
    1161467, 1145996, 1122051, 1198291, 1260728, 1180955, 1214588, 1240017, 1301231,
];

const DAS: [i64; 9] = [680603, 902159, 1099054, 359441, 600722, 768800, 980000, 1120000, 820000];
const FGTS: [i64; 9] = [146894, 122444, 114197, 131092, 138934, 157645, 165078, 148736, 141200];
const DCTFWEB: [i64; 9] = [202190, 168227, 170263, 171530, 177919, 185500, 191543, 174500, 160050];
const ISSQN: [i64; 9] = [28365, 22658, 22881, 25975, 22844, 29060, 31435, 27690, 24580];

const ASSET_PURCHASES: i64 = 2500000;
const SUPPLIES: i64 = 1500000;

fn cents(values: &[i64]) -> Vec<Decimal> {
    values.iter().map(|v| Decimal::new(*v, 2)).collect()
}

fn periods() -> Vec<String> {
    PERIODS.iter().map(|p| p.to_string()).collect()
}

pub fn revenue_2024() -> RevenueTable {
    RevenueTable {
        periods: periods(),
        sales: cents(&SALES),
        purchases: cents(&PURCHASES),
        net_payroll: cents(&NET_PAYROLL),
    }
}

pub fn taxes_2024() -> WideTaxTable {
    WideTaxTable::new(periods())
        .with_column(TaxCategory::Das, cents(&DAS))
        .with_column(TaxCategory::Fgts, cents(&FGTS))
        .with_column(TaxCategory::DctfWeb, cents(&DCTFWEB))
        .with_column(TaxCategory::Issqn, cents(&ISSQN))
}

/// The full 2024 dataset, including period-total asset purchases and supplies
pub fn dashboard_2024() -> Result<SourceTables, ReportError> {
    Ok(SourceTables {
        revenue: revenue_2024().into_records()?,
        taxes: taxes_2024().into_records()?,
        supplementary: SupplementaryExpenses {
            asset_purchases: Decimal::new(ASSET_PURCHASES, 2),
            supplies: Decimal::new(SUPPLIES, 2),
        },
    })
}
