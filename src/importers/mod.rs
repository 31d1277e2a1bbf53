// Import module - financial workbook, tax ledger CSV and literal tables

mod cells;
mod file_detector;
pub mod ledger_csv;
pub mod sample;
mod tables;
pub mod workbook;

use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::info;

use crate::ledger::{CategoryClassifier, SourceTables, TaxRecord};

pub use cells::parse_amount_text;
pub use file_detector::FileType;
pub use ledger_csv::parse_tax_ledger_csv;
pub use sample::dashboard_2024;
pub use tables::{RevenueTable, WideTaxTable};
pub use workbook::parse_workbook;

/// Import source tables from a workbook (auto-detected by extension)
///
/// A CSV tax ledger carries no revenue, so it is rejected here; load it with
/// [`import_tax_ledger`] and merge into tables that already have revenue.
pub fn import_file<P: AsRef<Path>>(path: P, classifier: &CategoryClassifier) -> Result<SourceTables> {
    let path = path.as_ref();
    match FileType::detect(path)? {
        FileType::Workbook => parse_workbook(path, classifier),
        FileType::TaxLedgerCsv => Err(anyhow!(
            "{:?} is a tax ledger without revenue; pass it with --tax-ledger",
            path
        )),
    }
}

/// Import extra tax ledger lines from a CSV or a workbook's tax sheet
pub fn import_tax_ledger<P: AsRef<Path>>(
    path: P,
    classifier: &CategoryClassifier,
) -> Result<Vec<TaxRecord>> {
    let path = path.as_ref();
    info!("Importing tax ledger: {:?}", path);
    match FileType::detect(path)? {
        FileType::TaxLedgerCsv => parse_tax_ledger_csv(path, classifier),
        FileType::Workbook => workbook::parse_tax_sheet(path, classifier),
    }
}
