use anyhow::{Context, Result};
use csv::ReaderBuilder;
use encoding_rs::ISO_8859_15;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::cells::{is_totals_label, parse_amount_text};
use super::workbook::TaxColumns;
use crate::error::ReportError;
use crate::ledger::{CategoryClassifier, TaxRecord};
use crate::period::PeriodKey;

const TABLE: &str = "tax ledger CSV";

/// Parse a tax ledger exported as CSV (period, code, description, amount).
///
/// Files saved by Brazilian spreadsheet tools are usually `;`-separated and
/// often Latin-1; both are handled.
pub fn parse_tax_ledger_csv<P: AsRef<Path>>(
    path: P,
    classifier: &CategoryClassifier,
) -> Result<Vec<TaxRecord>> {
    let path = path.as_ref();
    info!("Parsing tax ledger CSV: {:?}", path);

    let bytes = fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let content = decode(&bytes);
    parse_tax_ledger_str(&content, classifier)
}

/// UTF-8 when valid, ISO-8859-15 otherwise
fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.trim_start_matches('\u{feff}').to_string(),
        Err(_) => {
            debug!("CSV is not UTF-8, decoding as ISO-8859-15");
            let (decoded, _, _) = ISO_8859_15.decode(bytes);
            decoded.into_owned()
        }
    }
}

fn detect_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");
    if header.contains(';') {
        b';'
    } else if header.contains('\t') {
        b'\t'
    } else {
        b','
    }
}

pub fn parse_tax_ledger_str(content: &str, classifier: &CategoryClassifier) -> Result<Vec<TaxRecord>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(detect_delimiter(content))
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();
    debug!("CSV headers: {:?}", headers);

    let mapping = TaxColumns::from_header(headers.iter());
    let period_idx = mapping
        .period
        .ok_or_else(|| ReportError::missing_column(TABLE, "Período"))?;
    let description_idx = mapping
        .description
        .ok_or_else(|| ReportError::missing_column(TABLE, "Descrição"))?;
    let amount_idx = mapping
        .amount
        .ok_or_else(|| ReportError::missing_column(TABLE, "Valor"))?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // Header is line 1
        let line = idx + 2;
        let record = result.with_context(|| format!("Failed to read CSV line {}", line))?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let field = |i: usize| record.get(i).map(str::trim).unwrap_or("");
        if is_totals_label(field(period_idx)) {
            debug!("Skipping totals line {}", line);
            continue;
        }

        let context = || format!("{} line {}", TABLE, line);
        let period = PeriodKey::parse(field(period_idx)).with_context(context)?;
        let amount = match field(amount_idx) {
            "" => rust_decimal::Decimal::ZERO,
            raw => parse_amount_text(raw).with_context(context)?,
        };
        let code = mapping
            .code
            .map(field)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        records.push(
            TaxRecord::from_ledger_line(period, code, field(description_idx), amount, classifier)
                .with_context(context)?,
        );
    }

    info!("Parsed {} tax ledger line(s)", records.len());
    Ok(records)
}
