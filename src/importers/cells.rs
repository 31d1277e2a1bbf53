//! Cell coercion shared by the workbook and CSV importers

use calamine::{Data, DataType};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ReportError;
use crate::period::PeriodKey;
use crate::utils::{fold_text, round_cents};

/// Parse an amount written as text.
///
/// A comma marks Brazilian format (`1.234,56`, `R$ 1.234,56`). Without a
/// comma, dots are thousands separators when every group after the first has
/// exactly three digits (`1.500`, `1.234.567`); otherwise a single dot is the
/// decimal point (`1234.56`, `0.500`). Parentheses and a leading minus both
/// mean negative.
pub fn parse_amount_text(raw: &str) -> Result<Decimal, ReportError> {
    let invalid = || ReportError::invalid_amount(raw.trim());

    let mut text: String = raw
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let mut negative = false;
    if text.starts_with('(') && text.ends_with(')') && text.len() > 2 {
        negative = true;
        text = text[1..text.len() - 1].to_string();
    }

    let normalized = if text.contains(',') {
        text.replace('.', "").replace(',', ".")
    } else if has_thousands_groups(&text) {
        text.replace('.', "")
    } else {
        text
    };

    if normalized.is_empty() {
        return Err(invalid());
    }

    let value = Decimal::from_str(&normalized).map_err(|_| invalid())?;
    Ok(if negative { -value } else { value })
}

/// `1.500`, `-25.000`, `1.234.567`: a 1-3 digit lead without a leading zero,
/// then groups of exactly three digits
fn has_thousands_groups(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let mut groups = digits.split('.');
    let lead = groups.next().unwrap_or("");
    let lead_ok = (1..=3).contains(&lead.len())
        && lead.chars().all(|c| c.is_ascii_digit())
        && !lead.starts_with('0');
    let mut rest = groups.peekable();
    lead_ok
        && rest.peek().is_some()
        && rest.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

/// Read an amount cell. Blank cells count as zero; floats are rounded to cents.
pub fn cell_amount(cell: &Data) -> Result<Decimal, ReportError> {
    match cell {
        Data::Empty => Ok(Decimal::ZERO),
        Data::Int(i) => Ok(Decimal::from(*i)),
        Data::Float(f) => Decimal::from_f64_retain(*f)
            .map(round_cents)
            .ok_or_else(|| ReportError::invalid_amount(f.to_string())),
        Data::String(s) if s.trim().is_empty() => Ok(Decimal::ZERO),
        Data::String(s) => parse_amount_text(s),
        other => Err(ReportError::invalid_amount(other.to_string())),
    }
}

/// Read a period cell: Excel dates, serial numbers or any supported text
pub fn cell_period(cell: &Data) -> Result<PeriodKey, ReportError> {
    match cell {
        Data::DateTime(dt) => PeriodKey::from_excel_serial(dt.as_f64()),
        Data::Float(f) => PeriodKey::from_excel_serial(*f),
        Data::Int(i) => PeriodKey::from_excel_serial(*i as f64),
        Data::DateTimeIso(s) | Data::String(s) => PeriodKey::parse(s),
        other => Err(ReportError::malformed_period(other.to_string())),
    }
}

pub fn cell_text(cell: &Data) -> Option<String> {
    if let Some(s) = cell.get_string() {
        let trimmed = s.trim();
        return (!trimmed.is_empty()).then(|| trimmed.to_string());
    }
    match cell {
        Data::Empty => None,
        other => Some(other.to_string()),
    }
}

pub fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Footer rows such as "Total" in the period column
pub fn is_totals_label(text: &str) -> bool {
    matches!(fold_text(text).as_str(), "TOTAL" | "TOTAIS" | "TOTAL GERAL")
}
