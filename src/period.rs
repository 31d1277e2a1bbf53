//! Calendar-month keys
//!
//! `PeriodKey` is the join key between the revenue and tax tables. Parsing
//! accepts the shapes found in the source spreadsheets and literal tables:
//!
//! - `2024-01`, `2024/01`
//! - `01/2024`, `1-2024`
//! - `2024-01-15`, `2024-01-15 00:00:00`, `2024-01-15T00:00:00`
//! - `15/01/2024`
//! - `jan/2024`, `Janeiro de 2024`, `set-2024`, `Sep 2024`
//!
//! Month names are matched against fixed Portuguese and English tables after
//! accent folding, so parsing never depends on the process locale.

use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ReportError;
use crate::utils::fold_text;

static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})$").expect("valid regex"));
static MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[-/](\d{4})$").expect("valid regex"));
static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[T ]\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?)?$")
        .expect("valid regex")
});
static BR_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("valid regex"));
static NAMED_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Z]+)\.?(?:\s*[-/ ]\s*|\s+DE\s+)(\d{4})$").expect("valid regex")
});

/// Serial of 9999-12-31
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

const MONTHS_PT: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

const ABBREVIATIONS_PT: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

const MONTHS_EN: [&str; 12] = [
    "JANUARY",
    "FEBRUARY",
    "MARCH",
    "APRIL",
    "MAY",
    "JUNE",
    "JULY",
    "AUGUST",
    "SEPTEMBER",
    "OCTOBER",
    "NOVEMBER",
    "DECEMBER",
];

/// A calendar month. Ordering is chronological (year, then month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    pub fn new(year: i32, month: u32) -> Result<Self, ReportError> {
        if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
            return Err(ReportError::malformed_period(format!(
                "{:04}-{:02}",
                year, month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Truncate a date to its month
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Convert an Excel serial date (days since 1899-12-30) to its month
    pub fn from_excel_serial(serial: f64) -> Result<Self, ReportError> {
        let bad = || ReportError::malformed_period(serial.to_string());
        // Excel stops at 9999-12-31; larger numbers are ids or amounts
        if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
            return Err(bad());
        }
        let excel_epoch = NaiveDate::from_ymd_opt(1899, 12, 30).ok_or_else(bad)?;
        let days = Duration::try_days(serial.floor() as i64).ok_or_else(bad)?;
        let date = excel_epoch.checked_add_signed(days).ok_or_else(bad)?;
        Ok(Self::from_date(date))
    }

    /// Parse any supported period representation
    pub fn parse(input: &str) -> Result<Self, ReportError> {
        let trimmed = input.trim();
        let malformed = || ReportError::malformed_period(trimmed);

        if let Some(caps) = YEAR_MONTH.captures(trimmed) {
            return Self::new(number(&caps[1])?, number(&caps[2])?).map_err(|_| malformed());
        }

        if let Some(caps) = MONTH_YEAR.captures(trimmed) {
            return Self::new(number(&caps[2])?, number(&caps[1])?).map_err(|_| malformed());
        }

        if let Some(caps) = ISO_DATE.captures(trimmed) {
            let date = NaiveDate::from_ymd_opt(
                number(&caps[1])?,
                number(&caps[2])?,
                number(&caps[3])?,
            )
            .ok_or_else(malformed)?;
            return Ok(Self::from_date(date));
        }

        if let Some(caps) = BR_DATE.captures(trimmed) {
            let date = NaiveDate::from_ymd_opt(
                number(&caps[3])?,
                number(&caps[2])?,
                number(&caps[1])?,
            )
            .ok_or_else(malformed)?;
            return Ok(Self::from_date(date));
        }

        let folded = fold_text(trimmed);
        if let Some(caps) = NAMED_MONTH.captures(&folded) {
            let month = month_from_name(&caps[1]).ok_or_else(malformed)?;
            return Self::new(number(&caps[2])?, month).map_err(|_| malformed());
        }

        Err(malformed())
    }

    /// Portuguese month name, e.g. "Março"
    pub fn month_name(&self) -> &'static str {
        MONTHS_PT[(self.month - 1) as usize]
    }

    /// Short display label, e.g. "mar/2024"
    pub fn label(&self) -> String {
        format!("{}/{}", ABBREVIATIONS_PT[(self.month - 1) as usize], self.year)
    }
}

fn number<T: FromStr>(digits: &str) -> Result<T, ReportError> {
    digits
        .parse()
        .map_err(|_| ReportError::malformed_period(digits))
}

/// Resolve a folded (upper case, accentless) month name or abbreviation
fn month_from_name(name: &str) -> Option<u32> {
    let position = |table: &[&str]| {
        table
            .iter()
            .position(|m| fold_text(m) == name)
            .map(|i| i as u32 + 1)
    };

    if let Some(month) = position(&MONTHS_PT).or_else(|| position(&MONTHS_EN)) {
        return Some(month);
    }
    if name == "SEPT" {
        return Some(9);
    }
    if name.len() == 3 {
        return position(&ABBREVIATIONS_PT).or_else(|| {
            MONTHS_EN
                .iter()
                .position(|m| m.starts_with(name))
                .map(|i| i as u32 + 1)
        });
    }
    None
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PeriodKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeriodKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        PeriodKey::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(year: i32, month: u32) -> PeriodKey {
        PeriodKey::new(year, month).unwrap()
    }

    #[test]
    fn test_parse_numeric_shapes() {
        assert_eq!(PeriodKey::parse("2024-01").unwrap(), key(2024, 1));
        assert_eq!(PeriodKey::parse("2024/09").unwrap(), key(2024, 9));
        assert_eq!(PeriodKey::parse("01/2024").unwrap(), key(2024, 1));
        assert_eq!(PeriodKey::parse("9-2024").unwrap(), key(2024, 9));
        assert_eq!(PeriodKey::parse(" 2024-03 ").unwrap(), key(2024, 3));
    }

    #[test]
    fn test_parse_full_dates_truncate_to_month() {
        assert_eq!(PeriodKey::parse("2024-02-01").unwrap(), key(2024, 2));
        assert_eq!(PeriodKey::parse("2024-02-29 00:00:00").unwrap(), key(2024, 2));
        assert_eq!(PeriodKey::parse("2024-07-15T10:30:00").unwrap(), key(2024, 7));
        assert_eq!(PeriodKey::parse("31/12/2023").unwrap(), key(2023, 12));
    }

    #[test]
    fn test_parse_month_names_is_locale_independent() {
        assert_eq!(PeriodKey::parse("jan/2024").unwrap(), key(2024, 1));
        assert_eq!(PeriodKey::parse("Março de 2024").unwrap(), key(2024, 3));
        assert_eq!(PeriodKey::parse("MARCO/2024").unwrap(), key(2024, 3));
        assert_eq!(PeriodKey::parse("set-2024").unwrap(), key(2024, 9));
        assert_eq!(PeriodKey::parse("Sep 2024").unwrap(), key(2024, 9));
        assert_eq!(PeriodKey::parse("Sept. 2024").unwrap(), key(2024, 9));
        assert_eq!(PeriodKey::parse("dez/2023").unwrap(), key(2023, 12));
        assert_eq!(PeriodKey::parse("December 2023").unwrap(), key(2023, 12));
    }

    #[test]
    fn test_different_shapes_same_key() {
        let a = PeriodKey::parse("2024-01").unwrap();
        let b = PeriodKey::parse("01/2024").unwrap();
        let c = PeriodKey::parse("2024-01-01").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_malformed_periods_name_the_value() {
        for bad in ["", "2024-13", "00/2024", "2024-02-30", "foo/2024", "2024", "13/13/2024"] {
            match PeriodKey::parse(bad) {
                Err(ReportError::MalformedPeriod { value }) => assert_eq!(value, bad.trim()),
                other => panic!("expected MalformedPeriod for '{}', got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_ordering_is_chronological() {
        let mut keys = vec![
            PeriodKey::parse("02/2024").unwrap(),
            PeriodKey::parse("2023-12").unwrap(),
            PeriodKey::parse("jan/2024").unwrap(),
        ];
        keys.sort();
        assert_eq!(keys, vec![key(2023, 12), key(2024, 1), key(2024, 2)]);
    }

    #[test]
    fn test_display_and_label() {
        let k = key(2024, 3);
        assert_eq!(k.to_string(), "2024-03");
        assert_eq!(k.label(), "mar/2024");
        assert_eq!(k.month_name(), "Março");
    }

    #[test]
    fn test_from_excel_serial() {
        // 45292 = 2024-01-01
        assert_eq!(PeriodKey::from_excel_serial(45292.0).unwrap(), key(2024, 1));
        assert_eq!(PeriodKey::from_excel_serial(45322.75).unwrap(), key(2024, 1));
        assert!(PeriodKey::from_excel_serial(f64::NAN).is_err());
    }

    #[test]
    fn test_huge_serial_is_malformed_not_panic() {
        // A CNPJ typed into the date column
        assert!(matches!(
            PeriodKey::from_excel_serial(12345678000199.0),
            Err(ReportError::MalformedPeriod { value }) if value == "12345678000199"
        ));
        assert_eq!(PeriodKey::from_excel_serial(2_958_465.0).unwrap(), key(9999, 12));
        assert!(PeriodKey::from_excel_serial(2_958_466.0).is_err());
    }

    #[test]
    fn test_serde_uses_canonical_text() {
        let k = key(2024, 5);
        let json = serde_json::to_string(&k).unwrap();
        assert_eq!(json, "\"2024-05\"");
        let back: PeriodKey = serde_json::from_str("\"05/2024\"").unwrap();
        assert_eq!(back, k);
    }
}
