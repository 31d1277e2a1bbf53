//! Utility functions for formatting and common operations
//!
//! Currency output is a pure function of a `Decimal` and an explicit
//! `CurrencyStyle`; nothing here reads process locale state.

mod text;

pub use text::fold_text;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurrencySymbol {
    /// Include "R$ " prefix (Brazilian Real)
    BRL,
    /// No currency symbol (for table cells)
    None,
}

/// How negative amounts are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeStyle {
    /// `R$ -47.555,00`
    #[default]
    #[serde(alias = "minus")]
    LeadingMinus,
    /// `R$ (47.555,00)`
    #[serde(alias = "parens")]
    Parentheses,
}

impl std::str::FromStr for NegativeStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minus" | "leading_minus" | "leading-minus" => Ok(NegativeStyle::LeadingMinus),
            "parens" | "parentheses" => Ok(NegativeStyle::Parentheses),
            other => Err(format!(
                "unknown negative style '{}'. Use 'minus' or 'parens'",
                other
            )),
        }
    }
}

/// Explicit formatting style passed to every formatter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyStyle {
    pub symbol: CurrencySymbol,
    pub negative: NegativeStyle,
}

impl Default for CurrencyStyle {
    fn default() -> Self {
        Self {
            symbol: CurrencySymbol::BRL,
            negative: NegativeStyle::LeadingMinus,
        }
    }
}

impl CurrencyStyle {
    pub fn with_negative(negative: NegativeStyle) -> Self {
        Self {
            negative,
            ..Self::default()
        }
    }
}

/// Round to cents, midpoint away from zero.
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Add thousands separators (.) to a string of ASCII digits
fn group_thousands(digits: &str) -> String {
    digits
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec!['.', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect()
}

/// Core formatting function with full control over output.
///
/// Formats a Decimal value using Brazilian conventions:
/// - Thousands separator: `.` (period)
/// - Decimal separator: `,` (comma)
/// - Two fractional digits, rounded half away from zero
///
/// # Examples
/// ```
/// use faturamento::utils::{format_currency_with_width, CurrencyStyle, CurrencySymbol, NegativeStyle};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(
///     format_currency_with_width(dec!(1234.56), 0, CurrencyStyle::default()),
///     "R$ 1.234,56"
/// );
///
/// let bare = CurrencyStyle { symbol: CurrencySymbol::None, negative: NegativeStyle::Parentheses };
/// assert_eq!(format_currency_with_width(dec!(-1234), 12, bare), "  (1.234,00)");
/// ```
pub fn format_currency_with_width(value: Decimal, width: usize, style: CurrencyStyle) -> String {
    let rounded = round_cents(value);
    let is_negative = rounded < Decimal::ZERO;

    let formatted = format!("{:.2}", rounded.abs());
    let (integer_part, decimal_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let with_separators = group_thousands(integer_part);
    let number = format!("{},{}", with_separators, decimal_part);

    let prefix = match style.symbol {
        CurrencySymbol::BRL => "R$ ",
        CurrencySymbol::None => "",
    };

    let result = match (is_negative, style.negative) {
        (false, _) => format!("{}{}", prefix, number),
        (true, NegativeStyle::LeadingMinus) => format!("{}-{}", prefix, number),
        (true, NegativeStyle::Parentheses) => format!("{}({})", prefix, number),
    };

    // Apply width padding (right-align)
    if width > 0 && result.chars().count() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

// ============ Convenience functions ============

/// Format as Brazilian Real with symbol and leading minus: "R$ 1.234,56"
///
/// # Examples
/// ```
/// use faturamento::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(1234.5)), "R$ 1.234,50");
/// assert_eq!(format_currency(dec!(-47555.00)), "R$ -47.555,00");
/// ```
pub fn format_currency(value: Decimal) -> String {
    format_currency_with_width(value, 0, CurrencyStyle::default())
}

/// Format as Brazilian Real using the given negative convention.
pub fn format_currency_styled(value: Decimal, negative: NegativeStyle) -> String {
    format_currency_with_width(value, 0, CurrencyStyle::with_negative(negative))
}

/// Format number only (no symbol): "1.234,56"
pub fn format_decimal_br(value: Decimal) -> String {
    format_currency_with_width(
        value,
        0,
        CurrencyStyle {
            symbol: CurrencySymbol::None,
            negative: NegativeStyle::LeadingMinus,
        },
    )
}

/// Format a percentage with comma decimals: "12,34%"
///
/// # Examples
/// ```
/// use faturamento::utils::format_percent;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_percent(dec!(8.5114)), "8,51%");
/// ```
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", format_decimal_br(value))
}
