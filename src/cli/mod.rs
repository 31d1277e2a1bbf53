use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::importers::parse_amount_text;
use crate::reports::SupplementaryPolicy;
use crate::utils::NegativeStyle;

pub mod formatters;

#[derive(Parser, Debug)]
#[command(name = "faturamento")]
#[command(
    version,
    about = "Monthly revenue, expense and tax summary for small Brazilian businesses"
)]
#[command(
    long_about = "Join monthly sales, purchases and payroll with the tax ledger (DAS, FGTS, ISSQN, DCTFWeb, ...), derive expenses, profit/loss and tax ratios per month, and print the summary with grand totals."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Config file (default: <config dir>/faturamento/config.toml)
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the monthly summary from a workbook (or the built-in 2024 sample)
    Report {
        /// Workbook with `Faturamento` and `RelacaoImpostos` sheets
        file: Option<PathBuf>,

        /// Extra tax ledger lines (CSV or workbook); may be repeated
        #[arg(long = "tax-ledger", value_name = "FILE")]
        tax_ledger: Vec<PathBuf>,

        /// How to write negative amounts: minus or parens
        #[arg(long)]
        negative: Option<NegativeStyle>,

        /// Asset purchases and supplies: footer or prorate
        #[arg(long)]
        supplementary: Option<SupplementaryPolicy>,

        /// Period-total asset purchases (overrides the workbook)
        #[arg(long = "asset-purchases", value_parser = parse_amount_arg, allow_hyphen_values = true)]
        asset_purchases: Option<Decimal>,

        /// Period-total supplies (overrides the workbook)
        #[arg(long, value_parser = parse_amount_arg, allow_hyphen_values = true)]
        supplies: Option<Decimal>,

        /// Fail on tax descriptions that match no keyword
        #[arg(long)]
        strict: bool,
    },

    /// Show which tax bucket each description falls into
    Classify {
        #[arg(required = true)]
        descriptions: Vec<String>,
    },

    /// Normalize period values (2024-01, 01/2024, Janeiro 2024, ...)
    Period {
        #[arg(required = true)]
        values: Vec<String>,
    },
}

/// Accepts `25000`, `25000.00` or `25.000,00`
fn parse_amount_arg(raw: &str) -> Result<Decimal, String> {
    parse_amount_text(raw).map_err(|e| e.to_string())
}
