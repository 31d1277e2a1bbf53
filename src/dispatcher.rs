//! Command dispatcher that routes clap Commands to their handlers.
//!
//! Handlers merge the config file with command-line flags, run the core and
//! print through `cli::formatters`.

use anyhow::Result;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::info;

use crate::cli::formatters::{self, Classification, NormalizedPeriod};
use crate::cli::{Cli, Commands};
use crate::config::ReportConfig;
use crate::importers::{dashboard_2024, import_file, import_tax_ledger};
use crate::ledger::{CategoryClassifier, SourceTables, SupplementaryExpenses};
use crate::period::PeriodKey;
use crate::reports::{aggregate, AggregationOptions, FinancialReport, SupplementaryPolicy};
use crate::utils::NegativeStyle;

/// Effective settings for one `report` run
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub file: Option<PathBuf>,
    pub tax_ledgers: Vec<PathBuf>,
    pub negative: NegativeStyle,
    pub policy: SupplementaryPolicy,
    pub asset_purchases: Option<Decimal>,
    pub supplies: Option<Decimal>,
    pub classifier: CategoryClassifier,
}

impl ReportRequest {
    /// Command-line values win over the config file
    #[allow(clippy::too_many_arguments)]
    pub fn resolve(
        config: &ReportConfig,
        file: Option<PathBuf>,
        tax_ledgers: Vec<PathBuf>,
        negative: Option<NegativeStyle>,
        policy: Option<SupplementaryPolicy>,
        asset_purchases: Option<Decimal>,
        supplies: Option<Decimal>,
        strict: bool,
    ) -> Self {
        let classifier = config.classifier();
        let strict = strict || classifier.is_strict();
        Self {
            file,
            tax_ledgers,
            negative: negative.unwrap_or(config.negative_style),
            policy: policy.unwrap_or(config.supplementary_policy),
            asset_purchases: asset_purchases.or(config.asset_purchases),
            supplies: supplies.or(config.supplies),
            classifier: classifier.strict(strict),
        }
    }

    fn apply_overrides(&self, supplementary: &mut SupplementaryExpenses) {
        if let Some(value) = self.asset_purchases {
            supplementary.asset_purchases = value;
        }
        if let Some(value) = self.supplies {
            supplementary.supplies = value;
        }
    }
}

/// Load the source tables for a request and aggregate them
pub fn build_report(request: &ReportRequest) -> Result<FinancialReport> {
    let mut tables: SourceTables = match &request.file {
        Some(path) => import_file(path, &request.classifier)?,
        None => {
            info!("No input file given, using the built-in 2024 dataset");
            dashboard_2024()?
        }
    };

    for ledger in &request.tax_ledgers {
        let records = import_tax_ledger(ledger, &request.classifier)?;
        info!("Merged {} tax line(s) from {:?}", records.len(), ledger);
        tables.extend_taxes(records);
    }
    request.apply_overrides(&mut tables.supplementary);

    Ok(aggregate(
        &tables,
        &AggregationOptions {
            supplementary_policy: request.policy,
        },
    ))
}

/// Route a parsed command line to its handler
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = ReportConfig::load(cli.config.as_deref())?;
    let json_output = cli.json;

    match cli.command {
        Commands::Report {
            file,
            tax_ledger,
            negative,
            supplementary,
            asset_purchases,
            supplies,
            strict,
        } => {
            let request = ReportRequest::resolve(
                &config,
                file,
                tax_ledger,
                negative,
                supplementary,
                asset_purchases,
                supplies,
                strict,
            );
            dispatch_report(&request, json_output)
        }
        Commands::Classify { descriptions } => {
            dispatch_classify(&config.classifier(), &descriptions, json_output)
        }
        Commands::Period { values } => dispatch_period(&values, json_output),
    }
}

fn dispatch_report(request: &ReportRequest, json_output: bool) -> Result<()> {
    let report = build_report(request)?;
    if json_output {
        println!("{}", formatters::to_json(&report));
    } else {
        println!("{}", formatters::format_report_table(&report, request.negative));
    }
    Ok(())
}

pub fn classify_descriptions(classifier: &CategoryClassifier, descriptions: &[String]) -> Vec<Classification> {
    descriptions
        .iter()
        .map(|description| {
            let rule = classifier.matching_rule(description);
            Classification {
                description: description.clone(),
                keyword: rule.map(|r| r.keyword.clone()),
                category: classifier.classify(description).ok(),
            }
        })
        .collect()
}

fn dispatch_classify(classifier: &CategoryClassifier, descriptions: &[String], json_output: bool) -> Result<()> {
    let rows = classify_descriptions(classifier, descriptions);
    if json_output {
        println!("{}", formatters::to_json(&rows));
    } else {
        print!("{}", formatters::format_classifications(&rows));
    }
    Ok(())
}

pub fn normalize_periods(values: &[String]) -> Result<Vec<NormalizedPeriod>> {
    values
        .iter()
        .map(|value| -> Result<NormalizedPeriod> {
            let period = PeriodKey::parse(value)?;
            Ok(NormalizedPeriod {
                input: value.clone(),
                period,
                label: period.label(),
            })
        })
        .collect()
}

fn dispatch_period(values: &[String], json_output: bool) -> Result<()> {
    let rows = normalize_periods(values)?;
    if json_output {
        println!("{}", formatters::to_json(&rows));
    } else {
        print!("{}", formatters::format_periods(&rows));
    }
    Ok(())
}
