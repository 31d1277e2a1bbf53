//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::ledger::TaxCategory;
use crate::period::PeriodKey;
use crate::reports::{FinancialReport, ProfitStatus, SupplementaryPolicy};
use crate::utils::{format_currency_styled, format_percent, NegativeStyle};

/// Result of classifying one ledger description
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub description: String,
    pub keyword: Option<String>,
    pub category: Option<TaxCategory>,
}

/// Result of normalizing one period value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPeriod {
    pub input: String,
    pub period: PeriodKey,
    pub label: String,
}

pub fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

fn money(value: Decimal, negative: NegativeStyle) -> String {
    format_currency_styled(value, negative)
}

fn colored_result(value: Decimal, negative: NegativeStyle) -> String {
    let text = money(value, negative);
    if value >= Decimal::ZERO {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

fn status_label(status: ProfitStatus) -> String {
    match status {
        ProfitStatus::Positive => status.label().green().to_string(),
        ProfitStatus::Negative => status.label().red().to_string(),
    }
}

fn ratio(value: Option<Decimal>) -> String {
    value.map(format_percent).unwrap_or_else(|| "-".to_string())
}

/// Format the monthly summary, headline figures and footer for the terminal
pub fn format_report_table(report: &FinancialReport, negative: NegativeStyle) -> String {
    let mut output = String::new();

    let (first, last) = match (report.first_period(), report.last_period()) {
        (Some(first), Some(last)) => (first, last),
        _ => return format_empty_report(),
    };

    output.push_str(&format!(
        "\n{} Resumo Financeiro - {} a {}\n\n",
        "📊".cyan().bold(),
        first.label(),
        last.label()
    ));

    let categories = report.tax_categories();
    let prorated = report.supplementary_policy == SupplementaryPolicy::Prorate;

    let mut header = vec![
        "Mês".to_string(),
        "Vendas".to_string(),
        "Compras".to_string(),
        "Folha Líquida".to_string(),
    ];
    header.extend(categories.iter().map(|c| c.display_name().to_string()));
    header.push("Total Impostos".to_string());
    if prorated {
        header.push("Ativo/Consumo".to_string());
    }
    header.extend(
        ["Despesas", "Lucro/Prejuízo", "Status", "DAS/Vendas", "Impostos/Vendas"]
            .iter()
            .map(|s| s.to_string()),
    );

    let mut builder = Builder::default();
    builder.push_record(header);

    for month in &report.months {
        let mut row = vec![
            month.period.label(),
            money(month.sales, negative),
            money(month.purchases, negative),
            money(month.net_payroll, negative),
        ];
        row.extend(categories.iter().map(|c| money(month.tax_for(*c), negative)));
        row.push(money(month.tax_total, negative));
        if prorated {
            row.push(money(month.supplementary_share, negative));
        }
        row.push(money(month.expense_total, negative));
        row.push(colored_result(month.profit_loss, negative));
        row.push(status_label(month.status));
        row.push(ratio(month.das_to_sales_pct));
        row.push(ratio(month.tax_to_sales_pct));
        builder.push_record(row);
    }

    let totals = &report.totals;
    let mut row = vec![
        totals.label.bold().to_string(),
        money(totals.sales, negative),
        money(totals.purchases, negative),
        money(totals.net_payroll, negative),
    ];
    row.extend(categories.iter().map(|c| money(totals.tax_for(*c), negative)));
    row.push(money(totals.tax_total, negative));
    if prorated {
        row.push(money(totals.supplementary_share, negative));
    }
    row.push(money(totals.expense_total, negative));
    row.push(colored_result(totals.profit_loss, negative));
    row.push(status_label(totals.status));
    row.push(ratio(totals.das_to_sales_pct));
    row.push(ratio(totals.tax_to_sales_pct));
    builder.push_record(row);

    let mut table = builder.build();
    table.with(Style::modern());
    // Right-align everything but the month column
    table.modify(Columns::new(1..), Alignment::right());
    output.push_str(&table.to_string());

    output.push_str(&format_headline(report, negative));
    output.push_str(&format_footer(report, negative));

    if !report.orphan_tax_periods.is_empty() {
        let periods: Vec<String> = report.orphan_tax_periods.iter().map(|p| p.to_string()).collect();
        output.push_str(&format!(
            "\n{} Impostos sem faturamento correspondente (ignorados): {}\n",
            "⚠".yellow().bold(),
            periods.join(", ")
        ));
    }

    output
}

fn format_headline(report: &FinancialReport, negative: NegativeStyle) -> String {
    let headline = &report.headline;
    let mut output = format!("\n\n{} Destaques", "━".repeat(80).bright_black());

    let cards = [
        ("Vendas Totais:", headline.total_sales),
        ("Compras Totais:", headline.total_purchases),
        ("Folha Líquida:", headline.total_payroll),
        ("Impostos Totais:", headline.total_tax),
        ("DAS Total:", headline.total_das),
    ];
    for (label, value) in cards {
        output.push_str(&format!("\n{:<20} {}", label.bold(), money(value, negative)));
    }
    output.push('\n');
    output
}

fn format_footer(report: &FinancialReport, negative: NegativeStyle) -> String {
    let supplementary = &report.supplementary;
    if supplementary.is_empty() {
        return String::new();
    }

    let mut output = format!("\n{} Despesas do período", "━".repeat(80).bright_black());
    output.push_str(&format!(
        "\n{:<20} {}",
        "Compra de Ativo:".bold(),
        money(supplementary.asset_purchases, negative)
    ));
    output.push_str(&format!(
        "\n{:<20} {}",
        "Uso e Consumo:".bold(),
        money(supplementary.supplies, negative)
    ));

    match report.supplementary_policy {
        SupplementaryPolicy::FooterOnly => {
            let adjusted = report.totals.profit_loss - supplementary.total();
            output.push_str(&format!(
                "\n{:<20} {}\n",
                "Resultado Final:".bold(),
                colored_result(adjusted, negative)
            ));
        }
        SupplementaryPolicy::Prorate => {
            output.push_str(&format!(
                "\n{} Rateado entre os {} meses\n",
                "ℹ".blue().bold(),
                report.months.len()
            ));
        }
    }
    output
}

pub fn format_empty_report() -> String {
    format!(
        "{} No revenue rows found\nCheck the '{}' sheet or run {} report without a file for the sample\n",
        "ℹ".blue().bold(),
        crate::importers::workbook::REVENUE_SHEET,
        "faturamento".bold()
    )
}

pub fn format_classifications(rows: &[Classification]) -> String {
    #[derive(Tabled)]
    struct ClassificationRow {
        #[tabled(rename = "Descrição")]
        description: String,
        #[tabled(rename = "Palavra-chave")]
        keyword: String,
        #[tabled(rename = "Categoria")]
        category: String,
    }

    let rows: Vec<ClassificationRow> = rows
        .iter()
        .map(|r| ClassificationRow {
            description: r.description.clone(),
            keyword: r.keyword.clone().unwrap_or_else(|| "-".to_string()),
            category: match r.category {
                Some(c) => c.as_str().to_string(),
                None => "não classificado".red().to_string(),
            },
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    format!("{}\n", table)
}

pub fn format_periods(rows: &[NormalizedPeriod]) -> String {
    #[derive(Tabled)]
    struct PeriodRow {
        #[tabled(rename = "Entrada")]
        input: String,
        #[tabled(rename = "Período")]
        period: String,
        #[tabled(rename = "Mês")]
        label: String,
    }

    let rows: Vec<PeriodRow> = rows
        .iter()
        .map(|r| PeriodRow {
            input: r.input.clone(),
            period: r.period.to_string(),
            label: format!("{} {}", r.period.month_name(), r.period.year()),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    format!("{}\n", table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importers::dashboard_2024;
    use crate::reports::{aggregate, AggregationOptions};

    fn sample_report(policy: SupplementaryPolicy) -> FinancialReport {
        let tables = dashboard_2024().unwrap();
        aggregate(
            &tables,
            &AggregationOptions {
                supplementary_policy: policy,
            },
        )
    }

    #[test]
    fn test_report_table_has_months_and_totals() {
        let report = sample_report(SupplementaryPolicy::FooterOnly);
        let text = format_report_table(&report, NegativeStyle::LeadingMinus);
        assert!(text.contains("jan/2024"));
        assert!(text.contains("set/2024"));
        assert!(text.contains("Totais"));
        assert!(text.contains("DAS Simples"));
        assert!(text.contains("R$ 105.160,60"));
        assert!(text.contains("Compra de Ativo"));
        assert!(!text.contains("Ativo/Consumo"));
    }

    #[test]
    fn test_report_table_prorate_column() {
        let report = sample_report(SupplementaryPolicy::Prorate);
        let text = format_report_table(&report, NegativeStyle::Parentheses);
        assert!(text.contains("Ativo/Consumo"));
        assert!(text.contains("R$ 4.444,44"));
        assert!(text.contains("R$ 4.444,48"));
    }

    #[test]
    fn test_empty_report_message() {
        let report = aggregate(&Default::default(), &AggregationOptions::default());
        let msg = format_report_table(&report, NegativeStyle::LeadingMinus);
        assert!(msg.contains("No revenue rows found"));
    }

    #[test]
    fn test_report_json_uses_period_strings() {
        let report = sample_report(SupplementaryPolicy::FooterOnly);
        let json = to_json(&report);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["months"][0]["period"], "2024-01");
        assert_eq!(value["months"].as_array().unwrap().len(), 9);
        assert_eq!(value["totals"]["label"], "Totais");
    }

    #[test]
    fn test_classification_table() {
        let rows = vec![
            Classification {
                description: "Guia FGTS".to_string(),
                keyword: Some("FGTS".to_string()),
                category: Some(TaxCategory::Fgts),
            },
            Classification {
                description: "Taxa de licença".to_string(),
                keyword: None,
                category: Some(TaxCategory::Other),
            },
        ];
        let text = format_classifications(&rows);
        assert!(text.contains("Guia FGTS"));
        assert!(text.contains("OUTROS"));
    }
}
