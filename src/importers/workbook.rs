//! Two-sheet financial workbook importer
//!
//! Expected layout (any of .xlsx, .xls, .ods):
//!
//! - `Faturamento`: Data, Compras, Vendas, Folha Líquida, Compra de Ativo,
//!   Uso e Consumo
//! - `RelacaoImpostos`: (ignored), Período, Código, Descrição, Valor
//!
//! The header row may sit below a title block; it is located by name within
//! the first rows of each sheet. Asset purchases and supplies are summed into
//! period totals.

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, DataType, Reader};
use std::path::Path;
use tracing::{debug, info};

use super::cells::{cell_amount, cell_period, cell_text, is_blank, is_totals_label};
use crate::error::ReportError;
use crate::ledger::{CategoryClassifier, RevenueRecord, SourceTables, SupplementaryExpenses, TaxRecord};
use crate::utils::fold_text;

pub const REVENUE_SHEET: &str = "Faturamento";
pub const TAX_SHEET: &str = "RelacaoImpostos";

/// How many leading rows may precede the header row
const HEADER_SCAN_ROWS: usize = 10;

/// Column mapping for the revenue sheet
#[derive(Debug, Clone, Default)]
struct RevenueColumns {
    date: Option<usize>,
    purchases: Option<usize>,
    sales: Option<usize>,
    net_payroll: Option<usize>,
    asset_purchases: Option<usize>,
    supplies: Option<usize>,
}

impl RevenueColumns {
    /// Create column mapping by scanning a header row
    fn from_header(header: &[Data]) -> Self {
        let mut mapping = RevenueColumns::default();

        for (idx, cell) in header.iter().enumerate() {
            let text = fold_text(&cell.to_string());
            if text.is_empty() {
                continue;
            }

            if mapping.date.is_none()
                && (text.starts_with("DATA")
                    || text.starts_with("MES")
                    || text.starts_with("PERIODO")
                    || text.starts_with("COMPETENCIA"))
            {
                mapping.date = Some(idx);
            } else if text.contains("ATIVO") {
                mapping.asset_purchases.get_or_insert(idx);
            } else if text.contains("COMPRA") {
                mapping.purchases.get_or_insert(idx);
            } else if text.contains("VENDA") || text.contains("RECEITA") || text.contains("FATURAMENTO") {
                mapping.sales.get_or_insert(idx);
            } else if text.contains("FOLHA") {
                mapping.net_payroll.get_or_insert(idx);
            } else if text.contains("CONSUMO") || text.contains("INSUMO") {
                mapping.supplies.get_or_insert(idx);
            }
        }

        mapping
    }
}

/// Column mapping for the tax ledger sheet
#[derive(Debug, Clone, Default)]
pub(crate) struct TaxColumns {
    pub period: Option<usize>,
    pub code: Option<usize>,
    pub description: Option<usize>,
    pub amount: Option<usize>,
}

impl TaxColumns {
    pub(crate) fn from_header<'a>(header: impl IntoIterator<Item = &'a str>) -> Self {
        let mut mapping = TaxColumns::default();
        let mut date_fallback = None;

        for (idx, raw) in header.into_iter().enumerate() {
            let text = fold_text(raw);
            if text.is_empty() {
                continue;
            }

            if text.starts_with("PERIODO") || text.starts_with("COMPETENCIA") || text.starts_with("MES") {
                mapping.period.get_or_insert(idx);
            } else if text.starts_with("DATA") {
                date_fallback.get_or_insert(idx);
            } else if text.starts_with("COD") {
                mapping.code.get_or_insert(idx);
            } else if text.contains("DESCRICAO")
                || text.contains("HISTORICO")
                || text == "IMPOSTO"
                || text == "TRIBUTO"
            {
                mapping.description.get_or_insert(idx);
            } else if text.contains("VALOR") {
                mapping.amount.get_or_insert(idx);
            }
        }

        if mapping.period.is_none() {
            mapping.period = date_fallback;
        }
        mapping
    }
}

fn required(index: Option<usize>, table: &str, column: &str) -> Result<usize, ReportError> {
    index.ok_or_else(|| ReportError::missing_column(table, column))
}

/// Find a sheet by name ignoring case, accents and spaces
fn find_sheet(sheet_names: &[String], wanted: &str) -> Result<String, ReportError> {
    let target = fold_text(wanted).replace(' ', "");
    sheet_names
        .iter()
        .find(|name| fold_text(name).replace(' ', "") == target)
        .cloned()
        .ok_or_else(|| ReportError::MissingSheet(wanted.to_string()))
}

/// Parse a two-sheet workbook into source tables
pub fn parse_workbook<P: AsRef<Path>>(
    path: P,
    classifier: &CategoryClassifier,
) -> Result<SourceTables> {
    let path = path.as_ref();
    info!("Parsing financial workbook: {:?}", path);

    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook {:?}", path))?;
    let sheet_names = workbook.sheet_names();
    debug!("Workbook sheets: {:?}", sheet_names);

    let revenue_sheet = find_sheet(&sheet_names, REVENUE_SHEET)?;
    let tax_sheet = find_sheet(&sheet_names, TAX_SHEET)?;

    let range = workbook
        .worksheet_range(&revenue_sheet)
        .with_context(|| format!("Failed to read sheet '{}'", revenue_sheet))?;
    let rows: Vec<&[Data]> = range.rows().collect();
    let (revenue, supplementary) = parse_revenue_rows(&rows)?;

    let range = workbook
        .worksheet_range(&tax_sheet)
        .with_context(|| format!("Failed to read sheet '{}'", tax_sheet))?;
    let rows: Vec<&[Data]> = range.rows().collect();
    let taxes = parse_tax_rows(&rows, classifier)?;

    info!(
        "Parsed {} revenue row(s) and {} tax row(s)",
        revenue.len(),
        taxes.len()
    );

    Ok(SourceTables {
        revenue,
        taxes,
        supplementary,
    })
}

/// Parse only the tax ledger sheet of a workbook
pub fn parse_tax_sheet<P: AsRef<Path>>(path: P, classifier: &CategoryClassifier) -> Result<Vec<TaxRecord>> {
    let path = path.as_ref();
    info!("Parsing tax sheet of workbook: {:?}", path);

    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook {:?}", path))?;
    let tax_sheet = find_sheet(&workbook.sheet_names(), TAX_SHEET)?;
    let range = workbook
        .worksheet_range(&tax_sheet)
        .with_context(|| format!("Failed to read sheet '{}'", tax_sheet))?;
    let rows: Vec<&[Data]> = range.rows().collect();
    parse_tax_rows(&rows, classifier)
}

/// Parse the revenue sheet rows (header included)
pub fn parse_revenue_rows(rows: &[&[Data]]) -> Result<(Vec<RevenueRecord>, SupplementaryExpenses)> {
    let (header_idx, mapping) = rows
        .iter()
        .take(HEADER_SCAN_ROWS)
        .enumerate()
        .map(|(idx, row)| (idx, RevenueColumns::from_header(row)))
        .find(|(_, mapping)| mapping.date.is_some())
        .ok_or_else(|| ReportError::missing_column(REVENUE_SHEET, "Data"))?;
    debug!("Revenue header at row {}: {:?}", header_idx + 1, mapping);

    let date = required(mapping.date, REVENUE_SHEET, "Data")?;
    let purchases = required(mapping.purchases, REVENUE_SHEET, "Compras")?;
    let sales = required(mapping.sales, REVENUE_SHEET, "Vendas")?;
    let net_payroll = required(mapping.net_payroll, REVENUE_SHEET, "Folha Líquida")?;

    let empty = Data::Empty;
    let mut records = Vec::new();
    let mut supplementary = SupplementaryExpenses::default();

    for (offset, row) in rows.iter().enumerate().skip(header_idx + 1) {
        let row_number = offset + 1;
        if row.iter().all(is_blank) {
            continue;
        }
        let cell = |idx: usize| row.get(idx).unwrap_or(&empty);

        if let Some(label) = cell(date).get_string() {
            if is_totals_label(label) {
                debug!("Skipping totals row {} in {}", row_number, REVENUE_SHEET);
                continue;
            }
        }

        let context = || format!("{} row {}", REVENUE_SHEET, row_number);
        let period = cell_period(cell(date)).with_context(context)?;

        records.push(RevenueRecord {
            period,
            sales: cell_amount(cell(sales)).with_context(context)?,
            purchases: cell_amount(cell(purchases)).with_context(context)?,
            net_payroll: cell_amount(cell(net_payroll)).with_context(context)?,
        });

        if let Some(idx) = mapping.asset_purchases {
            supplementary.asset_purchases += cell_amount(cell(idx)).with_context(context)?;
        }
        if let Some(idx) = mapping.supplies {
            supplementary.supplies += cell_amount(cell(idx)).with_context(context)?;
        }
    }

    Ok((records, supplementary))
}

/// Parse the tax ledger sheet rows (header included)
pub fn parse_tax_rows(rows: &[&[Data]], classifier: &CategoryClassifier) -> Result<Vec<TaxRecord>> {
    let (header_idx, mapping) = rows
        .iter()
        .take(HEADER_SCAN_ROWS)
        .enumerate()
        .map(|(idx, row)| {
            let texts: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            (idx, TaxColumns::from_header(texts.iter().map(String::as_str)))
        })
        .find(|(_, mapping)| mapping.period.is_some())
        .ok_or_else(|| ReportError::missing_column(TAX_SHEET, "Período"))?;
    debug!("Tax header at row {}: {:?}", header_idx + 1, mapping);

    let period_idx = required(mapping.period, TAX_SHEET, "Período")?;
    let description_idx = required(mapping.description, TAX_SHEET, "Descrição")?;
    let amount_idx = required(mapping.amount, TAX_SHEET, "Valor")?;

    let empty = Data::Empty;
    let mut records = Vec::new();

    for (offset, row) in rows.iter().enumerate().skip(header_idx + 1) {
        let row_number = offset + 1;
        if row.iter().all(is_blank) {
            continue;
        }
        let cell = |idx: usize| row.get(idx).unwrap_or(&empty);

        if let Some(label) = cell(period_idx).get_string() {
            if is_totals_label(label) {
                debug!("Skipping totals row {} in {}", row_number, TAX_SHEET);
                continue;
            }
        }

        let context = || format!("{} row {}", TAX_SHEET, row_number);
        let period = cell_period(cell(period_idx)).with_context(context)?;
        let description = cell_text(cell(description_idx)).unwrap_or_default();
        let code = mapping.code.and_then(|idx| cell_text(cell(idx)));
        let amount = cell_amount(cell(amount_idx)).with_context(context)?;

        let record = TaxRecord::from_ledger_line(period, code, &description, amount, classifier)
            .with_context(context)?;
        records.push(record);
    }

    Ok(records)
}
