use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::info;

/// Type of import file detected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Two-sheet workbook with revenue and tax ledger
    Workbook,
    /// Tax ledger exported as delimited text
    TaxLedgerCsv,
}

impl FileType {
    /// Detect the import type from the file extension
    pub fn detect<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| anyhow!("File has no extension: {:?}", path))?
            .to_lowercase();

        let file_type = match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => FileType::Workbook,
            "csv" | "txt" => FileType::TaxLedgerCsv,
            _ => {
                return Err(anyhow!(
                    "Unsupported file format: {}. Supported formats: .xlsx, .xls, .ods, .csv",
                    extension
                ))
            }
        };

        info!("Detected {:?} format for {:?}", file_type, path);
        Ok(file_type)
    }
}
