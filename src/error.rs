//! Error handling for the aggregator
//!
//! `ReportError` is the typed taxonomy returned by the core (period parsing,
//! bucketing, joins). Importers and the CLI wrap it in `anyhow` for context
//! chaining; callers recover the typed error with `downcast_ref`.

use thiserror::Error;

/// Core error types for aggregation runs. All of them are fatal for the run.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("malformed period: '{value}'")]
    MalformedPeriod { value: String },

    #[error("missing column '{column}' in {table}")]
    MissingColumn { table: String, column: String },

    #[error("missing sheet '{0}'")]
    MissingSheet(String),

    #[error("unclassified tax category: '{description}'")]
    UnclassifiedTaxCategory { description: String },

    #[error("invalid amount: '{value}'")]
    InvalidAmount { value: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    pub fn malformed_period(value: impl Into<String>) -> Self {
        ReportError::MalformedPeriod {
            value: value.into(),
        }
    }

    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        ReportError::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn invalid_amount(value: impl Into<String>) -> Self {
        ReportError::InvalidAmount {
            value: value.into(),
        }
    }
}

/// Result type alias for importer and CLI operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = ReportError::malformed_period("13/2024");
        assert_eq!(err.to_string(), "malformed period: '13/2024'");

        let err = ReportError::missing_column("Faturamento", "Vendas");
        assert_eq!(err.to_string(), "missing column 'Vendas' in Faturamento");
    }

    #[test]
    fn test_anyhow_context_keeps_typed_error() {
        use anyhow::Context;
        let result: Result<()> = Err(ReportError::invalid_amount("abc"))
            .context("failed to read sheet Faturamento");
        match result {
            Err(e) => {
                assert!(e.to_string().contains("failed to read sheet"));
                let typed = e.downcast_ref::<ReportError>();
                assert!(matches!(typed, Some(ReportError::InvalidAmount { .. })));
            }
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_report_error_variants() {
        let err = ReportError::UnclassifiedTaxCategory {
            description: "TAXA DE LIXO".to_string(),
        };
        assert!(err.to_string().starts_with("unclassified tax category"));

        let err = ReportError::MissingSheet("RelacaoImpostos".to_string());
        assert!(err.to_string().contains("RelacaoImpostos"));
    }
}
