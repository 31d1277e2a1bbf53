// Reports module - monthly summary, grand total and headline figures

pub mod monthly;

pub use monthly::{
    aggregate, derive, grand_total, percentage, prorate, AggregationOptions, FinancialReport,
    GrandTotal, HeadlineFigures, MonthlySummary, ProfitStatus, SupplementaryPolicy, TOTALS_LABEL,
};
