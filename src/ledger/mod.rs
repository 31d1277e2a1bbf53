// Ledger module - source records, tax bucketing and the revenue/tax join

pub mod categories;
pub mod join;
pub mod records;

pub use categories::{default_rules, CategoryClassifier, KeywordRule};
pub use join::{join_revenue_and_taxes, JoinResult, JoinedPeriod};
pub use records::{RevenueRecord, SourceTables, SupplementaryExpenses, TaxCategory, TaxRecord};
