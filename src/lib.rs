//! Faturamento - monthly financial summary for small Brazilian businesses
//!
//! Joins monthly revenue figures (sales, purchases, net payroll) with a tax
//! ledger bucketed into DAS, FGTS, ISSQN, DCTFWeb and friends, then derives
//! expenses, profit/loss and tax ratios per month plus a grand total.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod importers;
pub mod ledger;
pub mod period;
pub mod reports;
pub mod utils;
