//! Mandi (wholesale market) price store.
//!
//! A local SQLite file queried through a SELECT-only pass-through, plus the
//! CSV import that fills it.

mod executor;
mod import;
pub mod schema;

pub use executor::{
    check_policy, MarketError, MarketStore, QueryOutcome, COUNT_CAP, DEFAULT_ROW_LIMIT,
    NO_RESULTS_MESSAGE,
};
pub use import::{import_csv, ImportStats};
