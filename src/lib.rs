//! Parses free-form text (e.g. email bodies) that mixes prose with inline
//! tags and embedded `<expense>` markup blocks, classifies the content as an
//! expense claim or unrecognized "other" content, and computes a GST
//! breakdown with exact half-to-even rounding.

pub mod config;
pub mod error;
pub mod island;
pub mod model;
pub mod normalize;
pub mod process;
pub mod service;
pub mod store;
pub mod tags;
pub mod tax;
pub mod warnings;

// Flat public surface for domain types and functions.
pub use config::{ParseConfig, FALLBACK_TAX_RATE};
pub use error::{ErrorResponse, ParseError};
pub use island::{extract_islands, EXPENSE_BLOCK};
pub use model::{
    Classification, Expense, ExpenseSource, OtherData, ParsedContent, ProcessedData,
    ProcessingResult, TaxCalculationResult, XmlIsland, UNKNOWN_COST_CENTRE,
};
pub use normalize::{normalize_number, parse_time};
pub use process::{ContentProcessor, ContentRouter, ExpenseProcessor, OtherProcessor};
pub use service::{ParseRequest, ParseResponse, ParseService, ResponseMeta};
pub use store::{ExpenseStore, InMemoryExpenseStore};
pub use tags::{extract_inline_tags, validate_tags};
pub use tax::{calculate_from_inclusive, round_half_even};
pub use warnings::Warning;
