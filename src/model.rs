use crate::warnings::Warning;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Cost centre sentinel used when neither inline tags nor an expense block
/// provide one.
pub const UNKNOWN_COST_CENTRE: &str = "UNKNOWN";

/// Classification assigned to one parse request's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Expense,
    Other,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Expense => write!(f, "expense"),
            Classification::Other => write!(f, "other"),
        }
    }
}

/// An extracted embedded markup block, e.g. an `<expense>` island.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlIsland {
    pub name: String,
    /// Verbatim markup, attributes and CDATA preserved.
    pub content: String,
}

/// Content extracted from one request's raw text. Built once, then read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedContent {
    /// Inline `<name>value</name>` pairs; last occurrence wins on duplicates.
    pub inline_tags: BTreeMap<String, String>,
    /// Embedded blocks in source order.
    pub islands: Vec<XmlIsland>,
    pub raw_text: String,
    /// Effective tax rate after defaulting precedence was applied.
    pub tax_rate: Decimal,
    pub currency: String,
}

/// Where the expense total came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpenseSource {
    EmbeddedBlock,
    Inline,
}

/// An expense claim with its tax breakdown.
///
/// Invariant: `total == total_excl_tax + sales_tax`, both rounded to two
/// decimal places half-to-even.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Assigned by the store at persistence time.
    pub id: Option<Uuid>,
    pub vendor: String,
    pub description: String,
    /// Tax-inclusive total.
    pub total: Decimal,
    pub total_excl_tax: Decimal,
    pub sales_tax: Decimal,
    pub cost_centre: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub payment_method: String,
    pub tax_rate: Decimal,
    pub currency: String,
    pub source: ExpenseSource,
}

/// Payload for unrecognized content: the raw tags are kept verbatim for
/// future processing rather than discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherData {
    pub raw_tags: BTreeMap<String, String>,
    pub note: String,
}

/// Exactly one payload shape per result; the enum enforces the expense XOR
/// other invariant by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessedData {
    Expense(Expense),
    Other(OtherData),
}

/// Outcome of routing one request's content through a processor.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingResult {
    pub classification: Classification,
    pub data: ProcessedData,
    pub success: bool,
    pub warnings: Vec<Warning>,
}

/// Pure result of a tax-inclusive breakdown calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCalculationResult {
    pub tax_exclusive: Decimal,
    pub sales_tax: Decimal,
    pub tax_inclusive: Decimal,
    pub tax_rate: Decimal,
}
