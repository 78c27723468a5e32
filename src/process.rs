//! Content classification and strategy processors.
//!
//! The router holds an explicit ordered list of processors; the first whose
//! `can_process` accepts the content wins. The terminal [`OtherProcessor`]
//! accepts everything, so every input routes somewhere.

use crate::error::ParseError;
use crate::island::EXPENSE_BLOCK;
use crate::model::{
    Classification, Expense, ExpenseSource, OtherData, ParsedContent, ProcessedData,
    ProcessingResult, XmlIsland, UNKNOWN_COST_CENTRE,
};
use crate::normalize::{normalize_number, parse_time};
use crate::store::ExpenseStore;
use crate::tax::calculate_from_inclusive;
use crate::warnings::Warning;
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// Inline tag names that signal expense content.
const EXPENSE_TAGS: [&str; 7] = [
    "total",
    "vendor",
    "cost_centre",
    "payment_method",
    "description",
    "date",
    "time",
];

/// Note attached to unrecognized content.
pub const OTHER_NOTE: &str = "Content stored for future processing";

static ISLAND_TOTAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<total>(.*?)</total>").unwrap());
static ISLAND_COST_CENTRE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<cost_centre>(.*?)</cost_centre>").unwrap());
static ISLAND_PAYMENT_METHOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<payment_method>(.*?)</payment_method>").unwrap());

fn island_field(re: &Regex, island: &XmlIsland) -> Option<String> {
    re.captures(&island.content)
        .map(|caps| caps[1].trim().to_string())
}

/// Strategy interface for content processors.
#[async_trait]
pub trait ContentProcessor: Send + Sync {
    fn classification(&self) -> Classification;

    fn can_process(&self, content: &ParsedContent) -> bool;

    async fn process(&self, content: &ParsedContent) -> Result<ProcessingResult, ParseError>;
}

/// Routes parsed content to the first processor that claims it.
pub struct ContentRouter {
    processors: Vec<Box<dyn ContentProcessor>>,
}

impl ContentRouter {
    /// Standard routing order: expense first, the catch-all last.
    pub fn new(store: Arc<dyn ExpenseStore>) -> Self {
        ContentRouter {
            processors: vec![
                Box::new(ExpenseProcessor::new(store)),
                Box::new(OtherProcessor),
            ],
        }
    }

    pub async fn route(&self, content: &ParsedContent) -> Result<ProcessingResult, ParseError> {
        for processor in &self.processors {
            if processor.can_process(content) {
                log::debug!("routing content to {} processor", processor.classification());
                return processor.process(content).await;
            }
        }
        // Unreachable as long as the catch-all is registered.
        Err(ParseError::Internal {
            detail: "no processor accepted the content".to_string(),
        })
    }
}

/// Processes expense claims through a five-stage pipeline:
/// validate, extract, normalize, persist, respond.
pub struct ExpenseProcessor {
    store: Arc<dyn ExpenseStore>,
}

impl ExpenseProcessor {
    pub fn new(store: Arc<dyn ExpenseStore>) -> Self {
        ExpenseProcessor { store }
    }

    fn expense_island(content: &ParsedContent) -> Option<&XmlIsland> {
        content.islands.iter().find(|i| i.name == EXPENSE_BLOCK)
    }

    /// Stage 1: a total must be present inline or inside an expense block.
    fn validate_required_fields(content: &ParsedContent) -> Result<(), ParseError> {
        let has_total_inline = content.inline_tags.contains_key("total");
        let has_total_island = Self::expense_island(content)
            .map(|island| ISLAND_TOTAL_RE.is_match(&island.content))
            .unwrap_or(false);

        if !has_total_inline && !has_total_island {
            return Err(ParseError::MissingTotal);
        }
        Ok(())
    }

    /// Stage 2: inline tags first, then the expense block overrides total,
    /// cost_centre and payment_method only. Inline wins for everything else.
    fn extract(content: &ParsedContent, warnings: &mut Vec<Warning>) -> (Expense, String) {
        let tags = &content.inline_tags;

        let mut raw_total = tags.get("total").cloned();
        let mut source = ExpenseSource::Inline;
        let mut cost_centre = tags.get("cost_centre").cloned();
        let mut payment_method = tags.get("payment_method").cloned().unwrap_or_default();

        if let Some(island) = Self::expense_island(content) {
            if let Some(total) = island_field(&ISLAND_TOTAL_RE, island) {
                raw_total = Some(total);
                source = ExpenseSource::EmbeddedBlock;
            }
            if let Some(cc) = island_field(&ISLAND_COST_CENTRE_RE, island) {
                cost_centre = Some(cc);
            }
            if let Some(pm) = island_field(&ISLAND_PAYMENT_METHOD_RE, island) {
                payment_method = pm;
            }
        }

        let cost_centre = match cost_centre.filter(|cc| !cc.is_empty()) {
            Some(cc) => cc,
            None => {
                warnings.push(Warning::DefaultedCostCentre);
                UNKNOWN_COST_CENTRE.to_string()
            }
        };

        let time = match tags.get("time") {
            Some(raw) if parse_time(raw).is_some() => Some(raw.trim().to_string()),
            Some(raw) => {
                warnings.push(Warning::UnparsableTime { value: raw.clone() });
                None
            }
            None => None,
        };

        let expense = Expense {
            id: None,
            vendor: tags.get("vendor").cloned().unwrap_or_default(),
            description: tags.get("description").cloned().unwrap_or_default(),
            total: rust_decimal::Decimal::ZERO,
            total_excl_tax: rust_decimal::Decimal::ZERO,
            sales_tax: rust_decimal::Decimal::ZERO,
            cost_centre,
            date: tags.get("date").cloned(),
            time,
            payment_method,
            tax_rate: content.tax_rate,
            currency: content.currency.clone(),
            source,
        };

        // Stage 1 guarantees a total from one of the two sources.
        let raw_total = raw_total.unwrap_or_default();
        (expense, raw_total)
    }
}

#[async_trait]
impl ContentProcessor for ExpenseProcessor {
    fn classification(&self) -> Classification {
        Classification::Expense
    }

    fn can_process(&self, content: &ParsedContent) -> bool {
        let has_expense_tag = EXPENSE_TAGS
            .iter()
            .any(|tag| content.inline_tags.contains_key(*tag));
        has_expense_tag || Self::expense_island(content).is_some()
    }

    async fn process(&self, content: &ParsedContent) -> Result<ProcessingResult, ParseError> {
        Self::validate_required_fields(content)?;

        let mut warnings = Vec::new();
        let (mut expense, raw_total) = Self::extract(content, &mut warnings);

        let total = normalize_number(&raw_total)?;
        let tax = calculate_from_inclusive(total, content.tax_rate)?;
        expense.total = tax.tax_inclusive;
        expense.total_excl_tax = tax.tax_exclusive;
        expense.sales_tax = tax.sales_tax;

        let id = self.store.save(expense.clone()).await?;
        expense.id = Some(id);
        log::debug!("persisted expense {id}");

        Ok(ProcessingResult {
            classification: Classification::Expense,
            data: ProcessedData::Expense(expense),
            success: true,
            warnings,
        })
    }
}

/// Terminal fallback: accepts anything, preserves the raw tags for future
/// handling.
pub struct OtherProcessor;

#[async_trait]
impl ContentProcessor for OtherProcessor {
    fn classification(&self) -> Classification {
        Classification::Other
    }

    fn can_process(&self, _content: &ParsedContent) -> bool {
        true
    }

    async fn process(&self, content: &ParsedContent) -> Result<ProcessingResult, ParseError> {
        Ok(ProcessingResult {
            classification: Classification::Other,
            data: ProcessedData::Other(OtherData {
                raw_tags: content.inline_tags.clone(),
                note: OTHER_NOTE.to_string(),
            }),
            success: true,
            warnings: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryExpenseStore;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn content_with_tags(pairs: &[(&str, &str)]) -> ParsedContent {
        let inline_tags: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ParsedContent {
            inline_tags,
            islands: Vec::new(),
            raw_text: String::new(),
            tax_rate: dec!(0.15),
            currency: "NZD".to_string(),
        }
    }

    fn with_island(mut content: ParsedContent, island: &str) -> ParsedContent {
        content.islands.push(XmlIsland {
            name: EXPENSE_BLOCK.to_string(),
            content: island.to_string(),
        });
        content
    }

    fn store() -> Arc<InMemoryExpenseStore> {
        Arc::new(InMemoryExpenseStore::new())
    }

    #[test]
    fn expense_tag_claims_content() {
        let processor = ExpenseProcessor::new(store());
        assert!(processor.can_process(&content_with_tags(&[("total", "1")])));
        assert!(processor.can_process(&content_with_tags(&[("vendor", "Mojo")])));
    }

    #[test]
    fn expense_island_claims_content() {
        let processor = ExpenseProcessor::new(store());
        let content = with_island(
            content_with_tags(&[("reservation", "x")]),
            "<expense><total>1</total></expense>",
        );
        assert!(processor.can_process(&content));
    }

    #[test]
    fn unrelated_tags_are_not_claimed() {
        let processor = ExpenseProcessor::new(store());
        assert!(!processor.can_process(&content_with_tags(&[("reservation_date", "Friday")])));
    }

    #[tokio::test]
    async fn missing_total_fails_before_persistence() {
        let store = store();
        let processor = ExpenseProcessor::new(store.clone());
        let content = content_with_tags(&[("vendor", "Mojo Coffee")]);

        let err = processor.process(&content).await.unwrap_err();
        assert_eq!(err, ParseError::MissingTotal);
        assert!(store.get_all().await.is_empty());
    }

    #[tokio::test]
    async fn inline_total_is_normalized_and_taxed() {
        let store = store();
        let processor = ExpenseProcessor::new(store.clone());
        let content = content_with_tags(&[("total", "$120.50"), ("vendor", "Mojo Coffee")]);

        let result = processor.process(&content).await.unwrap();
        let expense = match result.data {
            ProcessedData::Expense(e) => e,
            other => panic!("expected expense payload, got {other:?}"),
        };
        assert_eq!(expense.total, dec!(120.50));
        assert_eq!(expense.total_excl_tax, dec!(104.78));
        assert_eq!(expense.sales_tax, dec!(15.72));
        assert_eq!(expense.source, ExpenseSource::Inline);
        assert!(expense.id.is_some());
        assert_eq!(store.get_all().await.len(), 1);
    }

    #[tokio::test]
    async fn island_total_overrides_inline_total() {
        let processor = ExpenseProcessor::new(store());
        let content = with_island(
            content_with_tags(&[("total", "999.99"), ("vendor", "Mojo Coffee")]),
            "<expense><total>100.00</total><cost_centre>DEV002</cost_centre></expense>",
        );

        let result = processor.process(&content).await.unwrap();
        let expense = match result.data {
            ProcessedData::Expense(e) => e,
            other => panic!("expected expense payload, got {other:?}"),
        };
        assert_eq!(expense.total, dec!(100.00));
        assert_eq!(expense.cost_centre, "DEV002");
        assert_eq!(expense.source, ExpenseSource::EmbeddedBlock);
        // inline wins for fields outside the override set
        assert_eq!(expense.vendor, "Mojo Coffee");
    }

    #[tokio::test]
    async fn island_payment_method_overrides_inline() {
        let processor = ExpenseProcessor::new(store());
        let content = with_island(
            content_with_tags(&[("total", "10.00"), ("payment_method", "cash")]),
            "<expense><payment_method>personal card</payment_method></expense>",
        );

        let result = processor.process(&content).await.unwrap();
        match result.data {
            ProcessedData::Expense(e) => assert_eq!(e.payment_method, "personal card"),
            other => panic!("expected expense payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_cost_centre_defaults_with_warning() {
        let processor = ExpenseProcessor::new(store());
        let content = content_with_tags(&[("total", "10.00")]);

        let result = processor.process(&content).await.unwrap();
        assert!(result.warnings.contains(&Warning::DefaultedCostCentre));
        match result.data {
            ProcessedData::Expense(e) => assert_eq!(e.cost_centre, UNKNOWN_COST_CENTRE),
            other => panic!("expected expense payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparsable_time_is_dropped_with_warning() {
        let processor = ExpenseProcessor::new(store());
        let content = content_with_tags(&[("total", "10.00"), ("time", "7.30pm")]);

        let result = processor.process(&content).await.unwrap();
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::UnparsableTime { value } if value == "7.30pm")));
        match result.data {
            ProcessedData::Expense(e) => assert_eq!(e.time, None),
            other => panic!("expected expense payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn valid_time_is_kept() {
        let processor = ExpenseProcessor::new(store());
        let content = content_with_tags(&[("total", "10.00"), ("time", "14:30")]);

        let result = processor.process(&content).await.unwrap();
        match result.data {
            ProcessedData::Expense(e) => assert_eq!(e.time.as_deref(), Some("14:30")),
            other => panic!("expected expense payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn router_selects_expense_then_falls_back_to_other() {
        let router = ContentRouter::new(store());

        let expense = router
            .route(&content_with_tags(&[("total", "10.00")]))
            .await
            .unwrap();
        assert_eq!(expense.classification, Classification::Expense);

        let other = router
            .route(&content_with_tags(&[("reservation_date", "Friday")]))
            .await
            .unwrap();
        assert_eq!(other.classification, Classification::Other);
        match other.data {
            ProcessedData::Other(data) => {
                assert_eq!(
                    data.raw_tags.get("reservation_date").map(String::as_str),
                    Some("Friday")
                );
                assert_eq!(data.note, OTHER_NOTE);
            }
            other => panic!("expected other payload, got {other:?}"),
        }
    }
}
