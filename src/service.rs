//! Orchestration of the parse pipeline: request validation, tag validation,
//! extraction, routing and response assembly. Owns the ordering and the
//! tax-rate defaulting policy.

use crate::config::{ParseConfig, FALLBACK_TAX_RATE};
use crate::error::ParseError;
use crate::island::{extract_islands, EXPENSE_BLOCK};
use crate::model::{Expense, OtherData, ParsedContent, ProcessedData, XmlIsland};
use crate::process::ContentRouter;
use crate::store::ExpenseStore;
use crate::tags::{extract_inline_tags, validate_tags};
use crate::warnings::Warning;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Request texts above this are rejected outright (256 KiB).
const MAX_TEXT_BYTES: usize = 262_144;

/// One parse invocation's inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseRequest {
    pub text: String,
    /// Optional override; wins over any configured default.
    pub tax_rate: Option<Decimal>,
    pub currency: Option<String>,
}

/// Per-request metadata attached to every successful response.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseMeta {
    pub correlation_id: Uuid,
    pub warnings: Vec<Warning>,
    pub tags_found: Vec<String>,
    pub processing_time_ms: u64,
}

/// Caller-facing result: an expense breakdown or the preserved raw content,
/// never both.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "classification", rename_all = "lowercase")]
pub enum ParseResponse {
    Expense { expense: Expense, meta: ResponseMeta },
    Other { other: OtherData, meta: ResponseMeta },
}

impl ParseResponse {
    pub fn meta(&self) -> &ResponseMeta {
        match self {
            ParseResponse::Expense { meta, .. } => meta,
            ParseResponse::Other { meta, .. } => meta,
        }
    }
}

/// Sequences validation, extraction, routing and response assembly for one
/// request. Stateless across requests; only the store is shared.
pub struct ParseService {
    config: ParseConfig,
    router: ContentRouter,
}

impl ParseService {
    pub fn new(config: ParseConfig, store: Arc<dyn ExpenseStore>) -> Self {
        ParseService {
            config,
            router: ContentRouter::new(store),
        }
    }

    pub async fn parse(&self, request: &ParseRequest) -> Result<ParseResponse, ParseError> {
        let started = Instant::now();
        let correlation_id = Uuid::new_v4();

        self.validate_request(request)?;
        log::info!("processing parse request; correlation_id={correlation_id}");

        validate_tags(&request.text)?;

        let islands = extract_islands(&request.text)?
            .into_iter()
            .map(|content| XmlIsland {
                name: EXPENSE_BLOCK.to_string(),
                content,
            })
            .collect();
        let inline_tags = extract_inline_tags(&request.text);
        let tags_found: Vec<String> = inline_tags.keys().cloned().collect();

        let tax_rate = self.effective_tax_rate(request.tax_rate)?;
        let currency = request
            .currency
            .clone()
            .unwrap_or_else(|| self.config.default_currency.clone());
        log::debug!("effective tax_rate={tax_rate} currency={currency}");

        let content = ParsedContent {
            inline_tags,
            islands,
            raw_text: request.text.clone(),
            tax_rate,
            currency,
        };

        let result = self.router.route(&content).await?;

        let meta = ResponseMeta {
            correlation_id,
            warnings: result.warnings.clone(),
            tags_found,
            processing_time_ms: started.elapsed().as_millis() as u64,
        };
        log::info!(
            "parse request completed; correlation_id={correlation_id} classification={} elapsed_ms={}",
            result.classification,
            meta.processing_time_ms
        );

        Ok(match result.data {
            ProcessedData::Expense(expense) => ParseResponse::Expense { expense, meta },
            ProcessedData::Other(other) => ParseResponse::Other { other, meta },
        })
    }

    fn validate_request(&self, request: &ParseRequest) -> Result<(), ParseError> {
        if request.text.trim().is_empty() {
            return Err(ParseError::EmptyText);
        }
        if request.text.len() > MAX_TEXT_BYTES {
            return Err(ParseError::InvalidRequest {
                detail: format!("text cannot exceed {MAX_TEXT_BYTES} bytes"),
            });
        }
        if let Some(rate) = request.tax_rate {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(ParseError::InvalidRequest {
                    detail: format!("tax rate must be between 0 and 1 when provided, got {rate}"),
                });
            }
        }
        Ok(())
    }

    /// Precedence: request value, then configured default, then (unless
    /// strict mode demands an explicit rate) the fixed fallback.
    fn effective_tax_rate(&self, requested: Option<Decimal>) -> Result<Decimal, ParseError> {
        if let Some(rate) = requested {
            return Ok(rate);
        }
        if let Some(rate) = self.config.default_tax_rate {
            return Ok(rate);
        }
        if self.config.strict_tax_rate {
            return Err(ParseError::MissingTaxRate);
        }
        Ok(FALLBACK_TAX_RATE)
    }
}
