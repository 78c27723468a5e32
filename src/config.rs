//! External configuration for the parse pipeline.

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Fixed fallback when no tax rate is supplied anywhere (NZ GST).
pub const FALLBACK_TAX_RATE: Decimal = dec!(0.15);

/// Read-only parsing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    pub default_currency: String,
    pub default_tax_rate: Option<Decimal>,
    /// When set and no tax rate is available from request or config, parsing
    /// fails with MISSING_TAXRATE instead of falling back.
    pub strict_tax_rate: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            default_currency: "NZD".to_string(),
            default_tax_rate: None,
            strict_tax_rate: false,
        }
    }
}

impl ParseConfig {
    /// Loads configuration from a JSON file; absent keys take defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open config file {}", path.display()))?;
        let config = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}
