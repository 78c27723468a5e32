use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rust_decimal::Decimal;
use uuid::Uuid;

use exparse::{
    ErrorResponse, InMemoryExpenseStore, ParseConfig, ParseRequest, ParseService,
};

/// Parse an expense claim out of free-form text and print the result as JSON.
#[derive(Parser, Debug)]
#[command(name = "exparse", version)]
struct Cli {
    /// Text file to parse ("-" reads from stdin)
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Tax rate override, e.g. 0.15 for 15% GST
    #[arg(short, long)]
    tax_rate: Option<Decimal>,

    /// Currency code override, e.g. NZD
    #[arg(short, long)]
    currency: Option<String>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fail when no tax rate is provided in the request or configuration
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ParseConfig::from_file(path)?,
        None => ParseConfig::default(),
    };
    if cli.strict {
        config.strict_tax_rate = true;
    }

    let text = read_input(&cli.input)?;
    let service = ParseService::new(config, Arc::new(InMemoryExpenseStore::new()));
    let request = ParseRequest {
        text,
        tax_rate: cli.tax_rate,
        currency: cli.currency,
    };

    match service.parse(&request).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(err) => {
            let response = ErrorResponse::from_error(&err, Uuid::new_v4());
            eprintln!("{}", serde_json::to_string_pretty(&response)?);
            std::process::exit(1);
        }
    }
}

fn read_input(path: &PathBuf) -> anyhow::Result<String> {
    let mut text = String::new();
    if path.as_os_str() == "-" {
        io::stdin().read_to_string(&mut text)?;
    } else {
        File::open(path)
            .with_context(|| format!("failed to open input file {}", path.display()))?
            .read_to_string(&mut text)?;
    }
    Ok(text)
}
