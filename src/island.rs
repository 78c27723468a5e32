//! Secure extraction of embedded `<expense>` markup blocks from free text.

use crate::error::ParseError;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::sync::LazyLock;

/// The single recognized embedded block name.
pub const EXPENSE_BLOCK: &str = "expense";

/// Whole-input ceiling, checked before any extraction work.
const MAX_INPUT_BYTES: usize = 2_000_000;

/// Hard cap on characters fed to the XML reader per block.
const MAX_ISLAND_CHARS: u64 = 1_000_000;

static ISLAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<expense\b[^>]*>.*?</expense>").unwrap());

static DECLARATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!(?:DOCTYPE|ENTITY)").unwrap());

/// Finds and validates all `<expense>` blocks in the input, in source order.
///
/// Document-type and entity declarations anywhere in the input are rejected
/// before any parsing is attempted; oversized input is rejected outright.
/// Each candidate is then checked for well-formedness with a hardened reader.
/// Attributes and CDATA inside a block are preserved verbatim.
pub fn extract_islands(input: &str) -> Result<Vec<String>, ParseError> {
    if input.is_empty() {
        return Ok(Vec::new());
    }

    if DECLARATION_RE.is_match(input) {
        return Err(ParseError::ForbiddenDeclaration);
    }

    if input.len() > MAX_INPUT_BYTES {
        return Err(ParseError::InputTooLarge {
            limit: MAX_INPUT_BYTES,
        });
    }

    let mut islands = Vec::new();
    for m in ISLAND_RE.find_iter(input) {
        let island = m.as_str();
        validate_island(island)?;
        islands.push(island.to_string());
    }
    log::debug!("extracted {} expense block(s)", islands.len());
    Ok(islands)
}

/// Structural well-formedness check. quick-xml never resolves external
/// entities; rejecting DOCTYPE events closes the remaining declaration vector
/// even though the whole input was already screened.
fn validate_island(island: &str) -> Result<(), ParseError> {
    let mut reader = Reader::from_str(island);
    reader.config_mut().check_end_names = true;

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => return Ok(()),
            Ok(Event::DocType(_)) => return Err(ParseError::ForbiddenDeclaration),
            Ok(_) => {
                if reader.buffer_position() > MAX_ISLAND_CHARS {
                    return Err(ParseError::InputTooLarge {
                        limit: MAX_ISLAND_CHARS as usize,
                    });
                }
            }
            Err(e) => {
                return Err(ParseError::MalformedIsland {
                    detail: e.to_string(),
                })
            }
        }
    }
}
