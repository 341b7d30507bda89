//! Parsing of package-manager listings into version tables.
//!
//! Structured (`--json`) output is decoded record by record. Plain-text
//! tables are split on whitespace after the tool's header, keeping the
//! first two columns; build strings and channels are ignored.
//!
//! A row that does not yield both a name and a version fails the whole
//! listing. Callers that need a soft failure absorb the error.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::tools::HeaderRule;
use crate::error::{Result, UtilitiesError};

/// Package name to version, as reported by the package manager.
pub type VersionTable = BTreeMap<String, String>;

/// Longest excerpt of offending output quoted in errors.
const EXCERPT_LEN: usize = 80;

/// One record of `<tool> list --json`. Other fields are ignored.
#[derive(Debug, Deserialize)]
struct PackageRecord {
    name: String,
    version: String,
}

/// Decode a JSON listing.
pub fn parse_json_listing(tool: &str, output: &str) -> Result<VersionTable> {
    let records: Vec<PackageRecord> =
        serde_json::from_str(output).map_err(|e| UtilitiesError::ListingParseFailed {
            tool: tool.to_string(),
            line: excerpt(output),
            message: e.to_string(),
        })?;

    let mut table = VersionTable::new();
    for record in records {
        table.insert(record.name, record.version);
    }
    Ok(table)
}

/// Parse a plain-text listing, skipping the header described by `header`.
pub fn parse_table_listing(tool: &str, output: &str, header: HeaderRule) -> Result<VersionTable> {
    let mut lines: Vec<&str> = output.lines().collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    let skip = header_len(&lines, header);
    let mut table = VersionTable::new();
    for line in &lines[skip..] {
        let mut columns = line.split_whitespace();
        match (columns.next(), columns.next()) {
            (Some(name), Some(version)) => {
                table.insert(name.to_string(), version.to_string());
            }
            _ => {
                return Err(UtilitiesError::ListingParseFailed {
                    tool: tool.to_string(),
                    line: excerpt(line),
                    message: "expected at least a name and a version column".to_string(),
                });
            }
        }
    }
    Ok(table)
}

/// Number of leading lines that belong to the header.
fn header_len(lines: &[&str], header: HeaderRule) -> usize {
    match header {
        HeaderRule::Fixed(count) => count.min(lines.len()),
        HeaderRule::Dynamic => match lines.iter().position(|line| is_separator(line)) {
            Some(index) => index + 1,
            None => lines
                .iter()
                .take_while(|line| {
                    let line = line.trim_start();
                    line.is_empty() || line.starts_with('#')
                })
                .count(),
        },
    }
}

/// A rule line such as `-----` or `─────` under column titles.
fn is_separator(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty()
        && line
            .chars()
            .all(|c| matches!(c, '-' | '─' | '=' | ' ' | '\t'))
}

fn excerpt(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(EXCERPT_LEN) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}
