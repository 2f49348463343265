// src/postgres/listing.rs

//! Parsing of `psql -t -l` output.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::BackupTarget;

/// A database row starts with its name followed by the first `|` separator.
static DB_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\w+)\s*\|").expect("database row pattern is valid")
});

/// Extract backup targets from a database listing, in listing order.
///
/// Lines that do not look like a database row (continuation lines of the
/// access privileges column, blank lines, footers) are skipped, as are the
/// excluded administrative names.
pub fn parse_listing(text: &str) -> Vec<BackupTarget> {
    text.lines()
        .filter_map(|line| DB_ROW.captures(line))
        .filter_map(|caps| BackupTarget::new(&caps[1]))
        .collect()
}
