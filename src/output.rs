//! Output sinks for search results.
//!
//! [`PrettyPrinter`] writes the pipe-separated line format search frameworks
//! read from plugin stdout:
//!
//! ```text
//! link|name|size_in_bytes|seeds|leech|engine_url[|desc_link]
//! ```

use std::io::{self, Write};
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::parser::ResultRecord;

/// `1,024.5 MB`-style sizes after comma stripping: number, optional unit.
#[allow(clippy::expect_used)]
static SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)?|\.\d+)\s*([A-Za-z]*)\s*$").expect("size regex is valid") // Static pattern, safe to panic
});

/// Receiver of completed search results, called once per record in order.
pub trait ResultSink {
    /// Handles one record.
    fn emit(&mut self, record: &ResultRecord);
}

/// Collects records in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    /// Records in emission order.
    pub records: Vec<ResultRecord>,
}

impl ResultSink for VecSink {
    fn emit(&mut self, record: &ResultRecord) {
        self.records.push(record.clone());
    }
}

/// Writes one pipe-separated line per record.
#[derive(Debug)]
pub struct PrettyPrinter<W: Write> {
    writer: W,
}

impl PrettyPrinter<io::Stdout> {
    /// Printer writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> PrettyPrinter<W> {
    /// Printer writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for PrettyPrinter<W> {
    fn emit(&mut self, record: &ResultRecord) {
        let line = format_result_line(record);
        if let Err(error) = writeln!(self.writer, "{line}") {
            warn!(error = %error, "failed to write result line");
        }
    }
}

/// Renders a record as `link|name|size|seeds|leech|engine_url[|desc_link]`.
///
/// `|` inside the name becomes a space, the size is converted to bytes, and
/// missing seeds/leech read as `-1`.
#[must_use]
pub fn format_result_line(record: &ResultRecord) -> String {
    let size = record.size().map_or(-1, size_to_bytes);
    let mut line = [
        record.link().unwrap_or_default().to_string(),
        record.name().unwrap_or_default().replace('|', " "),
        size.to_string(),
        record.seeds().unwrap_or("-1").to_string(),
        record.leech().unwrap_or("-1").to_string(),
        record.engine_url().unwrap_or_default().to_string(),
    ]
    .join("|");
    if let Some(desc_link) = record.desc_link() {
        line.push('|');
        line.push_str(desc_link);
    }
    line
}

/// Converts a human-readable size (`"1.5 GB"`, `"700MiB"`, `"512"`) to bytes.
///
/// Units are matched on their first letter (K, M, G, T) with binary
/// multipliers; any other unit, or none, leaves the number as-is. Fractional
/// bytes are truncated. Returns `-1` when the text is not a size.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn size_to_bytes(size: &str) -> i64 {
    let cleaned = size.replace(',', "");
    let Some(caps) = SIZE_PATTERN.captures(&cleaned) else {
        return -1;
    };
    let Ok(number) = caps[1].parse::<f64>() else {
        return -1;
    };
    let shift = match caps[2].chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('K') => 10,
        Some('M') => 20,
        Some('G') => 30,
        Some('T') => 40,
        _ => 0,
    };
    (number * 2_f64.powi(shift)) as i64
}
