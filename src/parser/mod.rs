//! Incremental parser for the tracker's search-result page.
//!
//! The page is consumed as a stream of tag events (see [`tokenizer`]); no DOM
//! is built. A [`ParseStage`] value tracks where in the
//! table/row/cell structure the stream currently is, the in-progress
//! [`ResultRecord`] picks up text and hrefs according to that stage, and each
//! `</tr>` moves the row into the ordered result list.
//!
//! Unexpected markup never fails the parse: unmatched events leave the stage
//! where it was, so odd nesting yields partial or empty rows at worst.
//!
//! # Example
//!
//! ```
//! use torrentbd::parser::SearchResultParser;
//!
//! let html = r#"<table><tr>
//!   <td></td>
//!   <td><a class="ttorr-title" href="torrents-details.php?id=1">Ubuntu 24.04</a>
//!       <div title="File Size">5.7 GB</div></td>
//!   <td><a href="download.php?id=1">dl</a></td>
//! </tr></table>"#;
//!
//! let mut parser = SearchResultParser::new();
//! parser.feed(html);
//! assert_eq!(parser.results().len(), 1);
//! assert_eq!(parser.results()[0].name(), Some("Ubuntu 24.04"));
//! ```

mod links;
mod record;
mod stage;
pub mod tokenizer;

pub use links::{ENGINE_URL, join_url_paths, resolve_href};
pub use record::{Field, ResultRecord};
pub use stage::{
    DESC_LINK_CLASS, FILE_SIZE_TITLE, LEECHERS_TITLE, ParseStage, RowAction, SEEDERS_TITLE,
    Transition,
};
pub use tokenizer::{TagAttribute, TagSink, TokenizeStop};

use tracing::{debug, trace};
use url::Url;

/// Trims surrounding whitespace and drops thousands separators.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    raw.trim().replace(',', "")
}

/// Stage tracker, row accumulator and result collector for one search response.
///
/// A parser is meant to process exactly one response. Feeding more markup
/// later continues from the current stage and appends to the same result list.
/// A response may arrive in chunks split anywhere, even inside a tag: input
/// after the last `>` of a chunk is held back until the next [`feed`] or
/// [`finish`].
///
/// [`feed`]: SearchResultParser::feed
/// [`finish`]: SearchResultParser::finish
#[derive(Debug, Clone)]
pub struct SearchResultParser {
    base_url: Url,
    engine_url: String,
    stage: ParseStage,
    current_row: ResultRecord,
    results: Vec<ResultRecord>,
    pending: String,
}

impl Default for SearchResultParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchResultParser {
    /// Creates a parser resolving links against the public site address.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(site_url())
    }

    /// Creates a parser resolving links against `base_url`.
    ///
    /// `engine_url` on each record is the base without a trailing slash.
    #[must_use]
    pub fn with_base_url(base_url: Url) -> Self {
        let engine_url = base_url.as_str().trim_end_matches('/').to_string();
        Self {
            base_url,
            engine_url,
            stage: ParseStage::NotStarted,
            current_row: ResultRecord::new(),
            results: Vec::new(),
            pending: String::new(),
        }
    }

    /// Feeds an HTML fragment through the stage machine.
    ///
    /// Everything up to the last `>` is processed now; the rest (a cut tag or
    /// trailing text) waits for the next chunk. Unreadable markup is skipped.
    pub fn feed(&mut self, html: &str) {
        let before = self.results.len();
        let mut buffer = std::mem::take(&mut self.pending);
        buffer.push_str(html);
        let complete = buffer.rfind('>').map_or(0, |i| i + 1);
        self.pending = buffer.split_off(complete);
        self.run(&buffer);
        debug!(
            new_rows = self.results.len() - before,
            total_rows = self.results.len(),
            held_back = self.pending.len(),
            stage = ?self.stage,
            "fed search markup"
        );
    }

    /// Processes input held back by [`feed`](Self::feed), for a response
    /// that does not end with `>`.
    pub fn finish(&mut self) {
        let tail = std::mem::take(&mut self.pending);
        if !tail.is_empty() {
            self.run(&tail);
        }
    }

    fn run(&mut self, html: &str) {
        if let Err(stop) = tokenizer::tokenize(html, self) {
            debug!(position = stop.position, reason = %stop.reason, "feed ended early");
        }
    }

    /// Current stage.
    #[must_use]
    pub fn stage(&self) -> ParseStage {
        self.stage
    }

    /// The row being assembled.
    #[must_use]
    pub fn current_row(&self) -> &ResultRecord {
        &self.current_row
    }

    /// Completed rows in `</tr>` order.
    #[must_use]
    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    /// Finishes any held-back input and returns completed rows.
    #[must_use]
    pub fn into_results(mut self) -> Vec<ResultRecord> {
        self.finish();
        self.results
    }

    fn apply(&mut self, transition: Transition) {
        if transition.stage != self.stage {
            trace!(from = ?self.stage, to = ?transition.stage, "stage change");
        }
        self.stage = transition.stage;
        match transition.action {
            None => {}
            Some(RowAction::Reset) => self.current_row = ResultRecord::new(),
            Some(RowAction::DescLink(href)) => {
                let resolved = resolve_href(&self.base_url, &href);
                self.current_row.set(Field::DescLink, resolved);
            }
            Some(RowAction::Link(href)) => {
                let resolved = resolve_href(&self.base_url, &href);
                self.current_row.set(Field::Link, resolved);
            }
            Some(RowAction::Complete) => {
                self.current_row.set(Field::EngineUrl, self.engine_url.clone());
                self.results.push(std::mem::take(&mut self.current_row));
            }
        }
    }
}

impl TagSink for SearchResultParser {
    fn start_tag(&mut self, tag: &str, attrs: &[TagAttribute]) {
        let transition = self.stage.on_start_tag(tag, attrs);
        self.apply(transition);
    }

    fn end_tag(&mut self, tag: &str) {
        let transition = self.stage.on_end_tag(tag);
        self.apply(transition);
    }

    fn text(&mut self, data: &str) {
        let field = match self.stage {
            ParseStage::DescLinkTag => Field::Name,
            ParseStage::FileSizeTag => Field::Size,
            ParseStage::SeedersTag => Field::Seeds,
            ParseStage::LeechersTag => Field::Leech,
            _ => return,
        };
        self.current_row.set(field, clean_text(data));
    }
}

#[allow(clippy::expect_used)]
fn site_url() -> Url {
    Url::parse(ENGINE_URL).expect("ENGINE_URL is a valid absolute URL")
}
