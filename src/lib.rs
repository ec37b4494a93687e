//! TorrentBD search and download adapter.
//!
//! Signs in to the tracker, runs searches and turns the returned HTML table
//! into result records, and saves torrent files to disk.
//!
//! # Architecture
//!
//! - [`parser`] - Incremental search-result parser (tag stream, stage machine, row collector)
//! - [`adapter`] - Sign-in, search and download flows
//! - [`session`] - Cookie-carrying HTTP session
//! - [`settings`] - Credentials and search filters from JSON
//! - [`categories`] - Category names and their site filter codes
//! - [`output`] - Result sinks and the pipe-separated line format

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod adapter;
pub mod categories;
pub mod error;
pub mod output;
pub mod parser;
pub mod session;
pub mod settings;

// Re-export commonly used types
pub use adapter::{DownloadedTorrent, ENGINE_NAME, SearchFlags, TorrentBd};
pub use categories::{SUPPORTED_CATEGORIES, category_codes, supported_categories};
pub use error::AdapterError;
pub use output::{PrettyPrinter, ResultSink, VecSink, format_result_line, size_to_bytes};
pub use parser::{Field, ParseStage, ResultRecord, SearchResultParser};
pub use session::Session;
pub use settings::{Settings, load_settings};
