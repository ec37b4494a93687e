//! CLI argument definitions using clap derive macros.

use clap::{Parser, Subcommand};

/// Search and download torrents from TorrentBD.
///
/// Search results are printed to stdout, one per line, as
/// `link|name|size|seeds|leech|engine_url[|desc_link]`.
#[derive(Parser, Debug)]
#[command(name = "torrentbd")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Settings as a JSON object; overrides any settings file
    #[arg(short, long, global = true, value_name = "JSON")]
    pub settings: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Search the tracker and print results
    Search {
        /// Search term, optionally percent-encoded
        what: String,

        /// Category to search in
        #[arg(short, long, default_value = "all")]
        category: String,
    },

    /// Download a torrent file and print "path url"
    Download {
        /// Torrent download URL
        url: String,
    },

    /// List supported categories
    Capabilities,

    /// Print the loaded settings with the password redacted
    Settings,
}
