use clap::Subcommand;
use std::path::PathBuf;

pub mod convert;
pub mod info;
pub mod search;
pub mod verify;

#[derive(Subcommand)]
pub enum Commands {
    /// Convert between .bmg and decoded .txt
    Convert {
        /// Source file
        source: PathBuf,

        /// Destination file
        destination: PathBuf,

        /// Input format: bmg, mesg or txt (auto-detected from extension if not specified)
        #[arg(short = 'i', long)]
        input_format: Option<String>,

        /// Output format: bmg, mesg or txt (auto-detected from extension if not specified)
        #[arg(short = 'o', long)]
        output_format: Option<String>,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show header fields and the section table of a .bmg file
    Info {
        /// BMG file
        path: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search message text in a .bmg or decoded .txt file
    Search {
        /// BMG or decoded text file
        path: PathBuf,

        /// Text to search for (case-insensitive)
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "50")]
        limit: usize,

        /// Only print matching ids
        #[arg(short, long)]
        quiet: bool,
    },

    /// Check that a .bmg file survives a read/write round trip
    Verify {
        /// BMG file
        path: PathBuf,
    },
}

impl Commands {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Convert {
                source,
                destination,
                input_format,
                output_format,
                quiet,
            } => convert::execute(
                source,
                destination,
                input_format.as_deref(),
                output_format.as_deref(),
                *quiet,
            ),
            Commands::Info { path, json } => info::execute(path, *json),
            Commands::Search {
                path,
                query,
                limit,
                quiet,
            } => search::execute(path, query, *limit, *quiet),
            Commands::Verify { path } => verify::execute(path),
        }
    }
}
