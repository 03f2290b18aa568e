//! CLI module for travel-rag.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{format_file_size, Output};

use crate::rag::QueryMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// travel-rag - Travel planner knowledge base
///
/// Turns place records into documents, loads them into a RAG knowledge base
/// backed by PostgreSQL + pgvector, and answers questions against it.
#[derive(Parser, Debug)]
#[command(name = "travel-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a JSON array of places into JSONL documents
    Convert {
        /// Input JSON file (array of place objects)
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSONL file (default: input with .jsonl extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export places from PostgreSQL into JSONL documents
    Export {
        /// Only export places in this city (exact match)
        #[arg(long)]
        city: Option<String>,

        /// Maximum number of places to export
        #[arg(long)]
        limit: Option<usize>,

        /// Output JSONL file
        #[arg(short, long, default_value = "data/places_export.jsonl")]
        output: PathBuf,

        /// Minimum rating
        #[arg(long, default_value_t = 3.0)]
        min_rating: f64,

        /// Minimum number of reviews
        #[arg(long, default_value_t = 10)]
        min_reviews: i64,

        /// Records written between flushes
        #[arg(long, default_value_t = 100)]
        batch_size: usize,
    },

    /// Import JSONL documents into the knowledge base
    Import {
        /// Input JSONL file
        #[arg(short, long, default_value = "data/places_export.jsonl")]
        input: PathBuf,

        /// Maximum number of documents to import (0 for all)
        #[arg(long)]
        limit: Option<usize>,

        /// Knowledge base working directory [default: ./travel_rag]
        #[arg(long)]
        working_dir: Option<PathBuf>,

        /// Store vectors in PostgreSQL (false keeps them in the working directory)
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        use_postgres: bool,
    },

    /// Ask the knowledge base a question
    Query {
        /// The question to ask
        #[arg(short, long)]
        query: String,

        /// Retrieval mode
        #[arg(short, long, value_enum, default_value_t = QueryMode::Mix)]
        mode: QueryMode,

        /// Query vectors stored in the working directory instead of PostgreSQL
        #[arg(long)]
        local: bool,
    },

    /// Check configuration and connectivity
    Doctor,
}

impl Commands {
    /// Whether the command keeps the console quiet unless `-v` is given.
    pub fn quiet_by_default(&self) -> bool {
        matches!(self, Commands::Query { .. })
    }
}
