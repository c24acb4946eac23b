// copyguard/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "copyguard")]
#[command(about = "Quality gate for AI-generated product copy", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Generates, validates and scores copy for every product record
    Run {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Product records: a JSON/YAML file or a directory of them (relative to project)
        #[arg(long, default_value = "products")]
        records: PathBuf,

        /// Results file (defaults to `output_path` from copyguard.yaml)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// 🔎 Validates one piece of generated copy against the rules
    Validate {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// File holding the product record
        #[arg(long)]
        record: PathBuf,

        /// Generated copy (JSON, optionally fenced as the model returned it)
        #[arg(long)]
        content: PathBuf,

        /// Also apply deterministic corrections and show the result
        #[arg(long)]
        fix: bool,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// 📊 Scores one piece of generated copy (after correction)
    Score {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[arg(long)]
        record: PathBuf,

        #[arg(long)]
        content: PathBuf,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// 🧾 Prints the facts extracted from product records
    Facts {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[arg(long, default_value = "products")]
        records: PathBuf,
    },
}
