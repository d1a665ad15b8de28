use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the flowguard binary.
#[derive(Parser, Debug)]
#[command(
    name = "flowguard",
    version,
    about = "Check runtime values against structural type descriptors and dispatch overloads"
)]
pub struct CliArgs {
    /// JSON document with classes, aliases, candidate signatures, calls and checks.
    pub input: PathBuf,

    /// Report format written to stdout.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text, ignore_case = true)]
    pub format: ReportFormat,

    /// Print the candidates in the order they are tried.
    #[arg(long = "showRanking", alias = "show-ranking")]
    pub show_ranking: bool,

    /// Only report the first violation of each failed check.
    #[arg(long)]
    pub first_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}
