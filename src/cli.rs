use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show failures
    Quiet,
    /// Show standard information
    #[default]
    Normal,
    /// Show every record and failure detail
    Verbose,
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Human,
    /// Machine-readable JSON document
    Json,
    /// Counts only
    Summary,
}

/// Validate a catalog of book records
#[derive(Parser, Debug, Clone)]
#[command(name = "validate-books")]
#[command(about = "Validate book records against the catalog schema, including ISBN-10 checksums")]
#[command(version)]
pub struct Cli {
    /// JSON file containing an array of book records
    #[arg(help = "Catalog file to validate [default: data.json]")]
    pub path: Option<PathBuf>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(short = 'f', long = "format", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Only show these fields of each book
    #[arg(long = "include", action = clap::ArgAction::Append, value_name = "FIELD")]
    pub include_fields: Vec<String>,

    /// Hide these fields of each book
    #[arg(
        long = "exclude",
        action = clap::ArgAction::Append,
        value_name = "FIELD",
        conflicts_with = "include_fields"
    )]
    pub exclude_fields: Vec<String>,

    /// Stop at the first invalid record
    #[arg(long = "fail-fast")]
    pub fail_fast: bool,

    /// Validate records on all cores (report order is unchanged)
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (failures only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_basic_cli_parsing() {
        let cli = Cli::try_parse_from(["validate-books", "books.json"]).unwrap();
        assert_eq!(cli.path, Some(PathBuf::from("books.json")));
        assert_eq!(cli.output_format, None);
        assert!(!cli.fail_fast);
        assert_eq!(cli.verbosity(), VerbosityLevel::Normal);
    }

    #[test]
    fn test_path_is_optional() {
        let cli = Cli::try_parse_from(["validate-books"]).unwrap();
        assert_eq!(cli.path, None);
    }

    #[test]
    fn test_projection_flags() {
        let cli = Cli::try_parse_from([
            "validate-books",
            "--include",
            "title",
            "--include",
            "author",
        ])
        .unwrap();
        assert_eq!(cli.include_fields, vec!["title", "author"]);

        let result = Cli::try_parse_from([
            "validate-books",
            "--include",
            "title",
            "--exclude",
            "author",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_format_and_flags() {
        let cli = Cli::try_parse_from([
            "validate-books",
            "--format",
            "json",
            "--fail-fast",
            "--parallel",
            "-q",
        ])
        .unwrap();
        assert_eq!(cli.output_format, Some(OutputFormat::Json));
        assert!(cli.fail_fast);
        assert!(cli.parallel);
        assert_eq!(cli.verbosity(), VerbosityLevel::Quiet);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["validate-books", "-v", "-q"]).is_err());
    }
}
