use clap::Parser;
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Names beyond this many on the command line should go in a file instead
pub const MAX_TERMINAL_NAMES: usize = 20;

#[derive(Parser, Debug)]
#[command(name = "domainfinder")]
#[command(about = "Find the official web domain of companies from their names")]
#[command(version)]
pub struct Cli {
    /// Company names to resolve (up to 20; use --file for more)
    #[arg(value_name = "NAMES")]
    pub names: Vec<String>,

    /// Read company names from a file, one per line, optionally followed by
    /// comma-separated categories for that company. Quote names that contain
    /// a comma ("Acme, Inc."), otherwise the rest is read as categories.
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Categories the company is expected to belong to (e.g. -c software,cloud
    /// or -c software -c cloud)
    #[arg(
        short,
        long = "category",
        value_name = "CATEGORY",
        action = clap::ArgAction::Append,
        value_delimiter = ','
    )]
    pub categories: Vec<String>,

    /// Verbose logging (-v summary, -vv warnings, -vvv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file (defaults to ./config/domainfinder.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Create default configuration file and exit
    #[arg(long)]
    pub init: bool,

    /// Result output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write a JSON summary of the run to this file
    #[arg(long, value_name = "FILE")]
    pub summary: Option<PathBuf>,

    /// Export execution logs to a file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn has_too_many_names(&self) -> bool {
        self.names.len() > MAX_TERMINAL_NAMES
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.init && self.names.is_empty() && self.file.is_none() {
            return Err("At least one company name or --file is required".to_string());
        }
        Ok(())
    }

    /// Number of queries known before the run starts; unknown with a file
    pub fn known_query_count(&self) -> Option<u64> {
        match self.file {
            Some(_) => None,
            None => Some(self.names.len() as u64),
        }
    }
}

pub fn suggest_file_input() -> String {
    format!(
        "You have entered more than {} names to fetch the domain names for. \
         Please consider passing a file with inputs as an argument.\n\
         domainfinder -f <file_path> will yield the domains of the companies.",
        MAX_TERMINAL_NAMES
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_categories() {
        let cli = Cli::try_parse_from(["domainfinder", "Microsoft", "Guru Tech", "-c", "software,cloud"]).unwrap();
        assert_eq!(cli.names, vec!["Microsoft", "Guru Tech"]);
        assert_eq!(cli.categories, vec!["software", "cloud"]);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.validate().is_ok());
        assert_eq!(cli.known_query_count(), Some(2));
    }

    #[test]
    fn test_category_flag_takes_one_value_per_occurrence() {
        let cli = Cli::try_parse_from(["domainfinder", "-c", "web", "Microsoft", "-c", "cloud", "Guru Tech"]).unwrap();
        assert_eq!(cli.names, vec!["Microsoft", "Guru Tech"]);
        assert_eq!(cli.categories, vec!["web", "cloud"]);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_parse_file_and_options() {
        let cli = Cli::try_parse_from([
            "domainfinder",
            "-f",
            "companies.csv",
            "--format",
            "json",
            "-vv",
            "--summary",
            "out.json",
        ])
        .unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("companies.csv")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.known_query_count(), None);
    }

    #[test]
    fn test_requires_names_or_file() {
        let cli = Cli::try_parse_from(["domainfinder"]).unwrap();
        assert!(cli.validate().is_err());

        let cli = Cli::try_parse_from(["domainfinder", "--init"]).unwrap();
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_too_many_names() {
        let mut args = vec!["domainfinder".to_string()];
        args.extend((0..=MAX_TERMINAL_NAMES).map(|i| format!("company{}", i)));
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.has_too_many_names());
        assert!(suggest_file_input().starts_with("You have entered more than 20 names"));
    }
}
