// src/cli.rs

use std::{convert::Infallible, path::PathBuf};

use clap::Parser;

use crate::{jobs::Job, output::OutputMode};

/// Scrape release notes, documentation versions, proposal statuses and the
/// PDF archive from the Python documentation sites.
#[derive(Parser, Debug)]
#[command(name = "docscrape")]
#[command(author, version, about)]
pub struct Args {
    /// Job to run
    #[arg(value_enum)]
    pub mode: Job,

    /// Output: `pretty` for a console table, `file` for CSV; anything else prints plain lines
    #[arg(short, long, value_parser = parse_output)]
    pub output: Option<OutputMode>,

    /// Empty the HTTP cache before running
    #[arg(short, long)]
    pub clear_cache: bool,

    /// Do not read or write the HTTP cache
    #[arg(long)]
    pub no_cache: bool,

    /// YAML file overriding built-in settings
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_output(s: &str) -> Result<OutputMode, Infallible> {
    Ok(OutputMode::from_arg(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_job() {
        let args = Args::try_parse_from(["docscrape", "latest-versions"]).unwrap();
        assert_eq!(args.mode, Job::LatestVersions);
        assert_eq!(args.output, None);
        assert!(!args.clear_cache);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_all_job_names_accepted() {
        for name in ["whats-new", "latest-versions", "download", "pep"] {
            let args = Args::try_parse_from(["docscrape", name]).unwrap();
            assert_eq!(args.mode.name(), name);
        }
    }

    #[test]
    fn test_unknown_job_rejected() {
        let err = Args::try_parse_from(["docscrape", "crawl"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_output_modes() {
        let args = Args::try_parse_from(["docscrape", "pep", "-o", "pretty"]).unwrap();
        assert_eq!(args.output, Some(OutputMode::Pretty));
        let args = Args::try_parse_from(["docscrape", "pep", "--output", "file"]).unwrap();
        assert_eq!(args.output, Some(OutputMode::File));
        let args = Args::try_parse_from(["docscrape", "pep", "-o", "xml"]).unwrap();
        assert_eq!(args.output, Some(OutputMode::Plain));
    }

    #[test]
    fn test_flags() {
        let args =
            Args::try_parse_from(["docscrape", "whats-new", "-c", "-vv", "--config", "x.yaml"])
                .unwrap();
        assert!(args.clear_cache);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.config, Some(PathBuf::from("x.yaml")));
    }
}
