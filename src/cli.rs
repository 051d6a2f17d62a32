//! CLI argument definitions using clap derive

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::config::DEFAULT_PATH_PREFIX;
use crate::runtime::background::REFRESH_JOB;

/// Alfred script filter for Homebrew Cask
///
/// Prints matching casks as Alfred JSON and keeps the cask lists cached in
/// the background.
#[derive(Parser, Debug)]
#[command(name = "cask-launcher")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Directory for cached cask lists and job pid files
    #[arg(long, global = true, env = "alfred_workflow_cache")]
    pub cache_dir: Option<PathBuf>,

    /// Directory holding settings.json
    #[arg(long, global = true, env = "alfred_workflow_data")]
    pub data_dir: Option<PathBuf>,

    /// Homebrew executable
    #[arg(long, global = true, env = "CASK_BREW", default_value = "brew")]
    pub brew: String,

    /// Prepended to PATH when running brew
    #[arg(long, global = true, env = "CASK_PATH_PREFIX", default_value = DEFAULT_PATH_PREFIX)]
    pub path_prefix: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print script filter items for a query (default)
    Filter(FilterArgs),

    /// Re-fetch stale cask lists into the cache
    Refresh {
        /// Job name whose pid file is released when done
        #[arg(long, default_value = REFRESH_JOB)]
        job: String,
    },

    /// Drop cached cask lists and stop a running refresh
    Invalidate,

    /// Show whether Homebrew Cask is installed and configured
    Status,
}

#[derive(Parser, Debug, Default)]
pub struct FilterArgs {
    /// Text typed after the workflow keyword
    #[arg(allow_hyphen_values = true)]
    pub query: Option<String>,

    /// Don't start the background refresh after responding
    #[arg(long)]
    pub no_refresh: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_has_no_subcommand() {
        let cli = Cli::try_parse_from(["cask-launcher"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.brew, "brew");
    }

    #[test]
    fn filter_keeps_query_verbatim() {
        let cli = Cli::try_parse_from(["cask-launcher", "filter", "install fire"]).unwrap();
        match cli.command {
            Some(Commands::Filter(args)) => {
                assert_eq!(args.query.as_deref(), Some("install fire"));
                assert!(!args.no_refresh);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn refresh_defaults_to_refresh_job() {
        let cli = Cli::try_parse_from(["cask-launcher", "--cache-dir", "/tmp/c", "refresh"]).unwrap();
        assert_eq!(cli.cache_dir, Some(PathBuf::from("/tmp/c")));
        match cli.command {
            Some(Commands::Refresh { job }) => assert_eq!(job, REFRESH_JOB),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
