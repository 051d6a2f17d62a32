use std::path::PathBuf;

use crate::cli::Cli;
use crate::error::{CaskError, CaskResult};

pub const DEFAULT_PATH_PREFIX: &str = "/usr/local/bin:/opt/homebrew/bin";

/// Directory name used under the platform cache/data dirs outside Alfred
const APP_DIR: &str = "cask-launcher";

/// Resolved runtime settings for one invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub cache_dir: PathBuf,
    pub data_dir: PathBuf,
    pub brew: String,
    pub path_prefix: Option<String>,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> CaskResult<Self> {
        let cache_dir = match &cli.cache_dir {
            Some(dir) => dir.clone(),
            None => dirs::cache_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(CaskError::MissingDir("cache"))?,
        };
        let data_dir = match &cli.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(CaskError::MissingDir("data"))?,
        };
        let path_prefix = Some(cli.path_prefix.trim())
            .filter(|prefix| !prefix.is_empty())
            .map(str::to_string);

        Ok(Self {
            cache_dir,
            data_dir,
            brew: cli.brew.clone(),
            path_prefix,
        })
    }

    /// Arguments that re-run this binary as the named refresh job with the
    /// same directories and brew setup.
    pub fn refresh_args(&self, job: &str) -> Vec<String> {
        let mut args = vec![
            "--cache-dir".to_string(),
            self.cache_dir.to_string_lossy().to_string(),
            "--data-dir".to_string(),
            self.data_dir.to_string_lossy().to_string(),
            "--brew".to_string(),
            self.brew.clone(),
            "--path-prefix".to_string(),
            self.path_prefix.clone().unwrap_or_default(),
        ];
        args.extend(["refresh".to_string(), "--job".to_string(), job.to_string()]);
        args
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn explicit_dirs_win() {
        let cli = Cli::try_parse_from([
            "cask-launcher",
            "--cache-dir",
            "/tmp/cache",
            "--data-dir",
            "/tmp/data",
            "--path-prefix",
            " ",
        ])
        .unwrap();
        let config = Config::from_cli(&cli).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/cache"));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/data"));
        assert_eq!(config.path_prefix, None);
    }

    #[test]
    fn refresh_args_round_trip_through_cli() {
        let config = Config {
            cache_dir: PathBuf::from("/tmp/cache"),
            data_dir: PathBuf::from("/tmp/data"),
            brew: "/opt/homebrew/bin/brew".to_string(),
            path_prefix: Some("/opt/homebrew/bin".to_string()),
        };
        let mut argv = vec!["cask-launcher".to_string()];
        argv.extend(config.refresh_args("cask_refresh"));

        let cli = Cli::try_parse_from(argv).unwrap();
        assert_eq!(Config::from_cli(&cli).unwrap(), config);
        assert!(matches!(
            cli.command,
            Some(crate::cli::Commands::Refresh { ref job }) if job == "cask_refresh"
        ));
    }
}
