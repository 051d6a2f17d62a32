use std::fmt;

use tracing::{debug, warn};

use super::process::{CommandResult, ProcessRunner};
use crate::settings::Settings;

/// The `brew cask` subcommands whose output the launcher reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaskCommand {
    Search,
    List,
    AlfredStatus,
}

impl CaskCommand {
    pub fn label(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::List => "list",
            Self::AlfredStatus => "alfred status",
        }
    }

    fn args(self) -> &'static [&'static str] {
        match self {
            Self::Search => &["search"],
            Self::List => &["list"],
            Self::AlfredStatus => &["alfred", "status"],
        }
    }
}

impl fmt::Display for CaskCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Commands handed back to the host for execution when an item is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaskVerb {
    Install,
    Uninstall,
    Home,
}

impl CaskVerb {
    pub fn label(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
            Self::Home => "home",
        }
    }

    pub fn subtitle(self) -> &'static str {
        match self {
            Self::Install => "Install cask",
            Self::Uninstall => "Uninstall cask",
            Self::Home => "Open homepage",
        }
    }

    pub fn shell_command(self, name: &str) -> String {
        format!("brew cask {} {name}", self.label())
    }
}

/// Outcome of one `brew cask` invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BrewOutput {
    Ok(String),
    ExternalError(String),
    NotConfigured,
}

impl BrewOutput {
    pub fn classify(command: CaskCommand, result: CommandResult) -> Self {
        let stderr = result.stderr.trim();
        if !stderr.is_empty() {
            return Self::ExternalError(stderr.to_string());
        }
        if !result.success {
            let status = result
                .code
                .map(|code| code.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Self::ExternalError(format!("brew cask {command} exited with status {status}"));
        }
        // brew cask prints sudo hints when it cannot write to the target dirs
        if result.stdout.contains("sudo") {
            return Self::NotConfigured;
        }
        Self::Ok(result.stdout)
    }

    pub fn into_result(self) -> anyhow::Result<String> {
        match self {
            Self::Ok(stdout) => Ok(stdout),
            Self::ExternalError(message) => Err(anyhow::anyhow!(message)),
            Self::NotConfigured => Err(anyhow::anyhow!("Homebrew Cask is not configured")),
        }
    }
}

impl fmt::Display for BrewOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok(stdout) => write!(f, "{stdout}"),
            Self::ExternalError(message) => write!(f, "Error: {message}"),
            Self::NotConfigured => write!(f, "Config"),
        }
    }
}

pub struct BrewClient<R> {
    runner: R,
    binary: String,
    path_prefix: Option<String>,
}

impl<R: ProcessRunner> BrewClient<R> {
    pub fn new(runner: R, binary: impl Into<String>, path_prefix: Option<String>) -> Self {
        Self {
            runner,
            binary: binary.into(),
            path_prefix,
        }
    }

    #[cfg(test)]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn command_line(command: CaskCommand, settings: &Settings) -> Vec<String> {
        let mut args = vec!["cask".to_string()];
        args.extend(command.args().iter().map(|arg| (*arg).to_string()));
        args.extend(settings.cask_flags());
        args
    }

    pub async fn execute(&self, command: CaskCommand, settings: &Settings) -> BrewOutput {
        let args = Self::command_line(command, settings);
        match self
            .runner
            .run(&self.binary, &args, self.path_prefix.as_deref())
            .await
        {
            Ok(result) => {
                let output = BrewOutput::classify(command, result);
                if !matches!(output, BrewOutput::Ok(_)) {
                    debug!(%command, outcome = %output, "brew cask did not succeed");
                }
                output
            }
            Err(err) => {
                warn!(%command, binary = %self.binary, "failed to run brew: {err}");
                BrewOutput::ExternalError(err.to_string())
            }
        }
    }

    /// Opens `target` with the macOS `open` command.
    pub async fn open(&self, target: &str) -> anyhow::Result<()> {
        let result = self
            .runner
            .run("open", &[target.to_string()], self.path_prefix.as_deref())
            .await?;
        if result.success {
            return Ok(());
        }
        let stderr = result.stderr.trim();
        let message = if stderr.is_empty() {
            format!("open {target} failed")
        } else {
            stderr.to_string()
        };
        Err(anyhow::anyhow!(message))
    }
}
