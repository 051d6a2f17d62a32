//! Persisted workflow settings (`settings.json` in the workflow data dir).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CaskError, CaskResult};

pub const SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_APPDIR: &str = "/Applications";
pub const DEFAULT_CASKROOM: &str = "/usr/local/Caskroom";

/// Install locations forwarded to `brew cask` as `--appdir`/`--caskroom`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaskOpts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appdir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caskroom: Option<String>,
}

impl CaskOpts {
    pub fn defaults() -> Self {
        Self {
            appdir: Some(DEFAULT_APPDIR.to_string()),
            caskroom: Some(DEFAULT_CASKROOM.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.appdir.is_none() && self.caskroom.is_none()
    }

    /// Extra flags for `brew cask`; empty unless both locations are set.
    pub fn flags(&self) -> Vec<String> {
        match (&self.appdir, &self.caskroom) {
            (Some(appdir), Some(caskroom)) => vec![
                format!("--appdir={appdir}"),
                format!("--caskroom={caskroom}"),
            ],
            _ => Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(
        rename = "HOMEBREW_CASK_OPTS",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cask_opts: Option<CaskOpts>,

    /// Keys written by the host or by hand that we don't interpret.
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl Settings {
    pub fn cask_flags(&self) -> Vec<String> {
        self.cask_opts
            .as_ref()
            .map(CaskOpts::flags)
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SETTINGS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> CaskResult<Settings> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no settings file, using empty settings");
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| CaskError::io(format!("reading {}", self.path.display()), e))?;
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }
        serde_json::from_str(&content).map_err(|e| CaskError::json(&self.path, e))
    }

    pub fn save(&self, settings: &Settings) -> CaskResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CaskError::io(format!("creating {}", parent.display()), e))?;
        }
        let content =
            serde_json::to_string_pretty(settings).map_err(|e| CaskError::json(&self.path, e))?;
        std::fs::write(&self.path, content)
            .map_err(|e| CaskError::io(format!("writing {}", self.path.display()), e))
    }

    /// Writes default cask locations if the file or the key is missing, or
    /// the key holds no locations. Returns `true` when defaults were written.
    pub fn ensure_defaults(&self) -> CaskResult<bool> {
        let mut settings = self.load()?;
        let has_opts = settings
            .cask_opts
            .as_ref()
            .is_some_and(|opts| !opts.is_empty());
        if self.path.exists() && has_opts {
            return Ok(false);
        }

        settings.cask_opts = Some(CaskOpts::defaults());
        self.save(&settings)?;
        info!(path = %self.path.display(), "wrote default cask settings");
        Ok(true)
    }
}
