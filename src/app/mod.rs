mod actions;
mod dispatch;
mod filters;
mod gate;
mod types;

use types::{CaskSource, GateState, Keyword};

use std::time::Duration;

use anyhow::Context;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::brew::{
    BrewClient, BrewOutput, CaskCommand, ProcessRunner, parse_catalog, parse_installed,
};
use crate::error::CaskResult;
use crate::settings::{Settings, SettingsFile};
use crate::store::{Cache, KeyValueStore};
use crate::theme::IconTheme;

pub const ALL_CASKS_KEY: &str = "cask_all_casks";
pub const INSTALLED_CASKS_KEY: &str = "cask_installed_casks";
pub const INSTALLED_FLAG_KEY: &str = "cask_installed";
pub const CONFIGURED_FLAG_KEY: &str = "cask_configured";

/// How long a fetched cask list is served before `brew` is asked again
pub const LIST_MAX_AGE: Duration = Duration::from_secs(3600);

pub struct App<R, S> {
    brew: BrewClient<R>,
    cache: Cache<S>,
    settings_file: SettingsFile,
    settings: Settings,
    theme: IconTheme,
    // `brew cask search` output for this invocation, shared by the gate
    // checks and the catalog
    probe: OnceCell<BrewOutput>,
}

impl<R: ProcessRunner, S: KeyValueStore> App<R, S> {
    pub fn new(
        brew: BrewClient<R>,
        cache: Cache<S>,
        settings_file: SettingsFile,
        theme: IconTheme,
    ) -> CaskResult<Self> {
        let settings = settings_file.load()?;
        Ok(Self {
            brew,
            cache,
            settings_file,
            settings,
            theme,
            probe: OnceCell::new(),
        })
    }

    #[cfg(test)]
    pub fn cache(&self) -> &Cache<S> {
        &self.cache
    }

    #[cfg(test)]
    pub fn brew(&self) -> &BrewClient<R> {
        &self.brew
    }

    async fn probe(&self) -> &BrewOutput {
        self.probe
            .get_or_init(move || async move {
                self.brew
                    .execute(CaskCommand::Search, &self.settings)
                    .await
            })
            .await
    }

    /// Every cask in the catalog, served from cache for up to an hour.
    pub async fn all_casks(&self) -> anyhow::Result<Vec<String>> {
        self.cache
            .cached_lines(ALL_CASKS_KEY, LIST_MAX_AGE, move || async move {
                let stdout = self.probe().await.clone().into_result()?;
                Ok::<_, anyhow::Error>(parse_catalog(&stdout))
            })
            .await
    }

    pub async fn installed_casks(&self) -> anyhow::Result<Vec<String>> {
        self.cache
            .cached_lines(INSTALLED_CASKS_KEY, LIST_MAX_AGE, move || async move {
                let stdout = self
                    .brew
                    .execute(CaskCommand::List, &self.settings)
                    .await
                    .into_result()?;
                Ok::<_, anyhow::Error>(parse_installed(&stdout))
            })
            .await
    }

    pub async fn casks(&self, source: CaskSource) -> anyhow::Result<Vec<String>> {
        match source {
            CaskSource::Catalog => self.all_casks().await,
            CaskSource::Installed => self.installed_casks().await,
        }
    }

    pub async fn alfred_status(&self) -> BrewOutput {
        self.brew
            .execute(CaskCommand::AlfredStatus, &self.settings)
            .await
    }

    /// Writes default settings if needed and opens the file for editing.
    pub async fn edit_settings(&self) -> anyhow::Result<()> {
        self.settings_file
            .ensure_defaults()
            .context("preparing settings file")?;
        let path = self.settings_file.path().to_string_lossy().to_string();
        self.brew.open(&path).await
    }

    /// Fetches whichever cask lists are stale so the next query reads a warm
    /// cache.
    pub async fn refresh_lists(&self) -> anyhow::Result<()> {
        let catalog = self.all_casks().await.context("refreshing cask catalog");
        let installed = self
            .installed_casks()
            .await
            .context("refreshing installed casks");

        match (catalog, installed) {
            (Ok(catalog), Ok(installed)) => {
                info!(
                    catalog = catalog.len(),
                    installed = installed.len(),
                    "cask lists refreshed"
                );
                Ok(())
            }
            (Err(err), _) | (_, Err(err)) => Err(err),
        }
    }

    /// Drops both cask lists so the next query goes back to `brew`.
    pub fn invalidate_lists(&self) -> CaskResult<()> {
        self.cache.delete(ALL_CASKS_KEY)?;
        self.cache.delete(INSTALLED_CASKS_KEY)?;
        info!("cask lists invalidated");
        Ok(())
    }

    fn forget(&self, key: &str) {
        if let Err(err) = self.cache.delete(key) {
            warn!(key, "failed to clear cache entry: {err}");
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;
    use crate::brew::testing::StubRunner;
    use crate::store::{Clock, MemoryStore};

    pub struct Fixture {
        pub app: App<StubRunner, Arc<MemoryStore>>,
        pub store: Arc<MemoryStore>,
        pub data_dir: TempDir,
    }

    pub fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    pub fn fixed_clock(at: DateTime<Utc>) -> Clock {
        Arc::new(move || at)
    }

    pub fn fixture(runner: StubRunner) -> Fixture {
        let store = Arc::new(MemoryStore::default());
        let data_dir = tempfile::tempdir().unwrap();
        let app = app_sharing(runner, &store, &data_dir, fixed_clock(start()));
        Fixture {
            app,
            store,
            data_dir,
        }
    }

    pub fn app_sharing(
        runner: StubRunner,
        store: &Arc<MemoryStore>,
        data_dir: &TempDir,
        clock: Clock,
    ) -> App<StubRunner, Arc<MemoryStore>> {
        App::new(
            BrewClient::new(runner, "brew", None),
            Cache::with_clock(store.clone(), clock),
            SettingsFile::in_dir(data_dir.path()),
            IconTheme::Light,
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::testing::*;
    use super::*;
    use crate::brew::testing::{StubRunner, ok};
    use crate::store::Payload;

    const CATALOG: &str = "==> Casks\nfirefox\nfirefox-nightly\nvlc\n";

    #[tokio::test]
    async fn catalog_is_fetched_once_per_hour() {
        let f = fixture(StubRunner::always(CATALOG));
        assert_eq!(f.app.all_casks().await.unwrap().len(), 3);
        assert_eq!(f.app.brew().runner().call_count(), 1);

        let later = app_sharing(
            StubRunner::always(CATALOG),
            &f.store,
            &f.data_dir,
            fixed_clock(start() + chrono::Duration::seconds(3599)),
        );
        later.all_casks().await.unwrap();
        assert_eq!(later.brew().runner().call_count(), 0);

        let expired = app_sharing(
            StubRunner::always(CATALOG),
            &f.store,
            &f.data_dir,
            fixed_clock(start() + chrono::Duration::seconds(3600)),
        );
        expired.all_casks().await.unwrap();
        assert_eq!(expired.brew().runner().call_count(), 1);
    }

    #[tokio::test]
    async fn failed_listing_is_not_cached() {
        let f = fixture(StubRunner::failing("Error: permission denied"));
        let err = f.app.installed_casks().await.unwrap_err();
        assert_eq!(err.to_string(), "Error: permission denied");
        assert!(!f.store.contains(INSTALLED_CASKS_KEY));
    }

    #[tokio::test]
    async fn refresh_fills_both_lists_and_invalidate_clears_them() {
        let runner = StubRunner::default();
        runner.push(ok(CATALOG));
        runner.push(ok("vlc\n"));
        let f = fixture(runner);

        f.app.refresh_lists().await.unwrap();
        assert_eq!(
            f.app.cache().peek(INSTALLED_CASKS_KEY),
            Some(Payload::Lines(vec!["vlc".to_string()]))
        );
        assert!(f.store.contains(ALL_CASKS_KEY));

        f.app.invalidate_lists().unwrap();
        assert!(!f.store.contains(ALL_CASKS_KEY));
        assert!(!f.store.contains(INSTALLED_CASKS_KEY));
    }

    #[tokio::test]
    async fn settings_flags_reach_brew() {
        let runner = StubRunner::always(CATALOG);
        let store = Arc::new(crate::store::MemoryStore::default());
        let data_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            data_dir.path().join("settings.json"),
            r#"{"HOMEBREW_CASK_OPTS": {"appdir": "/Applications", "caskroom": "/opt/Caskroom"}}"#,
        )
        .unwrap();
        let app = app_sharing(runner, &store, &data_dir, fixed_clock(start()));

        app.all_casks().await.unwrap();
        let calls = app.brew().runner().calls.lock().unwrap();
        assert_eq!(
            calls[0].1,
            vec![
                "cask",
                "search",
                "--appdir=/Applications",
                "--caskroom=/opt/Caskroom"
            ]
        );
    }

    #[tokio::test]
    async fn alfred_status_uses_two_word_subcommand() {
        let f = fixture(StubRunner::always("Alfred search scope includes Caskroom\n"));
        let status = f.app.alfred_status().await;
        assert_eq!(
            status,
            BrewOutput::Ok("Alfred search scope includes Caskroom\n".to_string())
        );
        let calls = f.app.brew().runner().calls.lock().unwrap();
        assert_eq!(calls[0].1, vec!["cask", "alfred", "status"]);
    }

}
