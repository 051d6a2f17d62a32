use anyhow::Context;
use tracing::{debug, warn};

use super::background::{BackgroundJobs, REFRESH_JOB};
use crate::app::App;
use crate::brew::{BrewClient, BrewOutput, TokioRunner};
use crate::config::Config;
use crate::feedback::{Feedback, Item};
use crate::settings::SettingsFile;
use crate::store::{Cache, FileStore};
use crate::theme::detect_icon_theme;

type LiveApp = App<TokioRunner, FileStore>;

fn build_app(config: &Config) -> anyhow::Result<LiveApp> {
    let brew = BrewClient::new(TokioRunner, config.brew.clone(), config.path_prefix.clone());
    let cache = Cache::new(FileStore::new(&config.cache_dir));
    let settings = SettingsFile::in_dir(&config.data_dir);
    App::new(brew, cache, settings, detect_icon_theme()).context("loading workflow settings")
}

/// Answers one keystroke, then kicks off the background refresh.
pub async fn filter(config: &Config, query: &str, refresh: bool) -> anyhow::Result<()> {
    let feedback = match build_app(config) {
        Ok(app) => app.respond(query).await,
        Err(err) => {
            warn!("{err:#}");
            let mut feedback = Feedback::default();
            feedback.push(Item::new(format!("Error: {err:#}")).subtitle("Check settings.json"));
            feedback
        }
    };
    println!("{}", feedback.to_json()?);

    if refresh {
        start_refresh(config);
    }
    Ok(())
}

fn start_refresh(config: &Config) {
    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(err) => {
            warn!("cannot locate own executable for refresh: {err}");
            return;
        }
    };
    let jobs = BackgroundJobs::new(&config.cache_dir);
    match jobs.spawn(REFRESH_JOB, &exe, &config.refresh_args(REFRESH_JOB)) {
        Ok(true) => {}
        Ok(false) => debug!("refresh already in progress"),
        Err(err) => warn!("failed to start refresh: {err}"),
    }
}

/// Body of the background job.
pub async fn refresh(config: &Config, job: &str) -> anyhow::Result<()> {
    let jobs = BackgroundJobs::new(&config.cache_dir);
    if !jobs.claim(job)? {
        debug!(job, "another refresh holds the job");
        return Ok(());
    }

    let result = match build_app(config) {
        Ok(app) => app.refresh_lists().await,
        Err(err) => Err(err),
    };
    jobs.finish(job, std::process::id());
    result
}

pub fn invalidate(config: &Config) -> anyhow::Result<()> {
    let jobs = BackgroundJobs::new(&config.cache_dir);
    if jobs.cancel(REFRESH_JOB)? {
        println!("Stopped running refresh");
    }
    build_app(config)?.invalidate_lists()?;
    println!("Cask lists cleared");
    Ok(())
}

pub async fn status(config: &Config) -> anyhow::Result<()> {
    let app = build_app(config)?;
    let state = app.gate_state().await;
    println!("Homebrew Cask: {}", state.label());

    match app.alfred_status().await {
        BrewOutput::Ok(stdout) => print!("{stdout}"),
        other => println!("{other}"),
    }

    let jobs = BackgroundJobs::new(&config.cache_dir);
    match jobs.running_pid(REFRESH_JOB) {
        Some(pid) => println!("Refresh: running (pid {pid})"),
        None => println!("Refresh: idle"),
    }
    Ok(())
}
