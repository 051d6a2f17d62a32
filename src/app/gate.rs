use std::time::Duration;

use tracing::debug;

use super::actions::config_action;
use super::*;
use crate::feedback::{Feedback, Item};

const CASK_HOMEPAGE: &str = "open http://caskroom.io/ && exit";
const INSTALL_CASK: &str = "brew install caskroom/cask/brew-cask";
const OPEN_HELP: &str = "open https://github.com/fniephaus/alfred-homebrew && exit";
const CASK_ICON: &str = "cask.png";

impl<R: ProcessRunner, S: KeyValueStore> App<R, S> {
    /// Installation is checked before configuration; the configuration
    /// check never runs when cask is missing. A negative flag is dropped
    /// right away so the next call checks again.
    pub async fn gate_state(&self) -> GateState {
        let installed = self
            .cache
            .cached_flag(INSTALLED_FLAG_KEY, Duration::ZERO, move || async move {
                !matches!(self.probe().await, BrewOutput::ExternalError(_))
            })
            .await;
        if !installed {
            self.forget(INSTALLED_FLAG_KEY);
            return GateState::NotInstalled;
        }

        let configured = self
            .cache
            .cached_flag(CONFIGURED_FLAG_KEY, Duration::ZERO, move || async move {
                !matches!(self.probe().await, BrewOutput::NotConfigured)
            })
            .await;
        if !configured {
            self.forget(CONFIGURED_FLAG_KEY);
            return GateState::NotConfigured;
        }

        GateState::Ready
    }

    pub(super) fn render_not_installed(&self, feedback: &mut Feedback) {
        feedback.push(
            Item::new("Cask does not seem to be installed!")
                .subtitle("Hit enter to see what you need to do...")
                .arg(CASK_HOMEPAGE)
                .icon(CASK_ICON),
        );
        feedback.push(
            Item::new("I trust this workflow")
                .subtitle(format!(
                    "Hit enter to run `{INSTALL_CASK}` to install cask..."
                ))
                .arg(INSTALL_CASK)
                .icon(CASK_ICON),
        );
    }

    pub(super) async fn render_not_configured(&self, query: &str, feedback: &mut Feedback) {
        feedback.push(
            Item::new("Cask does not seem to be properly configured!")
                .subtitle("Hit enter to see what you need to do...")
                .arg(OPEN_HELP)
                .icon(CASK_ICON),
        );
        feedback.push(self.action_item(config_action()));

        if query.starts_with("config") {
            debug!("opening settings from the configuration gate");
            if let Err(err) = self.edit_settings().await {
                feedback.push(self.error_item(&err));
            }
        }
    }
}
