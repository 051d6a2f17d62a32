use tracing::debug;

use super::actions::{ACTIONS, Action};
use super::filters::{filter_actions, filter_lines};
use super::*;
use crate::brew::{CaskVerb, cask_name};
use crate::feedback::{Feedback, Item};

impl<R: ProcessRunner, S: KeyValueStore> App<R, S> {
    /// Builds the full response for one keystroke.
    pub async fn respond(&self, query: &str) -> Feedback {
        let mut feedback = Feedback::default();
        let state = self.gate_state().await;
        debug!(state = state.label(), query, "responding");

        match state {
            GateState::NotInstalled => self.render_not_installed(&mut feedback),
            GateState::NotConfigured => self.render_not_configured(query, &mut feedback).await,
            GateState::Ready => self.dispatch(query, &mut feedback).await,
        }
        feedback
    }

    async fn dispatch(&self, query: &str, feedback: &mut Feedback) {
        match Keyword::detect(query) {
            Some(Keyword::Config) => self.render_settings_opened(feedback).await,
            Some(keyword) => {
                if let Some((source, verb)) = keyword.listing() {
                    self.render_casks(query, source, verb, feedback).await;
                }
            }
            None => self.render_actions(query, feedback),
        }

        if feedback.is_empty() && !query.is_empty() {
            let (keyword, remainder) = split_keyword(query);
            feedback.push(
                Item::new(format!("No cask found for \"{remainder}\""))
                    .autocomplete(format!("{keyword} "))
                    .icon(self.theme.icon("info")),
            );
        }
    }

    async fn render_casks(
        &self,
        query: &str,
        source: CaskSource,
        verb: CaskVerb,
        feedback: &mut Feedback,
    ) {
        let casks = match self.casks(source).await {
            Ok(casks) => casks,
            Err(err) => {
                feedback.push(self.error_item(&err));
                return;
            }
        };

        for record in filter_lines(casks, query) {
            let command = verb.shell_command(cask_name(&record));
            feedback.push(
                Item::new(record)
                    .subtitle(verb.subtitle())
                    .arg(command)
                    .icon(self.theme.icon("package")),
            );
        }
    }

    async fn render_settings_opened(&self, feedback: &mut Feedback) {
        match self.edit_settings().await {
            Ok(()) => feedback.push(
                Item::new("`settings.json` has been opened.")
                    .autocomplete("")
                    .icon(self.theme.icon("info")),
            ),
            Err(err) => feedback.push(self.error_item(&err)),
        }
    }

    fn render_actions(&self, query: &str, feedback: &mut Feedback) {
        let actions = filter_actions(ACTIONS, query);
        if actions.is_empty() {
            feedback.push(
                Item::new(format!("No action found for \"{query}\""))
                    .autocomplete(format!("{query} "))
                    .icon(self.theme.icon("info")),
            );
            return;
        }

        for action in actions {
            feedback.push(self.action_item(action));
        }
    }

    pub(super) fn action_item(&self, action: &Action) -> Item {
        let mut item = Item::new(action.name)
            .subtitle(action.description)
            .uid(action.name)
            .autocomplete(action.autocomplete);
        if let Some(arg) = action.arg {
            item = item.arg(arg);
        }
        item.valid(action.valid)
            .icon(self.theme.icon("chevron-right"))
    }

    pub(super) fn error_item(&self, err: &anyhow::Error) -> Item {
        let message = format!("{err:#}");
        let message = message.strip_prefix("Error: ").unwrap_or(&message);
        Item::new(format!("Error: {message}"))
            .subtitle("Homebrew Cask reported a problem")
            .icon(self.theme.icon("info"))
    }
}

/// Splits at the first space; without one the whole query is both parts.
fn split_keyword(query: &str) -> (&str, &str) {
    match query.split_once(' ') {
        Some((keyword, remainder)) => (keyword, remainder.trim_start()),
        None => (query, query),
    }
}
