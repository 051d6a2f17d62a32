/// Entry in the top-level menu shown before a keyword is typed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Action {
    pub name: &'static str,
    pub description: &'static str,
    pub autocomplete: &'static str,
    pub arg: Option<&'static str>,
    pub valid: bool,
}

impl Action {
    pub fn search_key(&self) -> String {
        format!("{} {}", self.name, self.description)
    }
}

pub const ACTIONS: &[Action] = &[
    Action {
        name: "install",
        description: "Install new casks",
        autocomplete: "install ",
        arg: None,
        valid: false,
    },
    Action {
        name: "uninstall",
        description: "Uninstall installed casks",
        autocomplete: "uninstall ",
        arg: None,
        valid: false,
    },
    Action {
        name: "search",
        description: "Search casks and open their homepage",
        autocomplete: "search ",
        arg: None,
        valid: false,
    },
    Action {
        name: "home",
        description: "Open the homepage of a cask",
        autocomplete: "home ",
        arg: None,
        valid: false,
    },
    Action {
        name: "list",
        description: "List installed casks",
        autocomplete: "list ",
        arg: None,
        valid: false,
    },
    Action {
        name: "alfred",
        description: "Add the Caskroom to Alfred's search scope",
        autocomplete: "",
        arg: Some("brew cask alfred link"),
        valid: true,
    },
    Action {
        name: "config",
        description: "Open settings to configure appdir and caskroom",
        autocomplete: "config",
        arg: None,
        valid: false,
    },
];

pub fn config_action() -> &'static Action {
    ACTIONS
        .iter()
        .find(|action| action.name == "config")
        .unwrap_or(&ACTIONS[ACTIONS.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_action_autocompletes_to_keyword() {
        let config = config_action();
        assert_eq!(config.name, "config");
        assert_eq!(config.autocomplete, "config");
        assert!(!config.valid);
    }

    #[test]
    fn only_runnable_actions_are_valid() {
        for action in ACTIONS {
            assert_eq!(action.valid, action.arg.is_some(), "{}", action.name);
        }
    }
}
