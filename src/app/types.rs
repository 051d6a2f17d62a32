use crate::brew::CaskVerb;

/// Where the local Homebrew Cask setup stands, checked in declaration order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GateState {
    NotInstalled,
    NotConfigured,
    Ready,
}

impl GateState {
    pub fn label(self) -> &'static str {
        match self {
            Self::NotInstalled => "not installed",
            Self::NotConfigured => "not configured",
            Self::Ready => "ready",
        }
    }
}

/// Which list a keyword browses.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CaskSource {
    Catalog,
    Installed,
}

/// Leading query keyword, matched as a case-sensitive prefix.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Keyword {
    Install,
    Search,
    Home,
    Uninstall,
    List,
    Config,
}

impl Keyword {
    const ORDERED: [(&'static str, Keyword); 6] = [
        ("install", Keyword::Install),
        ("search", Keyword::Search),
        ("home", Keyword::Home),
        ("uninstall", Keyword::Uninstall),
        ("list", Keyword::List),
        ("config", Keyword::Config),
    ];

    pub fn detect(query: &str) -> Option<Self> {
        Self::ORDERED
            .iter()
            .find(|(prefix, _)| query.starts_with(prefix))
            .map(|(_, keyword)| *keyword)
    }

    /// The list to browse and the command attached to each row; `None` for
    /// keywords that don't list casks.
    pub fn listing(self) -> Option<(CaskSource, CaskVerb)> {
        match self {
            Self::Install => Some((CaskSource::Catalog, CaskVerb::Install)),
            Self::Search | Self::Home => Some((CaskSource::Catalog, CaskVerb::Home)),
            Self::Uninstall => Some((CaskSource::Installed, CaskVerb::Uninstall)),
            Self::List => Some((CaskSource::Installed, CaskVerb::Home)),
            Self::Config => None,
        }
    }
}
