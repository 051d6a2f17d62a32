/// Icon variant matching the host's result-list background.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum IconTheme {
    #[default]
    Light,
    Dark,
}

impl IconTheme {
    /// Path of a bundled icon, relative to the workflow directory.
    pub fn icon(self, name: &str) -> String {
        match self {
            Self::Light => format!("icons/{name}.png"),
            Self::Dark => format!("icons/{name}-dark.png"),
        }
    }
}

pub fn detect_icon_theme() -> IconTheme {
    // Alfred exports the theme background as "rgba(r,g,b,a)"
    std::env::var("alfred_theme_background")
        .ok()
        .and_then(|background| theme_for_background(&background))
        .unwrap_or_default()
}

pub fn theme_for_background(background: &str) -> Option<IconTheme> {
    let inner = background
        .trim()
        .strip_prefix("rgba(")
        .or_else(|| background.trim().strip_prefix("rgb("))?
        .strip_suffix(')')?;

    let mut channels = inner.split(',').map(|part| part.trim().parse::<f64>());
    let r = channels.next()?.ok()?;
    let g = channels.next()?.ok()?;
    let b = channels.next()?.ok()?;

    let luminance = (0.299 * r + 0.587 * g + 0.114 * b) / 255.0;
    if luminance < 0.5 {
        Some(IconTheme::Dark)
    } else {
        Some(IconTheme::Light)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_backgrounds_pick_dark_icons() {
        assert_eq!(
            theme_for_background("rgba(40,40,40,0.95)"),
            Some(IconTheme::Dark)
        );
        assert_eq!(
            theme_for_background("rgba(255, 255, 255, 1.00)"),
            Some(IconTheme::Light)
        );
    }

    #[test]
    fn unparsable_background_is_ignored() {
        assert_eq!(theme_for_background("transparent"), None);
        assert_eq!(theme_for_background("rgba(1,2)"), None);
    }

    #[test]
    fn icon_paths_follow_theme() {
        assert_eq!(IconTheme::Light.icon("package"), "icons/package.png");
        assert_eq!(IconTheme::Dark.icon("info"), "icons/info-dark.png");
    }
}
