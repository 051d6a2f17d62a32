use super::process::nonempty_lines;

/// Catalog lines from `brew cask search`; the first line is a header.
pub fn parse_catalog(stdout: &str) -> Vec<String> {
    let body = stdout.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
    nonempty_lines(body)
}

/// Installed casks from `brew cask list`, one per line.
pub fn parse_installed(stdout: &str) -> Vec<String> {
    nonempty_lines(stdout)
}

/// The cask token of a record: everything before the first whitespace.
pub fn cask_name(record: &str) -> &str {
    record.split_whitespace().next().unwrap_or("")
}
