use super::actions::Action;

/// The text a keyword query filters on: its second whitespace token.
pub fn filter_token(query: &str) -> Option<&str> {
    query.split_whitespace().nth(1)
}

pub fn filter_lines(lines: Vec<String>, query: &str) -> Vec<String> {
    let Some(token) = filter_token(query) else {
        return lines;
    };
    let matcher = QueryMatcher::new(token);
    lines
        .into_iter()
        .filter(|line| matcher.matches(line))
        .collect()
}

pub fn filter_actions<'a>(actions: &'a [Action], query: &str) -> Vec<&'a Action> {
    let matcher = QueryMatcher::new(query);
    actions
        .iter()
        .filter(|action| matcher.matches(&action.search_key()))
        .collect()
}

/// Case-insensitive substring matcher; ASCII input skips the lowercase copy.
struct QueryMatcher<'a> {
    query: &'a str,
    query_lower: Option<String>,
    query_is_ascii: bool,
}

impl<'a> QueryMatcher<'a> {
    fn new(query: &'a str) -> Self {
        let query = query.trim();
        let query_is_ascii = query.is_ascii();
        let query_lower = (!query_is_ascii && !query.is_empty()).then(|| query.to_lowercase());
        Self {
            query,
            query_lower,
            query_is_ascii,
        }
    }

    fn matches(&self, item: &str) -> bool {
        if self.query.is_empty() {
            return true;
        }
        item_matches_query(
            item,
            self.query,
            self.query_lower.as_deref(),
            self.query_is_ascii,
        )
    }
}

fn item_matches_query(
    item: &str,
    query: &str,
    query_lower: Option<&str>,
    query_is_ascii: bool,
) -> bool {
    if query_is_ascii && item.is_ascii() {
        return contains_ascii_case_insensitive(item.as_bytes(), query.as_bytes());
    }

    match query_lower {
        Some(query_lower) => item.to_lowercase().contains(query_lower),
        None => item.to_lowercase().contains(&query.to_lowercase()),
    }
}

fn contains_ascii_case_insensitive(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    if needle.len() > haystack.len() {
        return false;
    }

    haystack
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}
