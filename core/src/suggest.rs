//! "Did you mean" suggestions for unknown commands.

use strsim::levenshtein;

use crate::config::SuggestConfig;

/// Returns the candidates closest to `input` by edit distance.
///
/// Comparison ignores case. Candidates farther than `config.max_distance` are
/// dropped; the rest are ordered by distance, ties keeping candidate order,
/// and truncated to `config.limit`.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{SuggestConfig, find_similar};
///
/// let names = ["add", "version", "remove"];
/// let config = SuggestConfig::default();
/// assert_eq!(find_similar("verzion", &names, &config), vec!["version"]);
/// assert!(find_similar("zzz", &names, &config).is_empty());
/// ```
pub fn find_similar<S: AsRef<str>>(
    input: &str,
    candidates: &[S],
    config: &SuggestConfig,
) -> Vec<String> {
    let input_lower = input.to_lowercase();

    let mut scored: Vec<(usize, &str)> = candidates
        .iter()
        .map(|candidate| {
            let candidate: &str = candidate.as_ref();
            (levenshtein(&input_lower, &candidate.to_lowercase()), candidate)
        })
        .filter(|(distance, _)| *distance <= config.max_distance)
        .collect();
    scored.sort_by_key(|(distance, _)| *distance);

    scored
        .into_iter()
        .take(config.limit)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_similar_orders_by_distance_then_declaration() {
        let config = SuggestConfig::default();
        let names = ["tasks", "task", "tas", "list"];
        assert_eq!(
            find_similar("task", &names, &config),
            vec!["task", "tasks", "tas"]
        );
    }

    #[test]
    fn test_find_similar_ignores_case() {
        let config = SuggestConfig::default();
        assert_eq!(find_similar("LIST", &["list"], &config), vec!["list"]);
        assert_eq!(find_similar("lsit", &["List"], &config), vec!["List"]);
    }

    #[test]
    fn test_find_similar_respects_limit_and_distance() {
        let config = SuggestConfig {
            limit: 1,
            max_distance: 1,
        };
        assert_eq!(find_similar("ad", &["add", "and", "odd"], &config), vec!["add"]);
        assert!(find_similar("xyz", &["add"], &config).is_empty());
    }
}
