//! Fuzzy query matching using nucleo-matcher.

use std::cmp::Reverse;
use std::fmt;
use std::sync::Mutex;

use hinge::QueryMatcher;
use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};

/// A label that matched, with its position in the input and its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranked {
    pub index: usize,
    /// Higher is a better match
    pub score: u32,
}

/// Fuzzy subsequence matching, case-insensitive.
///
/// Plugs into [`hinge::CandidateList::set_query_with`] for comboboxes that
/// want "gmy" to find "Germany". The list keeps its source order; use
/// [`FuzzyMatcher::rank`] where best-first order is wanted.
pub struct FuzzyMatcher {
    matcher: Mutex<Matcher>,
}

impl FuzzyMatcher {
    pub fn new() -> Self {
        Self {
            matcher: Mutex::new(Matcher::new(Config::DEFAULT)),
        }
    }

    /// Score of `label` against `query`, or None when it does not match.
    /// An empty query matches everything with score 0.
    pub fn score(&self, query: &str, label: &str) -> Option<u32> {
        if query.is_empty() {
            return Some(0);
        }
        let pattern = Pattern::new(
            query,
            CaseMatching::Ignore,
            Normalization::Smart,
            AtomKind::Fuzzy,
        );
        let mut chars = Vec::new();
        let haystack = Utf32Str::new(label, &mut chars);
        match self.matcher.lock() {
            Ok(mut matcher) => pattern.score(haystack, &mut matcher),
            Err(poisoned) => pattern.score(haystack, &mut poisoned.into_inner()),
        }
    }

    /// Labels matching `query`, best first. Ties keep input order.
    pub fn rank<'a>(&self, query: &str, labels: impl IntoIterator<Item = &'a str>) -> Vec<Ranked> {
        let mut ranked: Vec<Ranked> = labels
            .into_iter()
            .enumerate()
            .filter_map(|(index, label)| Some(Ranked { index, score: self.score(query, label)? }))
            .collect();
        ranked.sort_by_key(|r| Reverse(r.score));
        ranked
    }
}

impl fmt::Debug for FuzzyMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuzzyMatcher").finish_non_exhaustive()
    }
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryMatcher for FuzzyMatcher {
    fn matches(&self, query: &str, label: &str) -> bool {
        self.score(query, label).is_some()
    }
}
