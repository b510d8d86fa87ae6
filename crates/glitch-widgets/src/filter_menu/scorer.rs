#![forbid(unsafe_code)]

//! Subsequence match scoring for the filter menu.
//!
//! A candidate matches when every character of the lower-cased query
//! appears, in order, in the lower-cased label. Failing that, the same test
//! is tried against each keyword.
//!
//! # Scoring
//!
//! For a label match, each matched character earns:
//!
//! ```text
//! +1  matched
//! +2  at index 0, or right after ' ' or '-'     (word boundary)
//! +1  right after the previous matched char     (contiguity)
//! ```
//!
//! Keyword-only matches score [`KEYWORD_SCORE`] and report no positions.
//! Every label match earns at least 1 per character, so a label match
//! always outranks a keyword-only match for the same query.
//!
//! Matching is greedy leftmost: each query character takes the first
//! occurrence after the previous one. Ranking is descending score, stable
//! in input order.
//!
//! # Invariants
//!
//! 1. Determinism: same query and items give the same ranking.
//! 2. An empty query matches everything with score 0 in input order.
//! 3. Positions are char indices into the original label, ascending.

use super::MenuItem;

/// Points for each matched character.
pub const MATCH_POINTS: u32 = 1;
/// Extra points for a match at a word boundary.
pub const BOUNDARY_BONUS: u32 = 2;
/// Extra points for a match adjacent to the previous one.
pub const CONTIGUITY_BONUS: u32 = 1;
/// Flat score of a keyword-only match.
pub const KEYWORD_SCORE: u32 = 0;

/// Where a candidate matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// Empty query: everything matches.
    All,
    /// The label matched; positions are reported.
    Label,
    /// Only a keyword matched.
    Keyword,
}

/// A scored candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    /// Index of the item in the input list.
    pub index: usize,
    /// Match score; higher ranks first.
    pub score: u32,
    /// Char indices of matched label characters (empty unless `Label`).
    pub positions: Vec<usize>,
    /// How the candidate matched.
    pub kind: MatchKind,
}

fn lower_chars(s: &str) -> Vec<char> {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// Lower-case `text`, remembering which original char each lowered char
/// came from (some chars lower-case to more than one).
fn lower_with_origin(text: &str) -> Vec<(usize, char)> {
    text.chars()
        .enumerate()
        .flat_map(|(i, c)| c.to_lowercase().map(move |lc| (i, lc)))
        .collect()
}

/// Score `query` (already lower-cased) against `label`.
///
/// Returns the score and matched positions, or `None` if `query` is not a
/// subsequence of `label`.
#[must_use]
pub fn score_label(query: &[char], label: &str) -> Option<(u32, Vec<usize>)> {
    let original: Vec<char> = label.chars().collect();
    let lowered = lower_with_origin(label);

    let mut score = 0;
    let mut positions = Vec::with_capacity(query.len());
    let mut from = 0;
    let mut previous: Option<usize> = None;

    for &qc in query {
        let offset = lowered[from..].iter().position(|&(_, lc)| lc == qc)?;
        let at = from + offset;
        let origin = lowered[at].0;

        score += MATCH_POINTS;
        let at_boundary =
            origin == 0 || matches!(original.get(origin - 1), Some(' ') | Some('-'));
        if at_boundary {
            score += BOUNDARY_BONUS;
        }
        if previous.is_some_and(|p| p + 1 == at) {
            score += CONTIGUITY_BONUS;
        }

        if positions.last() != Some(&origin) {
            positions.push(origin);
        }
        previous = Some(at);
        from = at + 1;
    }

    Some((score, positions))
}

/// Whether `query` (already lower-cased) is a subsequence of `text`.
#[must_use]
pub fn is_subsequence(query: &[char], text: &str) -> bool {
    let mut remaining = query.iter().peekable();
    for c in text.chars().flat_map(char::to_lowercase) {
        if remaining.peek() == Some(&&c) {
            remaining.next();
        }
    }
    remaining.peek().is_none()
}

/// Match one item against a non-empty query (already lower-cased).
#[must_use]
pub fn match_item(query: &[char], index: usize, item: &MenuItem) -> Option<FuzzyMatch> {
    if let Some((score, positions)) = score_label(query, &item.label) {
        return Some(FuzzyMatch {
            index,
            score,
            positions,
            kind: MatchKind::Label,
        });
    }
    item.keywords
        .iter()
        .any(|kw| is_subsequence(query, kw))
        .then(|| FuzzyMatch {
            index,
            score: KEYWORD_SCORE,
            positions: Vec::new(),
            kind: MatchKind::Keyword,
        })
}

/// Rank `items` against `query`.
///
/// An empty query returns every item with score 0 in input order.
#[must_use]
pub fn rank(query: &str, items: &[MenuItem]) -> Vec<FuzzyMatch> {
    if query.is_empty() {
        return (0..items.len())
            .map(|index| FuzzyMatch {
                index,
                score: 0,
                positions: Vec::new(),
                kind: MatchKind::All,
            })
            .collect();
    }

    let query = lower_chars(query);
    let mut matches: Vec<FuzzyMatch> = items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match_item(&query, i, item))
        .collect();
    // `sort_by` is stable: ties keep input order.
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches
}

/// Split `label` into runs of (text, highlighted) for rendering matches.
#[must_use]
pub fn highlight_segments(label: &str, positions: &[usize]) -> Vec<(String, bool)> {
    let mut segments: Vec<(String, bool)> = Vec::new();
    for (i, c) in label.chars().enumerate() {
        let hit = positions.binary_search(&i).is_ok();
        match segments.last_mut() {
            Some((text, flag)) if *flag == hit => text.push(c),
            _ => segments.push((c.to_string(), hit)),
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str) -> Vec<char> {
        lower_chars(s)
    }

    fn items(labels: &[&str]) -> Vec<MenuItem> {
        labels
            .iter()
            .map(|l| MenuItem::new(l.to_lowercase(), *l))
            .collect()
    }

    #[test]
    fn arc_matches_archive_prefix() {
        let (score, positions) = score_label(&q("arc"), "Archive").expect("match");
        assert_eq!(positions, vec![0, 1, 2]);
        // a: 1 + 2 (start), r: 1 + 1 (adjacent), c: 1 + 1 (adjacent)
        assert_eq!(score, 7);
    }

    #[test]
    fn out_of_order_does_not_match() {
        assert!(score_label(&q("cra"), "archive").is_none());
        assert!(score_label(&q("arc"), "archive").is_some());
    }

    #[test]
    fn word_start_outranks_mid_word() {
        let ranked = rank("h", &items(&["Chrome", "Home"]));
        assert_eq!(ranked[0].index, 1, "Home first");
        assert_eq!(ranked[0].score, 3);
        assert_eq!(ranked[1].score, 1);
    }

    #[test]
    fn boundary_after_space_and_hyphen() {
        let (score, positions) = score_label(&q("b"), "a b").expect("match");
        assert_eq!((score, positions), (3, vec![2]));
        let (score, _) = score_label(&q("b"), "a-b").expect("match");
        assert_eq!(score, 3);
        let (score, _) = score_label(&q("b"), "ab").expect("match");
        assert_eq!(score, 1);
    }

    #[test]
    fn greedy_leftmost_selection() {
        // Greedy picks the first 'o', not the later boundary one.
        let (_, positions) = score_label(&q("o"), "Log Out").expect("match");
        assert_eq!(positions, vec![1]);
    }

    #[test]
    fn case_insensitive() {
        assert!(score_label(&q("ARC"), "archive").is_some());
        assert!(score_label(&q("arc"), "ARCHIVE").is_some());
    }

    #[test]
    fn keyword_match_scores_flat_without_positions() {
        let item = MenuItem::new("settings", "Settings").with_keywords(&["preferences"]);
        let m = match_item(&q("pref"), 0, &item).expect("keyword match");
        assert_eq!(m.kind, MatchKind::Keyword);
        assert_eq!(m.score, KEYWORD_SCORE);
        assert!(m.positions.is_empty());
    }

    #[test]
    fn label_match_outranks_keyword_match() {
        let list = vec![
            MenuItem::new("a", "Settings").with_keywords(&["xyz"]),
            MenuItem::new("b", "Xylophone Zone"),
        ];
        let ranked = rank("xyz", &list);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].index, 1);
        assert_eq!(ranked[1].kind, MatchKind::Keyword);
    }

    #[test]
    fn ties_keep_input_order() {
        let ranked = rank("x", &items(&["ax", "bx", "cx"]));
        let order: Vec<usize> = ranked.iter().map(|m| m.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn empty_query_matches_all_in_order() {
        let ranked = rank("", &items(&["b", "a", "c"]));
        assert_eq!(ranked.len(), 3);
        assert!(ranked.iter().all(|m| m.score == 0 && m.kind == MatchKind::All));
        let order: Vec<usize> = ranked.iter().map(|m| m.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn no_match_is_filtered() {
        assert!(rank("zzz", &items(&["Archive", "Home"])).is_empty());
    }

    #[test]
    fn subsequence_helper() {
        assert!(is_subsequence(&q("pf"), "preferences"));
        assert!(!is_subsequence(&q("fp"), "pf"));
        assert!(is_subsequence(&[], "anything"));
    }

    #[test]
    fn highlight_runs() {
        let segs = highlight_segments("Archive", &[0, 1, 2]);
        assert_eq!(segs, vec![("Arc".to_string(), true), ("hive".to_string(), false)]);
    }
}
