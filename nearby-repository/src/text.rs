//! Fuzzy text matching used by the in-memory text index.
//!
//! Matching is term based: every term of the query has to match some term of
//! the product name, either exactly, as a prefix (autocomplete), or within the
//! allowed edit distance. Terms shorter than [`MIN_FUZZY_TERM_LEN`] only match
//! exactly or as a prefix.

/// Shortest query term that is allowed to match with edits.
pub const MIN_FUZZY_TERM_LEN: usize = 3;

const EXACT_SCORE: f64 = 3.0;
const PREFIX_SCORE: f64 = 2.0;
const FUZZY_SCORE: f64 = 1.5;
const FUZZY_PREFIX_SCORE: f64 = 1.0;
const WHOLE_NAME_BONUS: f64 = 1.0;

/// Split text into lowercase alphanumeric terms.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(|term| term.to_lowercase())
        .collect()
}

/// Levenshtein edit distance between two strings, by character.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row: Vec<usize> = vec![0; b.len() + 1];

    for (i, a_char) in a.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_char) in b.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b.len()]
}

/// Score one query term against one name term.
fn term_score(query_term: &str, name_term: &str, max_edits: usize) -> Option<f64> {
    if query_term == name_term {
        return Some(EXACT_SCORE);
    }
    if name_term.starts_with(query_term) {
        return Some(PREFIX_SCORE);
    }

    let query_len = query_term.chars().count();
    if max_edits == 0 || query_len < MIN_FUZZY_TERM_LEN {
        return None;
    }

    if levenshtein(query_term, name_term) <= max_edits {
        return Some(FUZZY_SCORE);
    }

    // Autocomplete with a typo: compare against the name term's prefix of the same length.
    let name_prefix: String = name_term.chars().take(query_len).collect();
    if name_prefix.chars().count() == query_len && levenshtein(query_term, &name_prefix) <= max_edits {
        return Some(FUZZY_PREFIX_SCORE);
    }

    None
}

/// Relevance of `name` for `query`, or `None` if it does not match.
///
/// # Example
///
/// ```
/// use nearby_repository::text::fuzzy_score;
///
/// assert!(fuzzy_score("widget", "Blue Widget", 1).is_some());
/// assert!(fuzzy_score("widgte", "Blue Widget", 1).is_none());
/// assert!(fuzzy_score("wodget", "Blue Widget", 1).is_some());
/// ```
pub fn fuzzy_score(query: &str, name: &str, max_edits: usize) -> Option<f64> {
    let query_terms = tokenize(query);
    if query_terms.is_empty() {
        return None;
    }
    let name_terms = tokenize(name);

    let mut total = 0.0;
    for query_term in &query_terms {
        let best = name_terms
            .iter()
            .filter_map(|name_term| term_score(query_term, name_term, max_edits))
            .fold(None, |best: Option<f64>, score| {
                Some(best.map_or(score, |b| b.max(score)))
            })?;
        total += best;
    }

    if query_terms == name_terms {
        total += WHOLE_NAME_BONUS;
    }

    Some(total)
}
