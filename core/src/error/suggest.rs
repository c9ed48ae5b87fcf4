//! Suggest existing names that are similar to what the user typed in case of "name not found"
//! errors, such as [super::UnknownTypeError] or [super::UnknownUnitError].
//!
//! A candidate is scored against the user input as follows:
//!
//! - an exact match modulo casing scores `2`;
//! - if one of the names contains the other (modulo casing), the candidate scores `1 +
//!   similarity`;
//! - otherwise, the candidate scores its normalized Damerau-Levenshtein similarity, and is
//!   dropped if the similarity is below [crate::config::SuggestConfig::min_similarity].
//!
//! Candidates are then ordered by decreasing score, ties being broken by name, so the result is
//! deterministic.

use strsim::normalized_damerau_levenshtein;

use crate::config::SuggestConfig;

/// The default minimum similarity between the user's input and an existing symbol for the symbol
/// to be considered a serious candidate. The threshold is rather low, because short words with
/// edit distance 1 such as `bar` and `bare` might have a similarity which isn't that high.
pub const MIN_SIMILARITY: f64 = 0.60;

/// The default number of suggestions returned by [ranked_matches].
pub const MAX_SUGGESTIONS: usize = 5;

/// A name that the user might have meant, together with what to replace their input with if
/// they pick it.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate<T> {
    pub name: String,
    pub replacement: T,
}

impl<T> Candidate<T> {
    pub fn new(name: impl Into<String>, replacement: T) -> Self {
        Candidate {
            name: name.into(),
            replacement,
        }
    }
}

fn score(candidate: &str, user_input: &str, min_similarity: f64) -> Option<f64> {
    if user_input.is_empty() || candidate.is_empty() {
        return None;
    }

    let candidate = candidate.to_lowercase();
    let user_input = user_input.to_lowercase();

    if candidate == user_input {
        return Some(2.0);
    }

    let similarity = normalized_damerau_levenshtein(&candidate, &user_input);

    if candidate.contains(&user_input) || user_input.contains(&candidate) {
        Some(1.0 + similarity)
    } else if similarity >= min_similarity {
        Some(similarity)
    } else {
        None
    }
}

/// Rank the candidates of `pool` by similarity to `user_input` and return the replacements of
/// the best ones, most plausible first. Candidates with an equal replacement are only reported
/// once.
///
/// Scoring is done upfront, but the iterator only clones the replacements it actually yields.
pub fn ranked_matches<T, I>(
    pool: I,
    user_input: &str,
    config: &SuggestConfig,
) -> impl Iterator<Item = T>
where
    I: IntoIterator<Item = Candidate<T>>,
    T: PartialEq + Clone,
{
    let mut scored: Vec<(f64, Candidate<T>)> = pool
        .into_iter()
        .filter_map(|candidate| {
            score(&candidate.name, user_input, config.min_similarity)
                .map(|score| (score, candidate))
        })
        .collect();

    scored.sort_by(|(score1, cand1), (score2, cand2)| {
        score2
            .total_cmp(score1)
            .then_with(|| cand1.name.cmp(&cand2.name))
    });

    log::debug!(
        "{} suggestion(s) for `{user_input}`: {:?}",
        scored.len(),
        scored.iter().map(|(_, c)| c.name.as_str()).collect::<Vec<_>>()
    );

    let mut yielded: Vec<T> = Vec::new();

    scored
        .into_iter()
        .filter_map(move |(_, candidate)| {
            if yielded.contains(&candidate.replacement) {
                None
            } else {
                yielded.push(candidate.replacement.clone());
                Some(candidate.replacement)
            }
        })
        .take(config.max_suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(pool: &[&str], input: &str) -> Vec<String> {
        ranked_matches(
            pool.iter().map(|name| Candidate::new(*name, name.to_string())),
            input,
            &SuggestConfig::default(),
        )
        .collect()
    }

    #[test]
    fn transposition_is_close() {
        assert_eq!(names(&["Number", "Text", "Boolean"], "Nubmer"), ["Number"]);
        assert_eq!(names(&["Optional", "Either"], "Optionl"), ["Optional"]);
    }

    #[test]
    fn exact_match_modulo_case_comes_first() {
        assert_eq!(
            names(&["Texts", "text", "Next"], "Text"),
            ["text", "Texts", "Next"]
        );
    }

    #[test]
    fn substring_beats_edit_distance() {
        assert_eq!(names(&["Dates", "DateTime", "Data"], "Date")[0], "Dates");
    }

    #[test]
    fn no_match() {
        assert!(names(&["Number", "Text"], "Xylophone").is_empty());
        assert!(names(&[], "Number").is_empty());
        assert!(names(&["Number"], "").is_empty());
    }

    #[test]
    fn ties_are_broken_by_name() {
        assert_eq!(names(&["cb", "ab"], "b"), ["ab", "cb"]);
    }

    #[test]
    fn max_suggestions() {
        let config = SuggestConfig {
            max_suggestions: 2,
            ..Default::default()
        };
        let found: Vec<_> = ranked_matches(
            ["ma", "mb", "mc"].map(|n| Candidate::new(n, n)),
            "m",
            &config,
        )
        .collect();
        assert_eq!(found, ["ma", "mb"]);
    }

    #[test]
    fn duplicate_replacements_are_reported_once() {
        let found: Vec<_> = ranked_matches(
            [Candidate::new("bool", 1), Candidate::new("Boolean", 1)],
            "boolean",
            &SuggestConfig::default(),
        )
        .collect();
        assert_eq!(found, [1]);
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(names(&["kg", "km", "m"], "KG")[0], "kg");
    }
}
