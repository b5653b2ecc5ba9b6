//! Lexical heuristics for judging a synthesized answer.
//!
//! Every function here is total: any combination of inputs, including empty strings and
//! empty context lists, produces a report.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A context counts as used when its Jaccard similarity with the answer exceeds this.
pub const RETRIEVAL_THRESHOLD: f64 = 0.2;

/// Answers with fewer whitespace-separated tokens than this are concise.
pub const CONCISE_TOKEN_LIMIT: usize = 150;

static SOURCES_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SOURCES\s*[:：]").expect("valid regex"));

/// Heuristic quality scores for one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Fraction of retrieved contexts that overlap the answer, in `[0, 1]`.
    pub retrieval_accuracy: f64,
    /// Whether the answer contains a `SOURCES:` line.
    pub sources_cited: bool,
    /// Answer length in characters.
    pub answer_length: usize,
    /// Whether the answer stays under [`CONCISE_TOKEN_LIMIT`] tokens.
    pub concise: bool,
    /// Whether the answer is non-blank and cites its sources.
    pub follows_prompt: bool,
}

fn token_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Jaccard similarity of the lowercased whitespace token sets of `a` and `b`.
///
/// Returns `0.0` when either side has no tokens.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let set_a = token_set(a);
    let set_b = token_set(b);
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.len() + set_b.len() - intersection;
    intersection as f64 / union as f64
}

/// Scores `answer` against the contexts it was synthesized from.
///
/// `query` does not influence any current metric.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn evaluate(answer: &str, _query: &str, contexts: &[String]) -> EvaluationReport {
    let used = contexts
        .iter()
        .filter(|context| jaccard_similarity(context, answer) > RETRIEVAL_THRESHOLD)
        .count();
    let retrieval_accuracy = used as f64 / contexts.len().max(1) as f64;

    let sources_cited = SOURCES_LINE.is_match(answer);

    EvaluationReport {
        retrieval_accuracy,
        sources_cited,
        answer_length: answer.chars().count(),
        concise: answer.split_whitespace().count() < CONCISE_TOKEN_LIMIT,
        follows_prompt: sources_cited && !answer.trim().is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn jaccard_basics() {
        assert!((jaccard_similarity("a b c", "b c d") - 0.5).abs() < 1e-12);
        assert!((jaccard_similarity("The Cat", "the cat") - 1.0).abs() < 1e-12);
        assert!(jaccard_similarity("", "x").abs() < f64::EPSILON);
        assert!(jaccard_similarity("   ", "").abs() < f64::EPSILON);
    }

    #[test]
    fn jaccard_is_symmetric() {
        let pairs = [
            ("alpha beta gamma", "beta delta"),
            ("one", "one two three four"),
            ("Rust is fast", "rust IS memory safe"),
        ];
        for (a, b) in pairs {
            assert!((jaccard_similarity(a, b) - jaccard_similarity(b, a)).abs() < 1e-12);
        }
    }

    #[test]
    fn retrieval_accuracy_counts_overlapping_contexts() {
        let contexts = vec![
            "paris is the capital of france".to_string(),
            "bananas are yellow".to_string(),
        ];
        let report = evaluate("the capital of france is paris", "q", &contexts);
        assert!((report.retrieval_accuracy - 0.5).abs() < 1e-12);
    }

    #[test]
    fn threshold_is_strict() {
        // 1 shared token out of 5 distinct ones is exactly 0.2.
        let contexts = vec!["a b c".to_string()];
        let report = evaluate("a d e", "q", &contexts);
        assert!(report.retrieval_accuracy.abs() < f64::EPSILON);
    }

    #[test]
    fn empty_contexts_score_zero() {
        let report = evaluate("anything SOURCES: 1", "q", &[]);
        assert!(report.retrieval_accuracy.abs() < f64::EPSILON);
    }

    #[test]
    fn sources_line_detection() {
        assert!(evaluate("Answer.\nSOURCES: 1, 2", "q", &[]).sources_cited);
        assert!(evaluate("answer\nsources : 3", "q", &[]).sources_cited);
        assert!(evaluate("答案 Sources：1", "q", &[]).sources_cited);
        assert!(!evaluate("no citations here", "q", &[]).sources_cited);
        assert!(!evaluate("SOURCES 1", "q", &[]).sources_cited);
    }

    #[test]
    fn conciseness_boundary() {
        assert!(evaluate(&words(149), "q", &[]).concise);
        assert!(!evaluate(&words(150), "q", &[]).concise);
    }

    #[test]
    fn answer_length_counts_characters() {
        assert_eq!(evaluate("héllo", "q", &[]).answer_length, 5);
    }

    #[test]
    fn follows_prompt_requires_citation() {
        let cited = evaluate("Paris.\nSOURCES: 1", "q", &[]);
        assert!(cited.follows_prompt);

        let uncited = evaluate("Paris.", "q", &[]);
        assert!(!uncited.follows_prompt);

        let empty = evaluate("", "q", &[]);
        assert!(!empty.sources_cited);
        assert!(!empty.follows_prompt);
        assert_eq!(empty.answer_length, 0);
        assert!(empty.concise);
    }

    #[test]
    fn report_serializes_with_stable_field_names() {
        let report = evaluate("x SOURCES: 1", "q", &["x".to_string()]);
        let json = serde_json::to_value(&report).unwrap();
        for key in [
            "retrieval_accuracy",
            "sources_cited",
            "answer_length",
            "concise",
            "follows_prompt",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
