use std::collections::{HashMap, HashSet};

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_until};
use nom::multi::many0;
use nom::sequence::delimited;
use nom::IResult;

use crate::analysis::filters::suffix::SuffixFilter;
use crate::analysis::tokenizer::split_words;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
    "it", "its", "of", "on", "that", "the", "to", "was", "were", "will", "with", "this",
    "they", "but", "have", "had", "what", "when", "where", "who", "which", "why", "how",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Require,
    Exclude,
    Negate,
}

#[derive(Debug, Clone)]
pub struct ProcessedQuery {
    pub normalized: String,
    pub phrases: Vec<String>,
    pub terms: Vec<String>,
    pub operators: Vec<(Operator, String)>,
    pub modifiers: Vec<(String, String)>,
    /// Maps a lowercased/stemmed term back to the casing it was typed with, so a
    /// `case_sensitive` search can check for an exact-case occurrence in a document.
    pub case_terms: HashMap<String, String>,
}

fn quoted_phrase(input: &str) -> IResult<&str, &str> {
    delimited(tag("\""), take_until("\""), tag("\""))(input)
}

fn plain_run(input: &str) -> IResult<&str, &str> {
    is_not("\"")(input)
}

#[derive(Debug)]
enum Segment<'a> {
    Phrase(&'a str),
    Plain(&'a str),
}

fn segment(input: &str) -> IResult<&str, Segment<'_>> {
    alt((
        nom::combinator::map(quoted_phrase, Segment::Phrase),
        nom::combinator::map(plain_run, Segment::Plain),
    ))(input)
}

/// Splits a query into quoted phrases and the plain-text remainder, in source order.
/// A trailing unmatched quote is treated as plain text.
fn extract_phrases(input: &str) -> (Vec<String>, String) {
    let mut phrases = Vec::new();
    let mut remainder = String::new();

    let (leftover, segments) = many0(segment)(input).unwrap_or((input, Vec::new()));

    for seg in segments {
        match seg {
            Segment::Phrase(p) => {
                if !p.trim().is_empty() {
                    phrases.push(p.trim().to_string());
                }
            }
            Segment::Plain(p) => remainder.push_str(p),
        }
    }
    remainder.push_str(leftover);

    (phrases, remainder)
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Normalizes a raw query: extracts quoted phrases, classifies the remaining tokens as
/// operators, field modifiers, or plain terms, drops stop words, and applies the suffix
/// heuristic to surviving terms. `case_sensitive` doesn't change which terms are
/// extracted (lookup still goes through the lowercase trie) but preserves each term's
/// original casing in `case_terms` for an exact-case post-filter.
pub fn process_query(raw: &str, case_sensitive: bool) -> ProcessedQuery {
    let trimmed: String = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let (phrases, remainder) = extract_phrases(&trimmed);

    let mut terms = Vec::new();
    let mut operators = Vec::new();
    let mut modifiers = Vec::new();
    let mut seen_terms: HashSet<String> = HashSet::new();
    let mut case_terms: HashMap<String, String> = HashMap::new();

    for raw_token in remainder.split_whitespace() {
        if let Some(value) = raw_token.strip_prefix('+') {
            if !value.is_empty() {
                operators.push((Operator::Require, value.to_lowercase()));
                continue;
            }
        }
        if let Some(value) = raw_token.strip_prefix('-') {
            if !value.is_empty() {
                operators.push((Operator::Exclude, value.to_lowercase()));
                continue;
            }
        }
        if let Some(value) = raw_token.strip_prefix('!') {
            if !value.is_empty() {
                operators.push((Operator::Negate, value.to_lowercase()));
                continue;
            }
        }
        if let Some((field, value)) = raw_token.split_once(':') {
            if !field.is_empty() && !value.is_empty() {
                modifiers.push((field.to_lowercase(), value.to_lowercase()));
                continue;
            }
        }

        let lower_words = split_words(raw_token, false);
        let original_words = if case_sensitive { split_words(raw_token, true) } else { lower_words.clone() };
        for (word, original) in lower_words.iter().zip(original_words.iter()) {
            if is_stop_word(word) {
                continue;
            }
            let stemmed = SuffixFilter::strip(word);
            if seen_terms.insert(stemmed.clone()) {
                case_terms.insert(stemmed.clone(), original.clone());
                terms.push(stemmed);
            }
        }
    }

    let mut normalized_parts = phrases.iter().map(|p| format!("\"{}\"", p)).collect::<Vec<_>>();
    normalized_parts.extend(terms.iter().cloned());
    let normalized = normalized_parts.join(" ");

    ProcessedQuery { normalized, phrases, terms, operators, modifiers, case_terms }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_quoted_phrase() {
        let q = process_query("\"machine learning\" algorithms", false);
        assert_eq!(q.phrases, vec!["machine learning"]);
        assert!(q.terms.contains(&"algorithm".to_string()));
    }

    #[test]
    fn drops_stop_words_and_stems() {
        let q = process_query("the cats are running", false);
        assert_eq!(q.terms, vec!["cat", "run"]);
    }

    #[test]
    fn classifies_operators_and_modifiers() {
        let q = process_query("+required -excluded field:value plain", false);
        assert_eq!(q.operators, vec![(Operator::Require, "required".to_string()), (Operator::Exclude, "excluded".to_string())]);
        assert_eq!(q.modifiers, vec![("field".to_string(), "value".to_string())]);
        assert_eq!(q.terms, vec!["plain".to_string()]);
    }

    #[test]
    fn only_stop_words_yields_empty_terms() {
        let q = process_query("the a an", false);
        assert!(q.terms.is_empty());
        assert!(q.phrases.is_empty());
    }

    #[test]
    fn case_sensitive_preserves_original_casing() {
        let q = process_query("Hello WORLD", true);
        assert_eq!(q.terms, vec!["hello".to_string(), "world".to_string()]);
        assert_eq!(q.case_terms.get("hello"), Some(&"Hello".to_string()));
        assert_eq!(q.case_terms.get("world"), Some(&"WORLD".to_string()));
    }
}
