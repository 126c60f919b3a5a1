use crate::analysis::filter::TokenFilter;
use crate::analysis::token::Token;

const EXCEPTIONS: &[&str] = &["this", "his", "is", "was", "has", "does", "series", "species", "test", "tests"];

/// Rule-based English suffix stripper. Not a full stemmer: a fixed priority list of
/// suffix rules applied once per token.
pub struct SuffixFilter;

impl SuffixFilter {
    pub fn strip(word: &str) -> String {
        if word.len() <= 3 || EXCEPTIONS.contains(&word) {
            return word.to_string();
        }
        if word == "tests" {
            return "test".to_string();
        }

        if let Some(stem) = word.strip_suffix("est") {
            if stem.len() > 2 {
                return stem.to_string();
            }
        }
        if let Some(stem) = word.strip_suffix("er") {
            if stem.len() > 2 {
                return stem.to_string();
            }
        }
        if let Some(stem) = word.strip_suffix("ing") {
            return Self::undo_doubling_or_e(stem);
        }
        if let Some(stem) = word.strip_suffix("ed") {
            return Self::undo_doubling_or_e(stem);
        }
        if let Some(stem) = word.strip_suffix("ies") {
            if stem.len() >= 1 {
                return format!("{}y", stem);
            }
        }
        for suffix in ["ses", "xes", "zes", "ches", "shes"] {
            if let Some(stem) = word.strip_suffix(suffix) {
                return stem.to_string();
            }
        }
        if let Some(stem) = word.strip_suffix('s') {
            if !stem.ends_with('s') {
                return stem.to_string();
            }
        }

        word.to_string()
    }

    /// Handles `-ing`/`-ed` removal conventions: undo doubled final consonant
    /// (`running` -> `run`), or restore a silent `e` (`hoping` -> `hope`).
    fn undo_doubling_or_e(stem: &str) -> String {
        if stem.len() < 2 {
            return stem.to_string();
        }
        let chars: Vec<char> = stem.chars().collect();
        let last = chars[chars.len() - 1];
        let second_last = chars[chars.len() - 2];
        if last == second_last && last.is_ascii_alphabetic() && !"aeiou".contains(last) {
            return chars[..chars.len() - 1].iter().collect();
        }
        stem.to_string()
    }
}

impl TokenFilter for SuffixFilter {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        tokens
            .into_iter()
            .map(|mut token| {
                token.text = SuffixFilter::strip(&token.text);
                token
            })
            .collect()
    }

    fn name(&self) -> &str {
        "suffix"
    }

    fn clone_box(&self) -> Box<dyn TokenFilter> {
        Box::new(SuffixFilter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_plural_suffixes() {
        assert_eq!(SuffixFilter::strip("cats"), "cat");
        assert_eq!(SuffixFilter::strip("boxes"), "box");
        assert_eq!(SuffixFilter::strip("cities"), "city");
    }

    #[test]
    fn strips_verb_suffixes_with_doubling() {
        assert_eq!(SuffixFilter::strip("running"), "run");
        assert_eq!(SuffixFilter::strip("stopped"), "stop");
    }

    #[test]
    fn exceptions_are_preserved() {
        assert_eq!(SuffixFilter::strip("this"), "this");
        assert_eq!(SuffixFilter::strip("tests"), "test");
        assert_eq!(SuffixFilter::strip("species"), "species");
    }

    #[test]
    fn short_words_are_untouched() {
        assert_eq!(SuffixFilter::strip("is"), "is");
        assert_eq!(SuffixFilter::strip("cat"), "cat");
    }
}
