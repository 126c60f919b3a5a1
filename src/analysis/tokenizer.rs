use crate::analysis::token::Token;

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;

    fn name(&self) -> &str;

    fn clone_box(&self) -> Box<dyn Tokenizer>;
}

fn is_separator(c: char) -> bool {
    c.is_whitespace()
        || matches!(c, ',' | '.' | '!' | '?' | ';' | ':' | '\'' | '"' | '(' | ')' | '[' | ']' | '{' | '}' | '/' | '\\')
}

/// Splits on the fixed punctuation/whitespace class, case-folding unless `case_sensitive`.
pub fn split_words(text: &str, case_sensitive: bool) -> Vec<String> {
    text.split(is_separator)
        .filter(|s| !s.is_empty())
        .map(|s| if case_sensitive { s.to_string() } else { s.to_lowercase() })
        .collect()
}

#[derive(Clone)]
pub struct StandardTokenizer {
    pub lowercase: bool,
    pub max_token_length: usize,
}

impl Default for StandardTokenizer {
    fn default() -> Self {
        StandardTokenizer {
            lowercase: true,
            max_token_length: 255,
        }
    }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut position = 0u32;
        let mut offset = 0usize;

        for raw in text.split(is_separator) {
            let len = raw.len();
            if !raw.is_empty() && raw.len() <= self.max_token_length {
                let token_text = if self.lowercase { raw.to_lowercase() } else { raw.to_string() };
                tokens.push(Token::new(token_text, position, offset));
                position += 1;
            }
            offset += len + 1;
        }

        tokens
    }

    fn name(&self) -> &str {
        "standard"
    }

    fn clone_box(&self) -> Box<dyn Tokenizer> {
        Box::new(Self {
            lowercase: self.lowercase,
            max_token_length: self.max_token_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_words_lowercases_by_default() {
        let words = split_words("Hello, world!", false);
        assert_eq!(words, vec!["hello", "world"]);
    }

    #[test]
    fn split_words_keeps_case_when_sensitive() {
        let words = split_words("Hello World", true);
        assert_eq!(words, vec!["Hello", "World"]);
    }

    #[test]
    fn standard_tokenizer_drops_empty_fragments() {
        let tokenizer = StandardTokenizer::default();
        let tokens = tokenizer.tokenize("one, two,, three");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.clone()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }
}
