use std::collections::VecDeque;
use std::io::BufRead;

use async_trait::async_trait;
use regex::Regex;
use wordwin_core::driver::{TokenSourceError, TokenStream};

/// Maximal runs of Unicode letters. Digits and underscores are not
/// word characters here.
const WORD_PATTERN: &str = r"\p{L}+";

/// Splits lines of text into word tokens.
#[derive(Debug, Clone)]
pub struct WordTokenizer {
    pattern: Regex,
}

impl WordTokenizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            // The pattern is a constant; this cannot fail at runtime.
            pattern: Regex::new(WORD_PATTERN).expect("word pattern is a valid regex"),
        }
    }

    pub fn tokenize<'a>(&'a self, line: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pattern.find_iter(line).map(|found| found.as_str())
    }
}

impl Default for WordTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Adapts any line-oriented reader into the core's [`TokenStream`]:
/// one line is read and tokenized at a time, and tokens are handed out
/// one per call. End of input surfaces as `Ok(None)`.
#[derive(Debug)]
pub struct LineTokenStream<R> {
    reader: R,
    tokenizer: WordTokenizer,
    pending: VecDeque<String>,
}

impl<R: BufRead + Send> LineTokenStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            tokenizer: WordTokenizer::new(),
            pending: VecDeque::new(),
        }
    }
}

#[async_trait]
impl<R: BufRead + Send> TokenStream for LineTokenStream<R> {
    async fn next_token(&mut self) -> Result<Option<String>, TokenSourceError> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }

            let mut line = String::new();
            let bytes_read = self
                .reader
                .read_line(&mut line)
                .map_err(|error| TokenSourceError::new(format!("failed to read line: {error}")))?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.pending
                .extend(self.tokenizer.tokenize(&line).map(str::to_string));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{LineTokenStream, WordTokenizer};
    use wordwin_core::driver::TokenStream;

    #[test]
    fn tokenizes_letter_runs_only() {
        let tokenizer = WordTokenizer::new();
        let tokens: Vec<&str> = tokenizer
            .tokenize("It's 42 degrees_outside, really!")
            .collect();
        assert_eq!(tokens, vec!["It", "s", "degrees", "outside", "really"]);
    }

    #[test]
    fn tokenizes_unicode_letters() {
        let tokenizer = WordTokenizer::new();
        let tokens: Vec<&str> = tokenizer.tokenize("straße über café 123").collect();
        assert_eq!(tokens, vec!["straße", "über", "café"]);
    }

    #[test]
    fn empty_line_yields_no_tokens() {
        let tokenizer = WordTokenizer::new();
        assert_eq!(tokenizer.tokenize("").count(), 0);
        assert_eq!(tokenizer.tokenize("  \t 123 ---").count(), 0);
    }

    #[tokio::test]
    async fn streams_tokens_across_lines_then_ends() {
        let input = "first line here\n\nsecond one\n";
        let mut stream = LineTokenStream::new(Cursor::new(input));

        let mut tokens = Vec::new();
        while let Some(token) = stream.next_token().await.expect("read should succeed") {
            tokens.push(token);
        }
        assert_eq!(tokens, vec!["first", "line", "here", "second", "one"]);

        // Exhausted streams keep reporting end of input.
        assert_eq!(stream.next_token().await.expect("still ok"), None);
    }

    #[tokio::test]
    async fn input_without_trailing_newline_still_tokenizes() {
        let mut stream = LineTokenStream::new(Cursor::new("last word"));
        assert_eq!(
            stream.next_token().await.expect("read should succeed"),
            Some("last".to_string())
        );
        assert_eq!(
            stream.next_token().await.expect("read should succeed"),
            Some("word".to_string())
        );
        assert_eq!(stream.next_token().await.expect("read should succeed"), None);
    }
}
