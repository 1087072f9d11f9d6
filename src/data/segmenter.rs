// ============================================================
// Layer 4 — Rule-Based Segmenter
// ============================================================
// Splits a cleaned review into sentences of tokens.
//
// Tokenisation uses the BERT pre-tokenizer from the
// `tokenizers` crate: split on whitespace, and isolate every
// punctuation character as its own token.
//
//   "it was bad... really!" → it | was | bad | . | . | . | really | !
//
// Sentence boundaries:
//   - every newline (paragraph break in the source)
//   - after a run of `.`, `!` or `?` tokens
//
// Whitespace never becomes a token and empty sentences are
// dropped.

use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::tokenizer::{OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer};

use crate::domain::document::{Paragraph, Sentence};
use crate::domain::error::CorpusError;
use crate::domain::traits::Segmenter;

const SENTENCE_TERMINATORS: [&str; 3] = [".", "!", "?"];

fn is_terminator(token: &str) -> bool {
    SENTENCE_TERMINATORS.contains(&token)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RuleSegmenter;

impl RuleSegmenter {
    pub fn new() -> Self {
        Self
    }

    /// Word/punctuation tokens of a single line.
    fn tokenize_line(&self, line: &str) -> Result<Vec<String>, CorpusError> {
        let mut pretokenized = PreTokenizedString::from(line);
        BertPreTokenizer
            .pre_tokenize(&mut pretokenized)
            .map_err(|e| CorpusError::Segmentation {
                source_name: line.chars().take(40).collect(),
                message: e.to_string(),
            })?;

        Ok(pretokenized
            .get_splits(OffsetReferential::Original, OffsetType::Byte)
            .into_iter()
            .map(|(token, _, _)| token.to_string())
            .collect())
    }
}

impl Segmenter for RuleSegmenter {
    fn segment(&self, text: &str) -> Result<Paragraph, CorpusError> {
        let mut paragraph: Paragraph = Vec::new();

        for line in text.lines() {
            let mut tokens = self.tokenize_line(line)?.into_iter().peekable();
            let mut sentence: Sentence = Vec::new();

            while let Some(token) = tokens.next() {
                let ends_sentence = is_terminator(&token)
                    && !tokens.peek().is_some_and(|next| is_terminator(next));
                sentence.push(token);

                if ends_sentence {
                    paragraph.push(std::mem::take(&mut sentence));
                }
            }

            if !sentence.is_empty() {
                paragraph.push(sentence);
            }
        }

        Ok(paragraph)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str) -> Paragraph {
        RuleSegmenter::new().segment(text).unwrap()
    }

    fn sentence(words: &[&str]) -> Sentence {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_splits_on_terminators() {
        assert_eq!(
            seg("great film. loved it!"),
            vec![sentence(&["great", "film", "."]), sentence(&["loved", "it", "!"])]
        );
    }

    #[test]
    fn test_runs_of_terminators_stay_together() {
        assert_eq!(
            seg("what?! no... ok"),
            vec![
                sentence(&["what", "?", "!"]),
                sentence(&["no", ".", ".", "."]),
                sentence(&["ok"]),
            ]
        );
    }

    #[test]
    fn test_newline_ends_sentence_and_is_not_a_token() {
        let out = seg("first line\nsecond line");
        assert_eq!(out, vec![sentence(&["first", "line"]), sentence(&["second", "line"])]);
        assert!(out.iter().flatten().all(|t| t != "\n"));
    }

    #[test]
    fn test_punctuation_is_isolated() {
        assert_eq!(
            seg("bad, really bad"),
            vec![sentence(&["bad", ",", "really", "bad"])]
        );
    }

    #[test]
    fn test_blank_input_has_no_sentences() {
        assert!(seg("").is_empty());
        assert!(seg("   \n\n  ").is_empty());
    }
}
