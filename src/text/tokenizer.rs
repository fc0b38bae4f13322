use std::{collections::HashMap, path::Path, str::FromStr};

use tokenizers::Tokenizer;

use crate::error::Error;

/// The padding token, always id 0
pub static PAD_TOKEN: &str = "[PAD]";

/// Id of [`PAD_TOKEN`]
pub const PAD_ID: usize = 0;

/// The unknown-word token, always id 1. Words mapped to it are dropped from sequences.
pub static UNK_TOKEN: &str = "[UNK]";

/// A word-level tokenizer fitted on the training corpus
#[derive(Clone)]
pub struct WordTokenizer {
    tokenizer: Tokenizer,
    unk_id: u32,
}

impl WordTokenizer {
    /// Fit a vocabulary of at most `max_words` ids (padding and unknown included).
    ///
    /// Words are ranked by frequency; ties keep the order of first appearance.
    pub fn fit<S: AsRef<str>>(texts: &[S], max_words: usize) -> Result<Self, Error> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut first_seen: Vec<String> = Vec::new();

        for text in texts {
            for word in text.as_ref().split_whitespace() {
                let word = word.to_lowercase();

                match counts.get_mut(&word) {
                    Some(count) => *count += 1,
                    None => {
                        counts.insert(word.clone(), 1);
                        first_seen.push(word);
                    }
                }
            }
        }

        let mut words: Vec<(String, usize)> = first_seen
            .into_iter()
            .map(|word| {
                let count = counts[&word];
                (word, count)
            })
            .collect();

        // Stable, so equal counts stay in first-appearance order
        words.sort_by(|a, b| b.1.cmp(&a.1));
        words.truncate(max_words.saturating_sub(2));

        let mut vocab = serde_json::Map::new();
        vocab.insert(PAD_TOKEN.to_string(), 0.into());
        vocab.insert(UNK_TOKEN.to_string(), 1.into());

        for (index, (word, _)) in words.into_iter().enumerate() {
            vocab.insert(word, (index + 2).into());
        }

        log::debug!("Fitted tokenizer vocabulary with {} ids", vocab.len());

        let json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": { "type": "Lowercase" },
            "pre_tokenizer": { "type": "WhitespaceSplit" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": UNK_TOKEN
            }
        });

        let tokenizer = Tokenizer::from_str(&json.to_string())
            .map_err(|e| Error::Tokenizer(format!("unable to build tokenizer: {}", e)))?;

        Self::from_tokenizer(tokenizer)
    }

    /// Load a tokenizer saved with [`WordTokenizer::save`]
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.is_file() {
            return Err(Error::ModelNotFound(path.to_path_buf()));
        }

        let tokenizer = Tokenizer::from_file(path).map_err(|e| {
            Error::Tokenizer(format!("unable to load {}: {}", path.display(), e))
        })?;

        Self::from_tokenizer(tokenizer)
    }

    fn from_tokenizer(tokenizer: Tokenizer) -> Result<Self, Error> {
        let unk_id = tokenizer
            .token_to_id(UNK_TOKEN)
            .ok_or_else(|| Error::Tokenizer(format!("vocabulary has no {} token", UNK_TOKEN)))?;

        Ok(Self { tokenizer, unk_id })
    }

    /// Persist as a tokenizer JSON file
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        self.tokenizer
            .save(path, false)
            .map_err(|e| Error::Tokenizer(format!("unable to save {}: {}", path.display(), e)))
    }

    /// Number of ids in the vocabulary
    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(false)
    }

    /// Convert one text to token ids, dropping out-of-vocabulary words
    pub fn text_to_sequence(&self, text: &str) -> Result<Vec<usize>, Error> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| Error::Tokenizer(format!("unable to encode text: {}", e)))?;

        Ok(encoding
            .get_ids()
            .iter()
            .filter(|id| **id != self.unk_id)
            .map(|id| *id as usize)
            .collect())
    }

    /// Convert every text to token ids
    pub fn texts_to_sequences<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Vec<usize>>, Error> {
        texts
            .iter()
            .map(|text| self.text_to_sequence(text.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn vocabulary_is_bounded_by_frequency() {
        let texts = ["a b b c c c", "c b"];
        let tokenizer = WordTokenizer::fit(&texts, 4).unwrap();

        assert_eq!(tokenizer.vocab_size(), 4);

        // c is the most frequent word, then b; a and d are out of vocabulary
        assert_eq!(tokenizer.text_to_sequence("a b c d").unwrap(), vec![3, 2]);
    }

    #[test]
    fn ties_keep_first_appearance_order() {
        let tokenizer = WordTokenizer::fit(&["x y", "y x"], 10).unwrap();

        assert_eq!(tokenizer.text_to_sequence("y x").unwrap(), vec![3, 2]);
    }

    #[test]
    fn empty_text_has_no_tokens() {
        let tokenizer = WordTokenizer::fit(&["some words"], 10).unwrap();

        assert_eq!(tokenizer.text_to_sequence("").unwrap(), Vec::<usize>::new());
        assert_eq!(tokenizer.text_to_sequence("   ").unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn survives_a_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokenizer.json");

        let tokenizer = WordTokenizer::fit(&["hate speech hate"], 10).unwrap();
        tokenizer.save(&path).unwrap();

        let loaded = WordTokenizer::load(&path).unwrap();

        assert_eq!(
            loaded.text_to_sequence("speech hate").unwrap(),
            tokenizer.text_to_sequence("speech hate").unwrap()
        );
    }

    #[test]
    fn loading_a_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            WordTokenizer::load(&dir.path().join("tokenizer.json")),
            Err(Error::ModelNotFound(_))
        ));
    }
}
