use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

use super::stopwords::is_stopword;

lazy_static! {
    static ref BRACKETED: Regex = Regex::new(r"\[.*?\]").expect("valid regex");
    static ref URL: Regex = Regex::new(r"https?://\S+|www\.\S+").expect("valid regex");
    static ref TAG: Regex = Regex::new(r"<.*?>+").expect("valid regex");
    static ref DIGIT_TOKEN: Regex = Regex::new(r"\w*\d\w*").expect("valid regex");
    static ref SERVING_URL: Regex = Regex::new(r"http\S+|www\S+|https\S+").expect("valid regex");
    static ref MENTION_OR_HASH: Regex = Regex::new(r"@\w+|#").expect("valid regex");
    static ref NON_ALPHANUMERIC: Regex = Regex::new(r"[^A-Za-z0-9\s]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Normalize a tweet for training: strip markup, links, punctuation and digit-bearing tokens,
/// then drop stopwords and stem what is left.
///
/// Pure and deterministic. Text with nothing left to keep becomes the empty string.
pub fn normalize(text: &str) -> String {
    let text = text.to_lowercase();
    let text = BRACKETED.replace_all(&text, "");
    let text = URL.replace_all(&text, "");
    let text = TAG.replace_all(&text, "");

    let text: String = text
        .chars()
        .filter(|c| !c.is_ascii_punctuation() && *c != '\n')
        .collect();

    let text = DIGIT_TOKEN.replace_all(&text, "");

    text.split_whitespace()
        .filter(|word| !is_stopword(word))
        .map(|word| STEMMER.stem(word).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The lighter cleaning applied to raw text at prediction time
pub fn clean_for_prediction(text: &str) -> String {
    let text = text.to_lowercase();
    let text = SERVING_URL.replace_all(&text, "");
    let text = MENTION_OR_HASH.replace_all(&text, "");
    let text = NON_ALPHANUMERIC.replace_all(&text, "");

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn normalize_strips_markup_links_and_stopwords() {
        let text = "RT @user: I HATE you!!! http://t.co/abc <b>bold</b> [note] 2day";

        assert_eq!(normalize(text), "rt user hate bold");
    }

    #[test]
    fn normalize_stems_and_drops_digit_tokens() {
        assert_eq!(normalize("Running dogs 123 runners a1b"), "run dog runner");
    }

    #[test]
    fn normalize_joins_words_split_by_newlines() {
        // Newlines are removed rather than replaced, like every other stripped character
        assert_eq!(normalize("bad\nword"), "badword");
    }

    #[test]
    fn normalize_is_deterministic_and_lowercase() {
        let text = "Some TEXT with www.example.com and <i>tags</i>, 42 times!";
        let once = normalize(text);

        assert_eq!(once, normalize(text));
        assert_eq!(once, once.to_lowercase());
        assert!(!once.chars().any(|c| c.is_ascii_punctuation() || c.is_ascii_digit()));
    }

    #[test]
    fn normalize_can_produce_empty_text() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("the and of 123 !!!"), "");
    }

    #[test]
    fn prediction_cleaning_strips_mentions_and_links() {
        let text = "Check THIS out @someone #tag https://x.y/z !!";

        assert_eq!(clean_for_prediction(text), "check this out  tag");
    }

    #[test]
    fn prediction_cleaning_of_blank_text_is_empty() {
        assert_eq!(clean_for_prediction("   \t "), "");
    }
}
