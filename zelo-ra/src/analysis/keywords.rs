//! Keyword extraction from timeline event text
//!
//! Deliberately naive: no stop-word list, no stemming, no language
//! awareness. Short words (<= 3 chars after cleaning) are dropped, which
//! filters most Portuguese articles and prepositions, but verbose
//! descriptions can still promote filler words into candidates.

/// Minimum cleaned-token length, exclusive
const MIN_KEYWORD_LEN: usize = 3;

/// Extract normalized candidate tokens from raw event text
///
/// Lower-cases the text, splits on whitespace, strips non-alphanumeric
/// characters per word, and discards tokens whose cleaned length is 3
/// characters or fewer (length counted in chars, so accented words keep
/// their full length). Output order follows the input; duplicates are
/// preserved for the frequency aggregator to count.
pub fn extract_keywords(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|cleaned| cleaned.chars().count() > MIN_KEYWORD_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_short_words() {
        let tokens = extract_keywords("Vazamento de água no 3º andar");
        assert_eq!(tokens, vec!["vazamento", "água", "andar"]);
    }

    #[test]
    fn is_deterministic() {
        let text = "Infiltração recorrente perto da janela norte";
        assert_eq!(extract_keywords(text), extract_keywords(text));
    }

    #[test]
    fn strips_punctuation_before_length_check() {
        // "ar!!" cleans to "ar" (2 chars) and is dropped;
        // "bomba," cleans to "bomba" and survives
        let tokens = extract_keywords("bomba, quebrada: ar!! d'água");
        assert_eq!(tokens, vec!["bomba", "quebrada", "dágua"]);
    }

    #[test]
    fn preserves_duplicates_in_order() {
        let tokens = extract_keywords("vazamento forte vazamento");
        assert_eq!(tokens, vec!["vazamento", "forte", "vazamento"]);
    }

    #[test]
    fn empty_text_yields_no_tokens() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("   \t\n").is_empty());
    }

    #[test]
    fn counts_length_in_chars_not_bytes() {
        // "água" is 4 chars but 5 bytes; it must survive the length filter
        let tokens = extract_keywords("água");
        assert_eq!(tokens, vec!["água"]);
    }
}
