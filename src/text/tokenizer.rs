use crate::config::TokenizerConfig;

use super::{lemmatizer::{Lemmatizer, RuleLemmatizer}, stopwords::StopWords};

/// Splits normalized text into lemma tokens
///
/// A raw token is kept when it is purely alphabetic and not a stopword.
/// Its lemma is kept when it is not a stopword either and has at least
/// `min_token_len` characters.
///
/// `Tokenizer<L>` is generic over the lemmatizer:
/// - `L`: implementation of [`Lemmatizer`] (default [`RuleLemmatizer`])
///
/// # Examples
/// ```
/// use topic_sentiment::text::Tokenizer;
/// let tokenizer = Tokenizer::default();
/// let tokens = tokenizer.tokenize("healthcare costs are rising due to insurance premiums");
/// assert_eq!(tokens, vec!["healthcare", "cost", "rise", "insurance", "premium"]);
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer<L = RuleLemmatizer>
where
    L: Lemmatizer,
{
    stopwords: StopWords,
    lemmatizer: L,
    min_token_len: usize,
}

impl Default for Tokenizer<RuleLemmatizer> {
    fn default() -> Self {
        Self::new(StopWords::english(), RuleLemmatizer::new(), 3)
    }
}

impl Tokenizer<RuleLemmatizer> {
    /// Tokenizer with the rule lemmatizer and the English stopwords
    /// extended by `config.extra_stopwords`
    pub fn from_config(config: &TokenizerConfig) -> Self {
        Self::with_lemmatizer(config, RuleLemmatizer::new())
    }
}

impl<L> Tokenizer<L>
where
    L: Lemmatizer,
{
    pub fn new(stopwords: StopWords, lemmatizer: L, min_token_len: usize) -> Self {
        Self {
            stopwords,
            lemmatizer,
            min_token_len,
        }
    }

    pub fn with_lemmatizer(config: &TokenizerConfig, lemmatizer: L) -> Self {
        let mut stopwords = StopWords::english();
        stopwords.extend(&config.extra_stopwords);
        Self::new(stopwords, lemmatizer, config.min_token_len)
    }

    pub fn stopwords(&self) -> &StopWords {
        &self.stopwords
    }

    /// Tokenize one normalized text
    ///
    /// # Arguments
    /// * `text` - normalized text
    ///
    /// # Returns
    /// * `Vec<String>` - lemmas in source order, possibly empty
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|raw| !raw.is_empty() && raw.chars().all(char::is_alphabetic))
            .filter_map(|raw| {
                let lower = raw.to_lowercase();
                if self.stopwords.contains(&lower) {
                    return None;
                }
                let lemma = self.lemmatizer.lemmatize(&lower);
                if lemma.chars().count() < self.min_token_len || self.stopwords.contains(&lemma) {
                    return None;
                }
                Some(lemma.into_owned())
            })
            .collect()
    }

    /// Bring a lexicon entry into token space
    ///
    /// Words of `term` are separated by whitespace or `_`. The surviving lemmas
    /// are joined with `delimiter`, the way collocations are.
    ///
    /// # Returns
    /// * `Option<String>` - `None` when every word is filtered out
    pub fn tokenize_term(&self, term: &str, delimiter: &str) -> Option<String> {
        let lemmas = self.tokenize(&term.replace('_', " "));
        (!lemmas.is_empty()).then(|| lemmas.join(delimiter))
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;

    #[test]
    fn drops_stopwords_short_and_non_alpha() {
        let tokenizer = Tokenizer::default();
        assert_eq!(
            tokenizer.tokenize("we need to fund the border wall for immigration control"),
            vec!["need", "fund", "border", "wall", "immigration", "control"]
        );
        assert_eq!(tokenizer.tokenize("an ox is by x_y"), Vec::<String>::new());
        assert!(tokenizer.tokenize("").is_empty());
    }

    #[test]
    fn extra_stopwords_apply_to_lemmas() {
        let config = TokenizerConfig {
            min_token_len: 3,
            extra_stopwords: vec!["border".to_string()],
        };
        let tokenizer = Tokenizer::from_config(&config);
        assert_eq!(tokenizer.tokenize("borders matter"), vec!["matter"]);
    }

    #[test]
    fn terms_match_document_tokens() {
        let tokenizer = Tokenizer::default();
        assert_eq!(tokenizer.tokenize_term("melting", "_").as_deref(), Some("melt"));
        assert_eq!(tokenizer.tokenize_term("Greenhouse  gas", "_").as_deref(), Some("greenhouse_gas"));
        assert_eq!(tokenizer.tokenize_term("fossil_fuels", "-").as_deref(), Some("fossil-fuel"));
        assert_eq!(tokenizer.tokenize_term("mine", "_"), None);
        assert_eq!(
            tokenizer.tokenize_term("melting", "_"),
            tokenizer.tokenize("melting").first().cloned()
        );
    }

    struct Upper;

    impl Lemmatizer for Upper {
        fn lemmatize<'a>(&self, word: &'a str) -> Cow<'a, str> {
            Cow::Owned(word.to_uppercase())
        }
    }

    #[test]
    fn lemmatizer_is_pluggable() {
        let tokenizer = Tokenizer::new(StopWords::new(["the"]), Upper, 2);
        assert_eq!(tokenizer.tokenize("the wall"), vec!["WALL"]);
    }
}
