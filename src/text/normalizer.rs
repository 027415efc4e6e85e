use regex::Regex;

/// Strips noise from raw quotation text
///
/// - line breaks become spaces
/// - every word containing a digit is removed
/// - punctuation is removed
/// - the text is lowercased
///
/// Applying it twice is the same as applying it once.
///
/// # Examples
/// ```
/// use topic_sentiment::text::Normalizer;
/// let normalizer = Normalizer::new();
/// assert_eq!(normalizer.normalize("In 2016,\nTrump WON!"), "in  trump won");
/// ```
#[derive(Debug, Clone)]
pub struct Normalizer {
    digit_words: Regex,
    punctuation: Regex,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            digit_words: Regex::new(r"\w*\d\w*").expect("static pattern"),
            punctuation: Regex::new(r"[^\w\s]").expect("static pattern"),
        }
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize one text
    ///
    /// # Arguments
    /// * `text` - raw text
    ///
    /// # Returns
    /// * `String` - normalized text
    pub fn normalize(&self, text: &str) -> String {
        let text = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
        // 数字を含む単語を先に消す (句読点を消すと単語が連結されるため)
        let text = self.digit_words.replace_all(&text, "");
        let text = self.punctuation.replace_all(&text, "");
        text.to_lowercase()
    }
}
