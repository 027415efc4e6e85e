use std::{borrow::Cow, collections::HashMap};

use ahash::RandomState;

/// Maps an inflected word to its dictionary form
///
/// Input is a lowercase alphabetic word, output a lowercase lemma.
/// Implementations must be deterministic and hold only immutable state,
/// they are shared across the tokenization worker pool.
pub trait Lemmatizer: Send + Sync {
    fn lemmatize<'a>(&self, word: &'a str) -> Cow<'a, str>;
}

/// Rule based English lemmatizer
///
/// An irregular-form table followed by suffix rules for plural nouns and
/// `-ing` / `-ed` verb forms. It works without part-of-speech tags, so it is an
/// approximation of a dictionary lemmatizer, tuned for news / political text.
///
/// # Examples
/// ```
/// use topic_sentiment::text::{Lemmatizer, RuleLemmatizer};
/// let lemmatizer = RuleLemmatizer::new();
/// assert_eq!(lemmatizer.lemmatize("premiums"), "premium");
/// assert_eq!(lemmatizer.lemmatize("rising"), "rise");
/// assert_eq!(lemmatizer.lemmatize("children"), "child");
/// assert_eq!(lemmatizer.lemmatize("crisis"), "crisis");
/// ```
#[derive(Debug, Clone)]
pub struct RuleLemmatizer {
    exceptions: HashMap<&'static str, &'static str, RandomState>,
}

impl Default for RuleLemmatizer {
    fn default() -> Self {
        let mut exceptions = HashMap::with_hasher(RandomState::new());
        exceptions.extend(IRREGULAR.iter().copied());
        exceptions.extend(INVARIANT.iter().map(|w| (*w, *w)));
        Self { exceptions }
    }
}

impl RuleLemmatizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or override an exception (`form` -> `lemma`)
    pub fn with_exception(mut self, form: &'static str, lemma: &'static str) -> Self {
        self.exceptions.insert(form, lemma);
        self
    }
}

impl Lemmatizer for RuleLemmatizer {
    fn lemmatize<'a>(&self, word: &'a str) -> Cow<'a, str> {
        if let Some(lemma) = self.exceptions.get(word) {
            return Cow::Borrowed(*lemma);
        }
        if word.len() <= 3 || !word.is_ascii() {
            return Cow::Borrowed(word);
        }

        if let Some(stem) = word.strip_suffix("ies") {
            if word.len() > 4 {
                return Cow::Owned(format!("{stem}y"));
            }
        }
        if let Some(stem) = word.strip_suffix("sses") {
            return Cow::Owned(format!("{stem}ss"));
        }
        for suffix in ["ches", "shes", "xes", "zes"] {
            if word.ends_with(suffix) {
                return Cow::Borrowed(&word[..word.len() - 2]);
            }
        }
        if let Some(stem) = word.strip_suffix("ing") {
            if stem.len() >= 3 && has_vowel(stem) {
                return repair_stem(stem);
            }
            return Cow::Borrowed(word);
        }
        if let Some(stem) = word.strip_suffix("ied") {
            if stem.len() >= 2 {
                return Cow::Owned(format!("{stem}y"));
            }
        }
        if let Some(stem) = word.strip_suffix("ed") {
            if stem.len() >= 3 && has_vowel(stem) && !stem.ends_with('e') {
                return repair_stem(stem);
            }
            return Cow::Borrowed(word);
        }
        if word.ends_with('s') && !(word.ends_with("ss") || word.ends_with("us") || word.ends_with("is")) {
            return Cow::Borrowed(&word[..word.len() - 1]);
        }
        Cow::Borrowed(word)
    }
}

#[inline]
fn is_vowel(c: u8) -> bool {
    matches!(c, b'a' | b'e' | b'i' | b'o' | b'u')
}

fn has_vowel(s: &str) -> bool {
    s.bytes().any(|c| is_vowel(c) || c == b'y')
}

/// number of maximal vowel runs
fn vowel_groups(s: &str) -> usize {
    let mut groups = 0;
    let mut in_group = false;
    for c in s.bytes() {
        let v = is_vowel(c);
        if v && !in_group {
            groups += 1;
        }
        in_group = v;
    }
    groups
}

/// Restore the stem of an `-ing` / `-ed` form
/// stopp -> stop, ris -> rise, giv -> give, fund -> fund
fn repair_stem(stem: &str) -> Cow<'_, str> {
    let b = stem.as_bytes();
    let n = b.len();
    let (last, prev) = (b[n - 1], b[n - 2]);

    // 子音の重複 (stopp, runn) -> 1つにする
    if last == prev && !is_vowel(last) && !matches!(last, b'l' | b's' | b'z') {
        return Cow::Borrowed(&stem[..n - 1]);
    }
    // 短い CVC (vot, shap, hop) -> e を戻す
    if n >= 3
        && !is_vowel(b[n - 3])
        && is_vowel(prev)
        && !is_vowel(last)
        && !matches!(last, b'w' | b'x' | b'y')
        && vowel_groups(stem) == 1
    {
        return Cow::Owned(format!("{stem}e"));
    }
    if matches!(last, b'v' | b'c' | b'u')
        || stem.ends_with("iz")
        || stem.ends_with("yz")
        || stem.ends_with("rg")
        || stem.ends_with("dg")
        || stem.ends_with("ns")
        || stem.ends_with("rs")
        || (last == b's' && is_vowel(prev) && n >= 3 && is_vowel(b[n - 3]))
    {
        return Cow::Owned(format!("{stem}e"));
    }
    Cow::Borrowed(stem)
}

const IRREGULAR: &[(&str, &str)] = &[
    ("is", "be"), ("are", "be"), ("was", "be"), ("were", "be"), ("been", "be"), ("am", "be"),
    ("has", "have"), ("had", "have"), ("does", "do"), ("did", "do"), ("done", "do"),
    ("went", "go"), ("gone", "go"), ("goes", "go"), ("made", "make"), ("said", "say"), ("says", "say"),
    ("took", "take"), ("taken", "take"), ("came", "come"), ("got", "get"), ("gotten", "get"),
    ("gave", "give"), ("given", "give"), ("knew", "know"), ("known", "know"),
    ("thought", "think"), ("told", "tell"), ("found", "find"), ("felt", "feel"), ("kept", "keep"),
    ("began", "begin"), ("begun", "begin"), ("brought", "bring"), ("bought", "buy"),
    ("built", "build"), ("paid", "pay"), ("sent", "send"), ("spent", "spend"), ("won", "win"),
    ("lost", "lose"), ("fought", "fight"), ("taught", "teach"), ("caught", "catch"),
    ("wrote", "write"), ("written", "write"), ("spoke", "speak"), ("spoken", "speak"),
    ("chose", "choose"), ("chosen", "choose"), ("ran", "run"), ("saw", "see"), ("seen", "see"),
    ("rose", "rise"), ("risen", "rise"), ("fell", "fall"), ("fallen", "fall"), ("grew", "grow"),
    ("grown", "grow"), ("led", "lead"), ("met", "meet"), ("meant", "mean"), ("heard", "hear"),
    ("held", "hold"), ("stood", "stand"), ("understood", "understand"), ("died", "die"),
    ("dying", "die"), ("lying", "lie"), ("men", "man"), ("women", "woman"), ("children", "child"),
    ("feet", "foot"), ("teeth", "tooth"), ("mice", "mouse"), ("geese", "goose"),
    ("lives", "life"), ("wives", "wife"), ("knives", "knife"), ("leaves", "leaf"),
    ("crises", "crisis"), ("analyses", "analysis"), ("theses", "thesis"),
    ("freed", "free"), ("agreed", "agree"), ("united", "united"),
];

const INVARIANT: &[&str] = &[
    "news", "series", "species", "politics", "economics", "physics", "ethics", "mathematics",
    "chaos", "texas", "kansas", "arkansas", "christmas", "gas", "lens", "bias", "atlas",
    "canvas", "alias", "overseas", "people", "police", "thing", "king", "ring", "spring",
    "string", "swing", "wing", "bring", "sting", "during", "morning", "evening", "ceiling",
    "sibling", "building", "need", "speed", "seed", "feed", "breed", "greed", "indeed",
];
