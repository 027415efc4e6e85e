use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use ahash::RandomState;

use crate::{
    error::Result,
    sentiment::{
        lexicon::{ValenceLexicon, BOOSTERS, C_INCR, NEGATE, N_SCALAR, SPECIAL_CASES},
        PolarityScorer, PolarityScores,
    },
};

/// normalization constant of the compound score
const ALPHA: f64 = 15.0;

/// Lexicon and rule based sentiment intensity analyzer
///
/// Word valences come from a [`ValenceLexicon`] and are adjusted by
/// - intensity boosters and dampeners up to three words before ("very good")
/// - negations up to three words before ("not good", "isn't good")
/// - ALL-CAPS emphasis when the rest of the text is not all caps
/// - a contrastive "but" (before: halved, after: 1.5x)
/// - exclamation and question marks
///
/// The sum is squashed into [-1, 1] with `x / sqrt(x² + 15)`.
///
/// # Examples
/// ```
/// use topic_sentiment::{PolarityScorer, SentimentIntensityAnalyzer};
/// let analyzer = SentimentIntensityAnalyzer::new();
/// assert!(analyzer.compound("This is a great plan!") > 0.5);
/// assert!(analyzer.compound("This is not a great plan") < 0.0);
/// assert_eq!(analyzer.compound(""), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct SentimentIntensityAnalyzer {
    lexicon: ValenceLexicon,
    boosters: HashMap<&'static str, f64, RandomState>,
    negations: HashSet<&'static str, RandomState>,
    special_cases: HashMap<&'static str, f64, RandomState>,
}

impl Default for SentimentIntensityAnalyzer {
    fn default() -> Self {
        Self::with_lexicon(ValenceLexicon::default())
    }
}

impl SentimentIntensityAnalyzer {
    /// Analyzer with the embedded lexicon
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lexicon(lexicon: ValenceLexicon) -> Self {
        let mut boosters = HashMap::with_hasher(RandomState::new());
        boosters.extend(BOOSTERS.iter().copied());
        let mut negations = HashSet::with_hasher(RandomState::new());
        negations.extend(NEGATE.iter().copied());
        let mut special_cases = HashMap::with_hasher(RandomState::new());
        special_cases.extend(SPECIAL_CASES.iter().copied());
        Self {
            lexicon,
            boosters,
            negations,
            special_cases,
        }
    }

    /// Analyzer with a lexicon file (`word<TAB>mean<TAB>...`)
    ///
    /// # Errors
    /// * `ModelUnavailable` - the lexicon cannot be loaded
    pub fn from_lexicon_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::with_lexicon(ValenceLexicon::from_file(path)?))
    }

    pub fn lexicon(&self) -> &ValenceLexicon {
        &self.lexicon
    }

    fn negated(&self, word: &str) -> bool {
        self.negations.contains(word) || word.contains("n't")
    }

    /// booster / dampener contribution of `word` for a word of `valence`
    fn scalar_inc_dec(&self, word: &str, lower: &str, valence: f64, cap_diff: bool) -> f64 {
        let Some(&booster) = self.boosters.get(lower) else {
            return 0.0;
        };
        let mut scalar = if valence < 0.0 { -booster } else { booster };
        if is_upper(word) && cap_diff {
            if valence > 0.0 {
                scalar += C_INCR;
            } else {
                scalar -= C_INCR;
            }
        }
        scalar
    }

    fn sentiment_valence(&self, words: &[&str], lower: &[String], i: usize, cap_diff: bool) -> f64 {
        let Some(base) = self.lexicon.get(&lower[i]) else {
            return 0.0;
        };
        let n = lower.len();
        let mut valence = base;

        // "no" directly before another opinion word is a negation, not an opinion
        if lower[i] == "no" && i + 1 < n && self.lexicon.contains(&lower[i + 1]) {
            valence = 0.0;
        }
        if (i > 0 && lower[i - 1] == "no")
            || (i > 1 && lower[i - 2] == "no")
            || (i > 2 && lower[i - 3] == "no" && (lower[i - 1] == "or" || lower[i - 1] == "nor"))
        {
            valence = base * N_SCALAR;
        }
        if is_upper(words[i]) && cap_diff {
            if valence > 0.0 {
                valence += C_INCR;
            } else {
                valence -= C_INCR;
            }
        }

        for start_i in 0..3 {
            if i <= start_i {
                break;
            }
            let j = i - (start_i + 1);
            if self.lexicon.contains(&lower[j]) {
                continue;
            }
            let mut s = self.scalar_inc_dec(words[j], &lower[j], valence, cap_diff);
            if start_i == 1 {
                s *= 0.95;
            } else if start_i == 2 {
                s *= 0.9;
            }
            valence += s;
            valence = self.negation_check(valence, lower, start_i, i);
            if start_i == 2 {
                valence = self.special_idioms_check(valence, lower, i);
            }
        }
        least_check(&self.lexicon, valence, lower, i)
    }

    fn negation_check(&self, valence: f64, lower: &[String], start_i: usize, i: usize) -> f64 {
        let at = |back: usize| lower[i - back].as_str();
        match start_i {
            0 if self.negated(at(1)) => valence * N_SCALAR,
            1 if at(2) == "never" && (at(1) == "so" || at(1) == "this") => valence * 1.25,
            1 if at(2) == "without" && at(1) == "doubt" => valence,
            1 if self.negated(at(2)) => valence * N_SCALAR,
            2 if (at(3) == "never" && (at(2) == "so" || at(2) == "this")) || at(1) == "so" || at(1) == "this" => {
                valence * 1.25
            }
            2 if at(3) == "without" && (at(2) == "doubt" || at(1) == "doubt") => valence,
            2 if self.negated(at(3)) => valence * N_SCALAR,
            _ => valence,
        }
    }

    fn special_idioms_check(&self, mut valence: f64, lower: &[String], i: usize) -> f64 {
        let w = |k: usize| lower[k].as_str();
        let one_zero = format!("{} {}", w(i - 1), w(i));
        let two_one_zero = format!("{} {} {}", w(i - 2), w(i - 1), w(i));
        let two_one = format!("{} {}", w(i - 2), w(i - 1));
        let three_two_one = format!("{} {} {}", w(i - 3), w(i - 2), w(i - 1));
        let three_two = format!("{} {}", w(i - 3), w(i - 2));

        for seq in [&one_zero, &two_one_zero, &two_one, &three_two_one, &three_two] {
            if let Some(&v) = self.special_cases.get(seq.as_str()) {
                valence = v;
                break;
            }
        }
        if i + 1 < lower.len() {
            if let Some(&v) = self.special_cases.get(format!("{} {}", w(i), w(i + 1)).as_str()) {
                valence = v;
            }
        }
        if i + 2 < lower.len() {
            if let Some(&v) = self.special_cases.get(format!("{} {} {}", w(i), w(i + 1), w(i + 2)).as_str()) {
                valence = v;
            }
        }
        for n_gram in [&three_two_one, &three_two, &two_one] {
            if let Some(&b) = self.boosters.get(n_gram.as_str()) {
                valence += b;
            }
        }
        valence
    }
}

impl PolarityScorer for SentimentIntensityAnalyzer {
    fn polarity_scores(&self, text: &str) -> PolarityScores {
        let words: Vec<&str> = text.split_whitespace().map(strip_punc_if_word).collect();
        let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
        let cap_diff = allcap_differential(&words);

        let mut sentiments = Vec::with_capacity(words.len());
        for i in 0..words.len() {
            let modifier = self.boosters.contains_key(lower[i].as_str())
                || (lower[i] == "kind" && lower.get(i + 1).is_some_and(|next| next == "of"));
            if modifier {
                sentiments.push(0.0);
            } else {
                sentiments.push(self.sentiment_valence(&words, &lower, i, cap_diff));
            }
        }
        but_check(&lower, &mut sentiments);
        score_valence(&sentiments, text)
    }
}

fn least_check(lexicon: &ValenceLexicon, valence: f64, lower: &[String], i: usize) -> f64 {
    if i > 0 && lower[i - 1] == "least" && !lexicon.contains(&lower[i - 1]) {
        if i > 1 && (lower[i - 2] == "at" || lower[i - 2] == "very") {
            return valence;
        }
        return valence * N_SCALAR;
    }
    valence
}

fn but_check(lower: &[String], sentiments: &mut [f64]) {
    if let Some(bi) = lower.iter().position(|w| w == "but") {
        for (si, sentiment) in sentiments.iter_mut().enumerate() {
            if si < bi {
                *sentiment *= 0.5;
            } else if si > bi {
                *sentiment *= 1.5;
            }
        }
    }
}

fn punctuation_emphasis(text: &str) -> f64 {
    let ep_count = text.matches('!').count().min(4);
    let qm_count = text.matches('?').count();
    let qm_amplifier = match qm_count {
        0 | 1 => 0.0,
        2 | 3 => qm_count as f64 * 0.18,
        _ => 0.96,
    };
    ep_count as f64 * 0.292 + qm_amplifier
}

fn score_valence(sentiments: &[f64], text: &str) -> PolarityScores {
    if sentiments.is_empty() {
        return PolarityScores::default();
    }
    let punct = punctuation_emphasis(text);
    let mut sum: f64 = sentiments.iter().sum();
    if sum > 0.0 {
        sum += punct;
    } else if sum < 0.0 {
        sum -= punct;
    }
    let compound = (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0);

    let (mut pos_sum, mut neg_sum, mut neu_count) = (0.0, 0.0, 0.0);
    for &s in sentiments {
        if s > 0.0 {
            pos_sum += s + 1.0;
        } else if s < 0.0 {
            neg_sum += s - 1.0;
        } else {
            neu_count += 1.0;
        }
    }
    if pos_sum > neg_sum.abs() {
        pos_sum += punct;
    } else if pos_sum < neg_sum.abs() {
        neg_sum -= punct;
    }
    let total = pos_sum + neg_sum.abs() + neu_count;
    PolarityScores {
        neg: round_to(neg_sum.abs() / total, 3),
        neu: round_to(neu_count / total, 3),
        pos: round_to(pos_sum.abs() / total, 3),
        compound: round_to(compound, 4),
    }
}

fn round_to(x: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (x * scale).round() / scale
}

/// at least one cased character and no lowercase one
fn is_upper(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}

/// true when some, but not all, words are ALL CAPS
fn allcap_differential(words: &[&str]) -> bool {
    let allcap = words.iter().filter(|w| is_upper(w)).count();
    let differential = words.len() - allcap;
    differential > 0 && differential < words.len()
}

/// strip surrounding punctuation unless that leaves two characters or less
/// (keeps emoticons like `:)` intact)
fn strip_punc_if_word(token: &str) -> &str {
    let stripped = token.trim_matches(|c: char| c.is_ascii_punctuation());
    if stripped.chars().count() <= 2 {
        token
    } else {
        stripped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compound(text: &str) -> f64 {
        SentimentIntensityAnalyzer::new().compound(text)
    }

    #[test]
    fn polarity_follows_opinion_words() {
        assert!(compound("I love this wonderful country") > 0.5);
        assert!(compound("This is a terrible and awful law") < -0.5);
        assert_eq!(compound("The committee meets on Tuesday"), 0.0);
        assert_eq!(compound("   "), 0.0);
    }

    #[test]
    fn single_word_matches_normalization() {
        // great = 3.1 -> 3.1 / sqrt(3.1² + 15)
        let expected = 3.1 / (3.1f64 * 3.1 + 15.0).sqrt();
        assert!((compound("great") - expected).abs() < 1e-4);
    }

    #[test]
    fn negation_flips_and_dampens() {
        let plain = compound("the plan is good");
        let negated = compound("the plan is not good");
        let contracted = compound("the plan isn't good");
        assert!(plain > 0.0);
        assert!(negated < 0.0 && negated.abs() < plain);
        assert!((negated - contracted).abs() < 1e-9);
    }

    #[test]
    fn boosters_caps_and_punctuation_intensify() {
        let base = compound("the plan is good");
        assert!(compound("the plan is very good") > base);
        assert!(compound("the plan is slightly good") < base);
        assert!(compound("the plan is GOOD") > base);
        assert!(compound("the plan is good!!!") > base);
    }

    #[test]
    fn but_shifts_weight_to_second_clause() {
        assert!(compound("the food is good but the service is terrible") < 0.0);
        assert!(compound("the food is terrible but the service is good") > 0.0);
    }

    #[test]
    fn breakdown_sums_to_one() {
        let scores = SentimentIntensityAnalyzer::new().polarity_scores("I love it but the price is bad");
        assert!((scores.neg + scores.neu + scores.pos - 1.0).abs() < 0.01);
        assert!(scores.pos > 0.0 && scores.neg > 0.0);
        assert!((-1.0..=1.0).contains(&scores.compound));
    }

    #[test]
    fn custom_lexicon_is_used() {
        let analyzer = SentimentIntensityAnalyzer::with_lexicon(ValenceLexicon::from_entries([("wall", -2.0)]));
        assert!(analyzer.compound("the wall") < 0.0);
        assert_eq!(analyzer.compound("great"), 0.0);
    }
}
