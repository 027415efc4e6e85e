use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use ahash::RandomState;

use crate::error::{AnnotateError, Result};

/// Word -> mean valence rating (roughly -4 .. +4)
#[derive(Debug, Clone)]
pub struct ValenceLexicon {
    valences: HashMap<String, f64, RandomState>,
}

impl Default for ValenceLexicon {
    fn default() -> Self {
        Self::from_entries(DEFAULT_VALENCES.iter().map(|&(w, v)| (w, v)))
    }
}

impl ValenceLexicon {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut valences = HashMap::with_hasher(RandomState::new());
        valences.extend(entries.into_iter().map(|(w, v)| (w.as_ref().to_lowercase(), v)));
        Self { valences }
    }

    /// Read a `word<TAB>mean[<TAB>...]` lexicon file
    ///
    /// # Errors
    /// * `ModelUnavailable` - unreadable file, malformed line or no entries
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let unavailable = |reason: String| AnnotateError::ModelUnavailable {
            model: path.display().to_string(),
            reason,
        };

        let file = File::open(path).map_err(|e| unavailable(e.to_string()))?;
        let mut valences = HashMap::with_hasher(RandomState::new());
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| unavailable(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split('\t');
            let (Some(word), Some(mean)) = (fields.next(), fields.next()) else {
                return Err(unavailable(format!("line {}: expected word<TAB>mean", line_no + 1)));
            };
            let mean: f64 = mean
                .trim()
                .parse()
                .map_err(|e| unavailable(format!("line {}: {e}", line_no + 1)))?;
            valences.insert(word.trim().to_lowercase(), mean);
        }
        if valences.is_empty() {
            return Err(unavailable("empty lexicon".to_string()));
        }
        Ok(Self { valences })
    }

    #[inline]
    pub fn get(&self, word: &str) -> Option<f64> {
        self.valences.get(word).copied()
    }

    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.valences.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.valences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valences.is_empty()
    }
}

pub(crate) const B_INCR: f64 = 0.293;
pub(crate) const B_DECR: f64 = -0.293;
/// all-caps emphasis
pub(crate) const C_INCR: f64 = 0.733;
pub(crate) const N_SCALAR: f64 = -0.74;

pub(crate) const NEGATE: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "darent", "didnt", "doesnt", "ain't", "aren't",
    "can't", "couldn't", "daren't", "didn't", "doesn't", "dont", "hadnt", "hasnt", "havent", "isnt",
    "mightnt", "mustnt", "neither", "don't", "hadn't", "hasn't", "haven't", "isn't", "mightn't",
    "mustn't", "neednt", "needn't", "never", "none", "nope", "nor", "not", "nothing", "nowhere",
    "oughtnt", "shant", "shouldnt", "uhuh", "wasnt", "werent", "oughtn't", "shan't", "shouldn't",
    "uh-uh", "wasn't", "weren't", "without", "wont", "wouldnt", "won't", "wouldn't", "rarely",
    "seldom", "despite",
];

/// intensity modifiers
pub(crate) const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", B_INCR), ("amazingly", B_INCR), ("awfully", B_INCR), ("completely", B_INCR),
    ("considerable", B_INCR), ("considerably", B_INCR), ("decidedly", B_INCR), ("deeply", B_INCR),
    ("enormous", B_INCR), ("enormously", B_INCR), ("entirely", B_INCR), ("especially", B_INCR),
    ("exceptional", B_INCR), ("exceptionally", B_INCR), ("extreme", B_INCR), ("extremely", B_INCR),
    ("fabulously", B_INCR), ("fully", B_INCR), ("greatly", B_INCR), ("highly", B_INCR),
    ("hugely", B_INCR), ("incredible", B_INCR), ("incredibly", B_INCR), ("intensely", B_INCR),
    ("major", B_INCR), ("majorly", B_INCR), ("more", B_INCR), ("most", B_INCR),
    ("particularly", B_INCR), ("purely", B_INCR), ("quite", B_INCR), ("really", B_INCR),
    ("remarkably", B_INCR), ("so", B_INCR), ("substantially", B_INCR), ("thoroughly", B_INCR),
    ("total", B_INCR), ("totally", B_INCR), ("tremendous", B_INCR), ("tremendously", B_INCR),
    ("uber", B_INCR), ("unbelievably", B_INCR), ("unusually", B_INCR), ("utter", B_INCR),
    ("utterly", B_INCR), ("very", B_INCR),
    ("almost", B_DECR), ("barely", B_DECR), ("hardly", B_DECR), ("just enough", B_DECR),
    ("kind of", B_DECR), ("kinda", B_DECR), ("kindof", B_DECR), ("kind-of", B_DECR),
    ("less", B_DECR), ("little", B_DECR), ("marginal", B_DECR), ("marginally", B_DECR),
    ("occasional", B_DECR), ("occasionally", B_DECR), ("partly", B_DECR), ("scarce", B_DECR),
    ("scarcely", B_DECR), ("slight", B_DECR), ("slightly", B_DECR), ("somewhat", B_DECR),
    ("sort of", B_DECR), ("sorta", B_DECR), ("sortof", B_DECR), ("sort-of", B_DECR),
];

/// multi-word expressions whose valence replaces the word's own
pub(crate) const SPECIAL_CASES: &[(&str, f64)] = &[
    ("the shit", 3.0), ("the bomb", 3.0), ("bad ass", 1.5), ("badass", 1.5), ("bus stop", 0.0),
    ("yeah right", -2.0), ("kiss of death", -1.5), ("to die for", 3.0), ("beating heart", 3.1),
    ("broken heart", -2.9),
];

/// Embedded subset of a crowd-rated valence lexicon
/// common opinion words of news and political speech
const DEFAULT_VALENCES: &[(&str, f64)] = &[
    // positive
    ("accept", 1.6), ("accepted", 1.1), ("admire", 2.1), ("agree", 1.5), ("agreement", 2.2),
    ("amazing", 2.8), ("appreciate", 1.7), ("awesome", 3.1), ("beautiful", 2.9), ("benefit", 2.0),
    ("benefits", 1.6), ("best", 3.2), ("better", 1.9), ("brave", 2.4), ("brilliant", 2.8),
    ("care", 2.2), ("celebrate", 2.7), ("confident", 2.2), ("congratulations", 2.9),
    ("courage", 2.2), ("excellent", 2.7), ("excited", 1.4), ("fair", 1.3), ("fantastic", 2.6),
    ("free", 2.3), ("freedom", 3.2), ("friend", 2.2), ("fun", 2.3), ("glad", 2.0), ("good", 1.9),
    ("great", 3.1), ("greatest", 3.2), ("happy", 2.7), ("healthy", 1.7), ("help", 1.7),
    ("helpful", 1.8), ("honest", 2.3), ("honor", 2.2), ("hope", 1.9), ("hopeful", 2.3),
    ("importance", 1.5), ("improve", 1.9), ("improved", 2.1), ("inspiring", 2.6),
    ("interesting", 1.7), ("joy", 2.8), ("justice", 2.4), ("kind", 2.4), ("like", 2.0),
    ("liked", 1.8), ("love", 3.2), ("loved", 2.9), ("lovely", 2.8), ("loving", 2.9), ("nice", 1.8),
    ("ok", 1.2), ("okay", 0.9), ("opportunity", 1.8), ("peace", 2.5), ("peaceful", 2.2),
    ("perfect", 2.7), ("pleased", 1.9), ("positive", 2.6), ("progress", 1.8), ("promise", 1.3),
    ("prosperous", 2.1), ("protect", 1.6), ("protection", 1.3), ("proud", 2.1), ("respect", 2.1),
    ("safe", 1.9), ("safety", 1.8), ("save", 2.2), ("secure", 1.4), ("smart", 1.7), ("strong", 2.3),
    ("strength", 2.2), ("success", 2.7), ("successful", 2.8), ("support", 1.7), ("supported", 1.3),
    ("thank", 1.5), ("thanks", 1.9), ("trust", 2.3), ("united", 1.8), ("victory", 2.8),
    ("welcome", 2.0), ("win", 2.8), ("winning", 2.4), ("wonderful", 2.7), ("yes", 1.7),
    // negative
    ("abuse", -3.2), ("afraid", -2.2), ("anger", -2.7), ("angry", -2.3), ("attack", -2.1),
    ("attacked", -2.0), ("awful", -2.0), ("bad", -2.5), ("ban", -2.6), ("blame", -1.4),
    ("catastrophe", -3.4), ("chaos", -2.7), ("cheat", -2.0), ("collapse", -2.2),
    ("corrupt", -3.0), ("crime", -2.5), ("criminal", -2.4), ("crisis", -3.1), ("cruel", -2.8),
    ("damage", -2.2), ("danger", -2.4), ("dangerous", -2.1), ("dead", -3.3), ("death", -2.9),
    ("destroy", -2.5), ("destroyed", -2.8), ("die", -2.9), ("disaster", -3.1), ("disgrace", -2.0),
    ("disgusting", -2.4), ("evil", -3.4), ("fail", -2.5), ("failed", -2.3), ("failure", -2.3),
    ("fake", -2.1), ("fear", -2.2), ("fight", -1.6), ("fraud", -2.8), ("harm", -2.5),
    ("hate", -2.7), ("hated", -3.2), ("horrible", -2.5), ("hurt", -2.4), ("illegal", -2.6),
    ("kill", -3.7), ("killed", -3.5), ("killing", -3.4), ("liar", -3.1), ("lie", -1.6),
    ("lies", -1.8), ("lose", -1.6), ("loss", -1.3), ("lost", -1.3), ("no", -1.2), ("pain", -2.3),
    ("poor", -2.1), ("problem", -1.7), ("problems", -1.7), ("racism", -3.1), ("racist", -3.1),
    ("sad", -2.1), ("scandal", -1.9), ("shame", -2.1), ("sick", -2.3), ("stupid", -2.4),
    ("suffer", -2.5), ("suffering", -2.1), ("terrible", -2.1), ("terror", -3.0), ("threat", -2.4),
    ("tragedy", -3.4), ("ugly", -2.3), ("unfair", -2.1), ("violence", -3.1), ("violent", -2.9),
    ("war", -2.9), ("weak", -1.9), ("worried", -1.2), ("worry", -1.9), ("worse", -2.1),
    ("worst", -3.1), ("wrong", -2.1),
];
