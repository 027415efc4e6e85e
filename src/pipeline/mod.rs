pub mod document;

use std::{collections::HashSet, sync::Arc};

use ahash::RandomState;
use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{info, info_span, warn};

use crate::{
    aggregate::TopicScoreMatrix,
    config::{LdaConfig, PipelineConfig},
    error::{DocumentError, DocumentFailure, Result},
    sentiment::{analyzer::SentimentIntensityAnalyzer, PolarityScorer},
    text::{Lemmatizer, Normalizer, RuleLemmatizer, Tokenizer},
    topic::{
        assigner::TopicAssigner,
        catalog::TopicCatalog,
        embedding::{AssociationModel, EmbeddingModel},
        lda::LdaModel,
        lexicon::{LexiconExpander, LexiconSet},
    },
    vectorizer::{bow::BagOfWords, collocation::Phrases},
    Vocabulary,
};

pub use document::{AnnotatedDocument, Document, InputRecord, RawText, TokenizedDocument};

/// Output of a pipeline run
#[derive(Debug, Clone)]
pub struct AnnotatedCorpus {
    /// annotated documents, in input order
    pub documents: Vec<AnnotatedDocument>,
    /// rows skipped at ingestion
    pub failures: Vec<DocumentFailure>,
    pub vocabulary: Vocabulary,
    pub phrases: Phrases,
    pub lexicons: LexiconSet,
}

impl AnnotatedCorpus {
    pub fn topics(&self) -> Vec<&str> {
        self.lexicons.topics().collect()
    }

    /// Latent topics of the run's bag-of-words corpus
    ///
    /// # Errors
    /// * `InvalidParameter` - invalid `config`
    pub fn lda(&self, config: &LdaConfig) -> Result<LdaModel> {
        let bows: Vec<BagOfWords> = self.documents.iter().map(|d| d.bow.clone()).collect();
        LdaModel::fit(&bows, &self.vocabulary, config)
    }

    /// Per-document topic score matrix over every topic of the run
    pub fn score_matrix(&self, entity_column: Option<&str>, group_column: &str) -> TopicScoreMatrix {
        TopicScoreMatrix::from_documents(&self.documents, &self.topics(), entity_column, group_column)
    }
}

/// Results of the text stages, before topics and sentiment
struct TextStages {
    documents: Vec<TokenizedDocument>,
    failures: Vec<DocumentFailure>,
    phrases: Phrases,
    vocabulary: Vocabulary,
    bows: Vec<BagOfWords>,
}

/// Batch annotation pipeline
///
/// `Pipeline<M, S, L>` has three generic parameters:
/// - `M`: association model used for lexicon expansion (default [`EmbeddingModel`])
/// - `S`: polarity scorer (default [`SentimentIntensityAnalyzer`])
/// - `L`: lemmatizer (default [`RuleLemmatizer`])
///
/// Every service is constructed once and shared read-only by the worker pool.
#[derive(Debug)]
pub struct Pipeline<M = EmbeddingModel, S = SentimentIntensityAnalyzer, L = RuleLemmatizer>
where
    M: AssociationModel,
    S: PolarityScorer,
    L: Lemmatizer,
{
    config: PipelineConfig,
    catalog: TopicCatalog,
    normalizer: Normalizer,
    tokenizer: Arc<Tokenizer<L>>,
    expander: LexiconExpander<M, L>,
    scorer: S,
}

impl<M> Pipeline<M>
where
    M: AssociationModel,
{
    /// Pipeline with the default sentiment analyzer and lemmatizer
    ///
    /// # Errors
    /// * `InvalidParameter` - config out of range
    /// * `EmptySeedSet` - a catalog topic without seeds
    pub fn new(config: PipelineConfig, catalog: TopicCatalog, model: Arc<M>) -> Result<Self> {
        config.validate()?;
        catalog.validate()?;
        let tokenizer = Arc::new(Tokenizer::from_config(&config.tokenizer));
        Ok(Self {
            expander: LexiconExpander::new(model, config.lexicon.size)
                .with_tokenizer(Arc::clone(&tokenizer), &config.collocation.delimiter),
            tokenizer,
            normalizer: Normalizer::new(),
            scorer: SentimentIntensityAnalyzer::new(),
            config,
            catalog,
        })
    }
}

impl<M, S, L> Pipeline<M, S, L>
where
    M: AssociationModel,
    S: PolarityScorer,
    L: Lemmatizer,
{
    /// Replace the polarity scorer
    pub fn with_scorer<S2: PolarityScorer>(self, scorer: S2) -> Pipeline<M, S2, L> {
        Pipeline {
            config: self.config,
            catalog: self.catalog,
            normalizer: self.normalizer,
            tokenizer: self.tokenizer,
            expander: self.expander,
            scorer,
        }
    }

    /// Replace the lemmatizer, lexicons follow the new token space
    pub fn with_lemmatizer<L2: Lemmatizer>(self, lemmatizer: L2) -> Pipeline<M, S, L2> {
        let tokenizer = Arc::new(Tokenizer::with_lemmatizer(&self.config.tokenizer, lemmatizer));
        Pipeline {
            expander: self
                .expander
                .with_tokenizer(Arc::clone(&tokenizer), &self.config.collocation.delimiter),
            tokenizer,
            config: self.config,
            catalog: self.catalog,
            normalizer: self.normalizer,
            scorer: self.scorer,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TopicCatalog {
        &self.catalog
    }

    /// Validate and normalize input rows
    ///
    /// Rows with missing text, undecodable bytes or an id seen before are
    /// returned as failures. The first row with a given id wins.
    pub fn ingest(&self, records: Vec<InputRecord>) -> (Vec<Document>, Vec<DocumentFailure>) {
        let _span = info_span!("stage", name = "ingest").entered();
        let mut seen: HashSet<String, RandomState> = HashSet::with_hasher(RandomState::new());
        let mut valid = Vec::with_capacity(records.len());
        let mut failures = Vec::new();
        for record in records {
            // 失敗した行もidを消費する
            let decoded = if !seen.insert(record.id.clone()) {
                Err(DocumentError::DuplicateId)
            } else {
                record.text.ok_or(DocumentError::MissingText).and_then(RawText::decode)
            };
            match decoded {
                Ok(text) => {
                    valid.push((record.id, text, record.metadata));
                }
                Err(error) => {
                    warn!(id = %record.id, %error, "document skipped");
                    failures.push(DocumentFailure { id: record.id, error });
                }
            }
        }

        let documents: Vec<Document> = valid
            .into_par_iter()
            .map(|(id, text, metadata)| Document {
                normalized: self.normalizer.normalize(&text),
                id,
                text,
                metadata,
            })
            .collect();
        info!(documents = documents.len(), skipped = failures.len(), "documents ingested");
        (documents, failures)
    }

    /// Lemma tokens of every document
    pub fn tokenize(&self, documents: Vec<Document>) -> Vec<TokenizedDocument> {
        let _span = info_span!("stage", name = "tokenize").entered();
        let tokenized: Vec<TokenizedDocument> = documents
            .into_par_iter()
            .map(|doc| TokenizedDocument {
                tokens: self.tokenizer.tokenize(&doc.normalized),
                id: doc.id,
                text: doc.text,
                normalized: doc.normalized,
                metadata: doc.metadata,
            })
            .collect();
        info!(
            documents = tokenized.len(),
            tokens = tokenized.iter().map(|d| d.tokens.len()).sum::<usize>(),
            "documents tokenized"
        );
        tokenized
    }

    /// Fit collocations and append them to every token sequence
    pub fn detect_collocations(&self, documents: &mut [TokenizedDocument]) -> Phrases {
        let _span = info_span!("stage", name = "collocations").entered();
        let token_lists: Vec<&[String]> = documents.iter().map(|d| d.tokens.as_slice()).collect();
        let phrases = Phrases::fit(&token_lists, &self.config.collocation);
        documents
            .par_iter_mut()
            .for_each(|doc| doc.tokens = phrases.augment(&doc.tokens));
        phrases
    }

    /// Ingest, tokenize, detect collocations, build the vocabulary and encode
    fn text_stages(&self, records: Vec<InputRecord>) -> Result<TextStages> {
        let (documents, failures) = self.ingest(records);
        let mut documents = self.tokenize(documents);
        let phrases = self.detect_collocations(&mut documents);

        let token_lists: Vec<&[String]> = documents.iter().map(|d| d.tokens.as_slice()).collect();
        let vocabulary = {
            let _span = info_span!("stage", name = "vocabulary").entered();
            Vocabulary::build(&token_lists, &self.config.vocabulary)
        };
        let bows = {
            let _span = info_span!("stage", name = "encode").entered();
            vocabulary.encode_corpus(&token_lists)?
        };
        Ok(TextStages {
            documents,
            failures,
            phrases,
            vocabulary,
            bows,
        })
    }

    fn expand_lexicons(&self) -> Result<LexiconSet> {
        let _span = info_span!("stage", name = "expand").entered();
        self.expander.expand_catalog(&self.catalog)
    }

    /// Annotate a batch of records
    ///
    /// Lexicon expansion runs concurrently with the text stages. Topic
    /// assignment starts once every topic is expanded.
    ///
    /// # Errors
    /// Any lexicon expansion failure or a stale vocabulary aborts the run.
    /// Per-document defects do not, see [`AnnotatedCorpus::failures`].
    pub fn run(&self, records: Vec<InputRecord>) -> Result<AnnotatedCorpus> {
        let (lexicons, text) = rayon::join(|| self.expand_lexicons(), || self.text_stages(records));
        let lexicons = lexicons?;
        let TextStages {
            documents,
            failures,
            phrases,
            vocabulary,
            bows,
        } = text?;

        let _span = info_span!("stage", name = "annotate").entered();
        let assigner = TopicAssigner::new(&lexicons, &self.config.assignment);
        let documents: Vec<AnnotatedDocument> = documents
            .into_par_iter()
            .zip(bows.into_par_iter())
            .map(|(doc, bow)| AnnotatedDocument {
                topics: assigner.assign(&doc.tokens),
                compound: self.scorer.compound(&doc.text),
                id: doc.id,
                text: doc.text,
                normalized: doc.normalized,
                tokens: doc.tokens,
                bow,
                metadata: doc.metadata,
            })
            .collect();
        info!(
            documents = documents.len(),
            with_topic = documents.iter().filter(|d| !d.topics.is_empty()).count(),
            failures = failures.len(),
            "corpus annotated"
        );

        Ok(AnnotatedCorpus {
            documents,
            failures,
            vocabulary,
            phrases,
            lexicons,
        })
    }
}

/// Concatenate the texts of all records sharing a metadata value
///
/// Groups keep first-seen order, texts are joined with a single space.
/// Records without the column or without readable text are skipped.
pub fn join_texts_by(records: &[InputRecord], column: &str) -> Vec<(String, String)> {
    let mut joined: IndexMap<&str, String, RandomState> = IndexMap::with_hasher(RandomState::new());
    for record in records {
        let Some(key) = record.metadata.get(column) else {
            continue;
        };
        let text = match &record.text {
            Some(RawText::Utf8(text)) => text.as_str(),
            Some(RawText::Bytes(bytes)) => match std::str::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => continue,
            },
            None => continue,
        };
        let entry = joined.entry(key.as_str()).or_default();
        if !entry.is_empty() {
            entry.push(' ');
        }
        entry.push_str(text);
    }
    joined.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::PolarityScores;

    struct Fixed;

    impl PolarityScorer for Fixed {
        fn polarity_scores(&self, text: &str) -> PolarityScores {
            PolarityScores {
                compound: if text.contains("good") { 0.5 } else { -0.5 },
                ..PolarityScores::default()
            }
        }
    }

    fn pipeline() -> Pipeline {
        let model = EmbeddingModel::from_vectors(vec![
            ("tax", vec![1.0, 0.0]),
            ("budget", vec![0.9, 0.1]),
            ("coal", vec![0.0, 1.0]),
        ])
        .unwrap();
        let mut config = PipelineConfig::default();
        config.vocabulary.no_below = 1;
        config.vocabulary.no_above = 1.0;
        config.collocation.min_count = 2;
        config.lexicon.size = 1;
        let catalog = TopicCatalog::new().with_topic("tax", ["tax"]).with_topic("coal", ["coal"]);
        Pipeline::new(config, catalog, Arc::new(model)).unwrap()
    }

    #[test]
    fn ingestion_failures_are_recorded() {
        let records = vec![
            InputRecord::new("a", "Cut the budget."),
            InputRecord::empty("b"),
            InputRecord::from_bytes("c", vec![0xff, 0xfe]),
            InputRecord::new("a", "Second a."),
        ];
        let corpus = pipeline().run(records).unwrap();
        assert_eq!(corpus.documents.len(), 1);
        let errors: Vec<_> = corpus.failures.iter().map(|f| (f.id.as_str(), f.error.clone())).collect();
        assert_eq!(errors[0], ("b", DocumentError::MissingText));
        assert!(matches!(errors[1], ("c", DocumentError::InvalidEncoding(_))));
        assert_eq!(errors[2], ("a", DocumentError::DuplicateId));
    }

    #[test]
    fn failed_row_still_claims_its_id() {
        let records = vec![
            InputRecord::from_bytes("a", vec![0xc3, 0x28]),
            InputRecord::new("a", "Cut the tax."),
            InputRecord::new("b", "Cut the budget."),
        ];
        let (documents, failures) = pipeline().ingest(records);
        let ids: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
        assert_eq!(failures.len(), 2);
        assert!(matches!(failures[0].error, DocumentError::InvalidEncoding(_)));
        assert_eq!((failures[1].id.as_str(), failures[1].error.clone()), ("a", DocumentError::DuplicateId));
    }

    #[test]
    fn topics_and_scores() {
        let pipeline = pipeline().with_scorer(Fixed);
        let corpus = pipeline
            .run(vec![
                InputRecord::new("1", "A good tax cut for the middle class."),
                InputRecord::new("2", "Coal miners lost their jobs."),
            ])
            .unwrap();
        let docs = &corpus.documents;
        assert!(docs[0].has_topic("tax"));
        assert!(!docs[0].has_topic("coal"));
        assert!(docs[1].has_topic("coal"));
        assert_eq!(docs[0].compound, 0.5);
        assert_eq!(docs[1].compound, -0.5);
    }

    #[test]
    fn joins_texts_per_speaker() {
        let records = vec![
            InputRecord::new("1", "one").with_metadata("speaker", "ann"),
            InputRecord::new("2", "two").with_metadata("speaker", "bob"),
            InputRecord::new("3", "three").with_metadata("speaker", "ann"),
            InputRecord::new("4", "four"),
        ];
        assert_eq!(
            join_texts_by(&records, "speaker"),
            vec![("ann".to_string(), "one three".to_string()), ("bob".to_string(), "two".to_string())]
        );
    }
}
