use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use proptest::prelude::*;
use topic_sentiment::{
    config::{AssignmentConfig, VocabularyConfig},
    pipeline::AnnotatedDocument,
    text::Normalizer,
    AnnotateError, BagOfWords, EmbeddingModel, InputRecord, LexiconExpander, Pca, Pipeline, PipelineConfig,
    PolarityScorer, SentimentIntensityAnalyzer, TopicAssigner, TopicCatalog, TopicScoreMatrix, Vocabulary,
};

const TERMS: &[&str] = &["tax", "war", "coal", "wall", "vote", "job", "law", "gun", "oil", "fee"];

fn corpus() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(
        prop::collection::vec(prop::sample::select(TERMS).prop_map(str::to_string), 0..12),
        0..25,
    )
}

proptest! {
    #[test]
    fn vocabulary_respects_frequency_bounds(
        docs in corpus(),
        no_below in 1u64..4,
        no_above in 0.1f64..=1.0,
    ) {
        let config = VocabularyConfig { no_below, no_above, keep_n: None };
        let vocab = Vocabulary::build(&docs, &config);
        let max_df = no_above * docs.len() as f64;
        let ids: Vec<u32> = vocab.iter().map(|(id, _, _)| id).collect();
        prop_assert_eq!(ids, (0..vocab.len() as u32).collect::<Vec<_>>());
        for (id, term, stats) in vocab.iter() {
            prop_assert!(stats.doc_freq >= no_below);
            prop_assert!(stats.doc_freq as f64 <= max_df);
            prop_assert_eq!(vocab.id_of(term), Some(id));
        }
    }

    #[test]
    fn bag_of_words_round_trips_in_vocabulary_documents(docs in corpus()) {
        let config = VocabularyConfig { no_below: 1, no_above: 1.0, keep_n: None };
        let vocab = Vocabulary::build(&docs, &config);
        for (doc, bow) in docs.iter().zip(vocab.encode_corpus(&docs).unwrap()) {
            let mut expected = doc.clone();
            expected.sort();
            let mut decoded = bow.expand(&vocab);
            decoded.sort();
            prop_assert_eq!(decoded, expected);
            prop_assert_eq!(bow.total(), doc.len() as u64);
        }
    }

    #[test]
    fn compound_score_is_bounded(text in "[a-zA-Z!?., ]{0,80}") {
        let score = SentimentIntensityAnalyzer::new().compound(&text);
        prop_assert!((-1.0..=1.0).contains(&score));
    }

    #[test]
    fn normalizer_is_idempotent(text in "[a-zA-Z0-9éÉ .,!?'\\n\\r_-]{0,60}") {
        let normalizer = Normalizer::new();
        let once = normalizer.normalize(&text);
        prop_assert_eq!(normalizer.normalize(&once), once);
    }

    #[test]
    fn topics_need_a_lexicon_hit(tokens in prop::collection::vec(prop::sample::select(TERMS), 0..10)) {
        let model = EmbeddingModel::from_vectors(vec![
            ("tax", vec![1.0, 0.0]),
            ("fee", vec![0.9, 0.1]),
            ("war", vec![0.0, 1.0]),
            ("gun", vec![0.1, 0.9]),
        ]).unwrap();
        let catalog = TopicCatalog::new().with_topic("tax", ["tax"]).with_topic("war", ["war"]);
        let lexicons = LexiconExpander::new(Arc::new(model), 2).expand_catalog(&catalog).unwrap();
        let assigner = TopicAssigner::new(&lexicons, &AssignmentConfig::default());
        let assigned = assigner.assign(&tokens);
        for lexicon in lexicons.iter() {
            let hit = tokens.iter().any(|t| lexicon.contains(t));
            prop_assert_eq!(assigned.contains(&lexicon.topic), hit);
        }
    }

    #[test]
    fn aggregator_cells_follow_topics(
        compound in -1.0f64..=1.0,
        flags in prop::collection::vec(any::<bool>(), 4),
    ) {
        let names = ["tax", "war", "coal", "women right"];
        let topics: BTreeSet<String> = names
            .iter()
            .zip(&flags)
            .filter(|(_, &on)| on)
            .map(|(n, _)| n.to_string())
            .collect();
        let doc = AnnotatedDocument {
            id: "d".to_string(),
            text: String::new(),
            normalized: String::new(),
            tokens: Vec::new(),
            bow: BagOfWords::default(),
            compound,
            topics,
            metadata: BTreeMap::new(),
        };
        let matrix = TopicScoreMatrix::from_documents(&[doc], &names, None, "party");
        for (cell, &on) in matrix.rows()[0].cells.iter().zip(&flags) {
            prop_assert_eq!(*cell, on.then_some(compound));
        }
    }

    #[test]
    fn pca_ratios_are_ordered(rows in prop::collection::vec(prop::collection::vec(-1.0f64..1.0, 3), 4..20)) {
        let data = ndarray::Array2::from_shape_vec((rows.len(), 3), rows.concat()).unwrap();
        match Pca::new(2).fit_transform_dense(&data) {
            Ok(projection) => {
                let r = projection.explained_variance_ratio();
                prop_assert!(r.iter().all(|&x| x >= 0.0));
                prop_assert!(r.iter().sum::<f64>() <= 1.0 + 1e-9);
                prop_assert!(r.windows(2).all(|w| w[0] + 1e-12 >= w[1]));
            }
            Err(e) => prop_assert!(
                matches!(e, AnnotateError::InvalidComponentCount { .. }),
                "unexpected error {e:?}"
            ),
        }
    }
}

#[test]
fn sentiment_reference_sentences() {
    let analyzer = SentimentIntensityAnalyzer::new();
    assert!(analyzer.compound("I love this, it is wonderful and great.") > 0.5);
    assert!(analyzer.compound("I hate this, it is terrible and awful.") < -0.5);
    assert_eq!(analyzer.compound(""), 0.0);
}

#[test]
fn seed_only_document_gets_its_topic() {
    let model = EmbeddingModel::from_vectors(vec![("coal", vec![1.0, 0.0]), ("tax", vec![0.0, 1.0])]).unwrap();
    let catalog = TopicCatalog::political_default();
    let mut config = PipelineConfig::default();
    config.lexicon.size = 20;
    let pipeline = Pipeline::new(config, catalog.clone(), Arc::new(model)).unwrap();

    // multi-word seeds only match once they are frequent enough to be collocations
    let records: Vec<InputRecord> = catalog
        .iter()
        .filter(|(_, seeds)| !seeds[0].contains(' '))
        .map(|(topic, seeds)| InputRecord::new(topic, vec![seeds[0].as_str(); 3].join(" ")))
        .collect();
    assert!(records.len() >= 9);

    let corpus = pipeline.run(records).unwrap();
    for doc in &corpus.documents {
        assert!(doc.has_topic(&doc.id), "{} not assigned to {:?}", doc.id, doc.tokens);
    }
}
