use std::sync::Arc;

use topic_sentiment::{
    config::LdaConfig, AnnotateError, EmbeddingModel, GroupComparator, InputRecord, Pipeline, PipelineConfig,
    TopicCatalog, TopicScoreMatrix,
};

fn model() -> EmbeddingModel {
    EmbeddingModel::from_vectors(vec![
        ("immigration", vec![1.0, 0.0, 0.0]),
        ("border", vec![0.98, 0.02, 0.0]),
        ("wall", vec![0.95, 0.05, 0.1]),
        ("security", vec![0.9, 0.05, 0.2]),
        ("reform", vec![0.7, 0.1, 0.4]),
        ("health", vec![0.0, 1.0, 0.0]),
        ("insurance", vec![0.02, 0.97, 0.05]),
        ("healthcare", vec![0.05, 0.95, 0.0]),
        ("premium", vec![0.0, 0.9, 0.2]),
        ("cost", vec![0.1, 0.7, 0.5]),
    ])
    .unwrap()
}

fn config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.collocation.min_count = 2;
    config.vocabulary.no_below = 1;
    config.vocabulary.no_above = 1.0;
    config.lexicon.size = 4;
    config
}

fn catalog() -> TopicCatalog {
    TopicCatalog::new()
        .with_topic("immigration", ["border", "immigration"])
        .with_topic("healthcare", ["health", "insurance"])
}

fn records() -> Vec<InputRecord> {
    vec![
        InputRecord::new("1", "The border wall needs funding for immigration control.")
            .with_metadata("party", "R"),
        InputRecord::new("2", "Healthcare costs are rising due to insurance premiums.")
            .with_metadata("party", "D"),
        InputRecord::new("3", "Border security and immigration reform are urgent.")
            .with_metadata("party", "D"),
    ]
}

#[test]
fn three_document_scenario() {
    let pipeline = Pipeline::new(config(), catalog(), Arc::new(model())).unwrap();
    let corpus = pipeline.run(records()).unwrap();

    assert!(corpus.failures.is_empty());
    let topics: Vec<Vec<&str>> = corpus
        .documents
        .iter()
        .map(|d| d.topics.iter().map(String::as_str).collect())
        .collect();
    assert_eq!(topics, vec![vec!["immigration"], vec!["healthcare"], vec!["immigration"]]);

    for doc in &corpus.documents {
        assert!((-1.0..=1.0).contains(&doc.compound));
        assert_eq!(doc.bow.expand(&corpus.vocabulary).len(), doc.tokens.len());
    }
    assert_eq!(corpus.documents[1].tokens, vec!["healthcare", "cost", "rise", "insurance", "premium"]);
}

#[test]
fn lexicons_are_deterministic() {
    let pipeline = Pipeline::new(config(), catalog(), Arc::new(model())).unwrap();
    let a = pipeline.run(records()).unwrap();
    let b = pipeline.run(records()).unwrap();
    assert_eq!(a.lexicons, b.lexicons);
    assert_eq!(a.vocabulary, b.vocabulary);

    let immigration = a.lexicons.get("immigration").unwrap();
    let words: Vec<&str> = immigration.words().map(|(w, _)| w).collect();
    assert_eq!(words, vec!["border", "immigration", "wall", "security"]);
}

#[test]
fn score_matrix_from_run() {
    let pipeline = Pipeline::new(config(), catalog(), Arc::new(model())).unwrap();
    let corpus = pipeline.run(records()).unwrap();
    let matrix = corpus.score_matrix(None, "party");
    assert_eq!(matrix.topics(), ["immigration", "healthcare"]);

    let row = &matrix.rows()[1];
    assert_eq!(row.cells[0], None);
    assert_eq!(row.cells[1], Some(corpus.documents[1].compound));

    let json = matrix.export("party");
    assert!(json[0].get(TopicScoreMatrix::column_name("immigration")).is_some());
    assert_eq!(json[1]["immigration_compound_score"], serde_json::Value::Null);

    // a single document per group and topic cannot be tested
    let report = GroupComparator::default().compare(&matrix, "R", "D");
    assert_eq!(report.topics.len(), 2);
    assert!(report
        .topics
        .iter()
        .all(|t| matches!(t.outcome, topic_sentiment::ComparisonOutcome::InsufficientSamples { .. })));
}

#[test]
fn latent_topics_over_the_run() {
    let pipeline = Pipeline::new(config(), catalog(), Arc::new(model())).unwrap();
    let corpus = pipeline.run(records()).unwrap();
    let lda = LdaConfig {
        n_topics: 3,
        n_iter: 50,
        ..LdaConfig::default()
    };
    let a = corpus.lda(&lda).unwrap();
    assert_eq!(a, corpus.lda(&lda).unwrap());
    assert_eq!(a.topic_term_matrix().dim(), (3, corpus.vocabulary.len()));
    assert_eq!(a.document_topics().nrows(), corpus.documents.len());
    assert_eq!(a.top_terms(0, 2).len(), 2);
}

#[test]
fn inflected_seed_matches_its_lemma() {
    let catalog = TopicCatalog::new().with_topic("climate", ["melting", "temperature"]);
    let pipeline = Pipeline::new(config(), catalog, Arc::new(model())).unwrap();
    let corpus = pipeline
        .run(vec![InputRecord::new("1", "Melting melting melting.")])
        .unwrap();
    let doc = &corpus.documents[0];
    assert_eq!(doc.tokens, vec!["melt", "melt", "melt"]);
    assert!(doc.has_topic("climate"));
    assert_eq!(corpus.lexicons.get("climate").unwrap().seeds, vec!["melt", "temperature"]);
}

#[test]
fn stopword_only_seed_set_aborts_the_run() {
    let catalog = TopicCatalog::new().with_topic("coal", ["mine"]);
    let pipeline = Pipeline::new(config(), catalog, Arc::new(model())).unwrap();
    let result = pipeline.run(records());
    assert!(matches!(result, Err(AnnotateError::EmptySeedSet { topic }) if topic == "coal"));
}

#[test]
fn empty_seed_set_aborts() {
    let catalog = TopicCatalog::new().with_topic("empty", ["  "]);
    let result = Pipeline::new(config(), catalog, Arc::new(model()));
    assert!(matches!(result, Err(AnnotateError::EmptySeedSet { topic }) if topic == "empty"));
}

#[test]
fn missing_model_file_is_fatal() {
    let result = EmbeddingModel::load("/nonexistent/vectors.txt");
    assert!(matches!(result, Err(AnnotateError::ModelUnavailable { .. })));
}
