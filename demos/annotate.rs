use std::sync::Arc;

use topic_sentiment::{
    aggregate::term_frequencies_by_group, pipeline::join_texts_by, text::StopWords, EmbeddingModel,
    GroupComparator, InputRecord, Pca, Pipeline, PipelineConfig, TfIdfVectorizer, TopicCatalog, TruncatedSvd,
};
use tracing_subscriber::EnvFilter;

const QUOTES: &[(&str, &str, &str)] = &[
    ("ann", "D", "We must protect families and fix our broken immigration system."),
    ("ann", "D", "Healthcare is a right, insurance premiums are crushing families."),
    ("bob", "R", "Build the wall and secure the border against illegal immigration!"),
    ("bob", "R", "Obamacare failed, healthcare costs are rising every year."),
    ("cid", "D", "Immigrants make this country great."),
    ("cid", "D", "Nobody should go bankrupt because of medical bills and healthcare costs."),
    ("dan", "R", "Illegal immigration hurts American workers."),
    ("dan", "R", "Government healthcare is a terrible disaster."),
];

/// tiny hand-made embedding space: immigration words on one axis, healthcare on another
fn model() -> EmbeddingModel {
    let rows: Vec<(&str, Vec<f32>)> = vec![
        ("immigration", vec![1.0, 0.0, 0.1]),
        ("immigrant", vec![0.95, 0.05, 0.1]),
        ("border", vec![0.9, 0.0, 0.2]),
        ("wall", vec![0.8, 0.1, 0.3]),
        ("illegal", vec![0.85, 0.05, 0.0]),
        ("healthcare", vec![0.0, 1.0, 0.1]),
        ("insurance", vec![0.05, 0.9, 0.2]),
        ("obamacare", vec![0.0, 0.95, 0.0]),
        ("medical", vec![0.1, 0.85, 0.1]),
        ("premium", vec![0.0, 0.8, 0.3]),
        ("family", vec![0.3, 0.3, 0.9]),
        ("worker", vec![0.3, 0.2, 1.0]),
    ];
    EmbeddingModel::from_vectors(rows).expect("demo vectors are well formed")
}

fn main() -> topic_sentiment::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let records: Vec<InputRecord> = QUOTES
        .iter()
        .enumerate()
        .map(|(i, (speaker, party, text))| {
            InputRecord::new(format!("q{i}"), *text)
                .with_metadata("speaker", *speaker)
                .with_metadata("party", *party)
        })
        .collect();

    let config = PipelineConfig::from_json_str(
        r#"{
            "collocation": { "min_count": 2 },
            "vocabulary": { "no_below": 1, "no_above": 0.9 },
            "lexicon": { "size": 4 },
            "lda": { "n_topics": 2, "n_iter": 100 }
        }"#,
    )?;
    let catalog = TopicCatalog::new()
        .with_topic("immigration", ["immigration", "border"])
        .with_topic("healthcare", ["healthcare", "obamacare"]);
    let pipeline = Pipeline::new(config.clone(), catalog, Arc::new(model()))?;
    let corpus = pipeline.run(records.clone())?;

    for doc in &corpus.documents {
        println!("{:>4} {:+.3} {:?} {:?}", doc.id, doc.compound, doc.topics, doc.tokens);
    }
    println!("vocabulary: {} terms, {} failures", corpus.vocabulary.len(), corpus.failures.len());

    // word cloud data per party
    let stop = StopWords::new(["people", "country"]);
    for (party, freq) in term_frequencies_by_group(&corpus.documents, "party", &stop) {
        println!("{party} ({} tokens): {:?}", freq.term_sum(), freq.most_frequent(5));
    }

    let lda = corpus.lda(&config.lda)?;
    for topic in 0..lda.n_topics() {
        println!("latent topic {topic}: {:?}", lda.top_terms(topic, 4));
    }

    let scores = corpus.score_matrix(Some("speaker"), "party").aggregate();
    println!("{}", serde_json::to_string_pretty(&scores.export("party"))?);

    let report = GroupComparator::from_config(&config.comparison).compare(&scores, "D", "R");
    println!("{report}");

    let projection = Pca::from_config(&config.reduction).fit_transform(&scores)?;
    println!("pca explained variance: {:?}", projection.explained_variance_ratio());

    let speakers = join_texts_by(&records, "speaker");
    let texts: Vec<&str> = speakers.iter().map(|(_, text)| text.as_str()).collect();
    let tfidf = TfIdfVectorizer::new().fit_transform(&texts);
    let speaker_projection = TruncatedSvd::from_config(&config.reduction).fit_transform(&tfidf)?;
    for ((speaker, _), point) in speakers.iter().zip(speaker_projection.coordinates().rows()) {
        println!("{speaker}: {point}");
    }
    Ok(())
}
