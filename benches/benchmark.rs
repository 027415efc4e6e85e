use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use topic_sentiment::{
    config::VocabularyConfig, text::Tokenizer, EmbeddingModel, InputRecord, Pipeline, PipelineConfig,
    PolarityScorer, SentimentIntensityAnalyzer, TopicCatalog, TruncatedSvd, TfIdfVectorizer, Vocabulary,
};

const WORDS: &[&str] = &[
    "border", "wall", "immigration", "visa", "healthcare", "insurance", "premium", "cost", "climate",
    "carbon", "coal", "mine", "tax", "budget", "war", "troops", "great", "terrible", "good", "bad",
    "families", "workers", "jobs", "rising", "falling", "country", "people", "change", "fight",
];

fn synthetic_quotes(n: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|_| {
            let mut words: Vec<&str> = (0..14).filter_map(|_| WORDS.choose(&mut rng).copied()).collect();
            words.push("!");
            words.join(" ")
        })
        .collect()
}

fn model() -> EmbeddingModel {
    let entries = WORDS.iter().enumerate().map(|(i, w)| {
        let mut v = vec![0.0f32; 8];
        v[i % 8] = 1.0;
        v[(i * 3 + 1) % 8] += 0.5;
        (w.to_string(), v)
    });
    EmbeddingModel::from_vectors(entries).expect("benchmark model")
}

fn pipeline_benchmark(c: &mut Criterion) {
    let quotes = synthetic_quotes(2_000);
    let tokenizer = Tokenizer::default();

    c.bench_function("tokenize", |b| {
        b.iter(|| quotes.iter().map(|q| tokenizer.tokenize(q)).collect::<Vec<_>>());
    });

    let tokens: Vec<Vec<String>> = quotes.iter().map(|q| tokenizer.tokenize(q)).collect();
    let vocab_config = VocabularyConfig {
        no_below: 2,
        ..VocabularyConfig::default()
    };
    c.bench_function("vocabulary_build", |b| {
        b.iter(|| Vocabulary::build(&tokens, &vocab_config));
    });

    let analyzer = SentimentIntensityAnalyzer::new();
    c.bench_function("polarity_scores", |b| {
        b.iter(|| quotes.iter().map(|q| analyzer.compound(q)).sum::<f64>());
    });

    let matrix = TfIdfVectorizer::new().fit_transform(&quotes);
    c.bench_function("truncated_svd", |b| {
        b.iter(|| TruncatedSvd::new(2).fit_transform(&matrix));
    });

    let mut config = PipelineConfig::default();
    config.vocabulary.no_below = 2;
    config.lexicon.size = 5;
    let catalog = TopicCatalog::new()
        .with_topic("immigration", ["border", "immigration"])
        .with_topic("healthcare", ["healthcare", "insurance"])
        .with_topic("climate", ["climate", "carbon"]);
    let pipeline = Pipeline::new(config, catalog, Arc::new(model())).expect("benchmark pipeline");
    c.bench_function("pipeline_run", |b| {
        b.iter(|| {
            let records = quotes
                .iter()
                .enumerate()
                .map(|(i, q)| InputRecord::new(i.to_string(), q.as_str()))
                .collect();
            pipeline.run(records)
        });
    });
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
