pub mod lemmatizer;
pub mod normalizer;
pub mod stopwords;
pub mod tokenizer;

pub use lemmatizer::{Lemmatizer, RuleLemmatizer};
pub use normalizer::Normalizer;
pub use stopwords::StopWords;
pub use tokenizer::Tokenizer;
