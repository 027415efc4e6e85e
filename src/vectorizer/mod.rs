pub mod bow;
pub mod collocation;
pub mod corpus;
pub mod term;
pub mod tfidf;
pub mod vocabulary;
