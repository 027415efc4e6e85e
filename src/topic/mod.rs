pub mod assigner;
pub mod catalog;
pub mod embedding;
pub mod lda;
pub mod lexicon;
