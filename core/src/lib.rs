pub mod error;
pub mod index;
pub mod persist;
pub mod search;
pub mod stats;
pub mod store;
pub mod tokenizer;
pub mod vector;

pub use error::{Error, Result};
pub use index::{build_model, DocId, DocumentData, DocumentInput, Model};
pub use search::{search, DocumentView, SearchResult};
pub use stats::{Idf, TermFrequency};
pub use store::ModelStore;
pub use vector::WeightVector;
