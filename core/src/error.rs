use thiserror::Error;

/// Failures the engine reports. Arithmetic edge cases never end up here;
/// they fall back to zero weights and zero similarity instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("cannot build a model from an empty corpus")]
    EmptyCorpus,
    #[error("no documents have been processed, build a model first")]
    EmptyModel,
}

pub type Result<T> = std::result::Result<T, Error>;
