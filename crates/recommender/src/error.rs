//! Error types for the recommender crate.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecommendError {
    /// The normalized title is not a catalog key.
    ///
    /// Distinct from a valid title whose recommendations were all
    /// excluded by a candidate restriction, which is an empty `Ok`.
    #[error("Movie not found: '{title}'")]
    TitleNotFound { title: String },

    /// The similarity matrix does not address the catalog's rows
    #[error("Similarity matrix is {matrix}x{matrix} but the catalog has {catalog} movies")]
    MisalignedSimilarity { matrix: usize, catalog: usize },
}

pub type Result<T> = std::result::Result<T, RecommendError>;
