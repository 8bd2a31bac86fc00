//! # Data Loader Crate
//!
//! This crate loads the movie catalog and its precomputed similarity matrix.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (MovieRecord, Catalog, CandidateRestriction)
//! - **parser**: Parse the dataset CSV, genre literals and similarity files
//! - **index**: Build the normalized-title index and derived catalog values
//! - **similarity**: The read-only similarity matrix
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Catalog;
//! use std::path::Path;
//!
//! let loaded = Catalog::load_from_files(
//!     Path::new("data/movies_cleaned.csv"),
//!     Path::new("data/similarity.json"),
//! )?;
//!
//! let row = loaded.catalog.resolve("  The Dark Knight").unwrap();
//! let similar_to_row = loaded.similarity.row(row).unwrap();
//! ```
//!
//! Both structures are immutable once loaded and can be shared behind an
//! `Arc` by any number of readers.

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod similarity;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::LoadedData;
pub use similarity::SimilarityMatrix;
pub use types::{
    // Type aliases
    RowId,
    // Core types
    Catalog,
    MovieRecord,
    CandidateRestriction,
    GenreField,
    // Load diagnostics
    LoadReport,
    MalformedGenres,
    DuplicateTitle,
    // Title helpers
    normalize,
    title_case,
};
