//! # Recommender Crate
//!
//! Content-based "more like this" recommendations over a precomputed
//! similarity matrix.
//!
//! ## Example Usage
//!
//! ```ignore
//! use recommender::Recommender;
//! use std::sync::Arc;
//!
//! let recommender = Recommender::new(catalog.clone(), similarity.clone())?;
//!
//! // Unrestricted: the 10 most similar titles
//! let titles = recommender.recommend("the dark knight", None)?;
//!
//! // Restricted to titles passing the active filters
//! let restriction = filter_engine.apply(&criteria).restriction();
//! let titles = recommender.recommend("the dark knight", Some(&restriction))?;
//! ```
//!
//! An unknown title is `Err(RecommendError::TitleNotFound)`. A known title
//! whose neighbours were all filtered out is `Ok(vec![])`.

pub mod error;
pub mod similar;

// Re-export commonly used types
pub use error::{RecommendError, Result};
pub use similar::{Recommender, ScoredTitle, DEFAULT_LIMIT};
