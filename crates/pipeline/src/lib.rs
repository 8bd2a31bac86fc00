//! Filtering and ranking of catalog rows.
//!
//! This crate provides:
//! - Filter trait and implementations (vote count, rating, genre)
//! - FilterPipeline for composing filters
//! - FilterCriteria / FilterEngine for evaluating one query's constraints
//! - Top-N ranking of a filtered listing
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterCriteria, FilterEngine, DEFAULT_TOP_N};
//!
//! let engine = FilterEngine::new(catalog.clone());
//! let criteria = FilterCriteria::default().with_genre("Action");
//!
//! let filtered = engine.apply(&criteria);
//! let restriction = filtered.restriction(); // narrows recommendations
//! let top = filtered.top_n(DEFAULT_TOP_N);  // standalone listing
//! ```

pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod criteria;
pub mod ranking;

// Re-export main types
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
pub use criteria::{FilterCriteria, FilterEngine, FilteredMovies};
pub use ranking::{top_n, RankingKey, DEFAULT_TOP_N};
