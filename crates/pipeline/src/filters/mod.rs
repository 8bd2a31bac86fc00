//! Filter implementations for catalog rows.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod genre;
pub mod rating_range;
pub mod vote_count;

// Re-export for convenience
pub use genre::GenreFilter;
pub use rating_range::RatingRangeFilter;
pub use vote_count::VoteCountFilter;
