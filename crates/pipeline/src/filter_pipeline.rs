//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern.

use crate::traits::Filter;
use data_loader::{Catalog, RowId};
use tracing;

/// Chains multiple filters together into a processing pipeline.
///
/// Every filter must pass for a row to survive, so the pipeline is the
/// conjunction of its filters.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(VoteCountFilter::new(500, 10_000))
///     .add_filter(RatingRangeFilter::new(6.0, 9.0))
///     .add_filter(GenreFilter::new(["Action"]));
///
/// let rows = pipeline.apply_all(&catalog);
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Number of filters in the pipeline
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence to the rows.
    ///
    /// ## Algorithm
    /// 1. Start with the input rows
    /// 2. For each filter in order:
    ///    a. Log filter name and input count
    ///    b. Apply the filter
    ///    c. Log output count
    /// 3. Return the surviving rows, in input order
    pub fn apply(&self, rows: Vec<RowId>, catalog: &Catalog) -> Vec<RowId> {
        let mut current = rows;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, catalog);
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        current
    }

    /// Apply the pipeline to every row of the catalog, in catalog order
    pub fn apply_all(&self, catalog: &Catalog) -> Vec<RowId> {
        self.apply((0..catalog.len()).collect(), catalog)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
