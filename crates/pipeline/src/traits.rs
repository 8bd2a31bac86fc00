//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to sets of catalog rows.

use data_loader::{Catalog, RowId};

/// Core trait for filtering catalog rows.
///
/// All filters must implement this trait to be used in the FilterPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be shared between concurrent queries
/// - Filters take ownership of the row list and return the rows they keep,
///   in the order they received them
/// - Filtering is total: a row that is not in the catalog is dropped
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of rows.
    ///
    /// # Arguments
    /// * `rows` - Catalog rows to filter (takes ownership)
    /// * `catalog` - The catalog the rows point into
    fn apply(&self, rows: Vec<RowId>, catalog: &Catalog) -> Vec<RowId>;
}
