//! Filter to keep only movies in any of the selected genres.

use crate::traits::Filter;
use data_loader::{Catalog, RowId};
use std::collections::HashSet;

/// Keeps rows sharing at least one genre with the selection.
///
/// ## Algorithm
/// 1. An empty selection places no constraint and keeps every row
/// 2. Otherwise a row is kept if any of its genres is selected
/// 3. Rows with no genres never match a non-empty selection
pub struct GenreFilter {
    genres: HashSet<String>,
}

impl GenreFilter {
    /// Create a new GenreFilter from genre names (exact, case-sensitive)
    pub fn new<I, S>(genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            genres: genres.into_iter().map(Into::into).collect(),
        }
    }
}

impl Filter for GenreFilter {
    fn name(&self) -> &str {
        "GenreFilter"
    }

    fn apply(&self, rows: Vec<RowId>, catalog: &Catalog) -> Vec<RowId> {
        if self.genres.is_empty() {
            return rows
                .into_iter()
                .filter(|&row| catalog.get(row).is_some())
                .collect();
        }

        rows.into_iter()
            .filter(|&row| {
                catalog
                    .get(row)
                    .is_some_and(|movie| movie.has_any_genre(&self.genres))
            })
            .collect()
    }
}
