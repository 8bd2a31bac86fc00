//! Filter on the number of votes a movie received.

use crate::traits::Filter;
use data_loader::{Catalog, RowId};

/// Keeps rows with `min_votes <= vote_count <= max_votes`.
///
/// An inverted range keeps nothing.
pub struct VoteCountFilter {
    min_votes: u32,
    max_votes: u32,
}

impl VoteCountFilter {
    pub fn new(min_votes: u32, max_votes: u32) -> Self {
        Self {
            min_votes,
            max_votes,
        }
    }
}

impl Filter for VoteCountFilter {
    fn name(&self) -> &str {
        "VoteCountFilter"
    }

    fn apply(&self, rows: Vec<RowId>, catalog: &Catalog) -> Vec<RowId> {
        rows.into_iter()
            .filter(|&row| {
                catalog.get(row).is_some_and(|movie| {
                    movie.vote_count >= self.min_votes && movie.vote_count <= self.max_votes
                })
            })
            .collect()
    }
}
