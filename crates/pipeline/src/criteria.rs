//! Filter criteria and the engine that evaluates them against the catalog.

use crate::filter_pipeline::FilterPipeline;
use crate::filters::{GenreFilter, RatingRangeFilter, VoteCountFilter};
use crate::ranking;
use data_loader::{CandidateRestriction, Catalog, MovieRecord, RowId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Numeric and categorical constraints for one query.
///
/// A row passes when its vote count and rating are inside the inclusive
/// ranges and, if any genres are selected, it has at least one of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub min_votes: u32,
    pub max_votes: u32,
    pub min_rating: f64,
    pub max_rating: f64,
    /// Empty means no genre constraint
    pub genres: BTreeSet<String>,
}

impl Default for FilterCriteria {
    /// Votes 500-10000, rating 6.0-9.0, any genre
    fn default() -> Self {
        Self {
            min_votes: 500,
            max_votes: 10_000,
            min_rating: 6.0,
            max_rating: 9.0,
            genres: BTreeSet::new(),
        }
    }
}

impl FilterCriteria {
    /// Criteria every row satisfies
    pub fn unrestricted() -> Self {
        Self {
            min_votes: 0,
            max_votes: u32::MAX,
            min_rating: f64::NEG_INFINITY,
            max_rating: f64::INFINITY,
            genres: BTreeSet::new(),
        }
    }

    pub fn with_votes(mut self, min_votes: u32, max_votes: u32) -> Self {
        self.min_votes = min_votes;
        self.max_votes = max_votes;
        self
    }

    pub fn with_rating(mut self, min_rating: f64, max_rating: f64) -> Self {
        self.min_rating = min_rating;
        self.max_rating = max_rating;
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genres.insert(genre.into());
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres.extend(genres.into_iter().map(Into::into));
        self
    }

    /// The filter pipeline equivalent to these criteria
    pub fn pipeline(&self) -> FilterPipeline {
        let pipeline = FilterPipeline::new()
            .add_filter(VoteCountFilter::new(self.min_votes, self.max_votes))
            .add_filter(RatingRangeFilter::new(self.min_rating, self.max_rating));

        if self.genres.is_empty() {
            pipeline
        } else {
            pipeline.add_filter(GenreFilter::new(self.genres.iter().cloned()))
        }
    }

    /// Evaluate against a catalog. Output keeps catalog order.
    pub fn apply<'a>(&self, catalog: &'a Catalog) -> FilteredMovies<'a> {
        FilteredMovies {
            catalog,
            rows: self.pipeline().apply_all(catalog),
        }
    }
}

/// Rows of a catalog that passed a set of criteria, in catalog order
#[derive(Debug, Clone)]
pub struct FilteredMovies<'a> {
    catalog: &'a Catalog,
    rows: Vec<RowId>,
}

impl<'a> FilteredMovies<'a> {
    pub fn rows(&self) -> &[RowId] {
        &self.rows
    }

    pub fn records(&self) -> impl Iterator<Item = &'a MovieRecord> {
        let catalog = self.catalog;
        self.rows.iter().filter_map(move |&row| catalog.get(row))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Normalized titles of the surviving rows, for narrowing recommendations
    pub fn restriction(&self) -> CandidateRestriction {
        CandidateRestriction::from_keys(
            self.records()
                .map(|movie| movie.key.clone())
                .collect::<HashSet<_>>(),
        )
    }

    /// Best `n` rows by score (or rating), see [`ranking::top_n`]
    pub fn top_n(&self, n: usize) -> Vec<&'a MovieRecord> {
        ranking::top_n(self.records(), n)
    }
}

/// Evaluates filter criteria against a shared catalog.
///
/// Pure and deterministic: the same criteria always give the same rows in
/// the same order. Safe to share between threads.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    catalog: Arc<Catalog>,
}

impl FilterEngine {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Rows of the catalog that satisfy every constraint in `criteria`
    #[instrument(skip_all, fields(genres = criteria.genres.len()))]
    pub fn apply(&self, criteria: &FilterCriteria) -> FilteredMovies<'_> {
        let filtered = criteria.apply(&self.catalog);
        debug!(
            "{} of {} movies pass the active filters",
            filtered.len(),
            self.catalog.len()
        );
        filtered
    }
}
