//! # Recommendation Orchestrator
//!
//! This module coordinates one interaction with the engine:
//! 1. Evaluate the active filter criteria against the catalog
//! 2. Turn the surviving rows into a candidate restriction
//! 3. Ask the recommender for titles similar to the query, within it
//! 4. Independently, rank the filtered rows for the top listing
//!
//! The catalog and similarity matrix are loaded once and shared read-only,
//! so a single orchestrator can be cloned into any number of workers.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, instrument};

use data_loader::{Catalog, LoadReport, MovieRecord, SimilarityMatrix};
use pipeline::{FilterCriteria, FilterEngine, DEFAULT_TOP_N};
use recommender::{RecommendError, Recommender, ScoredTitle, DEFAULT_LIMIT};

/// Tunables for the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrchestratorConfig {
    /// Maximum titles per recommendation
    pub result_limit: usize,
    /// Size of the filtered top listing
    pub top_n: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            result_limit: DEFAULT_LIMIT,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// One line of the filtered top listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieSummary {
    pub title: String,
    pub genres: Vec<String>,
    pub vote_average: f64,
    pub vote_count: u32,
    pub score: Option<f64>,
}

impl From<&MovieRecord> for MovieSummary {
    fn from(movie: &MovieRecord) -> Self {
        Self {
            title: movie.display_title(),
            genres: movie.genres.clone(),
            vote_average: movie.vote_average,
            vote_count: movie.vote_count,
            score: movie.score,
        }
    }
}

/// Values a caller needs to offer filter choices
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    /// Selectable genres, sorted
    pub genres: Vec<String>,
    /// Observed `(min, max)` vote count
    pub votes_range: Option<(u32, u32)>,
    /// Observed `(min, max)` average rating
    pub rating_range: Option<(f64, f64)>,
}

/// Main orchestrator that coordinates filtering and recommendation
#[derive(Debug, Clone)]
pub struct RecommendationOrchestrator {
    catalog: Arc<Catalog>,
    filter_engine: FilterEngine,
    recommender: Recommender,
    config: OrchestratorConfig,
}

impl RecommendationOrchestrator {
    /// Create a new orchestrator from an already loaded catalog and matrix
    pub fn new(
        catalog: Arc<Catalog>,
        similarity: Arc<SimilarityMatrix>,
        config: OrchestratorConfig,
    ) -> Result<Self> {
        let recommender = Recommender::new(catalog.clone(), similarity)
            .context("Similarity matrix does not match the catalog")?
            .with_limit(config.result_limit);
        let filter_engine = FilterEngine::new(catalog.clone());

        Ok(Self {
            catalog,
            filter_engine,
            recommender,
            config,
        })
    }

    /// Load the dataset and matrix from disk and build an orchestrator.
    ///
    /// Also returns the data-quality report from loading.
    pub fn load(
        dataset_path: &Path,
        similarity_path: &Path,
        config: OrchestratorConfig,
    ) -> Result<(Self, LoadReport)> {
        let start = Instant::now();
        let loaded = Catalog::load_from_files(dataset_path, similarity_path).with_context(|| {
            format!(
                "Failed to load {} with {}",
                dataset_path.display(),
                similarity_path.display()
            )
        })?;

        let orchestrator = Self::new(
            Arc::new(loaded.catalog),
            Arc::new(loaded.similarity),
            config,
        )?;
        info!("Orchestrator ready in {:?}", start.elapsed());

        Ok((orchestrator, loaded.report))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> OrchestratorConfig {
        self.config
    }

    /// Similar titles restricted to movies passing `criteria`.
    ///
    /// `Err(TitleNotFound)` if the title is unknown; `Ok(vec![])` if it is
    /// known but no similar title passes the filters.
    pub fn recommend(
        &self,
        title: &str,
        criteria: &FilterCriteria,
    ) -> std::result::Result<Vec<String>, RecommendError> {
        Ok(self
            .recommend_scored(title, Some(criteria))?
            .into_iter()
            .map(|scored| scored.title)
            .collect())
    }

    /// Similar titles with no filter applied
    pub fn recommend_unfiltered(
        &self,
        title: &str,
    ) -> std::result::Result<Vec<String>, RecommendError> {
        self.recommender.recommend(title, None)
    }

    /// Similar titles with their similarity values, optionally filtered
    #[instrument(skip(self, criteria), fields(filtered = criteria.is_some()))]
    pub fn recommend_scored(
        &self,
        title: &str,
        criteria: Option<&FilterCriteria>,
    ) -> std::result::Result<Vec<ScoredTitle>, RecommendError> {
        let start = Instant::now();

        let restriction = criteria.map(|c| self.filter_engine.apply(c).restriction());
        if let Some(restriction) = &restriction {
            info!("{} movies pass the active filters", restriction.len());
        }

        let results = self.recommender.recommend_scored(title, restriction.as_ref())?;

        info!(
            "Recommended {} titles for '{}' in {:?}",
            results.len(),
            title,
            start.elapsed()
        );
        Ok(results)
    }

    /// Top movies among those passing `criteria`, by score or rating
    #[instrument(skip_all)]
    pub fn top_movies(&self, criteria: &FilterCriteria) -> Vec<MovieSummary> {
        let filtered = self.filter_engine.apply(criteria);
        filtered
            .top_n(self.config.top_n)
            .into_iter()
            .map(MovieSummary::from)
            .collect()
    }

    /// Genre vocabulary and value ranges for building filters
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            genres: self.catalog.genre_vocabulary().to_vec(),
            votes_range: self.catalog.votes_range(),
            rating_range: self.catalog.rating_range(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_orchestrator(config: OrchestratorConfig) -> RecommendationOrchestrator {
        let catalog = Catalog::from_records(vec![
            MovieRecord::new("Alpha", vec!["Action".to_string()], 1000, 7.0, None),
            MovieRecord::new("Beta", vec!["Drama".to_string()], 50, 8.0, None),
        ]);
        let similarity =
            SimilarityMatrix::from_rows(vec![vec![1.0, 0.9], vec![0.9, 1.0]]).unwrap();
        RecommendationOrchestrator::new(Arc::new(catalog), Arc::new(similarity), config).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.result_limit, 10);
        assert_eq!(config.top_n, 10);
    }

    #[test]
    fn test_recommend_applies_filters() {
        let orchestrator = create_orchestrator(OrchestratorConfig::default());

        // Beta has too few votes for the default criteria
        let filtered = orchestrator.recommend("alpha", &FilterCriteria::default()).unwrap();
        assert!(filtered.is_empty());

        let unfiltered = orchestrator.recommend_unfiltered("alpha").unwrap();
        assert_eq!(unfiltered, vec!["Beta"]);
    }

    #[test]
    fn test_not_found_is_distinct_from_empty() {
        let orchestrator = create_orchestrator(OrchestratorConfig::default());

        let err = orchestrator
            .recommend("gamma", &FilterCriteria::default())
            .unwrap_err();
        assert!(matches!(err, RecommendError::TitleNotFound { .. }));
    }

    #[test]
    fn test_filter_options() {
        let orchestrator = create_orchestrator(OrchestratorConfig::default());
        let options = orchestrator.filter_options();

        assert_eq!(options.genres, vec!["Action", "Drama"]);
        assert_eq!(options.votes_range, Some((50, 1000)));
        assert_eq!(options.rating_range, Some((7.0, 8.0)));
    }

    #[test]
    fn test_top_movies_respects_config() {
        let orchestrator = create_orchestrator(OrchestratorConfig {
            result_limit: 10,
            top_n: 1,
        });

        let top = orchestrator.top_movies(&FilterCriteria::unrestricted());
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].title, "Beta");
        assert_eq!(top[0].vote_count, 50);
    }
}
