//! Similar-title recommendations
//!
//! Generates recommendations for a single title from the precomputed
//! similarity matrix: "movies like this one".
//!
//! ## Algorithm
//! 1. Normalize the requested title and resolve it to a catalog row
//! 2. Pair every other row with its similarity to that row
//! 3. Stable sort by similarity, highest first (ties keep row order)
//! 4. Walk the ranking, skipping rows outside the candidate restriction
//! 5. Stop after `limit` titles (10 by default)

use crate::error::{RecommendError, Result};
use data_loader::{normalize, CandidateRestriction, Catalog, RowId, SimilarityMatrix};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Default number of recommendations returned for a title
pub const DEFAULT_LIMIT: usize = 10;

/// A recommended title together with the value it was ranked by
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTitle {
    pub row: RowId,
    /// Title-cased display title
    pub title: String,
    pub similarity: f32,
}

/// Recommends titles similar to a given one.
///
/// Holds shared, read-only references to the catalog and matrix, so clones
/// are cheap and can serve queries from any thread.
#[derive(Debug, Clone)]
pub struct Recommender {
    catalog: Arc<Catalog>,
    similarity: Arc<SimilarityMatrix>,

    /// Maximum number of titles per recommendation
    limit: usize,
}

impl Recommender {
    /// Create a new recommender.
    ///
    /// Fails if the matrix is not exactly catalog-sized, since rows are
    /// addressed by catalog position.
    pub fn new(catalog: Arc<Catalog>, similarity: Arc<SimilarityMatrix>) -> Result<Self> {
        if similarity.dimension() != catalog.len() {
            return Err(RecommendError::MisalignedSimilarity {
                matrix: similarity.dimension(),
                catalog: catalog.len(),
            });
        }

        Ok(Self {
            catalog,
            similarity,
            limit: DEFAULT_LIMIT,
        })
    }

    /// Configure how many titles to return (default: 10)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Every other row paired with its similarity to `row`, most similar
    /// first. Equal similarities keep catalog order.
    pub fn ranked_neighbours(&self, row: RowId) -> Vec<(RowId, f32)> {
        let Some(similarities) = self.similarity.row(row) else {
            return Vec::new();
        };

        let mut ranked: Vec<(RowId, f32)> = similarities
            .iter()
            .copied()
            .enumerate()
            .filter(|&(other, _)| other != row)
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Recommendations with their similarity values.
    ///
    /// # Arguments
    /// * `raw_title` - Title as typed by the user; normalized before lookup
    /// * `restriction` - If given, only titles in this set are returned
    ///
    /// # Returns
    /// * `Ok(titles)` - Up to `limit` titles, most similar first. May be
    ///   empty when the restriction excludes everything.
    /// * `Err(TitleNotFound)` - The title is not in the catalog
    #[instrument(skip(self, restriction), fields(restricted = restriction.is_some()))]
    pub fn recommend_scored(
        &self,
        raw_title: &str,
        restriction: Option<&CandidateRestriction>,
    ) -> Result<Vec<ScoredTitle>> {
        let key = normalize(raw_title);
        let row = self
            .catalog
            .lookup(&key)
            .ok_or_else(|| RecommendError::TitleNotFound {
                title: raw_title.to_string(),
            })?;

        let ranked = self.ranked_neighbours(row);

        let mut results = Vec::with_capacity(self.limit.min(ranked.len()));
        for (other, similarity) in ranked {
            if results.len() >= self.limit {
                break;
            }
            let Some(movie) = self.catalog.get(other) else {
                continue;
            };
            if let Some(allowed) = restriction {
                if !allowed.contains(&movie.key) {
                    continue;
                }
            }
            results.push(ScoredTitle {
                row: other,
                title: movie.display_title(),
                similarity,
            });
        }

        debug!(
            "Recommended {} titles for '{}' (row {})",
            results.len(),
            key,
            row
        );
        Ok(results)
    }

    /// Display titles of the recommendations, most similar first
    pub fn recommend(
        &self,
        raw_title: &str,
        restriction: Option<&CandidateRestriction>,
    ) -> Result<Vec<String>> {
        Ok(self
            .recommend_scored(raw_title, restriction)?
            .into_iter()
            .map(|scored| scored.title)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::MovieRecord;

    fn create_recommender() -> Recommender {
        let catalog = Catalog::from_records(vec![
            MovieRecord::new("Alpha", vec!["Action".to_string()], 1000, 7.0, None),
            MovieRecord::new("Beta", vec!["Drama".to_string()], 50, 8.0, None),
            MovieRecord::new("Gamma", vec![], 10, 6.0, None),
            MovieRecord::new("Delta", vec![], 10, 6.0, None),
        ]);
        let similarity = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.9, 0.2, 0.2],
            vec![0.9, 1.0, 0.1, 0.4],
            vec![0.2, 0.1, 1.0, 0.0],
            vec![0.2, 0.4, 0.0, 1.0],
        ])
        .unwrap();

        Recommender::new(Arc::new(catalog), Arc::new(similarity)).unwrap()
    }

    #[test]
    fn test_ranked_neighbours_excludes_self_and_breaks_ties_by_row() {
        let recommender = create_recommender();

        let ranked = recommender.ranked_neighbours(0);
        assert_eq!(ranked, vec![(1, 0.9), (2, 0.2), (3, 0.2)]);
    }

    #[test]
    fn test_self_is_excluded_even_when_not_most_similar() {
        let catalog = Catalog::from_records(vec![
            MovieRecord::new("Odd", vec![], 1, 1.0, None),
            MovieRecord::new("Other", vec![], 1, 1.0, None),
        ]);
        let similarity = SimilarityMatrix::from_rows(vec![vec![0.1, 0.5], vec![0.5, 0.1]]).unwrap();
        let recommender = Recommender::new(Arc::new(catalog), Arc::new(similarity)).unwrap();

        assert_eq!(recommender.recommend("odd", None).unwrap(), vec!["Other"]);
    }

    #[test]
    fn test_recommend_scored_carries_similarity() {
        let recommender = create_recommender();

        let scored = recommender.recommend_scored("beta", None).unwrap();
        assert_eq!(scored[0].row, 0);
        assert_eq!(scored[0].title, "Alpha");
        assert_eq!(scored[0].similarity, 0.9);
        assert_eq!(scored.len(), 3);
    }

    #[test]
    fn test_with_limit() {
        let recommender = create_recommender().with_limit(2);

        assert_eq!(recommender.limit(), 2);
        assert_eq!(
            recommender.recommend("alpha", None).unwrap(),
            vec!["Beta", "Gamma"]
        );
    }

    #[test]
    fn test_misaligned_matrix_is_rejected() {
        let catalog = Catalog::from_records(vec![MovieRecord::new("Solo", vec![], 1, 1.0, None)]);
        let similarity = SimilarityMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();

        let err = Recommender::new(Arc::new(catalog), Arc::new(similarity)).unwrap_err();
        assert_eq!(
            err,
            RecommendError::MisalignedSimilarity {
                matrix: 2,
                catalog: 1
            }
        );
    }

    #[test]
    fn test_unknown_title_reports_raw_input() {
        let recommender = create_recommender();

        let err = recommender.recommend("  Omega ", None).unwrap_err();
        assert_eq!(
            err,
            RecommendError::TitleNotFound {
                title: "  Omega ".to_string()
            }
        );
    }
}
