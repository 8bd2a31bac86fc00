//! Filter on average rating.

use crate::traits::Filter;
use data_loader::{Catalog, RowId};

/// Keeps rows with `min_rating <= vote_average <= max_rating`.
pub struct RatingRangeFilter {
    min_rating: f64,
    max_rating: f64,
}

impl RatingRangeFilter {
    pub fn new(min_rating: f64, max_rating: f64) -> Self {
        Self {
            min_rating,
            max_rating,
        }
    }
}

impl Filter for RatingRangeFilter {
    fn name(&self) -> &str {
        "RatingRangeFilter"
    }

    fn apply(&self, rows: Vec<RowId>, catalog: &Catalog) -> Vec<RowId> {
        rows.into_iter()
            .filter(|&row| {
                catalog.get(row).is_some_and(|movie| {
                    movie.vote_average >= self.min_rating && movie.vote_average <= self.max_rating
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::MovieRecord;

    #[test]
    fn test_rating_range_filter() {
        let catalog = Catalog::from_records(vec![
            MovieRecord::new("Bad", vec![], 100, 5.9, None),
            MovieRecord::new("Edge Low", vec![], 100, 6.0, None),
            MovieRecord::new("Good", vec![], 100, 7.5, None),
            MovieRecord::new("Edge High", vec![], 100, 9.0, None),
            MovieRecord::new("Suspicious", vec![], 100, 9.1, None),
        ]);

        let filter = RatingRangeFilter::new(6.0, 9.0);
        assert_eq!(filter.apply(vec![0, 1, 2, 3, 4], &catalog), vec![1, 2, 3]);
    }

    #[test]
    fn test_unbounded_range_keeps_everything() {
        let catalog = Catalog::from_records(vec![
            MovieRecord::new("Zero", vec![], 0, 0.0, None),
            MovieRecord::new("Ten", vec![], 0, 10.0, None),
        ]);

        let filter = RatingRangeFilter::new(f64::NEG_INFINITY, f64::INFINITY);
        assert_eq!(filter.apply(vec![0, 1], &catalog), vec![0, 1]);
    }
}
