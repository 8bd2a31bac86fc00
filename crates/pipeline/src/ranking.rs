//! Top-N listing of filtered movies.
//!
//! Rows are ranked by their precomputed score when every row has one,
//! otherwise by average rating.

use data_loader::MovieRecord;
use std::cmp::Ordering;

/// Size of the top listing and of recommendation lists
pub const DEFAULT_TOP_N: usize = 10;

/// Which value a listing is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingKey {
    Score,
    Rating,
}

impl RankingKey {
    /// `Score` if every row has a score, otherwise `Rating`
    pub fn for_rows(rows: &[&MovieRecord]) -> Self {
        if !rows.is_empty() && rows.iter().all(|m| m.score.is_some()) {
            RankingKey::Score
        } else {
            RankingKey::Rating
        }
    }

    fn value(self, movie: &MovieRecord) -> f64 {
        match self {
            RankingKey::Score => movie.score.unwrap_or(f64::NEG_INFINITY),
            RankingKey::Rating => movie.vote_average,
        }
    }
}

/// Take the best `n` rows, highest first.
///
/// The sort is stable, so rows with equal values keep their input order.
/// `-0.0` and `0.0` count as equal.
pub fn top_n<'a, I>(rows: I, n: usize) -> Vec<&'a MovieRecord>
where
    I: IntoIterator<Item = &'a MovieRecord>,
{
    let mut ranked: Vec<&MovieRecord> = rows.into_iter().collect();
    let key = RankingKey::for_rows(&ranked);

    ranked.sort_by(|a, b| {
        key.value(b)
            .partial_cmp(&key.value(a))
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(n);
    ranked
}
