//! Catalog building and indexing logic.
//!
//! Builds the `Catalog` from parsed rows:
//! - normalized-title index (last row wins on duplicates)
//! - sorted genre vocabulary
//! - vote count and rating ranges
//!
//! and loads the dataset together with its similarity matrix.

use crate::error::{DataLoadError, Result};
use crate::parser::{self, ParsedMovie};
use crate::similarity::SimilarityMatrix;
use crate::types::*;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// A catalog, its aligned similarity matrix and what went wrong on the way
#[derive(Debug)]
pub struct LoadedData {
    pub catalog: Catalog,
    pub similarity: SimilarityMatrix,
    pub report: LoadReport,
}

impl Catalog {
    /// Build a catalog from records in dataset order.
    ///
    /// Row `i` of the result is `records[i]`.
    pub fn from_records(records: Vec<MovieRecord>) -> Self {
        let mut key_index: HashMap<String, RowId> = HashMap::with_capacity(records.len());
        let mut duplicates = Vec::new();
        let mut genres: BTreeSet<&str> = BTreeSet::new();

        for (row, record) in records.iter().enumerate() {
            if let Some(previous) = key_index.insert(record.key.clone(), row) {
                duplicates.push(DuplicateTitle {
                    key: record.key.clone(),
                    superseded_row: previous,
                    winning_row: row,
                });
            }
            genres.extend(record.genres.iter().map(String::as_str));
        }

        let genre_vocabulary = genres.into_iter().map(str::to_string).collect();

        let votes_range = records.iter().map(|r| r.vote_count).fold(None::<(u32, u32)>, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        });
        let rating_range = records.iter().map(|r| r.vote_average).fold(None::<(f64, f64)>, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        });

        if !duplicates.is_empty() {
            debug!("{} duplicate normalized titles, later rows win", duplicates.len());
        }

        Self {
            records,
            key_index,
            genre_vocabulary,
            votes_range,
            rating_range,
            duplicates,
        }
    }

    /// Build a catalog from parser output, recording malformed genre fields
    pub fn from_parsed(movies: Vec<ParsedMovie>) -> (Self, LoadReport) {
        let mut malformed_genres = Vec::new();
        let records = movies
            .into_iter()
            .enumerate()
            .map(|(row, movie)| {
                if let GenreField::Malformed { reason, .. } = &movie.genres {
                    malformed_genres.push(MalformedGenres {
                        row,
                        title: movie.title.clone(),
                        reason: reason.clone(),
                    });
                }
                movie.into_record()
            })
            .collect();

        let catalog = Self::from_records(records);
        let report = LoadReport {
            malformed_genres,
            duplicate_titles: catalog.duplicates.clone(),
        };
        (catalog, report)
    }

    /// Load the dataset CSV and its similarity matrix.
    ///
    /// Steps:
    /// 1. Parse both files in parallel
    /// 2. Build the catalog and collect the load report
    /// 3. Check the matrix is aligned with the catalog
    pub fn load_from_files(dataset_path: &Path, similarity_path: &Path) -> Result<LoadedData> {
        info!(
            "Loading dataset {:?} with similarity matrix {:?}",
            dataset_path, similarity_path
        );

        let (movies, similarity) = rayon::join(
            || parser::parse_movies(dataset_path),
            || parser::parse_similarity(similarity_path),
        );
        let movies = movies?;
        let similarity = similarity?;

        if movies.is_empty() {
            return Err(DataLoadError::EmptyDataset {
                file: dataset_path.display().to_string(),
            });
        }

        let (catalog, report) = Self::from_parsed(movies);
        similarity.ensure_aligned(catalog.len())?;

        if !report.malformed_genres.is_empty() {
            warn!(
                "{} rows had malformed genre fields and were given no genres",
                report.malformed_genres.len()
            );
        }
        for duplicate in &report.duplicate_titles {
            warn!(
                "Duplicate title '{}': row {} replaces row {} in the title index",
                duplicate.key, duplicate.winning_row, duplicate.superseded_row
            );
        }

        info!(
            "Loaded {} movies, {} genres, {}x{} similarity matrix",
            catalog.len(),
            catalog.genre_vocabulary().len(),
            similarity.dimension(),
            similarity.dimension()
        );

        Ok(LoadedData {
            catalog,
            similarity,
            report,
        })
    }

    /// Exact lookup by normalized key. No fuzzy or substring matching.
    pub fn lookup(&self, key: &str) -> Option<RowId> {
        self.key_index.get(key).copied()
    }

    /// Normalize a raw title and look it up
    pub fn resolve(&self, raw_title: &str) -> Option<RowId> {
        self.lookup(&normalize(raw_title))
    }

    pub fn get(&self, row: RowId) -> Option<&MovieRecord> {
        self.records.get(row)
    }

    /// All rows in catalog order
    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every genre name used by any row, sorted
    pub fn genre_vocabulary(&self) -> &[String] {
        &self.genre_vocabulary
    }

    /// `(min, max)` vote count, `None` for an empty catalog
    pub fn votes_range(&self) -> Option<(u32, u32)> {
        self.votes_range
    }

    /// `(min, max)` average rating, `None` for an empty catalog
    pub fn rating_range(&self) -> Option<(f64, f64)> {
        self.rating_range
    }

    /// True when every row carries a precomputed score
    pub fn has_scores(&self) -> bool {
        !self.records.is_empty() && self.records.iter().all(|r| r.score.is_some())
    }

    /// Normalized titles that were indexed more than once
    pub fn duplicate_titles(&self) -> &[DuplicateTitle] {
        &self.duplicates
    }

    /// A restriction that admits every title in the catalog
    pub fn restriction_all(&self) -> CandidateRestriction {
        CandidateRestriction::from_keys(self.key_index.keys().cloned().collect::<HashSet<_>>())
    }

    /// Case-insensitive substring search over titles.
    ///
    /// Exact matches come first, then by vote count descending.
    pub fn search(&self, fragment: &str, limit: usize) -> Vec<RowId> {
        let needle = normalize(fragment);
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<(RowId, bool)> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.key.contains(&needle))
            .map(|(row, r)| (row, r.key == needle))
            .collect();

        matches.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| self.records[b.0].vote_count.cmp(&self.records[a.0].vote_count))
        });
        matches.truncate(limit);
        matches.into_iter().map(|(row, _)| row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn movie(title: &str, genres: &[&str], votes: u32, rating: f64) -> MovieRecord {
        MovieRecord::new(
            title,
            genres.iter().map(|g| g.to_string()).collect(),
            votes,
            rating,
            None,
        )
    }

    #[test]
    fn test_lookup_uses_normalized_keys() {
        let catalog = Catalog::from_records(vec![
            movie("  The Dark Knight ", &["Action"], 12000, 8.2),
            movie("Heat", &["Crime"], 1800, 7.7),
        ]);

        assert_eq!(catalog.lookup("the dark knight"), Some(0));
        assert_eq!(catalog.lookup("The Dark Knight"), None);
        assert_eq!(catalog.resolve("THE DARK KNIGHT  "), Some(0));
        assert_eq!(catalog.resolve("heat"), Some(1));
        assert_eq!(catalog.resolve("dark knight"), None);
    }

    #[test]
    fn test_duplicate_titles_last_row_wins() {
        let catalog = Catalog::from_records(vec![
            movie("Hamlet", &["Drama"], 100, 7.0),
            movie("Heat", &["Crime"], 1800, 7.7),
            movie("HAMLET ", &["Drama"], 40, 6.1),
        ]);

        assert_eq!(catalog.resolve("hamlet"), Some(2));
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.duplicate_titles(),
            &[DuplicateTitle {
                key: "hamlet".to_string(),
                superseded_row: 0,
                winning_row: 2,
            }]
        );
    }

    #[test]
    fn test_genre_vocabulary_sorted_and_unique() {
        let catalog = Catalog::from_records(vec![
            movie("A", &["Thriller", "Action"], 1, 1.0),
            movie("B", &["Drama", "Action"], 1, 1.0),
            movie("C", &[], 1, 1.0),
        ]);

        assert_eq!(catalog.genre_vocabulary(), &["Action", "Drama", "Thriller"]);
    }

    #[test]
    fn test_ranges() {
        let catalog = Catalog::from_records(vec![
            movie("A", &[], 50, 8.0),
            movie("B", &[], 1000, 7.0),
            movie("C", &[], 0, 9.5),
        ]);

        assert_eq!(catalog.votes_range(), Some((0, 1000)));
        assert_eq!(catalog.rating_range(), Some((7.0, 9.5)));

        let empty = Catalog::from_records(vec![]);
        assert_eq!(empty.votes_range(), None);
        assert_eq!(empty.rating_range(), None);
        assert!(empty.genre_vocabulary().is_empty());
    }

    #[test]
    fn test_has_scores() {
        let mut scored = movie("A", &[], 1, 1.0);
        scored.score = Some(6.5);
        let unscored = movie("B", &[], 1, 1.0);

        assert!(Catalog::from_records(vec![scored.clone()]).has_scores());
        assert!(!Catalog::from_records(vec![scored, unscored]).has_scores());
        assert!(!Catalog::from_records(vec![]).has_scores());
    }

    #[test]
    fn test_from_parsed_reports_malformed_genres() {
        let movies = vec![
            ParsedMovie {
                title: "Alpha".to_string(),
                genres: GenreField::Parsed(vec!["Action".to_string()]),
                vote_count: 10,
                vote_average: 7.0,
                score: None,
            },
            ParsedMovie {
                title: "Beta".to_string(),
                genres: GenreField::Malformed {
                    raw: "???".to_string(),
                    reason: "unexpected".to_string(),
                },
                vote_count: 10,
                vote_average: 7.0,
                score: None,
            },
        ];

        let (catalog, report) = Catalog::from_parsed(movies);
        assert!(catalog.get(1).unwrap().genres.is_empty());
        assert_eq!(report.malformed_genres.len(), 1);
        assert_eq!(report.malformed_genres[0].row, 1);
        assert_eq!(report.malformed_genres[0].title, "Beta");
        assert!(report.duplicate_titles.is_empty());
    }

    #[test]
    fn test_search() {
        let catalog = Catalog::from_records(vec![
            movie("Star Trek", &[], 4500, 7.4),
            movie("Star Wars", &[], 6600, 8.1),
            movie("Star", &[], 10, 5.0),
            movie("Heat", &[], 1800, 7.7),
        ]);

        assert_eq!(catalog.search("star", 10), vec![2, 1, 0]);
        assert_eq!(catalog.search("STAR", 2), vec![2, 1]);
        assert!(catalog.search("   ", 10).is_empty());
    }

    #[test]
    fn test_restriction_all() {
        let catalog = Catalog::from_records(vec![
            movie("Alpha", &[], 1, 1.0),
            movie("Beta", &[], 1, 1.0),
        ]);
        let restriction = catalog.restriction_all();
        assert_eq!(restriction.len(), 2);
        assert!(restriction.contains("alpha"));
        assert!(restriction.contains("beta"));
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("movies.csv");
        let matrix = dir.path().join("similarity.json");

        let mut file = std::fs::File::create(&dataset).unwrap();
        writeln!(file, "original_title,genres,vote_count,vote_average").unwrap();
        writeln!(file, "Alpha,\"[{{'id': 28, 'name': 'Action'}}]\",1000,7.0").unwrap();
        writeln!(file, "Beta,not-a-list,50,8.0").unwrap();
        std::fs::write(&matrix, "[[1.0, 0.9], [0.9, 1.0]]").unwrap();

        let loaded = Catalog::load_from_files(&dataset, &matrix).unwrap();
        assert_eq!(loaded.catalog.len(), 2);
        assert_eq!(loaded.similarity.dimension(), 2);
        assert_eq!(loaded.report.malformed_genres.len(), 1);
        assert_eq!(loaded.catalog.genre_vocabulary(), &["Action"]);
    }

    #[test]
    fn test_load_rejects_misaligned_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("movies.csv");
        let matrix = dir.path().join("similarity.json");

        std::fs::write(&dataset, "original_title,genres,vote_count,vote_average\nAlpha,[],1,1.0\n").unwrap();
        std::fs::write(&matrix, "[[1.0, 0.9], [0.9, 1.0]]").unwrap();

        let err = Catalog::load_from_files(&dataset, &matrix).unwrap_err();
        assert!(matches!(err, DataLoadError::DimensionMismatch { expected: 1, found: 2, .. }));
    }

    #[test]
    fn test_load_rejects_empty_dataset_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("movies.csv");
        let matrix = dir.path().join("similarity.json");
        std::fs::write(&dataset, "original_title,genres,vote_count,vote_average\n").unwrap();
        std::fs::write(&matrix, "[]").unwrap();

        let err = Catalog::load_from_files(&dataset, &matrix).unwrap_err();
        assert!(matches!(err, DataLoadError::EmptyDataset { .. }));

        let missing = dir.path().join("nope.csv");
        let err = Catalog::load_from_files(&missing, &matrix).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }
}
