//! Core domain types for the movie catalog.
//!
//! Everything here is built once at startup and never mutated afterwards:
//! - `MovieRecord`: one strongly typed row of the dataset
//! - `Catalog`: the ordered rows plus the normalized-title index
//! - `CandidateRestriction`: a set of normalized titles used to narrow results
//! - `LoadReport`: data-quality findings collected while loading

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// =============================================================================
// Type Aliases
// =============================================================================

/// Position of a movie in the catalog. Stable for the process lifetime and
/// shared with the similarity matrix as its row/column address.
pub type RowId = usize;

// =============================================================================
// Title handling
// =============================================================================

/// Turn a free-text title into its lookup key.
///
/// Lowercases, then trims surrounding whitespace. The same function is used
/// when building the catalog index and when resolving user input.
pub fn normalize(title: &str) -> String {
    title.to_lowercase().trim().to_string()
}

/// Title-case a string the way the recommendation listings display titles.
///
/// A cased character that follows an uncased one is upper-cased, every other
/// cased character is lower-cased: `"it's a wonderful life"` becomes
/// `"It'S A Wonderful Life"`.
///
/// Matches Python's `str.title` except for titlecase digraphs: `ǆ` starting a
/// word becomes the uppercase `Ǆ`, not the titlecase `ǅ`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut previous_cased = false;
    for c in s.chars() {
        let cased = c.is_lowercase() || c.is_uppercase();
        if cased && !previous_cased {
            out.extend(c.to_uppercase());
        } else if cased {
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
        previous_cased = cased;
    }
    out
}

// =============================================================================
// Movie-related Types
// =============================================================================

/// Represents a movie in the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    /// Title exactly as it appeared in the dataset
    pub title: String,
    /// Normalized title, the catalog lookup key
    pub key: String,
    /// Genre names in dataset order, empty when the genre field was malformed
    pub genres: Vec<String>,
    pub vote_count: u32,
    pub vote_average: f64,
    /// Precomputed ranking score, when the dataset carries one
    pub score: Option<f64>,
}

impl MovieRecord {
    /// Build a record, deriving the lookup key from `title`
    pub fn new(
        title: impl Into<String>,
        genres: Vec<String>,
        vote_count: u32,
        vote_average: f64,
        score: Option<f64>,
    ) -> Self {
        let title = title.into();
        let key = normalize(&title);
        Self {
            title,
            key,
            genres,
            vote_count,
            vote_average,
            score,
        }
    }

    /// Title as shown in result listings
    pub fn display_title(&self) -> String {
        title_case(&self.key)
    }

    /// True if any of this movie's genres is in `wanted`
    pub fn has_any_genre(&self, wanted: &HashSet<String>) -> bool {
        self.genres.iter().any(|genre| wanted.contains(genre))
    }
}

/// Outcome of parsing one row's genre field.
///
/// A malformed field never aborts loading; the record gets an empty genre
/// list and the failure is kept here so the loader can report it.
#[derive(Debug, Clone, PartialEq)]
pub enum GenreField {
    Parsed(Vec<String>),
    Malformed { raw: String, reason: String },
}

impl GenreField {
    /// Genre names to store on the record
    pub fn into_names(self) -> Vec<String> {
        match self {
            GenreField::Parsed(names) => names,
            GenreField::Malformed { .. } => Vec::new(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, GenreField::Malformed { .. })
    }
}

// =============================================================================
// Candidate restriction
// =============================================================================

/// Set of normalized titles that recommendations must be drawn from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateRestriction {
    keys: HashSet<String>,
}

impl CandidateRestriction {
    /// An empty restriction: nothing passes
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw titles, normalizing each one
    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: titles.into_iter().map(|t| normalize(t.as_ref())).collect(),
        }
    }

    /// Build from keys that are already normalized
    pub fn from_keys(keys: HashSet<String>) -> Self {
        Self { keys }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// =============================================================================
// Load report
// =============================================================================

/// A row whose genre field could not be parsed
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedGenres {
    pub row: RowId,
    pub title: String,
    pub reason: String,
}

/// Two rows normalized to the same key. The later row wins the index slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateTitle {
    pub key: String,
    pub superseded_row: RowId,
    pub winning_row: RowId,
}

/// Data-quality findings gathered while building the catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub malformed_genres: Vec<MalformedGenres>,
    pub duplicate_titles: Vec<DuplicateTitle>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.malformed_genres.is_empty() && self.duplicate_titles.is_empty()
    }
}

// =============================================================================
// Catalog - The Core In-Memory Table
// =============================================================================

/// Immutable table of movies with a normalized-title index.
///
/// Row order is the dataset's iteration order and must match the
/// similarity matrix. Derived values (genre vocabulary, vote and rating
/// ranges) are computed once at construction.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub(crate) records: Vec<MovieRecord>,
    /// Normalized title -> row. Last row wins on duplicates.
    pub(crate) key_index: HashMap<String, RowId>,
    /// Sorted union of every row's genres
    pub(crate) genre_vocabulary: Vec<String>,
    pub(crate) votes_range: Option<(u32, u32)>,
    pub(crate) rating_range: Option<(f64, f64)>,
    pub(crate) duplicates: Vec<DuplicateTitle>,
}
