//! Parsers for the dataset CSV and the similarity matrix file.
//!
//! Dataset rows: `original_title,genres,vote_count,vote_average[,score]`,
//! extra columns ignored. The genre column holds a Python-style literal:
//! `[{'id': 28, 'name': 'Action'}, {'id': 80, 'name': 'Crime'}]`
//!
//! Similarity files are either JSON (`[[f32]]`) or raw little-endian `f32`
//! values in row-major order.

use crate::error::{DataLoadError, Result};
use crate::similarity::SimilarityMatrix;
use crate::types::{GenreField, MovieRecord};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// One dataset row after parsing, before it is placed in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMovie {
    pub title: String,
    pub genres: GenreField,
    pub vote_count: u32,
    pub vote_average: f64,
    pub score: Option<f64>,
}

impl ParsedMovie {
    pub fn into_record(self) -> MovieRecord {
        MovieRecord::new(
            self.title,
            self.genres.into_names(),
            self.vote_count,
            self.vote_average,
            self.score,
        )
    }
}

/// Columns we read from the dataset; anything else in the file is ignored
#[derive(Debug, Deserialize)]
struct RawMovieRow {
    original_title: String,
    #[serde(default)]
    genres: String,
    vote_count: String,
    vote_average: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GenreEntry {
    name: String,
}

/// Open a file, reporting a missing file by path
fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

/// Parse the dataset CSV file
pub fn parse_movies(path: &Path) -> Result<Vec<ParsedMovie>> {
    let file = open_file(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_movies_from_reader(BufReader::new(file), &name)
}

/// Parse dataset CSV from any reader. `file` is only used in error messages.
pub fn parse_movies_from_reader<R: Read>(reader: R, file: &str) -> Result<Vec<ParsedMovie>> {
    let csv_error = |source| DataLoadError::Csv {
        file: file.to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut movies = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(csv_error)?;
        // Header is line 1
        let line_no = record
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 2);
        let parse_error = |reason: String| DataLoadError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason,
        };

        let raw: RawMovieRow = record
            .deserialize(Some(&headers))
            .map_err(|e| parse_error(e.to_string()))?;

        let movie = ParsedMovie {
            title: raw.original_title,
            genres: parse_genre_field(&raw.genres),
            vote_count: parse_vote_count(&raw.vote_count).map_err(parse_error)?,
            vote_average: parse_vote_average(&raw.vote_average).map_err(parse_error)?,
            score: raw.score.filter(|s| s.is_finite()),
        };
        movies.push(movie);
    }

    Ok(movies)
}

/// Vote counts are integers, but exports often write them as `1234.0`
fn parse_vote_count(s: &str) -> std::result::Result<u32, String> {
    let s = s.trim();
    if let Ok(count) = s.parse::<u32>() {
        return Ok(count);
    }
    let value: f64 = s
        .parse()
        .map_err(|e| format!("Invalid vote_count '{}': {}", s, e))?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Ok(value as u32)
    } else {
        Err(format!("Invalid vote_count '{}': not a non-negative integer", s))
    }
}

fn parse_vote_average(s: &str) -> std::result::Result<f64, String> {
    let s = s.trim();
    let value: f64 = s
        .parse()
        .map_err(|e| format!("Invalid vote_average '{}': {}", s, e))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("Invalid vote_average '{}': not finite", s))
    }
}

/// Parse a genre column into genre names.
///
/// Example: `[{'id': 18, 'name': 'Drama'}]` -> `Parsed(vec!["Drama"])`
///          `not a list`                   -> `Malformed { .. }`
pub fn parse_genre_field(raw: &str) -> GenreField {
    let malformed = |reason: String| GenreField::Malformed {
        raw: raw.to_string(),
        reason,
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return malformed("empty genre field".to_string());
    }

    let json = match python_literal_to_json(trimmed) {
        Ok(json) => json,
        Err(reason) => return malformed(reason),
    };

    match serde_json::from_str::<Vec<GenreEntry>>(&json) {
        Ok(entries) => GenreField::Parsed(entries.into_iter().map(|g| g.name).collect()),
        Err(e) => malformed(e.to_string()),
    }
}

/// Rewrite a Python literal (single-quoted strings, `None`/`True`/`False`)
/// into JSON text. Structure is left for serde_json to validate.
fn python_literal_to_json(literal: &str) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(literal.len() + 8);
    let mut chars = literal.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                let quote = c;
                out.push('"');
                loop {
                    match chars.next() {
                        None => return Err("unterminated string literal".to_string()),
                        Some(c) if c == quote => break,
                        Some('\\') => match chars.next() {
                            None => return Err("dangling escape at end of input".to_string()),
                            Some('\'') => out.push('\''),
                            Some('"') => out.push_str("\\\""),
                            Some(escaped) => {
                                out.push('\\');
                                out.push(escaped);
                            }
                        },
                        Some('"') => out.push_str("\\\""),
                        Some(other) => out.push(other),
                    }
                }
                out.push('"');
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' {
                        ident.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match ident.as_str() {
                    "None" => out.push_str("null"),
                    "True" => out.push_str("true"),
                    "False" => out.push_str("false"),
                    other => return Err(format!("unexpected identifier '{}'", other)),
                }
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

/// On-disk encodings of the similarity matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixFormat {
    /// `[[0.1, 0.2], [0.2, 0.1]]`
    Json,
    /// Row-major little-endian `f32`, no header
    RawF32Le,
}

impl MatrixFormat {
    /// `.json` files are JSON, everything else is treated as raw floats
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => MatrixFormat::Json,
            _ => MatrixFormat::RawF32Le,
        }
    }
}

/// Parse the similarity matrix file, picking the format from its extension
pub fn parse_similarity(path: &Path) -> Result<SimilarityMatrix> {
    let file = open_file(path)?;
    match MatrixFormat::from_path(path) {
        MatrixFormat::Json => parse_similarity_json(BufReader::new(file)),
        MatrixFormat::RawF32Le => {
            let mut bytes = Vec::new();
            BufReader::new(file).read_to_end(&mut bytes)?;
            parse_similarity_raw(&bytes)
        }
    }
}

/// Parse a JSON array of rows
pub fn parse_similarity_json<R: Read>(reader: R) -> Result<SimilarityMatrix> {
    let rows: Vec<Vec<f32>> = serde_json::from_reader(reader)?;
    SimilarityMatrix::from_rows(rows)
}

/// Parse raw little-endian `f32` values. The dimension is the square root of
/// the value count.
pub fn parse_similarity_raw(bytes: &[u8]) -> Result<SimilarityMatrix> {
    if bytes.len() % 4 != 0 {
        return Err(DataLoadError::InvalidValue {
            field: "similarity byte length".to_string(),
            value: format!("{} (not a multiple of 4)", bytes.len()),
        });
    }

    let values: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    let dimension = (values.len() as f64).sqrt().round() as usize;
    if dimension * dimension != values.len() {
        return Err(DataLoadError::DimensionMismatch {
            expected: dimension * dimension,
            found: values.len(),
            context: "raw similarity file is not a square matrix".to_string(),
        });
    }

    SimilarityMatrix::from_flat(dimension, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_genre_field() {
        let field = parse_genre_field("[{'id': 28, 'name': 'Action'}, {'id': 80, 'name': 'Crime'}]");
        assert_eq!(
            field,
            GenreField::Parsed(vec!["Action".to_string(), "Crime".to_string()])
        );
    }

    #[test]
    fn test_parse_genre_field_double_quotes_and_apostrophes() {
        let field = parse_genre_field(r#"[{"id": 1, "name": "Children's"}, {'id': 2, 'name': 'Rock \'n\' Roll'}]"#);
        assert_eq!(
            field,
            GenreField::Parsed(vec!["Children's".to_string(), "Rock 'n' Roll".to_string()])
        );
    }

    #[test]
    fn test_parse_genre_field_empty_list() {
        assert_eq!(parse_genre_field("[]"), GenreField::Parsed(vec![]));
    }

    #[test]
    fn test_parse_genre_field_malformed() {
        assert!(parse_genre_field("").is_malformed());
        assert!(parse_genre_field("nan").is_malformed());
        assert!(parse_genre_field("[{'name': 'Drama'").is_malformed());
        assert!(parse_genre_field("[{'id': 1}]").is_malformed());
        assert!(parse_genre_field("Action|Drama").is_malformed());
    }

    #[test]
    fn test_malformed_genres_become_empty_list() {
        let field = parse_genre_field("garbage");
        assert!(field.into_names().is_empty());
    }

    #[test]
    fn test_parse_vote_count() {
        assert_eq!(parse_vote_count("1234"), Ok(1234));
        assert_eq!(parse_vote_count("1234.0"), Ok(1234));
        assert!(parse_vote_count("-3").is_err());
        assert!(parse_vote_count("12.5").is_err());
        assert!(parse_vote_count("many").is_err());
    }

    #[test]
    fn test_parse_movies_from_reader() {
        let data = "\
id,original_title,genres,vote_count,vote_average,score
1,Avatar,\"[{'id': 28, 'name': 'Action'}]\",11800,7.2,7.05
2,  Spectre ,broken,4466.0,6.3,
";
        let movies = parse_movies_from_reader(data.as_bytes(), "movies.csv").unwrap();

        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].title, "Avatar");
        assert_eq!(movies[0].genres, GenreField::Parsed(vec!["Action".to_string()]));
        assert_eq!(movies[0].vote_count, 11800);
        assert_eq!(movies[0].score, Some(7.05));

        assert_eq!(movies[1].title, "  Spectre ");
        assert!(movies[1].genres.is_malformed());
        assert_eq!(movies[1].vote_count, 4466);
        assert_eq!(movies[1].score, None);
    }

    #[test]
    fn test_parse_movies_without_score_column() {
        let data = "original_title,genres,vote_count,vote_average\nAlpha,[],10,5.5\n";
        let movies = parse_movies_from_reader(data.as_bytes(), "movies.csv").unwrap();
        assert_eq!(movies[0].score, None);
    }

    #[test]
    fn test_parse_movies_unreadable_score_is_none() {
        let data = "\
original_title,genres,vote_count,vote_average,score
Alpha,[],10,5.5,abc
Beta,[],20,6.5
Gamma,[],30,7.5,6.25
";
        let movies = parse_movies_from_reader(data.as_bytes(), "movies.csv").unwrap();

        assert_eq!(movies.len(), 3);
        assert_eq!(movies[0].score, None);
        assert_eq!(movies[1].score, None);
        assert_eq!(movies[2].score, Some(6.25));
    }

    #[test]
    fn test_parse_movies_rejects_non_finite_rating() {
        let data = "original_title,genres,vote_count,vote_average\nAlpha,[],10,5.5\nBeta,[],10,NaN\n";
        let err = parse_movies_from_reader(data.as_bytes(), "movies.csv").unwrap_err();
        match err {
            DataLoadError::ParseError { line, reason, .. } => {
                assert_eq!(line, 3);
                assert!(reason.contains("vote_average"));
            }
            other => panic!("expected ParseError, got {:?}", other),
        }

        let data = "original_title,genres,vote_count,vote_average\nAlpha,[],10,inf\n";
        assert!(parse_movies_from_reader(data.as_bytes(), "movies.csv").is_err());
    }

    #[test]
    fn test_parse_movies_reports_line() {
        let data = "original_title,genres,vote_count,vote_average\nAlpha,[],10,5.5\nBeta,[],ten,5.5\n";
        let err = parse_movies_from_reader(data.as_bytes(), "movies.csv").unwrap_err();
        match err {
            DataLoadError::ParseError { line, file, .. } => {
                assert_eq!(line, 3);
                assert_eq!(file, "movies.csv");
            }
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_similarity_raw() {
        let values = [1.0f32, 0.5, 0.5, 1.0];
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();

        let matrix = parse_similarity_raw(&bytes).unwrap();
        assert_eq!(matrix.dimension(), 2);
        assert_eq!(matrix.get(0, 1), Some(0.5));

        assert!(parse_similarity_raw(&bytes[..6]).is_err());
        assert!(parse_similarity_raw(&bytes[..12]).is_err());
    }

    #[test]
    fn test_parse_similarity_json() {
        let matrix = parse_similarity_json("[[1.0, 0.9], [0.9, 1.0]]".as_bytes()).unwrap();
        assert_eq!(matrix.get(1, 0), Some(0.9));

        assert!(parse_similarity_json("[[1.0, 0.9], [0.9]]".as_bytes()).is_err());
        assert!(parse_similarity_json("{}".as_bytes()).is_err());
    }

    #[test]
    fn test_matrix_format_from_path() {
        assert_eq!(MatrixFormat::from_path(Path::new("sim.json")), MatrixFormat::Json);
        assert_eq!(MatrixFormat::from_path(Path::new("sim.JSON")), MatrixFormat::Json);
        assert_eq!(MatrixFormat::from_path(Path::new("sim.f32")), MatrixFormat::RawF32Le);
    }
}
