//! Parser for MovieLens data files.
//!
//! Two files are read:
//! - movies.dat: `movieId::title::genres`
//! - ratings.dat: `userId::movieId::rating::timestamp`
//!
//! Fields are separated by `::`. Blank lines are skipped, and line numbers
//! in errors are 1-based and count the blank lines too, so they match what
//! an editor shows.
//!
//! Both files are ISO-8859-1 encoded, not UTF-8. Every byte is mapped to
//! the code point with the same value, which is exactly Latin-1, so titles
//! such as "Café" survive without a lossy conversion.
//!
//! Genres and timestamps must be present and the timestamp must be an
//! integer, but neither is kept: the providers only serve names and scores.
//! Score range checks happen later in [`crate::index::ProviderIndex::validate`],
//! once movies and ratings can be cross-checked.

use crate::error::{LoadError, Result};
use catalog_types::{Item, Rating, UserId};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::Split;

/// One line of ratings.dat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingRecord {
    pub user_id: UserId,
    pub rating: Rating,
}

/// Read a Latin-1 file into lines; every byte maps to one code point
fn read_lines_latin1(path: &Path) -> Result<Vec<String>> {
    let mut bytes = Vec::new();
    File::open(path)
        .and_then(|mut file| file.read_to_end(&mut bytes))
        .map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;

    let content: String = bytes.iter().map(|&b| b as char).collect();
    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Pull the next `::`-separated field or fail with its name
fn next_field<'a>(
    parts: &mut Split<'a, &'static str>,
    file: &str,
    line: usize,
    name: &str,
) -> Result<&'a str> {
    parts.next().ok_or_else(|| LoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Missing {name}"),
    })
}

/// Non-empty, trimmed lines with their 1-based line numbers
fn data_lines(lines: &[String]) -> impl Iterator<Item = (usize, &str)> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// Parse movies.dat into items named by their full title, e.g. "Toy Story (1995)"
pub fn parse_movies(path: &Path) -> Result<Vec<Item>> {
    let lines = read_lines_latin1(path)?;
    let mut items = Vec::new();

    for (line_no, line) in data_lines(&lines) {
        let mut parts = line.split("::");
        let movie_id = next_field(&mut parts, "movies.dat", line_no, "movieId")?;
        let title = next_field(&mut parts, "movies.dat", line_no, "title")?;
        next_field(&mut parts, "movies.dat", line_no, "genres")?;

        if movie_id.is_empty() {
            return Err(LoadError::ParseError {
                file: "movies.dat".to_string(),
                line: line_no,
                reason: "Empty movieId".to_string(),
            });
        }
        items.push(Item::new(movie_id, title));
    }
    Ok(items)
}

/// Parse ratings.dat, keeping file order per user
pub fn parse_ratings(path: &Path) -> Result<Vec<RatingRecord>> {
    let lines = read_lines_latin1(path)?;
    let mut records = Vec::new();

    for (line_no, line) in data_lines(&lines) {
        let mut parts = line.split("::");
        let user_id = next_field(&mut parts, "ratings.dat", line_no, "userId")?;
        let movie_id = next_field(&mut parts, "ratings.dat", line_no, "movieId")?;
        let score = next_field(&mut parts, "ratings.dat", line_no, "rating")?;
        let timestamp = next_field(&mut parts, "ratings.dat", line_no, "timestamp")?;

        let score: i32 = score.parse().map_err(|e| LoadError::ParseError {
            file: "ratings.dat".to_string(),
            line: line_no,
            reason: format!("Invalid rating: {}", e),
        })?;
        timestamp.parse::<i64>().map_err(|e| LoadError::ParseError {
            file: "ratings.dat".to_string(),
            line: line_no,
            reason: format!("Invalid timestamp: {}", e),
        })?;

        records.push(RatingRecord {
            user_id: user_id.to_string(),
            rating: Rating::new(movie_id, score),
        });
    }
    Ok(records)
}
