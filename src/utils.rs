use chrono::NaiveDate;

use crate::types::{AlbumRecord, AlbumTableRow, DatePrecision};

const GENRE_PREFIX: &str = ", commonly associated with ";

/// Builds the trailing genre clause of the artist summary sentence.
///
/// Returns an empty string when there are no genres. Two or more genres are
/// comma separated with the last pair joined by " and " (no Oxford comma).
///
/// # Example
///
/// ```
/// let clause = format_genre_clause(&["rock".into(), "pop".into(), "jazz".into()]);
/// assert_eq!(clause, ", commonly associated with rock, pop and jazz");
/// ```
pub fn format_genre_clause(genres: &[String]) -> String {
    match genres {
        [] => String::new(),
        [only] => format!("{GENRE_PREFIX}{only}"),
        [head @ .., last] => format!("{GENRE_PREFIX}{} and {last}", head.join(", ")),
    }
}

/// Renders an ISO date as "May 21, 1997", honouring the release date precision.
///
/// Month precision renders as "May 1997" and year precision as "1997". Input
/// that cannot be parsed is returned unchanged.
pub fn format_release_date(iso_date: &str, precision: DatePrecision) -> String {
    let trimmed = iso_date.trim();
    let parsed = match precision {
        DatePrecision::Day => {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map(|d| d.format("%b %-d, %Y"))
        }
        DatePrecision::Month => NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            .map(|d| d.format("%b %Y")),
        DatePrecision::Year => {
            NaiveDate::parse_from_str(&format!("{trimmed}-01-01"), "%Y-%m-%d")
                .map(|d| d.format("%Y"))
        }
    };

    match parsed {
        Ok(formatted) => formatted.to_string(),
        Err(_) => iso_date.to_string(),
    }
}

/// Picks `singular` for a count of exactly one, `plural` otherwise.
///
/// # Example
///
/// ```
/// assert_eq!(pluralize(1, "song", "songs"), "song");
/// assert_eq!(pluralize(0, "song", "songs"), "songs");
/// ```
pub fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

/// Formats a number with "," thousands separators, e.g. `8,234,567`.
pub fn format_followers(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Renders a popularity score as a fixed-width bar followed by the percentage.
pub fn popularity_bar(popularity: u8, width: usize) -> String {
    let popularity = popularity.min(100) as usize;
    let filled = (popularity * width + 50) / 100;
    format!(
        "[{}{}] {}%",
        "█".repeat(filled),
        "░".repeat(width - filled),
        popularity
    )
}

/// The sentence shown under the artist name, e.g.
/// "Radiohead has released 9 albums, commonly associated with art rock."
pub fn artist_summary(name: &str, album_count: usize, genres: &[String]) -> String {
    format!(
        "{name} has released {album_count} {}{}.",
        pluralize(album_count, "album", "albums"),
        format_genre_clause(genres)
    )
}

/// Converts albums into table rows for the discography listing.
///
/// # Arguments
///
/// * `albums` - Albums in the order Spotify returned them
///
/// # Returns
///
/// One row per album, same order, with the release date formatted according
/// to its precision and the track count written as "12 songs" / "1 song".
pub fn album_table_rows(albums: &[AlbumRecord]) -> Vec<AlbumTableRow> {
    albums
        .iter()
        .map(|a| AlbumTableRow {
            name: a.name.clone(),
            released: format_release_date(&a.release_date, a.release_date_precision),
            tracks: format!(
                "{} {}",
                a.total_tracks,
                pluralize(a.total_tracks as usize, "song", "songs")
            ),
            link: a.external_url.clone(),
        })
        .collect()
}
