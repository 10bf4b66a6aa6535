//! The watchlist line format: `Title (Year) [x] {Rating}`.
//! Year, watched flag and rating are optional but keep that order.

use regex_lite::Regex;
use std::fmt::Write as _;
use std::sync::LazyLock;
use tracing::warn;

use crate::vault::{Item, validate_rating};

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<title>.+?)(?:\s*\((?P<year>\d{4})\))?(?:\s*\[(?P<watched>[xX ]?)\])?(?:\s*\{(?P<rating>[^{}]*)\})?$",
    )
    .expect("import line regex is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub struct ImportLine {
    pub title: String,
    pub year: Option<String>,
    pub watched: bool,
    pub rating: Option<f32>,
}

fn parse_rating(raw: &str, title: &str) -> Option<f32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = raw
        .parse::<f32>()
        .map_err(|e| e.to_string())
        .and_then(|r| validate_rating(r).map_err(|e| e.to_string()));
    match parsed {
        Ok(rating) => Some(rating),
        Err(reason) => {
            warn!(title, rating = raw, %reason, "dropping unusable rating");
            None
        }
    }
}

/// Parses one line; `None` for blank lines.
pub fn parse_line(line: &str) -> Option<ImportLine> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let caps = LINE_RE.captures(line)?;
    let title = caps.name("title")?.as_str().trim().to_string();
    let rating = caps
        .name("rating")
        .and_then(|m| parse_rating(m.as_str(), &title));

    Some(ImportLine {
        year: caps.name("year").map(|m| m.as_str().to_string()),
        watched: caps
            .name("watched")
            .is_some_and(|m| m.as_str().eq_ignore_ascii_case("x")),
        rating,
        title,
    })
}

pub fn parse_lines(text: &str) -> Vec<ImportLine> {
    text.lines().filter_map(parse_line).collect()
}

fn is_four_digit_year(year: &str) -> bool {
    year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit())
}

/// Whether `title` alone reads back as the same title. Titles ending in
/// something shaped like `(1999)`, `[x]` or `{8}` lose that suffix on import.
pub fn title_survives_import(title: &str) -> bool {
    parse_line(title).is_some_and(|line| line.title == title.trim())
}

/// Serializes one item back into the line format.
/// The title is written as is; see [`title_survives_import`].
pub fn format_line(item: &Item) -> String {
    if !title_survives_import(&item.title) {
        warn!(item_id = item.id, title = %item.title, "exported title will not import unchanged");
    }
    let mut line = item.title.clone();
    if let Some(year) = item
        .release_year
        .as_deref()
        .map(str::trim)
        .filter(|y| is_four_digit_year(y))
    {
        let _ = write!(line, " ({year})");
    }
    if item.watched {
        line.push_str(" [x]");
    }
    if let Some(rating) = item.user_rating {
        let _ = write!(line, " {{{rating}}}");
    }
    line
}

/// Export of a whole vault, one line per item in snapshot order.
pub fn export_items(items: &[Item]) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(&format_line(item));
        out.push('\n');
    }
    out
}
