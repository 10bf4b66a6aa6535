//! Filter/sort pipeline applied to a vault listing. Pure and synchronous.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use super::model::Item;
use crate::error::ViewVaultError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Snapshot (insertion) order.
    #[default]
    Default,
    WatchedFirst,
    WatchedLast,
    /// Shortest first.
    Runtime,
    /// Fewest episodes first.
    Episodes,
    /// Highest rated first.
    UserRating,
    /// Oldest first.
    ReleaseYear,
}

impl FromStr for SortKey {
    type Err = ViewVaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "" | "default" => Ok(SortKey::Default),
            "watched_first" => Ok(SortKey::WatchedFirst),
            "watched_last" => Ok(SortKey::WatchedLast),
            "runtime" => Ok(SortKey::Runtime),
            "episodes" | "episode_count" => Ok(SortKey::Episodes),
            "user_rating" | "rating" => Ok(SortKey::UserRating),
            "release_year" | "year" => Ok(SortKey::ReleaseYear),
            other => Err(ViewVaultError::invalid(format!("unknown sort key `{other}`"))),
        }
    }
}

/// Orders `Some` values with `cmp` and puts every `None` after them.
fn missing_last<T>(a: Option<T>, b: Option<T>, cmp: impl FnOnce(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare(a: &Item, b: &Item, key: SortKey) -> Ordering {
    match key {
        SortKey::Default => Ordering::Equal,
        SortKey::WatchedFirst => b.watched.cmp(&a.watched),
        SortKey::WatchedLast => a.watched.cmp(&b.watched),
        SortKey::Runtime => missing_last(a.runtime, b.runtime, |a, b| a.cmp(&b)),
        SortKey::Episodes => missing_last(a.episode_count, b.episode_count, |a, b| a.cmp(&b)),
        SortKey::UserRating => missing_last(a.user_rating, b.user_rating, |a, b| b.total_cmp(&a)),
        SortKey::ReleaseYear => missing_last(a.year(), b.year(), |a, b| a.cmp(&b)),
    }
}

/// Keeps items offered by at least one selected provider.
/// An empty selection keeps everything.
pub fn filter_by_providers<'a>(items: &'a [Item], selected: &[String]) -> Vec<&'a Item> {
    if selected.is_empty() {
        return items.iter().collect();
    }
    let selected: AHashSet<&str> = selected.iter().map(String::as_str).collect();
    items
        .iter()
        .filter(|item| item.providers.iter().any(|p| selected.contains(p.as_str())))
        .collect()
}

/// Stable sort by `key`.
pub fn sort_items(items: &mut [&Item], key: SortKey) {
    if key == SortKey::Default {
        return;
    }
    items.sort_by(|a, b| compare(a, b, key));
}

/// Filter then sort, returning owned items ready to serialize.
pub fn apply(items: &[Item], selected: &[String], key: SortKey) -> Vec<Item> {
    let mut view = filter_by_providers(items, selected);
    sort_items(&mut view, key);
    view.into_iter().cloned().collect()
}
