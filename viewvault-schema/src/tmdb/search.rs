use serde::{Deserialize, Serialize};

/// Paged envelope shared by every `/search/*` endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchPage<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_results: u32,
}

impl<T> Default for SearchPage<T> {
    fn default() -> Self {
        Self {
            page: 0,
            results: Vec::new(),
            total_results: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MovieSearchResult {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TvSearchResult {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_search_page_ignores_unknown_fields() {
        let payload = r#"{
            "page": 1,
            "results": [
                {"id": 603, "title": "The Matrix", "release_date": "1999-03-31",
                 "poster_path": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg", "adult": false, "popularity": 80.1}
            ],
            "total_pages": 1,
            "total_results": 1
        }"#;
        let page: SearchPage<MovieSearchResult> = serde_json::from_str(payload).unwrap();
        assert_eq!(page.total_results, 1);
        assert_eq!(page.results[0].id, 603);
        assert_eq!(page.results[0].release_date.as_deref(), Some("1999-03-31"));
    }

    #[test]
    fn empty_search_page_defaults() {
        let page: SearchPage<TvSearchResult> = serde_json::from_str("{}").unwrap();
        assert!(page.results.is_empty());
    }
}
