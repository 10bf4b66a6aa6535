use serde::Serialize;
use url::form_urlencoded::byte_serialize;

use super::model::{Item, WatchSite};

const QUERY_PLACEHOLDER: &str = "{query}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchLink {
    pub name: String,
    pub url: String,
}

/// Percent-encodes each word of `title` and joins the words with `space_format`.
fn encode_title(title: &str, space_format: &str) -> String {
    title
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(|word| byte_serialize(word.as_bytes()).collect::<String>())
        .collect::<Vec<_>>()
        .join(space_format)
}

/// Search URL for `title` on `site`.
pub fn build_url(site: &WatchSite, title: &str) -> String {
    let query = encode_title(title, &site.space_format);
    if site.url.contains(QUERY_PLACEHOLDER) {
        site.url.replace(QUERY_PLACEHOLDER, &query)
    } else {
        format!("{}{query}", site.url)
    }
}

pub fn links_for(item: &Item, sites: &[WatchSite]) -> Vec<WatchLink> {
    sites
        .iter()
        .map(|site| WatchLink {
            name: site.name.clone(),
            url: build_url(site, &item.title),
        })
        .collect()
}
