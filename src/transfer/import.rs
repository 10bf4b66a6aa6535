use serde::Serialize;
use tracing::{debug, info, warn};

use super::line::{ImportLine, parse_lines};
use crate::tmdb::MetadataSource;
use crate::vault::VaultSession;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub added: u32,
    pub skipped: u32,
    pub not_found: u32,
    pub failed: u32,
    pub not_found_titles: Vec<String>,
}

enum LineOutcome {
    Added,
    Skipped,
    NotFound,
    Failed,
}

async fn import_line(
    session: &mut VaultSession,
    metadata: &dyn MetadataSource,
    line: &ImportLine,
) -> LineOutcome {
    let media_type = session.media_type();
    let hits = match metadata
        .search(media_type, &line.title, line.year.as_deref())
        .await
    {
        Ok(hits) => hits,
        Err(e) => {
            warn!(title = %line.title, error = %e, "import search failed");
            return LineOutcome::Failed;
        }
    };

    let Some(hit) = hits.into_iter().next() else {
        return LineOutcome::NotFound;
    };
    if session.contains_external(hit.external_id) {
        debug!(title = %line.title, external_id = hit.external_id, "already in vault");
        return LineOutcome::Skipped;
    }

    let meta = match metadata.fetch_item(media_type, hit.external_id).await {
        Ok(meta) => meta,
        Err(e) => {
            warn!(title = %line.title, external_id = hit.external_id, error = %e, "import details failed");
            return LineOutcome::Failed;
        }
    };

    match session.insert(&meta, line.watched, line.rating).await {
        Ok(Some(_)) => LineOutcome::Added,
        Ok(None) => LineOutcome::Skipped,
        Err(e) => {
            warn!(title = %line.title, error = %e, "import write failed");
            LineOutcome::Failed
        }
    }
}

/// Imports every line of `text` into the session's vault, one line at a time.
/// Per-line failures are logged and counted; they never abort the import.
pub async fn import_text(
    session: &mut VaultSession,
    metadata: &dyn MetadataSource,
    text: &str,
) -> ImportReport {
    let mut report = ImportReport::default();

    for line in parse_lines(text) {
        match import_line(session, metadata, &line).await {
            LineOutcome::Added => report.added += 1,
            LineOutcome::Skipped => report.skipped += 1,
            LineOutcome::NotFound => {
                report.not_found += 1;
                report.not_found_titles.push(line.title);
            }
            LineOutcome::Failed => report.failed += 1,
        }
    }

    info!(
        path = %session.path(),
        added = report.added,
        skipped = report.skipped,
        not_found = report.not_found,
        failed = report.failed,
        "import finished"
    );
    report
}
