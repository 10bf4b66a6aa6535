use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::tmdb::MetadataSource;
use crate::vault::VaultSession;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub updated: u32,
    pub failed: u32,
}

/// Re-fetches metadata for every item, `batch_size` lookups at a time.
/// Writes go back one by one; failures are counted and the batch carries on.
pub async fn refresh_metadata(
    session: &mut VaultSession,
    metadata: &dyn MetadataSource,
    batch_size: usize,
) -> RefreshReport {
    let media_type = session.media_type();
    let targets: Vec<(i64, u64)> = session
        .items()
        .iter()
        .map(|item| (item.id, item.external_id))
        .collect();
    let mut report = RefreshReport::default();

    for batch in targets.chunks(batch_size.max(1)) {
        let fetched = join_all(
            batch
                .iter()
                .map(|(_, external_id)| metadata.refetch_item(media_type, *external_id)),
        )
        .await;

        for ((item_id, external_id), result) in batch.iter().zip(fetched) {
            let outcome = match result {
                Ok(meta) => session.apply_metadata(*item_id, &meta).await,
                Err(e) => Err(e.into()),
            };
            match outcome {
                Ok(()) => report.updated += 1,
                Err(e) => {
                    warn!(item_id, external_id, error = %e, "metadata refresh failed");
                    report.failed += 1;
                }
            }
        }
    }

    info!(
        path = %session.path(),
        updated = report.updated,
        failed = report.failed,
        "refresh finished"
    );
    report
}
