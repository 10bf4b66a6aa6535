mod common;

use viewvault::transfer::{export_items, import_text, refresh_metadata};
use viewvault::vault::{MediaType, VaultSelector, VaultSession};

fn catalog() -> common::FakeMetadata {
    common::FakeMetadata::new(vec![
        (MediaType::Movies, common::movie(78, "Blade Runner", "1982", &["Netflix"])),
        (MediaType::Movies, common::movie(335984, "Blade Runner 2049", "2017", &["Max"])),
        (MediaType::Movies, common::movie(949, "Heat", "1995", &[])),
        (MediaType::Movies, common::movie(1091, "The Thing", "1982", &["Peacock"])),
    ])
}

#[tokio::test]
async fn import_counts_added_skipped_not_found_and_failed() {
    let (database_url, temp_path) = common::temp_database("import-report");
    let db = viewvault::db::spawn(&database_url).await;
    let metadata = catalog();
    let selector = VaultSelector::Default(MediaType::Movies);

    let mut session = VaultSession::open(db.clone(), "u1", selector).await.unwrap();
    let text = "\
Blade Runner (1982) [x] {9}
Heat (1995)

Heat
Nonexistent Movie (2001)
Boom Goes The Dynamite
The Thing (1982) [X] {42}
";
    let report = import_text(&mut session, &metadata, text).await;

    assert_eq!(report.added, 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.not_found, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.not_found_titles, vec!["Nonexistent Movie".to_string()]);

    let reopened = VaultSession::open(db.clone(), "u1", selector).await.unwrap();
    let titles: Vec<&str> = reopened.items().iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Blade Runner", "Heat", "The Thing"]);

    let blade = &reopened.items()[0];
    assert!(blade.watched);
    assert_eq!(blade.user_rating, Some(9.0));
    // Out of range rating is dropped, the title still lands.
    let thing = &reopened.items()[2];
    assert!(thing.watched);
    assert_eq!(thing.user_rating, None);

    // Importing the same text again writes nothing new.
    let mut session = reopened;
    let again = import_text(&mut session, &metadata, text).await;
    assert_eq!(again.added, 0);
    assert_eq!(again.skipped, 4);
    assert_eq!(session.items().len(), 3);

    let _ = tokio::fs::remove_file(&temp_path).await;
}

#[tokio::test]
async fn export_then_import_into_another_vault_round_trips() {
    let (database_url, temp_path) = common::temp_database("import-export");
    let db = viewvault::db::spawn(&database_url).await;
    let metadata = catalog();

    let mut source =
        VaultSession::open(db.clone(), "u1", VaultSelector::Default(MediaType::Movies))
            .await
            .unwrap();
    import_text(
        &mut source,
        &metadata,
        "Blade Runner 2049 (2017) {7.5}\nHeat (1995) [x]\n",
    )
    .await;
    let exported = export_items(source.items());
    assert_eq!(exported, "Blade Runner 2049 (2017) {7.5}\nHeat (1995) [x]\n");

    let mut target = VaultSession::open(db.clone(), "u2", VaultSelector::Default(MediaType::Movies))
        .await
        .unwrap();
    let report = import_text(&mut target, &metadata, &exported).await;
    assert_eq!(report.added, 2);
    assert_eq!(export_items(target.items()), exported);

    let _ = tokio::fs::remove_file(&temp_path).await;
}

#[tokio::test]
async fn refresh_updates_every_item_and_counts_failures() {
    let (database_url, temp_path) = common::temp_database("refresh");
    let db = viewvault::db::spawn(&database_url).await;
    let metadata = catalog();

    let mut session =
        VaultSession::open(db.clone(), "u1", VaultSelector::Default(MediaType::Movies))
            .await
            .unwrap();
    import_text(&mut session, &metadata, "Heat\nThe Thing\nBlade Runner\n").await;

    // A title the catalog no longer knows fails its lookup.
    let orphan = common::movie(5555, "Lost Film", "1950", &[]);
    session.insert(&orphan, false, None).await.unwrap();

    let refreshed = common::FakeMetadata::new(
        metadata
            .catalog
            .iter()
            .map(|(t, meta)| {
                let mut meta = meta.clone();
                meta.providers = Some(vec!["Criterion Channel".to_string()]);
                (*t, meta)
            })
            .collect(),
    );

    let report = refresh_metadata(&mut session, &refreshed, 2).await;
    assert_eq!(report.updated, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(refreshed.fetch_count(), 4);

    let reopened = VaultSession::open(db, "u1", VaultSelector::Default(MediaType::Movies))
        .await
        .unwrap();
    for item in reopened.items().iter().filter(|i| i.external_id != 5555) {
        assert_eq!(item.providers, vec!["Criterion Channel".to_string()]);
    }
    assert_eq!(reopened.items(), session.items());

    let _ = tokio::fs::remove_file(&temp_path).await;
}
