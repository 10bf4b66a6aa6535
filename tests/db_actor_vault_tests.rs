mod common;

use viewvault::ViewVaultError;
use viewvault::db::{ItemFieldPatch, ItemPatch, SettingsUpsert, Snapshot, VaultCreate};
use viewvault::vault::snapshot::item_create;
use viewvault::vault::{MediaType, WatchSite};

#[tokio::test]
async fn default_vault_is_created_once_and_cannot_be_deleted() {
    let (database_url, temp_path) = common::temp_database("db-default-vault");
    let db = viewvault::db::spawn(&database_url).await;

    let first = db
        .ensure_default_vault("u1", MediaType::Movies)
        .await
        .expect("ensure default vault");
    let second = db
        .ensure_default_vault("u1", MediaType::Movies)
        .await
        .expect("ensure default vault again");
    assert_eq!(first.id, second.id);
    assert!(first.is_default);
    assert_eq!(first.name, "My Movies");

    let shows = db
        .ensure_default_vault("u1", MediaType::Tvshows)
        .await
        .expect("ensure default shows vault");
    assert_ne!(shows.id, first.id);

    let all = db.list_vaults("u1", None).await.expect("list vaults");
    assert_eq!(all.len(), 2);
    let movies_only = db
        .list_vaults("u1", Some(MediaType::Movies))
        .await
        .expect("list movie vaults");
    assert_eq!(movies_only.len(), 1);

    let err = db
        .delete_vault("u1", first.id)
        .await
        .expect_err("default vault must not be deletable");
    assert!(matches!(err, ViewVaultError::InvalidRequest(_)));

    // Another user cannot see or delete it either.
    assert!(db.get_vault("u2", first.id).await.unwrap().is_none());
    let err = db.delete_vault("u2", first.id).await.unwrap_err();
    assert!(matches!(err, ViewVaultError::VaultNotFound(_)));

    let _ = tokio::fs::remove_file(&temp_path).await;
}

#[tokio::test]
async fn items_are_unique_per_vault_and_clear_only_touches_one_vault() {
    let (database_url, temp_path) = common::temp_database("db-items");
    let db = viewvault::db::spawn(&database_url).await;

    let default = db
        .ensure_default_vault("u1", MediaType::Movies)
        .await
        .unwrap();
    let custom = db
        .create_vault(VaultCreate {
            uid: "u1".to_string(),
            name: "Noir".to_string(),
            media_type: MediaType::Movies,
        })
        .await
        .unwrap();
    assert!(!custom.is_default);

    let heat = common::movie(949, "Heat", "1995", &["Netflix"]);
    let alien = common::movie(348, "Alien", "1979", &["Hulu"]);

    let heat_id = db
        .insert_item(item_create(MediaType::Movies, default.id, &heat, true, Some(9.0)))
        .await
        .unwrap()
        .expect("first insert yields an id");
    let dup = db
        .insert_item(item_create(MediaType::Movies, default.id, &heat, false, None))
        .await
        .unwrap();
    assert!(dup.is_none(), "same external id in the same vault is ignored");

    // The same title may live in another vault.
    db.insert_item(item_create(MediaType::Movies, custom.id, &heat, false, None))
        .await
        .unwrap()
        .expect("insert into custom vault");
    db.insert_item(item_create(MediaType::Movies, default.id, &alien, false, None))
        .await
        .unwrap()
        .expect("insert alien");

    let Snapshot::Movies(rows) = db.load_snapshot(MediaType::Movies, default.id).await.unwrap()
    else {
        panic!("movie vault returned a show snapshot");
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].movietitle, "Heat");
    assert_eq!(rows[0].runtime, Some(i64::from(heat.length.unwrap())));
    assert_eq!(rows[0].userrating, Some(9.0));
    assert_eq!(rows[1].movietitle, "Alien");

    db.patch_item(ItemPatch {
        media_type: MediaType::Movies,
        vault_id: default.id,
        id: heat_id,
        patch: ItemFieldPatch {
            watched: Some(false),
            userrating: Some(None),
            ..Default::default()
        },
    })
    .await
    .unwrap();
    let Snapshot::Movies(rows) = db.load_snapshot(MediaType::Movies, default.id).await.unwrap()
    else {
        panic!("movie vault returned a show snapshot");
    };
    assert!(!rows[0].watched);
    assert_eq!(rows[0].userrating, None);
    assert_eq!(rows[0].agerating.as_deref(), Some("PG-13"));

    let removed = db.clear_vault(MediaType::Movies, default.id).await.unwrap();
    assert_eq!(removed, 2);
    assert!(db
        .load_snapshot(MediaType::Movies, default.id)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        db.load_snapshot(MediaType::Movies, custom.id)
            .await
            .unwrap()
            .len(),
        1
    );

    // Deleting the custom vault drops its items too.
    db.delete_vault("u1", custom.id).await.unwrap();
    assert!(db.get_vault("u1", custom.id).await.unwrap().is_none());
    assert!(db
        .load_snapshot(MediaType::Movies, custom.id)
        .await
        .unwrap()
        .is_empty());

    let err = db
        .delete_item(MediaType::Movies, default.id, heat_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ViewVaultError::ItemNotFound(_)));

    let _ = tokio::fs::remove_file(&temp_path).await;
}

#[tokio::test]
async fn settings_upsert_replaces_previous_value() {
    let (database_url, temp_path) = common::temp_database("db-settings");
    let db = viewvault::db::spawn(&database_url).await;

    assert!(db
        .get_settings("u1", MediaType::Tvshows)
        .await
        .unwrap()
        .is_none());

    for providers in [vec!["Netflix".to_string()], vec!["Hulu".to_string()]] {
        db.put_settings(SettingsUpsert {
            uid: "u1".to_string(),
            media_type: MediaType::Tvshows,
            providers,
            watch_sites: vec![WatchSite {
                name: "Example".to_string(),
                url: "https://example.test/?q=".to_string(),
                space_format: "+".to_string(),
            }],
        })
        .await
        .unwrap();
    }

    let row = db
        .get_settings("u1", MediaType::Tvshows)
        .await
        .unwrap()
        .expect("settings stored");
    let settings = viewvault::vault::Settings::from(row);
    assert_eq!(settings.providers, vec!["Hulu".to_string()]);
    assert_eq!(settings.watch_sites.len(), 1);
    assert!(db
        .get_settings("u1", MediaType::Movies)
        .await
        .unwrap()
        .is_none());

    let _ = tokio::fs::remove_file(&temp_path).await;
}
