use super::open_test_db;
use crate::model::repository::Rotation;
use crate::repository::{asset_repository, folder_repository, thumbnail_repository};
use crate::test::{cleanup, make_asset};

#[test]
fn create_and_get_round_trips_every_column() {
    let con = open_test_db();
    let folder = folder_repository::create_folder("/photos", &con).unwrap();
    let mut asset = make_asset(folder.id.unwrap(), "a.jpg");
    asset.phash = Some("phash".to_string());
    asset.rotation = Rotation::Rotate270;
    asset.is_corrupted = true;
    asset.corrupted_message = Some("broken".to_string());
    asset.file_size = 5_000_000_000;
    let id = asset_repository::create_asset(&asset, &con).unwrap();
    let saved = asset_repository::get_by_name(folder.id.unwrap(), "a.jpg", &con)
        .unwrap()
        .unwrap();
    con.close().unwrap();
    asset.id = Some(id);
    assert_eq!(asset, saved);
    cleanup();
}

#[test]
fn get_by_name_of_missing_asset_is_none() {
    let con = open_test_db();
    let folder = folder_repository::create_folder("/photos", &con).unwrap();
    let res = asset_repository::get_by_name(folder.id.unwrap(), "nope.jpg", &con).unwrap();
    con.close().unwrap();
    assert_eq!(None, res);
    cleanup();
}

#[test]
fn delete_by_names_only_touches_the_folder() {
    let con = open_test_db();
    let photos = folder_repository::create_folder("/photos", &con).unwrap().id.unwrap();
    let other = folder_repository::create_folder("/other", &con).unwrap().id.unwrap();
    for name in ["a.jpg", "b.jpg", "c.jpg"] {
        asset_repository::create_asset(&make_asset(photos, name), &con).unwrap();
    }
    asset_repository::create_asset(&make_asset(other, "a.jpg"), &con).unwrap();
    let deleted = asset_repository::delete_by_names(
        photos,
        &["a.jpg".to_string(), "c.jpg".to_string()],
        &con,
    )
    .unwrap();
    let remaining: Vec<String> = asset_repository::get_all_assets(&con)
        .unwrap()
        .into_iter()
        .map(|a| format!("{}:{}", a.folder_id, a.file_name))
        .collect();
    con.close().unwrap();
    assert_eq!(2, deleted);
    assert_eq!(
        vec![format!("{photos}:b.jpg"), format!("{other}:a.jpg")],
        remaining
    );
    cleanup();
}

#[test]
fn deleting_asset_removes_thumbnail() {
    let con = open_test_db();
    let folder = folder_repository::create_folder("/photos", &con).unwrap();
    let folder_id = folder.id.unwrap();
    let id = asset_repository::create_asset(&make_asset(folder_id, "a.jpg"), &con).unwrap();
    thumbnail_repository::save_thumbnail(id, &[1, 2, 3], &con).unwrap();
    asset_repository::delete_by_names(folder_id, &["a.jpg".to_string()], &con).unwrap();
    let res = thumbnail_repository::get_thumbnail(id, &con);
    con.close().unwrap();
    assert_eq!(Err(rusqlite::Error::QueryReturnedNoRows), res);
    cleanup();
}

#[test]
fn count_assets_counts_every_folder() {
    let con = open_test_db();
    let photos = folder_repository::create_folder("/photos", &con).unwrap().id.unwrap();
    let other = folder_repository::create_folder("/other", &con).unwrap().id.unwrap();
    asset_repository::create_asset(&make_asset(photos, "a.jpg"), &con).unwrap();
    asset_repository::create_asset(&make_asset(other, "a.jpg"), &con).unwrap();
    let count = asset_repository::count_assets(&con).unwrap();
    con.close().unwrap();
    assert_eq!(2, count);
    cleanup();
}
