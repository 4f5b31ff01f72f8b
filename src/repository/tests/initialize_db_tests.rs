use super::open_test_db;
use crate::db_migrations::CURRENT_DB_VERSION;
use crate::repository::{initialize_db, metadata_repository};
use crate::test::cleanup;

#[test]
fn new_database_is_at_current_version() {
    let con = open_test_db();
    let version = metadata_repository::get_version(&con).unwrap();
    con.close().unwrap();
    assert_eq!(CURRENT_DB_VERSION.to_string(), version);
    cleanup();
}

#[test]
fn initializing_twice_keeps_data() {
    let con = open_test_db();
    con.execute("insert into Folders(path) values ('/photos')", [])
        .unwrap();
    initialize_db(&con).unwrap();
    let count: i64 = con
        .query_row("select count(*) from Folders", [], |row| row.get(0))
        .unwrap();
    con.close().unwrap();
    assert_eq!(1, count);
    cleanup();
}

#[test]
fn foreign_keys_are_enforced() {
    let con = open_test_db();
    let res = con.execute(
        "insert into Thumbnails(assetId, contents) values (42, x'00')",
        [],
    );
    con.close().unwrap();
    assert!(res.is_err());
    cleanup();
}
