use std::fs::create_dir_all;
use std::path::Path;

use rusqlite::Connection;

use crate::repository::{initialize_db, open_connection};
use crate::test::{cleanup, test_dir};

mod asset_repository_tests;
mod initialize_db_tests;

fn open_test_db() -> Connection {
    cleanup();
    create_dir_all(test_dir()).unwrap();
    let location = format!("{}/catalog.sqlite", test_dir());
    let con = open_connection(Path::new(&location)).unwrap();
    initialize_db(&con).unwrap();
    con
}
