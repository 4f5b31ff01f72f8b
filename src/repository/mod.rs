use std::path::Path;

use rusqlite::{Connection, OpenFlags, Result};

use crate::db_migrations::migrate_db;

pub mod asset_repository;
pub mod backup_repository;
pub mod folder_repository;
pub mod metadata_repository;
pub mod recent_path_repository;
pub mod sync_definition_repository;
pub mod thumbnail_repository;

#[cfg(test)]
mod tests;

/// opens a connection to the catalog database at `location`, creating the file if it doesn't exist.
/// Foreign keys are enforced and the `rarray` table function is loaded on every connection
pub fn open_connection(location: &Path) -> Result<Connection> {
    let con = Connection::open_with_flags(location, OpenFlags::default())?;
    con.pragma_update(None, "foreign_keys", "ON")?;
    rusqlite::vtab::array::load_module(&con)?;
    Ok(con)
}

/// runs init.sql on the database
fn create_db(con: &Connection) -> Result<()> {
    let sql = include_str!("../assets/init.sql");
    con.execute_batch(sql)
}

/// handles checking if the database exists and is up to the correct version.
/// If not, it either creates or upgrades the database accordingly
pub fn initialize_db(con: &Connection) -> Result<()> {
    let table_version = match metadata_repository::get_version(con) {
        Ok(value) => value.parse::<u64>().unwrap_or(1),
        Err(_) => {
            // tables haven't been created yet
            log::info!("No catalog found, creating a new one...");
            create_db(con)?;
            1
        }
    };
    migrate_db(con, table_version)
}
