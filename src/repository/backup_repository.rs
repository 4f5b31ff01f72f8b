use std::path::Path;

use rusqlite::{params, Connection};

/// copies the record tables of the catalog into a new database file at `backup`.
/// Thumbnails are left out, they can always be rendered again
pub fn copy_records_into(backup: &Path, con: &Connection) -> Result<(), rusqlite::Error> {
    attach(backup, con)?;
    let res = con.execute_batch(include_str!("../assets/queries/backup/copy_record_tables.sql"));
    detach(con)?;
    res
}

/// replaces the record tables of the catalog with the ones in `backup`.
/// Thumbnails of assets that still exist afterwards are kept
pub fn restore_records_from(backup: &Path, con: &Connection) -> Result<(), rusqlite::Error> {
    attach(backup, con)?;
    let res = con.unchecked_transaction().and_then(|tx| {
        tx.execute_batch(include_str!(
            "../assets/queries/backup/restore_record_tables.sql"
        ))?;
        tx.commit()
    });
    detach(con)?;
    res
}

fn attach(backup: &Path, con: &Connection) -> Result<(), rusqlite::Error> {
    con.execute(
        include_str!("../assets/queries/backup/attach_backup.sql"),
        params![backup.to_string_lossy()],
    )?;
    Ok(())
}

fn detach(con: &Connection) -> Result<(), rusqlite::Error> {
    con.execute(include_str!("../assets/queries/backup/detach_backup.sql"), [])?;
    Ok(())
}
