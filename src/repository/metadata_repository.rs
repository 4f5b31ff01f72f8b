use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

/// returns the current version of the database as a String
pub fn get_version(con: &Connection) -> Result<String, rusqlite::Error> {
    con.query_row(
        include_str!("../assets/queries/metadata/get_database_version.sql"),
        [],
        |row| row.get(0),
    )
}

/// when the last cataloging pass finished, or `None` if one never has
pub fn get_last_catalog_time(con: &Connection) -> Result<Option<NaiveDateTime>, rusqlite::Error> {
    let value: Option<String> = con
        .query_row(
            include_str!("../assets/queries/metadata/get_last_catalog_time.sql"),
            [],
            |row| row.get(0),
        )
        .optional()?;
    match value {
        Some(v) => match NaiveDateTime::parse_from_str(&v, "%Y-%m-%d %H:%M:%S%.f") {
            Ok(time) => Ok(Some(time)),
            Err(e) => {
                log::warn!("Stored last catalog time {v} could not be parsed, ignoring it: {e:?}");
                Ok(None)
            }
        },
        None => Ok(None),
    }
}

pub fn set_last_catalog_time(time: NaiveDateTime, con: &Connection) -> Result<(), rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/metadata/set_last_catalog_time.sql"
    ))?;
    pst.execute(params![time.format("%Y-%m-%d %H:%M:%S%.f").to_string()])?;
    Ok(())
}
