use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::model::repository::RecentTargetPath;

/// marks the path as used at `last_used`, then drops the oldest paths so at most `paths_to_keep` remain
pub fn add_recent_path(
    path: &str,
    last_used: NaiveDateTime,
    paths_to_keep: usize,
    con: &Connection,
) -> Result<(), rusqlite::Error> {
    let mut upsert = con.prepare(include_str!(
        "../assets/queries/recent_path/upsert_recent_path.sql"
    ))?;
    upsert.execute(params![path, last_used])?;
    let mut trim = con.prepare(include_str!(
        "../assets/queries/recent_path/trim_recent_paths.sql"
    ))?;
    trim.execute(params![paths_to_keep as i64])?;
    Ok(())
}

/// most recently used first
pub fn get_recent_paths(con: &Connection) -> Result<Vec<RecentTargetPath>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/recent_path/get_recent_paths.sql"
    ))?;
    let rows = pst.query_map([], |row| {
        Ok(RecentTargetPath {
            path: row.get(0)?,
            last_used: row.get(1)?,
        })
    })?;
    rows.collect::<Result<Vec<RecentTargetPath>, rusqlite::Error>>()
}
