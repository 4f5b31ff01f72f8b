use rusqlite::{params, Connection};

/// saves the thumbnail contents for the asset, replacing any thumbnail it already had
pub fn save_thumbnail(
    asset_id: u32,
    contents: &[u8],
    con: &Connection,
) -> Result<(), rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/thumbnail/upsert_thumbnail.sql"
    ))?;
    pst.execute(params![asset_id, contents])?;
    Ok(())
}

pub fn get_thumbnail(asset_id: u32, con: &Connection) -> Result<Vec<u8>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/thumbnail/get_thumbnail.sql"
    ))?;
    pst.query_row(params![asset_id], |row| row.get(0))
}
