use rusqlite::{params, Connection, OptionalExtension};

use crate::model::repository;

/// creates a folder record in the database.
/// This does not check if a folder with the same path exists, and that must be done before this function is called
pub fn create_folder(path: &str, con: &Connection) -> Result<repository::Folder, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/folder/create_folder.sql"))?;
    let id = pst.insert(params![path])? as u32;
    Ok(repository::Folder {
        id: Some(id),
        path: path.to_string(),
    })
}

/// returns `None` if no folder has the exact passed path
pub fn get_by_path(
    path: &str,
    con: &Connection,
) -> Result<Option<repository::Folder>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/folder/get_folder_by_path.sql"
    ))?;
    pst.query_row(params![path], map_folder).optional()
}

pub fn get_by_id(id: u32, con: &Connection) -> Result<repository::Folder, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/folder/get_folder_by_id.sql"))?;
    pst.query_row(params![id], map_folder)
}

/// returns every folder in the catalog, ordered by path
pub fn get_all_folders(con: &Connection) -> Result<Vec<repository::Folder>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/folder/get_all_folders.sql"))?;
    let rows = pst.query_map([], map_folder)?;
    rows.collect::<Result<Vec<repository::Folder>, rusqlite::Error>>()
}

/// deletes a folder. Every asset in the folder and its thumbnails go with it.
/// This _does not_ check if the folder exists first.
pub fn delete_folder(id: u32, con: &Connection) -> Result<(), rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/folder/delete_folder_by_id.sql"
    ))?;
    pst.execute(params![id])?;
    Ok(())
}

fn map_folder(row: &rusqlite::Row) -> Result<repository::Folder, rusqlite::Error> {
    let id: u32 = row.get(0)?;
    let path: String = row.get(1)?;
    Ok(repository::Folder { id: Some(id), path })
}
