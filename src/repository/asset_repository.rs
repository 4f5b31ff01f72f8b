use std::rc::Rc;

use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};

use crate::model::repository::Asset;

/// saves the asset and returns its new id. The folder must already exist,
/// and no other asset in the folder may have the same file name
pub fn create_asset(asset: &Asset, con: &Connection) -> Result<u32, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/asset/create_asset.sql"))?;
    let id = pst.insert(params![
        asset.folder_id,
        asset.file_name,
        asset.hash,
        asset.phash,
        asset.dhash,
        asset.ahash,
        asset.pixel_width,
        asset.pixel_height,
        asset.thumbnail_pixel_width,
        asset.thumbnail_pixel_height,
        asset.rotation,
        asset.file_size as i64,
        asset.file_creation_date_time,
        asset.file_modification_date_time,
        asset.thumbnail_creation_date_time,
        asset.is_corrupted,
        asset.corrupted_message,
        asset.is_rotated,
        asset.rotated_message,
    ])?;
    Ok(id as u32)
}

/// overwrites everything but the id of the asset with the same folder and file name.
/// Returns the number of rows changed, which will be 0 if no such asset exists
pub fn update_asset(asset: &Asset, con: &Connection) -> Result<usize, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/asset/update_asset.sql"))?;
    pst.execute(params![
        asset.folder_id,
        asset.file_name,
        asset.hash,
        asset.phash,
        asset.dhash,
        asset.ahash,
        asset.pixel_width,
        asset.pixel_height,
        asset.thumbnail_pixel_width,
        asset.thumbnail_pixel_height,
        asset.rotation,
        asset.file_size as i64,
        asset.file_creation_date_time,
        asset.file_modification_date_time,
        asset.thumbnail_creation_date_time,
        asset.is_corrupted,
        asset.corrupted_message,
        asset.is_rotated,
        asset.rotated_message,
    ])
}

pub fn get_by_name(
    folder_id: u32,
    file_name: &str,
    con: &Connection,
) -> Result<Option<Asset>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/asset/get_asset_by_name.sql"
    ))?;
    pst.query_row(params![folder_id, file_name], map_asset)
        .optional()
}

/// returns every asset in the folder, ordered by file name
pub fn get_assets_in_folder(
    folder_id: u32,
    con: &Connection,
) -> Result<Vec<Asset>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/asset/get_assets_in_folder.sql"
    ))?;
    let rows = pst.query_map(params![folder_id], map_asset)?;
    rows.collect::<Result<Vec<Asset>, rusqlite::Error>>()
}

pub fn get_all_assets(con: &Connection) -> Result<Vec<Asset>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!("../assets/queries/asset/get_all_assets.sql"))?;
    let rows = pst.query_map([], map_asset)?;
    rows.collect::<Result<Vec<Asset>, rusqlite::Error>>()
}

/// removes the assets with the passed names from the folder. Names that don't exist are ignored.
/// Returns how many assets were removed
pub fn delete_by_names(
    folder_id: u32,
    file_names: &[String],
    con: &Connection,
) -> Result<usize, rusqlite::Error> {
    let names: Rc<Vec<Value>> = Rc::new(
        file_names
            .iter()
            .map(|name| Value::from(name.clone()))
            .collect(),
    );
    let mut pst = con.prepare(include_str!(
        "../assets/queries/asset/delete_assets_by_name.sql"
    ))?;
    pst.execute(params![folder_id, names])
}

pub fn count_assets(con: &Connection) -> Result<u64, rusqlite::Error> {
    let count: i64 = con.query_row(
        include_str!("../assets/queries/asset/count_assets.sql"),
        [],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

pub(crate) fn map_asset(row: &rusqlite::Row) -> Result<Asset, rusqlite::Error> {
    let file_size: i64 = row.get(12)?;
    Ok(Asset {
        id: Some(row.get(0)?),
        folder_id: row.get(1)?,
        file_name: row.get(2)?,
        hash: row.get(3)?,
        phash: row.get(4)?,
        dhash: row.get(5)?,
        ahash: row.get(6)?,
        pixel_width: row.get(7)?,
        pixel_height: row.get(8)?,
        thumbnail_pixel_width: row.get(9)?,
        thumbnail_pixel_height: row.get(10)?,
        rotation: row.get(11)?,
        file_size: file_size as u64,
        file_creation_date_time: row.get(13)?,
        file_modification_date_time: row.get(14)?,
        thumbnail_creation_date_time: row.get(15)?,
        is_corrupted: row.get(16)?,
        corrupted_message: row.get(17)?,
        is_rotated: row.get(18)?,
        rotated_message: row.get(19)?,
        image_data: None,
    })
}
