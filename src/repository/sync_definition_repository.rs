use rusqlite::{params, Connection};

use crate::sync::SyncDirectoriesDefinition;

/// replaces every stored definition with the passed ones. Definitions missing a directory are skipped
pub fn replace_all(
    definitions: &[SyncDirectoriesDefinition],
    con: &Connection,
) -> Result<usize, rusqlite::Error> {
    con.execute(
        include_str!("../assets/queries/sync_definition/delete_all_sync_definitions.sql"),
        [],
    )?;
    let mut pst = con.prepare(include_str!(
        "../assets/queries/sync_definition/create_sync_definition.sql"
    ))?;
    let mut saved = 0;
    for definition in definitions {
        if let (Some(source), Some(destination)) = (
            &definition.source_directory,
            &definition.destination_directory,
        ) {
            pst.execute(params![
                source,
                destination,
                definition.include_sub_folders,
                definition.delete_assets_not_in_source
            ])?;
            saved += 1;
        }
    }
    Ok(saved)
}

pub fn get_all(con: &Connection) -> Result<Vec<SyncDirectoriesDefinition>, rusqlite::Error> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/sync_definition/get_all_sync_definitions.sql"
    ))?;
    let rows = pst.query_map([], |row| {
        Ok(SyncDirectoriesDefinition {
            source_directory: Some(row.get(0)?),
            destination_directory: Some(row.get(1)?),
            include_sub_folders: row.get(2)?,
            delete_assets_not_in_source: row.get(3)?,
        })
    })?;
    rows.collect::<Result<Vec<SyncDirectoriesDefinition>, rusqlite::Error>>()
}
