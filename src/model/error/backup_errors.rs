#[derive(PartialEq, Debug, Clone)]
pub enum BackupError {
    /// the backup directory could not be read or written
    FileSystemFailure(String),
    /// the snapshot could not be written to or read from the backup database
    DbFailure(String),
    /// the requested backup does not exist
    NotFound,
}
