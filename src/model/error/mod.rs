pub mod backup_errors;
pub mod catalog_errors;
pub mod store_errors;
pub mod sync_errors;
