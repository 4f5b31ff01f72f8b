pub mod backup;
pub mod catalog;
pub mod config;
pub mod db_migrations;
pub mod diff;
pub mod logging;
pub mod model;
pub mod notification;
pub mod ordering;
pub mod providers;
pub mod repository;
pub mod store;
pub mod sync;
#[cfg(test)]
mod test;
