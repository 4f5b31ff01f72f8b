//! One way syncing of directory pairs: definitions are normalized and validated, then the files missing from
//! each destination are copied over from its source.

pub mod models;
pub mod service;

pub use models::*;

#[cfg(test)]
mod tests;
