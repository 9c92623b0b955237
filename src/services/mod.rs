//! Parsing, storage access and reconciliation.

pub mod redirect_parser;
pub mod s3_store;
pub mod store;
pub mod sync_service;

#[cfg(test)]
pub mod memory_store;
