//! Infrastructure layer: batch runner, storage and collaborator boundaries, config.

pub mod batch;
pub mod cache;
pub mod catalog_store;
pub mod config;
pub mod sources;
pub mod tagging;
pub mod translation;
