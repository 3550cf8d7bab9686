//! items-api - CRUD HTTP service over a document-oriented item store
//!
//! Layers, leaves first:
//! - `object_id`: store identifiers and their external hex form
//! - `item`: payload shapes, validation, partial-update merge
//! - `store`: the document collection the handlers call
//! - `http_server`: axum routes and server
//! - `config`, `cli`: configuration file and command line

pub mod cli;
pub mod config;
pub mod http_server;
pub mod item;
pub mod object_id;
pub mod store;
