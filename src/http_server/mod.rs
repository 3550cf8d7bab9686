//! # Items HTTP Server Module
//!
//! Axum server exposing the item resource.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/test` - Hello-world example route
//! - `/items` - Item CRUD

pub mod config;
pub mod errors;
pub mod extract;
pub mod health_routes;
pub mod item_routes;
pub mod response;
pub mod server;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use extract::ValidatedJson;
pub use item_routes::{item_routes, ItemState, DEFAULT_LIMIT};
pub use response::MessageResponse;
pub use server::HttpServer;
