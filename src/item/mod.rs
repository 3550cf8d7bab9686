//! # Item Resource
//!
//! Payload shapes, validation and the partial-update merge for the single
//! `item` resource.

pub mod merge;
pub mod model;
pub mod validation;

pub use merge::MergeSet;
pub use model::{CreateItem, CreatedItem, ItemResponse, UpdateItem};
pub use validation::{FieldError, FromPayload, ValidationErrors, PRICE_MAX, PRICE_MIN};
