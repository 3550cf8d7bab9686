//! Item HTTP Routes
//!
//! CRUD endpoints for the `item` resource:
//!
//! - `GET    /items?limit=&skip=`   list in insertion order
//! - `POST   /items?return_item=`   create
//! - `GET    /items/{id}`           fetch one
//! - `PUT    /items/{id}`           partial update
//! - `DELETE /items/{id}`           delete
//!
//! Each handler issues exactly one storage call, except an update with
//! nothing to set, which only checks that the item exists.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use tracing::{debug, info};

use crate::item::{CreateItem, CreatedItem, ItemResponse, UpdateItem};
use crate::object_id::ObjectId;
use crate::store::{Document, DocumentCollection};

use super::errors::{ApiError, ApiResult};
use super::extract::ValidatedJson;
use super::response::MessageResponse;

/// Default page size for `GET /items`
pub const DEFAULT_LIMIT: usize = 5;

// ==================
// Shared State
// ==================

/// Item route state: the collection handle plus paging limits
pub struct ItemState {
    pub collection: Arc<dyn DocumentCollection>,
    pub max_page_size: usize,
}

impl ItemState {
    pub fn new(collection: Arc<dyn DocumentCollection>, max_page_size: usize) -> Self {
        Self {
            collection,
            max_page_size,
        }
    }
}

// ==================
// Query Types
// ==================

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub skip: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateParams {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub return_item: bool,
}

/// Accepts `true`/`false` in any case, plus `1`/`0`, `yes`/`no`, `on`/`off`
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(de::Error::custom(format!("`{}` is not a boolean", raw))),
    }
}

// ==================
// Item Routes
// ==================

/// Create item routes
pub fn item_routes(state: Arc<ItemState>) -> Router {
    Router::new()
        .route("/items", get(list_items_handler).post(create_item_handler))
        .route("/items/", get(list_items_handler).post(create_item_handler))
        .route(
            "/items/:item_id",
            get(get_item_handler)
                .put(update_item_handler)
                .delete(delete_item_handler),
        )
        .with_state(state)
}

// ==================
// Helper Functions
// ==================

fn to_response(doc: &Document) -> ApiResult<ItemResponse> {
    ItemResponse::from_document(doc).map_err(|e| ApiError::DataError(format!("{}: {}", doc.id, e)))
}

fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    params
        .map(|Query(p)| p)
        .map_err(|rejection| ApiError::InvalidQuery(rejection.body_text()))
}

// ==================
// Handlers
// ==================

async fn get_item_handler(
    State(state): State<Arc<ItemState>>,
    Path(item_id): Path<String>,
) -> ApiResult<Json<ItemResponse>> {
    let id = ObjectId::parse(&item_id)?;

    let doc = state
        .collection
        .find_one(&id)
        .await?
        .ok_or(ApiError::NotFound(id))?;

    Ok(Json(to_response(&doc)?))
}

async fn list_items_handler(
    State(state): State<Arc<ItemState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<ItemResponse>>> {
    let ListParams { limit, skip } = query_params(params)?;
    if limit > state.max_page_size {
        return Err(ApiError::LimitExceeded(limit, state.max_page_size));
    }

    let docs = state.collection.find(skip, limit).await?;
    debug!(skip, limit, returned = docs.len(), "items listed");

    let items = docs.iter().map(to_response).collect::<ApiResult<Vec<_>>>()?;
    Ok(Json(items))
}

async fn create_item_handler(
    State(state): State<Arc<ItemState>>,
    params: Result<Query<CreateParams>, QueryRejection>,
    ValidatedJson(item): ValidatedJson<CreateItem>,
) -> ApiResult<Response> {
    let CreateParams { return_item } = query_params(params)?;

    let id = state.collection.insert_one(item.to_fields()).await?;
    info!(item_id = %id, "item created");

    let response = if return_item {
        (StatusCode::CREATED, Json(ItemResponse::from_created(id, item))).into_response()
    } else {
        (StatusCode::CREATED, Json(CreatedItem { id })).into_response()
    };
    Ok(response)
}

async fn update_item_handler(
    State(state): State<Arc<ItemState>>,
    Path(item_id): Path<String>,
    ValidatedJson(update): ValidatedJson<UpdateItem>,
) -> ApiResult<Json<MessageResponse>> {
    let id = ObjectId::parse(&item_id)?;
    let set = update.merge_set();

    if set.is_empty() {
        // Nothing to write; report existence without mutating
        return match state.collection.find_one(&id).await? {
            Some(_) => Ok(Json(MessageResponse::new(format!(
                "Item with id: {} unchanged",
                id
            )))),
            None => Err(ApiError::NotFound(id)),
        };
    }

    let fields = set.field_names().join(",");
    let outcome = state.collection.update_one(&id, set.into_fields()).await?;
    if !outcome.matched {
        return Err(ApiError::NotFound(id));
    }

    info!(item_id = %id, %fields, modified = outcome.modified, "item updated");
    Ok(Json(MessageResponse::new(format!(
        "Item with id: {} updated",
        id
    ))))
}

async fn delete_item_handler(
    State(state): State<Arc<ItemState>>,
    Path(item_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = ObjectId::parse(&item_id)?;

    if !state.collection.delete_one(&id).await?.deleted {
        return Err(ApiError::NotFound(id));
    }

    info!(item_id = %id, "item deleted");
    Ok(Json(MessageResponse::new(format!(
        "Item with id: {} deleted",
        id
    ))))
}
