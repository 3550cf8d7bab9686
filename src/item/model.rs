//! Item payload shapes
//!
//! Create, update and response payloads are distinct types over the same
//! field superset. Only the response carries an id.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::object_id::ObjectId;
use crate::store::{Document, ID_FIELD};

use super::validation::{
    check_name, check_price, decode_price, optional, optional_with, required, required_with,
    FromPayload, ValidationErrors,
};

pub const FIELD_ID: &str = ID_FIELD;
pub const FIELD_NAME: &str = "name";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_PRICE: &str = "price";
pub const FIELD_TAX: &str = "tax";

/// Body of `POST /items`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateItem {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,
}

impl CreateItem {
    /// Stored document fields. `description` is always written (possibly
    /// null); `tax` only when supplied.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert(FIELD_NAME.to_string(), Value::from(self.name.clone()));
        fields.insert(
            FIELD_DESCRIPTION.to_string(),
            self.description.clone().map(Value::from).unwrap_or(Value::Null),
        );
        fields.insert(FIELD_PRICE.to_string(), Value::from(self.price));
        if let Some(tax) = self.tax {
            fields.insert(FIELD_TAX.to_string(), Value::from(tax));
        }
        fields
    }
}

impl FromPayload for CreateItem {
    fn from_payload(body: Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name: Option<String> = required(&body, FIELD_NAME, &mut errors);
        let description = optional(&body, FIELD_DESCRIPTION, &mut errors);
        let price = required_with(&body, FIELD_PRICE, &mut errors, decode_price);
        let tax = optional(&body, FIELD_TAX, &mut errors);

        if let Some(name) = &name {
            check_name(name, &mut errors);
        }
        if let Some(price) = price {
            check_price(price, &mut errors);
        }

        match (name, price) {
            (Some(name), Some(price)) if errors.is_empty() => Ok(Self {
                name,
                description,
                price,
                tax,
            }),
            _ => Err(errors),
        }
    }
}

/// Body of `PUT /items/{id}`. Every field is optional; absent and null are
/// treated the same.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub tax: Option<f64>,
}

impl FromPayload for UpdateItem {
    fn from_payload(body: Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let item = Self {
            name: optional(&body, FIELD_NAME, &mut errors),
            description: optional(&body, FIELD_DESCRIPTION, &mut errors),
            price: optional_with(&body, FIELD_PRICE, &mut errors, decode_price),
            tax: optional(&body, FIELD_TAX, &mut errors),
        };

        if let Some(name) = &item.name {
            check_name(name, &mut errors);
        }
        if let Some(price) = item.price {
            check_price(price, &mut errors);
        }

        errors.into_result(item)
    }
}

/// An item as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResponse {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,
}

impl ItemResponse {
    /// Map a stored document onto the response shape. Fails only when the
    /// document is structurally incompatible.
    pub fn from_document(doc: &Document) -> Result<Self, serde_json::Error> {
        let mut fields = doc.fields.clone();
        fields.insert(FIELD_ID.to_string(), Value::from(doc.id.to_string()));
        serde_json::from_value(Value::Object(fields))
    }

    /// Response for a freshly inserted payload
    pub fn from_created(id: ObjectId, item: CreateItem) -> Self {
        Self {
            id,
            name: item.name,
            description: item.description,
            price: item.price,
            tax: item.tax,
        }
    }
}

/// Create acknowledgement when the full item was not requested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedItem {
    #[serde(rename = "_id")]
    pub id: ObjectId,
}
