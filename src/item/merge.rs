//! Partial-update merge
//!
//! An update is a blind overwrite of the fields the client supplied. The
//! merge set never contains nulls and never looks at the stored document.

use serde_json::{Map, Value};

use super::model::{UpdateItem, FIELD_DESCRIPTION, FIELD_NAME, FIELD_PRICE, FIELD_TAX};

/// Fields to set on the stored document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeSet(Map<String, Value>);

impl MergeSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Field names in the set
    pub fn field_names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    fn set(&mut self, field: &str, value: Option<Value>) {
        if let Some(value) = value.filter(|v| !v.is_null()) {
            self.0.insert(field.to_string(), value);
        }
    }
}

impl UpdateItem {
    /// Fields present and non-null in this payload
    pub fn merge_set(&self) -> MergeSet {
        let mut set = MergeSet::default();
        set.set(FIELD_NAME, self.name.clone().map(Value::from));
        set.set(FIELD_DESCRIPTION, self.description.clone().map(Value::from));
        set.set(FIELD_PRICE, self.price.map(Value::from));
        set.set(FIELD_TAX, self.tax.map(Value::from));
        set
    }
}
