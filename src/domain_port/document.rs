use crate::domain_port::GatewayError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| GatewayError::Codec(format!("decode {}: {e}", self.id)))
    }
}

/// A write to one field. Everything except `Value` is resolved by the store
/// at commit time, against the document state it holds then.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Value(Value),
    ServerTimestamp,
    Increment(i64),
    ArrayUnion(Vec<Value>),
    ArrayRemove(Vec<Value>),
    /// Drop every object element whose `key` equals `value`.
    ArrayRemoveWhere { key: String, value: Value },
    /// Merge `patch` into every object element whose `key` equals `value`.
    ArrayPatchWhere {
        key: String,
        value: Value,
        patch: Fields,
    },
}

/// Field writes keyed by path. A dotted path (`lastMessage.text`) addresses
/// a nested object field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch(BTreeMap<String, FieldValue>);

impl FieldPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, GatewayError> {
        match serde_json::to_value(value) {
            Ok(Value::Object(map)) => Ok(Self(
                map.into_iter()
                    .map(|(k, v)| (k, FieldValue::Value(v)))
                    .collect(),
            )),
            Ok(other) => Err(GatewayError::Codec(format!(
                "expected an object, got {other}"
            ))),
            Err(e) => Err(GatewayError::Codec(e.to_string())),
        }
    }

    pub fn set(self, path: impl Into<String>, value: Value) -> Self {
        self.transform(path, FieldValue::Value(value))
    }

    pub fn transform(mut self, path: impl Into<String>, value: FieldValue) -> Self {
        self.0.insert(path.into(), value);
        self
    }

    pub fn server_timestamp(self, path: impl Into<String>) -> Self {
        self.transform(path, FieldValue::ServerTimestamp)
    }

    pub fn increment(self, path: impl Into<String>, delta: i64) -> Self {
        self.transform(path, FieldValue::Increment(delta))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { field: String, value: Value },
    ArrayContains { field: String, value: Value },
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Filter::Eq {
            field: field.into(),
            value,
        }
    }

    pub fn array_contains(field: impl Into<String>, value: Value) -> Self {
        Filter::ArrayContains {
            field: field.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Checked against the document as it stands when the op runs, including
/// the effect of earlier ops in the same batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Precondition {
    None,
    Exists,
    Missing,
    ArrayContains { field: String, value: Value },
    ArrayLacks { field: String, value: Value },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AtomicOp {
    Set {
        collection: String,
        id: String,
        patch: FieldPatch,
        merge: bool,
        precondition: Precondition,
    },
    /// Fails with `NotFound` if the document does not exist.
    Update {
        collection: String,
        id: String,
        patch: FieldPatch,
        precondition: Precondition,
    },
    /// Removes the document and every sub-collection under it.
    Delete {
        collection: String,
        id: String,
        precondition: Precondition,
    },
}

impl AtomicOp {
    pub fn create(collection: impl Into<String>, id: impl Into<String>, patch: FieldPatch) -> Self {
        AtomicOp::Set {
            collection: collection.into(),
            id: id.into(),
            patch,
            merge: false,
            precondition: Precondition::Missing,
        }
    }

    pub fn set(
        collection: impl Into<String>,
        id: impl Into<String>,
        patch: FieldPatch,
        merge: bool,
    ) -> Self {
        AtomicOp::Set {
            collection: collection.into(),
            id: id.into(),
            patch,
            merge,
            precondition: Precondition::None,
        }
    }

    pub fn update(collection: impl Into<String>, id: impl Into<String>, patch: FieldPatch) -> Self {
        AtomicOp::Update {
            collection: collection.into(),
            id: id.into(),
            patch,
            precondition: Precondition::None,
        }
    }

    pub fn delete(collection: impl Into<String>, id: impl Into<String>) -> Self {
        AtomicOp::Delete {
            collection: collection.into(),
            id: id.into(),
            precondition: Precondition::None,
        }
    }

    pub fn when(mut self, condition: Precondition) -> Self {
        match &mut self {
            AtomicOp::Set { precondition, .. }
            | AtomicOp::Update { precondition, .. }
            | AtomicOp::Delete { precondition, .. } => *precondition = condition,
        }
        self
    }

    pub fn target(&self) -> (&str, &str) {
        match self {
            AtomicOp::Set { collection, id, .. }
            | AtomicOp::Update { collection, id, .. }
            | AtomicOp::Delete { collection, id, .. } => (collection, id),
        }
    }
}
