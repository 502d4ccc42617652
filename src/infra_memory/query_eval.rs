use crate::domain_port::*;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub fn lookup_path<'a>(fields: &'a Fields, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = fields.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn slot_mut<'a>(fields: &'a mut Fields, path: &str) -> Result<&'a mut Value, GatewayError> {
    let mut segments = path.split('.');
    let head = segments.next().unwrap_or(path);
    let mut slot = fields.entry(head.to_owned()).or_insert(Value::Null);
    for segment in segments {
        if slot.is_null() {
            *slot = Value::Object(Fields::new());
        }
        let object = slot
            .as_object_mut()
            .ok_or_else(|| GatewayError::Codec(format!("{path}: parent is not an object")))?;
        slot = object.entry(segment.to_owned()).or_insert(Value::Null);
    }
    Ok(slot)
}

fn array_mut<'a>(slot: &'a mut Value, path: &str) -> Result<&'a mut Vec<Value>, GatewayError> {
    if slot.is_null() {
        *slot = Value::Array(Vec::new());
    }
    slot.as_array_mut()
        .ok_or_else(|| GatewayError::Codec(format!("{path}: not an array")))
}

/// RFC 3339 with fixed nanosecond precision, so string order is time order.
pub fn timestamp_value(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Nanos, true))
}

pub fn apply_patch(
    mut fields: Fields,
    patch: &FieldPatch,
    now: DateTime<Utc>,
) -> Result<Fields, GatewayError> {
    for (path, write) in patch.iter() {
        let slot = slot_mut(&mut fields, path)?;
        match write {
            FieldValue::Value(value) => *slot = value.clone(),
            FieldValue::ServerTimestamp => *slot = timestamp_value(now),
            FieldValue::Increment(delta) => {
                let current = match &*slot {
                    Value::Null => 0,
                    other => other
                        .as_i64()
                        .ok_or_else(|| GatewayError::Codec(format!("{path}: not an integer")))?,
                };
                *slot = json!(current + delta);
            }
            FieldValue::ArrayUnion(values) => {
                let array = array_mut(slot, path)?;
                for value in values {
                    if !array.contains(value) {
                        array.push(value.clone());
                    }
                }
            }
            FieldValue::ArrayRemove(values) => {
                array_mut(slot, path)?.retain(|e| !values.contains(e));
            }
            FieldValue::ArrayRemoveWhere { key, value } => {
                array_mut(slot, path)?.retain(|e| e.get(key) != Some(value));
            }
            FieldValue::ArrayPatchWhere { key, value, patch } => {
                for element in array_mut(slot, path)?.iter_mut() {
                    if element.get(key) != Some(value) {
                        continue;
                    }
                    if let Some(object) = element.as_object_mut() {
                        for (k, v) in patch {
                            object.insert(k.clone(), v.clone());
                        }
                    }
                }
            }
        }
    }
    Ok(fields)
}

pub fn check_precondition(
    precondition: &Precondition,
    current: Option<&Fields>,
    collection: &str,
    id: &str,
) -> Result<(), GatewayError> {
    let array_has = |field: &str, value: &Value| {
        current
            .and_then(|f| lookup_path(f, field))
            .and_then(Value::as_array)
            .is_some_and(|a| a.contains(value))
    };
    let holds = match precondition {
        Precondition::None => true,
        Precondition::Exists => current.is_some(),
        Precondition::Missing => current.is_none(),
        Precondition::ArrayContains { field, value } => array_has(field, value),
        Precondition::ArrayLacks { field, value } => !array_has(field, value),
    };
    if holds {
        Ok(())
    } else {
        Err(GatewayError::PreconditionFailed {
            collection: collection.to_owned(),
            id: id.to_owned(),
        })
    }
}

fn matches(fields: &Fields, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { field, value } => lookup_path(fields, field) == Some(value),
        Filter::ArrayContains { field, value } => lookup_path(fields, field)
            .and_then(Value::as_array)
            .is_some_and(|a| a.contains(value)),
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None => 0,
        Some(Value::Null) => 1,
        Some(Value::Bool(_)) => 2,
        Some(Value::Number(_)) => 3,
        Some(Value::String(_)) => 4,
        Some(Value::Array(_)) => 5,
        Some(Value::Object(_)) => 6,
    }
}

pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Runs `query` over one collection. Documents come in id order before
/// sorting, and the sort is stable.
pub fn evaluate(collection: Option<&BTreeMap<String, Fields>>, query: &Query) -> Vec<Document> {
    let Some(collection) = collection else {
        return Vec::new();
    };
    let mut documents: Vec<Document> = collection
        .iter()
        .filter(|(_, fields)| query.filters.iter().all(|f| matches(fields, f)))
        .map(|(id, fields)| Document {
            id: id.clone(),
            fields: fields.clone(),
        })
        .collect();

    if let Some(order) = &query.order_by {
        documents.sort_by(|a, b| {
            let ordering = compare_values(
                lookup_path(&a.fields, &order.field),
                lookup_path(&b.fields, &order.field),
            );
            match order.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });
    }
    if let Some(limit) = query.limit {
        documents.truncate(limit);
    }
    documents
}
