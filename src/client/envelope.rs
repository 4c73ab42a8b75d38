use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;

/// A list endpoint's result, whether the backend sent a bare array or an
/// envelope such as `{ "admins": [...], "count": 12, "page": 1 }`
#[derive(Debug, Clone, PartialEq)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub count: Option<u64>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub total: Option<u64>,
    pub total_pages: Option<u64>,
}

impl<T> ListResponse<T> {
    pub fn from_items(items: Vec<T>) -> Self {
        Self { items, count: None, page: None, per_page: None, total: None, total_pages: None }
    }

    /// Server-reported total, falling back to the number of items received
    pub fn total_count(&self) -> u64 {
        self.count.or(self.total).unwrap_or(self.items.len() as u64)
    }
}

impl<T: DeserializeOwned> ListResponse<T> {
    pub fn from_value(value: Value, key: &str) -> Result<Self, ClientError> {
        match value {
            Value::Null => Ok(Self::from_items(Vec::new())),
            Value::Array(_) => Ok(Self::from_items(serde_json::from_value(value)?)),
            Value::Object(mut obj) => {
                let items = match obj.remove(key) {
                    Some(Value::Array(arr)) => serde_json::from_value(Value::Array(arr))?,
                    Some(Value::Null) | None => {
                        tracing::warn!("list response has no '{}' array, treating as empty", key);
                        Vec::new()
                    }
                    Some(other) => {
                        return Err(ClientError::decode(format!("'{}' is not an array: {}", key, other)))
                    }
                };
                let meta = |name: &str| obj.get(name).and_then(as_count);
                Ok(Self {
                    items,
                    count: meta("count"),
                    page: meta("page"),
                    per_page: meta("perPage"),
                    total: meta("total"),
                    total_pages: meta("totalPages"),
                })
            }
            other => Err(ClientError::decode(format!("expected list, got {}", other))),
        }
    }
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
