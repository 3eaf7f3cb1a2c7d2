use crate::utils::error::{Result, TableError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// 物件轉字串時依序嘗試的欄位
const DISPLAY_KEYS: [&str; 8] = ["display", "name", "model", "prefix", "address", "slug", "pk", "id"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 物件建立記錄，其他型別視為錯誤
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(obj) => Ok(Self {
                data: obj.into_iter().collect(),
            }),
            other => Err(TableError::SourceError {
                message: format!("Expected a JSON object record, got: {}", other),
            }),
        }
    }

    /// 序列化任何 domain entity 成記錄
    pub fn from_entity<T: Serialize>(entity: &T) -> Result<Self> {
        Self::from_value(serde_json::to_value(entity)?)
    }

    pub fn with(mut self, field: &str, value: Value) -> Self {
        self.data.insert(field.to_string(), value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.data.insert(field.into(), value);
    }

    /// Primary key: `pk`, falling back to `id`.
    pub fn pk(&self) -> Option<&Value> {
        self.data
            .get("pk")
            .filter(|v| !v.is_null())
            .or_else(|| self.data.get("id").filter(|v| !v.is_null()))
    }
}

/// Text form of a value, or `None` when there is nothing to show.
pub fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(obj) => DISPLAY_KEYS
            .iter()
            .filter_map(|key| obj.get(*key))
            .find_map(display_value),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(display_value).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
    }
}
