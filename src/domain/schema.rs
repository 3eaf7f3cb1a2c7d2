use crate::utils::error::{Result, TableError};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain column value.
    Value,
    /// To-one relation to another model.
    Relation(String),
    /// To-many relation, delivered as a JSON array.
    Many(String),
    /// Per-row annotation computed by the query layer; never sortable.
    Computed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    pub name: String,
    pub fields: BTreeMap<String, FieldKind>,
}

impl ModelSchema {
    pub fn new(name: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("pk".to_string(), FieldKind::Value);
        Self {
            name: name.to_string(),
            fields,
        }
    }

    pub fn value(mut self, field: &str) -> Self {
        self.fields.insert(field.to_string(), FieldKind::Value);
        self
    }

    pub fn values(mut self, fields: &[&str]) -> Self {
        for field in fields {
            self.fields.insert(field.to_string(), FieldKind::Value);
        }
        self
    }

    pub fn relation(mut self, field: &str, model: &str) -> Self {
        self.fields
            .insert(field.to_string(), FieldKind::Relation(model.to_string()));
        self
    }

    pub fn many(mut self, field: &str, model: &str) -> Self {
        self.fields
            .insert(field.to_string(), FieldKind::Many(model.to_string()));
        self
    }

    pub fn computed(mut self, field: &str) -> Self {
        self.fields.insert(field.to_string(), FieldKind::Computed);
        self
    }

    pub fn field(&self, name: &str) -> Result<&FieldKind> {
        self.fields.get(name).ok_or_else(|| TableError::UnknownField {
            model: self.name.clone(),
            field: name.to_string(),
        })
    }
}

/// What an accessor ends on after walking the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Model owning the last segment.
    pub model: String,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    models: HashMap<String, ModelSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, model: ModelSchema) {
        self.models.insert(model.name.clone(), model);
    }

    pub fn with(mut self, model: ModelSchema) -> Self {
        self.register(model);
        self
    }

    pub fn model(&self, name: &str) -> Result<&ModelSchema> {
        self.models.get(name).ok_or_else(|| TableError::UnknownModel {
            model: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// 沿著關聯走完整條路徑，任何未知欄位或穿過純值欄位都會報錯
    pub fn resolve(&self, model: &str, segments: &[String]) -> Result<ResolvedField> {
        let mut current = self.model(model)?;
        let mut resolved = None;

        for (index, segment) in segments.iter().enumerate() {
            let kind = current.field(segment)?;
            let is_last = index + 1 == segments.len();

            if !is_last {
                match kind {
                    FieldKind::Relation(target) | FieldKind::Many(target) => {
                        current = self.model(target)?;
                    }
                    FieldKind::Value | FieldKind::Computed => {
                        return Err(TableError::InvalidAccessor {
                            path: segments.join("."),
                            reason: format!(
                                "'{}.{}' is not a relation and cannot be traversed",
                                current.name, segment
                            ),
                        });
                    }
                }
            } else {
                resolved = Some(ResolvedField {
                    model: current.name.clone(),
                    kind: kind.clone(),
                });
            }
        }

        resolved.ok_or_else(|| TableError::InvalidAccessor {
            path: String::new(),
            reason: "accessor has no segments".to_string(),
        })
    }
}
