use crate::domain::model::Record;
use crate::domain::schema::{ResolvedField, SchemaRegistry};
use crate::utils::error::{Result, TableError};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Dotted path from a record to a value, e.g. `rack.site.slug`.
///
/// Parsing checks the shape of the path only; [`Accessor::validate`] checks it
/// against a model schema. Both happen when a table is defined so that a bad
/// path never reaches rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Accessor {
    path: String,
    segments: Vec<String>,
}

impl Accessor {
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.trim();
        let trimmed = trimmed.strip_prefix("record.").unwrap_or(trimmed);

        if trimmed.is_empty() {
            return Err(TableError::InvalidAccessor {
                path: path.to_string(),
                reason: "path cannot be empty".to_string(),
            });
        }

        let mut segments = Vec::new();
        for segment in trimmed.split('.') {
            if segment.is_empty() {
                return Err(TableError::InvalidAccessor {
                    path: path.to_string(),
                    reason: "empty segment".to_string(),
                });
            }
            if !segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(TableError::InvalidAccessor {
                    path: path.to_string(),
                    reason: format!("segment '{}' contains invalid characters", segment),
                });
            }
            segments.push(segment.to_string());
        }

        Ok(Self {
            path: trimmed.to_string(),
            segments,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    /// Walks the record. Missing keys and `null` both resolve to `None`.
    /// Numeric segments index into arrays.
    pub fn resolve<'a>(&self, record: &'a Record) -> Option<&'a Value> {
        let mut current = record.get(self.root())?;

        for segment in &self.segments[1..] {
            current = match current {
                Value::Object(obj) => obj.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }

    pub fn validate(&self, registry: &SchemaRegistry, model: &str) -> Result<ResolvedField> {
        registry.resolve(model, &self.segments).map_err(|e| match e {
            TableError::InvalidAccessor { reason, .. } => TableError::InvalidAccessor {
                path: self.path.clone(),
                reason,
            },
            other => other,
        })
    }
}

impl FromStr for Accessor {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{FieldKind, ModelSchema};
    use serde_json::json;

    fn device() -> Record {
        Record::from_value(json!({
            "pk": 12,
            "name": "edge-01",
            "rack": {"pk": 3, "name": "R3", "site": {"pk": 1, "name": "AMS1", "slug": "ams1"}},
            "primary_ip": null,
            "interfaces": [{"name": "eth0"}, {"name": "eth1"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_strips_record_prefix() {
        let accessor = Accessor::parse("record.rack.site.slug").unwrap();
        assert_eq!(accessor.path(), "rack.site.slug");
        assert_eq!(accessor.root(), "rack");
        assert_eq!(accessor.segments().len(), 3);
    }

    #[test]
    fn test_parse_rejects_malformed_paths() {
        assert!(Accessor::parse("").is_err());
        assert!(Accessor::parse("rack..site").is_err());
        assert!(Accessor::parse("rack.site.").is_err());
        assert!(Accessor::parse("rack-site").is_err());
        assert!("rack.pk".parse::<Accessor>().is_ok());
    }

    #[test]
    fn test_resolve_nested_values() {
        let record = device();
        let slug = Accessor::parse("rack.site.slug").unwrap();
        assert_eq!(slug.resolve(&record), Some(&json!("ams1")));

        let second = Accessor::parse("interfaces.1.name").unwrap();
        assert_eq!(second.resolve(&record), Some(&json!("eth1")));
    }

    #[test]
    fn test_resolve_missing_and_null() {
        let record = device();
        assert_eq!(Accessor::parse("primary_ip.address").unwrap().resolve(&record), None);
        assert_eq!(Accessor::parse("primary_ip").unwrap().resolve(&record), None);
        assert_eq!(Accessor::parse("name.first").unwrap().resolve(&record), None);
        assert_eq!(Accessor::parse("serial").unwrap().resolve(&record), None);
    }

    #[test]
    fn test_validate_against_schema() {
        let registry = SchemaRegistry::new()
            .with(ModelSchema::new("site").values(&["name", "slug"]))
            .with(ModelSchema::new("rack").value("name").relation("site", "site"));

        let ok = Accessor::parse("site.slug").unwrap().validate(&registry, "rack").unwrap();
        assert_eq!(ok.kind, FieldKind::Value);

        let err = Accessor::parse("name.slug").unwrap().validate(&registry, "rack").unwrap_err();
        assert!(matches!(err, TableError::InvalidAccessor { ref path, .. } if path == "name.slug"));
    }
}
