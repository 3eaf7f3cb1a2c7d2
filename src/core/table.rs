use crate::core::column::Column;
use crate::domain::ports::UrlResolver;
use crate::domain::schema::SchemaRegistry;
use crate::utils::error::{Result, TableError};
use std::collections::{BTreeMap, HashSet};

pub const DEFAULT_TABLE_CLASS: &str = "table table-hover";

/// A validated, immutable table definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    name: String,
    model: Option<String>,
    columns: Vec<Column>,
    empty_text: Option<String>,
    attrs: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    model: Option<String>,
    columns: Vec<Column>,
    sequence: Option<Vec<String>>,
    empty_text: Option<String>,
    attrs: BTreeMap<String, String>,
}

impl TableBuilder {
    fn new(name: &str) -> Self {
        let mut attrs = BTreeMap::new();
        attrs.insert("class".to_string(), DEFAULT_TABLE_CLASS.to_string());
        Self {
            name: name.to_string(),
            model: None,
            columns: Vec::new(),
            sequence: None,
            empty_text: None,
            attrs,
        }
    }

    pub fn model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Replaces an inherited column of the same name in place, or appends.
    pub fn override_column(mut self, column: Column) -> Self {
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        self
    }

    /// Display order. Listed columns come first, unlisted ones keep their
    /// declaration order after them.
    pub fn sequence(mut self, names: &[&str]) -> Self {
        self.sequence = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn empty_text(mut self, text: &str) -> Self {
        self.empty_text = Some(text.to_string());
        self
    }

    pub fn no_empty_text(mut self) -> Self {
        self.empty_text = None;
        self
    }

    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.to_string(), value.to_string());
        self
    }

    /// Validates and freezes the definition. Every path, template and
    /// ordering flag is checked here so rendering never fails.
    pub fn build(self, registry: &SchemaRegistry) -> Result<TableSpec> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
        }

        let selection: Vec<&Column> = self.columns.iter().filter(|c| c.is_selection()).collect();
        if let Some(column) = selection.iter().find(|c| c.accessor.path() != "pk") {
            return Err(TableError::ColumnConflict {
                table: self.name.clone(),
                column: column.name.clone(),
                reason: "selection columns must be bound to the primary key".to_string(),
            });
        }
        if selection.len() > 1 {
            return Err(TableError::DuplicateColumn {
                table: self.name.clone(),
                column: selection[1].name.clone(),
            });
        }

        if let Some(model) = &self.model {
            for column in &self.columns {
                column.validate(&self.name, registry, model)?;
            }
        }

        let columns = match self.sequence {
            Some(sequence) => order_columns(&self.name, self.columns, &sequence)?,
            None => self.columns,
        };

        tracing::debug!("Defined table {} with {} columns", self.name, columns.len());

        Ok(TableSpec {
            name: self.name,
            model: self.model,
            columns,
            empty_text: self.empty_text,
            attrs: self.attrs,
        })
    }
}

fn order_columns(table: &str, mut columns: Vec<Column>, sequence: &[String]) -> Result<Vec<Column>> {
    let mut ordered = Vec::with_capacity(columns.len());
    for name in sequence {
        let index = columns.iter().position(|c| &c.name == name).ok_or_else(|| {
            TableError::ColumnConflict {
                table: table.to_string(),
                column: name.clone(),
                reason: "listed in sequence but not defined".to_string(),
            }
        })?;
        ordered.push(columns.remove(index));
    }
    ordered.extend(columns);
    Ok(ordered)
}

impl TableSpec {
    pub fn builder(name: &str) -> TableBuilder {
        TableBuilder::new(name)
    }

    /// Starts a new definition inheriting columns, model, empty text and attrs.
    pub fn extend(&self, name: &str) -> TableBuilder {
        TableBuilder {
            name: name.to_string(),
            model: self.model.clone(),
            columns: self.columns.clone(),
            sequence: None,
            empty_text: self.empty_text.clone(),
            attrs: self.attrs.clone(),
        }
    }

    /// Bulk-edit variant: the same table with a leading `pk` selection column.
    /// Deriving from a table that already has one only renames it.
    pub fn bulk_edit(&self, name: &str) -> Result<TableSpec> {
        if let Some(column) = self.column("pk").filter(|c| !c.is_selection()) {
            return Err(TableError::ColumnConflict {
                table: name.to_string(),
                column: column.name.clone(),
                reason: "'pk' is reserved for the selection column".to_string(),
            });
        }

        let mut spec = self.clone();
        spec.name = name.to_string();
        if !spec.is_bulk_edit() {
            spec.columns.insert(0, Column::checkbox()?);
        }
        Ok(spec)
    }

    pub fn validate_routes(&self, resolver: &dyn UrlResolver) -> Result<()> {
        for column in &self.columns {
            column.validate_routes(resolver).map_err(|e| {
                tracing::error!("Table {} column {}: {}", self.name, column.name, e);
                e
            })?;
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn empty_text(&self) -> Option<&str> {
        self.empty_text.as_deref()
    }

    pub fn attrs(&self) -> &BTreeMap<String, String> {
        &self.attrs
    }

    pub fn is_bulk_edit(&self) -> bool {
        self.columns.iter().any(Column::is_selection)
    }

    pub fn selection_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_selection())
    }
}
