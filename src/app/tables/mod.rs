pub mod connections;
pub mod devices;
pub mod racks;
pub mod sites;
pub mod vlans;

use crate::core::table::TableSpec;
use crate::domain::schema::SchemaRegistry;
use crate::utils::error::{Result, TableError};
use std::collections::BTreeMap;

/// Named table definitions, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    tables: BTreeMap<String, TableSpec>,
}

impl TableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, spec: TableSpec) {
        self.tables.insert(key.to_string(), spec);
    }

    pub fn get(&self, key: &str) -> Result<&TableSpec> {
        self.tables.get(key).ok_or_else(|| TableError::InvalidConfigValueError {
            field: "table".to_string(),
            value: key.to_string(),
            reason: format!("Unknown table. Available tables: {}", self.names().join(", ")),
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TableSpec)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// The DCIM table set.
pub fn dcim_tables(schema: &SchemaRegistry) -> Result<TableSet> {
    let mut set = TableSet::new();
    set.insert("site", sites::site_table(schema)?);
    set.insert("rack", racks::rack_table(schema)?);
    set.insert("rack_bulk_edit", racks::rack_bulk_edit_table(schema)?);
    set.insert("device", devices::device_table(schema)?);
    set.insert("device_bulk_edit", devices::device_bulk_edit_table(schema)?);
    set.insert("device_import", devices::device_import_table(schema)?);
    set.insert("console_connection", connections::console_connection_table(schema)?);
    set.insert("power_connection", connections::power_connection_table(schema)?);
    set.insert("interface_connection", connections::interface_connection_table(schema)?);
    set.insert("vlan", vlans::vlan_table(schema)?);

    tracing::debug!("Built {} DCIM tables", set.len());
    Ok(set)
}
