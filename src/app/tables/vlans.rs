use crate::app::tables::devices::status_column;
use crate::core::column::Column;
use crate::core::table::TableSpec;
use crate::domain::schema::SchemaRegistry;
use crate::utils::error::Result;

/// Prefixes assigned to a VLAN, one link per line.
pub fn prefixes_column() -> Result<Column> {
    Ok(Column::link_list("prefixes", "ipam:prefix", "pk")?
        .accessor("prefix_set")?
        .verbose("Prefixes"))
}

pub fn vlan_table(schema: &SchemaRegistry) -> Result<TableSpec> {
    TableSpec::builder("VlanTable")
        .model("vlan")
        .column(Column::link("vid", "ipam:vlan", &["pk"])?.verbose("ID"))
        .column(Column::link("site", "dcim:site", &["site.slug"])?.verbose("Site"))
        .column(Column::new("name")?.verbose("Name"))
        .column(prefixes_column()?)
        .column(status_column()?)
        .empty_text("No VLANs were found.")
        .build(schema)
}
