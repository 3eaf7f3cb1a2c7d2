use crate::core::column::Column;
use crate::core::table::TableSpec;
use crate::domain::schema::SchemaRegistry;
use crate::utils::error::Result;

pub fn site_table(schema: &SchemaRegistry) -> Result<TableSpec> {
    TableSpec::builder("SiteTable")
        .model("site")
        .column(Column::link("name", "dcim:site", &["slug"])?.verbose("Name"))
        .column(Column::new("facility")?.verbose("Facility"))
        .column(Column::new("asn")?.verbose("ASN"))
        .column(count_column("rack_count", "count_racks", "Racks")?)
        .column(count_column("device_count", "count_devices", "Devices")?)
        .column(count_column("prefix_count", "count_prefixes", "Prefixes")?)
        .column(count_column("vlan_count", "count_vlans", "VLANs")?)
        .column(count_column("circuit_count", "count_circuits", "Circuits")?)
        .empty_text("No sites have been defined.")
        .build(schema)
}

/// Aggregates are annotations, not sortable fields.
fn count_column(name: &str, accessor: &str, label: &str) -> Result<Column> {
    Ok(Column::new(name)?.accessor(accessor)?.verbose(label).orderable(false))
}
