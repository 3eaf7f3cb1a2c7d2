use crate::core::column::Column;
use crate::core::table::TableSpec;
use crate::domain::schema::SchemaRegistry;
use crate::utils::error::Result;

pub fn rack_table(schema: &SchemaRegistry) -> Result<TableSpec> {
    TableSpec::builder("RackTable")
        .model("rack")
        .column(Column::link("name", "dcim:rack", &["pk"])?.verbose("Name"))
        .column(Column::link("site", "dcim:site", &["site.slug"])?.verbose("Site"))
        .column(Column::new("group")?.verbose("Group"))
        .column(Column::new("facility_id")?.verbose("Facility ID"))
        .column(Column::new("u_height")?.verbose("Height (U)"))
        .column(
            Column::new("devices")?
                .accessor("device_count")?
                .verbose("Devices")
                .orderable(false),
        )
        .empty_text("No racks were found.")
        .build(schema)
}

pub fn rack_bulk_edit_table(schema: &SchemaRegistry) -> Result<TableSpec> {
    rack_table(schema)?.bulk_edit("RackBulkEditTable")
}
