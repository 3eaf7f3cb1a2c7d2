use crate::core::column::Column;
use crate::core::table::TableSpec;
use crate::domain::schema::SchemaRegistry;
use crate::utils::error::Result;

/// Device name link; devices without a name show an "Unnamed device" badge.
pub const DEVICE_LINK: &str = r#"<a href="{% url 'dcim:device' pk=record.pk %}">{{ record.name|default:'<span class="label label-info">Unnamed device</span>' }}</a>"#;

pub const PRIMARY_IP: &str = "{{ record.primary_ip.address|host }}";

pub const STATUS_LABEL: &str = r#"<span class="label label-{{ record.status.bootstrap_class|lower }}">{{ record.status.name }}</span>"#;

pub fn device_name_column() -> Result<Column> {
    Ok(Column::template("name", DEVICE_LINK)?.verbose("Name"))
}

/// Colored status badge, for any model with a `status` relation.
pub fn status_column() -> Result<Column> {
    Ok(Column::template("status", STATUS_LABEL)?
        .verbose("Status")
        .order_by("status.name")?)
}

fn site_column() -> Result<Column> {
    Ok(Column::new("site")?.accessor("rack.site")?.verbose("Site"))
}

fn rack_column() -> Result<Column> {
    Ok(Column::link("rack", "dcim:rack", &["rack.pk"])?.verbose("Rack"))
}

pub fn device_table(schema: &SchemaRegistry) -> Result<TableSpec> {
    TableSpec::builder("DeviceTable")
        .model("device")
        .column(device_name_column()?)
        .column(site_column()?)
        .column(rack_column()?)
        .column(Column::new("device_role")?.verbose("Role"))
        .column(Column::new("device_type")?.verbose("Type"))
        .column(
            Column::template("primary_ip", PRIMARY_IP)?
                .verbose("IP Address")
                .orderable(false),
        )
        .empty_text("No devices were found.")
        .build(schema)
}

pub fn device_bulk_edit_table(schema: &SchemaRegistry) -> Result<TableSpec> {
    device_table(schema)?.bulk_edit("DeviceBulkEditTable")
}

/// Result listing after a CSV device import.
pub fn device_import_table(schema: &SchemaRegistry) -> Result<TableSpec> {
    TableSpec::builder("DeviceImportTable")
        .model("device")
        .column(device_name_column()?)
        .column(site_column()?)
        .column(rack_column()?)
        .column(Column::new("position")?.verbose("Position"))
        .column(Column::new("device_role")?.verbose("Role"))
        .column(Column::new("device_type")?.verbose("Type"))
        .build(schema)
}
