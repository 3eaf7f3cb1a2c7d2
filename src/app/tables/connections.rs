use crate::core::column::Column;
use crate::core::table::TableSpec;
use crate::domain::schema::SchemaRegistry;
use crate::utils::error::Result;

/// Link to the device owning the port at `port`.
fn peer_device_column(name: &str, port: &str, label: &str) -> Result<Column> {
    let device = format!("{}.device", port);
    let device_pk = format!("{}.device.pk", port);
    Ok(Column::link(name, "dcim:device", &[device_pk.as_str()])?
        .accessor(&device)?
        .verbose(label))
}

fn device_column() -> Result<Column> {
    Ok(Column::link("device", "dcim:device", &["device.pk"])?.verbose("Device"))
}

pub fn console_connection_table(schema: &SchemaRegistry) -> Result<TableSpec> {
    TableSpec::builder("ConsoleConnectionTable")
        .model("console_port")
        .column(peer_device_column("console_server", "cs_port", "Console server")?)
        .column(Column::new("cs_port")?.verbose("Port"))
        .column(device_column()?)
        .column(Column::new("name")?.verbose("Console port"))
        .build(schema)
}

pub fn power_connection_table(schema: &SchemaRegistry) -> Result<TableSpec> {
    TableSpec::builder("PowerConnectionTable")
        .model("power_port")
        .column(peer_device_column("pdu", "power_outlet", "PDU")?)
        .column(Column::new("power_outlet")?.verbose("Outlet"))
        .column(device_column()?)
        .column(Column::new("name")?.verbose("Power port"))
        .build(schema)
}

pub fn interface_connection_table(schema: &SchemaRegistry) -> Result<TableSpec> {
    TableSpec::builder("InterfaceConnectionTable")
        .model("interface_connection")
        .column(peer_device_column("device_a", "interface_a", "Device A")?)
        .column(Column::new("interface_a")?.verbose("Interface A"))
        .column(peer_device_column("device_b", "interface_b", "Device B")?)
        .column(Column::new("interface_b")?.verbose("Interface B"))
        .build(schema)
}
