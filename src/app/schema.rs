use crate::adapters::routes::RouteTable;
use crate::domain::schema::{ModelSchema, SchemaRegistry};
use crate::utils::error::Result;

/// Models the DCIM tables are defined on.
pub fn dcim_schema() -> SchemaRegistry {
    SchemaRegistry::new()
        .with(
            ModelSchema::new("site")
                .values(&["name", "slug", "facility", "asn"])
                .computed("count_racks")
                .computed("count_devices")
                .computed("count_prefixes")
                .computed("count_vlans")
                .computed("count_circuits"),
        )
        .with(ModelSchema::new("rack_group").values(&["name", "slug"]).relation("site", "site"))
        .with(
            ModelSchema::new("rack")
                .values(&["name", "facility_id", "u_height"])
                .relation("site", "site")
                .relation("group", "rack_group")
                .computed("device_count"),
        )
        .with(ModelSchema::new("manufacturer").values(&["name", "slug"]))
        .with(
            ModelSchema::new("device_type")
                .values(&["model", "slug"])
                .relation("manufacturer", "manufacturer"),
        )
        .with(ModelSchema::new("device_role").values(&["name", "slug", "color"]))
        .with(ModelSchema::new("status").values(&["name", "bootstrap_class"]))
        .with(ModelSchema::new("ip_address").value("address"))
        .with(
            ModelSchema::new("device")
                .values(&["name", "position", "face", "serial"])
                .relation("device_type", "device_type")
                .relation("device_role", "device_role")
                .relation("rack", "rack")
                .relation("status", "status")
                .relation("primary_ip", "ip_address"),
        )
        .with(ModelSchema::new("console_server_port").value("name").relation("device", "device"))
        .with(
            ModelSchema::new("console_port")
                .value("name")
                .relation("device", "device")
                .relation("cs_port", "console_server_port"),
        )
        .with(ModelSchema::new("power_outlet").value("name").relation("device", "device"))
        .with(
            ModelSchema::new("power_port")
                .value("name")
                .relation("device", "device")
                .relation("power_outlet", "power_outlet"),
        )
        .with(ModelSchema::new("interface").value("name").relation("device", "device"))
        .with(
            ModelSchema::new("interface_connection")
                .relation("interface_a", "interface")
                .relation("interface_b", "interface"),
        )
        .with(
            ModelSchema::new("prefix")
                .value("prefix")
                .relation("site", "site")
                .relation("vlan", "vlan"),
        )
        .with(
            ModelSchema::new("vlan")
                .values(&["vid", "name"])
                .relation("site", "site")
                .relation("status", "status")
                .many("prefix_set", "prefix"),
        )
}

/// Detail routes the tables link to.
pub fn dcim_routes() -> Result<RouteTable> {
    RouteTable::new()
        .route("dcim:site", "/dcim/sites/{slug}/")?
        .route("dcim:rack", "/dcim/racks/{pk}/")?
        .route("dcim:device", "/dcim/devices/{pk}/")?
        .route("ipam:prefix", "/ipam/prefixes/{pk}/")?
        .route("ipam:vlan", "/ipam/vlans/{pk}/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::UrlResolver;
    use crate::domain::schema::FieldKind;

    #[test]
    fn test_schema_walks_device_to_site() {
        let schema = dcim_schema();
        let path: Vec<String> = ["rack", "site", "slug"].iter().map(|s| s.to_string()).collect();
        let resolved = schema.resolve("device", &path).unwrap();
        assert_eq!(resolved.model, "site");
        assert_eq!(resolved.kind, FieldKind::Value);
    }

    #[test]
    fn test_default_routes() {
        let routes = dcim_routes().unwrap();
        assert_eq!(routes.len(), 5);
        assert_eq!(routes.reverse("dcim:device", &["42".to_string()]).unwrap(), "/dcim/devices/42/");
    }
}
