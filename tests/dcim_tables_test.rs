use dcim_tables::core::render::Cell;
use dcim_tables::domain::entities::*;
use dcim_tables::{
    dcim_routes, dcim_schema, dcim_tables, OrderBy, Paginator, Record, RenderOptions, RenderedTable,
    RouteTable, TableRenderer, TableSet,
};

fn setup() -> (TableSet, RouteTable) {
    let schema = dcim_schema();
    (dcim_tables(&schema).unwrap(), dcim_routes().unwrap())
}

fn render(key: &str, records: Vec<Record>, options: &RenderOptions) -> RenderedTable {
    let (tables, routes) = setup();
    let spec = tables.get(key).unwrap();
    TableRenderer::new(&routes).render(spec, records, &[], options)
}

fn site(pk: u64, name: &str, slug: &str) -> Site {
    Site {
        pk,
        name: name.to_string(),
        slug: slug.to_string(),
        facility: None,
        asn: None,
        count_racks: None,
        count_devices: None,
        count_prefixes: None,
        count_vlans: None,
        count_circuits: None,
    }
}

fn rack(pk: u64, name: &str, site: &Site) -> Rack {
    Rack {
        pk,
        name: name.to_string(),
        site: site.summary(),
        group: None,
        facility_id: None,
        u_height: 42,
        device_count: None,
    }
}

fn device(pk: u64, name: Option<&str>, rack: Option<&Rack>) -> Device {
    Device {
        pk,
        name: name.map(str::to_string),
        device_type: DeviceTypeRef {
            pk: 1,
            manufacturer: NamedRef {
                pk: 1,
                name: "Juniper".to_string(),
            },
            model: "MX480".to_string(),
        },
        device_role: NamedRef {
            pk: 3,
            name: "Core Router".to_string(),
        },
        rack: rack.map(Rack::summary),
        position: Some(10),
        status: Some(Status {
            name: "Active".to_string(),
            bootstrap_class: "success".to_string(),
        }),
        primary_ip: Some(IpAddressRef {
            pk: 9,
            address: "10.1.0.5/24".to_string(),
        }),
    }
}

fn records<T: serde::Serialize>(entities: &[T]) -> Vec<Record> {
    entities.iter().map(|e| Record::from_entity(e).unwrap()).collect()
}

fn texts(table: &RenderedTable, column: &str) -> Vec<String> {
    table
        .column_cells(column)
        .iter()
        .map(|cell| cell.plain_text())
        .collect()
}

#[test]
fn test_all_tables_build() {
    let (tables, routes) = setup();
    assert_eq!(
        tables.names(),
        vec![
            "console_connection",
            "device",
            "device_bulk_edit",
            "device_import",
            "interface_connection",
            "power_connection",
            "rack",
            "rack_bulk_edit",
            "site",
            "vlan",
        ]
    );
    for (key, spec) in tables.iter() {
        assert!(spec.validate_routes(&routes).is_ok(), "routes of {}", key);
    }
}

#[test]
fn test_site_table() {
    let mut ams = site(1, "AMS1", "ams1");
    ams.facility = Some("Equinix AM3".to_string());
    ams.asn = Some(64512);
    ams.count_racks = Some(12);
    ams.count_devices = Some(140);

    let table = render("site", records(&[ams]), &RenderOptions::default());

    assert_eq!(
        table.column_cells("name")[0],
        &Cell::Link {
            href: "/dcim/sites/ams1/".to_string(),
            text: "AMS1".to_string()
        }
    );
    assert_eq!(texts(&table, "facility"), vec!["Equinix AM3"]);
    assert_eq!(texts(&table, "asn"), vec!["64512"]);
    assert_eq!(texts(&table, "rack_count"), vec!["12"]);
    assert_eq!(texts(&table, "device_count"), vec!["140"]);
    assert_eq!(table.column_cells("vlan_count")[0], &Cell::Empty("—".to_string()));
    assert!(table.empty_text.is_none());

    let labels: Vec<&str> = table.headers.iter().map(|h| h.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["Name", "Facility", "ASN", "Racks", "Devices", "Prefixes", "VLANs", "Circuits"]
    );
    assert!(!table.headers[3].orderable);
}

#[test]
fn test_empty_message_only_without_records() {
    let empty = render("site", vec![], &RenderOptions::default());
    assert_eq!(empty.empty_text.as_deref(), Some("No sites have been defined."));
    assert!(empty.to_html().contains("<td colspan=\"8\">No sites have been defined.</td>"));

    // An out-of-range page is not an empty table.
    let paged = render(
        "site",
        records(&[site(1, "AMS1", "ams1")]),
        &RenderOptions::default().paginated(Paginator::new(1).unwrap(), 5),
    );
    assert!(paged.empty_text.is_none());

    // Tables without an empty text never show one.
    let import = render("device_import", vec![], &RenderOptions::default());
    assert!(import.empty_text.is_none());
}

#[test]
fn test_device_table_cells() {
    let ams = site(1, "AMS1", "ams1");
    let r1 = rack(4, "R1", &ams);
    let named = device(7, Some("core-01"), Some(&r1));
    let table = render("device", records(&[named]), &RenderOptions::default());

    assert_eq!(
        table.column_cells("name")[0],
        &Cell::Html("<a href=\"/dcim/devices/7/\">core-01</a>".to_string())
    );
    assert_eq!(texts(&table, "site"), vec!["AMS1"]);
    assert_eq!(
        table.column_cells("rack")[0],
        &Cell::Link {
            href: "/dcim/racks/4/".to_string(),
            text: "R1".to_string()
        }
    );
    assert_eq!(texts(&table, "device_role"), vec!["Core Router"]);
    assert_eq!(texts(&table, "device_type"), vec!["MX480"]);
    assert_eq!(texts(&table, "primary_ip"), vec!["10.1.0.5"]);
}

#[test]
fn test_unnamed_device_placeholder() {
    let table = render("device", records(&[device(8, None, None)]), &RenderOptions::default());

    let html = table.column_cells("name")[0].to_html();
    assert_eq!(
        html,
        "<a href=\"/dcim/devices/8/\"><span class=\"label label-info\">Unnamed device</span></a>"
    );
    assert_eq!(texts(&table, "name"), vec!["Unnamed device"]);

    // No rack: both rack-derived columns fall back to the placeholder.
    assert_eq!(table.column_cells("site")[0], &Cell::Empty("—".to_string()));
    assert_eq!(table.column_cells("rack")[0], &Cell::Empty("—".to_string()));
}

#[test]
fn test_device_import_table_shows_position() {
    let table = render("device_import", records(&[device(8, Some("edge-01"), None)]), &RenderOptions::default());
    assert_eq!(texts(&table, "position"), vec!["10"]);
    assert!(table.headers.iter().all(|h| h.name != "primary_ip"));
}

#[test]
fn test_ordering_by_name() {
    let sites = [
        site(1, "FRA2", "fra2"),
        site(2, "AMS1", "ams1"),
        site(3, "LON3", "lon3"),
    ];

    let asc = render("site", records(&sites), &RenderOptions::ordered(OrderBy::asc("name")));
    assert_eq!(texts(&asc, "name"), vec!["AMS1", "FRA2", "LON3"]);
    assert_eq!(asc.headers[0].active, Some(false));

    let desc = render("site", records(&sites), &RenderOptions::ordered(OrderBy::desc("name")));
    assert_eq!(texts(&desc, "name"), vec!["LON3", "FRA2", "AMS1"]);
    assert!(desc.to_html().contains("<th class=\"orderable desc\"><a href=\"?sort=name\">Name</a></th>"));

    // Aggregates are not orderable; the request is ignored.
    let ignored = render("site", records(&sites), &RenderOptions::ordered(OrderBy::asc("rack_count")));
    assert_eq!(texts(&ignored, "name"), vec!["FRA2", "AMS1", "LON3"]);
    assert!(ignored.order_by.is_none());
}

#[test]
fn test_device_status_orders_by_status_name() {
    let mut planned = device(1, Some("a"), None);
    planned.status = Some(Status {
        name: "Planned".to_string(),
        bootstrap_class: "info".to_string(),
    });
    let active = device(2, Some("b"), None);
    let mut unknown = device(3, Some("c"), None);
    unknown.status = None;

    let import = render(
        "device_import",
        records(&[planned.clone(), active.clone()]),
        &RenderOptions::ordered(OrderBy::asc("status")),
    );
    // device_import has no status column: ordering is ignored.
    assert_eq!(texts(&import, "name"), vec!["a", "b"]);

    let (tables, routes) = setup();
    let spec = tables
        .get("device")
        .unwrap()
        .extend("DeviceStatusTable")
        .column(dcim_tables::app::tables::devices::status_column().unwrap())
        .build(&dcim_schema())
        .unwrap();
    let table = TableRenderer::new(&routes).render(
        &spec,
        records(&[planned, unknown, active]),
        &[],
        &RenderOptions::ordered(OrderBy::asc("status")),
    );
    // Missing values sort last when ascending.
    assert_eq!(texts(&table, "name"), vec!["b", "a", "c"]);
    assert_eq!(
        table.column_cells("status")[0].to_html(),
        "<span class=\"label label-success\">Active</span>"
    );
}

#[test]
fn test_bulk_edit_tables_have_one_selection_column() {
    let ams = site(1, "AMS1", "ams1");
    for key in ["rack_bulk_edit", "device_bulk_edit"] {
        let (tables, _) = setup();
        let spec = tables.get(key).unwrap();
        assert!(spec.is_bulk_edit());
        assert_eq!(spec.columns()[0].name, "pk");
        assert_eq!(spec.columns().iter().filter(|c| c.is_selection()).count(), 1);
    }

    let table = render("rack_bulk_edit", records(&[rack(4, "R1", &ams)]), &RenderOptions::default());
    assert_eq!(table.rows[0].cells[0], Cell::Checkbox { value: "4".to_string() });
    let html = table.to_html();
    assert!(html.contains("<td class=\"pk\"><input type=\"checkbox\" name=\"pk\" value=\"4\" /></td>"));
    assert!(html.contains("title=\"Toggle all\""));

    // The plain variant stays without a selection column.
    let plain = render("rack", records(&[rack(4, "R1", &ams)]), &RenderOptions::default());
    assert!(plain.headers.iter().all(|h| !h.selection));
}

#[test]
fn test_console_and_power_connections() {
    let server = DeviceRef {
        pk: 20,
        name: Some("cs-01".to_string()),
    };
    let router = DeviceRef {
        pk: 7,
        name: Some("core-01".to_string()),
    };

    let console = ConsolePort {
        pk: 1,
        name: "Console".to_string(),
        device: router.clone(),
        cs_port: Some(PortRef {
            pk: 5,
            name: "Port 5".to_string(),
            device: server.clone(),
        }),
    };
    let table = render("console_connection", records(&[console]), &RenderOptions::default());
    assert_eq!(
        table.column_cells("console_server")[0],
        &Cell::Link {
            href: "/dcim/devices/20/".to_string(),
            text: "cs-01".to_string()
        }
    );
    assert_eq!(texts(&table, "cs_port"), vec!["Port 5"]);
    assert_eq!(texts(&table, "device"), vec!["core-01"]);
    assert_eq!(texts(&table, "name"), vec!["Console"]);

    let power = PowerPort {
        pk: 2,
        name: "PSU0".to_string(),
        device: router,
        power_outlet: None,
    };
    let table = render("power_connection", records(&[power]), &RenderOptions::default());
    assert_eq!(table.column_cells("pdu")[0], &Cell::Empty("—".to_string()));
    assert_eq!(table.column_cells("power_outlet")[0], &Cell::Empty("—".to_string()));
    assert_eq!(table.headers[3].label, "Power port");
}

#[test]
fn test_interface_connections() {
    let connection = InterfaceConnection {
        pk: 3,
        interface_a: PortRef {
            pk: 11,
            name: "xe-0/0/0".to_string(),
            device: DeviceRef {
                pk: 7,
                name: Some("core-01".to_string()),
            },
        },
        interface_b: PortRef {
            pk: 12,
            name: "xe-0/0/1".to_string(),
            device: DeviceRef { pk: 8, name: None },
        },
    };

    let table = render("interface_connection", records(&[connection]), &RenderOptions::default());
    assert_eq!(texts(&table, "device_a"), vec!["core-01"]);
    assert_eq!(texts(&table, "interface_a"), vec!["xe-0/0/0"]);
    assert_eq!(texts(&table, "interface_b"), vec!["xe-0/0/1"]);
    // An unnamed peer falls back to its primary key.
    assert_eq!(
        table.column_cells("device_b")[0],
        &Cell::Link {
            href: "/dcim/devices/8/".to_string(),
            text: "8".to_string()
        }
    );
}

#[test]
fn test_vlan_prefixes_and_status() {
    let vlan = Vlan {
        pk: 30,
        vid: 100,
        name: "mgmt".to_string(),
        site: Some(site(1, "AMS1", "ams1").summary()),
        status: Some(Status {
            name: "Active".to_string(),
            bootstrap_class: "Success".to_string(),
        }),
        prefix_set: vec![
            PrefixRef {
                pk: 1,
                prefix: "10.0.0.0/24".to_string(),
            },
            PrefixRef {
                pk: 2,
                prefix: "2001:db8::/64".to_string(),
            },
        ],
    };
    let bare = Vlan {
        pk: 31,
        vid: 200,
        name: "storage".to_string(),
        site: None,
        status: None,
        prefix_set: vec![],
    };

    let table = render("vlan", records(&[vlan, bare]), &RenderOptions::default());

    assert_eq!(
        table.column_cells("prefixes")[0],
        &Cell::Html(
            "<a href=\"/ipam/prefixes/1/\">10.0.0.0/24</a><br /><a href=\"/ipam/prefixes/2/\">2001:db8::/64</a>"
                .to_string()
        )
    );
    assert_eq!(table.column_cells("prefixes")[1], &Cell::Empty("—".to_string()));
    assert_eq!(
        table.column_cells("status")[0].to_html(),
        "<span class=\"label label-success\">Active</span>"
    );
    assert_eq!(
        table.column_cells("vid")[0],
        &Cell::Link {
            href: "/ipam/vlans/30/".to_string(),
            text: "100".to_string()
        }
    );
    assert!(!table.headers[3].orderable);
}

#[test]
fn test_csv_export_leaves_out_selection() {
    let ams = site(1, "AMS1", "ams1");
    let table = render(
        "rack_bulk_edit",
        records(&[rack(4, "R1", &ams), rack(5, "R2, top", &ams)]),
        &RenderOptions::ordered(OrderBy::desc("name")),
    );

    let csv = table.to_csv().unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Name,Site,Group,Facility ID,Height (U),Devices");
    assert_eq!(lines[1], "\"R2, top\",AMS1,,,42,");
    assert_eq!(lines[2], "R1,AMS1,,,42,");
}

#[test]
fn test_pagination_slices_after_ordering() {
    let sites: Vec<Site> = (1..=7)
        .map(|i| site(i, &format!("S{}", i), &format!("s{}", i)))
        .collect();

    let table = render(
        "site",
        records(&sites),
        &RenderOptions::ordered(OrderBy::desc("name")).paginated(Paginator::new(3).unwrap(), 2),
    );
    assert_eq!(texts(&table, "name"), vec!["S4", "S3", "S2"]);

    let page = table.page.unwrap();
    assert_eq!((page.number, page.num_pages, page.total), (2, 3, 7));
    assert!(page.has_previous() && page.has_next());
}

#[test]
fn test_site_ordering_with_mixed_asn_kinds() {
    let rows: Vec<Record> = (0..120u64)
        .map(|i| {
            let asn = (i * 37) % 101;
            let value = if i % 2 == 0 {
                serde_json::json!(asn)
            } else {
                serde_json::json!(asn.to_string())
            };
            Record::from_entity(&site(i, &format!("S{}", i), &format!("s{}", i)))
                .unwrap()
                .with("asn", value)
        })
        .collect();

    let table = render("site", rows, &RenderOptions::ordered(OrderBy::asc("asn")));
    assert_eq!(table.rows.len(), 120);

    // Numbers first in numeric order, then the text values.
    let asns = texts(&table, "asn");
    let numbers: Vec<u64> = asns[..60].iter().map(|a| a.parse().unwrap()).collect();
    assert!(numbers.windows(2).all(|w| w[0] <= w[1]));
    assert!(asns[60..].windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_vlan_site_without_name_sorts_last() {
    let named = Record::new()
        .with("pk", serde_json::json!(1))
        .with("vid", serde_json::json!(10))
        .with("site", serde_json::json!({"name": "AMS1"}));
    let unnamed = Record::new()
        .with("pk", serde_json::json!(2))
        .with("vid", serde_json::json!(20))
        .with("site", serde_json::json!({"name": null}));

    let asc = render(
        "vlan",
        vec![unnamed.clone(), named.clone()],
        &RenderOptions::ordered(OrderBy::asc("site")),
    );
    let pks: Vec<Option<String>> = asc.rows.iter().map(|r| r.pk.clone()).collect();
    assert_eq!(pks, vec![Some("1".to_string()), Some("2".to_string())]);

    let desc = render("vlan", vec![named, unnamed], &RenderOptions::ordered(OrderBy::desc("site")));
    assert_eq!(desc.rows[0].pk.as_deref(), Some("2"));
}
