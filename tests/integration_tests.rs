use dcim_tables::domain::ports::UrlResolver;
use dcim_tables::{
    dcim_routes, dcim_schema, dcim_tables, ComputedField, HttpSource, JsonFileSource, LocalStorage,
    OrderBy, OutputFormat, Paginator, RenderOptions, TableError, TableView, TablesConfig,
};
use httpmock::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

fn resolver() -> Arc<dyn UrlResolver> {
    Arc::new(dcim_routes().unwrap().with_base("https://netbox.example.com"))
}

#[tokio::test]
async fn test_end_to_end_site_table_over_http() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let next = server.url("/api/dcim/sites/page-2/");
    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/api/dcim/sites/")
            .header("Authorization", "Token s3cret");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "count": 3,
                "next": next,
                "results": [
                    {"pk": 1, "name": "FRA2", "slug": "fra2", "facility": null, "asn": 64513, "count_racks": 4},
                    {"pk": 2, "name": "AMS1", "slug": "ams1", "facility": "AM3", "asn": 64512, "count_racks": 12}
                ]
            }));
    });
    let second = server.mock(|when, then| {
        when.method(GET).path("/api/dcim/sites/page-2/");
        then.status(200).json_body(serde_json::json!({
            "count": 3,
            "next": null,
            "results": [{"pk": 3, "name": "<LON3>", "slug": "lon3", "facility": null, "asn": null}]
        }));
    });

    let schema = dcim_schema();
    let tables = dcim_tables(&schema)?;
    let source = HttpSource::new(&server.url("/api/dcim/sites/"))?
        .token("s3cret")
        .timeout_seconds(5);
    let storage = LocalStorage::new(output_path.clone());

    let view = TableView::new(tables.get("site")?.clone(), source, storage, resolver())?;
    let written = view
        .run(
            &RenderOptions::ordered(OrderBy::asc("name")),
            OutputFormat::Html,
            "sites.html",
        )
        .await?;

    first.assert();
    second.assert();
    assert_eq!(written, "sites.html");

    let html = std::fs::read_to_string(temp_dir.path().join("sites.html"))?;
    assert!(html.starts_with("<table class=\"table table-hover\">"));
    assert!(html.contains("<a href=\"https://netbox.example.com/dcim/sites/ams1/\">AMS1</a>"));
    assert!(html.contains("&lt;LON3&gt;"));
    assert!(!html.contains("<LON3>"));
    assert!(!html.contains("No sites have been defined."));

    let ams = html.find("AMS1").unwrap();
    let fra = html.find("FRA2").unwrap();
    assert!(ams < fra);

    Ok(())
}

#[tokio::test]
async fn test_api_failure_is_a_data_source_error() -> anyhow::Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/api/dcim/devices/");
        then.status(403);
    });

    let temp_dir = TempDir::new()?;
    let tables = dcim_tables(&dcim_schema())?;
    let view = TableView::new(
        tables.get("device")?.clone(),
        HttpSource::new(&server.url("/api/dcim/devices/"))?,
        LocalStorage::new(temp_dir.path().to_str().unwrap().to_string()),
        resolver(),
    )?;

    let err = view
        .run(&RenderOptions::default(), OutputFormat::Html, "devices.html")
        .await
        .unwrap_err();

    api_mock.assert();
    assert!(matches!(err, TableError::SourceError { .. }));
    assert!(!temp_dir.path().join("devices.html").exists());
    Ok(())
}

#[tokio::test]
async fn test_csv_from_json_file_with_computed_count() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("racks.json");
    std::fs::write(
        &input,
        serde_json::to_vec(&serde_json::json!([
            {"pk": 1, "name": "R1", "site": {"pk": 1, "name": "AMS1", "slug": "ams1"},
             "group": {"pk": 2, "name": "Row A"}, "facility_id": "AM3-101", "u_height": 42,
             "devices": [{"pk": 10}, {"pk": 11}]},
            {"pk": 2, "name": "R2", "site": {"pk": 1, "name": "AMS1", "slug": "ams1"},
             "group": null, "facility_id": null, "u_height": 47, "devices": []}
        ]))?,
    )?;

    let output_dir = temp_dir.path().join("out");
    let storage = LocalStorage::new(output_dir.to_str().unwrap().to_string());
    let tables = dcim_tables(&dcim_schema())?;

    let view = TableView::new(
        tables.get("rack_bulk_edit")?.clone(),
        JsonFileSource::new(&input)?,
        storage,
        resolver(),
    )?
    .with_computed(ComputedField::count("device_count", "devices")?);

    let options = RenderOptions::ordered(OrderBy::desc("u_height"));
    view.run(&options, OutputFormat::Csv, "racks.csv").await?;

    let csv = std::fs::read_to_string(output_dir.join("racks.csv"))?;
    assert_eq!(
        csv,
        "Name,Site,Group,Facility ID,Height (U),Devices\nR2,AMS1,,,47,0\nR1,AMS1,Row A,AM3-101,42,2\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_paginated_render() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("vlans.json");
    let vlans: Vec<serde_json::Value> = (1..=5)
        .map(|i| serde_json::json!({"pk": i, "vid": i * 10, "name": format!("vlan{}", i), "prefix_set": []}))
        .collect();
    std::fs::write(&input, serde_json::to_vec(&serde_json::json!({"results": vlans}))?)?;

    let tables = dcim_tables(&dcim_schema())?;
    let view = TableView::new(
        tables.get("vlan")?.clone(),
        JsonFileSource::new(&input)?,
        LocalStorage::new(temp_dir.path().to_str().unwrap().to_string()),
        resolver(),
    )?;

    let table = view
        .render(&RenderOptions::default().paginated(Paginator::new(2)?, 3))
        .await?;
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].pk.as_deref(), Some("5"));
    Ok(())
}

#[tokio::test]
async fn test_tables_from_toml_config() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("tables.toml");
    std::fs::write(
        &config_path,
        r#"
[routes]
base_url = "https://dcim.example.org"

[routes.patterns]
"circuits:circuit" = "/circuits/circuits/{pk}/"

[[models]]
name = "circuit"
fields = ["cid", "commit_rate"]
relations = { site = "site" }

[[tables]]
key = "circuit"
name = "CircuitTable"
model = "circuit"
empty_text = "No circuits were found."
bulk_edit = true

[[tables.columns]]
name = "cid"
kind = "link"
route = "circuits:circuit"
args = ["pk"]
verbose_name = "Circuit ID"

[[tables.columns]]
name = "site"
kind = "link"
route = "dcim:site"
args = ["site.slug"]

[[tables.columns]]
name = "commit_rate"
verbose_name = "Commit (Kbps)"
empty_value = "n/a"
"#,
    )?;

    let config = TablesConfig::from_file(&config_path)?;
    let mut schema = dcim_schema();
    config.extend_schema(&mut schema);
    let mut tables = dcim_tables(&schema)?;
    config.build_tables(&schema, &mut tables)?;
    let routes: Arc<dyn UrlResolver> = Arc::new(config.route_table(dcim_routes()?)?);

    let input = temp_dir.path().join("circuits.json");
    std::fs::write(
        &input,
        r#"[{"pk": 5, "cid": "CX-1001", "site": {"pk": 1, "name": "AMS1", "slug": "ams1"}, "commit_rate": null}]"#,
    )?;

    let view = TableView::new(
        tables.get("circuit")?.clone(),
        JsonFileSource::new(&input)?,
        LocalStorage::new(temp_dir.path().to_str().unwrap().to_string()),
        routes,
    )?;
    view.run(&RenderOptions::default(), OutputFormat::Html, "circuits.html")
        .await?;

    let html = std::fs::read_to_string(temp_dir.path().join("circuits.html"))?;
    assert!(html.contains("<a href=\"https://dcim.example.org/circuits/circuits/5/\">CX-1001</a>"));
    assert!(html.contains("<a href=\"https://dcim.example.org/dcim/sites/ams1/\">AMS1</a>"));
    assert!(html.contains("<td>n/a</td>"));
    assert!(html.contains("name=\"pk\" value=\"5\""));
    Ok(())
}

#[test]
fn test_unknown_table_lists_alternatives() {
    let tables = dcim_tables(&dcim_schema()).unwrap();
    let err = tables.get("cables").unwrap_err();
    assert!(err.to_string().contains("cables"));
    assert!(err.user_friendly_message().contains("site"));
}
