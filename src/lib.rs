pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TablesConfig;

pub use adapters::{
    routes::RouteTable,
    source::{HttpSource, JsonFileSource},
    storage::LocalStorage,
};
pub use app::{dcim_routes, dcim_schema, dcim_tables, TableSet};
pub use core::{
    column::Column,
    ordering::OrderBy,
    paginate::Paginator,
    render::{ComputedField, RenderOptions, RenderedTable, TableRenderer},
    table::TableSpec,
    view::{OutputFormat, TableView},
};
pub use domain::{model::Record, schema::SchemaRegistry};
pub use utils::error::{Result, TableError};
