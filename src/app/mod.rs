// Application layer: the DCIM models, routes and table definitions built on
// top of the core renderer.

pub mod schema;
pub mod tables;

pub use schema::{dcim_routes, dcim_schema};
pub use tables::{dcim_tables, TableSet};
