// Domain layer: records, typed DCIM entities, model schema and ports to the
// external collaborators (routing, data fetch, output).

pub mod entities;
pub mod model;
pub mod ports;
pub mod schema;
