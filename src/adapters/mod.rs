// Adapters layer: concrete implementations of the domain ports (routing,
// record sources, output storage).

pub mod routes;
pub mod source;
pub mod storage;
