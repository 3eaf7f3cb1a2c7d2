pub mod accessor;
pub mod column;
pub mod ordering;
pub mod paginate;
pub mod render;
pub mod table;
pub mod template;
pub mod view;

pub use crate::domain::model::Record;
pub use crate::domain::ports::{RecordSource, Storage, UrlResolver};
pub use crate::utils::error::Result;
