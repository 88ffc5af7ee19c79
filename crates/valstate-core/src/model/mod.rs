//! Data model: attribute values, snapshots, error maps and schema selectors

pub mod error_map;
pub mod schema;
pub mod snapshot;
pub mod value;

pub use error_map::ValidationErrors;
pub use schema::SchemaSelector;
pub use snapshot::AttributeSnapshot;
pub use value::{AttributeValue, Primitive};
