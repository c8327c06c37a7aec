pub mod descriptor;
pub mod errors;
pub mod registry;

pub use descriptor::{ForeignKeyDescriptor, SchemaDescriptor, TableDescriptor};
pub use errors::SchemaConfigError;
pub use registry::{Cardinality, Direction, ForeignKeyEdge, SchemaRegistry, TableInfo};
