pub mod cache;
pub mod mysql;
pub mod types;

pub use cache::SchemaCache;
pub use mysql::SchemaIntrospector;
pub use types::*;
