pub mod builder;
pub mod ddl;
pub mod filter;
pub mod params;

pub use builder::*;
pub use ddl::{generate_create_statement, ColumnCreationSpec, ColumnReference, TableCreationSpec};
pub use filter::{compile, FilterClause, Operation};
pub use params::{bind_params, BindValue};
