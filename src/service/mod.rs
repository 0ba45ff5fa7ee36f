//! Statement execution, paging, projection and request validation.

mod crud;
pub mod pagination;
pub mod projection;
pub mod query;
mod validation;

pub use crud::{row_to_json, CrudService};
pub use pagination::{build_result, total_pages, PageRequest, PaginatedResult, PaginationOverride};
pub use projection::{columns_to_select, visible_columns};
pub use query::{QuerySpec, SortSpec};
pub use validation::RequestValidator;
