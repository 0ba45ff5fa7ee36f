//! Body of the filtered query endpoint.

use crate::service::pagination::PaginationOverride;
use crate::sql::{FilterClause, SortDirection};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct SortSpec {
    #[serde(alias = "byColumn")]
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct QuerySpec {
    #[serde(default)]
    pub filters: Vec<FilterClause>,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub pagination: Option<PaginationOverride>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
}
