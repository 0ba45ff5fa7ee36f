//! Column projection from the per-table allow-list and request `fields`.

use crate::config::TableSettings;
use crate::introspect::ColumnMetadata;

/// Effective SELECT list. Empty means every column.
///
/// No `fields`: the allow-list (or everything). `fields` with an allow-list: the
/// intersection, or the whole allow-list when nothing overlaps. `fields` without an
/// allow-list: `fields` as given.
pub fn columns_to_select(table: &str, settings: &TableSettings, fields: &[String]) -> Vec<String> {
    let allowed = settings.get(table).map(Vec::as_slice).unwrap_or(&[]);
    if fields.is_empty() {
        return allowed.to_vec();
    }
    if allowed.is_empty() {
        return fields.to_vec();
    }
    let picked: Vec<String> = fields.iter().filter(|f| allowed.contains(f)).cloned().collect();
    if picked.is_empty() {
        allowed.to_vec()
    } else {
        picked
    }
}

/// Column metadata limited to the allow-list, when one exists.
pub fn visible_columns(table: &str, settings: &TableSettings, columns: Vec<ColumnMetadata>) -> Vec<ColumnMetadata> {
    match settings.get(table).filter(|a| !a.is_empty()) {
        Some(allowed) => columns.into_iter().filter(|c| allowed.contains(&c.name)).collect(),
        None => columns,
    }
}
