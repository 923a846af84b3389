//! FILENAME: core/table-core/src/features/row_expanding.rs
//! PURPOSE: Expanding rows with sub-rows, through the `expanded` slice.
//! CONTEXT: `ExpandedState::All` expands every row; otherwise the map lists the
//! expanded row ids. The expanded row model stage flattens expanded rows'
//! children into the visible list.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::feature::TableFeature;
use crate::options::TableSettings;
use crate::row::Row;
use crate::state::{slice, ExpandedState, SliceKey, TableState};
use crate::table::Table;
use crate::updater::Updater;
use crate::value::RowData;

pub const FEATURE: &str = "RowExpanding";

pub struct RowExpanding;

impl<T: RowData> TableFeature<T> for RowExpanding {
    fn name(&self) -> &'static str {
        FEATURE
    }

    fn state_slices(&self) -> &'static [SliceKey] {
        &[SliceKey::Expanded]
    }

    fn initial_state(&self, state: &mut TableState) {
        state.expanded = Some(ExpandedState::default());
    }

    fn default_options(&self, settings: &mut TableSettings) {
        settings.paginate_expanded_rows.get_or_insert(true);
    }
}

/// `rows` with the sub-rows of every expanded row inserted after it, recursively.
pub(crate) fn expand_rows<T>(rows: &[Rc<Row<T>>], expanded: &ExpandedState) -> Vec<Rc<Row<T>>> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        push_expanded(row, expanded, &mut out);
    }
    out
}

fn push_expanded<T>(row: &Rc<Row<T>>, expanded: &ExpandedState, out: &mut Vec<Rc<Row<T>>>) {
    out.push(Rc::clone(row));
    if !row.sub_rows.is_empty() && expanded.is_expanded(&row.id) {
        for sub in &row.sub_rows {
            push_expanded(sub, expanded, out);
        }
    }
}

// ============================================================================
// ROW APIS
// ============================================================================

impl<T: RowData> Row<T> {
    pub fn get_is_expanded(&self, table: &Table<T>) -> bool {
        table
            .expanded_state()
            .is_some_and(|expanded| expanded.is_expanded(&self.id))
    }

    pub fn get_can_expand(&self, table: &Table<T>) -> bool {
        table.expanded_state().is_some()
            && table.settings().enable_expanding.unwrap_or(true)
            && !self.sub_rows.is_empty()
    }

    /// Whether every ancestor of this row is expanded.
    pub fn get_is_all_parents_expanded(&self, table: &Table<T>) -> bool {
        self.get_parent_rows(table)
            .iter()
            .all(|parent| parent.get_is_expanded(table))
    }

    /// Expands or collapses this row. `None` flips the current state.
    pub fn toggle_expanded(&self, table: &Table<T>, expanded: Option<bool>) -> Result<()> {
        let current = table.require::<slice::Expanded>()?;
        let exists = current.is_expanded(&self.id);
        let expanded = expanded.unwrap_or(!exists);
        if exists == expanded {
            return Ok(());
        }
        let mut rows: FxHashMap<String, bool> = match &*current {
            ExpandedState::All => table
                .get_pre_pagination_row_model()
                .rows_by_id
                .keys()
                .map(|id| (id.clone(), true))
                .collect(),
            ExpandedState::Rows(rows) => rows.clone(),
        };
        if expanded {
            rows.insert(self.id.clone(), true);
        } else {
            rows.remove(&self.id);
        }
        table.set_expanded(ExpandedState::Rows(rows))
    }
}

// ============================================================================
// TABLE APIS
// ============================================================================

impl<T: RowData> Table<T> {
    pub fn set_expanded(&self, updater: impl Into<Updater<ExpandedState>>) -> Result<()> {
        self.store.set::<slice::Expanded>(updater.into())
    }

    /// Back to the initial expansion, or to nothing expanded with `default_state`.
    pub fn reset_expanded(&self, default_state: bool) -> Result<()> {
        let value = default_state.then(ExpandedState::default);
        self.store.reset::<slice::Expanded>(value)
    }

    /// Expands every row, or collapses all. `None` flips between the two.
    pub fn toggle_all_rows_expanded(&self, expanded: Option<bool>) -> Result<()> {
        self.require::<slice::Expanded>()?;
        let expanded = expanded.unwrap_or_else(|| !self.get_is_all_rows_expanded());
        let next = if expanded {
            ExpandedState::All
        } else {
            ExpandedState::default()
        };
        self.set_expanded(next)
    }

    pub fn get_can_some_rows_expand(&self) -> bool {
        self.get_pre_pagination_row_model()
            .flat_rows
            .iter()
            .any(|row| row.get_can_expand(self))
    }

    pub fn get_is_some_rows_expanded(&self) -> bool {
        self.expanded_state()
            .is_some_and(|expanded| !expanded.is_empty())
    }

    /// Whether every row that can expand is expanded.
    pub fn get_is_all_rows_expanded(&self) -> bool {
        let Some(expanded) = self.expanded_state() else {
            return false;
        };
        if let ExpandedState::All = *expanded {
            return true;
        }
        if expanded.is_empty() {
            return false;
        }
        self.get_row_model()
            .flat_rows
            .iter()
            .filter(|row| row.get_can_expand(self))
            .all(|row| expanded.is_expanded(&row.id))
    }

    /// Depth of the deepest expanded row, plus one. Zero when nothing is expanded.
    pub fn get_expanded_depth(&self) -> usize {
        let Some(expanded) = self.expanded_state() else {
            return 0;
        };
        let model = self.get_row_model();
        model
            .flat_rows
            .iter()
            .filter(|row| !row.sub_rows.is_empty() && expanded.is_expanded(&row.id))
            .map(|row| row.depth + 1)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDef;
    use crate::features::ColumnGrouping;
    use crate::options::TableOptions;
    use crate::value::Record;

    fn record(team: &str, name: &str) -> Record {
        let mut record = Record::default();
        record.insert("team".to_string(), team.into());
        record.insert("name".to_string(), name.into());
        record
    }

    fn table() -> Table<Record> {
        let columns = vec![ColumnDef::accessor("team"), ColumnDef::accessor("name")];
        let data = vec![record("red", "a"), record("blue", "b"), record("red", "c")];
        let options = TableOptions::new(columns, data)
            .feature(ColumnGrouping)
            .feature(RowExpanding);
        let table = Table::new(options).unwrap();
        table.set_grouping(vec!["team".to_string()]).unwrap();
        table
    }

    fn visible_ids(table: &Table<Record>) -> Vec<String> {
        table.get_row_model().rows.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_expand_one_group() {
        let table = table();
        assert_eq!(visible_ids(&table), vec!["team:red", "team:blue"]);
        let red = table.get_row("team:red", false).unwrap();
        assert!(red.get_can_expand(&table));
        red.toggle_expanded(&table, None).unwrap();
        assert_eq!(visible_ids(&table), vec!["team:red", "0", "2", "team:blue"]);
        assert_eq!(table.get_expanded_depth(), 1);
    }

    #[test]
    fn test_toggle_all_and_collapse_one() {
        let table = table();
        table.toggle_all_rows_expanded(Some(true)).unwrap();
        assert!(table.get_is_all_rows_expanded());
        assert_eq!(visible_ids(&table).len(), 5);
        let blue = table.get_row("team:blue", false).unwrap();
        blue.toggle_expanded(&table, Some(false)).unwrap();
        assert!(!table.get_is_all_rows_expanded());
        assert!(table.get_is_some_rows_expanded());
        assert_eq!(visible_ids(&table), vec!["team:red", "0", "2", "team:blue"]);
    }

    #[test]
    fn test_regrouping_resets_expanded() {
        let table = table();
        table.toggle_all_rows_expanded(Some(true)).unwrap();
        table.set_grouping(vec!["name".to_string()]).unwrap();
        assert!(!table.get_is_some_rows_expanded());
    }

    #[test]
    fn test_leaf_rows_cannot_expand() {
        let table = table();
        table.toggle_all_rows_expanded(Some(true)).unwrap();
        let leaf = table.get_row("0", false).unwrap();
        assert!(!leaf.get_can_expand(&table));
        assert!(leaf.get_is_all_parents_expanded(&table));
    }
}
