//! FILENAME: core/table-core/src/features/column_sizing.rs
//! PURPOSE: Column widths and horizontal offsets.
//! CONTEXT: The `column_sizing` slice holds per-column overrides. A column's
//! size is the override, else its declared size, else the table default,
//! clamped to its min/max bounds.

use std::rc::Rc;

use crate::column::{Column, ColumnPosition};
use crate::error::Result;
use crate::feature::TableFeature;
use crate::state::{slice, ColumnSizingState, SliceKey, TableState};
use crate::table::Table;
use crate::updater::Updater;
use crate::value::RowData;

pub const FEATURE: &str = "ColumnSizing";

pub struct ColumnSizing;

impl<T: RowData> TableFeature<T> for ColumnSizing {
    fn name(&self) -> &'static str {
        FEATURE
    }

    fn state_slices(&self) -> &'static [SliceKey] {
        &[SliceKey::ColumnSizing]
    }

    fn initial_state(&self, state: &mut TableState) {
        state.column_sizing = Some(ColumnSizingState::default());
    }
}

// ============================================================================
// COLUMN APIS
// ============================================================================

impl<T: RowData> Column<T> {
    /// Size before any override, clamped to the column's bounds.
    pub fn get_default_size(&self, table: &Table<T>) -> f64 {
        let defaults = &table.settings().default_column;
        self.clamp_size(table, self.column_def.size.unwrap_or(defaults.size))
    }

    fn clamp_size(&self, table: &Table<T>, size: f64) -> f64 {
        let defaults = &table.settings().default_column;
        let min = self.column_def.min_size.unwrap_or(defaults.min_size);
        let max = self.column_def.max_size.unwrap_or(defaults.max_size);
        size.max(min).min(max)
    }

    pub fn get_size(&self, table: &Table<T>) -> f64 {
        let overridden = table
            .store
            .get::<slice::ColumnSizing>()
            .and_then(|sizing| sizing.get(&self.id).copied());
        match overridden {
            Some(size) => self.clamp_size(table, size),
            None => self.get_default_size(table),
        }
    }

    /// Summed size of the visible columns before this one in `position`.
    pub fn get_start(&self, table: &Table<T>, position: ColumnPosition) -> f64 {
        let columns = table.get_visible_leaf_columns_at(position);
        columns
            .iter()
            .take_while(|column| column.id != self.id)
            .map(|column| column.get_size(table))
            .sum()
    }

    /// Summed size of the visible columns after this one in `position`.
    pub fn get_after(&self, table: &Table<T>, position: ColumnPosition) -> f64 {
        let columns = table.get_visible_leaf_columns_at(position);
        columns
            .iter()
            .rev()
            .take_while(|column| column.id != self.id)
            .map(|column| column.get_size(table))
            .sum()
    }

    /// Drops this column's size override.
    pub fn reset_size(&self, table: &Table<T>) -> Result<()> {
        let id = self.id.clone();
        table.set_column_sizing(Updater::with(move |old: &ColumnSizingState| {
            let mut next = old.clone();
            next.remove(&id);
            next
        }))
    }
}

// ============================================================================
// TABLE APIS
// ============================================================================

impl<T: RowData> Table<T> {
    pub fn set_column_sizing(&self, updater: impl Into<Updater<ColumnSizingState>>) -> Result<()> {
        self.store.set::<slice::ColumnSizing>(updater.into())
    }

    pub fn reset_column_sizing(&self, default_state: bool) -> Result<()> {
        let value = default_state.then(ColumnSizingState::default);
        self.store.reset::<slice::ColumnSizing>(value)
    }

    fn total_size_of(&self, position: ColumnPosition) -> f64 {
        self.get_visible_leaf_columns_at(position)
            .iter()
            .map(|column| column.get_size(self))
            .sum()
    }

    pub fn get_total_size(&self) -> f64 {
        self.total_size_of(ColumnPosition::All)
    }

    pub fn get_left_total_size(&self) -> f64 {
        self.total_size_of(ColumnPosition::Left)
    }

    pub fn get_center_total_size(&self) -> f64 {
        self.total_size_of(ColumnPosition::Center)
    }

    pub fn get_right_total_size(&self) -> f64 {
        self.total_size_of(ColumnPosition::Right)
    }
}

/// Column ids with their current sizes, for every visible leaf column.
pub(crate) fn leaf_sizes<T: RowData>(table: &Table<T>, columns: &[Rc<Column<T>>]) -> Vec<(String, f64)> {
    columns
        .iter()
        .map(|column| (column.id.clone(), column.get_size(table)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDef;
    use crate::options::{ColumnDefaults, TableOptions, TableSettings};
    use crate::value::Record;

    fn table() -> Table<Record> {
        let columns = vec![
            ColumnDef::accessor("a").size(100.0),
            ColumnDef::accessor("b").min_size(60.0).max_size(200.0),
            ColumnDef::accessor("c"),
        ];
        let options = TableOptions::new(columns, Vec::new())
            .feature(ColumnSizing)
            .settings(TableSettings {
                default_column: ColumnDefaults {
                    size: 80.0,
                    ..Default::default()
                },
                ..Default::default()
            });
        Table::new(options).unwrap()
    }

    #[test]
    fn test_size_falls_back_to_defaults() {
        let table = table();
        assert_eq!(table.column("a").unwrap().get_size(&table), 100.0);
        assert_eq!(table.column("b").unwrap().get_size(&table), 80.0);
        assert_eq!(table.get_total_size(), 260.0);
    }

    #[test]
    fn test_override_is_clamped() {
        let table = table();
        let mut sizing = ColumnSizingState::default();
        sizing.insert("b".to_string(), 500.0);
        sizing.insert("c".to_string(), 1.0);
        table.set_column_sizing(sizing).unwrap();
        assert_eq!(table.column("b").unwrap().get_size(&table), 200.0);
        assert_eq!(table.column("c").unwrap().get_size(&table), 20.0);
    }

    #[test]
    fn test_start_and_after() {
        let table = table();
        let b = table.column("b").unwrap();
        assert_eq!(b.get_start(&table, ColumnPosition::All), 100.0);
        assert_eq!(b.get_after(&table, ColumnPosition::All), 80.0);
    }

    #[test]
    fn test_reset_size_removes_override() {
        let table = table();
        let a = table.column("a").unwrap();
        let mut sizing = ColumnSizingState::default();
        sizing.insert("a".to_string(), 40.0);
        table.set_column_sizing(sizing).unwrap();
        assert_eq!(a.get_size(&table), 40.0);
        a.reset_size(&table).unwrap();
        assert_eq!(a.get_size(&table), 100.0);
    }

    #[test]
    fn test_without_feature_sizes_are_defaults() {
        let columns = vec![ColumnDef::<Record>::accessor("a").size(30.0)];
        let table = Table::new(TableOptions::new(columns, Vec::new())).unwrap();
        let a = table.column("a").unwrap();
        assert_eq!(a.get_size(&table), 30.0);
        assert!(a.reset_size(&table).is_err());
    }
}
