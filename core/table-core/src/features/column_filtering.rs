//! FILENAME: core/table-core/src/features/column_filtering.rs
//! PURPOSE: Per-column filters through the `column_filters` slice.
//! CONTEXT: A filter entry pairs a column id with a filter value. The column's
//! filter function decides matches; setting a value that function considers
//! empty removes the entry instead.

use std::rc::Rc;

use crate::column::Column;
use crate::error::Result;
use crate::feature::TableFeature;
use crate::fns::filter::{self, should_auto_remove_filter};
use crate::fns::{FilterFn, FilterValue};
use crate::logging::log_warn;
use crate::options::TableOptions;
use crate::state::{slice, ColumnFilter, ColumnFiltersState, SliceKey, TableState};
use crate::table::Table;
use crate::updater::Updater;
use crate::value::{CellValue, RowData};

pub const FEATURE: &str = "ColumnFiltering";

pub struct ColumnFiltering;

impl<T: RowData> TableFeature<T> for ColumnFiltering {
    fn name(&self) -> &'static str {
        FEATURE
    }

    fn state_slices(&self) -> &'static [SliceKey] {
        &[SliceKey::ColumnFilters]
    }

    fn initial_state(&self, state: &mut TableState) {
        state.column_filters = Some(ColumnFiltersState::new());
    }

    fn construct_column(&self, column: &mut Column<T>, options: &TableOptions<T>) -> Result<()> {
        column.filter_fn = column
            .column_def
            .filter_fn
            .resolve("filter", options.processing_fns.filter_registry())?;
        Ok(())
    }

    /// Applied filters must name known columns.
    fn construct_table(&self, table: &mut Table<T>) -> Result<()> {
        let Some(filters) = table.store.get::<slice::ColumnFilters>() else {
            return Ok(());
        };
        for entry in filters.iter() {
            table.column(&entry.id)?;
        }
        Ok(())
    }
}

/// The first value of a column in the unprocessed rows, if any row exists.
pub(crate) fn first_core_value<T: RowData>(table: &Table<T>, column: &Column<T>) -> Option<CellValue> {
    let position = column.leaf_position?;
    let core = table.get_core_row_model();
    core.flat_rows.first().map(|row| row.value_at(position).clone())
}

// ============================================================================
// COLUMN APIS
// ============================================================================

impl<T: RowData> Column<T> {
    /// The filter function picked from the column's first value.
    pub fn get_auto_filter_fn(&self, table: &Table<T>) -> Option<FilterFn> {
        let first = first_core_value(table, self).unwrap_or_default();
        table
            .processing_fns()
            .filter_fn(filter::auto_filter_fn_name(&first))
            .ok()
    }

    /// The resolved filter function: the declared one, else the automatic one.
    pub fn get_filter_fn(&self, table: &Table<T>) -> Option<FilterFn> {
        match &self.filter_fn {
            Some(f) => Some(f.clone()),
            None => self.get_auto_filter_fn(table),
        }
    }

    pub fn get_can_filter(&self, table: &Table<T>) -> bool {
        if table.store.get::<slice::ColumnFilters>().is_none() || !self.has_accessor() {
            return false;
        }
        let settings = table.settings();
        self.column_def
            .enable_column_filter
            .or(settings.enable_column_filters)
            .or(settings.enable_filters)
            .unwrap_or(true)
    }

    pub fn get_is_filtered(&self, table: &Table<T>) -> bool {
        self.get_filter_index(table).is_some()
    }

    pub fn get_filter_value(&self, table: &Table<T>) -> Option<FilterValue> {
        let filters = table.store.get::<slice::ColumnFilters>()?;
        filters
            .iter()
            .find(|filter| filter.id == self.id)
            .map(|filter| filter.value.clone())
    }

    pub fn get_filter_index(&self, table: &Table<T>) -> Option<usize> {
        table
            .store
            .get::<slice::ColumnFilters>()?
            .iter()
            .position(|filter| filter.id == self.id)
    }

    /// Sets, replaces or removes this column's filter entry.
    ///
    /// The updater sees the current value (`None` when unfiltered). A result
    /// the filter function auto-removes drops the entry; a new entry goes to
    /// the end of the list.
    pub fn set_filter_value(&self, table: &Table<T>, updater: impl Into<Updater<Option<FilterValue>>>) -> Result<()> {
        let filters = table.require::<slice::ColumnFilters>()?;
        let current = filters
            .iter()
            .find(|filter| filter.id == self.id)
            .map(|filter| filter.value.clone());
        let value = updater.into().resolve(&current);
        let filter_fn = self.get_filter_fn(table);
        let remove = should_auto_remove_filter(filter_fn.as_ref(), value.as_ref());

        let mut next: ColumnFiltersState = (*filters).clone();
        match (value, next.iter().position(|filter| filter.id == self.id)) {
            (_, Some(index)) if remove => {
                next.remove(index);
            }
            (Some(value), Some(index)) => next[index].value = value,
            (Some(value), None) if !remove => next.push(ColumnFilter {
                id: self.id.clone(),
                value,
            }),
            _ => {}
        }
        table.store.set::<slice::ColumnFilters>(Updater::Value(next))?;
        table.auto_reset_page_index_after::<slice::ColumnFilters>()
    }
}

// ============================================================================
// TABLE APIS
// ============================================================================

impl<T: RowData> Table<T> {
    /// Replaces the filter list.
    ///
    /// Every entry must name a known column. Entries whose value the column's
    /// filter function auto-removes are dropped.
    pub fn set_column_filters(&self, updater: impl Into<Updater<ColumnFiltersState>>) -> Result<()> {
        let current = self.require::<slice::ColumnFilters>()?;
        let next = updater.into().resolve(&current);
        let mut kept = ColumnFiltersState::with_capacity(next.len());
        for entry in next {
            let column = self.column(&entry.id)?;
            let filter_fn = column.get_filter_fn(self);
            if !should_auto_remove_filter(filter_fn.as_ref(), Some(&entry.value)) {
                kept.push(entry);
            }
        }
        self.store.set::<slice::ColumnFilters>(Updater::Value(kept))?;
        self.auto_reset_page_index_after::<slice::ColumnFilters>()
    }

    pub fn reset_column_filters(&self, default_state: bool) -> Result<()> {
        let value = default_state.then(ColumnFiltersState::new);
        self.store.reset::<slice::ColumnFilters>(value)
    }

    /// Filters with their column, filter function and resolved filter value,
    /// in state order. Entries naming an unknown column are skipped.
    pub(crate) fn active_column_filters(&self) -> Vec<(Rc<Column<T>>, FilterFn, FilterValue)> {
        let Some(filters) = self.store.get::<slice::ColumnFilters>() else {
            return Vec::new();
        };
        let mut active = Vec::with_capacity(filters.len());
        for entry in filters.iter() {
            let Some(column) = self.get_column(&entry.id) else {
                log_warn!("ROWMODEL", "filter on unknown column '{}' ignored", entry.id);
                continue;
            };
            let Some(filter_fn) = column.get_filter_fn(self) else {
                continue;
            };
            let value = filter_fn.resolve(&entry.value);
            active.push((column, filter_fn, value));
        }
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDef;
    use crate::error::TableError;
    use crate::value::Record;

    fn record(name: &str, age: f64) -> Record {
        let mut record = Record::default();
        record.insert("name".to_string(), name.into());
        record.insert("age".to_string(), age.into());
        record
    }

    fn table() -> Table<Record> {
        let columns = vec![
            ColumnDef::accessor("name"),
            ColumnDef::accessor("age").filter_fn(filter::IN_NUMBER_RANGE),
            ColumnDef::display("actions"),
        ];
        let data = vec![record("Ann", 30.0), record("Bob", 20.0)];
        Table::new(TableOptions::new(columns, data).feature(ColumnFiltering)).unwrap()
    }

    #[test]
    fn test_set_replace_and_remove() {
        let table = table();
        let name = table.column("name").unwrap();
        name.set_filter_value(&table, Some(FilterValue::from("an"))).unwrap();
        assert_eq!(name.get_filter_value(&table), Some(FilterValue::from("an")));
        name.set_filter_value(&table, Some(FilterValue::from("bo"))).unwrap();
        assert_eq!(table.state::<slice::ColumnFilters>().unwrap().len(), 1);
        name.set_filter_value(&table, Some(FilterValue::from(""))).unwrap();
        assert!(!name.get_is_filtered(&table));
    }

    #[test]
    fn test_new_filters_append() {
        let table = table();
        table.column("name").unwrap().set_filter_value(&table, Some(FilterValue::from("a"))).unwrap();
        table
            .column("age")
            .unwrap()
            .set_filter_value(&table, Some(FilterValue::range(Some(10.0), None)))
            .unwrap();
        assert_eq!(table.column("age").unwrap().get_filter_index(&table), Some(1));
    }

    #[test]
    fn test_auto_filter_fn_follows_first_value() {
        let table = table();
        assert!(table.column("name").unwrap().get_auto_filter_fn(&table).is_some());
        assert!(table.column("age").unwrap().filter_fn.is_some());
    }

    #[test]
    fn test_unknown_column_in_filters_is_rejected() {
        let table = table();
        let result = table.set_column_filters(vec![ColumnFilter {
            id: "nope".to_string(),
            value: "x".into(),
        }]);
        assert_eq!(result, Err(TableError::UnknownColumn("nope".to_string())));
    }

    #[test]
    fn test_can_filter_requires_accessor() {
        let table = table();
        assert!(table.column("name").unwrap().get_can_filter(&table));
        assert!(!table.column("actions").unwrap().get_can_filter(&table));
    }

    #[test]
    fn test_unknown_filter_fn_fails_construction() {
        let columns = vec![ColumnDef::<Record>::accessor("name").filter_fn("fuzzy")];
        let result = Table::new(TableOptions::new(columns, Vec::new()).feature(ColumnFiltering));
        assert_eq!(
            result.unwrap_err(),
            TableError::UnknownFunction {
                kind: "filter",
                name: "fuzzy".to_string(),
            }
        );
    }
}
