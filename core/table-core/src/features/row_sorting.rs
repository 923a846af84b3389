//! FILENAME: core/table-core/src/features/row_sorting.rs
//! PURPOSE: Sort descriptors and the column APIs that toggle them.
//! CONTEXT: The `sorting` slice is an ordered list of `{id, desc}` entries;
//! earlier entries take precedence. `toggle_sorting` cycles a column through
//! its first direction, the opposite direction and (when removal is enabled)
//! unsorted.

use std::rc::Rc;

use smallvec::SmallVec;

use crate::column::Column;
use crate::error::{Result, TableError};
use crate::feature::TableFeature;
use crate::fns::sorting::{self, auto_sorting_fn_name, AUTO_SAMPLE_SIZE};
use crate::fns::SortingFn;
use crate::options::TableOptions;
use crate::state::{slice, ColumnSort, SliceKey, SortDirection, SortingState, TableState};
use crate::table::Table;
use crate::updater::Updater;
use crate::value::{CellValue, RowData};

pub const FEATURE: &str = "RowSorting";

pub struct RowSorting;

impl<T: RowData> TableFeature<T> for RowSorting {
    fn name(&self) -> &'static str {
        FEATURE
    }

    fn state_slices(&self) -> &'static [SliceKey] {
        &[SliceKey::Sorting]
    }

    fn initial_state(&self, state: &mut TableState) {
        state.sorting = Some(SortingState::new());
    }

    fn construct_column(&self, column: &mut Column<T>, options: &TableOptions<T>) -> Result<()> {
        column.sorting_fn = column
            .column_def
            .sorting_fn
            .resolve("sorting", options.processing_fns.sorting_registry())?;
        Ok(())
    }

    fn construct_table(&self, table: &mut Table<T>) -> Result<()> {
        match table.store.get::<slice::Sorting>() {
            Some(sorting) => table.validate_sorting(&sorting),
            None => Ok(()),
        }
    }
}

/// How `toggle_sorting` changes the sorting list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortAction {
    Add,
    Toggle,
    Remove,
    Replace,
}

impl SortDirection {
    fn from_desc(desc: bool) -> Self {
        if desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

// ============================================================================
// COLUMN APIS
// ============================================================================

impl<T: RowData> Column<T> {
    fn sample_values(&self, table: &Table<T>) -> SmallVec<[CellValue; AUTO_SAMPLE_SIZE]> {
        let Some(position) = self.leaf_position else {
            return SmallVec::new();
        };
        table
            .get_core_row_model()
            .flat_rows
            .iter()
            .take(AUTO_SAMPLE_SIZE)
            .map(|row| row.value_at(position).clone())
            .collect()
    }

    /// The comparator picked from the column's first values.
    pub fn get_auto_sorting_fn(&self, table: &Table<T>) -> SortingFn {
        let name = auto_sorting_fn_name(self.sample_values(table).iter());
        table
            .processing_fns()
            .sorting_fn(name)
            .unwrap_or_else(|_| Rc::new(sorting::basic))
    }

    /// The declared comparator, else the automatic one.
    pub fn get_sorting_fn(&self, table: &Table<T>) -> SortingFn {
        match &self.sorting_fn {
            Some(f) => f.clone(),
            None => self.get_auto_sorting_fn(table),
        }
    }

    /// Text columns start ascending, everything else descending.
    pub fn get_auto_sort_dir(&self, table: &Table<T>) -> SortDirection {
        let first = self.sample_values(table).into_iter().next();
        match first {
            Some(CellValue::Text(_)) => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    pub fn get_first_sort_dir(&self, table: &Table<T>) -> SortDirection {
        self.column_def
            .sort_desc_first
            .or(table.settings().sort_desc_first)
            .map(SortDirection::from_desc)
            .unwrap_or_else(|| self.get_auto_sort_dir(table))
    }

    /// The direction the next toggle moves to. `None` means the toggle removes
    /// this column from the sort.
    pub fn get_next_sorting_order(&self, table: &Table<T>, multi: bool) -> Option<SortDirection> {
        let first = self.get_first_sort_dir(table);
        let Some(current) = self.get_is_sorted(table) else {
            return Some(first);
        };
        let settings = table.settings();
        let removal = settings.enable_sorting_removal.unwrap_or(true)
            && (!multi || settings.enable_multi_remove.unwrap_or(true));
        if current != first && removal {
            return None;
        }
        Some(match current {
            SortDirection::Desc => SortDirection::Asc,
            SortDirection::Asc => SortDirection::Desc,
        })
    }

    pub fn get_can_sort(&self, table: &Table<T>) -> bool {
        if table.store.get::<slice::Sorting>().is_none() {
            return false;
        }
        self.column_def.enable_sorting.unwrap_or(true)
            && table.settings().enable_sorting.unwrap_or(true)
            && self.has_accessor()
    }

    pub fn get_can_multi_sort(&self, table: &Table<T>) -> bool {
        self.column_def
            .enable_multi_sort
            .or(table.settings().enable_multi_sort)
            .unwrap_or_else(|| self.has_accessor())
    }

    pub fn get_is_sorted(&self, table: &Table<T>) -> Option<SortDirection> {
        let sorting = table.store.get::<slice::Sorting>()?;
        sorting
            .iter()
            .find(|sort| sort.id == self.id)
            .map(|sort| SortDirection::from_desc(sort.desc))
    }

    pub fn get_sort_index(&self, table: &Table<T>) -> Option<usize> {
        table
            .store
            .get::<slice::Sorting>()?
            .iter()
            .position(|sort| sort.id == self.id)
    }

    pub fn clear_sorting(&self, table: &Table<T>) -> Result<()> {
        let id = self.id.clone();
        table.set_sorting(Updater::with(move |old: &SortingState| {
            old.iter().filter(|sort| sort.id != id).cloned().collect()
        }))
    }

    /// Moves this column to its next sort direction.
    ///
    /// `desc` forces a direction instead of cycling. With `multi` the column
    /// is added to or toggled within the existing sort; otherwise it replaces
    /// the whole sort.
    pub fn toggle_sorting(&self, table: &Table<T>, desc: Option<bool>, multi: bool) -> Result<()> {
        let old = table.require::<slice::Sorting>()?;
        if !self.get_can_sort(table) {
            return Err(TableError::ColumnNotSortable(self.id.clone()));
        }
        let next_order = self.get_next_sorting_order(table, multi);
        let next_desc = desc.unwrap_or(next_order == Some(SortDirection::Desc));
        let existing = old.iter().position(|sort| sort.id == self.id);

        let mut action = if !old.is_empty() && self.get_can_multi_sort(table) && multi {
            if existing.is_some() {
                SortAction::Toggle
            } else {
                SortAction::Add
            }
        } else if !old.is_empty() && existing.is_some_and(|index| index != old.len() - 1) {
            SortAction::Replace
        } else if existing.is_some() {
            SortAction::Toggle
        } else {
            SortAction::Replace
        };
        if action == SortAction::Toggle && desc.is_none() && next_order.is_none() {
            action = SortAction::Remove;
        }

        let mut next: SortingState = (*old).clone();
        match action {
            SortAction::Add => {
                next.push(ColumnSort {
                    id: self.id.clone(),
                    desc: next_desc,
                });
                let max = table.settings().max_multi_sort_col_count.unwrap_or(usize::MAX);
                let overflow = next.len().saturating_sub(max);
                next.drain(..overflow);
            }
            SortAction::Toggle => {
                for sort in next.iter_mut().filter(|sort| sort.id == self.id) {
                    sort.desc = next_desc;
                }
            }
            SortAction::Remove => next.retain(|sort| sort.id != self.id),
            SortAction::Replace => {
                next = vec![ColumnSort {
                    id: self.id.clone(),
                    desc: next_desc,
                }]
            }
        }
        table.set_sorting(next)
    }
}

// ============================================================================
// TABLE APIS
// ============================================================================

impl<T: RowData> Table<T> {
    /// Replaces the sort descriptors. Every entry must name a sortable column.
    pub fn set_sorting(&self, updater: impl Into<Updater<SortingState>>) -> Result<()> {
        let current = self.require::<slice::Sorting>()?;
        let next = updater.into().resolve(&current);
        self.validate_sorting(&next)?;
        self.store.set::<slice::Sorting>(Updater::Value(next))?;
        self.auto_reset_page_index_after::<slice::Sorting>()
    }

    /// Every entry must name a column that can sort.
    pub(crate) fn validate_sorting(&self, sorting: &SortingState) -> Result<()> {
        for sort in sorting {
            let column = self.column(&sort.id)?;
            if !column.get_can_sort(self) {
                return Err(TableError::ColumnNotSortable(sort.id.clone()));
            }
        }
        Ok(())
    }

    pub fn reset_sorting(&self, default_state: bool) -> Result<()> {
        let value = default_state.then(SortingState::new);
        self.store.reset::<slice::Sorting>(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDef;
    use crate::options::TableSettings;
    use crate::value::Record;

    fn record(name: &str, age: f64) -> Record {
        let mut record = Record::default();
        record.insert("name".to_string(), name.into());
        record.insert("age".to_string(), age.into());
        record
    }

    fn table(settings: TableSettings) -> Table<Record> {
        let columns = vec![
            ColumnDef::accessor("name"),
            ColumnDef::accessor("age"),
            ColumnDef::display("actions"),
        ];
        let data = vec![record("Ann", 30.0), record("Bob", 20.0)];
        let options = TableOptions::new(columns, data)
            .feature(RowSorting)
            .settings(settings);
        Table::new(options).unwrap()
    }

    fn sorting(table: &Table<Record>) -> SortingState {
        (*table.state::<slice::Sorting>().unwrap()).clone()
    }

    #[test]
    fn test_text_column_cycles_asc_desc_off() {
        let table = table(TableSettings::default());
        let name = table.column("name").unwrap();
        name.toggle_sorting(&table, None, false).unwrap();
        assert_eq!(sorting(&table), vec![ColumnSort::asc("name")]);
        name.toggle_sorting(&table, None, false).unwrap();
        assert_eq!(sorting(&table), vec![ColumnSort::desc("name")]);
        name.toggle_sorting(&table, None, false).unwrap();
        assert!(sorting(&table).is_empty());
    }

    #[test]
    fn test_number_column_starts_descending() {
        let table = table(TableSettings::default());
        let age = table.column("age").unwrap();
        assert_eq!(age.get_first_sort_dir(&table), SortDirection::Desc);
        age.toggle_sorting(&table, None, false).unwrap();
        assert_eq!(age.get_is_sorted(&table), Some(SortDirection::Desc));
    }

    #[test]
    fn test_removal_disabled_keeps_cycling() {
        let table = table(TableSettings {
            enable_sorting_removal: Some(false),
            ..Default::default()
        });
        let name = table.column("name").unwrap();
        for _ in 0..3 {
            name.toggle_sorting(&table, None, false).unwrap();
        }
        assert_eq!(sorting(&table), vec![ColumnSort::asc("name")]);
    }

    #[test]
    fn test_multi_sort_adds_and_caps() {
        let table = table(TableSettings {
            max_multi_sort_col_count: Some(1),
            ..Default::default()
        });
        table.column("name").unwrap().toggle_sorting(&table, None, false).unwrap();
        table.column("age").unwrap().toggle_sorting(&table, Some(false), true).unwrap();
        assert_eq!(sorting(&table), vec![ColumnSort::asc("age")]);
    }

    #[test]
    fn test_multi_sort_keeps_order() {
        let table = table(TableSettings::default());
        table.column("name").unwrap().toggle_sorting(&table, None, false).unwrap();
        let age = table.column("age").unwrap();
        age.toggle_sorting(&table, None, true).unwrap();
        assert_eq!(age.get_sort_index(&table), Some(1));
        table.column("name").unwrap().clear_sorting(&table).unwrap();
        assert_eq!(age.get_sort_index(&table), Some(0));
    }

    #[test]
    fn test_column_without_accessor_cannot_sort() {
        let table = table(TableSettings::default());
        let actions = table.column("actions").unwrap();
        assert!(!actions.get_can_sort(&table));
        assert_eq!(
            actions.toggle_sorting(&table, None, false),
            Err(TableError::ColumnNotSortable("actions".to_string()))
        );
        assert_eq!(
            table.set_sorting(vec![ColumnSort::asc("actions")]),
            Err(TableError::ColumnNotSortable("actions".to_string()))
        );
    }

    #[test]
    fn test_auto_sorting_fn_for_text() {
        let table = table(TableSettings::default());
        let f = table.column("name").unwrap().get_sorting_fn(&table);
        assert_eq!(
            f(&CellValue::from("ann"), &CellValue::from("Bob")),
            std::cmp::Ordering::Less
        );
    }
}
