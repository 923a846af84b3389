//! FILENAME: core/table-core/src/features/column_grouping.rs
//! PURPOSE: Grouping rows by column values, and the aggregation of grouped rows.
//! CONTEXT: The `grouping` slice lists column ids, outermost group first. The
//! grouped row model stage builds the group tree; this module holds the state
//! APIs plus the row and cell flags renderers use to draw group rows.

use std::rc::Rc;

use crate::column::Column;
use crate::error::{Result, TableError};
use crate::feature::TableFeature;
use crate::features::column_filtering::first_core_value;
use crate::fns::aggregation::auto_aggregation_fn_name;
use crate::fns::AggregationFn;
use crate::options::{GroupedColumnMode, TableOptions, TableSettings};
use crate::row::{Cell, Row};
use crate::state::{slice, GroupingState, SliceKey, TableState};
use crate::table::Table;
use crate::updater::Updater;
use crate::value::{CellValue, RowData};

pub const FEATURE: &str = "ColumnGrouping";

pub struct ColumnGrouping;

impl<T: RowData> TableFeature<T> for ColumnGrouping {
    fn name(&self) -> &'static str {
        FEATURE
    }

    fn state_slices(&self) -> &'static [SliceKey] {
        &[SliceKey::Grouping]
    }

    fn initial_state(&self, state: &mut TableState) {
        state.grouping = Some(GroupingState::new());
    }

    fn default_options(&self, settings: &mut TableSettings) {
        settings
            .grouped_column_mode
            .get_or_insert(GroupedColumnMode::Reorder);
    }

    fn construct_column(&self, column: &mut Column<T>, options: &TableOptions<T>) -> Result<()> {
        column.aggregation_fn = column
            .column_def
            .aggregation_fn
            .resolve("aggregation", options.processing_fns.aggregation_registry())?;
        Ok(())
    }

    fn construct_table(&self, table: &mut Table<T>) -> Result<()> {
        match table.store.get::<slice::Grouping>() {
            Some(grouping) => table.validate_grouping(&grouping),
            None => Ok(()),
        }
    }
}

// ============================================================================
// COLUMN APIS
// ============================================================================

impl<T: RowData> Column<T> {
    /// Adds this column to the end of the grouping, or removes it.
    pub fn toggle_grouping(&self, table: &Table<T>) -> Result<()> {
        let id = self.id.clone();
        table.set_grouping(Updater::with(move |old: &GroupingState| {
            if old.contains(&id) {
                old.iter().filter(|g| **g != id).cloned().collect()
            } else {
                let mut next = old.clone();
                next.push(id);
                next
            }
        }))
    }

    pub fn get_can_group(&self, table: &Table<T>) -> bool {
        if table.store.get::<slice::Grouping>().is_none() {
            return false;
        }
        self.column_def.enable_grouping.unwrap_or(true)
            && table.settings().enable_grouping.unwrap_or(true)
            && self.has_accessor()
    }

    pub fn get_is_grouped(&self, table: &Table<T>) -> bool {
        self.get_grouped_index(table).is_some()
    }

    pub fn get_grouped_index(&self, table: &Table<T>) -> Option<usize> {
        table
            .store
            .get::<slice::Grouping>()?
            .iter()
            .position(|id| *id == self.id)
    }

    /// `sum` for numeric columns. Other kinds have no automatic aggregation.
    pub fn get_auto_aggregation_fn(&self, table: &Table<T>) -> Option<AggregationFn> {
        let first = first_core_value(table, self)?;
        let name = auto_aggregation_fn_name(&first)?;
        table.processing_fns().aggregation_fn(name).ok()
    }

    /// The declared aggregation, else the automatic one.
    pub fn get_aggregation_fn(&self, table: &Table<T>) -> Option<AggregationFn> {
        match &self.aggregation_fn {
            Some(f) => Some(Rc::clone(f)),
            None => self.get_auto_aggregation_fn(table),
        }
    }
}

// ============================================================================
// TABLE APIS
// ============================================================================

impl<T: RowData> Table<T> {
    /// Replaces the grouping. Every id must name a column that can group.
    pub fn set_grouping(&self, updater: impl Into<Updater<GroupingState>>) -> Result<()> {
        let current = self.require::<slice::Grouping>()?;
        let next = updater.into().resolve(&current);
        self.validate_grouping(&next)?;
        self.store.set::<slice::Grouping>(Updater::Value(next))?;
        if self.store.is_controlled::<slice::Grouping>() {
            return Ok(());
        }
        self.auto_reset_expanded()?;
        self.auto_reset_page_index()
    }

    pub(crate) fn validate_grouping(&self, grouping: &GroupingState) -> Result<()> {
        for id in grouping {
            let column = self.column(id)?;
            if !column.get_can_group(self) {
                return Err(TableError::ColumnNotGroupable(id.clone()));
            }
        }
        Ok(())
    }

    pub fn reset_grouping(&self, default_state: bool) -> Result<()> {
        let value = default_state.then(GroupingState::new);
        self.store.reset::<slice::Grouping>(value)
    }
}

// ============================================================================
// ROW AND CELL APIS
// ============================================================================

impl<T: RowData> Row<T> {
    /// Whether this is a group row.
    pub fn get_is_grouped(&self) -> bool {
        self.grouping_column_id.is_some()
    }

    /// The value this row's group was keyed on, if `column_id` is its grouping column.
    pub fn get_grouping_value(&self, column_id: &str) -> Option<&CellValue> {
        match &self.grouping_column_id {
            Some(id) if id == column_id => self.grouping_value.as_ref(),
            _ => None,
        }
    }
}

impl<T: RowData> Cell<T> {
    /// The cell carrying the group value of a group row.
    pub fn get_is_grouped(&self) -> bool {
        self.row()
            .is_some_and(|row| row.grouping_column_id.as_deref() == Some(self.column.id.as_str()))
    }

    /// A grouped column's cell in a row grouped by some other column.
    pub fn get_is_placeholder(&self, table: &Table<T>) -> bool {
        !self.get_is_grouped() && self.column.get_is_grouped(table)
    }

    /// An aggregated value of a group row.
    pub fn get_is_aggregated(&self, table: &Table<T>) -> bool {
        !self.get_is_grouped()
            && !self.get_is_placeholder(table)
            && self.row().is_some_and(|row| !row.sub_rows.is_empty())
    }
}
