//! FILENAME: core/table-core/src/features/global_filtering.rs
//! PURPOSE: One filter value matched against every globally filterable column.
//! CONTEXT: A row passes the global filter when any of those columns matches.
//! Only columns whose first value is text or a number take part.

use std::rc::Rc;

use crate::column::Column;
use crate::error::Result;
use crate::feature::TableFeature;
use crate::features::column_filtering::first_core_value;
use crate::fns::filter::{self, includes_string};
use crate::fns::{FilterFn, FilterValue};
use crate::state::{slice, GlobalFilterState, SliceKey, TableState};
use crate::table::Table;
use crate::updater::Updater;
use crate::value::{CellValue, RowData};

pub const FEATURE: &str = "GlobalFiltering";

pub struct GlobalFiltering;

impl<T: RowData> TableFeature<T> for GlobalFiltering {
    fn name(&self) -> &'static str {
        FEATURE
    }

    fn state_slices(&self) -> &'static [SliceKey] {
        &[SliceKey::GlobalFilter]
    }

    fn initial_state(&self, state: &mut TableState) {
        state.global_filter = Some(GlobalFilterState::default());
    }

    fn construct_table(&self, table: &mut Table<T>) -> Result<()> {
        if let Some(name) = &table.settings().global_filter_fn {
            table.processing_fns().filter_fn(name)?;
        }
        Ok(())
    }
}

impl<T: RowData> Column<T> {
    pub fn get_can_global_filter(&self, table: &Table<T>) -> bool {
        if table.store.get::<slice::GlobalFilter>().is_none() || !self.has_accessor() {
            return false;
        }
        let enabled = self
            .column_def
            .enable_global_filter
            .or(table.settings().enable_global_filter)
            .unwrap_or(true);
        enabled
            && matches!(
                first_core_value(table, self),
                Some(CellValue::Text(_) | CellValue::Number(_))
            )
    }
}

impl<T: RowData> Table<T> {
    /// `includesString` from the table's registry, or the built-in one when
    /// the host registry lacks it.
    pub fn get_global_auto_filter_fn(&self) -> FilterFn {
        self.processing_fns()
            .filter_fn(filter::INCLUDES_STRING)
            .unwrap_or_else(|_| includes_string())
    }

    /// The named global filter function, else the automatic one.
    pub fn get_global_filter_fn(&self) -> FilterFn {
        self.settings()
            .global_filter_fn
            .as_deref()
            .and_then(|name| self.processing_fns().filter_fn(name).ok())
            .unwrap_or_else(|| self.get_global_auto_filter_fn())
    }

    pub fn set_global_filter(&self, updater: impl Into<Updater<GlobalFilterState>>) -> Result<()> {
        self.store.set::<slice::GlobalFilter>(updater.into())?;
        self.auto_reset_page_index_after::<slice::GlobalFilter>()
    }

    pub fn reset_global_filter(&self, default_state: bool) -> Result<()> {
        let value = default_state.then(GlobalFilterState::default);
        self.store.reset::<slice::GlobalFilter>(value)
    }

    /// The global filter value when it is set to something that filters.
    pub(crate) fn active_global_filter(&self) -> Option<FilterValue> {
        let value = self.store.get::<slice::GlobalFilter>()?;
        if value.is_falsey() {
            None
        } else {
            Some(self.get_global_filter_fn().resolve(&value))
        }
    }

    /// Leaf columns the global filter is matched against.
    pub(crate) fn global_filter_columns(&self) -> Vec<Rc<Column<T>>> {
        self.get_all_leaf_columns()
            .iter()
            .filter(|column| column.get_can_global_filter(self))
            .cloned()
            .collect()
    }
}
