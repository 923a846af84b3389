//! FILENAME: core/table-core/src/features/column_ordering.rs
//! PURPOSE: Reordering leaf columns through the `column_order` slice.

use std::rc::Rc;

use crate::column::{Column, ColumnPosition};
use crate::error::Result;
use crate::feature::TableFeature;
use crate::options::GroupedColumnMode;
use crate::state::{slice, ColumnOrderState, SliceKey, TableState};
use crate::table::Table;
use crate::updater::Updater;
use crate::value::RowData;

pub struct ColumnOrdering;

impl<T: RowData> TableFeature<T> for ColumnOrdering {
    fn name(&self) -> &'static str {
        "ColumnOrdering"
    }

    fn state_slices(&self) -> &'static [SliceKey] {
        &[SliceKey::ColumnOrder]
    }

    fn initial_state(&self, state: &mut TableState) {
        state.column_order = Some(ColumnOrderState::new());
    }
}

/// Applies `order` to `leaves`, then places grouped columns per `mode`.
///
/// Ids in `order` come first in that order; unknown ids are skipped and the
/// remaining columns follow in their original order.
pub fn order_columns<T>(
    leaves: &[Rc<Column<T>>],
    order: &[String],
    grouping: &[String],
    mode: GroupedColumnMode,
) -> Vec<Rc<Column<T>>> {
    let mut remaining: Vec<Rc<Column<T>>> = leaves.to_vec();
    let mut ordered: Vec<Rc<Column<T>>> = Vec::with_capacity(leaves.len());
    for id in order {
        if remaining.is_empty() {
            break;
        }
        if let Some(found) = remaining.iter().position(|column| &column.id == id) {
            ordered.push(remaining.remove(found));
        }
    }
    ordered.extend(remaining);

    if grouping.is_empty() {
        return ordered;
    }
    let is_grouped = |column: &Rc<Column<T>>| grouping.iter().any(|id| id == &column.id);
    match mode {
        GroupedColumnMode::Keep => ordered,
        GroupedColumnMode::Remove => ordered.into_iter().filter(|c| !is_grouped(c)).collect(),
        GroupedColumnMode::Reorder => {
            let mut grouped: Vec<Rc<Column<T>>> = grouping
                .iter()
                .filter_map(|id| ordered.iter().find(|c| &c.id == id).cloned())
                .collect();
            grouped.extend(ordered.into_iter().filter(|c| !is_grouped(c)));
            grouped
        }
    }
}

impl<T: RowData> Table<T> {
    pub fn set_column_order(&self, updater: impl Into<Updater<ColumnOrderState>>) -> Result<()> {
        self.store.set::<slice::ColumnOrder>(updater.into())
    }

    /// Back to the initial order, or to definition order with `default_state`.
    pub fn reset_column_order(&self, default_state: bool) -> Result<()> {
        let value = if default_state {
            Some(ColumnOrderState::new())
        } else {
            None
        };
        self.store.reset::<slice::ColumnOrder>(value)
    }
}

impl<T: RowData> Column<T> {
    /// Index among the visible leaf columns of `position`.
    pub fn get_index(&self, table: &Table<T>, position: ColumnPosition) -> Option<usize> {
        table
            .get_visible_leaf_columns_at(position)
            .iter()
            .position(|column| column.id == self.id)
    }

    pub fn get_is_first_column(&self, table: &Table<T>, position: ColumnPosition) -> bool {
        table
            .get_visible_leaf_columns_at(position)
            .first()
            .is_some_and(|column| column.id == self.id)
    }

    pub fn get_is_last_column(&self, table: &Table<T>, position: ColumnPosition) -> bool {
        table
            .get_visible_leaf_columns_at(position)
            .last()
            .is_some_and(|column| column.id == self.id)
    }
}
