//! FILENAME: core/table-core/src/features/column_visibility.rs
//! PURPOSE: Showing and hiding columns through the `column_visibility` slice.
//! CONTEXT: A leaf column is visible unless the slice maps its id to false. A
//! group column is visible while any of its children is.

use std::rc::Rc;

use crate::column::Column;
use crate::error::Result;
use crate::feature::TableFeature;
use crate::memo::{ApiDef, ApiRegistry};
use crate::options::TableSettings;
use crate::row::{Cell, Row};
use crate::state::{slice, ColumnVisibilityState, SliceKey, TableState};
use crate::table::{ColumnList, Table};
use crate::updater::Updater;
use crate::value::RowData;

pub const FEATURE: &str = "ColumnVisibility";

pub type Cells<T> = Rc<Vec<Rc<Cell<T>>>>;

pub struct ColumnVisibility;

impl<T: RowData> TableFeature<T> for ColumnVisibility {
    fn name(&self) -> &'static str {
        FEATURE
    }

    fn state_slices(&self) -> &'static [SliceKey] {
        &[SliceKey::ColumnVisibility]
    }

    fn initial_state(&self, state: &mut TableState) {
        state.column_visibility = Some(ColumnVisibilityState::default());
    }

    fn default_options(&self, settings: &mut TableSettings) {
        settings.enable_hiding.get_or_insert(true);
    }

    fn construct_row(&self, apis: &mut ApiRegistry) -> Result<()> {
        apis.assign_apis(
            FEATURE,
            &[ApiDef::memo("get_all_visible_cells"), ApiDef::memo("get_visible_cells")],
        )
    }

    fn construct_table(&self, table: &mut Table<T>) -> Result<()> {
        table.apis_mut().assign_apis(
            FEATURE,
            &[
                ApiDef::memo("get_visible_leaf_columns"),
                ApiDef::memo("get_visible_flat_columns"),
            ],
        )
    }
}

fn is_visible_in<T>(column: &Column<T>, visibility: &ColumnVisibilityState) -> bool {
    if column.is_leaf() {
        visibility.get(&column.id).copied().unwrap_or(true)
    } else {
        column.columns.iter().any(|child| is_visible_in(child, visibility))
    }
}

// ============================================================================
// COLUMN APIS
// ============================================================================

impl<T: RowData> Column<T> {
    pub fn get_is_visible(&self, table: &Table<T>) -> bool {
        match table.store.get::<slice::ColumnVisibility>() {
            Some(visibility) => is_visible_in(self, &visibility),
            None => true,
        }
    }

    pub fn get_can_hide(&self, table: &Table<T>) -> bool {
        if table.store.get::<slice::ColumnVisibility>().is_none() {
            return false;
        }
        self.column_def
            .enable_hiding
            .or(table.settings().enable_hiding)
            .unwrap_or(true)
    }

    /// Shows or hides this column, or every hideable leaf under a group column.
    /// `None` flips the current visibility.
    pub fn toggle_visibility(self: &Rc<Self>, table: &Table<T>, value: Option<bool>) -> Result<()> {
        table.require::<slice::ColumnVisibility>()?;
        let visible = value.unwrap_or_else(|| !self.get_is_visible(table));
        let ids: Vec<String> = self
            .get_leaf_columns()
            .iter()
            .filter(|leaf| leaf.get_can_hide(table))
            .map(|leaf| leaf.id.clone())
            .collect();
        if ids.is_empty() {
            return Ok(());
        }
        table.set_column_visibility(Updater::with(move |old: &ColumnVisibilityState| {
            let mut next = old.clone();
            for id in ids {
                next.insert(id, visible);
            }
            next
        }))
    }
}

// ============================================================================
// TABLE APIS
// ============================================================================

impl<T: RowData> Table<T> {
    pub fn set_column_visibility(&self, updater: impl Into<Updater<ColumnVisibilityState>>) -> Result<()> {
        self.store.set::<slice::ColumnVisibility>(updater.into())
    }

    /// Back to the initial visibility, or to all visible with `default_state`.
    pub fn reset_column_visibility(&self, default_state: bool) -> Result<()> {
        let value = default_state.then(ColumnVisibilityState::default);
        self.store.reset::<slice::ColumnVisibility>(value)
    }

    /// Shows or hides every leaf column. Columns that cannot hide stay visible.
    pub fn toggle_all_columns_visible(&self, value: Option<bool>) -> Result<()> {
        self.require::<slice::ColumnVisibility>()?;
        let visible = value.unwrap_or_else(|| !self.get_is_all_columns_visible());
        let next: ColumnVisibilityState = self
            .get_all_leaf_columns()
            .iter()
            .map(|column| (column.id.clone(), visible || !column.get_can_hide(self)))
            .collect();
        self.set_column_visibility(next)
    }

    pub fn get_is_all_columns_visible(&self) -> bool {
        self.get_all_leaf_columns()
            .iter()
            .all(|column| column.get_is_visible(self))
    }

    pub fn get_is_some_columns_visible(&self) -> bool {
        self.get_all_leaf_columns()
            .iter()
            .any(|column| column.get_is_visible(self))
    }

    /// Visible leaf columns in display order.
    pub fn get_visible_leaf_columns(&self) -> ColumnList<T> {
        let leaves = self.get_all_leaf_columns();
        let Some(visibility) = self.store.get::<slice::ColumnVisibility>() else {
            return leaves;
        };
        let compute = |(leaves, visibility): &(ColumnList<T>, Rc<ColumnVisibilityState>)| {
            Rc::new(
                leaves
                    .iter()
                    .filter(|column| is_visible_in(column, visibility))
                    .cloned()
                    .collect(),
            )
        };
        self.apis
            .memo("get_visible_leaf_columns", (Rc::clone(&leaves), Rc::clone(&visibility)), &compute)
            .unwrap_or_else(|| compute(&(leaves, visibility)))
    }

    /// Visible columns of every depth, depth first.
    pub fn get_visible_flat_columns(&self) -> ColumnList<T> {
        let flat = self.get_all_flat_columns();
        let Some(visibility) = self.store.get::<slice::ColumnVisibility>() else {
            return flat;
        };
        let compute = |(flat, visibility): &(ColumnList<T>, Rc<ColumnVisibilityState>)| {
            Rc::new(
                flat.iter()
                    .filter(|column| is_visible_in(column, visibility))
                    .cloned()
                    .collect(),
            )
        };
        self.apis
            .memo("get_visible_flat_columns", (Rc::clone(&flat), Rc::clone(&visibility)), &compute)
            .unwrap_or_else(|| compute(&(flat, visibility)))
    }
}

// ============================================================================
// ROW APIS
// ============================================================================

impl<T: RowData> Row<T> {
    /// Cells of visible columns, in leaf column order.
    pub fn get_all_visible_cells(self: &Rc<Self>, table: &Table<T>) -> Cells<T> {
        let cells = self.get_all_cells(table);
        let Some(visibility) = table.store.get::<slice::ColumnVisibility>() else {
            return cells;
        };
        let compute = |(cells, visibility): &(Cells<T>, Rc<ColumnVisibilityState>)| {
            Rc::new(
                cells
                    .iter()
                    .filter(|cell| is_visible_in(&cell.column, visibility))
                    .cloned()
                    .collect(),
            )
        };
        self.apis
            .memo("get_all_visible_cells", (Rc::clone(&cells), Rc::clone(&visibility)), &compute)
            .unwrap_or_else(|| compute(&(cells, visibility)))
    }

    /// Visible cells with pinned sections applied: left, center, then right.
    pub fn get_visible_cells(self: &Rc<Self>, table: &Table<T>) -> Cells<T> {
        if table.store.get::<slice::ColumnPinning>().is_none() {
            return self.get_all_visible_cells(table);
        }
        let left = self.get_left_visible_cells(table);
        let center = self.get_center_visible_cells(table);
        let right = self.get_right_visible_cells(table);
        let compute = |(left, center, right): &(Cells<T>, Cells<T>, Cells<T>)| {
            Rc::new(left.iter().chain(center.iter()).chain(right.iter()).cloned().collect())
        };
        self.apis
            .memo(
                "get_visible_cells",
                (Rc::clone(&left), Rc::clone(&center), Rc::clone(&right)),
                &compute,
            )
            .unwrap_or_else(|| compute(&(left, center, right)))
    }
}
