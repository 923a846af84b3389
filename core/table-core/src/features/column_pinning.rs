//! FILENAME: core/table-core/src/features/column_pinning.rs
//! PURPOSE: Pinning leaf columns to the left or right edge.
//! CONTEXT: The `column_pinning` slice lists pinned leaf ids per side, in
//! display order. Every leaf not listed on either side is a center column.
//! Pinning a group column pins all of its leaves.

use std::rc::Rc;

use crate::column::{Column, ColumnPosition};
use crate::error::Result;
use crate::feature::TableFeature;
use crate::features::column_visibility::Cells;
use crate::memo::{ApiDef, ApiRegistry};
use crate::row::Row;
use crate::state::{slice, ColumnPinningPosition, ColumnPinningState, SliceKey, TableState};
use crate::table::{ColumnList, Table};
use crate::updater::Updater;
use crate::value::RowData;

pub const FEATURE: &str = "ColumnPinning";

pub struct ColumnPinning;

impl<T: RowData> TableFeature<T> for ColumnPinning {
    fn name(&self) -> &'static str {
        FEATURE
    }

    fn state_slices(&self) -> &'static [SliceKey] {
        &[SliceKey::ColumnPinning]
    }

    fn initial_state(&self, state: &mut TableState) {
        state.column_pinning = Some(ColumnPinningState::default());
    }

    fn construct_row(&self, apis: &mut ApiRegistry) -> Result<()> {
        apis.assign_apis(
            FEATURE,
            &[
                ApiDef::memo("get_left_visible_cells"),
                ApiDef::memo("get_center_visible_cells"),
                ApiDef::memo("get_right_visible_cells"),
            ],
        )
    }

    fn construct_table(&self, table: &mut Table<T>) -> Result<()> {
        table.apis_mut().assign_apis(
            FEATURE,
            &[
                ApiDef::memo("get_left_leaf_columns"),
                ApiDef::memo("get_center_leaf_columns"),
                ApiDef::memo("get_right_leaf_columns"),
                ApiDef::memo("get_left_visible_leaf_columns"),
                ApiDef::memo("get_center_visible_leaf_columns"),
                ApiDef::memo("get_right_visible_leaf_columns"),
                ApiDef::memo("get_left_header_groups"),
                ApiDef::memo("get_center_header_groups"),
                ApiDef::memo("get_right_header_groups"),
            ],
        )
    }
}

/// `ids` looked up in `columns`, in the order of `ids`. Unknown ids are skipped.
fn pick<T>(columns: &[Rc<Column<T>>], ids: &[String]) -> Vec<Rc<Column<T>>> {
    ids.iter()
        .filter_map(|id| columns.iter().find(|column| &column.id == id).cloned())
        .collect()
}

fn unpinned<T>(columns: &[Rc<Column<T>>], pinning: &ColumnPinningState) -> Vec<Rc<Column<T>>> {
    columns
        .iter()
        .filter(|column| !pinning.left.contains(&column.id) && !pinning.right.contains(&column.id))
        .cloned()
        .collect()
}

// ============================================================================
// COLUMN APIS
// ============================================================================

impl<T: RowData> Column<T> {
    /// Pins this column's leaves to `position`, or unpins them with `None`.
    /// Pinned leaves are appended to the end of their side.
    pub fn pin(self: &Rc<Self>, table: &Table<T>, position: Option<ColumnPinningPosition>) -> Result<()> {
        table.require::<slice::ColumnPinning>()?;
        let ids: Vec<String> = self
            .get_leaf_columns()
            .iter()
            .map(|leaf| leaf.id.clone())
            .collect();
        table.set_column_pinning(Updater::with(move |old: &ColumnPinningState| {
            let mut next = ColumnPinningState {
                left: old.left.iter().filter(|id| !ids.contains(id)).cloned().collect(),
                right: old.right.iter().filter(|id| !ids.contains(id)).cloned().collect(),
            };
            match position {
                Some(ColumnPinningPosition::Left) => next.left.extend(ids),
                Some(ColumnPinningPosition::Right) => next.right.extend(ids),
                None => {}
            }
            next
        }))
    }

    pub fn get_can_pin(self: &Rc<Self>, table: &Table<T>) -> bool {
        if table.store.get::<slice::ColumnPinning>().is_none() {
            return false;
        }
        let settings = table.settings();
        let table_allows = settings
            .enable_column_pinning
            .or(settings.enable_pinning)
            .unwrap_or(true);
        table_allows
            && self
                .get_leaf_columns()
                .iter()
                .any(|leaf| leaf.column_def.enable_pinning.unwrap_or(true))
    }

    /// The side this column is pinned to. A group column reports a side when
    /// any of its leaves is pinned there.
    pub fn get_is_pinned(self: &Rc<Self>, table: &Table<T>) -> Option<ColumnPinningPosition> {
        let pinning = table.store.get::<slice::ColumnPinning>()?;
        let leaves = self.get_leaf_columns();
        if leaves.iter().any(|leaf| pinning.left.contains(&leaf.id)) {
            Some(ColumnPinningPosition::Left)
        } else if leaves.iter().any(|leaf| pinning.right.contains(&leaf.id)) {
            Some(ColumnPinningPosition::Right)
        } else {
            None
        }
    }

    /// Index within its pinned side.
    pub fn get_pinned_index(self: &Rc<Self>, table: &Table<T>) -> Option<usize> {
        let position = self.get_is_pinned(table)?;
        let visible = match position {
            ColumnPinningPosition::Left => table.get_left_visible_leaf_columns(),
            ColumnPinningPosition::Right => table.get_right_visible_leaf_columns(),
        };
        visible.iter().position(|column| column.id == self.id)
    }
}

// ============================================================================
// TABLE APIS
// ============================================================================

impl<T: RowData> Table<T> {
    pub fn set_column_pinning(&self, updater: impl Into<Updater<ColumnPinningState>>) -> Result<()> {
        self.store.set::<slice::ColumnPinning>(updater.into())
    }

    /// Back to the initial pinning, or to nothing pinned with `default_state`.
    pub fn reset_column_pinning(&self, default_state: bool) -> Result<()> {
        let value = default_state.then(ColumnPinningState::default);
        self.store.reset::<slice::ColumnPinning>(value)
    }

    /// Whether any column is pinned, on `position` or on either side.
    pub fn get_is_some_columns_pinned(&self, position: Option<ColumnPinningPosition>) -> bool {
        let Some(pinning) = self.store.get::<slice::ColumnPinning>() else {
            return false;
        };
        match position {
            Some(ColumnPinningPosition::Left) => !pinning.left.is_empty(),
            Some(ColumnPinningPosition::Right) => !pinning.right.is_empty(),
            None => !pinning.left.is_empty() || !pinning.right.is_empty(),
        }
    }

    fn pinned_columns(
        &self,
        api: &'static str,
        columns: ColumnList<T>,
        select: fn(&[Rc<Column<T>>], &ColumnPinningState) -> Vec<Rc<Column<T>>>,
    ) -> Option<ColumnList<T>> {
        let pinning = self.store.get::<slice::ColumnPinning>()?;
        let compute = |(columns, pinning): &(ColumnList<T>, Rc<ColumnPinningState>)| {
            Rc::new(select(columns, pinning))
        };
        Some(
            self.apis
                .memo(api, (Rc::clone(&columns), Rc::clone(&pinning)), &compute)
                .unwrap_or_else(|| compute(&(columns, pinning))),
        )
    }

    pub fn get_left_leaf_columns(&self) -> ColumnList<T> {
        self.pinned_columns("get_left_leaf_columns", self.get_all_leaf_columns(), |c, p| pick(c, &p.left))
            .unwrap_or_else(|| self.no_columns())
    }

    pub fn get_right_leaf_columns(&self) -> ColumnList<T> {
        self.pinned_columns("get_right_leaf_columns", self.get_all_leaf_columns(), |c, p| pick(c, &p.right))
            .unwrap_or_else(|| self.no_columns())
    }

    pub fn get_center_leaf_columns(&self) -> ColumnList<T> {
        self.pinned_columns("get_center_leaf_columns", self.get_all_leaf_columns(), unpinned)
            .unwrap_or_else(|| self.get_all_leaf_columns())
    }

    pub fn get_left_visible_leaf_columns(&self) -> ColumnList<T> {
        self.pinned_columns(
            "get_left_visible_leaf_columns",
            self.get_visible_leaf_columns(),
            |c, p| pick(c, &p.left),
        )
        .unwrap_or_else(|| self.no_columns())
    }

    pub fn get_right_visible_leaf_columns(&self) -> ColumnList<T> {
        self.pinned_columns(
            "get_right_visible_leaf_columns",
            self.get_visible_leaf_columns(),
            |c, p| pick(c, &p.right),
        )
        .unwrap_or_else(|| self.no_columns())
    }

    pub fn get_center_visible_leaf_columns(&self) -> ColumnList<T> {
        self.pinned_columns("get_center_visible_leaf_columns", self.get_visible_leaf_columns(), unpinned)
            .unwrap_or_else(|| self.get_visible_leaf_columns())
    }

    /// Visible leaf columns of one section. `All` is every visible leaf in
    /// display order.
    pub fn get_visible_leaf_columns_at(&self, position: ColumnPosition) -> ColumnList<T> {
        match position {
            ColumnPosition::All => self.get_visible_leaf_columns(),
            ColumnPosition::Left => self.get_left_visible_leaf_columns(),
            ColumnPosition::Center => self.get_center_visible_leaf_columns(),
            ColumnPosition::Right => self.get_right_visible_leaf_columns(),
        }
    }
}

// ============================================================================
// ROW APIS
// ============================================================================

impl<T: RowData> Row<T> {
    fn section_cells(self: &Rc<Self>, table: &Table<T>, api: &'static str, columns: ColumnList<T>) -> Cells<T> {
        let cells = self.get_all_visible_cells(table);
        let compute = |(cells, columns): &(Cells<T>, ColumnList<T>)| {
            Rc::new(
                columns
                    .iter()
                    .filter_map(|column| cells.iter().find(|cell| cell.column.id == column.id).cloned())
                    .collect(),
            )
        };
        self.apis
            .memo(api, (Rc::clone(&cells), Rc::clone(&columns)), &compute)
            .unwrap_or_else(|| compute(&(cells, columns)))
    }

    pub fn get_left_visible_cells(self: &Rc<Self>, table: &Table<T>) -> Cells<T> {
        self.section_cells(table, "get_left_visible_cells", table.get_left_visible_leaf_columns())
    }

    pub fn get_center_visible_cells(self: &Rc<Self>, table: &Table<T>) -> Cells<T> {
        self.section_cells(table, "get_center_visible_cells", table.get_center_visible_leaf_columns())
    }

    pub fn get_right_visible_cells(self: &Rc<Self>, table: &Table<T>) -> Cells<T> {
        self.section_cells(table, "get_right_visible_cells", table.get_right_visible_leaf_columns())
    }
}
