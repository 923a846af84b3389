//! FILENAME: core/table-core/src/row.rs
//! PURPOSE: Materialized rows, their cells, and the row model a stage produces.
//! CONTEXT: A `Row` references its record through a shared `Rc<T>` and keeps
//! the leaf column values it was materialized with, indexed by
//! `Column::leaf_position`. Group rows carry aggregated values, their direct
//! `sub_rows` and every `leaf_rows` under them. Rows are never mutated after a
//! stage produces them; a later stage that needs a different depth or child
//! order builds a successor row.

use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::column::Column;
use crate::memo::ApiRegistry;
use crate::table::Table;
use crate::value::{CellValue, RowData};

static EMPTY: CellValue = CellValue::Empty;

// ============================================================================
// ROWS
// ============================================================================

pub struct Row<T> {
    pub id: String,
    /// Position among its siblings when the row was created.
    pub index: usize,
    pub depth: usize,
    pub parent_id: Option<String>,
    pub original: Rc<T>,
    /// Position of `original` in the table data.
    pub original_index: usize,
    pub(crate) values: Vec<CellValue>,
    pub sub_rows: Vec<Rc<Row<T>>>,
    /// Every leaf row under a group row. Empty for leaf rows.
    pub leaf_rows: Rc<Vec<Rc<Row<T>>>>,
    pub grouping_column_id: Option<String>,
    pub grouping_value: Option<CellValue>,
    pub apis: ApiRegistry,
}

impl<T> Row<T> {
    pub(crate) fn leaf(
        id: String,
        index: usize,
        original: Rc<T>,
        values: Vec<CellValue>,
        apis: ApiRegistry,
    ) -> Self {
        Row {
            id,
            index,
            depth: 0,
            parent_id: None,
            original,
            original_index: index,
            values,
            sub_rows: Vec::new(),
            leaf_rows: Rc::new(Vec::new()),
            grouping_column_id: None,
            grouping_value: None,
            apis,
        }
    }

    /// A copy placed at `depth` under `parent_id`, with fresh memo slots.
    pub(crate) fn with_depth(&self, depth: usize, parent_id: Option<&str>) -> Self {
        Row {
            depth,
            parent_id: parent_id.map(str::to_string),
            ..self.successor(self.sub_rows.clone())
        }
    }

    /// A copy with different children, with fresh memo slots.
    pub(crate) fn with_sub_rows(&self, sub_rows: Vec<Rc<Row<T>>>) -> Self {
        self.successor(sub_rows)
    }

    fn successor(&self, sub_rows: Vec<Rc<Row<T>>>) -> Self {
        Row {
            id: self.id.clone(),
            index: self.index,
            depth: self.depth,
            parent_id: self.parent_id.clone(),
            original: Rc::clone(&self.original),
            original_index: self.original_index,
            values: self.values.clone(),
            sub_rows,
            leaf_rows: Rc::clone(&self.leaf_rows),
            grouping_column_id: self.grouping_column_id.clone(),
            grouping_value: self.grouping_value.clone(),
            apis: self.apis.fresh(),
        }
    }

    /// Value at a leaf position. Out of range reads are empty.
    pub fn value_at(&self, leaf_position: usize) -> &CellValue {
        self.values.get(leaf_position).unwrap_or(&EMPTY)
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub fn is_group_row(&self) -> bool {
        self.grouping_column_id.is_some()
    }
}

impl<T: RowData> Row<T> {
    /// Value of the leaf column `column_id`. Unknown and group columns read as empty.
    pub fn get_value(&self, table: &Table<T>, column_id: &str) -> CellValue {
        table
            .get_column(column_id)
            .and_then(|column| column.leaf_position)
            .map(|position| self.value_at(position).clone())
            .unwrap_or_default()
    }

    /// One cell per leaf column, in leaf column order.
    pub fn get_all_cells(self: &Rc<Self>, table: &Table<T>) -> Rc<Vec<Rc<Cell<T>>>> {
        let leaves = table.get_all_leaf_columns();
        let compute = |(leaves,): &(Rc<Vec<Rc<Column<T>>>>,)| {
            Rc::new(
                leaves
                    .iter()
                    .map(|column| Rc::new(Cell::new(self, column)))
                    .collect::<Vec<_>>(),
            )
        };
        self.apis
            .memo("get_all_cells", (Rc::clone(&leaves),), &compute)
            .unwrap_or_else(|| compute(&(leaves,)))
    }

    /// Cells keyed by column id.
    pub fn get_all_cells_by_column_id(self: &Rc<Self>, table: &Table<T>) -> FxHashMap<String, Rc<Cell<T>>> {
        self.get_all_cells(table)
            .iter()
            .map(|cell| (cell.column.id.clone(), Rc::clone(cell)))
            .collect()
    }

    pub fn get_parent_row(&self, table: &Table<T>) -> Option<Rc<Row<T>>> {
        let parent_id = self.parent_id.as_deref()?;
        table.get_row(parent_id, true)
    }

    /// Ancestors from the top-level row down to the direct parent.
    pub fn get_parent_rows(&self, table: &Table<T>) -> Vec<Rc<Row<T>>> {
        let mut parents = Vec::new();
        let mut current = self.get_parent_row(table);
        while let Some(parent) = current {
            current = parent.get_parent_row(table);
            parents.push(parent);
        }
        parents.reverse();
        parents
    }

    /// Leaf rows under this row, or the row itself when it is a leaf.
    pub fn get_leaf_rows(self: &Rc<Self>) -> Vec<Rc<Row<T>>> {
        if self.sub_rows.is_empty() {
            vec![Rc::clone(self)]
        } else {
            self.leaf_rows.iter().cloned().collect()
        }
    }
}

impl<T> fmt::Debug for Row<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("id", &self.id)
            .field("depth", &self.depth)
            .field("values", &self.values)
            .field("sub_rows", &self.sub_rows.len())
            .finish()
    }
}

// ============================================================================
// CELLS
// ============================================================================

pub struct Cell<T> {
    /// `{row id}_{column id}`.
    pub id: String,
    row: Weak<Row<T>>,
    pub column: Rc<Column<T>>,
    value: CellValue,
}

/// What a renderer receives to draw one cell.
pub struct CellContext<'a, T: RowData> {
    pub table: &'a Table<T>,
    pub row: Option<Rc<Row<T>>>,
    pub column: &'a Rc<Column<T>>,
    pub cell: &'a Cell<T>,
    pub value: &'a CellValue,
}

impl<T> Cell<T> {
    fn new(row: &Rc<Row<T>>, column: &Rc<Column<T>>) -> Self {
        let value = column
            .leaf_position
            .map(|position| row.value_at(position).clone())
            .unwrap_or_default();
        Cell {
            id: format!("{}_{}", row.id, column.id),
            row: Rc::downgrade(row),
            column: Rc::clone(column),
            value,
        }
    }

    /// The owning row, while some row model still holds it.
    pub fn row(&self) -> Option<Rc<Row<T>>> {
        self.row.upgrade()
    }

    pub fn get_value(&self) -> &CellValue {
        &self.value
    }

    /// Display text of the value. Missing values render as empty text.
    pub fn render_value(&self) -> String {
        match &self.value {
            CellValue::Empty => String::new(),
            value => value.display_value(),
        }
    }
}

impl<T: RowData> Cell<T> {
    pub fn get_context<'a>(&'a self, table: &'a Table<T>) -> CellContext<'a, T> {
        CellContext {
            table,
            row: self.row(),
            column: &self.column,
            cell: self,
            value: &self.value,
        }
    }
}

impl<T> fmt::Debug for Cell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("id", &self.id)
            .field("value", &self.value)
            .finish()
    }
}

// ============================================================================
// ROW MODEL
// ============================================================================

/// The output of one pipeline stage.
pub struct RowModel<T> {
    /// Top-level rows, in display order.
    pub rows: Vec<Rc<Row<T>>>,
    /// Every row of the model, parents before their children.
    pub flat_rows: Vec<Rc<Row<T>>>,
    pub rows_by_id: FxHashMap<String, Rc<Row<T>>>,
}

impl<T> RowModel<T> {
    /// Builds a model from top-level rows, flattening their sub-rows.
    pub fn new(rows: Vec<Rc<Row<T>>>) -> Self {
        let mut flat_rows = Vec::with_capacity(rows.len());
        for row in &rows {
            push_flat(row, &mut flat_rows);
        }
        Self::with_flat_rows(rows, flat_rows)
    }

    pub fn with_flat_rows(rows: Vec<Rc<Row<T>>>, flat_rows: Vec<Rc<Row<T>>>) -> Self {
        let rows_by_id = flat_rows
            .iter()
            .map(|row| (row.id.clone(), Rc::clone(row)))
            .collect();
        RowModel {
            rows,
            flat_rows,
            rows_by_id,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Rc<Row<T>>> {
        self.rows_by_id.get(id)
    }
}

fn push_flat<T>(row: &Rc<Row<T>>, flat: &mut Vec<Rc<Row<T>>>) {
    flat.push(Rc::clone(row));
    for sub in &row.sub_rows {
        push_flat(sub, flat);
    }
}

impl<T> fmt::Debug for RowModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowModel")
            .field("rows", &self.rows.len())
            .field("flat_rows", &self.flat_rows.len())
            .finish()
    }
}
