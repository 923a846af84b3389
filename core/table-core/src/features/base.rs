//! FILENAME: core/table-core/src/features/base.rs
//! PURPOSE: The always-on features every table starts with.
//! CONTEXT: These own no state. They assign the memoized APIs the column
//! tree, header groups, row cells and the row model pipeline are read through.

use std::rc::Rc;

use crate::column::Column;
use crate::error::Result;
use crate::feature::TableFeature;
use crate::memo::{ApiDef, ApiRegistry};
use crate::options::TableOptions;
use crate::table::Table;
use crate::value::RowData;

pub const CORE_COLUMNS: &str = "Columns";
pub const CORE_HEADERS: &str = "Headers";
pub const CORE_ROWS: &str = "Rows";
pub const CORE_ROW_MODELS: &str = "RowModels";

pub struct CoreColumns;

impl<T: RowData> TableFeature<T> for CoreColumns {
    fn name(&self) -> &'static str {
        CORE_COLUMNS
    }

    fn construct_column(&self, column: &mut Column<T>, _options: &TableOptions<T>) -> Result<()> {
        column.apis.assign_apis(
            CORE_COLUMNS,
            &[ApiDef::memo("get_flat_columns"), ApiDef::memo("get_leaf_columns")],
        )
    }

    fn construct_table(&self, table: &mut Table<T>) -> Result<()> {
        table
            .apis_mut()
            .assign_apis(CORE_COLUMNS, &[ApiDef::memo("get_all_leaf_columns")])
    }
}

pub struct CoreHeaders;

impl<T: RowData> TableFeature<T> for CoreHeaders {
    fn name(&self) -> &'static str {
        CORE_HEADERS
    }

    fn construct_table(&self, table: &mut Table<T>) -> Result<()> {
        table.apis_mut().assign_apis(
            CORE_HEADERS,
            &[
                ApiDef::memo("get_header_leaf_columns"),
                ApiDef::memo("get_header_groups"),
                ApiDef::memo("get_flat_headers"),
                ApiDef::memo("get_leaf_headers"),
            ],
        )
    }
}

pub struct CoreRows;

impl<T: RowData> TableFeature<T> for CoreRows {
    fn name(&self) -> &'static str {
        CORE_ROWS
    }

    fn construct_row(&self, apis: &mut ApiRegistry) -> Result<()> {
        apis.assign_apis(CORE_ROWS, &[ApiDef::memo("get_all_cells")])
    }
}

pub struct CoreRowModels;

impl<T: RowData> TableFeature<T> for CoreRowModels {
    fn name(&self) -> &'static str {
        CORE_ROW_MODELS
    }

    fn construct_table(&self, table: &mut Table<T>) -> Result<()> {
        table.apis_mut().assign_apis(
            CORE_ROW_MODELS,
            &[
                ApiDef::memo("get_core_row_model"),
                ApiDef::memo("get_grouped_row_model"),
                ApiDef::memo("get_filtered_row_model"),
                ApiDef::memo("get_sorted_row_model"),
                ApiDef::memo("get_expanded_row_model"),
                ApiDef::memo("get_pagination_row_model"),
            ],
        )
    }
}

/// The core features, in the order they are registered.
pub fn core_features<T: RowData>() -> Vec<Rc<dyn TableFeature<T>>> {
    vec![
        Rc::new(CoreColumns),
        Rc::new(CoreHeaders),
        Rc::new(CoreRows),
        Rc::new(CoreRowModels),
    ]
}
