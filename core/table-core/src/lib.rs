//! FILENAME: core/table-core/src/lib.rs
//! PURPOSE: Headless table engine: columns, state and the row model pipeline.
//! CONTEXT: A `Table` is built from `TableOptions` (column definitions, data,
//! features, settings and state). It renders nothing. Hosts read header
//! groups, rows and cells from it and call its setters in response to user
//! input. Features are opt-in; a table without any still yields its core
//! columns, headers and rows.

mod logging;

pub mod column;
pub mod error;
pub mod feature;
pub mod features;
pub mod fns;
pub mod header;
pub mod memo;
pub mod options;
pub mod row;
pub mod row_models;
pub mod state;
pub mod table;
pub mod updater;
pub mod value;

// Re-export commonly used types at the crate root
pub use column::{Accessor, AccessorFn, Column, ColumnDef, ColumnPosition};
pub use error::{Result, TableError};
pub use feature::TableFeature;
pub use features::{
    stock_features, ColumnFiltering, ColumnGrouping, ColumnOrdering, ColumnPinning, ColumnResizing,
    ColumnSizing, ColumnVisibility, GlobalFiltering, RowExpanding, RowPagination, RowSorting,
};
pub use fns::{AggregationFn, FilterFn, FilterValue, FnRef, ProcessingFns, SortingFn};
pub use header::{Header, HeaderContext, HeaderGroup, HeaderGroups, Headers};
pub use memo::{ApiDef, ApiRegistry, Memo};
pub use options::{
    ColumnDefaults, ColumnResizeDirection, ColumnResizeMode, GroupedColumnMode, TableOptions, TableSettings,
};
pub use row::{Cell, CellContext, Row, RowModel};
pub use state::{
    slice, ColumnFilter, ColumnPinningPosition, ColumnPinningState, ColumnSizingInfoState, ColumnSort,
    ExpandedState, PaginationState, SliceKey, SortDirection, StateSlice, TableState,
};
pub use table::{ColumnList, Table};
pub use updater::Updater;
pub use value::{CellValue, Record, RowData};
