//! FILENAME: core/table-core/src/features/mod.rs
//! Table features.
//!
//! Each module holds one feature: the `TableFeature` impl that declares its
//! state slice, defaults and APIs, plus the `impl` blocks that add its methods
//! to `Table`, `Column`, `Row`, `Header` and `Cell`. Methods of a feature that
//! is not registered read as neutral values and refuse to mutate.

pub mod base;
pub mod column_filtering;
pub mod column_grouping;
pub mod column_ordering;
pub mod column_pinning;
pub mod column_resizing;
pub mod column_sizing;
pub mod column_visibility;
pub mod global_filtering;
pub mod row_expanding;
pub mod row_pagination;
pub mod row_sorting;

use std::rc::Rc;

use crate::feature::TableFeature;
use crate::value::RowData;

pub use base::{core_features, CoreColumns, CoreHeaders, CoreRowModels, CoreRows};
pub use column_filtering::ColumnFiltering;
pub use column_grouping::ColumnGrouping;
pub use column_ordering::ColumnOrdering;
pub use column_pinning::ColumnPinning;
pub use column_resizing::ColumnResizing;
pub use column_sizing::ColumnSizing;
pub use column_visibility::ColumnVisibility;
pub use global_filtering::GlobalFiltering;
pub use row_expanding::RowExpanding;
pub use row_pagination::RowPagination;
pub use row_sorting::RowSorting;

/// Every stock feature, in dependency order.
pub fn stock_features<T: RowData>() -> Vec<Rc<dyn TableFeature<T>>> {
    vec![
        Rc::new(ColumnVisibility),
        Rc::new(ColumnOrdering),
        Rc::new(ColumnPinning),
        Rc::new(ColumnSizing),
        Rc::new(ColumnResizing),
        Rc::new(ColumnFiltering),
        Rc::new(GlobalFiltering),
        Rc::new(RowSorting),
        Rc::new(ColumnGrouping),
        Rc::new(RowExpanding),
        Rc::new(RowPagination),
    ]
}
