//! FILENAME: core/table-core/src/options.rs
//! PURPOSE: Table construction options.
//! CONTEXT: `TableSettings` is the serializable part (flags, modes, overrides)
//! a host may load from JSON. `TableOptions` adds what cannot be serialized:
//! data, column definitions, features, callbacks and function registries.
//!
//! Feature-specific settings are `Option`s. `None` means "not set by the
//! caller"; the owning feature fills in its default during construction, and
//! setting one without registering its feature is a configuration error.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::column::ColumnDef;
use crate::feature::TableFeature;
use crate::fns::ProcessingFns;
use crate::state::{StateHandlers, StateSlice, TableState};
use crate::value::RowData;

// ============================================================================
// MODES
// ============================================================================

/// When a resize gesture writes to `column_sizing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ColumnResizeMode {
    /// On every pointer move.
    OnChange,
    /// Once, when the gesture ends.
    #[default]
    OnEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ColumnResizeDirection {
    #[default]
    Ltr,
    Rtl,
}

/// What happens to grouped columns in the leaf column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum GroupedColumnMode {
    /// Grouped columns move to the front, in grouping order.
    #[default]
    Reorder,
    /// Grouped columns are dropped from the leaf order.
    Remove,
    /// Grouped columns stay where they are.
    Keep,
}

// ============================================================================
// SETTINGS
// ============================================================================

pub const DEFAULT_COLUMN_SIZE: f64 = 150.0;
pub const DEFAULT_COLUMN_MIN_SIZE: f64 = 20.0;
pub const DEFAULT_COLUMN_MAX_SIZE: f64 = f64::MAX;

/// Size bounds applied to columns that do not declare their own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnDefaults {
    pub size: f64,
    pub min_size: f64,
    pub max_size: f64,
}

impl Default for ColumnDefaults {
    fn default() -> Self {
        ColumnDefaults {
            size: DEFAULT_COLUMN_SIZE,
            min_size: DEFAULT_COLUMN_MIN_SIZE,
            max_size: DEFAULT_COLUMN_MAX_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableSettings {
    // Column resizing
    pub column_resize_mode: Option<ColumnResizeMode>,
    pub column_resize_direction: Option<ColumnResizeDirection>,
    pub enable_column_resizing: Option<bool>,

    // Column visibility
    pub enable_hiding: Option<bool>,

    // Column pinning
    pub enable_column_pinning: Option<bool>,
    pub enable_pinning: Option<bool>,

    // Column filtering
    pub enable_filters: Option<bool>,
    pub enable_column_filters: Option<bool>,
    pub manual_filtering: Option<bool>,

    // Global filtering
    pub enable_global_filter: Option<bool>,
    /// Name of the filter function the global filter uses. `None` picks one automatically.
    pub global_filter_fn: Option<String>,

    // Row sorting
    pub enable_sorting: Option<bool>,
    pub enable_multi_sort: Option<bool>,
    pub enable_sorting_removal: Option<bool>,
    pub enable_multi_remove: Option<bool>,
    pub sort_desc_first: Option<bool>,
    pub max_multi_sort_col_count: Option<usize>,
    pub manual_sorting: Option<bool>,

    // Column grouping
    pub enable_grouping: Option<bool>,
    pub manual_grouping: Option<bool>,
    pub grouped_column_mode: Option<GroupedColumnMode>,

    // Row expanding
    pub enable_expanding: Option<bool>,
    pub manual_expanding: Option<bool>,
    pub auto_reset_expanded: Option<bool>,
    /// When false, pages are cut from top-level rows and expanded afterwards.
    pub paginate_expanded_rows: Option<bool>,

    // Row pagination
    pub manual_pagination: Option<bool>,
    /// Server-side page count. Replaces the computed one.
    pub page_count: Option<usize>,
    /// Server-side row count. Replaces the pre-pagination row count.
    pub row_count: Option<usize>,
    pub auto_reset_page_index: Option<bool>,

    /// Overrides every `auto_reset_*` setting.
    pub auto_reset_all: Option<bool>,

    pub default_column: ColumnDefaults,

    pub debug_all: bool,
    pub debug_table: bool,
    pub debug_columns: bool,
    pub debug_headers: bool,
    pub debug_rows: bool,
}

impl TableSettings {
    /// Every set option, paired with the feature that owns it.
    pub fn feature_references(&self) -> Vec<(&'static str, &'static str)> {
        let mut refs = Vec::new();
        let mut note = |set: bool, option: &'static str, feature: &'static str| {
            if set {
                refs.push((option, feature));
            }
        };

        note(self.column_resize_mode.is_some(), "columnResizeMode", "ColumnResizing");
        note(self.column_resize_direction.is_some(), "columnResizeDirection", "ColumnResizing");
        note(self.enable_column_resizing.is_some(), "enableColumnResizing", "ColumnResizing");
        note(self.enable_hiding.is_some(), "enableHiding", "ColumnVisibility");
        note(self.enable_column_pinning.is_some(), "enableColumnPinning", "ColumnPinning");
        note(self.enable_pinning.is_some(), "enablePinning", "ColumnPinning");
        note(self.enable_filters.is_some(), "enableFilters", "ColumnFiltering");
        note(self.enable_column_filters.is_some(), "enableColumnFilters", "ColumnFiltering");
        note(self.manual_filtering.is_some(), "manualFiltering", "ColumnFiltering");
        note(self.enable_global_filter.is_some(), "enableGlobalFilter", "GlobalFiltering");
        note(self.global_filter_fn.is_some(), "globalFilterFn", "GlobalFiltering");
        note(self.enable_sorting.is_some(), "enableSorting", "RowSorting");
        note(self.enable_multi_sort.is_some(), "enableMultiSort", "RowSorting");
        note(self.enable_sorting_removal.is_some(), "enableSortingRemoval", "RowSorting");
        note(self.enable_multi_remove.is_some(), "enableMultiRemove", "RowSorting");
        note(self.sort_desc_first.is_some(), "sortDescFirst", "RowSorting");
        note(self.max_multi_sort_col_count.is_some(), "maxMultiSortColCount", "RowSorting");
        note(self.manual_sorting.is_some(), "manualSorting", "RowSorting");
        note(self.enable_grouping.is_some(), "enableGrouping", "ColumnGrouping");
        note(self.manual_grouping.is_some(), "manualGrouping", "ColumnGrouping");
        note(self.grouped_column_mode.is_some(), "groupedColumnMode", "ColumnGrouping");
        note(self.enable_expanding.is_some(), "enableExpanding", "RowExpanding");
        note(self.manual_expanding.is_some(), "manualExpanding", "RowExpanding");
        note(self.auto_reset_expanded.is_some(), "autoResetExpanded", "RowExpanding");
        note(self.paginate_expanded_rows.is_some(), "paginateExpandedRows", "RowExpanding");
        note(self.manual_pagination.is_some(), "manualPagination", "RowPagination");
        note(self.page_count.is_some(), "pageCount", "RowPagination");
        note(self.row_count.is_some(), "rowCount", "RowPagination");
        note(self.auto_reset_page_index.is_some(), "autoResetPageIndex", "RowPagination");

        refs
    }

    pub fn debug_table(&self) -> bool {
        self.debug_all || self.debug_table
    }

    pub fn debug_columns(&self) -> bool {
        self.debug_all || self.debug_columns
    }

    pub fn debug_headers(&self) -> bool {
        self.debug_all || self.debug_headers
    }

    pub fn debug_rows(&self) -> bool {
        self.debug_all || self.debug_rows
    }
}

// ============================================================================
// OPTIONS
// ============================================================================

/// Computes a stable row id from a record and its position in `data`.
pub type GetRowId<T> = Rc<dyn Fn(&T, usize) -> String>;

pub struct TableOptions<T: RowData> {
    pub columns: Vec<ColumnDef<T>>,
    /// Shared records. Rows reference them, never copy them.
    pub data: Rc<Vec<Rc<T>>>,
    /// Caller features, registered after the core features in this order.
    pub features: Vec<Rc<dyn TableFeature<T>>>,
    pub processing_fns: ProcessingFns,
    pub initial_state: TableState,
    /// Controlled slice values.
    pub state: TableState,
    pub handlers: StateHandlers,
    pub get_row_id: Option<GetRowId<T>>,
    pub settings: TableSettings,
}

impl<T: RowData> TableOptions<T> {
    pub fn new(columns: Vec<ColumnDef<T>>, data: Vec<T>) -> Self {
        Self::from_shared(columns, Rc::new(data.into_iter().map(Rc::new).collect()))
    }

    pub fn from_shared(columns: Vec<ColumnDef<T>>, data: Rc<Vec<Rc<T>>>) -> Self {
        TableOptions {
            columns,
            data,
            features: Vec::new(),
            processing_fns: ProcessingFns::default(),
            initial_state: TableState::default(),
            state: TableState::default(),
            handlers: StateHandlers::default(),
            get_row_id: None,
            settings: TableSettings::default(),
        }
    }

    pub fn feature(mut self, feature: impl TableFeature<T> + 'static) -> Self {
        self.features.push(Rc::new(feature));
        self
    }

    pub fn features(mut self, features: impl IntoIterator<Item = Rc<dyn TableFeature<T>>>) -> Self {
        self.features.extend(features);
        self
    }

    pub fn initial_state(mut self, state: TableState) -> Self {
        self.initial_state = state;
        self
    }

    /// Controlled values. A slice is only controlled once it also has a handler.
    pub fn state(mut self, state: TableState) -> Self {
        self.state = state;
        self
    }

    /// Registers the change handler that makes slice `S` controlled.
    pub fn on_change<S: StateSlice>(mut self, on_change: impl Fn(S::Value) + 'static) -> Self {
        *S::handler_mut(&mut self.handlers) = Some(Rc::new(on_change));
        self
    }

    pub fn on_custom_change(
        mut self,
        key: impl Into<String>,
        on_change: impl Fn(serde_json::Value) + 'static,
    ) -> Self {
        self.handlers.custom.insert(key.into(), Rc::new(on_change));
        self
    }

    pub fn get_row_id(mut self, get_row_id: impl Fn(&T, usize) -> String + 'static) -> Self {
        self.get_row_id = Some(Rc::new(get_row_id));
        self
    }

    pub fn settings(mut self, settings: TableSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn processing_fns(mut self, processing_fns: ProcessingFns) -> Self {
        self.processing_fns = processing_fns;
        self
    }
}

impl<T: RowData> fmt::Debug for TableOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableOptions")
            .field("columns", &self.columns.len())
            .field("rows", &self.data.len())
            .field(
                "features",
                &self.features.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .field("initial_state", &self.initial_state)
            .field("state", &self.state)
            .field("handlers", &self.handlers)
            .field("settings", &self.settings)
            .finish()
    }
}
