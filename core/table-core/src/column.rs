//! FILENAME: core/table-core/src/column.rs
//! PURPOSE: Column definitions and the column tree built from them.
//! CONTEXT: `ColumnDef` is what the caller writes. `Column` is the normalized
//! node: resolved id, depth, parent back-reference, ordered children, the
//! accessor, and the processing functions its features resolved. Mutable
//! per-column facts (size, visibility, pin side, order) are never stored here;
//! the feature getters read them from table state.

use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashSet;

use crate::error::{Result, TableError};
use crate::feature::TableFeature;
use crate::fns::{AggregationFn, FilterFn, FnRef, SortingFn};
use crate::logging::log_debug;
use crate::memo::{ApiRegistry, Dep};
use crate::options::TableOptions;
use crate::value::{CellValue, RowData};

pub type AccessorFn<T> = Rc<dyn Fn(&T, usize) -> std::result::Result<CellValue, String>>;

/// How a leaf column reads its value from a record.
pub enum Accessor<T> {
    /// Key path into the record, e.g. `["name", "first"]`.
    ByPath(Vec<String>),
    ByFunction(AccessorFn<T>),
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        match self {
            Accessor::ByPath(path) => Accessor::ByPath(path.clone()),
            Accessor::ByFunction(f) => Accessor::ByFunction(Rc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::ByPath(path) => f.debug_tuple("ByPath").field(path).finish(),
            Accessor::ByFunction(_) => f.write_str("ByFunction(..)"),
        }
    }
}

impl<T: RowData> Accessor<T> {
    pub fn read(&self, original: &T, index: usize) -> std::result::Result<CellValue, String> {
        match self {
            Accessor::ByPath(path) => original.value_at(path),
            Accessor::ByFunction(f) => f(original, index),
        }
    }
}

/// Which slice of the visible leaf columns a positional query refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColumnPosition {
    #[default]
    All,
    Left,
    Center,
    Right,
}

impl Dep for ColumnPosition {
    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

// ============================================================================
// COLUMN DEFINITIONS
// ============================================================================

/// A column as declared by the caller. Group columns carry `columns`.
pub struct ColumnDef<T> {
    pub id: Option<String>,
    /// Dotted key path; also the source of the id when `id` is unset.
    pub accessor_key: Option<String>,
    pub accessor_fn: Option<AccessorFn<T>>,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub columns: Vec<ColumnDef<T>>,

    pub size: Option<f64>,
    pub min_size: Option<f64>,
    pub max_size: Option<f64>,
    pub enable_resizing: Option<bool>,

    pub enable_hiding: Option<bool>,
    pub enable_pinning: Option<bool>,

    pub enable_sorting: Option<bool>,
    pub enable_multi_sort: Option<bool>,
    pub sort_desc_first: Option<bool>,
    /// Flips the comparator result, e.g. for rankings where lower is better.
    pub invert_sorting: bool,
    pub sorting_fn: FnRef<SortingFn>,

    pub enable_column_filter: Option<bool>,
    pub enable_global_filter: Option<bool>,
    pub filter_fn: FnRef<FilterFn>,

    pub enable_grouping: Option<bool>,
    pub aggregation_fn: FnRef<AggregationFn>,
}

impl<T> Default for ColumnDef<T> {
    fn default() -> Self {
        ColumnDef {
            id: None,
            accessor_key: None,
            accessor_fn: None,
            header: None,
            footer: None,
            columns: Vec::new(),
            size: None,
            min_size: None,
            max_size: None,
            enable_resizing: None,
            enable_hiding: None,
            enable_pinning: None,
            enable_sorting: None,
            enable_multi_sort: None,
            sort_desc_first: None,
            invert_sorting: false,
            sorting_fn: FnRef::Auto,
            enable_column_filter: None,
            enable_global_filter: None,
            filter_fn: FnRef::Auto,
            enable_grouping: None,
            aggregation_fn: FnRef::Auto,
        }
    }
}

impl<T> Clone for ColumnDef<T> {
    fn clone(&self) -> Self {
        ColumnDef {
            id: self.id.clone(),
            accessor_key: self.accessor_key.clone(),
            accessor_fn: self.accessor_fn.clone(),
            header: self.header.clone(),
            footer: self.footer.clone(),
            columns: self.columns.clone(),
            size: self.size,
            min_size: self.min_size,
            max_size: self.max_size,
            enable_resizing: self.enable_resizing,
            enable_hiding: self.enable_hiding,
            enable_pinning: self.enable_pinning,
            enable_sorting: self.enable_sorting,
            enable_multi_sort: self.enable_multi_sort,
            sort_desc_first: self.sort_desc_first,
            invert_sorting: self.invert_sorting,
            sorting_fn: self.sorting_fn.clone(),
            enable_column_filter: self.enable_column_filter,
            enable_global_filter: self.enable_global_filter,
            filter_fn: self.filter_fn.clone(),
            enable_grouping: self.enable_grouping,
            aggregation_fn: self.aggregation_fn.clone(),
        }
    }
}

impl<T> fmt::Debug for ColumnDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.id)
            .field("accessor_key", &self.accessor_key)
            .field("accessor_fn", &self.accessor_fn.is_some())
            .field("header", &self.header)
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> ColumnDef<T> {
    /// A leaf column reading `key` (dotted path) from the record.
    pub fn accessor(key: impl Into<String>) -> Self {
        ColumnDef {
            accessor_key: Some(key.into()),
            ..Default::default()
        }
    }

    /// A leaf column computed from the record.
    pub fn accessor_fn<V: Into<CellValue> + 'static>(id: impl Into<String>, f: impl Fn(&T) -> V + 'static) -> Self {
        ColumnDef {
            id: Some(id.into()),
            accessor_fn: Some(Rc::new(move |original: &T, _index: usize| {
                Ok::<CellValue, String>(f(original).into())
            })),
            ..Default::default()
        }
    }

    /// A leaf column whose accessor can fail. A failure marks only that cell unavailable.
    pub fn try_accessor_fn(
        id: impl Into<String>,
        f: impl Fn(&T, usize) -> std::result::Result<CellValue, String> + 'static,
    ) -> Self {
        ColumnDef {
            id: Some(id.into()),
            accessor_fn: Some(Rc::new(f)),
            ..Default::default()
        }
    }

    /// A leaf column without data, e.g. for row actions.
    pub fn display(id: impl Into<String>) -> Self {
        ColumnDef {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// A header grouping `columns`. The id defaults to the header text.
    pub fn group(header: impl Into<String>, columns: Vec<ColumnDef<T>>) -> Self {
        ColumnDef {
            header: Some(header.into()),
            columns,
            ..Default::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn min_size(mut self, min_size: f64) -> Self {
        self.min_size = Some(min_size);
        self
    }

    pub fn max_size(mut self, max_size: f64) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn enable_resizing(mut self, enable: bool) -> Self {
        self.enable_resizing = Some(enable);
        self
    }

    pub fn enable_hiding(mut self, enable: bool) -> Self {
        self.enable_hiding = Some(enable);
        self
    }

    pub fn enable_pinning(mut self, enable: bool) -> Self {
        self.enable_pinning = Some(enable);
        self
    }

    pub fn enable_sorting(mut self, enable: bool) -> Self {
        self.enable_sorting = Some(enable);
        self
    }

    pub fn enable_multi_sort(mut self, enable: bool) -> Self {
        self.enable_multi_sort = Some(enable);
        self
    }

    pub fn sort_desc_first(mut self, desc_first: bool) -> Self {
        self.sort_desc_first = Some(desc_first);
        self
    }

    pub fn invert_sorting(mut self, invert: bool) -> Self {
        self.invert_sorting = invert;
        self
    }

    pub fn sorting_fn(mut self, name: impl Into<String>) -> Self {
        self.sorting_fn = FnRef::Named(name.into());
        self
    }

    pub fn custom_sorting_fn(
        mut self,
        f: impl Fn(&CellValue, &CellValue) -> std::cmp::Ordering + 'static,
    ) -> Self {
        self.sorting_fn = FnRef::Custom(Rc::new(f));
        self
    }

    pub fn enable_column_filter(mut self, enable: bool) -> Self {
        self.enable_column_filter = Some(enable);
        self
    }

    pub fn enable_global_filter(mut self, enable: bool) -> Self {
        self.enable_global_filter = Some(enable);
        self
    }

    pub fn filter_fn(mut self, name: impl Into<String>) -> Self {
        self.filter_fn = FnRef::Named(name.into());
        self
    }

    pub fn custom_filter_fn(mut self, f: FilterFn) -> Self {
        self.filter_fn = FnRef::Custom(f);
        self
    }

    pub fn enable_grouping(mut self, enable: bool) -> Self {
        self.enable_grouping = Some(enable);
        self
    }

    pub fn aggregation_fn(mut self, name: impl Into<String>) -> Self {
        self.aggregation_fn = FnRef::Named(name.into());
        self
    }

    pub fn custom_aggregation_fn(
        mut self,
        f: impl Fn(&[CellValue], &[CellValue]) -> CellValue + 'static,
    ) -> Self {
        self.aggregation_fn = FnRef::Custom(Rc::new(f));
        self
    }

    /// The stable id: explicit id, else the accessor key with `.` replaced
    /// by `_`, else the header text.
    pub fn resolve_id(&self) -> Result<String> {
        if let Some(id) = &self.id {
            return Ok(id.clone());
        }
        if let Some(key) = &self.accessor_key {
            return Ok(key.replace('.', "_"));
        }
        if let Some(header) = &self.header {
            return Ok(header.clone());
        }
        let described = if self.accessor_fn.is_some() {
            "column with an accessor function"
        } else if self.columns.is_empty() {
            "column without accessor or header"
        } else {
            "group column without header"
        };
        Err(TableError::MissingColumnId(described.to_string()))
    }

    fn build_accessor(&self) -> Option<Accessor<T>> {
        if let Some(f) = &self.accessor_fn {
            return Some(Accessor::ByFunction(Rc::clone(f)));
        }
        self.accessor_key
            .as_ref()
            .map(|key| Accessor::ByPath(key.split('.').map(str::to_string).collect()))
    }

    fn without_children(&self) -> Self {
        ColumnDef {
            id: self.id.clone(),
            accessor_key: self.accessor_key.clone(),
            accessor_fn: self.accessor_fn.clone(),
            header: self.header.clone(),
            footer: self.footer.clone(),
            columns: Vec::new(),
            size: self.size,
            min_size: self.min_size,
            max_size: self.max_size,
            enable_resizing: self.enable_resizing,
            enable_hiding: self.enable_hiding,
            enable_pinning: self.enable_pinning,
            enable_sorting: self.enable_sorting,
            enable_multi_sort: self.enable_multi_sort,
            sort_desc_first: self.sort_desc_first,
            invert_sorting: self.invert_sorting,
            sorting_fn: self.sorting_fn.clone(),
            enable_column_filter: self.enable_column_filter,
            enable_global_filter: self.enable_global_filter,
            filter_fn: self.filter_fn.clone(),
            enable_grouping: self.enable_grouping,
            aggregation_fn: self.aggregation_fn.clone(),
        }
    }
}

// ============================================================================
// COLUMNS
// ============================================================================

/// A node of the table's column tree.
pub struct Column<T> {
    pub id: String,
    pub depth: usize,
    /// The definition, without its child definitions.
    pub column_def: ColumnDef<T>,
    pub accessor: Option<Accessor<T>>,
    parent: Weak<Column<T>>,
    pub columns: Vec<Rc<Column<T>>>,
    /// Index of this leaf's value in `Row::values`. `None` for group columns.
    pub leaf_position: Option<usize>,
    pub sorting_fn: Option<SortingFn>,
    pub filter_fn: Option<FilterFn>,
    pub aggregation_fn: Option<AggregationFn>,
    pub apis: ApiRegistry,
}

impl<T> Column<T> {
    pub fn parent(&self) -> Option<Rc<Column<T>>> {
        self.parent.upgrade()
    }

    pub fn is_leaf(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn has_accessor(&self) -> bool {
        self.accessor.is_some()
    }

    pub fn header_text(&self) -> &str {
        self.column_def.header.as_deref().unwrap_or(&self.id)
    }
}

impl<T: 'static> Column<T> {
    /// This column and all of its descendants, depth first.
    pub fn get_flat_columns(self: &Rc<Self>) -> Rc<Vec<Rc<Column<T>>>> {
        let compute = |_: &()| {
            let mut flat = vec![Rc::clone(self)];
            for child in &self.columns {
                flat.extend(child.get_flat_columns().iter().cloned());
            }
            Rc::new(flat)
        };
        self.apis
            .memo("get_flat_columns", (), &compute)
            .unwrap_or_else(|| compute(&()))
    }

    /// The leaf columns under this column, or the column itself when it is a leaf.
    pub fn get_leaf_columns(self: &Rc<Self>) -> Rc<Vec<Rc<Column<T>>>> {
        let compute = |_: &()| {
            if self.is_leaf() {
                return Rc::new(vec![Rc::clone(self)]);
            }
            let leaves = self
                .columns
                .iter()
                .flat_map(|child| child.get_leaf_columns().iter().cloned().collect::<Vec<_>>())
                .collect();
            Rc::new(leaves)
        };
        self.apis
            .memo("get_leaf_columns", (), &compute)
            .unwrap_or_else(|| compute(&()))
    }
}

impl<T: RowData> Column<T> {
    /// Reads this column's value from a record.
    ///
    /// Columns without an accessor are empty. An accessor failure yields
    /// `CellValue::Unavailable` for this cell only.
    pub fn read_value(&self, original: &T, index: usize) -> CellValue {
        let Some(accessor) = &self.accessor else {
            return CellValue::Empty;
        };
        match accessor.read(original, index) {
            Ok(value) => value,
            Err(reason) => {
                log_debug!("COLUMNS", "column '{}' row {}: {}", self.id, index, reason);
                CellValue::Unavailable
            }
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("depth", &self.depth)
            .field("leaf_position", &self.leaf_position)
            .field("columns", &self.columns)
            .finish()
    }
}

// ============================================================================
// TREE CONSTRUCTION
// ============================================================================

/// Builds the column tree, running every feature's `construct_column`.
pub(crate) struct ColumnBuilder<'a, T: RowData> {
    options: &'a TableOptions<T>,
    features: &'a [Rc<dyn TableFeature<T>>],
    debug: bool,
    next_leaf: usize,
    seen: FxHashSet<String>,
    error: Option<TableError>,
}

impl<'a, T: RowData> ColumnBuilder<'a, T> {
    pub(crate) fn new(
        options: &'a TableOptions<T>,
        features: &'a [Rc<dyn TableFeature<T>>],
        debug: bool,
    ) -> Self {
        ColumnBuilder {
            options,
            features,
            debug,
            next_leaf: 0,
            seen: FxHashSet::default(),
            error: None,
        }
    }

    pub(crate) fn build(mut self, defs: &[ColumnDef<T>]) -> Result<Vec<Rc<Column<T>>>> {
        let columns = self.build_level(defs, 0, &Weak::new());
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(columns),
        }
    }

    fn build_level(
        &mut self,
        defs: &[ColumnDef<T>],
        depth: usize,
        parent: &Weak<Column<T>>,
    ) -> Vec<Rc<Column<T>>> {
        let mut columns = Vec::with_capacity(defs.len());
        for def in defs {
            match self.build_column(def, depth, parent) {
                Some(column) => columns.push(column),
                None => break,
            }
        }
        columns
    }

    fn fail(&mut self, err: TableError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn build_column(
        &mut self,
        def: &ColumnDef<T>,
        depth: usize,
        parent: &Weak<Column<T>>,
    ) -> Option<Rc<Column<T>>> {
        if self.error.is_some() {
            return None;
        }
        let id = match def.resolve_id() {
            Ok(id) => id,
            Err(err) => {
                self.fail(err);
                return None;
            }
        };
        if !self.seen.insert(id.clone()) {
            self.fail(TableError::DuplicateColumnId(id));
            return None;
        }

        // Children need the parent's Weak before the parent exists.
        let column = Rc::new_cyclic(|weak_self| {
            let columns = self.build_level(&def.columns, depth + 1, weak_self);
            let leaf_position = if def.columns.is_empty() {
                self.next_leaf += 1;
                Some(self.next_leaf - 1)
            } else {
                None
            };
            let mut column = Column {
                id,
                depth,
                column_def: def.without_children(),
                accessor: def.build_accessor(),
                parent: parent.clone(),
                columns,
                leaf_position,
                sorting_fn: None,
                filter_fn: None,
                aggregation_fn: None,
                apis: ApiRegistry::new("column", self.debug),
            };
            for feature in self.features {
                if let Err(err) = feature.construct_column(&mut column, self.options) {
                    self.fail(err);
                    break;
                }
            }
            column
        });
        Some(column)
    }
}

/// Depth-first flattening of a column forest.
pub(crate) fn flatten_columns<T>(columns: &[Rc<Column<T>>]) -> Vec<Rc<Column<T>>> {
    let mut flat = Vec::new();
    for column in columns {
        flat.push(Rc::clone(column));
        flat.extend(flatten_columns(&column.columns));
    }
    flat
}
