//! FILENAME: core/table-core/src/fns/mod.rs
//! Named processing functions used by the row model stages.
//!
//! - `sorting`: comparators for the sorting stage
//! - `filter`: predicates and filter values for the filtering stage
//! - `aggregation`: group aggregations for the grouping stage
//!
//! Column definitions refer to these by name (`FnRef::Named`), supply their own
//! (`FnRef::Custom`), or let the column pick one from its data (`FnRef::Auto`).

pub mod aggregation;
pub mod filter;
pub mod sorting;

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::{Result, TableError};
use crate::value::CellValue;

pub use aggregation::AggregationFn;
pub use filter::{FilterFn, FilterValue};
pub use sorting::SortingFn;

/// How a column selects one of its processing functions.
pub enum FnRef<F> {
    /// Chosen from the column's first values.
    Auto,
    /// Looked up by name in the table's `ProcessingFns`.
    Named(String),
    Custom(F),
}

impl<F> Default for FnRef<F> {
    fn default() -> Self {
        FnRef::Auto
    }
}

impl<F: Clone> Clone for FnRef<F> {
    fn clone(&self) -> Self {
        match self {
            FnRef::Auto => FnRef::Auto,
            FnRef::Named(name) => FnRef::Named(name.clone()),
            FnRef::Custom(f) => FnRef::Custom(f.clone()),
        }
    }
}

impl<F> fmt::Debug for FnRef<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FnRef::Auto => f.write_str("Auto"),
            FnRef::Named(name) => f.debug_tuple("Named").field(name).finish(),
            FnRef::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl<F: Clone> FnRef<F> {
    pub fn named(name: impl Into<String>) -> Self {
        FnRef::Named(name.into())
    }

    /// Resolves a named or custom reference. `Auto` resolves to `None`; the
    /// column decides it later from its data.
    pub fn resolve(&self, kind: &'static str, registry: &FxHashMap<String, F>) -> Result<Option<F>> {
        match self {
            FnRef::Auto => Ok(None),
            FnRef::Named(name) => registry
                .get(name)
                .cloned()
                .map(Some)
                .ok_or_else(|| TableError::UnknownFunction {
                    kind,
                    name: name.clone(),
                }),
            FnRef::Custom(f) => Ok(Some(f.clone())),
        }
    }
}

/// The table's registries of named processing functions.
///
/// `Default` holds the built-in functions; hosts add their own on top.
#[derive(Clone)]
pub struct ProcessingFns {
    sorting: FxHashMap<String, SortingFn>,
    filter: FxHashMap<String, FilterFn>,
    aggregation: FxHashMap<String, AggregationFn>,
}

impl Default for ProcessingFns {
    fn default() -> Self {
        ProcessingFns {
            sorting: sorting::builtin_sorting_fns(),
            filter: filter::builtin_filter_fns(),
            aggregation: aggregation::builtin_aggregation_fns(),
        }
    }
}

impl ProcessingFns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registries without the built-ins.
    pub fn empty() -> Self {
        ProcessingFns {
            sorting: FxHashMap::default(),
            filter: FxHashMap::default(),
            aggregation: FxHashMap::default(),
        }
    }

    pub fn with_sorting_fn(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&CellValue, &CellValue) -> Ordering + 'static,
    ) -> Self {
        self.sorting.insert(name.into(), Rc::new(f));
        self
    }

    pub fn with_filter_fn(mut self, name: impl Into<String>, f: FilterFn) -> Self {
        self.filter.insert(name.into(), f);
        self
    }

    pub fn with_aggregation_fn(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&[CellValue], &[CellValue]) -> CellValue + 'static,
    ) -> Self {
        self.aggregation.insert(name.into(), Rc::new(f));
        self
    }

    pub fn sorting_fn(&self, name: &str) -> Result<SortingFn> {
        self.sorting
            .get(name)
            .cloned()
            .ok_or_else(|| TableError::UnknownFunction {
                kind: "sorting",
                name: name.to_string(),
            })
    }

    pub fn filter_fn(&self, name: &str) -> Result<FilterFn> {
        self.filter
            .get(name)
            .cloned()
            .ok_or_else(|| TableError::UnknownFunction {
                kind: "filter",
                name: name.to_string(),
            })
    }

    pub fn aggregation_fn(&self, name: &str) -> Result<AggregationFn> {
        self.aggregation
            .get(name)
            .cloned()
            .ok_or_else(|| TableError::UnknownFunction {
                kind: "aggregation",
                name: name.to_string(),
            })
    }

    pub fn sorting_registry(&self) -> &FxHashMap<String, SortingFn> {
        &self.sorting
    }

    pub fn filter_registry(&self) -> &FxHashMap<String, FilterFn> {
        &self.filter
    }

    pub fn aggregation_registry(&self) -> &FxHashMap<String, AggregationFn> {
        &self.aggregation
    }
}

impl fmt::Debug for ProcessingFns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sorting: Vec<_> = self.sorting.keys().collect();
        let mut filter: Vec<_> = self.filter.keys().collect();
        let mut aggregation: Vec<_> = self.aggregation.keys().collect();
        sorting.sort();
        filter.sort();
        aggregation.sort();
        f.debug_struct("ProcessingFns")
            .field("sorting", &sorting)
            .field("filter", &filter)
            .field("aggregation", &aggregation)
            .finish()
    }
}
