//! FILENAME: core/table-core/src/table.rs
//! PURPOSE: The table instance: feature composition, state access and column lookup.
//! CONTEXT: `Table::new` validates the configuration, assembles the initial
//! state from every feature, builds the column tree and lets each feature
//! attach its APIs. Everything derived afterwards (leaf order, header groups,
//! row models) is computed on read and memoized against the state slices it
//! depends on. A table is rebuilt, not reconfigured, when its options change.

use std::fmt;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::column::{flatten_columns, Column, ColumnBuilder};
use crate::error::{Result, TableError};
use crate::feature::TableFeature;
use crate::features::column_ordering::order_columns;
use crate::features::base::core_features;
use crate::fns::ProcessingFns;
use crate::logging::{log_debug, log_info};
use crate::memo::ApiRegistry;
use crate::options::{TableOptions, TableSettings};
use crate::state::{
    not_registered, slice, ExpandedState, PaginationState, SliceKey, StateSlice, StateStore, TableState,
};
use crate::updater::Updater;
use crate::value::RowData;

pub type ColumnList<T> = Rc<Vec<Rc<Column<T>>>>;

pub struct Table<T: RowData> {
    options: TableOptions<T>,
    features: Vec<Rc<dyn TableFeature<T>>>,
    pub(crate) store: StateStore,
    all_columns: ColumnList<T>,
    flat_columns: ColumnList<T>,
    /// Leaf columns in definition order. `leaf_position` indexes this list.
    leaf_columns: ColumnList<T>,
    no_columns: ColumnList<T>,
    columns_by_id: FxHashMap<String, Rc<Column<T>>>,
    row_ids: Rc<Vec<String>>,
    row_apis: ApiRegistry,
    pub(crate) apis: ApiRegistry,
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

impl<T: RowData> Table<T> {
    pub fn new(mut options: TableOptions<T>) -> Result<Self> {
        let mut features = core_features::<T>();
        features.extend(options.features.iter().cloned());

        check_dependencies(&features)?;
        let owners = slice_owners(&features)?;
        check_feature_references(&options.settings, &features)?;
        check_state_keys(&options, &owners)?;

        let mut initial = TableState::default();
        for feature in &features {
            feature.initial_state(&mut initial);
        }
        initial.merge(&options.initial_state);

        for feature in &features {
            feature.default_options(&mut options.settings);
        }

        let row_ids = compute_row_ids(&options)?;

        let all_columns = ColumnBuilder::new(&options, &features, options.settings.debug_columns())
            .build(&options.columns)?;
        let flat_columns = flatten_columns(&all_columns);
        let leaf_columns: Vec<_> = flat_columns
            .iter()
            .filter(|column| column.is_leaf())
            .cloned()
            .collect();
        let columns_by_id = flat_columns
            .iter()
            .map(|column| (column.id.clone(), Rc::clone(column)))
            .collect();

        let store = StateStore::new(initial, &options.state, &options.handlers);

        let mut row_apis = ApiRegistry::new("row", options.settings.debug_rows());
        for feature in &features {
            feature.construct_row(&mut row_apis)?;
        }

        let apis = ApiRegistry::new("table", options.settings.debug_table());
        let mut table = Table {
            options,
            features,
            store,
            all_columns: Rc::new(all_columns),
            flat_columns: Rc::new(flat_columns),
            leaf_columns: Rc::new(leaf_columns),
            no_columns: Rc::new(Vec::new()),
            columns_by_id,
            row_ids: Rc::new(row_ids),
            row_apis,
            apis,
        };

        let features = table.features.clone();
        for feature in &features {
            feature.construct_table(&mut table)?;
        }

        log_info!(
            "TABLE",
            "table ready: {} columns, {} rows, features [{}]",
            table.flat_columns.len(),
            table.row_ids.len(),
            table.feature_names().join(", ")
        );
        Ok(table)
    }
}

fn has_feature<T: RowData>(features: &[Rc<dyn TableFeature<T>>], name: &str) -> bool {
    features.iter().any(|feature| feature.name() == name)
}

fn check_dependencies<T: RowData>(features: &[Rc<dyn TableFeature<T>>]) -> Result<()> {
    for feature in features {
        for &requires in feature.dependencies() {
            if !has_feature(features, requires) {
                return Err(TableError::MissingFeatureDependency {
                    feature: feature.name(),
                    requires,
                });
            }
        }
    }
    Ok(())
}

fn slice_owners<T: RowData>(
    features: &[Rc<dyn TableFeature<T>>],
) -> Result<FxHashMap<SliceKey, &'static str>> {
    let mut owners: FxHashMap<SliceKey, &'static str> = FxHashMap::default();
    for feature in features {
        for &key in feature.state_slices() {
            if let Some(first) = owners.insert(key, feature.name()) {
                return Err(TableError::ConflictingStateSlice {
                    key: key.as_str().to_string(),
                    first,
                    second: feature.name(),
                });
            }
        }
    }
    Ok(owners)
}

fn check_feature_references<T: RowData>(
    settings: &TableSettings,
    features: &[Rc<dyn TableFeature<T>>],
) -> Result<()> {
    for (option, feature) in settings.feature_references() {
        if !has_feature(features, feature) {
            return Err(TableError::FeatureNotRegistered {
                option: option.to_string(),
                feature,
            });
        }
    }
    Ok(())
}

/// Initial values, controlled values and handlers may only name owned slices.
fn check_state_keys<T: RowData>(
    options: &TableOptions<T>,
    owners: &FxHashMap<SliceKey, &'static str>,
) -> Result<()> {
    let sources = [
        ("initialState", options.initial_state.keys()),
        ("state", options.state.keys()),
        ("onChange", options.handlers.keys()),
    ];
    for (source, keys) in sources {
        if let Some(key) = keys.into_iter().find(|key| !owners.contains_key(key)) {
            return Err(TableError::FeatureNotRegistered {
                option: format!("{}.{}", source, key.as_str()),
                feature: key.feature(),
            });
        }
    }

    let custom_keys = options
        .initial_state
        .custom
        .keys()
        .chain(options.state.custom.keys())
        .chain(options.handlers.custom.keys());
    for key in custom_keys {
        let owned = owners
            .keys()
            .any(|owned| matches!(owned, SliceKey::Custom(name) if *name == key.as_str()));
        if !owned {
            return Err(TableError::UnknownStateSlice(key.clone()));
        }
    }
    Ok(())
}

fn compute_row_ids<T: RowData>(options: &TableOptions<T>) -> Result<Vec<String>> {
    let mut seen = FxHashSet::default();
    let mut ids = Vec::with_capacity(options.data.len());
    for (index, original) in options.data.iter().enumerate() {
        let id = match &options.get_row_id {
            Some(get_row_id) => get_row_id(original, index),
            None => index.to_string(),
        };
        if !seen.insert(id.clone()) {
            return Err(TableError::DuplicateRowId(id));
        }
        ids.push(id);
    }
    Ok(ids)
}

// ============================================================================
// ACCESSORS
// ============================================================================

impl<T: RowData> Table<T> {
    pub fn options(&self) -> &TableOptions<T> {
        &self.options
    }

    /// Settings after every feature filled in its defaults.
    pub fn settings(&self) -> &TableSettings {
        &self.options.settings
    }

    pub fn data(&self) -> &Rc<Vec<Rc<T>>> {
        &self.options.data
    }

    pub fn processing_fns(&self) -> &ProcessingFns {
        &self.options.processing_fns
    }

    pub fn feature_names(&self) -> Vec<&'static str> {
        self.features.iter().map(|feature| feature.name()).collect()
    }

    pub fn has_feature(&self, name: &str) -> bool {
        has_feature(&self.features, name)
    }

    pub fn apis(&self) -> &ApiRegistry {
        &self.apis
    }

    /// For features assigning table APIs in `construct_table`.
    pub fn apis_mut(&mut self) -> &mut ApiRegistry {
        &mut self.apis
    }

    pub(crate) fn row_ids(&self) -> &Rc<Vec<String>> {
        &self.row_ids
    }

    /// API registry for a newly materialized row.
    pub(crate) fn new_row_apis(&self) -> ApiRegistry {
        self.row_apis.fresh()
    }

    pub(crate) fn leaf_columns_by_position(&self) -> &ColumnList<T> {
        &self.leaf_columns
    }

    /// A shared empty column list, for neutral getters.
    pub(crate) fn no_columns(&self) -> ColumnList<T> {
        Rc::clone(&self.no_columns)
    }

    // ========================================================================
    // STATE
    // ========================================================================

    /// A copy of the whole current state.
    pub fn get_state(&self) -> TableState {
        self.store.snapshot()
    }

    pub fn get_initial_state(&self) -> &TableState {
        self.store.initial_state()
    }

    /// Current value of slice `S`, or `None` when its feature is not registered.
    pub fn state<S: StateSlice>(&self) -> Option<Rc<S::Value>> {
        self.store.get::<S>()
    }

    /// Current value of slice `S`; an error when its feature is not registered.
    pub(crate) fn require<S: StateSlice>(&self) -> Result<Rc<S::Value>> {
        self.store
            .get::<S>()
            .ok_or_else(|| not_registered(S::KEY))
    }

    pub fn is_controlled<S: StateSlice>(&self) -> bool {
        self.store.is_controlled::<S>()
    }

    /// Raw setter for slice `S`. Feature setters validate before calling this.
    pub fn set_state<S: StateSlice>(&self, updater: impl Into<Updater<S::Value>>) -> Result<()> {
        self.store.set::<S>(updater.into())
    }

    pub fn reset_state<S: StateSlice>(&self, default_override: Option<S::Value>) -> Result<()> {
        self.store.reset::<S>(default_override)
    }

    /// Resets every slice to its initial value.
    pub fn reset(&self) -> Result<()> {
        log_debug!("STATE", "resetting all slices");
        self.store.reset_all()
    }

    pub fn get_custom_state(&self, key: &str) -> Option<Rc<serde_json::Value>> {
        self.store.get_custom(key)
    }

    pub fn set_custom_state(
        &self,
        key: &str,
        updater: impl Into<Updater<serde_json::Value>>,
    ) -> Result<()> {
        self.store.set_custom(key, updater.into())
    }

    pub fn reset_custom_state(&self, key: &str, default_override: Option<serde_json::Value>) -> Result<()> {
        self.store.reset_custom(key, default_override)
    }

    pub(crate) fn auto_reset_page_index(&self) -> Result<()> {
        let settings = self.settings();
        let enabled = settings
            .auto_reset_all
            .or(settings.auto_reset_page_index)
            .unwrap_or(!settings.manual_pagination.unwrap_or(false));
        if !enabled || self.store.get::<slice::Pagination>().is_none() {
            return Ok(());
        }
        let page_index = self
            .store
            .initial::<slice::Pagination>()
            .map_or(0, |p| p.page_index);
        let current = self.store.get::<slice::Pagination>();
        if current.is_some_and(|p| p.page_index == page_index) {
            return Ok(());
        }
        self.store.set::<slice::Pagination>(Updater::with(move |old: &PaginationState| {
            PaginationState { page_index, ..*old }
        }))
    }

    /// Resets the page index after a change to `S`, unless `S` is controlled
    /// and the change only went to the host.
    pub(crate) fn auto_reset_page_index_after<S: StateSlice>(&self) -> Result<()> {
        if self.store.is_controlled::<S>() {
            return Ok(());
        }
        self.auto_reset_page_index()
    }

    pub(crate) fn auto_reset_expanded(&self) -> Result<()> {
        let settings = self.settings();
        let enabled = settings
            .auto_reset_all
            .or(settings.auto_reset_expanded)
            .unwrap_or(!settings.manual_expanding.unwrap_or(false));
        let Some(current) = self.store.get::<slice::Expanded>() else {
            return Ok(());
        };
        if !enabled {
            return Ok(());
        }
        let initial = self
            .store
            .initial::<slice::Expanded>()
            .cloned()
            .unwrap_or_default();
        if *current == initial {
            return Ok(());
        }
        self.store.set::<slice::Expanded>(Updater::Value(initial))
    }

    // ========================================================================
    // COLUMNS
    // ========================================================================

    /// Top-level columns, in definition order.
    pub fn get_all_columns(&self) -> ColumnList<T> {
        Rc::clone(&self.all_columns)
    }

    /// Every column, depth first.
    pub fn get_all_flat_columns(&self) -> ColumnList<T> {
        Rc::clone(&self.flat_columns)
    }

    /// Leaf columns in display order: column order applied, then grouped
    /// columns moved or removed per `grouped_column_mode`.
    pub fn get_all_leaf_columns(&self) -> ColumnList<T> {
        let order = self.store.get::<slice::ColumnOrder>();
        let grouping = self.store.get::<slice::Grouping>();
        let mode = self.settings().grouped_column_mode.unwrap_or_default();
        let compute = |(leaves, order, grouping): &(ColumnList<T>, Option<Rc<Vec<String>>>, Option<Rc<Vec<String>>>)| {
            Rc::new(order_columns(
                leaves,
                order.as_deref().map(Vec::as_slice).unwrap_or_default(),
                grouping.as_deref().map(Vec::as_slice).unwrap_or_default(),
                mode,
            ))
        };
        self.apis
            .memo(
                "get_all_leaf_columns",
                (Rc::clone(&self.leaf_columns), order.clone(), grouping.clone()),
                &compute,
            )
            .unwrap_or_else(|| compute(&(Rc::clone(&self.leaf_columns), order, grouping)))
    }

    pub fn get_column(&self, id: &str) -> Option<Rc<Column<T>>> {
        self.columns_by_id.get(id).cloned()
    }

    /// Like `get_column`, but an unknown id is an error.
    pub fn column(&self, id: &str) -> Result<Rc<Column<T>>> {
        self.get_column(id)
            .ok_or_else(|| TableError::UnknownColumn(id.to_string()))
    }

    pub(crate) fn expanded_state(&self) -> Option<Rc<ExpandedState>> {
        self.store.get::<slice::Expanded>()
    }
}

impl<T: RowData> fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("features", &self.feature_names())
            .field("columns", &self.all_columns)
            .field("rows", &self.row_ids.len())
            .field("state", &self.store)
            .finish()
    }
}
