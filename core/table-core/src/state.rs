//! FILENAME: core/table-core/src/state.rs
//! PURPOSE: Table state slices and the store that owns them.
//! CONTEXT: Every feature owns one or more named slices of `TableState`. The
//! store holds each enabled slice as a `Slot`, either internal (the store owns
//! the value) or controlled (the host owns it and is told about changes). All
//! mutation goes through `StateStore::set`, which resolves an `Updater` and
//! then branches on the slot tag.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};
use crate::fns::filter::FilterValue;
use crate::logging::log_debug;
use crate::updater::Updater;

// ============================================================================
// SLICE VALUES
// ============================================================================

/// Column id -> visible. Columns missing from the map are visible.
pub type ColumnVisibilityState = FxHashMap<String, bool>;

/// Preferred leaf column order. Ids not listed keep their definition order
/// after the listed ones.
pub type ColumnOrderState = Vec<String>;

/// Which side a column is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnPinningPosition {
    Left,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnPinningState {
    pub left: Vec<String>,
    pub right: Vec<String>,
}

/// Column id -> size override.
pub type ColumnSizingState = FxHashMap<String, f64>;

/// Bookkeeping for an in-progress column resize gesture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnSizingInfoState {
    pub start_offset: Option<f64>,
    pub start_size: Option<f64>,
    pub delta_offset: Option<f64>,
    pub delta_percentage: Option<f64>,
    pub is_resizing_column: Option<String>,
    /// Leaf column sizes captured when the gesture started.
    pub column_sizing_start: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub id: String,
    pub value: FilterValue,
}

pub type ColumnFiltersState = Vec<ColumnFilter>;

/// The global filter value. Inactive while it is a falsey value.
pub type GlobalFilterState = FilterValue;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSort {
    pub id: String,
    pub desc: bool,
}

impl ColumnSort {
    pub fn asc(id: impl Into<String>) -> Self {
        ColumnSort {
            id: id.into(),
            desc: false,
        }
    }

    pub fn desc(id: impl Into<String>) -> Self {
        ColumnSort {
            id: id.into(),
            desc: true,
        }
    }
}

pub type SortingState = Vec<ColumnSort>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Ordered list of column ids rows are grouped by.
pub type GroupingState = Vec<String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpandedState {
    /// Every expandable row is expanded.
    All,
    /// Row id -> expanded.
    Rows(FxHashMap<String, bool>),
}

impl Default for ExpandedState {
    fn default() -> Self {
        ExpandedState::Rows(FxHashMap::default())
    }
}

impl ExpandedState {
    pub fn is_expanded(&self, row_id: &str) -> bool {
        match self {
            ExpandedState::All => true,
            ExpandedState::Rows(rows) => rows.get(row_id).copied().unwrap_or(false),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ExpandedState::All => false,
            ExpandedState::Rows(rows) => rows.is_empty(),
        }
    }
}

pub const DEFAULT_PAGE_INDEX: usize = 0;
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        PaginationState {
            page_index: DEFAULT_PAGE_INDEX,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// ============================================================================
// SLOTS
// ============================================================================

/// Host callback for a controlled slice. Receives the resolved next value.
pub type OnChange<S> = Rc<dyn Fn(S)>;

/// Ownership of one slice.
pub enum Slot<S> {
    Internal(Rc<S>),
    Controlled { value: Rc<S>, on_change: OnChange<S> },
}

impl<S> Slot<S> {
    pub fn value(&self) -> &Rc<S> {
        match self {
            Slot::Internal(value) => value,
            Slot::Controlled { value, .. } => value,
        }
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self, Slot::Controlled { .. })
    }
}

fn make_slot<S: Clone>(
    initial: Option<&S>,
    value: Option<&S>,
    on_change: Option<&OnChange<S>>,
) -> Option<Slot<S>> {
    let initial = initial?;
    let value = Rc::new(value.unwrap_or(initial).clone());
    Some(match on_change {
        Some(on_change) => Slot::Controlled {
            value,
            on_change: Rc::clone(on_change),
        },
        None => Slot::Internal(value),
    })
}

/// A typed, statically known state slice.
///
/// Implemented by the marker types in [`slice`].
pub trait StateSlice: 'static {
    type Value: Clone + Default + PartialEq + fmt::Debug + 'static;
    const KEY: SliceKey;

    fn field(state: &TableState) -> &Option<Self::Value>;
    fn field_mut(state: &mut TableState) -> &mut Option<Self::Value>;
    fn slot(store: &StateStore) -> &RefCell<Option<Slot<Self::Value>>>;
    fn handler(handlers: &StateHandlers) -> Option<&OnChange<Self::Value>>;
    fn handler_mut(handlers: &mut StateHandlers) -> &mut Option<OnChange<Self::Value>>;
}

pub(crate) fn not_registered(key: SliceKey) -> TableError {
    TableError::FeatureNotRegistered {
        option: key.as_str().to_string(),
        feature: key.feature(),
    }
}

fn is_empty_map(map: &FxHashMap<String, serde_json::Value>) -> bool {
    map.is_empty()
}

// ============================================================================
// SLICE TABLE
// ============================================================================

macro_rules! state_slices {
    ($(
        $marker:ident {
            field: $field:ident,
            value: $value:ty,
            key: $key:literal,
            feature: $feature:literal,
            handler: $handler:ident $(,)?
        }
    )*) => {
        /// Name of a state slice.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum SliceKey {
            $($marker,)*
            /// A slice owned by a caller-defined feature. Values are JSON.
            Custom(&'static str),
        }

        impl SliceKey {
            pub fn as_str(&self) -> &'static str {
                match *self {
                    $(SliceKey::$marker => $key,)*
                    SliceKey::Custom(name) => name,
                }
            }

            /// The stock feature that owns this slice.
            pub fn feature(&self) -> &'static str {
                match *self {
                    $(SliceKey::$marker => $feature,)*
                    SliceKey::Custom(name) => name,
                }
            }

            /// Whether `state` carries a value for this slice.
            pub fn is_set_in(&self, state: &TableState) -> bool {
                match *self {
                    $(SliceKey::$marker => state.$field.is_some(),)*
                    SliceKey::Custom(name) => state.custom.contains_key(name),
                }
            }
        }

        /// Marker types naming each built-in slice, for `Table::state::<S>()` and friends.
        pub mod slice {
            use super::*;

            $(
                #[derive(Debug, Clone, Copy)]
                pub struct $marker;

                impl StateSlice for $marker {
                    type Value = $value;
                    const KEY: SliceKey = SliceKey::$marker;

                    fn field(state: &TableState) -> &Option<$value> {
                        &state.$field
                    }

                    fn field_mut(state: &mut TableState) -> &mut Option<$value> {
                        &mut state.$field
                    }

                    fn slot(store: &StateStore) -> &RefCell<Option<Slot<$value>>> {
                        &store.$field
                    }

                    fn handler(handlers: &StateHandlers) -> Option<&OnChange<$value>> {
                        handlers.$handler.as_ref()
                    }

                    fn handler_mut(handlers: &mut StateHandlers) -> &mut Option<OnChange<$value>> {
                        &mut handlers.$handler
                    }
                }
            )*
        }

        /// The full table state. A field is `Some` exactly when its feature is enabled.
        ///
        /// Also used, partially filled, for initial state and controlled overrides.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default, rename_all = "camelCase")]
        pub struct TableState {
            $(
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $field: Option<$value>,
            )*
            #[serde(skip_serializing_if = "is_empty_map")]
            pub custom: FxHashMap<String, serde_json::Value>,
        }

        impl TableState {
            /// Keys of every built-in slice carrying a value.
            pub fn keys(&self) -> Vec<SliceKey> {
                let mut keys = Vec::new();
                $(
                    if self.$field.is_some() {
                        keys.push(SliceKey::$marker);
                    }
                )*
                keys
            }

            /// Overwrites every slice `other` carries.
            pub fn merge(&mut self, other: &TableState) {
                $(
                    if let Some(value) = &other.$field {
                        self.$field = Some(value.clone());
                    }
                )*
                for (key, value) in &other.custom {
                    self.custom.insert(key.clone(), value.clone());
                }
            }
        }

        /// Per-slice change handlers. A slice with a handler is controlled.
        #[derive(Clone, Default)]
        pub struct StateHandlers {
            $(pub $handler: Option<OnChange<$value>>,)*
            pub custom: FxHashMap<String, OnChange<serde_json::Value>>,
        }

        impl StateHandlers {
            /// Keys of every built-in slice with a handler.
            pub fn keys(&self) -> Vec<SliceKey> {
                let mut keys = Vec::new();
                $(
                    if self.$handler.is_some() {
                        keys.push(SliceKey::$marker);
                    }
                )*
                keys
            }
        }

        impl fmt::Debug for StateHandlers {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct("StateHandlers")
                    .field("slices", &self.keys())
                    .field("custom", &self.custom.keys().collect::<Vec<_>>())
                    .finish()
            }
        }

        /// Owner of the live table state.
        pub struct StateStore {
            $($field: RefCell<Option<Slot<$value>>>,)*
            custom: RefCell<FxHashMap<String, Slot<serde_json::Value>>>,
            initial: TableState,
        }

        impl StateStore {
            /// Builds the store from the merged initial state.
            ///
            /// Only slices present in `initial` exist. Their value comes from
            /// `overrides` when given there, and they are controlled when
            /// `handlers` has an entry for them.
            pub fn new(initial: TableState, overrides: &TableState, handlers: &StateHandlers) -> Self {
                let custom = initial
                    .custom
                    .iter()
                    .map(|(key, value)| {
                        let value = Rc::new(overrides.custom.get(key).unwrap_or(value).clone());
                        let slot = match handlers.custom.get(key) {
                            Some(on_change) => Slot::Controlled {
                                value,
                                on_change: Rc::clone(on_change),
                            },
                            None => Slot::Internal(value),
                        };
                        (key.clone(), slot)
                    })
                    .collect();
                StateStore {
                    $(
                        $field: RefCell::new(make_slot(
                            initial.$field.as_ref(),
                            overrides.$field.as_ref(),
                            handlers.$handler.as_ref(),
                        )),
                    )*
                    custom: RefCell::new(custom),
                    initial,
                }
            }

            /// A copy of the current value of every slice.
            pub fn snapshot(&self) -> TableState {
                TableState {
                    $(
                        $field: self.$field.borrow().as_ref().map(|slot| (**slot.value()).clone()),
                    )*
                    custom: self
                        .custom
                        .borrow()
                        .iter()
                        .map(|(key, slot)| (key.clone(), (**slot.value()).clone()))
                        .collect(),
                }
            }

            /// Resets every slice to its initial value.
            pub fn reset_all(&self) -> Result<()> {
                $(
                    if self.$field.borrow().is_some() {
                        self.reset::<slice::$marker>(None)?;
                    }
                )*
                let keys: Vec<String> = self.custom.borrow().keys().cloned().collect();
                for key in keys {
                    self.reset_custom(&key, None)?;
                }
                Ok(())
            }
        }
    };
}

state_slices! {
    ColumnVisibility {
        field: column_visibility,
        value: ColumnVisibilityState,
        key: "columnVisibility",
        feature: "ColumnVisibility",
        handler: on_column_visibility_change,
    }
    ColumnOrder {
        field: column_order,
        value: ColumnOrderState,
        key: "columnOrder",
        feature: "ColumnOrdering",
        handler: on_column_order_change,
    }
    ColumnPinning {
        field: column_pinning,
        value: ColumnPinningState,
        key: "columnPinning",
        feature: "ColumnPinning",
        handler: on_column_pinning_change,
    }
    ColumnSizing {
        field: column_sizing,
        value: ColumnSizingState,
        key: "columnSizing",
        feature: "ColumnSizing",
        handler: on_column_sizing_change,
    }
    ColumnSizingInfo {
        field: column_sizing_info,
        value: ColumnSizingInfoState,
        key: "columnSizingInfo",
        feature: "ColumnResizing",
        handler: on_column_sizing_info_change,
    }
    ColumnFilters {
        field: column_filters,
        value: ColumnFiltersState,
        key: "columnFilters",
        feature: "ColumnFiltering",
        handler: on_column_filters_change,
    }
    GlobalFilter {
        field: global_filter,
        value: GlobalFilterState,
        key: "globalFilter",
        feature: "GlobalFiltering",
        handler: on_global_filter_change,
    }
    Sorting {
        field: sorting,
        value: SortingState,
        key: "sorting",
        feature: "RowSorting",
        handler: on_sorting_change,
    }
    Grouping {
        field: grouping,
        value: GroupingState,
        key: "grouping",
        feature: "ColumnGrouping",
        handler: on_grouping_change,
    }
    Expanded {
        field: expanded,
        value: ExpandedState,
        key: "expanded",
        feature: "RowExpanding",
        handler: on_expanded_change,
    }
    Pagination {
        field: pagination,
        value: PaginationState,
        key: "pagination",
        feature: "RowPagination",
        handler: on_pagination_change,
    }
}

// ============================================================================
// STORE OPERATIONS
// ============================================================================

impl StateStore {
    /// Current value of slice `S`, or `None` when its feature is not enabled.
    pub fn get<S: StateSlice>(&self) -> Option<Rc<S::Value>> {
        S::slot(self)
            .borrow()
            .as_ref()
            .map(|slot| Rc::clone(slot.value()))
    }

    /// The value `S` had when the table was built, before controlled overrides.
    pub fn initial<S: StateSlice>(&self) -> Option<&S::Value> {
        S::field(&self.initial).as_ref()
    }

    pub fn initial_state(&self) -> &TableState {
        &self.initial
    }

    pub fn is_controlled<S: StateSlice>(&self) -> bool {
        S::slot(self)
            .borrow()
            .as_ref()
            .is_some_and(Slot::is_controlled)
    }

    /// Applies `updater` to slice `S`.
    ///
    /// Controlled slices hand the resolved value to the host and keep their own
    /// copy. Internal slices get a new `Rc`, which invalidates every memo that
    /// depended on the old one.
    pub fn set<S: StateSlice>(&self, updater: Updater<S::Value>) -> Result<()> {
        let (current, on_change) = {
            let slot = S::slot(self).borrow();
            match slot.as_ref() {
                None => return Err(not_registered(S::KEY)),
                Some(Slot::Internal(value)) => (Rc::clone(value), None),
                Some(Slot::Controlled { value, on_change }) => {
                    (Rc::clone(value), Some(Rc::clone(on_change)))
                }
            }
        };
        let next = updater.resolve(&current);
        match on_change {
            Some(on_change) => {
                log_debug!("STATE", "{} is controlled, handing off", S::KEY.as_str());
                on_change(next);
            }
            None => {
                *S::slot(self).borrow_mut() = Some(Slot::Internal(Rc::new(next)));
            }
        }
        Ok(())
    }

    /// Sets slice `S` back to `default_override`, or to its initial value.
    pub fn reset<S: StateSlice>(&self, default_override: Option<S::Value>) -> Result<()> {
        let initial = self
            .initial::<S>()
            .cloned()
            .ok_or_else(|| not_registered(S::KEY))?;
        self.set::<S>(Updater::Value(default_override.unwrap_or(initial)))
    }

    pub fn get_custom(&self, key: &str) -> Option<Rc<serde_json::Value>> {
        self.custom
            .borrow()
            .get(key)
            .map(|slot| Rc::clone(slot.value()))
    }

    /// `set` for a caller-defined slice.
    pub fn set_custom(&self, key: &str, updater: Updater<serde_json::Value>) -> Result<()> {
        let (current, on_change) = {
            let custom = self.custom.borrow();
            match custom.get(key) {
                None => return Err(TableError::UnknownStateSlice(key.to_string())),
                Some(Slot::Internal(value)) => (Rc::clone(value), None),
                Some(Slot::Controlled { value, on_change }) => {
                    (Rc::clone(value), Some(Rc::clone(on_change)))
                }
            }
        };
        let next = updater.resolve(&current);
        match on_change {
            Some(on_change) => {
                log_debug!("STATE", "{} is controlled, handing off", key);
                on_change(next);
            }
            None => {
                self.custom
                    .borrow_mut()
                    .insert(key.to_string(), Slot::Internal(Rc::new(next)));
            }
        }
        Ok(())
    }

    pub fn reset_custom(&self, key: &str, default_override: Option<serde_json::Value>) -> Result<()> {
        let initial = self
            .initial
            .custom
            .get(key)
            .cloned()
            .ok_or_else(|| TableError::UnknownStateSlice(key.to_string()))?;
        self.set_custom(key, Updater::Value(default_override.unwrap_or(initial)))
    }
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &self.snapshot())
            .finish()
    }
}
