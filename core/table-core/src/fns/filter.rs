//! FILENAME: core/table-core/src/fns/filter.rs
//! PURPOSE: Filter values and the built-in filter functions.
//! CONTEXT: A filter function is a predicate over (cell value, filter value)
//! plus two optional hooks: `auto_remove` decides when a newly set filter value
//! should drop the filter entirely, and `resolve_filter_value` normalizes the
//! value once per filtering pass.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::value::CellValue;

pub const INCLUDES_STRING: &str = "includesString";
pub const INCLUDES_STRING_SENSITIVE: &str = "includesStringSensitive";
pub const EQUALS_STRING: &str = "equalsString";
pub const EQUALS: &str = "equals";
pub const WEAK_EQUALS: &str = "weakEquals";
pub const IN_NUMBER_RANGE: &str = "inNumberRange";
pub const IN_LIST: &str = "inList";

// ============================================================================
// FILTER VALUES
// ============================================================================

/// The value a column filter (or the global filter) is set to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterValue {
    Value(CellValue),
    /// Inclusive numeric bounds. `None` leaves a side open.
    Range(Option<f64>, Option<f64>),
    List(Vec<CellValue>),
}

impl Default for FilterValue {
    fn default() -> Self {
        FilterValue::Value(CellValue::Empty)
    }
}

impl FilterValue {
    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        FilterValue::Range(min, max)
    }

    /// Values that never constitute an active filter.
    pub fn is_falsey(&self) -> bool {
        match self {
            FilterValue::Value(CellValue::Empty) => true,
            FilterValue::Value(CellValue::Text(s)) => s.is_empty(),
            FilterValue::Value(_) => false,
            FilterValue::Range(min, max) => min.is_none() && max.is_none(),
            FilterValue::List(items) => items.is_empty(),
        }
    }

    fn search_text(&self) -> Option<String> {
        match self {
            FilterValue::Value(value) if !value.is_missing() => Some(value.display_value()),
            _ => None,
        }
    }
}

impl From<CellValue> for FilterValue {
    fn from(value: CellValue) -> Self {
        FilterValue::Value(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Value(CellValue::from(value))
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Value(CellValue::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Value(CellValue::from(value))
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Value(CellValue::from(value))
    }
}

// ============================================================================
// FILTER FUNCTIONS
// ============================================================================

pub type FilterPredicate = Rc<dyn Fn(&CellValue, &FilterValue) -> bool>;

#[derive(Clone)]
pub struct FilterFn {
    predicate: FilterPredicate,
    auto_remove: Option<Rc<dyn Fn(&FilterValue) -> bool>>,
    resolve_filter_value: Option<Rc<dyn Fn(&FilterValue) -> FilterValue>>,
}

impl FilterFn {
    pub fn new(predicate: impl Fn(&CellValue, &FilterValue) -> bool + 'static) -> Self {
        FilterFn {
            predicate: Rc::new(predicate),
            auto_remove: None,
            resolve_filter_value: None,
        }
    }

    pub fn with_auto_remove(mut self, auto_remove: impl Fn(&FilterValue) -> bool + 'static) -> Self {
        self.auto_remove = Some(Rc::new(auto_remove));
        self
    }

    pub fn with_resolve_filter_value(
        mut self,
        resolve: impl Fn(&FilterValue) -> FilterValue + 'static,
    ) -> Self {
        self.resolve_filter_value = Some(Rc::new(resolve));
        self
    }

    pub fn matches(&self, value: &CellValue, filter: &FilterValue) -> bool {
        (self.predicate)(value, filter)
    }

    /// The filter value normalized for a filtering pass.
    pub fn resolve(&self, filter: &FilterValue) -> FilterValue {
        match &self.resolve_filter_value {
            Some(resolve) => resolve(filter),
            None => filter.clone(),
        }
    }

    pub fn auto_removes(&self, filter: &FilterValue) -> bool {
        self.auto_remove.as_ref().is_some_and(|f| f(filter))
    }
}

impl fmt::Debug for FilterFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterFn")
            .field("auto_remove", &self.auto_remove.is_some())
            .field("resolve_filter_value", &self.resolve_filter_value.is_some())
            .finish()
    }
}

/// Whether setting `value` should remove the filter instead of storing it.
///
/// `None`, empty values and empty text always remove; otherwise the filter
/// function's own `auto_remove` decides.
pub fn should_auto_remove_filter(filter_fn: Option<&FilterFn>, value: Option<&FilterValue>) -> bool {
    match value {
        None => true,
        Some(FilterValue::Value(CellValue::Empty)) => true,
        Some(FilterValue::Value(CellValue::Text(s))) if s.is_empty() => true,
        Some(value) => filter_fn.is_some_and(|f| f.auto_removes(value)),
    }
}

pub fn builtin_filter_fns() -> FxHashMap<String, FilterFn> {
    let mut fns = FxHashMap::default();
    fns.insert(INCLUDES_STRING.to_string(), includes_string());
    fns.insert(
        INCLUDES_STRING_SENSITIVE.to_string(),
        includes_string_sensitive(),
    );
    fns.insert(EQUALS_STRING.to_string(), equals_string());
    fns.insert(EQUALS.to_string(), equals());
    fns.insert(WEAK_EQUALS.to_string(), weak_equals());
    fns.insert(IN_NUMBER_RANGE.to_string(), in_number_range());
    fns.insert(IN_LIST.to_string(), in_list());
    fns
}

/// Case-insensitive substring match on the displayed value.
pub fn includes_string() -> FilterFn {
    FilterFn::new(|value, filter| {
        match (value.is_missing(), filter.search_text()) {
            (false, Some(search)) => value
                .display_value()
                .to_lowercase()
                .contains(&search.to_lowercase()),
            _ => false,
        }
    })
    .with_auto_remove(FilterValue::is_falsey)
}

pub fn includes_string_sensitive() -> FilterFn {
    FilterFn::new(|value, filter| match (value.is_missing(), filter.search_text()) {
        (false, Some(search)) => value.display_value().contains(&search),
        _ => false,
    })
    .with_auto_remove(FilterValue::is_falsey)
}

/// Case-insensitive equality on the displayed value.
pub fn equals_string() -> FilterFn {
    FilterFn::new(|value, filter| match (value.is_missing(), filter.search_text()) {
        (false, Some(search)) => value.display_value().to_lowercase() == search.to_lowercase(),
        _ => false,
    })
    .with_auto_remove(FilterValue::is_falsey)
}

pub fn equals() -> FilterFn {
    FilterFn::new(|value, filter| match filter {
        FilterValue::Value(expected) => value == expected,
        _ => false,
    })
    .with_auto_remove(FilterValue::is_falsey)
}

/// Equality after converting both sides to display text, so `1` equals `"1"`.
pub fn weak_equals() -> FilterFn {
    FilterFn::new(|value, filter| match filter {
        FilterValue::Value(expected) => value.display_value() == expected.display_value(),
        _ => false,
    })
    .with_auto_remove(FilterValue::is_falsey)
}

/// Inclusive range over numbers. Swapped bounds are put back in order.
pub fn in_number_range() -> FilterFn {
    FilterFn::new(|value, filter| {
        let Some(n) = value.as_f64() else {
            return false;
        };
        match filter {
            FilterValue::Range(min, max) => {
                min.map_or(true, |min| n >= min) && max.map_or(true, |max| n <= max)
            }
            FilterValue::Value(CellValue::Number(exact)) => n == *exact,
            _ => false,
        }
    })
    .with_resolve_filter_value(|filter| match filter {
        FilterValue::Range(Some(min), Some(max)) if min > max => {
            FilterValue::Range(Some(*max), Some(*min))
        }
        other => other.clone(),
    })
    .with_auto_remove(FilterValue::is_falsey)
}

/// Matches when the value is one of the listed values.
pub fn in_list() -> FilterFn {
    FilterFn::new(|value, filter| match filter {
        FilterValue::List(items) => items.contains(value),
        FilterValue::Value(expected) => value == expected,
        FilterValue::Range(..) => false,
    })
    .with_auto_remove(FilterValue::is_falsey)
}

/// Picks a filter function name from a column's first value.
pub fn auto_filter_fn_name(first_value: &CellValue) -> &'static str {
    match first_value {
        CellValue::Text(_) => INCLUDES_STRING,
        CellValue::Number(_) => IN_NUMBER_RANGE,
        CellValue::Boolean(_) | CellValue::DateTime(_) => EQUALS,
        CellValue::Empty | CellValue::Unavailable => WEAK_EQUALS,
    }
}
