//! FILENAME: core/table-core/src/value.rs
//! PURPOSE: Defines the values a column accessor produces and how records are read.
//! CONTEXT: `CellValue` is what sorting, filtering and aggregation operate on.
//! `RowData` lets a record type answer key-path lookups so a column can be
//! declared with an accessor key instead of a closure.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// The resolved value of one cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    /// The accessor failed for this cell. Never aborts the rest of the row model.
    Unavailable,
}

impl CellValue {
    /// Missing values sort last and are skipped by aggregations.
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Empty | CellValue::Unavailable)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the display value of the cell as a String.
    pub fn display_value(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => b.to_string(),
            CellValue::DateTime(dt) => dt.to_rfc3339(),
            CellValue::Unavailable => "#N/A".to_string(),
        }
    }

    /// Total order used by the `basic` comparator and by grouping.
    ///
    /// Values of different kinds order as
    /// Empty < Number < Text < Boolean < DateTime < Unavailable.
    pub fn total_cmp(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
            }
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Boolean(a), CellValue::Boolean(b)) => a.cmp(b),
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            CellValue::Empty => 0,
            CellValue::Number(_) => 1,
            CellValue::Text(_) => 2,
            CellValue::Boolean(_) => 3,
            CellValue::DateTime(_) => 4,
            CellValue::Unavailable => 5,
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(f64::from(value))
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Number(f64::from(value))
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(value: DateTime<Utc>) -> Self {
        CellValue::DateTime(value)
    }
}

impl<V: Into<CellValue>> From<Option<V>> for CellValue {
    fn from(value: Option<V>) -> Self {
        value.map_or(CellValue::Empty, Into::into)
    }
}

// ============================================================================
// GROUP KEYS
// ============================================================================

/// Wrapper around f64 that implements Eq and Hash for use as map keys.
/// NaN values are treated as equal to each other.
#[derive(Debug, Clone, Copy)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            true
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for OrderedFloat {}

impl Hash for OrderedFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            u64::MAX.hash(state);
        } else if self.0 == 0.0 {
            // 0.0 and -0.0 compare equal
            0u64.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

/// A normalized, hashable form of a `CellValue`, used to partition rows into groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Empty,
    Number(OrderedFloat),
    Text(String),
    Boolean(bool),
    DateTime(i64),
    Unavailable,
}

impl From<&CellValue> for GroupKey {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Empty => GroupKey::Empty,
            CellValue::Number(n) => GroupKey::Number(OrderedFloat(*n)),
            CellValue::Text(s) => GroupKey::Text(s.clone()),
            CellValue::Boolean(b) => GroupKey::Boolean(*b),
            CellValue::DateTime(dt) => GroupKey::DateTime(dt.timestamp_millis()),
            CellValue::Unavailable => GroupKey::Unavailable,
        }
    }
}

// ============================================================================
// RECORD ACCESS
// ============================================================================

/// A record type that columns can read by key path.
///
/// Returns `Ok(CellValue::Empty)` when the path does not exist and `Err` when a
/// value exists but cannot be represented as a `CellValue`. Types that are only
/// read through accessor functions can rely on the default, which rejects
/// every path.
pub trait RowData: 'static {
    fn value_at(&self, path: &[String]) -> Result<CellValue, String> {
        Err(format!("no key path access for '{}'", path.join(".")))
    }
}

impl RowData for serde_json::Value {
    fn value_at(&self, path: &[String]) -> Result<CellValue, String> {
        let mut current = self;
        for segment in path {
            let next = match current {
                serde_json::Value::Object(map) => map.get(segment),
                serde_json::Value::Array(items) => {
                    segment.parse::<usize>().ok().and_then(|i| items.get(i))
                }
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return Ok(CellValue::Empty),
            }
        }
        json_to_cell_value(current)
    }
}

fn json_to_cell_value(value: &serde_json::Value) -> Result<CellValue, String> {
    match value {
        serde_json::Value::Null => Ok(CellValue::Empty),
        serde_json::Value::Bool(b) => Ok(CellValue::Boolean(*b)),
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(CellValue::Number)
            .ok_or_else(|| format!("number {} is not representable as f64", n)),
        serde_json::Value::String(s) => Ok(CellValue::Text(s.clone())),
        serde_json::Value::Array(_) => Err("arrays are not cell values".to_string()),
        serde_json::Value::Object(_) => Err("objects are not cell values".to_string()),
    }
}

/// A flat record keyed by field name. Key paths are joined with `.`.
pub type Record = FxHashMap<String, CellValue>;

impl RowData for Record {
    fn value_at(&self, path: &[String]) -> Result<CellValue, String> {
        Ok(self.get(&path.join(".")).cloned().unwrap_or_default())
    }
}
