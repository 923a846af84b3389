//! FILENAME: core/table-core/src/fns/aggregation.rs
//! PURPOSE: Built-in aggregations for group rows.
//! CONTEXT: An aggregation receives the values of every leaf row in the group
//! and the values of the group's direct children. Children of a nested group
//! are themselves group rows, so their values are already aggregated; `sum`,
//! `min` and `max` build on them, the rest look at the leaves.

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::value::{CellValue, GroupKey};

/// `(leaf values, child values) -> aggregate`.
pub type AggregationFn = Rc<dyn Fn(&[CellValue], &[CellValue]) -> CellValue>;

pub const SUM: &str = "sum";
pub const MIN: &str = "min";
pub const MAX: &str = "max";
pub const MEAN: &str = "mean";
pub const MEDIAN: &str = "median";
pub const UNIQUE_COUNT: &str = "uniqueCount";
pub const COUNT: &str = "count";

pub fn builtin_aggregation_fns() -> FxHashMap<String, AggregationFn> {
    let mut fns: FxHashMap<String, AggregationFn> = FxHashMap::default();
    fns.insert(SUM.to_string(), Rc::new(sum));
    fns.insert(MIN.to_string(), Rc::new(min));
    fns.insert(MAX.to_string(), Rc::new(max));
    fns.insert(MEAN.to_string(), Rc::new(mean));
    fns.insert(MEDIAN.to_string(), Rc::new(median));
    fns.insert(UNIQUE_COUNT.to_string(), Rc::new(unique_count));
    fns.insert(COUNT.to_string(), Rc::new(count));
    fns
}

/// Running numeric summary. Non-numeric values are skipped.
#[derive(Debug, Clone, Default)]
struct NumberAccumulator {
    sum: f64,
    count: usize,
    min: Option<f64>,
    max: Option<f64>,
}

impl NumberAccumulator {
    fn from_values(values: &[CellValue]) -> Self {
        let mut acc = NumberAccumulator::default();
        for n in values.iter().filter_map(CellValue::as_f64) {
            acc.add(n);
        }
        acc
    }

    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }
}

pub fn sum(_leaf_values: &[CellValue], child_values: &[CellValue]) -> CellValue {
    CellValue::Number(NumberAccumulator::from_values(child_values).sum)
}

pub fn min(_leaf_values: &[CellValue], child_values: &[CellValue]) -> CellValue {
    NumberAccumulator::from_values(child_values).min.into()
}

pub fn max(_leaf_values: &[CellValue], child_values: &[CellValue]) -> CellValue {
    NumberAccumulator::from_values(child_values).max.into()
}

pub fn mean(leaf_values: &[CellValue], _child_values: &[CellValue]) -> CellValue {
    let acc = NumberAccumulator::from_values(leaf_values);
    if acc.count > 0 {
        CellValue::Number(acc.sum / acc.count as f64)
    } else {
        CellValue::Empty
    }
}

/// Median of the leaf values. Empty unless every leaf value is a number.
pub fn median(leaf_values: &[CellValue], _child_values: &[CellValue]) -> CellValue {
    let mut numbers: Vec<f64> = Vec::with_capacity(leaf_values.len());
    for value in leaf_values {
        match value.as_f64() {
            Some(n) => numbers.push(n),
            None => return CellValue::Empty,
        }
    }
    if numbers.is_empty() {
        return CellValue::Empty;
    }
    numbers.sort_by(f64::total_cmp);
    let mid = numbers.len() / 2;
    if numbers.len() % 2 == 1 {
        CellValue::Number(numbers[mid])
    } else {
        CellValue::Number((numbers[mid - 1] + numbers[mid]) / 2.0)
    }
}

pub fn unique_count(leaf_values: &[CellValue], _child_values: &[CellValue]) -> CellValue {
    let unique: FxHashSet<GroupKey> = leaf_values.iter().map(GroupKey::from).collect();
    CellValue::Number(unique.len() as f64)
}

pub fn count(leaf_values: &[CellValue], _child_values: &[CellValue]) -> CellValue {
    CellValue::Number(leaf_values.len() as f64)
}

/// Aggregation picked from a column's first value, if any applies.
pub fn auto_aggregation_fn_name(first_value: &CellValue) -> Option<&'static str> {
    match first_value {
        CellValue::Number(_) => Some(SUM),
        _ => None,
    }
}
