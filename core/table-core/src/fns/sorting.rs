//! FILENAME: core/table-core/src/fns/sorting.rs
//! PURPOSE: Built-in comparators for the sorting stage.
//! CONTEXT: Comparators only ever see defined values. Missing values are
//! ordered last by the sorting stage itself, before any comparator runs.

use std::cmp::Ordering;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::value::CellValue;

pub type SortingFn = Rc<dyn Fn(&CellValue, &CellValue) -> Ordering>;

pub const ALPHANUMERIC: &str = "alphanumeric";
pub const ALPHANUMERIC_CASE_SENSITIVE: &str = "alphanumericCaseSensitive";
pub const TEXT: &str = "text";
pub const TEXT_CASE_SENSITIVE: &str = "textCaseSensitive";
pub const DATETIME: &str = "datetime";
pub const BASIC: &str = "basic";

/// Number of leading rows inspected when picking a comparator automatically.
pub const AUTO_SAMPLE_SIZE: usize = 10;

pub fn builtin_sorting_fns() -> FxHashMap<String, SortingFn> {
    let mut fns: FxHashMap<String, SortingFn> = FxHashMap::default();
    fns.insert(ALPHANUMERIC.to_string(), Rc::new(alphanumeric));
    fns.insert(
        ALPHANUMERIC_CASE_SENSITIVE.to_string(),
        Rc::new(alphanumeric_case_sensitive),
    );
    fns.insert(TEXT.to_string(), Rc::new(text));
    fns.insert(TEXT_CASE_SENSITIVE.to_string(), Rc::new(text_case_sensitive));
    fns.insert(DATETIME.to_string(), Rc::new(datetime));
    fns.insert(BASIC.to_string(), Rc::new(basic));
    fns
}

/// Natural ordering, case-insensitive: "item2" sorts before "item10".
pub fn alphanumeric(a: &CellValue, b: &CellValue) -> Ordering {
    compare_alphanumeric(&sort_text(a).to_lowercase(), &sort_text(b).to_lowercase())
}

pub fn alphanumeric_case_sensitive(a: &CellValue, b: &CellValue) -> Ordering {
    compare_alphanumeric(&sort_text(a), &sort_text(b))
}

/// Plain lexical ordering, case-insensitive.
pub fn text(a: &CellValue, b: &CellValue) -> Ordering {
    sort_text(a).to_lowercase().cmp(&sort_text(b).to_lowercase())
}

pub fn text_case_sensitive(a: &CellValue, b: &CellValue) -> Ordering {
    sort_text(a).cmp(&sort_text(b))
}

/// Orders instants chronologically. Non-temporal values fall back to `basic`.
pub fn datetime(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::DateTime(x), CellValue::DateTime(y)) => x.cmp(y),
        _ => basic(a, b),
    }
}

/// Numbers numerically, text lexically, mixed kinds by kind.
pub fn basic(a: &CellValue, b: &CellValue) -> Ordering {
    a.total_cmp(b)
}

/// Picks a comparator name from a sample of column values.
pub fn auto_sorting_fn_name<'a>(values: impl IntoIterator<Item = &'a CellValue>) -> &'static str {
    let mut is_text = false;
    for value in values.into_iter().take(AUTO_SAMPLE_SIZE) {
        match value {
            CellValue::DateTime(_) => return DATETIME,
            CellValue::Text(s) => {
                if s.chars().any(|c| c.is_ascii_digit()) {
                    return ALPHANUMERIC;
                }
                is_text = true;
            }
            _ => {}
        }
    }
    if is_text {
        TEXT
    } else {
        BASIC
    }
}

fn sort_text(value: &CellValue) -> String {
    match value {
        CellValue::Empty | CellValue::Unavailable => String::new(),
        CellValue::Number(n) if !n.is_finite() => String::new(),
        other => other.display_value(),
    }
}

/// Splits into alternating runs of ASCII digits and everything else.
fn split_digit_runs(s: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut in_digits: Option<bool> = None;
    for (i, c) in s.char_indices() {
        let is_digit = c.is_ascii_digit();
        match in_digits {
            Some(current) if current != is_digit => {
                chunks.push(&s[start..i]);
                start = i;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }
    if start < s.len() {
        chunks.push(&s[start..]);
    }
    chunks
}

fn compare_alphanumeric(a: &str, b: &str) -> Ordering {
    let a_chunks = split_digit_runs(a);
    let b_chunks = split_digit_runs(b);

    for (aa, bb) in a_chunks.iter().zip(b_chunks.iter()) {
        let an = aa.parse::<f64>().ok().filter(|_| aa.bytes().all(|b| b.is_ascii_digit()));
        let bn = bb.parse::<f64>().ok().filter(|_| bb.bytes().all(|b| b.is_ascii_digit()));

        let ordering = match (an, bn) {
            (None, None) => aa.cmp(bb),
            // text chunks order before digit chunks
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    a_chunks.len().cmp(&b_chunks.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sorted(mut values: Vec<CellValue>, f: fn(&CellValue, &CellValue) -> Ordering) -> Vec<String> {
        values.sort_by(f);
        values.iter().map(CellValue::display_value).collect()
    }

    #[test]
    fn test_alphanumeric_is_natural() {
        let values = vec!["item10", "Item2", "item1"]
            .into_iter()
            .map(CellValue::from)
            .collect();
        assert_eq!(sorted(values, alphanumeric), vec!["item1", "Item2", "item10"]);
    }

    #[test]
    fn test_alphanumeric_case_sensitive_uses_code_points() {
        assert_eq!(
            alphanumeric_case_sensitive(&CellValue::from("B1"), &CellValue::from("a1")),
            Ordering::Less
        );
    }

    #[test]
    fn test_text_ignores_case() {
        assert_eq!(text(&CellValue::from("apple"), &CellValue::from("Apple")), Ordering::Equal);
        assert_eq!(text(&CellValue::from("b"), &CellValue::from("A")), Ordering::Greater);
    }

    #[test]
    fn test_datetime_orders_by_instant() {
        let early = CellValue::from(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        let late = CellValue::from(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(datetime(&early, &late), Ordering::Less);
    }

    #[test]
    fn test_basic_orders_numbers_numerically() {
        let values = vec![CellValue::from(10.0), CellValue::from(9.0), CellValue::from(-1.0)];
        assert_eq!(sorted(values, basic), vec!["-1", "9", "10"]);
    }

    #[test]
    fn test_auto_sorting_fn_name() {
        assert_eq!(auto_sorting_fn_name(&[CellValue::from(3.0)]), BASIC);
        assert_eq!(auto_sorting_fn_name(&[CellValue::from("tanner")]), TEXT);
        assert_eq!(
            auto_sorting_fn_name(&[CellValue::from("tanner"), CellValue::from("v2")]),
            ALPHANUMERIC
        );
        assert_eq!(auto_sorting_fn_name(&[CellValue::from(Utc::now())]), DATETIME);
    }
}
