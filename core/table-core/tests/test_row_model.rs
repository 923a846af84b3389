//! FILENAME: core/table-core/tests/test_row_model.rs
//! PURPOSE: End-to-end tests of the row model pipeline.

mod common;

use std::rc::Rc;

use common::{many_people, person_columns, Person, TestHarness};
use rustc_hash::FxHashSet;
use table_core::{
    slice, CellValue, ColumnDef, ColumnFilter, ColumnSort, FilterValue, PaginationState, Table, TableOptions,
    TableState,
};

// ============================================================================
// CORE ROWS
// ============================================================================

#[test]
fn test_core_model_has_one_row_per_record() {
    let harness = TestHarness::new();
    let core = harness.table.get_core_row_model();
    assert_eq!(core.len(), 6);
    assert_eq!(core.flat_rows.len(), 6);
    let ids: FxHashSet<&str> = core.rows.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids.len(), 6);
}

#[test]
fn test_core_only_table_has_rows_and_headers() {
    let table = Table::new(TableOptions::new(person_columns(), many_people(3))).unwrap();
    assert_eq!(table.get_row_model().len(), 3);
    assert_eq!(table.get_header_groups().len(), 2);
    assert_eq!(table.get_visible_leaf_columns().len(), 5);
}

#[test]
fn test_failing_accessor_marks_only_its_cells() {
    let mut columns = person_columns();
    columns.push(ColumnDef::try_accessor_fn("ratio", |p: &Person, _| {
        if p.visits == 0.0 {
            Err("no visits".to_string())
        } else {
            Ok((p.age / p.visits).into())
        }
    }));
    let mut data = many_people(3);
    data[1].visits = 0.0;
    let table = Table::new(TableOptions::new(columns, data)).unwrap();
    let rows = &table.get_row_model().rows;
    assert_eq!(rows[1].get_value(&table, "ratio"), CellValue::Unavailable);
    assert_eq!(rows[1].get_value(&table, "firstName"), CellValue::from("First1"));
    assert!(matches!(rows[2].get_value(&table, "ratio"), CellValue::Number(_)));
}

#[test]
fn test_unchanged_state_returns_same_model() {
    let harness = TestHarness::new();
    let first = harness.table.get_row_model();
    let second = harness.table.get_row_model();
    assert!(Rc::ptr_eq(&first, &second));
    let cells = first.rows[0].get_all_cells(&harness.table);
    assert!(Rc::ptr_eq(&cells, &first.rows[0].get_all_cells(&harness.table)));
}

// ============================================================================
// FILTERING AND SORTING
// ============================================================================

#[test]
fn test_filter_keeps_a_subset_in_order() {
    let harness = TestHarness::new();
    harness
        .table
        .set_column_filters(vec![ColumnFilter {
            id: "status".to_string(),
            value: FilterValue::from("single"),
        }])
        .unwrap();
    assert_eq!(harness.row_ids(), vec!["0", "2", "4"]);
    let core_ids: Vec<String> = harness.table.get_core_row_model().rows.iter().map(|r| r.id.clone()).collect();
    assert!(harness.row_ids().iter().all(|id| core_ids.contains(id)));
}

#[test]
fn test_filter_value_on_column() {
    let harness = TestHarness::new();
    let age = harness.table.column("age").unwrap();
    age.set_filter_value(&harness.table, Some(FilterValue::range(Some(30.0), Some(50.0))))
        .unwrap();
    assert!(age.get_is_filtered(&harness.table));
    assert_eq!(harness.row_ids(), vec!["0", "2"]);
    age.set_filter_value(&harness.table, None::<FilterValue>).unwrap();
    assert_eq!(harness.row_ids().len(), 6);
}

#[test]
fn test_global_filter_searches_text_columns() {
    let harness = TestHarness::new();
    harness.table.set_global_filter(FilterValue::from("VAN")).unwrap();
    assert_eq!(harness.row_ids(), vec!["1"]);
}

#[test]
fn test_equal_keys_keep_input_order() {
    let data = vec![
        Person::new("A", "a", 30.0, 1.0, "x"),
        Person::new("B", "b", 20.0, 1.0, "x"),
        Person::new("C", "c", 20.0, 1.0, "x"),
    ];
    let harness = TestHarness::with_data(data);
    harness.table.set_sorting(vec![ColumnSort::asc("age")]).unwrap();
    assert_eq!(harness.row_ids(), vec!["1", "2", "0"]);
}

#[test]
fn test_toggle_sorting_cycles_and_multi_sorts() {
    let harness = TestHarness::new();
    let table = &harness.table;
    let age = table.column("age").unwrap();
    let visits = table.column("visits").unwrap();
    age.toggle_sorting(table, None, false).unwrap();
    assert_eq!(*table.state::<slice::Sorting>().unwrap(), vec![ColumnSort::desc("age")]);
    visits.toggle_sorting(table, None, true).unwrap();
    assert_eq!(visits.get_sort_index(table), Some(1));
    assert_eq!(harness.column_values("age")[0], CellValue::Number(61.0));
    // 27 appears twice: visits breaks the tie, descending
    let firsts: Vec<_> = harness.column_values("firstName");
    assert_eq!(firsts[3], CellValue::from("Kevin"));
    assert_eq!(firsts[4], CellValue::from("Ann"));
}

// ============================================================================
// PAGINATION
// ============================================================================

#[test]
fn test_stale_page_index_is_clamped() {
    let harness = TestHarness::with_options(TestHarness::options(many_people(25)).initial_state(TableState {
        pagination: Some(PaginationState {
            page_index: 5,
            page_size: 10,
        }),
        ..Default::default()
    }));
    let firsts = harness.column_values("firstName");
    let expected: Vec<CellValue> = (20..25).map(|i| CellValue::from(format!("First{}", i))).collect();
    assert_eq!(firsts, expected);
    assert_eq!(harness.table.get_page_count(), 3);
}

#[test]
fn test_filtering_resets_page_index() {
    let harness = TestHarness::with_data(many_people(40));
    harness.table.set_page_index(3usize).unwrap();
    harness.table.set_global_filter(FilterValue::from("First1")).unwrap();
    assert_eq!(harness.table.state::<slice::Pagination>().unwrap().page_index, 0);
    assert_eq!(harness.table.get_row_count(), 11);
    assert_eq!(harness.table.get_page_count(), 2);
}

#[test]
fn test_navigation_stays_in_range() {
    let harness = TestHarness::with_data(many_people(25));
    let table = &harness.table;
    assert!(!table.get_can_previous_page());
    table.last_page().unwrap();
    assert_eq!(table.get_row_model().len(), 5);
    table.next_page().unwrap();
    assert_eq!(table.state::<slice::Pagination>().unwrap().page_index, 2);
    table.first_page().unwrap();
    assert!(table.get_can_next_page());
}
