//! FILENAME: core/table-core/tests/test_state.rs
//! PURPOSE: Tests for the state store: internal and controlled slices,
//! resets, and configuration errors caught at construction.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{person_columns, people, Person, TestHarness};
use table_core::{
    slice, ApiDef, ApiRegistry, ColumnDef, ColumnFilter, ColumnSort, ColumnVisibility, FilterValue, Result, RowData,
    RowSorting, SliceKey, SortDirection, Table, TableError, TableFeature, TableOptions, TableSettings, TableState,
    Updater,
};

// ============================================================================
// INTERNAL SLICES
// ============================================================================

#[test]
fn test_visibility_round_trip_and_reset() {
    let harness = TestHarness::new();
    let table = &harness.table;
    let age = table.column("age").unwrap();
    age.toggle_visibility(table, Some(false)).unwrap();
    assert!(!harness.visible_column_ids().contains(&"age".to_string()));
    assert!(!table.get_is_all_columns_visible());
    assert_eq!(table.get_state().column_visibility.unwrap().get("age"), Some(&false));

    table.reset_column_visibility(false).unwrap();
    assert_eq!(harness.visible_column_ids().len(), 5);
    assert!(table.get_is_all_columns_visible());
}

#[test]
fn test_functional_updater_sees_current_value() {
    let harness = TestHarness::new();
    let table = &harness.table;
    table.set_sorting(vec![ColumnSort::asc("age")]).unwrap();
    table
        .set_sorting(Updater::with(|old: &Vec<ColumnSort>| {
            let mut next = old.clone();
            next.push(ColumnSort::desc("visits"));
            next
        }))
        .unwrap();
    assert_eq!(table.state::<slice::Sorting>().unwrap().len(), 2);
}

#[test]
fn test_initial_state_is_what_reset_returns_to() {
    let harness = TestHarness::with_initial_state(TableState {
        sorting: Some(vec![ColumnSort::desc("age")]),
        ..Default::default()
    });
    let table = &harness.table;
    table.set_sorting(vec![ColumnSort::asc("visits")]).unwrap();
    table.reset_sorting(false).unwrap();
    assert_eq!(*table.state::<slice::Sorting>().unwrap(), vec![ColumnSort::desc("age")]);
    table.reset_sorting(true).unwrap();
    assert!(table.state::<slice::Sorting>().unwrap().is_empty());
}

#[test]
fn test_whole_table_reset() {
    let harness = TestHarness::new();
    let table = &harness.table;
    table.set_sorting(vec![ColumnSort::asc("age")]).unwrap();
    table.set_grouping(vec!["status".to_string()]).unwrap();
    table.reset().unwrap();
    assert_eq!(table.get_state(), *table.get_initial_state());
}

#[test]
fn test_unknown_column_in_setter_is_rejected() {
    let harness = TestHarness::new();
    let result = harness.table.set_sorting(vec![ColumnSort::asc("height")]);
    assert_eq!(result, Err(TableError::UnknownColumn("height".to_string())));
    assert!(harness.table.state::<slice::Sorting>().unwrap().is_empty());
}

#[test]
fn test_state_serializes_for_persistence() {
    let harness = TestHarness::new();
    harness.table.set_sorting(vec![ColumnSort::desc("age")]).unwrap();
    let json = serde_json::to_value(harness.table.get_state()).unwrap();
    let restored: TableState = serde_json::from_value(json).unwrap();
    let again = TestHarness::with_initial_state(restored);
    assert_eq!(again.column_values("age")[0], table_core::CellValue::Number(61.0));
}

// ============================================================================
// CONTROLLED SLICES
// ============================================================================

#[test]
fn test_controlled_slice_hands_value_to_host() {
    let seen: Rc<RefCell<Vec<Vec<ColumnSort>>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let options = TestHarness::options(people())
        .state(TableState {
            sorting: Some(vec![ColumnSort::desc("age")]),
            ..Default::default()
        })
        .on_change::<slice::Sorting>(move |sorting| sink.borrow_mut().push(sorting));
    let harness = TestHarness::with_options(options);
    let table = &harness.table;
    assert!(table.is_controlled::<slice::Sorting>());

    let age = table.column("age").unwrap();
    assert_eq!(age.get_is_sorted(table), Some(SortDirection::Desc));
    age.toggle_sorting(table, None, false).unwrap();

    assert_eq!(*seen.borrow(), vec![vec![ColumnSort::asc("age")]]);
    assert_eq!(*table.state::<slice::Sorting>().unwrap(), vec![ColumnSort::desc("age")]);
}

#[test]
fn test_controlled_setter_still_validates() {
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    let options = TestHarness::options(people()).on_change::<slice::Grouping>(move |_| *counter.borrow_mut() += 1);
    let harness = TestHarness::with_options(options);
    let result = harness.table.set_grouping(vec!["nope".to_string()]);
    assert!(result.is_err());
    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn test_controlled_sorting_leaves_page_index_alone() {
    let options = TestHarness::options(people())
        .state(TableState {
            sorting: Some(Vec::new()),
            ..Default::default()
        })
        .on_change::<slice::Sorting>(|_| {});
    let harness = TestHarness::with_options(options);
    let table = &harness.table;
    table.set_page_size(2usize).unwrap();
    table.next_page().unwrap();

    table.set_sorting(vec![ColumnSort::asc("age")]).unwrap();
    assert_eq!(table.state::<slice::Pagination>().unwrap().page_index, 1);

    table.set_global_filter(FilterValue::from("a")).unwrap();
    assert_eq!(table.state::<slice::Pagination>().unwrap().page_index, 0);
}

// ============================================================================
// CONSTRUCTION ERRORS
// ============================================================================

struct ShadowSorting;

impl<T: RowData> TableFeature<T> for ShadowSorting {
    fn name(&self) -> &'static str {
        "ShadowSorting"
    }

    fn state_slices(&self) -> &'static [SliceKey] {
        &[SliceKey::Sorting]
    }
}

struct CellOverride;

impl<T: RowData> TableFeature<T> for CellOverride {
    fn name(&self) -> &'static str {
        "CellOverride"
    }

    fn construct_row(&self, apis: &mut ApiRegistry) -> Result<()> {
        apis.assign_apis("CellOverride", &[ApiDef::memo("get_all_cells")])
    }
}

#[test]
fn test_two_owners_of_one_slice_fail() {
    let options = TableOptions::new(person_columns(), people())
        .feature(RowSorting)
        .feature(ShadowSorting);
    assert!(matches!(
        Table::new(options),
        Err(TableError::ConflictingStateSlice { first: "RowSorting", second: "ShadowSorting", .. })
    ));
}

#[test]
fn test_two_assignments_of_one_api_fail() {
    let options = TableOptions::new(person_columns(), people()).feature(CellOverride);
    assert!(matches!(
        Table::new(options),
        Err(TableError::ConflictingApi { api: "get_all_cells", .. })
    ));
}

#[test]
fn test_unknown_named_function_fails() {
    let columns = vec![ColumnDef::<Person>::accessor("age").sorting_fn("byMoonPhase")];
    let options = TableOptions::new(columns, people()).feature(RowSorting);
    assert_eq!(
        Table::new(options).unwrap_err(),
        TableError::UnknownFunction {
            kind: "sorting",
            name: "byMoonPhase".to_string(),
        }
    );
}

#[test]
fn test_state_for_missing_feature_fails() {
    let options = TableOptions::new(person_columns(), people())
        .feature(ColumnVisibility)
        .initial_state(TableState {
            sorting: Some(vec![ColumnSort::asc("age")]),
            ..Default::default()
        });
    assert!(matches!(Table::new(options), Err(TableError::FeatureNotRegistered { .. })));
}

#[test]
fn test_initial_sorting_on_unknown_column_fails() {
    let options = TableOptions::new(person_columns(), people())
        .feature(RowSorting)
        .initial_state(TableState {
            sorting: Some(vec![ColumnSort::asc("height")]),
            ..Default::default()
        });
    assert_eq!(
        Table::new(options).unwrap_err(),
        TableError::UnknownColumn("height".to_string())
    );
}

#[test]
fn test_initial_sorting_on_group_column_fails() {
    let result = Table::new(TestHarness::options(people()).initial_state(TableState {
        sorting: Some(vec![ColumnSort::desc("name")]),
        ..Default::default()
    }));
    assert_eq!(result.unwrap_err(), TableError::ColumnNotSortable("name".to_string()));
}

#[test]
fn test_controlled_grouping_on_group_column_fails() {
    let options = TestHarness::options(people())
        .state(TableState {
            grouping: Some(vec!["name".to_string()]),
            ..Default::default()
        })
        .on_change::<slice::Grouping>(|_| {});
    assert_eq!(
        Table::new(options).unwrap_err(),
        TableError::ColumnNotGroupable("name".to_string())
    );
}

#[test]
fn test_initial_filter_on_unknown_column_fails() {
    let result = Table::new(TestHarness::options(people()).initial_state(TableState {
        column_filters: Some(vec![ColumnFilter {
            id: "height".to_string(),
            value: FilterValue::from("tall"),
        }]),
        ..Default::default()
    }));
    assert_eq!(result.unwrap_err(), TableError::UnknownColumn("height".to_string()));
}

#[test]
fn test_manual_flag_for_missing_feature_fails() {
    let options = TableOptions::new(person_columns(), people()).settings(TableSettings {
        manual_sorting: Some(true),
        ..Default::default()
    });
    assert!(matches!(
        Table::new(options),
        Err(TableError::FeatureNotRegistered { feature: "RowSorting", .. })
    ));
}

#[test]
fn test_setter_without_feature_fails() {
    let table = Table::new(TableOptions::new(person_columns(), people())).unwrap();
    assert!(table.set_sorting(Vec::<ColumnSort>::new()).is_err());
    assert!(table.state::<slice::Sorting>().is_none());
    assert_eq!(table.get_row_model().len(), 6);
}
