//! FILENAME: core/table-core/src/row_models/filtered.rs
//! PURPOSE: The filtered row model: column filters and the global filter.
//! CONTEXT: A leaf row passes when every active column filter matches it and,
//! with an active global filter, at least one globally filterable column
//! matches. Grouped tables are filtered from their leaves: the passing leaves
//! are grouped again, so group aggregates only cover rows that passed.

use std::rc::Rc;

use crate::column::Column;
use crate::fns::{FilterFn, FilterValue};
use crate::logging::log_debug;
use crate::row::{Row, RowModel};
use crate::state::{slice, ColumnFiltersState, GlobalFilterState};
use crate::table::Table;
use crate::value::RowData;

use super::group_rows;

type FilteredDeps<T> = (
    Rc<RowModel<T>>,
    Option<Rc<ColumnFiltersState>>,
    Option<Rc<GlobalFilterState>>,
);

struct ActiveFilters<T> {
    columns: Vec<(Rc<Column<T>>, FilterFn, FilterValue)>,
    global: Option<(FilterFn, FilterValue, Vec<Rc<Column<T>>>)>,
}

impl<T> ActiveFilters<T> {
    fn passes(&self, row: &Row<T>) -> bool {
        let columns_pass = self
            .columns
            .iter()
            .all(|(column, filter_fn, value)| column_matches(row, column, filter_fn, value));
        columns_pass
            && self.global.as_ref().map_or(true, |(filter_fn, value, columns)| {
                columns
                    .iter()
                    .any(|column| column_matches(row, column, filter_fn, value))
            })
    }
}

fn column_matches<T>(row: &Row<T>, column: &Column<T>, filter_fn: &FilterFn, value: &FilterValue) -> bool {
    column
        .leaf_position
        .is_some_and(|position| filter_fn.matches(row.value_at(position), value))
}

impl<T: RowData> Table<T> {
    pub fn get_pre_filtered_row_model(&self) -> Rc<RowModel<T>> {
        self.get_grouped_row_model()
    }

    pub fn get_filtered_row_model(&self) -> Rc<RowModel<T>> {
        let deps: FilteredDeps<T> = (
            self.get_pre_filtered_row_model(),
            self.store.get::<slice::ColumnFilters>(),
            self.store.get::<slice::GlobalFilter>(),
        );
        let compute = |(pre, filters, global): &FilteredDeps<T>| {
            let idle = filters.as_ref().map_or(true, |f| f.is_empty())
                && global.as_ref().map_or(true, |g| g.is_falsey());
            if idle || self.settings().manual_filtering.unwrap_or(false) {
                return Rc::clone(pre);
            }
            Rc::new(self.filter_rows(pre))
        };
        self.apis
            .memo("get_filtered_row_model", deps.clone(), &compute)
            .unwrap_or_else(|| compute(&deps))
    }

    fn active_filters(&self) -> ActiveFilters<T> {
        ActiveFilters {
            columns: self.active_column_filters(),
            global: self
                .active_global_filter()
                .map(|value| (self.get_global_filter_fn(), value, self.global_filter_columns())),
        }
    }

    fn filter_rows(&self, pre: &Rc<RowModel<T>>) -> RowModel<T> {
        let active = self.active_filters();
        let core = self.get_core_row_model();
        let model = if Rc::ptr_eq(pre, &core) {
            RowModel::new(pre.rows.iter().filter(|row| active.passes(row)).cloned().collect())
        } else {
            let leaves: Vec<_> = core.rows.iter().filter(|row| active.passes(row)).cloned().collect();
            let grouping = self.store.get::<slice::Grouping>().unwrap_or_default();
            group_rows(self, &leaves, &grouping).unwrap_or_else(|| RowModel::new(leaves))
        };
        log_debug!("ROWMODEL", "filtered: {} of {} rows pass", model.flat_rows.len(), core.len());
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDef;
    use crate::features::{ColumnFiltering, ColumnGrouping, GlobalFiltering};
    use crate::options::{TableOptions, TableSettings};
    use crate::state::ColumnFilter;
    use crate::value::{CellValue, Record};

    fn record(name: &str, team: &str, age: f64) -> Record {
        let mut record = Record::default();
        record.insert("name".to_string(), name.into());
        record.insert("team".to_string(), team.into());
        record.insert("age".to_string(), age.into());
        record
    }

    fn options() -> TableOptions<Record> {
        let columns = vec![
            ColumnDef::accessor("name"),
            ColumnDef::accessor("team"),
            ColumnDef::accessor("age"),
        ];
        let data = vec![
            record("Ann", "red", 31.0),
            record("Bob", "blue", 25.0),
            record("Cid", "red", 42.0),
            record("Dee", "blue", 37.0),
        ];
        TableOptions::new(columns, data)
            .feature(ColumnFiltering)
            .feature(GlobalFiltering)
            .feature(ColumnGrouping)
    }

    fn filter(id: &str, value: FilterValue) -> ColumnFilter {
        ColumnFilter {
            id: id.to_string(),
            value,
        }
    }

    fn ids(model: &RowModel<Record>) -> Vec<&str> {
        model.rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_column_filters_keep_order() {
        let table = Table::new(options()).unwrap();
        table
            .set_column_filters(vec![filter("age", FilterValue::range(Some(30.0), None))])
            .unwrap();
        assert_eq!(ids(&table.get_filtered_row_model()), vec!["0", "2", "3"]);
    }

    #[test]
    fn test_all_column_filters_must_match() {
        let table = Table::new(options()).unwrap();
        table
            .set_column_filters(vec![
                filter("team", FilterValue::from("red")),
                filter("age", FilterValue::range(None, Some(40.0))),
            ])
            .unwrap();
        assert_eq!(ids(&table.get_filtered_row_model()), vec!["0"]);
    }

    #[test]
    fn test_global_filter_matches_any_column() {
        let table = Table::new(options()).unwrap();
        table.set_global_filter(FilterValue::from("b")).unwrap();
        assert_eq!(ids(&table.get_filtered_row_model()), vec!["1", "3"]);
    }

    #[test]
    fn test_grouped_rows_filter_from_leaves() {
        let table = Table::new(options()).unwrap();
        table.set_grouping(vec!["team".to_string()]).unwrap();
        table
            .set_column_filters(vec![filter("age", FilterValue::range(Some(35.0), None))])
            .unwrap();
        let model = table.get_filtered_row_model();
        assert_eq!(ids(&model), vec!["team:red", "team:blue"]);
        assert_eq!(model.rows[0].leaf_rows.len(), 1);
        assert_eq!(model.rows[0].get_value(&table, "age"), CellValue::Number(42.0));
    }

    #[test]
    fn test_manual_filtering_passes_through() {
        let options = options().settings(TableSettings {
            manual_filtering: Some(true),
            ..Default::default()
        });
        let table = Table::new(options).unwrap();
        table
            .set_column_filters(vec![filter("team", FilterValue::from("red"))])
            .unwrap();
        assert!(Rc::ptr_eq(&table.get_core_row_model(), &table.get_filtered_row_model()));
    }
}
