//! FILENAME: core/table-core/src/row_models/sorted.rs
//! PURPOSE: The sorted row model.
//! CONTEXT: Rows are ordered by the sorting descriptors in priority order, then
//! by their previous position (the sort is stable). Missing values go last in
//! either direction. Sub-rows are sorted within their parent.

use std::cmp::Ordering;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::fns::SortingFn;
use crate::logging::{log_debug, log_warn};
use crate::row::{Row, RowModel};
use crate::state::{slice, SortingState};
use crate::table::Table;
use crate::value::RowData;

type SortedDeps<T> = (Rc<RowModel<T>>, Option<Rc<SortingState>>);

struct SortKey {
    position: usize,
    sorting_fn: SortingFn,
    desc: bool,
    invert: bool,
}

impl SortKey {
    fn compare<T>(&self, a: &Row<T>, b: &Row<T>) -> Ordering {
        let (a, b) = (a.value_at(self.position), b.value_at(self.position));
        match (a.is_missing(), b.is_missing()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }
        let mut ordering = (self.sorting_fn)(a, b);
        if self.desc {
            ordering = ordering.reverse();
        }
        if self.invert {
            ordering = ordering.reverse();
        }
        ordering
    }
}

fn sort_rows<T>(rows: &[Rc<Row<T>>], keys: &[SortKey]) -> Vec<Rc<Row<T>>> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        keys.iter()
            .map(|key| key.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    sorted
        .into_iter()
        .map(|row| {
            if row.sub_rows.is_empty() {
                row
            } else {
                Rc::new(row.with_sub_rows(sort_rows(&row.sub_rows, keys)))
            }
        })
        .collect()
}

impl<T: RowData> Table<T> {
    pub fn get_pre_sorted_row_model(&self) -> Rc<RowModel<T>> {
        self.get_filtered_row_model()
    }

    pub fn get_sorted_row_model(&self) -> Rc<RowModel<T>> {
        let deps: SortedDeps<T> = (
            self.get_pre_sorted_row_model(),
            self.store.get::<slice::Sorting>(),
        );
        let compute = |(pre, sorting): &SortedDeps<T>| {
            let Some(sorting) = sorting.as_ref().filter(|s| !s.is_empty()) else {
                return Rc::clone(pre);
            };
            if self.settings().manual_sorting.unwrap_or(false) {
                return Rc::clone(pre);
            }
            let keys = self.sort_keys(sorting);
            if keys.is_empty() {
                return Rc::clone(pre);
            }
            log_debug!("ROWMODEL", "sorting {} rows by {} columns", pre.len(), keys.len());
            Rc::new(RowModel::new(sort_rows(&pre.rows, &keys)))
        };
        self.apis
            .memo("get_sorted_row_model", deps.clone(), &compute)
            .unwrap_or_else(|| compute(&deps))
    }

    /// Descriptors for columns that exist and can sort.
    fn sort_keys(&self, sorting: &SortingState) -> SmallVec<[SortKey; 4]> {
        sorting
            .iter()
            .filter_map(|sort| {
                let Some(column) = self.get_column(&sort.id) else {
                    log_warn!("ROWMODEL", "sorting by unknown column '{}'", sort.id);
                    return None;
                };
                if !column.get_can_sort(self) {
                    return None;
                }
                Some(SortKey {
                    position: column.leaf_position?,
                    sorting_fn: column.get_sorting_fn(self),
                    desc: sort.desc,
                    invert: column.column_def.invert_sorting,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDef;
    use crate::features::{ColumnGrouping, RowSorting};
    use crate::options::TableOptions;
    use crate::state::ColumnSort;
    use crate::value::{CellValue, Record};

    fn record(name: &str, age: Option<f64>) -> Record {
        let mut record = Record::default();
        record.insert("name".to_string(), name.into());
        record.insert("age".to_string(), age.into());
        record
    }

    fn table(columns: Vec<ColumnDef<Record>>, data: Vec<Record>) -> Table<Record> {
        let options = TableOptions::new(columns, data)
            .feature(RowSorting)
            .feature(ColumnGrouping);
        Table::new(options).unwrap()
    }

    fn columns() -> Vec<ColumnDef<Record>> {
        vec![ColumnDef::accessor("name"), ColumnDef::accessor("age")]
    }

    fn ids(table: &Table<Record>) -> Vec<String> {
        table.get_sorted_row_model().rows.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_sort_is_stable() {
        let data = vec![
            record("a", Some(30.0)),
            record("b", Some(20.0)),
            record("c", Some(20.0)),
        ];
        let table = table(columns(), data);
        table.set_sorting(vec![ColumnSort::asc("age")]).unwrap();
        assert_eq!(ids(&table), vec!["1", "2", "0"]);
        table.set_sorting(vec![ColumnSort::desc("age")]).unwrap();
        assert_eq!(ids(&table), vec!["0", "1", "2"]);
    }

    #[test]
    fn test_missing_values_sort_last_both_ways() {
        let data = vec![record("a", None), record("b", Some(2.0)), record("c", Some(1.0))];
        let table = table(columns(), data);
        table.set_sorting(vec![ColumnSort::asc("age")]).unwrap();
        assert_eq!(ids(&table), vec!["2", "1", "0"]);
        table.set_sorting(vec![ColumnSort::desc("age")]).unwrap();
        assert_eq!(ids(&table), vec!["1", "2", "0"]);
    }

    #[test]
    fn test_second_descriptor_breaks_ties() {
        let data = vec![
            record("b", Some(1.0)),
            record("a", Some(1.0)),
            record("c", Some(0.0)),
        ];
        let table = table(columns(), data);
        table
            .set_sorting(vec![ColumnSort::desc("age"), ColumnSort::asc("name")])
            .unwrap();
        assert_eq!(ids(&table), vec!["1", "0", "2"]);
    }

    #[test]
    fn test_invert_sorting() {
        let columns = vec![ColumnDef::accessor("name"), ColumnDef::accessor("age").invert_sorting(true)];
        let data = vec![record("a", Some(1.0)), record("b", Some(2.0))];
        let table = table(columns, data);
        table.set_sorting(vec![ColumnSort::asc("age")]).unwrap();
        assert_eq!(ids(&table), vec!["1", "0"]);
    }

    #[test]
    fn test_groups_sort_by_aggregate_and_children_sort_inside() {
        let data = vec![
            record("x", Some(1.0)),
            record("y", Some(5.0)),
            record("x", Some(3.0)),
        ];
        let table = table(columns(), data);
        table.set_grouping(vec!["name".to_string()]).unwrap();
        table.set_sorting(vec![ColumnSort::desc("age")]).unwrap();
        let model = table.get_sorted_row_model();
        assert_eq!(model.rows[0].id, "name:y");
        let x = &model.rows[1];
        assert_eq!(x.get_value(&table, "age"), CellValue::Number(4.0));
        let children: Vec<_> = x.sub_rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(children, vec!["2", "0"]);
    }
}
