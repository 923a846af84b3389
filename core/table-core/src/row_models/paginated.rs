//! FILENAME: core/table-core/src/row_models/paginated.rs
//! PURPOSE: The paginated row model: the current page's window of rows.
//! CONTEXT: An out-of-range page index is clamped to the last page, so a stale
//! index after filtering still shows rows. `flat_rows` holds the page rows and
//! their descendants, once each.

use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::features::row_expanding::expand_rows;
use crate::features::row_pagination::page_count_for;
use crate::logging::log_debug;
use crate::row::{Row, RowModel};
use crate::state::{slice, ExpandedState, PaginationState};
use crate::table::Table;
use crate::value::RowData;

type PaginatedDeps<T> = (
    Rc<RowModel<T>>,
    Option<Rc<PaginationState>>,
    Option<Rc<ExpandedState>>,
);

impl<T: RowData> Table<T> {
    pub fn get_pagination_row_model(&self) -> Rc<RowModel<T>> {
        let deps: PaginatedDeps<T> = (
            self.get_pre_pagination_row_model(),
            self.store.get::<slice::Pagination>(),
            self.store.get::<slice::Expanded>(),
        );
        let settings = self.settings();
        let manual = settings.manual_pagination.unwrap_or(false);
        let expand_per_page =
            !settings.paginate_expanded_rows.unwrap_or(true) && !settings.manual_expanding.unwrap_or(false);
        let compute = |(pre, pagination, expanded): &PaginatedDeps<T>| {
            let Some(pagination) = pagination.as_deref().filter(|_| !manual) else {
                return Rc::clone(pre);
            };
            let expanded = expanded.as_deref().filter(|_| expand_per_page);
            Rc::new(paginate(pre, pagination, expanded))
        };
        self.apis
            .memo("get_pagination_row_model", deps.clone(), &compute)
            .unwrap_or_else(|| compute(&deps))
    }
}

fn paginate<T>(pre: &RowModel<T>, pagination: &PaginationState, expanded: Option<&ExpandedState>) -> RowModel<T> {
    let page_size = pagination.page_size.max(1);
    let last_page = page_count_for(pre.len(), page_size).saturating_sub(1);
    let page_index = pagination.page_index.min(last_page);
    if page_index != pagination.page_index {
        log_debug!(
            "ROWMODEL",
            "page index {} is past the last page, showing page {}",
            pagination.page_index,
            page_index
        );
    }
    let start = (page_index * page_size).min(pre.len());
    let end = (start + page_size).min(pre.len());
    let page = &pre.rows[start..end];
    let rows = match expanded {
        Some(expanded) => expand_rows(page, expanded),
        None => page.to_vec(),
    };

    let mut seen = FxHashSet::default();
    let mut flat_rows = Vec::with_capacity(rows.len());
    for row in &rows {
        push_unseen(row, &mut seen, &mut flat_rows);
    }
    RowModel::with_flat_rows(rows, flat_rows)
}

fn push_unseen<T>(row: &Rc<Row<T>>, seen: &mut FxHashSet<String>, flat: &mut Vec<Rc<Row<T>>>) {
    if !seen.insert(row.id.clone()) {
        return;
    }
    flat.push(Rc::clone(row));
    for sub in &row.sub_rows {
        push_unseen(sub, seen, flat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDef;
    use crate::features::{ColumnGrouping, RowExpanding, RowPagination};
    use crate::options::{TableOptions, TableSettings};
    use crate::state::TableState;
    use crate::value::Record;

    fn numbered(rows: usize) -> Vec<Record> {
        (0..rows)
            .map(|i| {
                let mut record = Record::default();
                record.insert("n".to_string(), ((i + 1) as f64).into());
                record.insert("kind".to_string(), if i % 2 == 0 { "even" } else { "odd" }.into());
                record
            })
            .collect()
    }

    fn options(rows: usize) -> TableOptions<Record> {
        let columns = vec![ColumnDef::accessor("n"), ColumnDef::accessor("kind")];
        TableOptions::new(columns, numbered(rows)).feature(RowPagination)
    }

    fn page_values(table: &Table<Record>) -> Vec<String> {
        table
            .get_row_model()
            .rows
            .iter()
            .map(|r| r.get_value(table, "n").display_value())
            .collect()
    }

    #[test]
    fn test_out_of_range_page_is_clamped() {
        let options = options(25).initial_state(TableState {
            pagination: Some(PaginationState {
                page_index: 5,
                page_size: 10,
            }),
            ..Default::default()
        });
        let table = Table::new(options).unwrap();
        assert_eq!(page_values(&table), vec!["21", "22", "23", "24", "25"]);
    }

    #[test]
    fn test_window_moves_with_page_index() {
        let table = Table::new(options(25)).unwrap();
        assert_eq!(table.get_row_model().len(), 10);
        table.next_page().unwrap();
        assert_eq!(page_values(&table)[0], "11");
    }

    #[test]
    fn test_empty_data_gives_empty_page() {
        let table = Table::new(options(0)).unwrap();
        assert!(table.get_row_model().is_empty());
        assert_eq!(table.get_page_count(), 0);
    }

    #[test]
    fn test_manual_pagination_passes_through() {
        let options = options(25).settings(TableSettings {
            manual_pagination: Some(true),
            ..Default::default()
        });
        let table = Table::new(options).unwrap();
        assert_eq!(table.get_row_model().len(), 25);
    }

    #[test]
    fn test_pages_cut_before_expanding() {
        let options = options(6)
            .feature(ColumnGrouping)
            .feature(RowExpanding)
            .settings(TableSettings {
                paginate_expanded_rows: Some(false),
                ..Default::default()
            });
        let table = Table::new(options).unwrap();
        table.set_grouping(vec!["kind".to_string()]).unwrap();
        table.set_page_size(1usize).unwrap();
        table.toggle_all_rows_expanded(Some(true)).unwrap();
        let model = table.get_row_model();
        assert_eq!(model.len(), 4);
        assert_eq!(model.rows[0].id, "kind:even");
        assert_eq!(model.flat_rows.len(), 4);
        assert_eq!(table.get_page_count(), 2);
    }
}
