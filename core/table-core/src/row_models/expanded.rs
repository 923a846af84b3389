//! FILENAME: core/table-core/src/row_models/expanded.rs
//! Expanded row model: the children of expanded rows join the top-level list.
//!
//! With `paginate_expanded_rows` off this stage passes through and the
//! paginated stage expands each page instead, so children never spill onto
//! the next page.

use std::rc::Rc;

use crate::features::row_expanding::expand_rows;
use crate::row::RowModel;
use crate::state::{slice, ExpandedState};
use crate::table::Table;
use crate::value::RowData;

type ExpandedDeps<T> = (Rc<RowModel<T>>, Option<Rc<ExpandedState>>);

impl<T: RowData> Table<T> {
    pub fn get_pre_expanded_row_model(&self) -> Rc<RowModel<T>> {
        self.get_sorted_row_model()
    }

    pub fn get_expanded_row_model(&self) -> Rc<RowModel<T>> {
        let deps: ExpandedDeps<T> = (
            self.get_pre_expanded_row_model(),
            self.store.get::<slice::Expanded>(),
        );
        let settings = self.settings();
        let active = settings.paginate_expanded_rows.unwrap_or(true)
            && !settings.manual_expanding.unwrap_or(false);
        let compute = |(pre, expanded): &ExpandedDeps<T>| match expanded {
            Some(expanded) if active && !expanded.is_empty() => Rc::new(RowModel::with_flat_rows(
                expand_rows(&pre.rows, expanded),
                pre.flat_rows.clone(),
            )),
            _ => Rc::clone(pre),
        };
        self.apis
            .memo("get_expanded_row_model", deps.clone(), &compute)
            .unwrap_or_else(|| compute(&deps))
    }

    pub fn get_pre_pagination_row_model(&self) -> Rc<RowModel<T>> {
        self.get_expanded_row_model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDef;
    use crate::features::{ColumnGrouping, RowExpanding};
    use crate::options::{TableOptions, TableSettings};
    use crate::value::Record;

    fn record(kind: &str) -> Record {
        let mut record = Record::default();
        record.insert("kind".to_string(), kind.into());
        record
    }

    fn table(settings: TableSettings) -> Table<Record> {
        let data = vec![record("a"), record("b"), record("a")];
        let options = TableOptions::new(vec![ColumnDef::accessor("kind")], data)
            .feature(ColumnGrouping)
            .feature(RowExpanding)
            .settings(settings);
        let table = Table::new(options).unwrap();
        table.set_grouping(vec!["kind".to_string()]).unwrap();
        table
    }

    #[test]
    fn test_expanded_rows_keep_lookup_of_all_rows() {
        let table = table(TableSettings::default());
        table.toggle_all_rows_expanded(Some(true)).unwrap();
        let model = table.get_expanded_row_model();
        assert_eq!(model.len(), 5);
        assert_eq!(model.flat_rows.len(), 5);
        assert!(model.get("kind:b").is_some());
    }

    #[test]
    fn test_collapsed_passes_through() {
        let table = table(TableSettings::default());
        assert!(Rc::ptr_eq(&table.get_sorted_row_model(), &table.get_expanded_row_model()));
    }

    #[test]
    fn test_manual_expanding_passes_through() {
        let table = table(TableSettings {
            manual_expanding: Some(true),
            ..Default::default()
        });
        table.toggle_all_rows_expanded(Some(true)).unwrap();
        assert_eq!(table.get_expanded_row_model().len(), 2);
    }
}
