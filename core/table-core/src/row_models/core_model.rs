//! FILENAME: core/table-core/src/row_models/core_model.rs
//! PURPOSE: The core row model: one row per record, in data order.
//! CONTEXT: Every leaf value is read here, once per record and leaf column.
//! Later stages only rearrange these rows or build group rows over them.

use std::rc::Rc;

use crate::logging::log_debug;
use crate::row::{Row, RowModel};
use crate::table::{ColumnList, Table};
use crate::value::RowData;

type CoreDeps<T> = (Rc<Vec<Rc<T>>>, ColumnList<T>, Rc<Vec<String>>);

impl<T: RowData> Table<T> {
    pub fn get_core_row_model(&self) -> Rc<RowModel<T>> {
        let deps: CoreDeps<T> = (
            Rc::clone(self.data()),
            Rc::clone(self.leaf_columns_by_position()),
            Rc::clone(self.row_ids()),
        );
        let compute = |(data, leaves, ids): &CoreDeps<T>| Rc::new(self.build_core_rows(data, leaves, ids));
        self.apis
            .memo("get_core_row_model", deps.clone(), &compute)
            .unwrap_or_else(|| compute(&deps))
    }

    fn build_core_rows(&self, data: &[Rc<T>], leaves: &ColumnList<T>, ids: &[String]) -> RowModel<T> {
        let rows = data
            .iter()
            .enumerate()
            .map(|(index, original)| {
                let values = leaves
                    .iter()
                    .map(|column| column.read_value(original, index))
                    .collect();
                let id = ids.get(index).cloned().unwrap_or_else(|| index.to_string());
                Rc::new(Row::leaf(id, index, Rc::clone(original), values, self.new_row_apis()))
            })
            .collect();
        log_debug!("ROWMODEL", "core: {} rows x {} columns", data.len(), leaves.len());
        RowModel::new(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDef;
    use crate::options::TableOptions;
    use crate::value::{CellValue, Record};
    use rustc_hash::FxHashSet;

    fn record(name: &str) -> Record {
        let mut record = Record::default();
        record.insert("name".to_string(), name.into());
        record
    }

    #[test]
    fn test_one_row_per_record() {
        let data = vec![record("a"), record("b"), record("c")];
        let table = Table::new(TableOptions::new(vec![ColumnDef::accessor("name")], data)).unwrap();
        let model = table.get_core_row_model();
        assert_eq!(model.len(), 3);
        let ids: FxHashSet<_> = model.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(model.rows[1].get_value(&table, "name"), CellValue::from("b"));
        assert!(Rc::ptr_eq(&model, &table.get_core_row_model()));
    }

    #[test]
    fn test_accessor_failure_stays_in_its_cell() {
        let columns = vec![
            ColumnDef::accessor("name"),
            ColumnDef::try_accessor_fn("len", |r: &Record, _| match r.get("name") {
                Some(CellValue::Text(s)) if s != "b" => Ok(CellValue::from(s.len() as f64)),
                _ => Err("no length".to_string()),
            }),
        ];
        let data = vec![record("a"), record("b")];
        let table = Table::new(TableOptions::new(columns, data)).unwrap();
        let model = table.get_core_row_model();
        assert_eq!(model.rows[0].get_value(&table, "len"), CellValue::Number(1.0));
        assert_eq!(model.rows[1].get_value(&table, "len"), CellValue::Unavailable);
        assert_eq!(model.rows[1].get_value(&table, "name"), CellValue::from("b"));
    }

    #[test]
    fn test_custom_row_ids() {
        let data = vec![record("x"), record("y")];
        let options = TableOptions::new(vec![ColumnDef::accessor("name")], data).get_row_id(|r, _| {
            r.get("name").map(CellValue::display_value).unwrap_or_default()
        });
        let table = Table::new(options).unwrap();
        assert!(table.get_core_row_model().get("y").is_some());
    }
}
