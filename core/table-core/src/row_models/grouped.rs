//! FILENAME: core/table-core/src/row_models/grouped.rs
//! PURPOSE: The grouped row model: a group tree over the leaf rows.
//! CONTEXT: One tree level per grouping column, outermost first. Within a level
//! groups appear in the order their first member appears. A group row id is
//! `{column id}:{value}`, prefixed by its parent group's id and `>` below the
//! top level. Sibling groups whose values display the same (`1` and `"1"`)
//! get a `#2`, `#3`... suffix in appearance order, so ids stay unique. Group
//! rows carry:
//! - the group value for every grouping column (read from the first member),
//! - the column's aggregation over the group for every other column,
//! - `Empty` for columns with no aggregation.

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::column::Column;
use crate::fns::AggregationFn;
use crate::logging::{log_debug, log_warn};
use crate::row::{Row, RowModel};
use crate::state::{slice, GroupingState};
use crate::table::Table;
use crate::value::{CellValue, GroupKey, RowData};

type GroupedDeps<T> = (Rc<RowModel<T>>, Option<Rc<GroupingState>>);

impl<T: RowData> Table<T> {
    pub fn get_pre_grouped_row_model(&self) -> Rc<RowModel<T>> {
        self.get_core_row_model()
    }

    pub fn get_grouped_row_model(&self) -> Rc<RowModel<T>> {
        let deps: GroupedDeps<T> = (
            self.get_pre_grouped_row_model(),
            self.store.get::<slice::Grouping>(),
        );
        let compute = |(pre, grouping): &GroupedDeps<T>| match grouping {
            Some(grouping) if !grouping.is_empty() && !self.settings().manual_grouping.unwrap_or(false) => {
                group_rows(self, &pre.rows, grouping).map_or_else(|| Rc::clone(pre), Rc::new)
            }
            _ => Rc::clone(pre),
        };
        self.apis
            .memo("get_grouped_row_model", deps.clone(), &compute)
            .unwrap_or_else(|| compute(&deps))
    }
}

/// Groups leaf `rows` by the columns in `grouping`.
///
/// Ids that name no leaf column are skipped. `None` when none is left.
pub(crate) fn group_rows<T: RowData>(
    table: &Table<T>,
    rows: &[Rc<Row<T>>],
    grouping: &[String],
) -> Option<RowModel<T>> {
    let mut levels = Vec::with_capacity(grouping.len());
    for id in grouping {
        match table.get_column(id) {
            Some(column) if column.leaf_position.is_some() => levels.push(column),
            _ => log_warn!("ROWMODEL", "cannot group by '{}'", id),
        }
    }
    if levels.is_empty() {
        return None;
    }
    let aggregations = table
        .leaf_columns_by_position()
        .iter()
        .map(|column| column.get_aggregation_fn(table))
        .collect();
    let grouper = Grouper {
        table,
        levels,
        aggregations,
    };
    let top = grouper.group_level(rows, 0, None);
    log_debug!("ROWMODEL", "grouped: {} rows into {} groups", rows.len(), top.len());
    Some(RowModel::new(top))
}

struct Grouper<'a, T: RowData> {
    table: &'a Table<T>,
    levels: Vec<Rc<Column<T>>>,
    /// Indexed by leaf position.
    aggregations: Vec<Option<AggregationFn>>,
}

impl<T: RowData> Grouper<'_, T> {
    fn group_level(&self, rows: &[Rc<Row<T>>], depth: usize, parent_id: Option<&str>) -> Vec<Rc<Row<T>>> {
        let Some(column) = self.levels.get(depth) else {
            return rows
                .iter()
                .map(|row| Rc::new(row.with_depth(depth, parent_id)))
                .collect();
        };
        let position = column.leaf_position.unwrap_or_default();

        let mut buckets: Vec<(CellValue, Vec<Rc<Row<T>>>)> = Vec::new();
        let mut index: FxHashMap<GroupKey, usize> = FxHashMap::default();
        for row in rows {
            let value = row.value_at(position);
            let slot = *index.entry(GroupKey::from(value)).or_insert_with(|| {
                buckets.push((value.clone(), Vec::new()));
                buckets.len() - 1
            });
            buckets[slot].1.push(Rc::clone(row));
        }

        let mut taken: FxHashSet<String> = FxHashSet::default();
        buckets
            .into_iter()
            .enumerate()
            .map(|(group_index, (value, members))| {
                let base = match parent_id {
                    Some(parent) => format!("{}>{}:{}", parent, column.id, value.display_value()),
                    None => format!("{}:{}", column.id, value.display_value()),
                };
                let id = unique_id(base, &mut taken);
                let sub_rows = self.group_level(&members, depth + 1, Some(&id));
                let leaf_rows: Vec<Rc<Row<T>>> = sub_rows
                    .iter()
                    .flat_map(|sub| {
                        if sub.is_group_row() {
                            sub.leaf_rows.iter().cloned().collect()
                        } else {
                            vec![Rc::clone(sub)]
                        }
                    })
                    .collect();
                // members is never empty: a bucket exists because a row landed in it
                let first = &members[0];
                let values = self.group_values(first, &sub_rows, &leaf_rows);
                Rc::new(Row {
                    id,
                    index: group_index,
                    depth,
                    parent_id: parent_id.map(str::to_string),
                    original: Rc::clone(&first.original),
                    original_index: first.original_index,
                    values,
                    sub_rows,
                    leaf_rows: Rc::new(leaf_rows),
                    grouping_column_id: Some(column.id.clone()),
                    grouping_value: Some(value),
                    apis: self.table.new_row_apis(),
                })
            })
            .collect()
    }

    fn group_values(&self, first: &Row<T>, sub_rows: &[Rc<Row<T>>], leaf_rows: &[Rc<Row<T>>]) -> Vec<CellValue> {
        self.aggregations
            .iter()
            .enumerate()
            .map(|(position, aggregation)| {
                if self.levels.iter().any(|c| c.leaf_position == Some(position)) {
                    return first.value_at(position).clone();
                }
                let Some(aggregate) = aggregation else {
                    return CellValue::Empty;
                };
                let leaf_values: Vec<CellValue> = leaf_rows.iter().map(|r| r.value_at(position).clone()).collect();
                let child_values: Vec<CellValue> = sub_rows.iter().map(|r| r.value_at(position).clone()).collect();
                aggregate(&leaf_values, &child_values)
            })
            .collect()
    }
}

/// `base`, or `base#n` with the smallest `n >= 2` not yet in `taken`.
fn unique_id(base: String, taken: &mut FxHashSet<String>) -> String {
    let mut id = base.clone();
    let mut n = 2;
    while taken.contains(&id) {
        id = format!("{}#{}", base, n);
        n += 1;
    }
    taken.insert(id.clone());
    id
}
