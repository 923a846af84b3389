//! FILENAME: core/table-core/src/row_models/mod.rs
//! PURPOSE: The row model pipeline.
//! CONTEXT: Stages run in a fixed order, each reading the previous stage's
//! output:
//!
//! core -> grouped -> filtered -> sorted -> expanded -> paginated
//!
//! Every stage is memoized on its input model plus the state slices it reads.
//! A stage whose feature is absent, whose state is empty or whose `manual_*`
//! flag is set hands its input through unchanged (the same `Rc`), so later
//! stages see no change and keep their caches.

mod core_model;
mod expanded;
mod filtered;
mod grouped;
mod paginated;
mod sorted;

use std::rc::Rc;

pub(crate) use grouped::group_rows;

use crate::row::{Row, RowModel};
use crate::table::Table;
use crate::value::RowData;

impl<T: RowData> Table<T> {
    /// The final row model: what a renderer draws.
    pub fn get_row_model(&self) -> Rc<RowModel<T>> {
        self.get_pagination_row_model()
    }

    /// Looks a row up by id in the final row model, or in the pre-pagination
    /// model with `search_all`. Falls back to the core model.
    pub fn get_row(&self, id: &str, search_all: bool) -> Option<Rc<Row<T>>> {
        let model = if search_all {
            self.get_pre_pagination_row_model()
        } else {
            self.get_row_model()
        };
        if let Some(row) = model.get(id) {
            return Some(Rc::clone(row));
        }
        self.get_core_row_model().get(id).cloned()
    }
}
