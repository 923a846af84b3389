//! FILENAME: core/table-core/src/features/row_pagination.rs
//! PURPOSE: Page index and size, page counts and page navigation.
//! CONTEXT: Navigation never fails on a bad index: requests are clamped to the
//! available pages. Hosts paginating on a server supply `page_count` or
//! `row_count` and set `manual_pagination`.

use crate::error::Result;
use crate::feature::TableFeature;
use crate::logging::log_debug;
use crate::state::{slice, PaginationState, SliceKey, TableState, DEFAULT_PAGE_INDEX, DEFAULT_PAGE_SIZE};
use crate::table::Table;
use crate::updater::Updater;
use crate::value::RowData;

pub const FEATURE: &str = "RowPagination";

pub struct RowPagination;

impl<T: RowData> TableFeature<T> for RowPagination {
    fn name(&self) -> &'static str {
        FEATURE
    }

    fn state_slices(&self) -> &'static [SliceKey] {
        &[SliceKey::Pagination]
    }

    fn initial_state(&self, state: &mut TableState) {
        state.pagination = Some(PaginationState::default());
    }
}

/// `ceil(rows / page_size)`. A zero page size counts as one.
pub fn page_count_for(row_count: usize, page_size: usize) -> usize {
    row_count.div_ceil(page_size.max(1))
}

impl<T: RowData> Table<T> {
    pub fn set_pagination(&self, updater: impl Into<Updater<PaginationState>>) -> Result<()> {
        self.store.set::<slice::Pagination>(updater.into())
    }

    pub fn reset_pagination(&self, default_state: bool) -> Result<()> {
        let value = default_state.then(PaginationState::default);
        self.store.reset::<slice::Pagination>(value)
    }

    /// Moves to a page. The index is clamped to `[0, page_count - 1]`.
    pub fn set_page_index(&self, updater: impl Into<Updater<usize>>) -> Result<()> {
        let current = self.require::<slice::Pagination>()?;
        let requested = updater.into().resolve(&current.page_index);
        let last = self.get_page_count().saturating_sub(1);
        let page_index = requested.min(last);
        if page_index != requested {
            log_debug!("ROWMODEL", "page index {} clamped to {}", requested, page_index);
        }
        self.set_pagination(PaginationState {
            page_index,
            ..*current
        })
    }

    pub fn reset_page_index(&self, default_state: bool) -> Result<()> {
        let initial = self
            .store
            .initial::<slice::Pagination>()
            .map_or(DEFAULT_PAGE_INDEX, |p| p.page_index);
        self.set_page_index(if default_state { DEFAULT_PAGE_INDEX } else { initial })
    }

    /// Changes the page size, keeping the first row of the current page in view.
    pub fn set_page_size(&self, updater: impl Into<Updater<usize>>) -> Result<()> {
        let current = self.require::<slice::Pagination>()?;
        let page_size = updater.into().resolve(&current.page_size).max(1);
        let top_row = current.page_size * current.page_index;
        self.set_pagination(PaginationState {
            page_index: top_row / page_size,
            page_size,
        })
    }

    pub fn reset_page_size(&self, default_state: bool) -> Result<()> {
        let initial = self
            .store
            .initial::<slice::Pagination>()
            .map_or(DEFAULT_PAGE_SIZE, |p| p.page_size);
        self.set_page_size(if default_state { DEFAULT_PAGE_SIZE } else { initial })
    }

    /// Zero-based page indices, one per page.
    pub fn get_page_options(&self) -> Vec<usize> {
        (0..self.get_page_count()).collect()
    }

    pub fn get_can_previous_page(&self) -> bool {
        self.store
            .get::<slice::Pagination>()
            .is_some_and(|p| p.page_index > 0)
    }

    pub fn get_can_next_page(&self) -> bool {
        let Some(pagination) = self.store.get::<slice::Pagination>() else {
            return false;
        };
        pagination.page_index + 1 < self.get_page_count()
    }

    pub fn previous_page(&self) -> Result<()> {
        self.set_page_index(Updater::with(|old: &usize| old.saturating_sub(1)))
    }

    pub fn next_page(&self) -> Result<()> {
        self.set_page_index(Updater::with(|old: &usize| old + 1))
    }

    pub fn first_page(&self) -> Result<()> {
        self.set_page_index(0usize)
    }

    pub fn last_page(&self) -> Result<()> {
        let last = self.get_page_count().saturating_sub(1);
        self.set_page_index(last)
    }

    /// `page_count` from settings, else `ceil(row_count / page_size)`.
    ///
    /// Without pagination every row is on one page.
    pub fn get_page_count(&self) -> usize {
        if let Some(page_count) = self.settings().page_count {
            return page_count;
        }
        let row_count = self.get_row_count();
        match self.store.get::<slice::Pagination>() {
            Some(pagination) => page_count_for(row_count, pagination.page_size),
            None => usize::from(row_count > 0),
        }
    }

    /// `row_count` from settings, else the number of rows before pagination.
    pub fn get_row_count(&self) -> usize {
        self.settings()
            .row_count
            .unwrap_or_else(|| self.get_pre_pagination_row_model().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDef;
    use crate::options::{TableOptions, TableSettings};
    use crate::value::Record;

    fn table(rows: usize, settings: TableSettings) -> Table<Record> {
        let data = (0..rows)
            .map(|i| {
                let mut record = Record::default();
                record.insert("n".to_string(), (i as f64).into());
                record
            })
            .collect();
        let options = TableOptions::new(vec![ColumnDef::accessor("n")], data)
            .feature(RowPagination)
            .settings(settings);
        Table::new(options).unwrap()
    }

    #[test]
    fn test_page_count_rounds_up() {
        assert_eq!(page_count_for(25, 10), 3);
        assert_eq!(page_count_for(30, 10), 3);
        assert_eq!(page_count_for(0, 10), 0);
        assert_eq!(page_count_for(5, 0), 5);
    }

    #[test]
    fn test_set_page_index_clamps() {
        let table = table(25, TableSettings::default());
        table.set_page_index(5usize).unwrap();
        assert_eq!(table.state::<slice::Pagination>().unwrap().page_index, 2);
        assert!(!table.get_can_next_page());
        table.previous_page().unwrap();
        table.previous_page().unwrap();
        table.previous_page().unwrap();
        assert_eq!(table.state::<slice::Pagination>().unwrap().page_index, 0);
        assert!(!table.get_can_previous_page());
    }

    #[test]
    fn test_set_page_size_keeps_top_row() {
        let table = table(100, TableSettings::default());
        table.set_page_index(3usize).unwrap();
        table.set_page_size(25usize).unwrap();
        let pagination = *table.state::<slice::Pagination>().unwrap();
        assert_eq!(pagination, PaginationState { page_index: 1, page_size: 25 });
    }

    #[test]
    fn test_server_side_counts() {
        let table = table(
            10,
            TableSettings {
                manual_pagination: Some(true),
                row_count: Some(95),
                ..Default::default()
            },
        );
        assert_eq!(table.get_row_count(), 95);
        assert_eq!(table.get_page_count(), 10);
        table.last_page().unwrap();
        assert_eq!(table.state::<slice::Pagination>().unwrap().page_index, 9);
        assert_eq!(table.get_page_options().len(), 10);
    }

    #[test]
    fn test_navigation_without_feature() {
        let data = vec![Record::default()];
        let table = Table::new(TableOptions::new(vec![ColumnDef::accessor("n")], data)).unwrap();
        assert_eq!(table.get_page_count(), 1);
        assert!(!table.get_can_next_page());
        assert!(table.next_page().is_err());
    }
}
