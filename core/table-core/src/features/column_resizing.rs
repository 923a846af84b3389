//! FILENAME: core/table-core/src/features/column_resizing.rs
//! PURPOSE: Pointer-driven resize gestures over column headers.
//! CONTEXT: A gesture is start, any number of updates, then end. The
//! `column_sizing_info` slice holds the gesture bookkeeping; the resulting
//! sizes are written to `column_sizing` on every update (`OnChange`) or only
//! when the gesture ends (`OnEnd`). Dragging a group header scales each of its
//! leaf columns by the same percentage.

use std::rc::Rc;

use crate::column::Column;
use crate::error::Result;
use crate::feature::TableFeature;
use crate::features::column_sizing::{self, leaf_sizes};
use crate::header::Header;
use crate::logging::log_debug;
use crate::options::{ColumnResizeDirection, ColumnResizeMode, TableSettings};
use crate::state::{slice, ColumnSizingInfoState, ColumnSizingState, SliceKey, TableState};
use crate::table::Table;
use crate::updater::Updater;
use crate::value::RowData;

pub const FEATURE: &str = "ColumnResizing";

/// Lower bound of the size delta ratio, so a drag can never invert a column.
const MIN_DELTA_PERCENTAGE: f64 = -0.999999;

pub struct ColumnResizing;

impl<T: RowData> TableFeature<T> for ColumnResizing {
    fn name(&self) -> &'static str {
        FEATURE
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[column_sizing::FEATURE]
    }

    fn state_slices(&self) -> &'static [SliceKey] {
        &[SliceKey::ColumnSizingInfo]
    }

    fn initial_state(&self, state: &mut TableState) {
        state.column_sizing_info = Some(ColumnSizingInfoState::default());
    }

    fn default_options(&self, settings: &mut TableSettings) {
        settings.column_resize_mode.get_or_insert(ColumnResizeMode::OnEnd);
        settings
            .column_resize_direction
            .get_or_insert(ColumnResizeDirection::Ltr);
    }
}

/// Rounds to two decimals.
fn round_size(size: f64) -> f64 {
    (size * 100.0).round() / 100.0
}

impl<T: RowData> Column<T> {
    pub fn get_can_resize(&self, table: &Table<T>) -> bool {
        if table.store.get::<slice::ColumnSizingInfo>().is_none() {
            return false;
        }
        self.column_def
            .enable_resizing
            .or(table.settings().enable_column_resizing)
            .unwrap_or(true)
    }

    pub fn get_is_resizing(&self, table: &Table<T>) -> bool {
        table
            .store
            .get::<slice::ColumnSizingInfo>()
            .is_some_and(|info| info.is_resizing_column.as_deref() == Some(self.id.as_str()))
    }
}

impl<T: RowData> Table<T> {
    pub fn set_column_sizing_info(&self, updater: impl Into<Updater<ColumnSizingInfoState>>) -> Result<()> {
        self.store.set::<slice::ColumnSizingInfo>(updater.into())
    }

    /// Back to the initial gesture info, or to no gesture with `default_state`.
    pub fn reset_header_size_info(&self, default_state: bool) -> Result<()> {
        let value = default_state.then(ColumnSizingInfoState::default);
        self.store.reset::<slice::ColumnSizingInfo>(value)
    }

    /// Starts a resize gesture on `header` at pointer offset `client_x`.
    ///
    /// Does nothing when the header's column cannot resize.
    pub fn start_resize(&self, header: &Rc<Header<T>>, client_x: f64) -> Result<()> {
        self.require::<slice::ColumnSizingInfo>()?;
        if !header.column.get_can_resize(self) {
            return Ok(());
        }
        let leaves: Vec<Rc<Column<T>>> = header
            .get_leaf_headers()
            .iter()
            .map(|leaf| Rc::clone(&leaf.column))
            .collect();
        let info = ColumnSizingInfoState {
            start_offset: Some(client_x),
            start_size: Some(header.get_size(self)),
            delta_offset: Some(0.0),
            delta_percentage: Some(0.0),
            is_resizing_column: Some(header.column.id.clone()),
            column_sizing_start: leaf_sizes(self, &leaves),
        };
        log_debug!("COLUMNS", "resize started on '{}'", header.column.id);
        self.set_column_sizing_info(info)
    }

    /// Moves the active gesture to `client_x`.
    pub fn update_resize(&self, client_x: f64) -> Result<()> {
        self.move_resize(client_x, false)
    }

    /// Ends the active gesture at `client_x`, committing the new sizes.
    pub fn end_resize(&self, client_x: f64) -> Result<()> {
        self.move_resize(client_x, true)?;
        self.set_column_sizing_info(ColumnSizingInfoState::default())
    }

    fn move_resize(&self, client_x: f64, ending: bool) -> Result<()> {
        let info = self.require::<slice::ColumnSizingInfo>()?;
        let (Some(start_offset), Some(start_size)) = (info.start_offset, info.start_size) else {
            return Ok(());
        };
        let direction = match self.settings().column_resize_direction {
            Some(ColumnResizeDirection::Rtl) => -1.0,
            _ => 1.0,
        };
        let delta_offset = (client_x - start_offset) * direction;
        let delta_percentage = if start_size > 0.0 {
            (delta_offset / start_size).max(MIN_DELTA_PERCENTAGE)
        } else {
            0.0
        };

        let new_sizes: Vec<(String, f64)> = info
            .column_sizing_start
            .iter()
            .map(|(id, size)| (id.clone(), round_size((size + size * delta_percentage).max(0.0))))
            .collect();

        self.set_column_sizing_info(Updater::with(move |old: &ColumnSizingInfoState| {
            ColumnSizingInfoState {
                delta_offset: Some(delta_offset),
                delta_percentage: Some(delta_percentage),
                ..old.clone()
            }
        }))?;

        let mode = self.settings().column_resize_mode.unwrap_or_default();
        if ending || mode == ColumnResizeMode::OnChange {
            self.set_column_sizing(Updater::with(move |old: &ColumnSizingState| {
                let mut next = old.clone();
                next.extend(new_sizes);
                next
            }))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDef;
    use crate::features::ColumnSizing;
    use crate::options::TableOptions;
    use crate::value::Record;

    fn table(settings: TableSettings) -> Table<Record> {
        let columns = vec![
            ColumnDef::accessor("a").size(100.0),
            ColumnDef::group(
                "G",
                vec![ColumnDef::accessor("b").size(100.0), ColumnDef::accessor("c").size(50.0)],
            ),
            ColumnDef::accessor("d").enable_resizing(false),
        ];
        let options = TableOptions::new(columns, Vec::new())
            .feature(ColumnSizing)
            .feature(ColumnResizing)
            .settings(settings);
        Table::new(options).unwrap()
    }

    fn leaf_header(table: &Table<Record>, id: &str) -> Rc<Header<Record>> {
        table
            .get_flat_headers()
            .iter()
            .find(|h| h.column.id == id && !h.is_placeholder)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_on_end_commits_only_at_end() {
        let table = table(TableSettings::default());
        let a = table.column("a").unwrap();
        table.start_resize(&leaf_header(&table, "a"), 500.0).unwrap();
        assert!(a.get_is_resizing(&table));
        table.update_resize(550.0).unwrap();
        assert_eq!(a.get_size(&table), 100.0);
        table.end_resize(550.0).unwrap();
        assert_eq!(a.get_size(&table), 150.0);
        assert!(!a.get_is_resizing(&table));
    }

    #[test]
    fn test_on_change_writes_every_move() {
        let table = table(TableSettings {
            column_resize_mode: Some(ColumnResizeMode::OnChange),
            ..Default::default()
        });
        let a = table.column("a").unwrap();
        table.start_resize(&leaf_header(&table, "a"), 0.0).unwrap();
        table.update_resize(-25.0).unwrap();
        assert_eq!(a.get_size(&table), 75.0);
    }

    #[test]
    fn test_group_header_scales_leaves_proportionally() {
        let table = table(TableSettings::default());
        let group = leaf_header(&table, "G");
        table.start_resize(&group, 0.0).unwrap();
        table.end_resize(75.0).unwrap();
        assert_eq!(table.column("b").unwrap().get_size(&table), 150.0);
        assert_eq!(table.column("c").unwrap().get_size(&table), 75.0);
    }

    #[test]
    fn test_rtl_inverts_delta() {
        let table = table(TableSettings {
            column_resize_direction: Some(ColumnResizeDirection::Rtl),
            ..Default::default()
        });
        table.start_resize(&leaf_header(&table, "a"), 100.0).unwrap();
        table.end_resize(120.0).unwrap();
        assert_eq!(table.column("a").unwrap().get_size(&table), 80.0);
    }

    #[test]
    fn test_disabled_column_ignores_gesture() {
        let table = table(TableSettings::default());
        table.start_resize(&leaf_header(&table, "d"), 0.0).unwrap();
        assert!(table.state::<slice::ColumnSizingInfo>().unwrap().is_resizing_column.is_none());
    }
}
