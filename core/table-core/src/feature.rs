//! FILENAME: core/table-core/src/feature.rs
//! PURPOSE: The hook interface every table feature implements.
//! CONTEXT: `Table::new` runs the hooks of every registered feature in
//! registration order, core features first. A feature never adds fields to
//! the table, its columns or its rows: it declares state slices and options
//! defaults, resolves column statics, and assigns named APIs into the entity's
//! `ApiRegistry`. The methods behind those names live in `impl` blocks in the
//! feature's own module and report a neutral value when their API is missing.

use crate::column::Column;
use crate::error::Result;
use crate::memo::ApiRegistry;
use crate::options::{TableOptions, TableSettings};
use crate::state::{SliceKey, TableState};
use crate::table::Table;
use crate::value::RowData;

pub trait TableFeature<T: RowData> {
    /// Unique feature name, used in dependency checks and error messages.
    fn name(&self) -> &'static str;

    /// Names of features that must also be registered.
    fn dependencies(&self) -> &'static [&'static str] {
        &[]
    }

    /// State slices this feature owns. A slice can have only one owner.
    fn state_slices(&self) -> &'static [SliceKey] {
        &[]
    }

    /// Adds this feature's default slice values.
    fn initial_state(&self, _state: &mut TableState) {}

    /// Fills in settings the caller left unset.
    fn default_options(&self, _settings: &mut TableSettings) {}

    fn construct_column(&self, _column: &mut Column<T>, _options: &TableOptions<T>) -> Result<()> {
        Ok(())
    }

    /// Assigns row APIs. Runs once against the prototype registry every
    /// materialized row is created from.
    fn construct_row(&self, _apis: &mut ApiRegistry) -> Result<()> {
        Ok(())
    }

    /// Assigns table APIs and validates the applied state.
    fn construct_table(&self, _table: &mut Table<T>) -> Result<()> {
        Ok(())
    }
}
