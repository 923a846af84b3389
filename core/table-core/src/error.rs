//! FILENAME: core/table-core/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("Duplicate column id: {0}")]
    DuplicateColumnId(String),

    #[error("Column requires an id: {0}")]
    MissingColumnId(String),

    #[error("Duplicate row id: {0}")]
    DuplicateRowId(String),

    #[error("State slice '{key}' is declared by both {first} and {second}")]
    ConflictingStateSlice {
        key: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("API '{api}' is assigned by both {first} and {second}")]
    ConflictingApi {
        api: &'static str,
        first: &'static str,
        second: &'static str,
    },

    #[error("Option '{option}' requires the {feature} feature, which is not registered")]
    FeatureNotRegistered {
        option: String,
        feature: &'static str,
    },

    #[error("Feature {feature} requires {requires}, which is not registered")]
    MissingFeatureDependency {
        feature: &'static str,
        requires: &'static str,
    },

    #[error("Unknown {kind} function: {name}")]
    UnknownFunction { kind: &'static str, name: String },

    #[error("Unknown state slice: {0}")]
    UnknownStateSlice(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Column cannot be sorted: {0}")]
    ColumnNotSortable(String),

    #[error("Column cannot be grouped: {0}")]
    ColumnNotGroupable(String),
}

pub type Result<T> = std::result::Result<T, TableError>;
