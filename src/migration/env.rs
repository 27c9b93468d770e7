//! Per-call environments passed through the middleware chains
//!
//! One environment is created for every `add_column` / `add_index` call and is
//! owned by that chain invocation. Stages mutate it in place; the terminal schema
//! primitive sees the final state.

use crate::options::OptionMap;

/// The kind of migration step being processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Apply the step to the database
    Add,
    /// Record the step without applying it (see [`CommandRecorder`](super::CommandRecorder))
    Record,
    /// The step runs while reverting a migration
    Remove,
}

/// Environment of an `add_column` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnEnv {
    pub operation: Operation,
    pub table_name: String,
    pub column_name: String,
    pub column_type: String,
    pub options: OptionMap,
}

impl ColumnEnv {
    pub fn new(
        operation: Operation,
        table_name: impl Into<String>,
        column_name: impl Into<String>,
        column_type: impl Into<String>,
        options: OptionMap,
    ) -> Self {
        Self {
            operation,
            table_name: table_name.into(),
            column_name: column_name.into(),
            column_type: column_type.into(),
            options,
        }
    }
}

/// Environment of an `add_index` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEnv {
    pub operation: Operation,
    pub table_name: String,
    /// Indexed columns in index order
    pub column_names: Vec<String>,
    pub options: OptionMap,
}

impl IndexEnv {
    pub fn new(
        operation: Operation,
        table_name: impl Into<String>,
        column_names: Vec<String>,
        options: OptionMap,
    ) -> Self {
        Self {
            operation,
            table_name: table_name.into(),
            column_names,
            options,
        }
    }
}
