//! `SchemaStatements` - the schema primitives the index middleware consumes

use super::index_definition::IndexDefinition;
use crate::options::OptionMap;
use crate::LifeError;

/// Schema-mutation primitives
///
/// Implemented by the schema engines ([`SchemaManager`](super::SchemaManager) for
/// PostgreSQL, [`MemorySchema`](super::MemorySchema)), by the
/// [`CommandRecorder`](super::CommandRecorder), and by
/// [`IndexingSchema`](super::IndexingSchema), which runs the middleware chains in
/// front of another implementation. Middleware receives the `IndexingSchema` as
/// its caller, so statements issued from a stage go through the chains again.
pub trait SchemaStatements {
    /// Add `column` of type `column_type` to `table`
    ///
    /// # Errors
    ///
    /// Returns the engine's error when the column cannot be added.
    fn add_column(
        &self,
        table: &str,
        column: &str,
        column_type: &str,
        options: &OptionMap,
    ) -> Result<(), LifeError>;

    /// Create an index on `table` over `columns`, in order
    ///
    /// # Errors
    ///
    /// Returns the engine's error when the index cannot be created, including the
    /// "already exists" failure for a name that is taken.
    fn add_index(&self, table: &str, columns: &[String], options: &OptionMap) -> Result<(), LifeError>;

    /// Current indexes of `table`
    ///
    /// # Errors
    ///
    /// Returns the engine's error when the catalogue cannot be read.
    fn indexes(&self, table: &str) -> Result<Vec<IndexDefinition>, LifeError>;

    /// Whether `length` (prefix length) takes part in the indexes this engine
    /// creates and reports back from [`indexes`](Self::indexes)
    fn supports_index_length(&self) -> bool {
        true
    }
}

impl<T: SchemaStatements + ?Sized> SchemaStatements for &T {
    fn add_column(
        &self,
        table: &str,
        column: &str,
        column_type: &str,
        options: &OptionMap,
    ) -> Result<(), LifeError> {
        (**self).add_column(table, column, column_type, options)
    }

    fn add_index(&self, table: &str, columns: &[String], options: &OptionMap) -> Result<(), LifeError> {
        (**self).add_index(table, columns, options)
    }

    fn indexes(&self, table: &str) -> Result<Vec<IndexDefinition>, LifeError> {
        (**self).indexes(table)
    }

    fn supports_index_length(&self) -> bool {
        (**self).supports_index_length()
    }
}
