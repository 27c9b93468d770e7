//! `IndexPipeline` and `IndexingSchema`
//!
//! The pipeline owns the `add_column` and `add_index` chains, built once from
//! [`IndexesConfig`]. [`IndexingSchema`] puts the chains in front of a schema
//! engine for the duration of a migration:
//!
//! ```no_run
//! use lifeguard_indexes::migration::{IndexPipeline, MemorySchema, SchemaStatements};
//! use lifeguard_indexes::options;
//!
//! let pipeline = IndexPipeline::default();
//! let engine = MemorySchema::new();
//! engine.create_table("users", &["id"]);
//!
//! let schema = pipeline.schema(&engine);
//! schema.add_column("users", "email", "string", &options! { "index" => true })?;
//! # Ok::<(), lifeguard_indexes::LifeError>(())
//! ```

use super::diagnostics::{LogSink, WarningSink};
use super::env::{ColumnEnv, IndexEnv, Operation};
use super::index_definition::IndexDefinition;
use super::middleware::Stack;
use super::stages::{IgnoreDuplicates, IndexOnAddColumn, NormalizeArgs, Shortcuts};
use super::statements::SchemaStatements;
use crate::config::IndexesConfig;
use crate::options::OptionMap;
use crate::LifeError;
use std::fmt;
use std::sync::Arc;

/// The `add_column` and `add_index` middleware chains
pub struct IndexPipeline {
    columns: Stack<ColumnEnv>,
    indexes: Stack<IndexEnv>,
}

impl IndexPipeline {
    /// Build the chains for the stages enabled in `config`
    ///
    /// Deprecation and duplicate-skip messages go to `sink`.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::InvalidOption` when a stage is enabled without the stage
    /// it depends on: `index_on_add_column` needs `shortcuts`, `ignore_duplicates`
    /// needs `normalize_args`.
    pub fn new(config: &IndexesConfig, sink: Arc<dyn WarningSink>) -> Result<Self, LifeError> {
        if config.index_on_add_column && !config.shortcuts {
            return Err(LifeError::InvalidOption(
                "indexes.index_on_add_column requires indexes.shortcuts".to_string(),
            ));
        }
        if config.ignore_duplicates && !config.normalize_args {
            return Err(LifeError::InvalidOption(
                "indexes.ignore_duplicates requires indexes.normalize_args".to_string(),
            ));
        }

        let mut columns = Stack::new();
        if config.shortcuts {
            columns.prepend(Shortcuts);
        }
        if config.index_on_add_column {
            columns.append(IndexOnAddColumn);
        }

        let mut indexes = Stack::new();
        if config.normalize_args {
            indexes.prepend(NormalizeArgs::new(sink.clone()));
        }
        if config.ignore_duplicates {
            indexes.prepend(IgnoreDuplicates::new(sink));
        }

        log::debug!(
            "index pipeline built: add_column {:?}, add_index {:?}",
            columns.names(),
            indexes.names()
        );

        Ok(Self { columns, indexes })
    }

    /// Build the pipeline from the `[indexes]` configuration section
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Other` when the configuration cannot be read, or the
    /// errors of [`IndexPipeline::new`].
    pub fn from_config(sink: Arc<dyn WarningSink>) -> Result<Self, LifeError> {
        let config = IndexesConfig::load()
            .map_err(|e| LifeError::Other(format!("Failed to load index configuration: {e}")))?;
        Self::new(&config, sink)
    }

    pub fn columns(&self) -> &Stack<ColumnEnv> {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut Stack<ColumnEnv> {
        &mut self.columns
    }

    pub fn indexes(&self) -> &Stack<IndexEnv> {
        &self.indexes
    }

    pub fn indexes_mut(&mut self) -> &mut Stack<IndexEnv> {
        &mut self.indexes
    }

    /// Run the chains in front of `statements`
    pub fn schema<S: SchemaStatements>(&self, statements: S) -> IndexingSchema<'_, S> {
        IndexingSchema {
            pipeline: self,
            statements,
            operation: Operation::Add,
        }
    }

    /// Like [`schema`](Self::schema), with `Operation::Record` environments
    pub fn recording<S: SchemaStatements>(&self, statements: S) -> IndexingSchema<'_, S> {
        self.schema(statements).with_operation(Operation::Record)
    }
}

impl Default for IndexPipeline {
    /// Every stage enabled, messages to the `log` facade
    fn default() -> Self {
        let sink: Arc<dyn WarningSink> = Arc::new(LogSink);
        let mut columns = Stack::new();
        columns.prepend(Shortcuts).append(IndexOnAddColumn);
        let mut indexes = Stack::new();
        indexes
            .prepend(NormalizeArgs::new(sink.clone()))
            .prepend(IgnoreDuplicates::new(sink));
        Self { columns, indexes }
    }
}

impl fmt::Debug for IndexPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexPipeline")
            .field("columns", &self.columns)
            .field("indexes", &self.indexes)
            .finish()
    }
}

/// A schema engine behind the index middleware chains
///
/// Stages receive the `IndexingSchema` itself as their caller, so an index
/// requested while adding a column runs through the `add_index` chain.
pub struct IndexingSchema<'p, S> {
    pipeline: &'p IndexPipeline,
    statements: S,
    operation: Operation,
}

impl<'p, S: SchemaStatements> IndexingSchema<'p, S> {
    /// Operation recorded in the environments of subsequent calls
    #[must_use]
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The wrapped engine
    pub fn statements(&self) -> &S {
        &self.statements
    }

    pub fn into_inner(self) -> S {
        self.statements
    }
}

impl<S: SchemaStatements> SchemaStatements for IndexingSchema<'_, S> {
    fn add_column(
        &self,
        table: &str,
        column: &str,
        column_type: &str,
        options: &OptionMap,
    ) -> Result<(), LifeError> {
        #[cfg(feature = "tracing")]
        let _span = crate::metrics::tracing_helpers::pipeline_span("add_column", table).entered();

        let mut env = ColumnEnv::new(self.operation, table, column, column_type, options.clone());
        self.pipeline.columns.run(&mut env, self, &|env: &mut ColumnEnv| {
            self.statements
                .add_column(&env.table_name, &env.column_name, &env.column_type, &env.options)
        })
    }

    fn add_index(&self, table: &str, columns: &[String], options: &OptionMap) -> Result<(), LifeError> {
        #[cfg(feature = "tracing")]
        let _span = crate::metrics::tracing_helpers::pipeline_span("add_index", table).entered();

        let mut env = IndexEnv::new(self.operation, table, columns.to_vec(), options.clone());
        self.pipeline.indexes.run(&mut env, self, &|env: &mut IndexEnv| {
            self.statements
                .add_index(&env.table_name, &env.column_names, &env.options)
        })
    }

    fn indexes(&self, table: &str) -> Result<Vec<IndexDefinition>, LifeError> {
        self.statements.indexes(table)
    }

    fn supports_index_length(&self) -> bool {
        self.statements.supports_index_length()
    }
}
