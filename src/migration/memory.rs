//! In-memory schema engine
//!
//! `MemorySchema` keeps tables, columns and indexes in memory and fails the way
//! PostgreSQL does for the statements the index middleware issues. Used for dry
//! runs of migrations and in tests.

use super::index_definition::IndexDefinition;
use super::statements::SchemaStatements;
use crate::options::OptionMap;
use crate::LifeError;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct State {
    /// Column names per table, in creation order
    tables: BTreeMap<String, Vec<String>>,
    /// Indexes by name; names are unique across the schema
    indexes: BTreeMap<String, IndexDefinition>,
    /// Every statement applied, in order
    executed: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MemorySchema {
    state: Mutex<State>,
    postgres_messages: bool,
}

impl MemorySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report duplicate indexes with PostgreSQL's message text
    /// (`relation "name" already exists`) instead of `LifeError::DuplicateIndex`
    #[must_use]
    pub fn with_postgres_messages(mut self) -> Self {
        self.postgres_messages = true;
        self
    }

    /// Create (or replace) `table` with `columns`
    pub fn create_table(&self, table: &str, columns: &[&str]) {
        let mut state = self.lock();
        state
            .tables
            .insert(table.to_string(), columns.iter().map(|c| c.to_string()).collect());
        state.executed.push(format!("create_table {table}"));
    }

    /// Column names of `table`, `None` when the table does not exist
    pub fn columns(&self, table: &str) -> Option<Vec<String>> {
        self.lock().tables.get(table).cloned()
    }

    /// Statements applied so far, e.g. `add_index users index_users_on_email`
    pub fn executed(&self) -> Vec<String> {
        self.lock().executed.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn missing_table(table: &str) -> LifeError {
    LifeError::QueryError(format!("relation \"{table}\" does not exist"))
}

impl SchemaStatements for MemorySchema {
    fn add_column(&self, table: &str, column: &str, _column_type: &str, _options: &OptionMap) -> Result<(), LifeError> {
        let mut state = self.lock();
        let columns = state.tables.get_mut(table).ok_or_else(|| missing_table(table))?;
        if columns.iter().any(|c| c == column) {
            return Err(LifeError::QueryError(format!(
                "column \"{column}\" of relation \"{table}\" already exists"
            )));
        }
        columns.push(column.to_string());
        state.executed.push(format!("add_column {table} {column}"));
        Ok(())
    }

    fn add_index(&self, table: &str, columns: &[String], options: &OptionMap) -> Result<(), LifeError> {
        let definition = IndexDefinition::from_options(table, columns, options)?;
        let mut state = self.lock();

        let existing = state.tables.get(table).ok_or_else(|| missing_table(table))?;
        if let Some(column) = columns.iter().find(|c| !existing.contains(c)) {
            return Err(LifeError::QueryError(format!("column \"{column}\" does not exist")));
        }

        // tables and indexes share one relation namespace
        if state.tables.contains_key(&definition.name) {
            return Err(LifeError::QueryError(format!(
                "relation \"{}\" already exists",
                definition.name
            )));
        }
        if state.indexes.contains_key(&definition.name) {
            return Err(if self.postgres_messages {
                LifeError::QueryError(format!("relation \"{}\" already exists", definition.name))
            } else {
                LifeError::DuplicateIndex {
                    name: definition.name,
                    table: table.to_string(),
                }
            });
        }

        state.executed.push(format!("add_index {table} {}", definition.name));
        state.indexes.insert(definition.name.clone(), definition);
        Ok(())
    }

    fn indexes(&self, table: &str) -> Result<Vec<IndexDefinition>, LifeError> {
        let state = self.lock();
        if !state.tables.contains_key(table) {
            return Err(missing_table(table));
        }
        Ok(state
            .indexes
            .values()
            .filter(|index| index.table == table)
            .cloned()
            .collect())
    }
}
