//! CommandRecorder - record schema statements instead of running them

use super::index_definition::IndexDefinition;
use super::statements::SchemaStatements;
use crate::options::OptionMap;
use crate::LifeError;
use std::sync::Mutex;

/// One recorded schema statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddColumn {
        table: String,
        column: String,
        column_type: String,
        options: OptionMap,
    },
    AddIndex {
        table: String,
        columns: Vec<String>,
        options: OptionMap,
    },
}

/// Records every statement in order
///
/// Put it behind [`IndexPipeline::recording`](super::IndexPipeline::recording) to
/// capture what a migration would do, including the indexes requested by
/// `add_column` options, and [`replay`](Self::replay) the result later.
/// Nothing is applied, so `indexes` always reports an empty table.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Mutex<Vec<Command>>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Apply the recorded statements to `target`, in order
    ///
    /// The `index` option of recorded columns is dropped: the index it produced was
    /// recorded as its own command.
    ///
    /// # Errors
    ///
    /// Stops at, and returns, the first error from `target`.
    pub fn replay(&self, target: &dyn SchemaStatements) -> Result<(), LifeError> {
        for command in self.commands() {
            match command {
                Command::AddColumn {
                    table,
                    column,
                    column_type,
                    mut options,
                } => {
                    options.remove("index");
                    target.add_column(&table, &column, &column_type, &options)?;
                }
                Command::AddIndex { table, columns, options } => {
                    target.add_index(&table, &columns, &options)?;
                }
            }
        }
        Ok(())
    }

    fn record(&self, command: Command) {
        log::debug!("recorded {command:?}");
        self.commands
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(command);
    }
}

impl SchemaStatements for CommandRecorder {
    fn add_column(
        &self,
        table: &str,
        column: &str,
        column_type: &str,
        options: &OptionMap,
    ) -> Result<(), LifeError> {
        self.record(Command::AddColumn {
            table: table.to_string(),
            column: column.to_string(),
            column_type: column_type.to_string(),
            options: options.clone(),
        });
        Ok(())
    }

    fn add_index(&self, table: &str, columns: &[String], options: &OptionMap) -> Result<(), LifeError> {
        self.record(Command::AddIndex {
            table: table.to_string(),
            columns: columns.to_vec(),
            options: options.clone(),
        });
        Ok(())
    }

    fn indexes(&self, _table: &str) -> Result<Vec<IndexDefinition>, LifeError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::memory::MemorySchema;
    use crate::options;

    #[test]
    fn test_records_in_order() {
        let recorder = CommandRecorder::new();
        recorder.add_column("users", "email", "string", &OptionMap::new()).unwrap();
        recorder
            .add_index("users", &["email".to_string()], &options! { "unique" => true })
            .unwrap();

        let commands = recorder.commands();
        assert!(matches!(commands[0], Command::AddColumn { ref column, .. } if column == "email"));
        assert!(matches!(commands[1], Command::AddIndex { ref columns, .. } if columns == &["email"]));
        assert!(recorder.indexes("users").unwrap().is_empty());
    }

    #[test]
    fn test_replay_applies_commands() {
        let recorder = CommandRecorder::new();
        recorder
            .add_column("users", "email", "string", &options! { "index" => options! {} })
            .unwrap();
        recorder
            .add_index("users", &["email".to_string()], &OptionMap::new())
            .unwrap();

        let target = MemorySchema::new();
        target.create_table("users", &["id"]);
        recorder.replay(&target).unwrap();

        assert_eq!(target.columns("users"), Some(vec!["id".to_string(), "email".to_string()]));
        assert_eq!(target.indexes("users").unwrap().len(), 1);
    }

    #[test]
    fn test_replay_stops_at_first_error() {
        let recorder = CommandRecorder::new();
        recorder.add_column("missing", "a", "integer", &OptionMap::new()).unwrap();
        recorder.add_column("users", "b", "integer", &OptionMap::new()).unwrap();

        let target = MemorySchema::new();
        target.create_table("users", &[]);
        assert!(recorder.replay(&target).is_err());
        assert_eq!(target.columns("users"), Some(Vec::new()));
    }
}
