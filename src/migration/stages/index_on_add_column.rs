//! Follow-on `add_index` for columns added with an `index` option

use crate::migration::env::{ColumnEnv, Operation};
use crate::migration::middleware::{Middleware, Next};
use crate::migration::statements::SchemaStatements;
use crate::LifeError;

/// After the column exists, creates the index its `index` option asks for
///
/// Runs after [`Shortcuts`](super::Shortcuts), so the option is a mapping by the
/// time it is read. The index is requested through the caller, which sends it
/// through the `add_index` chain.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexOnAddColumn;

impl Middleware<ColumnEnv> for IndexOnAddColumn {
    fn name(&self) -> &'static str {
        "index_on_add_column"
    }

    fn call(&self, env: &mut ColumnEnv, caller: &dyn SchemaStatements, next: Next<'_, ColumnEnv>) -> Result<(), LifeError> {
        next.run(env, caller)?;

        let Some(index) = env.options.get("index").filter(|value| value.is_truthy()) else {
            return Ok(());
        };

        match env.operation {
            Operation::Add | Operation::Record => {
                let index_options = index.as_map().ok_or_else(|| {
                    LifeError::InvalidOption(format!(
                        "index option for column \"{}\" on table \"{}\" must be true, unique or a mapping, got {:?}",
                        env.column_name, env.table_name, index
                    ))
                })?;
                log::debug!(
                    "adding index for column {}.{} ({:?})",
                    env.table_name,
                    env.column_name,
                    env.operation
                );
                caller.add_index(
                    &env.table_name,
                    std::slice::from_ref(&env.column_name),
                    index_options,
                )
            }
            Operation::Remove => Ok(()),
        }
    }
}
