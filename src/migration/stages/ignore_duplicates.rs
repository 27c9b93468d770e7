//! Idempotent `add_index`

use crate::migration::diagnostics::WarningSink;
use crate::migration::duplicate::already_exists_name;
use crate::migration::env::IndexEnv;
use crate::migration::index_definition::IndexDefinition;
use crate::migration::middleware::{Middleware, Next};
use crate::migration::statements::SchemaStatements;
use crate::LifeError;
use std::sync::Arc;

/// Turns "index already exists" into a warning when the existing index is
/// identical to the one requested
///
/// Any other failure, or a same-named index with a different definition, is
/// returned unchanged.
pub struct IgnoreDuplicates {
    sink: Arc<dyn WarningSink>,
}

impl IgnoreDuplicates {
    pub fn new(sink: Arc<dyn WarningSink>) -> Self {
        Self { sink }
    }

    /// Name of the existing index when `error` reports one identical to the
    /// index `env` describes
    fn identical_duplicate(&self, env: &IndexEnv, caller: &dyn SchemaStatements, error: &LifeError) -> Option<String> {
        let name = already_exists_name(error)?;

        let existing = match caller.indexes(&env.table_name) {
            Ok(indexes) => indexes.into_iter().find(|index| index.name == name)?,
            Err(lookup) => {
                log::debug!("could not list indexes of {}: {lookup}", env.table_name);
                return None;
            }
        };

        let mut options = env.options.clone();
        options.insert("name", name.clone());
        let mut attempted = IndexDefinition::from_options(&env.table_name, &env.column_names, &options).ok()?;
        if !caller.supports_index_length() {
            attempted.lengths.clear();
        }
        (attempted == existing).then_some(name)
    }
}

impl Middleware<IndexEnv> for IgnoreDuplicates {
    fn name(&self) -> &'static str {
        "ignore_duplicates"
    }

    fn call(&self, env: &mut IndexEnv, caller: &dyn SchemaStatements, next: Next<'_, IndexEnv>) -> Result<(), LifeError> {
        let error = match next.run(env, caller) {
            Ok(()) => return Ok(()),
            Err(error) => error,
        };

        let Some(name) = self.identical_duplicate(env, caller, &error) else {
            return Err(error);
        };

        self.sink.warn(&format!(
            "Index name {name:?} on table {:?} already exists. Skipping.",
            env.table_name
        ));
        #[cfg(feature = "metrics")]
        crate::metrics::METRICS.record_duplicate_skipped();
        Ok(())
    }
}
