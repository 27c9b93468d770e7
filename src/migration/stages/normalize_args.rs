//! Canonical `add_index` arguments

use crate::migration::diagnostics::WarningSink;
use crate::migration::env::IndexEnv;
use crate::migration::middleware::{Middleware, Next};
use crate::migration::statements::SchemaStatements;
use crate::LifeError;
use std::sync::Arc;

/// Deprecated option and the option that replaced it
pub const DEPRECATED_OPTIONS: [(&str, &str); 2] = [("conditions", "where"), ("kind", "using")];

/// Options whose per-column mappings are keyed by column name
const PER_COLUMN_OPTIONS: [&str; 2] = ["length", "order"];

/// Rewrites `add_index` arguments into their canonical form before continuing
///
/// - `conditions` / `kind` move to `where` / `using`, with a deprecation warning;
/// - per-column `length` / `order` mappings get string keys;
/// - `with: [...]` columns are appended to the indexed columns.
pub struct NormalizeArgs {
    sink: Arc<dyn WarningSink>,
}

impl NormalizeArgs {
    pub fn new(sink: Arc<dyn WarningSink>) -> Self {
        Self { sink }
    }

    pub fn normalize(&self, env: &mut IndexEnv) {
        for (deprecated, proper) in DEPRECATED_OPTIONS {
            let Some(value) = env.options.remove(deprecated) else {
                continue;
            };
            self.sink.deprecation(&format!(
                "Index option {deprecated:?} is deprecated, use {proper:?} instead"
            ));
            #[cfg(feature = "metrics")]
            crate::metrics::METRICS.record_deprecated_option(deprecated);
            env.options.insert(proper, value);
        }

        for option in PER_COLUMN_OPTIONS {
            if let Some(mapping) = env.options.get_mut(option).and_then(|value| value.as_map_mut()) {
                mapping.stringify_keys();
            }
        }

        if let Some(extra) = env.options.remove("with") {
            env.column_names.extend(extra.to_column_names());
        }
    }
}

impl Middleware<IndexEnv> for NormalizeArgs {
    fn name(&self) -> &'static str {
        "normalize_args"
    }

    fn call(&self, env: &mut IndexEnv, caller: &dyn SchemaStatements, next: Next<'_, IndexEnv>) -> Result<(), LifeError> {
        self.normalize(env);
        next.run(env, caller)
    }
}
