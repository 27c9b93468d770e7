//! `index: true` / `index: unique` shorthands on `add_column`

use crate::migration::env::ColumnEnv;
use crate::migration::middleware::{Middleware, Next};
use crate::migration::statements::SchemaStatements;
use crate::options::{OptionMap, OptionValue};
use crate::LifeError;

/// Marker accepted as `index: unique`
pub const UNIQUE_MARKER: &str = "unique";

/// Expands the `index` shorthands into an option mapping, then continues
#[derive(Debug, Default, Clone, Copy)]
pub struct Shortcuts;

impl Middleware<ColumnEnv> for Shortcuts {
    fn name(&self) -> &'static str {
        "shortcuts"
    }

    fn call(&self, env: &mut ColumnEnv, caller: &dyn SchemaStatements, next: Next<'_, ColumnEnv>) -> Result<(), LifeError> {
        expand_index_shorthand(&mut env.options);
        next.run(env, caller)
    }
}

/// `index: true` becomes `index: {}` and `index: unique` becomes
/// `index: {unique: true}`; any other value is left alone.
pub fn expand_index_shorthand(options: &mut OptionMap) {
    let expanded = match options.get("index") {
        Some(OptionValue::Bool(true)) => OptionMap::new(),
        Some(OptionValue::Ident(marker)) if marker == UNIQUE_MARKER => OptionMap::new().with("unique", true),
        _ => return,
    };
    options.insert("index", expanded);
}
