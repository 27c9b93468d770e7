//! Middleware stages of the index pipeline
//!
//! | Stage               | Chain        | Placement |
//! |---------------------|--------------|-----------|
//! | `Shortcuts`         | `add_column` | prepended |
//! | `IndexOnAddColumn`  | `add_column` | appended  |
//! | `NormalizeArgs`     | `add_index`  | prepended |
//! | `IgnoreDuplicates`  | `add_index`  | prepended, outermost |

mod ignore_duplicates;
mod index_on_add_column;
mod normalize_args;
mod shortcuts;

pub use ignore_duplicates::IgnoreDuplicates;
pub use index_on_add_column::IndexOnAddColumn;
pub use normalize_args::{NormalizeArgs, DEPRECATED_OPTIONS};
pub use shortcuts::{expand_index_shorthand, Shortcuts, UNIQUE_MARKER};
