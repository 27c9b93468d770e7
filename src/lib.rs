//! # Lifeguard Indexes
//!
//! Index handling for Lifeguard migrations: shorthand index options on
//! `add_column`, canonical `add_index` arguments, and idempotent index creation,
//! on top of coroutine-native PostgreSQL (`may_postgres`).
//!
//! See [`migration`] for the middleware and the schema engines.

pub mod config;
pub mod executor;
pub mod metrics;
pub mod migration;
pub mod options;

pub use config::{DatabaseConfig, IndexesConfig};
pub use executor::{LifeError, LifeExecutor, MayPostgresExecutor};
pub use options::{OptionKey, OptionMap, OptionValue};
