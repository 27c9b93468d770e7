//! `IndexDefinition` - comparable description of an index
//!
//! Engines report existing indexes as definitions, and the duplicate suppressor
//! builds one from the attempted `add_index` arguments. Two definitions are equal
//! when they describe the same index, not when they were written the same way.

use crate::options::{OptionMap, OptionValue};
use crate::LifeError;
use std::collections::BTreeMap;
use std::fmt;

/// Access method PostgreSQL uses when `USING` is omitted
pub const DEFAULT_INDEX_METHOD: &str = "btree";

/// Per-column sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse `asc` / `desc`, ignoring case
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(SortOrder::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(SortOrder::Desc)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct IndexDefinition {
    pub table: String,
    pub name: String,
    /// Indexed columns (or expressions) in index order
    pub columns: Vec<String>,
    pub unique: bool,
    /// Prefix lengths keyed by column
    pub lengths: BTreeMap<String, i64>,
    /// Sort orders keyed by column
    pub orders: BTreeMap<String, SortOrder>,
    /// Partial-index predicate
    pub where_clause: Option<String>,
    /// Access method (`btree`, `gin`, ...)
    pub using: Option<String>,
}

impl IndexDefinition {
    pub fn new(table: impl Into<String>, name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            columns,
            unique: false,
            lengths: BTreeMap::new(),
            orders: BTreeMap::new(),
            where_clause: None,
            using: None,
        }
    }

    #[must_use]
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    #[must_use]
    pub fn where_clause(mut self, predicate: impl Into<String>) -> Self {
        self.where_clause = Some(predicate.into());
        self
    }

    #[must_use]
    pub fn using(mut self, method: impl Into<String>) -> Self {
        self.using = Some(method.into());
        self
    }

    #[must_use]
    pub fn order(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.orders.insert(column.into(), order);
        self
    }

    #[must_use]
    pub fn length(mut self, column: impl Into<String>, length: i64) -> Self {
        self.lengths.insert(column.into(), length);
        self
    }

    /// Name given to an index created without a `name` option
    ///
    /// `index_users_on_email`, `index_users_on_last_name_and_first_name`
    pub fn default_name(table: &str, columns: &[String]) -> String {
        format!("index_{}_on_{}", table, columns.join("_and_"))
    }

    /// Build the definition `add_index(table, columns, options)` would create
    ///
    /// Recognized options: `name`, `unique`, `length` and `order` (a scalar for
    /// every column, or a per-column mapping), `where`, `using`. Other options do
    /// not change the definition.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::InvalidOption` when a recognized option has a value of
    /// the wrong shape.
    pub fn from_options(table: &str, columns: &[String], options: &OptionMap) -> Result<Self, LifeError> {
        let name = match options.get("name") {
            Some(value) => value
                .as_str()
                .ok_or_else(|| invalid("name", value))?
                .to_string(),
            None => Self::default_name(table, columns),
        };

        let mut definition = Self::new(table, name, columns.to_vec()).unique(options.is_truthy("unique"));

        if let Some(value) = options.get("length") {
            definition.lengths = per_column(columns, "length", value, |v| v.as_int())?;
        }

        if let Some(value) = options.get("order") {
            definition.orders =
                per_column(columns, "order", value, |v| v.as_str().and_then(SortOrder::parse))?;
        }

        if let Some(value) = options.get("where") {
            let predicate = value.as_str().ok_or_else(|| invalid("where", value))?;
            definition.where_clause = Some(predicate.to_string());
        }

        if let Some(value) = options.get("using") {
            let method = value.as_str().ok_or_else(|| invalid("using", value))?;
            definition.using = Some(method.to_string());
        }

        Ok(definition)
    }

    /// Access method with the default filled in, lowercased
    pub fn method(&self) -> String {
        self.using
            .as_deref()
            .unwrap_or(DEFAULT_INDEX_METHOD)
            .to_ascii_lowercase()
    }

    fn effective_orders(&self) -> BTreeMap<&str, SortOrder> {
        self.orders
            .iter()
            .filter(|(_, order)| **order == SortOrder::Desc)
            .map(|(column, order)| (column.as_str(), *order))
            .collect()
    }
}

impl PartialEq for IndexDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
            && self.name == other.name
            && self.columns == other.columns
            && self.unique == other.unique
            && self.lengths == other.lengths
            && self.effective_orders() == other.effective_orders()
            && self.where_clause.as_deref().map(normalize_predicate)
                == other.where_clause.as_deref().map(normalize_predicate)
            && self.method() == other.method()
    }
}

impl Eq for IndexDefinition {}

fn invalid(option: &str, value: &OptionValue) -> LifeError {
    LifeError::InvalidOption(format!("index option \"{option}\" cannot be {value:?}"))
}

/// Expand a scalar to every column, or pick the listed columns out of a mapping
fn per_column<T: Clone>(
    columns: &[String],
    option: &str,
    value: &OptionValue,
    parse: impl Fn(&OptionValue) -> Option<T>,
) -> Result<BTreeMap<String, T>, LifeError> {
    let mut result = BTreeMap::new();
    match value {
        OptionValue::Map(map) => {
            for column in columns {
                if let Some(entry) = map.get_column(column) {
                    let parsed = parse(entry).ok_or_else(|| invalid(option, entry))?;
                    result.insert(column.clone(), parsed);
                }
            }
        }
        scalar => {
            let parsed = parse(scalar).ok_or_else(|| invalid(option, scalar))?;
            for column in columns {
                result.insert(column.clone(), parsed.clone());
            }
        }
    }
    Ok(result)
}

/// Canonical text of a partial-index predicate
///
/// Whitespace runs collapse to one space and parentheses wrapping the whole
/// predicate are dropped, so `x > 0` matches PostgreSQL's `(x > 0)`.
pub fn normalize_predicate(predicate: &str) -> String {
    let mut text = predicate.split_whitespace().collect::<Vec<_>>().join(" ");
    while let Some(inner) = strip_wrapping_parens(&text) {
        text = inner.trim().to_string();
    }
    text
}

fn strip_wrapping_parens(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0usize;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}
