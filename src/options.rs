//! Option vocabulary for `add_column` / `add_index`
//!
//! Migration options are a small dynamic value model: a map from [`OptionKey`] to
//! [`OptionValue`]. Keys and values distinguish a bare identifier (`unique`, `gin`,
//! a column name written as an identifier) from a quoted string, because parts of
//! the vocabulary depend on that difference:
//!
//! - `index: unique` (identifier) is the unique-index shorthand, `index: "unique"`
//!   (string) is not;
//! - per-column `length` / `order` mappings are keyed by column name in either form
//!   and get normalized to string keys before an index is created.
//!
//! ```
//! use lifeguard_indexes::options;
//! use lifeguard_indexes::options::OptionValue;
//!
//! let opts = options! {
//!     "unique" => true,
//!     "where" => "deleted_at IS NULL",
//!     "order" => options! { "created_at" => OptionValue::ident("desc") },
//! };
//! assert!(opts.is_truthy("unique"));
//! ```

use crate::LifeError;
use std::collections::BTreeMap;
use std::fmt;

/// Key of an [`OptionMap`] entry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKey {
    /// Bare identifier (`unique`, `where`, `email`)
    Ident(String),
    /// Quoted string (`"email"`)
    Text(String),
}

impl OptionKey {
    pub fn ident(name: impl Into<String>) -> Self {
        OptionKey::Ident(name.into())
    }

    pub fn text(name: impl Into<String>) -> Self {
        OptionKey::Text(name.into())
    }

    /// The key's name regardless of its form
    pub fn name(&self) -> &str {
        match self {
            OptionKey::Ident(name) | OptionKey::Text(name) => name,
        }
    }

    /// String form of this key
    #[must_use]
    pub fn into_text(self) -> Self {
        match self {
            OptionKey::Ident(name) => OptionKey::Text(name),
            text => text,
        }
    }
}

impl From<&str> for OptionKey {
    fn from(name: &str) -> Self {
        OptionKey::Ident(name.to_string())
    }
}

impl From<String> for OptionKey {
    fn from(name: String) -> Self {
        OptionKey::Ident(name)
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKey::Ident(name) => write!(f, "{name}"),
            OptionKey::Text(name) => write!(f, "{name:?}"),
        }
    }
}

/// Value of an [`OptionMap`] entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    /// Quoted string
    Text(String),
    /// Bare identifier or marker
    Ident(String),
    List(Vec<OptionValue>),
    Map(OptionMap),
}

impl OptionValue {
    pub fn ident(name: impl Into<String>) -> Self {
        OptionValue::Ident(name.into())
    }

    /// `false` is the only falsy value; an absent entry is falsy at the map level.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, OptionValue::Bool(false))
    }

    /// Text of a `Text` or `Ident` value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) | OptionValue::Ident(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&OptionMap> {
        match self {
            OptionValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut OptionMap> {
        match self {
            OptionValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Coerce to an ordered list of column names
    ///
    /// A scalar becomes a one-element list, lists are flattened element by element,
    /// and maps contribute nothing.
    pub fn to_column_names(&self) -> Vec<String> {
        match self {
            OptionValue::Text(s) | OptionValue::Ident(s) => vec![s.clone()],
            OptionValue::Int(n) => vec![n.to_string()],
            OptionValue::Bool(b) => vec![b.to_string()],
            OptionValue::List(items) => items.iter().flat_map(OptionValue::to_column_names).collect(),
            OptionValue::Map(_) => Vec::new(),
        }
    }

    fn from_json(value: serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Null => None,
            Value::Bool(b) => Some(OptionValue::Bool(b)),
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => OptionValue::Int(i),
                None => OptionValue::Text(n.to_string()),
            }),
            Value::String(s) => Some(OptionValue::Text(s)),
            Value::Array(items) => Some(OptionValue::List(
                items.into_iter().filter_map(OptionValue::from_json).collect(),
            )),
            Value::Object(entries) => Some(OptionValue::Map(OptionMap::from_json_object(entries))),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Int(i64::from(value))
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Int(i64::from(value))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<OptionMap> for OptionValue {
    fn from(value: OptionMap) -> Self {
        OptionValue::Map(value)
    }
}

impl<T: Into<OptionValue>> From<Vec<T>> for OptionValue {
    fn from(values: Vec<T>) -> Self {
        OptionValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Ordered option mapping with unique keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap(BTreeMap<OptionKey, OptionValue>);

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced
    pub fn insert(
        &mut self,
        key: impl Into<OptionKey>,
        value: impl Into<OptionValue>,
    ) -> Option<OptionValue> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<OptionKey>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a vocabulary option (identifier key)
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.0.get(&OptionKey::ident(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut OptionValue> {
        self.0.get_mut(&OptionKey::ident(name))
    }

    pub fn get_key(&self, key: &OptionKey) -> Option<&OptionValue> {
        self.0.get(key)
    }

    /// Look up a per-column entry, accepting either key form
    pub fn get_column(&self, column: &str) -> Option<&OptionValue> {
        self.0
            .get(&OptionKey::text(column))
            .or_else(|| self.0.get(&OptionKey::ident(column)))
    }

    pub fn remove(&mut self, name: &str) -> Option<OptionValue> {
        self.0.remove(&OptionKey::ident(name))
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(&OptionKey::ident(name))
    }

    /// `true` when the option is present and not `false`
    pub fn is_truthy(&self, name: &str) -> bool {
        self.get(name).is_some_and(OptionValue::is_truthy)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OptionKey, &OptionValue)> {
        self.0.iter()
    }

    /// Convert every key to its string form
    ///
    /// When an identifier key and a string key name the same entry, the string
    /// key's value wins.
    pub fn stringify_keys(&mut self) {
        let entries = std::mem::take(&mut self.0);
        let (texts, idents): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|(key, _)| matches!(key, OptionKey::Text(_)));
        for (key, value) in idents.into_iter().chain(texts) {
            self.0.insert(key.into_text(), value);
        }
    }

    /// Build options from a JSON object
    ///
    /// Object keys become identifier keys, nested objects become maps, JSON strings
    /// become quoted strings and `null` entries are dropped. JSON has no bare
    /// identifiers, so a top-level `"index": "unique"` is read as the `index: unique`
    /// marker.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::InvalidOption` when `value` is not a JSON object.
    pub fn from_json(value: serde_json::Value) -> Result<Self, LifeError> {
        match value {
            serde_json::Value::Object(entries) => {
                let mut map = Self::from_json_object(entries);
                if let Some(index) = map.get_mut("index") {
                    if matches!(index, OptionValue::Text(marker) if *marker == "unique") {
                        *index = OptionValue::ident("unique");
                    }
                }
                Ok(map)
            }
            other => Err(LifeError::InvalidOption(format!(
                "expected a JSON object of options, got {other}"
            ))),
        }
    }

    fn from_json_object(entries: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut map = OptionMap::new();
        for (key, value) in entries {
            if let Some(value) = OptionValue::from_json(value) {
                map.insert(OptionKey::Ident(key), value);
            }
        }
        map
    }
}

impl FromIterator<(OptionKey, OptionValue)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (OptionKey, OptionValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Build an [`OptionMap`] from `key => value` pairs
///
/// Keys convert with `Into<OptionKey>` (a `&str` is an identifier key) and values
/// with `Into<OptionValue>`.
#[macro_export]
macro_rules! options {
    () => {
        $crate::options::OptionMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::options::OptionMap::new();
        $( map.insert($key, $value); )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        let opts = options! { "unique" => true, "concurrently" => false, "name" => "idx" };
        assert!(opts.is_truthy("unique"));
        assert!(!opts.is_truthy("concurrently"));
        assert!(opts.is_truthy("name"));
        assert!(!opts.is_truthy("missing"));
    }

    #[test]
    fn test_text_key_is_not_a_vocabulary_key() {
        let mut opts = OptionMap::new();
        opts.insert(OptionKey::text("where"), "x > 0");
        assert!(opts.get("where").is_none());
        assert_eq!(opts.get_column("where"), Some(&OptionValue::from("x > 0")));
    }

    #[test]
    fn test_to_column_names_flattens_and_wraps() {
        assert_eq!(OptionValue::from("a").to_column_names(), vec!["a"]);
        assert_eq!(OptionValue::ident("a").to_column_names(), vec!["a"]);
        let nested = OptionValue::List(vec![
            OptionValue::from("a"),
            OptionValue::List(vec![OptionValue::ident("b"), OptionValue::Int(3)]),
            OptionValue::Map(OptionMap::new()),
        ]);
        assert_eq!(nested.to_column_names(), vec!["a", "b", "3"]);
    }

    #[test]
    fn test_stringify_keys() {
        let mut lengths = options! { "email" => 10, OptionKey::text("name") => 5 };
        lengths.stringify_keys();
        assert_eq!(lengths.get_key(&OptionKey::text("email")), Some(&OptionValue::Int(10)));
        assert_eq!(lengths.get_key(&OptionKey::text("name")), Some(&OptionValue::Int(5)));
        assert!(lengths.iter().all(|(key, _)| matches!(key, OptionKey::Text(_))));
    }

    #[test]
    fn test_stringify_keys_prefers_text_entry_on_collision() {
        let mut lengths = options! { "email" => 10, OptionKey::text("email") => 20 };
        lengths.stringify_keys();
        assert_eq!(lengths.len(), 1);
        assert_eq!(lengths.get_column("email"), Some(&OptionValue::Int(20)));
    }

    #[test]
    fn test_from_json() {
        let opts = OptionMap::from_json(json!({
            "unique": true,
            "where": "x > 0",
            "length": {"email": 10},
            "with": ["b", "c"],
            "name": null
        }))
        .unwrap();

        assert_eq!(opts.get("unique"), Some(&OptionValue::Bool(true)));
        assert_eq!(opts.get("where"), Some(&OptionValue::from("x > 0")));
        assert_eq!(
            opts.get("length").and_then(OptionValue::as_map).and_then(|m| m.get_column("email")),
            Some(&OptionValue::Int(10))
        );
        assert_eq!(opts.get("with").map(OptionValue::to_column_names), Some(vec!["b".to_string(), "c".to_string()]));
        assert!(!opts.contains_key("name"));
    }

    #[test]
    fn test_from_json_index_unique_marker() {
        let opts = OptionMap::from_json(json!({"index": "unique", "default": "unique"})).unwrap();
        assert_eq!(opts.get("index"), Some(&OptionValue::ident("unique")));
        assert_eq!(opts.get("default"), Some(&OptionValue::from("unique")));

        let opts = OptionMap::from_json(json!({"index": {"name": "unique"}})).unwrap();
        let index = opts.get("index").and_then(OptionValue::as_map).unwrap();
        assert_eq!(index.get("name"), Some(&OptionValue::from("unique")));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = OptionMap::from_json(json!(["a"])).unwrap_err();
        assert!(matches!(err, LifeError::InvalidOption(_)));
    }
}
