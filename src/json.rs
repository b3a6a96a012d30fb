//! Lazy JSON facade
//!
//! [`JsonView`] gives uniform read access to an arbitrary decoded JSON object
//! or array without a fixed schema. A view shares its immutable root with
//! every view derived from it and only records the key path to its own node,
//! so reaching into a nested member is cheap and nothing below it is touched
//! until it is read.
//!
//! Reads return a [`Field`]: nested objects and arrays come back as new
//! views, scalars come back as themselves.
//!
//! ```
//! use serde_json::json;
//! use weibo_api::json::JsonView;
//!
//! let view = JsonView::wrap(json!({"user": {"screen_name": "abc"}, "type": 1})).unwrap();
//! let user = view.get("user").unwrap().into_view().unwrap();
//! assert_eq!(user.get("screen_name").unwrap().as_str(), Some("abc"));
//! // keys that are Rust keywords are also reachable with a trailing `_`
//! assert_eq!(view.get("type_").unwrap().as_i64(), Some(1));
//! ```

use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use serde_json::{map, Value};
use std::fmt;
use std::slice;
use std::sync::Arc;

/// Rust keywords. A key spelled like one of these can also be read under the
/// same name with a trailing `_`.
const RESERVED_KEYS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

static NULL: Value = Value::Null;

/// Original JSON key for an escaped accessor name, if `name` is one.
fn unescape_key(name: &str) -> Option<&str> {
    name.strip_suffix('_')
        .filter(|base| RESERVED_KEYS.contains(base))
}

pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One step into a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Index(usize),
    Name(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "[{}]", i),
            Key::Name(name) => write!(f, ".{}", name),
        }
    }
}

/// A value read through a [`JsonView`].
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Nested object or array
    View(JsonView),
    /// String, number, boolean or null
    Scalar(Value),
}

impl Field {
    pub fn as_view(&self) -> Option<&JsonView> {
        match self {
            Field::View(view) => Some(view),
            Field::Scalar(_) => None,
        }
    }

    /// The nested view, or `InvalidJsonKind` for a scalar.
    pub fn into_view(self) -> Result<JsonView> {
        match self {
            Field::View(view) => Ok(view),
            Field::Scalar(value) => Err(Error::InvalidJsonKind {
                kind: kind_name(&value),
            }),
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Field::Scalar(value) => Some(value),
            Field::View(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Value::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(Value::as_i64)
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_scalar().and_then(Value::as_u64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().and_then(Value::as_f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(Value::as_bool)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Scalar(Value::Null))
    }

    /// Owned JSON for this field; views are deep-copied.
    pub fn into_value(self) -> Value {
        match self {
            Field::View(view) => view.snapshot(),
            Field::Scalar(value) => value,
        }
    }
}

impl PartialEq<Value> for Field {
    fn eq(&self, other: &Value) -> bool {
        match self {
            Field::View(view) => view.node() == other,
            Field::Scalar(value) => value == other,
        }
    }
}

/// Read-only view over a JSON object or array.
#[derive(Clone)]
pub struct JsonView {
    root: Arc<Value>,
    path: Vec<Key>,
}

impl JsonView {
    /// Wrap a decoded JSON value. Only objects and arrays are accepted.
    pub fn wrap(value: Value) -> Result<Self> {
        match value {
            Value::Object(_) | Value::Array(_) => Ok(Self {
                root: Arc::new(value),
                path: Vec::new(),
            }),
            other => Err(Error::InvalidJsonKind {
                kind: kind_name(&other),
            }),
        }
    }

    pub fn from_map(map: map::Map<String, Value>) -> Self {
        Self {
            root: Arc::new(Value::Object(map)),
            path: Vec::new(),
        }
    }

    fn node(&self) -> &Value {
        let mut current = &*self.root;
        for key in &self.path {
            let next = match (key, current) {
                (Key::Name(name), Value::Object(map)) => map.get(name),
                (Key::Index(index), Value::Array(items)) => items.get(*index),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                // The root never changes, so a recorded path always resolves.
                None => return &NULL,
            }
        }
        current
    }

    fn child(&self, key: Key) -> Self {
        let mut path = self.path.clone();
        path.push(key);
        Self {
            root: Arc::clone(&self.root),
            path,
        }
    }

    fn field(&self, key: Key, value: &Value) -> Field {
        match value {
            Value::Object(_) | Value::Array(_) => Field::View(self.child(key)),
            scalar => Field::Scalar(scalar.clone()),
        }
    }

    /// Location of this view inside its root, e.g. `$.data.cards[0]`.
    pub fn path(&self) -> String {
        let mut out = String::from("$");
        for key in &self.path {
            out.push_str(&key.to_string());
        }
        out
    }

    pub fn is_object(&self) -> bool {
        self.node().is_object()
    }

    pub fn is_array(&self) -> bool {
        self.node().is_array()
    }

    /// Read an object member.
    ///
    /// The exact key wins; otherwise an escaped reserved name such as
    /// `type_` falls back to the original key `type`.
    pub fn get(&self, name: &str) -> Result<Field> {
        let node = self.node();
        let Value::Object(map) = node else {
            return Err(Error::UnsupportedOperation {
                operation: "get",
                kind: kind_name(node),
            });
        };

        for key in std::iter::once(name).chain(unescape_key(name)) {
            if let Some(value) = map.get(key) {
                return Ok(self.field(Key::Name(key.to_string()), value));
            }
        }

        Err(Error::MissingField {
            path: self.path(),
            field: name.to_string(),
        })
    }

    /// Read an array element.
    pub fn at(&self, index: usize) -> Result<Field> {
        let node = self.node();
        let Value::Array(items) = node else {
            return Err(Error::UnsupportedOperation {
                operation: "at",
                kind: kind_name(node),
            });
        };

        items
            .get(index)
            .map(|value| self.field(Key::Index(index), value))
            .ok_or_else(|| Error::IndexOutOfRange {
                path: self.path(),
                index,
                len: items.len(),
            })
    }

    /// Walk a dot-separated path; numeric segments index into arrays.
    pub fn get_path(&self, path: &str) -> Result<Field> {
        let mut current = Field::View(self.clone());

        for segment in path.split('.') {
            let view = match current {
                Field::View(view) => view,
                Field::Scalar(_) => {
                    return Err(Error::MissingField {
                        path: path.to_string(),
                        field: segment.to_string(),
                    })
                }
            };
            current = match segment.parse::<usize>() {
                Ok(index) if view.is_array() => view.at(index)?,
                _ => view.get(segment)?,
            };
        }

        Ok(current)
    }

    /// Object: `needle` is a string naming a member.
    /// Array: some element equals `needle`.
    pub fn contains(&self, needle: &Value) -> bool {
        match self.node() {
            Value::Object(map) => needle.as_str().is_some_and(|key| map.contains_key(key)),
            Value::Array(items) => items.iter().any(|item| item == needle),
            _ => false,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.contains(&Value::String(key.to_string()))
    }

    pub fn len(&self) -> usize {
        match self.node() {
            Value::Object(map) => map.len(),
            Value::Array(items) => items.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// False only for an empty object or array.
    pub fn is_truthy(&self) -> bool {
        !self.is_empty()
    }

    /// Iterate `(key, field)` pairs in document order. Array keys are
    /// indices. Each call starts over from the first entry.
    pub fn iter(&self) -> Iter<'_> {
        let inner = match self.node() {
            Value::Object(map) => IterInner::Object(map.iter()),
            Value::Array(items) => IterInner::Array(items.iter().enumerate()),
            _ => IterInner::Empty,
        };
        Iter { view: self, inner }
    }

    pub fn values(&self) -> impl Iterator<Item = Field> + '_ {
        self.iter().map(|(_, field)| field)
    }

    /// Deep copy of the wrapped JSON with the keys exactly as received.
    pub fn snapshot(&self) -> Value {
        self.node().clone()
    }
}

impl TryFrom<Value> for JsonView {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::wrap(value)
    }
}

impl PartialEq for JsonView {
    fn eq(&self, other: &Self) -> bool {
        self.node() == other.node()
    }
}

impl fmt::Debug for JsonView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonView")
            .field("path", &self.path())
            .field("value", self.node())
            .finish()
    }
}

impl fmt::Display for JsonView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.node())
    }
}

impl Serialize for JsonView {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.node().serialize(serializer)
    }
}

enum IterInner<'a> {
    Object(map::Iter<'a>),
    Array(std::iter::Enumerate<slice::Iter<'a, Value>>),
    Empty,
}

/// Iterator returned by [`JsonView::iter`].
pub struct Iter<'a> {
    view: &'a JsonView,
    inner: IterInner<'a>,
}

impl Iterator for Iter<'_> {
    type Item = (Key, Field);

    fn next(&mut self) -> Option<Self::Item> {
        let view = self.view;
        match &mut self.inner {
            IterInner::Object(entries) => entries.next().map(|(name, value)| {
                let key = Key::Name(name.clone());
                (key.clone(), view.field(key, value))
            }),
            IterInner::Array(items) => items
                .next()
                .map(|(index, value)| (Key::Index(index), view.field(Key::Index(index), value))),
            IterInner::Empty => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            IterInner::Object(entries) => entries.size_hint(),
            IterInner::Array(items) => items.size_hint(),
            IterInner::Empty => (0, Some(0)),
        }
    }
}

impl<'a> IntoIterator for &'a JsonView {
    type Item = (Key, Field);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
