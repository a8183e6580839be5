use std::collections::HashMap;

use crate::error::{PathError, QueryError};
use crate::path::Path;
use crate::tree::Tree;
use crate::value::{Value, ValueType};

impl<'a> Tree<'a> {
    /// Resolves a path like `1.2.4:string` and returns all matching values in wire order.
    ///
    /// Every field along the way that matches a segment is followed, so repeated
    /// messages all contribute. Segments that match nothing yield an empty result.
    /// Without a `:type` suffix the fields are returned as [`Value::Raw`].
    ///
    /// ## Example
    ///
    /// ```
    /// use rawproto::{Tree, Value};
    ///
    /// // 4: "hello", 5: 1, 5: 2, 5: 3
    /// let data = [0x22, 0x05, 0x68, 0x65, 0x6c, 0x6c, 0x6f, 0x28, 0x01, 0x28, 0x02, 0x28, 0x03];
    /// let tree = Tree::parse(&data).unwrap();
    /// assert_eq!(tree.query("5:var").unwrap(), [Value::Var(1), Value::Var(2), Value::Var(3)]);
    /// assert_eq!(tree.query("4:string").unwrap()[0].as_str(), Some("hello"));
    /// assert!(tree.query("9.1:var").unwrap().is_empty());
    /// ```
    pub fn query(&self, path: &str) -> Result<Vec<Value<'a>>, QueryError> {
        let path: Path = path.parse()?;
        self.query_path(&path)
    }

    pub fn query_path(&self, path: &Path) -> Result<Vec<Value<'a>>, QueryError> {
        let value_type = path.value_type().unwrap_or(ValueType::Raw);
        let mut out = Vec::new();
        resolve(self, path.fields(), value_type, &mut out)?;
        Ok(out)
    }

    /// Like [`Tree::query`] but only returns the first match.
    pub fn query_one(&self, path: &str) -> Result<Option<Value<'a>>, QueryError> {
        Ok(self.query(path)?.into_iter().next())
    }
}

fn resolve<'a>(
    tree: &Tree<'a>,
    fields: &[u32],
    value_type: ValueType,
    out: &mut Vec<Value<'a>>,
) -> Result<(), QueryError> {
    let Some((&number, rest)) = fields.split_first() else {
        return Ok(());
    };
    for field in tree.fields_numbered(number) {
        if rest.is_empty() {
            out.push(Value::coerce(field, value_type)?);
        } else if let Some(children) = field.children() {
            resolve(&children, rest, value_type, out)?;
        }
    }
    Ok(())
}

/// Reusable query settings: a path prefix and value types for paths that do not name one.
///
/// ## Example
///
/// ```
/// use rawproto::{Query, Tree, ValueType};
///
/// // 1: {2: {3: "abc"}}
/// let data = [0x0a, 0x07, 0x12, 0x05, 0x1a, 0x03, 0x61, 0x62, 0x63];
/// let tree = Tree::parse(&data).unwrap();
/// let query = Query::new()
///     .with_prefix("1.2")
///     .unwrap()
///     .with_type("3", ValueType::String)
///     .unwrap();
/// assert_eq!(query.get(&tree, "3").unwrap()[0].as_str(), Some("abc"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Query {
    prefix: Option<Path>,
    types: HashMap<Vec<u32>, ValueType>,
}

impl Query {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `prefix` to every path passed to [`Query::get`].
    pub fn with_prefix(mut self, prefix: &str) -> Result<Self, PathError> {
        let prefix: Path = prefix.parse()?;
        if prefix.value_type().is_some() {
            return Err(PathError::TypeOnInnerSegment {
                index: prefix.fields().len() - 1,
            });
        }
        self.prefix = Some(prefix);
        Ok(self)
    }

    /// Sets the value type used for `path` (relative to the prefix) when
    /// the path passed to [`Query::get`] has no type suffix.
    pub fn with_type(mut self, path: &str, value_type: ValueType) -> Result<Self, PathError> {
        let path: Path = path.parse()?;
        if path.value_type().is_some() {
            return Err(PathError::TypeOnInnerSegment {
                index: path.fields().len() - 1,
            });
        }
        self.types.insert(path.fields().to_vec(), value_type);
        Ok(self)
    }

    /// The value type [`Query::get`] applies to `path`.
    pub fn value_type(&self, path: &Path) -> ValueType {
        path.value_type()
            .or_else(|| self.types.get(path.fields()).copied())
            .unwrap_or(ValueType::Raw)
    }

    pub fn get<'a>(&self, tree: &Tree<'a>, path: &str) -> Result<Vec<Value<'a>>, QueryError> {
        let path: Path = path.parse()?;
        let value_type = self.value_type(&path);
        let mut full = Path::new(path.fields().to_vec(), Some(value_type))?;
        if let Some(prefix) = &self.prefix {
            full = full.prefixed(prefix)?;
        }
        tree.query_path(&full)
    }
}
