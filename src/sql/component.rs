//! Arguments accepted by the expression builders, and how they are
//! flattened and turned into chunks.
//!
//! Every argument passed to `exp!`, `and!` and friends is converted into a
//! [`Component`] first. The conversion is where the escaping decision is
//! made:
//!
//! | argument                                  | becomes                          |
//! |-------------------------------------------|----------------------------------|
//! | `&str`, `String`                          | raw SQL text, never escaped      |
//! | [`param()`]                               | `?` plus one bound argument      |
//! | [`value()`]                               | inline text, no arguments        |
//! | numbers, `bool`, `Decimal`                | inline text, no arguments        |
//! | timestamps, `Vec<u8>`, `&[u8]`, `SqlValue::Text` | `?` plus one bound argument |
//! | an [`Expression`], [`Joiner`] or any chunk | rendered in place                |
//! | other `Vec`s, arrays                      | expanded in place (flattened)    |
//! | `None`, `()`                              | skipped                          |

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use crate::sql::{Chunk, Column, Expression, Joiner, Negation, RenderStats, Scalar, SqlValue};

/// Builds a `Vec<Component>` from a list of heterogeneous arguments.
#[macro_export]
macro_rules! components {
    ($($arg:expr),* $(,)?) => {
        vec![ $( $crate::sql::Component::from($arg), )* ]
    };
}

#[derive(Debug, Clone)]
pub enum Component {
    /// A nested expression, rendered in place.
    Chunk(Arc<dyn Chunk>),
    /// Always a placeholder with one bound argument.
    Param(SqlValue),
    /// Always inline text, the caller vouches for it.
    Value(SqlValue),
    /// SQL syntax: keywords, operators, identifiers.
    Raw(String),
    /// A bare value. Inline unless its kind [needs binding](SqlValue::needs_binding).
    Scalar(SqlValue),
    /// A nested list, expanded by [`flatten()`].
    List(Vec<Component>),
    /// An absent argument. Kept by [`flatten()`], skipped when rendering.
    Nil,
}

/// Bind `value` as a placeholder, whatever its kind.
pub fn param(value: impl Scalar) -> Component {
    Component::Param(value.to_value())
}

/// Bind each of `values` as its own placeholder.
pub fn params<S: Scalar>(values: impl IntoIterator<Item = S>) -> Component {
    Component::List(values.into_iter().map(param).collect())
}

/// Write `value` into the SQL text as-is. Only for trusted values.
pub fn value(value: impl Scalar) -> Component {
    Component::Value(value.to_value())
}

pub fn raw(sql: impl Into<String>) -> Component {
    Component::Raw(sql.into())
}

impl Component {
    pub fn is_nil(&self) -> bool {
        matches!(self, Component::Nil)
    }

    /// Applies the escaping policy. `None` means there is nothing to render.
    pub(crate) fn into_chunk(self, stats: Option<&RenderStats>) -> Option<Arc<dyn Chunk>> {
        let resolved = |v: SqlValue, bind: bool| -> Arc<dyn Chunk> {
            if let Some(stats) = stats {
                stats.record_dereference();
            }
            if bind {
                Arc::new(Expression::placeholder(v))
            } else {
                Arc::new(Expression::new(v.to_string(), vec![]))
            }
        };

        match self {
            Component::Nil => None,
            Component::Chunk(chunk) => Some(chunk),
            Component::Raw(sql) => Some(Arc::new(Expression::new(sql, vec![]))),
            Component::Param(v) => Some(resolved(v, true)),
            Component::Value(v) => Some(resolved(v, false)),
            Component::Scalar(v) => {
                let bind = v.needs_binding();
                Some(resolved(v, bind))
            }
            Component::List(items) => Some(Arc::new(Joiner::counted(items, " ", "", "", stats))),
        }
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Component::Chunk(a), Component::Chunk(b)) => a.render_chunk() == b.render_chunk(),
            (Component::Param(a), Component::Param(b)) => a == b,
            (Component::Value(a), Component::Value(b)) => a == b,
            (Component::Raw(a), Component::Raw(b)) => a == b,
            (Component::Scalar(a), Component::Scalar(b)) => a == b,
            (Component::List(a), Component::List(b)) => a == b,
            (Component::Nil, Component::Nil) => true,
            _ => false,
        }
    }
}

/// Expands nested lists in place, left to right, to any depth.
///
/// An empty list contributes nothing and a list of one expands like any
/// other. [`Component::Nil`] is kept as an atom.
pub fn flatten(components: Vec<Component>) -> Vec<Component> {
    let mut out = Vec::with_capacity(components.len());
    flatten_into(components, &mut out, None);
    out
}

/// Same as [`flatten()`], recording every expanded list in `stats`.
pub fn flatten_counted(components: Vec<Component>, stats: &RenderStats) -> Vec<Component> {
    let mut out = Vec::with_capacity(components.len());
    flatten_into(components, &mut out, Some(stats));
    out
}

fn flatten_into(components: Vec<Component>, out: &mut Vec<Component>, stats: Option<&RenderStats>) {
    for component in components {
        match component {
            Component::List(items) => {
                if let Some(stats) = stats {
                    stats.record_flatten();
                }
                flatten_into(items, out, stats);
            }
            atom => out.push(atom),
        }
    }
}

impl From<&str> for Component {
    fn from(sql: &str) -> Self {
        Component::Raw(sql.to_owned())
    }
}

impl From<String> for Component {
    fn from(sql: String) -> Self {
        Component::Raw(sql)
    }
}

impl From<&String> for Component {
    fn from(sql: &String) -> Self {
        Component::Raw(sql.clone())
    }
}

macro_rules! scalar_component {
    ($($t:ty),*) => {$(
        impl From<$t> for Component {
            fn from(v: $t) -> Self {
                Component::Scalar(v.to_value())
            }
        }
    )*};
}
scalar_component!(
    i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool, Decimal,
    DateTime<Utc>, NaiveDateTime, SqlValue
);

impl From<&[u8]> for Component {
    fn from(bytes: &[u8]) -> Self {
        Component::Scalar(SqlValue::Bytes(bytes.to_vec()))
    }
}

impl From<Expression> for Component {
    fn from(expression: Expression) -> Self {
        Component::Chunk(Arc::new(expression))
    }
}

impl From<Joiner> for Component {
    fn from(joiner: Joiner) -> Self {
        Component::Chunk(Arc::new(joiner))
    }
}

impl From<Negation> for Component {
    fn from(negation: Negation) -> Self {
        Component::Chunk(Arc::new(negation))
    }
}

impl From<Arc<dyn Chunk>> for Component {
    fn from(chunk: Arc<dyn Chunk>) -> Self {
        Component::Chunk(chunk)
    }
}

// `Vec<u8>` is a byte blob, not a list, so lists are enumerated per item type.
macro_rules! list_component {
    ($($t:ty),*) => {$(
        impl From<Vec<$t>> for Component {
            fn from(items: Vec<$t>) -> Self {
                Component::List(items.into_iter().map(Into::into).collect())
            }
        }
    )*};
}
list_component!(
    Component, Expression, Joiner, Negation, Column, Arc<dyn Chunk>, &str, String,
    Option<Expression>, Option<Joiner>, i8, i16, i32, i64, isize, u16, u32, u64, usize,
    f32, f64, bool, Decimal, DateTime<Utc>, NaiveDateTime, SqlValue
);

impl From<Vec<u8>> for Component {
    fn from(bytes: Vec<u8>) -> Self {
        Component::Scalar(SqlValue::Bytes(bytes))
    }
}

impl From<&Vec<u8>> for Component {
    fn from(bytes: &Vec<u8>) -> Self {
        Component::Scalar(SqlValue::Bytes(bytes.clone()))
    }
}

impl<T: Into<Component>, const N: usize> From<[T; N]> for Component {
    fn from(items: [T; N]) -> Self {
        Component::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Component>> From<Option<T>> for Component {
    fn from(item: Option<T>) -> Self {
        item.map_or(Component::Nil, Into::into)
    }
}

impl From<()> for Component {
    fn from(_: ()) -> Self {
        Component::Nil
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::components;

    fn ints(values: &[i64]) -> Vec<Component> {
        values.iter().map(|v| Component::from(*v)).collect()
    }

    #[test]
    fn test_flatten_order() {
        let nested = components![1i64, components![2i64, components![3i64, 4i64]], 5i64];
        assert_eq!(flatten(nested), ints(&[1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_flatten_idempotent() {
        let nested = components!["a", components![1, components!["b"]], None::<i32>, [2, 3]];
        let once = flatten(nested);
        let twice = flatten(once.clone());

        assert_eq!(once, twice);
        assert_eq!(once.len(), 6);
    }

    #[test]
    fn test_flatten_concat() {
        let xs = components![1, components![2, 3]];
        let ys = components![components![components![4]], 5];

        let mut joined = xs.clone();
        joined.extend(ys.clone());

        let mut separately = flatten(xs);
        separately.extend(flatten(ys));

        assert_eq!(flatten(joined), separately);
    }

    #[test]
    fn test_flatten_edges() {
        let empty: Vec<i32> = vec![];
        let flat = flatten(components![1, empty, components![()], components![2]]);

        assert_eq!(flat, vec![Component::from(1), Component::Nil, Component::from(2)]);
    }

    #[test]
    fn test_flatten_counted() {
        let stats = RenderStats::new();
        let other = RenderStats::new();

        flatten_counted(components![1, components![2, components![3]], [4, 5]], &stats);

        assert_eq!(stats.flattened(), 3);
        assert_eq!(other.flattened(), 0);
    }

    #[test]
    fn test_dispatch() {
        let rendered = |c: Component| c.into_chunk(None).map(|c| c.render_chunk().split());

        assert_eq!(rendered(param(5)), Some(("?".into(), vec![SqlValue::Int(5)])));
        assert_eq!(rendered(value("id")), Some(("id".into(), vec![])));
        assert_eq!(rendered("WHERE".into()), Some(("WHERE".into(), vec![])));
        assert_eq!(rendered(12.5.into()), Some(("12.5".into(), vec![])));
        assert_eq!(
            rendered((&b"\x01"[..]).into()),
            Some(("?".into(), vec![SqlValue::Bytes(vec![1])]))
        );
        assert_eq!(rendered(Component::Nil), None);
    }
}
