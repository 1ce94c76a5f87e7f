use std::fmt::Debug;
use std::sync::Arc;

use crate::sql::{Expression, SqlValue};

/// A `Chunk` is anything that renders into a piece of SQL and the arguments
/// bound by its placeholders.
///
/// # Examples
///
/// The simplest implementation is an [`Expression`], which already holds
/// its SQL text and arguments:
///
/// ```rust
///   let expr = expr!("id = ?", 5);
///   let (sql, args) = expr.render_chunk().split();   // "id = ?", [5]
/// ```
///
/// Combinators such as `and!` or `exp!` produce a [`Joiner`], which holds
/// other chunks and renders them in order:
///
/// ```rust
///   let cond = and!(exp!("a =", 1), exp!("b =", param("x")));
///   let (sql, args) = cond.render_chunk().split();   // "(a = 1 AND b = ?)", ["x"]
/// ```
///
/// However deep the tree gets, the rendered arguments always follow the
/// order in which their placeholders appear in the SQL text, so the pair
/// can go straight into a positional query call.
///
/// [`Joiner`]: crate::sql::Joiner
pub trait Chunk: Debug + Sync + Send {
    /// Renders this chunk and everything nested in it into a flat [`Expression`].
    fn render_chunk(&self) -> Expression;
}

/// A bare value renders as one bound placeholder.
impl Chunk for SqlValue {
    fn render_chunk(&self) -> Expression {
        Expression::placeholder(self.clone())
    }
}

impl<T: Chunk + ?Sized> Chunk for Arc<T> {
    fn render_chunk(&self) -> Expression {
        (**self).render_chunk()
    }
}

impl<T: Chunk + ?Sized> Chunk for Box<T> {
    fn render_chunk(&self) -> Expression {
        (**self).render_chunk()
    }
}

/// Shares a chunk so it can be nested in several places without cloning it.
pub trait WrapArc {
    fn wrap_arc(self) -> Arc<dyn Chunk>;
}

impl<T: Chunk + 'static> WrapArc for T {
    fn wrap_arc(self) -> Arc<dyn Chunk> {
        Arc::new(self)
    }
}
