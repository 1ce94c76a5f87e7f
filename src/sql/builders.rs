//! Combinators for composing chunks.
//!
//! Each function takes a list of [`Component`]s. The macros of the same name
//! accept any mix of arguments that convert into one:
//!
//! ```
//! let (sql, args) = build!(
//!     "SELECT * FROM orders WHERE",
//!     and!(
//!         exp!("client_id =", param(client_id)),
//!         status.map(|s| exp!("status =", param(s))),
//!         not!(exp!("deleted")),
//!     ),
//! );
//! ```
use anyhow::Result;
use tracing::trace;

use crate::sql::{Chunk, Component, Joiner, Negation, SqlValue};

/// Components joined with single spaces.
pub fn exp(components: Vec<Component>) -> Joiner {
    Joiner::from_components(components, " ", "", "")
}

/// `(a AND b AND ...)`
pub fn and(components: Vec<Component>) -> Joiner {
    Joiner::from_components(components, " AND ", "(", ")")
}

/// `(a OR b OR ...)`
pub fn or(components: Vec<Component>) -> Joiner {
    Joiner::from_components(components, " OR ", "(", ")")
}

/// Components joined with single spaces, in parentheses.
pub fn g(components: Vec<Component>) -> Joiner {
    Joiner::from_components(components, " ", "(", ")")
}

pub fn not(component: impl Into<Component>) -> Negation {
    Negation::new(exp(vec![component.into()]))
}

/// Components joined with `separator`, nothing around them.
pub fn join(separator: &str, components: Vec<Component>) -> Joiner {
    Joiner::from_components(components, separator, "", "")
}

/// See [`Joiner::from_format()`].
pub fn f(format: &str, components: Vec<Component>) -> Result<Joiner> {
    Joiner::from_format(format, components)
}

/// Renders `exp(components)` straight away into SQL text and the arguments
/// for its placeholders.
pub fn build(components: Vec<Component>) -> (String, Vec<SqlValue>) {
    let (sql, args) = exp(components).render_chunk().split();
    trace!(sql = %sql, args = args.len(), "built sql");
    (sql, args)
}

#[macro_export]
macro_rules! exp {
    ($($arg:expr),* $(,)?) => {
        $crate::sql::exp($crate::components![$($arg),*])
    };
}

#[macro_export]
macro_rules! and {
    ($($arg:expr),* $(,)?) => {
        $crate::sql::and($crate::components![$($arg),*])
    };
}

#[macro_export]
macro_rules! or {
    ($($arg:expr),* $(,)?) => {
        $crate::sql::or($crate::components![$($arg),*])
    };
}

#[macro_export]
macro_rules! g {
    ($($arg:expr),* $(,)?) => {
        $crate::sql::g($crate::components![$($arg),*])
    };
}

#[macro_export]
macro_rules! not {
    ($arg:expr $(,)?) => {
        $crate::sql::not($arg)
    };
}

#[macro_export]
macro_rules! join {
    ($sep:expr $(, $arg:expr)* $(,)?) => {
        $crate::sql::join($sep, $crate::components![$($arg),*])
    };
}

/// Returns a `Result`, the format string may be malformed.
#[macro_export]
macro_rules! f {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::sql::f($fmt, $crate::components![$($arg),*])
    };
}

#[macro_export]
macro_rules! build {
    ($($arg:expr),* $(,)?) => {
        $crate::sql::build($crate::components![$($arg),*])
    };
}
