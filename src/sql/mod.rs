/// Combinators: [`exp()`], [`and()`], [`or()`], [`not()`], [`g()`], [`join()`], [`f()`] and [`build()`]
pub mod builders;

/// [`Chunk`] trait for rendering SQL fragments and their arguments
pub mod chunk;

/// [`Component`] enum: what the combinators accept, and [`flatten()`]
pub mod component;

pub mod expression;

/// [`Operations`] trait for syntactic sugar on columns and expressions
pub mod operations;

mod postgres;

pub mod stats;

/// [`SqlValue`] plus the [`Scalar`] and [`Assignable`] conversions
pub mod value;

pub use builders::{and, build, exp, f, g, join, not, or};
pub use chunk::{Chunk, WrapArc};
pub use component::{flatten, flatten_counted, param, params, raw, value, Component};
pub use expression::{Expression, Joiner, Negation, PLACEHOLDER};
pub use operations::{Column, Operations};
pub use stats::RenderStats;
pub use value::{assign, dereference, Assignable, Scalar, SqlValue};
