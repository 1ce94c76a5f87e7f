//! [`Expression`] and [`Joiner`] structs for building SQL fragments
//!
//! There are two kinds of SQL expressions:
//! - [`Expression`]: literal SQL text with `?` placeholders and the [`SqlValue`]
//!   arguments bound to them. It is the leaf of a tree and the result of any render.
//! - [`Joiner`]: an ordered list of shared chunks, joined by a separator and
//!   wrapped in a prefix and suffix. `exp!`, `and!`, `or!` and `g!` all build one.
//!
//! A [`Joiner`] can be turned into an [`Expression`] by calling [`Joiner::render_chunk()`].
//!
//! [`SqlValue`]: super::SqlValue
//! [`Joiner::render_chunk()`]: super::Chunk::render_chunk
pub mod expression;
pub mod joiner;

pub use expression::Expression;
pub use expression::PLACEHOLDER;
pub use joiner::Joiner;
pub use joiner::Negation;
