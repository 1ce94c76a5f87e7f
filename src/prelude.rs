pub use crate::config::{PlaceholderStyle, RenderConfig};
pub use crate::mapper::{Fielder, Mapper};
pub use crate::sql::{
    assign, flatten, param, params, raw, value, Assignable, Chunk, Column, Component, Expression,
    Joiner, Negation, Operations, RenderStats, Scalar, SqlValue, WrapArc,
};
pub use crate::{and, build, exp, expr, f, g, impl_fielder, join, not, or};
