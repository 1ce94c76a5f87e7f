//! Composable SQL text built from small pieces, with positional arguments
//! kept in the same order as their placeholders.
//!
//! ```
//! use sqlweave::prelude::*;
//!
//! let name: Option<&str> = Some("bob");
//! let (sql, args) = build!(
//!     "SELECT * FROM users WHERE",
//!     and!(
//!         name.map(|n| exp!("name =", param(n))),
//!         exp!("age >", param(18)),
//!     ),
//! );
//!
//! assert_eq!(sql, "SELECT * FROM users WHERE (name = ? AND age > ?)");
//! ```
//!
//! The [`sql`] module holds the expression tree and combinators, [`mapper`]
//! projects entities onto columns, and [`config`] controls how final SQL
//! text is written.

pub mod config;
pub mod mapper;
pub mod prelude;
pub mod sql;
