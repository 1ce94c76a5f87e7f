//! Projects entities onto SQL through an ordered list of column names.
//!
//! An entity describes its columns by implementing [`Fielder`] (usually via
//! [`impl_fielder!`](crate::impl_fielder)). A [`Mapper`] then reads those
//! fields in column order to produce insert tuples, update assignments and
//! dictionaries, and writes loaded values back into the entity.

/// [`Fielder`] trait resolving column names to entity fields
pub mod fielder;

#[allow(clippy::module_inception)]
pub mod mapper;

pub use fielder::Fielder;
pub use mapper::Mapper;
