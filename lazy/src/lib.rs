//! Lazy, persistent arrays.
//!
//! [`Array`] records slices and splices instead of performing them. Each
//! operation is constant time and shares its operands with the array it was
//! derived from, so old versions stay valid and nothing gets copied until
//! the content is actually needed. At that point [`Array::for_each`] (or the
//! [`Array::segments`] iterator) walks the recorded operations and hands out
//! the pieces of the original payloads in order, which the caller can then
//! stitch together however it likes.
//!
//! Payloads just need to implement [`Slicer`]. The crate provides
//! implementations for string slices, slices, `String` and `Vec`.
//!
//! Deeply nested arrays get slower to walk, so each array carries an
//! advisory nesting budget. [`FlattenPolicy`] shows how to use it to keep
//! the nesting in check.

pub mod array;
pub mod error;
pub mod policy;
pub mod slicer;

pub use array::{Array, Segments};
pub use error::RangeError;
pub use policy::FlattenPolicy;
pub use slicer::{Concat, Slicer};
