//! Filesystem primitives the fixture tree is built on.
//!
//! Everything here is a thin wrapper over `std::fs`, `filetime` and pure
//! path arithmetic, kept separate from the fixture types so each piece can be
//! tested on its own.

pub mod create;
pub mod path;
pub mod remove;
pub mod stat;
pub mod times;

pub use path::{check_removable, Refusal};
pub use remove::Removal;
