//! Sorted in-memory index built on a [red-black tree], with parent
//! links and arena allocated nodes.
//!
//! [red-black tree]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree

mod arena;
mod depth;
mod error;
mod rbtree;

pub use crate::depth::Depth;
pub use crate::error::Error;
pub use crate::rbtree::{Color, Iter, Node, RbTree, Stats};
