use std::{error, fmt};

/// Error enumerates over all possible errors that [`RbTree::validate`]
/// shall return.
///
/// [`RbTree::validate`]: crate::RbTree::validate
#[derive(Debug, PartialEq)]
pub enum Error<T> {
    /// Fatal case, root node is colored red.
    RedRoot,
    /// Fatal case, a red node has a red child.
    ConsecutiveReds,
    /// Fatal case, number of blacks differ between left and right subtree.
    /// The String component of this variant can be used for debugging.
    UnbalancedBlacks(String),
    /// Fatal case, tree entries are not in sort-order. (child, parent)
    SortError(T, T),
    /// Fatal case, child's parent link does not point back to its parent.
    DanglingParent(String),
    /// Fatal case, (counted, reachable) entries do not match.
    CountMismatch(usize, usize),
}

impl<T> fmt::Display for Error<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::RedRoot => write!(f, "root node is red"),
            Error::ConsecutiveReds => write!(f, "consecutive red nodes"),
            Error::UnbalancedBlacks(msg) => write!(f, "unbalanced blacks, {}", msg),
            Error::SortError(child, parent) => {
                write!(f, "sort error, child {:?} parent {:?}", child, parent)
            }
            Error::DanglingParent(msg) => write!(f, "dangling parent, {}", msg),
            Error::CountMismatch(n, m) => {
                write!(f, "count mismatch, counted {} reachable {}", n, m)
            }
        }
    }
}

impl<T> error::Error for Error<T> where T: fmt::Debug {}
