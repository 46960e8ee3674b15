//! Growable node store, addressed by integer handles.

use std::mem;
use std::ops::{Index, IndexMut};

/// Handle to a node allocated in [`Arena`]. The reserved handle [`NIL`]
/// never refers to an allocated slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) struct NodeId(usize);

/// Sentinel handle standing for every leaf position and for the missing
/// parent of the root.
pub(crate) const NIL: NodeId = NodeId(usize::MAX);

impl NodeId {
    #[inline]
    pub(crate) fn is_nil(self) -> bool {
        self == NIL
    }
}

#[derive(Clone)]
enum Block<T> {
    Occupied(T),
    Vacant(Option<usize>),
}

/// Arena of objects of a single type. Freed slots are chained into a free
/// list and reused by later allocations, so handles stay stable for as
/// long as the object lives.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    head: Option<usize>,
    blocks: Vec<Block<T>>,
    len: usize,
}

impl<T> Arena<T> {
    pub(crate) fn new() -> Arena<T> {
        Arena {
            head: None,
            blocks: Vec::new(),
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn allocate(&mut self, value: T) -> NodeId {
        self.len += 1;
        match self.head.take() {
            None => {
                self.blocks.push(Block::Occupied(value));
                NodeId(self.blocks.len() - 1)
            }
            Some(index) => {
                let old = mem::replace(&mut self.blocks[index], Block::Occupied(value));
                match old {
                    Block::Vacant(next) => self.head = next,
                    Block::Occupied(_) => panic!("allocate(): free list points to occupied block"),
                }
                NodeId(index)
            }
        }
    }

    /// Deallocate the object at `id` and return it.
    ///
    /// Panics if `id` is NIL or refers to a vacant slot.
    pub(crate) fn free(&mut self, id: NodeId) -> T {
        if id.is_nil() || id.0 >= self.blocks.len() {
            panic!("free(): invalid handle {:?}", id);
        }
        let old = mem::replace(&mut self.blocks[id.0], Block::Vacant(self.head));
        match old {
            Block::Vacant(_) => panic!("free(): attempting to free vacant block {:?}", id),
            Block::Occupied(value) => {
                self.head = Some(id.0);
                self.len -= 1;
                value
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.blocks.clear();
        self.head = None;
        self.len = 0;
    }

    /// Return mutable references to two distinct live objects.
    pub(crate) fn pair_mut(&mut self, a: NodeId, b: NodeId) -> (&mut T, &mut T) {
        if a == b {
            panic!("pair_mut(): same handle {:?}", a);
        }
        let (lo, hi, swapped) = if a.0 < b.0 {
            (a.0, b.0, false)
        } else {
            (b.0, a.0, true)
        };
        let (left, right) = self.blocks.split_at_mut(hi);
        let (x, y) = match (&mut left[lo], &mut right[0]) {
            (Block::Occupied(x), Block::Occupied(y)) => (x, y),
            _ => panic!("pair_mut(): vacant block {:?} {:?}", a, b),
        };
        if swapped {
            (y, x)
        } else {
            (x, y)
        }
    }
}

impl<T> Index<NodeId> for Arena<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        match self.blocks.get(id.0) {
            Some(Block::Occupied(value)) => value,
            _ => panic!("index(): invalid or vacant handle {:?}", id),
        }
    }
}

impl<T> IndexMut<NodeId> for Arena<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        match self.blocks.get_mut(id.0) {
            Some(Block::Occupied(value)) => value,
            _ => panic!("index_mut(): invalid or vacant handle {:?}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Arena, NIL};

    #[test]
    fn test_allocate_free() {
        let mut arena = Arena::new();
        let a = arena.allocate(10);
        let b = arena.allocate(20);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena[a], 10);
        arena[b] += 1;
        assert_eq!(arena.free(b), 21);
        assert_eq!(arena.len(), 1);

        // freed slot is reused.
        let c = arena.allocate(30);
        assert_eq!(c, b);
        assert_eq!(arena[c], 30);
    }

    #[test]
    fn test_pair_mut() {
        let mut arena = Arena::new();
        let a = arena.allocate(1);
        let b = arena.allocate(2);
        {
            let (x, y) = arena.pair_mut(b, a);
            std::mem::swap(x, y);
        }
        assert_eq!(arena[a], 2);
        assert_eq!(arena[b], 1);
    }

    #[test]
    #[should_panic]
    fn test_free_nil() {
        let mut arena: Arena<u32> = Arena::new();
        arena.allocate(1);
        arena.free(NIL);
    }

    #[test]
    #[should_panic]
    fn test_double_free() {
        let mut arena = Arena::new();
        let a = arena.allocate(1);
        arena.free(a);
        arena.free(a);
    }
}
