use std::{
    borrow::Borrow,
    cmp::Ordering,
    iter::FromIterator,
    mem,
};

use log::{debug, trace};
use rand::Rng;

use crate::arena::{Arena, NodeId, NIL};
use crate::depth::Depth;
use crate::error::Error;

/// Color of a node. NIL leaves are always black.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Color {
    Red,
    Black,
}

// Side of a child relative to its parent, also the direction of a rotation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    fn flip(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// RbTree manage a single instance of in-memory sorted index using
/// [red-black][rbtree] tree. Nodes carry a back link to their parent and
/// are stored in an arena owned by the tree.
///
/// ```
/// use rbtree_index::RbTree;
///
/// let mut index: RbTree<i64> = RbTree::new("myinstance");
/// for value in [10, 18, 7, 15, 16].iter() {
///     index.insert(*value);
/// }
/// assert!(index.contains(&15));
/// assert_eq!(index.remove(&18), Some(18));
/// assert_eq!(index.iter().cloned().collect::<Vec<i64>>(), vec![7, 10, 15, 16]);
/// ```
///
/// [rbtree]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
#[derive(Clone)]
pub struct RbTree<T> {
    name: String,
    root: Option<NodeId>,
    nodes: Arena<Node<T>>,
    n_count: usize, // number of entries in the tree.
}

/// Different ways to construct a new RbTree instance.
impl<T> RbTree<T> {
    /// Create an empty instance of RbTree, identified by `name`.
    /// Applications can choose unique names.
    pub fn new<S>(name: S) -> RbTree<T>
    where
        S: AsRef<str>,
    {
        RbTree {
            name: name.as_ref().to_string(),
            root: Default::default(),
            nodes: Arena::new(),
            n_count: Default::default(),
        }
    }

    /// Create a new instance of RbTree and load it with values from
    /// `iter`. Duplicate values are ignored.
    pub fn load_from<S, I>(name: S, iter: I) -> RbTree<T>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = T>,
        T: Ord,
    {
        let mut index = RbTree::new(name);
        index.extend(iter);
        debug!("{}: loaded {} entries", index.name, index.n_count);
        index
    }
}

/// Maintenance API.
impl<T> RbTree<T> {
    /// Identify this instance. Applications can choose unique names while
    /// creating RbTree instances.
    #[inline]
    pub fn id(&self) -> String {
        self.name.clone()
    }

    /// Return number of entries in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_count
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_count == 0
    }

    /// Remove all entries from this instance.
    pub fn clear(&mut self) {
        self.root = None;
        self.nodes.clear();
        self.n_count = 0;
    }

    /// Return quickly with basic statisics, only entries() and node_size()
    /// are valid with this statisics.
    pub fn stats(&self) -> Stats {
        Stats::new(self.n_count, mem::size_of::<Node<T>>())
    }
}

/// Write operations on RbTree instance.
impl<T> RbTree<T>
where
    T: Ord,
{
    /// Insert `value` into the index. Return false, leaving the index
    /// untouched, if value is already present.
    pub fn insert(&mut self, value: T) -> bool {
        let root = match self.root {
            None => {
                let id = self.nodes.allocate(Node::new(value, Color::Black, NIL));
                self.root = Some(id);
                self.n_count += 1;
                return true;
            }
            Some(root) => root,
        };

        let (parent, side) = {
            let mut id = root;
            loop {
                let node = &self.nodes[id];
                let side = match node.value.cmp(&value) {
                    Ordering::Less => Side::Right,
                    Ordering::Greater => Side::Left,
                    Ordering::Equal => return false,
                };
                match node.child(side) {
                    next if next.is_nil() => break (id, side),
                    next => id = next,
                }
            }
        };

        let id = self.nodes.allocate(Node::new(value, Color::Red, parent));
        self.nodes[parent].set_child(side, id);
        self.n_count += 1;
        self.insert_fixup(id);
        true
    }

    /// Remove `value` from this index and return the stored value. If
    /// value is not present, then remove is effectively a no-op.
    pub fn remove<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut id = self.find_node(value);
        if id.is_nil() {
            return None;
        }

        let (left, right) = (self.nodes[id].left, self.nodes[id].right);
        if !left.is_nil() && !right.is_nil() {
            let successor = self.leftmost(right);
            self.swap_values(id, successor);
            id = successor;
        }

        let old_value = self.remove_node(id);
        self.n_count -= 1;
        Some(old_value)
    }

    /// Validate red-black tree with following rules:
    ///
    /// * Root node is black.
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * Number of blacks should be same under left child and right child.
    /// * Make sure values are in sorted order.
    /// * Every child links back to its parent.
    /// * Number of reachable nodes match len().
    ///
    /// Additionally return full statistics on the tree. Refer to [`Stats`]
    /// for more information.
    pub fn validate(&self) -> Result<Stats, Error<T>>
    where
        T: Clone,
    {
        let root = self.root.unwrap_or(NIL);
        if self.is_red(root) {
            return Err(Error::RedRoot);
        }
        if !root.is_nil() && !self.nodes[root].parent.is_nil() {
            return Err(Error::DanglingParent("root has a parent".to_string()));
        }

        let mut stats = Stats::new(self.n_count, mem::size_of::<Node<T>>());
        stats.set_depths(Depth::new());
        let mut reachable = 0;
        let blacks = self.validate_tree(root, false, 0, 0, &mut reachable, &mut stats)?;
        if reachable != self.n_count {
            return Err(Error::CountMismatch(self.n_count, reachable));
        } else if self.nodes.len() != reachable {
            // nodes leaked in the arena.
            return Err(Error::CountMismatch(self.nodes.len(), reachable));
        }

        let mut iter = self.iter();
        if let Some(mut prev) = iter.next() {
            for value in iter {
                if value <= prev {
                    return Err(Error::SortError(value.clone(), prev.clone()));
                }
                prev = value;
            }
        }

        stats.set_blacks(blacks);
        Ok(stats)
    }
}

/// Read operations on RbTree instance.
impl<T> RbTree<T> {
    /// Return the node holding `value`.
    pub fn find<Q>(&self, value: &Q) -> Option<&Node<T>>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.to_node(self.find_node(value))
    }

    /// Check whether `value` is present in this index.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        !self.find_node(value).is_nil()
    }

    /// Return the root node, None if the index is empty.
    pub fn root(&self) -> Option<&Node<T>> {
        self.root.map(|id| &self.nodes[id])
    }

    /// Return parent of `node`, None for the root node. `node` must have
    /// been obtained from this instance.
    pub fn parent(&self, node: &Node<T>) -> Option<&Node<T>> {
        self.to_node(node.parent)
    }

    /// Return left child of `node`, None for a NIL leaf.
    pub fn left(&self, node: &Node<T>) -> Option<&Node<T>> {
        self.to_node(node.left)
    }

    /// Return right child of `node`, None for a NIL leaf.
    pub fn right(&self, node: &Node<T>) -> Option<&Node<T>> {
        self.to_node(node.right)
    }

    /// Return a random entry from this index.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<&T> {
        let mut id = self.root?;

        let mut at_depth = rng.gen::<u8>() % 40;
        loop {
            let node = &self.nodes[id];
            let next = match rng.gen::<u8>() % 2 {
                0 => node.left,
                _ => node.right,
            };
            if at_depth == 0 || next.is_nil() {
                break Some(&node.value);
            }
            at_depth -= 1;
            id = next;
        }
    }

    /// Return an in-order iterator over all values in this instance.
    /// Every call starts a fresh walk from the smallest value.
    pub fn iter(&self) -> Iter<T> {
        let mut iter = Iter {
            nodes: &self.nodes,
            stack: Vec::new(),
            remaining: self.n_count,
        };
        iter.push_left(self.root.unwrap_or(NIL));
        iter
    }
}

impl<T> RbTree<T> {
    fn find_node<Q>(&self, value: &Q) -> NodeId
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut id = self.root.unwrap_or(NIL);
        while !id.is_nil() {
            let node = &self.nodes[id];
            id = match node.value.borrow().cmp(value) {
                Ordering::Less => node.right,
                Ordering::Greater => node.left,
                Ordering::Equal => return id,
            };
        }
        NIL
    }

    fn to_node(&self, id: NodeId) -> Option<&Node<T>> {
        if id.is_nil() {
            None
        } else {
            Some(&self.nodes[id])
        }
    }

    #[inline]
    fn is_root(&self, id: NodeId) -> bool {
        self.root == Some(id)
    }

    #[inline]
    fn color(&self, id: NodeId) -> Color {
        if id.is_nil() {
            Color::Black
        } else {
            self.nodes[id].color
        }
    }

    #[inline]
    fn is_red(&self, id: NodeId) -> bool {
        self.color(id) == Color::Red
    }

    #[inline]
    fn set_color(&mut self, id: NodeId, color: Color) {
        if id.is_nil() {
            panic!("set_color(): painting NIL leaf ? Call the programmer");
        }
        self.nodes[id].color = color
    }

    #[inline]
    fn parent_of(&self, id: NodeId) -> NodeId {
        self.nodes[id].parent
    }

    #[inline]
    fn child(&self, id: NodeId, side: Side) -> NodeId {
        self.nodes[id].child(side)
    }

    #[inline]
    fn set_parent(&mut self, id: NodeId, parent: NodeId) {
        if !id.is_nil() {
            self.nodes[id].parent = parent
        }
    }

    // side occupied by `id` under `parent`.
    #[inline]
    fn side_of(&self, id: NodeId, parent: NodeId) -> Side {
        if self.nodes[parent].left == id {
            Side::Left
        } else {
            Side::Right
        }
    }

    // sibling of `id` and the side the sibling occupies under the parent.
    fn sibling(&self, id: NodeId) -> (NodeId, Side) {
        let parent = self.parent_of(id);
        let side = self.side_of(id, parent).flip();
        (self.child(parent, side), side)
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while !self.nodes[id].left.is_nil() {
            id = self.nodes[id].left;
        }
        id
    }

    fn swap_values(&mut self, a: NodeId, b: NodeId) {
        let (x, y) = self.nodes.pair_mut(a, b);
        mem::swap(&mut x.value, &mut y.value);
    }

    // make `new` take the place of `old` under `parent`, or the root's
    // place if parent is NIL.
    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if parent.is_nil() {
            self.root = if new.is_nil() { None } else { Some(new) };
        } else {
            let side = self.side_of(old, parent);
            self.nodes[parent].set_child(side, new);
        }
        self.set_parent(new, parent);
    }

    //                  Side::Right                     Side::Left
    //
    //         gf                 parent          gf                 parent
    //        /  \                /    \         /  \                /    \
    //    parent  c     ==>      a      gf      a   parent   ==>    gf     c
    //    /    \                       /  \         /    \         /  \
    //   a    inner                inner   c     inner    c       a   inner
    //
    fn rotate(&mut self, dir: Side, node: NodeId, parent: NodeId, gf: NodeId, recolor: bool) {
        if self.child(gf, dir.flip()) != parent {
            panic!("rotate(): {:?} rotation on a non-child ? Call the programmer", dir);
        }
        let great = self.parent_of(gf);
        self.replace_child(great, gf, parent);

        let inner = self.child(parent, dir);
        self.nodes[parent].set_child(dir, gf);
        self.nodes[gf].parent = parent;
        self.nodes[gf].set_child(dir.flip(), inner);
        self.set_parent(inner, gf);

        if recolor {
            self.set_color(parent, Color::Black);
            self.set_color(node, Color::Red);
            self.set_color(gf, Color::Red);
        }
    }

    fn insert_fixup(&mut self, mut node: NodeId) {
        loop {
            let parent = self.parent_of(node);
            if parent.is_nil() || self.is_root(parent) || !self.is_red(parent) {
                return;
            }

            let gf = self.parent_of(parent);
            let node_dir = self.side_of(node, parent);
            let parent_dir = self.side_of(parent, gf);
            let uncle = self.child(gf, parent_dir.flip());

            if self.is_red(uncle) {
                trace!("{}: insert fixup, red uncle", self.name);
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                if !self.is_root(gf) {
                    self.set_color(gf, Color::Red);
                }
                // red-red violation may have moved up to the grandfather.
                node = gf;
                continue;
            }

            trace!("{}: insert fixup, {:?}-{:?}", self.name, node_dir, parent_dir);
            match (node_dir, parent_dir) {
                (Side::Left, Side::Left) => self.rotate(Side::Right, node, parent, gf, true),
                (Side::Right, Side::Right) => self.rotate(Side::Left, node, parent, gf, true),
                (Side::Left, Side::Right) => {
                    self.rotate(Side::Right, NIL, node, parent, false);
                    self.rotate(Side::Left, parent, node, gf, true);
                }
                (Side::Right, Side::Left) => {
                    self.rotate(Side::Left, NIL, node, parent, false);
                    self.rotate(Side::Right, parent, node, gf, true);
                }
            }
            return;
        }
    }

    // remove a node with at most one child and return its value.
    fn remove_node(&mut self, id: NodeId) -> T {
        let (left, right) = (self.nodes[id].left, self.nodes[id].right);
        let child = if left.is_nil() { right } else { left };

        if self.is_root(id) {
            self.replace_child(NIL, id, child);
            if !child.is_nil() {
                self.set_color(child, Color::Black);
            }
            return self.nodes.free(id).value;
        }

        let color = self.nodes[id].color;
        match color {
            Color::Red if !child.is_nil() => {
                panic!("remove_node(): red node with a child ? Call the programmer");
            }
            Color::Red => {
                self.unlink(id);
                self.nodes.free(id).value
            }
            Color::Black if self.is_red(child) => {
                let (cl, cr) = (self.nodes[child].left, self.nodes[child].right);
                if !cl.is_nil() || !cr.is_nil() {
                    panic!("remove_node(): red child with children ? Call the programmer");
                }
                // absorb the red child, node keeps its place and color.
                self.swap_values(id, child);
                self.nodes[id].left = cl;
                self.nodes[id].right = cr;
                self.nodes.free(child).value
            }
            Color::Black if !child.is_nil() => {
                panic!("remove_node(): black node with lone black child ? Call the programmer");
            }
            Color::Black => {
                self.fix_double_black(id);
                self.unlink(id);
                self.nodes.free(id).value
            }
        }
    }

    // detach a leaf from its parent.
    fn unlink(&mut self, id: NodeId) {
        let parent = self.parent_of(id);
        let side = self.side_of(id, parent);
        self.nodes[parent].set_child(side, NIL);
    }

    // restore black height above `node`, which is about to lose a black.
    fn fix_double_black(&mut self, mut node: NodeId) {
        loop {
            if self.is_root(node) {
                trace!("{}: double black, case 1", self.name);
                self.set_color(node, Color::Black);
                return;
            }

            let parent = self.parent_of(node);
            let (sibling, side) = self.sibling(node);
            if sibling.is_nil() {
                panic!("fix_double_black(): double black without sibling ? Call the programmer");
            }
            let closer = self.child(sibling, side.flip());
            let outer = self.child(sibling, side);
            let black_nephews = !self.is_red(closer) && !self.is_red(outer);

            if self.is_red(sibling) && !self.is_red(parent) && black_nephews {
                trace!("{}: double black, case 2", self.name);
                self.rotate(side.flip(), NIL, sibling, parent, false);
                self.set_color(parent, Color::Red);
                self.set_color(sibling, Color::Black);
                continue;
            }

            if !self.is_red(sibling) && !self.is_red(parent) && black_nephews {
                trace!("{}: double black, case 3", self.name);
                self.set_color(sibling, Color::Red);
                node = parent;
                continue;
            }

            if self.is_red(parent) && !self.is_red(sibling) && black_nephews {
                trace!("{}: double black, case 4", self.name);
                self.set_color(parent, Color::Black);
                self.set_color(sibling, Color::Red);
                return;
            }

            let mut sibling = sibling;
            if self.is_red(closer) && !self.is_red(outer) && !self.is_red(sibling) {
                trace!("{}: double black, case 5", self.name);
                self.rotate(side, NIL, closer, sibling, false);
                self.set_color(closer, Color::Black);
                self.set_color(sibling, Color::Red);
                sibling = closer;
            }

            let outer = self.child(sibling, side);
            if !self.is_red(sibling) && self.is_red(outer) {
                trace!("{}: double black, case 6", self.name);
                let parent_color = self.color(parent);
                self.rotate(side.flip(), NIL, sibling, parent, false);
                self.set_color(sibling, parent_color);
                self.set_color(parent, Color::Black);
                self.set_color(outer, Color::Black);
                return;
            }

            panic!("fix_double_black(): no matching case ? Call the programmer");
        }
    }

    fn validate_tree(
        &self,
        id: NodeId,
        fromred: bool,
        mut nb: usize,
        depth: usize,
        reachable: &mut usize,
        stats: &mut Stats,
    ) -> Result<usize, Error<T>>
    where
        T: Ord + Clone,
    {
        if id.is_nil() {
            if let Some(depths) = stats.depths.as_mut() {
                depths.sample(depth);
            }
            return Ok(nb);
        }
        *reachable += 1;

        let red = self.is_red(id);
        if fromred && red {
            return Err(Error::ConsecutiveReds);
        }
        if !red {
            nb += 1;
        }

        let node = &self.nodes[id];
        for &child in [node.left, node.right].iter() {
            if child.is_nil() {
                continue;
            }
            let cnode = &self.nodes[child];
            if cnode.parent != id {
                let err = format!("child {:?} of {:?} links to {:?}", child, id, cnode.parent);
                return Err(Error::DanglingParent(err));
            }
        }
        if !node.left.is_nil() && self.nodes[node.left].value >= node.value {
            let lvalue = self.nodes[node.left].value.clone();
            return Err(Error::SortError(lvalue, node.value.clone()));
        }
        if !node.right.is_nil() && self.nodes[node.right].value <= node.value {
            let rvalue = self.nodes[node.right].value.clone();
            return Err(Error::SortError(rvalue, node.value.clone()));
        }

        let lblacks = self.validate_tree(node.left, red, nb, depth + 1, reachable, stats)?;
        let rblacks = self.validate_tree(node.right, red, nb, depth + 1, reachable, stats)?;
        if lblacks != rblacks {
            let err = format!("left: {} right: {}", lblacks, rblacks);
            return Err(Error::UnbalancedBlacks(err));
        }
        Ok(lblacks)
    }
}

#[cfg(test)]
impl<T> RbTree<T> {
    // repaint a node, used to break invariants in tests.
    pub(crate) fn paint<Q>(&mut self, value: &Q, color: Color)
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find_node(value);
        self.set_color(id, color);
    }
}

impl<T> Extend<T> for RbTree<T>
where
    T: Ord,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T> FromIterator<T> for RbTree<T>
where
    T: Ord,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        RbTree::load_from("rbtree", iter)
    }
}

impl<'a, T> IntoIterator for &'a RbTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// In-order iterator over values in [`RbTree`].
pub struct Iter<'a, T> {
    nodes: &'a Arena<Node<T>>,
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn push_left(&mut self, mut id: NodeId) {
        while !id.is_nil() {
            self.stack.push(id);
            id = self.nodes[id].left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let nodes: &'a Arena<Node<T>> = self.nodes;
        let node = &nodes[id];
        self.push_left(node.right);
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

/// Node corresponds to a single entry in RbTree instance.
#[derive(Clone)]
pub struct Node<T> {
    value: T,
    color: Color,
    parent: NodeId, // NIL for root
    left: NodeId,   // NIL for leaf
    right: NodeId,  // NIL for leaf
}

impl<T> Node<T> {
    fn new(value: T, color: Color, parent: NodeId) -> Node<T> {
        Node {
            value,
            color,
            parent,
            left: NIL,
            right: NIL,
        }
    }

    #[inline]
    fn child(&self, side: Side) -> NodeId {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    fn set_child(&mut self, side: Side, id: NodeId) {
        match side {
            Side::Left => self.left = id,
            Side::Right => self.right = id,
        }
    }

    /// Return the value held by this node.
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Return color of this node.
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    #[inline]
    pub fn is_black(&self) -> bool {
        self.color == Color::Black
    }
}

/// Statistics on [`RbTree`] tree. Serves two purpose:
///
/// * To get partial but quick statistics via [`RbTree::stats`] method.
/// * To get full statisics via [`RbTree::validate`] method.
#[derive(Default, Debug)]
pub struct Stats {
    entries: usize, // number of entries in the tree.
    node_size: usize,
    blacks: Option<usize>,
    depths: Option<Depth>,
}

impl Stats {
    fn new(entries: usize, node_size: usize) -> Stats {
        Stats {
            entries,
            node_size,
            blacks: Default::default(),
            depths: Default::default(),
        }
    }

    #[inline]
    fn set_blacks(&mut self, blacks: usize) {
        self.blacks = Some(blacks)
    }

    #[inline]
    fn set_depths(&mut self, depths: Depth) {
        self.depths = Some(depths)
    }

    /// Return number entries in [`RbTree`] instance.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Return node-size, including over-head for `RbTree<T>`. Although
    /// the node overhead is constant, the node size varies based on
    /// value type. EG:
    ///
    /// ```
    /// use rbtree_index::RbTree;
    /// let index: RbTree<u64> = RbTree::new("myinstance");
    ///
    /// // size of value: 8 bytes
    /// // color, parent, left and right links: 32 bytes
    /// assert_eq!(index.stats().node_size(), 40);
    /// ```
    #[inline]
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Return number of black nodes from root to NIL leaf, same along
    /// every path.
    #[inline]
    pub fn blacks(&self) -> Option<usize> {
        self.blacks
    }

    /// Return [`Depth`] statistics.
    pub fn depths(&self) -> Option<Depth> {
        match self.depths.as_ref() {
            Some(depths) if depths.samples() > 0 => Some(depths.clone()),
            _ => None,
        }
    }
}
