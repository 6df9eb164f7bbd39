use crate::Cell;
use fxhash::FxHasher;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::hash::BuildHasherDefault;

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Search state for one explored lattice coordinate.
///
/// An expanded node always has a parent, except the search start.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    parent: Option<Cell>,
    expanded: bool,
}

impl Node {
    /// The coordinate this node was reached from, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&Cell> {
        self.parent.as_ref()
    }

    /// Whether this node has been taken off the frontier.
    #[inline]
    #[must_use]
    pub fn expanded(&self) -> bool {
        self.expanded
    }

    #[inline]
    pub(crate) fn expand(&mut self) {
        self.expanded = true;
    }

    #[inline]
    pub(crate) fn expand_from(&mut self, parent: Cell) {
        self.parent = Some(parent);
        self.expanded = true;
    }
}

/// Sparse table of [Node]s keyed by lattice coordinate. Entries are created
/// lazily on first reference and never evicted during a plan.
#[derive(Debug, Clone, Default)]
pub struct NodeTable {
    bounds: SmallVec<[usize; 4]>,
    nodes: FxIndexMap<Cell, Node>,
}

impl NodeTable {
    /// Create a table accepting coordinates `0 <= c_i < bounds[i]` per axis.
    #[inline]
    #[must_use]
    pub fn new(bounds: &[usize]) -> Self {
        Self {
            bounds: SmallVec::from_slice(bounds),
            nodes: FxIndexMap::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.bounds.len()
    }

    /// The number of nodes created so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up the node for the given coordinates, inserting a fresh
    /// unexpanded one if absent. Returns `None` when the coordinate arity
    /// does not match or any axis is out of this table's bounds.
    pub fn get_or_insert(&mut self, coords: &[i64]) -> Option<&mut Node> {
        if !self.contains_coords(coords) {
            return None;
        }
        Some(
            self.nodes
                .entry(SmallVec::from_slice(coords))
                .or_default(),
        )
    }

    /// Look up an existing node without creating one.
    #[inline]
    #[must_use]
    pub fn get(&self, coords: &[i64]) -> Option<&Node> {
        self.nodes.get(coords)
    }

    /// Iterate created nodes in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&Cell, &Node)> {
        self.nodes.iter()
    }

    #[inline]
    fn contains_coords(&self, coords: &[i64]) -> bool {
        coords.len() == self.bounds.len()
            && coords
                .iter()
                .zip(self.bounds.iter())
                .all(|(&c, &b)| c >= 0 && c < b as i64)
    }
}
