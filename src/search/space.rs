use indexmap::map::Entry;
use indexmap::IndexMap;
use rustc_hash::FxHasher;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::{BuildHasherDefault, Hash};

pub(crate) type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Parent index of a search root.
pub(crate) const NO_PARENT: usize = usize::MAX;

/// Heap entry: ascending weight, ties broken by insertion order.
#[derive(Debug)]
struct SmallestHolder {
    weight: f32,
    index: usize,
}

impl PartialEq for SmallestHolder {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SmallestHolder {}

impl PartialOrd for SmallestHolder {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SmallestHolder {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; earlier insertions first on ties.
        other
            .weight
            .total_cmp(&self.weight)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// The record kept per reached node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Visit {
    /// Arena index of the predecessor, [`NO_PARENT`] for roots.
    pub parent: usize,
    pub weight: f32,
    pub settled: bool,
}

/// The per-query scratch of one directional search: a min-heap over an
/// arena of visit records.
///
/// Nodes live in an insertion-ordered map so predecessor links are plain
/// indices; path reconstruction walks indices without touching a hash.
/// Improved entries are re-pushed rather than decreased, and stale heap
/// entries are skipped on pop.
pub(crate) struct SearchSpace<N> {
    heap: BinaryHeap<SmallestHolder>,
    arena: FxIndexMap<N, Visit>,
    settled: usize,
}

impl<N> SearchSpace<N>
where
    N: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        SearchSpace {
            heap: BinaryHeap::with_capacity(256),
            arena: FxIndexMap::with_capacity_and_hasher(64, BuildHasherDefault::default()),
            settled: 0,
        }
    }

    /// Inserts or improves a node. Returns `true` when the entry was
    /// queued (fresh, or cheaper than every earlier visit).
    pub fn push(&mut self, node: N, parent: usize, weight: f32) -> bool {
        let index = match self.arena.entry(node) {
            Entry::Vacant(entry) => {
                let index = entry.index();
                entry.insert(Visit {
                    parent,
                    weight,
                    settled: false,
                });
                index
            }
            Entry::Occupied(mut entry) => {
                let visit = entry.get_mut();
                if visit.settled || weight >= visit.weight {
                    return false;
                }

                visit.weight = weight;
                visit.parent = parent;
                entry.index()
            }
        };

        self.heap.push(SmallestHolder { weight, index });
        true
    }

    /// Settles and returns the cheapest open node.
    pub fn pop(&mut self) -> Option<(usize, f32)> {
        while let Some(SmallestHolder { weight, index }) = self.heap.pop() {
            let (_, visit) = self.arena.get_index_mut(index).unwrap();
            if visit.settled || weight > visit.weight {
                continue;
            }

            visit.settled = true;
            self.settled += 1;
            return Some((index, weight));
        }

        None
    }

    /// Weight at the top of the queue, discarding stale entries.
    pub fn peek(&mut self) -> Option<f32> {
        while let Some(top) = self.heap.peek() {
            let (weight, index) = (top.weight, top.index);

            let (_, visit) = self.arena.get_index(index).unwrap();
            if visit.settled || weight > visit.weight {
                self.heap.pop();
                continue;
            }

            return Some(weight);
        }

        None
    }

    #[inline]
    pub fn node(&self, index: usize) -> &N {
        self.arena.get_index(index).unwrap().0
    }

    #[inline]
    pub fn settled_count(&self) -> usize {
        self.settled
    }

    /// Final weight and arena index, if the node has been settled.
    pub fn settled_weight(&self, node: &N) -> Option<(f32, usize)> {
        self.arena
            .get_full(node)
            .filter(|(_, _, visit)| visit.settled)
            .map(|(index, _, visit)| (visit.weight, index))
    }

    /// Tentative weight and arena index, settled or not.
    pub fn visited_weight(&self, node: &N) -> Option<(f32, usize)> {
        self.arena
            .get_full(node)
            .map(|(index, _, visit)| (visit.weight, index))
    }

    /// All settled nodes with their final weights.
    pub fn settled_iter(&self) -> impl Iterator<Item = (&N, f32)> {
        self.arena
            .iter()
            .filter(|(_, visit)| visit.settled)
            .map(|(node, visit)| (node, visit.weight))
    }

    /// Reconstructs the node chain root → `index` by walking parents.
    pub fn path_from(&self, index: usize) -> Vec<N> {
        let mut reversed = Vec::new();
        let mut cursor = index;

        while cursor != NO_PARENT {
            let (node, visit) = self.arena.get_index(cursor).unwrap();
            reversed.push(node.clone());
            cursor = visit.parent;
        }

        reversed.reverse();
        reversed
    }
}
