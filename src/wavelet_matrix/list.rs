//! Best-first enumeration of the characters occurring in a position range.
//!
//! A query node is a window into one plane together with the value prefix it
//! represents. Nodes live in a max-heap keyed by one of three orders; the
//! best node is popped, emitted when it reached the leaf level, and expanded
//! into its children otherwise. Children are mapped with the same rank
//! arithmetic the point queries use: zeros go to `rank0(pos)`, ones to
//! `num_zeros + pos - rank0(pos)`.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::marker::PhantomData;
use std::ops::Range;

use crate::bit_vector::prelude::*;
use crate::bit_vector::BitVector;
use crate::wavelet_matrix::WaveletMatrix;

/// A character and its occurrence count, produced by the listing queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListEntry {
    /// The character.
    pub val: usize,
    /// Number of occurrences of the character within the queried range.
    pub freq: usize,
}

/// A live node of the implicit alphabet tree: a window `beg..end` into the
/// plane at `depth`, covering all characters that start with `prefix`.
#[derive(Debug, Clone, Copy)]
pub(super) struct QueryNode {
    beg: usize,
    end: usize,
    depth: usize,
    prefix: usize,
}

impl QueryNode {
    #[inline(always)]
    fn width(&self) -> usize {
        self.end - self.beg
    }
}

/// Heap order for query nodes. `Greater` pops first.
///
/// Ties always prefer deeper nodes so that finished characters surface
/// before half-expanded subtrees, and finally the value prefix, which keeps
/// the emitted order independent of where a node sits inside a plane.
pub(super) trait NodeOrder {
    /// Compares two nodes; the greater one is popped first.
    fn cmp(lhs: &QueryNode, rhs: &QueryNode) -> Ordering;
}

/// Largest window first: characters come out by descending frequency.
pub(super) struct ByFreq;

/// Deepest node first, smaller prefix first: characters come out ascending.
pub(super) struct ByMinValue;

/// Deepest node first, larger prefix first: characters come out descending.
pub(super) struct ByMaxValue;

impl NodeOrder for ByFreq {
    fn cmp(lhs: &QueryNode, rhs: &QueryNode) -> Ordering {
        lhs.width()
            .cmp(&rhs.width())
            .then_with(|| lhs.depth.cmp(&rhs.depth))
            .then_with(|| rhs.prefix.cmp(&lhs.prefix))
    }
}

impl NodeOrder for ByMinValue {
    fn cmp(lhs: &QueryNode, rhs: &QueryNode) -> Ordering {
        lhs.depth
            .cmp(&rhs.depth)
            .then_with(|| rhs.prefix.cmp(&lhs.prefix))
    }
}

impl NodeOrder for ByMaxValue {
    fn cmp(lhs: &QueryNode, rhs: &QueryNode) -> Ordering {
        lhs.depth
            .cmp(&rhs.depth)
            .then_with(|| lhs.prefix.cmp(&rhs.prefix))
    }
}

struct Candidate<O> {
    node: QueryNode,
    _order: PhantomData<O>,
}

impl<O> Candidate<O> {
    const fn new(node: QueryNode) -> Self {
        Self {
            node,
            _order: PhantomData,
        }
    }
}

impl<O: NodeOrder> PartialEq for Candidate<O> {
    fn eq(&self, other: &Self) -> bool {
        O::cmp(&self.node, &other.node) == Ordering::Equal
    }
}

impl<O: NodeOrder> Eq for Candidate<O> {}

impl<O: NodeOrder> PartialOrd for Candidate<O> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<O: NodeOrder> Ord for Candidate<O> {
    fn cmp(&self, other: &Self) -> Ordering {
        O::cmp(&self.node, &other.node)
    }
}

/// Collects up to `num` distinct characters of `vals` occurring in
/// `positions`, best first according to `O`.
pub(super) fn list_range<I, O>(
    wm: &WaveletMatrix<I>,
    vals: Range<usize>,
    positions: Range<usize>,
    num: usize,
) -> Vec<ListEntry>
where
    I: BitVectorIndex,
    O: NodeOrder,
{
    let mut results = Vec::new();
    if wm.len() < positions.end || positions.start >= positions.end {
        return results;
    }
    if wm.alph_size() <= vals.start || vals.end <= vals.start {
        return results;
    }
    let lo = vals.start;
    let hi = vals.end.min(wm.alph_size());
    let width = wm.alph_width();

    let mut heap: BinaryHeap<Candidate<O>> = BinaryHeap::new();
    heap.push(Candidate::new(QueryNode {
        beg: positions.start,
        end: positions.end,
        depth: 0,
        prefix: 0,
    }));

    while results.len() < num {
        let Some(cand) = heap.pop() else {
            break;
        };
        let node = cand.node;
        if node.depth == width {
            results.push(ListEntry {
                val: node.prefix,
                freq: node.width(),
            });
            continue;
        }
        for child in expand(&wm.layers[node.depth], &node).into_iter().flatten() {
            if child.width() > 0 && check_prefix(child.prefix, child.depth, width, lo, hi) {
                heap.push(Candidate::new(child));
            }
        }
    }
    results
}

/// Maps a node's window into its zero and one children on the next plane.
fn expand<I: BitVectorIndex>(layer: &BitVector<I>, node: &QueryNode) -> [Option<QueryNode>; 2] {
    let (Some(beg_zeros), Some(end_zeros)) = (layer.rank0(node.beg), layer.rank0(node.end)) else {
        return [None, None];
    };
    let zeros = layer.num_zeros();
    let zero = QueryNode {
        beg: beg_zeros,
        end: end_zeros,
        depth: node.depth + 1,
        prefix: node.prefix << 1,
    };
    let one = QueryNode {
        beg: zeros + (node.beg - beg_zeros),
        end: zeros + (node.end - end_zeros),
        depth: node.depth + 1,
        prefix: (node.prefix << 1) | 1,
    };
    [Some(zero), Some(one)]
}

/// Checks whether a `depth`-bit prefix can still lead to a character in
/// `lo..hi`. `hi` is exclusive, so the comparison runs against `hi - 1`.
fn check_prefix(prefix: usize, depth: usize, width: usize, lo: usize, hi: usize) -> bool {
    let prefix_of = |x: usize| x >> (width - depth);
    prefix_of(lo) <= prefix && prefix <= prefix_of(hi - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(beg: usize, end: usize, depth: usize, prefix: usize) -> QueryNode {
        QueryNode {
            beg,
            end,
            depth,
            prefix,
        }
    }

    #[test]
    fn freq_order_prefers_wide_then_deep_then_small_prefix() {
        let wide = node(0, 5, 1, 0);
        let narrow = node(0, 2, 3, 1);
        assert_eq!(ByFreq::cmp(&wide, &narrow), Ordering::Greater);

        let shallow = node(0, 2, 1, 0);
        let deep = node(4, 6, 3, 2);
        assert_eq!(ByFreq::cmp(&deep, &shallow), Ordering::Greater);

        let small = node(7, 9, 3, 2);
        let large = node(1, 3, 3, 5);
        assert_eq!(ByFreq::cmp(&small, &large), Ordering::Greater);
    }

    #[test]
    fn value_orders_key_on_prefix() {
        let a = node(6, 8, 2, 1);
        let b = node(0, 2, 2, 2);
        assert_eq!(ByMinValue::cmp(&a, &b), Ordering::Greater);
        assert_eq!(ByMaxValue::cmp(&b, &a), Ordering::Greater);

        let deep = node(0, 1, 3, 0);
        let shallow = node(0, 1, 2, 3);
        assert_eq!(ByMinValue::cmp(&deep, &shallow), Ordering::Greater);
        assert_eq!(ByMaxValue::cmp(&deep, &shallow), Ordering::Greater);
    }

    #[test]
    fn prefix_check_uses_exclusive_upper_bound() {
        // width 3, characters 1..3: at depth 2 only prefixes 0b00 and 0b01 fit
        assert!(check_prefix(0b00, 2, 3, 1, 3));
        assert!(check_prefix(0b01, 2, 3, 1, 3));
        assert!(!check_prefix(0b10, 2, 3, 1, 3));
        // at full depth the bound excludes the character 3 itself
        assert!(check_prefix(0b010, 3, 3, 1, 3));
        assert!(!check_prefix(0b011, 3, 3, 1, 3));
    }
}
