//! Builder that partitions a sequence into bit planes level by level.

use crate::bit_vector::{BitVectorBuilder, BitVectorIndex};
use crate::error::{Error, Result};
use crate::utils;
use crate::wavelet_matrix::WaveletMatrix;

/// Builder for [`WaveletMatrix`].
///
/// Symbols are collected with [`push`](Self::push) or
/// [`extend`](Self::extend) and partitioned on [`build`](Self::build). The
/// alphabet size is derived from the input as `max + 1`.
///
/// # Examples
///
/// ```
/// use wavix::bit_vector::Rank9SelIndex;
/// use wavix::wavelet_matrix::WaveletMatrixBuilder;
///
/// let mut builder = WaveletMatrixBuilder::new();
/// builder.extend([5, 1, 0, 4, 2, 2, 0, 3]);
/// let wm = builder.build::<Rank9SelIndex>()?;
///
/// assert_eq!(wm.len(), 8);
/// assert_eq!(wm.alph_size(), 6);
/// assert_eq!(wm.alph_width(), 3);
/// # Ok::<(), wavix::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct WaveletMatrixBuilder {
    seq: Vec<usize>,
}

impl WaveletMatrixBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a symbol to the sequence.
    #[inline(always)]
    pub fn push(&mut self, val: usize) {
        self.seq.push(val);
    }

    /// Appends symbols from an iterator.
    pub fn extend<It>(&mut self, ints: It)
    where
        It: IntoIterator<Item = usize>,
    {
        self.seq.extend(ints);
    }

    /// Returns the number of symbols collected so far.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    /// Checks if no symbols have been collected.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Partitions the collected sequence into a [`WaveletMatrix`].
    ///
    /// One plane is produced per bit of the alphabet width, most significant
    /// bit first. On each level the sequence is written through a per-node
    /// cursor table (a stable partition by the values' bit prefixes), the
    /// child sizes are accumulated into a histogram, and the histogram is
    /// prefix-summed in bit-reversed node-id order so that all zero children
    /// precede all one children on the next level.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyInput`] if no symbols were collected.
    pub fn build<I: BitVectorIndex>(self) -> Result<WaveletMatrix<I>> {
        let alph_size = self
            .seq
            .iter()
            .copied()
            .max()
            .map(|max| max + 1)
            .ok_or(Error::EmptyInput)?;
        let width = utils::ceil_log2(alph_size);
        let len = self.seq.len();

        let mut layers = Vec::with_capacity(width);
        let mut node_pos: Vec<Vec<usize>> = Vec::with_capacity(width);
        // Virtual level before the first plane: a single root node spanning
        // the whole sequence.
        let mut cursor = vec![0, len];

        for depth in 0..width {
            let mut table = vec![0usize; 1 << (depth + 1)];
            let mut bits = BitVectorBuilder::with_capacity(len);

            for &val in &self.seq {
                let bit = (val >> (width - depth - 1)) & 1 == 1;
                let node = val >> (width - depth);
                bits.set_bit(cursor[node], bit);
                cursor[node] += 1;
                table[(node << 1) | bit as usize] += 1;
            }

            // Histogram to start offsets: prefix sum over child ids
            // enumerated in bit-reversed order, grouping zero children before
            // one children while keeping each half stable.
            let mut sum = 0;
            for k in 0..table.len() {
                let id = utils::reverse_bits_low(k, depth + 1);
                let count = table[id];
                table[id] = sum;
                sum += count;
            }

            layers.push(bits.freeze::<I>());
            cursor = table.clone();
            node_pos.push(table);
        }

        Ok(WaveletMatrix {
            layers,
            node_pos,
            alph_size,
            len,
            seps: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit_vector::prelude::*;
    use crate::bit_vector::Rank9SelIndex;

    #[test]
    fn empty_input_is_rejected() {
        let builder = WaveletMatrixBuilder::new();
        assert!(matches!(
            builder.build::<Rank9SelIndex>(),
            Err(Error::EmptyInput)
        ));
    }

    #[test]
    fn node_pos_tables_describe_the_partition() {
        let mut builder = WaveletMatrixBuilder::new();
        builder.extend([5, 1, 0, 4, 2, 2, 0, 3]);
        let wm = builder.build::<Rank9SelIndex>().unwrap();

        assert_eq!(wm.node_pos.len(), 3);
        assert_eq!(wm.node_pos[0], vec![0, 6]);
        assert_eq!(wm.node_pos[1], vec![0, 5, 3, 8]);
        // last level doubles as the character start table
        assert_eq!(wm.node_pos[2], vec![0, 5, 3, 7, 2, 6, 5, 8]);

        // the split point of each plane equals its zero count
        for (depth, layer) in wm.layers.iter().enumerate() {
            assert_eq!(wm.node_pos[depth][1], layer.num_zeros());
        }
    }

    #[test]
    fn planes_hold_msb_first_bits() {
        let mut builder = WaveletMatrixBuilder::new();
        builder.extend([5, 1, 0, 4, 2, 2, 0, 3]);
        let wm = builder.build::<Rank9SelIndex>().unwrap();

        let plane0: Vec<bool> = (0..8).map(|i| wm.layers[0].access(i).unwrap()).collect();
        assert_eq!(
            plane0,
            [true, false, false, true, false, false, false, false]
        );
        let plane1: Vec<bool> = (0..8).map(|i| wm.layers[1].access(i).unwrap()).collect();
        assert_eq!(plane1, [false, false, true, true, false, true, false, false]);
        let plane2: Vec<bool> = (0..8).map(|i| wm.layers[2].access(i).unwrap()).collect();
        assert_eq!(plane2, [true, false, false, true, false, false, false, true]);
    }

    #[test]
    fn single_symbol_alphabet_has_no_planes() {
        let mut builder = WaveletMatrixBuilder::new();
        builder.extend([0, 0, 0, 0]);
        let wm = builder.build::<Rank9SelIndex>().unwrap();
        assert_eq!(wm.len(), 4);
        assert_eq!(wm.alph_size(), 1);
        assert_eq!(wm.alph_width(), 0);
        assert!(wm.layers.is_empty());
    }

    #[test]
    fn alphabet_size_one_past_a_power_of_two() {
        let mut builder = WaveletMatrixBuilder::new();
        builder.extend([8, 0, 3]);
        let wm = builder.build::<Rank9SelIndex>().unwrap();
        assert_eq!(wm.alph_size(), 9);
        assert_eq!(wm.alph_width(), 4);
        assert_eq!(wm.access(0), Some(8));
        assert_eq!(wm.access(1), Some(0));
        assert_eq!(wm.access(2), Some(3));
    }
}
