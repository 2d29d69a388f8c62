//! Time- and space-efficient data structure for a static sequence of
//! integers, supporting rank, select, quantile, and top-k queries.

mod builder;
mod list;

pub use builder::WaveletMatrixBuilder;
pub use list::ListEntry;

use std::mem::size_of;
use std::ops::Range;

use crate::bit_vector::prelude::*;
use crate::bit_vector::{BitVector, BitVectorData, WORD_LEN};
use crate::error::{Error, Result};
use crate::utils;

const U64_BYTES: usize = size_of::<u64>();

/// Occurrence counts of characters equal to, less than, and greater than a
/// pivot character within a position range. The three counts always sum to
/// the length of the queried range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankCounts {
    /// Occurrences of the pivot character itself.
    pub eq: usize,
    /// Occurrences of characters smaller than the pivot.
    pub less: usize,
    /// Occurrences of characters greater than the pivot.
    pub greater: usize,
}

/// Time- and space-efficient data structure for a static sequence of
/// integers, supporting rank, select, quantile, and top-k queries.
///
/// [`WaveletMatrix`] stores a sequence of $`n`$ integers drawn from
/// $`[0, \sigma)`$ in $`O(n \lg \sigma)`$ bits and answers most queries in
/// $`O(\lg \sigma)`$ time (assuming bit vectors with constant-time rank and
/// select). The alphabet size is derived from the input as `max + 1`, so
/// unused values below the maximum still contribute to the bit width.
///
/// Values are spread over $`\lceil \lg \sigma \rceil`$ bit planes, most
/// significant bit first. Each plane stores the bits of the values permuted
/// stably by their prefix, with all zero children grouped before all one
/// children; per-level node offset tables delimit the groups, and the last
/// table doubles as the character start index.
///
/// Once built, the matrix is immutable and can be queried from any number of
/// threads without synchronization.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use wavix::bit_vector::Rank9SelIndex;
/// use wavix::wavelet_matrix::WaveletMatrix;
///
/// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4, 2, 2, 0, 3])?;
///
/// assert_eq!(wm.len(), 8);
/// assert_eq!(wm.alph_size(), 6);
/// assert_eq!(wm.alph_width(), 3);
///
/// assert_eq!(wm.access(3), Some(4));
/// assert_eq!(wm.rank(6, 2), Some(2));
/// assert_eq!(wm.select(1, 2), Some(5));
/// assert_eq!(wm.quantile(1..6, 3), Some((5, 2)));
/// # Ok(())
/// # }
/// ```
///
/// # References
///
/// - F. Claude, and G. Navarro, "The Wavelet Matrix," In SPIRE 2012.
#[derive(Debug, Clone)]
pub struct WaveletMatrix<I> {
    layers: Vec<BitVector<I>>,
    node_pos: Vec<Vec<usize>>,
    alph_size: usize,
    len: usize,
    // Reserved auxiliary section of the binary image; empty for matrices
    // produced by construction, but preserved across a decode/encode cycle.
    seps: Vec<usize>,
}

impl<I: PartialEq> PartialEq for WaveletMatrix<I> {
    fn eq(&self, other: &Self) -> bool {
        self.layers == other.layers
            && self.node_pos == other.node_pos
            && self.alph_size == other.alph_size
            && self.len == other.len
            && self.seps == other.seps
    }
}

impl<I: Eq> Eq for WaveletMatrix<I> {}

impl<I> WaveletMatrix<I>
where
    I: BitVectorIndex,
{
    /// Builds a [`WaveletMatrix`] from an iterator of integers.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyInput`] if the iterator yields nothing.
    pub fn from_ints<It>(ints: It) -> Result<Self>
    where
        It: IntoIterator<Item = usize>,
    {
        let mut builder = WaveletMatrixBuilder::new();
        builder.extend(ints);
        builder.build()
    }

    /// Builds a [`WaveletMatrix`] from a slice of integers of any primitive
    /// type, or fails when a value cannot be cast to `usize`.
    pub fn from_slice<T>(vals: &[T]) -> anyhow::Result<Self>
    where
        T: num_traits::ToPrimitive,
    {
        let mut builder = WaveletMatrixBuilder::new();
        for val in vals {
            builder.push(
                val.to_usize()
                    .ok_or_else(|| anyhow::anyhow!("vals must be castable to usize"))?,
            );
        }
        Ok(builder.build()?)
    }

    /// Returns the number of integers stored.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the sequence is empty. Construction rejects empty input, so
    /// this holds only for images assembled by hand.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the maximum value + 1 in the sequence, i.e., $`\sigma`$.
    #[inline(always)]
    pub const fn alph_size(&self) -> usize {
        self.alph_size
    }

    /// Returns $`\lceil \lg \sigma \rceil`$, the number of bit planes.
    #[inline(always)]
    pub fn alph_width(&self) -> usize {
        self.layers.len()
    }

    /// Returns the `pos`-th integer, or [`None`] if `self.len() <= pos`.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavix::bit_vector::Rank9SelIndex;
    /// use wavix::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4, 2, 2, 0, 3])?;
    ///
    /// assert_eq!(wm.access(0), Some(5));
    /// assert_eq!(wm.access(3), Some(4));
    /// assert_eq!(wm.access(8), None);
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    pub fn access(&self, mut pos: usize) -> Option<usize> {
        if self.len <= pos {
            return None;
        }
        let mut val = 0;
        for layer in &self.layers {
            val <<= 1;
            if layer.access(pos)? {
                val |= 1;
                pos = layer.rank1(pos)? + layer.num_zeros();
            } else {
                pos = layer.rank0(pos)?;
            }
        }
        Some(val)
    }

    /// Returns the number of occurrences of `val` in the prefix `0..pos`,
    /// or [`None`] if `self.alph_size() <= val` or `self.len() < pos`.
    ///
    /// `rank(0, val)` is a valid empty query and answers `Some(0)`.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavix::bit_vector::Rank9SelIndex;
    /// use wavix::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4, 2, 2, 0, 3])?;
    ///
    /// assert_eq!(wm.rank(6, 2), Some(2));
    /// assert_eq!(wm.rank(6, 3), Some(0));
    /// assert_eq!(wm.rank(0, 3), Some(0));
    /// assert_eq!(wm.rank(9, 3), None);
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    pub fn rank(&self, pos: usize, val: usize) -> Option<usize> {
        if self.alph_size <= val || self.len < pos {
            return None;
        }
        if pos == 0 {
            return Some(0);
        }
        let width = self.alph_width();
        if width == 0 {
            // single-symbol alphabet: every position holds `val`
            return Some(pos);
        }
        let idx = self.descend(pos, val)?;
        idx.checked_sub(self.node_pos[width - 1][val])
    }

    /// Counts, within `range`, the occurrences of characters equal to, less
    /// than, and greater than `val`. Returns [`None`] if
    /// `self.alph_size() <= val` or `range` is out of bounds; an empty (or
    /// reversed) in-bounds range answers all-zero counts.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavix::bit_vector::Rank9SelIndex;
    /// use wavix::wavelet_matrix::{RankCounts, WaveletMatrix};
    ///
    /// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4, 2, 2, 0, 3])?;
    ///
    /// // A[2..6) = [0, 4, 2, 2]
    /// assert_eq!(
    ///     wm.rank_all(2..6, 2),
    ///     Some(RankCounts { eq: 2, less: 1, greater: 1 })
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn rank_all(&self, range: Range<usize>, val: usize) -> Option<RankCounts> {
        if self.alph_size <= val || self.len <= range.start || self.len < range.end {
            return None;
        }
        if range.end <= range.start {
            return Some(RankCounts::default());
        }

        let width = self.alph_width();
        let (mut beg, mut end) = (range.start, range.end);
        let mut counts = RankCounts::default();

        for (depth, layer) in self.layers.iter().enumerate() {
            let beg_zeros = layer.rank0(beg)?;
            let end_zeros = layer.rank0(end)?;
            if Self::get_msb(val, depth, width) {
                counts.less += end_zeros - beg_zeros;
                let zeros = layer.num_zeros();
                beg = zeros + (beg - beg_zeros);
                end = zeros + (end - end_zeros);
            } else {
                counts.greater += (end - end_zeros) - (beg - beg_zeros);
                beg = beg_zeros;
                end = end_zeros;
            }
        }
        counts.eq = end - beg;
        Some(counts)
    }

    /// Returns the number of characters smaller than `val` in the prefix
    /// `0..pos`, or [`None`] for out-of-domain arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavix::bit_vector::Rank9SelIndex;
    /// use wavix::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4, 2, 2, 0, 3])?;
    ///
    /// assert_eq!(wm.rank_less_than(5, 4), Some(3));
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    pub fn rank_less_than(&self, pos: usize, val: usize) -> Option<usize> {
        Some(self.rank_all(0..pos, val)?.less)
    }

    /// Returns the number of characters greater than `val` in the prefix
    /// `0..pos`, or [`None`] for out-of-domain arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavix::bit_vector::Rank9SelIndex;
    /// use wavix::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4, 2, 2, 0, 3])?;
    ///
    /// assert_eq!(wm.rank_more_than(5, 3), Some(2));
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    pub fn rank_more_than(&self, pos: usize, val: usize) -> Option<usize> {
        Some(self.rank_all(0..pos, val)?.greater)
    }

    /// Returns the position of the `k`-th (0-indexed) occurrence of `val`,
    /// or [`None`] if the sequence holds fewer than `k + 1` of them.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$ (select on the planes adds its own logarithmic
    /// factor)
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavix::bit_vector::Rank9SelIndex;
    /// use wavix::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4, 2, 2, 0, 3])?;
    ///
    /// assert_eq!(wm.select(0, 2), Some(4));
    /// assert_eq!(wm.select(1, 2), Some(5));
    /// assert_eq!(wm.select(2, 2), None);
    /// # Ok(())
    /// # }
    /// ```
    #[inline(always)]
    pub fn select(&self, k: usize, val: usize) -> Option<usize> {
        self.select_from(k, val, 0)
    }

    /// Returns the position of the `k`-th (0-indexed) occurrence of `val` at
    /// or after position `pos`, or [`None`] if there is no such occurrence.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavix::bit_vector::Rank9SelIndex;
    /// use wavix::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4, 2, 2, 0, 3])?;
    ///
    /// assert_eq!(wm.select_from(0, 0, 3), Some(6));
    /// assert_eq!(wm.select_from(0, 2, 5), Some(5));
    /// assert_eq!(wm.select_from(1, 2, 5), None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn select_from(&self, k: usize, val: usize, pos: usize) -> Option<usize> {
        if self.alph_size <= val || self.len <= pos {
            return None;
        }
        let occ = k.checked_add(1)?;
        if self.freq(val) < occ {
            return None;
        }
        let width = self.alph_width();
        if width == 0 {
            let target = pos + k;
            return (target < self.len).then_some(target);
        }

        let mut idx = if pos == 0 {
            self.node_pos[width - 1][val]
        } else {
            self.descend(pos, val)?
        };
        idx += occ;

        for (depth, layer) in self.layers.iter().enumerate().rev() {
            let bit = Self::get_msb(val, depth, width);
            if bit {
                idx = idx.checked_sub(self.node_pos[depth][1])?;
            }
            let target = idx.checked_sub(1)?;
            idx = if bit {
                layer.select1(target)?
            } else {
                layer.select0(target)?
            };
            idx += 1;
        }
        Some(idx - 1)
    }

    /// Returns the number of occurrences of `val` in the whole sequence;
    /// 0 for characters outside the alphabet.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavix::bit_vector::Rank9SelIndex;
    /// use wavix::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4, 2, 2, 0, 3])?;
    ///
    /// assert_eq!(wm.freq(2), 2);
    /// assert_eq!(wm.freq(6), 0);
    /// # Ok(())
    /// # }
    /// ```
    #[inline(always)]
    pub fn freq(&self, val: usize) -> usize {
        self.rank(self.len, val).unwrap_or(0)
    }

    /// Returns the total number of occurrences of the characters in `vals`
    /// over the whole sequence, one frequency query per character.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavix::bit_vector::Rank9SelIndex;
    /// use wavix::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4, 2, 2, 0, 3])?;
    ///
    /// assert_eq!(wm.freq_sum(0..3), 5);
    /// # Ok(())
    /// # }
    /// ```
    pub fn freq_sum(&self, vals: Range<usize>) -> usize {
        vals.map(|val| self.freq(val)).sum()
    }

    /// Returns the number of occurrences, within `positions`, of characters
    /// in `vals`. Out-of-domain ranges answer 0.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavix::bit_vector::Rank9SelIndex;
    /// use wavix::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4, 2, 2, 0, 3])?;
    ///
    /// // characters in 2..5 within A[2..6) = [0, 4, 2, 2]
    /// assert_eq!(wm.freq_range(2..5, 2..6), 3);
    /// # Ok(())
    /// # }
    /// ```
    pub fn freq_range(&self, vals: Range<usize>, positions: Range<usize>) -> usize {
        if self.alph_size <= vals.start || vals.end <= vals.start {
            return 0;
        }
        if self.len < positions.end || positions.end <= positions.start {
            return 0;
        }
        let less_than = |val: usize| {
            if self.alph_size <= val {
                positions.len()
            } else {
                self.rank_all(positions.clone(), val)
                    .map(|counts| counts.less)
                    .unwrap_or(0)
            }
        };
        less_than(vals.end) - less_than(vals.start)
    }

    /// Returns the position and value of the `k`-th (0-indexed) smallest
    /// value within `range`, or [`None`] if `range` is empty, `k` is out of
    /// `range`, or `range.end` reaches the sequence length.
    ///
    /// The exclusive end must satisfy `range.end < self.len()`; quantiles of
    /// the whole sequence are not answerable, a restriction kept from the
    /// format's reference behavior.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavix::bit_vector::Rank9SelIndex;
    /// use wavix::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4, 2, 2, 0, 3])?;
    ///
    /// // A[1..6) = [1, 0, 4, 2, 2]; its 4th smallest (k = 3) is the 2 at
    /// // position 5
    /// assert_eq!(wm.quantile(1..6, 3), Some((5, 2)));
    /// assert_eq!(wm.quantile(1..6, 5), None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn quantile(&self, range: Range<usize>, mut k: usize) -> Option<(usize, usize)> {
        if self.len <= range.end || range.end <= range.start {
            return None;
        }
        if range.end - range.start <= k {
            return None;
        }
        let width = self.alph_width();
        if width == 0 {
            return Some((range.start + k, 0));
        }

        let (mut beg, mut end) = (range.start, range.end);
        let mut val = 0;
        for layer in &self.layers {
            let beg_zeros = layer.rank0(beg)?;
            let end_zeros = layer.rank0(end)?;
            let zeros = end_zeros - beg_zeros;
            val <<= 1;
            if k < zeros {
                beg = beg_zeros;
                end = end_zeros;
            } else {
                k -= zeros;
                val |= 1;
                let layer_zeros = layer.num_zeros();
                beg = layer_zeros + (beg - beg_zeros);
                end = layer_zeros + (end - end_zeros);
            }
        }
        let rank = (beg + k).checked_sub(self.node_pos[width - 1][val])?;
        let pos = self.select(rank, val)?;
        Some((pos, val))
    }

    /// Returns the position and value of the smallest value within `range`;
    /// same domain as [`quantile`](Self::quantile).
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavix::bit_vector::Rank9SelIndex;
    /// use wavix::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4, 2, 2, 0, 3])?;
    ///
    /// assert_eq!(wm.min_range(1..6), Some((2, 0)));
    /// # Ok(())
    /// # }
    /// ```
    #[inline(always)]
    pub fn min_range(&self, range: Range<usize>) -> Option<(usize, usize)> {
        self.quantile(range, 0)
    }

    /// Returns the position and value of the largest value within `range`;
    /// same domain as [`quantile`](Self::quantile).
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavix::bit_vector::Rank9SelIndex;
    /// use wavix::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4, 2, 2, 0, 3])?;
    ///
    /// assert_eq!(wm.max_range(1..6), Some((3, 4)));
    /// # Ok(())
    /// # }
    /// ```
    #[inline(always)]
    pub fn max_range(&self, range: Range<usize>) -> Option<(usize, usize)> {
        let k = range.len().checked_sub(1)?;
        self.quantile(range, k)
    }

    /// Lists up to `num` distinct characters of `vals` occurring within
    /// `positions`, most frequent first. Invalid ranges produce an empty
    /// list.
    ///
    /// The order among equally frequent characters is deterministic but
    /// follows the search: deeper nodes surface before wider prefixes, so it
    /// is not necessarily ascending by character.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavix::bit_vector::Rank9SelIndex;
    /// use wavix::wavelet_matrix::{ListEntry, WaveletMatrix};
    ///
    /// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4, 2, 2, 0, 3])?;
    ///
    /// assert_eq!(
    ///     wm.list_mode_range(1..3, 0..8, 3),
    ///     vec![
    ///         ListEntry { val: 2, freq: 2 },
    ///         ListEntry { val: 1, freq: 1 },
    ///     ]
    /// );
    /// # Ok(())
    /// # }
    /// ```
    #[inline(always)]
    pub fn list_mode_range(
        &self,
        vals: Range<usize>,
        positions: Range<usize>,
        num: usize,
    ) -> Vec<ListEntry> {
        list::list_range::<I, list::ByFreq>(self, vals, positions, num)
    }

    /// Lists up to `num` distinct characters of `vals` occurring within
    /// `positions`, smallest character first. Invalid ranges produce an
    /// empty list.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavix::bit_vector::Rank9SelIndex;
    /// use wavix::wavelet_matrix::{ListEntry, WaveletMatrix};
    ///
    /// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4, 2, 2, 0, 3])?;
    ///
    /// assert_eq!(
    ///     wm.list_min_range(0..5, 0..8, 3),
    ///     vec![
    ///         ListEntry { val: 0, freq: 2 },
    ///         ListEntry { val: 1, freq: 1 },
    ///         ListEntry { val: 2, freq: 2 },
    ///     ]
    /// );
    /// # Ok(())
    /// # }
    /// ```
    #[inline(always)]
    pub fn list_min_range(
        &self,
        vals: Range<usize>,
        positions: Range<usize>,
        num: usize,
    ) -> Vec<ListEntry> {
        list::list_range::<I, list::ByMinValue>(self, vals, positions, num)
    }

    /// Lists up to `num` distinct characters of `vals` occurring within
    /// `positions`, largest character first. Invalid ranges produce an
    /// empty list.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavix::bit_vector::Rank9SelIndex;
    /// use wavix::wavelet_matrix::{ListEntry, WaveletMatrix};
    ///
    /// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4, 2, 2, 0, 3])?;
    ///
    /// assert_eq!(
    ///     wm.list_max_range(1..5, 0..8, 3),
    ///     vec![
    ///         ListEntry { val: 4, freq: 1 },
    ///         ListEntry { val: 3, freq: 1 },
    ///         ListEntry { val: 2, freq: 2 },
    ///     ]
    /// );
    /// # Ok(())
    /// # }
    /// ```
    #[inline(always)]
    pub fn list_max_range(
        &self,
        vals: Range<usize>,
        positions: Range<usize>,
        num: usize,
    ) -> Vec<ListEntry> {
        list::list_range::<I, list::ByMaxValue>(self, vals, positions, num)
    }

    /// Creates an iterator enumerating the stored integers in order.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavix::bit_vector::Rank9SelIndex;
    /// use wavix::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4])?;
    /// let decoded: Vec<usize> = wm.iter().collect();
    /// assert_eq!(decoded, vec![5, 1, 0, 4]);
    /// # Ok(())
    /// # }
    /// ```
    pub const fn iter(&'_ self) -> Iter<'_, I> {
        Iter::new(self)
    }

    /// Walks `idx` from the root level down to the leaf level of `val`,
    /// returning the cursor's position within the leaf-level order.
    fn descend(&self, mut idx: usize, val: usize) -> Option<usize> {
        let width = self.alph_width();
        for (depth, layer) in self.layers.iter().enumerate() {
            idx = if Self::get_msb(val, depth, width) {
                layer.rank1(idx)? + layer.num_zeros()
            } else {
                layer.rank0(idx)?
            };
        }
        Some(idx)
    }

    #[inline(always)]
    const fn get_msb(val: usize, depth: usize, width: usize) -> bool {
        ((val >> (width - depth - 1)) & 1) == 1
    }
}

impl<I> WaveletMatrix<I>
where
    I: BitVectorIndex,
{
    /// Serializes the matrix into a deterministic little-endian byte image.
    ///
    /// The layout is a stream of unsigned 64-bit fields: the sequence
    /// length, the alphabet size, the alphabet width, the plane count, then
    /// each plane as a byte length followed by its bit length and words,
    /// then the node offset tables (count, then per table its length and
    /// entries), and finally the reserved auxiliary section.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavix::bit_vector::Rank9SelIndex;
    /// use wavix::wavelet_matrix::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<Rank9SelIndex>::from_ints([5, 1, 0, 4, 2, 2, 0, 3])?;
    /// let bytes = wm.to_bytes();
    /// let decoded = WaveletMatrix::<Rank9SelIndex>::from_bytes(&bytes)?;
    /// assert_eq!(wm, decoded);
    /// # Ok(())
    /// # }
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        put_u64(&mut buf, self.len);
        put_u64(&mut buf, self.alph_size);
        put_u64(&mut buf, self.alph_width());
        put_u64(&mut buf, self.layers.len());
        for layer in &self.layers {
            let words = layer.words();
            put_u64(&mut buf, U64_BYTES * (1 + words.len()));
            put_u64(&mut buf, layer.len());
            for &word in words {
                put_u64(&mut buf, word);
            }
        }
        put_u64(&mut buf, self.node_pos.len());
        for table in &self.node_pos {
            put_u64(&mut buf, table.len());
            for &entry in table {
                put_u64(&mut buf, entry);
            }
        }
        put_u64(&mut buf, self.seps.len());
        for &sep in &self.seps {
            put_u64(&mut buf, sep);
        }
        buf
    }

    /// Reconstructs a matrix from a byte image produced by
    /// [`to_bytes`](Self::to_bytes), rebuilding the rank/select indexes.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidFormat`] if the image is truncated or its recorded
    /// lengths disagree with each other.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);
        let len = reader.read_u64()?;
        let alph_size = reader.read_u64()?;
        let width = reader.read_u64()?;
        if len == 0 || alph_size == 0 {
            return Err(Error::invalid_format("empty sequence or alphabet"));
        }
        if width != utils::ceil_log2(alph_size) {
            return Err(Error::invalid_format(
                "alphabet width disagrees with alphabet size",
            ));
        }

        let num_layers = reader.read_u64()?;
        if num_layers != width {
            return Err(Error::invalid_format(
                "layer count disagrees with alphabet width",
            ));
        }
        let words_per_layer = len.div_ceil(WORD_LEN);
        let layer_bytes_expected = U64_BYTES * (1 + words_per_layer);
        let mut layers = Vec::with_capacity(num_layers);
        for _ in 0..num_layers {
            let layer_bytes = reader.read_u64()?;
            if layer_bytes != layer_bytes_expected {
                return Err(Error::invalid_format("unexpected plane byte length"));
            }
            let num_bits = reader.read_u64()?;
            if num_bits != len {
                return Err(Error::invalid_format(
                    "plane length disagrees with sequence length",
                ));
            }
            let words = reader.read_u64_slice(words_per_layer)?;
            let data = BitVectorData {
                words,
                len: num_bits,
            };
            let index = I::build(&data);
            layers.push(BitVector::new(data, index));
        }

        let num_tables = reader.read_u64()?;
        if num_tables != width {
            return Err(Error::invalid_format(
                "node table count disagrees with alphabet width",
            ));
        }
        let mut node_pos = Vec::with_capacity(num_tables);
        for depth in 0..num_tables {
            let table_len = reader.read_u64()?;
            let expected = 1usize
                .checked_shl(depth as u32 + 1)
                .ok_or_else(|| Error::invalid_format("node table level out of range"))?;
            if table_len != expected {
                return Err(Error::invalid_format(
                    "node table length disagrees with its level",
                ));
            }
            node_pos.push(reader.read_u64_slice(table_len)?);
        }

        let num_seps = reader.read_u64()?;
        let seps = reader.read_u64_slice(num_seps)?;

        Ok(Self {
            layers,
            node_pos,
            alph_size,
            len,
            seps,
        })
    }
}

#[inline(always)]
fn put_u64(buf: &mut Vec<u8>, x: usize) {
    buf.extend_from_slice(&(x as u64).to_le_bytes());
}

/// Cursor over a byte image; every read checks the remaining input first.
struct ByteReader<'a> {
    buf: &'a [u8],
}

impl<'a> ByteReader<'a> {
    const fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn read_u64(&mut self) -> Result<usize> {
        if self.buf.len() < U64_BYTES {
            return Err(Error::invalid_format("unexpected end of input"));
        }
        let mut raw = [0u8; U64_BYTES];
        raw.copy_from_slice(&self.buf[..U64_BYTES]);
        self.buf = &self.buf[U64_BYTES..];
        Ok(u64::from_le_bytes(raw) as usize)
    }

    fn read_u64_slice(&mut self, count: usize) -> Result<Vec<usize>> {
        if self.buf.len() / U64_BYTES < count {
            return Err(Error::invalid_format("unexpected end of input"));
        }
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.read_u64()?);
        }
        Ok(out)
    }
}

/// Iterator enumerating integers, created by [`WaveletMatrix::iter()`].
pub struct Iter<'a, I> {
    wm: &'a WaveletMatrix<I>,
    pos: usize,
}

impl<'a, I> Iter<'a, I> {
    /// Creates a new iterator.
    pub const fn new(wm: &'a WaveletMatrix<I>) -> Self {
        Self { wm, pos: 0 }
    }
}

impl<I> Iterator for Iter<'_, I>
where
    I: BitVectorIndex,
{
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.pos < self.wm.len() {
            let x = self.wm.access(self.pos)?;
            self.pos += 1;
            Some(x)
        } else {
            None
        }
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remain = self.wm.len() - self.pos;
        (remain, Some(remain))
    }
}
