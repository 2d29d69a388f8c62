//! Rank/select index with Vigna's rank9 and hinted selection techniques.

use crate::bit_vector::{BitVectorData, BitVectorIndex, WORD_LEN};
use crate::broadword;

const BLOCK_LEN: usize = 8;
const SELECT_ONES_PER_HINT: usize = 64 * BLOCK_LEN * 2;
const SELECT_ZEROS_PER_HINT: usize = SELECT_ONES_PER_HINT;

/// Rank/select index over [`BitVectorData`] with Vigna's rank9 and hinted
/// selection techniques.
///
/// The index takes
///
/// - 25% overhead of space for the rank part, and
/// - 3% overhead of space for the two select hint arrays.
///
/// Rank queries run in constant time; select queries run in logarithmic
/// time, with the binary search narrowed to a hinted block range. Both
/// select hint arrays are always built since the wavelet matrix descends
/// through `select0` and `select1` alike.
///
/// # Examples
///
/// ```
/// use wavix::bit_vector::{BitVectorBuilder, Rank9SelIndex};
/// use wavix::bit_vector::prelude::*;
///
/// let mut builder = BitVectorBuilder::with_capacity(4);
/// builder.set_bit(0, true);
/// builder.set_bit(3, true);
/// let bv = builder.freeze::<Rank9SelIndex>();
///
/// assert_eq!(bv.rank1(4), Some(2));
/// assert_eq!(bv.select1(1), Some(3));
/// assert_eq!(bv.select0(1), Some(2));
/// ```
///
/// # References
///
/// - S. Vigna, "Broadword implementation of rank/select queries," In WEA, 2008.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rank9SelIndex {
    len: usize,
    block_rank_pairs: Vec<usize>,
    select1_hints: Vec<usize>,
    select0_hints: Vec<usize>,
}

impl Rank9SelIndex {
    /// Builds the index over `data`.
    pub fn new(data: &BitVectorData) -> Self {
        let mut block_rank_pairs = vec![0];
        let mut next_rank = 0;
        let mut cur_subrank = 0;
        let mut subranks = 0;
        for (i, &word) in data.words().iter().enumerate() {
            let shift = i % BLOCK_LEN;
            if shift != 0 {
                subranks <<= 9;
                subranks |= cur_subrank;
            }
            let pop = broadword::popcount(word);
            next_rank += pop;
            cur_subrank += pop;
            if shift == BLOCK_LEN - 1 {
                block_rank_pairs.push(subranks);
                block_rank_pairs.push(next_rank);
                subranks = 0;
                cur_subrank = 0;
            }
        }
        let num_words = data.words().len();
        let left = BLOCK_LEN - num_words % BLOCK_LEN;
        for _ in 0..left {
            subranks <<= 9;
            subranks |= cur_subrank;
        }
        block_rank_pairs.push(subranks);
        if num_words % BLOCK_LEN != 0 {
            block_rank_pairs.push(next_rank);
            block_rank_pairs.push(0);
        }
        block_rank_pairs.shrink_to_fit();

        let mut this = Self {
            len: data.len(),
            block_rank_pairs,
            select1_hints: vec![],
            select0_hints: vec![],
        };
        this.build_select1_hints();
        this.build_select0_hints();
        this
    }

    fn build_select1_hints(&mut self) {
        let mut hints = vec![];
        let mut threshold = SELECT_ONES_PER_HINT;
        for i in 0..self.num_blocks() {
            if self.block_rank(i + 1) > threshold {
                hints.push(i);
                threshold += SELECT_ONES_PER_HINT;
            }
        }
        hints.push(self.num_blocks());
        hints.shrink_to_fit();
        self.select1_hints = hints;
    }

    fn build_select0_hints(&mut self) {
        let mut hints = vec![];
        let mut threshold = SELECT_ZEROS_PER_HINT;
        for i in 0..self.num_blocks() {
            if self.block_rank0(i + 1) > threshold {
                hints.push(i);
                threshold += SELECT_ZEROS_PER_HINT;
            }
        }
        hints.push(self.num_blocks());
        hints.shrink_to_fit();
        self.select0_hints = hints;
    }

    #[inline(always)]
    fn num_blocks(&self) -> usize {
        self.block_rank_pairs.len() / 2 - 1
    }

    #[inline(always)]
    fn block_rank(&self, block: usize) -> usize {
        self.block_rank_pairs[block * 2]
    }

    #[inline(always)]
    fn sub_block_ranks(&self, block: usize) -> usize {
        self.block_rank_pairs[block * 2 + 1]
    }

    #[inline(always)]
    fn sub_block_rank(&self, sub_bpos: usize) -> usize {
        let (block, left) = (sub_bpos / BLOCK_LEN, sub_bpos % BLOCK_LEN);
        self.block_rank(block) + ((self.sub_block_ranks(block) >> ((7 - left) * 9)) & 0x1FF)
    }

    #[inline(always)]
    fn block_rank0(&self, block: usize) -> usize {
        block * BLOCK_LEN * WORD_LEN - self.block_rank(block)
    }
}

impl BitVectorIndex for Rank9SelIndex {
    fn build(data: &BitVectorData) -> Self {
        Self::new(data)
    }

    #[inline(always)]
    fn num_ones(&self, _data: &BitVectorData) -> usize {
        self.block_rank_pairs[self.block_rank_pairs.len() - 2]
    }

    fn rank1(&self, data: &BitVectorData, pos: usize) -> Option<usize> {
        if data.len() < pos {
            return None;
        }
        if pos == data.len() {
            return Some(self.num_ones(data));
        }
        let (sub_bpos, sub_left) = (pos / WORD_LEN, pos % WORD_LEN);
        let mut r = self.sub_block_rank(sub_bpos);
        if sub_left != 0 {
            r += broadword::popcount(data.words()[sub_bpos] << (WORD_LEN - sub_left));
        }
        Some(r)
    }

    fn select1(&self, data: &BitVectorData, k: usize) -> Option<usize> {
        if self.num_ones(data) <= k {
            return None;
        }

        let block = {
            let chunk = k / SELECT_ONES_PER_HINT;
            let mut a = if chunk != 0 {
                self.select1_hints[chunk - 1]
            } else {
                0
            };
            let mut b = self.select1_hints[chunk] + 1;
            while b - a > 1 {
                let mid = a + (b - a) / 2;
                if self.block_rank(mid) <= k {
                    a = mid;
                } else {
                    b = mid;
                }
            }
            a
        };

        debug_assert!(block < self.num_blocks());
        let block_offset = block * BLOCK_LEN;
        let mut cur_rank = self.block_rank(block);
        debug_assert!(cur_rank <= k);

        let rank_in_block_parallel = (k - cur_rank) * broadword::ONES_STEP_9;
        let sub_ranks = self.sub_block_ranks(block);
        let sub_block_offset = (broadword::uleq_step_9(sub_ranks, rank_in_block_parallel)
            .wrapping_mul(broadword::ONES_STEP_9)
            >> 54)
            & 0x7;
        cur_rank += (sub_ranks >> ((7 - sub_block_offset) * 9)) & 0x1FF;
        debug_assert!(cur_rank <= k);

        let word_offset = block_offset + sub_block_offset;
        let sel = word_offset * WORD_LEN
            + broadword::select_in_word(data.words()[word_offset], k - cur_rank)?;
        Some(sel)
    }

    fn select0(&self, data: &BitVectorData, k: usize) -> Option<usize> {
        if self.num_zeros(data) <= k {
            return None;
        }

        let block = {
            let chunk = k / SELECT_ZEROS_PER_HINT;
            let mut a = if chunk != 0 {
                self.select0_hints[chunk - 1]
            } else {
                0
            };
            let mut b = self.select0_hints[chunk] + 1;
            while b - a > 1 {
                let mid = a + (b - a) / 2;
                if self.block_rank0(mid) <= k {
                    a = mid;
                } else {
                    b = mid;
                }
            }
            a
        };

        debug_assert!(block < self.num_blocks());
        let block_offset = block * BLOCK_LEN;
        let mut cur_rank = self.block_rank0(block);
        debug_assert!(cur_rank <= k);

        let rank_in_block_parallel = (k - cur_rank) * broadword::ONES_STEP_9;
        let sub_ranks = WORD_LEN * broadword::INV_COUNT_STEP_9 - self.sub_block_ranks(block);
        let sub_block_offset = (broadword::uleq_step_9(sub_ranks, rank_in_block_parallel)
            .wrapping_mul(broadword::ONES_STEP_9)
            >> 54)
            & 0x7;
        cur_rank += (sub_ranks >> ((7 - sub_block_offset) * 9)) & 0x1FF;
        debug_assert!(cur_rank <= k);

        let word_offset = block_offset + sub_block_offset;
        let sel = word_offset * WORD_LEN
            + broadword::select_in_word(!data.words()[word_offset], k - cur_rank)?;
        Some(sel)
    }
}
