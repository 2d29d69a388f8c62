use proptest::prelude::*;
use std::collections::HashMap;

use wavix::bit_vector::prelude::*;
use wavix::bit_vector::{BitVector, BitVectorData, Rank9SelIndex};
use wavix::{ListEntry, WaveletMatrix};

fn build(input: &[usize]) -> WaveletMatrix<Rank9SelIndex> {
    WaveletMatrix::from_ints(input.iter().copied()).unwrap()
}

fn counts(input: &[usize]) -> HashMap<usize, usize> {
    let mut map = HashMap::new();
    for &val in input {
        *map.entry(val).or_insert(0) += 1;
    }
    map
}

proptest! {
    #[test]
    fn bitvector_rank_select_match_naive(
        bits in prop::collection::vec(any::<bool>(), 1..600),
    ) {
        let data = BitVectorData::from_bits(bits.iter().copied());
        let index = Rank9SelIndex::new(&data);
        let bv = BitVector::new(data, index);

        let mut ones = 0;
        let mut zeros = 0;
        for (i, &bit) in bits.iter().enumerate() {
            prop_assert_eq!(bv.rank1(i), Some(ones));
            prop_assert_eq!(bv.rank0(i), Some(i - ones));
            if bit {
                prop_assert_eq!(bv.select1(ones), Some(i));
                ones += 1;
            } else {
                prop_assert_eq!(bv.select0(zeros), Some(i));
                zeros += 1;
            }
        }
        prop_assert_eq!(bv.rank1(bits.len()), Some(ones));
        prop_assert_eq!(bv.select1(ones), None);
        prop_assert_eq!(bv.select0(zeros), None);
    }

    #[test]
    fn access_is_the_identity(
        input in prop::collection::vec(0..100usize, 1..300),
    ) {
        let wm = build(&input);
        prop_assert_eq!(wm.len(), input.len());
        for (pos, &val) in input.iter().enumerate() {
            prop_assert_eq!(wm.access(pos), Some(val));
        }
        prop_assert_eq!(wm.access(input.len()), None);
        let decoded: Vec<usize> = wm.iter().collect();
        prop_assert_eq!(decoded, input);
    }

    #[test]
    fn rank_and_select_invert_each_other(
        input in prop::collection::vec(0..50usize, 1..200),
    ) {
        let wm = build(&input);
        for val in 0..wm.alph_size() {
            let freq = wm.freq(val);
            prop_assert_eq!(freq, input.iter().filter(|&&x| x == val).count());
            for k in 0..freq {
                let pos = wm.select(k, val).unwrap();
                prop_assert_eq!(wm.access(pos), Some(val));
                prop_assert_eq!(wm.rank(pos + 1, val), Some(k + 1));
            }
            prop_assert_eq!(wm.select(freq, val), None);
        }
    }

    #[test]
    fn rank_decomposes_into_less_equal_greater(
        input in prop::collection::vec(0..40usize, 1..200),
        val in 0..40usize,
        pos_seed: usize,
    ) {
        let wm = build(&input);
        if val >= wm.alph_size() {
            prop_assert_eq!(wm.rank(0, val), None);
            return Ok(());
        }
        let pos = pos_seed % (input.len() + 1);
        let eq = wm.rank(pos, val).unwrap();
        let less = wm.rank_less_than(pos, val).unwrap();
        let greater = wm.rank_more_than(pos, val).unwrap();
        prop_assert_eq!(eq + less + greater, pos);
        prop_assert_eq!(less, input[..pos].iter().filter(|&&x| x < val).count());
        prop_assert_eq!(greater, input[..pos].iter().filter(|&&x| x > val).count());
    }

    #[test]
    fn select_from_respects_the_start_position(
        input in prop::collection::vec(0..20usize, 1..120),
        pos_seed: usize,
    ) {
        let wm = build(&input);
        let pos = pos_seed % input.len();
        for val in 0..wm.alph_size() {
            let expected: Vec<usize> = (pos..input.len())
                .filter(|&i| input[i] == val)
                .collect();
            for (k, &at) in expected.iter().enumerate() {
                prop_assert_eq!(wm.select_from(k, val, pos), Some(at));
            }
            prop_assert_eq!(wm.select_from(expected.len(), val, pos), None);
        }
    }

    #[test]
    fn range_frequencies_sum_to_the_range_length(
        input in prop::collection::vec(0..60usize, 1..200),
        bounds: (usize, usize),
    ) {
        let wm = build(&input);
        let sigma = wm.alph_size();
        let beg = bounds.0 % input.len();
        let end = beg + 1 + bounds.1 % (input.len() - beg);
        prop_assert_eq!(wm.freq_range(0..sigma, beg..end), end - beg);

        let mid = sigma / 2;
        let low = wm.freq_range(0..mid, beg..end);
        let high = wm.freq_range(mid..sigma, beg..end);
        prop_assert_eq!(low + high, end - beg);
        prop_assert_eq!(
            low,
            input[beg..end].iter().filter(|&&x| x < mid).count()
        );
    }

    #[test]
    fn quantiles_agree_with_sorting(
        input in prop::collection::vec(0..64usize, 2..150),
        bounds: (usize, usize),
    ) {
        let wm = build(&input);
        // the exclusive end must stay below the sequence length
        let beg = bounds.0 % (input.len() - 1);
        let end = beg + 1 + bounds.1 % (input.len() - 1 - beg);
        let mut sorted: Vec<usize> = input[beg..end].to_vec();
        sorted.sort_unstable();
        for (k, &expected) in sorted.iter().enumerate() {
            let (pos, val) = wm.quantile(beg..end, k).unwrap();
            prop_assert_eq!(val, expected);
            prop_assert!(beg <= pos && pos < end);
            prop_assert_eq!(input[pos], val);
        }
        prop_assert_eq!(wm.quantile(beg..end, end - beg), None);
        prop_assert_eq!(wm.min_range(beg..end).map(|x| x.1), sorted.first().copied());
        prop_assert_eq!(wm.max_range(beg..end).map(|x| x.1), sorted.last().copied());
    }

    #[test]
    fn listings_are_complete_and_ordered(
        input in prop::collection::vec(0..32usize, 1..200),
    ) {
        let wm = build(&input);
        let sigma = wm.alph_size();
        let expected = counts(&input);

        // every distinct character surfaces with its true frequency, in
        // non-increasing frequency order
        let mode = wm.list_mode_range(0..sigma, 0..input.len(), sigma);
        let mode_map: HashMap<usize, usize> =
            mode.iter().map(|entry| (entry.val, entry.freq)).collect();
        prop_assert_eq!(mode.len(), expected.len());
        prop_assert_eq!(mode_map, expected.clone());
        for pair in mode.windows(2) {
            prop_assert!(pair[0].freq >= pair[1].freq);
        }

        let ascending = wm.list_min_range(0..sigma, 0..input.len(), sigma);
        let mut by_val: Vec<ListEntry> = expected
            .iter()
            .map(|(&val, &freq)| ListEntry { val, freq })
            .collect();
        by_val.sort_by_key(|entry| entry.val);
        prop_assert_eq!(ascending, by_val.clone());

        let descending = wm.list_max_range(0..sigma, 0..input.len(), sigma);
        by_val.reverse();
        prop_assert_eq!(descending, by_val);
    }

    #[test]
    fn restricted_listings_match_a_naive_filter(
        input in prop::collection::vec(0..24usize, 1..150),
        bounds: (usize, usize, usize, usize),
    ) {
        let wm = build(&input);
        let sigma = wm.alph_size();
        let beg = bounds.0 % input.len();
        let end = beg + 1 + bounds.1 % (input.len() - beg);
        let lo = bounds.2 % sigma;
        let hi = lo + 1 + bounds.3 % (sigma - lo);

        let expected = counts(
            &input[beg..end]
                .iter()
                .copied()
                .filter(|&x| lo <= x && x < hi)
                .collect::<Vec<_>>(),
        );
        let listed = wm.list_min_range(lo..hi, beg..end, sigma);
        let listed_map: HashMap<usize, usize> =
            listed.iter().map(|entry| (entry.val, entry.freq)).collect();
        prop_assert_eq!(listed.len(), expected.len());
        prop_assert_eq!(listed_map, expected);
    }

    #[test]
    fn byte_images_roundtrip(
        input in prop::collection::vec(0..300usize, 1..200),
    ) {
        let wm = build(&input);
        let bytes = wm.to_bytes();
        let decoded = WaveletMatrix::<Rank9SelIndex>::from_bytes(&bytes).unwrap();
        prop_assert_eq!(&wm, &decoded);
        prop_assert_eq!(decoded.to_bytes(), bytes);
        for (pos, &val) in input.iter().enumerate() {
            prop_assert_eq!(decoded.access(pos), Some(val));
        }
    }
}
