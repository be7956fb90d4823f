//! Dense bit-vector storage for containers.
//!
//! A container's 65536 possible values map onto 1024 x 64-bit words; value
//! `v` lives in word `v / 64`, bit `v % 64`. The cardinality is maintained
//! on every mutation so `len` is O(1).

use super::array::ArrayStore;
use super::run::Interval;

/// Number of 64-bit words in a dense container.
pub(crate) const BITMAP_WORDS: usize = 1024;

#[derive(Clone, PartialEq, Eq)]
pub(crate) struct BitmapStore {
    len: u32,
    bits: Box<[u64; BITMAP_WORDS]>,
}

impl std::fmt::Debug for BitmapStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitmapStore")
            .field("len", &self.len)
            .finish()
    }
}

impl BitmapStore {
    pub fn new() -> Self {
        Self {
            len: 0,
            bits: Box::new([0; BITMAP_WORDS]),
        }
    }

    /// Build from raw words, recounting the cardinality.
    pub fn from_words(bits: Box<[u64; BITMAP_WORDS]>) -> Self {
        let len = bits.iter().map(|w| w.count_ones()).sum();
        Self { len, bits }
    }

    pub fn from_array(array: &ArrayStore) -> Self {
        let mut out = Self::new();
        for v in array.iter() {
            out.bits[word_index(v)] |= bit_mask(v);
        }
        out.len = array.len() as u32;
        out
    }

    pub fn from_runs(runs: &[Interval]) -> Self {
        let mut out = Self::new();
        for iv in runs {
            out.set_range(iv.start as u32, iv.end as u32 + 1);
        }
        out
    }

    pub fn words(&self) -> &[u64; BITMAP_WORDS] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, value: u16) -> bool {
        self.bits[word_index(value)] & bit_mask(value) != 0
    }

    pub fn insert(&mut self, value: u16) -> bool {
        let word = &mut self.bits[word_index(value)];
        let before = *word;
        *word |= bit_mask(value);
        let inserted = before != *word;
        self.len += inserted as u32;
        inserted
    }

    pub fn remove(&mut self, value: u16) -> bool {
        let word = &mut self.bits[word_index(value)];
        let before = *word;
        *word &= !bit_mask(value);
        let removed = before != *word;
        self.len -= removed as u32;
        removed
    }

    /// Toggle membership of `value`.
    pub fn flip(&mut self, value: u16) {
        let word = &mut self.bits[word_index(value)];
        *word ^= bit_mask(value);
        if *word & bit_mask(value) != 0 {
            self.len += 1;
        } else {
            self.len -= 1;
        }
    }

    pub fn min(&self) -> Option<u16> {
        self.bits
            .iter()
            .enumerate()
            .find(|(_, &w)| w != 0)
            .map(|(i, w)| (i * 64 + w.trailing_zeros() as usize) as u16)
    }

    pub fn max(&self) -> Option<u16> {
        self.bits
            .iter()
            .enumerate()
            .rev()
            .find(|(_, &w)| w != 0)
            .map(|(i, w)| (i * 64 + 63 - w.leading_zeros() as usize) as u16)
    }

    /// Number of elements `<= value`.
    pub fn rank(&self, value: u16) -> usize {
        let idx = word_index(value);
        let full: u32 = self.bits[..idx].iter().map(|w| w.count_ones()).sum();
        let bit_offset = value as u32 % 64;
        let mask = if bit_offset == 63 {
            !0u64
        } else {
            (1u64 << (bit_offset + 1)) - 1
        };
        (full + (self.bits[idx] & mask).count_ones()) as usize
    }

    /// Return the `n`-th smallest element (0-indexed).
    pub fn select(&self, n: usize) -> Option<u16> {
        if n >= self.len() {
            return None;
        }
        let mut remaining = n;
        for (i, &word) in self.bits.iter().enumerate() {
            let ones = word.count_ones() as usize;
            if remaining < ones {
                return Some((i * 64 + select_in_word(word, remaining)) as u16);
            }
            remaining -= ones;
        }
        None
    }

    /// Number of set bits in the half-open range `[start, end)`.
    pub fn range_cardinality(&self, start: u32, end: u32) -> usize {
        let mut count = 0;
        for_each_word_mask(start, end, |i, mask| {
            count += (self.bits[i] & mask).count_ones() as usize;
        });
        count
    }

    /// Set every bit in the half-open range `[start, end)`.
    pub fn set_range(&mut self, start: u32, end: u32) {
        self.apply_range(start, end, |w, mask| w | mask);
    }

    /// Clear every bit in the half-open range `[start, end)`.
    pub fn clear_range(&mut self, start: u32, end: u32) {
        self.apply_range(start, end, |w, mask| w & !mask);
    }

    /// Toggle every bit in the half-open range `[start, end)`.
    pub fn flip_range(&mut self, start: u32, end: u32) {
        self.apply_range(start, end, |w, mask| w ^ mask);
    }

    fn apply_range(&mut self, start: u32, end: u32, f: impl Fn(u64, u64) -> u64) {
        let bits = &mut self.bits;
        let mut len = self.len;
        for_each_word_mask(start, end, |i, mask| {
            let before = bits[i];
            let after = f(before, mask);
            len = len + after.count_ones() - before.count_ones();
            bits[i] = after;
        });
        self.len = len;
    }

    /// Keep only the bits that fall inside `runs`.
    pub fn and_runs(&self, runs: &[Interval]) -> Self {
        let mut out = Self::new();
        for iv in runs {
            for_each_word_mask(iv.start as u32, iv.end as u32 + 1, |i, mask| {
                out.bits[i] |= self.bits[i] & mask;
            });
        }
        out.len = out.bits.iter().map(|w| w.count_ones()).sum();
        out
    }

    pub fn and(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a & b)
    }

    pub fn or(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a | b)
    }

    pub fn xor(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a ^ b)
    }

    pub fn andnot(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a & !b)
    }

    fn combine(&self, other: &Self, f: impl Fn(u64, u64) -> u64) -> Self {
        let mut out = Self::new();
        let mut len = 0;
        for (dst, (&a, &b)) in out
            .bits
            .iter_mut()
            .zip(self.bits.iter().zip(other.bits.iter()))
        {
            *dst = f(a, b);
            len += dst.count_ones();
        }
        out.len = len;
        out
    }

    pub fn and_inplace(&mut self, other: &Self) {
        self.combine_inplace(other, |a, b| a & b);
    }

    pub fn or_inplace(&mut self, other: &Self) {
        self.combine_inplace(other, |a, b| a | b);
    }

    pub fn xor_inplace(&mut self, other: &Self) {
        self.combine_inplace(other, |a, b| a ^ b);
    }

    pub fn andnot_inplace(&mut self, other: &Self) {
        self.combine_inplace(other, |a, b| a & !b);
    }

    fn combine_inplace(&mut self, other: &Self, f: impl Fn(u64, u64) -> u64) {
        let mut len = 0;
        for (a, &b) in self.bits.iter_mut().zip(other.bits.iter()) {
            *a = f(*a, b);
            len += a.count_ones();
        }
        self.len = len;
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .any(|(&a, &b)| a & b != 0)
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        self.len <= other.len
            && self
                .bits
                .iter()
                .zip(other.bits.iter())
                .all(|(&a, &b)| a & !b == 0)
    }

    /// Number of maximal runs of consecutive set bits.
    pub fn num_runs(&self) -> usize {
        let mut runs = 0;
        for i in 0..BITMAP_WORDS - 1 {
            let word = self.bits[i];
            let next = self.bits[i + 1];
            // Count run ends: a set bit followed by an unset one.
            runs += ((word << 1) & !word).count_ones() + ((word >> 63) & !next & 1) as u32;
        }
        let last = self.bits[BITMAP_WORDS - 1];
        runs += ((last << 1) & !last).count_ones() + (last >> 63) as u32;
        runs as usize
    }

    pub fn to_array(&self) -> ArrayStore {
        let mut vec = Vec::with_capacity(self.len());
        vec.extend(self.iter());
        ArrayStore::from_vec_unchecked(vec)
    }

    pub fn iter(&self) -> BitmapIter<'_> {
        BitmapIter {
            words: &self.bits,
            key: 0,
            word: self.bits[0],
            remaining: self.len(),
        }
    }

    pub fn heap_bytes(&self) -> usize {
        BITMAP_WORDS * std::mem::size_of::<u64>()
    }
}

/// Ascending iterator over the set bits of a dense container.
#[derive(Clone)]
pub(crate) struct BitmapIter<'a> {
    words: &'a [u64; BITMAP_WORDS],
    key: usize,
    word: u64,
    remaining: usize,
}

impl Iterator for BitmapIter<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        loop {
            if self.word != 0 {
                let bit = self.word.trailing_zeros() as usize;
                self.word &= self.word - 1;
                self.remaining -= 1;
                return Some((self.key * 64 + bit) as u16);
            }
            self.key += 1;
            if self.key >= BITMAP_WORDS {
                return None;
            }
            self.word = self.words[self.key];
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for BitmapIter<'_> {}

#[inline]
fn word_index(value: u16) -> usize {
    value as usize / 64
}

#[inline]
fn bit_mask(value: u16) -> u64 {
    1u64 << (value % 64)
}

/// Call `f(word_index, mask)` for every word overlapped by `[start, end)`.
fn for_each_word_mask(start: u32, end: u32, mut f: impl FnMut(usize, u64)) {
    if start >= end {
        return;
    }
    let first = (start / 64) as usize;
    let last = ((end - 1) / 64) as usize;
    let first_mask = !0u64 << (start % 64);
    let last_mask = !0u64 >> (63 - (end - 1) % 64);
    if first == last {
        f(first, first_mask & last_mask);
        return;
    }
    f(first, first_mask);
    for i in first + 1..last {
        f(i, !0);
    }
    f(last, last_mask);
}

/// Position of the `k`-th set bit (0-indexed) within `word`.
fn select_in_word(word: u64, k: usize) -> usize {
    #[cfg(all(target_arch = "x86_64", target_feature = "bmi2"))]
    {
        // SAFETY: guarded by the bmi2 target feature.
        unsafe {
            let mask = 1u64 << k;
            let res = core::arch::x86_64::_pdep_u64(mask, word);
            return res.trailing_zeros() as usize;
        }
    }

    let mut w = word;
    for _ in 0..k {
        w &= w - 1;
    }
    w.trailing_zeros() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove_len() {
        let mut b = BitmapStore::new();
        assert!(b.insert(0));
        assert!(b.insert(65535));
        assert!(!b.insert(0));
        assert_eq!(b.len(), 2);
        assert!(b.remove(0));
        assert!(!b.remove(0));
        assert_eq!(b.len(), 1);
        assert_eq!(b.min(), Some(65535));
        assert_eq!(b.max(), Some(65535));
    }

    #[test]
    fn test_rank_select() {
        let mut b = BitmapStore::new();
        for v in [3u16, 64, 127, 128, 4000] {
            b.insert(v);
        }
        assert_eq!(b.rank(2), 0);
        assert_eq!(b.rank(3), 1);
        assert_eq!(b.rank(127), 3);
        assert_eq!(b.rank(u16::MAX), 5);
        assert_eq!(b.select(0), Some(3));
        assert_eq!(b.select(3), Some(128));
        assert_eq!(b.select(4), Some(4000));
        assert_eq!(b.select(5), None);
    }

    #[test]
    fn test_ranges() {
        let mut b = BitmapStore::new();
        b.set_range(10, 200);
        assert_eq!(b.len(), 190);
        assert_eq!(b.range_cardinality(0, 65536), 190);
        assert_eq!(b.range_cardinality(64, 128), 64);
        b.clear_range(50, 60);
        assert_eq!(b.len(), 180);
        b.flip_range(0, 20);
        assert!(b.contains(0));
        assert!(!b.contains(10));
        assert_eq!(b.len(), 180);
        assert_eq!(b.num_runs(), 3);
    }

    #[test]
    fn test_num_runs_at_word_boundaries() {
        let mut b = BitmapStore::new();
        b.set_range(60, 70);
        b.set_range(65530, 65536);
        assert_eq!(b.num_runs(), 2);
        b.set_range(0, 65536);
        assert_eq!(b.num_runs(), 1);
        assert_eq!(b.len(), 65536);
    }

    #[test]
    fn test_select_in_word() {
        assert_eq!(select_in_word(0b1011, 0), 0);
        assert_eq!(select_in_word(0b1011, 2), 3);
        assert_eq!(select_in_word(1 << 63, 0), 63);
    }

    #[test]
    fn test_iter_matches_words() {
        let mut b = BitmapStore::new();
        for v in (0..65535u16).step_by(997) {
            b.insert(v);
        }
        let expected: Vec<u16> = (0..65535u16).step_by(997).collect();
        assert_eq!(b.iter().collect::<Vec<_>>(), expected);
        assert_eq!(b.iter().len(), expected.len());
    }
}
