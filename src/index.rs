//! Ordered chunk index and the key-merging set-operation engine.
//!
//! A [`ChunkIndex`] maps high-order keys to chunks in ascending key order.
//! The same structure serves both domains:
//!
//! - `Bitmap32` is a `ChunkIndex<u16, Container>`: key = value >> 16;
//! - `Bitmap64` is a `ChunkIndex<u32, Bitmap32>`: key = value >> 32.
//!
//! Merging walks both indexes in key order. A key present on one side only
//! is copied or dropped depending on the operation; a key present on both
//! sides is combined by the chunk's own algebra and kept only if the result
//! is non-empty. No empty chunk is ever stored.

use std::cmp::Ordering;

/// A set of low-order values sharing one key.
pub(crate) trait Chunk: Clone + Default + PartialEq {
    /// The low-order value type stored in the chunk.
    type Value: Copy;

    fn len(&self) -> u64;
    fn is_empty(&self) -> bool;
    fn min(&self) -> Option<Self::Value>;
    fn max(&self) -> Option<Self::Value>;
    /// Number of elements `<= value`.
    fn rank(&self, value: Self::Value) -> u64;
    /// The `n`-th smallest element (0-indexed).
    fn select(&self, n: u64) -> Option<Self::Value>;

    fn and(&self, other: &Self) -> Self;
    fn or(&self, other: &Self) -> Self;
    fn xor(&self, other: &Self) -> Self;
    fn andnot(&self, other: &Self) -> Self;
    fn and_inplace(&mut self, other: &Self);
    fn or_inplace(&mut self, other: &Self);
    fn xor_inplace(&mut self, other: &Self);
    fn andnot_inplace(&mut self, other: &Self);

    fn intersects(&self, other: &Self) -> bool;
    fn is_subset(&self, other: &Self) -> bool;

    /// Re-select representations; true if any run encoding remains.
    fn optimize(&mut self) -> bool;
    fn heap_bytes(&self) -> usize;
}

/// A binary set operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetOp {
    And,
    Or,
    Xor,
    AndNot,
}

impl SetOp {
    /// Whether a key found only in the left operand survives.
    fn keeps_left(self) -> bool {
        !matches!(self, SetOp::And)
    }

    /// Whether a key found only in the right operand survives.
    fn keeps_right(self) -> bool {
        matches!(self, SetOp::Or | SetOp::Xor)
    }

    fn apply<C: Chunk>(self, a: &C, b: &C) -> C {
        match self {
            SetOp::And => a.and(b),
            SetOp::Or => a.or(b),
            SetOp::Xor => a.xor(b),
            SetOp::AndNot => a.andnot(b),
        }
    }

    fn apply_inplace<C: Chunk>(self, a: &mut C, b: &C) {
        match self {
            SetOp::And => a.and_inplace(b),
            SetOp::Or => a.or_inplace(b),
            SetOp::Xor => a.xor_inplace(b),
            SetOp::AndNot => a.andnot_inplace(b),
        }
    }
}

/// Sorted mapping from key to a non-empty chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChunkIndex<K, C> {
    entries: Vec<(K, C)>,
}

impl<K, C> Default for ChunkIndex<K, C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: Ord + Copy, C: Chunk> ChunkIndex<K, C> {
    /// Build from entries the caller guarantees are strictly ascending by
    /// key and non-empty.
    pub fn from_sorted_entries(entries: Vec<(K, C)>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
        debug_assert!(entries.iter().all(|(_, c)| !c.is_empty()));
        Self { entries }
    }

    /// Number of stored chunks.
    pub fn chunk_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[(K, C)] {
        &self.entries
    }

    fn find(&self, key: K) -> Result<usize, usize> {
        self.entries.binary_search_by(|(k, _)| k.cmp(&key))
    }

    pub fn get(&self, key: K) -> Option<&C> {
        self.find(key).ok().map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut C> {
        match self.find(key) {
            Ok(i) => Some(&mut self.entries[i].1),
            Err(_) => None,
        }
    }

    /// The chunk for `key`, inserting an empty one if absent.
    ///
    /// The caller must put a value into a freshly created chunk or call
    /// [`ChunkIndex::remove_if_empty`] afterwards.
    pub fn get_or_create(&mut self, key: K) -> &mut C {
        let i = match self.find(key) {
            Ok(i) => i,
            Err(i) => {
                self.entries.insert(i, (key, C::default()));
                i
            }
        };
        &mut self.entries[i].1
    }

    pub fn remove_if_empty(&mut self, key: K) {
        if let Ok(i) = self.find(key) {
            if self.entries[i].1.is_empty() {
                self.entries.remove(i);
            }
        }
    }

    /// Smallest value as `(key, low)`.
    pub fn min(&self) -> Option<(K, C::Value)> {
        let (key, c) = self.entries.first()?;
        c.min().map(|low| (*key, low))
    }

    /// Largest value as `(key, low)`.
    pub fn max(&self) -> Option<(K, C::Value)> {
        let (key, c) = self.entries.last()?;
        c.max().map(|low| (*key, low))
    }

    /// Total number of values across all chunks.
    pub fn cardinality(&self) -> u64 {
        self.entries.iter().map(|(_, c)| c.len()).sum()
    }

    /// Number of values `<= (key, value)`.
    pub fn rank(&self, key: K, value: C::Value) -> u64 {
        let mut rank = 0;
        for (k, c) in &self.entries {
            match k.cmp(&key) {
                Ordering::Less => rank += c.len(),
                Ordering::Equal => return rank + c.rank(value),
                Ordering::Greater => break,
            }
        }
        rank
    }

    /// The `n`-th smallest value (0-indexed), as `(key, low)`.
    pub fn select(&self, n: u64) -> Option<(K, C::Value)> {
        let mut remaining = n;
        for (k, c) in &self.entries {
            let len = c.len();
            if remaining < len {
                return c.select(remaining).map(|v| (*k, v));
            }
            remaining -= len;
        }
        None
    }

    /// Combine two indexes into a fresh one.
    pub fn merge(&self, other: &Self, op: SetOp) -> Self {
        let (a, b) = (&self.entries, &other.entries);
        let mut out = Vec::with_capacity(match op {
            SetOp::And => a.len().min(b.len()),
            SetOp::AndNot => a.len(),
            SetOp::Or | SetOp::Xor => a.len() + b.len(),
        });
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            let (ka, ca) = &a[i];
            let (kb, cb) = &b[j];
            match ka.cmp(kb) {
                Ordering::Less => {
                    if op.keeps_left() {
                        out.push((*ka, ca.clone()));
                    }
                    i += 1;
                }
                Ordering::Greater => {
                    if op.keeps_right() {
                        out.push((*kb, cb.clone()));
                    }
                    j += 1;
                }
                Ordering::Equal => {
                    let c = op.apply(ca, cb);
                    if !c.is_empty() {
                        out.push((*ka, c));
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        if op.keeps_left() {
            out.extend_from_slice(&a[i..]);
        }
        if op.keeps_right() {
            out.extend_from_slice(&b[j..]);
        }
        Self { entries: out }
    }

    /// Combine `other` into `self`, reusing the receiver's chunks.
    pub fn merge_inplace(&mut self, other: &Self, op: SetOp) {
        let b = &other.entries;
        match op {
            SetOp::And | SetOp::AndNot => {
                let mut j = 0;
                self.entries.retain_mut(|(k, c)| {
                    while j < b.len() && b[j].0 < *k {
                        j += 1;
                    }
                    if j < b.len() && b[j].0 == *k {
                        op.apply_inplace(c, &b[j].1);
                        !c.is_empty()
                    } else {
                        op == SetOp::AndNot
                    }
                });
            }
            SetOp::Or | SetOp::Xor => {
                let left = std::mem::take(&mut self.entries);
                let mut out = Vec::with_capacity(left.len() + b.len());
                let mut j = 0;
                for (k, mut c) in left {
                    while j < b.len() && b[j].0 < k {
                        out.push(b[j].clone());
                        j += 1;
                    }
                    if j < b.len() && b[j].0 == k {
                        op.apply_inplace(&mut c, &b[j].1);
                        j += 1;
                        if c.is_empty() {
                            continue;
                        }
                    }
                    out.push((k, c));
                }
                out.extend_from_slice(&b[j..]);
                self.entries = out;
            }
        }
    }

    /// True if every chunk of `self` is a subset of `other`'s chunk at the
    /// same key.
    pub fn is_subset(&self, other: &Self) -> bool {
        if self.entries.len() > other.entries.len() {
            return false;
        }
        let b = &other.entries;
        let mut j = 0;
        for (k, c) in &self.entries {
            while j < b.len() && b[j].0 < *k {
                j += 1;
            }
            if j == b.len() || b[j].0 != *k || !c.is_subset(&b[j].1) {
                return false;
            }
            j += 1;
        }
        true
    }

    /// True on the first shared key whose chunks intersect.
    pub fn intersects(&self, other: &Self) -> bool {
        let (a, b) = (&self.entries, &other.entries);
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    if a[i].1.intersects(&b[j].1) {
                        return true;
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        false
    }

    /// Optimize every chunk; true if any run encoding remains.
    pub fn optimize(&mut self) -> bool {
        let mut has_run = false;
        for (_, c) in &mut self.entries {
            has_run |= c.optimize();
        }
        self.entries.shrink_to_fit();
        has_run
    }

    pub fn heap_bytes(&self) -> usize {
        self.entries.capacity() * std::mem::size_of::<(K, C)>()
            + self
                .entries
                .iter()
                .map(|(_, c)| c.heap_bytes())
                .sum::<usize>()
    }
}
