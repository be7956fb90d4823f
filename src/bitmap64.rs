//! Compressed set of `u64` values.
//!
//! Two levels of the same structure: the high 32 bits of a value select a
//! [`Bitmap32`] bucket, the low 32 bits are stored in it. Every operation is
//! the 32-bit operation lifted through the generic chunk index, so the
//! invariants (ascending keys, no empty bucket) carry over unchanged.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::io;

use crate::bitmap32::{self, subset_order, Bitmap32, DISPLAY_LIMIT};
use crate::codec::{self, Decoded};
use crate::domain::{Domain, Scalar};
use crate::error::{Error, Result};
use crate::index::{ChunkIndex, SetOp};
use crate::stats::Statistics;

#[inline]
fn split(value: u64) -> (u32, u32) {
    ((value >> 32) as u32, value as u32)
}

#[inline]
fn join(key: u32, low: u32) -> u64 {
    (u64::from(key) << 32) | u64::from(low)
}

/// A compressed set of 64-bit unsigned integers.
///
/// ```
/// use rbits::Bitmap64;
///
/// let mut b = Bitmap64::new();
/// b.insert(u64::MAX);
/// b.insert(1 << 40);
/// b.insert(3);
/// assert_eq!(b.iter().collect::<Vec<_>>(), vec![3, 1 << 40, u64::MAX]);
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Bitmap64 {
    index: ChunkIndex<u32, Bitmap32>,
}

impl Bitmap64 {
    /// Create an empty bitmap.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_index(index: ChunkIndex<u32, Bitmap32>) -> Self {
        Self { index }
    }

    /// The domain this bitmap covers.
    pub const fn domain(&self) -> Domain {
        Domain::U64
    }

    /// Add `value`; returns true if it was not already present.
    pub fn insert(&mut self, value: u64) -> bool {
        let (key, low) = split(value);
        self.index.get_or_create(key).insert(low)
    }

    /// Remove `value`; returns true if it was present.
    pub fn remove(&mut self, value: u64) -> bool {
        let (key, low) = split(value);
        let Some(bucket) = self.index.get_mut(key) else {
            return false;
        };
        let removed = bucket.remove(low);
        if removed {
            self.index.remove_if_empty(key);
        }
        removed
    }

    /// True if `value` is in the set.
    pub fn contains(&self, value: u64) -> bool {
        let (key, low) = split(value);
        self.index.get(key).is_some_and(|b| b.contains(low))
    }

    /// Remove every value.
    pub fn clear(&mut self) {
        self.index.clear();
    }

    /// Overwrite the contents with a deep copy of `other`.
    pub fn replace(&mut self, other: &Bitmap64) {
        self.index.clone_from(&other.index);
    }

    /// Number of values in the set.
    pub fn len(&self) -> u64 {
        self.index.cardinality()
    }

    /// True if the set holds no values.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Smallest value, or `None` if empty.
    pub fn min(&self) -> Option<u64> {
        self.index.min().map(|(key, low)| join(key, low))
    }

    /// Largest value, or `None` if empty.
    pub fn max(&self) -> Option<u64> {
        self.index.max().map(|(key, low)| join(key, low))
    }

    /// Number of values `<= value`.
    pub fn rank(&self, value: u64) -> u64 {
        let (key, low) = split(value);
        self.index.rank(key, low)
    }

    /// The value at ascending position `n` (0-indexed).
    pub fn select(&self, n: u64) -> Option<u64> {
        self.index.select(n).map(|(key, low)| join(key, low))
    }

    /// Ascending iterator over the values.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            buckets: self.index.entries().iter(),
            front: None,
        }
    }

    /// Values in either set.
    pub fn or(&self, other: &Bitmap64) -> Bitmap64 {
        Self::from_index(self.index.merge(&other.index, SetOp::Or))
    }

    /// Values in both sets.
    pub fn and(&self, other: &Bitmap64) -> Bitmap64 {
        Self::from_index(self.index.merge(&other.index, SetOp::And))
    }

    /// Values in exactly one of the sets.
    pub fn xor(&self, other: &Bitmap64) -> Bitmap64 {
        Self::from_index(self.index.merge(&other.index, SetOp::Xor))
    }

    /// Values in `self` but not in `other`.
    pub fn andnot(&self, other: &Bitmap64) -> Bitmap64 {
        Self::from_index(self.index.merge(&other.index, SetOp::AndNot))
    }

    /// In-place union.
    pub fn or_inplace(&mut self, other: &Bitmap64) {
        self.index.merge_inplace(&other.index, SetOp::Or);
    }

    /// In-place intersection.
    pub fn and_inplace(&mut self, other: &Bitmap64) {
        self.index.merge_inplace(&other.index, SetOp::And);
    }

    /// In-place symmetric difference.
    pub fn xor_inplace(&mut self, other: &Bitmap64) {
        self.index.merge_inplace(&other.index, SetOp::Xor);
    }

    /// In-place difference.
    pub fn andnot_inplace(&mut self, other: &Bitmap64) {
        self.index.merge_inplace(&other.index, SetOp::AndNot);
    }

    /// True if every value of `self` is in `other`.
    pub fn is_subset(&self, other: &Bitmap64) -> bool {
        self.index.is_subset(&other.index)
    }

    /// True if `self` is a subset of `other` and the two differ.
    pub fn is_strict_subset(&self, other: &Bitmap64) -> bool {
        self.len() < other.len() && self.is_subset(other)
    }

    /// True if every value of `other` is in `self`.
    pub fn is_superset(&self, other: &Bitmap64) -> bool {
        other.is_subset(self)
    }

    /// True if the sets share at least one value.
    pub fn intersects(&self, other: &Bitmap64) -> bool {
        self.index.intersects(&other.index)
    }

    /// True if the sets share no value.
    pub fn is_disjoint(&self, other: &Bitmap64) -> bool {
        !self.intersects(other)
    }

    /// Re-select the most compact representation of every container in
    /// every bucket. Returns true if any run container remains.
    pub fn optimize(&mut self) -> bool {
        let before = self.statistics();
        let has_run = self.index.optimize();
        let after = self.statistics();
        tracing::debug!(
            buckets = self.index.chunk_count(),
            containers = after.n_containers,
            run_containers = after.n_run_containers,
            bytes_before = before.payload_bytes(),
            bytes_after = after.payload_bytes(),
            "optimized 64-bit bitmap"
        );
        has_run
    }

    /// Approximate heap memory held by the bitmap, in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.index.heap_bytes()
    }

    /// Per-representation breakdown of the containers across all buckets.
    pub fn statistics(&self) -> Statistics {
        let mut stats = Statistics::default();
        for (_, bucket) in self.index.entries() {
            stats.absorb(&bucket.statistics());
        }
        stats.min_value = self.min();
        stats.max_value = self.max();
        stats
    }

    /// Exact length of [`Bitmap64::to_bytes`] output.
    pub fn serialized_size(&self) -> usize {
        codec::HEADER_BYTES + codec::index64_size(&self.index)
    }

    /// Encode into the portable binary format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_size());
        codec::write_header(&mut out, Domain::U64);
        codec::write_index64(&mut out, &self.index);
        out
    }

    /// Decode a bitmap from [`Bitmap64::to_bytes`] output.
    ///
    /// A 32-bit blob fails with [`Error::DomainMismatch`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match codec::decode(bytes, Some(Domain::U64))? {
            Decoded::U64(index) => Ok(Self::from_index(index)),
            Decoded::U32(_) => Err(Error::DomainMismatch {
                left: Domain::U64,
                right: Domain::U32,
            }),
        }
    }

    /// Write the binary encoding to `writer`.
    pub fn serialize_into<W: io::Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Read a whole binary encoding from `reader`.
    pub fn deserialize_from<R: io::Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Insert a loosely typed value after checking it against the 64-bit
    /// domain.
    pub fn try_insert(&mut self, value: impl Into<Scalar>) -> Result<bool> {
        Ok(self.insert(Domain::U64.check(value)?))
    }

    /// Remove a loosely typed value after checking it against the 64-bit
    /// domain.
    pub fn try_remove(&mut self, value: impl Into<Scalar>) -> Result<bool> {
        Ok(self.remove(Domain::U64.check(value)?))
    }

    /// Membership test for a loosely typed value.
    pub fn try_contains(&self, value: impl Into<Scalar>) -> Result<bool> {
        Ok(self.contains(Domain::U64.check(value)?))
    }
}

/// Ascending iterator over a [`Bitmap64`].
#[derive(Clone)]
pub struct Iter<'a> {
    buckets: std::slice::Iter<'a, (u32, Bitmap32)>,
    front: Option<(u32, bitmap32::Iter<'a>)>,
}

impl Iterator for Iter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        loop {
            if let Some((key, values)) = &mut self.front {
                if let Some(low) = values.next() {
                    return Some(join(*key, low));
                }
            }
            let (key, bucket) = self.buckets.next()?;
            self.front = Some((*key, bucket.iter()));
        }
    }
}

impl std::iter::FusedIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Bitmap64 {
    type Item = u64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl FromIterator<u64> for Bitmap64 {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut b = Bitmap64::new();
        b.extend(iter);
        b
    }
}

impl<'a> FromIterator<&'a u64> for Bitmap64 {
    fn from_iter<I: IntoIterator<Item = &'a u64>>(iter: I) -> Self {
        iter.into_iter().copied().collect()
    }
}

impl Extend<u64> for Bitmap64 {
    fn extend<I: IntoIterator<Item = u64>>(&mut self, iter: I) {
        for v in iter {
            self.insert(v);
        }
    }
}

impl<'a> Extend<&'a u64> for Bitmap64 {
    fn extend<I: IntoIterator<Item = &'a u64>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl From<&[u64]> for Bitmap64 {
    fn from(values: &[u64]) -> Self {
        values.iter().collect()
    }
}

impl<const N: usize> From<[u64; N]> for Bitmap64 {
    fn from(values: [u64; N]) -> Self {
        values.into_iter().collect()
    }
}

impl Hash for Bitmap64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.len());
        for v in self {
            state.write_u64(v);
        }
    }
}

/// The subset order, as for [`Bitmap32`].
impl PartialOrd for Bitmap64 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        subset_order(self.len(), other.len(), || self.is_subset(other), || {
            other.is_subset(self)
        })
    }
}

impl fmt::Debug for Bitmap64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.len();
        if len > DISPLAY_LIMIT {
            return write!(f, "Bitmap64 ({len} values)");
        }
        f.write_str("Bitmap64 ")?;
        f.debug_set().entries(self.iter()).finish()
    }
}
