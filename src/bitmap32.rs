//! Compressed set of `u32` values.
//!
//! A value `v` lives in the container keyed by `v >> 16`, as the low 16
//! bits `v as u16`. Keys are kept in ascending order and a key is present
//! only while its container is non-empty, so iteration, rank and select
//! walk containers in value order without any extra bookkeeping.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io;

use crate::codec::{self, Decoded};
use crate::container::{self, Container};
use crate::domain::{Domain, Scalar};
use crate::error::{Error, Result};
use crate::index::{Chunk, ChunkIndex, SetOp};
use crate::stats::Statistics;

/// Sets with at most this many values print every value in `Debug`.
pub(crate) const DISPLAY_LIMIT: u64 = 32;

#[inline]
fn split(value: u32) -> (u16, u16) {
    ((value >> 16) as u16, value as u16)
}

#[inline]
fn join(key: u16, low: u16) -> u32 {
    (u32::from(key) << 16) | u32::from(low)
}

/// A compressed set of 32-bit unsigned integers.
///
/// # Examples
///
/// ```
/// use rbits::Bitmap32;
///
/// let mut b: Bitmap32 = (0..10).collect();
/// assert!(b.insert(1_000_000));
/// assert!(!b.insert(5));
/// assert_eq!(b.len(), 11);
/// assert_eq!(b.max(), Some(1_000_000));
/// assert_eq!(b.select(3), Some(3));
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Bitmap32 {
    index: ChunkIndex<u16, Container>,
}

impl Bitmap32 {
    /// Create an empty bitmap.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_index(index: ChunkIndex<u16, Container>) -> Self {
        Self { index }
    }

    pub(crate) fn index(&self) -> &ChunkIndex<u16, Container> {
        &self.index
    }

    /// The domain this bitmap covers.
    pub const fn domain(&self) -> Domain {
        Domain::U32
    }

    /// Add `value`; returns true if it was not already present.
    pub fn insert(&mut self, value: u32) -> bool {
        let (key, low) = split(value);
        self.index.get_or_create(key).insert(low)
    }

    /// Remove `value`; returns true if it was present.
    pub fn remove(&mut self, value: u32) -> bool {
        let (key, low) = split(value);
        let Some(c) = self.index.get_mut(key) else {
            return false;
        };
        let removed = c.remove(low);
        if removed {
            self.index.remove_if_empty(key);
        }
        removed
    }

    /// True if `value` is in the set.
    pub fn contains(&self, value: u32) -> bool {
        let (key, low) = split(value);
        self.index.get(key).is_some_and(|c| c.contains(low))
    }

    /// Remove every value.
    pub fn clear(&mut self) {
        self.index.clear();
    }

    /// Overwrite the contents with a deep copy of `other`.
    pub fn replace(&mut self, other: &Bitmap32) {
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
    pub fn min(&self) -> Option<u32> {
        self.index.min().map(|(key, low)| join(key, low))
    }

    /// Largest value, or `None` if empty.
    pub fn max(&self) -> Option<u32> {
        self.index.max().map(|(key, low)| join(key, low))
    }

    /// Number of values `<= value`.
    pub fn rank(&self, value: u32) -> u64 {
        let (key, low) = split(value);
        self.index.rank(key, low)
    }

    /// The value at ascending position `n` (0-indexed), or `None` if
    /// `n >= len()`.
    pub fn select(&self, n: u64) -> Option<u32> {
        self.index.select(n).map(|(key, low)| join(key, low))
    }

    /// Ascending iterator over the values.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            chunks: self.index.entries().iter(),
            front: None,
        }
    }

    /// Values in either set.
    pub fn or(&self, other: &Bitmap32) -> Bitmap32 {
        Self::from_index(self.index.merge(&other.index, SetOp::Or))
    }

    /// Values in both sets.
    pub fn and(&self, other: &Bitmap32) -> Bitmap32 {
        Self::from_index(self.index.merge(&other.index, SetOp::And))
    }

    /// Values in exactly one of the sets.
    pub fn xor(&self, other: &Bitmap32) -> Bitmap32 {
        Self::from_index(self.index.merge(&other.index, SetOp::Xor))
    }

    /// Values in `self` but not in `other`.
    pub fn andnot(&self, other: &Bitmap32) -> Bitmap32 {
        Self::from_index(self.index.merge(&other.index, SetOp::AndNot))
    }

    /// In-place union.
    pub fn or_inplace(&mut self, other: &Bitmap32) {
        self.index.merge_inplace(&other.index, SetOp::Or);
    }

    /// In-place intersection.
    pub fn and_inplace(&mut self, other: &Bitmap32) {
        self.index.merge_inplace(&other.index, SetOp::And);
    }

    /// In-place symmetric difference.
    pub fn xor_inplace(&mut self, other: &Bitmap32) {
        self.index.merge_inplace(&other.index, SetOp::Xor);
    }

    /// In-place difference.
    pub fn andnot_inplace(&mut self, other: &Bitmap32) {
        self.index.merge_inplace(&other.index, SetOp::AndNot);
    }

    /// True if every value of `self` is in `other`.
    pub fn is_subset(&self, other: &Bitmap32) -> bool {
        self.index.is_subset(&other.index)
    }

    /// True if `self` is a subset of `other` and the two differ.
    pub fn is_strict_subset(&self, other: &Bitmap32) -> bool {
        self.len() < other.len() && self.is_subset(other)
    }

    /// True if every value of `other` is in `self`.
    pub fn is_superset(&self, other: &Bitmap32) -> bool {
        other.is_subset(self)
    }

    /// True if the sets share at least one value.
    pub fn intersects(&self, other: &Bitmap32) -> bool {
        self.index.intersects(&other.index)
    }

    /// True if the sets share no value.
    pub fn is_disjoint(&self, other: &Bitmap32) -> bool {
        !self.intersects(other)
    }

    /// Re-select the most compact representation of every container, run
    /// encoding included, and release spare capacity.
    ///
    /// Returns true if any run container is present afterwards. Running it
    /// twice in a row changes nothing the second time.
    pub fn optimize(&mut self) -> bool {
        let before = self.statistics();
        let has_run = self.index.optimize();
        let after = self.statistics();
        tracing::debug!(
            containers = after.n_containers,
            run_containers = after.n_run_containers,
            bytes_before = before.payload_bytes(),
            bytes_after = after.payload_bytes(),
            "optimized 32-bit bitmap"
        );
        has_run
    }

    /// Approximate heap memory held by the bitmap, in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.index.heap_bytes()
    }

    /// Per-representation breakdown of the containers.
    pub fn statistics(&self) -> Statistics {
        let mut stats = Statistics::default();
        for (_, c) in self.index.entries() {
            stats.record(c);
        }
        stats.min_value = self.min().map(u64::from);
        stats.max_value = self.max().map(u64::from);
        stats
    }

    /// Exact length of [`Bitmap32::to_bytes`] output.
    pub fn serialized_size(&self) -> usize {
        codec::HEADER_BYTES + codec::index32_size(&self.index)
    }

    /// Encode into the portable binary format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_size());
        codec::write_header(&mut out, Domain::U32);
        codec::write_index32(&mut out, &self.index);
        out
    }

    /// Decode a bitmap from [`Bitmap32::to_bytes`] output.
    ///
    /// Fails with [`Error::InvalidEncoding`] on malformed input and with
    /// [`Error::DomainMismatch`] on a well-formed 64-bit blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match codec::decode(bytes, Some(Domain::U32))? {
            Decoded::U32(index) => Ok(Self::from_index(index)),
            Decoded::U64(_) => Err(Error::DomainMismatch {
                left: Domain::U32,
                right: Domain::U64,
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

    /// Insert a loosely typed value after checking it against the 32-bit
    /// domain.
    pub fn try_insert(&mut self, value: impl Into<Scalar>) -> Result<bool> {
        Ok(self.insert(Self::check(value)?))
    }

    /// Remove a loosely typed value after checking it against the 32-bit
    /// domain.
    pub fn try_remove(&mut self, value: impl Into<Scalar>) -> Result<bool> {
        Ok(self.remove(Self::check(value)?))
    }

    /// Membership test for a loosely typed value.
    pub fn try_contains(&self, value: impl Into<Scalar>) -> Result<bool> {
        Ok(self.contains(Self::check(value)?))
    }

    fn check(value: impl Into<Scalar>) -> Result<u32> {
        // `check` bounds the value to u32::MAX.
        Domain::U32.check(value).map(|v| v as u32)
    }
}

/// Ascending iterator over a [`Bitmap32`].
#[derive(Clone)]
pub struct Iter<'a> {
    chunks: std::slice::Iter<'a, (u16, Container)>,
    front: Option<(u16, container::Iter<'a>)>,
}

impl Iterator for Iter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        loop {
            if let Some((key, values)) = &mut self.front {
                if let Some(low) = values.next() {
                    return Some(join(*key, low));
                }
            }
            let (key, c) = self.chunks.next()?;
            self.front = Some((*key, c.iter()));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lo, hi) = self
            .front
            .as_ref()
            .map_or((0, Some(0)), |(_, it)| it.size_hint());
        let rest: usize = self.chunks.as_slice().iter().map(|(_, c)| c.len()).sum();
        (lo + rest, hi.map(|hi| hi + rest))
    }
}

impl std::iter::FusedIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Bitmap32 {
    type Item = u32;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl FromIterator<u32> for Bitmap32 {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut b = Bitmap32::new();
        b.extend(iter);
        b
    }
}

impl<'a> FromIterator<&'a u32> for Bitmap32 {
    fn from_iter<I: IntoIterator<Item = &'a u32>>(iter: I) -> Self {
        iter.into_iter().copied().collect()
    }
}

impl Extend<u32> for Bitmap32 {
    fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        for v in iter {
            self.insert(v);
        }
    }
}

impl<'a> Extend<&'a u32> for Bitmap32 {
    fn extend<I: IntoIterator<Item = &'a u32>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl From<&[u32]> for Bitmap32 {
    fn from(values: &[u32]) -> Self {
        values.iter().collect()
    }
}

impl<const N: usize> From<[u32; N]> for Bitmap32 {
    fn from(values: [u32; N]) -> Self {
        values.into_iter().collect()
    }
}

impl Hash for Bitmap32 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.len());
        for v in self {
            state.write_u32(v);
        }
    }
}

/// The subset order: `a <= b` iff every value of `a` is in `b`.
impl PartialOrd for Bitmap32 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        subset_order(self.len(), other.len(), || self.is_subset(other), || {
            other.is_subset(self)
        })
    }
}

/// Shared subset partial order for both domains.
pub(crate) fn subset_order(
    left_len: u64,
    right_len: u64,
    left_in_right: impl FnOnce() -> bool,
    right_in_left: impl FnOnce() -> bool,
) -> Option<Ordering> {
    match left_len.cmp(&right_len) {
        Ordering::Less => left_in_right().then_some(Ordering::Less),
        Ordering::Greater => right_in_left().then_some(Ordering::Greater),
        Ordering::Equal => left_in_right().then_some(Ordering::Equal),
    }
}

impl fmt::Debug for Bitmap32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.len();
        if len > DISPLAY_LIMIT {
            return write!(f, "Bitmap32 ({len} values)");
        }
        f.write_str("Bitmap32 ")?;
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Chunk for Bitmap32 {
    type Value = u32;

    fn len(&self) -> u64 {
        Bitmap32::len(self)
    }

    fn is_empty(&self) -> bool {
        Bitmap32::is_empty(self)
    }

    fn min(&self) -> Option<u32> {
        Bitmap32::min(self)
    }

    fn max(&self) -> Option<u32> {
        Bitmap32::max(self)
    }

    fn rank(&self, value: u32) -> u64 {
        Bitmap32::rank(self, value)
    }

    fn select(&self, n: u64) -> Option<u32> {
        Bitmap32::select(self, n)
    }

    fn and(&self, other: &Self) -> Self {
        Bitmap32::and(self, other)
    }

    fn or(&self, other: &Self) -> Self {
        Bitmap32::or(self, other)
    }

    fn xor(&self, other: &Self) -> Self {
        Bitmap32::xor(self, other)
    }

    fn andnot(&self, other: &Self) -> Self {
        Bitmap32::andnot(self, other)
    }

    fn and_inplace(&mut self, other: &Self) {
        Bitmap32::and_inplace(self, other)
    }

    fn or_inplace(&mut self, other: &Self) {
        Bitmap32::or_inplace(self, other)
    }

    fn xor_inplace(&mut self, other: &Self) {
        Bitmap32::xor_inplace(self, other)
    }

    fn andnot_inplace(&mut self, other: &Self) {
        Bitmap32::andnot_inplace(self, other)
    }

    fn intersects(&self, other: &Self) -> bool {
        Bitmap32::intersects(self, other)
    }

    fn is_subset(&self, other: &Self) -> bool {
        Bitmap32::is_subset(self, other)
    }

    // Nested buckets are logged once by the owning 64-bit bitmap.
    fn optimize(&mut self) -> bool {
        self.index.optimize()
    }

    fn heap_bytes(&self) -> usize {
        Bitmap32::heap_bytes(self)
    }
}
