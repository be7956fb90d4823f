//! Containers: the three interchangeable representations of a set of
//! 16-bit values.
//!
//! | variant  | storage                     | best for                       |
//! |----------|-----------------------------|--------------------------------|
//! | `Array`  | sorted `Vec<u16>`           | fewer than 4096 values         |
//! | `Bitmap` | 1024 x `u64` + cardinality  | dense, fragmented subsets      |
//! | `Run`    | sorted `(start, end)` pairs | few contiguous ranges          |
//!
//! Every variant answers every query identically; the variant only decides
//! space and speed. [`Container::reevaluate`] is the single place where a
//! representation is chosen after a mutation or an algebra result, and
//! [`Container::optimize`] is the only path that creates run containers
//! from array or bitmap ones.

mod array;
mod bitset;
mod ops;
mod run;

pub(crate) use array::ArrayStore;
pub(crate) use bitset::{BitmapStore, BITMAP_WORDS};
pub(crate) use run::{Interval, RunStore};

use self::Container::{Array, Bitmap, Run};
use crate::index::Chunk;

/// Largest cardinality an array container may hold.
pub(crate) const ARRAY_LIMIT: usize = 4096;

/// Size in bytes of a dense container's bit vector.
pub(crate) const BITMAP_BYTES: usize = BITMAP_WORDS * 8;

/// Estimated payload size of an array container holding `cardinality` values.
pub(crate) const fn array_bytes(cardinality: usize) -> usize {
    cardinality * 2
}

/// Estimated payload size of a run container holding `runs` intervals.
pub(crate) const fn run_bytes(runs: usize) -> usize {
    runs * 4
}

/// Size of the cheaper non-run representation for `cardinality` values.
const fn plain_bytes(cardinality: usize) -> usize {
    if cardinality <= ARRAY_LIMIT {
        array_bytes(cardinality)
    } else {
        BITMAP_BYTES
    }
}

/// A set of 16-bit values in one of three representations.
#[derive(Debug, Clone)]
pub(crate) enum Container {
    Array(ArrayStore),
    Bitmap(BitmapStore),
    Run(RunStore),
}

impl Default for Container {
    fn default() -> Self {
        Array(ArrayStore::new())
    }
}

/// Which representation a container currently uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Array,
    Bitmap,
    Run,
}

impl Container {
    pub fn kind(&self) -> Kind {
        match self {
            Array(_) => Kind::Array,
            Bitmap(_) => Kind::Bitmap,
            Run(_) => Kind::Run,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Array(a) => a.len(),
            Bitmap(b) => b.len(),
            Run(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Array(a) => a.is_empty(),
            Bitmap(b) => b.is_empty(),
            Run(r) => r.is_empty(),
        }
    }

    pub fn contains(&self, value: u16) -> bool {
        match self {
            Array(a) => a.contains(value),
            Bitmap(b) => b.contains(value),
            Run(r) => r.contains(value),
        }
    }

    pub fn insert(&mut self, value: u16) -> bool {
        let inserted = match self {
            Array(a) => a.insert(value),
            Bitmap(b) => b.insert(value),
            Run(r) => r.insert(value),
        };
        if inserted && !matches!(self, Bitmap(_)) {
            self.reevaluate_in_place();
        }
        inserted
    }

    pub fn remove(&mut self, value: u16) -> bool {
        let removed = match self {
            Array(a) => a.remove(value),
            Bitmap(b) => b.remove(value),
            Run(r) => r.remove(value),
        };
        if removed && !matches!(self, Array(_)) {
            self.reevaluate_in_place();
        }
        removed
    }

    pub fn min(&self) -> Option<u16> {
        match self {
            Array(a) => a.min(),
            Bitmap(b) => b.min(),
            Run(r) => r.min(),
        }
    }

    pub fn max(&self) -> Option<u16> {
        match self {
            Array(a) => a.max(),
            Bitmap(b) => b.max(),
            Run(r) => r.max(),
        }
    }

    /// Number of elements `<= value`.
    pub fn rank(&self, value: u16) -> usize {
        match self {
            Array(a) => a.rank(value),
            Bitmap(b) => b.rank(value),
            Run(r) => r.rank(value),
        }
    }

    /// The `n`-th smallest element (0-indexed).
    pub fn select(&self, n: usize) -> Option<u16> {
        match self {
            Array(a) => a.select(n),
            Bitmap(b) => b.select(n),
            Run(r) => r.select(n),
        }
    }

    pub fn num_runs(&self) -> usize {
        match self {
            Array(a) => a.num_runs(),
            Bitmap(b) => b.num_runs(),
            Run(r) => r.num_runs(),
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        match self {
            Array(a) => Iter::Array(a.iter()),
            Bitmap(b) => Iter::Bitmap(b.iter()),
            Run(r) => Iter::Run(r.iter()),
        }
    }

    /// Estimated payload size of the current representation.
    pub fn payload_bytes(&self) -> usize {
        match self {
            Array(a) => array_bytes(a.len()),
            Bitmap(_) => BITMAP_BYTES,
            Run(r) => run_bytes(r.num_runs()),
        }
    }

    pub fn heap_bytes(&self) -> usize {
        match self {
            Array(a) => a.heap_bytes(),
            Bitmap(b) => b.heap_bytes(),
            Run(r) => r.heap_bytes(),
        }
    }

    /// Apply the conversion policy and return the preferred representation.
    ///
    /// - an array above [`ARRAY_LIMIT`] becomes a bitmap;
    /// - a bitmap at or below [`ARRAY_LIMIT`] becomes an array;
    /// - a run container survives only while it is no larger than the best
    ///   non-run representation of the same values.
    ///
    /// Never produces a run container.
    pub fn reevaluate(self) -> Container {
        match self {
            Array(a) if a.len() > ARRAY_LIMIT => {
                tracing::trace!(cardinality = a.len(), "array container -> bitmap");
                Bitmap(BitmapStore::from_array(&a))
            }
            Bitmap(b) if b.len() <= ARRAY_LIMIT => {
                tracing::trace!(cardinality = b.len(), "bitmap container -> array");
                Array(b.to_array())
            }
            Run(r) => {
                let cardinality = r.len();
                if run_bytes(r.num_runs()) <= plain_bytes(cardinality) {
                    Run(r)
                } else if cardinality <= ARRAY_LIMIT {
                    tracing::trace!(cardinality, "run container -> array");
                    Array(r.to_array())
                } else {
                    tracing::trace!(cardinality, "run container -> bitmap");
                    Bitmap(r.to_bitmap())
                }
            }
            other => other,
        }
    }

    pub(crate) fn reevaluate_in_place(&mut self) {
        *self = std::mem::take(self).reevaluate();
    }

    /// Re-select the most compact representation, run encoding included.
    ///
    /// Returns true if the container is run-encoded afterwards.
    pub fn optimize(&mut self) -> bool {
        let cardinality = self.len();
        let plain = plain_bytes(cardinality);
        let runs = run_bytes(self.num_runs());
        let want_run = match self {
            Run(_) => runs <= plain,
            _ => runs < plain,
        };
        if want_run {
            match self {
                Array(a) => *self = Run(RunStore::from_array(a)),
                Bitmap(b) => *self = Run(RunStore::from_bitmap(b)),
                Run(_) => {}
            }
        } else {
            self.reevaluate_in_place();
        }
        self.shrink_to_fit();
        want_run
    }

    fn shrink_to_fit(&mut self) {
        match self {
            Array(a) => a.shrink_to_fit(),
            Bitmap(_) => {}
            Run(r) => r.shrink_to_fit(),
        }
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Array(a), Array(b)) => a == b,
            (Bitmap(a), Bitmap(b)) => a == b,
            (Run(a), Run(b)) => a == b,
            _ => self.len() == other.len() && self.is_subset(other),
        }
    }
}

impl Eq for Container {}

impl Chunk for Container {
    type Value = u16;

    fn len(&self) -> u64 {
        Container::len(self) as u64
    }

    fn is_empty(&self) -> bool {
        Container::is_empty(self)
    }

    fn min(&self) -> Option<u16> {
        Container::min(self)
    }

    fn max(&self) -> Option<u16> {
        Container::max(self)
    }

    fn rank(&self, value: u16) -> u64 {
        Container::rank(self, value) as u64
    }

    fn select(&self, n: u64) -> Option<u16> {
        usize::try_from(n).ok().and_then(|n| Container::select(self, n))
    }

    fn and(&self, other: &Self) -> Self {
        Container::and(self, other)
    }

    fn or(&self, other: &Self) -> Self {
        Container::or(self, other)
    }

    fn xor(&self, other: &Self) -> Self {
        Container::xor(self, other)
    }

    fn andnot(&self, other: &Self) -> Self {
        Container::andnot(self, other)
    }

    fn and_inplace(&mut self, other: &Self) {
        Container::and_inplace(self, other)
    }

    fn or_inplace(&mut self, other: &Self) {
        Container::or_inplace(self, other)
    }

    fn xor_inplace(&mut self, other: &Self) {
        Container::xor_inplace(self, other)
    }

    fn andnot_inplace(&mut self, other: &Self) {
        Container::andnot_inplace(self, other)
    }

    fn intersects(&self, other: &Self) -> bool {
        Container::intersects(self, other)
    }

    fn is_subset(&self, other: &Self) -> bool {
        Container::is_subset(self, other)
    }

    fn optimize(&mut self) -> bool {
        Container::optimize(self)
    }

    fn heap_bytes(&self) -> usize {
        Container::heap_bytes(self)
    }
}

/// Ascending iterator over a container's values.
#[derive(Clone)]
pub(crate) enum Iter<'a> {
    Array(std::iter::Copied<std::slice::Iter<'a, u16>>),
    Bitmap(bitset::BitmapIter<'a>),
    Run(run::RunIter<'a>),
}

impl Iterator for Iter<'_> {
    type Item = u16;

    #[inline]
    fn next(&mut self) -> Option<u16> {
        match self {
            Iter::Array(it) => it.next(),
            Iter::Bitmap(it) => it.next(),
            Iter::Run(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Iter::Array(it) => it.size_hint(),
            Iter::Bitmap(it) => it.size_hint(),
            Iter::Run(it) => it.size_hint(),
        }
    }
}
