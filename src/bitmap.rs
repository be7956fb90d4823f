//! Domain-tagged bitmap for callers that only learn the domain at runtime.
//!
//! Loosely typed values are checked against the bitmap's domain before they
//! reach a container, and algebra between a 32-bit and a 64-bit operand is a
//! type error rather than a silent widening.

use std::io;

use crate::codec::{self, Decoded};
use crate::domain::{Domain, Scalar};
use crate::error::{Error, Result};
use crate::{bitmap32, bitmap64, Bitmap32, Bitmap64};

/// A bitmap over either domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Bitmap {
    /// A 32-bit bitmap.
    U32(Bitmap32),
    /// A 64-bit bitmap.
    U64(Bitmap64),
}

impl Bitmap {
    /// Create an empty bitmap over `domain`.
    pub fn new(domain: Domain) -> Self {
        match domain {
            Domain::U32 => Bitmap::U32(Bitmap32::new()),
            Domain::U64 => Bitmap::U64(Bitmap64::new()),
        }
    }

    /// The domain this bitmap covers.
    pub fn domain(&self) -> Domain {
        match self {
            Bitmap::U32(_) => Domain::U32,
            Bitmap::U64(_) => Domain::U64,
        }
    }

    /// Number of values in the set.
    pub fn len(&self) -> u64 {
        match self {
            Bitmap::U32(b) => b.len(),
            Bitmap::U64(b) => b.len(),
        }
    }

    /// True if the set holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest value, widened to `u64`.
    pub fn min(&self) -> Option<u64> {
        match self {
            Bitmap::U32(b) => b.min().map(u64::from),
            Bitmap::U64(b) => b.min(),
        }
    }

    /// Largest value, widened to `u64`.
    pub fn max(&self) -> Option<u64> {
        match self {
            Bitmap::U32(b) => b.max().map(u64::from),
            Bitmap::U64(b) => b.max(),
        }
    }

    /// Ascending iterator over the values, widened to `u64`.
    pub fn iter(&self) -> Iter<'_> {
        match self {
            Bitmap::U32(b) => Iter::U32(b.iter()),
            Bitmap::U64(b) => Iter::U64(b.iter()),
        }
    }

    /// Check `value` against the domain, then insert it.
    pub fn try_insert(&mut self, value: impl Into<Scalar>) -> Result<bool> {
        let v = self.domain().check(value)?;
        Ok(match self {
            Bitmap::U32(b) => b.insert(v as u32),
            Bitmap::U64(b) => b.insert(v),
        })
    }

    /// Check `value` against the domain, then remove it.
    pub fn try_remove(&mut self, value: impl Into<Scalar>) -> Result<bool> {
        let v = self.domain().check(value)?;
        Ok(match self {
            Bitmap::U32(b) => b.remove(v as u32),
            Bitmap::U64(b) => b.remove(v),
        })
    }

    /// Check `value` against the domain, then test membership.
    pub fn try_contains(&self, value: impl Into<Scalar>) -> Result<bool> {
        let v = self.domain().check(value)?;
        Ok(match self {
            Bitmap::U32(b) => b.contains(v as u32),
            Bitmap::U64(b) => b.contains(v),
        })
    }

    fn mismatch(&self, other: &Bitmap) -> Error {
        Error::DomainMismatch {
            left: self.domain(),
            right: other.domain(),
        }
    }

    /// Intersection of two same-domain bitmaps.
    pub fn try_and(&self, other: &Bitmap) -> Result<Bitmap> {
        match (self, other) {
            (Bitmap::U32(a), Bitmap::U32(b)) => Ok(Bitmap::U32(a.and(b))),
            (Bitmap::U64(a), Bitmap::U64(b)) => Ok(Bitmap::U64(a.and(b))),
            _ => Err(self.mismatch(other)),
        }
    }

    /// Union of two same-domain bitmaps.
    pub fn try_or(&self, other: &Bitmap) -> Result<Bitmap> {
        match (self, other) {
            (Bitmap::U32(a), Bitmap::U32(b)) => Ok(Bitmap::U32(a.or(b))),
            (Bitmap::U64(a), Bitmap::U64(b)) => Ok(Bitmap::U64(a.or(b))),
            _ => Err(self.mismatch(other)),
        }
    }

    /// Symmetric difference of two same-domain bitmaps.
    pub fn try_xor(&self, other: &Bitmap) -> Result<Bitmap> {
        match (self, other) {
            (Bitmap::U32(a), Bitmap::U32(b)) => Ok(Bitmap::U32(a.xor(b))),
            (Bitmap::U64(a), Bitmap::U64(b)) => Ok(Bitmap::U64(a.xor(b))),
            _ => Err(self.mismatch(other)),
        }
    }

    /// Difference of two same-domain bitmaps.
    pub fn try_andnot(&self, other: &Bitmap) -> Result<Bitmap> {
        match (self, other) {
            (Bitmap::U32(a), Bitmap::U32(b)) => Ok(Bitmap::U32(a.andnot(b))),
            (Bitmap::U64(a), Bitmap::U64(b)) => Ok(Bitmap::U64(a.andnot(b))),
            _ => Err(self.mismatch(other)),
        }
    }

    /// Subset test between two same-domain bitmaps.
    pub fn try_is_subset(&self, other: &Bitmap) -> Result<bool> {
        match (self, other) {
            (Bitmap::U32(a), Bitmap::U32(b)) => Ok(a.is_subset(b)),
            (Bitmap::U64(a), Bitmap::U64(b)) => Ok(a.is_subset(b)),
            _ => Err(self.mismatch(other)),
        }
    }

    /// See [`Bitmap32::optimize`].
    pub fn optimize(&mut self) -> bool {
        match self {
            Bitmap::U32(b) => b.optimize(),
            Bitmap::U64(b) => b.optimize(),
        }
    }

    /// Exact length of [`Bitmap::to_bytes`] output.
    pub fn serialized_size(&self) -> usize {
        match self {
            Bitmap::U32(b) => b.serialized_size(),
            Bitmap::U64(b) => b.serialized_size(),
        }
    }

    /// Encode into the portable binary format; the domain tag is part of
    /// the output.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Bitmap::U32(b) => b.to_bytes(),
            Bitmap::U64(b) => b.to_bytes(),
        }
    }

    /// Decode a blob of either domain.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(match codec::decode(bytes, None)? {
            Decoded::U32(index) => Bitmap::U32(Bitmap32::from_index(index)),
            Decoded::U64(index) => Bitmap::U64(Bitmap64::from_index(index)),
        })
    }

    /// Write the binary encoding to `writer`.
    pub fn serialize_into<W: io::Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Read a whole binary encoding of either domain from `reader`.
    pub fn deserialize_from<R: io::Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }
}

impl From<Bitmap32> for Bitmap {
    fn from(b: Bitmap32) -> Self {
        Bitmap::U32(b)
    }
}

impl From<Bitmap64> for Bitmap {
    fn from(b: Bitmap64) -> Self {
        Bitmap::U64(b)
    }
}

/// Ascending iterator over a [`Bitmap`], widened to `u64`.
#[derive(Clone)]
pub enum Iter<'a> {
    /// Values of a 32-bit bitmap.
    U32(bitmap32::Iter<'a>),
    /// Values of a 64-bit bitmap.
    U64(bitmap64::Iter<'a>),
}

impl Iterator for Iter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        match self {
            Iter::U32(it) => it.next().map(u64::from),
            Iter::U64(it) => it.next(),
        }
    }
}
