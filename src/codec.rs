//! Portable binary encoding.
//!
//! Format (versioned, little-endian):
//! - magic: 8 bytes (`RBITMAP1`)
//! - domain: u8 (`32` or `64`)
//! - body
//!
//! A 32-bit body is:
//! - container count: u32
//! - per container, in ascending key order:
//!   - key: u16
//!   - discriminator: u8 (`1` array, `2` bitmap, `3` run)
//!   - array: count u32, then `count` u16 values
//!   - bitmap: cardinality u32, then 1024 u64 words
//!   - run: run count u32, then `runs` pairs of (start u16, length u16),
//!     covering `start..=start + length`
//!
//! A 64-bit body is a bucket count u32, then per bucket in ascending order a
//! high key u32 followed by a 32-bit body.
//!
//! Decoding checks every declared length against the remaining input before
//! allocating, and rejects anything that would break a structural invariant
//! (unsorted keys, empty containers, overlapping runs, a cardinality that
//! disagrees with its bits). Nothing is returned unless the whole input is
//! valid.

use crate::bitmap32::Bitmap32;
use crate::container::{
    ArrayStore, BitmapStore, Container, Interval, RunStore, BITMAP_BYTES, BITMAP_WORDS,
};
use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::index::ChunkIndex;

pub(crate) const MAGIC: &[u8; 8] = b"RBITMAP1";

const ARRAY_TAG: u8 = 1;
const BITMAP_TAG: u8 = 2;
const RUN_TAG: u8 = 3;

/// Magic plus domain tag.
pub(crate) const HEADER_BYTES: usize = 9;

/// Smallest possible encoded container: key, tag, count, one value.
const MIN_CONTAINER_BYTES: usize = 2 + 1 + 4 + 2;

/// Smallest possible encoded bucket: key, container count, one container.
const MIN_BUCKET_BYTES: usize = 4 + 4 + MIN_CONTAINER_BYTES;

/// The most runs a container can hold while staying non-adjacent.
const MAX_RUNS: usize = 1 << 15;

pub(crate) fn write_header(out: &mut Vec<u8>, domain: Domain) {
    out.extend_from_slice(MAGIC);
    out.push(domain.tag());
}

pub(crate) fn write_index32(out: &mut Vec<u8>, index: &ChunkIndex<u16, Container>) {
    out.extend_from_slice(&(index.chunk_count() as u32).to_le_bytes());
    for (key, c) in index.entries() {
        out.extend_from_slice(&key.to_le_bytes());
        write_container(out, c);
    }
}

fn write_container(out: &mut Vec<u8>, c: &Container) {
    match c {
        Container::Array(a) => {
            out.push(ARRAY_TAG);
            out.extend_from_slice(&(a.len() as u32).to_le_bytes());
            for v in a.iter() {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        Container::Bitmap(b) => {
            out.push(BITMAP_TAG);
            out.extend_from_slice(&(b.len() as u32).to_le_bytes());
            for w in b.words().iter() {
                out.extend_from_slice(&w.to_le_bytes());
            }
        }
        Container::Run(r) => {
            out.push(RUN_TAG);
            out.extend_from_slice(&(r.num_runs() as u32).to_le_bytes());
            for iv in r.runs() {
                out.extend_from_slice(&iv.start.to_le_bytes());
                out.extend_from_slice(&iv.length().to_le_bytes());
            }
        }
    }
}

pub(crate) fn write_index64(out: &mut Vec<u8>, index: &ChunkIndex<u32, Bitmap32>) {
    out.extend_from_slice(&(index.chunk_count() as u32).to_le_bytes());
    for (key, b) in index.entries() {
        out.extend_from_slice(&key.to_le_bytes());
        write_index32(out, b.index());
    }
}

pub(crate) fn index32_size(index: &ChunkIndex<u16, Container>) -> usize {
    4 + index
        .entries()
        .iter()
        .map(|(_, c)| 2 + 1 + 4 + container_payload_size(c))
        .sum::<usize>()
}

fn container_payload_size(c: &Container) -> usize {
    match c {
        Container::Array(a) => 2 * a.len(),
        Container::Bitmap(_) => BITMAP_BYTES,
        Container::Run(r) => 4 * r.num_runs(),
    }
}

pub(crate) fn index64_size(index: &ChunkIndex<u32, Bitmap32>) -> usize {
    4 + index
        .entries()
        .iter()
        .map(|(_, b)| 4 + index32_size(b.index()))
        .sum::<usize>()
}

/// Bounds-checked cursor over an input buffer.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    off: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, off: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.off
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::InvalidEncoding(format!(
                "unexpected end of input at offset {}",
                self.off
            )));
        }
        let slice = &self.bytes[self.off..self.off + n];
        self.off += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    /// Fail unless `count` items of at least `each` bytes could still fit.
    fn ensure(&self, count: usize, each: usize, what: &str) -> Result<()> {
        if count.saturating_mul(each) > self.remaining() {
            return Err(Error::InvalidEncoding(format!(
                "{what} count ({count}) too large for remaining input ({} bytes)",
                self.remaining()
            )));
        }
        Ok(())
    }

    pub fn finish(&self) -> Result<()> {
        if self.off != self.bytes.len() {
            return Err(Error::InvalidEncoding(format!(
                "{} trailing bytes after bitmap",
                self.remaining()
            )));
        }
        Ok(())
    }
}

pub(crate) fn read_header(r: &mut Reader<'_>) -> Result<Domain> {
    if r.take(MAGIC.len())? != MAGIC {
        return Err(Error::InvalidEncoding("bad magic for bitmap".to_string()));
    }
    let tag = r.u8()?;
    Domain::from_tag(tag)
        .ok_or_else(|| Error::InvalidEncoding(format!("unknown domain tag {tag}")))
}

pub(crate) fn read_index32(r: &mut Reader<'_>) -> Result<ChunkIndex<u16, Container>> {
    let count = r.u32()? as usize;
    r.ensure(count, MIN_CONTAINER_BYTES, "container")?;
    let mut entries: Vec<(u16, Container)> = Vec::with_capacity(count);
    for _ in 0..count {
        let key = r.u16()?;
        if let Some((prev, _)) = entries.last() {
            if key <= *prev {
                return Err(Error::InvalidEncoding(format!(
                    "container key {key} out of order after {prev}"
                )));
            }
        }
        entries.push((key, read_container(r)?));
    }
    Ok(ChunkIndex::from_sorted_entries(entries))
}

fn read_container(r: &mut Reader<'_>) -> Result<Container> {
    match r.u8()? {
        ARRAY_TAG => {
            let n = r.u32()? as usize;
            if n == 0 || n > 1 << 16 {
                return Err(Error::InvalidEncoding(format!(
                    "array container cardinality {n} out of range"
                )));
            }
            r.ensure(n, 2, "array value")?;
            let mut values = Vec::with_capacity(n);
            for _ in 0..n {
                let v = r.u16()?;
                if values.last().is_some_and(|&prev| v <= prev) {
                    return Err(Error::InvalidEncoding(
                        "array container values not strictly ascending".to_string(),
                    ));
                }
                values.push(v);
            }
            Ok(Container::Array(ArrayStore::from_vec_unchecked(values)))
        }
        BITMAP_TAG => {
            let declared = r.u32()? as usize;
            r.ensure(BITMAP_WORDS, 8, "bitmap word")?;
            let mut words = Box::new([0u64; BITMAP_WORDS]);
            for w in words.iter_mut() {
                *w = r.u64()?;
            }
            let bitmap = BitmapStore::from_words(words);
            if bitmap.is_empty() || bitmap.len() != declared {
                return Err(Error::InvalidEncoding(format!(
                    "bitmap container declares {declared} values but holds {}",
                    bitmap.len()
                )));
            }
            Ok(Container::Bitmap(bitmap))
        }
        RUN_TAG => {
            let n = r.u32()? as usize;
            if n == 0 || n > MAX_RUNS {
                return Err(Error::InvalidEncoding(format!(
                    "run container count {n} out of range"
                )));
            }
            r.ensure(n, 4, "run")?;
            let mut runs: Vec<Interval> = Vec::with_capacity(n);
            for _ in 0..n {
                let start = r.u16()?;
                let length = r.u16()?;
                let end = start as u32 + length as u32;
                if end > u16::MAX as u32 {
                    return Err(Error::InvalidEncoding(format!(
                        "run {start}+{length} overflows the container"
                    )));
                }
                if let Some(prev) = runs.last() {
                    if start as u32 <= prev.end as u32 + 1 {
                        return Err(Error::InvalidEncoding(
                            "runs overlap, touch, or are out of order".to_string(),
                        ));
                    }
                }
                runs.push(Interval::new(start, end as u16));
            }
            Ok(Container::Run(RunStore::from_vec_unchecked(runs)))
        }
        tag => Err(Error::InvalidEncoding(format!(
            "unknown container discriminator {tag}"
        ))),
    }
}

pub(crate) fn read_index64(r: &mut Reader<'_>) -> Result<ChunkIndex<u32, Bitmap32>> {
    let count = r.u32()? as usize;
    r.ensure(count, MIN_BUCKET_BYTES, "bucket")?;
    let mut entries: Vec<(u32, Bitmap32)> = Vec::with_capacity(count);
    for _ in 0..count {
        let key = r.u32()?;
        if let Some((prev, _)) = entries.last() {
            if key <= *prev {
                return Err(Error::InvalidEncoding(format!(
                    "bucket key {key} out of order after {prev}"
                )));
            }
        }
        let index = read_index32(r)?;
        if index.is_empty() {
            return Err(Error::InvalidEncoding(format!("bucket {key} is empty")));
        }
        entries.push((key, Bitmap32::from_index(index)));
    }
    Ok(ChunkIndex::from_sorted_entries(entries))
}

/// A fully validated blob, split by domain.
pub(crate) enum Decoded {
    U32(ChunkIndex<u16, Container>),
    U64(ChunkIndex<u32, Bitmap32>),
}

/// Decode a whole blob. With `expected` set, a blob of the other domain
/// fails with [`Error::DomainMismatch`] before its body is read.
pub(crate) fn decode(bytes: &[u8], expected: Option<Domain>) -> Result<Decoded> {
    decode_checked(bytes, expected).inspect_err(|e| {
        tracing::debug!(error = %e, input_len = bytes.len(), "rejected bitmap encoding");
    })
}

fn decode_checked(bytes: &[u8], expected: Option<Domain>) -> Result<Decoded> {
    let mut r = Reader::new(bytes);
    let domain = read_header(&mut r)?;
    if let Some(left) = expected {
        if left != domain {
            return Err(Error::DomainMismatch {
                left,
                right: domain,
            });
        }
    }
    let decoded = match domain {
        Domain::U32 => Decoded::U32(read_index32(&mut r)?),
        Domain::U64 => Decoded::U64(read_index64(&mut r)?),
    };
    r.finish()?;
    Ok(decoded)
}
