//! Run-length encoded container storage and interval algebra.
//!
//! Runs are kept canonical: ascending, disjoint and non-adjacent, so two run
//! containers holding the same values have identical interval lists. The
//! value count is tracked on every mutation so `len` is O(1).

use std::cmp::Ordering;

use super::array::ArrayStore;
use super::bitset::{BitmapStore, BITMAP_WORDS};

/// An inclusive interval `[start, end]` of 16-bit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Interval {
    pub start: u16,
    pub end: u16,
}

impl Interval {
    pub const fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    /// Number of values covered.
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    /// Number of values after `start`; the run length as serialized.
    pub fn length(&self) -> u16 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RunStore {
    runs: Vec<Interval>,
    len: u32,
}

impl RunStore {
    /// Wrap intervals the caller guarantees are canonical.
    pub fn from_vec_unchecked(runs: Vec<Interval>) -> Self {
        debug_assert!(runs
            .windows(2)
            .all(|w| w[0].end as u32 + 1 < w[1].start as u32));
        let len = runs.iter().map(|iv| iv.len() as u32).sum();
        Self { runs, len }
    }

    pub fn from_array(array: &ArrayStore) -> Self {
        Self {
            runs: runs_of_sorted(array.as_slice()),
            len: array.len() as u32,
        }
    }

    pub fn from_bitmap(bitmap: &BitmapStore) -> Self {
        let words = bitmap.words();
        let len = bitmap.len() as u32;
        let mut runs = Vec::new();
        let mut i = 0;
        let mut word = words[0];
        loop {
            while word == 0 {
                i += 1;
                if i == BITMAP_WORDS {
                    return Self { runs, len };
                }
                word = words[i];
            }
            let start = i * 64 + word.trailing_zeros() as usize;
            // Fill the zeros below the lowest set bit so the run shows up
            // as trailing ones.
            let mut filled = word | (word - 1);
            while filled == !0 {
                i += 1;
                if i == BITMAP_WORDS {
                    runs.push(Interval::new(start as u16, u16::MAX));
                    return Self { runs, len };
                }
                filled = words[i];
            }
            let end = i * 64 + (!filled).trailing_zeros() as usize;
            runs.push(Interval::new(start as u16, (end - 1) as u16));
            word = filled & (filled + 1);
        }
    }

    pub fn runs(&self) -> &[Interval] {
        &self.runs
    }

    pub fn num_runs(&self) -> usize {
        self.runs.len()
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.runs.len() == 1 && self.runs[0] == Interval::new(0, u16::MAX)
    }

    /// `Ok(i)` if run `i` holds `value`, otherwise `Err(i)` where a run
    /// starting at `value` would be inserted.
    fn find(&self, value: u16) -> Result<usize, usize> {
        self.runs.binary_search_by(|iv| {
            if iv.end < value {
                Ordering::Less
            } else if iv.start > value {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
    }

    pub fn contains(&self, value: u16) -> bool {
        self.find(value).is_ok()
    }

    pub fn insert(&mut self, value: u16) -> bool {
        let pos = match self.find(value) {
            Ok(_) => return false,
            Err(pos) => pos,
        };
        let extend_prev = pos > 0 && self.runs[pos - 1].end as u32 + 1 == value as u32;
        let extend_next = pos < self.runs.len() && self.runs[pos].start as u32 == value as u32 + 1;
        match (extend_prev, extend_next) {
            (true, true) => {
                self.runs[pos - 1].end = self.runs[pos].end;
                self.runs.remove(pos);
            }
            (true, false) => self.runs[pos - 1].end = value,
            (false, true) => self.runs[pos].start = value,
            (false, false) => self.runs.insert(pos, Interval::new(value, value)),
        }
        self.len += 1;
        true
    }

    pub fn remove(&mut self, value: u16) -> bool {
        let pos = match self.find(value) {
            Ok(pos) => pos,
            Err(_) => return false,
        };
        let iv = self.runs[pos];
        if iv.start == iv.end {
            self.runs.remove(pos);
        } else if value == iv.start {
            self.runs[pos].start = value + 1;
        } else if value == iv.end {
            self.runs[pos].end = value - 1;
        } else {
            self.runs[pos].end = value - 1;
            self.runs.insert(pos + 1, Interval::new(value + 1, iv.end));
        }
        self.len -= 1;
        true
    }

    pub fn min(&self) -> Option<u16> {
        self.runs.first().map(|iv| iv.start)
    }

    pub fn max(&self) -> Option<u16> {
        self.runs.last().map(|iv| iv.end)
    }

    /// Number of elements `<= value`.
    pub fn rank(&self, value: u16) -> usize {
        let mut rank = 0;
        for iv in &self.runs {
            if iv.start > value {
                break;
            }
            if iv.end <= value {
                rank += iv.len();
            } else {
                rank += (value - iv.start) as usize + 1;
                break;
            }
        }
        rank
    }

    pub fn select(&self, n: usize) -> Option<u16> {
        let mut remaining = n;
        for iv in &self.runs {
            if remaining < iv.len() {
                return Some(iv.start + remaining as u16);
            }
            remaining -= iv.len();
        }
        None
    }

    pub fn to_array(&self) -> ArrayStore {
        let mut vec = Vec::with_capacity(self.len());
        vec.extend(self.iter());
        ArrayStore::from_vec_unchecked(vec)
    }

    pub fn to_bitmap(&self) -> BitmapStore {
        BitmapStore::from_runs(&self.runs)
    }

    pub fn iter(&self) -> RunIter<'_> {
        RunIter {
            runs: self.runs.iter(),
            next: 0,
            end: 0,
        }
    }

    pub fn shrink_to_fit(&mut self) {
        self.runs.shrink_to_fit();
    }

    pub fn heap_bytes(&self) -> usize {
        self.runs.capacity() * std::mem::size_of::<Interval>()
    }

    /// Values of `array` that fall inside some run.
    pub fn and_array(&self, array: &ArrayStore) -> ArrayStore {
        self.filter_array(array, true)
    }

    /// Values of `array` that fall outside every run.
    pub fn andnot_from_array(&self, array: &ArrayStore) -> ArrayStore {
        self.filter_array(array, false)
    }

    fn filter_array(&self, array: &ArrayStore, keep_inside: bool) -> ArrayStore {
        let mut out = Vec::with_capacity(array.len());
        let mut j = 0;
        for v in array.iter() {
            while j < self.runs.len() && self.runs[j].end < v {
                j += 1;
            }
            let inside = j < self.runs.len() && self.runs[j].start <= v;
            if inside == keep_inside {
                out.push(v);
            }
        }
        ArrayStore::from_vec_unchecked(out)
    }
}

/// Ascending iterator over the values of a run container.
#[derive(Clone)]
pub(crate) struct RunIter<'a> {
    runs: std::slice::Iter<'a, Interval>,
    // Current run as the half-open range [next, end).
    next: u32,
    end: u32,
}

impl Iterator for RunIter<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        loop {
            if self.next < self.end {
                let v = self.next as u16;
                self.next += 1;
                return Some(v);
            }
            let iv = self.runs.next()?;
            self.next = iv.start as u32;
            self.end = iv.end as u32 + 1;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let current = (self.end - self.next) as usize;
        (current, None)
    }
}

/// Coalesce a strictly ascending slice into canonical runs.
pub(crate) fn runs_of_sorted(values: &[u16]) -> Vec<Interval> {
    let mut runs: Vec<Interval> = Vec::new();
    for &v in values {
        match runs.last_mut() {
            Some(last) if last.end as u32 + 1 == v as u32 => last.end = v,
            _ => runs.push(Interval::new(v, v)),
        }
    }
    runs
}

fn push_coalesced(out: &mut Vec<Interval>, iv: Interval) {
    if let Some(last) = out.last_mut() {
        if iv.start as u32 <= last.end as u32 + 1 {
            if iv.end > last.end {
                last.end = iv.end;
            }
            return;
        }
    }
    out.push(iv);
}

pub(crate) fn union(a: &[Interval], b: &[Interval]) -> Vec<Interval> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        let take_a = j >= b.len() || (i < a.len() && a[i].start <= b[j].start);
        if take_a {
            push_coalesced(&mut out, a[i]);
            i += 1;
        } else {
            push_coalesced(&mut out, b[j]);
            j += 1;
        }
    }
    out
}

pub(crate) fn intersection(a: &[Interval], b: &[Interval]) -> Vec<Interval> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let start = a[i].start.max(b[j].start);
        let end = a[i].end.min(b[j].end);
        if start <= end {
            out.push(Interval::new(start, end));
        }
        if a[i].end < b[j].end {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}

pub(crate) fn difference(a: &[Interval], b: &[Interval]) -> Vec<Interval> {
    let mut out = Vec::with_capacity(a.len());
    let mut j = 0;
    for iv in a {
        let mut start = iv.start as u32;
        let end = iv.end as u32;
        while j < b.len() && (b[j].end as u32) < start {
            j += 1;
        }
        let mut k = j;
        while k < b.len() && b[k].start as u32 <= end {
            if b[k].start as u32 > start {
                out.push(Interval::new(start as u16, b[k].start - 1));
            }
            start = b[k].end as u32 + 1;
            if start > end {
                break;
            }
            k += 1;
        }
        if start <= end {
            out.push(Interval::new(start as u16, end as u16));
        }
    }
    out
}

/// Symmetric difference by toggling at run boundaries.
///
/// Every interval contributes the half-open boundaries `start` and `end + 1`.
/// Membership flips at each boundary, so merging both boundary lists and
/// cancelling coincident points yields the boundaries of the result.
pub(crate) fn symmetric_difference(a: &[Interval], b: &[Interval]) -> Vec<Interval> {
    let bounds = |runs: &[Interval]| -> Vec<u32> {
        runs.iter()
            .flat_map(|iv| [iv.start as u32, iv.end as u32 + 1])
            .collect()
    };
    let (pa, pb) = (bounds(a), bounds(b));
    let mut points = Vec::with_capacity(pa.len() + pb.len());
    let (mut i, mut j) = (0, 0);
    while i < pa.len() && j < pb.len() {
        match pa[i].cmp(&pb[j]) {
            Ordering::Less => {
                points.push(pa[i]);
                i += 1;
            }
            Ordering::Greater => {
                points.push(pb[j]);
                j += 1;
            }
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }
    points.extend_from_slice(&pa[i..]);
    points.extend_from_slice(&pb[j..]);
    points
        .chunks_exact(2)
        .map(|p| Interval::new(p[0] as u16, (p[1] - 1) as u16))
        .collect()
}

pub(crate) fn intersects(a: &[Interval], b: &[Interval]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i].start.max(b[j].start) <= a[i].end.min(b[j].end) {
            return true;
        }
        if a[i].end < b[j].end {
            i += 1;
        } else {
            j += 1;
        }
    }
    false
}

/// True if every interval of `a` lies inside some interval of `b`.
pub(crate) fn is_subset(a: &[Interval], b: &[Interval]) -> bool {
    let mut j = 0;
    for iv in a {
        while j < b.len() && b[j].end < iv.start {
            j += 1;
        }
        if j == b.len() || b[j].start > iv.start || b[j].end < iv.end {
            return false;
        }
    }
    true
}
