//! Sorted array storage for sparse containers.

use std::cmp::Ordering;

/// A strictly ascending sequence of distinct 16-bit values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ArrayStore {
    vec: Vec<u16>,
}

impl ArrayStore {
    pub fn new() -> Self {
        Self { vec: Vec::new() }
    }

    /// Wrap a vector the caller guarantees is strictly ascending.
    pub fn from_vec_unchecked(vec: Vec<u16>) -> Self {
        debug_assert!(vec.windows(2).all(|w| w[0] < w[1]));
        Self { vec }
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.vec
    }

    pub fn len(&self) -> usize {
        self.vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    pub fn contains(&self, value: u16) -> bool {
        self.vec.binary_search(&value).is_ok()
    }

    pub fn insert(&mut self, value: u16) -> bool {
        match self.vec.binary_search(&value) {
            Ok(_) => false,
            Err(pos) => {
                self.vec.insert(pos, value);
                true
            }
        }
    }

    pub fn remove(&mut self, value: u16) -> bool {
        match self.vec.binary_search(&value) {
            Ok(pos) => {
                self.vec.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn min(&self) -> Option<u16> {
        self.vec.first().copied()
    }

    pub fn max(&self) -> Option<u16> {
        self.vec.last().copied()
    }

    /// Number of elements `<= value`.
    pub fn rank(&self, value: u16) -> usize {
        self.vec.partition_point(|&v| v <= value)
    }

    pub fn select(&self, n: usize) -> Option<u16> {
        self.vec.get(n).copied()
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, u16>> {
        self.vec.iter().copied()
    }

    /// Number of maximal runs of consecutive values.
    pub fn num_runs(&self) -> usize {
        if self.vec.is_empty() {
            return 0;
        }
        1 + self
            .vec
            .windows(2)
            .filter(|w| w[1] != w[0] + 1)
            .count()
    }

    pub fn retain(&mut self, f: impl FnMut(&u16) -> bool) {
        self.vec.retain(f);
    }

    pub fn shrink_to_fit(&mut self) {
        self.vec.shrink_to_fit();
    }

    pub fn heap_bytes(&self) -> usize {
        self.vec.capacity() * std::mem::size_of::<u16>()
    }

    pub fn and(&self, other: &Self) -> Self {
        let (a, b) = (&self.vec, &other.vec);
        let mut out = Vec::with_capacity(a.len().min(b.len()));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    out.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        Self { vec: out }
    }

    pub fn or(&self, other: &Self) -> Self {
        let (a, b) = (&self.vec, &other.vec);
        let mut out = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => {
                    out.push(a[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    out.push(b[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    out.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend_from_slice(&a[i..]);
        out.extend_from_slice(&b[j..]);
        Self { vec: out }
    }

    pub fn xor(&self, other: &Self) -> Self {
        let (a, b) = (&self.vec, &other.vec);
        let mut out = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => {
                    out.push(a[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    out.push(b[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend_from_slice(&a[i..]);
        out.extend_from_slice(&b[j..]);
        Self { vec: out }
    }

    pub fn andnot(&self, other: &Self) -> Self {
        let (a, b) = (&self.vec, &other.vec);
        let mut out = Vec::with_capacity(a.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => {
                    out.push(a[i]);
                    i += 1;
                }
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend_from_slice(&a[i..]);
        Self { vec: out }
    }

    pub fn intersects(&self, other: &Self) -> bool {
        let (a, b) = (&self.vec, &other.vec);
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => return true,
            }
        }
        false
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        if self.len() > other.len() {
            return false;
        }
        let (a, b) = (&self.vec, &other.vec);
        let mut j = 0;
        for &v in a {
            while j < b.len() && b[j] < v {
                j += 1;
            }
            if j == b.len() || b[j] != v {
                return false;
            }
            j += 1;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(values: &[u16]) -> ArrayStore {
        ArrayStore::from_vec_unchecked(values.to_vec())
    }

    #[test]
    fn test_insert_remove() {
        let mut a = ArrayStore::new();
        assert!(a.insert(5));
        assert!(a.insert(1));
        assert!(!a.insert(5));
        assert_eq!(a.as_slice(), &[1, 5]);
        assert!(a.remove(1));
        assert!(!a.remove(1));
        assert_eq!(a.as_slice(), &[5]);
    }

    #[test]
    fn test_rank_select() {
        let a = store(&[2, 4, 8]);
        assert_eq!(a.rank(0), 0);
        assert_eq!(a.rank(2), 1);
        assert_eq!(a.rank(7), 2);
        assert_eq!(a.rank(u16::MAX), 3);
        assert_eq!(a.select(2), Some(8));
        assert_eq!(a.select(3), None);
    }

    #[test]
    fn test_merges() {
        let a = store(&[1, 2, 3, 4]);
        let b = store(&[3, 4, 5, 6]);
        assert_eq!(a.and(&b).as_slice(), &[3, 4]);
        assert_eq!(a.or(&b).as_slice(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(a.xor(&b).as_slice(), &[1, 2, 5, 6]);
        assert_eq!(a.andnot(&b).as_slice(), &[1, 2]);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&store(&[7])));
        assert!(store(&[2, 4]).is_subset(&a));
        assert!(!store(&[2, 5]).is_subset(&a));
    }

    #[test]
    fn test_num_runs() {
        assert_eq!(ArrayStore::new().num_runs(), 0);
        assert_eq!(store(&[1, 2, 3, 7, 9, 10]).num_runs(), 3);
    }
}
