//! Pairwise container algebra.
//!
//! Each operation matches on the variant pair and picks an algorithm suited
//! to it. The result representation follows the output, not the inputs:
//! every result goes through [`Container::reevaluate`].

use super::run::{self, runs_of_sorted};
use super::Container::{self, Array, Bitmap, Run};
use super::{BitmapStore, RunStore, ARRAY_LIMIT};

impl Container {
    pub fn and(&self, other: &Container) -> Container {
        let out = match (self, other) {
            (Array(a), Array(b)) => Array(a.and(b)),
            (Array(a), Bitmap(b)) | (Bitmap(b), Array(a)) => {
                let mut out = a.clone();
                out.retain(|&v| b.contains(v));
                Array(out)
            }
            (Array(a), Run(r)) | (Run(r), Array(a)) => Array(r.and_array(a)),
            (Bitmap(a), Bitmap(b)) => Bitmap(a.and(b)),
            (Bitmap(b), Run(r)) | (Run(r), Bitmap(b)) => {
                if r.is_full() {
                    Bitmap(b.clone())
                } else {
                    Bitmap(b.and_runs(r.runs()))
                }
            }
            (Run(a), Run(b)) => Run(RunStore::from_vec_unchecked(run::intersection(
                a.runs(),
                b.runs(),
            ))),
        };
        out.reevaluate()
    }

    pub fn or(&self, other: &Container) -> Container {
        let out = match (self, other) {
            (Array(a), Array(b)) => {
                if a.len() + b.len() <= ARRAY_LIMIT {
                    Array(a.or(b))
                } else {
                    let mut out = BitmapStore::from_array(a);
                    for v in b.iter() {
                        out.insert(v);
                    }
                    Bitmap(out)
                }
            }
            (Array(a), Bitmap(b)) | (Bitmap(b), Array(a)) => {
                let mut out = b.clone();
                for v in a.iter() {
                    out.insert(v);
                }
                Bitmap(out)
            }
            (Array(a), Run(r)) | (Run(r), Array(a)) => {
                if r.is_full() {
                    Run(r.clone())
                } else {
                    Run(RunStore::from_vec_unchecked(run::union(
                        r.runs(),
                        &runs_of_sorted(a.as_slice()),
                    )))
                }
            }
            (Bitmap(a), Bitmap(b)) => Bitmap(a.or(b)),
            (Bitmap(b), Run(r)) | (Run(r), Bitmap(b)) => {
                if r.is_full() {
                    Run(r.clone())
                } else {
                    let mut out = b.clone();
                    for iv in r.runs() {
                        out.set_range(iv.start as u32, iv.end as u32 + 1);
                    }
                    Bitmap(out)
                }
            }
            (Run(a), Run(b)) => Run(RunStore::from_vec_unchecked(run::union(
                a.runs(),
                b.runs(),
            ))),
        };
        out.reevaluate()
    }

    pub fn xor(&self, other: &Container) -> Container {
        let out = match (self, other) {
            (Array(a), Array(b)) => Array(a.xor(b)),
            (Array(a), Bitmap(b)) | (Bitmap(b), Array(a)) => {
                let mut out = b.clone();
                for v in a.iter() {
                    out.flip(v);
                }
                Bitmap(out)
            }
            (Array(a), Run(r)) | (Run(r), Array(a)) => {
                Run(RunStore::from_vec_unchecked(run::symmetric_difference(
                    r.runs(),
                    &runs_of_sorted(a.as_slice()),
                )))
            }
            (Bitmap(a), Bitmap(b)) => Bitmap(a.xor(b)),
            (Bitmap(b), Run(r)) | (Run(r), Bitmap(b)) => {
                let mut out = b.clone();
                for iv in r.runs() {
                    out.flip_range(iv.start as u32, iv.end as u32 + 1);
                }
                Bitmap(out)
            }
            (Run(a), Run(b)) => Run(RunStore::from_vec_unchecked(
                run::symmetric_difference(a.runs(), b.runs()),
            )),
        };
        out.reevaluate()
    }

    pub fn andnot(&self, other: &Container) -> Container {
        let out = match (self, other) {
            (Array(a), Array(b)) => Array(a.andnot(b)),
            (Array(a), Bitmap(b)) => {
                let mut out = a.clone();
                out.retain(|&v| !b.contains(v));
                Array(out)
            }
            (Array(a), Run(r)) => Array(r.andnot_from_array(a)),
            (Bitmap(a), Array(b)) => {
                let mut out = a.clone();
                for v in b.iter() {
                    out.remove(v);
                }
                Bitmap(out)
            }
            (Bitmap(a), Bitmap(b)) => Bitmap(a.andnot(b)),
            (Bitmap(a), Run(r)) => {
                let mut out = a.clone();
                for iv in r.runs() {
                    out.clear_range(iv.start as u32, iv.end as u32 + 1);
                }
                Bitmap(out)
            }
            (Run(r), Array(a)) => Run(RunStore::from_vec_unchecked(run::difference(
                r.runs(),
                &runs_of_sorted(a.as_slice()),
            ))),
            (Run(r), Bitmap(b)) => {
                if r.len() <= ARRAY_LIMIT {
                    let mut out = r.to_array();
                    out.retain(|&v| !b.contains(v));
                    Array(out)
                } else {
                    let mut out = r.to_bitmap();
                    out.andnot_inplace(b);
                    Bitmap(out)
                }
            }
            (Run(a), Run(b)) => Run(RunStore::from_vec_unchecked(run::difference(
                a.runs(),
                b.runs(),
            ))),
        };
        out.reevaluate()
    }

    pub fn and_inplace(&mut self, other: &Container) {
        let handled = match (&mut *self, other) {
            (Bitmap(a), Bitmap(b)) => {
                a.and_inplace(b);
                true
            }
            (Array(a), Bitmap(b)) => {
                a.retain(|&v| b.contains(v));
                true
            }
            _ => false,
        };
        if handled {
            self.reevaluate_in_place();
        } else {
            *self = self.and(other);
        }
    }

    pub fn or_inplace(&mut self, other: &Container) {
        let handled = match (&mut *self, other) {
            (Bitmap(a), Bitmap(b)) => {
                a.or_inplace(b);
                true
            }
            (Bitmap(a), Array(b)) => {
                for v in b.iter() {
                    a.insert(v);
                }
                true
            }
            (Bitmap(a), Run(r)) if !r.is_full() => {
                for iv in r.runs() {
                    a.set_range(iv.start as u32, iv.end as u32 + 1);
                }
                true
            }
            _ => false,
        };
        if handled {
            self.reevaluate_in_place();
        } else {
            *self = self.or(other);
        }
    }

    pub fn xor_inplace(&mut self, other: &Container) {
        let handled = match (&mut *self, other) {
            (Bitmap(a), Bitmap(b)) => {
                a.xor_inplace(b);
                true
            }
            (Bitmap(a), Array(b)) => {
                for v in b.iter() {
                    a.flip(v);
                }
                true
            }
            (Bitmap(a), Run(r)) => {
                for iv in r.runs() {
                    a.flip_range(iv.start as u32, iv.end as u32 + 1);
                }
                true
            }
            _ => false,
        };
        if handled {
            self.reevaluate_in_place();
        } else {
            *self = self.xor(other);
        }
    }

    pub fn andnot_inplace(&mut self, other: &Container) {
        let handled = match (&mut *self, other) {
            (Bitmap(a), Bitmap(b)) => {
                a.andnot_inplace(b);
                true
            }
            (Bitmap(a), Array(b)) => {
                for v in b.iter() {
                    a.remove(v);
                }
                true
            }
            (Bitmap(a), Run(r)) => {
                for iv in r.runs() {
                    a.clear_range(iv.start as u32, iv.end as u32 + 1);
                }
                true
            }
            (Array(a), Bitmap(b)) => {
                a.retain(|&v| !b.contains(v));
                true
            }
            _ => false,
        };
        if handled {
            self.reevaluate_in_place();
        } else {
            *self = self.andnot(other);
        }
    }

    /// True if the two containers share at least one value.
    pub fn intersects(&self, other: &Container) -> bool {
        match (self, other) {
            (Array(a), Array(b)) => a.intersects(b),
            (Array(a), Bitmap(b)) | (Bitmap(b), Array(a)) => a.iter().any(|v| b.contains(v)),
            (Array(a), Run(r)) | (Run(r), Array(a)) => !r.and_array(a).is_empty(),
            (Bitmap(a), Bitmap(b)) => a.intersects(b),
            (Bitmap(b), Run(r)) | (Run(r), Bitmap(b)) => r
                .runs()
                .iter()
                .any(|iv| b.range_cardinality(iv.start as u32, iv.end as u32 + 1) > 0),
            (Run(a), Run(b)) => run::intersects(a.runs(), b.runs()),
        }
    }

    /// True if every value of `self` is also in `other`.
    pub fn is_subset(&self, other: &Container) -> bool {
        if self.len() > other.len() {
            return false;
        }
        match (self, other) {
            (Array(a), Array(b)) => a.is_subset(b),
            (Array(a), Bitmap(b)) => a.iter().all(|v| b.contains(v)),
            (Array(a), Run(r)) => r.andnot_from_array(a).is_empty(),
            (Bitmap(a), Bitmap(b)) => a.is_subset(b),
            (Bitmap(a), Array(b)) => a.iter().all(|v| b.contains(v)),
            (Bitmap(a), Run(r)) => a.is_subset(&r.to_bitmap()),
            (Run(r), Array(a)) => r.iter().all(|v| a.contains(v)),
            (Run(r), Bitmap(b)) => r.runs().iter().all(|iv| {
                b.range_cardinality(iv.start as u32, iv.end as u32 + 1) == iv.len()
            }),
            (Run(a), Run(b)) => run::is_subset(a.runs(), b.runs()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::super::{ArrayStore, Kind};
    use super::*;

    /// The same values in all three representations.
    fn variants(values: &[u16]) -> [Container; 3] {
        let array = ArrayStore::from_vec_unchecked(values.to_vec());
        [
            Array(array.clone()),
            Bitmap(BitmapStore::from_array(&array)),
            Run(RunStore::from_array(&array)),
        ]
    }

    fn values(c: &Container) -> BTreeSet<u16> {
        c.iter().collect()
    }

    fn sample_a() -> Vec<u16> {
        (0..2000).chain(5000..5003).chain([40000, 65535]).collect()
    }

    fn sample_b() -> Vec<u16> {
        (1500..4500).step_by(2).chain(5001..6000).chain([65535]).collect()
    }

    #[test]
    fn test_all_variant_pairs_agree_with_sets() {
        let (va, vb) = (sample_a(), sample_b());
        let (sa, sb): (BTreeSet<u16>, BTreeSet<u16>) =
            (va.iter().copied().collect(), vb.iter().copied().collect());
        for a in variants(&va) {
            for b in variants(&vb) {
                assert_eq!(values(&a.and(&b)), &sa & &sb);
                assert_eq!(values(&a.or(&b)), &sa | &sb);
                assert_eq!(values(&a.xor(&b)), &sa ^ &sb);
                assert_eq!(values(&a.andnot(&b)), &sa - &sb);
                assert_eq!(values(&b.andnot(&a)), &sb - &sa);
                assert!(a.intersects(&b));
                assert!(!a.is_subset(&b));

                let mut c = a.clone();
                c.and_inplace(&b);
                assert_eq!(values(&c), &sa & &sb);
                let mut c = a.clone();
                c.or_inplace(&b);
                assert_eq!(values(&c), &sa | &sb);
                let mut c = a.clone();
                c.xor_inplace(&b);
                assert_eq!(values(&c), &sa ^ &sb);
                let mut c = a.clone();
                c.andnot_inplace(&b);
                assert_eq!(values(&c), &sa - &sb);
            }
        }
    }

    #[test]
    fn test_subset_and_disjoint_across_variants() {
        let small: Vec<u16> = (100..200).collect();
        let large: Vec<u16> = (0..1000).collect();
        let apart: Vec<u16> = (2000..2100).collect();
        for a in variants(&small) {
            for b in variants(&large) {
                assert!(a.is_subset(&b));
                assert!(!b.is_subset(&a));
            }
            for c in variants(&apart) {
                assert!(!a.intersects(&c));
                assert!(a.and(&c).is_empty());
            }
        }
    }

    #[test]
    fn test_result_representation_follows_output() {
        let dense: Vec<u16> = (0..20000).map(|v| v * 3).collect();
        let [_, bitmap, _] = variants(&dense);
        let [few, ..] = variants(&[3, 6, 9]);
        assert_eq!(bitmap.and(&few).kind(), Kind::Array);
        assert_eq!(bitmap.or(&few).kind(), Kind::Bitmap);
        assert_eq!(bitmap.andnot(&bitmap).kind(), Kind::Array);
        assert!(bitmap.xor(&bitmap).is_empty());

        let full = Run(RunStore::from_vec_unchecked(vec![super::super::Interval::new(
            0,
            u16::MAX,
        )]));
        assert_eq!(full.or(&bitmap).kind(), Kind::Run);
        assert_eq!(full.and(&bitmap), bitmap);
    }

    #[test]
    fn test_large_array_union_promotes() {
        let evens: Vec<u16> = (0..3000).map(|v| v * 2).collect();
        let odds: Vec<u16> = (0..3000).map(|v| v * 2 + 1).collect();
        let [a, ..] = variants(&evens);
        let [b, ..] = variants(&odds);
        let u = a.or(&b);
        assert_eq!(u.kind(), Kind::Bitmap);
        assert_eq!(u.len(), 6000);
        let x = a.xor(&b);
        assert_eq!(x.kind(), Kind::Bitmap);
        assert_eq!(x.len(), 6000);
    }
}
