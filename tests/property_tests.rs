use std::collections::BTreeSet;

use proptest::prelude::*;
use rbits::{Bitmap, Bitmap32, Bitmap64};

/// Values clustered into a few containers so that array, bitmap and run
/// representations all show up.
fn values32() -> impl Strategy<Value = Vec<u32>> {
    prop_oneof![
        prop::collection::vec(any::<u32>(), 0..200),
        prop::collection::vec(0..200_000u32, 0..3000),
        (0..4u32, 0..70_000u32, 0..9000u32).prop_map(|(key, start, len)| {
            let base = key << 16;
            (start..start + len).map(|v| base + v).collect()
        }),
    ]
}

fn values64() -> impl Strategy<Value = Vec<u64>> {
    prop_oneof![
        prop::collection::vec(any::<u64>(), 0..100),
        prop::collection::vec(
            (0..3u64, 0..300_000u64).prop_map(|(hi, lo)| (hi << 32) | lo),
            0..2000
        ),
    ]
}

fn model32(values: &[u32]) -> BTreeSet<u32> {
    values.iter().copied().collect()
}

fn model64(values: &[u64]) -> BTreeSet<u64> {
    values.iter().copied().collect()
}

proptest! {
    #[test]
    fn test_membership_and_order_match_model(values in values32()) {
        let b: Bitmap32 = values.iter().collect();
        let model = model32(&values);

        prop_assert_eq!(b.len(), model.len() as u64);
        prop_assert_eq!(b.is_empty(), model.is_empty());
        prop_assert_eq!(b.min(), model.first().copied());
        prop_assert_eq!(b.max(), model.last().copied());
        prop_assert_eq!(b.iter().collect::<Vec<_>>(), model.iter().copied().collect::<Vec<_>>());
        for &v in values.iter().take(50) {
            prop_assert!(b.contains(v));
            prop_assert!(!b.contains(v.wrapping_add(1)) || model.contains(&v.wrapping_add(1)));
        }
    }

    #[test]
    fn test_rank_select_match_model(values in values32()) {
        let b: Bitmap32 = values.iter().collect();
        let sorted: Vec<u32> = model32(&values).into_iter().collect();

        for (i, &v) in sorted.iter().enumerate().step_by(7) {
            prop_assert_eq!(b.select(i as u64), Some(v));
            prop_assert_eq!(b.rank(v), i as u64 + 1);
        }
        prop_assert_eq!(b.select(sorted.len() as u64), None);
        prop_assert_eq!(b.rank(u32::MAX), sorted.len() as u64);
    }

    #[test]
    fn test_algebra_matches_model(a in values32(), b in values32()) {
        let (ba, bb): (Bitmap32, Bitmap32) = (a.iter().collect(), b.iter().collect());
        let (ma, mb) = (model32(&a), model32(&b));

        let and: Vec<u32> = ma.intersection(&mb).copied().collect();
        let or: Vec<u32> = ma.union(&mb).copied().collect();
        let xor: Vec<u32> = ma.symmetric_difference(&mb).copied().collect();
        let andnot: Vec<u32> = ma.difference(&mb).copied().collect();

        prop_assert_eq!(ba.and(&bb).iter().collect::<Vec<_>>(), and.clone());
        prop_assert_eq!(ba.or(&bb).iter().collect::<Vec<_>>(), or.clone());
        prop_assert_eq!(ba.xor(&bb).iter().collect::<Vec<_>>(), xor.clone());
        prop_assert_eq!(ba.andnot(&bb).iter().collect::<Vec<_>>(), andnot.clone());

        let mut c = ba.clone();
        c &= &bb;
        prop_assert_eq!(c.iter().collect::<Vec<_>>(), and);
        let mut c = ba.clone();
        c |= &bb;
        prop_assert_eq!(c.iter().collect::<Vec<_>>(), or);
        let mut c = ba.clone();
        c ^= &bb;
        prop_assert_eq!(c.iter().collect::<Vec<_>>(), xor);
        let mut c = ba.clone();
        c -= &bb;
        prop_assert_eq!(c.iter().collect::<Vec<_>>(), andnot);

        prop_assert_eq!(ba.intersects(&bb), !ma.is_disjoint(&mb));
        prop_assert_eq!(ba.is_subset(&bb), ma.is_subset(&mb));
        prop_assert!(ba.and(&bb).is_subset(&ba));
        prop_assert!(ba.is_subset(&ba.or(&bb)));
    }

    #[test]
    fn test_algebra_after_optimize_is_unchanged(a in values32(), b in values32()) {
        let (ba, bb): (Bitmap32, Bitmap32) = (a.iter().collect(), b.iter().collect());
        let (mut oa, mut ob) = (ba.clone(), bb.clone());
        oa.optimize();
        ob.optimize();

        prop_assert_eq!(&oa, &ba);
        prop_assert_eq!(oa.and(&ob), ba.and(&bb));
        prop_assert_eq!(oa.or(&bb), ba.or(&bb));
        prop_assert_eq!(ba.xor(&ob), ba.xor(&bb));
        prop_assert_eq!(oa.andnot(&ob), ba.andnot(&bb));
        prop_assert_eq!(oa.is_subset(&ob), ba.is_subset(&bb));
    }

    #[test]
    fn test_optimize_is_idempotent(values in values32()) {
        let mut b: Bitmap32 = values.iter().collect();
        let first = b.optimize();
        let stats = b.statistics();
        let bytes = b.to_bytes();
        prop_assert_eq!(b.optimize(), first);
        prop_assert_eq!(b.statistics(), stats);
        prop_assert_eq!(b.to_bytes(), bytes);
    }

    #[test]
    fn test_optimize_never_grows_payload(values in values32()) {
        let mut b: Bitmap32 = values.iter().collect();
        let before = b.statistics().payload_bytes();
        b.optimize();
        prop_assert!(b.statistics().payload_bytes() <= before);
    }

    #[test]
    fn test_serialization_roundtrip(values in values32(), optimize in any::<bool>()) {
        let mut b: Bitmap32 = values.iter().collect();
        if optimize {
            b.optimize();
        }
        let bytes = b.to_bytes();
        prop_assert_eq!(bytes.len(), b.serialized_size());
        let back = Bitmap32::from_bytes(&bytes).unwrap();
        prop_assert_eq!(back.statistics(), b.statistics());
        prop_assert_eq!(back, b);
    }

    #[test]
    fn test_truncated_encoding_is_rejected(values in values32(), cut in any::<prop::sample::Index>()) {
        let b: Bitmap32 = values.iter().collect();
        let bytes = b.to_bytes();
        let cut = cut.index(bytes.len());
        prop_assert!(Bitmap32::from_bytes(&bytes[..cut]).is_err());
    }

    #[test]
    fn test_decoder_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = Bitmap::from_bytes(&bytes);
        let mut tagged = b"RBITMAP1".to_vec();
        tagged.push(32);
        tagged.extend_from_slice(&bytes);
        let _ = Bitmap32::from_bytes(&tagged);
    }

    #[test]
    fn test_equal_sets_hash_equal(values in values32()) {
        use std::hash::{DefaultHasher, Hash, Hasher};

        let a: Bitmap32 = values.iter().collect();
        let mut b = a.clone();
        b.optimize();
        let hash = |x: &Bitmap32| {
            let mut h = DefaultHasher::new();
            x.hash(&mut h);
            h.finish()
        };
        prop_assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn test_insert_remove_report_changes(values in values32(), probe in any::<u32>()) {
        let mut b: Bitmap32 = values.iter().collect();
        let mut model = model32(&values);
        prop_assert_eq!(b.insert(probe), model.insert(probe));
        prop_assert!(!b.insert(probe));
        prop_assert_eq!(b.remove(probe), model.remove(&probe));
        prop_assert!(!b.remove(probe));
        prop_assert_eq!(b.len(), model.len() as u64);
    }

    #[test]
    fn test_64bit_matches_model(a in values64(), b in values64()) {
        let (ba, bb): (Bitmap64, Bitmap64) = (a.iter().collect(), b.iter().collect());
        let (ma, mb) = (model64(&a), model64(&b));

        prop_assert_eq!(ba.len(), ma.len() as u64);
        prop_assert_eq!(ba.min(), ma.first().copied());
        prop_assert_eq!(ba.max(), ma.last().copied());
        prop_assert_eq!(ba.iter().collect::<Vec<_>>(), ma.iter().copied().collect::<Vec<_>>());
        prop_assert_eq!(
            (&ba | &bb).iter().collect::<Vec<_>>(),
            ma.union(&mb).copied().collect::<Vec<_>>()
        );
        prop_assert_eq!(
            (&ba & &bb).iter().collect::<Vec<_>>(),
            ma.intersection(&mb).copied().collect::<Vec<_>>()
        );
        prop_assert_eq!(
            (&ba ^ &bb).iter().collect::<Vec<_>>(),
            ma.symmetric_difference(&mb).copied().collect::<Vec<_>>()
        );
        prop_assert_eq!(
            (&ba - &bb).iter().collect::<Vec<_>>(),
            ma.difference(&mb).copied().collect::<Vec<_>>()
        );
        prop_assert_eq!(ba.is_subset(&bb), ma.is_subset(&mb));

        if let Some(&v) = ma.iter().nth(ma.len() / 2) {
            let pos = ma.range(..=v).count() as u64;
            prop_assert_eq!(ba.rank(v), pos);
            prop_assert_eq!(ba.select(pos - 1), Some(v));
        }

        let bytes = ba.to_bytes();
        prop_assert_eq!(bytes.len(), ba.serialized_size());
        prop_assert_eq!(Bitmap64::from_bytes(&bytes).unwrap(), ba);
    }
}
