use rbits::{Bitmap, Bitmap32, Bitmap64, Domain, Error};

#[test]
fn test_basic_set_behavior() {
    let mut b = Bitmap32::new();
    assert!(b.is_empty());
    for v in [10, 20, 30, 1 << 20] {
        assert!(b.insert(v));
    }
    assert!(!b.insert(20));
    assert_eq!(b.len(), 4);
    assert_eq!(b.iter().collect::<Vec<_>>(), vec![10, 20, 30, 1 << 20]);
    assert_eq!((&b).into_iter().sum::<u32>(), 60 + (1 << 20));

    assert!(b.remove(20));
    assert!(!b.remove(20));
    assert_eq!(b.len(), 3);

    b.clear();
    assert!(b.is_empty());
    assert_eq!(b.min(), None);
}

#[test]
fn test_replace_and_dup_are_independent() {
    let original: Bitmap32 = [1, 2, 3].into();
    let mut dup = original.clone();
    dup.insert(4);
    assert_eq!(original.len(), 3);
    assert_eq!(dup.len(), 4);

    let mut target: Bitmap32 = [100].into();
    target.replace(&original);
    assert_eq!(target, original);
    target.insert(5);
    assert!(!original.contains(5));
}

#[test]
fn test_equality_ignores_representation() {
    let a: Bitmap32 = (0..10_000).collect();
    let mut b = a.clone();
    assert!(b.optimize());
    assert_eq!(a, b);
    assert_eq!(b.statistics().n_run_containers, 1);
    assert_eq!(a.statistics().n_bitset_containers, 1);

    let c: Bitmap32 = (0..9_999).collect();
    assert_ne!(a, c);
    assert!(c < a);
}

#[test]
fn test_set_algebra_examples() {
    let a: Bitmap32 = [1, 2, 3].into();
    let b: Bitmap32 = [3, 4, 5].into();
    assert_eq!(&a | &b, Bitmap32::from([1, 2, 3, 4, 5]));
    assert_eq!(&a & &b, Bitmap32::from([3]));
    assert_eq!(&a ^ &b, Bitmap32::from([1, 2, 4, 5]));
    assert_eq!(&a - &b, Bitmap32::from([1, 2]));
    assert!(a.intersects(&b));
    assert!(!a.is_disjoint(&b));
    assert!(Bitmap32::from([1, 2]).is_subset(&a));
    assert!(a.is_superset(&Bitmap32::from([1, 2])));
    assert!(!a.is_strict_subset(&a));
}

#[test]
fn test_reference_examples() {
    let a: Bitmap32 = [1, 2, 3, 4].into();
    let b: Bitmap32 = [3, 4, 5, 6].into();
    assert_eq!((&a & &b).iter().collect::<Vec<_>>(), vec![3, 4]);
    assert_eq!((&a | &b).iter().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!((&a ^ &b).iter().collect::<Vec<_>>(), vec![1, 2, 5, 6]);
    assert_eq!((&a - &b).iter().collect::<Vec<_>>(), vec![1, 2]);

    let range: Bitmap64 = (100..999).collect();
    assert_eq!(range.len(), 899);
    let range: Bitmap64 = (100..=999).collect();
    assert_eq!(range.len(), 900);
}

#[test]
fn test_dense_and_sparse_containers_combine() {
    let dense: Bitmap32 = (0..100_000).collect();
    let sparse: Bitmap32 = (0..100_000).step_by(1000).collect();
    let mut runs = dense.clone();
    runs.optimize();

    assert_eq!(dense.and(&sparse), sparse);
    assert_eq!(runs.and(&sparse), sparse);
    assert_eq!(runs.andnot(&sparse).len(), 100_000 - 100);
    assert_eq!(dense.xor(&runs), Bitmap32::new());
    assert!(sparse.is_subset(&runs));
}

#[test]
fn test_rank_and_select() {
    let b: Bitmap32 = [5, 10, 70_000, 4_000_000_000].into();
    assert_eq!(b.select(0), Some(5));
    assert_eq!(b.select(3), Some(4_000_000_000));
    assert_eq!(b.select(4), None);
    assert_eq!(b.rank(0), 0);
    assert_eq!(b.rank(10), 2);
    assert_eq!(b.rank(69_999), 2);
    assert_eq!(b.rank(u32::MAX), 4);
}

#[test]
fn test_memory_shrinks_after_optimize() {
    let mut b = Bitmap64::new();
    for i in 0..=1_000_000u64 {
        b.insert(i);
    }
    let before = b.heap_bytes();
    assert!(before > 100_000, "{before}");
    assert!(before < 1_000_000, "{before}");

    assert!(b.optimize());
    let after = b.heap_bytes();
    assert!(after < 1000, "{after}");
    assert_eq!(b.len(), 1_000_001);
}

#[test]
fn test_domain_boundaries() {
    let mut b = Bitmap::new(Domain::U32);
    assert!(b.try_insert(4_294_967_295u64).unwrap());
    assert!(matches!(
        b.try_insert(4_294_967_296u64),
        Err(Error::OutOfRange { .. })
    ));
    assert!(matches!(b.try_insert(-1), Err(Error::OutOfRange { .. })));
    assert!(matches!(b.try_insert("2"), Err(Error::TypeMismatch { .. })));
    assert!(matches!(b.try_insert(2.0), Err(Error::TypeMismatch { .. })));
    assert_eq!(b.len(), 1);

    let mut b = Bitmap::new(Domain::U64);
    assert!(b.try_insert(4_294_967_296u64).unwrap());
    assert!(b.try_insert(u64::MAX).unwrap());
    assert!(matches!(
        b.try_insert(u64::MAX as i128 + 1),
        Err(Error::OutOfRange { .. })
    ));
    assert!(matches!(b.try_insert(-1), Err(Error::OutOfRange { .. })));
    assert_eq!(b.max(), Some(u64::MAX));
}

#[test]
fn test_error_messages() {
    let mut b = Bitmap32::new();
    let err = b.try_insert(-1).unwrap_err();
    assert_eq!(
        err.to_string(),
        "integer -1 is outside the 32-bit domain [0, 4294967295]"
    );

    let a = Bitmap::from(Bitmap32::new());
    let c = Bitmap::from(Bitmap64::new());
    let err = a.try_or(&c).unwrap_err();
    assert_eq!(
        err.to_string(),
        "incompatible operands: 32-bit bitmap with 64-bit bitmap"
    );
}

#[test]
fn test_serialization_both_domains() {
    let mut b32: Bitmap32 = (0..5000).chain([1 << 30, u32::MAX]).collect();
    b32.optimize();
    let bytes = b32.to_bytes();
    assert_eq!(&bytes[..8], b"RBITMAP1");
    assert_eq!(bytes[8], 32);
    assert_eq!(Bitmap32::from_bytes(&bytes).unwrap(), b32);

    let b64: Bitmap64 = [0, 1 << 32, u64::MAX].into();
    let bytes = b64.to_bytes();
    assert_eq!(bytes[8], 64);
    assert_eq!(Bitmap64::from_bytes(&bytes).unwrap(), b64);
    assert!(matches!(
        Bitmap32::from_bytes(&bytes),
        Err(Error::DomainMismatch { .. })
    ));
    assert!(matches!(
        Bitmap::from_bytes(&bytes),
        Ok(Bitmap::U64(ref b)) if *b == b64
    ));

    let empty = Bitmap32::new();
    assert_eq!(Bitmap32::from_bytes(&empty.to_bytes()).unwrap(), empty);
}

#[test]
fn test_stream_serialization() {
    let b: Bitmap32 = (0..300).map(|i| i * 7).collect();
    let mut buf = Vec::new();
    b.serialize_into(&mut buf).unwrap();
    assert_eq!(buf.len(), b.serialized_size());
    let back = Bitmap32::deserialize_from(buf.as_slice()).unwrap();
    assert_eq!(back, b);
}

#[test]
fn test_malformed_input_is_rejected() {
    for bytes in [
        &b""[..],
        &b"RBITMAP1"[..],
        &b"RBITMAP1\x20"[..],
        &b"XBITMAP1\x20\0\0\0\0"[..],
        &b"RBITMAP1\x10\0\0\0\0"[..],
    ] {
        assert!(matches!(
            Bitmap::from_bytes(bytes),
            Err(Error::InvalidEncoding(_))
        ));
    }

    // A bitmap container whose declared cardinality disagrees with its bits.
    let b: Bitmap32 = (0..5000).collect();
    let mut bytes = b.to_bytes();
    let cardinality = 9 + 4 + 2 + 1;
    bytes[cardinality..cardinality + 4].copy_from_slice(&4999u32.to_le_bytes());
    assert!(Bitmap32::from_bytes(&bytes).is_err());

    // Two containers with the same key.
    let b: Bitmap32 = [1, 1 << 16].into();
    let mut bytes = b.to_bytes();
    let second_key = 9 + 4 + (2 + 1 + 4 + 2);
    bytes[second_key..second_key + 2].copy_from_slice(&0u16.to_le_bytes());
    assert!(Bitmap32::from_bytes(&bytes).is_err());
}

#[test]
fn test_debug_output() {
    assert_eq!(format!("{:?}", Bitmap32::from([1, 2, 3, 4])), "Bitmap32 {1, 2, 3, 4}");
    assert_eq!(format!("{:?}", Bitmap32::new()), "Bitmap32 {}");
    let big: Bitmap64 = (0..1000).collect();
    assert_eq!(format!("{big:?}"), "Bitmap64 (1000 values)");
}

#[test]
fn test_hash_set_of_bitmaps() {
    use std::collections::HashSet;

    let a: Bitmap32 = (0..5000).collect();
    let mut b = a.clone();
    b.optimize();
    let set: HashSet<Bitmap32> = [a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
}

/// Trial-division sieve that keeps its primes in a bitmap and grows on
/// demand.
struct Sieve {
    primes: Bitmap32,
    limit: u32,
}

impl Sieve {
    fn new() -> Self {
        Self {
            primes: [2].into(),
            limit: 2,
        }
    }

    fn is_prime(&mut self, n: u32) -> bool {
        while self.limit < n {
            self.limit += 1;
            let candidate = self.limit;
            if self.primes.iter().all(|p| candidate % p != 0) {
                self.primes.insert(candidate);
            }
        }
        self.primes.contains(n)
    }
}

#[test]
fn test_prime_sieve() {
    let mut sieve = Sieve::new();
    let found: Vec<u32> = (0..=100).filter(|&n| sieve.is_prime(n)).collect();
    assert_eq!(
        found,
        vec![
            2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79,
            83, 89, 97
        ]
    );
    assert_eq!(sieve.primes.len(), 25);
    assert_eq!(sieve.primes.rank(50), 15);
}
