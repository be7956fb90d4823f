#![no_main]
use std::collections::BTreeSet;

use libfuzzer_sys::fuzz_target;
use rbits::Bitmap32;

fuzz_target!(|data: (Vec<u32>, Vec<u32>, bool)| {
    let (a, b, optimize) = data;
    let (mut ba, bb): (Bitmap32, Bitmap32) = (a.iter().collect(), b.iter().collect());
    if optimize {
        ba.optimize();
    }
    let ma: BTreeSet<u32> = a.into_iter().collect();
    let mb: BTreeSet<u32> = b.into_iter().collect();

    assert_eq!(ba.len(), ma.len() as u64);
    assert!((&ba | &bb).iter().eq(ma.union(&mb).copied()));
    assert!((&ba & &bb).iter().eq(ma.intersection(&mb).copied()));
    assert!((&ba ^ &bb).iter().eq(ma.symmetric_difference(&mb).copied()));
    assert!((&ba - &bb).iter().eq(ma.difference(&mb).copied()));
    assert_eq!(ba.is_subset(&bb), ma.is_subset(&mb));

    // Rank and select are inverse on every member.
    if let Some(&v) = ma.iter().next_back() {
        let k = ba.rank(v);
        assert_eq!(k, ma.len() as u64);
        assert_eq!(ba.select(k - 1), Some(v));
    }

    let decoded = Bitmap32::from_bytes(&ba.to_bytes()).expect("own encoding decodes");
    assert_eq!(decoded, ba);
});
