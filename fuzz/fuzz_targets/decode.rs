#![no_main]
use libfuzzer_sys::fuzz_target;
use rbits::Bitmap;

fuzz_target!(|data: &[u8]| {
    // Anything the decoder accepts must re-encode to the same bytes.
    if let Ok(b) = Bitmap::from_bytes(data) {
        assert_eq!(b.serialized_size(), data.len());
        assert_eq!(b.to_bytes(), data);
    }
});
