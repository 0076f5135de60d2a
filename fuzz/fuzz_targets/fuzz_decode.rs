#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode or fail cleanly, never panic.
    let _ = zenrle::decode(data, zenrle::Unstoppable);

    let limits = zenrle::Limits {
        max_pixels: Some(1 << 20),
        max_memory_bytes: Some(1 << 22),
        ..Default::default()
    };
    let _ = zenrle::decode_with_limits(data, &limits, zenrle::Unstoppable);
});
