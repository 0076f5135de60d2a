#![no_main]
use libfuzzer_sys::fuzz_target;

use zenrle::{decode, encode, BackgroundMode, Header, Image, Unstoppable};

fuzz_target!(|data: &[u8]| {
    // Interpret the fuzzer input as image geometry plus pixel content and
    // assert that every mode roundtrips pixel-for-pixel.
    if data.len() < 4 {
        return;
    }
    let width = u32::from(data[0] % 32) + 1;
    let height = u32::from(data[1] % 32) + 1;
    let ncolors = data[2] % 4 + 1;
    let alpha = data[3] & 1 != 0;
    let body = &data[4..];

    let mut header = Header::new(width, height, ncolors);
    if alpha {
        header = header.with_alpha();
    }
    let channels = header.channels();
    let len = (width * height) as usize * channels;
    let mut pixels = vec![0u8; len];
    for (i, p) in pixels.iter_mut().enumerate() {
        if let Some(&b) = body.get(i % body.len().max(1)) {
            *p = b.wrapping_add((i / body.len().max(1)) as u8);
        }
    }
    let background: Vec<u8> = (0..ncolors).map(|c| c.wrapping_mul(40)).collect();
    let image = Image::from_pixels(header.with_background(&background), pixels).unwrap();

    for mode in [
        BackgroundMode::SaveAll,
        BackgroundMode::Overlay,
        BackgroundMode::Clear,
    ] {
        let encoded = encode(&image, mode, Unstoppable).unwrap();
        let decoded = decode(&encoded, Unstoppable).unwrap();
        assert_eq!(decoded.image.pixels(), image.pixels());
    }
});
