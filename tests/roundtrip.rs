//! Roundtrip tests: encode/decode across modes, byte orders, channel
//! counts, and boundary dimensions.

use enough::Never;
use zenrle::*;

fn rgb_image(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 3]) -> Image {
    let mut pixels = vec![0u8; (width * height * 3) as usize];
    for y in 0..height {
        for x in 0..width {
            let off = ((y * width + x) * 3) as usize;
            pixels[off..off + 3].copy_from_slice(&f(x, y));
        }
    }
    Image::from_pixels(Header::new(width, height, 3), pixels).unwrap()
}

fn noise_pattern(len: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; len];
    let mut state: u32 = 0xDEAD_BEEF;
    for p in pixels.iter_mut() {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        *p = state as u8;
    }
    pixels
}

fn roundtrip(image: &Image, mode: BackgroundMode) -> DecodeOutput {
    let encoded = encode(image, mode, Never).unwrap();
    decode(&encoded, Never).unwrap()
}

#[test]
fn solid_rgb_save_all() {
    let image = rgb_image(4, 4, |_, _| [128, 128, 128]);
    let decoded = roundtrip(&image, BackgroundMode::SaveAll);
    assert_eq!(decoded.image.pixels(), &[128u8; 48][..]);
    assert_eq!(decoded.image.width(), 4);
    assert_eq!(decoded.image.height(), 4);
    assert_eq!(decoded.image.channels(), 3);
}

#[test]
fn vertical_gradient_keeps_row_order() {
    // Row y carries green y*64; the wire stores rows bottom-to-top, so a
    // codec that forgets the flip swaps the gradient.
    let image = rgb_image(4, 4, |_, y| [0, (y * 64) as u8, 0]);
    let decoded = roundtrip(&image, BackgroundMode::SaveAll);
    assert_eq!(decoded.image.pixels(), image.pixels());
    for y in 0..4u32 {
        for x in 0..4u32 {
            let off = ((y * 4 + x) * 3) as usize;
            assert_eq!(decoded.image.pixels()[off + 1], (y * 64) as u8);
        }
    }
}

#[test]
fn overlay_elides_background_rows() {
    let bg = [100u8, 150, 200];
    let image = rgb_image(10, 20, |_, y| match y {
        0..=4 => [50, 75, 25],
        5..=14 => bg,
        _ => [200, 100, 50],
    })
    .header_into_background(&bg);

    let decoded = roundtrip(&image, BackgroundMode::Overlay);
    assert_eq!(decoded.image.pixels(), image.pixels());
    assert_eq!(decoded.image.header().background, bg.to_vec());
}

#[test]
fn rgba_roundtrips_alpha_exactly() {
    let alpha = [128u8, 192, 64, 255];
    let mut pixels = Vec::new();
    for (i, &a) in alpha.iter().enumerate() {
        pixels.extend_from_slice(&[i as u8 * 3 + 1, i as u8 * 3 + 2, i as u8 * 3 + 3, a]);
    }
    let image = Image::from_pixels(Header::new(2, 2, 3).with_alpha(), pixels).unwrap();

    let decoded = roundtrip(&image, BackgroundMode::SaveAll);
    assert!(decoded.image.header().has_alpha());
    assert_eq!(decoded.image.channels(), 4);
    assert_eq!(decoded.image.pixels(), image.pixels());
}

#[test]
fn checkerboard_roundtrips() {
    let image = rgb_image(64, 64, |x, y| {
        let v = if (x + y) % 2 == 0 { 0 } else { 255 };
        [v, v, v]
    });
    let decoded = roundtrip(&image, BackgroundMode::SaveAll);
    assert_eq!(decoded.image.pixels(), image.pixels());
}

#[test]
fn single_pixel() {
    let image = rgb_image(1, 1, |_, _| [9, 8, 7]);
    let decoded = roundtrip(&image, BackgroundMode::SaveAll);
    assert_eq!(decoded.image.pixels(), &[9, 8, 7][..]);
}

#[test]
fn max_width_single_row() {
    let pixels: Vec<u8> = (0..65_535u32).map(|x| x as u8).collect();
    let image = Image::from_pixels(Header::new(65_535, 1, 1), pixels.clone()).unwrap();
    let decoded = roundtrip(&image, BackgroundMode::SaveAll);
    assert_eq!(decoded.image.pixels(), &pixels[..]);
}

#[test]
fn tall_image_with_long_background_gap() {
    let column: Vec<u8> = (0..300u32)
        .map(|y| match y {
            0..=19 => 9,
            20..=279 => 7,
            _ => 3,
        })
        .collect();
    let image =
        Image::from_pixels(Header::new(1, 300, 1).with_background(&[7]), column.clone()).unwrap();
    let decoded = roundtrip(&image, BackgroundMode::Overlay);
    assert_eq!(decoded.image.pixels(), &column[..]);
}

#[test]
fn max_height_all_background_column() {
    let image = Image::from_pixels(
        Header::new(1, 65_535, 1).with_background(&[6]),
        vec![6u8; 65_535],
    )
    .unwrap();
    let encoded = encode(&image, BackgroundMode::Overlay, Never).unwrap();
    let decoded = decode(&encoded, Never).unwrap();
    assert_eq!(decoded.image.pixels(), image.pixels());
}

#[test]
fn grayscale_noise() {
    let pixels = noise_pattern(16 * 12);
    let image = Image::from_pixels(Header::new(16, 12, 1), pixels.clone()).unwrap();
    let decoded = roundtrip(&image, BackgroundMode::SaveAll);
    assert_eq!(decoded.image.pixels(), &pixels[..]);
}

#[test]
fn two_channel_image_is_ordinary() {
    let pixels = noise_pattern(9 * 5 * 2);
    let image = Image::from_pixels(Header::new(9, 5, 2), pixels.clone()).unwrap();
    let decoded = roundtrip(&image, BackgroundMode::SaveAll);
    assert_eq!(decoded.image.pixels(), &pixels[..]);
}

#[test]
fn two_channel_with_background_pads_bg_block() {
    // ncolors=2 makes the background block 3 bytes long, exercising its
    // filler byte on both sides.
    let mut pixels = noise_pattern(6 * 4 * 2);
    for px in pixels.chunks_exact_mut(2).take(12) {
        px.copy_from_slice(&[40, 41]);
    }
    let image =
        Image::from_pixels(Header::new(6, 4, 2).with_background(&[40, 41]), pixels.clone())
            .unwrap();
    let decoded = roundtrip(&image, BackgroundMode::Overlay);
    assert_eq!(decoded.image.pixels(), &pixels[..]);
}

#[test]
fn both_byte_orders_decode_identically() {
    let pixels = noise_pattern(11 * 7 * 3);
    let image = Image::from_pixels(Header::new(11, 7, 3), pixels.clone()).unwrap();

    for endian in [Endian::Little, Endian::Big] {
        let encoded =
            encode_with_endian(&image, BackgroundMode::SaveAll, endian, Never).unwrap();
        assert_eq!(detect_endian(&encoded), Some(endian));
        let decoded = decode(&encoded, Never).unwrap();
        assert_eq!(decoded.endian, endian);
        assert_eq!(decoded.image.pixels(), &pixels[..]);
    }
}

#[test]
fn all_background_image_decodes_from_prefill() {
    let bg = [100u8, 150, 200];
    let image = rgb_image(8, 8, |_, _| bg).header_into_background(&bg);
    let encoded = encode(&image, BackgroundMode::Overlay, Never).unwrap();
    let decoded = decode(&encoded, Never).unwrap();
    assert_eq!(decoded.image.pixels(), image.pixels());
}

#[test]
fn clear_mode_matches_overlay_pixels_and_sets_flag() {
    let bg = [10u8, 20, 30];
    let image = rgb_image(6, 6, |x, y| if (x + y) % 3 == 0 { [1, 2, 3] } else { bg })
        .header_into_background(&bg);

    let overlay = encode(&image, BackgroundMode::Overlay, Never).unwrap();
    let clear = encode(&image, BackgroundMode::Clear, Never).unwrap();

    let decoded = decode(&clear, Never).unwrap();
    assert_eq!(decoded.image.pixels(), image.pixels());
    assert_ne!(decoded.image.header().flags & FLAG_CLEAR_FIRST, 0);

    let overlay_decoded = decode(&overlay, Never).unwrap();
    assert_eq!(overlay_decoded.image.pixels(), decoded.image.pixels());
}

#[test]
fn alpha_with_overlay_elides_transparent_background() {
    let bg = [1u8, 2, 3];
    let mut pixels = vec![0u8; 4 * 8 * 4];
    for (y, row) in pixels.chunks_exact_mut(4 * 4).enumerate() {
        for px in row.chunks_exact_mut(4) {
            if y < 2 {
                px.copy_from_slice(&[200, 201, 202, 255]);
            } else {
                px.copy_from_slice(&[1, 2, 3, 0]);
            }
        }
    }
    let image = Image::from_pixels(
        Header::new(4, 8, 3).with_alpha().with_background(&bg),
        pixels.clone(),
    )
    .unwrap();
    let decoded = roundtrip(&image, BackgroundMode::Overlay);
    assert_eq!(decoded.image.pixels(), &pixels[..]);
}

#[test]
fn comments_roundtrip_without_trailing_nuls() {
    // 15 block bytes total, forcing the comment block's filler byte.
    let comments = vec!["image=teapot".to_string(), "x".to_string()];
    let mut image = rgb_image(3, 3, |x, _| [x as u8, 0, 0]);
    image.header_mut().comments = comments.clone();

    let decoded = roundtrip(&image, BackgroundMode::SaveAll);
    assert_eq!(decoded.image.header().comments, comments);
}

#[test]
fn colormap_roundtrips_verbatim() {
    let mut image = rgb_image(2, 2, |_, _| [5, 6, 7]);
    {
        let header = image.header_mut();
        header.ncmap = 3;
        header.cmaplen = 8;
        header.colormap = (0..3 * 256u16).map(|i| i.wrapping_mul(3)).collect();
    }

    for endian in [Endian::Little, Endian::Big] {
        let encoded =
            encode_with_endian(&image, BackgroundMode::SaveAll, endian, Never).unwrap();
        let decoded = decode(&encoded, Never).unwrap();
        assert_eq!(decoded.image.header().colormap, image.header().colormap);
    }
}

#[test]
fn canvas_position_is_preserved() {
    let mut image = rgb_image(4, 2, |x, y| [x as u8, y as u8, 0]);
    image.header_mut().xpos = -5;
    image.header_mut().ypos = 12;

    let decoded = roundtrip(&image, BackgroundMode::SaveAll);
    assert_eq!(decoded.image.header().xpos, -5);
    assert_eq!(decoded.image.header().ypos, 12);
    assert_eq!(decoded.image.pixels(), image.pixels());
}

#[test]
fn noise_roundtrips_in_every_mode() {
    let bg = [77u8, 78, 79];
    let pixels = noise_pattern(13 * 7 * 3);
    let image =
        Image::from_pixels(Header::new(13, 7, 3).with_background(&bg), pixels.clone()).unwrap();

    for mode in [
        BackgroundMode::SaveAll,
        BackgroundMode::Overlay,
        BackgroundMode::Clear,
    ] {
        let decoded = roundtrip(&image, mode);
        assert_eq!(decoded.image.pixels(), &pixels[..], "mode {mode:?}");
    }
}

#[test]
fn reencoding_a_decoded_stream_preserves_pixels() {
    let bg = [100u8, 150, 200];
    let image = rgb_image(10, 20, |_, y| if (5..15).contains(&y) { bg } else { [50, 75, 25] })
        .header_into_background(&bg);

    let overlay = encode(&image, BackgroundMode::Overlay, Never).unwrap();
    let first = decode(&overlay, Never).unwrap();
    let save_all = encode(&first.image, BackgroundMode::SaveAll, Never).unwrap();
    let second = decode(&save_all, Never).unwrap();
    assert_eq!(second.image.pixels(), first.image.pixels());
}

#[test]
fn limits_reject_large_images() {
    let image = rgb_image(2, 2, |_, _| [1, 1, 1]);
    let encoded = encode(&image, BackgroundMode::SaveAll, Never).unwrap();
    let limits = Limits {
        max_pixels: Some(1),
        ..Default::default()
    };
    match decode_with_limits(&encoded, &limits, Never) {
        Err(RleError::LimitExceeded(_)) => {}
        other => panic!("expected LimitExceeded, got {other:?}"),
    }
}

#[test]
fn overlay_without_background_is_rejected() {
    let image = rgb_image(2, 2, |_, _| [1, 1, 1]);
    match encode(&image, BackgroundMode::Overlay, Never) {
        Err(RleError::InvalidBgBlock) => {}
        other => panic!("expected InvalidBgBlock, got {other:?}"),
    }
}

// Helper to rebuild an image with a background-declaring header without
// repeating the pixel plumbing at every call site.
trait WithBackground {
    fn header_into_background(self, bg: &[u8]) -> Image;
}

impl WithBackground for Image {
    fn header_into_background(self, bg: &[u8]) -> Image {
        let header = self.header().clone().with_background(bg);
        Image::from_pixels(header, self.into_pixels()).unwrap()
    }
}
