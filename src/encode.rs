//! Encoder planner: walks the grid bottom-to-top and chooses, per channel,
//! which spans become runs, which become literals, and which are elided
//! against the declared background.

use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;

use crate::error::RleError;
use crate::header::{Header, FLAG_CLEAR_FIRST, FLAG_NO_BACKGROUND};
use crate::image::Image;
use crate::opcode::{
    ALPHA_CHANNEL, LONG_OP, OP_BYTE_DATA, OP_EOF, OP_RUN_DATA, OP_SET_COLOR, OP_SKIP_LINES,
    OP_SKIP_PIXELS, RUN_THRESHOLD,
};
use crate::stream::{ByteWriter, Endian};

/// How the encoder treats pixels that match the declared background.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackgroundMode {
    /// Emit every pixel literally and declare no background. Never skips.
    #[default]
    SaveAll,
    /// Elide background spans with `SkipPixels` and all-background rows
    /// with `SkipLines`; the background stays declared in the header.
    Overlay,
    /// As `Overlay`, plus the `CLEAR_FIRST` hint in the header.
    Clear,
}

/// Encode `image` in the host's byte order.
pub fn encode(image: &Image, mode: BackgroundMode, stop: impl Stop) -> Result<Vec<u8>, RleError> {
    encode_inner(image, mode, Endian::native(), &stop)
}

/// Encode `image` in an explicit byte order.
pub fn encode_with_endian(
    image: &Image,
    mode: BackgroundMode,
    endian: Endian,
    stop: impl Stop,
) -> Result<Vec<u8>, RleError> {
    encode_inner(image, mode, endian, &stop)
}

fn encode_inner(
    image: &Image,
    mode: BackgroundMode,
    endian: Endian,
    stop: &dyn Stop,
) -> Result<Vec<u8>, RleError> {
    let header = wire_header(image.header(), mode)?;
    header.validate()?;

    let samples = usize::try_from(header.sample_count()).map_err(|_| RleError::AllocTooLarge)?;
    let pixels = image.pixels();
    if pixels.len() < samples {
        return Err(RleError::BufferTooSmall {
            needed: samples,
            actual: pixels.len(),
        });
    }
    stop.check()?;

    let mut out = ByteWriter::with_capacity(samples + 64);
    header.write(&mut out, endian)?;

    let width = header.xlen as usize;
    let height = header.ylen as usize;
    let ncolors = header.ncolors as usize;
    let channels = header.channels();
    let elide = mode != BackgroundMode::SaveAll;
    let background = &header.background;

    let mut scratch = vec![0u8; width];
    let mut pending_rows = 0usize;

    for wire_row in 0..height {
        if wire_row % 16 == 0 {
            stop.check()?;
        }
        let mem_row = height - 1 - wire_row;
        let row = &pixels[mem_row * width * channels..(mem_row + 1) * width * channels];

        if elide && row_is_background(row, channels, ncolors, background) {
            pending_rows += 1;
            continue;
        }
        if pending_rows > 0 {
            put_count_op(&mut out, endian, OP_SKIP_LINES, pending_rows);
            pending_rows = 0;
        }

        for c in 0..channels {
            for (i, px) in row.chunks_exact(channels).enumerate() {
                scratch[i] = px[c];
            }
            let channel_bg = if !elide {
                None
            } else if c < ncolors {
                Some(background[c])
            } else {
                Some(0)
            };
            // A wholly elided channel emits nothing, except channel 0,
            // whose SetColor doubles as the row advance.
            if c != 0 && channel_bg.is_some_and(|bg| scratch.iter().all(|&s| s == bg)) {
                continue;
            }
            let wire_channel = if c < ncolors {
                c as u8
            } else {
                ALPHA_CHANNEL
            };
            out.put_u8(OP_SET_COLOR);
            out.put_u8(wire_channel);
            put_spans(&mut out, endian, &scratch, channel_bg);
        }
    }

    if pending_rows > 0 {
        put_count_op(&mut out, endian, OP_SKIP_LINES, pending_rows);
    }
    out.put_u8(OP_EOF);

    Ok(out.into_inner())
}

/// The header as written: `SaveAll` drops the background and declares
/// `NO_BACKGROUND`; `Overlay`/`Clear` require one; `Clear` adds the
/// `CLEAR_FIRST` hint.
fn wire_header(src: &Header, mode: BackgroundMode) -> Result<Header, RleError> {
    let mut header = src.clone();
    match mode {
        BackgroundMode::SaveAll => {
            header.background.clear();
            header.flags |= FLAG_NO_BACKGROUND;
        }
        BackgroundMode::Overlay | BackgroundMode::Clear => {
            if header.background.is_empty() {
                return Err(RleError::InvalidBgBlock);
            }
            header.flags &= !FLAG_NO_BACKGROUND;
            if mode == BackgroundMode::Clear {
                header.flags |= FLAG_CLEAR_FIRST;
            }
        }
    }
    Ok(header)
}

/// Whether every color sample in `row` matches the background and every
/// alpha sample is zero.
fn row_is_background(row: &[u8], channels: usize, ncolors: usize, background: &[u8]) -> bool {
    row.chunks_exact(channels)
        .all(|px| px[..ncolors] == *background && px[ncolors..].iter().all(|&a| a == 0))
}

// ── Per-channel span planning ───────────────────────────────────────

/// Greedy span classification over one channel of one row: background
/// skips first, then runs, then the longest literal up to the next
/// qualifying span. Trailing background is left to the decoder's pre-fill.
fn put_spans(out: &mut ByteWriter, endian: Endian, samples: &[u8], background: Option<u8>) {
    let len = samples.len();
    let mut x = 0;
    while x < len {
        if let Some(bg) = background {
            let skip = run_len(samples, x, bg);
            if skip >= RUN_THRESHOLD {
                if x + skip == len {
                    break;
                }
                put_count_op(out, endian, OP_SKIP_PIXELS, skip);
                x += skip;
                continue;
            }
        }
        let run = run_len(samples, x, samples[x]);
        if run >= RUN_THRESHOLD {
            put_run_data(out, endian, run, samples[x]);
            x += run;
            continue;
        }
        let lit = literal_len(samples, x);
        put_byte_data(out, endian, &samples[x..x + lit]);
        x += lit;
    }
}

/// Length of the span of `value` starting at `x`.
fn run_len(samples: &[u8], x: usize, value: u8) -> usize {
    samples[x..].iter().take_while(|&&s| s == value).count()
}

/// Length of the literal starting at `x`: it ends just before the next
/// three equal samples, which the caller will emit as a run or skip.
fn literal_len(samples: &[u8], x: usize) -> usize {
    let len = samples.len();
    let mut end = x + 1;
    while end < len {
        if end + RUN_THRESHOLD <= len {
            let window = &samples[end..end + RUN_THRESHOLD];
            if window[1] == window[0] && window[2] == window[0] {
                break;
            }
        }
        end += 1;
    }
    end - x
}

// ── Opcode emission ─────────────────────────────────────────────────

/// Emit `SkipLines`/`SkipPixels`, whose operands carry the count
/// directly: short form up to 255, long form up to 65535, split beyond.
fn put_count_op(out: &mut ByteWriter, endian: Endian, base: u8, count: usize) {
    debug_assert!(count > 0);
    let mut left = count;
    while left > 0 {
        let take = left.min(u16::MAX as usize);
        if take <= u8::MAX as usize {
            out.put_u8(base);
            out.put_u8(take as u8);
        } else {
            out.put_u8(base | LONG_OP);
            out.put_u16(take as u16, endian);
        }
        left -= take;
    }
}

/// Emit `RunData`, operand `count - 1`, followed by the 16-bit value
/// operand whose high byte is written as zero.
fn put_run_data(out: &mut ByteWriter, endian: Endian, count: usize, value: u8) {
    let mut left = count;
    while left > 0 {
        let take = left.min(1 << 16);
        if take <= 256 {
            out.put_u8(OP_RUN_DATA);
            out.put_u8((take - 1) as u8);
        } else {
            out.put_u8(OP_RUN_DATA | LONG_OP);
            out.put_u16((take - 1) as u16, endian);
        }
        out.put_u16(u16::from(value), endian);
        left -= take;
    }
}

/// Emit `ByteData`, operand `count - 1`, samples, and the filler byte
/// after an odd-length chunk.
fn put_byte_data(out: &mut ByteWriter, endian: Endian, data: &[u8]) {
    for chunk in data.chunks(1 << 16) {
        let n = chunk.len();
        if n <= 256 {
            out.put_u8(OP_BYTE_DATA);
            out.put_u8((n - 1) as u8);
        } else {
            out.put_u8(OP_BYTE_DATA | LONG_OP);
            out.put_u16((n - 1) as u16, endian);
        }
        out.put_bytes(chunk);
        out.pad_if_odd(n);
    }
}
