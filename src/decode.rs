//! Opcode stream decoder: drives the scanline cursor over the pixel grid.
//!
//! The cursor is `(wire_row, channel, x)`. Wire rows run bottom-to-top, so
//! wire row `w` lands in memory row `ylen - 1 - w`; x positions map
//! one-to-one. Writes past the right edge or below the last wire row are
//! discarded while their bytes are still consumed, keeping the stream
//! aligned.

use enough::Stop;

use crate::error::RleError;
use crate::header::Header;
use crate::image::Image;
use crate::limits::{Limits, MAX_OPS_PER_ROW};
use crate::opcode::{
    will_advance_row, ALPHA_CHANNEL, LONG_OP, OP_BYTE_DATA, OP_EOF, OP_RUN_DATA, OP_SET_COLOR,
    OP_SKIP_LINES, OP_SKIP_PIXELS,
};
use crate::stream::{ByteReader, Endian};

/// A fully decoded image together with the byte order it was read in.
/// Comments, background, and colormap are on `image.header()`.
#[derive(Clone, Debug)]
pub struct DecodeOutput {
    pub image: Image,
    pub endian: Endian,
}

/// Decode one complete RLE image, including its terminating `Eof`.
/// Bytes past the `Eof` are left untouched.
pub fn decode(data: &[u8], stop: impl Stop) -> Result<DecodeOutput, RleError> {
    decode_inner(data, None, &stop)
}

/// Decode with caller-supplied resource limits.
pub fn decode_with_limits(
    data: &[u8],
    limits: &Limits,
    stop: impl Stop,
) -> Result<DecodeOutput, RleError> {
    decode_inner(data, Some(limits), &stop)
}

fn decode_inner(
    data: &[u8],
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<DecodeOutput, RleError> {
    let mut bytes = ByteReader::new(data);
    let (header, endian) = Header::read(&mut bytes)?;

    if let Some(limits) = limits {
        limits.check(header.xlen, header.ylen)?;
        limits.check_memory(header.sample_count())?;
    }
    stop.check()?;

    let mut image = Image::new(header)?;
    {
        let (header, pixels) = image.parts_mut();
        prefill(header, pixels);

        let mut state = DecoderState {
            bytes,
            endian,
            width: header.xlen,
            height: header.ylen,
            channels: header.channels(),
            ncolors: header.ncolors as usize,
            has_alpha: header.has_alpha(),
            pixels,
            wire_row: 0,
            channel: None,
            x: 0,
            ops: 0,
            max_ops: MAX_OPS_PER_ROW * u64::from(header.xlen) * u64::from(header.ylen),
        };
        state.run(stop)?;
    }

    Ok(DecodeOutput { image, endian })
}

/// Initialise the grid so that elided spans come back as the declared
/// background (alpha has none and stays zero). Without a background the
/// grid stays zero.
fn prefill(header: &Header, pixels: &mut [u8]) {
    if header.background.is_empty() {
        return;
    }
    let ncolors = header.ncolors as usize;
    for px in pixels.chunks_exact_mut(header.channels()) {
        px[..ncolors].copy_from_slice(&header.background);
    }
}

// ── Decoder state machine ───────────────────────────────────────────

struct DecoderState<'a, 'p> {
    bytes: ByteReader<'a>,
    endian: Endian,
    width: u32,
    height: u32,
    channels: usize,
    ncolors: usize,
    has_alpha: bool,
    pixels: &'p mut [u8],
    /// Wire row index relative to `ypos`; row 0 is the bottom of the image.
    wire_row: u32,
    /// Wire channel id selected by the last `SetColor`.
    channel: Option<u8>,
    /// Column index relative to `xpos`.
    x: u32,
    ops: u64,
    max_ops: u64,
}

impl DecoderState<'_, '_> {
    fn run(&mut self, stop: &dyn Stop) -> Result<(), RleError> {
        loop {
            let op = self.bytes.read_u8().ok_or(RleError::TruncatedOpcode)?;
            self.ops += 1;
            if self.ops > self.max_ops {
                return Err(RleError::OpCountExceeded);
            }
            if self.ops & 0x3FF == 0 {
                stop.check()?;
            }

            let long = op & LONG_OP != 0;
            match op & !LONG_OP {
                OP_SKIP_LINES => {
                    let lines = self.operand(long)?;
                    // Leaving a partially traversed row costs one extra line.
                    if self.channel.is_some() {
                        self.bump_rows(1)?;
                    }
                    self.bump_rows(lines)?;
                    self.channel = None;
                    self.x = 0;
                }
                OP_SET_COLOR => {
                    if long {
                        return Err(RleError::OpcodeUnknown);
                    }
                    let ch = self.bytes.read_u8().ok_or(RleError::TruncatedOpcode)?;
                    if will_advance_row(self.channel, ch) {
                        self.bump_rows(1)?;
                    }
                    self.channel = Some(ch);
                    self.x = 0;
                }
                OP_SKIP_PIXELS => {
                    let pixels = self.operand(long)?;
                    self.bump_x(pixels)?;
                }
                OP_BYTE_DATA => {
                    let count = self.operand(long)? + 1;
                    let data = self
                        .bytes
                        .read_bytes(count as usize)
                        .ok_or(RleError::TruncatedOpcode)?;
                    self.write_literal(data);
                    self.bytes
                        .pad_if_odd(count as usize)
                        .ok_or(RleError::TruncatedOpcode)?;
                    self.bump_x(count)?;
                }
                OP_RUN_DATA => {
                    let count = self.operand(long)? + 1;
                    let value = self
                        .bytes
                        .read_u16(self.endian)
                        .ok_or(RleError::TruncatedOpcode)? as u8;
                    self.write_run(count, value);
                    self.bump_x(count)?;
                }
                OP_EOF => return Ok(()),
                _ => return Err(RleError::OpcodeUnknown),
            }
        }
    }

    fn operand(&mut self, long: bool) -> Result<u32, RleError> {
        let operand = if long {
            self.bytes.read_u16(self.endian).map(u32::from)
        } else {
            self.bytes.read_u8().map(u32::from)
        };
        operand.ok_or(RleError::TruncatedOpcode)
    }

    fn bump_rows(&mut self, n: u32) -> Result<(), RleError> {
        self.wire_row = self
            .wire_row
            .checked_add(n)
            .ok_or(RleError::OpcodeOverflow)?;
        Ok(())
    }

    fn bump_x(&mut self, n: u32) -> Result<(), RleError> {
        self.x = self.x.checked_add(n).ok_or(RleError::OpcodeOverflow)?;
        Ok(())
    }

    /// Base offset of the current memory row and the sample slot for the
    /// current channel, or `None` when writes land in the discard sink
    /// (past the last row, channel out of range, or no channel selected).
    fn target(&self) -> Option<(usize, usize)> {
        if self.wire_row >= self.height {
            return None;
        }
        let slot = match self.channel {
            Some(ALPHA_CHANNEL) if self.has_alpha => self.ncolors,
            Some(ch) if (ch as usize) < self.ncolors => ch as usize,
            _ => return None,
        };
        let mem_row = (self.height - 1 - self.wire_row) as usize;
        Some((mem_row * self.width as usize * self.channels, slot))
    }

    fn write_literal(&mut self, data: &[u8]) {
        let Some((row_base, slot)) = self.target() else {
            return;
        };
        let width = self.width as usize;
        let x = self.x as usize;
        if x >= width {
            return;
        }
        let writable = data.len().min(width - x);
        for (i, &value) in data[..writable].iter().enumerate() {
            self.pixels[row_base + (x + i) * self.channels + slot] = value;
        }
    }

    fn write_run(&mut self, count: u32, value: u8) {
        let Some((row_base, slot)) = self.target() else {
            return;
        };
        let width = self.width as usize;
        let x = self.x as usize;
        if x >= width {
            return;
        }
        let writable = (count as usize).min(width - x);
        for i in 0..writable {
            self.pixels[row_base + (x + i) * self.channels + slot] = value;
        }
    }
}
