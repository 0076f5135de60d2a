//! # zenrle
//!
//! Utah Raster Toolkit RLE image format decoder and encoder.
//!
//! The RLE format stores raster images as a stream of per-channel scanline
//! opcodes: runs, literals, and skips against an optional background
//! color, with optional alpha, colormap, and free-form comments. Streams
//! written here are bit-compatible with the historical Utah Raster
//! Toolkit, including its quirks (big-endian colormap entries on either
//! stream byte order, 16-bit run values with a dead high byte, odd-length
//! literal padding).
//!
//! ## Decoding
//!
//! [`decode`] consumes one complete image from a byte slice and returns
//! the pixel grid (row-major, top-to-bottom, channels interleaved)
//! together with the stream's detected byte order:
//!
//! ```
//! use enough::Never;
//! use zenrle::{decode, encode, BackgroundMode, Header, Image};
//!
//! let header = Header::new(2, 1, 3);
//! let image = Image::from_pixels(header, vec![255, 0, 0, 0, 255, 0])?;
//!
//! let encoded = encode(&image, BackgroundMode::SaveAll, Never)?;
//! let decoded = decode(&encoded, Never)?;
//! assert_eq!(decoded.image.pixels(), image.pixels());
//! # Ok::<(), zenrle::RleError>(())
//! ```
//!
//! ## Encoding modes
//!
//! [`BackgroundMode`] selects how pixels matching the declared background
//! are handled: `SaveAll` writes everything literally, `Overlay` elides
//! background spans and rows, and `Clear` additionally hints that the
//! frame buffer should be cleared first.
//!
//! ## Limits and cancellation
//!
//! Hard caps on dimensions and allocations are always enforced; callers
//! can tighten them with [`Limits`]. Every decode/encode call takes an
//! [`enough::Stop`] and aborts with `RleError::Cancelled` when it fires;
//! pass [`Never`] to opt out.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod decode;
mod encode;
mod error;
mod header;
mod image;
mod limits;
mod opcode;
mod stream;

#[cfg(feature = "std")]
mod io;

pub use decode::{decode, decode_with_limits, DecodeOutput};
pub use encode::{encode, encode_with_endian, BackgroundMode};
pub use enough::{Stop, Never};
pub use error::RleError;
pub use header::{
    Header, FLAG_ALPHA, FLAG_CLEAR_FIRST, FLAG_COMMENT, FLAG_NO_BACKGROUND, RLE_MAGIC,
};
pub use image::Image;
pub use limits::{
    Limits, MAX_ALLOC_BYTES, MAX_COMMENTS_BYTES, MAX_DIM, MAX_OPS_PER_ROW, MAX_PIXELS,
};
pub use stream::Endian;

#[cfg(feature = "std")]
pub use io::{decode_from, decode_from_with_limits, encode_to};

/// Probe the two-byte magic, returning the stream's byte order.
///
/// Returns `None` if `data` is shorter than two bytes or does not start
/// with the RLE magic in either byte order.
pub fn detect_endian(data: &[u8]) -> Option<Endian> {
    let magic = [*data.first()?, *data.get(1)?];
    if u16::from_le_bytes(magic) == RLE_MAGIC {
        Some(Endian::Little)
    } else if u16::from_be_bytes(magic) == RLE_MAGIC {
        Some(Endian::Big)
    } else {
        None
    }
}
