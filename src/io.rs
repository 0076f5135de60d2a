//! Blocking adapters over `std::io` byte streams.
//!
//! The codec itself is slice-based; these helpers read a whole stream into
//! memory or push encoded bytes out, mapping stream failures to
//! [`RleError::ReadError`] / [`RleError::WriteError`].

use std::io::{Read, Write};

use enough::Stop;

use crate::decode::DecodeOutput;
use crate::encode::BackgroundMode;
use crate::error::RleError;
use crate::image::Image;
use crate::limits::Limits;

/// Read a complete RLE stream from `reader` and decode it.
pub fn decode_from<R: Read>(mut reader: R, stop: impl Stop) -> Result<DecodeOutput, RleError> {
    let mut data = Vec::new();
    reader
        .read_to_end(&mut data)
        .map_err(RleError::ReadError)?;
    crate::decode(&data, stop)
}

/// Read and decode with caller-supplied resource limits.
pub fn decode_from_with_limits<R: Read>(
    mut reader: R,
    limits: &Limits,
    stop: impl Stop,
) -> Result<DecodeOutput, RleError> {
    let mut data = Vec::new();
    reader
        .read_to_end(&mut data)
        .map_err(RleError::ReadError)?;
    crate::decode_with_limits(&data, limits, stop)
}

/// Encode `image` and write the stream to `writer`.
pub fn encode_to<W: Write>(
    mut writer: W,
    image: &Image,
    mode: BackgroundMode,
    stop: impl Stop,
) -> Result<(), RleError> {
    let bytes = crate::encode(image, mode, stop)?;
    writer.write_all(&bytes).map_err(RleError::WriteError)?;
    Ok(())
}
