//! Owned pixel grid: a header plus one tightly packed sample buffer.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::RleError;
use crate::header::Header;

#[cfg(feature = "rgb")]
use rgb::{AsPixels as _, ComponentBytes as _};

/// An image and its header, with samples stored row-major, top-to-bottom,
/// channels interleaved per pixel: `pixels[(y * width + x) * channels + c]`.
///
/// The buffer is owned exclusively; copies are explicit via [`Clone`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    header: Header,
    pixels: Vec<u8>,
}

impl Image {
    /// Allocate a zero-filled image for `header`.
    pub fn new(header: Header) -> Result<Self, RleError> {
        header.validate()?;
        let len = usize::try_from(header.sample_count()).map_err(|_| RleError::AllocTooLarge)?;
        Ok(Image {
            header,
            pixels: vec![0u8; len],
        })
    }

    /// Take ownership of an existing interleaved buffer.
    ///
    /// The buffer must hold at least `width × height × channels` bytes;
    /// anything beyond that is truncated away.
    pub fn from_pixels(header: Header, mut pixels: Vec<u8>) -> Result<Self, RleError> {
        header.validate()?;
        let needed = usize::try_from(header.sample_count()).map_err(|_| RleError::AllocTooLarge)?;
        if pixels.len() < needed {
            return Err(RleError::BufferTooSmall {
                needed,
                actual: pixels.len(),
            });
        }
        pixels.truncate(needed);
        Ok(Image { header, pixels })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Mutable header access, for attaching comments or a colormap after
    /// construction. Dimension and channel fields must be left untouched;
    /// encoding re-validates them against the buffer.
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    pub fn width(&self) -> u32 {
        self.header.xlen
    }

    pub fn height(&self) -> u32 {
        self.header.ylen
    }

    pub fn channels(&self) -> usize {
        self.header.channels()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Simultaneous header view and mutable pixel access.
    pub(crate) fn parts_mut(&mut self) -> (&Header, &mut [u8]) {
        (&self.header, &mut self.pixels)
    }
}

// ── Typed pixel views ───────────────────────────────────────────────

#[cfg(feature = "rgb")]
impl Image {
    /// View as RGB pixels; `None` unless the image is exactly three color
    /// channels without alpha.
    pub fn as_rgb(&self) -> Option<&[rgb::RGB8]> {
        (self.header.ncolors == 3 && !self.header.has_alpha()).then(|| self.pixels.as_pixels())
    }

    /// View as RGBA pixels; `None` unless the image is three color
    /// channels plus alpha.
    pub fn as_rgba(&self) -> Option<&[rgb::RGBA8]> {
        (self.header.ncolors == 3 && self.header.has_alpha()).then(|| self.pixels.as_pixels())
    }

    /// Build an RGB image from typed pixels.
    pub fn from_rgb(pixels: &[rgb::RGB8], width: u32, height: u32) -> Result<Self, RleError> {
        Image::from_pixels(Header::new(width, height, 3), pixels.as_bytes().to_vec())
    }

    /// Build an RGBA image from typed pixels.
    pub fn from_rgba(pixels: &[rgb::RGBA8], width: u32, height: u32) -> Result<Self, RleError> {
        Image::from_pixels(
            Header::new(width, height, 3).with_alpha(),
            pixels.as_bytes().to_vec(),
        )
    }
}

#[cfg(feature = "imgref")]
impl Image {
    /// Zero-copy [`imgref::ImgRef`] view of an RGB image.
    pub fn as_imgref_rgb(&self) -> Option<imgref::ImgRef<'_, rgb::RGB8>> {
        Some(imgref::ImgRef::new(
            self.as_rgb()?,
            self.width() as usize,
            self.height() as usize,
        ))
    }

    /// Zero-copy [`imgref::ImgRef`] view of an RGBA image.
    pub fn as_imgref_rgba(&self) -> Option<imgref::ImgRef<'_, rgb::RGBA8>> {
        Some(imgref::ImgRef::new(
            self.as_rgba()?,
            self.width() as usize,
            self.height() as usize,
        ))
    }
}
