//! Fixed-layout stream header: value object, wire codec, and validation.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::RleError;
use crate::limits::{MAX_ALLOC_BYTES, MAX_COMMENTS_BYTES, MAX_DIM, MAX_PIXELS};
use crate::stream::{ByteReader, ByteWriter, Endian};

/// Magic value identifying an RLE stream, stored in the stream's byte order.
pub const RLE_MAGIC: u16 = 0x52CC;

/// Hint that the frame buffer should be cleared before compositing.
/// Preserved verbatim; does not change decoded pixel values.
pub const FLAG_CLEAR_FIRST: u8 = 0x01;
/// No background block follows the fixed header fields.
pub const FLAG_NO_BACKGROUND: u8 = 0x02;
/// An alpha channel follows the color channels on each scanline.
pub const FLAG_ALPHA: u8 = 0x04;
/// A comment block follows the colormap.
pub const FLAG_COMMENT: u8 = 0x08;

/// Parsed RLE header.
///
/// `xlen`/`ylen` are widened beyond their 16-bit wire fields so that
/// [`Header::validate`] can report out-of-range values instead of silently
/// wrapping them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    /// Position of the image's lower-left corner in the notional canvas.
    pub xpos: i16,
    pub ypos: i16,
    /// Width in pixels, `1..=MAX_DIM`.
    pub xlen: u32,
    /// Height in pixels, `1..=MAX_DIM`.
    pub ylen: u32,
    /// Bitset of `FLAG_*` values.
    pub flags: u8,
    /// Color channel count, `1..=254`, alpha excluded.
    pub ncolors: u8,
    /// Bits per sample; must be 8.
    pub pixelbits: u8,
    /// Colormap channel count; 0 means no colormap.
    pub ncmap: u8,
    /// Log2 of entries per colormap channel, `0..=8`.
    pub cmaplen: u8,
    /// One byte per color channel; empty iff `FLAG_NO_BACKGROUND` is set.
    pub background: Vec<u8>,
    /// `ncmap << cmaplen` entries, stored big-endian on the wire.
    pub colormap: Vec<u16>,
    /// Free-form comments, each null-terminated on the wire.
    pub comments: Vec<String>,
}

impl Header {
    /// A background-less header for a `width × height` image with
    /// `ncolors` color channels and no alpha.
    pub fn new(width: u32, height: u32, ncolors: u8) -> Self {
        Header {
            xlen: width,
            ylen: height,
            flags: FLAG_NO_BACKGROUND,
            ncolors,
            pixelbits: 8,
            ..Header::default()
        }
    }

    /// Declare a background color, one byte per color channel.
    pub fn with_background(mut self, background: &[u8]) -> Self {
        self.background = background.to_vec();
        self.flags &= !FLAG_NO_BACKGROUND;
        self
    }

    /// Append an alpha channel after the color channels.
    pub fn with_alpha(mut self) -> Self {
        self.flags |= FLAG_ALPHA;
        self
    }

    pub fn has_alpha(&self) -> bool {
        self.flags & FLAG_ALPHA != 0
    }

    pub fn width(&self) -> u32 {
        self.xlen
    }

    pub fn height(&self) -> u32 {
        self.ylen
    }

    /// Channels per pixel in memory: color channels plus alpha when present.
    pub fn channels(&self) -> usize {
        self.ncolors as usize + usize::from(self.has_alpha())
    }

    /// Total sample count, `width × height × channels`.
    pub(crate) fn sample_count(&self) -> u64 {
        u64::from(self.xlen) * u64::from(self.ylen) * self.channels() as u64
    }

    pub(crate) fn comment_block_len(&self) -> usize {
        self.comments.iter().map(|c| c.len() + 1).sum()
    }

    // ── Validation ──────────────────────────────────────────────────

    /// Check every header invariant, returning the first that fails.
    /// Touches no stream.
    pub fn validate(&self) -> Result<(), RleError> {
        self.validate_fixed()?;
        let no_bg = self.flags & FLAG_NO_BACKGROUND != 0;
        if no_bg != self.background.is_empty()
            || (!no_bg && self.background.len() != self.ncolors as usize)
        {
            return Err(RleError::InvalidBgBlock);
        }
        if self.ncmap > self.ncolors || self.cmaplen > 8 {
            return Err(RleError::ColormapTooLarge);
        }
        if self.colormap.len() != (self.ncmap as usize) << self.cmaplen {
            return Err(RleError::ColormapTooLarge);
        }
        let samples = self.sample_count();
        if samples > MAX_PIXELS {
            return Err(RleError::PixelsTooLarge);
        }
        if samples > MAX_ALLOC_BYTES {
            return Err(RleError::AllocTooLarge);
        }
        if self.comment_block_len() > MAX_COMMENTS_BYTES {
            return Err(RleError::CommentTooLarge);
        }
        Ok(())
    }

    /// The scalar-field subset of [`Header::validate`], checkable before the
    /// variable-length header blocks have been read.
    fn validate_fixed(&self) -> Result<(), RleError> {
        if self.xlen == 0 || self.ylen == 0 || self.xlen > MAX_DIM || self.ylen > MAX_DIM {
            return Err(RleError::DimTooLarge);
        }
        if self.pixelbits != 8 {
            return Err(RleError::InvalidPixelbits);
        }
        if self.ncolors == 0 || self.ncolors > 254 {
            return Err(RleError::InvalidNcolors);
        }
        Ok(())
    }

    // ── Wire codec ──────────────────────────────────────────────────

    /// Read and validate a header, deriving the stream's byte order from
    /// the magic probe.
    pub(crate) fn read(r: &mut ByteReader<'_>) -> Result<(Header, Endian), RleError> {
        let magic = [
            r.read_u8().ok_or(RleError::HeaderTruncated)?,
            r.read_u8().ok_or(RleError::HeaderTruncated)?,
        ];
        let endian = if u16::from_le_bytes(magic) == RLE_MAGIC {
            Endian::Little
        } else if u16::from_be_bytes(magic) == RLE_MAGIC {
            Endian::Big
        } else {
            return Err(RleError::BadMagic);
        };

        let mut header = Header {
            xpos: r.read_i16(endian).ok_or(RleError::HeaderTruncated)?,
            ypos: r.read_i16(endian).ok_or(RleError::HeaderTruncated)?,
            xlen: u32::from(r.read_u16(endian).ok_or(RleError::HeaderTruncated)?),
            ylen: u32::from(r.read_u16(endian).ok_or(RleError::HeaderTruncated)?),
            flags: r.read_u8().ok_or(RleError::HeaderTruncated)?,
            ncolors: r.read_u8().ok_or(RleError::HeaderTruncated)?,
            pixelbits: r.read_u8().ok_or(RleError::HeaderTruncated)?,
            ncmap: r.read_u8().ok_or(RleError::HeaderTruncated)?,
            cmaplen: r.read_u8().ok_or(RleError::HeaderTruncated)?,
            ..Header::default()
        };
        header.validate_fixed()?;

        if header.flags & FLAG_NO_BACKGROUND == 0 {
            let bg_len = r.read_u8().ok_or(RleError::HeaderTruncated)?;
            if bg_len != header.ncolors {
                return Err(RleError::InvalidBgBlock);
            }
            header.background = r
                .read_bytes(header.ncolors as usize)
                .ok_or(RleError::HeaderTruncated)?
                .to_vec();
            r.pad_if_odd(1 + header.ncolors as usize)
                .ok_or(RleError::HeaderTruncated)?;
        }

        if header.ncmap > 0 {
            // Bound the entry count before trusting it to size a read.
            if header.ncmap > header.ncolors || header.cmaplen > 8 {
                return Err(RleError::ColormapTooLarge);
            }
            let entries = (header.ncmap as usize) << header.cmaplen;
            header.colormap.reserve_exact(entries);
            for _ in 0..entries {
                header
                    .colormap
                    .push(r.read_u16_be().ok_or(RleError::HeaderTruncated)?);
            }
        }

        if header.flags & FLAG_COMMENT != 0 {
            let len = r.read_u16(endian).ok_or(RleError::HeaderTruncated)? as usize;
            let raw = r.read_bytes(len).ok_or(RleError::HeaderTruncated)?;
            r.pad_if_odd(len).ok_or(RleError::HeaderTruncated)?;
            header.comments = parse_comments(raw);
            // A block of bare NULs canonicalizes to no comments at all.
            if header.comments.is_empty() {
                header.flags &= !FLAG_COMMENT;
            }
        }

        header.validate()?;
        Ok((header, endian))
    }

    /// Emit the header in canonical layout. The caller must have validated
    /// `self` first.
    pub(crate) fn write(&self, w: &mut ByteWriter, endian: Endian) -> Result<(), RleError> {
        w.put_u16(RLE_MAGIC, endian);
        w.put_i16(self.xpos, endian);
        w.put_i16(self.ypos, endian);
        w.put_u16(
            u16::try_from(self.xlen).map_err(|_| RleError::InternalError)?,
            endian,
        );
        w.put_u16(
            u16::try_from(self.ylen).map_err(|_| RleError::InternalError)?,
            endian,
        );
        w.put_u8(self.wire_flags());
        w.put_u8(self.ncolors);
        w.put_u8(self.pixelbits);
        w.put_u8(self.ncmap);
        w.put_u8(self.cmaplen);

        if !self.background.is_empty() {
            w.put_u8(self.ncolors);
            w.put_bytes(&self.background);
            w.pad_if_odd(1 + self.background.len());
        }

        for &entry in &self.colormap {
            w.put_u16_be(entry);
        }

        if !self.comments.is_empty() {
            let len =
                u16::try_from(self.comment_block_len()).map_err(|_| RleError::CommentTooLarge)?;
            w.put_u16(len, endian);
            for comment in &self.comments {
                w.put_bytes(comment.as_bytes());
                w.put_u8(0);
            }
            w.pad_if_odd(len as usize);
        }

        Ok(())
    }

    /// Flags as written: `NO_BACKGROUND` and `COMMENT` derived from the
    /// blocks actually present, `CLEAR_FIRST` and `ALPHA` carried through.
    fn wire_flags(&self) -> u8 {
        let mut flags = self.flags & (FLAG_CLEAR_FIRST | FLAG_ALPHA);
        if self.background.is_empty() {
            flags |= FLAG_NO_BACKGROUND;
        }
        if !self.comments.is_empty() {
            flags |= FLAG_COMMENT;
        }
        flags
    }
}

/// Split a comment block into its null-terminated strings, stripping
/// trailing NULs.
fn parse_comments(raw: &[u8]) -> Vec<String> {
    let mut comments: Vec<String> = raw
        .split(|&b| b == 0)
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .collect();
    while comments.last().is_some_and(|c| c.is_empty()) {
        comments.pop();
    }
    comments
}
