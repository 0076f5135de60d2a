//! Byte-level reader and writer honouring the stream's declared byte order.

use alloc::vec::Vec;

/// Byte order of an RLE stream.
///
/// Derived from the two-byte magic probe on read; chosen by the caller
/// (defaulting to native) on write. Colormap entries are big-endian on the
/// wire regardless of this value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// The host's byte order, the encoder's default.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endian::Big
        } else {
            Endian::Little
        }
    }
}

impl Default for Endian {
    fn default() -> Self {
        Endian::native()
    }
}

// ── Reader ──────────────────────────────────────────────────────────

/// Cursor over an in-memory stream. Short reads return `None`; call sites
/// map that to `HeaderTruncated` or `TruncatedOpcode` depending on where
/// in the stream they are.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn read_u8(&mut self) -> Option<u8> {
        let b = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    pub(crate) fn read_u16(&mut self, endian: Endian) -> Option<u16> {
        let raw = [self.read_u8()?, self.read_u8()?];
        Some(match endian {
            Endian::Little => u16::from_le_bytes(raw),
            Endian::Big => u16::from_be_bytes(raw),
        })
    }

    pub(crate) fn read_i16(&mut self, endian: Endian) -> Option<i16> {
        self.read_u16(endian).map(|v| v as i16)
    }

    /// Colormap entries keep the historical big-endian layout on both
    /// little- and big-endian streams.
    pub(crate) fn read_u16_be(&mut self) -> Option<u16> {
        let raw = [self.read_u8()?, self.read_u8()?];
        Some(u16::from_be_bytes(raw))
    }

    pub(crate) fn read_bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let slice = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    /// Consume the filler byte that follows any odd-length block.
    pub(crate) fn pad_if_odd(&mut self, len: usize) -> Option<()> {
        if len & 1 == 1 {
            self.read_u8()?;
        }
        Some(())
    }
}

// ── Writer ──────────────────────────────────────────────────────────

/// Growable output buffer with endian-aware integer primitives.
pub(crate) struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub(crate) fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub(crate) fn put_u16(&mut self, v: u16, endian: Endian) {
        let raw = match endian {
            Endian::Little => v.to_le_bytes(),
            Endian::Big => v.to_be_bytes(),
        };
        self.buf.extend_from_slice(&raw);
    }

    pub(crate) fn put_i16(&mut self, v: i16, endian: Endian) {
        self.put_u16(v as u16, endian);
    }

    pub(crate) fn put_u16_be(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub(crate) fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Emit the filler byte that keeps odd-length blocks even.
    pub(crate) fn pad_if_odd(&mut self, len: usize) {
        if len & 1 == 1 {
            self.buf.push(0);
        }
    }
}
