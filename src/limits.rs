/// Largest width or height the format can carry in its 16-bit fields.
pub const MAX_DIM: u32 = 65_535;

/// Cap on the total sample count, `width × height × channels`.
pub const MAX_PIXELS: u64 = 1 << 32;

/// Cap on the decoded pixel buffer allocation, in bytes.
pub const MAX_ALLOC_BYTES: u64 = 1 << 30;

/// Cap on the encoded comment block, bounded by its 16-bit length prefix.
pub const MAX_COMMENTS_BYTES: usize = u16::MAX as usize;

/// Opcode budget factor: a stream may carry at most this many opcodes per
/// pixel before the decoder gives up on it.
pub const MAX_OPS_PER_ROW: u64 = 32;

/// Resource limits for decode operations.
///
/// All fields default to `None` (no limit). The hard caps above are
/// enforced regardless.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum memory bytes for output buffer allocation.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// Check dimensions against limits. Returns Ok(()) or LimitExceeded error.
    pub(crate) fn check(&self, width: u32, height: u32) -> Result<(), crate::RleError> {
        if let Some(max_w) = self.max_width {
            if u64::from(width) > max_w {
                return Err(crate::RleError::LimitExceeded(alloc::format!(
                    "width {width} exceeds limit {max_w}"
                )));
            }
        }
        if let Some(max_h) = self.max_height {
            if u64::from(height) > max_h {
                return Err(crate::RleError::LimitExceeded(alloc::format!(
                    "height {height} exceeds limit {max_h}"
                )));
            }
        }
        if let Some(max_px) = self.max_pixels {
            let pixels = u64::from(width) * u64::from(height);
            if pixels > max_px {
                return Err(crate::RleError::LimitExceeded(alloc::format!(
                    "pixel count {pixels} exceeds limit {max_px}"
                )));
            }
        }
        Ok(())
    }

    /// Check that an allocation size is within memory limits.
    pub(crate) fn check_memory(&self, bytes: u64) -> Result<(), crate::RleError> {
        if let Some(max_mem) = self.max_memory_bytes {
            if bytes > max_mem {
                return Err(crate::RleError::LimitExceeded(alloc::format!(
                    "allocation {bytes} bytes exceeds memory limit {max_mem}"
                )));
            }
        }
        Ok(())
    }
}
