use enough::StopReason;

/// Errors from RLE decoding, encoding, and header validation.
///
/// The `Display` string for each kind is the short one-liner an outer CLI
/// is expected to print alongside a non-zero exit code.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RleError {
    #[error("bad magic")]
    BadMagic,

    #[error("header truncated")]
    HeaderTruncated,

    #[error("unsupported endian")]
    UnsupportedEndian,

    #[error("dimensions exceed maximum")]
    DimTooLarge,

    #[error("pixel count exceeds maximum")]
    PixelsTooLarge,

    #[error("allocation exceeds cap")]
    AllocTooLarge,

    #[error("colormap exceeds cap")]
    ColormapTooLarge,

    #[error("comment block too large")]
    CommentTooLarge,

    #[error("invalid ncolors")]
    InvalidNcolors,

    #[error("invalid pixelbits")]
    InvalidPixelbits,

    #[error("invalid background block")]
    InvalidBgBlock,

    #[error("unknown opcode")]
    OpcodeUnknown,

    #[error("opcode operand overflow")]
    OpcodeOverflow,

    #[error("truncated opcode data")]
    TruncatedOpcode,

    #[error("opcode count per row exceeded")]
    OpCountExceeded,

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("limit exceeded: {0}")]
    LimitExceeded(alloc::string::String),

    #[cfg(feature = "std")]
    #[error("read error: {0}")]
    ReadError(std::io::Error),

    #[cfg(feature = "std")]
    #[error("write error: {0}")]
    WriteError(std::io::Error),

    #[error("operation cancelled")]
    Cancelled(StopReason),

    #[error("internal error")]
    InternalError,
}

impl From<StopReason> for RleError {
    fn from(r: StopReason) -> Self {
        RleError::Cancelled(r)
    }
}
