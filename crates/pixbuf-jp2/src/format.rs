//! JPEG2000 flavour detection.
//!
//! The decoder needs to know up front whether it is reading a boxed JP2
//! file or a bare codestream. Both are recognized from their first bytes.

use openjpeg_sys as sys;
use pixbuf_core::{PixbufError, PixbufResult, ReadSeek};
use std::io::{Read, Seek, SeekFrom};

/// JP2 signature box (RFC 3745).
pub const JP2_SIGNATURE_BOX: &[u8] = &[
    0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20, 0x0D, 0x0A, 0x87, 0x0A,
];

/// Bare JP2 magic, seen when the signature box header is missing.
pub const JP2_MAGIC: &[u8] = &[0x0D, 0x0A, 0x87, 0x0A];

/// SOC marker followed by SIZ: start of a raw codestream.
pub const J2K_CODESTREAM_MAGIC: &[u8] = &[0xFF, 0x4F, 0xFF, 0x51];

/// How the encoded data is packaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecFormat {
    /// Raw codestream (.j2k, .jpc).
    J2k,
    /// JP2 box container (.jp2, .jpx, .jpf, .jpm).
    Jp2,
}

impl CodecFormat {
    /// Detects the flavour from leading bytes.
    pub fn from_bytes(header: &[u8]) -> Option<Self> {
        if header.starts_with(JP2_SIGNATURE_BOX) || header.starts_with(JP2_MAGIC) {
            Some(Self::Jp2)
        } else if header.starts_with(J2K_CODESTREAM_MAGIC) {
            Some(Self::J2k)
        } else {
            None
        }
    }

    /// Peeks at the stream's next bytes and restores its position.
    ///
    /// # Errors
    ///
    /// Fails if the stream cannot be read or rewound, or if neither
    /// signature is present.
    pub fn identify(reader: &mut dyn ReadSeek) -> PixbufResult<Self> {
        let start = reader
            .stream_position()
            .map_err(|e| PixbufError::failed(format!("Failed to create stream from file: {e}")))?;

        let mut header = Vec::with_capacity(JP2_SIGNATURE_BOX.len());
        let peeked = (&mut *reader)
            .take(JP2_SIGNATURE_BOX.len() as u64)
            .read_to_end(&mut header);
        let rewound = reader.seek(SeekFrom::Start(start));
        peeked
            .and(rewound)
            .map_err(|e| PixbufError::failed(format!("Failed to create stream from file: {e}")))?;

        Self::from_bytes(&header).ok_or_else(|| PixbufError::failed("Failed to identify JPEG2000 format"))
    }
}

impl From<CodecFormat> for sys::CODEC_FORMAT {
    fn from(format: CodecFormat) -> Self {
        match format {
            CodecFormat::Jp2 => sys::CODEC_FORMAT::OPJ_CODEC_JP2,
            CodecFormat::J2k => sys::CODEC_FORMAT::OPJ_CODEC_J2K,
        }
    }
}
