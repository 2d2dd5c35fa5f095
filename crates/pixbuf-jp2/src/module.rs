//! The JPEG2000 format module.

use crate::codec::DecodeOptions;
use crate::incremental::Jp2IncrementalLoad;
use crate::loader;
use pixbuf_core::{
    FormatCapability, FormatInfo, IncrementalLoad, LoadObserver, ModulePattern, Pixbuf, PixbufModule, PixbufResult,
    ReadSeek,
};
use tracing::debug_span;

static SIGNATURE: [ModulePattern; 2] = [
    // JP2 signature box: any length bytes, then "jP".
    ModulePattern {
        prefix: b"    jP",
        mask: Some(b"!!!!  "),
        relevance: 100,
    },
    // SOC + SIZ of a raw codestream.
    ModulePattern {
        prefix: &[0xFF, 0x4F, 0xFF, 0x51, 0x00],
        mask: None,
        relevance: 100,
    },
];

/// Descriptor advertised to the host.
pub static FORMAT_INFO: FormatInfo = FormatInfo {
    name: "jp2",
    description: "JPEG2000",
    mime_types: &["image/jp2", "image/jpm", "image/jpx", "image/jpeg2000"],
    extensions: &["j2k", "jp2", "jpc", "jpf", "jpm", "jpx"],
    signature: &SIGNATURE,
    license: "LGPL",
    capabilities: &[FormatCapability::Threadsafe],
};

/// JPEG2000 loader module.
///
/// Loads JP2 files and raw codestreams with sRGB color into 8-bit
/// pixbufs. Saving is not supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct Jp2Module {
    options: DecodeOptions,
}

impl Jp2Module {
    /// Module decoding at full resolution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Module decoding with `options`.
    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// Decoder settings in use.
    pub fn options(&self) -> DecodeOptions {
        self.options
    }
}

impl PixbufModule for Jp2Module {
    fn info(&self) -> &'static FormatInfo {
        &FORMAT_INFO
    }

    fn load(&self, reader: &mut dyn ReadSeek) -> PixbufResult<Pixbuf> {
        let _span = debug_span!("jp2_load").entered();
        loader::load(reader, &self.options)
    }

    fn begin_load(&self, observer: Box<dyn LoadObserver>) -> PixbufResult<Box<dyn IncrementalLoad>> {
        Ok(Box::new(Jp2IncrementalLoad::new(self.options, observer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor() {
        let info = Jp2Module::new().info();
        assert_eq!(info.name, "jp2");
        assert!(info.has_extension("JPX"));
        assert!(info.has_mime_type("image/jpeg2000"));
        assert!(info.supports(FormatCapability::Threadsafe));
        assert!(!info.supports(FormatCapability::Writable));
    }

    #[test]
    fn signatures() {
        let info = &FORMAT_INFO;
        assert_eq!(info.check_signature(b"\x00\x00\x00\x0cjP  \r\n\x87\n"), 100);
        assert_eq!(info.check_signature(&[0xFF, 0x4F, 0xFF, 0x51, 0x00, 0x2F]), 100);
        assert_eq!(info.check_signature(&[0xFF, 0x4F, 0xFF, 0x51, 0x01]), 0);
        // Length bytes must differ from the spaces in the pattern.
        assert_eq!(info.check_signature(b"    jP  "), 0);
        assert_eq!(info.check_signature(b"\x89PNG\r\n"), 0);
    }
}
