//! The capability interface implemented by format modules.
//!
//! A module implements [`PixbufModule`]: whole-stream loading, optional
//! incremental loading and optional saving. Operations a module does not
//! support keep the default implementations, which fail with
//! [`PixbufError::UnsupportedOperation`] instead of pretending to succeed.
//!
//! # Example
//!
//! ```rust,ignore
//! use pixbuf_core::PixbufModule;
//!
//! let file = std::fs::File::open("image.jp2")?;
//! let mut reader = std::io::BufReader::new(file);
//! let pixbuf = module.load(&mut reader)?;
//! ```

use crate::{FormatInfo, Pixbuf, PixbufError, PixbufResult};
use std::io::{self, Read, Seek, Write};

/// Readable and seekable byte source.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// Key/value options passed to save operations.
pub type SaveOptions<'a> = &'a [(&'a str, &'a str)];

/// Receives progress notifications during an incremental load.
///
/// All methods have empty defaults so observers only implement what they
/// need.
pub trait LoadObserver {
    /// Called once the image dimensions are known.
    fn size_prepared(&mut self, _width: u32, _height: u32) {}

    /// Called once the pixbuf has been allocated.
    fn area_prepared(&mut self, _pixbuf: &Pixbuf) {}

    /// Called when a region of the pixbuf holds final samples.
    fn area_updated(&mut self, _pixbuf: &Pixbuf, _x: u32, _y: u32, _width: u32, _height: u32) {}
}

/// An in-progress incremental load.
pub trait IncrementalLoad {
    /// Feeds the next chunk of encoded data.
    fn load_increment(&mut self, buf: &[u8]) -> PixbufResult<()>;

    /// Finishes the load and hands the decoded image to the caller.
    fn stop_load(self: Box<Self>) -> PixbufResult<Pixbuf>;
}

/// Image codec capability interface.
pub trait PixbufModule: Send + Sync {
    /// Returns the static format descriptor.
    fn info(&self) -> &'static FormatInfo;

    /// Decodes a complete image from `reader`.
    fn load(&self, reader: &mut dyn ReadSeek) -> PixbufResult<Pixbuf>;

    /// Starts an incremental load reporting to `observer`.
    fn begin_load(&self, observer: Box<dyn LoadObserver>) -> PixbufResult<Box<dyn IncrementalLoad>> {
        let _ = observer;
        Err(PixbufError::unsupported(format!(
            "{} does not support incremental loading",
            self.info().description
        )))
    }

    /// Encodes `pixbuf` into `writer`.
    fn save(&self, writer: &mut dyn Write, pixbuf: &Pixbuf, options: SaveOptions<'_>) -> PixbufResult<()> {
        let _ = (writer, pixbuf, options);
        Err(PixbufError::unsupported(format!(
            "{} saving is not supported",
            self.info().description
        )))
    }

    /// Encodes `pixbuf`, passing each chunk of output to `sink`.
    fn save_to_callback(
        &self,
        sink: &mut dyn FnMut(&[u8]) -> io::Result<()>,
        pixbuf: &Pixbuf,
        options: SaveOptions<'_>,
    ) -> PixbufResult<()> {
        let _ = (sink, pixbuf, options);
        Err(PixbufError::unsupported(format!(
            "{} saving is not supported",
            self.info().description
        )))
    }
}
