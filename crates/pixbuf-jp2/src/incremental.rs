//! Incremental loading.
//!
//! OpenJPEG decodes from a complete stream, so increments are buffered and
//! the image is decoded when the load is stopped. The observer sees the
//! whole image prepared and updated at that point. Data that cannot be
//! JPEG2000 is rejected as soon as enough bytes have arrived to tell.

use crate::codec::DecodeOptions;
use crate::format::{CodecFormat, JP2_SIGNATURE_BOX};
use crate::loader;
use pixbuf_core::{IncrementalLoad, LoadObserver, Pixbuf, PixbufError, PixbufResult};
use std::io::Cursor;
use tracing::{debug, trace};

/// Buffering incremental loader.
pub struct Jp2IncrementalLoad {
    options: DecodeOptions,
    observer: Box<dyn LoadObserver>,
    buffer: Vec<u8>,
    identified: bool,
}

impl Jp2IncrementalLoad {
    /// Starts an empty load reporting to `observer`.
    pub fn new(options: DecodeOptions, observer: Box<dyn LoadObserver>) -> Self {
        Self {
            options,
            observer,
            buffer: Vec::new(),
            identified: false,
        }
    }

    /// Bytes received so far.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

impl IncrementalLoad for Jp2IncrementalLoad {
    fn load_increment(&mut self, buf: &[u8]) -> PixbufResult<()> {
        self.buffer.extend_from_slice(buf);
        trace!(bytes = buf.len(), buffered = self.buffer.len(), "increment");

        if !self.identified && self.buffer.len() >= JP2_SIGNATURE_BOX.len() {
            if CodecFormat::from_bytes(&self.buffer).is_none() {
                return Err(PixbufError::failed("Failed to identify JPEG2000 format"));
            }
            self.identified = true;
        }
        Ok(())
    }

    fn stop_load(self: Box<Self>) -> PixbufResult<Pixbuf> {
        let Self {
            options,
            mut observer,
            buffer,
            ..
        } = *self;
        debug!(bytes = buffer.len(), "decoding buffered image");

        let pixbuf = loader::load(&mut Cursor::new(buffer), &options)?;
        let (width, height) = (pixbuf.width(), pixbuf.height());
        observer.size_prepared(width, height);
        observer.area_prepared(&pixbuf);
        observer.area_updated(&pixbuf, 0, 0, width, height);
        Ok(pixbuf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;
    impl LoadObserver for Silent {}

    #[test]
    fn rejects_foreign_data_early() {
        let mut load = Jp2IncrementalLoad::new(DecodeOptions::new(), Box::new(Silent));
        load.load_increment(b"\x89PNG").unwrap();
        assert_eq!(load.buffered(), 4);
        let err = load.load_increment(b"\r\n\x1a\n\0\0\0\rIHDR").unwrap_err();
        assert!(err.to_string().contains("Failed to identify JPEG2000 format"));
    }

    #[test]
    fn empty_load_fails() {
        let load = Box::new(Jp2IncrementalLoad::new(DecodeOptions::new(), Box::new(Silent)));
        assert!(load.stop_load().unwrap_err().is_failed());
    }
}
