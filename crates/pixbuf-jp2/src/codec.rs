//! Decompressor lifecycle.
//!
//! [`Codec`] owns an OpenJPEG decompression handle and walks it through
//! setup, header parsing and decoding. Every stage that can fail maps to
//! its own error message; whatever text the library last reported through
//! its error handler is appended to it.

use crate::format::CodecFormat;
use crate::image::RawImage;
use crate::stream::Stream;
use openjpeg_sys as sys;
use pixbuf_core::{PixbufError, PixbufResult};
use std::cell::RefCell;
use std::ffi::{CStr, c_char, c_void};
use std::mem::MaybeUninit;
use std::ptr::{self, NonNull};
use tracing::{debug, trace, warn};

/// Decoder settings.
///
/// The defaults decode every resolution level and every quality layer.
///
/// # Example
///
/// ```
/// use pixbuf_jp2::DecodeOptions;
///
/// let preview = DecodeOptions::new().with_reduce(2).with_quality_layers(1);
/// assert_eq!(preview.reduce(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    reduce: u32,
    quality_layers: u32,
}

impl DecodeOptions {
    /// Full-resolution, all-layers decode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards the `reduce` highest resolution levels, dividing each
    /// dimension by `2^reduce`.
    pub fn with_reduce(mut self, reduce: u32) -> Self {
        self.reduce = reduce;
        self
    }

    /// Decodes at most `layers` quality layers. Zero means all.
    pub fn with_quality_layers(mut self, layers: u32) -> Self {
        self.quality_layers = layers;
        self
    }

    /// Resolution levels discarded.
    pub fn reduce(&self) -> u32 {
        self.reduce
    }

    /// Quality layer limit, zero for all.
    pub fn quality_layers(&self) -> u32 {
        self.quality_layers
    }
}

/// Sink for the library's message callbacks.
#[derive(Default)]
struct Messages {
    last_error: RefCell<Option<String>>,
}

/// Owned decompression handle.
pub(crate) struct Codec {
    ptr: NonNull<sys::opj_codec_t>,
    // Boxed so the address handed to the callbacks stays put.
    messages: Box<Messages>,
}

impl Codec {
    /// Creates a decompressor for `format` with message forwarding installed.
    pub(crate) fn decompressor(format: CodecFormat) -> PixbufResult<Self> {
        // SAFETY: plain constructor; null is handled below.
        let raw = unsafe { sys::opj_create_decompress(format.into()) };
        let ptr = NonNull::new(raw).ok_or_else(|| PixbufError::failed("Failed to setup decoder"))?;
        let codec = Self {
            ptr,
            messages: Box::default(),
        };

        let client = codec.client_data();
        // SAFETY: `client` points into `codec.messages`, which lives as long
        // as the handle the handlers are attached to.
        unsafe {
            sys::opj_set_info_handler(ptr.as_ptr(), Some(info_handler), client);
            sys::opj_set_warning_handler(ptr.as_ptr(), Some(warning_handler), client);
            sys::opj_set_error_handler(ptr.as_ptr(), Some(error_handler), client);
        }
        Ok(codec)
    }

    fn client_data(&self) -> *mut c_void {
        (&*self.messages as *const Messages).cast_mut().cast()
    }

    /// Builds an error for `stage`, carrying the library's last complaint.
    fn failure(&self, stage: &str) -> PixbufError {
        match self.messages.last_error.borrow_mut().take() {
            Some(detail) => PixbufError::failed(format!("{stage}: {detail}")),
            None => PixbufError::failed(stage),
        }
    }

    /// Applies default parameters plus `options`.
    pub(crate) fn setup(&mut self, options: &DecodeOptions) -> PixbufResult<()> {
        let mut params = MaybeUninit::<sys::opj_dparameters_t>::zeroed();
        // SAFETY: the call initializes every field of `params`.
        let mut params = unsafe {
            sys::opj_set_default_decoder_parameters(params.as_mut_ptr());
            params.assume_init()
        };
        params.cp_reduce = options.reduce;
        params.cp_layer = options.quality_layers;

        // SAFETY: live handle and fully initialized parameters.
        if unsafe { sys::opj_setup_decoder(self.ptr.as_ptr(), &mut params) } == 0 {
            return Err(self.failure("Failed to setup decoder"));
        }
        trace!(reduce = options.reduce, layers = options.quality_layers, "decoder configured");
        Ok(())
    }

    /// Pins decoding to the calling thread.
    ///
    /// A library built without thread support is single-threaded already.
    pub(crate) fn set_single_thread(&mut self) -> PixbufResult<()> {
        // SAFETY: no arguments, no side effects.
        if unsafe { sys::opj_has_thread_support() } == 0 {
            trace!("decoder built without thread support");
            return Ok(());
        }
        // SAFETY: live handle; called before the header is read.
        if unsafe { sys::opj_codec_set_threads(self.ptr.as_ptr(), 1) } == 0 {
            return Err(self.failure("Failed to set thread count"));
        }
        Ok(())
    }

    /// Parses the main header. The returned image has geometry but no samples.
    pub(crate) fn read_header(&mut self, stream: &Stream<'_>) -> PixbufResult<RawImage> {
        let mut image: *mut sys::opj_image_t = ptr::null_mut();
        // SAFETY: live stream and handle; on success `image` is a new
        // allocation owned by the caller.
        let ok = unsafe { sys::opj_read_header(stream.as_ptr(), self.ptr.as_ptr(), &mut image) };
        let image = RawImage::from_ptr(image);
        if ok == 0 {
            return Err(self.failure("Failed to read header"));
        }
        image.ok_or_else(|| self.failure("Failed to read header"))
    }

    /// Decodes all samples into `image` and finishes the codestream.
    pub(crate) fn decode(&mut self, stream: &Stream<'_>, image: &mut RawImage) -> PixbufResult<()> {
        // SAFETY: `image` came from `read_header` on this codec and stream.
        let decoded = unsafe { sys::opj_decode(self.ptr.as_ptr(), stream.as_ptr(), image.as_ptr()) } != 0;
        if !decoded || unsafe { sys::opj_end_decompress(self.ptr.as_ptr(), stream.as_ptr()) } == 0 {
            return Err(self.failure("Failed to decode the image"));
        }
        Ok(())
    }
}

impl Drop for Codec {
    fn drop(&mut self) {
        // SAFETY: created in `decompressor`, destroyed once.
        unsafe { sys::opj_destroy_codec(self.ptr.as_ptr()) };
    }
}

/// Copies a library message, dropping the trailing newline.
///
/// # Safety
///
/// `msg` must be null or a NUL-terminated string.
unsafe fn message_text(msg: *const c_char) -> Option<String> {
    if msg.is_null() {
        return None;
    }
    // SAFETY: guaranteed by the caller.
    let text = unsafe { CStr::from_ptr(msg) }.to_string_lossy();
    let text = text.trim_end();
    (!text.is_empty()).then(|| text.to_owned())
}

unsafe extern "C" fn info_handler(msg: *const c_char, _client: *mut c_void) {
    if let Some(text) = unsafe { message_text(msg) } {
        debug!(target: "openjpeg", "{text}");
    }
}

unsafe extern "C" fn warning_handler(msg: *const c_char, _client: *mut c_void) {
    if let Some(text) = unsafe { message_text(msg) } {
        warn!(target: "openjpeg", "{text}");
    }
}

unsafe extern "C" fn error_handler(msg: *const c_char, client: *mut c_void) {
    let Some(text) = (unsafe { message_text(msg) }) else {
        return;
    };
    debug!(target: "openjpeg", "{text}");
    if !client.is_null() {
        // SAFETY: `client` is the `Messages` installed by `Codec::decompressor`.
        let messages = unsafe { &*client.cast::<Messages>() };
        messages.last_error.replace(Some(text));
    }
}
