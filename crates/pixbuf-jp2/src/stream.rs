//! OpenJPEG stream adapter over a host `Read + Seek` source.
//!
//! The decoder pulls bytes through C callbacks. [`Stream`] boxes the
//! borrowed reader as the stream's user data and hands the decoder read,
//! skip and seek callbacks that forward to it. Offsets are relative to the
//! reader's position when the stream was created, so a loader can be
//! handed a stream that does not start at byte 0.

use openjpeg_sys as sys;
use pixbuf_core::{PixbufError, PixbufResult, ReadSeek};
use std::ffi::c_void;
use std::io::{self, Read, Seek, SeekFrom};
use std::marker::PhantomData;
use std::ptr::NonNull;
use tracing::trace;

/// Callback state: the borrowed reader and where the data starts.
struct Source<'a> {
    reader: &'a mut dyn ReadSeek,
    start: u64,
}

/// Input stream owned by the decoder for the duration of a load.
pub(crate) struct Stream<'a> {
    ptr: NonNull<sys::opj_stream_t>,
    _reader: PhantomData<&'a mut dyn ReadSeek>,
}

impl<'a> Stream<'a> {
    /// Wraps `reader`, starting at its current position.
    pub(crate) fn new(reader: &'a mut dyn ReadSeek) -> PixbufResult<Self> {
        let fail = |e: io::Error| PixbufError::failed(format!("Failed to create stream from file: {e}"));

        let start = reader.stream_position().map_err(fail)?;
        let end = reader.seek(SeekFrom::End(0)).map_err(fail)?;
        reader.seek(SeekFrom::Start(start)).map_err(fail)?;
        let length = end.saturating_sub(start);

        // SAFETY: creates a fresh input stream; null is handled below.
        let raw = unsafe { sys::opj_stream_default_create(1) };
        let ptr = NonNull::new(raw).ok_or_else(|| PixbufError::failed("Failed to create stream from file"))?;

        let source = Box::into_raw(Box::new(Source { reader, start }));
        // SAFETY: `ptr` is a live stream. Ownership of `source` moves to the
        // stream, which releases it through `free_source` on destroy.
        unsafe {
            sys::opj_stream_set_user_data(ptr.as_ptr(), source.cast(), Some(free_source));
            sys::opj_stream_set_user_data_length(ptr.as_ptr(), length);
            sys::opj_stream_set_read_function(ptr.as_ptr(), Some(read_source));
            sys::opj_stream_set_skip_function(ptr.as_ptr(), Some(skip_source));
            sys::opj_stream_set_seek_function(ptr.as_ptr(), Some(seek_source));
        }
        trace!(start, length, "stream created");

        Ok(Self {
            ptr,
            _reader: PhantomData,
        })
    }

    pub(crate) fn as_ptr(&self) -> *mut sys::opj_stream_t {
        self.ptr.as_ptr()
    }
}

impl Drop for Stream<'_> {
    fn drop(&mut self) {
        // SAFETY: the stream was created in `new` and is destroyed once.
        unsafe { sys::opj_stream_destroy(self.ptr.as_ptr()) };
    }
}

/// Reads until `len` bytes are filled or the source ends.
///
/// End of data and errors are both reported as `(size_t)-1`.
unsafe extern "C" fn read_source(
    buffer: *mut c_void,
    len: sys::OPJ_SIZE_T,
    user_data: *mut c_void,
) -> sys::OPJ_SIZE_T {
    // SAFETY: `user_data` is the `Source` installed in `Stream::new` and
    // `buffer` has room for `len` bytes.
    let source = unsafe { &mut *user_data.cast::<Source<'_>>() };
    let out = unsafe { std::slice::from_raw_parts_mut(buffer.cast::<u8>(), len as usize) };

    let mut filled = 0;
    while filled < out.len() {
        match source.reader.read(&mut out[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                trace!(error = %e, "stream read failed");
                return sys::OPJ_SIZE_T::MAX;
            }
        }
    }

    if filled == 0 {
        sys::OPJ_SIZE_T::MAX
    } else {
        filled as sys::OPJ_SIZE_T
    }
}

unsafe extern "C" fn skip_source(offset: sys::OPJ_OFF_T, user_data: *mut c_void) -> sys::OPJ_OFF_T {
    // SAFETY: see `read_source`.
    let source = unsafe { &mut *user_data.cast::<Source<'_>>() };
    match source.reader.seek(SeekFrom::Current(offset as i64)) {
        Ok(_) => offset,
        Err(_) => -1,
    }
}

unsafe extern "C" fn seek_source(offset: sys::OPJ_OFF_T, user_data: *mut c_void) -> sys::OPJ_BOOL {
    // SAFETY: see `read_source`.
    let source = unsafe { &mut *user_data.cast::<Source<'_>>() };
    if offset < 0 {
        return 0;
    }
    match source.reader.seek(SeekFrom::Start(source.start + offset as u64)) {
        Ok(_) => 1,
        Err(_) => 0,
    }
}

unsafe extern "C" fn free_source(user_data: *mut c_void) {
    if !user_data.is_null() {
        // SAFETY: `user_data` came from `Box::into_raw` in `Stream::new`.
        drop(unsafe { Box::from_raw(user_data.cast::<Source<'_>>()) });
    }
}
