//! In-memory image object handed from loaders to the host.
//!
//! A [`Pixbuf`] owns a packed 8-bit sample buffer together with the layout
//! needed to address it. Loaders build one with [`Pixbuf::from_data`],
//! transferring ownership of the buffer; the buffer is released when the
//! pixbuf is dropped, after the optional [`DestroyNotify`] has seen it.
//!
//! # Example
//!
//! ```rust
//! use pixbuf_core::{Colorspace, Pixbuf, SampleLayout};
//!
//! let layout = SampleLayout::packed(2, 1, 3);
//! let pixbuf = Pixbuf::from_data(vec![1u8, 2, 3, 4, 5, 6], Colorspace::Rgb, layout, None)?;
//! assert_eq!(pixbuf.pixel(1, 0), &[4, 5, 6]);
//! # Ok::<(), pixbuf_core::PixbufError>(())
//! ```

use crate::{PixbufError, PixbufResult};
use std::fmt;

/// Callback invoked with the pixel buffer when a [`Pixbuf`] is discarded.
pub type DestroyNotify = Box<dyn FnOnce(Box<[u8]>) + Send>;

/// Colorspace of a pixbuf's samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colorspace {
    /// sRGB samples (gray layouts replicate luminance).
    Rgb,
}

/// Geometry of a packed sample buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleLayout {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channels per pixel (1 to 4).
    pub n_channels: u8,
    /// Whether the last channel is alpha.
    pub has_alpha: bool,
    /// Bits per channel sample.
    pub bits_per_sample: u8,
    /// Byte distance between the starts of consecutive rows.
    pub rowstride: usize,
}

impl SampleLayout {
    /// Layout of an 8-bit buffer with no row padding.
    ///
    /// Alpha is implied by the channel count: 2 (gray + alpha) and
    /// 4 (RGB + alpha) carry alpha, 1 and 3 do not.
    pub fn packed(width: u32, height: u32, n_channels: u8) -> Self {
        Self {
            width,
            height,
            n_channels,
            has_alpha: n_channels == 2 || n_channels == 4,
            bits_per_sample: 8,
            rowstride: width as usize * n_channels as usize,
        }
    }

    /// Bytes needed to hold one row of samples.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.n_channels as usize * (self.bits_per_sample as usize / 8)
    }

    /// Minimum buffer length: every row but the last padded to `rowstride`.
    pub fn min_byte_length(&self) -> usize {
        if self.height == 0 {
            return 0;
        }
        self.rowstride * (self.height as usize - 1) + self.row_bytes()
    }

    fn validate(&self) -> PixbufResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PixbufError::InvalidBuffer(format!(
                "empty image {}x{}",
                self.width, self.height
            )));
        }
        if !(1..=4).contains(&self.n_channels) {
            return Err(PixbufError::InvalidBuffer(format!(
                "unsupported channel count {}",
                self.n_channels
            )));
        }
        if self.has_alpha != (self.n_channels == 2 || self.n_channels == 4) {
            return Err(PixbufError::InvalidBuffer(format!(
                "alpha flag {} does not fit {} channels",
                self.has_alpha, self.n_channels
            )));
        }
        if self.bits_per_sample != 8 {
            return Err(PixbufError::InvalidBuffer(format!(
                "unsupported bits per sample {}",
                self.bits_per_sample
            )));
        }
        if self.rowstride < self.row_bytes() {
            return Err(PixbufError::InvalidBuffer(format!(
                "rowstride {} is less than row size {}",
                self.rowstride,
                self.row_bytes()
            )));
        }
        Ok(())
    }
}

/// Decoded image owned by the host.
pub struct Pixbuf {
    colorspace: Colorspace,
    layout: SampleLayout,
    pixels: Option<Box<[u8]>>,
    destroy: Option<DestroyNotify>,
}

impl Pixbuf {
    /// Wraps an existing sample buffer, taking ownership of it.
    ///
    /// `destroy` runs exactly once, with the buffer, when the pixbuf is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns [`PixbufError::InvalidBuffer`] if the layout is malformed or
    /// the buffer is shorter than the layout requires.
    pub fn from_data(
        data: impl Into<Box<[u8]>>,
        colorspace: Colorspace,
        layout: SampleLayout,
        destroy: Option<DestroyNotify>,
    ) -> PixbufResult<Self> {
        layout.validate()?;
        let data = data.into();
        let needed = layout.min_byte_length();
        if data.len() < needed {
            return Err(PixbufError::InvalidBuffer(format!(
                "buffer holds {} bytes, layout needs {}",
                data.len(),
                needed
            )));
        }
        Ok(Self {
            colorspace,
            layout,
            pixels: Some(data),
            destroy,
        })
    }

    /// Returns the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.layout.width
    }

    /// Returns the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.layout.height
    }

    /// Returns the number of channels per pixel.
    #[inline]
    pub fn n_channels(&self) -> u8 {
        self.layout.n_channels
    }

    /// Returns `true` if the last channel is alpha.
    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.layout.has_alpha
    }

    /// Returns bits per channel sample.
    #[inline]
    pub fn bits_per_sample(&self) -> u8 {
        self.layout.bits_per_sample
    }

    /// Returns the byte distance between row starts.
    #[inline]
    pub fn rowstride(&self) -> usize {
        self.layout.rowstride
    }

    /// Returns the colorspace.
    #[inline]
    pub fn colorspace(&self) -> Colorspace {
        self.colorspace
    }

    /// Returns the layout this pixbuf was created with.
    #[inline]
    pub fn layout(&self) -> SampleLayout {
        self.layout
    }

    /// Returns the whole sample buffer.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        self.pixels.as_deref().unwrap_or(&[])
    }

    /// Returns the samples of row `y`, without padding.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(y < self.height(), "row {y} out of bounds");
        let start = y as usize * self.rowstride();
        &self.pixels()[start..start + self.layout.row_bytes()]
    }

    /// Returns the channel samples of the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        assert!(x < self.width(), "column {x} out of bounds");
        let n = self.n_channels() as usize;
        let start = x as usize * n;
        &self.row(y)[start..start + n]
    }
}

impl fmt::Debug for Pixbuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pixbuf")
            .field("colorspace", &self.colorspace)
            .field("layout", &self.layout)
            .field("bytes", &self.pixels().len())
            .field("destroy_notify", &self.destroy.is_some())
            .finish()
    }
}

impl Drop for Pixbuf {
    fn drop(&mut self) {
        if let (Some(pixels), Some(destroy)) = (self.pixels.take(), self.destroy.take()) {
            destroy(pixels);
        }
    }
}
