//! Decoded image access.
//!
//! [`RawImage`] owns the decoder's image allocation; [`DecodedImage`] is a
//! borrowed, safe view of it that the layout and interleaving code works on.

use openjpeg_sys as sys;
use std::ptr::NonNull;
use std::slice;

/// Color interpretation reported by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Not determinable.
    Unknown,
    /// Not signalled, typical for raw codestreams.
    Unspecified,
    /// sRGB.
    Srgb,
    /// Grayscale.
    Gray,
    /// YCbCr.
    Sycc,
    /// e-YCC.
    Eycc,
    /// CMYK.
    Cmyk,
}

impl From<sys::COLOR_SPACE> for ColorSpace {
    fn from(color: sys::COLOR_SPACE) -> Self {
        match color {
            sys::COLOR_SPACE::OPJ_CLRSPC_UNKNOWN => Self::Unknown,
            sys::COLOR_SPACE::OPJ_CLRSPC_UNSPECIFIED => Self::Unspecified,
            sys::COLOR_SPACE::OPJ_CLRSPC_SRGB => Self::Srgb,
            sys::COLOR_SPACE::OPJ_CLRSPC_GRAY => Self::Gray,
            sys::COLOR_SPACE::OPJ_CLRSPC_SYCC => Self::Sycc,
            sys::COLOR_SPACE::OPJ_CLRSPC_EYCC => Self::Eycc,
            sys::COLOR_SPACE::OPJ_CLRSPC_CMYK => Self::Cmyk,
        }
    }
}

/// One plane of a decoded image.
#[derive(Debug, Clone, Copy)]
pub struct Component<'a> {
    /// Plane width in samples.
    pub width: u32,
    /// Plane height in samples.
    pub height: u32,
    /// Significant bits per sample.
    pub precision: u32,
    /// Whether samples are two's-complement signed.
    pub signed: bool,
    /// Row-major samples; empty until the image has been decoded.
    pub samples: &'a [i32],
}

impl Component<'_> {
    /// Offset that maps this plane's samples to an unsigned range.
    pub fn bias(&self) -> i64 {
        if self.signed && self.precision > 0 {
            1i64 << (self.precision.min(32) - 1)
        } else {
            0
        }
    }

    /// Number of samples the plane should hold.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// True for a zero-area plane.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Borrowed view of a decoded image.
#[derive(Debug, Clone)]
pub struct DecodedImage<'a> {
    /// Reported color interpretation.
    pub colorspace: ColorSpace,
    /// Planes in codestream order.
    pub components: Vec<Component<'a>>,
}

/// Owned decoder image.
pub(crate) struct RawImage(NonNull<sys::opj_image_t>);

impl RawImage {
    pub(crate) fn from_ptr(ptr: *mut sys::opj_image_t) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    pub(crate) fn as_ptr(&self) -> *mut sys::opj_image_t {
        self.0.as_ptr()
    }

    /// Borrows the image's geometry and, once decoded, its samples.
    pub(crate) fn view(&self) -> DecodedImage<'_> {
        // SAFETY: the pointer is live for as long as `self`.
        let image = unsafe { self.0.as_ref() };
        let comps: &[sys::opj_image_comp_t] = if image.comps.is_null() || image.numcomps == 0 {
            &[]
        } else {
            // SAFETY: the decoder allocates `numcomps` entries at `comps`.
            unsafe { slice::from_raw_parts(image.comps, image.numcomps as usize) }
        };

        let components = comps
            .iter()
            .map(|comp| {
                let len = comp.w as usize * comp.h as usize;
                let samples: &[i32] = if comp.data.is_null() {
                    &[]
                } else {
                    // SAFETY: decoded planes hold `w * h` samples.
                    unsafe { slice::from_raw_parts(comp.data, len) }
                };
                Component {
                    width: comp.w,
                    height: comp.h,
                    precision: comp.prec,
                    signed: comp.sgnd != 0,
                    samples,
                }
            })
            .collect();

        DecodedImage {
            colorspace: image.color_space.into(),
            components,
        }
    }
}

impl Drop for RawImage {
    fn drop(&mut self) {
        // SAFETY: owned allocation, destroyed once.
        unsafe { sys::opj_image_destroy(self.0.as_ptr()) };
    }
}
