//! Planar-to-packed sample conversion.

use crate::image::DecodedImage;
use crate::layout::ChannelLayout;
use pixbuf_core::{PixbufError, PixbufResult};

/// Narrows one decoded sample to 8 bits.
///
/// The bias is added and the result clamped to `0..=255`. No precision
/// rescaling happens, so data above 8 bits saturates.
#[inline]
pub fn narrow(sample: i32, bias: i64) -> u8 {
    (i64::from(sample) + bias).clamp(0, 255) as u8
}

/// Packs the planes of `image` into an 8-bit, row-major buffer in the
/// channel order of `layout`, with no row padding.
///
/// # Errors
///
/// Fails if the output buffer size overflows or cannot be allocated.
pub fn interleave(image: &DecodedImage<'_>, layout: &ChannelLayout) -> PixbufResult<Vec<u8>> {
    let stride = layout.n_channels();
    let pixels = layout.width() as usize * layout.height() as usize;
    let size = pixels
        .checked_mul(stride)
        .ok_or_else(|| PixbufError::failed("Image dimensions are too large"))?;

    let mut data = Vec::new();
    data.try_reserve_exact(size)
        .map_err(|_| PixbufError::failed(format!("Insufficient memory to allocate {size} bytes")))?;
    data.resize(size, 0u8);

    let planes: Vec<(&[i32], i64)> = layout
        .sources()
        .iter()
        .map(|s| (&image.components[s.component].samples[..pixels], s.bias))
        .collect();

    for (i, pixel) in data.chunks_exact_mut(stride).enumerate() {
        for (out, &(samples, bias)) in pixel.iter_mut().zip(&planes) {
            *out = narrow(samples[i], bias);
        }
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ColorSpace, Component};

    fn comp(width: u32, height: u32, signed: bool, samples: &[i32]) -> Component<'_> {
        Component {
            width,
            height,
            precision: 8,
            signed,
            samples,
        }
    }

    fn pack(components: Vec<Component<'_>>) -> Vec<u8> {
        let image = DecodedImage {
            colorspace: ColorSpace::Srgb,
            components,
        };
        let layout = ChannelLayout::classify(&image).unwrap();
        interleave(&image, &layout).unwrap()
    }

    #[test]
    fn rgb_2x2() {
        let r = [255, 0, 10, 20];
        let g = [0, 255, 30, 40];
        let b = [0, 0, 50, 60];
        let data = pack(vec![comp(2, 2, false, &r), comp(2, 2, false, &g), comp(2, 2, false, &b)]);
        assert_eq!(data, [255, 0, 0, 0, 255, 0, 10, 30, 50, 20, 40, 60]);
    }

    #[test]
    fn rgb_pixels_flatten_in_order() {
        let r = [10, 40, 70, 100];
        let g = [20, 50, 80, 110];
        let b = [30, 60, 90, 120];
        let data = pack(vec![comp(2, 2, false, &r), comp(2, 2, false, &g), comp(2, 2, false, &b)]);
        assert_eq!(data, [10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120]);
    }

    #[test]
    fn gray_alpha_keeps_alpha_second() {
        let gray = [10, 20];
        let alpha = [255, 128];
        let data = pack(vec![comp(2, 1, false, &gray), comp(2, 1, false, &alpha)]);
        assert_eq!(data, [10, 255, 20, 128]);
    }

    #[test]
    fn rgba_order() {
        let data = pack(vec![
            comp(1, 1, false, &[1]),
            comp(1, 1, false, &[2]),
            comp(1, 1, false, &[3]),
            comp(1, 1, false, &[4]),
        ]);
        assert_eq!(data, [1, 2, 3, 4]);
    }

    #[test]
    fn signed_samples_are_recentered() {
        let data = pack(vec![comp(3, 1, true, &[-128, 0, 127])]);
        assert_eq!(data, [0, 128, 255]);
    }

    #[test]
    fn out_of_range_samples_clamp() {
        assert_eq!(narrow(-5, 0), 0);
        assert_eq!(narrow(4095, 0), 255);
        assert_eq!(narrow(i32::MAX, 1 << 31), 255);
        assert_eq!(narrow(i32::MIN, 0), 0);
    }

    #[test]
    fn output_is_tightly_packed() {
        let plane = [7; 15];
        let data = pack(vec![comp(5, 3, false, &plane); 3]);
        assert_eq!(data.len(), 5 * 3 * 3);
        assert!(data.iter().all(|&v| v == 7));
    }
}
