//! Maps decoded components to output channels.
//!
//! Only sRGB images are accepted. The component count picks the layout:
//!
//! | Components | Channels             |
//! |------------|----------------------|
//! | 1          | gray                 |
//! | 2          | gray, alpha          |
//! | 3          | red, green, blue     |
//! | 4          | red, green, blue, alpha |
//!
//! Every component must cover the full image; subsampled planes are
//! rejected rather than resampled.

use crate::image::{ColorSpace, DecodedImage};
use pixbuf_core::{PixbufError, PixbufResult, SampleLayout};

/// Output channel role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Luminance.
    Gray,
    /// Red.
    Red,
    /// Green.
    Green,
    /// Blue.
    Blue,
    /// Opacity.
    Alpha,
}

/// Where one output channel takes its samples from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSource {
    /// Role in the output pixel.
    pub channel: Channel,
    /// Index of the source component.
    pub component: usize,
    /// Added to each sample before narrowing.
    pub bias: i64,
}

/// Output channel order for a classified image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelLayout {
    width: u32,
    height: u32,
    sources: Vec<ChannelSource>,
}

fn channel_order(components: usize) -> Option<&'static [Channel]> {
    use Channel::*;
    match components {
        1 => Some(&[Gray]),
        2 => Some(&[Gray, Alpha]),
        3 => Some(&[Red, Green, Blue]),
        4 => Some(&[Red, Green, Blue, Alpha]),
        _ => None,
    }
}

impl ChannelLayout {
    /// Checks that `image` can be turned into a pixbuf and picks its layout.
    ///
    /// # Errors
    ///
    /// Fails for any colorspace other than sRGB, for a component count
    /// outside 1..=4, for components whose size differs from the first one,
    /// and for components without decoded samples.
    pub fn classify(image: &DecodedImage<'_>) -> PixbufResult<Self> {
        if image.colorspace != ColorSpace::Srgb {
            return Err(PixbufError::failed(format!(
                "Unsupported colorspace: {:?}",
                image.colorspace
            )));
        }

        let count = image.components.len();
        let order = channel_order(count)
            .ok_or_else(|| PixbufError::failed(format!("Unsupported number of components: {count}")))?;

        let first = image.components[0];
        if first.is_empty() {
            return Err(PixbufError::failed("Image has no pixels"));
        }
        for (index, comp) in image.components.iter().enumerate() {
            if comp.width != first.width || comp.height != first.height {
                return Err(PixbufError::failed(format!(
                    "Unsupported component subsampling: component {index} is {}x{}, image is {}x{}",
                    comp.width, comp.height, first.width, first.height
                )));
            }
            if comp.samples.len() < comp.len() {
                return Err(PixbufError::failed(format!("Component {index} has no decoded samples")));
            }
        }

        let sources = order
            .iter()
            .zip(&image.components)
            .enumerate()
            .map(|(component, (&channel, comp))| ChannelSource {
                channel,
                component,
                bias: comp.bias(),
            })
            .collect();

        Ok(Self {
            width: first.width,
            height: first.height,
            sources,
        })
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channels in output order.
    pub fn sources(&self) -> &[ChannelSource] {
        &self.sources
    }

    /// Channels per pixel.
    pub fn n_channels(&self) -> usize {
        self.sources.len()
    }

    /// True if the last channel is alpha.
    pub fn has_alpha(&self) -> bool {
        self.sources.last().is_some_and(|s| s.channel == Channel::Alpha)
    }

    /// Tightly packed 8-bit layout for the output buffer.
    pub fn sample_layout(&self) -> SampleLayout {
        SampleLayout::packed(self.width, self.height, self.sources.len() as u8)
    }
}
