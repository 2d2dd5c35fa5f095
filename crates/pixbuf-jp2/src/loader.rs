//! Whole-stream decode pipeline.

use crate::codec::{Codec, DecodeOptions};
use crate::format::CodecFormat;
use crate::interleave::interleave;
use crate::layout::ChannelLayout;
use crate::stream::Stream;
use pixbuf_core::{Colorspace, Pixbuf, PixbufResult, ReadSeek};
use tracing::{debug, trace};

/// Decodes a JPEG2000 image from `reader` into an 8-bit pixbuf.
///
/// Decoding starts at the reader's current position. Decoder resources are
/// released in reverse order of acquisition on every exit path.
///
/// # Errors
///
/// Each stage reports its own failure: format identification, stream
/// construction, decoder setup, thread policy, header parsing, decoding,
/// and the colorspace and component checks.
pub fn load(reader: &mut dyn ReadSeek, options: &DecodeOptions) -> PixbufResult<Pixbuf> {
    let format = CodecFormat::identify(reader)?;
    trace!(?format, "identified");

    let stream = Stream::new(reader)?;
    let mut codec = Codec::decompressor(format)?;
    codec.setup(options)?;
    codec.set_single_thread()?;

    let mut image = codec.read_header(&stream)?;
    {
        let header = image.view();
        debug!(
            colorspace = ?header.colorspace,
            components = header.components.len(),
            width = header.components.first().map(|c| c.width),
            height = header.components.first().map(|c| c.height),
            "header parsed"
        );
    }

    codec.decode(&stream, &mut image)?;
    drop(stream);

    let decoded = image.view();
    let layout = ChannelLayout::classify(&decoded)?;
    let data = interleave(&decoded, &layout)?;
    debug!(
        width = layout.width(),
        height = layout.height(),
        channels = layout.n_channels(),
        "decoded"
    );

    Pixbuf::from_data(data, Colorspace::Rgb, layout.sample_layout(), None)
}
