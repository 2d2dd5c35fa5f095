//! Convert command: decode through the registry, write PNG.

use super::{load_image, registry};
use crate::ConvertArgs;
use anyhow::{Context, Result};
use pixbuf_core::Pixbuf;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::info;

/// Runs the convert command.
pub fn run(args: ConvertArgs, verbose: bool) -> Result<()> {
    let registry = registry(args.decode.options());
    let image = load_image(&registry, &args.input)?;

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create: {}", args.output.display()))?;
    write_png(BufWriter::new(file), &image)
        .with_context(|| format!("Failed to save: {}", args.output.display()))?;

    info!(input = %args.input.display(), output = %args.output.display(), "converted");
    if verbose {
        println!(
            "{} -> {} ({}x{}, {} channels)",
            args.input.display(),
            args.output.display(),
            image.width(),
            image.height(),
            image.n_channels()
        );
    }
    Ok(())
}

/// Encodes an 8-bit pixbuf as PNG.
pub fn write_png<W: Write>(writer: W, image: &Pixbuf) -> Result<()> {
    let color_type = match image.n_channels() {
        1 => png::ColorType::Grayscale,
        2 => png::ColorType::GrayscaleAlpha,
        3 => png::ColorType::Rgb,
        4 => png::ColorType::Rgba,
        n => anyhow::bail!("unsupported channel count: {}", n),
    };

    let mut encoder = png::Encoder::new(writer, image.width(), image.height());
    encoder.set_color(color_type);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::default());
    encoder.set_source_srgb(png::SrgbRenderingIntent::Perceptual);

    let mut png_writer = encoder.write_header()?;

    // Rows may be padded to the rowstride; PNG wants them packed.
    let data: Vec<u8> = (0..image.height()).flat_map(|y| image.row(y).iter().copied()).collect();
    png_writer.write_image_data(&data)?;
    png_writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixbuf_core::{Colorspace, SampleLayout};
    use std::io::{BufReader, Cursor};

    fn decode(bytes: Vec<u8>) -> (png::ColorType, u32, u32, Vec<u8>) {
        let decoder = png::Decoder::new(BufReader::new(Cursor::new(bytes)));
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0u8; reader.output_buffer_size().unwrap()];
        let info = reader.next_frame(&mut buf).unwrap();
        buf.truncate(info.buffer_size());
        (info.color_type, info.width, info.height, buf)
    }

    #[test]
    fn gray_alpha_round_trips() {
        let pixels = vec![10u8, 255, 20, 128];
        let image = Pixbuf::from_data(pixels.clone(), Colorspace::Rgb, SampleLayout::packed(2, 1, 2), None).unwrap();

        let mut out = Vec::new();
        write_png(&mut out, &image).unwrap();

        let (color, w, h, data) = decode(out);
        assert_eq!(color, png::ColorType::GrayscaleAlpha);
        assert_eq!((w, h), (2, 1));
        assert_eq!(data, pixels);
    }

    #[test]
    fn padded_rows_are_packed() {
        let mut layout = SampleLayout::packed(1, 2, 3);
        layout.rowstride = 4;
        let image = Pixbuf::from_data(vec![1u8, 2, 3, 0, 4, 5, 6], Colorspace::Rgb, layout, None).unwrap();

        let mut out = Vec::new();
        write_png(&mut out, &image).unwrap();
        assert_eq!(decode(out).3, [1, 2, 3, 4, 5, 6]);
    }
}
