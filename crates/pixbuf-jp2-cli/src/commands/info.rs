//! Image info command.
//!
//! Decodes each input and prints the pixbuf layout the host would receive.

use super::{format_size, json_escape, load_image, registry};
use crate::InfoArgs;
use anyhow::Result;
use pixbuf_core::Pixbuf;
use std::fs;
use std::path::Path;

/// Runs the info command.
pub fn run(args: InfoArgs, verbose: bool) -> Result<()> {
    let registry = registry(args.decode.options());

    if args.json && args.input.len() > 1 {
        println!("[");
    }
    for (idx, path) in args.input.iter().enumerate() {
        let file_size = fs::metadata(path)?.len();
        let image = load_image(&registry, path)?;

        if args.json {
            let comma = if idx + 1 < args.input.len() { "," } else { "" };
            println!("{}{}", json(path, &image, file_size), comma);
        } else {
            print_text(path, &image, file_size, verbose);
            if args.input.len() > 1 {
                println!();
            }
        }
    }
    if args.json && args.input.len() > 1 {
        println!("]");
    }

    Ok(())
}

fn layout_name(image: &Pixbuf) -> &'static str {
    match image.n_channels() {
        1 => "gray",
        2 => "gray+alpha",
        3 => "rgb",
        _ => "rgba",
    }
}

/// Prints info in human-readable text format.
fn print_text(path: &Path, image: &Pixbuf, file_size: u64, verbose: bool) {
    println!("{}", path.display());
    println!("  Resolution: {}x{}", image.width(), image.height());
    println!("  Channels:   {} ({})", image.n_channels(), layout_name(image));
    println!("  Alpha:      {}", if image.has_alpha() { "yes" } else { "no" });
    println!("  File size:  {}", format_size(file_size));

    if verbose {
        println!("  Bits:       {}", image.bits_per_sample());
        println!("  Rowstride:  {}", image.rowstride());
        println!("  Buffer:     {}", format_size(image.pixels().len() as u64));
    }
}

/// Formats info as a single JSON object.
fn json(path: &Path, image: &Pixbuf, file_size: u64) -> String {
    format!(
        "{{\"file\": \"{}\", \"width\": {}, \"height\": {}, \"channels\": {}, \"has_alpha\": {}, \
         \"bits_per_sample\": {}, \"rowstride\": {}, \"bytes\": {}, \"size_bytes\": {}}}",
        json_escape(&path.display().to_string()),
        image.width(),
        image.height(),
        image.n_channels(),
        image.has_alpha(),
        image.bits_per_sample(),
        image.rowstride(),
        image.pixels().len(),
        file_size
    )
}
