//! # pixbuf-jp2
//!
//! JPEG2000 loader module for pixbuf hosts, decoding through OpenJPEG.
//!
//! Reads JP2 containers and raw codestreams whose color is sRGB and hands
//! them to the host as 8-bit gray, gray+alpha, RGB or RGBA pixbufs.
//!
//! # Example
//!
//! ```ignore
//! use pixbuf_core::ModuleRegistry;
//!
//! let mut registry = ModuleRegistry::new();
//! pixbuf_jp2::register(&mut registry);
//!
//! let pixbuf = registry.load_file("scan.jp2")?;
//! println!("{}x{}x{}", pixbuf.width(), pixbuf.height(), pixbuf.n_channels());
//! ```
//!
//! # Sample conversion
//!
//! Signed components are shifted up by half their range. Samples are then
//! clamped to `0..=255` without rescaling, so images with more than 8 bits
//! per sample saturate.

#![warn(missing_docs)]

mod codec;
pub mod format;
pub mod image;
mod incremental;
pub mod interleave;
pub mod layout;
mod loader;
mod module;
mod stream;

pub use codec::DecodeOptions;
pub use format::CodecFormat;
pub use incremental::Jp2IncrementalLoad;
pub use loader::load;
pub use module::{FORMAT_INFO, Jp2Module};

use pixbuf_core::{ModuleRegistry, Pixbuf, PixbufResult};
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

/// Adds the JPEG2000 module to `registry`.
pub fn register(registry: &mut ModuleRegistry) {
    registry.register(Jp2Module::new());
}

/// Loads a JPEG2000 file at full resolution.
pub fn load_file<P: AsRef<Path>>(path: P) -> PixbufResult<Pixbuf> {
    load_file_with(path, &DecodeOptions::new())
}

/// Loads a JPEG2000 file with custom decoder settings.
pub fn load_file_with<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> PixbufResult<Pixbuf> {
    let mut reader = BufReader::new(File::open(path.as_ref())?);
    load(&mut reader, options)
}

/// Loads a JPEG2000 image from memory.
pub fn load_bytes(data: &[u8]) -> PixbufResult<Pixbuf> {
    load(&mut Cursor::new(data), &DecodeOptions::new())
}
