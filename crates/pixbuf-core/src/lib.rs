//! # pixbuf-core
//!
//! Host-side types shared by pixbuf loader modules.
//!
//! This crate defines the contract between an image-loading host and the
//! format modules it drives:
//!
//! - [`Pixbuf`] - Decoded 8-bit image that owns its sample buffer
//! - [`FormatInfo`] / [`ModulePattern`] - What a module handles and how to sniff it
//! - [`PixbufModule`] - Load / incremental load / save capability interface
//! - [`ModuleRegistry`] - Format detection and dispatch across modules
//! - [`PixbufError`] - Error type shared by modules and the host
//!
//! ## Crate Structure
//!
//! ```text
//! pixbuf-core (this crate)
//!    ^
//!    |
//!    +-- pixbuf-jp2 (JPEG2000 module)
//!    +-- pixbuf-jp2-cli (jp2pix host binary)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod format;
pub mod module;
pub mod pixbuf;
pub mod registry;

pub use error::{PixbufError, PixbufResult};
pub use format::{FormatCapability, FormatInfo, ModulePattern};
pub use module::{IncrementalLoad, LoadObserver, PixbufModule, ReadSeek, SaveOptions};
pub use pixbuf::{Colorspace, DestroyNotify, Pixbuf, SampleLayout};
pub use registry::ModuleRegistry;
