//! Module registry for format detection and dispatch.
//!
//! The host registers every available [`PixbufModule`] and lets the
//! registry pick one for a given file:
//!
//! - by sniffing the first bytes against each module's signatures
//! - by file extension, when no signature matches
//! - by name or MIME type, on request
//!
//! # Example
//!
//! ```ignore
//! use pixbuf_core::ModuleRegistry;
//!
//! let mut registry = ModuleRegistry::new();
//! registry.register(my_module);
//!
//! let pixbuf = registry.load_file("photo.jp2")?;
//! println!("{}x{}", pixbuf.width(), pixbuf.height());
//! ```

use crate::{Pixbuf, PixbufError, PixbufModule, PixbufResult, SaveOptions};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

/// Number of leading bytes examined when sniffing a file.
pub const SNIFF_BUFFER_SIZE: usize = 4096;

/// Set of modules known to the host.
#[derive(Default, Clone)]
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn PixbufModule>>,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module. Later registrations never shadow earlier ones
    /// with the same name.
    pub fn register<M: PixbufModule + 'static>(&mut self, module: M) {
        let name = module.info().name;
        if self.get(name).is_some() {
            debug!(module = name, "module already registered");
            return;
        }
        debug!(module = name, "registering module");
        self.modules.push(Arc::new(module));
    }

    /// Returns the registered modules in registration order.
    pub fn modules(&self) -> impl Iterator<Item = &Arc<dyn PixbufModule>> + '_ {
        self.modules.iter()
    }

    /// Returns a module by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn PixbufModule>> {
        self.modules.iter().find(|m| m.info().name == name)
    }

    /// Returns a module by file extension (case-insensitive, no dot).
    pub fn get_by_extension(&self, ext: &str) -> Option<&Arc<dyn PixbufModule>> {
        self.modules.iter().find(|m| m.info().has_extension(ext))
    }

    /// Returns a module by MIME type.
    pub fn get_by_mime_type(&self, mime_type: &str) -> Option<&Arc<dyn PixbufModule>> {
        self.modules.iter().find(|m| m.info().has_mime_type(mime_type))
    }

    /// Picks the module best suited for `header`.
    ///
    /// The highest signature score wins; on a tie the earlier registration
    /// wins. If no signature matches, the extension of `filename` decides.
    pub fn detect(&self, header: &[u8], filename: Option<&Path>) -> Option<&Arc<dyn PixbufModule>> {
        let mut best: Option<(&Arc<dyn PixbufModule>, u32)> = None;
        for module in &self.modules {
            let score = module.info().check_signature(header);
            trace!(module = module.info().name, score, "signature check");
            if score > 0 && best.is_none_or(|(_, s)| score > s) {
                best = Some((module, score));
            }
        }
        if let Some((module, _)) = best {
            return Some(module);
        }

        filename
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .and_then(|ext| self.get_by_extension(ext))
    }

    /// Loads an image from a file, detecting its format.
    ///
    /// # Errors
    ///
    /// Returns [`PixbufError::UnknownType`] if no module recognizes the
    /// file, or the module's error if decoding fails.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> PixbufResult<Pixbuf> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);

        let mut header = Vec::with_capacity(SNIFF_BUFFER_SIZE);
        (&mut reader).take(SNIFF_BUFFER_SIZE as u64).read_to_end(&mut header)?;
        reader.seek(SeekFrom::Start(0))?;

        let module = self.detect(&header, Some(path)).ok_or_else(|| {
            PixbufError::UnknownType(format!("couldn't recognize the image file format for {}", path.display()))
        })?;
        debug!(path = %path.display(), module = module.info().name, "loading");
        module.load(&mut reader)
    }

    /// Saves an image to a file with the named module.
    pub fn save_file<P: AsRef<Path>>(
        &self,
        path: P,
        pixbuf: &Pixbuf,
        module_name: &str,
        options: SaveOptions<'_>,
    ) -> PixbufResult<()> {
        let module = self
            .get(module_name)
            .ok_or_else(|| PixbufError::UnknownType(format!("no module named '{module_name}'")))?;
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        module.save(&mut writer, pixbuf, options)?;
        writer.flush()?;
        Ok(())
    }
}
