//! CLI command implementations

pub mod convert;
pub mod formats;
pub mod info;

use anyhow::{Context, Result};
use pixbuf_core::{ModuleRegistry, Pixbuf};
use pixbuf_jp2::{DecodeOptions, Jp2Module};
use std::path::Path;

/// Registry holding every module this host knows about.
pub fn registry(options: DecodeOptions) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register(Jp2Module::with_options(options));
    registry
}

/// Load image from path
pub fn load_image(registry: &ModuleRegistry, path: &Path) -> Result<Pixbuf> {
    registry
        .load_file(path)
        .with_context(|| format!("Failed to load: {}", path.display()))
}

/// Format file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Escapes a string for embedding in hand-written JSON.
pub fn json_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(format_size(12), "12 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn escapes() {
        assert_eq!(json_escape(r#"C:\img "a".jp2"#), r#"C:\\img \"a\".jp2"#);
        assert_eq!(json_escape("a\u{1}"), "a\\u0001");
    }

    #[test]
    fn registry_has_jp2() {
        let registry = registry(DecodeOptions::new());
        assert!(registry.get("jp2").is_some());
    }
}
