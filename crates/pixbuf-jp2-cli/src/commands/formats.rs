//! Lists the modules the host has registered.

use super::registry;
use anyhow::Result;
use pixbuf_core::{FormatCapability, FormatInfo};
use pixbuf_jp2::DecodeOptions;

/// Runs the formats command.
pub fn run(verbose: bool) -> Result<()> {
    let registry = registry(DecodeOptions::new());
    for module in registry.modules() {
        print!("{}", describe(module.info(), verbose));
    }
    Ok(())
}

fn capability_name(capability: FormatCapability) -> &'static str {
    match capability {
        FormatCapability::Writable => "writable",
        FormatCapability::Scalable => "scalable",
        FormatCapability::Threadsafe => "threadsafe",
    }
}

fn describe(info: &FormatInfo, verbose: bool) -> String {
    let mut out = format!("{} - {}\n", info.name, info.description);
    out.push_str(&format!("  Extensions:   {}\n", info.extensions.join(", ")));
    out.push_str(&format!("  MIME types:   {}\n", info.mime_types.join(", ")));
    let caps: Vec<&str> = info.capabilities.iter().map(|&c| capability_name(c)).collect();
    out.push_str(&format!("  Capabilities: {}\n", caps.join(", ")));
    if verbose {
        out.push_str(&format!("  License:      {}\n", info.license));
        out.push_str(&format!("  Signatures:   {}\n", info.signature.len()));
    }
    out
}
