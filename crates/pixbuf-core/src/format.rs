//! Format descriptors published by pixbuf modules.
//!
//! A [`FormatInfo`] tells the host what a module handles: its name, MIME
//! types, file extensions, license and capabilities, plus the byte
//! signatures used to sniff data. Signatures are [`ModulePattern`]s using
//! the host's mask language:
//!
//! | Mask byte | Meaning |
//! |-----------|---------|
//! | `' '` | data byte must equal the prefix byte |
//! | `'!'` | data byte must differ from the prefix byte |
//! | `'x'` | data byte is ignored |
//! | `'z'` | data byte must be zero |
//! | `'n'` | data byte must be non-zero |
//!
//! A leading `*` in the mask makes the pattern unanchored: it may match at
//! any offset of the sniffed header. The `*` position consumes one prefix
//! byte, which is ignored.

/// Capabilities a module advertises to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatCapability {
    /// The module can save images.
    Writable,
    /// The module can decode at a requested size.
    Scalable,
    /// The module may be used from several threads at once.
    Threadsafe,
}

/// One byte signature of a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModulePattern {
    /// Bytes to compare against the start of the data.
    pub prefix: &'static [u8],
    /// Per-byte comparison mode; `None` means every byte must match.
    pub mask: Option<&'static [u8]>,
    /// Score reported when the pattern matches (0 to 100).
    pub relevance: u32,
}

impl ModulePattern {
    /// Returns `true` if `header` satisfies the pattern.
    pub fn matches(&self, header: &[u8]) -> bool {
        match self.mask {
            Some(mask) if mask.first() == Some(&b'*') => {
                let prefix = self.prefix.get(1..).unwrap_or(&[]);
                let mask = &mask[1..];
                (0..header.len()).any(|offset| matches_at(prefix, Some(mask), &header[offset..]))
            }
            mask => matches_at(self.prefix, mask, header),
        }
    }
}

fn matches_at(prefix: &[u8], mask: Option<&[u8]>, data: &[u8]) -> bool {
    if data.len() < prefix.len() {
        return false;
    }
    prefix.iter().zip(data).enumerate().all(|(i, (&expected, &actual))| {
        match mask.and_then(|m| m.get(i)).copied().unwrap_or(b' ') {
            b'!' => actual != expected,
            b'x' => true,
            b'z' => actual == 0,
            b'n' => actual != 0,
            _ => actual == expected,
        }
    })
}

/// Static description of a format handled by a module.
#[derive(Debug, Clone, Copy)]
pub struct FormatInfo {
    /// Short module name (e.g. "jp2").
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// MIME types the module accepts.
    pub mime_types: &'static [&'static str],
    /// File extensions without dots.
    pub extensions: &'static [&'static str],
    /// Byte signatures used for sniffing.
    pub signature: &'static [ModulePattern],
    /// License of the module.
    pub license: &'static str,
    /// Capabilities supported by the module.
    pub capabilities: &'static [FormatCapability],
}

impl FormatInfo {
    /// Returns the highest relevance among matching signatures, 0 if none.
    pub fn check_signature(&self, header: &[u8]) -> u32 {
        self.signature
            .iter()
            .filter(|pattern| pattern.matches(header))
            .map(|pattern| pattern.relevance)
            .max()
            .unwrap_or(0)
    }

    /// Checks whether the module lists `ext` (case-insensitive, no dot).
    pub fn has_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Checks whether the module lists `mime_type` (case-insensitive).
    pub fn has_mime_type(&self, mime_type: &str) -> bool {
        self.mime_types.iter().any(|m| m.eq_ignore_ascii_case(mime_type))
    }

    /// Checks whether the module advertises `capability`.
    pub fn supports(&self, capability: FormatCapability) -> bool {
        self.capabilities.contains(&capability)
    }
}
