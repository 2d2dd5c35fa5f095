//! Hand-assembled JPEG2000 test images.
//!
//! Every packet is empty, so all coefficients decode to zero and each
//! plane comes out as a constant: 128 for unsigned 8-bit data after the
//! DC level shift, 0 for signed data (128 once re-centered).

#![allow(dead_code)]

use std::iter;

/// sRGB enumerated colorspace in a `colr` box.
pub const ENUMCS_SRGB: u32 = 16;
/// Grayscale enumerated colorspace in a `colr` box.
pub const ENUMCS_GRAY: u32 = 17;

/// Value every output sample takes for a fixture image.
pub const FLAT: u8 = 128;

#[derive(Debug, Clone, Copy)]
pub struct Fixture {
    pub width: u32,
    pub height: u32,
    pub components: u16,
    pub signed: bool,
    pub levels: u8,
    pub enumcs: u32,
}

impl Fixture {
    pub fn new(width: u32, height: u32, components: u16) -> Self {
        Self {
            width,
            height,
            components,
            signed: false,
            levels: 0,
            enumcs: ENUMCS_SRGB,
        }
    }

    pub fn signed(mut self) -> Self {
        self.signed = true;
        self
    }

    pub fn levels(mut self, levels: u8) -> Self {
        self.levels = levels;
        self
    }

    pub fn enumcs(mut self, enumcs: u32) -> Self {
        self.enumcs = enumcs;
        self
    }

    fn depth(&self) -> u8 {
        if self.signed { 0x87 } else { 0x07 }
    }

    /// Raw codestream: one tile, one layer, 5/3 wavelet, empty packets.
    pub fn codestream(&self) -> Vec<u8> {
        let c = self.components;
        let mut out: Vec<u8> = vec![0xFF, 0x4F];

        // SIZ
        out.extend([0xFF, 0x51]);
        out.extend((38 + 3 * c).to_be_bytes());
        out.extend(0u16.to_be_bytes());
        for v in [self.width, self.height, 0, 0, self.width, self.height, 0, 0] {
            out.extend(v.to_be_bytes());
        }
        out.extend(c.to_be_bytes());
        for _ in 0..c {
            out.extend([self.depth(), 1, 1]);
        }

        // COD: LRCP, 1 layer, no MCT, 64x64 code-blocks, reversible.
        out.extend([0xFF, 0x52, 0x00, 0x0C, 0x00, 0x00, 0x00, 0x01, 0x00]);
        out.extend([self.levels, 0x04, 0x04, 0x00, 0x01]);

        // QCD: no quantization, 2 guard bits, exponents per subband.
        let mut bands = vec![8u8 << 3];
        for _ in 0..self.levels {
            bands.extend([9 << 3, 9 << 3, 10 << 3]);
        }
        out.extend([0xFF, 0x5C]);
        out.extend((3 + bands.len() as u16).to_be_bytes());
        out.push(0x40);
        out.extend(bands);

        // One packet per component and resolution.
        let packets = u32::from(c) * (u32::from(self.levels) + 1);
        out.extend([0xFF, 0x90, 0x00, 0x0A, 0x00, 0x00]);
        out.extend((14 + packets).to_be_bytes());
        out.extend([0x00, 0x01]);
        out.extend([0xFF, 0x93]);
        out.extend(iter::repeat_n(0u8, packets as usize));
        out.extend([0xFF, 0xD9]);
        out
    }

    /// JP2 file wrapping [`Self::codestream`] with an enumerated `colr` box.
    pub fn jp2(&self) -> Vec<u8> {
        let codestream = self.codestream();
        let mut out: Vec<u8> = Vec::new();

        out.extend(12u32.to_be_bytes());
        out.extend(b"jP  ");
        out.extend([0x0D, 0x0A, 0x87, 0x0A]);

        out.extend(20u32.to_be_bytes());
        out.extend(b"ftyp");
        out.extend(b"jp2 ");
        out.extend(0u32.to_be_bytes());
        out.extend(b"jp2 ");

        out.extend(45u32.to_be_bytes());
        out.extend(b"jp2h");
        out.extend(22u32.to_be_bytes());
        out.extend(b"ihdr");
        out.extend(self.height.to_be_bytes());
        out.extend(self.width.to_be_bytes());
        out.extend(self.components.to_be_bytes());
        out.extend([self.depth(), 7, 0, 0]);
        out.extend(15u32.to_be_bytes());
        out.extend(b"colr");
        out.extend([1, 0, 0]);
        out.extend(self.enumcs.to_be_bytes());

        out.extend((8 + codestream.len() as u32).to_be_bytes());
        out.extend(b"jp2c");
        out.extend(codestream);
        out
    }
}
