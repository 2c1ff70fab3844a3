/*
    MartyPC
    https://github.com/dbalsom/martypc

    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    devices::cirrus::variant.rs

    Chip variant selection and the capability table each variant is built from.

*/

use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

pub const VRAM_256K: usize = 0x40000;
pub const VRAM_1M: usize = 0x100000;
pub const VRAM_2M: usize = 0x200000;
pub const VRAM_4M: usize = 0x400000;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum ChipVariant {
    #[default]
    GD5428,
    GD5430,
    GD5446,
}

/// Fixed capabilities of a chip revision.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChipCaps {
    /// Value returned by CR27.
    pub chip_id: u8,
    pub max_vram: usize,
    /// 32bpp display and BitBLT pixel width.
    pub true_colour_32: bool,
    /// 64x64 hardware cursor (SR12 bit 2).
    pub large_cursor: bool,
    /// BitBLT registers mirrored at B8000 when SR17 bit 2 is set.
    pub mmio_blt: bool,
    /// CR1D bit 7 supplies display start address bit 19.
    pub start_addr_bit19: bool,
    /// Width of the BitBLT source/destination address registers.
    pub blt_addr_mask: u32,
}

impl ChipVariant {
    pub fn caps(&self) -> ChipCaps {
        match self {
            ChipVariant::GD5428 => ChipCaps {
                chip_id: 0x98,
                max_vram: VRAM_2M,
                true_colour_32: false,
                large_cursor: false,
                mmio_blt: false,
                start_addr_bit19: false,
                blt_addr_mask: 0x1F_FFFF,
            },
            ChipVariant::GD5430 => ChipCaps {
                chip_id: 0xA0,
                max_vram: VRAM_2M,
                true_colour_32: false,
                large_cursor: true,
                mmio_blt: true,
                start_addr_bit19: false,
                blt_addr_mask: 0x1F_FFFF,
            },
            ChipVariant::GD5446 => ChipCaps {
                chip_id: 0xB8,
                max_vram: VRAM_4M,
                true_colour_32: true,
                large_cursor: true,
                mmio_blt: true,
                start_addr_bit19: true,
                blt_addr_mask: 0x3F_FFFF,
            },
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ChipVariant::GD5428 => "Cirrus Logic CL-GD5428",
            ChipVariant::GD5430 => "Cirrus Logic CL-GD5430",
            ChipVariant::GD5446 => "Cirrus Logic CL-GD5446",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_variant_parse() {
        assert_eq!(ChipVariant::from_str("GD5430").unwrap(), ChipVariant::GD5430);
        assert_eq!(ChipVariant::from_str("gd5446").unwrap(), ChipVariant::GD5446);
        assert!(ChipVariant::from_str("GD5480").is_err());
        assert_eq!(ChipVariant::GD5428.to_string(), "GD5428");
    }

    #[test]
    fn test_chip_ids_unique() {
        let ids: Vec<u8> = ChipVariant::iter().map(|v| v.caps().chip_id).collect();
        for (i, id) in ids.iter().enumerate() {
            assert!(!ids[i + 1..].contains(id));
        }
    }
}
