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

    devices::cirrus::cursor.rs

    Hardware cursor registers, cursor pattern decoding and the 16-entry overlay palette.

*/

//! The cursor pattern lives in the last 16K of video memory. Each pixel takes one bit from
//! each of two planes:
//!
//! | plane 0 | plane 1 | result                     |
//! |---------|---------|----------------------------|
//! | 0       | 0       | transparent                |
//! | 1       | 0       | inverted screen pixel      |
//! | 0       | 1       | overlay palette entry 0    |
//! | 1       | 1       | overlay palette entry 15   |

use modular_bitfield::prelude::*;

use super::{
    dac::{dac_to_u32, OverlayPalette},
    vram::Vram,
};
use crate::videocard::VideoCardStateEntry;

pub const CURSOR_BACKGROUND: usize = 0;
pub const CURSOR_FOREGROUND: usize = 15;
pub const OVERSCAN_ENTRY: usize = 2;

const CURSOR_PATTERN_AREA: usize = 0x4000;
const CURSOR_PATTERN_GRANULARITY: usize = 256;

/// SR12: Graphics Cursor Attributes
#[bitfield]
#[derive(Copy, Clone)]
pub struct CursorAttributeRegister {
    pub enable: bool,
    pub overlay_access: bool,
    pub large: bool,
    #[skip]
    unused: B4,
    pub overscan_overlay: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CursorPixel {
    Transparent,
    Invert,
    Background,
    Foreground,
}

#[derive(Clone)]
pub struct Cursor {
    x: u16,
    y: u16,
    attributes: CursorAttributeRegister,
    pattern_select: u8,
    overlay: OverlayPalette,
    large_supported: bool,
}

impl Cursor {
    pub fn new(large_supported: bool) -> Self {
        Self {
            x: 0,
            y: 0,
            attributes: CursorAttributeRegister::new(),
            pattern_select: 0,
            overlay: [[0; 3]; 16],
            large_supported,
        }
    }

    /// Reset cursor registers. The overlay palette is retained.
    pub fn reset(&mut self) {
        self.x = 0;
        self.y = 0;
        self.attributes = CursorAttributeRegister::new();
        self.pattern_select = 0;
    }

    pub fn read_register(&self, index: u8) -> u8 {
        match index & 0x1F {
            0x10 => (self.x >> 3) as u8,
            0x11 => (self.y >> 3) as u8,
            0x12 => self.attributes.into_bytes()[0],
            0x13 => self.pattern_select,
            _ => 0,
        }
    }

    /// Write SR10-SR13. `index` is the full sequencer index byte; for SR10 and SR11 bits 7:5
    /// of the index supply the low three bits of the position.
    pub fn write_register(&mut self, index: u8, data: u8) {
        let fine = (index >> 5) as u16;
        match index & 0x1F {
            0x10 => self.x = (data as u16) << 3 | fine,
            0x11 => self.y = (data as u16) << 3 | fine,
            0x12 => {
                self.attributes = CursorAttributeRegister::from_bytes([data]);
                if self.attributes.large() && !self.large_supported {
                    log::warn!("64x64 cursor selected on a chip without large cursor support");
                }
                log::trace!("Cursor attributes: {:08b}", data);
            }
            0x13 => self.pattern_select = data,
            _ => {}
        }
    }

    #[inline]
    pub fn position(&self) -> (u32, u32) {
        (self.x as u32, self.y as u32)
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.attributes.enable()
    }

    /// 3C8/3C9 address the overlay palette instead of the DAC.
    #[inline]
    pub fn overlay_access(&self) -> bool {
        self.attributes.overlay_access()
    }

    #[inline]
    pub fn overscan_from_overlay(&self) -> bool {
        self.attributes.overscan_overlay()
    }

    #[inline]
    pub fn size(&self) -> u32 {
        if self.attributes.large() && self.large_supported {
            64
        }
        else {
            32
        }
    }

    pub fn pattern_address(&self, vram_size: usize) -> usize {
        let select = if self.size() == 64 {
            self.pattern_select & 0x3C
        }
        else {
            self.pattern_select & 0x3F
        };
        vram_size - CURSOR_PATTERN_AREA + select as usize * CURSOR_PATTERN_GRANULARITY
    }

    /// Decode the pattern pixel at (`cx`, `cy`) within the cursor.
    pub fn pixel(&self, vram: &Vram, cx: u32, cy: u32) -> CursorPixel {
        let base = self.pattern_address(vram.len());
        let column = (cx / 8) as usize;
        let (plane0, plane1) = if self.size() == 64 {
            let row = base + cy as usize * 16;
            (row + column, row + 8 + column)
        }
        else {
            let row = base + cy as usize * 4;
            (row + column, row + 128 + column)
        };

        let bit = 0x80 >> (cx % 8);
        let p0 = vram.read_u8(plane0) & bit != 0;
        let p1 = vram.read_u8(plane1) & bit != 0;
        match (p0, p1) {
            (false, false) => CursorPixel::Transparent,
            (true, false) => CursorPixel::Invert,
            (false, true) => CursorPixel::Background,
            (true, true) => CursorPixel::Foreground,
        }
    }

    /// Combine a cursor pixel with the xRGB pixel beneath it.
    #[inline]
    pub fn blend(&self, pixel: CursorPixel, screen: u32) -> u32 {
        match pixel {
            CursorPixel::Transparent => screen,
            CursorPixel::Invert => !screen & 0x00FF_FFFF,
            CursorPixel::Background => self.overlay_u32(CURSOR_BACKGROUND),
            CursorPixel::Foreground => self.overlay_u32(CURSOR_FOREGROUND),
        }
    }

    #[inline]
    pub fn overlay_u32(&self, entry: usize) -> u32 {
        dac_to_u32(&self.overlay[entry & 0x0F])
    }

    pub fn overlay(&self) -> &OverlayPalette {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut OverlayPalette {
        &mut self.overlay
    }

    #[rustfmt::skip]
    pub fn get_state(&self) -> Vec<(String, VideoCardStateEntry)> {
        let mut cursor_vec = Vec::new();
        cursor_vec.push(("[SR10] X".to_string(), VideoCardStateEntry::Value16(self.x)));
        cursor_vec.push(("[SR11] Y".to_string(), VideoCardStateEntry::Value16(self.y)));
        cursor_vec.push(("[SR12] Attributes".to_string(), VideoCardStateEntry::String(format!("{:08b}", self.attributes.into_bytes()[0]))));
        cursor_vec.push(("[SR13] Pattern".to_string(), VideoCardStateEntry::Value8(self.pattern_select)));
        cursor_vec.push(("Size".to_string(), VideoCardStateEntry::String(format!("{0}x{0}", self.size()))));
        for i in 0..self.overlay.len() {
            let color = self.overlay_u32(i);
            cursor_vec.push((
                format!("Overlay {:02}", i),
                VideoCardStateEntry::Color(format!("#{:06X}", color), (color >> 16) as u8, (color >> 8) as u8, color as u8),
            ));
        }
        cursor_vec
    }
}
