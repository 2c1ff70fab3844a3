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

    devices::cirrus::dac.rs

    Implements the palette DAC and the Cirrus hidden DAC register that shares the pel mask
    port.

*/

//! The hidden DAC register is reached through the pel mask port (0x3C6). Four consecutive
//! reads of 0x3C6 arm it; the next read of 0x3C6 returns it and the next write to 0x3C6
//! stores into it. Either of those disarms the sequence again, as does any access to the
//! other DAC ports or a write to 0x3C6 before the sequence is complete.

use crate::videocard::VideoCardStateEntry;

pub const DAC_STATE_READ: u8 = 0;
pub const DAC_STATE_WRITE: u8 = 0x03;
pub const HIDDEN_DAC_ARM_COUNT: u8 = 4;

/// 16-entry extended palette used by the hardware cursor and overscan border.
pub type OverlayPalette = [[u8; 3]; 16];

/// Expand a 6-bit DAC component to 8 bits.
#[inline]
pub fn dac_to_rgb8(c: u8) -> u8 {
    ((c as u32 & 0x3F) * 255 / 63) as u8
}

/// Convert a 6-bit DAC triple to xRGB.
#[inline]
pub fn dac_to_u32(rgb: &[u8; 3]) -> u32 {
    (dac_to_rgb8(rgb[0]) as u32) << 16 | (dac_to_rgb8(rgb[1]) as u32) << 8 | dac_to_rgb8(rgb[2]) as u32
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HiddenDacState {
    pub mode: u8,
    pub phase: u8,
}

impl HiddenDacState {
    #[inline]
    pub fn armed(&self) -> bool {
        self.phase >= HIDDEN_DAC_ARM_COUNT
    }

    /// Bit 0 of the hidden register selects 5-6-5 over 5-5-5 for 16bpp modes.
    #[inline]
    pub fn rgb565(&self) -> bool {
        self.mode & 0x01 != 0
    }

    #[inline]
    pub fn reset_phase(&mut self) {
        self.phase = 0;
    }
}

#[derive(Clone)]
pub struct Dac {
    pel_write_address: u8,
    pel_write_address_color: u8,
    pel_read_address: u8,
    pel_read_address_color: u8,
    dac_state: u8,
    pel_mask: u8,

    color_registers: [[u8; 3]; 256],
    color_registers_u32: [u32; 256],

    hidden: HiddenDacState,
}

impl Default for Dac {
    fn default() -> Self {
        Self {
            pel_write_address: 0,
            pel_write_address_color: 0,
            pel_read_address: 0,
            pel_read_address_color: 0,
            dac_state: DAC_STATE_READ,
            pel_mask: 0xFF,
            color_registers: [[0; 3]; 256],
            color_registers_u32: [0; 256],
            hidden: HiddenDacState::default(),
        }
    }
}

impl Dac {
    pub fn new() -> Self {
        Dac::default()
    }

    /// Reset sequencing state. Palette contents are retained like the real RAMDAC.
    pub fn reset(&mut self) {
        self.pel_write_address = 0;
        self.pel_write_address_color = 0;
        self.pel_read_address = 0;
        self.pel_read_address_color = 0;
        self.dac_state = DAC_STATE_READ;
        self.pel_mask = 0xFF;
        self.hidden = HiddenDacState::default();
    }

    #[inline]
    pub fn hidden(&self) -> HiddenDacState {
        self.hidden
    }

    pub fn read_pel_mask(&mut self) -> u8 {
        if self.hidden.armed() {
            self.hidden.reset_phase();
            log::trace!("Hidden DAC read: {:02X}", self.hidden.mode);
            self.hidden.mode
        }
        else {
            self.hidden.phase += 1;
            self.pel_mask
        }
    }

    /// Returns true if the write went to the hidden DAC register.
    pub fn write_pel_mask(&mut self, data: u8) -> bool {
        if self.hidden.armed() {
            log::debug!("Hidden DAC write: {:02X}", data);
            self.hidden.mode = data;
            self.hidden.reset_phase();
            true
        }
        else {
            self.hidden.reset_phase();
            self.pel_mask = data;
            false
        }
    }

    pub fn read_pel_address_write_mode(&mut self) -> u8 {
        self.hidden.reset_phase();
        self.pel_write_address
    }

    pub fn write_pel_address_write_mode(&mut self, data: u8) {
        self.hidden.reset_phase();
        self.pel_write_address = data;
        self.pel_write_address_color = 0;
    }

    pub fn write_pel_address_read_mode(&mut self, data: u8) {
        self.hidden.reset_phase();
        self.pel_read_address = data;
        self.pel_read_address_color = 0;
    }

    pub fn read_color_dac_state(&mut self) -> u8 {
        self.hidden.reset_phase();
        self.dac_state
    }

    /// Read a component from the palette, or from `overlay` if overlay access is enabled.
    pub fn read_pel_data(&mut self, overlay: Option<&OverlayPalette>) -> u8 {
        self.hidden.reset_phase();
        let color = self.pel_read_address as usize;
        let rgb_idx = self.pel_read_address_color as usize;

        let byte = match overlay {
            Some(overlay) => overlay[color & 0x0F][rgb_idx],
            None => self.color_registers[color][rgb_idx],
        };

        // Automatically increment to next color register, cycling through
        // Red, Green and Blue registers per Read Index
        self.pel_read_address_color += 1;
        if self.pel_read_address_color == 3 {
            self.pel_read_address_color = 0;
            self.pel_read_address = self.pel_read_address.wrapping_add(1);
        }

        self.dac_state = DAC_STATE_READ;
        byte
    }

    /// Write a component to the palette, or to `overlay` if overlay access is enabled.
    pub fn write_pel_data(&mut self, byte: u8, overlay: Option<&mut OverlayPalette>) {
        self.hidden.reset_phase();
        let color = self.pel_write_address as usize;
        let rgb_idx = self.pel_write_address_color as usize;
        let byte = byte & 0x3F;

        let palette_write = match overlay {
            Some(overlay) => {
                overlay[color & 0x0F][rgb_idx] = byte;
                false
            }
            None => {
                self.color_registers[color][rgb_idx] = byte;
                true
            }
        };

        self.pel_write_address_color += 1;
        if self.pel_write_address_color == 3 {
            if palette_write {
                self.color_registers_u32[color] = dac_to_u32(&self.color_registers[color]);
                log::trace!(
                    "Wrote color register [{}] ({:02X},{:02X},{:02X})",
                    color,
                    self.color_registers[color][0],
                    self.color_registers[color][1],
                    self.color_registers[color][2]
                );
            }
            self.pel_write_address_color = 0;
            self.pel_write_address = self.pel_write_address.wrapping_add(1);
        }

        self.dac_state = DAC_STATE_WRITE;
    }

    /// Palette lookup with the pel mask applied.
    #[inline]
    pub fn color_u32(&self, index: u8) -> u32 {
        self.color_registers_u32[(index & self.pel_mask) as usize]
    }

    pub fn get_state(&self) -> Vec<(String, VideoCardStateEntry)> {
        let mut dac_vec = Vec::new();
        dac_vec.push(("Pel Mask".to_string(), VideoCardStateEntry::Value8(self.pel_mask)));
        dac_vec.push(("Hidden DAC".to_string(), VideoCardStateEntry::Value8(self.hidden.mode)));
        dac_vec.push(("Hidden Phase".to_string(), VideoCardStateEntry::Value8(self.hidden.phase)));
        for (i, color) in self.color_registers.iter().enumerate() {
            dac_vec.push((
                format!("{:03}", i),
                VideoCardStateEntry::Color(
                    format!("#{:06X}", self.color_registers_u32[i]),
                    dac_to_rgb8(color[0]),
                    dac_to_rgb8(color[1]),
                    dac_to_rgb8(color[2]),
                ),
            ));
        }
        dac_vec
    }
}
