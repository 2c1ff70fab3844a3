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

    devices::cirrus::crtc.rs

    CRT Controller register file with the Cirrus overflow and extended display registers.
    CRT timing itself belongs to the base VGA device; this unit only supplies the values the
    display mode is derived from.

*/

use modular_bitfield::prelude::*;

use crate::videocard::VideoCardStateEntry;

pub const CRTC_REGISTER_COUNT: usize = 0x40;
/// First CRTC index that is only writable while extensions are unlocked.
pub const FIRST_PROTECTED: u8 = 0x19;
pub const CHIP_ID_REGISTER: u8 = 0x27;

const CR_HORIZONTAL_DISPLAY_END: usize = 0x01;
const CR_OVERFLOW: usize = 0x07;
const CR_START_ADDRESS_HI: usize = 0x0C;
const CR_START_ADDRESS_LO: usize = 0x0D;
const CR_VERTICAL_RETRACE_END: usize = 0x11;
const CR_VERTICAL_DISPLAY_END: usize = 0x12;
const CR_OFFSET: usize = 0x13;
const CR_MISC_CONTROL: usize = 0x1A;
const CR_EXT_DISPLAY_CONTROL: usize = 0x1B;
const CR_EXT_OVERLAY: usize = 0x1D;

/// Standard 640x480 register values present until the BIOS programs a mode.
const CRTC_DEFAULTS: [(usize, u8); 17] = [
    (0x00, 0x5F),
    (0x01, 0x4F),
    (0x02, 0x50),
    (0x03, 0x82),
    (0x04, 0x54),
    (0x05, 0x80),
    (0x06, 0x0B),
    (0x07, 0x3E),
    (0x09, 0x40),
    (0x10, 0xEA),
    (0x11, 0x8C),
    (0x12, 0xDF),
    (0x13, 0x50),
    (0x15, 0xE7),
    (0x16, 0x04),
    (0x17, 0xE3),
    (0x18, 0xFF),
];

/// CR1B: Extended Display Controls
#[bitfield]
#[derive(Copy, Clone)]
pub struct CExtDisplayControlRegister {
    pub start_address_16: bool,
    pub extended_blanking: bool,
    pub start_address_17_18: B2,
    pub offset_8: bool,
    pub blanking_control: bool,
    #[skip]
    unused: B2,
}

#[derive(Clone)]
pub struct Crtc {
    address_byte: u8,
    registers: [u8; CRTC_REGISTER_COUNT],
    chip_id: u8,
}

impl Crtc {
    pub fn new(chip_id: u8) -> Self {
        let mut registers = [0; CRTC_REGISTER_COUNT];
        for (index, value) in CRTC_DEFAULTS {
            registers[index] = value;
        }
        Self {
            address_byte: 0,
            registers,
            chip_id,
        }
    }

    pub fn reset(&mut self) {
        *self = Crtc::new(self.chip_id);
    }

    pub fn read_crtc_register_address(&self) -> u8 {
        self.address_byte
    }

    pub fn write_crtc_register_address(&mut self, byte: u8) {
        self.address_byte = byte & 0x3F;
    }

    pub fn read_crtc_register_data(&self) -> u8 {
        match self.address_byte {
            CHIP_ID_REGISTER => self.chip_id,
            index => self.registers[index as usize],
        }
    }

    /// Write the selected register. Returns true if the display mode must be recalculated.
    /// Extension lock enforcement is handled by the owning card.
    pub fn write_crtc_register_data(&mut self, byte: u8) -> bool {
        let index = self.address_byte as usize;

        if index == CHIP_ID_REGISTER as usize {
            log::trace!("Write to read-only CR27 ignored: {:02X}", byte);
            return false;
        }

        if index <= CR_OVERFLOW && self.write_protected() {
            // Line compare bit 8 stays writable.
            if index == CR_OVERFLOW {
                self.registers[index] = (self.registers[index] & !0x10) | (byte & 0x10);
            }
            log::trace!("CR{:02X} write {:02X} blocked by CR11 protect bit", index, byte);
            return false;
        }

        self.registers[index] = byte;
        log::trace!("Write to CRTC register CR{:02X}: {:02X}", index, byte);

        matches!(
            index,
            CR_HORIZONTAL_DISPLAY_END
                | CR_OVERFLOW
                | CR_START_ADDRESS_HI
                | CR_START_ADDRESS_LO
                | CR_VERTICAL_DISPLAY_END
                | CR_OFFSET
                | CR_MISC_CONTROL
                | CR_EXT_DISPLAY_CONTROL
                | CR_EXT_OVERLAY
        )
    }

    #[inline]
    fn write_protected(&self) -> bool {
        self.registers[CR_VERTICAL_RETRACE_END] & 0x80 != 0
    }

    #[inline]
    fn ext_display_control(&self) -> CExtDisplayControlRegister {
        CExtDisplayControlRegister::from_bytes([self.registers[CR_EXT_DISPLAY_CONTROL]])
    }

    /// Number of displayed character clocks.
    pub fn horizontal_displayed(&self) -> u32 {
        self.registers[CR_HORIZONTAL_DISPLAY_END] as u32 + 1
    }

    /// Number of displayed scanlines.
    pub fn vertical_displayed(&self) -> u32 {
        let overflow = self.registers[CR_OVERFLOW] as u32;
        let end = self.registers[CR_VERTICAL_DISPLAY_END] as u32
            | ((overflow >> 1) & 0x01) << 8
            | ((overflow >> 6) & 0x01) << 9;
        end + 1
    }

    /// Row offset in bytes.
    pub fn offset(&self) -> u32 {
        let offset = self.registers[CR_OFFSET] as u32 | (self.ext_display_control().offset_8() as u32) << 8;
        offset * 8
    }

    /// Display start address in bytes.
    pub fn start_address(&self, bit19: bool) -> u32 {
        let ext = self.ext_display_control();
        let mut address = (self.registers[CR_START_ADDRESS_HI] as u32) << 8
            | self.registers[CR_START_ADDRESS_LO] as u32
            | (ext.start_address_16() as u32) << 16
            | (ext.start_address_17_18() as u32) << 17;
        if bit19 && self.registers[CR_EXT_OVERLAY] & 0x80 != 0 {
            address |= 1 << 19;
        }
        address * 4
    }

    pub fn interlaced(&self) -> bool {
        self.registers[CR_MISC_CONTROL] & 0x01 != 0
    }

    #[rustfmt::skip]
    pub fn get_state(&self) -> Vec<(String, VideoCardStateEntry)> {
        let mut crtc_vec = Vec::new();
        for index in 0..0x19 {
            crtc_vec.push((format!("[CR{:02X}]", index), VideoCardStateEntry::Value8(self.registers[index])));
        }
        crtc_vec.push(("[CR1A] Misc Control".to_string(), VideoCardStateEntry::String(format!("{:08b}", self.registers[CR_MISC_CONTROL]))));
        crtc_vec.push(("[CR1B] Ext Display".to_string(), VideoCardStateEntry::String(format!("{:08b}", self.registers[CR_EXT_DISPLAY_CONTROL]))));
        crtc_vec.push(("[CR1D] Overlay Ext".to_string(), VideoCardStateEntry::String(format!("{:08b}", self.registers[CR_EXT_OVERLAY]))));
        crtc_vec.push(("[CR27] Chip ID".to_string(), VideoCardStateEntry::Value8(self.chip_id)));
        crtc_vec.push(("Offset".to_string(), VideoCardStateEntry::String(format!("{}", self.offset()))));
        crtc_vec.push(("Interlaced".to_string(), VideoCardStateEntry::String(format!("{}", self.interlaced()))));
        crtc_vec
    }
}
