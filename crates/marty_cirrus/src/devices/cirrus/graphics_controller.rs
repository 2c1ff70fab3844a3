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

    devices::cirrus::graphics_controller.rs

    Implements the Graphics Controller register file with the Cirrus bank offset, mode
    extension and colour expansion registers. GR20 and above belong to the BitBLT engine.

*/

use modular_bitfield::prelude::*;

use super::blitter::ExpandColours;
use crate::videocard::VideoCardStateEntry;

/// First graphics controller index that is only writable while extensions are unlocked.
pub const FIRST_PROTECTED: u8 = 0x09;
/// First graphics controller index owned by the BitBLT engine.
pub const FIRST_BLT_REGISTER: u8 = 0x20;

/// GR0B: Graphics Controller Mode Extensions
#[bitfield]
#[derive(Copy, Clone)]
pub struct GModeExtensionsRegister {
    pub dual_bank: bool,
    pub enhanced_writes: bool,
    pub eight_byte_latches: bool,
    pub extended_write_modes: bool,
    pub by8_addressing: bool,
    pub granularity_16k: bool,
    #[skip]
    unused: B2,
}

/// GR06: Graphics Miscellaneous Register
#[bitfield]
#[derive(Copy, Clone)]
pub struct GMiscellaneousRegister {
    pub graphics_mode: bool,
    pub chain_odd_even: bool,
    #[bits = 2]
    pub memory_map: MemoryMap,
    #[skip]
    unused: B4,
}

/// Host address range decoded for the banked aperture.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, BitfieldSpecifier)]
pub enum MemoryMap {
    A0000_128K,
    A0000_64K,
    B0000_32K,
    B8000_32K,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BankAccess {
    Read,
    Write,
}

#[derive(Clone)]
pub struct GraphicsController {
    address_byte: u8,

    /// GR0, GR10, GR12, GR14
    background: [u8; 4],
    /// GR1, GR11, GR13, GR15
    foreground: [u8; 4],
    color_compare: u8,
    data_rotate: u8,
    read_map_select: u8,
    mode: u8,
    miscellaneous: GMiscellaneousRegister,
    color_dont_care: u8,
    bitmask: u8,

    offset: [u8; 2],
    mode_ext: GModeExtensionsRegister,
}

impl Default for GraphicsController {
    fn default() -> Self {
        Self {
            address_byte: 0,
            background: [0; 4],
            foreground: [0; 4],
            color_compare: 0,
            data_rotate: 0,
            read_map_select: 0,
            mode: 0x40,
            miscellaneous: GMiscellaneousRegister::from_bytes([0x05]),
            color_dont_care: 0x0F,
            bitmask: 0xFF,
            offset: [0; 2],
            mode_ext: GModeExtensionsRegister::new(),
        }
    }
}

impl GraphicsController {
    pub fn new() -> Self {
        GraphicsController::default()
    }

    pub fn reset(&mut self) {
        *self = GraphicsController::default();
    }

    pub fn read_address(&self) -> u8 {
        self.address_byte
    }

    /// Handle a write to the Graphics Address Register
    pub fn write_address(&mut self, byte: u8) {
        self.address_byte = byte & 0x3F;
    }

    /// Read a graphics controller register by index. Used by the port interface and the
    /// memory-mapped BitBLT window.
    pub fn read_register(&self, index: u8) -> u8 {
        match index {
            0x00 => self.background[0],
            0x01 => self.foreground[0],
            0x02 => self.color_compare,
            0x03 => self.data_rotate,
            0x04 => self.read_map_select,
            0x05 => self.mode,
            0x06 => self.miscellaneous.into_bytes()[0],
            0x07 => self.color_dont_care,
            0x08 => self.bitmask,
            0x09 => self.offset[0],
            0x0A => self.offset[1],
            0x0B => self.mode_ext.into_bytes()[0],
            0x10 | 0x12 | 0x14 => self.background[((index - 0x10) / 2 + 1) as usize],
            0x11 | 0x13 | 0x15 => self.foreground[((index - 0x11) / 2 + 1) as usize],
            _ => 0,
        }
    }

    pub fn write_register(&mut self, index: u8, byte: u8) {
        match index {
            0x00 => self.background[0] = byte,
            0x01 => self.foreground[0] = byte,
            0x02 => self.color_compare = byte & 0x0F,
            0x03 => self.data_rotate = byte & 0x1F,
            0x04 => self.read_map_select = byte & 0x03,
            0x05 => self.mode = byte & 0x7B,
            0x06 => self.miscellaneous = GMiscellaneousRegister::from_bytes([byte & 0x0F]),
            0x07 => self.color_dont_care = byte & 0x0F,
            0x08 => self.bitmask = byte,
            0x09 | 0x0A => {
                self.offset[(index - 0x09) as usize] = byte;
                log::trace!("GR{:02X} bank offset: {:02X}", index, byte);
            }
            0x0B => self.mode_ext = GModeExtensionsRegister::from_bytes([byte]),
            0x10 | 0x12 | 0x14 => self.background[((index - 0x10) / 2 + 1) as usize] = byte,
            0x11 | 0x13 | 0x15 => self.foreground[((index - 0x11) / 2 + 1) as usize] = byte,
            _ => {
                log::trace!("Write to unimplemented graphics register GR{:02X}: {:02X}", index, byte);
            }
        }
    }

    /// Base of the VRAM window selected for the given kind of access. Reads always use
    /// GR9; writes use GRA when dual banking is enabled.
    pub fn bank_base(&self, access: BankAccess) -> usize {
        let offset = match access {
            BankAccess::Write if self.mode_ext.dual_bank() => self.offset[1],
            _ => self.offset[0],
        } as usize;

        if self.mode_ext.granularity_16k() {
            offset << 14
        }
        else {
            offset << 16
        }
    }

    /// Offset within the window selected by GR06 for an aperture offset relative to A0000,
    /// or None if the memory map does not decode it.
    pub fn map_offset(&self, offset: usize) -> Option<usize> {
        match self.miscellaneous.memory_map() {
            MemoryMap::A0000_128K => Some(offset),
            MemoryMap::A0000_64K if offset < 0x10000 => Some(offset),
            MemoryMap::B0000_32K if (0x10000..0x18000).contains(&offset) => Some(offset - 0x10000),
            MemoryMap::B8000_32K if (0x18000..0x20000).contains(&offset) => Some(offset - 0x18000),
            _ => None,
        }
    }

    /// Translate an aperture offset into a VRAM address. The result is not masked to the
    /// memory size.
    #[inline]
    pub fn bank_address(&self, offset: usize, access: BankAccess) -> usize {
        self.bank_base(access) + (offset & 0xFFFF)
    }

    pub fn expand_colours(&self) -> ExpandColours {
        ExpandColours {
            fg: u32::from_le_bytes(self.foreground),
            bg: u32::from_le_bytes(self.background),
        }
    }

    #[rustfmt::skip]
    pub fn get_state(&self) -> Vec<(String, VideoCardStateEntry)> {
        let mut graphics_vec = Vec::new();
        graphics_vec.push(("[GR00] Background".to_string(), VideoCardStateEntry::Value8(self.background[0])));
        graphics_vec.push(("[GR01] Foreground".to_string(), VideoCardStateEntry::Value8(self.foreground[0])));
        graphics_vec.push(("[GR05] Mode".to_string(), VideoCardStateEntry::String(format!("{:08b}", self.mode))));
        graphics_vec.push(("[GR06] Miscellaneous".to_string(), VideoCardStateEntry::String(format!("{:04b}", self.miscellaneous.into_bytes()[0]))));
        graphics_vec.push(("[GR08] Bit Mask".to_string(), VideoCardStateEntry::String(format!("{:08b}", self.bitmask))));
        graphics_vec.push(("[GR09] Offset 0".to_string(), VideoCardStateEntry::Value8(self.offset[0])));
        graphics_vec.push(("[GR0A] Offset 1".to_string(), VideoCardStateEntry::Value8(self.offset[1])));
        graphics_vec.push(("[GR0B] Mode Extensions".to_string(), VideoCardStateEntry::String(format!("{:08b}", self.mode_ext.into_bytes()[0]))));
        graphics_vec.push(("Expand Background".to_string(), VideoCardStateEntry::String(format!("{:08X}", u32::from_le_bytes(self.background)))));
        graphics_vec.push(("Expand Foreground".to_string(), VideoCardStateEntry::String(format!("{:08X}", u32::from_le_bytes(self.foreground)))));
        graphics_vec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(gc: &mut GraphicsController, index: u8, data: u8) {
        gc.write_address(index);
        gc.write_register(index, data);
    }

    #[test]
    fn test_single_bank() {
        let mut gc = GraphicsController::new();
        write(&mut gc, 0x09, 0x03);
        write(&mut gc, 0x0A, 0x07);
        assert_eq!(gc.bank_address(0x1234, BankAccess::Read), 0x31234);
        assert_eq!(gc.bank_address(0x1234, BankAccess::Write), 0x31234);
        assert_eq!(gc.bank_address(0x11234, BankAccess::Read), 0x31234);
    }

    #[test]
    fn test_dual_bank_and_granularity() {
        let mut gc = GraphicsController::new();
        write(&mut gc, 0x09, 0x02);
        write(&mut gc, 0x0A, 0x05);
        write(&mut gc, 0x0B, 0x01);
        assert_eq!(gc.bank_base(BankAccess::Read), 0x20000);
        assert_eq!(gc.bank_base(BankAccess::Write), 0x50000);

        write(&mut gc, 0x0B, 0x21);
        assert_eq!(gc.bank_base(BankAccess::Read), 0x8000);
        assert_eq!(gc.bank_base(BankAccess::Write), 0x14000);
    }

    #[test]
    fn test_expand_colours() {
        let mut gc = GraphicsController::new();
        for (index, data) in [(0x00, 0x10), (0x10, 0x32), (0x12, 0x54), (0x14, 0x76), (0x01, 0x01), (0x11, 0x23)] {
            write(&mut gc, index, data);
        }
        let colours = gc.expand_colours();
        assert_eq!(colours.bg, 0x7654_3210);
        assert_eq!(colours.fg, 0x0000_2301);
        assert_eq!(gc.read_register(0x12), 0x54);
    }

    #[test]
    fn test_memory_map_select() {
        let mut gc = GraphicsController::new();
        assert_eq!(gc.map_offset(0x1234), Some(0x1234));
        assert_eq!(gc.map_offset(0x10000), None);

        write(&mut gc, 0x06, 0x0D);
        assert_eq!(gc.map_offset(0x18010), Some(0x10));
        assert_eq!(gc.map_offset(0x0010), None);

        write(&mut gc, 0x06, 0x09);
        assert_eq!(gc.map_offset(0x10010), Some(0x10));
        assert_eq!(gc.map_offset(0x18000), None);

        write(&mut gc, 0x06, 0x01);
        assert_eq!(gc.map_offset(0x1FFFF), Some(0x1FFFF));
        assert_eq!(gc.read_register(0x06), 0x01);
    }

    #[test]
    fn test_address_is_six_bits() {
        let mut gc = GraphicsController::new();
        gc.write_address(0x71);
        assert_eq!(gc.read_address(), 0x31);
    }
}
