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

    devices::cirrus::mmio.rs

    Implementation of the MemoryMappedDevice trait for the Cirrus card: the banked VGA
    aperture, the memory-mapped BitBLT registers and the linear framebuffer aperture.

*/

use super::*;
use crate::bus::{MemRangeDescriptor, MemoryMappedDevice, NO_IO_BYTE};
use graphics_controller::BankAccess;

/// Translate an offset within the memory-mapped BitBLT window into a graphics controller index.
pub fn mmio_blt_register(offset: usize) -> Option<u8> {
    let index = match offset {
        0x00 => 0x00,
        0x01 => 0x10,
        0x02 => 0x12,
        0x03 => 0x14,
        0x04 => 0x01,
        0x05 => 0x11,
        0x06 => 0x13,
        0x07 => 0x15,
        0x08..=0x0F => 0x20 + (offset - 0x08) as u8,
        0x10..=0x12 => 0x28 + (offset - 0x10) as u8,
        0x14..=0x16 => 0x2C + (offset - 0x14) as u8,
        0x17 => 0x2F,
        0x18 => 0x30,
        0x1A => 0x32,
        0x1B => 0x33,
        0x1C => 0x34,
        0x1D => 0x35,
        0x20 => 0x38,
        0x21 => 0x39,
        0x40 => 0x31,
        _ => return None,
    };
    Some(index)
}

impl CirrusCard {
    /// Graphics controller index for an aperture offset that falls within the enabled
    /// memory-mapped BitBLT window.
    fn mmio_blt_decode(&self, offset: usize) -> Option<u8> {
        if !self.caps.mmio_blt || !self.sequencer.mmio_enabled() {
            return None;
        }
        if (MMIO_BLT_OFFSET..MMIO_BLT_OFFSET + MMIO_BLT_SIZE).contains(&offset) {
            mmio_blt_register(offset - MMIO_BLT_OFFSET)
        }
        else {
            None
        }
    }

    /// Read from the VGA aperture. `offset` is relative to A0000. Offsets outside the
    /// window selected by GR06 read as open bus.
    pub fn mem_read(&self, offset: usize) -> u8 {
        if let Some(index) = self.mmio_blt_decode(offset) {
            return self.read_graphics_register(index);
        }
        match self.gc.map_offset(offset) {
            Some(offset) => self.vram.read_u8(self.gc.bank_address(offset, BankAccess::Read)),
            None => NO_IO_BYTE,
        }
    }

    /// Write to the VGA aperture. `offset` is relative to A0000. While a system to VRAM
    /// BitBLT is active, writes feed the engine instead of memory.
    pub fn mem_write(&mut self, offset: usize, data: u8) {
        if let Some(index) = self.mmio_blt_decode(offset) {
            self.write_graphics_register(index, data);
            return;
        }
        if self.blitter.system_transfer_active() {
            self.blitter.system_write(&mut self.vram, data);
            return;
        }
        if let Some(offset) = self.gc.map_offset(offset) {
            let address = self.gc.bank_address(offset, BankAccess::Write);
            self.vram.write_u8(address, data);
        }
    }

    /// Read from the linear aperture. `offset` is relative to the aperture base.
    pub fn lfb_read(&self, offset: usize) -> u8 {
        self.vram.read_u8(offset)
    }

    pub fn lfb_write(&mut self, offset: usize, data: u8) {
        if self.blitter.system_transfer_active() {
            self.blitter.system_write(&mut self.vram, data);
        }
        else {
            self.vram.write_u8(offset, data);
        }
    }

    #[inline]
    fn lfb_offset(&self, address: usize) -> Option<usize> {
        match self.linear_base {
            Some(base) if address >= base && address - base < self.vram.len() => Some(address - base),
            _ => None,
        }
    }

    #[inline]
    fn aperture_offset(&self, address: usize) -> Option<usize> {
        if (VGA_APERTURE_ADDRESS..VGA_APERTURE_ADDRESS + VGA_APERTURE_SIZE).contains(&address)
            && self.misc_output_register.enable_ram()
        {
            Some(address - VGA_APERTURE_ADDRESS)
        }
        else {
            None
        }
    }
}

impl MemoryMappedDevice for CirrusCard {
    fn get_read_wait(&mut self, _address: usize, _cycles: u32) -> u32 {
        0
    }

    fn mmio_read_u8(&mut self, address: usize, _cycles: u32) -> (u8, u32) {
        (self.mmio_peek_u8(address), 0)
    }

    fn mmio_read_u16(&mut self, address: usize, _cycles: u32) -> (u16, u32) {
        (self.mmio_peek_u16(address), 0)
    }

    fn mmio_peek_u8(&self, address: usize) -> u8 {
        if let Some(offset) = self.lfb_offset(address) {
            return self.lfb_read(offset);
        }
        match self.aperture_offset(address) {
            Some(offset) => self.mem_read(offset),
            None => NO_IO_BYTE,
        }
    }

    fn mmio_peek_u16(&self, address: usize) -> u16 {
        (self.mmio_peek_u8(address + 1) as u16) << 8 | self.mmio_peek_u8(address) as u16
    }

    fn get_write_wait(&mut self, _address: usize, _cycles: u32) -> u32 {
        0
    }

    fn mmio_write_u8(&mut self, address: usize, data: u8, _cycles: u32) -> u32 {
        if let Some(offset) = self.lfb_offset(address) {
            self.lfb_write(offset, data);
        }
        else if let Some(offset) = self.aperture_offset(address) {
            self.mem_write(offset, data);
        }
        0
    }

    fn mmio_write_u16(&mut self, address: usize, data: u16, cycles: u32) -> u32 {
        self.mmio_write_u8(address, data as u8, cycles);
        self.mmio_write_u8(address + 1, (data >> 8) as u8, cycles);
        0
    }

    fn get_mapping(&self) -> Vec<MemRangeDescriptor> {
        let mut mapping = vec![MemRangeDescriptor::new(VGA_APERTURE_ADDRESS, VGA_APERTURE_SIZE, false)];
        if let Some(base) = self.linear_base {
            mapping.push(MemRangeDescriptor::new(base, self.vram.len(), false));
        }
        mapping
    }
}
