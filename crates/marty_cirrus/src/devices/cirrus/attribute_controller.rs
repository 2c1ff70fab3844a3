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

    devices::cirrus::attribute_controller.rs

    Attribute Controller register file. Only the overscan color feeds the extended
    display path; the remaining registers are kept readable for the BIOS.

*/

use crate::videocard::VideoCardStateEntry;

pub const ATTRIBUTE_REGISTER_COUNT: usize = 0x15;
pub const AR_MODE_CONTROL: usize = 0x10;
pub const AR_OVERSCAN_COLOR: usize = 0x11;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AttributeRegisterFlipFlop {
    Address,
    Data,
}

#[derive(Clone)]
pub struct AttributeController {
    register_flipflop: AttributeRegisterFlipFlop,
    address_byte: u8,
    registers: [u8; ATTRIBUTE_REGISTER_COUNT],
}

impl Default for AttributeController {
    fn default() -> Self {
        Self {
            register_flipflop: AttributeRegisterFlipFlop::Address,
            address_byte: 0,
            registers: [0; ATTRIBUTE_REGISTER_COUNT],
        }
    }
}

impl AttributeController {
    pub fn new() -> Self {
        AttributeController::default()
    }

    pub fn reset(&mut self) {
        *self = AttributeController::default();
    }

    /// Reading Input Status Register 1 returns the flipflop to address mode.
    pub fn reset_flipflop(&mut self) {
        self.register_flipflop = AttributeRegisterFlipFlop::Address;
    }

    #[inline]
    fn selected(&self) -> usize {
        (self.address_byte & 0x1F) as usize
    }

    /// Read of 0x3C0 returns the address byte including the palette address source bit.
    pub fn read_attribute_address(&self) -> u8 {
        self.address_byte
    }

    /// Read of 0x3C1 returns the selected register.
    pub fn read_attribute_data(&self) -> u8 {
        self.registers.get(self.selected()).copied().unwrap_or(0)
    }

    /// Handle a write to 0x3C0. The flipflop alternates between address and data.
    pub fn write_attribute_register(&mut self, byte: u8) {
        match self.register_flipflop {
            AttributeRegisterFlipFlop::Address => {
                self.address_byte = byte & 0x3F;
                self.register_flipflop = AttributeRegisterFlipFlop::Data;
            }
            AttributeRegisterFlipFlop::Data => {
                let index = self.selected();
                match self.registers.get_mut(index) {
                    Some(register) => *register = byte,
                    None => log::warn!("Invalid attribute register selected: {:02X}", index),
                }
                self.register_flipflop = AttributeRegisterFlipFlop::Address;
            }
        }
    }

    pub fn overscan_color(&self) -> u8 {
        self.registers[AR_OVERSCAN_COLOR]
    }

    #[rustfmt::skip]
    pub fn get_state(&self) -> Vec<(String, VideoCardStateEntry)> {
        let mut attribute_vec = Vec::new();
        attribute_vec.push(("Flipflop".to_string(), VideoCardStateEntry::String(format!("{:?}", self.register_flipflop))));
        for index in 0..0x10 {
            attribute_vec.push((format!("[AR{:02X}] Palette", index), VideoCardStateEntry::Value8(self.registers[index])));
        }
        attribute_vec.push(("[AR10] Mode Control".to_string(), VideoCardStateEntry::String(format!("{:08b}", self.registers[AR_MODE_CONTROL]))));
        attribute_vec.push(("[AR11] Overscan".to_string(), VideoCardStateEntry::Value8(self.registers[AR_OVERSCAN_COLOR])));
        attribute_vec
    }
}
