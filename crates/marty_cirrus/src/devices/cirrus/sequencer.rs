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

    devices::cirrus::sequencer.rs

    Implements the Sequencer with the Cirrus extension registers: the unlock register,
    extended sequencer mode, scratch pads and VCLK synthesis.

*/

use modular_bitfield::prelude::*;

use super::variant::VRAM_2M;
use crate::videocard::VideoCardStateEntry;

pub const REFERENCE_CLOCK: f64 = 14.31818;
pub const UNLOCK_KEY: u8 = 0x12;
pub const LOCKED_READBACK: u8 = 0x0F;

/// Power-on (numerator, denominator) pairs for the four VCLK slots.
pub const VCLK_DEFAULTS: [(u8, u8); 4] = [(0x4A, 0x2B), (0x5B, 0x2F), (0x45, 0x30), (0x7E, 0x33)];

/// First sequencer index that is only writable while extensions are unlocked.
pub const FIRST_PROTECTED: u8 = 0x07;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SequencerRegister {
    Reset,
    ClockingMode,
    MapMask,
    CharacterMapSelect,
    MemoryMode,
    Unlock,
    ExtendedMode,
    EepromControl,
    ScratchPad(usize),
    VclkNumerator(usize),
    DramControl,
    Cursor,
    PerformanceTuning,
    Configuration,
    VclkDenominator(usize),
    MclkSelect,
    Unimplemented,
}

#[bitfield]
#[derive(Copy, Clone)]
pub struct SClockingModeRegister {
    pub nine_dot_disable: bool,
    #[skip]
    unused: B1,
    pub shift_load: bool,
    pub dot_clock_half: bool,
    pub shift_four: bool,
    pub screen_off: bool,
    #[skip]
    unused2: B2,
}

/// SR07: Extended Sequencer Mode
#[bitfield]
#[derive(Copy, Clone)]
pub struct SExtendedModeRegister {
    pub extended: bool,
    pub depth_select: B3,
    pub memory_segment: B4,
}

#[derive(Clone)]
pub struct Sequencer {
    address_byte: u8,
    register_selected: SequencerRegister,

    reset: u8,
    clocking_mode: SClockingModeRegister,
    map_mask: u8,
    character_map_select: u8,
    memory_mode: u8,

    unlocked: bool,
    extended_mode: SExtendedModeRegister,
    eeprom_control: u8,
    /// SR09, SR0A, SR14, SR15
    scratch: [u8; 4],
    vclk_num: [u8; 4],
    vclk_denom: [u8; 4],
    dram_control: u8,
    performance_tuning: u8,
    configuration: u8,
    mclk_select: u8,

    vram_size: usize,
}

impl Sequencer {
    pub fn new(vram_size: usize) -> Self {
        let dram_control_default = if vram_size >= VRAM_2M { 0x98 } else { 0x18 };
        Self {
            address_byte: 0,
            register_selected: SequencerRegister::Reset,
            reset: 0x03,
            clocking_mode: SClockingModeRegister::new(),
            map_mask: 0x0F,
            character_map_select: 0,
            memory_mode: 0x0E,
            unlocked: false,
            extended_mode: SExtendedModeRegister::new(),
            eeprom_control: 0,
            scratch: [0; 4],
            vclk_num: VCLK_DEFAULTS.map(|(n, _)| n),
            vclk_denom: VCLK_DEFAULTS.map(|(_, d)| d),
            dram_control: dram_control_default,
            performance_tuning: 0,
            configuration: 0,
            mclk_select: 0x22,
            vram_size,
        }
    }

    pub fn reset(&mut self) {
        *self = Sequencer::new(self.vram_size);
    }

    #[inline]
    pub fn unlocked(&self) -> bool {
        self.unlocked
    }

    #[inline]
    pub fn screen_off(&self) -> bool {
        self.clocking_mode.screen_off()
    }

    #[inline]
    pub fn extended_mode(&self) -> SExtendedModeRegister {
        self.extended_mode
    }

    /// MMIO BitBLT register window enable (SR17 bit 2).
    #[inline]
    pub fn mmio_enabled(&self) -> bool {
        self.configuration & 0x04 != 0
    }

    /// Full index byte. SR10/SR11 carry fine cursor position bits in bits 7:5.
    pub fn read_address(&self) -> u8 {
        self.address_byte
    }

    /// Register index with the cursor position bits stripped.
    #[inline]
    pub fn index(&self) -> u8 {
        self.address_byte & 0x1F
    }

    pub fn write_address(&mut self, byte: u8) {
        self.address_byte = byte;
        self.register_selected = match byte & 0x1F {
            0x00 => SequencerRegister::Reset,
            0x01 => SequencerRegister::ClockingMode,
            0x02 => SequencerRegister::MapMask,
            0x03 => SequencerRegister::CharacterMapSelect,
            0x04 => SequencerRegister::MemoryMode,
            0x06 => SequencerRegister::Unlock,
            0x07 => SequencerRegister::ExtendedMode,
            0x08 => SequencerRegister::EepromControl,
            0x09 => SequencerRegister::ScratchPad(0),
            0x0A => SequencerRegister::ScratchPad(1),
            i @ 0x0B..=0x0E => SequencerRegister::VclkNumerator((i - 0x0B) as usize),
            0x0F => SequencerRegister::DramControl,
            0x10..=0x13 => SequencerRegister::Cursor,
            0x14 => SequencerRegister::ScratchPad(2),
            0x15 => SequencerRegister::ScratchPad(3),
            0x16 => SequencerRegister::PerformanceTuning,
            0x17 => SequencerRegister::Configuration,
            i @ 0x1B..=0x1E => SequencerRegister::VclkDenominator((i - 0x1B) as usize),
            0x1F => SequencerRegister::MclkSelect,
            _ => SequencerRegister::Unimplemented,
        }
    }

    pub fn read_data(&self) -> u8 {
        match self.register_selected {
            SequencerRegister::Reset => self.reset,
            SequencerRegister::ClockingMode => self.clocking_mode.into_bytes()[0],
            SequencerRegister::MapMask => self.map_mask,
            SequencerRegister::CharacterMapSelect => self.character_map_select,
            SequencerRegister::MemoryMode => self.memory_mode,
            SequencerRegister::Unlock => {
                if self.unlocked {
                    UNLOCK_KEY
                }
                else {
                    LOCKED_READBACK
                }
            }
            SequencerRegister::ExtendedMode => self.extended_mode.into_bytes()[0],
            SequencerRegister::EepromControl => self.eeprom_control,
            SequencerRegister::ScratchPad(n) => self.scratch[n],
            SequencerRegister::VclkNumerator(n) => self.vclk_num[n],
            SequencerRegister::DramControl => self.dram_control,
            SequencerRegister::PerformanceTuning => self.performance_tuning,
            SequencerRegister::Configuration => self.configuration,
            SequencerRegister::VclkDenominator(n) => self.vclk_denom[n],
            SequencerRegister::MclkSelect => self.mclk_select,
            SequencerRegister::Cursor | SequencerRegister::Unimplemented => 0,
        }
    }

    /// Write the selected register. Returns true if the display mode must be recalculated.
    /// Lock enforcement and the cursor registers are handled by the owning card.
    pub fn write_data(&mut self, byte: u8) -> bool {
        log::trace!("Write to Sequencer::{:?} register: {:02X}", self.register_selected, byte);
        match self.register_selected {
            SequencerRegister::Reset => self.reset = byte & 0x03,
            SequencerRegister::ClockingMode => {
                self.clocking_mode = SClockingModeRegister::from_bytes([byte]);
                return true;
            }
            SequencerRegister::MapMask => self.map_mask = byte & 0x0F,
            SequencerRegister::CharacterMapSelect => self.character_map_select = byte & 0x3F,
            SequencerRegister::MemoryMode => self.memory_mode = byte & 0x0E,
            SequencerRegister::Unlock => {
                self.unlocked = byte & 0x17 == UNLOCK_KEY;
                log::debug!(
                    "Cirrus extensions {}",
                    if self.unlocked { "unlocked" } else { "locked" }
                );
            }
            SequencerRegister::ExtendedMode => {
                self.extended_mode = SExtendedModeRegister::from_bytes([byte]);
                return true;
            }
            SequencerRegister::EepromControl => self.eeprom_control = byte,
            SequencerRegister::ScratchPad(n) => self.scratch[n] = byte,
            SequencerRegister::VclkNumerator(n) => {
                self.vclk_num[n] = byte & 0x7F;
                return true;
            }
            SequencerRegister::DramControl => self.dram_control = byte,
            SequencerRegister::PerformanceTuning => self.performance_tuning = byte,
            SequencerRegister::Configuration => self.configuration = byte,
            SequencerRegister::VclkDenominator(n) => {
                self.vclk_denom[n] = byte & 0x3F;
                return true;
            }
            SequencerRegister::MclkSelect => self.mclk_select = byte,
            SequencerRegister::Cursor | SequencerRegister::Unimplemented => {
                log::trace!("Write to unimplemented sequencer register SR{:02X}", self.index());
            }
        }
        false
    }

    /// Frequency in MHz produced by VCLK slot `slot` (0-3).
    pub fn vclk(&self, slot: usize) -> f64 {
        let numerator = self.vclk_num[slot & 0x03] as f64;
        let denom_reg = self.vclk_denom[slot & 0x03];
        let denominator = ((denom_reg & 0x3E) >> 1) as f64;
        if denominator == 0.0 {
            return 0.0;
        }
        let clock = REFERENCE_CLOCK * numerator / denominator;
        if denom_reg & 0x01 != 0 {
            clock / 2.0
        }
        else {
            clock
        }
    }

    #[rustfmt::skip]
    pub fn get_state(&self) -> Vec<(String, VideoCardStateEntry)> {
        let mut sequencer_vec = Vec::new();
        sequencer_vec.push(("[SR00] Reset".to_string(), VideoCardStateEntry::String(format!("{:02b}", self.reset))));
        sequencer_vec.push(("[SR01] Clocking Mode".to_string(), VideoCardStateEntry::String(format!("{:08b}", self.clocking_mode.into_bytes()[0]))));
        sequencer_vec.push(("[SR01] Screen Off".to_string(), VideoCardStateEntry::String(format!("{}", self.clocking_mode.screen_off()))));
        sequencer_vec.push(("[SR02] Map Mask".to_string(), VideoCardStateEntry::String(format!("{:04b}", self.map_mask))));
        sequencer_vec.push(("[SR04] Memory Mode".to_string(), VideoCardStateEntry::String(format!("{:08b}", self.memory_mode))));
        sequencer_vec.push(("[SR06] Unlocked".to_string(), VideoCardStateEntry::String(format!("{}", self.unlocked))));
        sequencer_vec.push(("[SR07] Extended Mode".to_string(), VideoCardStateEntry::String(format!("{:08b}", self.extended_mode.into_bytes()[0]))));
        sequencer_vec.push(("[SR0F] DRAM Control".to_string(), VideoCardStateEntry::Value8(self.dram_control)));
        sequencer_vec.push(("[SR17] Configuration".to_string(), VideoCardStateEntry::Value8(self.configuration)));
        for slot in 0..4 {
            sequencer_vec.push((
                format!("VCLK{} [SR{:02X}/SR{:02X}]", slot, 0x0B + slot, 0x1B + slot),
                VideoCardStateEntry::String(format!("{:.3} MHz", self.vclk(slot))),
            ));
        }
        sequencer_vec.push(("[SR1F] MCLK Select".to_string(), VideoCardStateEntry::Value8(self.mclk_select)));
        sequencer_vec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::cirrus::variant::VRAM_1M;

    fn write(seq: &mut Sequencer, index: u8, data: u8) -> bool {
        seq.write_address(index);
        seq.write_data(data)
    }

    #[test]
    fn test_unlock_key() {
        let mut seq = Sequencer::new(VRAM_1M);
        seq.write_address(0x06);
        assert_eq!(seq.read_data(), LOCKED_READBACK);

        write(&mut seq, 0x06, 0x12);
        assert!(seq.unlocked());
        assert_eq!(seq.read_data(), UNLOCK_KEY);

        // Bits outside 0x17 are ignored.
        write(&mut seq, 0x06, 0xFA);
        assert!(seq.unlocked());

        write(&mut seq, 0x06, 0x00);
        assert!(!seq.unlocked());
    }

    #[test]
    fn test_default_clocks() {
        let seq = Sequencer::new(VRAM_1M);
        let expected = [25.2, 28.3, 41.2, 36.1];
        for (slot, mhz) in expected.iter().enumerate() {
            assert!((seq.vclk(slot) - mhz).abs() < 0.1, "slot {} = {}", slot, seq.vclk(slot));
        }
    }

    #[test]
    fn test_clock_write_requests_recalc() {
        let mut seq = Sequencer::new(VRAM_1M);
        assert!(write(&mut seq, 0x0E, 0x65));
        assert!(write(&mut seq, 0x1E, 0x00));
        assert_eq!(seq.vclk(3), 0.0);
        assert!(!write(&mut seq, 0x09, 0xAA));
        assert_eq!(seq.read_data(), 0xAA);
    }

    #[test]
    fn test_dram_control_reflects_memory() {
        let mut seq = Sequencer::new(VRAM_2M);
        seq.write_address(0x0F);
        assert_eq!(seq.read_data() & 0x80, 0x80);
        write(&mut seq, 0x0F, 0x00);
        seq.reset();
        seq.write_address(0x0F);
        assert_eq!(seq.read_data(), 0x98);
    }
}
