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

    devices::cirrus::mod.rs

    Implements the Cirrus Logic GD542x/GD543x SVGA controller.

    The base VGA planar and text paths are not emulated here; this device covers the Cirrus
    extensions: the unlock register, banked and linear video memory, the hidden DAC, the
    hardware cursor, the BitBLT engine and the packed pixel display modes.

    Resources:
    CL-GD542X Technical Reference Manual, Cirrus Logic
    CL-GD543X/4X Technical Reference Manual, Cirrus Logic
    "VGA and SuperVGA Programming", Ferraro

*/

use modular_bitfield::prelude::*;

pub mod attribute_controller;
pub mod blitter;
pub mod crtc;
pub mod cursor;
pub mod dac;
mod draw;
pub mod graphics_controller;
mod io;
mod mmio;
pub mod sequencer;
pub mod variant;
mod videocard;
pub mod vram;

use attribute_controller::AttributeController;
use blitter::{BltCommand, Blitter};
use crtc::Crtc;
use cursor::Cursor;
use dac::Dac;
use graphics_controller::{GraphicsController, FIRST_BLT_REGISTER};
use sequencer::Sequencer;
use variant::{ChipCaps, ChipVariant};
use vram::Vram;

use crate::{
    config::{CirrusConfig, CirrusError},
    videocard::{ColorDepth, DisplayMode},
};

pub const ATTRIBUTE_REGISTER: u16 = 0x3C0;
pub const ATTRIBUTE_REGISTER_ALT: u16 = 0x3C1;
pub const MISC_OUTPUT_REGISTER: u16 = 0x3C2;
pub const INPUT_STATUS_REGISTER_0: u16 = 0x3C2;
pub const SEQUENCER_ADDRESS_REGISTER: u16 = 0x3C4;
pub const SEQUENCER_DATA_REGISTER: u16 = 0x3C5;
pub const PEL_MASK: u16 = 0x3C6;
pub const PEL_ADDRESS_READ_MODE: u16 = 0x3C7;
pub const DAC_STATE_REGISTER: u16 = 0x3C7;
pub const PEL_ADDRESS_WRITE_MODE: u16 = 0x3C8;
pub const PEL_DATA: u16 = 0x3C9;
pub const FEATURE_CONTROL_READ: u16 = 0x3CA;
pub const MISC_OUTPUT_REGISTER_READ: u16 = 0x3CC;
pub const GRAPHICS_ADDRESS: u16 = 0x3CE;
pub const GRAPHICS_DATA: u16 = 0x3CF;
pub const CRTC_REGISTER_ADDRESS: u16 = 0x3D4;
pub const CRTC_REGISTER: u16 = 0x3D5;
pub const INPUT_STATUS_REGISTER_1: u16 = 0x3DA;
pub const FEATURE_CONTROL_REGISTER: u16 = 0x3DA;
pub const MDA_CRTC_REGISTER_ADDRESS: u16 = 0x3B4;
pub const MDA_CRTC_REGISTER: u16 = 0x3B5;
pub const INPUT_STATUS_REGISTER_1_MDA: u16 = 0x3BA;

pub const VGA_APERTURE_ADDRESS: usize = 0xA0000;
pub const VGA_APERTURE_SIZE: usize = 0x20000;
/// Offset of the memory-mapped BitBLT registers (B8000) within the VGA aperture.
pub const MMIO_BLT_OFFSET: usize = 0x18000;
pub const MMIO_BLT_SIZE: usize = 0x100;

const MISC_OUTPUT_DEFAULT: u8 = 0x67;

#[derive(Copy, Clone, Debug, PartialEq, Eq, BitfieldSpecifier)]
pub enum IoAddressSelect {
    CompatMonochrome,
    CompatCGA,
}

/// Miscellaneous Output Register. Bits 3:2 select the VCLK slot.
#[bitfield]
#[derive(Copy, Clone)]
pub struct MiscOutputRegister {
    #[bits = 1]
    pub io_address_select: IoAddressSelect,
    pub enable_ram: bool,
    pub clock_select: B2,
    #[skip]
    unused: B1,
    pub oddeven_page_select: bool,
    pub hsync_negative: bool,
    pub vsync_negative: bool,
}

/// Display parameters derived from the register file, recomputed whenever a register that
/// feeds them is written.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ModeState {
    pub mode: DisplayMode,
    pub width: u32,
    pub height: u32,
    pub pitch: u32,
    pub start_address: u32,
    pub clock: f64,
}

impl Default for ModeState {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Standard,
            width: 0,
            height: 0,
            pitch: 0,
            start_address: 0,
            clock: 0.0,
        }
    }
}

#[derive(Clone)]
pub struct CirrusCard {
    variant: ChipVariant,
    caps: ChipCaps,
    debug: bool,
    linear_base: Option<usize>,

    misc_output_register: MiscOutputRegister,
    feature_bits: u8,
    retrace_toggle: bool,

    sequencer: Sequencer,
    gc: GraphicsController,
    crtc: Crtc,
    ac: AttributeController,
    dac: Dac,
    cursor: Cursor,
    blitter: Blitter,
    vram: Vram,

    mode: ModeState,
}

impl CirrusCard {
    pub fn new(config: &CirrusConfig) -> Result<Self, CirrusError> {
        config.validate()?;
        let caps = config.variant.caps();

        log::debug!(
            "Creating {} with {}K of video memory, chip id {:02X}",
            config.variant.description(),
            config.vram_size / 1024,
            caps.chip_id
        );

        let mut card = Self {
            variant: config.variant,
            caps,
            debug: config.debug,
            linear_base: config.linear_base,
            misc_output_register: MiscOutputRegister::from_bytes([MISC_OUTPUT_DEFAULT]),
            feature_bits: 0,
            retrace_toggle: false,
            sequencer: Sequencer::new(config.vram_size),
            gc: GraphicsController::new(),
            crtc: Crtc::new(caps.chip_id),
            ac: AttributeController::new(),
            dac: Dac::new(),
            cursor: Cursor::new(caps.large_cursor),
            blitter: Blitter::new(caps.blt_addr_mask),
            vram: Vram::new(config.vram_size),
            mode: ModeState::default(),
        };
        card.recalculate_mode();
        Ok(card)
    }

    /// Return every register to its power-on value. Video memory and palette contents
    /// are preserved.
    pub fn reset(&mut self) {
        log::debug!("Resetting {}", self.variant.description());
        self.misc_output_register = MiscOutputRegister::from_bytes([MISC_OUTPUT_DEFAULT]);
        self.feature_bits = 0;
        self.retrace_toggle = false;
        self.sequencer.reset();
        self.gc.reset();
        self.crtc.reset();
        self.ac.reset();
        self.dac.reset();
        self.cursor.reset();
        self.blitter.reset();
        self.recalculate_mode();
    }

    pub fn variant(&self) -> ChipVariant {
        self.variant
    }

    pub fn caps(&self) -> &ChipCaps {
        &self.caps
    }

    pub fn vram(&self) -> &Vram {
        &self.vram
    }

    pub fn vram_mut(&mut self) -> &mut Vram {
        &mut self.vram
    }

    pub fn mode(&self) -> &ModeState {
        &self.mode
    }

    pub fn extensions_unlocked(&self) -> bool {
        self.sequencer.unlocked()
    }

    pub fn blt_busy(&self) -> bool {
        self.blitter.is_busy()
    }

    pub(crate) fn read_sequencer_data(&self) -> u8 {
        let index = self.sequencer.read_address();
        match index & 0x1F {
            0x10..=0x13 => self.cursor.read_register(index),
            _ => self.sequencer.read_data(),
        }
    }

    pub(crate) fn write_sequencer_data(&mut self, data: u8) {
        let index = self.sequencer.read_address();
        let register = index & 0x1F;

        if register >= sequencer::FIRST_PROTECTED && !self.extensions_unlocked() {
            log::trace!("SR{:02X} write {:02X} discarded: extensions locked", register, data);
            return;
        }
        if self.debug {
            log::debug!("SR{:02X} <- {:02X}", register, data);
        }

        match register {
            0x10..=0x13 => self.cursor.write_register(index, data),
            _ => {
                if self.sequencer.write_data(data) {
                    self.recalculate_mode();
                }
            }
        }
    }

    /// Read a graphics controller register by index, including the BitBLT block.
    pub(crate) fn read_graphics_register(&self, index: u8) -> u8 {
        if index >= FIRST_BLT_REGISTER {
            self.blitter.read_register(index)
        }
        else {
            self.gc.read_register(index)
        }
    }

    pub(crate) fn write_graphics_data(&mut self, data: u8) {
        let index = self.gc.read_address();
        self.write_graphics_register(index, data);
    }

    /// Write a graphics controller register by index. Shared by the port interface and the
    /// memory-mapped BitBLT window. Writes to protected registers are discarded while the
    /// extensions are locked.
    pub(crate) fn write_graphics_register(&mut self, index: u8, data: u8) {
        if index >= graphics_controller::FIRST_PROTECTED && !self.extensions_unlocked() {
            log::trace!("GR{:02X} write {:02X} discarded: extensions locked", index, data);
            return;
        }
        if self.debug {
            log::debug!("GR{:02X} <- {:02X}", index, data);
        }

        if index >= FIRST_BLT_REGISTER {
            if self.blitter.write_register(index, data) == BltCommand::Start {
                let colours = self.gc.expand_colours();
                self.blitter.start(&mut self.vram, colours);
            }
        }
        else {
            self.gc.write_register(index, data);
        }
    }

    pub(crate) fn write_crtc_data(&mut self, data: u8) {
        let index = self.crtc.read_crtc_register_address();

        if index >= crtc::FIRST_PROTECTED && !self.extensions_unlocked() {
            log::trace!("CR{:02X} write {:02X} discarded: extensions locked", index, data);
            return;
        }
        if self.debug {
            log::debug!("CR{:02X} <- {:02X}", index, data);
        }
        if self.crtc.write_crtc_register_data(data) {
            self.recalculate_mode();
        }
    }

    pub(crate) fn read_pel_data(&mut self) -> u8 {
        if self.cursor.overlay_access() {
            self.dac.read_pel_data(Some(self.cursor.overlay()))
        }
        else {
            self.dac.read_pel_data(None)
        }
    }

    pub(crate) fn write_pel_data(&mut self, data: u8) {
        if self.cursor.overlay_access() {
            self.dac.write_pel_data(data, Some(self.cursor.overlay_mut()));
        }
        else {
            self.dac.write_pel_data(data, None);
        }
    }

    pub(crate) fn write_pel_mask(&mut self, data: u8) {
        if self.dac.write_pel_mask(data) {
            // The hidden DAC selects between 5-5-5 and 5-6-5.
            self.recalculate_mode();
        }
    }

    pub(crate) fn write_misc_output_register(&mut self, data: u8) {
        self.misc_output_register = MiscOutputRegister::from_bytes([data]);
        self.recalculate_mode();
    }

    /// Pixel clock in MHz from the VCLK slot selected by the misc output register.
    pub fn pixel_clock(&self) -> f64 {
        self.sequencer
            .vclk(self.misc_output_register.clock_select() as usize)
    }

    fn color_depth(&self) -> ColorDepth {
        let ext = self.sequencer.extended_mode();
        match ext.depth_select() {
            0 => ColorDepth::Palette8,
            1 | 3 => {
                if self.dac.hidden().rgb565() {
                    ColorDepth::Rgb16
                }
                else {
                    ColorDepth::Rgb15
                }
            }
            2 => ColorDepth::Rgb24,
            4 if self.caps.true_colour_32 => ColorDepth::Rgb32,
            depth => {
                log::warn!(
                    "Unsupported extended sequencer depth {} on {}, using 8bpp",
                    depth,
                    self.variant
                );
                ColorDepth::Palette8
            }
        }
    }

    /// Recompute resolution, depth, pitch and start address from the register file.
    pub fn recalculate_mode(&mut self) {
        let ext = self.sequencer.extended_mode();

        let mut width = self.crtc.horizontal_displayed() * 8;
        let mut height = self.crtc.vertical_displayed();
        if self.crtc.interlaced() {
            height *= 2;
        }

        let mode = if self.sequencer.screen_off() {
            DisplayMode::Disabled
        }
        else if ext.extended() {
            match ext.depth_select() {
                1 => width /= 2,
                2 => width /= 3,
                _ => {}
            }
            DisplayMode::Extended(self.color_depth())
        }
        else {
            DisplayMode::Standard
        };

        let new_mode = ModeState {
            mode,
            width,
            height,
            pitch: self.crtc.offset(),
            start_address: self.crtc.start_address(self.caps.start_addr_bit19),
            clock: self.pixel_clock(),
        };

        if new_mode != self.mode {
            log::debug!(
                "Display mode: {:?} {}x{} pitch:{} start:{:06X} clock:{:.3}MHz",
                new_mode.mode,
                new_mode.width,
                new_mode.height,
                new_mode.pitch,
                new_mode.start_address,
                new_mode.clock
            );
            self.mode = new_mode;
        }
    }
}
