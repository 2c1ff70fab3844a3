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

    devices::cirrus::blitter.rs

    Implements the BitBLT engine: VRAM to VRAM and system to VRAM block transfers with
    raster operations, 8x8 patterns, colour expansion and transparency.

*/

//! The BitBLT engine is programmed through GR20-GR3F (or the memory-mapped register window).
//! A write of the start bit to GR31 runs a VRAM to VRAM transfer to completion before the
//! write returns. A transfer whose source is system memory instead arms the engine and
//! consumes bytes written by the CPU into the display aperture until every row is filled.
//!
//! Widths and pitches are in bytes. Heights are in scanlines. A width or height of zero is
//! a degenerate transfer that completes without touching memory.

use modular_bitfield::prelude::*;
use strum_macros::Display;

use super::vram::Vram;
use crate::videocard::VideoCardStateEntry;

pub const BLT_WIDTH_MASK: u16 = 0x1FFF;
pub const BLT_HEIGHT_MASK: u16 = 0x07FF;
pub const BLT_PITCH_MASK: u16 = 0x1FFF;

#[derive(Copy, Clone, Debug, PartialEq, Eq, BitfieldSpecifier)]
pub enum BltPixelWidth {
    Bpp8,
    Bpp16,
    Bpp24,
    Bpp32,
}

impl BltPixelWidth {
    pub fn bytes(&self) -> u32 {
        match self {
            BltPixelWidth::Bpp8 => 1,
            BltPixelWidth::Bpp16 => 2,
            BltPixelWidth::Bpp24 => 3,
            BltPixelWidth::Bpp32 => 4,
        }
    }
}

/// GR30: BLT Mode
#[bitfield]
#[derive(Copy, Clone)]
pub struct BltModeRegister {
    pub reverse: bool,
    pub dest_system: bool,
    pub source_system: bool,
    pub transparency: bool,
    #[bits = 2]
    pub pixel_width: BltPixelWidth,
    pub pattern: bool,
    pub color_expand: bool,
}

/// GR31: BLT Start/Status
#[bitfield]
#[derive(Copy, Clone)]
pub struct BltStatusRegister {
    pub busy: bool,
    pub start: bool,
    pub reset: bool,
    pub in_progress: bool,
    #[skip]
    unused: B4,
}

/// GR32 raster operations. Each operates bytewise on source (S) and destination (D).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
pub enum RasterOp {
    Zero,
    SrcAndDst,
    Dst,
    SrcAndNotDst,
    NotDst,
    Src,
    One,
    NotSrcAndDst,
    SrcXorDst,
    SrcOrDst,
    NotSrcAndNotDst,
    SrcXnorDst,
    SrcOrNotDst,
    NotSrc,
    NotSrcOrDst,
    NotSrcOrNotDst,
}

impl RasterOp {
    pub fn from_code(code: u8) -> Option<Self> {
        let rop = match code {
            0x00 => RasterOp::Zero,
            0x05 => RasterOp::SrcAndDst,
            0x06 => RasterOp::Dst,
            0x09 => RasterOp::SrcAndNotDst,
            0x0B => RasterOp::NotDst,
            0x0D => RasterOp::Src,
            0x0E => RasterOp::One,
            0x50 => RasterOp::NotSrcAndDst,
            0x59 => RasterOp::SrcXorDst,
            0x6D => RasterOp::SrcOrDst,
            0x90 => RasterOp::NotSrcAndNotDst,
            0x95 => RasterOp::SrcXnorDst,
            0xAD => RasterOp::SrcOrNotDst,
            0xD0 => RasterOp::NotSrc,
            0xD6 => RasterOp::NotSrcOrDst,
            0xDA => RasterOp::NotSrcOrNotDst,
            _ => return None,
        };
        Some(rop)
    }

    #[inline(always)]
    pub fn apply(&self, s: u8, d: u8) -> u8 {
        match self {
            RasterOp::Zero => 0,
            RasterOp::SrcAndDst => s & d,
            RasterOp::Dst => d,
            RasterOp::SrcAndNotDst => s & !d,
            RasterOp::NotDst => !d,
            RasterOp::Src => s,
            RasterOp::One => 0xFF,
            RasterOp::NotSrcAndDst => !s & d,
            RasterOp::SrcXorDst => s ^ d,
            RasterOp::SrcOrDst => s | d,
            RasterOp::NotSrcAndNotDst => !(s | d),
            RasterOp::SrcXnorDst => !(s ^ d),
            RasterOp::SrcOrNotDst => s | !d,
            RasterOp::NotSrc => !s,
            RasterOp::NotSrcOrDst => !s | d,
            RasterOp::NotSrcOrNotDst => !(s & d),
        }
    }
}

/// Foreground and background colours for colour expansion, assembled from
/// GR1/GR11/GR13/GR15 and GR0/GR10/GR12/GR14. Byte n of each value is written for
/// byte n of an expanded pixel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpandColours {
    pub fg: u32,
    pub bg: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BltCommand {
    None,
    Start,
}

#[derive(Clone)]
pub struct Blitter {
    width: u16,
    height: u16,
    dest_pitch: u16,
    source_pitch: u16,
    dest: u32,
    source: u32,
    dest_left_clip: u8,
    mode: BltModeRegister,
    status: BltStatusRegister,
    rop_code: u8,
    mode_ext: u8,
    trans_colour: u16,
    trans_colour_mask: u16,

    addr_mask: u32,

    // Latched at transfer start
    rop: RasterOp,
    colours: ExpandColours,

    source_current: u32,
    dest_current: u32,
    /// Bytes written into the current destination row of a system transfer.
    pixel_count: u32,
    scan_count: u32,
    system_buffer: u32,
    system_count: u32,
}

#[inline]
fn set_lane_u16(reg: u16, lane: u32, data: u8) -> u16 {
    let shift = lane * 8;
    (reg & !(0xFF << shift)) | (data as u16) << shift
}

#[inline]
fn set_lane_u32(reg: u32, lane: u32, data: u8) -> u32 {
    let shift = lane * 8;
    (reg & !(0xFF << shift)) | (data as u32) << shift
}

impl Blitter {
    pub fn new(addr_mask: u32) -> Self {
        Self {
            width: 0,
            height: 0,
            dest_pitch: 0,
            source_pitch: 0,
            dest: 0,
            source: 0,
            dest_left_clip: 0,
            mode: BltModeRegister::new(),
            status: BltStatusRegister::new(),
            rop_code: 0x0D,
            mode_ext: 0,
            trans_colour: 0,
            trans_colour_mask: 0,
            addr_mask,
            rop: RasterOp::Src,
            colours: ExpandColours::default(),
            source_current: 0,
            dest_current: 0,
            pixel_count: 0,
            scan_count: 0,
            system_buffer: 0,
            system_count: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Blitter::new(self.addr_mask);
    }

    #[inline]
    pub fn is_busy(&self) -> bool {
        self.status.busy()
    }

    /// True while a system to VRAM transfer is waiting for data from the CPU.
    #[inline]
    pub fn system_transfer_active(&self) -> bool {
        self.status.busy() && self.mode.source_system()
    }

    #[inline]
    fn bpp(&self) -> u32 {
        self.mode.pixel_width().bytes()
    }

    #[inline]
    fn source_base(&self) -> u32 {
        self.source & self.addr_mask
    }

    #[inline]
    fn dest_base(&self) -> u32 {
        self.dest & self.addr_mask
    }

    pub fn read_register(&self, index: u8) -> u8 {
        match index {
            0x20 => self.width as u8,
            0x21 => (self.width >> 8) as u8,
            0x22 => self.height as u8,
            0x23 => (self.height >> 8) as u8,
            0x24 => self.dest_pitch as u8,
            0x25 => (self.dest_pitch >> 8) as u8,
            0x26 => self.source_pitch as u8,
            0x27 => (self.source_pitch >> 8) as u8,
            0x28..=0x2A => (self.dest >> ((index - 0x28) * 8)) as u8,
            0x2C..=0x2E => (self.source >> ((index - 0x2C) * 8)) as u8,
            0x2F => self.dest_left_clip,
            0x30 => self.mode.into_bytes()[0],
            0x31 => self.status.into_bytes()[0],
            0x32 => self.rop_code,
            0x33 => self.mode_ext,
            0x34 => self.trans_colour as u8,
            0x35 => (self.trans_colour >> 8) as u8,
            0x38 => self.trans_colour_mask as u8,
            0x39 => (self.trans_colour_mask >> 8) as u8,
            _ => 0,
        }
    }

    /// Write a BLT register. Returns [BltCommand::Start] when the write requests a transfer;
    /// the caller supplies VRAM and the expansion colours to [Blitter::start].
    pub fn write_register(&mut self, index: u8, data: u8) -> BltCommand {
        match index {
            0x20 | 0x21 => {
                self.width = set_lane_u16(self.width, (index & 1) as u32, data) & BLT_WIDTH_MASK;
            }
            0x22 | 0x23 => {
                self.height = set_lane_u16(self.height, (index & 1) as u32, data) & BLT_HEIGHT_MASK;
            }
            0x24 | 0x25 => {
                self.dest_pitch = set_lane_u16(self.dest_pitch, (index & 1) as u32, data) & BLT_PITCH_MASK;
            }
            0x26 | 0x27 => {
                self.source_pitch = set_lane_u16(self.source_pitch, (index & 1) as u32, data) & BLT_PITCH_MASK;
            }
            0x28..=0x2A => {
                self.dest = set_lane_u32(self.dest, (index - 0x28) as u32, data) & 0x3F_FFFF;
            }
            0x2C..=0x2E => {
                self.source = set_lane_u32(self.source, (index - 0x2C) as u32, data) & 0x3F_FFFF;
            }
            0x2F => self.dest_left_clip = data,
            0x30 => self.mode = BltModeRegister::from_bytes([data]),
            0x31 => return self.write_status(data),
            0x32 => self.rop_code = data,
            0x33 => self.mode_ext = data,
            0x34 | 0x35 => {
                self.trans_colour = set_lane_u16(self.trans_colour, (index & 1) as u32, data);
            }
            0x38 | 0x39 => {
                self.trans_colour_mask = set_lane_u16(self.trans_colour_mask, (index & 1) as u32, data);
            }
            _ => {
                log::trace!("Write to unimplemented BLT register GR{:02X}: {:02X}", index, data);
            }
        }
        BltCommand::None
    }

    fn write_status(&mut self, data: u8) -> BltCommand {
        let status = BltStatusRegister::from_bytes([data]);
        if status.reset() {
            if self.status.busy() {
                log::debug!(
                    "BitBLT reset: abandoning transfer at row {} of {}",
                    self.scan_count,
                    self.height
                );
            }
            self.finish();
            self.status.set_reset(true);
        }
        else {
            self.status.set_reset(false);
        }

        if status.start() {
            BltCommand::Start
        }
        else {
            BltCommand::None
        }
    }

    fn finish(&mut self) {
        self.status = BltStatusRegister::new();
        self.system_buffer = 0;
        self.system_count = 0;
    }

    /// Begin the programmed transfer. VRAM sourced transfers complete before this returns.
    pub fn start(&mut self, vram: &mut Vram, colours: ExpandColours) {
        self.rop = match RasterOp::from_code(self.rop_code) {
            Some(rop) => rop,
            None => {
                log::warn!("Unsupported BitBLT raster operation {:02X}, using copy", self.rop_code);
                RasterOp::Src
            }
        };
        self.colours = colours;
        self.source_current = self.source_base();
        self.dest_current = self.dest_base();
        self.pixel_count = 0;
        self.scan_count = 0;
        self.system_buffer = 0;
        self.system_count = 0;

        log::debug!(
            "BitBLT start: {}x{} src:{:06X} dst:{:06X} spitch:{} dpitch:{} rop:{} mode:{:08b}",
            self.width,
            self.height,
            self.source_current,
            self.dest_current,
            self.source_pitch,
            self.dest_pitch,
            self.rop,
            self.mode.into_bytes()[0]
        );

        if self.width == 0 || self.height == 0 {
            self.finish();
            return;
        }

        if self.mode.dest_system() {
            log::warn!("BitBLT to system memory is not supported");
            self.finish();
            return;
        }

        if self.mode.source_system() {
            self.start_system_bitblt();
            return;
        }

        self.status.set_busy(true);
        self.status.set_in_progress(true);
        if self.mode.reverse() {
            if self.mode.pattern() || self.mode.color_expand() {
                log::warn!("Reverse BitBLT with pattern or colour expansion, running forward");
                self.start_bitblt(vram);
            }
            else {
                self.start_reverse_bitblt(vram);
            }
        }
        else {
            self.start_bitblt(vram);
        }
        self.finish();
    }

    #[inline]
    fn transparent_byte(&self, src: u8, lane: u32) -> bool {
        let shift = (lane & 1) * 8;
        let key = (self.trans_colour >> shift) as u8;
        let mask = (self.trans_colour_mask >> shift) as u8;
        src & mask == key & mask
    }

    #[inline]
    fn expand_byte(&self, set: bool, lane: u32) -> Option<u8> {
        if set {
            Some((self.colours.fg >> (lane * 8)) as u8)
        }
        else if self.mode.transparency() {
            None
        }
        else {
            Some((self.colours.bg >> (lane * 8)) as u8)
        }
    }

    #[inline]
    fn copy_pixel(&self, vram: &mut Vram, dest: u32, src: u8) {
        let address = dest as usize;
        let d = vram.read_u8(address);
        vram.write_u8(address, self.rop.apply(src, d));
    }

    /// Produce the source byte for column `x` of row `y`, or None if the byte is transparent.
    fn fetch_source(&self, vram: &Vram, x: u32, y: u32) -> Option<u8> {
        let bpp = self.bpp();
        let lane = x % bpp;

        if self.mode.color_expand() {
            let pixel = x / bpp;
            let bits = if self.mode.pattern() {
                vram.read_u8(self.source_base().wrapping_add(y % 8) as usize)
            }
            else {
                vram.read_u8(self.source_current.wrapping_add(pixel / 8) as usize)
            };
            return self.expand_byte(bits & (0x80 >> (pixel % 8)) != 0, lane);
        }

        let address = if self.mode.pattern() {
            self.source_base()
                .wrapping_add((y % 8) * 8 * bpp)
                .wrapping_add(x % (8 * bpp))
        }
        else {
            self.source_current.wrapping_add(x)
        };
        let src = vram.read_u8(address as usize);
        if self.mode.transparency() && self.transparent_byte(src, lane) {
            None
        }
        else {
            Some(src)
        }
    }

    fn start_bitblt(&mut self, vram: &mut Vram) {
        let width = self.width as u32;
        for y in 0..self.height as u32 {
            self.source_current = self
                .source_base()
                .wrapping_add(y.wrapping_mul(self.source_pitch as u32));
            self.dest_current = self.dest_base().wrapping_add(y.wrapping_mul(self.dest_pitch as u32));
            for x in 0..width {
                if let Some(src) = self.fetch_source(vram, x, y) {
                    self.copy_pixel(vram, self.dest_current.wrapping_add(x), src);
                }
            }
            self.scan_count = y + 1;
        }
    }

    /// Source and destination address the last byte of the rectangle; both walk downwards.
    fn start_reverse_bitblt(&mut self, vram: &mut Vram) {
        let width = self.width as u32;
        let bpp = self.bpp();
        for y in 0..self.height as u32 {
            self.source_current = self
                .source_base()
                .wrapping_sub(y.wrapping_mul(self.source_pitch as u32));
            self.dest_current = self.dest_base().wrapping_sub(y.wrapping_mul(self.dest_pitch as u32));
            for x in 0..width {
                let src = vram.read_u8(self.source_current.wrapping_sub(x) as usize);
                if self.mode.transparency() && self.transparent_byte(src, (width - 1 - x) % bpp) {
                    continue;
                }
                self.copy_pixel(vram, self.dest_current.wrapping_sub(x), src);
            }
            self.scan_count = y + 1;
        }
    }

    fn start_system_bitblt(&mut self) {
        if self.mode.reverse() || self.mode.pattern() {
            log::warn!(
                "System to VRAM BitBLT ignores mode bits: {:08b}",
                self.mode.into_bytes()[0]
            );
        }
        self.status.set_busy(true);
        self.status.set_in_progress(true);
    }

    /// Accept one byte from the CPU for a system to VRAM transfer. Bytes arriving while
    /// no such transfer is active are ignored.
    pub fn system_write(&mut self, vram: &mut Vram, data: u8) {
        if !self.system_transfer_active() {
            return;
        }

        if self.mode.color_expand() {
            self.blit_byte(vram, data);
        }
        else {
            self.system_buffer |= (data as u32) << (self.system_count * 8);
            self.system_count += 1;
            if self.system_count == self.bpp() {
                self.blit_dword(vram);
                self.system_buffer = 0;
                self.system_count = 0;
            }
        }
    }

    /// Commit one buffered source pixel.
    fn blit_dword(&mut self, vram: &mut Vram) {
        let width = self.width as u32;
        for lane in 0..self.bpp() {
            if self.pixel_count >= width {
                break;
            }
            let src = (self.system_buffer >> (lane * 8)) as u8;
            if !(self.mode.transparency() && self.transparent_byte(src, lane)) {
                self.copy_pixel(vram, self.dest_current.wrapping_add(self.pixel_count), src);
            }
            self.pixel_count += 1;
        }
        if self.pixel_count >= width {
            self.next_scanline();
        }
    }

    /// Expand one source byte into up to eight pixels. Rows start on a byte boundary, so
    /// bits left over at the end of a row are dropped.
    fn blit_byte(&mut self, vram: &mut Vram, data: u8) {
        let width = self.width as u32;
        let bpp = self.bpp();
        'bits: for bit in 0..8 {
            let set = data & (0x80 >> bit) != 0;
            for lane in 0..bpp {
                if self.pixel_count >= width {
                    break 'bits;
                }
                if let Some(byte) = self.expand_byte(set, lane) {
                    self.copy_pixel(vram, self.dest_current.wrapping_add(self.pixel_count), byte);
                }
                self.pixel_count += 1;
            }
        }
        if self.pixel_count >= width {
            self.next_scanline();
        }
    }

    fn next_scanline(&mut self) {
        self.pixel_count = 0;
        self.scan_count += 1;
        if self.scan_count >= self.height as u32 {
            log::trace!("System to VRAM BitBLT complete: {} rows", self.scan_count);
            self.finish();
        }
        else {
            self.dest_current = self
                .dest_base()
                .wrapping_add(self.scan_count.wrapping_mul(self.dest_pitch as u32));
        }
    }

    #[rustfmt::skip]
    pub fn get_state(&self) -> Vec<(String, VideoCardStateEntry)> {
        let mut blt_vec = Vec::new();
        blt_vec.push(("[GR20] Width".to_string(), VideoCardStateEntry::Value16(self.width)));
        blt_vec.push(("[GR22] Height".to_string(), VideoCardStateEntry::Value16(self.height)));
        blt_vec.push(("[GR24] Dest Pitch".to_string(), VideoCardStateEntry::Value16(self.dest_pitch)));
        blt_vec.push(("[GR26] Source Pitch".to_string(), VideoCardStateEntry::Value16(self.source_pitch)));
        blt_vec.push(("[GR28] Dest Address".to_string(), VideoCardStateEntry::String(format!("{:06X}", self.dest))));
        blt_vec.push(("[GR2C] Source Address".to_string(), VideoCardStateEntry::String(format!("{:06X}", self.source))));
        blt_vec.push(("[GR30] Mode".to_string(), VideoCardStateEntry::String(format!("{:08b}", self.mode.into_bytes()[0]))));
        blt_vec.push(("[GR30] Pixel Width".to_string(), VideoCardStateEntry::String(format!("{:?}", self.mode.pixel_width()))));
        blt_vec.push(("[GR31] Status".to_string(), VideoCardStateEntry::String(format!("{:04b}", self.status.into_bytes()[0]))));
        blt_vec.push(("[GR32] ROP".to_string(), VideoCardStateEntry::String(match RasterOp::from_code(self.rop_code) {
            Some(rop) => format!("{:02X} {}", self.rop_code, rop),
            None => format!("{:02X} ?", self.rop_code),
        })));
        blt_vec.push(("[GR34] Trans Colour".to_string(), VideoCardStateEntry::Value16(self.trans_colour)));
        blt_vec.push(("[GR38] Trans Mask".to_string(), VideoCardStateEntry::Value16(self.trans_colour_mask)));
        blt_vec.push(("scan_count:".to_string(), VideoCardStateEntry::Value32(self.scan_count)));
        blt_vec.push(("pixel_count:".to_string(), VideoCardStateEntry::Value32(self.pixel_count)));
        blt_vec.push(("system_count:".to_string(), VideoCardStateEntry::Value32(self.system_count)));
        blt_vec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(blt: &mut Blitter, regs: &[(u8, u8)]) {
        for (index, data) in regs {
            assert_eq!(blt.write_register(*index, *data), BltCommand::None);
        }
    }

    fn rect(blt: &mut Blitter, width: u16, height: u16, dest_pitch: u16, source_pitch: u16) {
        program(
            blt,
            &[
                (0x20, width as u8),
                (0x21, (width >> 8) as u8),
                (0x22, height as u8),
                (0x23, (height >> 8) as u8),
                (0x24, dest_pitch as u8),
                (0x25, (dest_pitch >> 8) as u8),
                (0x26, source_pitch as u8),
                (0x27, (source_pitch >> 8) as u8),
            ],
        );
    }

    fn addresses(blt: &mut Blitter, source: u32, dest: u32) {
        for lane in 0..3u8 {
            blt.write_register(0x28 + lane, (dest >> (lane * 8)) as u8);
            blt.write_register(0x2C + lane, (source >> (lane * 8)) as u8);
        }
    }

    fn trigger(blt: &mut Blitter, vram: &mut Vram, colours: ExpandColours) {
        assert_eq!(blt.write_register(0x31, 0x02), BltCommand::Start);
        blt.start(vram, colours);
    }

    #[test]
    fn test_rop_table() {
        let s = 0b1100_1010;
        let d = 0b1010_0110;
        let cases = [
            (0x00, 0x00),
            (0x05, s & d),
            (0x06, d),
            (0x09, s & !d),
            (0x0B, !d),
            (0x0D, s),
            (0x0E, 0xFF),
            (0x50, !s & d),
            (0x59, s ^ d),
            (0x6D, s | d),
            (0x90, !(s | d)),
            (0x95, !(s ^ d)),
            (0xAD, s | !d),
            (0xD0, !s),
            (0xD6, !s | d),
            (0xDA, !(s & d)),
        ];
        for (code, expected) in cases {
            let rop = RasterOp::from_code(code).unwrap();
            assert_eq!(rop.apply(s, d), expected, "rop {:02X} ({})", code, rop);
        }
        assert!(RasterOp::from_code(0x42).is_none());
    }

    #[test]
    fn test_register_widths() {
        let mut blt = Blitter::new(0x1F_FFFF);
        program(&mut blt, &[(0x21, 0xFF), (0x23, 0xFF), (0x2A, 0xFF)]);
        assert_eq!(blt.read_register(0x21), 0x1F);
        assert_eq!(blt.read_register(0x23), 0x07);
        assert_eq!(blt.read_register(0x2A), 0x3F);
    }

    #[test]
    fn test_unknown_rop_copies() {
        let mut vram = Vram::new(0x40000);
        vram.load(0, &[9, 8, 7, 6]);
        let mut blt = Blitter::new(0x3F_FFFF);
        rect(&mut blt, 4, 1, 4, 4);
        addresses(&mut blt, 0, 0x100);
        blt.write_register(0x32, 0x42);
        trigger(&mut blt, &mut vram, ExpandColours::default());
        assert_eq!(&vram.as_slice()[0x100..0x104], &[9, 8, 7, 6]);
    }

    #[test]
    fn test_transparency_16bpp_lanes() {
        let mut vram = Vram::new(0x40000);
        // Two 16bpp pixels: 0x1234 (transparent key) and 0x5678.
        vram.load(0, &[0x34, 0x12, 0x78, 0x56]);
        vram.load(0x100, &[0xEE; 4]);
        let mut blt = Blitter::new(0x3F_FFFF);
        rect(&mut blt, 4, 1, 4, 4);
        addresses(&mut blt, 0, 0x100);
        program(
            &mut blt,
            &[
                (0x30, 0x18), // transparency, 16bpp
                (0x32, 0x0D),
                (0x34, 0x34),
                (0x35, 0x12),
                (0x38, 0xFF),
                (0x39, 0xFF),
            ],
        );
        trigger(&mut blt, &mut vram, ExpandColours::default());
        assert_eq!(&vram.as_slice()[0x100..0x104], &[0xEE, 0xEE, 0x78, 0x56]);
    }

    #[test]
    fn test_zero_mask_never_writes() {
        let mut vram = Vram::new(0x40000);
        vram.load(0, &[1, 2, 3, 4]);
        let mut blt = Blitter::new(0x3F_FFFF);
        rect(&mut blt, 4, 1, 4, 4);
        addresses(&mut blt, 0, 0x100);
        program(&mut blt, &[(0x30, 0x08), (0x32, 0x0D), (0x34, 0x55)]);
        trigger(&mut blt, &mut vram, ExpandColours::default());
        assert!(vram.as_slice()[0x100..0x104].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_pattern_fill() {
        let mut vram = Vram::new(0x40000);
        let pattern: Vec<u8> = (0..64).collect();
        vram.load(0x1000, &pattern);
        let mut blt = Blitter::new(0x3F_FFFF);
        rect(&mut blt, 16, 10, 16, 0);
        addresses(&mut blt, 0x1000, 0x2000);
        program(&mut blt, &[(0x30, 0x40), (0x32, 0x0D)]);
        trigger(&mut blt, &mut vram, ExpandColours::default());

        for y in 0..10usize {
            for x in 0..16usize {
                assert_eq!(vram.read_u8(0x2000 + y * 16 + x), ((y % 8) * 8 + x % 8) as u8);
            }
        }
    }

    #[test]
    fn test_colour_expand_16bpp() {
        let mut vram = Vram::new(0x40000);
        vram.write_u8(0, 0b1010_0000);
        let mut blt = Blitter::new(0x3F_FFFF);
        // 4 pixels at 16bpp = 8 bytes.
        rect(&mut blt, 8, 1, 8, 1);
        addresses(&mut blt, 0, 0x100);
        program(&mut blt, &[(0x30, 0x90), (0x32, 0x0D)]);
        let colours = ExpandColours { fg: 0xBEEF, bg: 0x1234 };
        trigger(&mut blt, &mut vram, colours);
        assert_eq!(
            &vram.as_slice()[0x100..0x108],
            &[0xEF, 0xBE, 0x34, 0x12, 0xEF, 0xBE, 0x34, 0x12]
        );
    }

    #[test]
    fn test_colour_expand_transparent_background() {
        let mut vram = Vram::new(0x40000);
        vram.write_u8(0, 0b0110_0000);
        vram.load(0x100, &[0x77; 4]);
        let mut blt = Blitter::new(0x3F_FFFF);
        rect(&mut blt, 4, 1, 4, 1);
        addresses(&mut blt, 0, 0x100);
        program(&mut blt, &[(0x30, 0x88), (0x32, 0x0D)]);
        trigger(&mut blt, &mut vram, ExpandColours { fg: 0x01, bg: 0x02 });
        assert_eq!(&vram.as_slice()[0x100..0x104], &[0x77, 0x01, 0x01, 0x77]);
    }

    #[test]
    fn test_system_expand_rows_byte_aligned() {
        let mut vram = Vram::new(0x40000);
        let mut blt = Blitter::new(0x3F_FFFF);
        // 10 pixels per row needs two source bytes per row.
        rect(&mut blt, 10, 2, 16, 0);
        addresses(&mut blt, 0, 0x200);
        program(&mut blt, &[(0x30, 0x84), (0x32, 0x0D)]);
        trigger(&mut blt, &mut vram, ExpandColours { fg: 0xAA, bg: 0x55 });
        assert!(blt.is_busy());

        for byte in [0xFF, 0xC0, 0x00, 0x40] {
            blt.system_write(&mut vram, byte);
        }
        assert!(!blt.is_busy());
        assert!(vram.as_slice()[0x200..0x20A].iter().all(|b| *b == 0xAA));
        assert_eq!(vram.read_u8(0x20A), 0);
        assert_eq!(vram.read_u8(0x210 + 8), 0x55);
        assert_eq!(vram.read_u8(0x210 + 9), 0xAA);
        assert_eq!(vram.read_u8(0x210 + 10), 0);
    }

    #[test]
    fn test_system_16bpp_buffers_pixel() {
        let mut vram = Vram::new(0x40000);
        let mut blt = Blitter::new(0x3F_FFFF);
        rect(&mut blt, 4, 1, 4, 0);
        addresses(&mut blt, 0, 0x300);
        program(&mut blt, &[(0x30, 0x14), (0x32, 0x0D)]);
        trigger(&mut blt, &mut vram, ExpandColours::default());

        blt.system_write(&mut vram, 0x11);
        assert_eq!(vram.read_u8(0x300), 0);
        blt.system_write(&mut vram, 0x22);
        assert_eq!(&vram.as_slice()[0x300..0x302], &[0x11, 0x22]);
        blt.system_write(&mut vram, 0x33);
        blt.system_write(&mut vram, 0x44);
        assert!(!blt.is_busy());
        assert_eq!(&vram.as_slice()[0x300..0x304], &[0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn test_reset_aborts_system_transfer() {
        let mut vram = Vram::new(0x40000);
        let mut blt = Blitter::new(0x3F_FFFF);
        rect(&mut blt, 4, 4, 4, 0);
        addresses(&mut blt, 0, 0x400);
        program(&mut blt, &[(0x30, 0x04), (0x32, 0x0D)]);
        trigger(&mut blt, &mut vram, ExpandColours::default());
        blt.system_write(&mut vram, 0x99);
        assert!(blt.system_transfer_active());

        assert_eq!(blt.write_register(0x31, 0x04), BltCommand::None);
        assert!(!blt.is_busy());
        assert_eq!(blt.read_register(0x31), 0x04);
        blt.system_write(&mut vram, 0x98);
        assert_eq!(vram.read_u8(0x401), 0);
    }

    #[test]
    fn test_system_write_ignored_when_idle() {
        let mut vram = Vram::new(0x40000);
        let mut blt = Blitter::new(0x3F_FFFF);
        blt.system_write(&mut vram, 0xFF);
        assert!(vram.as_slice().iter().all(|b| *b == 0));
    }
}
