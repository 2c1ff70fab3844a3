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

    devices::cirrus::draw.rs

    Screen compositor. Renders the packed pixel display area, the overscan border and the
    hardware cursor into a Bitmap without modifying chip state.

*/

use super::*;
use crate::videocard::{Bitmap, Rect};

/// Expand a 5-bit component to 8 bits.
#[inline(always)]
fn expand5(c: u32) -> u32 {
    (c << 3) | (c >> 2)
}

/// Expand a 6-bit component to 8 bits.
#[inline(always)]
fn expand6(c: u32) -> u32 {
    (c << 2) | (c >> 4)
}

impl CirrusCard {
    /// xRGB border color: overlay palette entry 2 when SR12 bit 7 is set, otherwise the
    /// attribute controller overscan index through the DAC.
    pub fn border_color(&self) -> u32 {
        if self.cursor.overscan_from_overlay() {
            self.cursor.overlay_u32(cursor::OVERSCAN_ENTRY)
        }
        else {
            self.dac.color_u32(self.ac.overscan_color())
        }
    }

    #[inline]
    fn read_pixel(&self, depth: ColorDepth, row_address: usize, x: usize) -> u32 {
        let address = row_address + x * depth.bytes_per_pixel();
        match depth {
            ColorDepth::Palette8 => self.dac.color_u32(self.vram.read_u8(address)),
            ColorDepth::Rgb15 => {
                let v = self.vram.read_le(address, 2);
                expand5((v >> 10) & 0x1F) << 16 | expand5((v >> 5) & 0x1F) << 8 | expand5(v & 0x1F)
            }
            ColorDepth::Rgb16 => {
                let v = self.vram.read_le(address, 2);
                expand5((v >> 11) & 0x1F) << 16 | expand6((v >> 5) & 0x3F) << 8 | expand5(v & 0x1F)
            }
            ColorDepth::Rgb24 => self.vram.read_le(address, 3),
            ColorDepth::Rgb32 => self.vram.read_le(address, 4) & 0x00FF_FFFF,
        }
    }

    /// Render the current frame into `bitmap` within `clip`. Pixels outside the display area
    /// are filled with the border color. Returns the number of scanlines written.
    pub fn draw_frame(&self, bitmap: &mut Bitmap, clip: &Rect) -> u32 {
        let Some(clip) = clip.intersect(&bitmap.bounds())
        else {
            return 0;
        };

        let depth = match self.mode.mode {
            DisplayMode::Disabled => {
                bitmap.fill(0, &clip);
                return clip.h;
            }
            DisplayMode::Standard => ColorDepth::Palette8,
            DisplayMode::Extended(depth) => depth,
        };

        let border = self.border_color();
        let display = Rect::new(0, 0, self.mode.width, self.mode.height);
        let start = self.mode.start_address as usize;
        let pitch = self.mode.pitch as usize;

        for y in clip.y..clip.bottom() {
            let row_address = start + y as usize * pitch;
            let in_display = y < display.h;
            let row = bitmap.row_mut(y);
            for x in clip.x..clip.right() {
                row[x as usize] = if in_display && x < display.w {
                    self.read_pixel(depth, row_address, x as usize)
                }
                else {
                    border
                };
            }
        }

        if self.cursor.enabled() {
            if let Some(area) = clip.intersect(&display) {
                self.draw_cursor(bitmap, &area);
            }
        }
        clip.h
    }

    /// Overlay the hardware cursor onto already rendered pixels within `area`.
    fn draw_cursor(&self, bitmap: &mut Bitmap, area: &Rect) {
        let (cx, cy) = self.cursor.position();
        let size = self.cursor.size();
        let Some(cursor_rect) = Rect::new(cx, cy, size, size).intersect(area)
        else {
            return;
        };

        for y in cursor_rect.y..cursor_rect.bottom() {
            for x in cursor_rect.x..cursor_rect.right() {
                let pixel = self.cursor.pixel(&self.vram, x - cx, y - cy);
                let blended = self.cursor.blend(pixel, bitmap.pix(x, y));
                bitmap.set_pix(x, y, blended);
            }
        }
    }
}
