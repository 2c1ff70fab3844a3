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

    videocard.rs

    Defines the VideoCard trait and the types shared with the display sink.

*/

use std::collections::HashMap;

use strum_macros::Display;

/// Pixel format of the active display mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
pub enum ColorDepth {
    Palette8,
    Rgb15,
    Rgb16,
    Rgb24,
    Rgb32,
}

impl ColorDepth {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            ColorDepth::Palette8 => 1,
            ColorDepth::Rgb15 | ColorDepth::Rgb16 => 2,
            ColorDepth::Rgb24 => 3,
            ColorDepth::Rgb32 => 4,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    /// Screen blanked via the sequencer.
    Disabled,
    /// Extended modes off. Rendered as a linear 256 color frame.
    Standard,
    Extended(ColorDepth),
}

#[allow(dead_code)]
#[derive(Clone, Debug, PartialEq)]
pub enum VideoCardStateEntry {
    Value8(u8),
    Value16(u16),
    Value32(u32),
    String(String),
    Color(String, u8, u8, u8),
}

pub type VideoCardState = HashMap<String, Vec<(String, VideoCardStateEntry)>>;

/// A rectangle in screen coordinates. Edges are inclusive of `x`/`y` and exclusive of
/// `x + w`/`y + h`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 > x0 && y1 > y0 {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        }
        else {
            None
        }
    }
}

/// A 32-bit xRGB output surface.
#[derive(Clone, Debug)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    #[inline]
    pub fn pix(&self, x: u32, y: u32) -> u32 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    pub fn set_pix(&mut self, x: u32, y: u32, color: u32) {
        self.pixels[y as usize * self.width as usize + x as usize] = color;
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u32] {
        let start = y as usize * self.width as usize;
        &mut self.pixels[start..start + self.width as usize]
    }

    pub fn fill(&mut self, color: u32, rect: &Rect) {
        if let Some(r) = rect.intersect(&self.bounds()) {
            for y in r.y..r.bottom() {
                self.row_mut(y)[r.x as usize..r.right() as usize].fill(color);
            }
        }
    }

    /// Byte view of the surface, for handing off to a renderer.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

pub trait VideoCard {
    /// Returns the currently configured DisplayMode
    fn get_display_mode(&self) -> DisplayMode;

    /// Return the size (width, height) of the active display area.
    fn get_display_size(&self) -> (u32, u32);

    /// Return the number of bytes between the start of consecutive rows in video memory.
    fn get_row_offset(&self) -> usize;

    /// Return the display start address, in bytes.
    fn get_start_address(&self) -> usize;

    /// Return the pixel clock of the active mode, in MHz.
    fn get_clock(&self) -> f64;

    /// Return the overscan (border) color as xRGB.
    fn get_overscan_color(&self) -> u32;

    /// Render the current frame into `bitmap`, limited to `clip`. Chip state is not modified.
    fn screen_update(&self, bitmap: &mut Bitmap, clip: &Rect) -> u32;

    /// Returns a hash map of vectors containing name and value pairs.
    ///
    /// This allows returning multiple categories of related registers.
    fn get_videocard_string_state(&self) -> VideoCardState;

    /// Reset the video card
    fn reset(&mut self);
}
