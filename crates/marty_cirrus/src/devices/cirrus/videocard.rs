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

    devices::cirrus::videocard.rs

    Implements the VideoCard trait for the Cirrus Logic adapter.

*/

use std::collections::HashMap;

use super::*;
use crate::videocard::{Bitmap, Rect, VideoCard, VideoCardState, VideoCardStateEntry};

impl VideoCard for CirrusCard {
    fn get_display_mode(&self) -> DisplayMode {
        self.mode.mode
    }

    fn get_display_size(&self) -> (u32, u32) {
        (self.mode.width, self.mode.height)
    }

    fn get_row_offset(&self) -> usize {
        self.mode.pitch as usize
    }

    fn get_start_address(&self) -> usize {
        self.mode.start_address as usize
    }

    fn get_clock(&self) -> f64 {
        self.mode.clock
    }

    fn get_overscan_color(&self) -> u32 {
        self.border_color()
    }

    fn screen_update(&self, bitmap: &mut Bitmap, clip: &Rect) -> u32 {
        self.draw_frame(bitmap, clip)
    }

    #[rustfmt::skip]
    fn get_videocard_string_state(&self) -> VideoCardState {
        let mut map: VideoCardState = HashMap::new();

        let mut general_vec = Vec::new();
        general_vec.push(("Adapter Type:".to_string(), VideoCardStateEntry::String(self.variant.description().to_string())));
        general_vec.push(("Display Mode:".to_string(), VideoCardStateEntry::String(format!("{:?}", self.mode.mode))));
        general_vec.push(("Display Size:".to_string(), VideoCardStateEntry::String(format!("{}x{}", self.mode.width, self.mode.height))));
        general_vec.push(("Pixel Clock:".to_string(), VideoCardStateEntry::String(format!("{:.3}MHz", self.mode.clock))));
        general_vec.push(("Video Memory:".to_string(), VideoCardStateEntry::String(format!("{}K", self.vram.len() / 1024))));
        general_vec.push(("Misc Output:".to_string(), VideoCardStateEntry::String(format!("{:08b}", self.misc_output_register.into_bytes()[0]))));
        map.insert("General".to_string(), general_vec);

        map.insert("Sequencer".to_string(), self.sequencer.get_state());
        map.insert("Graphics".to_string(), self.gc.get_state());
        map.insert("CRTC".to_string(), self.crtc.get_state());
        map.insert("Attribute".to_string(), self.ac.get_state());
        map.insert("DAC".to_string(), self.dac.get_state());
        map.insert("Cursor".to_string(), self.cursor.get_state());
        map.insert("BitBLT".to_string(), self.blitter.get_state());
        map
    }

    fn reset(&mut self) {
        CirrusCard::reset(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_state_sections() {
        let card = CirrusCard::new(&CirrusConfig::new(ChipVariant::GD5446, variant::VRAM_2M)).unwrap();
        let state = card.get_videocard_string_state();
        for section in ["General", "Sequencer", "Graphics", "CRTC", "Attribute", "DAC", "Cursor", "BitBLT"] {
            assert!(state.contains_key(section), "missing {}", section);
        }
    }

    #[test]
    fn test_trait_reports_mode() {
        let card = CirrusCard::new(&CirrusConfig::new(ChipVariant::GD5430, variant::VRAM_1M)).unwrap();
        let vc: &dyn VideoCard = &card;
        assert_eq!(vc.get_display_mode(), DisplayMode::Standard);
        assert_eq!(vc.get_display_size(), (640, 480));
        assert_eq!(vc.get_row_offset(), 640);
    }
}
