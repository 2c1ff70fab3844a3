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

    devices::cirrus::io.rs

    Implementation of the IoDevice trait for the Cirrus card.

*/

use super::*;
use crate::bus::{DeviceRunTimeUnit, IoDevice, NO_IO_BYTE};

impl CirrusCard {
    fn read_input_status_register_1(&mut self) -> u8 {
        // Reading ISR1 resets the attribute register flipflop.
        self.ac.reset_flipflop();
        // Retrace timing is not modelled. Alternate retrace bits so polling loops terminate.
        self.retrace_toggle = !self.retrace_toggle;
        if self.retrace_toggle {
            0x09
        }
        else {
            0x00
        }
    }

    #[inline]
    fn mono(&self) -> bool {
        self.misc_output_register.io_address_select() == IoAddressSelect::CompatMonochrome
    }
}

impl IoDevice for CirrusCard {
    fn read_u8(&mut self, port: u16, _delta: DeviceRunTimeUnit) -> u8 {
        // Any DAC port other than the pel mask breaks the hidden DAC sequence; handled by the DAC.
        match port {
            ATTRIBUTE_REGISTER => self.ac.read_attribute_address(),
            ATTRIBUTE_REGISTER_ALT => self.ac.read_attribute_data(),
            INPUT_STATUS_REGISTER_0 => 0x00,
            SEQUENCER_ADDRESS_REGISTER => self.sequencer.read_address(),
            SEQUENCER_DATA_REGISTER => self.read_sequencer_data(),
            PEL_MASK => self.dac.read_pel_mask(),
            DAC_STATE_REGISTER => self.dac.read_color_dac_state(),
            PEL_ADDRESS_WRITE_MODE => self.dac.read_pel_address_write_mode(),
            PEL_DATA => self.read_pel_data(),
            FEATURE_CONTROL_READ => self.feature_bits,
            MISC_OUTPUT_REGISTER_READ => self.misc_output_register.into_bytes()[0],
            GRAPHICS_ADDRESS => self.gc.read_address(),
            GRAPHICS_DATA => self.read_graphics_register(self.gc.read_address()),
            CRTC_REGISTER_ADDRESS if !self.mono() => self.crtc.read_crtc_register_address(),
            CRTC_REGISTER if !self.mono() => self.crtc.read_crtc_register_data(),
            INPUT_STATUS_REGISTER_1 if !self.mono() => self.read_input_status_register_1(),
            MDA_CRTC_REGISTER_ADDRESS if self.mono() => self.crtc.read_crtc_register_address(),
            MDA_CRTC_REGISTER if self.mono() => self.crtc.read_crtc_register_data(),
            INPUT_STATUS_REGISTER_1_MDA if self.mono() => self.read_input_status_register_1(),
            _ => NO_IO_BYTE,
        }
    }

    fn write_u8(&mut self, port: u16, data: u8, _delta: DeviceRunTimeUnit) {
        match port {
            ATTRIBUTE_REGISTER => self.ac.write_attribute_register(data),
            MISC_OUTPUT_REGISTER => self.write_misc_output_register(data),
            SEQUENCER_ADDRESS_REGISTER => self.sequencer.write_address(data),
            SEQUENCER_DATA_REGISTER => self.write_sequencer_data(data),
            PEL_MASK => self.write_pel_mask(data),
            PEL_ADDRESS_READ_MODE => self.dac.write_pel_address_read_mode(data),
            PEL_ADDRESS_WRITE_MODE => self.dac.write_pel_address_write_mode(data),
            PEL_DATA => self.write_pel_data(data),
            GRAPHICS_ADDRESS => self.gc.write_address(data),
            GRAPHICS_DATA => self.write_graphics_data(data),
            CRTC_REGISTER_ADDRESS if !self.mono() => self.crtc.write_crtc_register_address(data),
            CRTC_REGISTER if !self.mono() => self.write_crtc_data(data),
            FEATURE_CONTROL_REGISTER if !self.mono() => self.feature_bits = data & 0x03,
            MDA_CRTC_REGISTER_ADDRESS if self.mono() => self.crtc.write_crtc_register_address(data),
            MDA_CRTC_REGISTER if self.mono() => self.write_crtc_data(data),
            INPUT_STATUS_REGISTER_1_MDA if self.mono() => self.feature_bits = data & 0x03,
            _ => {}
        }
    }

    fn port_list(&self) -> Vec<(String, u16)> {
        vec![
            (String::from("Cirrus Attribute Register"), ATTRIBUTE_REGISTER),
            (String::from("Cirrus Attribute Register"), ATTRIBUTE_REGISTER_ALT),
            (String::from("Cirrus Misc Output Register"), MISC_OUTPUT_REGISTER),
            (String::from("Cirrus Sequencer Address Register"), SEQUENCER_ADDRESS_REGISTER),
            (String::from("Cirrus Sequencer Data Register"), SEQUENCER_DATA_REGISTER),
            (String::from("Cirrus Pel Mask / Hidden DAC"), PEL_MASK),
            (String::from("Cirrus Pel Address Read"), PEL_ADDRESS_READ_MODE),
            (String::from("Cirrus Pel Address Write"), PEL_ADDRESS_WRITE_MODE),
            (String::from("Cirrus Pel Data"), PEL_DATA),
            (String::from("Cirrus Feature Control Read"), FEATURE_CONTROL_READ),
            (String::from("Cirrus Misc Output Read"), MISC_OUTPUT_REGISTER_READ),
            (String::from("Cirrus Graphics Address"), GRAPHICS_ADDRESS),
            (String::from("Cirrus Graphics Data"), GRAPHICS_DATA),
            (String::from("Cirrus CRTC Address"), CRTC_REGISTER_ADDRESS),
            (String::from("Cirrus CRTC Data"), CRTC_REGISTER),
            (String::from("Cirrus Input Status Register 1"), INPUT_STATUS_REGISTER_1),
            (String::from("Cirrus CRTC Address (MDA)"), MDA_CRTC_REGISTER_ADDRESS),
            (String::from("Cirrus CRTC Data (MDA)"), MDA_CRTC_REGISTER),
            (String::from("Cirrus Input Status Register 1 (MDA)"), INPUT_STATUS_REGISTER_1_MDA),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::NULL_DELTA;

    fn card() -> CirrusCard {
        CirrusCard::new(&CirrusConfig::new(ChipVariant::GD5446, variant::VRAM_2M)).unwrap()
    }

    #[test]
    fn test_crtc_follows_io_address_select() {
        let mut card = card();
        card.write_u8(CRTC_REGISTER_ADDRESS, 0x27, NULL_DELTA);
        assert_eq!(card.read_u8(CRTC_REGISTER, NULL_DELTA), 0xB8);
        assert_eq!(card.read_u8(MDA_CRTC_REGISTER, NULL_DELTA), NO_IO_BYTE);

        card.write_u8(MISC_OUTPUT_REGISTER, 0x66, NULL_DELTA);
        assert_eq!(card.read_u8(CRTC_REGISTER, NULL_DELTA), NO_IO_BYTE);
        assert_eq!(card.read_u8(MDA_CRTC_REGISTER, NULL_DELTA), 0xB8);
    }

    #[test]
    fn test_isr1_resets_attribute_flipflop() {
        let mut card = card();
        card.write_u8(ATTRIBUTE_REGISTER, 0x11, NULL_DELTA);
        card.read_u8(INPUT_STATUS_REGISTER_1, NULL_DELTA);
        card.write_u8(ATTRIBUTE_REGISTER, 0x11, NULL_DELTA);
        card.write_u8(ATTRIBUTE_REGISTER, 0x05, NULL_DELTA);
        assert_eq!(card.read_u8(ATTRIBUTE_REGISTER_ALT, NULL_DELTA), 0x05);
    }

    #[test]
    fn test_hidden_dac_untouched_by_other_ports() {
        let mut card = card();
        for _ in 0..4 {
            card.read_u8(PEL_MASK, NULL_DELTA);
            // Sequencer and CRTC traffic must not disturb the sequence.
            card.read_u8(SEQUENCER_DATA_REGISTER, NULL_DELTA);
            card.read_u8(INPUT_STATUS_REGISTER_1, NULL_DELTA);
        }
        card.write_u8(PEL_MASK, 0xE1, NULL_DELTA);
        assert!(card.dac.hidden().rgb565());
    }

    #[test]
    fn test_overlay_palette_through_dac_ports() {
        let mut card = card();
        card.write_u8(SEQUENCER_ADDRESS_REGISTER, 0x06, NULL_DELTA);
        card.write_u8(SEQUENCER_DATA_REGISTER, 0x12, NULL_DELTA);
        card.write_u8(SEQUENCER_ADDRESS_REGISTER, 0x12, NULL_DELTA);
        card.write_u8(SEQUENCER_DATA_REGISTER, 0x02, NULL_DELTA);

        card.write_u8(PEL_ADDRESS_WRITE_MODE, 0x02, NULL_DELTA);
        for c in [0x10, 0x20, 0x30] {
            card.write_u8(PEL_DATA, c, NULL_DELTA);
        }
        assert_eq!(card.cursor.overlay()[2], [0x10, 0x20, 0x30]);

        card.write_u8(PEL_ADDRESS_READ_MODE, 0x02, NULL_DELTA);
        assert_eq!(card.read_u8(PEL_DATA, NULL_DELTA), 0x10);
        assert_eq!(card.dac.color_u32(2), 0);
    }

    #[test]
    fn test_port_list_unique() {
        let card = card();
        let ports: Vec<u16> = card.port_list().iter().map(|(_, port)| *port).collect();
        for (i, port) in ports.iter().enumerate() {
            assert!(!ports[i + 1..].contains(port), "duplicate port {:03X}", port);
        }
    }
}
