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

    tests::blitter.rs

    BitBLT engine tests driven through the port and memory interfaces.

*/

use marty_cirrus::{
    bus::{IoDevice, MemoryMappedDevice, NULL_DELTA},
    devices::cirrus::{variant, GRAPHICS_ADDRESS, GRAPHICS_DATA, SEQUENCER_ADDRESS_REGISTER, SEQUENCER_DATA_REGISTER},
    ChipVariant,
    CirrusCard,
    CirrusConfig,
};

const APERTURE: usize = 0xA0000;

fn unlocked_card(variant: ChipVariant) -> CirrusCard {
    let mut card = CirrusCard::new(&CirrusConfig::new(variant, variant::VRAM_1M)).unwrap();
    card.write_u8(SEQUENCER_ADDRESS_REGISTER, 0x06, NULL_DELTA);
    card.write_u8(SEQUENCER_DATA_REGISTER, 0x12, NULL_DELTA);
    assert!(card.extensions_unlocked());
    card
}

fn write_gr(card: &mut CirrusCard, index: u8, data: u8) {
    card.write_u8(GRAPHICS_ADDRESS, index, NULL_DELTA);
    card.write_u8(GRAPHICS_DATA, data, NULL_DELTA);
}

fn read_gr(card: &mut CirrusCard, index: u8) -> u8 {
    card.write_u8(GRAPHICS_ADDRESS, index, NULL_DELTA);
    card.read_u8(GRAPHICS_DATA, NULL_DELTA)
}

/// Program the geometry and address registers of a transfer.
fn setup_blt(card: &mut CirrusCard, width: u16, height: u16, dst_pitch: u16, src_pitch: u16, dst: u32, src: u32) {
    write_gr(card, 0x20, width as u8);
    write_gr(card, 0x21, (width >> 8) as u8);
    write_gr(card, 0x22, height as u8);
    write_gr(card, 0x23, (height >> 8) as u8);
    write_gr(card, 0x24, dst_pitch as u8);
    write_gr(card, 0x25, (dst_pitch >> 8) as u8);
    write_gr(card, 0x26, src_pitch as u8);
    write_gr(card, 0x27, (src_pitch >> 8) as u8);
    write_gr(card, 0x28, dst as u8);
    write_gr(card, 0x29, (dst >> 8) as u8);
    write_gr(card, 0x2A, (dst >> 16) as u8);
    write_gr(card, 0x2C, src as u8);
    write_gr(card, 0x2D, (src >> 8) as u8);
    write_gr(card, 0x2E, (src >> 16) as u8);
}

fn run_blt(card: &mut CirrusCard, mode: u8, rop: u8) {
    write_gr(card, 0x30, mode);
    write_gr(card, 0x32, rop);
    write_gr(card, 0x31, 0x02);
}

#[test]
fn copy_two_rows() {
    let mut card = unlocked_card(ChipVariant::GD5430);
    card.vram_mut().load(0, &[1, 2, 3, 4, 5, 6, 7, 8]);

    setup_blt(&mut card, 4, 2, 4, 4, 0x1000, 0);
    run_blt(&mut card, 0x00, 0x0D);

    assert_eq!(&card.vram().as_slice()[0x1000..0x1008], &[1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(card.vram().read_u8(0x1008), 0);
    assert!(!card.blt_busy());
    assert_eq!(read_gr(&mut card, 0x31) & 0x01, 0);
}

#[test]
fn xor_onto_filled_destination() {
    let mut card = unlocked_card(ChipVariant::GD5430);
    card.vram_mut().load(0, &[0x0F; 4]);
    card.vram_mut().load(0x1000, &[0xFF; 4]);

    setup_blt(&mut card, 4, 1, 4, 4, 0x1000, 0);
    run_blt(&mut card, 0x00, 0x59);

    assert_eq!(&card.vram().as_slice()[0x1000..0x1004], &[0xF0; 4]);
}

#[test]
fn reverse_copy_handles_overlap() {
    let mut card = unlocked_card(ChipVariant::GD5430);
    let pattern: Vec<u8> = (1..=16).collect();
    card.vram_mut().load(0x100, &pattern);

    let mut expected = card.vram().as_slice()[0x100..0x120].to_vec();
    expected.copy_within(0..16, 4);

    // Reverse transfers address the last byte of each rectangle.
    setup_blt(&mut card, 16, 1, 16, 16, 0x113, 0x10F);
    run_blt(&mut card, 0x01, 0x0D);

    assert_eq!(&card.vram().as_slice()[0x100..0x120], &expected[..]);
}

#[test]
fn reverse_copy_steps_rows_by_pitch() {
    let mut card = unlocked_card(ChipVariant::GD5430);
    let pattern: Vec<u8> = (1..=0x40).collect();
    card.vram_mut().load(0x100, &pattern);

    // A 4x4 rectangle at pitch 16, moved down one row and right one column.
    let mut expected = card.vram().as_slice()[0x100..0x160].to_vec();
    let mut rect = [0u8; 16];
    for row in 0..4 {
        rect[row * 4..row * 4 + 4].copy_from_slice(&expected[row * 16..row * 16 + 4]);
    }
    for row in 0..4 {
        expected[0x11 + row * 16..0x11 + row * 16 + 4].copy_from_slice(&rect[row * 4..row * 4 + 4]);
    }

    setup_blt(&mut card, 4, 4, 16, 16, 0x111 + 0x33, 0x100 + 0x33);
    run_blt(&mut card, 0x01, 0x0D);

    assert_eq!(&card.vram().as_slice()[0x100..0x160], &expected[..]);
    assert!(!card.blt_busy());
}

#[test]
fn reverse_transparency_uses_pixel_lanes() {
    let mut card = unlocked_card(ChipVariant::GD5430);
    // 16bpp pixels; 0x1234 is the transparent key.
    card.vram_mut().load(0x200, &[0x34, 0x12, 0x78, 0x56, 0x34, 0x12]);
    card.vram_mut().load(0x208, &[0x78, 0x56, 0x34, 0x12, 0x9A, 0xBC]);
    card.vram_mut().load(0x300, &[0xEE; 16]);

    setup_blt(&mut card, 6, 2, 8, 8, 0x308 + 5, 0x208 + 5);
    write_gr(&mut card, 0x34, 0x34);
    write_gr(&mut card, 0x35, 0x12);
    write_gr(&mut card, 0x38, 0xFF);
    write_gr(&mut card, 0x39, 0xFF);
    run_blt(&mut card, 0x19, 0x0D);

    assert_eq!(&card.vram().as_slice()[0x300..0x306], &[0xEE, 0xEE, 0x78, 0x56, 0xEE, 0xEE]);
    assert_eq!(&card.vram().as_slice()[0x308..0x30E], &[0x78, 0x56, 0xEE, 0xEE, 0x9A, 0xBC]);
    assert_eq!(card.vram().read_u8(0x306), 0xEE);
}

#[test]
fn transparent_bytes_are_skipped() {
    let mut card = unlocked_card(ChipVariant::GD5430);
    card.vram_mut().load(0, &[0x00, 0x05, 0x00, 0x07]);
    card.vram_mut().load(0x1000, &[0xAA; 4]);

    setup_blt(&mut card, 4, 1, 4, 4, 0x1000, 0);
    write_gr(&mut card, 0x34, 0x00);
    write_gr(&mut card, 0x35, 0x00);
    write_gr(&mut card, 0x38, 0xFF);
    write_gr(&mut card, 0x39, 0xFF);
    run_blt(&mut card, 0x08, 0x0D);

    assert_eq!(&card.vram().as_slice()[0x1000..0x1004], &[0xAA, 0x05, 0xAA, 0x07]);
}

#[test]
fn zero_sized_blt_is_a_no_op() {
    let mut card = unlocked_card(ChipVariant::GD5430);
    card.vram_mut().load(0, &[9; 16]);
    let before = card.vram().as_slice().to_vec();

    setup_blt(&mut card, 0, 4, 4, 4, 0x1000, 0);
    run_blt(&mut card, 0x00, 0x0D);
    assert!(!card.blt_busy());

    setup_blt(&mut card, 4, 0, 4, 4, 0x1000, 0);
    run_blt(&mut card, 0x00, 0x0D);
    assert!(!card.blt_busy());

    assert_eq!(card.vram().as_slice(), &before[..]);
}

#[test]
fn copy_is_repeatable() {
    let mut card = unlocked_card(ChipVariant::GD5430);
    let source: Vec<u8> = (0..64).map(|i| (i * 7) as u8).collect();
    card.vram_mut().load(0, &source);
    setup_blt(&mut card, 8, 8, 16, 8, 0x4000, 0);

    let mut twin = card.clone();
    run_blt(&mut card, 0x00, 0x0D);
    run_blt(&mut twin, 0x00, 0x0D);
    assert_eq!(card.vram().as_slice(), twin.vram().as_slice());

    // A second identical copy changes nothing.
    run_blt(&mut twin, 0x00, 0x0D);
    assert_eq!(card.vram().as_slice(), twin.vram().as_slice());
}

#[test]
fn pattern_fill_repeats_every_eight_rows() {
    let mut card = unlocked_card(ChipVariant::GD5430);
    let pattern: Vec<u8> = (0..64).collect();
    card.vram_mut().load(0, &pattern);

    setup_blt(&mut card, 16, 10, 16, 0, 0x1000, 0);
    run_blt(&mut card, 0x40, 0x0D);

    for y in 0..10usize {
        for x in 0..16usize {
            assert_eq!(
                card.vram().read_u8(0x1000 + y * 16 + x),
                pattern[(y % 8) * 8 + x % 8],
                "pixel {},{}",
                x,
                y
            );
        }
    }
}

#[test]
fn color_expand_uses_fg_and_bg() {
    let mut card = unlocked_card(ChipVariant::GD5430);
    card.vram_mut().write_u8(0, 0b1010_0000);
    write_gr(&mut card, 0x00, 0x01);
    write_gr(&mut card, 0x01, 0x0F);

    setup_blt(&mut card, 4, 1, 4, 1, 0x1000, 0);
    run_blt(&mut card, 0x80, 0x0D);

    assert_eq!(&card.vram().as_slice()[0x1000..0x1004], &[0x0F, 0x01, 0x0F, 0x01]);
}

#[test]
fn system_to_vram_through_aperture() {
    let mut card = unlocked_card(ChipVariant::GD5430);
    let data = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];

    setup_blt(&mut card, 4, 2, 4, 0, 0x2000, 0);
    run_blt(&mut card, 0x04, 0x0D);
    assert!(card.blt_busy());

    for byte in data {
        card.mmio_write_u8(APERTURE, byte, 0);
    }

    assert!(!card.blt_busy());
    assert_eq!(&card.vram().as_slice()[0x2000..0x2008], &data);
    // Fed bytes never land at the aperture address itself.
    assert_eq!(card.vram().read_u8(0), 0);

    // Once complete, aperture writes go to memory again.
    card.mmio_write_u8(APERTURE, 0x99, 0);
    assert_eq!(card.vram().read_u8(0), 0x99);
}

#[test]
fn blt_reset_abandons_system_transfer() {
    let mut card = unlocked_card(ChipVariant::GD5430);
    setup_blt(&mut card, 4, 2, 4, 0, 0x2000, 0);
    run_blt(&mut card, 0x04, 0x0D);
    card.mmio_write_u8(APERTURE, 0x11, 0);

    write_gr(&mut card, 0x31, 0x04);
    assert!(!card.blt_busy());
    assert_eq!(read_gr(&mut card, 0x31) & 0x04, 0x04);

    card.mmio_write_u8(APERTURE + 1, 0x22, 0);
    assert_eq!(card.vram().read_u8(1), 0x22);
    assert_eq!(card.vram().read_u8(0x2001), 0);
}

#[test]
fn blt_registers_are_locked() {
    let mut card = CirrusCard::new(&CirrusConfig::new(ChipVariant::GD5430, variant::VRAM_1M)).unwrap();
    card.vram_mut().load(0, &[1, 2, 3, 4]);

    setup_blt(&mut card, 4, 1, 4, 4, 0x1000, 0);
    run_blt(&mut card, 0x00, 0x0D);

    assert_eq!(read_gr(&mut card, 0x20), 0);
    assert_eq!(&card.vram().as_slice()[0x1000..0x1004], &[0; 4]);
}

#[test]
fn mmio_blt_window_honours_lock() {
    let mut card = unlocked_card(ChipVariant::GD5430);
    card.vram_mut().load(0, &[1, 2, 3, 4]);
    setup_blt(&mut card, 4, 1, 4, 4, 0x2000, 0);
    card.write_u8(SEQUENCER_ADDRESS_REGISTER, 0x17, NULL_DELTA);
    card.write_u8(SEQUENCER_DATA_REGISTER, 0x04, NULL_DELTA);

    card.write_u8(SEQUENCER_ADDRESS_REGISTER, 0x06, NULL_DELTA);
    card.write_u8(SEQUENCER_DATA_REGISTER, 0x00, NULL_DELTA);
    assert!(!card.extensions_unlocked());

    card.mmio_write_u8(0xB8008, 0x03, 0);
    card.mmio_write_u8(0xB8011, 0x10, 0);
    card.mmio_write_u8(0xB8040, 0x02, 0);

    assert_eq!(card.mmio_peek_u8(0xB8008), 0x04);
    assert_eq!(read_gr(&mut card, 0x29), 0x20);
    assert!(!card.blt_busy());
    assert_eq!(&card.vram().as_slice()[0x2000..0x2004], &[0; 4]);
    assert_eq!(&card.vram().as_slice()[0x1000..0x1004], &[0; 4]);
}
