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

    devices::cirrus::vram.rs

    Linear video memory. All addressing wraps at the memory size.

*/

/// Video memory. Size is always a power of two, so every address is reduced with a mask
/// rather than checked.
#[derive(Clone)]
pub struct Vram {
    mem: Box<[u8]>,
    mask: usize,
}

impl Vram {
    pub fn new(size: usize) -> Self {
        debug_assert!(size.is_power_of_two());
        Self {
            mem: vec![0; size].into_boxed_slice(),
            mask: size - 1,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mem.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mem.is_empty()
    }

    #[inline]
    pub fn read_u8(&self, address: usize) -> u8 {
        self.mem[address & self.mask]
    }

    #[inline]
    pub fn write_u8(&mut self, address: usize, data: u8) {
        self.mem[address & self.mask] = data;
    }

    /// Read a little-endian value of `bytes` width (1-4).
    #[inline]
    pub fn read_le(&self, address: usize, bytes: usize) -> u32 {
        (0..bytes).fold(0, |acc, i| acc | (self.read_u8(address + i) as u32) << (i * 8))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.mem
    }

    /// Copy `data` into memory starting at `address`, wrapping at the end.
    pub fn load(&mut self, address: usize, data: &[u8]) {
        for (i, byte) in data.iter().enumerate() {
            self.write_u8(address + i, *byte);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vram_wraps() {
        let mut vram = Vram::new(0x40000);
        vram.write_u8(0x40001, 0xAA);
        assert_eq!(vram.read_u8(1), 0xAA);
        vram.load(0x3FFFF, &[0x11, 0x22]);
        assert_eq!(vram.read_u8(0), 0x22);
        assert_eq!(vram.read_le(0x3FFFF, 2), 0x2211);
    }
}
