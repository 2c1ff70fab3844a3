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

    bus.rs

    Bus-facing device interfaces. The host bus owns the dispatch tables; devices
    describe the address ranges and ports they answer to and expose plain
    read/write handlers for them.

*/

/// Value returned for reads of ports or memory that no device answers.
pub const NO_IO_BYTE: u8 = 0xFF;

#[derive(Copy, Clone, Debug)]
pub enum DeviceRunTimeUnit {
    SystemTicks(u32),
    Microseconds(f64),
}

pub const NULL_DELTA: DeviceRunTimeUnit = DeviceRunTimeUnit::Microseconds(0.0);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MemRangeDescriptor {
    pub address: usize,
    pub size: usize,
    pub cycle_cost: u32,
    pub read_only: bool,
    pub priority: u32,
}

impl MemRangeDescriptor {
    pub fn new(address: usize, size: usize, read_only: bool) -> Self {
        Self {
            address,
            size,
            cycle_cost: 0,
            read_only,
            priority: 1,
        }
    }
}

pub trait MemoryMappedDevice {
    fn get_read_wait(&mut self, address: usize, cycles: u32) -> u32;
    fn mmio_read_u8(&mut self, address: usize, cycles: u32) -> (u8, u32);
    fn mmio_read_u16(&mut self, address: usize, cycles: u32) -> (u16, u32);
    fn mmio_peek_u8(&self, address: usize) -> u8;
    fn mmio_peek_u16(&self, address: usize) -> u16;

    fn get_write_wait(&mut self, address: usize, cycles: u32) -> u32;
    fn mmio_write_u8(&mut self, address: usize, data: u8, cycles: u32) -> u32;
    fn mmio_write_u16(&mut self, address: usize, data: u16, cycles: u32) -> u32;

    /// Return the list of memory ranges this device should be registered for.
    fn get_mapping(&self) -> Vec<MemRangeDescriptor>;
}

pub trait IoDevice {
    /// Read a byte from the specified port, given a delta time that may be used to 'catch up'
    /// the device state, if timing is critical. The default implementation returns NO_IO_BYTE (0xFF).
    fn read_u8(&mut self, _port: u16, _delta: DeviceRunTimeUnit) -> u8 {
        NO_IO_BYTE
    }

    /// Write a byte to the specified port.
    /// The default implementation does nothing.
    fn write_u8(&mut self, _port: u16, _data: u8, _delta: DeviceRunTimeUnit) {}

    /// Return a list of (name, port) pairs this device should be registered for.
    fn port_list(&self) -> Vec<(String, u16)>;
}
