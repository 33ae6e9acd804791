//! Register-map I2C double for driver tests

use std::collections::HashMap;
use std::convert::Infallible;

use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};

/// Devices modelled as auto-incrementing register files
#[derive(Debug, Default)]
pub struct MockBus {
    registers: HashMap<(u8, u8), u8>,
    pointer: HashMap<u8, u8>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, address: u8, start: u8, values: &[u8]) {
        for (i, value) in values.iter().enumerate() {
            self.registers
                .insert((address, start.wrapping_add(i as u8)), *value);
        }
    }

    pub fn get(&self, address: u8, register: u8) -> u8 {
        self.registers
            .get(&(address, register))
            .copied()
            .unwrap_or(0)
    }
}

impl ErrorType for MockBus {
    type Error = Infallible;
}

impl I2c<SevenBitAddress> for MockBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    if let Some((register, data)) = bytes.split_first() {
                        self.pointer.insert(address, *register);
                        self.set(address, *register, data);
                    }
                }
                Operation::Read(buf) => {
                    let start = self.pointer.get(&address).copied().unwrap_or(0);
                    for (i, byte) in buf.iter_mut().enumerate() {
                        *byte = self.get(address, start.wrapping_add(i as u8));
                    }
                }
            }
        }
        Ok(())
    }
}
