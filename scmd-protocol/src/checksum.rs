//! Dallas/Maxim CRC-8
//!
//! Reflected polynomial 0x8C (x^8 + x^5 + x^4 + 1), LSB first, initial
//! value 0, no final XOR. Computed bitwise; a lookup table costs 256 bytes
//! of flash for no measurable gain at UART speeds.

/// Reflected feedback value for the Dallas/Maxim polynomial
const POLY: u8 = 0x8C;

/// Compute the CRC-8 of `data`
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |crc, &byte| update(crc, byte))
}

/// Fold one byte into a running CRC
#[inline]
pub fn update(mut crc: u8, mut byte: u8) -> u8 {
    for _ in 0..8 {
        let mix = (crc ^ byte) & 0x01;
        crc >>= 1;
        if mix != 0 {
            crc ^= POLY;
        }
        byte >>= 1;
    }
    crc
}
