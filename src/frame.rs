//! Encoding and validation of the fixed 9-byte MH-Z19B frames.
//!
//! Command frame: `FF 01 CMD P0 P1 P2 P3 00 CS`
//! Response frame: `FF CMD HI LO 00 00 00 00 CS`
//!
//! `CS` is the two's complement of the sum of bytes 1..=7.

use crate::{FrameError, FRAME_LEN, SENSOR_NUMBER, START_BYTE};

/// A raw frame as it travels on the wire.
pub type Frame = [u8; FRAME_LEN];

/// Command-specific payload, bytes 3..=6 of a command frame.
pub type Payload = [u8; 4];

/// The logical fields of a validated response frame.
///
/// Interpretation of `data_high` / `data_low` depends on the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    /// Command code echoed by the sensor.
    pub command: u8,
    /// Byte 2, high byte of the payload value.
    pub data_high: u8,
    /// Byte 3, low byte of the payload value.
    pub data_low: u8,
}

impl Response {
    /// Big-endian combination of the two data bytes.
    pub fn data(&self) -> u16 {
        u16::from_be_bytes([self.data_high, self.data_low])
    }
}

/// Computes the checksum of the bytes between the start byte and the checksum slot.
pub fn checksum(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b));
    (0xFFu8 - sum).wrapping_add(1)
}

/// Builds a command frame addressed to the sensor, with its checksum.
pub fn build_command_frame(command: u8, payload: Payload) -> Frame {
    let mut frame = [
        START_BYTE,
        SENSOR_NUMBER,
        command,
        payload[0],
        payload[1],
        payload[2],
        payload[3],
        0x00, // Reserved
        0x00, // Placeholder for checksum
    ];
    frame[8] = checksum(&frame[1..8]);
    frame
}

/// Builds a response frame as the sensor would send it.
///
/// Used to simulate the sensor, e.g. in tests or loopback setups.
pub fn build_response_frame(command: u8, data_high: u8, data_low: u8) -> Frame {
    let mut frame = [
        START_BYTE, command, data_high, data_low, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];
    frame[8] = checksum(&frame[1..8]);
    frame
}

/// Validates a response frame and extracts its fields.
///
/// The start byte is checked before the checksum, so a frame with a foreign
/// start byte is always reported as `BadStart`.
pub fn parse_response_frame(bytes: &[u8]) -> Result<Response, FrameError> {
    if bytes.len() != FRAME_LEN {
        return Err(FrameError::BadLength(bytes.len()));
    }
    if bytes[0] != START_BYTE {
        return Err(FrameError::BadStart(bytes[0]));
    }
    let expected = checksum(&bytes[1..8]);
    if expected != bytes[8] {
        return Err(FrameError::ChecksumMismatch {
            expected,
            found: bytes[8],
        });
    }

    Ok(Response {
        command: bytes[1],
        data_high: bytes[2],
        data_low: bytes[3],
    })
}
