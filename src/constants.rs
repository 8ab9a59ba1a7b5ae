// FRAME_LEN is the size of every frame on the wire, command or response.
pub const FRAME_LEN: usize = 9;

// START_BYTE is the byte that marks the beginning of any frame (command or response).
pub const START_BYTE: u8 = 0xFF;

// SENSOR_NUMBER addresses the sensor in command frames. The MH-Z19B only answers to 0x01.
pub const SENSOR_NUMBER: u8 = 0x01;

// Command codes, placed at byte 2 of a command frame and echoed at byte 1 of the response.
pub const CMD_READ_CO2: u8 = 0x86;
pub const CMD_CALIBRATE_ZERO: u8 = 0x87;
pub const CMD_CALIBRATE_SPAN: u8 = 0x88;
pub const CMD_AUTO_CALIBRATION: u8 = 0x79;
pub const CMD_DETECTION_RANGE: u8 = 0x99;

// Payload byte 0 of the auto-calibration command.
pub const AUTO_CALIBRATION_ON: u8 = 0xA0;
pub const AUTO_CALIBRATION_OFF: u8 = 0x00;

// Accepted span-point calibration targets, in ppm.
pub const SPAN_POINT_MIN_PPM: u16 = 1000;
pub const SPAN_POINT_MAX_PPM: u16 = 5000;

// DEFAULT_TIMEOUT_MS bounds the wait for a response frame.
pub const DEFAULT_TIMEOUT_MS: u32 = 1000;
