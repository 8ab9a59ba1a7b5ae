#![allow(dead_code)]

use std::collections::VecDeque;

use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{ErrorKind, ErrorType, Read, ReadReady, Write};
use mhz19b_nostd_rs::{Config, Mhz19b};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    Broken,
}

impl embedded_io_async::Error for MockError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Scripted serial port standing in for the sensor.
///
/// Each completed write releases the next queued response into the receive
/// buffer, the way the sensor only answers once it got a command.
pub struct MockSerial {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub writes: usize,
    pub fail_write: bool,
    pub hang_write: bool,
    pub hang_flush: bool,
    pub hang_read: bool,
    responses: VecDeque<Vec<u8>>,
}

impl MockSerial {
    pub fn new(responses: &[&[u8]]) -> MockSerial {
        MockSerial {
            rx: VecDeque::new(),
            tx: Vec::new(),
            writes: 0,
            fail_write: false,
            hang_write: false,
            hang_flush: false,
            hang_read: false,
            responses: responses.iter().map(|r| r.to_vec()).collect(),
        }
    }

    /// Bytes already waiting on the line before the first command.
    pub fn with_stale(mut self, stale: &[u8]) -> MockSerial {
        self.rx.extend(stale.iter().copied());
        self
    }
}

impl ErrorType for MockSerial {
    type Error = MockError;
}

impl Read for MockSerial {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, MockError> {
        if self.rx.is_empty() && self.hang_read {
            core::future::pending::<()>().await;
        }
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl ReadReady for MockSerial {
    fn read_ready(&mut self) -> Result<bool, MockError> {
        Ok(!self.rx.is_empty())
    }
}

impl Write for MockSerial {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, MockError> {
        if self.fail_write {
            return Err(MockError::Broken);
        }
        if self.hang_write {
            core::future::pending::<()>().await;
        }
        self.writes += 1;
        self.tx.extend_from_slice(buf);
        if let Some(response) = self.responses.pop_front() {
            self.rx.extend(response);
        }
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), MockError> {
        if self.hang_flush {
            core::future::pending::<()>().await;
        }
        Ok(())
    }
}

/// Timer that expires immediately, so any serial operation that would block
/// times out instead.
pub struct InstantDelay;

impl DelayNs for InstantDelay {
    async fn delay_ns(&mut self, _ns: u32) {}
}

pub fn sensor(serial: MockSerial) -> Mhz19b<MockSerial, InstantDelay> {
    Mhz19b::new(serial, InstantDelay, Config::default())
}
