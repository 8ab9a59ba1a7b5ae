use core::fmt;

/// A response frame was received but failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer (or more) than 9 bytes were handed to the parser.
    BadLength(usize),
    /// Byte 0 was not the 0xFF start marker.
    BadStart(u8),
    /// The checksum over bytes 1..=7 does not match byte 8.
    ChecksumMismatch { expected: u8, found: u8 },
    /// The response echoes a different command than the one sent.
    UnexpectedCommand { expected: u8, found: u8 },
}

/// The serial link did not deliver (or accept) a complete frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError<E> {
    Timeout,
    Incomplete,
    Io(E),
}

/// Half of a transaction a transport failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Handing the command frame to the serial.
    Write,
    /// Flushing a command frame the serial already accepted.
    Flush,
    /// Waiting for the response frame.
    Read,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// Rejected before any I/O; carries the offending value.
    InvalidArgument(u16),
    Transport {
        phase: Phase,
        source: TransportError<E>,
    },
    Frame(FrameError),
}

impl<E> Error<E> {
    /// Whether the command frame reached the wire before the failure.
    ///
    /// A calibration command that failed with `true` here may still have taken
    /// effect on the sensor: only the response could not be trusted.
    pub fn command_sent(&self) -> bool {
        match self {
            Error::InvalidArgument(_) => false,
            Error::Transport { phase, .. } => *phase != Phase::Write,
            Error::Frame(_) => true,
        }
    }
}

impl<E> From<FrameError> for Error<E> {
    fn from(e: FrameError) -> Self {
        Error::Frame(e)
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::BadLength(len) => {
                write!(f, "wrong frame length, expected 9, found {}", len)
            }
            FrameError::BadStart(found) => {
                write!(f, "wrong start byte, expected 0xFF, found {:#04X}", found)
            }
            FrameError::ChecksumMismatch { expected, found } => write!(
                f,
                "invalid checksum, expected {:#04X}, found {:#04X}",
                expected, found
            ),
            FrameError::UnexpectedCommand { expected, found } => write!(
                f,
                "unexpected command echo, expected {:#04X}, found {:#04X}",
                expected, found
            ),
        }
    }
}

impl<E: fmt::Debug> fmt::Display for TransportError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Timeout => write!(f, "timed out"),
            TransportError::Incomplete => write!(f, "incomplete frame"),
            TransportError::Io(e) => write!(f, "serial error: {:?}", e),
        }
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(value) => write!(f, "invalid argument: {}", value),
            Error::Transport { phase, source } => {
                write!(f, "transport failure during {:?}: {}", phase, source)
            }
            Error::Frame(e) => write!(f, "invalid response frame: {}", e),
        }
    }
}
