use crate::DEFAULT_TIMEOUT_MS;

/// Upper limit of the sensor's detection range.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum DetectionRange {
    /// 0 - 2000 ppm.
    Ppm2000,
    /// 0 - 5000 ppm.
    Ppm5000,
}

impl DetectionRange {
    /// Returns the range's upper limit in ppm, as sent on the wire.
    pub fn ppm(self) -> u16 {
        match self {
            DetectionRange::Ppm2000 => 2000,
            DetectionRange::Ppm5000 => 5000,
        }
    }
}

/// A detection range the sensor does not support, in ppm.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct UnsupportedRange(pub u16);

impl TryFrom<u16> for DetectionRange {
    type Error = UnsupportedRange;

    fn try_from(ppm: u16) -> Result<Self, Self::Error> {
        match ppm {
            2000 => Ok(DetectionRange::Ppm2000),
            5000 => Ok(DetectionRange::Ppm5000),
            other => Err(UnsupportedRange(other)),
        }
    }
}

/// Configuration settings for the MH-Z19B session.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Config {
    /// How long to wait for a frame to be written or a response to arrive, in milliseconds.
    pub timeout_ms: u32,
}

impl Config {
    /// Creates a new `Config` instance.
    ///
    /// # Arguments
    ///
    /// * `timeout_ms` - The transaction timeout in milliseconds.
    pub fn new(timeout_ms: u32) -> Config {
        Config { timeout_ms }
    }
    /// Sets the transaction timeout for the configuration.
    ///
    /// # Arguments
    ///
    /// * `timeout_ms` - The timeout to set, in milliseconds.
    ///
    /// # Returns
    ///
    /// The updated `Config` instance.
    pub fn timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

impl Default for Config {
    /// Returns the default configuration.
    ///
    /// The sensor answers well within a second, so the default timeout is 1000 ms.
    fn default() -> Config {
        Config {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_detection_range() {
        assert_eq!(DetectionRange::try_from(2000u16), Ok(DetectionRange::Ppm2000));
        assert_eq!(DetectionRange::try_from(5000u16), Ok(DetectionRange::Ppm5000));
        assert_eq!(DetectionRange::try_from(3000u16), Err(UnsupportedRange(3000)));
        assert_eq!(DetectionRange::Ppm5000.ppm(), 5000);
    }

    #[test]
    fn test_config() {
        assert_eq!(Config::default().timeout_ms, 1000);
        assert_eq!(Config::default().timeout_ms(250), Config::new(250));
    }
}
