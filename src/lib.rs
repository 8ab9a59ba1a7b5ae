#![cfg_attr(not(test), no_std)]

use embassy_futures::select::{select, Either};
use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{Read, ReadReady, Write};
use log::debug;

mod constants;
pub use constants::*;

mod error;
pub use error::*;

mod config;
pub use config::*;

pub mod frame;
use frame::{Frame, Payload};

// Upper bound on reads spent discarding stale input before a command.
const MAX_DRAIN_READS: usize = 8;

/// Represents an MH-Z19B infrared CO2 sensor.
///
/// Every operation is one half-duplex transaction: a 9-byte command frame is
/// written, then exactly one 9-byte response frame is read and validated
/// before any of its payload is used. Operations take `&mut self`, so a
/// session can never have two transactions in flight; share it between tasks
/// behind a mutex held for the whole call.
///
/// No operation is retried. Calibration commands have a physical effect on
/// the sensor and must not be re-issued blindly; see [`Error::command_sent`].
///
/// # Type Parameters
///
/// * `Serial`: The serial interface used to communicate with the sensor
///   (9600 baud, 8N1). It must implement `embedded_io_async::Read`,
///   `embedded_io_async::Write` and `embedded_io_async::ReadReady`.
/// * `Delay`: An `embedded_hal_async::delay::DelayNs` timer bounding each
///   serial operation.
pub struct Mhz19b<Serial, Delay> {
    serial: Serial,
    delay: Delay,
    config: Config,
}

impl<S, D> Mhz19b<S, D>
where
    S: Read + Write + ReadReady,
    D: DelayNs,
{
    /// Creates a new `Mhz19b` session.
    ///
    /// # Arguments
    ///
    /// * `serial`: The serial interface for communication with the sensor.
    /// * `delay`: The timer used for transaction timeouts.
    /// * `config`: The session configuration.
    pub fn new(serial: S, delay: D, config: Config) -> Self {
        Self {
            serial,
            delay,
            config,
        }
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consumes the session, returning the serial interface and timer.
    pub fn release(self) -> (S, D) {
        (self.serial, self.delay)
    }

    /// Reads the current CO2 concentration in ppm.
    ///
    /// The value is reported as the sensor sends it, without clamping to the
    /// configured detection range. This is the only operation that is safe
    /// for the caller to retry.
    pub async fn read_co2(&mut self) -> Result<u16, Error<S::Error>> {
        debug!("Reading CO2 concentration (CMD 0x86)");
        let response = self.transaction(CMD_READ_CO2, [0x00; 4]).await?;

        if response.command != CMD_READ_CO2 {
            log::error!(
                "Read CO2: response echoes command {:02X}, expected {:02X}",
                response.command,
                CMD_READ_CO2
            );
            return Err(Error::Frame(FrameError::UnexpectedCommand {
                expected: CMD_READ_CO2,
                found: response.command,
            }));
        }

        let ppm = response.data();
        debug!("CO2 concentration: {} ppm", ppm);
        Ok(ppm)
    }

    /// Calibrates the zero point (400 ppm).
    ///
    /// The sensor must have been running in a stable 400 ppm atmosphere (fresh
    /// outdoor air) for at least 20 minutes beforehand.
    pub async fn calibrate_zero_point(&mut self) -> Result<(), Error<S::Error>> {
        debug!("Calibrating zero point (CMD 0x87)");
        self.transaction(CMD_CALIBRATE_ZERO, [0x00; 4]).await?;
        Ok(())
    }

    /// Calibrates the span point against a reference concentration.
    ///
    /// Do a zero-point calibration first, and keep the sensor in the reference
    /// atmosphere for at least 20 minutes. 2000 ppm is the suggested target.
    ///
    /// # Arguments
    ///
    /// * `ppm`: The reference concentration, between 1000 and 5000 ppm inclusive.
    ///
    /// # Returns
    ///
    /// * `Ok(())` once the sensor's response validated.
    /// * `Err(Error::InvalidArgument)` if `ppm` is out of range; nothing is sent.
    pub async fn calibrate_span_point(&mut self, ppm: u16) -> Result<(), Error<S::Error>> {
        if !(SPAN_POINT_MIN_PPM..=SPAN_POINT_MAX_PPM).contains(&ppm) {
            log::error!(
                "Span point {} ppm out of range ({}-{})",
                ppm,
                SPAN_POINT_MIN_PPM,
                SPAN_POINT_MAX_PPM
            );
            return Err(Error::InvalidArgument(ppm));
        }
        debug!("Calibrating span point to {} ppm (CMD 0x88)", ppm);
        let [high, low] = ppm.to_be_bytes();
        self.transaction(CMD_CALIBRATE_SPAN, [high, low, 0x00, 0x00])
            .await?;
        Ok(())
    }

    /// Enables or disables Automatic Baseline Correction.
    ///
    /// With ABC on (the factory setting) the sensor recalibrates its zero point
    /// every 24 hours against the lowest reading seen. Suited to homes and
    /// offices that are regularly aired out; not to greenhouses, farms or
    /// refrigerators.
    pub async fn set_auto_calibration(&mut self, enabled: bool) -> Result<(), Error<S::Error>> {
        debug!("Setting automatic baseline correction to {} (CMD 0x79)", enabled);
        let flag = if enabled {
            AUTO_CALIBRATION_ON
        } else {
            AUTO_CALIBRATION_OFF
        };
        self.transaction(CMD_AUTO_CALIBRATION, [flag, 0x00, 0x00, 0x00])
            .await?;
        Ok(())
    }

    /// Sets the upper limit of the detection range.
    ///
    /// # Arguments
    ///
    /// * `ppm`: Either 2000 or 5000.
    ///
    /// # Returns
    ///
    /// * `Ok(())` once the sensor's response validated.
    /// * `Err(Error::InvalidArgument)` for any other value; nothing is sent.
    pub async fn set_detection_range(&mut self, ppm: u16) -> Result<(), Error<S::Error>> {
        let range = DetectionRange::try_from(ppm).map_err(|UnsupportedRange(ppm)| {
            log::error!("Detection range {} ppm not supported (2000 or 5000)", ppm);
            Error::InvalidArgument(ppm)
        })?;
        debug!("Setting detection range to {:?} (CMD 0x99)", range);
        let [high, low] = range.ppm().to_be_bytes();
        self.transaction(CMD_DETECTION_RANGE, [high, low, 0x00, 0x00])
            .await?;
        Ok(())
    }

    // Runs one write + read cycle and returns the validated response.
    async fn transaction(
        &mut self,
        command: u8,
        payload: Payload,
    ) -> Result<frame::Response, Error<S::Error>> {
        let request = frame::build_command_frame(command, payload);

        self.drain().await;
        self.write(&request).await.map_err(|(phase, source)| {
            log::error!(
                "Failed to send command {:02X} ({:?}): {:?}",
                command,
                phase,
                source
            );
            Error::Transport { phase, source }
        })?;

        let buffer = self.read().await.map_err(|source| {
            log::error!(
                "No valid response to command {:02X}: {:?}",
                command,
                source
            );
            Error::Transport {
                phase: Phase::Read,
                source,
            }
        })?;

        let response = frame::parse_response_frame(&buffer).map_err(|e| {
            log::error!("Rejected response frame {:02X?}: {:?}", buffer, e);
            Error::Frame(e)
        })?;

        if response.command != command {
            // Some firmware revisions echo acknowledgements differently.
            log::warn!(
                "Response echoes command {:02X}, sent {:02X}",
                response.command,
                command
            );
        }

        Ok(response)
    }

    // Discards input left over from an earlier transaction, e.g. a response
    // that arrived after its read timed out.
    async fn drain(&mut self) {
        let mut scratch = [0u8; 16];
        for _ in 0..MAX_DRAIN_READS {
            match self.serial.read_ready() {
                Ok(true) => {}
                Ok(false) => return,
                Err(e) => {
                    log::warn!("Serial read_ready failed while draining: {:?}", e);
                    return;
                }
            }
            match self.serial.read(&mut scratch).await {
                Ok(0) => return,
                Ok(n) => log::trace!("Discarded stale bytes: {:02X?}", &scratch[..n]),
                Err(e) => {
                    log::warn!("Serial read failed while draining: {:?}", e);
                    return;
                }
            }
        }
        log::warn!("Serial input still pending after {} drain reads", MAX_DRAIN_READS);
    }

    // Writes a command frame, bounded by the configured timeout. Failures are
    // tagged `Phase::Flush` once all bytes were accepted by the serial.
    async fn write(
        &mut self,
        command: &Frame,
    ) -> Result<(), (Phase, TransportError<S::Error>)> {
        debug!("Executing command: {:02X?}", command);
        let serial = &mut self.serial;
        let mut written = false;
        let io = async {
            serial
                .write_all(command)
                .await
                .map_err(|e| (Phase::Write, TransportError::Io(e)))?;
            written = true;
            serial
                .flush()
                .await
                .map_err(|e| (Phase::Flush, TransportError::Io(e)))?; // Ensure data is sent
            Ok::<(), (Phase, TransportError<S::Error>)>(())
        };

        let outcome = select(io, self.delay.delay_ms(self.config.timeout_ms)).await;

        match outcome {
            Either::First(result) => result,
            Either::Second(()) if written => Err((Phase::Flush, TransportError::Timeout)),
            Either::Second(()) => Err((Phase::Write, TransportError::Timeout)),
        }
    }

    // Reads exactly one frame, bounded by the configured timeout. A frame cut
    // short by the timer or by end of input is `Incomplete`; no bytes at all
    // within the timeout is `Timeout`.
    async fn read(&mut self) -> Result<Frame, TransportError<S::Error>> {
        let mut buffer = [0u8; FRAME_LEN];
        let mut filled = 0;

        let serial = &mut self.serial;
        let io = async {
            while filled < FRAME_LEN {
                match serial.read(&mut buffer[filled..]).await {
                    Ok(0) => return Err(TransportError::Incomplete),
                    Ok(n) => filled += n,
                    Err(e) => return Err(TransportError::Io(e)),
                }
            }
            Ok::<(), TransportError<S::Error>>(())
        };

        let outcome = select(io, self.delay.delay_ms(self.config.timeout_ms)).await;

        match outcome {
            Either::First(Ok(())) => {
                debug!("Received frame: {:02X?}", buffer);
                Ok(buffer)
            }
            Either::First(Err(e)) => {
                debug!("Read failed after {} bytes: {:02X?}", filled, &buffer[..filled]);
                Err(e)
            }
            Either::Second(()) if filled > 0 => {
                debug!("Timed out after {} bytes: {:02X?}", filled, &buffer[..filled]);
                Err(TransportError::Incomplete)
            }
            Either::Second(()) => Err(TransportError::Timeout),
        }
    }
}
