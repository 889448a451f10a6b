//! Byte sources feeding the framer, and the serial port implementation.
use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortBuilder, StopBits};
use std::io::{self, Read};
use std::time::Duration;
use thiserror::Error;

use super::containers::StreamId;

/// VISCA links run at a fixed 9600 8N1.
pub const BAUD_RATE: u32 = 9600;

/// Read timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// One half-duplex line being observed.
pub trait ByteSource {
    /// Whether a byte can be read right now.
    fn has_data(&mut self) -> io::Result<bool>;

    /// Reads a single byte, `Ok(None)` if none arrived before the timeout.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("can't open {stream} port `{path}`: {source}")]
    Open {
        stream: StreamId,
        path: String,
        source: serialport::Error,
    },

    #[error("can't configure {stream} port `{path}`: {source}")]
    Configure {
        stream: StreamId,
        path: String,
        source: serialport::Error,
    },
}

#[derive(Clone, Debug)]
pub struct PortSettings {
    pub timeout: Duration,
    /// Request exclusive access to the TTY.
    pub lock: bool,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            lock: false,
        }
    }
}

/// A serial port tapped onto the TX line of one device. Closed on drop.
pub struct SerialSource {
    port: Box<dyn SerialPort>,
    stream: StreamId,
    path: String,
}

impl SerialSource {
    pub fn open(
        stream: StreamId,
        path: &str,
        settings: &PortSettings,
    ) -> Result<Self, TransportError> {
        let builder = serialport::new(path, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(settings.timeout);

        let port = open_port(builder, settings.lock).map_err(|(configuring, source)| {
            let path = path.to_string();
            if configuring {
                TransportError::Configure { stream, path, source }
            } else {
                TransportError::Open { stream, path, source }
            }
        })?;

        log::info!(
            "{stream} port `{path}` opened (timeout {:?}, lock {})",
            settings.timeout,
            settings.lock
        );

        Ok(Self {
            port,
            stream,
            path: path.to_string(),
        })
    }
}

/// Opens the port; the flag in the error tells whether opening or configuring failed.
#[cfg(unix)]
fn open_port(
    builder: SerialPortBuilder,
    lock: bool,
) -> Result<Box<dyn SerialPort>, (bool, serialport::Error)> {
    let mut port = builder.open_native().map_err(|e| (false, e))?;
    port.set_exclusive(lock).map_err(|e| (true, e))?;
    Ok(Box::new(port))
}

#[cfg(not(unix))]
fn open_port(
    builder: SerialPortBuilder,
    lock: bool,
) -> Result<Box<dyn SerialPort>, (bool, serialport::Error)> {
    if !lock {
        log::debug!("Ports are always opened exclusively on this platform");
    }
    builder.open().map_err(|e| (false, e))
}

impl ByteSource for SerialSource {
    fn has_data(&mut self) -> io::Result<bool> {
        Ok(self.port.bytes_to_read()? > 0)
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Drop for SerialSource {
    fn drop(&mut self) {
        log::info!("{} port `{}` closed", self.stream, self.path);
    }
}
