//! Serial link to the jaw controller.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use serialport::{ClearBuffer, SerialPort};
use thiserror::Error;

/// Ports tried after the configured one.
const COMMON_PORTS: [&str; 4] = ["/dev/ttyUSB0", "/dev/ttyUSB1", "/dev/ttyACM0", "/dev/ttyACM1"];

const SERIAL_TIMEOUT: Duration = Duration::from_secs(2);

/// Boards reset when the port opens; wait before the first write.
const SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Time given to the board to echo a status line.
const ECHO_DELAY: Duration = Duration::from_millis(100);

const TEST_STEP: Duration = Duration::from_millis(500);
const CLOSE_ATTEMPTS: usize = 3;
const CLOSE_RETRY_DELAY: Duration = Duration::from_millis(200);

// ---------------------------------------------------------------------------
// ActuatorError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ActuatorError {
    /// No candidate port accepted a connection.
    #[error("no jaw actuator found (tried: {0})")]
    NoPort(String),

    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// JawCommand / JawLink
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JawCommand {
    Open,
    Close,
}

impl JawCommand {
    /// Wire form: one uppercase letter and a newline.
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            JawCommand::Open => b"O\n",
            JawCommand::Close => b"C\n",
        }
    }
}

/// Anything that can move the jaw.
pub trait JawLink: Send {
    fn send(&mut self, command: JawCommand) -> Result<(), ActuatorError>;

    /// Close, open, close, open, close with a pause between steps.
    fn test_sequence(&mut self) -> Result<(), ActuatorError> {
        run_sequence(self, &TEST_SEQUENCE, TEST_STEP)
    }

    /// Send `Close` until one succeeds, at most three times.
    fn close_jaw(&mut self) -> bool {
        for attempt in 1..=CLOSE_ATTEMPTS {
            match self.send(JawCommand::Close) {
                Ok(()) => return true,
                Err(e) => {
                    log::warn!("actuator: close attempt {attempt} failed ({e})");
                    std::thread::sleep(CLOSE_RETRY_DELAY);
                }
            }
        }
        false
    }
}

const TEST_SEQUENCE: [JawCommand; 5] = [
    JawCommand::Close,
    JawCommand::Open,
    JawCommand::Close,
    JawCommand::Open,
    JawCommand::Close,
];

fn run_sequence<L: JawLink + ?Sized>(
    link: &mut L,
    commands: &[JawCommand],
    pause: Duration,
) -> Result<(), ActuatorError> {
    for (i, &command) in commands.iter().enumerate() {
        log::info!("actuator: test step {}/{}: {command:?}", i + 1, commands.len());
        link.send(command)?;
        std::thread::sleep(pause);
    }
    Ok(())
}

/// Ports to try, in order: `preferred`, the common USB/ACM devices that
/// exist, then every enumerated serial port. Duplicates are dropped.
pub fn candidate_ports(preferred: &str) -> Vec<String> {
    let enumerated = serialport::available_ports()
        .map(|ports| ports.into_iter().map(|p| p.port_name).collect::<Vec<_>>())
        .unwrap_or_default();

    let mut seen = HashSet::new();
    std::iter::once(preferred.to_string())
        .chain(
            COMMON_PORTS
                .iter()
                .filter(|p| Path::new(p).exists())
                .map(|p| p.to_string()),
        )
        .chain(enumerated)
        .filter(|p| !p.is_empty() && seen.insert(p.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// JawController
// ---------------------------------------------------------------------------

/// Serial-port [`JawLink`] with one reconnect attempt on write failure.
pub struct JawController {
    port: Box<dyn SerialPort>,
    port_name: String,
    preferred: String,
    baud: u32,
}

impl JawController {
    /// Open the first candidate port that accepts a test `Close`.
    pub fn connect(preferred: &str, baud: u32) -> Result<Self, ActuatorError> {
        let candidates = candidate_ports(preferred);
        for name in &candidates {
            log::info!("actuator: trying {name} at {baud} baud");
            match open_port(name, baud) {
                Ok(port) => {
                    log::info!("actuator: connected on {name}");
                    return Ok(Self {
                        port,
                        port_name: name.clone(),
                        preferred: preferred.to_string(),
                        baud,
                    });
                }
                Err(e) => log::warn!("actuator: {name} unavailable ({e})"),
            }
        }
        Err(ActuatorError::NoPort(candidates.join(", ")))
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Send `Close` and drop the connection.
    pub fn close(mut self) {
        if self.close_jaw() {
            log::info!("actuator: jaw closed, disconnecting {}", self.port_name);
        } else {
            log::warn!("actuator: could not close jaw on {}", self.port_name);
        }
    }

    fn write_command(&mut self, command: JawCommand) -> Result<(), ActuatorError> {
        self.port.write_all(command.as_bytes())?;
        self.port.flush()?;

        std::thread::sleep(ECHO_DELAY);
        if self.port.bytes_to_read()? > 0 {
            let mut buf = [0u8; 256];
            let n = self.port.read(&mut buf)?;
            let echo = String::from_utf8_lossy(&buf[..n]);
            for line in echo.lines().map(str::trim).filter(|l| !l.is_empty()) {
                log::debug!("actuator: board says {line:?}");
            }
        }
        Ok(())
    }

    fn reconnect(&mut self) -> Result<(), ActuatorError> {
        log::warn!("actuator: reconnecting");
        let fresh = Self::connect(&self.preferred, self.baud)?;
        *self = fresh;
        Ok(())
    }
}

impl JawLink for JawController {
    fn send(&mut self, command: JawCommand) -> Result<(), ActuatorError> {
        match self.write_command(command) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::warn!("actuator: write to {} failed ({e})", self.port_name);
                self.reconnect()?;
                self.write_command(command)
            }
        }
    }
}

fn open_port(name: &str, baud: u32) -> Result<Box<dyn SerialPort>, ActuatorError> {
    let mut port = serialport::new(name, baud).timeout(SERIAL_TIMEOUT).open()?;
    std::thread::sleep(SETTLE_DELAY);
    port.clear(ClearBuffer::All)?;
    port.write_all(JawCommand::Close.as_bytes())?;
    port.flush()?;
    Ok(port)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
