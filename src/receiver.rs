// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fmt;

use tracing::{info, span, warn, Level};

use crate::cancel::CancelHandle;
use crate::link::{ByteSource, LinkError};

/// Byte that selects the storm configuration.
pub const STORM_BYTE: u8 = 0xFF;
/// Bytes that select the sun configuration. The second is the same code with the
/// high bit set, as it sometimes arrives off the wire.
pub const SUN_BYTES: [u8; 2] = [0x11, 0x91];

/// The output configurations of the receiving board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputConfig {
    /// LED dark, fan at full speed.
    Storm,
    /// Red and green LED channels lit, fan stopped.
    Sun,
}

impl OutputConfig {
    /// Selects the configuration for a received byte. Unknown bytes select nothing.
    pub fn select(byte: u8) -> Option<OutputConfig> {
        match byte {
            STORM_BYTE => Some(OutputConfig::Storm),
            b if SUN_BYTES.contains(&b) => Some(OutputConfig::Sun),
            _ => None,
        }
    }

    /// Red LED duty cycle, 0-255.
    pub fn red(&self) -> u8 {
        match self {
            OutputConfig::Storm => 0,
            OutputConfig::Sun => 255,
        }
    }

    /// Green LED duty cycle, 0-255.
    pub fn green(&self) -> u8 {
        match self {
            OutputConfig::Storm => 0,
            OutputConfig::Sun => 255,
        }
    }

    /// Fan duty cycle, 0-255.
    pub fn fan(&self) -> u8 {
        match self {
            OutputConfig::Storm => 255,
            OutputConfig::Sun => 0,
        }
    }
}

impl fmt::Display for OutputConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputConfig::Storm => "storm",
            OutputConfig::Sun => "sun",
        };
        write!(
            f,
            "{} (red: {}, green: {}, fan: {})",
            name,
            self.red(),
            self.green(),
            self.fan()
        )
    }
}

/// Drives the LED and fan outputs.
pub trait OutputStage: Send {
    fn apply(&mut self, config: &OutputConfig);
}

/// An output stage that logs PWM duty cycles. Starts with everything off.
#[derive(Default)]
pub struct LogOutputStage {
    red: u8,
    green: u8,
    fan: u8,
}

impl LogOutputStage {
    pub fn new() -> LogOutputStage {
        LogOutputStage::default()
    }
}

impl OutputStage for LogOutputStage {
    fn apply(&mut self, config: &OutputConfig) {
        self.red = config.red();
        self.green = config.green();
        self.fan = config.fan();
        info!(
            red = self.red,
            green = self.green,
            fan = self.fan,
            "Outputs updated."
        );
    }
}

/// The receiving board. Applies an output configuration for every recognized byte.
pub struct Receiver {
    source: Box<dyn ByteSource>,
    output: Box<dyn OutputStage>,
    current: Option<OutputConfig>,
}

impl Receiver {
    /// Creates a new receiver.
    pub fn new(source: Box<dyn ByteSource>, output: Box<dyn OutputStage>) -> Receiver {
        Receiver {
            source,
            output,
            current: None,
        }
    }

    /// The last configuration applied, if any.
    #[cfg(test)]
    pub fn current(&self) -> Option<OutputConfig> {
        self.current
    }

    /// Handles a single received byte. Unknown bytes leave the outputs untouched.
    pub fn handle(&mut self, byte: u8) -> Option<OutputConfig> {
        match OutputConfig::select(byte) {
            Some(config) => {
                info!(byte = format!("{:#04X}", byte), config = %config, "Applying configuration.");
                self.output.apply(&config);
                self.current = Some(config);
                Some(config)
            }
            None => {
                warn!(byte = format!("{:#04X}", byte), "Unrecognized byte.");
                None
            }
        }
    }

    /// Receives bytes until cancelled or until the sending side goes away.
    pub fn run(&mut self, cancel_handle: &CancelHandle) -> Result<(), LinkError> {
        let span = span!(Level::INFO, "receiver board");
        let _enter = span.enter();

        info!("Receiver started.");
        while !cancel_handle.is_cancelled() {
            match self.source.recv() {
                Ok(Some(byte)) => {
                    self.handle(byte);
                }
                Ok(None) => {}
                Err(LinkError::Disconnected) => {
                    info!("Link closed.");
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
        info!("Receiver stopped.");
        Ok(())
    }
}
