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
use std::io;

mod channel;
mod serial;

pub use channel::loopback;
pub use serial::{SerialLink, SerialSource, DEFAULT_BAUD_RATE};

/// Errors talking to the other board.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("the other end of the link is gone")]
    Disconnected,
}

/// Sends the code of a recognized song to the receiving board.
pub trait ResultSink: Send {
    fn send(&mut self, code: u8) -> Result<(), LinkError>;
}

/// Provides bytes received from the capture board.
pub trait ByteSource: Send {
    /// Waits a short while for the next byte. Returns None if nothing arrived in time.
    fn recv(&mut self) -> Result<Option<u8>, LinkError>;
}

/// A result sink that drops everything. Used when no link is configured.
pub struct NullLink {}

impl NullLink {
    pub fn new() -> NullLink {
        NullLink {}
    }
}

impl ResultSink for NullLink {
    fn send(&mut self, _code: u8) -> Result<(), LinkError> {
        Ok(())
    }
}
