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
use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{DataBits, Parity, SerialPort, StopBits};
use tracing::info;

use super::{ByteSource, LinkError, ResultSink};

/// The receiving board's UART runs at 9600 baud off its 1MHz clock.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

const READ_TIMEOUT: Duration = Duration::from_millis(100);

fn open(port: &str, baud_rate: u32) -> Result<Box<dyn SerialPort>, LinkError> {
    let serial = serialport::new(port, baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .timeout(READ_TIMEOUT)
        .open()?;
    info!(port, baud_rate, "Opened serial port.");
    Ok(serial)
}

/// Sends song codes over a serial port.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    pub fn open(port: &str, baud_rate: u32) -> Result<SerialLink, LinkError> {
        Ok(SerialLink {
            port: open(port, baud_rate)?,
        })
    }
}

impl ResultSink for SerialLink {
    fn send(&mut self, code: u8) -> Result<(), LinkError> {
        self.port.write_all(&[code])?;
        self.port.flush()?;
        Ok(())
    }
}

/// Receives song codes from a serial port.
pub struct SerialSource {
    port: Box<dyn SerialPort>,
}

impl SerialSource {
    pub fn open(port: &str, baud_rate: u32) -> Result<SerialSource, LinkError> {
        Ok(SerialSource {
            port: open(port, baud_rate)?,
        })
    }
}

impl ByteSource for SerialSource {
    fn recv(&mut self) -> Result<Option<u8>, LinkError> {
        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
