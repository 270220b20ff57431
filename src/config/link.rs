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
use serde::Deserialize;

use crate::link::{self, LinkError, NullLink, ResultSink, SerialLink};

/// Allows users to specify how song codes reach the receiving board.
#[derive(Deserialize, Clone, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Link {
    /// A serial port wired to the receiving board.
    Serial {
        port: String,
        baud_rate: Option<u32>,
    },
    /// A simulated receiving board in the same process.
    Loopback,
    /// Codes are dropped.
    #[default]
    None,
}

impl Link {
    /// Opens the sending side of a serial link. Loopback links are created by the
    /// caller since both ends are needed.
    pub fn open(&self) -> Result<Box<dyn ResultSink>, LinkError> {
        Ok(match self {
            Link::Serial { port, baud_rate } => Box::new(SerialLink::open(
                port,
                baud_rate.unwrap_or(link::DEFAULT_BAUD_RATE),
            )?),
            Link::Loopback | Link::None => Box::new(NullLink::new()),
        })
    }
}
