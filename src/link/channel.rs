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
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use super::{ByteSource, LinkError, ResultSink};

const RECV_TIMEOUT: Duration = Duration::from_millis(50);

/// The sending half of an in-process link.
pub struct ChannelLink {
    tx: Sender<u8>,
}

impl ResultSink for ChannelLink {
    fn send(&mut self, code: u8) -> Result<(), LinkError> {
        self.tx.send(code).map_err(|_| LinkError::Disconnected)
    }
}

/// The receiving half of an in-process link.
pub struct ChannelSource {
    rx: Receiver<u8>,
}

impl ByteSource for ChannelSource {
    fn recv(&mut self) -> Result<Option<u8>, LinkError> {
        match self.rx.recv_timeout(RECV_TIMEOUT) {
            Ok(byte) => Ok(Some(byte)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(LinkError::Disconnected),
        }
    }
}

/// Creates a link that connects both boards within the same process.
pub fn loopback() -> (ChannelLink, ChannelSource) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (ChannelLink { tx }, ChannelSource { rx })
}
