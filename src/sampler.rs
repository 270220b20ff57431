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
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::note::{Note, NOTE_MASK};

/// The default length of a sampling window.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(1500);

/// Holds the input edges seen while a sampling window is open.
pub trait InputLatch: Send + Sync {
    /// Clears any previously latched input and starts accepting edges.
    fn open(&self);

    /// Stops accepting edges and returns the latched bitmask.
    fn close(&self) -> u8;
}

/// Blocks the caller for the duration of one sampling window.
pub trait WindowTimer: Send {
    fn wait_window(&mut self);
}

/// A latch shared between the sampler and whatever reports input edges
/// (an interrupt handler on hardware, a controller driver in the simulator).
/// Only the first edge of a window is kept.
#[derive(Default)]
pub struct SharedLatch {
    enabled: AtomicBool,
    value: AtomicU8,
}

impl SharedLatch {
    /// Creates a new closed latch.
    pub fn new() -> SharedLatch {
        SharedLatch::default()
    }

    /// Reports an input edge. Returns true if the edge was latched. Edges are dropped
    /// while the window is closed, if they carry no note bits, or if another edge was
    /// already latched in this window.
    pub fn on_edge(&self, mask: u8) -> bool {
        if !self.enabled.load(Ordering::Acquire) {
            return false;
        }

        let mask = mask & NOTE_MASK;
        if mask == 0 {
            return false;
        }

        self.value
            .compare_exchange(0, mask, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Gets the currently latched bitmask without consuming it.
    #[cfg(test)]
    pub fn latched(&self) -> u8 {
        self.value.load(Ordering::Acquire)
    }

    /// Returns true if the latch is currently accepting edges.
    pub fn is_open(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

impl InputLatch for SharedLatch {
    fn open(&self) {
        self.value.store(0, Ordering::Release);
        self.enabled.store(true, Ordering::Release);
    }

    fn close(&self) -> u8 {
        self.enabled.store(false, Ordering::Release);
        self.value.swap(0, Ordering::AcqRel)
    }
}

/// A window timer that sleeps for a fixed duration.
pub struct SleepTimer {
    window: Duration,
}

impl SleepTimer {
    pub fn new(window: Duration) -> SleepTimer {
        SleepTimer { window }
    }
}

impl WindowTimer for SleepTimer {
    fn wait_window(&mut self) {
        spin_sleep::sleep(self.window);
    }
}

/// Samples one note per call.
pub struct Sampler {
    latch: Arc<dyn InputLatch>,
    timer: Box<dyn WindowTimer>,
}

impl Sampler {
    /// Creates a new sampler.
    pub fn new(latch: Arc<dyn InputLatch>, timer: Box<dyn WindowTimer>) -> Sampler {
        Sampler { latch, timer }
    }

    /// Opens a sampling window, blocks until it closes and decodes whatever was latched.
    pub fn sample(&mut self) -> Note {
        self.latch.open();
        self.timer.wait_window();
        let mask = self.latch.close();

        let note = Note::decode(mask);
        debug!(mask = format!("{:#010b}", mask), note = %note, "Window closed.");
        note
    }
}
