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
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread,
    time::{Duration, SystemTime},
};

use crate::{
    feedback::{Color, Feedback, FeedbackSink, Led},
    link::{LinkError, ResultSink},
    receiver::{OutputConfig, OutputStage},
    sampler::{SharedLatch, WindowTimer},
};

/// Wait for the given predicate to return true or fail.
#[inline]
pub fn eventually<F>(predicate: F, error_msg: &str)
where
    F: Fn() -> bool,
{
    let start = SystemTime::now();
    let tick = Duration::from_millis(10);
    let timeout = Duration::from_secs(3);

    loop {
        let elapsed = start.elapsed();
        if elapsed.is_err() {
            panic!("System time error");
        }
        let elapsed = elapsed.unwrap();

        if elapsed > timeout {
            panic!("{}", error_msg);
        }
        if predicate() {
            return;
        }
        thread::sleep(tick);
    }
}

/// A window timer that plays back a fixed list of input edges, one per window, as if
/// the player pressed a button while the window was open. Once the script runs out
/// every window is a miss.
pub struct ScriptedTimer {
    latch: Arc<SharedLatch>,
    masks: VecDeque<u8>,
    windows: Arc<AtomicUsize>,
}

impl ScriptedTimer {
    pub fn new(latch: Arc<SharedLatch>, masks: &[u8]) -> ScriptedTimer {
        ScriptedTimer {
            latch,
            masks: masks.iter().copied().collect(),
            windows: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Gets a counter of the windows this timer has waited for.
    pub fn windows(&self) -> Arc<AtomicUsize> {
        self.windows.clone()
    }
}

impl WindowTimer for ScriptedTimer {
    fn wait_window(&mut self) {
        self.windows.fetch_add(1, Ordering::SeqCst);
        if let Some(mask) = self.masks.pop_front() {
            if mask != 0 {
                self.latch.on_edge(mask);
            }
        }
    }
}

/// A feedback sink that remembers every signal.
#[derive(Clone, Default)]
pub struct RecordingFeedback {
    signals: Arc<Mutex<Vec<Feedback>>>,
}

impl RecordingFeedback {
    pub fn new() -> RecordingFeedback {
        RecordingFeedback::default()
    }

    pub fn signals(&self) -> Vec<Feedback> {
        self.signals.lock().expect("unable to get lock").clone()
    }
}

impl FeedbackSink for RecordingFeedback {
    fn signal(&mut self, feedback: Feedback) {
        self.signals
            .lock()
            .expect("unable to get lock")
            .push(feedback);
    }
}

/// An LED that remembers every color it was set to.
#[derive(Clone, Default)]
pub struct MockLed {
    history: Arc<Mutex<Vec<Color>>>,
}

impl MockLed {
    pub fn new() -> MockLed {
        MockLed::default()
    }

    pub fn history(&self) -> Vec<Color> {
        self.history.lock().expect("unable to get lock").clone()
    }

    pub fn current(&self) -> Option<Color> {
        self.history.lock().expect("unable to get lock").last().copied()
    }
}

impl Led for MockLed {
    fn set(&mut self, color: Color) {
        self.history.lock().expect("unable to get lock").push(color);
    }
}

/// A result sink that remembers every code sent through it. Can be told to fail.
#[derive(Clone, Default)]
pub struct RecordingLink {
    sent: Arc<Mutex<Vec<u8>>>,
    fail: bool,
}

impl RecordingLink {
    pub fn new() -> RecordingLink {
        RecordingLink::default()
    }

    pub fn failing() -> RecordingLink {
        RecordingLink {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<u8> {
        self.sent.lock().expect("unable to get lock").clone()
    }
}

impl ResultSink for RecordingLink {
    fn send(&mut self, code: u8) -> Result<(), LinkError> {
        if self.fail {
            return Err(LinkError::Disconnected);
        }
        self.sent.lock().expect("unable to get lock").push(code);
        Ok(())
    }
}

/// An output stage that remembers every configuration applied to it.
#[derive(Clone, Default)]
pub struct MockOutputStage {
    applied: Arc<Mutex<Vec<OutputConfig>>>,
}

impl MockOutputStage {
    pub fn new() -> MockOutputStage {
        MockOutputStage::default()
    }

    pub fn applied(&self) -> Vec<OutputConfig> {
        self.applied.lock().expect("unable to get lock").clone()
    }
}

impl OutputStage for MockOutputStage {
    fn apply(&mut self, config: &OutputConfig) {
        self.applied
            .lock()
            .expect("unable to get lock")
            .push(*config);
    }
}
