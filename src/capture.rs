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
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, span, Level};

use crate::cancel::CancelHandle;
use crate::feedback::{Feedback, FeedbackSink};
use crate::link::ResultSink;
use crate::note::NoteSequence;
use crate::recorder::{Attempt, SongRecorder};
use crate::sampler::Sampler;
use crate::songs::{Song, Songs};

/// The default time between checks of the start trigger.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Tells the capture board that the player wants to record a song.
pub trait StartTrigger: Send + Sync {
    /// Returns true if a recording was requested since the last call.
    fn requested(&self) -> bool;

    /// Drops any request made while an attempt was running.
    fn reset(&self) {}
}

/// A start trigger backed by a flag that something else sets.
#[derive(Default)]
pub struct StartFlag {
    pressed: AtomicBool,
}

impl StartFlag {
    pub fn new() -> StartFlag {
        StartFlag::default()
    }

    /// Requests a recording.
    pub fn press(&self) {
        self.pressed.store(true, Ordering::Release);
    }
}

impl StartTrigger for StartFlag {
    fn requested(&self) -> bool {
        self.pressed.swap(false, Ordering::AcqRel)
    }

    fn reset(&self) {
        self.pressed.store(false, Ordering::Release);
    }
}

/// How a recording attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The song was recognized and its code sent.
    Matched(Arc<Song>),
    /// All notes were recorded but they aren't a known song.
    NoMatch(NoteSequence),
    /// Too many notes were missed.
    Reset,
    /// The board was shut down mid attempt.
    Cancelled,
}

/// The capture board. Records songs when asked to, recognizes them and sends the
/// result to the receiving board.
pub struct CaptureBoard {
    sampler: Sampler,
    recorder: SongRecorder,
    songs: Arc<Songs>,
    feedback: Box<dyn FeedbackSink>,
    link: Box<dyn ResultSink>,
    poll_interval: Duration,
}

impl CaptureBoard {
    /// Creates a new capture board.
    pub fn new(
        sampler: Sampler,
        recorder: SongRecorder,
        songs: Arc<Songs>,
        feedback: Box<dyn FeedbackSink>,
        link: Box<dyn ResultSink>,
        poll_interval: Duration,
    ) -> CaptureBoard {
        CaptureBoard {
            sampler,
            recorder,
            songs,
            feedback,
            link,
            poll_interval,
        }
    }

    /// Gets the song library.
    pub fn songs(&self) -> Arc<Songs> {
        self.songs.clone()
    }

    /// Records a single song and reports the result. The attempt ends early if the
    /// cancel handle fires.
    pub fn attempt(&mut self, cancel_handle: &CancelHandle) -> Outcome {
        let sequence = match self.recorder.record_attempt(
            &mut self.sampler,
            self.feedback.as_mut(),
            cancel_handle,
        ) {
            Attempt::Completed(sequence) => sequence,
            Attempt::Reset => return Outcome::Reset,
            Attempt::Cancelled => return Outcome::Cancelled,
        };

        match self.songs.find_match(&sequence) {
            Some(song) => {
                self.feedback.signal(Feedback::Success);
                if let Err(e) = self.link.send(song.code) {
                    error!(err = %e, "Unable to send song code.");
                }
                Outcome::Matched(song)
            }
            None => {
                self.feedback.signal(Feedback::NoMatch);
                Outcome::NoMatch(sequence)
            }
        }
    }

    /// Waits for the start trigger and records songs until cancelled. Start requests
    /// made while a song is being recorded are dropped.
    pub fn run(&mut self, trigger: &dyn StartTrigger, cancel_handle: &CancelHandle) {
        let span = span!(Level::INFO, "capture board");
        let _enter = span.enter();

        info!(songs = self.songs.len(), "Capture board started.");
        loop {
            if cancel_handle.is_cancelled() {
                break;
            }

            if trigger.requested() {
                info!("Recording started.");
                match self.attempt(cancel_handle) {
                    Outcome::Matched(song) => info!(
                        song = song.name,
                        code = format!("{:#04X}", song.code),
                        "Recognized song."
                    ),
                    Outcome::NoMatch(sequence) => info!(notes = %sequence, "No song matched."),
                    Outcome::Reset => info!("Recording thrown away."),
                    Outcome::Cancelled => break,
                }
                trigger.reset();
                continue;
            }

            if cancel_handle.wait_timeout(self.poll_interval) {
                break;
            }
        }
        info!("Capture board stopped.");
    }
}
