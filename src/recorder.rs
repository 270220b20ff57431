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
use tracing::{debug, info, span, Level};

use crate::cancel::CancelHandle;
use crate::feedback::{Feedback, FeedbackSink};
use crate::note::{Note, NoteSequence, SONG_LENGTH};
use crate::sampler::Sampler;

/// The default number of consecutive misses that throws away an attempt.
pub const DEFAULT_MAX_MISSES: u32 = 2;

/// The state of a recording attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for the note at the given slot.
    Recording(usize),
    /// Every slot has a note.
    Completed,
    /// Too many consecutive misses. The sequence was cleared.
    Reset,
}

/// The result of a full recording attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Completed(NoteSequence),
    Reset,
    /// The board was shut down before the attempt finished.
    Cancelled,
}

/// Records songs one note at a time, retrying missed notes and throwing the
/// attempt away after too many misses in a row.
pub struct SongRecorder {
    sequence: NoteSequence,
    slot: usize,
    misses: u32,
    max_misses: u32,
    state: State,
}

impl SongRecorder {
    /// Creates a new recorder ready to record the first note. A max_misses of 0 is
    /// treated as 1.
    pub fn new(max_misses: u32) -> SongRecorder {
        SongRecorder {
            sequence: NoteSequence::empty(),
            slot: 0,
            misses: 0,
            max_misses: max_misses.max(1),
            state: State::Recording(0),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> State {
        self.state
    }

    #[cfg(test)]
    pub fn slot(&self) -> usize {
        self.slot
    }

    #[cfg(test)]
    pub fn misses(&self) -> u32 {
        self.misses
    }

    #[cfg(test)]
    pub fn sequence(&self) -> &NoteSequence {
        &self.sequence
    }

    /// Starts a fresh attempt.
    pub fn restart(&mut self) {
        self.sequence.clear();
        self.slot = 0;
        self.misses = 0;
        self.state = State::Recording(0);
    }

    /// Applies a sampled note to the current slot and returns the new state. Notes
    /// recorded once the attempt has finished are ignored.
    pub fn record(&mut self, note: Note) -> State {
        if !matches!(self.state, State::Recording(_)) {
            return self.state;
        }

        if note.is_played() {
            self.sequence.set(self.slot, note);
            self.misses = 0;
            if self.slot + 1 >= SONG_LENGTH {
                self.state = State::Completed;
            } else {
                self.slot += 1;
                self.state = State::Recording(self.slot);
            }
            return self.state;
        }

        // A miss retries the same slot.
        self.misses += 1;
        if self.misses >= self.max_misses {
            self.sequence.clear();
            self.slot = 0;
            self.misses = 0;
            self.state = State::Reset;
        }
        self.state
    }

    /// Records a full attempt, sampling one note per slot until the song is complete or
    /// the attempt is thrown away. The cancel handle is checked before every window.
    pub fn record_attempt(
        &mut self,
        sampler: &mut Sampler,
        feedback: &mut dyn FeedbackSink,
        cancel_handle: &CancelHandle,
    ) -> Attempt {
        let span = span!(Level::INFO, "record attempt");
        let _enter = span.enter();

        self.restart();
        loop {
            if cancel_handle.is_cancelled() {
                info!(slot = self.slot, "Recording cancelled.");
                feedback.signal(Feedback::Idle);
                return Attempt::Cancelled;
            }

            let slot = self.slot;
            feedback.signal(Feedback::Prompt);
            let note = sampler.sample();
            feedback.signal(Feedback::Idle);

            let state = self.record(note);
            if !note.is_played() {
                info!(slot, misses = self.misses, "Missed note.");
                feedback.signal(Feedback::Miss);
            } else {
                info!(slot, note = %note, "Recorded note.");
            }

            match state {
                State::Recording(next) => debug!(slot = next, "Waiting for the next note."),
                State::Completed => {
                    feedback.signal(Feedback::Completed);
                    return Attempt::Completed(self.sequence);
                }
                State::Reset => {
                    info!("Too many missed notes, resetting.");
                    feedback.signal(Feedback::Fail);
                    return Attempt::Reset;
                }
            }
        }
    }
}

impl Default for SongRecorder {
    fn default() -> SongRecorder {
        SongRecorder::new(DEFAULT_MAX_MISSES)
    }
}
