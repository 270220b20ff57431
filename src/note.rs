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
use std::str::FromStr;

/// The number of notes in a song.
pub const SONG_LENGTH: usize = 6;

/// Input bit for the up button.
pub const UP_BIT: u8 = 0b0000_0100;
/// Input bit for the down button.
pub const DOWN_BIT: u8 = 0b0000_1000;
/// Input bit for the left button.
pub const LEFT_BIT: u8 = 0b0001_0000;
/// Input bit for the right button.
pub const RIGHT_BIT: u8 = 0b0010_0000;
/// Input bit for the A button.
pub const A_BIT: u8 = 0b0100_0000;

/// All bits that map to a note. Anything else on the input port is ignored.
pub const NOTE_MASK: u8 = UP_BIT | DOWN_BIT | LEFT_BIT | RIGHT_BIT | A_BIT;

/// A single note played on the instrument.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Note {
    /// No input was seen during the sampling window.
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
    A,
}

impl Note {
    /// All notes that can actually be played, in input bit order.
    pub const PLAYABLE: [Note; 5] = [Note::Up, Note::Down, Note::Left, Note::Right, Note::A];

    /// Decodes a latched input bitmask. The lowest set note bit wins; a mask with no
    /// note bits set decodes to [`Note::None`].
    pub fn decode(mask: u8) -> Note {
        Note::PLAYABLE
            .into_iter()
            .find(|note| mask & note.bit() != 0)
            .unwrap_or(Note::None)
    }

    /// The input bit for this note. [`Note::None`] has no bit.
    pub fn bit(&self) -> u8 {
        match self {
            Note::None => 0,
            Note::Up => UP_BIT,
            Note::Down => DOWN_BIT,
            Note::Left => LEFT_BIT,
            Note::Right => RIGHT_BIT,
            Note::A => A_BIT,
        }
    }

    /// Returns true if this note represents an actual input.
    pub fn is_played(&self) -> bool {
        *self != Note::None
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Note::None => "-",
            Note::Up => "Up",
            Note::Down => "Down",
            Note::Left => "Left",
            Note::Right => "Right",
            Note::A => "A",
        };
        f.write_str(name)
    }
}

/// Error returned when a note or note sequence can't be parsed.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseNoteError {
    #[error("unknown note '{0}'")]
    Unknown(String),
    #[error("expected {SONG_LENGTH} notes, found {0}")]
    Length(usize),
}

impl FromStr for Note {
    type Err = ParseNoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "-" => Ok(Note::None),
            "up" => Ok(Note::Up),
            "down" => Ok(Note::Down),
            "left" => Ok(Note::Left),
            "right" => Ok(Note::Right),
            "a" => Ok(Note::A),
            _ => Err(ParseNoteError::Unknown(s.trim().to_string())),
        }
    }
}

/// A fixed length sequence of notes. Used both for recording attempts and for
/// the reference songs they're compared against.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteSequence([Note; SONG_LENGTH]);

impl NoteSequence {
    /// Creates a new sequence from the given notes.
    pub const fn new(notes: [Note; SONG_LENGTH]) -> NoteSequence {
        NoteSequence(notes)
    }

    /// Creates an all-None sequence.
    pub const fn empty() -> NoteSequence {
        NoteSequence([Note::None; SONG_LENGTH])
    }

    /// Gets the note at the given slot.
    #[cfg(test)]
    pub fn get(&self, slot: usize) -> Option<Note> {
        self.0.get(slot).copied()
    }

    /// Stores a note at the given slot. Slots outside the sequence are ignored.
    pub(crate) fn set(&mut self, slot: usize, note: Note) {
        if let Some(current) = self.0.get_mut(slot) {
            *current = note;
        }
    }

    /// Resets every slot to [`Note::None`].
    pub(crate) fn clear(&mut self) {
        self.0 = [Note::None; SONG_LENGTH];
    }

    /// Returns true if no slot holds a played note.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|note| !note.is_played())
    }

    /// Returns true if every slot holds a played note.
    pub fn is_complete(&self) -> bool {
        self.0.iter().all(Note::is_played)
    }

    /// Gets the notes as a slice.
    pub fn notes(&self) -> &[Note; SONG_LENGTH] {
        &self.0
    }
}

impl TryFrom<Vec<Note>> for NoteSequence {
    type Error = ParseNoteError;

    fn try_from(notes: Vec<Note>) -> Result<Self, Self::Error> {
        let len = notes.len();
        let notes: [Note; SONG_LENGTH] = notes
            .try_into()
            .map_err(|_| ParseNoteError::Length(len))?;
        Ok(NoteSequence(notes))
    }
}

impl FromStr for NoteSequence {
    type Err = ParseNoteError;

    /// Parses a comma separated list of notes, e.g. `A,Down,Up,A,Down,Up`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(Note::from_str)
            .collect::<Result<Vec<Note>, ParseNoteError>>()?
            .try_into()
    }
}

impl fmt::Display for NoteSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.0.iter().map(|note| note.to_string()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
