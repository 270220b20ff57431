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
use std::sync::Arc;

use crate::note::{Note, NoteSequence};

/// The code transmitted when the Song of Storms is recognized.
pub const SONG_OF_STORMS_CODE: u8 = 0xFF;
/// The code transmitted when the Sun's Song is recognized.
pub const SUNS_SONG_CODE: u8 = 0x11;

/// A known song that recorded attempts are compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    /// The name of the song.
    pub name: String,
    /// The byte sent over the link when this song is recognized.
    pub code: u8,
    /// The notes of the song.
    pub notes: NoteSequence,
}

impl Song {
    /// Creates a new reference song.
    pub fn new(name: &str, code: u8, notes: NoteSequence) -> Song {
        Song {
            name: name.to_string(),
            code,
            notes,
        }
    }

    /// Returns true if the given sequence is exactly this song.
    pub fn matches(&self, sequence: &NoteSequence) -> bool {
        self.notes
            .notes()
            .iter()
            .zip(sequence.notes().iter())
            .all(|(expected, played)| expected == played)
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Code: {:#04X}, Notes: {})", self.name, self.code, self.notes)
    }
}

/// The library of reference songs. Built once and never modified afterwards.
/// Declaration order is preserved and decides which song wins if two overlap.
#[derive(Debug, Clone)]
pub struct Songs {
    songs: Vec<Arc<Song>>,
}

impl Songs {
    /// Creates a new song library.
    pub fn new(songs: Vec<Song>) -> Songs {
        Songs {
            songs: songs.into_iter().map(Arc::new).collect(),
        }
    }

    /// Returns true if the library is empty.
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Returns the number of songs in the library.
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Returns the songs in declaration order.
    #[cfg(test)]
    pub fn list(&self) -> &[Arc<Song>] {
        &self.songs
    }

    /// Finds the first song in the library that exactly matches the sequence.
    pub fn find_match(&self, sequence: &NoteSequence) -> Option<Arc<Song>> {
        self.songs
            .iter()
            .find(|song| song.matches(sequence))
            .cloned()
    }
}

impl Default for Songs {
    /// The songs the instrument ships with.
    fn default() -> Songs {
        Songs::new(vec![
            Song::new(
                "Song of Storms",
                SONG_OF_STORMS_CODE,
                NoteSequence::new([Note::A, Note::Down, Note::Up, Note::A, Note::Down, Note::Up]),
            ),
            Song::new(
                "Sun's Song",
                SUNS_SONG_CODE,
                NoteSequence::new([
                    Note::Right,
                    Note::Down,
                    Note::Up,
                    Note::Right,
                    Note::Down,
                    Note::Up,
                ]),
            ),
        ])
    }
}

impl fmt::Display for Songs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Songs (count: {}):", self.songs.len())?;
        for song in self.songs.iter() {
            writeln!(f, "- {}", song)?;
        }
        Ok(())
    }
}
