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

use super::error::ConfigError;
use crate::note::{Note, NoteSequence, ParseNoteError};
use crate::util::parse_code;

/// A YAML representation of a reference song.
#[derive(Deserialize, Clone)]
pub struct Song {
    /// The name of the song.
    name: String,
    /// The code sent when the song is recognized, in hex (0xFF) or decimal.
    code: String,
    /// The notes of the song.
    notes: Vec<String>,
}

impl Song {
    /// Converts the configuration into a reference song. Songs that contain None can
    /// never be recorded, so they're rejected.
    pub fn to_song(&self) -> Result<crate::songs::Song, ConfigError> {
        let code = parse_code(&self.code).map_err(|_| ConfigError::Code {
            name: self.name.clone(),
            code: self.code.clone(),
        })?;

        let notes = self
            .notes
            .iter()
            .map(|note| note.parse::<Note>())
            .collect::<Result<Vec<Note>, ParseNoteError>>()
            .and_then(NoteSequence::try_from)
            .map_err(|source| ConfigError::Notes {
                name: self.name.clone(),
                source,
            })?;

        if !notes.is_complete() {
            return Err(ConfigError::UnplayableSong {
                name: self.name.clone(),
            });
        }

        Ok(crate::songs::Song::new(&self.name, code, notes))
    }
}
