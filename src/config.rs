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
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use config::{Config, File};
use serde::Deserialize;
use tracing::info;

use crate::capture::CaptureBoard;
use crate::controller::{keyboard, Controller};
use crate::link::loopback;
use crate::receiver::{LogOutputStage, Receiver};
use crate::recorder::SongRecorder;
use crate::sampler::{Sampler, SharedLatch, SleepTimer};
use crate::songs::Songs;

mod capture;
mod error;
mod feedback;
mod link;
mod song;

pub use self::capture::Capture;
pub use self::error::ConfigError;
pub use self::feedback::Feedback;
pub use self::link::Link;
pub use self::song::Song;

/// The board configuration. Every section is optional.
#[derive(Deserialize, Clone, Default)]
#[serde(default)]
pub struct Board {
    /// Sampling and miss settings.
    capture: Capture,

    /// How the player is told what's going on.
    feedback: Feedback,

    /// Where recognized song codes go.
    link: Link,

    /// The reference songs. The built in songs are used if this is empty.
    songs: Vec<Song>,
}

impl Board {
    /// Loads a board configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Board, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Board>()?)
    }

    /// Gets the capture settings.
    #[cfg(test)]
    pub fn capture(&self) -> &Capture {
        &self.capture
    }

    /// Gets the feedback settings.
    #[cfg(test)]
    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    /// Gets the link settings.
    #[cfg(test)]
    pub fn link(&self) -> &Link {
        &self.link
    }

    /// Builds the song library.
    pub fn songs(&self) -> Result<Songs, ConfigError> {
        if self.songs.is_empty() {
            return Ok(Songs::default());
        }

        Ok(Songs::new(
            self.songs
                .iter()
                .map(|song| song.to_song())
                .collect::<Result<Vec<crate::songs::Song>, ConfigError>>()?,
        ))
    }

    /// Builds the capture board along with the latch its sampler reads from. If the link
    /// is a loopback, the simulated receiving board is returned as well.
    pub fn build(
        &self,
    ) -> Result<(CaptureBoard, Arc<SharedLatch>, Option<Receiver>), Box<dyn Error>> {
        let latch = Arc::new(SharedLatch::new());
        let sampler = Sampler::new(
            latch.clone(),
            Box::new(SleepTimer::new(self.capture.window()?)),
        );

        let (link, receiver) = match &self.link {
            Link::Loopback => {
                let (link, source) = loopback();
                let receiver = Receiver::new(Box::new(source), Box::new(LogOutputStage::new()));
                (Box::new(link) as Box<dyn crate::link::ResultSink>, Some(receiver))
            }
            link => (link.open()?, None),
        };

        let board = CaptureBoard::new(
            sampler,
            SongRecorder::new(self.capture.max_misses()),
            Arc::new(self.songs()?),
            self.feedback.sink()?,
            link,
            self.capture.poll_interval()?,
        );
        Ok((board, latch, receiver))
    }
}

/// Loads the song library from the given file, or the built in songs if no file is given.
pub fn load_songs(path: Option<&Path>) -> Result<Songs, ConfigError> {
    match path {
        Some(path) => Board::load(path)?.songs(),
        None => Ok(Songs::default()),
    }
}

/// Initializes the boards from the given config file and returns the controller driving
/// them from the keyboard.
pub fn init_controller(path: &Path) -> Result<Controller, Box<dyn Error>> {
    let config = Board::load(path)?;
    let (board, latch, receiver) = config.build()?;
    info!(
        songs = board.songs().len(),
        receiver = receiver.is_some(),
        "Boards configured."
    );

    Controller::new(
        board,
        latch,
        receiver,
        Arc::new(keyboard::Driver::new()),
    )
}

#[cfg(test)]
mod test {
    use std::io::Write;
    use std::time::Duration;

    use config::{Config, File, FileFormat};

    use super::*;
    use crate::note::NoteSequence;

    fn parse(yaml: &str) -> Board {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize::<Board>()
            .unwrap()
    }

    #[test]
    fn test_board_defaults() {
        let board = parse("{}");
        assert_eq!(Duration::from_millis(1500), board.capture().window().unwrap());
        assert_eq!(2, board.capture().max_misses());
        assert!(matches!(board.feedback(), Feedback::Led { .. }));
        assert!(matches!(board.link(), Link::None));
        assert_eq!(2, board.songs().unwrap().len());
    }

    #[test]
    fn test_board_deserialize() {
        let board = parse(
            r#"
            capture:
              window: 1s
              max_misses: 4
            feedback:
              kind: log
            link:
              kind: loopback
            songs:
              - name: Epona's Song
                code: "0x22"
                notes: [Up, Left, Right, Up, Left, Right]
        "#,
        );

        assert_eq!(Duration::from_secs(1), board.capture().window().unwrap());
        assert_eq!(4, board.capture().max_misses());
        assert!(matches!(board.feedback(), Feedback::Log));
        assert!(matches!(board.link(), Link::Loopback));

        let songs = board.songs().unwrap();
        assert_eq!(1, songs.len());
        let sequence: NoteSequence = "Up,Left,Right,Up,Left,Right".parse().unwrap();
        let song = songs.find_match(&sequence).unwrap();
        assert_eq!("Epona's Song", song.name);
        assert_eq!(0x22, song.code);
    }

    #[test]
    fn test_build_with_loopback() {
        let board = parse("link:\n  kind: loopback\nfeedback:\n  kind: log");
        let (capture, latch, receiver) = board.build().unwrap();
        assert!(receiver.is_some());
        assert!(!latch.is_open());
        assert_eq!(2, capture.songs().len());
    }

    #[test]
    fn test_build_without_receiver() {
        let (_, _, receiver) = parse("{}").build().unwrap();
        assert!(receiver.is_none());
    }

    #[test]
    fn test_invalid_song_rejected() {
        let board = parse(
            r#"
            songs:
              - name: Broken
                code: "0x01"
                notes: [Up, Sideways, Right, Up, Left, Right]
        "#,
        );
        assert!(matches!(board.songs(), Err(ConfigError::Notes { .. })));
    }

    #[test]
    fn test_load_songs() -> Result<(), Box<dyn Error>> {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile()?;
        writeln!(
            file,
            "songs:\n  - name: Minuet of Forest\n    code: \"0x30\"\n    notes: [A, Up, Left, Right, Left, Right]"
        )?;

        let songs = load_songs(Some(file.path()))?;
        assert_eq!(1, songs.len());
        assert_eq!("Minuet of Forest", songs.list()[0].name);

        assert_eq!(2, load_songs(None)?.len());
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Board::load(Path::new("/nonexistent/board.yaml")),
            Err(ConfigError::Load(_))
        ));
    }
}
