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
use std::io;

use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{info, span, warn, Level};

use super::Event;
use crate::note::Note;

const START: &str = "start";
const UP: &str = "up";
const DOWN: &str = "down";
const LEFT: &str = "left";
const RIGHT: &str = "right";
const A: &str = "a";
const QUIT: &str = "quit";

/// A controller that simulates the instrument's buttons using the keyboard.
pub struct Driver {}

impl Driver {
    pub fn new() -> Driver {
        Driver {}
    }

    /// Reads and handles a single command. Returns false once input should stop being
    /// read, either because the user quit or because input ended.
    fn monitor_io<R, W>(
        events_tx: &Sender<Event>,
        mut reader: R,
        mut writer: W,
    ) -> Result<bool, io::Error>
    where
        R: io::BufRead,
        W: io::Write,
    {
        write!(
            writer,
            "Command ({}, {}, {}, {}, {}, {}, {}): ",
            START, UP, DOWN, LEFT, RIGHT, A, QUIT,
        )?;
        writer.flush()?;
        let mut input: String = String::default();
        if reader.read_line(&mut input)? == 0 {
            events_tx
                .blocking_send(Event::Quit)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            return Ok(false);
        }

        let event = match input.trim().to_lowercase().as_str() {
            START => Some(Event::Start),
            UP => Some(Event::Press(Note::Up)),
            DOWN => Some(Event::Press(Note::Down)),
            LEFT => Some(Event::Press(Note::Left)),
            RIGHT => Some(Event::Press(Note::Right)),
            A => Some(Event::Press(Note::A)),
            QUIT => Some(Event::Quit),
            _ => {
                warn!(input = input.trim(), "Unrecognized input");
                None
            }
        };

        let quit = event == Some(Event::Quit);
        if let Some(event) = event {
            events_tx
                .blocking_send(event)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        }
        Ok(!quit)
    }
}

impl super::Driver for Driver {
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>> {
        tokio::task::spawn_blocking(move || {
            let span = span!(Level::INFO, "keyboard driver");
            let _enter = span.enter();

            info!("Keyboard driver started.");

            while Self::monitor_io(&events_tx, io::stdin().lock(), io::stdout())? {}
            Ok(())
        })
    }
}
