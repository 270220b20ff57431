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
use std::time::Duration;

use tracing::{debug, info};

/// The default on/off time of a single LED flash.
pub const DEFAULT_FLASH_PERIOD: Duration = Duration::from_millis(150);

const MISS_FLASHES: u32 = 3;
const FAIL_FLASHES: u32 = 5;
const RESULT_FLASHES: u32 = 6;

/// Signals presented to the player while recording and after matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// The board is waiting for a note.
    Prompt,
    /// The sampling window closed.
    Idle,
    /// No note was played in the window.
    Miss,
    /// Too many notes were missed and the attempt was thrown away.
    Fail,
    /// Every note was recorded and the song is being compared.
    Completed,
    /// The recorded song was recognized.
    Success,
    /// The recorded song didn't match any known song.
    NoMatch,
}

/// Presents feedback to the player.
pub trait FeedbackSink: Send {
    fn signal(&mut self, feedback: Feedback);
}

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const OFF: Color = Color::new(0, 0, 0);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// An RGB LED.
pub trait Led: Send {
    fn set(&mut self, color: Color);
}

/// An LED that only reports color changes to the log.
#[derive(Default)]
pub struct LogLed {
    current: Option<Color>,
}

impl LogLed {
    pub fn new() -> LogLed {
        LogLed::default()
    }
}

impl Led for LogLed {
    fn set(&mut self, color: Color) {
        if self.current != Some(color) {
            debug!(color = %color, "LED changed.");
            self.current = Some(color);
        }
    }
}

/// Presents feedback on an RGB LED using steady colors and flash patterns.
pub struct LedFeedback {
    led: Box<dyn Led>,
    flash_period: Duration,
}

impl LedFeedback {
    /// Creates a new LED feedback sink.
    pub fn new(led: Box<dyn Led>, flash_period: Duration) -> LedFeedback {
        LedFeedback { led, flash_period }
    }

    /// Flashes the LED the given number of times, leaving it off.
    fn flash(&mut self, color: Color, flashes: u32) {
        for _ in 0..flashes {
            self.led.set(color);
            spin_sleep::sleep(self.flash_period);
            self.led.set(Color::OFF);
            spin_sleep::sleep(self.flash_period);
        }
    }
}

impl FeedbackSink for LedFeedback {
    fn signal(&mut self, feedback: Feedback) {
        match feedback {
            Feedback::Prompt => self.led.set(Color::GREEN),
            Feedback::Idle => self.led.set(Color::OFF),
            Feedback::Miss => self.flash(Color::RED, MISS_FLASHES),
            Feedback::Fail => self.flash(Color::RED, FAIL_FLASHES),
            Feedback::Completed => self.led.set(Color::BLUE),
            Feedback::Success => self.flash(Color::BLUE, RESULT_FLASHES),
            Feedback::NoMatch => self.flash(Color::RED, RESULT_FLASHES),
        }
    }
}

/// A feedback sink that only logs.
pub struct LogFeedback {}

impl LogFeedback {
    pub fn new() -> LogFeedback {
        LogFeedback {}
    }
}

impl FeedbackSink for LogFeedback {
    fn signal(&mut self, feedback: Feedback) {
        match feedback {
            Feedback::Prompt => info!("Play a note."),
            Feedback::Idle => debug!("Window closed."),
            other => info!(feedback = ?other, "Feedback."),
        }
    }
}
