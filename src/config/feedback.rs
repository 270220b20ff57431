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

use super::capture::duration_or;
use super::error::ConfigError;
use crate::feedback::{self, FeedbackSink, LedFeedback, LogFeedback, LogLed};

/// Allows users to specify how feedback is presented.
#[derive(Deserialize, Clone)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Feedback {
    /// Colors and flash patterns on the RGB LED.
    Led { flash_period: Option<String> },
    /// Log lines only.
    Log,
}

impl Default for Feedback {
    fn default() -> Self {
        Feedback::Led { flash_period: None }
    }
}

impl Feedback {
    /// Creates the feedback sink described by this configuration.
    pub fn sink(&self) -> Result<Box<dyn FeedbackSink>, ConfigError> {
        Ok(match self {
            Feedback::Led { flash_period } => Box::new(LedFeedback::new(
                Box::new(LogLed::new()),
                duration_or(flash_period, feedback::DEFAULT_FLASH_PERIOD)?,
            )),
            Feedback::Log => Box::new(LogFeedback::new()),
        })
    }
}
