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
mod cancel;
mod capture;
mod config;
mod controller;
mod feedback;
mod link;
mod note;
mod receiver;
mod recorder;
mod sampler;
mod songs;
#[cfg(test)]
mod testutil;
mod util;

use clap::{crate_version, Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use tracing::{error, info};

use crate::cancel::CancelHandle;
use crate::link::SerialSource;
use crate::note::{Note, NoteSequence};
use crate::receiver::{LogOutputStage, OutputConfig, Receiver};

const SYSTEMD_SERVICE: &str = r#"
[Unit]
Description=ocarina capture board

[Service]
Type=simple
Restart=on-failure
EnvironmentFile=-/etc/default/ocarina
ExecStart=/usr/local/bin/ocarina start "$OCARINA_CONFIG"
ExecReload=/bin/kill -HUP $MAINPID

[Install]
WantedBy=multi-user.target
Alias=ocarina.service
"#;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Recognizes songs played on a five button ocarina."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the reference songs.
    Songs {
        /// The board config to read songs from. The built in songs are listed if omitted.
        #[arg[short, long]]
        config: Option<PathBuf>,
    },
    /// Checks a sequence of notes against the reference songs.
    Match {
        /// Six comma separated notes, e.g. A,Down,Up,A,Down,Up.
        notes: String,
        /// The board config to read songs from.
        #[arg[short, long]]
        config: Option<PathBuf>,
    },
    /// Starts the capture board, driven from the keyboard.
    Start {
        /// The path to the board config.
        config: PathBuf,
    },
    /// Runs the receiving board on a serial port.
    Receive {
        /// The serial port the capture board is wired to.
        port: String,
        /// The baud rate of the serial port.
        #[arg[short, long, default_value_t = link::DEFAULT_BAUD_RATE]]
        baud_rate: u32,
    },
    /// Shows what the capture and receiving boards make of a byte.
    Decode {
        /// The byte, in hex (0x11) or decimal.
        byte: String,
    },
    /// Prints a systemd service definition to stdout.
    Systemd {},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Songs { config } => {
            let songs = config::load_songs(config.as_deref())?;

            if songs.is_empty() {
                println!("No songs found.");
                return Ok(());
            }

            print!("{}", songs);
        }
        Commands::Match { notes, config } => {
            let songs = config::load_songs(config.as_deref())?;
            let sequence = notes.parse::<NoteSequence>()?;

            match songs.find_match(&sequence) {
                Some(song) => println!("{}", song),
                None => println!("No match for {}", sequence),
            }
        }
        Commands::Start { config } => {
            config::init_controller(&config)?.join().await?;
        }
        Commands::Receive { port, baud_rate } => {
            let source = SerialSource::open(&port, baud_rate)?;
            let mut receiver = Receiver::new(Box::new(source), Box::new(LogOutputStage::new()));
            let cancel_handle = CancelHandle::new();
            {
                let cancel_handle = cancel_handle.clone();
                tokio::spawn(async move {
                    match tokio::signal::ctrl_c().await {
                        Ok(()) => {
                            info!("Interrupted, stopping receiver.");
                            cancel_handle.cancel();
                        }
                        Err(e) => error!(err = %e, "Unable to listen for interrupts."),
                    }
                });
            }
            tokio::task::spawn_blocking(move || receiver.run(&cancel_handle)).await??;
        }
        Commands::Decode { byte } => {
            let byte = util::parse_code(&byte)?;

            println!("Byte: {:#04X} ({:#010b})", byte, byte);
            println!("Note: {}", Note::decode(byte));
            match OutputConfig::select(byte) {
                Some(config) => println!("Receiver: {}", config),
                None => println!("Receiver: ignored"),
            }
        }
        Commands::Systemd {} => {
            println!("{}", SYSTEMD_SERVICE)
        }
    }

    Ok(())
}
